// syn.8bit -- a text based chiptune synthesizer
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Digital filters for shaping generated waves.

use std::f64::consts::PI;

/// Filter coefficients for a biquadratic filter,
/// based on https://www.w3.org/2011/audio/audio-eq-cookbook.html.
#[derive(Debug, Clone)]
pub struct BiquadCoefficients {
    pub b0: f64,
    pub b1: f64,
    pub b2: f64,
    pub a1: f64,
    pub a2: f64,
}

impl BiquadCoefficients {
    /// Lowpass filter with the given cutoff frequency and Q factor
    pub fn lowpass(sample_rate: f64, cutoff: f64, q: f64) -> Self {
        let omega0 = 2.0 * PI * cutoff / sample_rate;
        let (sin_omega, cos_omega) = omega0.sin_cos();
        let alpha = sin_omega / (2.0 * q);
        let a0 = 1.0 + alpha;
        let a0_inv = 1.0 / a0;
        Self {
            b0: a0_inv * (1.0 - cos_omega) / 2.0,
            b1: a0_inv * (1.0 - cos_omega),
            b2: a0_inv * (1.0 - cos_omega) / 2.0,
            a1: a0_inv * (-2.0 * cos_omega),
            a2: a0_inv * (1.0 - alpha),
        }
    }
}

/// Biquadratic filter with four delay gates, based on https://www.w3.org/2011/audio/audio-eq-cookbook.html.
#[derive(Debug, Clone, Default)]
pub struct Biquad {
    x1: f64,
    x2: f64,
    y1: f64,
    y2: f64,
}

impl Biquad {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the next value through the filter using the given coefficients.
    pub fn step(&mut self, c: &BiquadCoefficients, input: f64) -> f64 {
        let output =
            c.b0 * input + c.b1 * self.x1 + c.b2 * self.x2 - c.a1 * self.y1 - c.a2 * self.y2;
        self.x2 = self.x1;
        self.x1 = input;
        self.y2 = self.y1;
        self.y1 = output;
        output
    }
}

/// Coefficients of a first order filter obtained by the bilinear transform
/// with the cutoff frequency pre-warped.
#[derive(Debug, Clone)]
pub struct OnePoleCoefficients {
    pub b0: f64,
    pub b1: f64,
    pub a1: f64,
}

impl OnePoleCoefficients {
    pub fn lowpass(sample_rate: f64, cutoff: f64) -> Self {
        let k = (PI * cutoff / sample_rate).tan();
        Self {
            b0: k / (1.0 + k),
            b1: k / (1.0 + k),
            a1: (k - 1.0) / (k + 1.0),
        }
    }
}

/// First order filter with two delay gates.
#[derive(Debug, Clone, Default)]
pub struct OnePole {
    x1: f64,
    y1: f64,
}

impl OnePole {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&mut self, c: &OnePoleCoefficients, input: f64) -> f64 {
        let output = c.b0 * input + c.b1 * self.x1 - c.a1 * self.y1;
        self.x1 = input;
        self.y1 = output;
        output
    }
}

/// Third order Butterworth lowpass, realized as a first order section
/// followed by a biquad with Q = 1.
///
/// The cutoff is kept below the Nyquist frequency of the sample rate.
///
/// # Example
///
/// ```
/// use syn_8bit::filter::Butterworth3;
///
/// let lowpass = Butterworth3::lowpass(44100.0, 12000.0);
/// // constant signals pass unchanged once the filter settled
/// let mut signal = vec![1.0; 2000];
/// lowpass.filter(&mut signal);
/// assert!((signal[1999] - 1.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone)]
pub struct Butterworth3 {
    first_order: OnePoleCoefficients,
    second_order: BiquadCoefficients,
}

impl Butterworth3 {
    pub fn lowpass(sample_rate: f64, cutoff: f64) -> Self {
        let cutoff = cutoff.max(1.0).min(sample_rate * 0.49);
        Self {
            first_order: OnePoleCoefficients::lowpass(sample_rate, cutoff),
            second_order: BiquadCoefficients::lowpass(sample_rate, cutoff, 1.0),
        }
    }

    /// Filter a complete signal in place, starting from a silent state.
    pub fn filter(&self, signal: &mut [f64]) {
        let mut one_pole = OnePole::new();
        let mut biquad = Biquad::new();
        for sample in signal.iter_mut() {
            let y = one_pole.step(&self.first_order, *sample);
            *sample = biquad.step(&self.second_order, y);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rms(signal: &[f64]) -> f64 {
        (signal.iter().map(|x| x * x).sum::<f64>() / signal.len() as f64).sqrt()
    }

    fn sine(frequency: f64, sample_rate: f64, len: usize) -> Vec<f64> {
        (0..len)
            .map(|i| (2.0 * PI * frequency * i as f64 / sample_rate).sin())
            .collect()
    }

    #[test]
    fn passes_low_frequencies() {
        let lowpass = Butterworth3::lowpass(44100.0, 12000.0);
        let mut signal = sine(440.0, 44100.0, 44100);
        lowpass.filter(&mut signal);
        let level = rms(&signal[4410..]);
        assert!((level - 0.5f64.sqrt()).abs() < 0.01, "{}", level);
    }

    #[test]
    fn cutoff_is_half_power() {
        let lowpass = Butterworth3::lowpass(44100.0, 1000.0);
        let mut signal = sine(1000.0, 44100.0, 44100);
        lowpass.filter(&mut signal);
        // -3 dB at the cutoff frequency
        let level = rms(&signal[4410..]);
        assert!((level - 0.5).abs() < 0.01, "{}", level);
    }

    #[test]
    fn attenuates_high_frequencies() {
        let lowpass = Butterworth3::lowpass(44100.0, 1000.0);
        let mut signal = sine(8000.0, 44100.0, 44100);
        lowpass.filter(&mut signal);
        // third order: roughly 18 dB per octave
        assert!(rms(&signal[4410..]) < 0.01);
    }

    #[test]
    fn cutoff_above_nyquist() {
        let lowpass = Butterworth3::lowpass(22050.0, 12000.0);
        let mut signal = sine(440.0, 22050.0, 22050);
        lowpass.filter(&mut signal);
        assert!(signal.iter().all(|x| x.is_finite()));
    }
}

// syn.8bit -- a text based chiptune synthesizer
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

use super::{silence, Phase, Voices, WaveGenerator};
use crate::envelope::ADS;
use crate::filter::Butterworth3;
use crate::song::ValidationError;

/// Band limited step correction around a discontinuity at phase zero,
/// `dt` being the phase advance per sample.
fn poly_blep(phase: f64, dt: f64) -> f64 {
    if dt <= 0.0 {
        0.0
    } else if phase < dt {
        let x = phase / dt;
        2.0 * x - x * x - 1.0
    } else if phase > 1.0 - dt {
        let x = (phase - 1.0) / dt;
        x * x + 2.0 * x + 1.0
    } else {
        0.0
    }
}

/// Square wave modelled after the pulse channels of the NES.
///
/// Compared to [`super::Square`], the edges are smoothed to suppress aliasing,
/// every note is shaped by a short attack and a decay to a sustain level, the
/// result is soft clipped and finally sent through a lowpass like the output
/// stage of the console.
///
/// The sample rate is taken from the spacing of the time axis; for time axes
/// with a single sample the configured fallback is used.
///
/// ```
/// use syn_8bit::generator::{NesSquare, Voices, WaveGenerator};
///
/// let square = NesSquare::new(0.125).unwrap();
/// let time: Vec<f64> = (0..4410).map(|i| i as f64 / 44100.0).collect();
/// let rows = square.generate(Voices::Frequencies(&[440.0]), &time);
/// assert_eq!(rows[0].len(), 4410);
///
/// assert!(NesSquare::new(0.3).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct NesSquare {
    duty: f64,
    envelope: ADS,
    cutoff: f64,
    drive: f64,
    fallback_sample_rate: f64,
}

impl NesSquare {
    /// The duty cycles the hardware supports.
    pub const DUTIES: [f64; 4] = [0.125, 0.25, 0.5, 0.75];
    pub const DEFAULT_CUTOFF: f64 = 12000.0;
    pub const DEFAULT_SAMPLE_RATE: f64 = 44100.0;

    pub fn new(duty: f64) -> Result<NesSquare, ValidationError> {
        if !Self::DUTIES.contains(&duty) {
            return Err(ValidationError::InvalidDuty {
                duty,
                expected: "one of 0.125, 0.25, 0.5, 0.75",
            });
        }
        Ok(Self::with_duty(duty))
    }

    fn with_duty(duty: f64) -> NesSquare {
        NesSquare {
            duty,
            envelope: ADS {
                attack: 0.002,
                decay: 0.15,
                sustain: 0.3,
            },
            cutoff: Self::DEFAULT_CUTOFF,
            drive: 1.8,
            fallback_sample_rate: Self::DEFAULT_SAMPLE_RATE,
        }
    }

    pub fn duty(&self) -> f64 {
        self.duty
    }

    /// Sample rate assumed when it cannot be derived from the time axis.
    pub fn with_fallback_sample_rate(mut self, rate: f64) -> Self {
        if rate > 0.0 {
            self.fallback_sample_rate = rate;
        }
        self
    }

    pub fn with_cutoff(mut self, cutoff: f64) -> Self {
        self.cutoff = cutoff;
        self
    }

    fn sample_rate(&self, time: &[f64]) -> f64 {
        match time {
            [t0, t1, ..] if t1 > t0 => 1.0 / (t1 - t0),
            _ => self.fallback_sample_rate,
        }
    }

    fn voice(
        &self,
        frequency: f64,
        time: &[f64],
        gains: &[f64],
        lowpass: &Butterworth3,
        dt: f64,
    ) -> Vec<f64> {
        let mut row: Vec<f64> = time
            .iter()
            .zip(gains)
            .map(|(&t, gain)| {
                let phase = Phase::at(frequency, t).offset();
                let naive = if phase < self.duty { 1.0 } else { -1.0 };
                // rising edge at phase zero, falling edge at the duty cycle
                let falling = Phase::new(phase - self.duty).offset();
                let smooth = naive + poly_blep(phase, dt) - poly_blep(falling, dt);
                (smooth * gain * self.drive).tanh()
            })
            .collect();
        lowpass.filter(&mut row);
        row
    }
}

impl Default for NesSquare {
    fn default() -> Self {
        Self::with_duty(0.5)
    }
}

impl WaveGenerator for NesSquare {
    fn generate(&self, voices: Voices, time: &[f64]) -> Vec<Vec<f64>> {
        let frequencies = match voices {
            Voices::Frequencies(frequencies) => frequencies,
            Voices::Labels(labels) => return silence(labels.len(), time.len()),
        };
        let sample_rate = self.sample_rate(time);
        let gains = self.envelope.gains(time);
        let lowpass = Butterworth3::lowpass(sample_rate, self.cutoff);
        frequencies
            .iter()
            .map(|&f| self.voice(f, time, &gains, &lowpass, f / sample_rate))
            .collect()
    }
}

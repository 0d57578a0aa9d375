// syn.8bit -- a text based chiptune synthesizer
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Amplitude envelopes evaluated over the time axis of a single note.

/// An exponential decay `exp(-rate * t)`, starting at full volume when the note starts.
///
/// # Example
///
/// ```
/// use syn_8bit::envelope::Decay;
/// let d = Decay { rate: 5.0 };
/// assert_eq!(d.gain(0.0), 1.0);
/// assert_eq!(d.gain(0.2), (-1.0f64).exp());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decay {
    /// Inverse time constant in 1/seconds.
    pub rate: f64,
}

impl Decay {
    pub fn gain(&self, time: f64) -> f64 {
        (-self.rate * time).exp()
    }
}

/// An Attack-Decay-Sustain envelope for notes of known length.
///
/// The amplitude rises linearly from zero to one over the first `attack` fraction
/// of the note, then follows an exponential decay with time constant `decay` seconds
/// that never falls below the `sustain` level. There is no release phase, the
/// note simply ends.
///
/// # Example
///
/// ```
/// use syn_8bit::envelope::ADS;
/// let e = ADS {
///     attack: 0.25,
///     decay: 0.5,
///     sustain: 0.25,
/// };
/// let time: Vec<f64> = (0..8).map(|i| i as f64 * 0.25).collect();
/// let gains = e.gains(&time);
/// // attack over the first two samples
/// assert_eq!(gains[0], 0.0);
/// assert_eq!(gains[1], 1.0);
/// // then decay
/// assert_eq!(gains[2], (-1.0f64).exp());
/// // held at the sustain level
/// assert_eq!(gains[7], 0.25);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ADS {
    /// Fraction of the note used for rising from 0.0 to 1.0.
    pub attack: f64,
    /// Time constant in seconds of the exponential decay.
    pub decay: f64,
    /// Lowest level the decay falls to.
    pub sustain: f64,
}

impl ADS {
    /// The envelope gain at every point of the time axis.
    pub fn gains(&self, time: &[f64]) -> Vec<f64> {
        let mut gains: Vec<f64> = time
            .iter()
            .map(|t| (-t / self.decay).exp().max(self.sustain).min(1.0))
            .collect();

        let attack_samples = ((self.attack * time.len() as f64) as usize)
            .max(1)
            .min(gains.len());
        for (i, gain) in gains.iter_mut().take(attack_samples).enumerate() {
            *gain = if attack_samples > 1 {
                i as f64 / (attack_samples - 1) as f64
            } else {
                0.0
            };
        }
        gains
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decay_falls_off() {
        let decay = Decay { rate: 5.0 };
        assert_eq!(decay.gain(0.0), 1.0);
        assert_eq!(decay.gain(0.1), (-0.5f64).exp());
        assert_eq!(decay.gain(1.0), (-5.0f64).exp());
        assert!(decay.gain(2.0) < decay.gain(1.0));
    }

    #[test]
    fn ads_single_sample() {
        let e = ADS {
            attack: 0.002,
            decay: 0.15,
            sustain: 0.3,
        };
        assert_eq!(e.gains(&[0.0]), vec![0.0]);
        assert!(e.gains(&[]).is_empty());
    }

    #[test]
    fn ads_stays_in_range() {
        let e = ADS {
            attack: 0.1,
            decay: 0.15,
            sustain: 0.3,
        };
        let time: Vec<f64> = (0..1000).map(|i| i as f64 / 1000.0).collect();
        let gains = e.gains(&time);
        assert!(gains.iter().all(|g| (0.0..=1.0).contains(g)));
        assert_eq!(gains[99], 1.0);
        assert_eq!(*gains.last().unwrap(), 0.3);
    }
}

// syn.8bit -- a text based chiptune synthesizer
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

use std::fmt;
use std::sync::{Mutex, MutexGuard};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{silence, Triangle, Voices, WaveGenerator};
use crate::envelope::Decay;

fn lock<R>(rng: &Mutex<R>) -> MutexGuard<R> {
    // a panic while drawing numbers leaves the generator state intact
    rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Uniform noise in `[-amplitude, amplitude]` fading out with `decay`.
fn decaying_noise<R: Rng>(rng: &mut R, amplitude: f64, decay: Decay, time: &[f64]) -> Vec<f64> {
    time.iter()
        .map(|&t| rng.gen_range(-amplitude..=amplitude) * decay.gain(t))
        .collect()
}

/// Noise channel: every voice is an independent burst of uniform noise
/// decaying with `exp(-5t)`. The pitch of a voice is irrelevant, only the
/// number of voices matters.
///
/// ```
/// use rand::SeedableRng;
/// use rand::rngs::StdRng;
/// use syn_8bit::generator::{Noise, Voices, WaveGenerator};
///
/// let noise = Noise::with_rng(StdRng::seed_from_u64(7));
/// let rows = noise.generate(Voices::Frequencies(&[440.0, 880.0]), &[0.0, 0.1, 0.2]);
/// assert_eq!(rows.len(), 2);
/// assert!(rows.iter().flatten().all(|x| x.abs() <= 0.2));
/// ```
pub struct Noise<R = StdRng> {
    rng: Mutex<R>,
}

impl Noise<StdRng> {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }
}

impl Default for Noise<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> Noise<R> {
    pub const AMPLITUDE: f64 = 0.2;
    pub const DECAY: Decay = Decay { rate: 5.0 };

    pub fn with_rng(rng: R) -> Self {
        Self {
            rng: Mutex::new(rng),
        }
    }
}

impl<R> fmt::Debug for Noise<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Noise").finish()
    }
}

impl<R: Rng + Send> WaveGenerator for Noise<R> {
    fn generate(&self, voices: Voices, time: &[f64]) -> Vec<Vec<f64>> {
        let mut rng = lock(&self.rng);
        (0..voices.len())
            .map(|_| decaying_noise(&mut *rng, Self::AMPLITUDE, Self::DECAY, time))
            .collect()
    }
}

/// The sounds a [`Drum`] knows, selected by label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrumSound {
    /// Triangle sweeping down in pitch with a short noise click.
    Kick,
    Snare,
    HiHat,
}

impl DrumSound {
    /// Labels are matched ignoring case, unknown labels play nothing.
    pub fn from_label(label: &str) -> Option<DrumSound> {
        match label.to_lowercase().as_str() {
            "kick" => Some(DrumSound::Kick),
            "snare" => Some(DrumSound::Snare),
            "hihat" => Some(DrumSound::HiHat),
            _ => None,
        }
    }
}

/// Simple percussion played by label (`kick`, `snare`, `hihat`).
///
/// ```
/// use syn_8bit::generator::{Drum, Voices, WaveGenerator};
///
/// let drum = Drum::new();
/// assert!(drum.uses_label_input());
/// let labels = vec!["cowbell".to_string()];
/// let rows = drum.generate(Voices::Labels(&labels), &[0.0, 0.5]);
/// assert_eq!(rows, vec![vec![0.0, 0.0]]);
/// ```
pub struct Drum<R = StdRng> {
    tone: Triangle,
    rng: Mutex<R>,
}

impl Drum<StdRng> {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }
}

impl Default for Drum<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> Drum<R> {
    /// Pitch of the kick when it starts.
    pub const KICK_START: f64 = 150.0;
    /// How far the kick falls in pitch until the end of the note.
    pub const KICK_SWEEP: f64 = 100.0;

    pub fn with_rng(rng: R) -> Self {
        Self {
            tone: Triangle,
            rng: Mutex::new(rng),
        }
    }

    fn sound(&self, rng: &mut R, sound: DrumSound, time: &[f64]) -> Vec<f64> {
        match sound {
            DrumSound::Kick => {
                let length = time.last().copied().unwrap_or(0.0);
                let body = Decay { rate: 8.0 };
                let click = Decay { rate: 20.0 };
                time.iter()
                    .map(|&t| {
                        let progress = if length > 0.0 { t / length } else { 0.0 };
                        let frequency = Self::KICK_START - Self::KICK_SWEEP * progress;
                        self.tone.sample(frequency, t) * body.gain(t)
                            + 0.05 * rng.gen_range(-1.0..=1.0) * click.gain(t)
                    })
                    .collect()
            }
            DrumSound::Snare => decaying_noise(rng, 1.0, Decay { rate: 30.0 }, time),
            DrumSound::HiHat => decaying_noise(rng, 1.0, Decay { rate: 80.0 }, time),
        }
    }
}

impl<R> fmt::Debug for Drum<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Drum").field("tone", &self.tone).finish()
    }
}

impl<R: Rng + Send> WaveGenerator for Drum<R> {
    fn uses_label_input(&self) -> bool {
        true
    }

    fn generate(&self, voices: Voices, time: &[f64]) -> Vec<Vec<f64>> {
        let labels = match voices {
            Voices::Labels(labels) => labels,
            Voices::Frequencies(frequencies) => return silence(frequencies.len(), time.len()),
        };
        let mut rng = lock(&self.rng);
        labels
            .iter()
            .map(|label| match DrumSound::from_label(label) {
                Some(sound) => self.sound(&mut *rng, sound, time),
                None => vec![0.0; time.len()],
            })
            .collect()
    }
}

// syn.8bit -- a text based chiptune synthesizer
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Wave generators turning the voices of a chord into sample rows.

use std::fmt::Debug;

mod nes;
mod noise;
mod periodic;

pub use self::nes::NesSquare;
pub use self::noise::{Drum, DrumSound, Noise};
pub use self::periodic::{Sine, Square, Triangle};

/// What a generator is asked to play: either resolved frequencies in Hz,
/// or the raw labels of the chord for generators that synthesize by name.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Voices<'a> {
    Frequencies(&'a [f64]),
    Labels(&'a [String]),
}

impl<'a> Voices<'a> {
    /// Number of voices, i.e. rows in the generated matrix.
    pub fn len(&self) -> usize {
        match self {
            Voices::Frequencies(f) => f.len(),
            Voices::Labels(l) => l.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A source of waveforms.
///
/// `generate` returns one row per voice, each row holding one sample per
/// point of the time axis. Generators must cope with a single voice and a
/// single sample. When called with the kind of voices they do not consume,
/// they produce silent rows.
pub trait WaveGenerator: Debug + Send + Sync {
    /// Whether the chord labels are passed through unchanged instead of
    /// being resolved to frequencies first.
    fn uses_label_input(&self) -> bool {
        false
    }

    fn generate(&self, voices: Voices, time: &[f64]) -> Vec<Vec<f64>>;
}

/// A matrix of silent rows for every voice.
fn silence(voices: usize, samples: usize) -> Vec<Vec<f64>> {
    vec![vec![0.0; samples]; voices]
}

/// Evaluate `sample(frequency, t)` for every voice and point in time.
/// Labels produce silence.
fn per_frequency<F>(voices: Voices, time: &[f64], sample: F) -> Vec<Vec<f64>>
where
    F: Fn(f64, f64) -> f64,
{
    match voices {
        Voices::Frequencies(frequencies) => frequencies
            .iter()
            .map(|&f| time.iter().map(|&t| sample(f, t)).collect())
            .collect(),
        Voices::Labels(labels) => silence(labels.len(), time.len()),
    }
}

/// Position within the period of a wave, in `[0, 1)`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Phase(f64);

impl Phase {
    pub const ZERO: Phase = Phase(0.0);

    pub fn new(offset: f64) -> Phase {
        let wrapped = offset - offset.floor();
        // guards against rounding up to exactly one for tiny negative offsets
        if wrapped >= 1.0 {
            Phase::ZERO
        } else {
            Phase(wrapped)
        }
    }

    /// The phase of a wave with the given frequency at `time` seconds.
    pub fn at(frequency: f64, time: f64) -> Phase {
        Phase::new(frequency * time)
    }

    pub fn offset(self) -> f64 {
        self.0
    }
}

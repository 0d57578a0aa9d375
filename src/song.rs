// syn.8bit -- a text based chiptune synthesizer
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Parts of a song: melodies scheduled to absolute time, played by a generator.

use std::sync::Arc;

use log::debug;
use snafu::Snafu;

use crate::generator::WaveGenerator;
use crate::melody::{self, Entry, FormatError};

/// A chord that is played at a specific time.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteEvent {
    /// Time in seconds since the start of the part.
    pub start_time: f64,
    /// How long the chord is held in seconds.
    pub duration: f64,
    /// The note names (or labels) making up the chord.
    pub notes: Vec<String>,
}

impl NoteEvent {
    /// Time in seconds when the chord is released.
    pub fn end_time(&self) -> f64 {
        self.start_time + self.duration
    }
}

/// Construction arguments outside of their valid range.
#[derive(Debug, Clone, PartialEq, Snafu)]
pub enum ValidationError {
    #[snafu(display("first_bpm must be > 0, got {}", bpm))]
    InvalidTempo { bpm: f64 },
    #[snafu(display("BPM at melody[{}] must be >= 1, got {}", index, bpm))]
    InvalidTempoChange { index: usize, bpm: f64 },
    #[snafu(display("beat count at melody[{}] must be > 0, got {}", index, beats))]
    InvalidBeat { index: usize, beats: f64 },
    #[snafu(display("volume must be >= 0, got {}", volume))]
    InvalidVolume { volume: f64 },
    #[snafu(display("duty must be {}, got {}", expected, duty))]
    InvalidDuty { duty: f64, expected: &'static str },
    #[snafu(display("sampling_rate must be > 0, got {}", rate))]
    InvalidSampleRate { rate: u32 },
}

/// Anything that can go wrong when building a part.
#[derive(Debug, Clone, PartialEq, Snafu)]
pub enum PartError {
    #[snafu(display("{}", source))]
    Validation { source: ValidationError },
    #[snafu(display("{}", source))]
    Format { source: FormatError },
}

impl From<ValidationError> for PartError {
    fn from(source: ValidationError) -> Self {
        PartError::Validation { source }
    }
}

impl From<FormatError> for PartError {
    fn from(source: FormatError) -> Self {
        PartError::Format { source }
    }
}

/// A single voice of a song: a melody played on one generator at one volume.
///
/// The melody is scheduled once when the part is built, afterwards the part is read-only.
///
/// # Examples
///
/// ```
/// use syn_8bit::generator::Square;
/// use syn_8bit::melody::Entry;
/// use syn_8bit::song::Part;
///
/// let melody = vec![
///     Entry::notes(vec!["C4"], 1.0),
///     Entry::notes(vec!["E4", "E5"], 1.0),
///     Entry::notes(vec!["G4"], 2.0),
///     Entry::notes(vec!["R"], 1.0),
/// ];
/// let part = Part::builder(Square::default()).volume(0.5).bpm(120.0).build(&melody).unwrap();
///
/// let starts: Vec<f64> = part.events().iter().map(|e| e.start_time).collect();
/// let durations: Vec<f64> = part.events().iter().map(|e| e.duration).collect();
/// assert_eq!(starts, vec![0.0, 0.5, 1.0, 2.0]);
/// assert_eq!(durations, vec![0.5, 0.5, 1.0, 0.5]);
/// assert_eq!(part.total_beat(), 5.0);
/// ```
#[derive(Debug, Clone)]
pub struct Part {
    /// Tempo in effect after the last entry of the melody.
    bpm: f64,
    volume: f64,
    generator: Arc<dyn WaveGenerator>,
    events: Vec<NoteEvent>,
    /// Sum of the beats of all chords, ignoring tempo changes.
    total_beat: f64,
}

impl Part {
    pub const DEFAULT_VOLUME: f64 = 0.5;
    pub const DEFAULT_BPM: f64 = 120.0;

    /// Schedule `melody` starting at `first_bpm`.
    pub fn new(
        melody: &[Entry],
        volume: f64,
        generator: Arc<dyn WaveGenerator>,
        first_bpm: f64,
    ) -> Result<Part, PartError> {
        if !first_bpm.is_finite() || first_bpm <= 0.0 {
            return Err(ValidationError::InvalidTempo { bpm: first_bpm }.into());
        }
        if !volume.is_finite() || volume < 0.0 {
            return Err(ValidationError::InvalidVolume { volume }.into());
        }

        let schedule = schedule(melody, first_bpm)?;
        debug!(
            "scheduled {} events over {} beats ({:.3} seconds)",
            schedule.events.len(),
            schedule.total_beat,
            schedule.events.last().map_or(0.0, NoteEvent::end_time)
        );

        Ok(Part {
            bpm: schedule.bpm,
            volume,
            generator,
            events: schedule.events,
            total_beat: schedule.total_beat,
        })
    }

    /// Parse a melody in textual notation (see [`crate::melody`]) and schedule it.
    pub fn from_notation(
        notation: &str,
        volume: f64,
        generator: Arc<dyn WaveGenerator>,
        first_bpm: f64,
    ) -> Result<Part, PartError> {
        let melody = melody::parse_melody(notation)?;
        Part::new(&melody, volume, generator, first_bpm)
    }

    /// Start building a part with default volume and tempo.
    pub fn builder<G: WaveGenerator + 'static>(generator: G) -> PartBuilder {
        PartBuilder::shared(Arc::new(generator))
    }

    pub fn bpm(&self) -> f64 {
        self.bpm
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn generator(&self) -> &dyn WaveGenerator {
        &*self.generator
    }

    pub fn events(&self) -> &[NoteEvent] {
        &self.events
    }

    pub fn total_beat(&self) -> f64 {
        self.total_beat
    }

    /// Time in seconds when the last event of this part ends.
    pub fn end_time(&self) -> f64 {
        self.events.last().map_or(0.0, NoteEvent::end_time)
    }
}

/// Collects the optional parameters of a [`Part`].
#[derive(Debug, Clone)]
pub struct PartBuilder {
    volume: f64,
    bpm: f64,
    generator: Arc<dyn WaveGenerator>,
}

impl PartBuilder {
    /// Use a generator that may also be used by other parts.
    pub fn shared(generator: Arc<dyn WaveGenerator>) -> Self {
        PartBuilder {
            volume: Part::DEFAULT_VOLUME,
            bpm: Part::DEFAULT_BPM,
            generator,
        }
    }

    pub fn volume(mut self, volume: f64) -> Self {
        self.volume = volume;
        self
    }

    /// Tempo at the start of the melody.
    pub fn bpm(mut self, bpm: f64) -> Self {
        self.bpm = bpm;
        self
    }

    pub fn build(self, melody: &[Entry]) -> Result<Part, PartError> {
        Part::new(melody, self.volume, self.generator, self.bpm)
    }

    pub fn build_notation(self, notation: &str) -> Result<Part, PartError> {
        Part::from_notation(notation, self.volume, self.generator, self.bpm)
    }
}

struct Schedule {
    events: Vec<NoteEvent>,
    total_beat: f64,
    bpm: f64,
}

/// Turn beats into seconds, following tempo changes along the way.
fn schedule(melody: &[Entry], first_bpm: f64) -> Result<Schedule, ValidationError> {
    let mut events = Vec::new();
    let mut current_time = 0.0;
    let mut current_bpm = first_bpm;
    let mut total_beat = 0.0;

    for (index, entry) in melody.iter().enumerate() {
        match entry {
            Entry::Tempo { bpm } => {
                if !bpm.is_finite() || *bpm < 1.0 {
                    return Err(ValidationError::InvalidTempoChange { index, bpm: *bpm });
                }
                current_bpm = *bpm;
            }
            Entry::Notes { notes, beats } => {
                if !beats.is_finite() || *beats <= 0.0 {
                    return Err(ValidationError::InvalidBeat {
                        index,
                        beats: *beats,
                    });
                }
                let duration = beats * (60.0 / current_bpm);
                events.push(NoteEvent {
                    start_time: current_time,
                    duration,
                    notes: notes.clone(),
                });
                current_time += duration;
                total_beat += beats;
            }
        }
    }

    Ok(Schedule {
        events,
        total_beat,
        bpm: current_bpm,
    })
}

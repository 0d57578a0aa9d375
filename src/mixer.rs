// syn.8bit -- a text based chiptune synthesizer
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Rendering parts into one buffer and reducing it to 8 bit resolution.

use std::fmt;
use std::io;
use std::sync::Arc;

use log::{debug, info, trace, warn};

use crate::generator::Voices;
use crate::output;
use crate::song::{NoteEvent, Part, ValidationError};
use crate::tuning::FrequencyTable;
use crate::wave::Wave;

pub const DEFAULT_SAMPLING_RATE: u32 = 22050;

/// Largest magnitude of the signed 8 bit levels.
const LEVELS_8BIT: f64 = 127.0;
/// Largest magnitude of the signed 16 bit output.
const LEVELS_16BIT: f64 = 32767.0;

/// Map a user volume in `[0, 1]` to the gain applied to a part.
///
/// The ceiling is low so that several parts playing at once stay well
/// within range before normalization.
///
/// ```
/// use syn_8bit::mixer::map_volume;
/// assert_eq!(map_volume(0.0), 0.01);
/// assert_eq!(map_volume(1.0), 0.08);
/// ```
pub fn map_volume(volume: f64) -> f64 {
    0.01 + 0.07 * volume
}

/// Normalize to the peak amplitude, round to signed 8 bit levels and widen
/// the result back to the 16 bit range.
///
/// The levels span the symmetric range -127..=127, so there are 255 of
/// them rather than the 256 of a full byte. Silent (or empty) buffers stay
/// silent.
///
/// ```
/// use syn_8bit::mixer::quantize_8bit;
/// assert_eq!(quantize_8bit(&[0.5, -1.0, 0.0]), vec![16512, -32767, 0]);
/// assert_eq!(quantize_8bit(&[0.0, 0.0]), vec![0, 0]);
/// ```
pub fn quantize_8bit(buffer: &[f64]) -> Vec<i16> {
    let peak = buffer.iter().fold(0.0f64, |peak, x| peak.max(x.abs()));
    let scale = if peak > 0.0 { 1.0 / peak } else { 0.0 };
    buffer
        .iter()
        .map(|x| {
            let level = (x * scale * LEVELS_8BIT).round();
            (level / LEVELS_8BIT * LEVELS_16BIT) as i16
        })
        .collect()
}

/// A note that is not in the frequency table and was left out of its chord.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownNote {
    /// Index of the part in the mixer.
    pub part: usize,
    /// Index of the event in the part.
    pub event: usize,
    pub note: String,
}

impl fmt::Display for UnknownNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown note {:?} in part {} at event {} is skipped",
            self.note, self.part, self.event
        )
    }
}

/// The summed signal of all parts before quantization.
#[derive(Debug, Clone, PartialEq)]
pub struct Mix {
    pub buffer: Vec<f64>,
    pub warnings: Vec<UnknownNote>,
}

/// Combines parts into a song and renders it.
///
/// The rendered wave is cached; parts must not change while they are
/// in a mixer.
///
/// # Examples
///
/// ```
/// use syn_8bit::generator::Square;
/// use syn_8bit::mixer::SongMixer;
/// use syn_8bit::song::Part;
///
/// let melody = Part::builder(Square::default())
///     .build_notation("C4:1 E4,E5:1 G4:2 R:1")
///     .unwrap();
/// let mut mixer = SongMixer::new(vec![melody], 22050).unwrap();
/// assert_eq!(mixer.total_duration(), 2.5);
/// let wave = mixer.synthesize();
/// assert_eq!(wave.len(), 55125);
/// assert_eq!(wave.samples().iter().map(|s| s.abs()).max(), Some(32767));
/// ```
#[derive(Debug, Clone)]
pub struct SongMixer {
    parts: Vec<Arc<Part>>,
    sampling_rate: u32,
    total_duration: f64,
    table: Arc<FrequencyTable>,
    wave: Option<Wave>,
    warnings: Vec<UnknownNote>,
}

impl SongMixer {
    pub fn new<I, P>(parts: I, sampling_rate: u32) -> Result<SongMixer, ValidationError>
    where
        I: IntoIterator<Item = P>,
        P: Into<Arc<Part>>,
    {
        if sampling_rate == 0 {
            return Err(ValidationError::InvalidSampleRate {
                rate: sampling_rate,
            });
        }
        let parts: Vec<Arc<Part>> = parts.into_iter().map(Into::into).collect();
        let total_duration = parts.iter().map(|p| p.end_time()).fold(0.0, f64::max);
        debug!(
            "mixing {} parts, {:.3} seconds at {} Hz",
            parts.len(),
            total_duration,
            sampling_rate
        );
        Ok(SongMixer {
            parts,
            sampling_rate,
            total_duration,
            table: Arc::new(FrequencyTable::standard()),
            wave: None,
            warnings: Vec::new(),
        })
    }

    /// Resolve note names through another table. Drops a cached wave.
    pub fn with_table(mut self, table: Arc<FrequencyTable>) -> Self {
        self.table = table;
        self.wave = None;
        self.warnings.clear();
        self
    }

    pub fn parts(&self) -> &[Arc<Part>] {
        &self.parts
    }

    pub fn sampling_rate(&self) -> u32 {
        self.sampling_rate
    }

    /// End of the latest event over all parts, in seconds.
    pub fn total_duration(&self) -> f64 {
        self.total_duration
    }

    pub fn table(&self) -> &FrequencyTable {
        &self.table
    }

    /// The wave from the last synthesis, if there was one.
    pub fn wave(&self) -> Option<&Wave> {
        self.wave.as_ref()
    }

    /// Notes skipped during the last synthesis.
    pub fn warnings(&self) -> &[UnknownNote] {
        &self.warnings
    }

    /// Render the song, or return the wave rendered before.
    pub fn synthesize(&mut self) -> &Wave {
        let wave = match self.wave.take() {
            Some(wave) => wave,
            None => self.render(),
        };
        self.wave.insert(wave)
    }

    /// Render the song again, replacing the cached wave.
    pub fn resynthesize(&mut self) -> &Wave {
        let wave = self.render();
        self.wave.insert(wave)
    }

    /// Play the song through sox.
    pub fn play(&mut self) -> io::Result<()> {
        let wave = self.synthesize();
        output::sox::play(wave)
    }

    /// Sum all parts without quantizing.
    pub fn mix(&self) -> Mix {
        let rate = self.sampling_rate as f64;
        let mut buffer = vec![0.0; (rate * self.total_duration) as usize];
        let mut warnings = Vec::new();
        for (index, part) in self.parts.iter().enumerate() {
            debug!(
                "part {}: {} events, volume {}, {:?}",
                index,
                part.events().len(),
                part.volume(),
                part.generator()
            );
            let mut renderer = PartRenderer {
                part: part.as_ref(),
                index,
                table: self.table.as_ref(),
                rate,
                warnings: &mut warnings,
            };
            renderer.render(&mut buffer);
        }
        Mix { buffer, warnings }
    }

    fn render(&mut self) -> Wave {
        let Mix { buffer, warnings } = self.mix();
        let samples = quantize_8bit(&buffer);
        info!(
            "synthesized {} samples ({:.2} seconds) at {} Hz",
            samples.len(),
            self.total_duration,
            self.sampling_rate
        );
        if !warnings.is_empty() {
            info!("skipped {} unknown notes", warnings.len());
        }
        self.warnings = warnings;
        Wave::new(samples, self.sampling_rate)
    }
}

struct PartRenderer<'a> {
    part: &'a Part,
    index: usize,
    table: &'a FrequencyTable,
    rate: f64,
    warnings: &'a mut Vec<UnknownNote>,
}

impl<'a> PartRenderer<'a> {
    fn render(&mut self, buffer: &mut [f64]) {
        let part = self.part;
        let gain = map_volume(part.volume());
        for (index, event) in part.events().iter().enumerate() {
            let start = ((self.rate * event.start_time) as usize).min(buffer.len());
            let end = ((self.rate * event.end_time()) as usize).min(buffer.len());
            if end <= start {
                continue;
            }
            let length = end - start;
            let time: Vec<f64> = (0..length)
                .map(|i| event.duration * i as f64 / length as f64)
                .collect();

            let frequencies;
            let voices = if part.generator().uses_label_input() {
                Voices::Labels(&event.notes)
            } else {
                frequencies = self.resolve(index, event);
                Voices::Frequencies(&frequencies)
            };
            if voices.is_empty() {
                trace!("{:7}: silent {:?}", start, event.notes);
                continue;
            }
            trace!("{:7}: play {:?} for {} samples", start, event.notes, length);

            let target = &mut buffer[start..end];
            for row in part.generator().generate(voices, &time) {
                for (out, sample) in target.iter_mut().zip(row) {
                    *out += sample * gain;
                }
            }
        }
    }

    /// Look up the frequencies of a chord, leaving out rests and unknown notes.
    fn resolve(&mut self, index: usize, event: &NoteEvent) -> Vec<f64> {
        let mut frequencies = Vec::with_capacity(event.notes.len());
        for note in &event.notes {
            match self.table.lookup(note) {
                Some(frequency) if frequency == 0.0 => {}
                Some(frequency) => frequencies.push(frequency),
                None => {
                    let unknown = UnknownNote {
                        part: self.index,
                        event: index,
                        note: note.clone(),
                    };
                    warn!("{}", unknown);
                    self.warnings.push(unknown);
                }
            }
        }
        frequencies
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{Drum, Noise, Square};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn square(notation: &str, bpm: f64) -> Part {
        Part::builder(Square::default())
            .bpm(bpm)
            .build_notation(notation)
            .unwrap()
    }

    #[test]
    fn volume_mapping() {
        assert!((map_volume(0.5) - 0.045).abs() < 1e-12);
        assert!(map_volume(0.3) < map_volume(0.7));
    }

    #[test]
    fn quantization_levels() {
        assert_eq!(
            quantize_8bit(&[0.25, 0.1, -0.05, -0.5]),
            vec![16512, 6450, -3354, -32767]
        );
        assert!(quantize_8bit(&[]).is_empty());

        let ramp: Vec<f64> = (-1000..=1000).map(|i| i as f64 / 1000.0).collect();
        let quantized = quantize_8bit(&ramp);
        let mut levels = quantized.clone();
        levels.sort();
        levels.dedup();
        assert_eq!(levels.len(), 255);
        for (x, q) in ramp.iter().zip(&quantized) {
            if *q != 0 {
                assert_eq!(x.signum(), (*q as f64).signum());
            }
        }
    }

    #[test]
    fn rejects_sampling_rate() {
        assert_eq!(
            SongMixer::new(vec![square("C4:1", 120.0)], 0).unwrap_err(),
            ValidationError::InvalidSampleRate { rate: 0 }
        );
    }

    #[test]
    fn empty_song() {
        let mut mixer = SongMixer::new(Vec::<Part>::new(), DEFAULT_SAMPLING_RATE).unwrap();
        assert_eq!(mixer.total_duration(), 0.0);
        assert!(mixer.wave().is_none());
        assert!(mixer.synthesize().is_empty());
        assert!(mixer.warnings().is_empty());
    }

    #[test]
    fn rests_are_silent() {
        let mut mixer = SongMixer::new(vec![square("R:4", 120.0)], 22050).unwrap();
        let wave = mixer.synthesize();
        assert_eq!(wave.len(), 44100);
        assert!(wave.samples().iter().all(|&s| s == 0));
    }

    #[test]
    fn unknown_notes() {
        let part = square("C4,Z9:1 Z9:1 r:1 z9,R:1", 120.0);
        let mut mixer = SongMixer::new(vec![part], 8000).unwrap();
        let wave = mixer.synthesize().clone();
        assert_eq!(
            mixer.warnings(),
            &[
                UnknownNote {
                    part: 0,
                    event: 0,
                    note: "Z9".to_string()
                },
                UnknownNote {
                    part: 0,
                    event: 1,
                    note: "Z9".to_string()
                },
                UnknownNote {
                    part: 0,
                    event: 3,
                    note: "z9".to_string()
                },
            ]
        );
        // the known note of the first chord still plays, everything after is silent
        assert!(wave.samples()[..4000].iter().any(|&s| s != 0));
        assert!(wave.samples()[4000..].iter().all(|&s| s == 0));
    }

    #[test]
    fn parts_overlap_additively() {
        let slow = Arc::new(square("C4:2", 60.0));
        let fast = Arc::new(square("E4:1 G4:1 BPM:240 C5:4", 120.0));

        let both = SongMixer::new(vec![slow.clone(), fast.clone()], 8000).unwrap();
        assert_eq!(both.total_duration(), 2.0);

        let only_slow = SongMixer::new(vec![slow], 8000).unwrap().mix();
        let only_fast = SongMixer::new(vec![fast], 8000).unwrap().mix();
        let mix = both.mix();
        assert_eq!(mix.buffer.len(), 16000);
        assert_eq!(only_slow.buffer.len(), 16000);
        for i in 0..16000 {
            let sum = only_slow.buffer[i] + only_fast.buffer[i];
            assert!((mix.buffer[i] - sum).abs() < 1e-12);
        }
    }

    #[test]
    fn events_land_at_their_samples() {
        // the first beat is silent, the second one is not
        let mut mixer = SongMixer::new(vec![square("R:1 A4:1", 120.0)], 1000).unwrap();
        let wave = mixer.synthesize();
        assert_eq!(wave.len(), 1000);
        assert!(wave.samples()[..500].iter().all(|&s| s == 0));
        assert_eq!(wave.samples()[500], 32767);
    }

    #[test]
    fn labels_skip_the_table() {
        let drums = Part::builder(Drum::with_rng(StdRng::seed_from_u64(1)))
            .build_notation("kick:1 snare:1 cowbell:1")
            .unwrap();
        let mut mixer = SongMixer::new(vec![drums], 8000).unwrap();
        let wave = mixer.synthesize();
        assert!(wave.samples().iter().any(|&s| s != 0));
        assert!(mixer.warnings().is_empty());
    }

    #[test]
    fn custom_table() {
        let table: FrequencyTable = vec![("beep", 1000.0)].into_iter().collect();
        let mut mixer = SongMixer::new(vec![square("BEEP:1 C4:1", 120.0)], 8000)
            .unwrap()
            .with_table(Arc::new(table));
        mixer.synthesize();
        assert_eq!(mixer.warnings().len(), 1);
        assert_eq!(mixer.warnings()[0].note, "C4");
    }

    #[test]
    fn synthesis_is_cached() {
        let noise = Part::builder(Noise::with_rng(StdRng::seed_from_u64(9)))
            .build_notation("C4:1")
            .unwrap();
        let mut mixer = SongMixer::new(vec![noise], 8000).unwrap();
        let first = mixer.synthesize().clone();
        assert_eq!(mixer.wave(), Some(&first));
        assert_eq!(mixer.synthesize(), &first);
        // forcing draws fresh noise
        assert_ne!(mixer.resynthesize(), &first);
    }

    #[test]
    fn parts_are_shared() {
        let part = Arc::new(square("C4:1 D4:1", 120.0));
        let mut a = SongMixer::new(vec![part.clone()], 8000).unwrap();
        let mut b = SongMixer::new(vec![part.clone(), part], 8000).unwrap();
        assert_eq!(a.total_duration(), b.total_duration());
        // the same part twice normalizes to the same wave
        assert_eq!(a.synthesize(), b.synthesize());
    }
}

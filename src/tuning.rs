// syn.8bit -- a text based chiptune synthesizer
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Mapping note names to frequencies.

use std::collections::HashMap;
use std::iter::FromIterator;

use crate::note::*;

/// Defines the tuning of an instrument by assinging a frequency to a certain note.
/// This defines the frequencies of all other notes at a standard tuning of 12 half-tones per octave.
///
/// # Examples
///
/// ```
/// use syn_8bit::note::*;
/// use syn_8bit::tuning::*;
/// assert_eq!(Tuning::default().frequency(Note::from_midi(57)), 220.0);
/// assert_eq!(Tuning::default().frequency(Note::from_midi(81)), 880.0);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Tuning {
    pub reference_note: Note,
    pub reference_frequency: f64,
}

impl Tuning {
    /// Return the frequency of a note relative to this tuning.
    pub fn frequency(&self, other: Note) -> f64 {
        let semitones = other.index() - self.reference_note.index();
        let octaves = semitones as f64 / 12.0;
        self.reference_frequency * 2.0f64.powf(octaves)
    }
}

/// Default concert tuning, where A4 corresponds to 440 Hz.
impl Default for Tuning {
    fn default() -> Self {
        Tuning {
            reference_note: Note::from_midi(69),
            reference_frequency: 440.0,
        }
    }
}

/// The note name that is always present in a table and denotes silence.
pub const REST: &str = "R";

/// Read-only dictionary from note names to frequencies in Hz.
///
/// Lookups ignore case. Every table contains the rest marker [`REST`],
/// which maps to 0 Hz.
///
/// # Examples
///
/// ```
/// use syn_8bit::tuning::FrequencyTable;
///
/// let table = FrequencyTable::standard();
/// assert_eq!(table.lookup("a4"), Some(440.0));
/// assert_eq!(table.lookup("r"), Some(0.0));
/// assert_eq!(table.lookup("Z9"), None);
///
/// let custom: FrequencyTable = vec![("beep", 1000.0)].into_iter().collect();
/// assert_eq!(custom.lookup("BEEP"), Some(1000.0));
/// assert_eq!(custom.lookup("A4"), None);
/// ```
#[derive(Debug, Clone)]
pub struct FrequencyTable {
    frequencies: HashMap<String, f64>,
}

impl FrequencyTable {
    /// A table containing nothing but the rest marker.
    pub fn empty() -> Self {
        let mut frequencies = HashMap::new();
        frequencies.insert(REST.to_string(), 0.0);
        FrequencyTable { frequencies }
    }

    /// Equal temperament frequencies for octaves 0 through 8 in the given tuning,
    /// spelled with sharps (`C#4`, `Csharp4`, `C♯4`), flats (`Db4`, `Dflat4`,
    /// `D♭4`) and naturals (`C4`).
    pub fn equal_temperament(tuning: Tuning) -> Self {
        let mut table = Self::empty();
        for (name, note) in spellings(0..=8) {
            table.insert(&name, tuning.frequency(note));
        }
        table
    }

    /// The default table in concert tuning.
    pub fn standard() -> Self {
        Self::equal_temperament(Tuning::default())
    }

    /// Add or replace an entry. The rest marker cannot be reassigned.
    pub fn insert(&mut self, name: &str, frequency: f64) {
        let key = name.to_uppercase();
        if key != REST {
            self.frequencies.insert(key, frequency);
        }
    }

    pub fn lookup(&self, name: &str) -> Option<f64> {
        self.frequencies.get(&name.to_uppercase()).copied()
    }

    /// Number of entries, including the rest marker.
    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }
}

impl Default for FrequencyTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl<S: AsRef<str>> FromIterator<(S, f64)> for FrequencyTable {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        let mut table = Self::empty();
        for (name, frequency) in iter {
            table.insert(name.as_ref(), frequency);
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 0.01
    }

    #[test]
    fn standard_pitches() {
        let table = FrequencyTable::standard();
        assert!(approx(table.lookup("C4").unwrap(), 261.63));
        assert!(approx(table.lookup("E4").unwrap(), 329.63));
        assert!(approx(table.lookup("G4").unwrap(), 392.00));
        assert!(approx(table.lookup("C0").unwrap(), 16.35));
        assert!(approx(table.lookup("B8").unwrap(), 7902.13));
    }

    #[test]
    fn case_insensitive_spellings() {
        let table = FrequencyTable::standard();
        assert_eq!(table.lookup("c#4"), table.lookup("Db4"));
        assert_eq!(table.lookup("DB4"), table.lookup("db4"));
        assert_eq!(table.lookup("e5"), table.lookup("E5"));
    }

    #[test]
    fn spelled_out_offsets() {
        let table = FrequencyTable::standard();
        let c_sharp = table.lookup("C#4");
        assert!(c_sharp.is_some());
        assert_eq!(table.lookup("Csharp4"), c_sharp);
        assert_eq!(table.lookup("csharp4"), c_sharp);
        assert_eq!(table.lookup("C♯4"), c_sharp);
        assert_eq!(table.lookup("Dflat4"), c_sharp);
        assert_eq!(table.lookup("D♭4"), c_sharp);
        assert_eq!(table.lookup("Cflat4"), table.lookup("B3"));
        assert_eq!(table.lookup("Cshrp4"), None);
    }

    #[test]
    fn rest_is_reserved() {
        let mut table = FrequencyTable::standard();
        table.insert("r", 440.0);
        assert_eq!(table.lookup("R"), Some(0.0));
    }

    #[test]
    fn outside_range() {
        let table = FrequencyTable::standard();
        assert_eq!(table.lookup("C9"), None);
        assert_eq!(table.lookup("BPM"), None);
        assert_eq!(table.lookup(""), None);
    }

    #[test]
    fn empty_table_has_rest() {
        let table = FrequencyTable::empty();
        assert_eq!(table.len(), 1);
        assert_eq!(table.lookup("R"), Some(0.0));
    }
}

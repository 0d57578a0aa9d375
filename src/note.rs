// syn.8bit -- a text based chiptune synthesizer
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Definitions of what a note is.

/// A "note" is just an index on the synthesizers keyboard.
/// This definition follows the MIDI standard where C4 corresponds to index 60.
///
/// Note indices range from 0 to 127, which covers every note the
/// default frequency table knows about (C0 up to B8).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Note(u8);

/// The name of a note in standard notation.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum NoteName {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
}

impl NoteName {
    /// All note names in the order they appear in an octave starting at C.
    pub const ALL: [NoteName; 7] = [
        NoteName::C,
        NoteName::D,
        NoteName::E,
        NoteName::F,
        NoteName::G,
        NoteName::A,
        NoteName::B,
    ];

    pub fn letter(self) -> char {
        match self {
            NoteName::A => 'A',
            NoteName::B => 'B',
            NoteName::C => 'C',
            NoteName::D => 'D',
            NoteName::E => 'E',
            NoteName::F => 'F',
            NoteName::G => 'G',
        }
    }
}

/// Any offset applied to a note in standard notation.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum NoteOffset {
    /// The note is a half-tone lower then indicated by its name.
    Flat,
    /// The note is left unchanged.
    Base,
    /// The note is a half-tone higher then indicated by its name.
    Sharp,
}

impl NoteOffset {
    pub const ALL: [NoteOffset; 3] = [NoteOffset::Flat, NoteOffset::Base, NoteOffset::Sharp];

    /// Every way of writing the offset in a note name, e.g. the `#` in `C#4`
    /// or the `sharp` in `Csharp4`. The first one is the short ASCII form.
    pub fn symbols(self) -> &'static [&'static str] {
        match self {
            NoteOffset::Flat => &["b", "flat", "♭"],
            NoteOffset::Base => &[""],
            NoteOffset::Sharp => &["#", "sharp", "♯"],
        }
    }
}

impl Note {
    /// Convert a note from standard notation to a MIDI note index.
    /// Note that different names may refer to the same note, e.g. a G♯ is the same as a A♭.
    /// Returns `None` if the note is not representable in the MIDI note system.
    ///
    /// # Examples
    ///
    /// ```
    /// use syn_8bit::note::*;
    ///
    /// assert_eq!(Note::try_named(NoteName::A, NoteOffset::Base, 4), Some(Note::from_midi(69)));
    /// assert_eq!(Note::try_named(NoteName::C, NoteOffset::Sharp, 6), Some(Note::from_midi(85)));
    /// assert_eq!(Note::try_named(NoteName::G, NoteOffset::Flat, 2), Some(Note::from_midi(42)));
    /// assert_eq!(Note::try_named(NoteName::C, NoteOffset::Flat, -1), None);
    /// ```
    pub fn try_named(name: NoteName, offset: NoteOffset, octave: i32) -> Option<Note> {
        let name_index = match name {
            NoteName::C => 0,
            NoteName::D => 2,
            NoteName::E => 4,
            NoteName::F => 5,
            NoteName::G => 7,
            NoteName::A => 9,
            NoteName::B => 11,
        };
        let offset_index = match offset {
            NoteOffset::Base => 0,
            NoteOffset::Flat => -1,
            NoteOffset::Sharp => 1,
        };
        // C4 is MIDI note number 60
        let normalize_index = 60 - 4 * 12;
        let note_index = octave
            .checked_mul(12)?
            .checked_add(name_index + offset_index + normalize_index)?;
        Note::try_from_midi(i64::from(note_index))
    }

    /// # Panics
    ///
    /// If `midi_note` is not a valid MIDI note index.
    pub fn from_midi(midi_note: u8) -> Note {
        assert!(midi_note < 128, "MIDI only has notes 0 - 127");
        Note(midi_note)
    }

    pub fn try_from_midi(midi_note: i64) -> Option<Note> {
        if midi_note >= 0 && midi_note < 128 {
            Some(Note(midi_note as u8))
        } else {
            None
        }
    }

    pub fn to_midi(self) -> u8 {
        self.0
    }

    /// Return the note index in a signed type, convenient for further calculations.
    pub fn index(self) -> i32 {
        self.0 as i32
    }
}

/// Every spelling of every note in the given octave range, e.g. `C4`,
/// `C#4`, `Csharp4` and `Db4`, paired with the note they denote.
/// Spellings that fall outside of the MIDI range are skipped.
pub fn spellings(octaves: std::ops::RangeInclusive<i32>) -> impl Iterator<Item = (String, Note)> {
    octaves.flat_map(|octave| {
        NoteName::ALL.iter().flat_map(move |&name| {
            NoteOffset::ALL
                .iter()
                .filter_map(move |&offset| {
                    Some((offset, Note::try_named(name, offset, octave)?))
                })
                .flat_map(move |(offset, note)| {
                    offset.symbols().iter().map(move |symbol| {
                        let spelling = format!("{}{}{}", name.letter(), symbol, octave);
                        (spelling, note)
                    })
                })
        })
    })
}

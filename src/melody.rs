//! A simple textual format for writing melodies.
//!
//! A melody is a whitespace separated list of entries of the form `labels:value`.
//! The labels are a comma separated chord of note names (or drum names), the value
//! is the number of beats the chord is held. The special entry `BPM:<tempo>`
//! changes the tempo for all following entries. Everything after a `#` up to
//! the end of the line is a comment.
//!
//! ```
//! use syn_8bit::melody::{parse_melody, Entry};
//!
//! let melody = parse_melody("C4:1 E4,E5:1  # a chord\n BPM:90 G4:2").unwrap();
//! assert_eq!(melody[1], Entry::notes(vec!["E4", "E5"], 1.0));
//! assert_eq!(melody[2], Entry::tempo(90.0));
//! ```

use snafu::Snafu;

/// The label marking an entry as tempo change.
pub const TEMPO: &str = "BPM";

/// One entry of a melody.
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    /// A chord held for a number of beats.
    Notes { notes: Vec<String>, beats: f64 },
    /// Change of the tempo in beats per minute, taking effect for all following entries.
    Tempo { bpm: f64 },
}

impl Entry {
    pub fn notes<S: Into<String>>(notes: impl IntoIterator<Item = S>, beats: f64) -> Self {
        Entry::Notes {
            notes: notes.into_iter().map(Into::into).collect(),
            beats,
        }
    }

    pub fn tempo(bpm: f64) -> Self {
        Entry::Tempo { bpm }
    }

    /// Interpret a `(labels, value)` pair, where a sole [`TEMPO`] label makes
    /// this a tempo change and anything else a chord.
    ///
    /// ```
    /// # use syn_8bit::melody::Entry;
    /// assert_eq!(Entry::pair(vec!["BPM".to_string()], 90.0), Entry::tempo(90.0));
    /// assert_eq!(Entry::pair(vec!["C4".to_string()], 1.0), Entry::notes(vec!["C4"], 1.0));
    /// ```
    pub fn pair(labels: Vec<String>, value: f64) -> Self {
        if labels.len() == 1 && labels[0] == TEMPO {
            Entry::Tempo { bpm: value }
        } else {
            Entry::Notes {
                notes: labels,
                beats: value,
            }
        }
    }
}

/// A melody entry that does not have the expected shape.
#[derive(Debug, Clone, PartialEq, Snafu)]
pub enum FormatError {
    #[snafu(display("melody[{}] must have exactly 2 fields, got {}", index, fields))]
    FieldCount { index: usize, fields: usize },
    #[snafu(display("melody[{}] contains an empty label", index))]
    EmptyLabel { index: usize },
    #[snafu(display("melody[{}] has a value {:?} that is not a number", index, text))]
    InvalidValue { index: usize, text: String },
}

impl FormatError {
    /// Index of the offending entry.
    pub fn index(&self) -> usize {
        match self {
            FormatError::FieldCount { index, .. } => *index,
            FormatError::EmptyLabel { index } => *index,
            FormatError::InvalidValue { index, .. } => *index,
        }
    }
}

pub fn parse_melody(input: &str) -> Result<Vec<Entry>, FormatError> {
    let mut p = Parser::new(input);
    p.parse_sequence()
}

struct Parser<'a> {
    input: &'a str,
    stream: Scan<'a>,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            stream: Scan::new(input),
        }
    }

    fn parse_sequence(&mut self) -> Result<Vec<Entry>, FormatError> {
        let mut entries = Vec::new();
        while let Some(word) = self.next_word() {
            entries.push(parse_entry(entries.len(), word)?);
        }
        Ok(entries)
    }

    /// The next run of characters up to whitespace or a comment.
    fn next_word(&mut self) -> Option<&'a str> {
        self.stream.skip_blank();
        let (start, _) = self.stream.current()?;
        while let Some((_, ch)) = self.stream.current() {
            if ch.is_whitespace() || ch == '#' {
                break;
            }
            self.stream.advance();
        }
        let end = self
            .stream
            .current()
            .map_or(self.input.len(), |(pos, _)| pos);
        Some(&self.input[start..end])
    }
}

fn parse_entry(index: usize, word: &str) -> Result<Entry, FormatError> {
    let fields: Vec<&str> = word.split(':').collect();
    if fields.len() != 2 {
        return Err(FormatError::FieldCount {
            index,
            fields: fields.len(),
        });
    }
    let labels: Vec<String> = fields[0].split(',').map(str::to_string).collect();
    if labels.iter().any(|label| label.is_empty()) {
        return Err(FormatError::EmptyLabel { index });
    }
    let value = fields[1]
        .parse::<f64>()
        .map_err(|_| FormatError::InvalidValue {
            index,
            text: fields[1].to_string(),
        })?;
    Ok(Entry::pair(labels, value))
}

struct Scan<'a> {
    stream: std::iter::Peekable<std::str::CharIndices<'a>>,
}

impl<'a> Scan<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            stream: input.char_indices().peekable(),
        }
    }

    fn current(&mut self) -> Option<(usize, char)> {
        self.stream.peek().cloned()
    }

    fn advance(&mut self) {
        self.stream.next();
    }

    /// Skip whitespace and comments.
    fn skip_blank(&mut self) {
        while let Some((_, ch)) = self.current() {
            if ch == '#' {
                while let Some((_, ch)) = self.current() {
                    if ch == '\n' {
                        break;
                    }
                    self.advance();
                }
            } else if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }
}

// syn.8bit -- a text based chiptune synthesizer
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Score files describing a whole song.
//!
//! A score is a sequence of parts. Each part starts with a header line
//! `part <generator> [key=value ...]`, followed by lines of melody notation
//! (see [`crate::melody`]). `#` starts a comment.
//!
//! ```text
//! part nes-square duty=0.25 volume=0.7 bpm=140
//! C4:1 E4:1 G4:1 C5:1
//! part drum
//! kick:1 hihat:1 snare:1 hihat:1
//! ```

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use snafu::Snafu;

use crate::generator::{Drum, NesSquare, Noise, Sine, Square, Triangle, WaveGenerator};
use crate::mixer::SongMixer;
use crate::song::{Part, PartError, ValidationError};

#[derive(Debug, Snafu)]
pub enum ScoreError {
    #[snafu(display("could not read {}: {}", path.display(), source))]
    ReadScore { path: PathBuf, source: io::Error },
    #[snafu(display("line {}: melody before the first part", line))]
    MelodyBeforePart { line: usize },
    #[snafu(display("line {}: unknown generator {:?}", line, name))]
    UnknownGenerator { line: usize, name: String },
    #[snafu(display("line {}: expected key=value, got {:?}", line, text))]
    MalformedOption { line: usize, text: String },
    #[snafu(display("line {}: {} does not support the option {:?}", line, generator, key))]
    UnknownOption {
        line: usize,
        generator: &'static str,
        key: String,
    },
    #[snafu(display("line {}: invalid value {:?} for {}", line, value, key))]
    InvalidOption {
        line: usize,
        key: String,
        value: String,
    },
    #[snafu(display("line {}: {}", line, source))]
    InvalidGenerator {
        line: usize,
        source: ValidationError,
    },
    #[snafu(display("part {} (line {}): {}", part, line, source))]
    InvalidPart {
        part: usize,
        line: usize,
        source: PartError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GeneratorKind {
    Square,
    Triangle,
    Sine,
    Noise,
    Drum,
    NesSquare,
}

impl GeneratorKind {
    fn from_name(name: &str) -> Option<GeneratorKind> {
        match name {
            "square" => Some(GeneratorKind::Square),
            "triangle" => Some(GeneratorKind::Triangle),
            "sine" => Some(GeneratorKind::Sine),
            "noise" => Some(GeneratorKind::Noise),
            "drum" => Some(GeneratorKind::Drum),
            "nes-square" => Some(GeneratorKind::NesSquare),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            GeneratorKind::Square => "square",
            GeneratorKind::Triangle => "triangle",
            GeneratorKind::Sine => "sine",
            GeneratorKind::Noise => "noise",
            GeneratorKind::Drum => "drum",
            GeneratorKind::NesSquare => "nes-square",
        }
    }

    fn supports(self, key: &str) -> bool {
        match key {
            "volume" | "bpm" => true,
            "duty" => matches!(self, GeneratorKind::Square | GeneratorKind::NesSquare),
            "cutoff" => self == GeneratorKind::NesSquare,
            "seed" => matches!(self, GeneratorKind::Noise | GeneratorKind::Drum),
            _ => false,
        }
    }
}

/// The settings from a `part` line.
#[derive(Debug)]
struct Header {
    line: usize,
    kind: GeneratorKind,
    volume: f64,
    bpm: f64,
    duty: Option<f64>,
    cutoff: Option<f64>,
    seed: Option<u64>,
}

impl Header {
    fn parse<'a>(
        line: usize,
        mut words: impl Iterator<Item = &'a str>,
    ) -> Result<Header, ScoreError> {
        let name = words.next().unwrap_or("");
        let kind = GeneratorKind::from_name(name).ok_or_else(|| ScoreError::UnknownGenerator {
            line,
            name: name.to_string(),
        })?;
        let mut header = Header {
            line,
            kind,
            volume: Part::DEFAULT_VOLUME,
            bpm: Part::DEFAULT_BPM,
            duty: None,
            cutoff: None,
            seed: None,
        };
        for word in words {
            let mut pair = word.splitn(2, '=');
            let (key, value) = match (pair.next(), pair.next()) {
                (Some(key), Some(value)) => (key, value),
                _ => {
                    return Err(ScoreError::MalformedOption {
                        line,
                        text: word.to_string(),
                    })
                }
            };
            if !kind.supports(key) {
                return Err(ScoreError::UnknownOption {
                    line,
                    generator: kind.name(),
                    key: key.to_string(),
                });
            }
            let invalid = || ScoreError::InvalidOption {
                line,
                key: key.to_string(),
                value: value.to_string(),
            };
            match key {
                "seed" => header.seed = Some(value.parse().map_err(|_| invalid())?),
                _ => {
                    let number: f64 = value.parse().map_err(|_| invalid())?;
                    match key {
                        "volume" => header.volume = number,
                        "bpm" => header.bpm = number,
                        "duty" => header.duty = Some(number),
                        _ => header.cutoff = Some(number),
                    }
                }
            }
        }
        Ok(header)
    }

    fn generator(&self) -> Result<Arc<dyn WaveGenerator>, ValidationError> {
        let rng = || self.seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
        let generator: Arc<dyn WaveGenerator> = match self.kind {
            GeneratorKind::Square => Arc::new(match self.duty {
                Some(duty) => Square::new(duty)?,
                None => Square::default(),
            }),
            GeneratorKind::Triangle => Arc::new(Triangle),
            GeneratorKind::Sine => Arc::new(Sine),
            GeneratorKind::Noise => Arc::new(Noise::with_rng(rng())),
            GeneratorKind::Drum => Arc::new(Drum::with_rng(rng())),
            GeneratorKind::NesSquare => {
                let mut square = match self.duty {
                    Some(duty) => NesSquare::new(duty)?,
                    None => NesSquare::default(),
                };
                if let Some(cutoff) = self.cutoff {
                    square = square.with_cutoff(cutoff);
                }
                Arc::new(square)
            }
        };
        Ok(generator)
    }
}

/// All parts of a song.
#[derive(Debug, Clone)]
pub struct Score {
    parts: Vec<Part>,
}

impl Score {
    pub fn parse(input: &str) -> Result<Score, ScoreError> {
        let mut sections: Vec<(Header, String)> = Vec::new();
        for (index, raw) in input.lines().enumerate() {
            let line = index + 1;
            let content = raw.split('#').next().unwrap_or("").trim();
            if content.is_empty() {
                continue;
            }
            let mut words = content.split_whitespace();
            if words.next() == Some("part") {
                sections.push((Header::parse(line, words)?, String::new()));
            } else {
                match sections.last_mut() {
                    Some((_, melody)) => {
                        melody.push_str(content);
                        melody.push('\n');
                    }
                    None => return Err(ScoreError::MelodyBeforePart { line }),
                }
            }
        }

        let mut parts = Vec::with_capacity(sections.len());
        for (index, (header, melody)) in sections.into_iter().enumerate() {
            let generator = header
                .generator()
                .map_err(|source| ScoreError::InvalidGenerator {
                    line: header.line,
                    source,
                })?;
            let part = Part::from_notation(&melody, header.volume, generator, header.bpm)
                .map_err(|source| ScoreError::InvalidPart {
                    part: index + 1,
                    line: header.line,
                    source,
                })?;
            debug!(
                "part {} on line {}: {} with {} events",
                index + 1,
                header.line,
                header.kind.name(),
                part.events().len()
            );
            parts.push(part);
        }
        info!("score with {} parts", parts.len());
        Ok(Score { parts })
    }

    pub fn load(path: &Path) -> Result<Score, ScoreError> {
        let input = std::fs::read_to_string(path).map_err(|source| ScoreError::ReadScore {
            path: path.to_path_buf(),
            source,
        })?;
        Score::parse(&input)
    }

    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    pub fn into_mixer(self, sampling_rate: u32) -> Result<SongMixer, ValidationError> {
        SongMixer::new(self.parts, sampling_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::melody::FormatError;

    #[test]
    fn parts_and_options() {
        let score = Score::parse(
            r"
            # intro
            part nes-square duty=0.25 volume=0.7 bpm=60
            C4:1 E4:1   # arpeggio
            G4:2

            part drum seed=3
            kick:1 snare:1
            part square
            ",
        )
        .unwrap();
        let parts = score.parts();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].volume(), 0.7);
        assert_eq!(parts[0].events().len(), 3);
        assert_eq!(parts[0].end_time(), 4.0);
        assert!(parts[1].generator().uses_label_input());
        assert_eq!(parts[1].bpm(), Part::DEFAULT_BPM);
        assert!(parts[2].events().is_empty());

        let mixer = score.into_mixer(8000).unwrap();
        assert_eq!(mixer.total_duration(), 4.0);
    }

    #[test]
    fn cutoff_option() {
        let score = Score::parse("part nes-square cutoff=500\nC4:1").unwrap();
        let generator = format!("{:?}", score.parts()[0].generator());
        assert!(generator.contains("cutoff: 500.0"), "{}", generator);
        assert!(matches!(
            Score::parse("part square cutoff=500"),
            Err(ScoreError::UnknownOption { generator: "square", ref key, .. }) if key == "cutoff"
        ));
        assert!(matches!(
            Score::parse("part nes-square cutoff=low"),
            Err(ScoreError::InvalidOption { ref key, .. }) if key == "cutoff"
        ));
    }

    #[test]
    fn empty_score() {
        assert!(Score::parse("").unwrap().parts().is_empty());
        assert!(Score::parse("# nothing\n\n").unwrap().parts().is_empty());
    }

    #[test]
    fn melody_needs_a_part() {
        assert!(matches!(
            Score::parse("\nC4:1\npart square\n"),
            Err(ScoreError::MelodyBeforePart { line: 2 })
        ));
    }

    #[test]
    fn header_errors() {
        assert!(matches!(
            Score::parse("part organ"),
            Err(ScoreError::UnknownGenerator { line: 1, ref name }) if name == "organ"
        ));
        assert!(matches!(
            Score::parse("part"),
            Err(ScoreError::UnknownGenerator { line: 1, .. })
        ));
        assert!(matches!(
            Score::parse("part square volume"),
            Err(ScoreError::MalformedOption { line: 1, .. })
        ));
        assert!(matches!(
            Score::parse("part sine duty=0.5"),
            Err(ScoreError::UnknownOption { generator: "sine", .. })
        ));
        assert!(matches!(
            Score::parse("part square bpm=fast"),
            Err(ScoreError::InvalidOption { ref key, .. }) if key == "bpm"
        ));
        assert!(matches!(
            Score::parse("part noise seed=-1"),
            Err(ScoreError::InvalidOption { .. })
        ));
    }

    #[test]
    fn invalid_duty() {
        let err = Score::parse("part square\nC4:1\npart nes-square duty=0.3").unwrap_err();
        assert!(matches!(
            err,
            ScoreError::InvalidGenerator {
                line: 3,
                source: ValidationError::InvalidDuty { .. }
            }
        ));
    }

    #[test]
    fn invalid_melody() {
        let err = Score::parse("part square\nC4:1\n\npart triangle volume=0.2\nC4:1 D4\n")
            .unwrap_err();
        match err {
            ScoreError::InvalidPart { part, line, source } => {
                assert_eq!(part, 2);
                assert_eq!(line, 4);
                assert_eq!(
                    source,
                    PartError::from(FormatError::FieldCount {
                        index: 1,
                        fields: 1
                    })
                );
            }
            other => panic!("unexpected error {}", other),
        }
        let err = Score::parse("part square volume=-1\nC4:1").unwrap_err();
        assert_eq!(
            err.to_string(),
            "part 1 (line 1): volume must be >= 0, got -1"
        );
    }

    #[test]
    fn missing_file() {
        let err = Score::load(Path::new("/nonexistent/song.score")).unwrap_err();
        assert!(matches!(err, ScoreError::ReadScore { .. }));
    }
}

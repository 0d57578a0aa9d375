//! A short tune with lead, bass and drums, built in code.
//!
//! Plays through sox, or writes the file given as first argument.

use std::io;
use std::path::PathBuf;

use syn_8bit::generator::{Drum, NesSquare, Triangle};
use syn_8bit::mixer::{SongMixer, DEFAULT_SAMPLING_RATE};
use syn_8bit::play;
use syn_8bit::song::{Part, PartError};

fn to_io(err: PartError) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, err)
}

fn main() -> io::Result<()> {
    play::init_logger(1);

    let lead = Part::builder(NesSquare::new(0.25).map_err(|e| to_io(e.into()))?)
        .volume(0.6)
        .bpm(140.0)
        .build_notation(
            "E5:0.5 E5:0.5 R:0.5 E5:0.5 R:0.5 C5:0.5 E5:1 G5:1 R:1 G4:1 R:1
             BPM:120 C5,E5:2",
        )
        .map_err(to_io)?;
    let bass = Part::builder(Triangle)
        .volume(0.8)
        .bpm(140.0)
        .build_notation("C3:1 C3:1 G2:1 G2:1 C3:1 G2:1 C3:2 BPM:120 C2:2")
        .map_err(to_io)?;
    let drums = Part::builder(Drum::new())
        .volume(0.4)
        .bpm(140.0)
        .build_notation("kick,hihat:1 hihat:1 snare:1 hihat:1 kick:1 hihat:1 snare:2 BPM:120 kick:2")
        .map_err(to_io)?;

    let mut mixer = SongMixer::new(vec![lead, bass, drums], DEFAULT_SAMPLING_RATE)
        .map_err(|e| to_io(e.into()))?;
    let outfile = std::env::args_os().nth(1).map(PathBuf::from);
    play::render(&mut mixer, outfile.as_deref())
}

// syn.8bit -- a text based chiptune synthesizer
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Command line front-end rendering score files.

use std::io;
use std::io::Write;
use std::path::{Path, PathBuf};

use log::info;
use structopt::StructOpt;

use crate::mixer::{SongMixer, DEFAULT_SAMPLING_RATE};
use crate::output;
use crate::score::Score;

#[derive(Debug, StructOpt)]
#[structopt(name = "syn8bit", about = "Rendering scores as 8 bit music")]
pub struct Opt {
    #[structopt(short = "v", long = "verbose", parse(from_occurrences))]
    verbose: usize,

    /// Samples per second of the rendered song.
    #[structopt(short, long, default_value = "22050")]
    rate: u32,

    /// Output file (WAV, or any sox-supported format). Music is played directly if not given.
    #[structopt(short, long, parse(from_os_str))]
    output: Option<PathBuf>,

    /// Print the scheduled events of every part.
    #[structopt(long)]
    dump_events: bool,

    /// The score to render.
    #[structopt(parse(from_os_str))]
    score: PathBuf,
}

fn to_io<E: std::error::Error + Send + Sync + 'static>(err: E) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, err)
}

/// Set up logging according to the verbosity given on the command line.
pub fn init_logger(verbose: usize) {
    let level = match verbose {
        0 => log::Level::Info,
        1 => log::Level::Debug,
        _ => log::Level::Trace,
    };
    if let Err(err) = simple_logger::init_with_level(level) {
        eprintln!("logging is unavailable: {}", err);
    }
}

pub fn main() -> io::Result<()> {
    let opt = Opt::from_args();
    init_logger(opt.verbose);
    run(&opt)
}

pub fn run(opt: &Opt) -> io::Result<()> {
    if opt.rate != DEFAULT_SAMPLING_RATE {
        info!("rendering at {} Hz", opt.rate);
    }
    let score = Score::load(&opt.score).map_err(to_io)?;
    if opt.dump_events {
        dump_events(&score, &mut io::stdout().lock())?;
    }

    let mut mixer = score.into_mixer(opt.rate).map_err(to_io)?;
    render(&mut mixer, opt.output.as_deref())
}

/// Synthesize and either save or play the song.
///
/// Skipped notes are reported by the mixer while it renders.
pub fn render(mixer: &mut SongMixer, outfile: Option<&Path>) -> io::Result<()> {
    let wave = mixer.synthesize();
    match outfile {
        Some(path) => output::save(wave, path),
        None => output::sox::play(wave),
    }
}

fn dump_events(score: &Score, out: &mut dyn Write) -> io::Result<()> {
    for (index, part) in score.parts().iter().enumerate() {
        writeln!(
            out,
            "part {} ({:?}, volume {}, {} beats)",
            index + 1,
            part.generator(),
            part.volume(),
            part.total_beat()
        )?;
        for event in part.events() {
            writeln!(
                out,
                "  {:8.3}s +{:.3}s {}",
                event.start_time,
                event.duration,
                event.notes.join(",")
            )?;
        }
    }
    Ok(())
}

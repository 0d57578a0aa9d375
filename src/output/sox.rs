// syn.8bit -- a text based chiptune synthesizer
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Easy interface for getting sound to play using a sox subprocess.

use std::io;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use log::{debug, error, warn};

use crate::wave::Wave;

#[derive(Debug, Clone, Copy)]
pub enum SoxTarget<'a> {
    Play,
    /// Any file format supported by sox, chosen by extension.
    File(&'a Path),
}

/// Paths of the `play` and `sox` executables.
fn binaries() -> (PathBuf, PathBuf) {
    // For properly recording the sox dependency on nix:
    if let Some(sox_bin) = option_env!("NIX_SOX_BIN") {
        debug!("using sox from nix store {}", sox_bin);
        let play = Path::new(sox_bin).join("play");
        let sox = Path::new(sox_bin).join("sox");
        (play, sox)
    } else {
        ("play".into(), "sox".into())
    }
}

/// Hand a finished wave to sox.
///
/// When `play` is not installed, a warning is logged and the wave is
/// silently dropped. Writing a file without `sox` is an error, as is any
/// other failure.
pub fn with_sox(wave: &Wave, target: SoxTarget) -> io::Result<()> {
    let (play, sox) = binaries();
    run_sox(wave, target, &play, &sox)
}

fn run_sox(wave: &Wave, target: SoxTarget, play: &Path, sox: &Path) -> io::Result<()> {
    let sample_rate_str = format!("{}", wave.sample_rate());
    let input_args = &[
        "-R", // make the output reproducible
        "--channels",
        "1",
        "--rate",
        &sample_rate_str,
        "--type",
        "s16",
        "--endian",
        "little",
        "/dev/stdin",
    ];

    let spawned = match target {
        SoxTarget::Play => Command::new(play)
            .args(input_args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn(),
        SoxTarget::File(outfile) => Command::new(sox)
            .args(input_args)
            .arg(outfile)
            .stdin(Stdio::piped())
            .spawn(),
    };
    let mut player = match (spawned, target) {
        (Ok(player), _) => player,
        (Err(err), SoxTarget::Play) if err.kind() == io::ErrorKind::NotFound => {
            warn!("no audio backend available, sox is not installed ({})", err);
            return Ok(());
        }
        (Err(err), SoxTarget::File(outfile)) if err.kind() == io::ErrorKind::NotFound => {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("sox is required to write {} ({})", outfile.display(), err),
            ));
        }
        (Err(err), _) => return Err(err),
    };

    let mut audio_stream = player
        .stdin
        .take()
        .ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "sox has no input stream"))?;

    let status = audio_stream
        .write_all(&wave.to_le_bytes())
        .and_then(|_| audio_stream.flush());
    if let Err(err) = &status {
        error!("Failed to write audio to sox stream: {}", err);
    }

    // sox exits once the input stream is closed
    drop(audio_stream);
    player.wait()?;
    status
}

/// Play a wave on the default speakers.
pub fn play(wave: &Wave) -> io::Result<()> {
    with_sox(wave, SoxTarget::Play)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn missing() -> PathBuf {
        PathBuf::from("/nonexistent/syn8bit/sox")
    }

    #[test]
    fn playback_without_sox_is_skipped() {
        let wave = Wave::new(vec![0, 100, -100], 8000);
        assert!(run_sox(&wave, SoxTarget::Play, &missing(), &missing()).is_ok());
    }

    #[test]
    fn file_without_sox_fails() {
        let wave = Wave::new(vec![0, 100, -100], 8000);
        let path = std::env::temp_dir().join(format!("syn8bit-sox-{}.ogg", std::process::id()));
        let err = run_sox(&wave, SoxTarget::File(&path), &missing(), &missing()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert!(err.to_string().contains("sox is required"));
        assert!(!path.exists());
    }
}

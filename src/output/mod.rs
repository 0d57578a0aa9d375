//! Getting finished waves out of the program.

pub mod sox;

use std::io;
use std::path::Path;

use log::info;

use crate::wave::Wave;

/// Store a wave in a file. WAV files are written directly, every other
/// format is converted by sox and fails when sox is not installed.
pub fn save(wave: &Wave, path: &Path) -> io::Result<()> {
    let is_wav = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| ext.eq_ignore_ascii_case("wav"));
    info!("writing {} samples to {}", wave.len(), path.display());
    if is_wav {
        wave.write_wav(path).map_err(|err| match err {
            hound::Error::IoError(err) => err,
            other => io::Error::new(io::ErrorKind::Other, other.to_string()),
        })
    } else {
        sox::with_sox(wave, sox::SoxTarget::File(path))
    }
}

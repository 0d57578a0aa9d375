//! Every percussion sound and the noise channel, one after another.

use std::io;
use std::sync::Arc;

use syn_8bit::generator::{Drum, Noise};
use syn_8bit::mixer::SongMixer;
use syn_8bit::play;
use syn_8bit::song::{Part, PartBuilder};

fn main() -> io::Result<()> {
    play::init_logger(2);

    let drum = Arc::new(Drum::new());
    let fail = |err| io::Error::new(io::ErrorKind::InvalidInput, err);
    let beat = PartBuilder::shared(drum.clone())
        .bpm(100.0)
        .build_notation("kick:1 snare:1 hihat:0.5 hihat:0.5 kick,snare:1 R:2")
        .map_err(fail)?;
    // the same drum kit again, twice as fast
    let fill = PartBuilder::shared(drum)
        .bpm(200.0)
        .build_notation("R:8 kick:1 kick:1 snare:1 hihat:1")
        .map_err(fail)?;
    let noise = Part::builder(Noise::new())
        .volume(0.3)
        .build_notation("R:6 C4:1 C4,C5:1")
        .map_err(fail)?;

    let mut mixer = SongMixer::new(vec![beat, fill, noise], 22050)
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err))?;
    play::render(&mut mixer, None)
}

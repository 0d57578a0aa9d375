// syn.8bit -- a text based chiptune synthesizer
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! `syn8bit` renders score files to 8 bit music.

use std::io;

fn main() -> io::Result<()> {
    syn_8bit::play::main()
}

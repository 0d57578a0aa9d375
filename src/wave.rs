// syn.8bit -- a text based chiptune synthesizer
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Finished, quantized audio.

use std::path::Path;

/// Mono 16 bit samples together with the rate they are meant to be played at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wave {
    samples: Vec<i16>,
    sample_rate: u32,
}

impl Wave {
    pub fn new(samples: Vec<i16>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Length in seconds.
    pub fn duration(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Number of bytes needed for representing the wave as raw samples.
    pub fn byte_len(&self) -> usize {
        self.samples.len() * std::mem::size_of::<i16>()
    }

    /// Copy the samples to bytes in little endian order.
    ///
    /// Returns the number of samples that were actually copied.
    /// Might be less than the number of samples if the output buffer was not large enough.
    pub fn copy_bytes_to(&self, bytes: &mut [u8]) -> usize {
        let mut processed = 0;
        for (sample, target) in self.samples.iter().zip(bytes.chunks_exact_mut(2)) {
            target.copy_from_slice(&sample.to_le_bytes());
            processed += 1;
        }
        processed
    }

    /// The raw samples as signed 16 bit little endian bytes.
    ///
    /// ```
    /// use syn_8bit::wave::Wave;
    /// let wave = Wave::new(vec![1, -2], 22050);
    /// assert_eq!(wave.to_le_bytes(), vec![1, 0, 0xfe, 0xff]);
    /// ```
    pub fn to_le_bytes(&self) -> Vec<u8> {
        let mut bytes = vec![0u8; self.byte_len()];
        self.copy_bytes_to(&mut bytes);
        bytes
    }

    /// Write a mono 16 bit PCM WAV file.
    pub fn write_wav<P: AsRef<Path>>(&self, path: P) -> Result<(), hound::Error> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec)?;
        for &sample in &self.samples {
            writer.write_sample(sample)?;
        }
        writer.finalize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration() {
        let wave = Wave::new(vec![0; 11025], 22050);
        assert_eq!(wave.duration(), 0.5);
        assert_eq!(wave.len(), 11025);
        assert!(Wave::new(vec![], 22050).is_empty());
    }

    #[test]
    fn short_byte_buffer() {
        let wave = Wave::new(vec![1, 2, 3], 8000);
        let mut bytes = [0u8; 5];
        assert_eq!(wave.copy_bytes_to(&mut bytes), 2);
        assert_eq!(bytes, [1, 0, 2, 0, 0]);
    }

    #[test]
    fn wav_file() {
        let path = std::env::temp_dir().join(format!("syn8bit-wave-{}.wav", std::process::id()));
        let wave = Wave::new(vec![0, 32767, -32767, 258], 11025);
        wave.write_wav(&path).unwrap();

        let mut reader = hound::WavReader::open(&path).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, 11025);
        assert_eq!(spec.bits_per_sample, 16);
        let samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(samples, wave.samples());
        std::fs::remove_file(&path).unwrap();
    }
}

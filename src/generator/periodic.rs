// syn.8bit -- a text based chiptune synthesizer
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

use std::f64::consts::PI;

use super::{per_frequency, Phase, Voices, WaveGenerator};
use crate::song::ValidationError;

/// Square wave that is high for the `duty` fraction of every period.
///
/// ```
/// use syn_8bit::generator::{Square, Voices, WaveGenerator};
///
/// let square = Square::new(0.25).unwrap();
/// let time: Vec<f64> = (0..8).map(|i| i as f64 / 8.0).collect();
/// let rows = square.generate(Voices::Frequencies(&[1.0]), &time);
/// assert_eq!(rows[0], vec![1.0, 1.0, -1.0, -1.0, -1.0, -1.0, -1.0, -1.0]);
///
/// assert!(Square::new(0.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Square {
    duty: f64,
}

impl Square {
    pub fn new(duty: f64) -> Result<Square, ValidationError> {
        if duty > 0.0 && duty <= 1.0 {
            Ok(Square { duty })
        } else {
            Err(ValidationError::InvalidDuty {
                duty,
                expected: "in (0, 1]",
            })
        }
    }

    pub fn duty(&self) -> f64 {
        self.duty
    }

    pub fn sample(&self, frequency: f64, time: f64) -> f64 {
        if Phase::at(frequency, time).offset() < self.duty {
            1.0
        } else {
            -1.0
        }
    }
}

impl Default for Square {
    fn default() -> Self {
        Square { duty: 0.5 }
    }
}

impl WaveGenerator for Square {
    fn generate(&self, voices: Voices, time: &[f64]) -> Vec<Vec<f64>> {
        per_frequency(voices, time, |f, t| self.sample(f, t))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Sine;

impl WaveGenerator for Sine {
    fn generate(&self, voices: Voices, time: &[f64]) -> Vec<Vec<f64>> {
        per_frequency(voices, time, |f, t| {
            (2.0 * PI * Phase::at(f, t).offset()).sin()
        })
    }
}

/// Triangle wave folded from the phase, starting at zero and rising to its
/// peak a quarter period in.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Triangle;

impl Triangle {
    pub fn sample(&self, frequency: f64, time: f64) -> f64 {
        let offset = Phase::at(frequency, time).offset();
        if offset < 0.25 {
            4.0 * offset
        } else if offset < 0.75 {
            2.0 - 4.0 * offset
        } else {
            4.0 * offset - 4.0
        }
    }
}

impl WaveGenerator for Triangle {
    fn generate(&self, voices: Voices, time: &[f64]) -> Vec<Vec<f64>> {
        per_frequency(voices, time, |f, t| self.sample(f, t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn axis(n: usize, rate: f64) -> Vec<f64> {
        (0..n).map(|i| i as f64 / rate).collect()
    }

    #[test]
    fn square_duty() {
        let time = axis(1000, 1000.0);
        for &duty in &[0.125, 0.5, 0.75] {
            let rows = Square::new(duty)
                .unwrap()
                .generate(Voices::Frequencies(&[10.0]), &time);
            let high = rows[0].iter().filter(|&&x| x == 1.0).count();
            assert!((high as f64 / 1000.0 - duty).abs() < 0.01);
            assert!(rows[0].iter().all(|&x| x == 1.0 || x == -1.0));
        }
        let always_high = Square::new(1.0).unwrap();
        let rows = always_high.generate(Voices::Frequencies(&[3.0]), &time);
        assert!(rows[0].iter().all(|&x| x == 1.0));
    }

    #[test]
    fn square_rejects_duty() {
        assert!(Square::new(-0.5).is_err());
        assert!(Square::new(1.5).is_err());
        assert!(Square::new(f64::NAN).is_err());
        assert_eq!(
            Square::new(0.0),
            Err(ValidationError::InvalidDuty {
                duty: 0.0,
                expected: "in (0, 1]"
            })
        );
    }

    #[test]
    fn matrix_shape() {
        let time = axis(7, 100.0);
        let rows = Sine.generate(Voices::Frequencies(&[100.0, 200.0, 300.0]), &time);
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|row| row.len() == 7));

        let single = Triangle.generate(Voices::Frequencies(&[440.0]), &[0.0]);
        assert_eq!(single, vec![vec![0.0]]);
    }

    #[test]
    fn sine_values() {
        let time = axis(4, 4.0);
        let rows = Sine.generate(Voices::Frequencies(&[1.0]), &time);
        let expected = [0.0, 1.0, 0.0, -1.0];
        for (x, e) in rows[0].iter().zip(&expected) {
            assert!((x - e).abs() < 1e-12);
        }
    }

    #[test]
    fn triangle_is_folded_sine() {
        let time = axis(500, 8000.0);
        let rows = Triangle.generate(Voices::Frequencies(&[123.0]), &time);
        for (x, t) in rows[0].iter().zip(&time) {
            let folded = 2.0 / PI * (2.0 * PI * 123.0 * t).sin().asin();
            assert!((x - folded).abs() < 1e-6);
        }
    }

    #[test]
    fn labels_are_silent() {
        let labels = vec!["kick".to_string()];
        let rows = Square::default().generate(Voices::Labels(&labels), &axis(5, 10.0));
        assert_eq!(rows, vec![vec![0.0; 5]]);
    }
}

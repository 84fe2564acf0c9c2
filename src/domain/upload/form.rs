// SPDX-License-Identifier: GPL-3.0-or-later
// src/domain/upload/form.rs
//
// Crop form: integer x / y / size fields mirrored from and applied to the
// engine, plus the bounds check that gates submission.

use std::fmt;

use crate::domain::resizer::{Resizer, Square};
use crate::error::{ResizerError, ResizerResult};

/// Values of the crop form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResizeForm {
    pub x: i64,
    pub y: i64,
    pub size: i64,
}

impl ResizeForm {
    pub fn new(x: i64, y: i64, size: i64) -> Self {
        Self { x, y, size }
    }

    /// Mirror the engine's square, rounded to whole pixels.
    pub fn from_constraint(square: &Square) -> Self {
        Self {
            x: square.x.round() as i64,
            y: square.y.round() as i64,
            size: square.side.round() as i64,
        }
    }

    /// Parse the three text fields.
    pub fn parse(x: &str, y: &str, size: &str) -> ResizerResult<Self> {
        let field = |value: &str| {
            value
                .trim()
                .parse::<i64>()
                .map_err(|_| ResizerError::InvalidRegion(format!("{x:?}, {y:?}, {size:?}")))
        };
        Ok(Self::new(field(x)?, field(y)?, field(size)?))
    }

    /// Whether the square has area and fits a `width x height` image.
    pub fn is_valid(&self, width: u32, height: u32) -> bool {
        let fits = |start: i64, limit: u32| {
            start >= 0
                && start
                    .checked_add(self.size)
                    .is_some_and(|end| end <= i64::from(limit))
        };

        self.size > 0 && fits(self.x, width) && fits(self.y, height)
    }

    pub fn validate(&self, width: u32, height: u32) -> ResizerResult<()> {
        if self.is_valid(width, height) {
            Ok(())
        } else {
            Err(ResizerError::InvalidRegion(format!(
                "{self} on a {width}x{height} image"
            )))
        }
    }

    /// Push the form values into the engine.
    pub fn apply(&self, resizer: &mut Resizer) -> ResizerResult<()> {
        resizer.set_constraint(
            Some(self.x as f64),
            Some(self.y as f64),
            Some(self.size as f64),
        )
    }
}

impl fmt::Display for ResizeForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}+{}+{}", self.size, self.size, self.x, self.y)
    }
}

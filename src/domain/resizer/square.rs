// SPDX-License-Identifier: GPL-3.0-or-later
// src/domain/resizer/square.rs
//
// Crop square and pointer coordinate value types.

use std::fmt;

/// Square crop selection in image pixel space.
///
/// `(x, y)` is the top-left corner. No bounds are enforced here: the form
/// driving the engine decides what is acceptable.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Square {
    pub x: f64,
    pub y: f64,
    pub side: f64,
}

impl Square {
    pub fn new(x: f64, y: f64, side: f64) -> Self {
        Self { x, y, side }
    }

    /// Centred square whose side is `ratio` of the shorter image side.
    pub fn centered(width: u32, height: u32, ratio: f64) -> Self {
        let (width, height) = (f64::from(width), f64::from(height));
        let side = (width * ratio).min(height * ratio);
        Self {
            x: (width - side) / 2.0,
            y: (height - side) / 2.0,
            side,
        }
    }

    /// Centre of the square.
    pub fn center(&self) -> Coordinate {
        Coordinate::new(self.x + self.side / 2.0, self.y + self.side / 2.0)
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}+{}+{}", self.side, self.side, self.x, self.y)
    }
}

/// Pointer position in screen space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
}

impl Coordinate {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

// SPDX-License-Identifier: GPL-3.0-or-later
// src/domain/resizer/drag.rs
//
// Drag session: pointer anchor plus the document listeners it holds.

use super::square::Coordinate;
use crate::host::{DragSubscription, InputSurface};

/// State alive between pointer-down and pointer-up.
///
/// Dropping the session releases its move/up listeners, whichever way the
/// gesture ends.
#[derive(Debug)]
pub struct DragSession {
    anchor: Coordinate,
    _subscription: DragSubscription,
}

impl DragSession {
    pub fn start(input: &InputSurface, x: f64, y: f64) -> Self {
        Self {
            anchor: Coordinate::new(x, y),
            _subscription: input.subscribe(),
        }
    }

    pub fn anchor(&self) -> Coordinate {
        self.anchor
    }

    /// Move the anchor to `(x, y)` and return `previous - current`.
    ///
    /// Adding this delta to the crop square pans the image under the fixed
    /// frame opposite to the pointer.
    pub fn advance(&mut self, x: f64, y: f64) -> (f64, f64) {
        let delta = (self.anchor.x - x, self.anchor.y - y);
        self.anchor = Coordinate::new(x, y);
        delta
    }
}

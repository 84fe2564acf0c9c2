// SPDX-License-Identifier: GPL-3.0-or-later
// src/render/mod.rs
//
// Software rendering used by the crop preview.

pub mod canvas;
pub mod text;

pub use canvas::Canvas;

// SPDX-License-Identifier: GPL-3.0-or-later
// src/domain/mod.rs
//
// Domain layer: crop engine, image handling and the upload flow.

pub mod image;
pub mod resizer;
pub mod upload;

// SPDX-License-Identifier: GPL-3.0-or-later
// src/domain/image/mod.rs
//
// Image sources, upload file types and photo filters.

pub mod filter;
pub mod source;

pub use filter::Filter;
pub use source::{FileType, ImageSource};

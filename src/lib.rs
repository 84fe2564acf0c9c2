// SPDX-License-Identifier: GPL-3.0-or-later
// src/lib.rs
//
// Square crop engine with a framing preview, photo filters and the upload
// flow that ties them together.

pub mod config;
pub mod constant;
pub mod domain;
pub mod error;
pub mod host;
pub mod render;

pub use domain::image::{FileType, Filter, ImageSource};
pub use domain::resizer::{Coordinate, ExportedImage, Resizer, ResizerChange, Square};
pub use domain::upload::{FilterPreference, ResizeForm, UploadFlow, UploadMessage, UploadStage};
pub use error::{ResizerError, ResizerResult};
pub use host::{Container, InputSurface, Node};

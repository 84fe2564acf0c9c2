// SPDX-License-Identifier: GPL-3.0-or-later
// src/error.rs
//
// Library error type shared by the crop engine and the upload flow.

use std::io;

pub type ResizerResult<T> = Result<T, ResizerError>;

#[derive(Debug, thiserror::Error)]
pub enum ResizerError {
    /// The source image has not finished decoding yet.
    #[error("image is not decoded yet")]
    NotReady,
    #[error("image decode failed: {0}")]
    DecodeFailed(String),
    #[error("unsupported file type: {0}")]
    UnsupportedFileType(String),
    #[error("malformed data url")]
    InvalidDataUrl,
    /// The crop square has no area to export.
    #[error("crop region is empty (side {0})")]
    EmptyRegion(f64),
    #[error("crop region {0} does not fit the image")]
    InvalidRegion(String),
    #[error("unknown filter: {0}")]
    UnknownFilter(String),
    /// Upload step requested while the flow is in another stage.
    #[error("cannot {0} during the {1} stage")]
    OutOfOrder(&'static str, &'static str),
    #[error("resizer is not attached to a container")]
    NotAttached,
    #[error("resizer surface was already released")]
    Removed,
    #[error("cannot allocate a {0}x{1} drawing surface")]
    Surface(u32, u32),
    #[error("image encode failed: {0}")]
    Encode(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl From<image::ImageError> for ResizerError {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::IoError(e) => Self::Io(e),
            image::ImageError::Encoding(e) => Self::Encode(e.to_string()),
            other => Self::DecodeFailed(other.to_string()),
        }
    }
}

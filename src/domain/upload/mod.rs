// SPDX-License-Identifier: GPL-3.0-or-later
// src/domain/upload/mod.rs
//
// Upload orchestration around the crop engine.

pub mod flow;
pub mod form;
pub mod preference;

pub use flow::{UploadFlow, UploadMessage, UploadStage};
pub use form::ResizeForm;
pub use preference::FilterPreference;

// SPDX-License-Identifier: GPL-3.0-or-later
// src/constant.rs
//
// Application constants that should not be changed by the user.

/// Initial crop side as a fraction of the shorter image side.
pub const INITIAL_SIDE_RATIO: f64 = 0.75;

/// Thickness of the decorative frame around the crop square, in pixels.
pub const FRAME_THICKNESS: f32 = 6.0;

/// Font size of the dimension label, in pixels.
pub const FONT_SIZE: f32 = 18.0;

/// Frame stroke colour (RGBA).
pub const FRAME_COLOR: [u8; 4] = [255, 231, 83, 255];

/// Dimming overlay outside the crop square: black at 60 % opacity.
pub const OVERLAY_COLOR: [u8; 4] = [0, 0, 0, 153];

/// Dimension label colour (RGBA).
pub const LABEL_COLOR: [u8; 4] = [255, 255, 255, 255];

/// Day of the year the filter preference lifetime is counted from
/// (9 December).
pub const PREFERENCE_EPOCH_MONTH: u32 = 12;
pub const PREFERENCE_EPOCH_DAY: u32 = 9;

/// Config directory name.
pub const CONFIG_DIR: &str = "kekstagram";

/// Config file name inside the config directory.
pub const CONFIG_FILE: &str = "config.json";

/// Filter preference file name inside the config directory.
pub const PREFERENCE_FILE: &str = "upload-filter.json";

/// Exported crop file extension.
pub const EXPORT_EXT: &str = "png";

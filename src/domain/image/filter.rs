// SPDX-License-Identifier: GPL-3.0-or-later
// src/domain/image/filter.rs
//
// Cosmetic photo filters applied to the cropped upload.

use std::fmt;
use std::str::FromStr;

use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::error::ResizerError;

/// Photo filter offered after cropping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    #[default]
    None,
    /// Full greyscale.
    Chrome,
    /// Full sepia tone.
    Sepia,
    /// Colour inversion.
    Marvin,
}

impl Filter {
    pub const ALL: [Filter; 4] = [Self::None, Self::Chrome, Self::Sepia, Self::Marvin];

    pub fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Chrome => "chrome",
            Self::Sepia => "sepia",
            Self::Marvin => "marvin",
        }
    }

    /// Return a filtered copy of `image`. Alpha is left untouched.
    pub fn apply(&self, image: &RgbaImage) -> RgbaImage {
        let mut out = image.clone();
        if *self == Self::None {
            return out;
        }

        for pixel in out.pixels_mut() {
            *pixel = self.map_pixel(*pixel);
        }
        out
    }

    fn map_pixel(&self, pixel: Rgba<u8>) -> Rgba<u8> {
        let [r, g, b, a] = pixel.0;
        let (rf, gf, bf) = (f32::from(r), f32::from(g), f32::from(b));

        match self {
            Self::None => pixel,
            Self::Chrome => {
                let luma = channel(0.2126 * rf + 0.7152 * gf + 0.0722 * bf);
                Rgba([luma, luma, luma, a])
            }
            Self::Sepia => Rgba([
                channel(0.393 * rf + 0.769 * gf + 0.189 * bf),
                channel(0.349 * rf + 0.686 * gf + 0.168 * bf),
                channel(0.272 * rf + 0.534 * gf + 0.131 * bf),
                a,
            ]),
            Self::Marvin => Rgba([255 - r, 255 - g, 255 - b, a]),
        }
    }
}

fn channel(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Filter {
    type Err = ResizerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|filter| filter.name() == lower)
            .ok_or_else(|| ResizerError::UnknownFilter(s.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(r: u8, g: u8, b: u8, a: u8) -> RgbaImage {
        RgbaImage::from_pixel(1, 1, Rgba([r, g, b, a]))
    }

    #[test]
    fn none_is_identity() {
        let image = single(12, 34, 56, 78);
        assert_eq!(Filter::None.apply(&image), image);
    }

    #[test]
    fn chrome_produces_grey() {
        let out = Filter::Chrome.apply(&single(255, 0, 0, 200));
        assert_eq!(out.get_pixel(0, 0), &Rgba([54, 54, 54, 200]));

        let white = Filter::Chrome.apply(&single(255, 255, 255, 255));
        assert_eq!(white.get_pixel(0, 0), &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn sepia_warms_and_saturates_at_white() {
        let out = Filter::Sepia.apply(&single(255, 255, 255, 255));
        assert_eq!(out.get_pixel(0, 0), &Rgba([255, 255, 239, 255]));

        let black = Filter::Sepia.apply(&single(0, 0, 0, 10));
        assert_eq!(black.get_pixel(0, 0), &Rgba([0, 0, 0, 10]));
    }

    #[test]
    fn marvin_inverts_colour_not_alpha() {
        let out = Filter::Marvin.apply(&single(0, 100, 255, 128));
        assert_eq!(out.get_pixel(0, 0), &Rgba([255, 155, 0, 128]));
    }

    #[test]
    fn names_round_trip_through_from_str() {
        for filter in Filter::ALL {
            assert_eq!(filter.name().parse::<Filter>().unwrap(), filter);
        }
        assert_eq!("SEPIA".parse::<Filter>().unwrap(), Filter::Sepia);
        assert!("vintage".parse::<Filter>().is_err());
    }
}

// SPDX-License-Identifier: GPL-3.0-or-later
// src/domain/resizer/export.rs
//
// Cropped image produced by the engine.

use std::io::Cursor;
use std::path::Path;

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use image::{ImageFormat, RgbaImage, imageops};

use super::square::Square;
use crate::error::{ResizerError, ResizerResult};

/// Standalone image holding only the pixels inside the crop square.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedImage {
    image: RgbaImage,
}

impl ExportedImage {
    /// Copy the `square` region of `source` into a new `side x side` image.
    ///
    /// The side is truncated to whole pixels and the offset rounded to the
    /// nearest pixel. Parts of the square outside the source stay
    /// transparent.
    pub fn crop(source: &RgbaImage, square: Square) -> ResizerResult<Self> {
        let side = square.side.trunc();
        if side.is_nan() || side < 1.0 {
            return Err(ResizerError::EmptyRegion(square.side));
        }

        let side = side as u32;
        let mut image = RgbaImage::new(side, side);
        imageops::replace(
            &mut image,
            source,
            -(square.x.round() as i64),
            -(square.y.round() as i64),
        );

        Ok(Self { image })
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn to_png_bytes(&self) -> ResizerResult<Vec<u8>> {
        let mut bytes = Cursor::new(Vec::new());
        self.image.write_to(&mut bytes, ImageFormat::Png)?;
        Ok(bytes.into_inner())
    }

    /// Embeddable `data:image/png;base64,...` URI.
    pub fn to_data_url(&self) -> ResizerResult<String> {
        let png = self.to_png_bytes()?;
        Ok(format!("data:image/png;base64,{}", BASE64.encode(png)))
    }

    pub fn save(&self, path: &Path) -> ResizerResult<()> {
        self.image.save(path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn gradient(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| Rgba([x as u8, y as u8, 0, 255]))
    }

    #[test]
    fn crop_copies_the_selected_pixels() {
        let exported = ExportedImage::crop(&gradient(20, 20), Square::new(2.0, 3.0, 4.0)).unwrap();
        assert_eq!(exported.dimensions(), (4, 4));
        assert_eq!(exported.image().get_pixel(0, 0), &Rgba([2, 3, 0, 255]));
        assert_eq!(exported.image().get_pixel(3, 3), &Rgba([5, 6, 0, 255]));
    }

    #[test]
    fn area_outside_the_source_is_transparent() {
        let exported = ExportedImage::crop(&gradient(4, 4), Square::new(2.0, 2.0, 4.0)).unwrap();
        assert_eq!(exported.image().get_pixel(1, 1), &Rgba([3, 3, 0, 255]));
        assert_eq!(exported.image().get_pixel(2, 2), &Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn empty_square_cannot_be_exported() {
        let err = ExportedImage::crop(&gradient(4, 4), Square::new(0.0, 0.0, 0.5)).unwrap_err();
        assert!(matches!(err, ResizerError::EmptyRegion(_)));
        assert!(ExportedImage::crop(&gradient(4, 4), Square::new(0.0, 0.0, f64::NAN)).is_err());
    }

    #[test]
    fn data_url_embeds_a_png() {
        let exported = ExportedImage::crop(&gradient(8, 8), Square::new(0.0, 0.0, 8.0)).unwrap();
        let url = exported.to_data_url().unwrap();
        let payload = url.strip_prefix("data:image/png;base64,").unwrap();
        let png = BASE64.decode(payload).unwrap();

        let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
        assert_eq!(&decoded, exported.image());
    }
}

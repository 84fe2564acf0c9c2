// SPDX-License-Identifier: GPL-3.0-or-later
// src/render/canvas.rs
//
// Software drawing surface with a save/restore transform stack.

use image::RgbaImage;
use resvg::tiny_skia::{
    Color, ColorU8, FillRule, Paint, Path, Pixmap, PixmapPaint, Stroke, Transform,
};

use super::text;
use crate::error::{ResizerError, ResizerResult};

/// Raster surface the crop engine draws into.
///
/// Sized to the natural size of the source image so that canvas pixels and
/// image pixels share one coordinate space.
pub struct Canvas {
    pixmap: Pixmap,
    transform: Transform,
    saved: Vec<Transform>,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> ResizerResult<Self> {
        let pixmap = Pixmap::new(width, height).ok_or(ResizerError::Surface(width, height))?;
        Ok(Self {
            pixmap,
            transform: Transform::identity(),
            saved: Vec::new(),
        })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Reset every pixel to transparent. Ignores the current transform.
    pub fn clear(&mut self) {
        self.pixmap.fill(Color::TRANSPARENT);
    }

    /// Push the current transform.
    pub fn save(&mut self) {
        self.saved.push(self.transform);
    }

    /// Pop the last saved transform; no-op when nothing was saved.
    pub fn restore(&mut self) {
        if let Some(transform) = self.saved.pop() {
            self.transform = transform;
        }
    }

    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.transform = self.transform.pre_translate(dx, dy);
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    /// Draw `image` with its top-left corner at `(x, y)`.
    pub fn draw_image(&mut self, image: &Pixmap, x: f32, y: f32) {
        let transform = self.transform.pre_translate(x, y);
        self.pixmap
            .draw_pixmap(0, 0, image.as_ref(), &PixmapPaint::default(), transform, None);
    }

    pub fn stroke_path(&mut self, path: &Path, color: [u8; 4], width: f32) {
        let stroke = Stroke {
            width,
            ..Stroke::default()
        };
        self.pixmap
            .stroke_path(path, &paint(color), &stroke, self.transform, None);
    }

    pub fn fill_path_even_odd(&mut self, path: &Path, color: [u8; 4]) {
        self.pixmap
            .fill_path(path, &paint(color), FillRule::EvenOdd, self.transform, None);
    }

    /// Draw `text` horizontally centred on `center_x` with its baseline at
    /// `baseline_y`.
    pub fn fill_text(&mut self, text: &str, center_x: f32, baseline_y: f32, size: f32, color: [u8; 4]) {
        text::draw_label(
            &mut self.pixmap,
            self.transform,
            text,
            center_x,
            baseline_y,
            size,
            color,
        );
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Snapshot of the surface as straight-alpha RGBA.
    pub fn to_rgba_image(&self) -> RgbaImage {
        image_from_pixmap(&self.pixmap)
    }
}

fn paint(color: [u8; 4]) -> Paint<'static> {
    let [r, g, b, a] = color;
    let mut paint = Paint::default();
    paint.set_color_rgba8(r, g, b, a);
    paint.anti_alias = true;
    paint
}

/// Convert a straight-alpha image into a premultiplied pixmap.
pub fn pixmap_from_image(image: &RgbaImage) -> ResizerResult<Pixmap> {
    let (width, height) = image.dimensions();
    let mut pixmap = Pixmap::new(width, height).ok_or(ResizerError::Surface(width, height))?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(image.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Ok(pixmap)
}

/// Convert a premultiplied pixmap back to straight-alpha RGBA.
pub fn image_from_pixmap(pixmap: &Pixmap) -> RgbaImage {
    let mut image = RgbaImage::new(pixmap.width(), pixmap.height());
    for (dst, src) in image.pixels_mut().zip(pixmap.pixels()) {
        let color = src.demultiply();
        dst.0 = [color.red(), color.green(), color.blue(), color.alpha()];
    }
    image
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn zero_sized_surface_is_rejected() {
        assert!(matches!(Canvas::new(0, 10), Err(ResizerError::Surface(0, 10))));
    }

    #[test]
    fn restore_pops_translation() {
        let mut canvas = Canvas::new(4, 4).unwrap();
        canvas.save();
        canvas.translate(2.0, 3.0);
        assert_eq!(canvas.transform(), Transform::from_translate(2.0, 3.0));
        canvas.restore();
        assert_eq!(canvas.transform(), Transform::identity());

        // Unbalanced restore keeps the identity.
        canvas.restore();
        assert_eq!(canvas.transform(), Transform::identity());
    }

    #[test]
    fn draw_image_honours_translation() {
        let source = RgbaImage::from_pixel(1, 1, Rgba([200, 10, 20, 255]));
        let pixmap = pixmap_from_image(&source).unwrap();

        let mut canvas = Canvas::new(4, 4).unwrap();
        canvas.translate(1.0, 0.0);
        canvas.draw_image(&pixmap, 1.0, 2.0);

        let snapshot = canvas.to_rgba_image();
        assert_eq!(snapshot.get_pixel(2, 2), &Rgba([200, 10, 20, 255]));
        assert_eq!(snapshot.get_pixel(0, 0), &Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn text_stays_between_cap_height_and_baseline() {
        let mut canvas = Canvas::new(120, 40).unwrap();
        canvas.translate(60.0, 20.0);
        canvas.fill_text("640 x 480", 0.0, 10.0, 18.0, [255, 255, 255, 255]);
        let snapshot = canvas.to_rgba_image();

        // Nothing is drawn when the host has no fonts; whatever is drawn
        // must sit on the baseline (y = 30) and inside one em above it.
        assert!(
            snapshot
                .enumerate_pixels()
                .filter(|(_, _, p)| p.0[3] > 0)
                .all(|(_, y, _)| (12..=31).contains(&y))
        );
    }

    #[test]
    fn clear_wipes_previous_drawing() {
        let mut canvas = Canvas::new(8, 8).unwrap();
        canvas.fill_text("8", 4.0, 8.0, 7.0, [255, 0, 0, 255]);
        canvas.stroke_path(
            &resvg::tiny_skia::PathBuilder::from_rect(resvg::tiny_skia::Rect::from_xywh(1.0, 1.0, 4.0, 4.0).unwrap()),
            [255, 0, 0, 255],
            2.0,
        );
        canvas.clear();
        assert!(canvas.to_rgba_image().pixels().all(|p| p.0 == [0, 0, 0, 0]));
    }
}

// SPDX-License-Identifier: GPL-3.0-or-later
// src/domain/resizer/frame.rs
//
// Redraw of the crop preview: panned image, zig-zag frame, dimming overlay
// and the natural-size label.

use resvg::tiny_skia::{Path, PathBuilder, Pixmap, Rect};

use super::square::Square;
use crate::constant::{FONT_SIZE, FRAME_COLOR, FRAME_THICKNESS, LABEL_COLOR, OVERLAY_COLOR};
use crate::render::canvas::Canvas;

#[derive(Clone, Copy)]
enum Edge {
    Horizontal,
    Vertical,
}

/// Draw one frame of the crop preview.
///
/// The origin is moved to the canvas centre for the duration of the call, so
/// the crop square always sits in the middle and the image is panned under
/// it. The transform is restored before returning.
pub fn draw(canvas: &mut Canvas, image: &Pixmap, natural: (u32, u32), square: Square) {
    let side = square.side as f32;
    let center = square.center();
    let (half_width, half_height) = (canvas.width() as f32 / 2.0, canvas.height() as f32 / 2.0);

    canvas.clear();
    canvas.save();
    canvas.translate(half_width, half_height);

    canvas.draw_image(image, -center.x as f32, -center.y as f32);

    if frame_visible(side, half_width, half_height, FRAME_THICKNESS) {
        if let Some(path) = zigzag_frame(side, FRAME_THICKNESS) {
            canvas.stroke_path(&path, FRAME_COLOR, FRAME_THICKNESS);
        }
    }

    if let Some(path) = dimming_overlay(half_width, half_height, side, FRAME_THICKNESS) {
        canvas.fill_path_even_odd(&path, OVERLAY_COLOR);
    }

    let label = format!("{} x {}", natural.0, natural.1);
    let baseline = -side / 2.0 - FONT_SIZE / 2.0 - FRAME_THICKNESS;
    if baseline.is_finite() {
        canvas.fill_text(&label, 0.0, baseline, FONT_SIZE, LABEL_COLOR);
    }

    canvas.restore();
}

/// Whether any edge of the frame reaches into the canvas.
fn frame_visible(side: f32, half_width: f32, half_height: f32, thickness: f32) -> bool {
    side > 0.0 && side / 2.0 - thickness <= half_width.max(half_height)
}

/// Zig-zag outline just inside the crop square, centred on the origin.
///
/// The tooth count is rounded to an even number so each edge ends on the
/// same level it started on.
fn zigzag_frame(side: f32, thickness: f32) -> Option<Path> {
    let mut steps = (side / (thickness * 2.0)).round().max(0.0) as u32;
    if steps % 2 == 1 {
        steps += 1;
    }
    if steps == 0 {
        return None;
    }

    let step = side / steps as f32;
    let half = side / 2.0;

    // (start along the edge, start across the edge, rising phase, direction)
    let edges = [
        (-half, -half + step, 1, Edge::Horizontal),
        (-half, half - step, 0, Edge::Horizontal),
        (-half, half - step, 0, Edge::Vertical),
        (-half, -half + step, 1, Edge::Vertical),
    ];

    let mut builder = PathBuilder::new();
    for (along, across, phase, edge) in edges {
        let (mut a, mut b) = (along, across);
        let (x, y) = orient(edge, a, b);
        builder.move_to(x, y);

        for i in 0..steps {
            a += step;
            if i % 2 == phase {
                b += step;
            } else {
                b -= step;
            }
            let (x, y) = orient(edge, a, b);
            builder.line_to(x, y);
        }
    }

    builder.finish()
}

fn orient(edge: Edge, along: f32, across: f32) -> (f32, f32) {
    match edge {
        Edge::Horizontal => (along, across),
        Edge::Vertical => (across, along),
    }
}

/// Full-canvas rectangle with a hole around the crop square (even-odd).
fn dimming_overlay(half_width: f32, half_height: f32, side: f32, thickness: f32) -> Option<Path> {
    let outer = Rect::from_xywh(-half_width, -half_height, half_width * 2.0, half_height * 2.0)?;

    let mut builder = PathBuilder::new();
    builder.push_rect(outer);

    let inner_side = side + thickness * 2.0;
    if let Some(inner) = Rect::from_xywh(-inner_side / 2.0, -inner_side / 2.0, inner_side, inner_side) {
        builder.push_rect(inner);
    }

    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zigzag_stays_within_one_step_of_the_edge() {
        let side = 60.0;
        let path = zigzag_frame(side, 6.0).unwrap();
        let bounds = path.bounds();

        assert!((bounds.left() + side / 2.0).abs() < 1e-3);
        assert!((bounds.right() - side / 2.0).abs() < 1e-3);
        assert!((bounds.top() + side / 2.0).abs() < 1e-3);
        assert!((bounds.bottom() - side / 2.0).abs() < 1e-3);
    }

    #[test]
    fn zigzag_skips_degenerate_squares() {
        assert!(zigzag_frame(0.0, 6.0).is_none());
        assert!(zigzag_frame(-20.0, 6.0).is_none());
    }

    #[test]
    fn frame_is_skipped_once_it_leaves_the_canvas() {
        assert!(frame_visible(100.0, 50.0, 25.0, 6.0));
        assert!(frame_visible(112.0, 50.0, 25.0, 6.0));
        assert!(!frame_visible(113.0, 50.0, 25.0, 6.0));
        assert!(!frame_visible(2.0e9, 50.0, 25.0, 6.0));
        assert!(!frame_visible(f32::INFINITY, 50.0, 25.0, 6.0));
        assert!(!frame_visible(f32::NAN, 50.0, 25.0, 6.0));
        assert!(!frame_visible(0.0, 50.0, 25.0, 6.0));
    }

    #[test]
    fn overlay_covers_the_whole_canvas() {
        let path = dimming_overlay(50.0, 25.0, 20.0, 6.0).unwrap();
        let bounds = path.bounds();
        assert_eq!(bounds.left(), -50.0);
        assert_eq!(bounds.right(), 50.0);
        assert_eq!(bounds.top(), -25.0);
        assert_eq!(bounds.bottom(), 25.0);
    }
}

// SPDX-License-Identifier: GPL-3.0-or-later
// src/render/text.rs
//
// Text labels laid out by usvg against the system font database.

use std::sync::{Arc, OnceLock};

use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg::{self, fontdb};

/// Families tried in order before the generic fallback.
const FAMILIES: &str = "'DejaVu Sans', 'Liberation Sans', 'Noto Sans', Arial, sans-serif";

/// System fonts, scanned once per process.
fn font_database() -> Arc<fontdb::Database> {
    static FONTS: OnceLock<Arc<fontdb::Database>> = OnceLock::new();

    Arc::clone(FONTS.get_or_init(|| {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        if db.is_empty() {
            log::warn!("No system fonts found, labels will not be drawn");
        } else {
            log::debug!("loaded {} font faces", db.len());
        }
        Arc::new(db)
    }))
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// SVG document holding one line of `text`, centred on `center_x` with its
/// baseline at `baseline_y`.
pub fn label_svg(
    text: &str,
    (width, height): (u32, u32),
    center_x: f32,
    baseline_y: f32,
    size: f32,
    color: [u8; 4],
) -> String {
    let [r, g, b, a] = color;
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}"><text x="{center_x}" y="{baseline_y}" font-family="{FAMILIES}" font-size="{size}" text-anchor="middle" fill="rgb({r},{g},{b})" fill-opacity="{opacity}">{text}</text></svg>"#,
        opacity = f32::from(a) / 255.0,
        text = escape(text),
    )
}

/// Render `text` into `pixmap` through `transform`.
///
/// Coordinates are in the transformed space, like every other canvas call.
pub fn draw_label(
    pixmap: &mut Pixmap,
    transform: Transform,
    text: &str,
    center_x: f32,
    baseline_y: f32,
    size: f32,
    color: [u8; 4],
) {
    let svg = label_svg(
        text,
        (pixmap.width(), pixmap.height()),
        center_x,
        baseline_y,
        size,
        color,
    );

    let options = usvg::Options {
        fontdb: font_database(),
        ..usvg::Options::default()
    };

    match usvg::Tree::from_str(&svg, &options) {
        Ok(tree) => resvg::render(&tree, transform, &mut pixmap.as_mut()),
        Err(e) => log::warn!("Failed to lay out label {text:?}: {e}"),
    }
}

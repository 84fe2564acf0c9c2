// SPDX-License-Identifier: GPL-3.0-or-later
// src/domain/image/source.rs
//
// Image sources accepted by the crop engine and their decoding.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use image::DynamicImage;

use crate::error::{ResizerError, ResizerResult};

/// Upload formats the cropper accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Gif,
    Jpeg,
    Png,
    Svg,
}

impl FileType {
    pub const ALL: [FileType; 4] = [Self::Gif, Self::Jpeg, Self::Png, Self::Svg];

    /// Match a mime type such as `image/svg+xml` (case-insensitive).
    pub fn from_mime(mime: &str) -> ResizerResult<Self> {
        let lower = mime.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.mime() == lower)
            .ok_or_else(|| ResizerError::UnsupportedFileType(mime.to_owned()))
    }

    /// Guess the type from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "gif" => Some(Self::Gif),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "svg" => Some(Self::Svg),
            _ => None,
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            Self::Gif => "image/gif",
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Svg => "image/svg+xml",
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime())
    }
}

impl FromStr for FileType {
    type Err = ResizerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_mime(s)
    }
}

/// Where the engine gets its picture from.
pub enum ImageSource {
    /// Encoded file contents; the format is sniffed.
    Bytes(Vec<u8>),
    /// `data:<mime>;base64,<payload>` URI.
    DataUrl(String),
    Path(PathBuf),
    /// Already decoded bitmap.
    Decoded(DynamicImage),
}

impl fmt::Debug for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bytes(bytes) => write!(f, "ImageSource::Bytes({} bytes)", bytes.len()),
            Self::DataUrl(url) => write!(f, "ImageSource::DataUrl({} chars)", url.len()),
            Self::Path(path) => write!(f, "ImageSource::Path({})", path.display()),
            Self::Decoded(image) => write!(
                f,
                "ImageSource::Decoded({}x{})",
                image.width(),
                image.height()
            ),
        }
    }
}

impl ImageSource {
    /// Build a source from a data URI, checking it is well formed.
    pub fn from_data_url(url: &str) -> ResizerResult<Self> {
        parse_data_url(url)?;
        Ok(Self::DataUrl(url.to_owned()))
    }

    /// Decode into pixels. Blocking; run it off the event loop.
    pub fn decode(self) -> ResizerResult<DynamicImage> {
        match self {
            Self::Decoded(image) => Ok(image),
            Self::Bytes(bytes) => decode_bytes(&bytes, None),
            Self::Path(path) => {
                let bytes = std::fs::read(&path)?;
                decode_bytes(&bytes, FileType::from_path(&path))
            }
            Self::DataUrl(url) => {
                let (mime, bytes) = parse_data_url(&url)?;
                decode_bytes(&bytes, FileType::from_mime(&mime).ok())
            }
        }
    }
}

/// Split a base64 data URI into its mime type and payload.
pub fn parse_data_url(url: &str) -> ResizerResult<(String, Vec<u8>)> {
    let rest = url
        .trim()
        .strip_prefix("data:")
        .ok_or(ResizerError::InvalidDataUrl)?;
    let (header, payload) = rest.split_once(',').ok_or(ResizerError::InvalidDataUrl)?;
    let mime = header
        .strip_suffix(";base64")
        .ok_or(ResizerError::InvalidDataUrl)?;
    let bytes = BASE64
        .decode(payload.trim())
        .map_err(|_| ResizerError::InvalidDataUrl)?;
    Ok((mime.to_owned(), bytes))
}

fn decode_bytes(bytes: &[u8], hint: Option<FileType>) -> ResizerResult<DynamicImage> {
    #[cfg(feature = "vector")]
    if hint == Some(FileType::Svg) || looks_like_svg(bytes) {
        return vector::rasterize(bytes);
    }
    #[cfg(not(feature = "vector"))]
    if hint == Some(FileType::Svg) {
        return Err(ResizerError::UnsupportedFileType(FileType::Svg.mime().into()));
    }

    Ok(image::load_from_memory(bytes)?)
}

#[cfg(feature = "vector")]
fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(256)];
    let text = String::from_utf8_lossy(head);
    let text = text.trim_start();
    text.starts_with("<svg") || (text.starts_with("<?xml") && text.contains("<svg"))
}

#[cfg(feature = "vector")]
mod vector {
    use image::DynamicImage;
    use resvg::tiny_skia::{Pixmap, Transform};
    use resvg::usvg::{Options, Tree};

    use crate::error::{ResizerError, ResizerResult};
    use crate::render::canvas::image_from_pixmap;

    /// Smallest raster size for SVGs without a usable size.
    const MIN_PIXMAP_SIZE: u32 = 1;

    /// Render an SVG document at its native size.
    pub fn rasterize(bytes: &[u8]) -> ResizerResult<DynamicImage> {
        let options = Options::default();
        let tree = Tree::from_data(bytes, &options)
            .map_err(|e| ResizerError::DecodeFailed(format!("svg: {e}")))?;

        let size = tree.size();
        let width = (size.width().ceil() as u32).max(MIN_PIXMAP_SIZE);
        let height = (size.height().ceil() as u32).max(MIN_PIXMAP_SIZE);

        let mut pixmap = Pixmap::new(width, height).ok_or(ResizerError::Surface(width, height))?;
        resvg::render(&tree, Transform::identity(), &mut pixmap.as_mut());

        Ok(DynamicImage::ImageRgba8(image_from_pixmap(&pixmap)))
    }
}

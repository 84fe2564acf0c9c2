// SPDX-License-Identifier: GPL-3.0-or-later
// src/domain/resizer/mod.rs
//
// Crop engine: owns one source image and a square selection over it,
// redraws the framing preview and exports the selected pixels.

mod drag;
mod export;
mod frame;
mod scheduler;
mod square;

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use image::{DynamicImage, RgbaImage};
use resvg::tiny_skia::Pixmap;

pub use export::ExportedImage;
pub use square::{Coordinate, Square};

use self::drag::DragSession;
use self::scheduler::FrameQueue;
use crate::constant::INITIAL_SIDE_RATIO;
use crate::domain::image::ImageSource;
use crate::error::{ResizerError, ResizerResult};
use crate::host::{Container, Node, SurfaceId};
use crate::render::canvas::{Canvas, pixmap_from_image};

static NEXT_SURFACE_ID: AtomicU64 = AtomicU64::new(1);

/// Payload of a change notification, delivered after the redraw it belongs
/// to has completed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizerChange {
    /// Crop square the frame was drawn with.
    pub region: Square,
    /// Number of redraws completed so far, this one included.
    pub frame: u64,
}

type ChangeListener = Box<dyn FnMut(&ResizerChange)>;

enum ImageState {
    Pending(ImageSource),
    Decoding,
    Ready(LoadedImage),
    Failed(String),
}

struct LoadedImage {
    image: RgbaImage,
    pixmap: Pixmap,
}

impl LoadedImage {
    fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

/// Interactive square crop over a single image.
///
/// Region updates only schedule a redraw; the host calls [`Resizer::run_frame`]
/// once per animation frame to perform pending redraws and notify listeners.
pub struct Resizer {
    id: SurfaceId,
    image: ImageState,
    canvas: Option<Canvas>,
    constraint: Option<Square>,
    element: Option<Container>,
    released: bool,
    drag: Option<DragSession>,
    frames: FrameQueue,
    frames_drawn: u64,
    listeners: Vec<ChangeListener>,
}

impl Resizer {
    /// Create an engine for `source`. Returns before the image is decoded;
    /// call [`Resizer::load`] to finish.
    pub fn new(source: ImageSource) -> Self {
        Self::with_state(ImageState::Pending(source))
    }

    /// Create an engine around an already decoded bitmap.
    pub fn from_image(image: DynamicImage) -> ResizerResult<Self> {
        let mut resizer = Self::with_state(ImageState::Decoding);
        resizer.on_image_load(image)?;
        Ok(resizer)
    }

    fn with_state(image: ImageState) -> Self {
        Self {
            id: NEXT_SURFACE_ID.fetch_add(1, Ordering::Relaxed),
            image,
            canvas: None,
            constraint: None,
            element: None,
            released: false,
            drag: None,
            frames: FrameQueue::default(),
            frames_drawn: 0,
            listeners: Vec::new(),
        }
    }

    /// Decode the source image off the event loop, then set up the default
    /// crop square and schedule the first redraw.
    pub async fn load(&mut self) -> ResizerResult<()> {
        let source = match std::mem::replace(&mut self.image, ImageState::Decoding) {
            ImageState::Pending(source) => source,
            ImageState::Ready(loaded) => {
                self.image = ImageState::Ready(loaded);
                return Ok(());
            }
            ImageState::Failed(reason) => {
                self.image = ImageState::Failed(reason.clone());
                return Err(ResizerError::DecodeFailed(reason));
            }
            ImageState::Decoding => return Err(ResizerError::NotReady),
        };

        log::debug!("decoding {source:?}");
        let decoded = tokio::task::spawn_blocking(move || source.decode())
            .await
            .map_err(|e| ResizerError::DecodeFailed(e.to_string()))
            .and_then(|result| result);

        match decoded {
            Ok(image) => self.on_image_load(image),
            Err(e) => {
                log::error!("Failed to decode crop source: {e}");
                self.image = ImageState::Failed(e.to_string());
                Err(e)
            }
        }
    }

    fn on_image_load(&mut self, image: DynamicImage) -> ResizerResult<()> {
        let image = image.to_rgba8();
        let (width, height) = image.dimensions();

        let prepared = pixmap_from_image(&image).and_then(|pixmap| {
            let canvas = Canvas::new(width, height)?;
            Ok((pixmap, canvas))
        });
        let (pixmap, canvas) = match prepared {
            Ok(parts) => parts,
            Err(e) => {
                self.image = ImageState::Failed(e.to_string());
                return Err(e);
            }
        };

        if !self.released {
            self.canvas = Some(canvas);
        }
        self.image = ImageState::Ready(LoadedImage { image, pixmap });

        let square = Square::centered(width, height, INITIAL_SIDE_RATIO);
        log::debug!("image {width}x{height} ready, initial crop {square}");
        self.constraint = Some(square);
        self.set_constraint(None, None, None)
    }

    fn not_ready(&self) -> ResizerError {
        match &self.image {
            ImageState::Failed(reason) => ResizerError::DecodeFailed(reason.clone()),
            _ => ResizerError::NotReady,
        }
    }

    fn loaded(&self) -> ResizerResult<&LoadedImage> {
        match &self.image {
            ImageState::Ready(loaded) => Ok(loaded),
            _ => Err(self.not_ready()),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.image, ImageState::Ready(_))
    }

    /// Natural size of the decoded image.
    pub fn natural_size(&self) -> Option<(u32, u32)> {
        self.loaded().ok().map(LoadedImage::dimensions)
    }

    /// Identifier of this engine's surface inside its container.
    pub fn surface_id(&self) -> SurfaceId {
        self.id
    }

    /// Drawing surface, until [`Resizer::remove`] releases it.
    pub fn surface(&self) -> Option<&Canvas> {
        self.canvas.as_ref()
    }

    // ------------------------------------------------------------------
    // Host attachment
    // ------------------------------------------------------------------

    /// Insert the surface as the first child of `container` and listen for
    /// pointer-down on it. Re-attaching to the same container does nothing;
    /// a different container takes the surface over.
    pub fn set_element(&mut self, container: &Container) -> ResizerResult<()> {
        if self.released {
            return Err(ResizerError::Removed);
        }

        if let Some(current) = &self.element {
            if current.same_as(container) {
                return Ok(());
            }
            self.detach(current);
        }

        container.insert_first(Node::Surface(self.id));
        container.add_pointer_down(self.id);
        log::debug!("surface {} attached to {}", self.id, container.name());
        self.element = Some(container.clone());
        Ok(())
    }

    /// Detach from the container, drop listeners and release the surface.
    ///
    /// Fails with [`ResizerError::NotAttached`] when there is nothing to
    /// detach; the engine is left untouched in that case.
    pub fn remove(&mut self) -> ResizerResult<()> {
        let element = self.element.take().ok_or(ResizerError::NotAttached)?;
        self.detach(&element);

        self.drag = None;
        self.canvas = None;
        self.frames.clear();
        self.released = true;
        log::debug!("surface {} removed from {}", self.id, element.name());
        Ok(())
    }

    fn detach(&self, container: &Container) {
        container.remove_child(&Node::Surface(self.id));
        container.remove_pointer_down(self.id);
    }

    pub fn is_attached(&self) -> bool {
        self.element.is_some()
    }

    // ------------------------------------------------------------------
    // Crop square
    // ------------------------------------------------------------------

    /// Snapshot of the current crop square.
    pub fn get_constraint(&self) -> ResizerResult<Square> {
        self.constraint.ok_or_else(|| self.not_ready())
    }

    /// Update the given fields of the crop square and schedule a redraw.
    /// `None` fields keep their value. Values are taken as-is; bounds are
    /// the caller's business.
    pub fn set_constraint(
        &mut self,
        x: Option<f64>,
        y: Option<f64>,
        side: Option<f64>,
    ) -> ResizerResult<()> {
        let mut square = self.get_constraint()?;
        if let Some(x) = x {
            square.x = x;
        }
        if let Some(y) = y {
            square.y = y;
        }
        if let Some(side) = side {
            square.side = side;
        }

        self.constraint = Some(square);
        let request = self.frames.schedule();
        log::trace!("crop {square} scheduled as frame {}", request.seq);
        Ok(())
    }

    /// Shift the crop square by the given deltas.
    pub fn move_constraint(&mut self, dx: f64, dy: f64, dside: f64) -> ResizerResult<()> {
        let square = self.get_constraint()?;
        self.set_constraint(
            Some(square.x + dx),
            Some(square.y + dy),
            Some(square.side + dside),
        )
    }

    // ------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------

    /// Register a change listener, called after every scheduled redraw.
    pub fn on_change<F>(&mut self, listener: F)
    where
        F: FnMut(&ResizerChange) + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Redraw requests waiting for the next frame.
    pub fn pending_frames(&self) -> usize {
        self.frames.len()
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }

    /// Run one animation frame: every request pending at call time is
    /// redrawn, then announced to the listeners. Returns how many ran.
    pub fn run_frame(&mut self) -> ResizerResult<usize> {
        let due = self.frames.take_due();
        if self.released {
            if !due.is_empty() {
                log::debug!("dropping {} frame(s) for removed surface {}", due.len(), self.id);
            }
            return Ok(0);
        }

        for _ in &due {
            self.redraw()?;
            self.frames_drawn += 1;

            let change = ResizerChange {
                region: self.get_constraint()?,
                frame: self.frames_drawn,
            };
            for listener in &mut self.listeners {
                listener(&change);
            }
        }

        Ok(due.len())
    }

    /// Draw the preview for the current crop square.
    pub fn redraw(&mut self) -> ResizerResult<()> {
        let square = self.get_constraint()?;
        let loaded = match &self.image {
            ImageState::Ready(loaded) => loaded,
            _ => return Err(self.not_ready()),
        };
        let canvas = self.canvas.as_mut().ok_or(ResizerError::Removed)?;

        frame::draw(canvas, &loaded.pixmap, loaded.dimensions(), square);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Pointer input
    // ------------------------------------------------------------------

    /// Pointer pressed on the surface: start dragging from `(x, y)`.
    ///
    /// Ignored while the surface is not attached.
    pub fn pointer_down(&mut self, x: f64, y: f64) {
        let Some(element) = &self.element else {
            log::debug!("pointer down ignored, surface {} is detached", self.id);
            return;
        };
        if !element.has_pointer_down(self.id) {
            return;
        }

        // A stale session must release its listeners before a new one subscribes.
        self.drag = None;
        self.drag = Some(DragSession::start(element.input(), x, y));
    }

    /// Pointer moved anywhere on the input surface while dragging.
    pub fn pointer_move(&mut self, x: f64, y: f64) -> ResizerResult<()> {
        let Some(session) = self.drag.as_mut() else {
            return Ok(());
        };

        let (dx, dy) = session.advance(x, y);
        self.move_constraint(dx, dy, 0.0)
    }

    /// Pointer released: end the drag and drop its listeners.
    pub fn pointer_up(&mut self) {
        self.drag = None;
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    // ------------------------------------------------------------------
    // Export
    // ------------------------------------------------------------------

    /// New `side x side` image containing only the pixels under the crop
    /// square.
    pub fn export_image(&self) -> ResizerResult<ExportedImage> {
        let square = self.get_constraint()?;
        let loaded = self.loaded()?;
        ExportedImage::crop(&loaded.image, square)
    }
}

impl Drop for Resizer {
    fn drop(&mut self) {
        if let Some(element) = self.element.take() {
            self.detach(&element);
        }
    }
}

impl fmt::Debug for Resizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resizer")
            .field("id", &self.id)
            .field("ready", &self.is_ready())
            .field("constraint", &self.constraint)
            .field("attached", &self.is_attached())
            .field("dragging", &self.is_dragging())
            .finish()
    }
}

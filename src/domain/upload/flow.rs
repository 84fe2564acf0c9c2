// SPDX-License-Identifier: GPL-3.0-or-later
// src/domain/upload/flow.rs
//
// Upload flow: pick a file, crop it, choose a filter, submit.

use std::fmt;

use chrono::{Local, NaiveDate};
use image::RgbaImage;

use super::form::ResizeForm;
use super::preference::FilterPreference;
use crate::domain::image::{FileType, Filter, ImageSource};
use crate::domain::resizer::{ExportedImage, Resizer};
use crate::error::{ResizerError, ResizerResult};
use crate::host::Container;

/// Which form of the upload flow is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStage {
    Select,
    Resize,
    Filter,
}

impl UploadStage {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Select => "select",
            Self::Resize => "resize",
            Self::Filter => "filter",
        }
    }
}

/// Status line shown over the upload form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadMessage {
    Uploading,
    Error(String),
}

impl fmt::Display for UploadMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uploading => f.write_str("Uploading..."),
            Self::Error(reason) => write!(f, "Could not use this file: {reason}"),
        }
    }
}

/// Drives one crop engine at a time through select, resize and filter.
pub struct UploadFlow {
    stage: UploadStage,
    container: Container,
    resizer: Option<Resizer>,
    cropped: Option<ExportedImage>,
    filter: Filter,
    message: Option<UploadMessage>,
    preference: Option<FilterPreference>,
    today: NaiveDate,
}

impl UploadFlow {
    /// New flow attaching engines to `container`. The initial filter is the
    /// remembered one, else `fallback`.
    pub fn new(container: Container, preference: Option<FilterPreference>, fallback: Filter) -> Self {
        Self::with_date(container, preference, fallback, Local::now().date_naive())
    }

    /// Like [`UploadFlow::new`] with an explicit calendar date for the
    /// preference lifetime.
    pub fn with_date(
        container: Container,
        preference: Option<FilterPreference>,
        fallback: Filter,
        today: NaiveDate,
    ) -> Self {
        let filter = preference
            .as_ref()
            .and_then(|store| store.load(today))
            .unwrap_or(fallback);

        Self {
            stage: UploadStage::Select,
            container,
            resizer: None,
            cropped: None,
            filter,
            message: None,
            preference,
            today,
        }
    }

    pub fn stage(&self) -> UploadStage {
        self.stage
    }

    pub fn message(&self) -> Option<&UploadMessage> {
        self.message.as_ref()
    }

    pub fn filter(&self) -> Filter {
        self.filter
    }

    pub fn resizer(&self) -> Option<&Resizer> {
        self.resizer.as_ref()
    }

    pub fn resizer_mut(&mut self) -> Option<&mut Resizer> {
        self.resizer.as_mut()
    }

    pub fn cropped(&self) -> Option<&ExportedImage> {
        self.cropped.as_ref()
    }

    fn expect_stage(&self, stage: UploadStage, action: &'static str) -> ResizerResult<()> {
        if self.stage == stage {
            Ok(())
        } else {
            Err(ResizerError::OutOfOrder(action, self.stage.name()))
        }
    }

    fn cleanup_resizer(&mut self) {
        if let Some(mut resizer) = self.resizer.take() {
            if let Err(e) = resizer.remove() {
                log::warn!("Failed to detach resizer: {e}");
            }
        }
    }

    /// Accept a picked file: check its type, start a fresh engine on it and
    /// move to the resize stage once it has decoded.
    pub async fn select_file(&mut self, mime: &str, source: ImageSource) -> ResizerResult<()> {
        self.expect_stage(UploadStage::Select, "select a file")?;

        if let Err(e) = FileType::from_mime(mime) {
            log::warn!("Rejected upload: {e}");
            self.message = Some(UploadMessage::Error(e.to_string()));
            return Err(e);
        }

        self.message = Some(UploadMessage::Uploading);
        self.cleanup_resizer();

        let mut resizer = Resizer::new(source);
        resizer.set_element(&self.container)?;
        if let Err(e) = resizer.load().await {
            self.message = Some(UploadMessage::Error(e.to_string()));
            return Err(e);
        }

        log::info!(
            "Cropping {mime} image, initial square {}",
            resizer.get_constraint()?
        );
        self.resizer = Some(resizer);
        self.cropped = None;
        self.message = None;
        self.stage = UploadStage::Resize;
        Ok(())
    }

    /// Submit the crop form: validate it against the image, apply it to the
    /// engine and export the crop for the filter stage.
    pub fn submit_resize(&mut self, form: ResizeForm) -> ResizerResult<()> {
        self.expect_stage(UploadStage::Resize, "submit the crop")?;

        let resizer = self.resizer.as_mut().ok_or(ResizerError::NotReady)?;
        let (width, height) = resizer.natural_size().ok_or(ResizerError::NotReady)?;
        form.validate(width, height)?;
        form.apply(resizer)?;

        let exported = resizer.export_image()?;
        log::debug!("exported crop {form}");
        self.cropped = Some(exported);
        self.stage = UploadStage::Filter;
        Ok(())
    }

    /// Abandon the crop and go back to file selection.
    pub fn reset_resize(&mut self) -> ResizerResult<()> {
        self.expect_stage(UploadStage::Resize, "reset the crop")?;
        self.cleanup_resizer();
        self.stage = UploadStage::Select;
        Ok(())
    }

    pub fn change_filter(&mut self, filter: Filter) {
        self.filter = filter;
    }

    /// Cropped image with the current filter applied.
    pub fn filtered_preview(&self) -> Option<RgbaImage> {
        self.cropped
            .as_ref()
            .map(|cropped| self.filter.apply(cropped.image()))
    }

    /// Leave the filter stage and return to the crop.
    pub fn reset_filter(&mut self) -> ResizerResult<()> {
        self.expect_stage(UploadStage::Filter, "reset the filter")?;
        self.cropped = None;
        self.stage = UploadStage::Resize;
        Ok(())
    }

    /// Finish the upload: remember the filter, return the filtered crop and
    /// start over.
    pub fn submit_filter(&mut self) -> ResizerResult<RgbaImage> {
        self.expect_stage(UploadStage::Filter, "submit the filter")?;

        let cropped = self.cropped.take().ok_or(ResizerError::NotReady)?;
        let result = self.filter.apply(cropped.image());

        if let Some(store) = &self.preference {
            if let Err(e) = store.save(self.filter, self.today) {
                log::warn!("Failed to remember filter {}: {e}", self.filter);
            }
        }

        self.cleanup_resizer();
        self.stage = UploadStage::Select;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::resizer::Square;
    use crate::host::InputSurface;
    use image::{DynamicImage, Rgba};
    use tempfile::tempdir;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    fn picture() -> ImageSource {
        ImageSource::Decoded(DynamicImage::ImageRgba8(RgbaImage::from_fn(80, 60, |x, y| {
            Rgba([x as u8, y as u8, 200, 255])
        })))
    }

    fn flow(input: &InputSurface) -> UploadFlow {
        UploadFlow::with_date(input.create_container("upload-resize"), None, Filter::None, date())
    }

    #[tokio::test]
    async fn full_round_trip() {
        let input = InputSurface::new();
        let container = input.create_container("upload-resize");
        let mut flow = UploadFlow::with_date(container.clone(), None, Filter::None, date());

        flow.select_file("image/png", picture()).await.unwrap();
        assert_eq!(flow.stage(), UploadStage::Resize);
        assert!(flow.message().is_none());
        assert_eq!(container.children().len(), 1);
        assert_eq!(
            flow.resizer().unwrap().get_constraint().unwrap(),
            Square::new(17.5, 7.5, 45.0)
        );

        flow.submit_resize(ResizeForm::new(10, 5, 20)).unwrap();
        assert_eq!(flow.stage(), UploadStage::Filter);
        assert_eq!(flow.cropped().unwrap().dimensions(), (20, 20));

        flow.change_filter(Filter::Marvin);
        let preview = flow.filtered_preview().unwrap();
        assert_eq!(preview.get_pixel(0, 0), &Rgba([245, 250, 55, 255]));

        let result = flow.submit_filter().unwrap();
        assert_eq!(result, preview);
        assert_eq!(flow.stage(), UploadStage::Select);
        assert!(flow.resizer().is_none());
        assert!(container.children().is_empty());
    }

    #[tokio::test]
    async fn unsupported_type_shows_error_and_stays() {
        let input = InputSurface::new();
        let mut flow = flow(&input);

        let err = flow.select_file("image/webp", picture()).await.unwrap_err();
        assert!(matches!(err, ResizerError::UnsupportedFileType(_)));
        assert!(matches!(flow.message(), Some(UploadMessage::Error(_))));
        assert_eq!(flow.stage(), UploadStage::Select);
    }

    #[tokio::test]
    async fn undecodable_file_leaves_no_surface_behind() {
        let input = InputSurface::new();
        let container = input.create_container("upload-resize");
        let mut flow = UploadFlow::with_date(container.clone(), None, Filter::None, date());

        let err = flow
            .select_file("image/png", ImageSource::Bytes(b"broken".to_vec()))
            .await
            .unwrap_err();
        assert!(matches!(err, ResizerError::DecodeFailed(_)));
        assert!(container.children().is_empty());
        assert_eq!(flow.stage(), UploadStage::Select);
    }

    #[tokio::test]
    async fn invalid_crop_keeps_resize_stage() {
        let input = InputSurface::new();
        let mut flow = flow(&input);
        flow.select_file("image/png", picture()).await.unwrap();

        let err = flow.submit_resize(ResizeForm::new(70, 0, 20)).unwrap_err();
        assert!(matches!(err, ResizerError::InvalidRegion(_)));
        assert_eq!(flow.stage(), UploadStage::Resize);
        assert!(flow.cropped().is_none());
    }

    #[tokio::test]
    async fn resets_walk_back_one_stage() {
        let input = InputSurface::new();
        let mut flow = flow(&input);
        flow.select_file("image/gif", picture()).await.unwrap();
        flow.submit_resize(ResizeForm::new(0, 0, 10)).unwrap();

        flow.reset_filter().unwrap();
        assert_eq!(flow.stage(), UploadStage::Resize);
        assert!(flow.resizer().is_some());

        flow.reset_resize().unwrap();
        assert_eq!(flow.stage(), UploadStage::Select);
        assert!(flow.resizer().is_none());
    }

    #[test]
    fn steps_out_of_order_are_refused() {
        let input = InputSurface::new();
        let mut flow = flow(&input);
        assert!(matches!(
            flow.submit_resize(ResizeForm::new(0, 0, 1)),
            Err(ResizerError::OutOfOrder(_, "select"))
        ));
        assert!(flow.submit_filter().is_err());
        assert!(flow.reset_filter().is_err());
    }

    #[tokio::test]
    async fn submitted_filter_is_remembered() {
        let dir = tempdir().unwrap();
        let store = FilterPreference::new(dir.path().join("filter.json"));
        let input = InputSurface::new();

        let mut flow = UploadFlow::with_date(
            input.create_container("upload-resize"),
            Some(store.clone()),
            Filter::None,
            date(),
        );
        flow.select_file("image/jpeg", picture()).await.unwrap();
        flow.submit_resize(ResizeForm::new(0, 0, 10)).unwrap();
        flow.change_filter(Filter::Chrome);
        flow.submit_filter().unwrap();

        let next = UploadFlow::with_date(
            input.create_container("upload-resize"),
            Some(store),
            Filter::None,
            date(),
        );
        assert_eq!(next.filter(), Filter::Chrome);
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Session controller: turns user actions into background requests and
// applies their results to `AppState` on the task that owns it.
//
// Requests run as spawned Tokio tasks and report back over an unbounded
// channel. Only one request is in flight at a time; actions arriving while
// busy are dropped, like a disabled button.

use std::sync::Arc;

use entzerr_bridge::NativePhotoPicker;
use entzerr_core::error::{EntzerrError, Result};
use entzerr_core::human_errors::humanize_error;
use entzerr_core::{AppConfig, CorrectionId, CorrectionMode, Size};
use entzerr_photo::CornerEditor;
use image::DynamicImage;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::services::correction::CorrectionService;
use crate::state::{AppState, CorrectionStage};

/// Result of a background request, delivered to the UI task.
#[derive(Debug)]
pub enum SessionEvent {
    PhotoDecoded(Result<DynamicImage>),
    Corrected {
        id: CorrectionId,
        mode: CorrectionMode,
        result: Result<DynamicImage>,
    },
}

/// Drives one editing session.
///
/// Methods that start work spawn onto the current Tokio runtime and must be
/// called from within one.
pub struct Controller {
    service: CorrectionService,
    state: AppState,
    events_tx: mpsc::UnboundedSender<SessionEvent>,
    events_rx: mpsc::UnboundedReceiver<SessionEvent>,
}

impl Controller {
    pub fn new(service: CorrectionService, config: &AppConfig) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            service,
            state: AppState::new(config),
            events_tx,
            events_rx,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn editor_mut(&mut self) -> &mut CornerEditor {
        &mut self.state.editor
    }

    // -- Actions -------------------------------------------------------------

    pub fn set_mode(&mut self, mode: CorrectionMode) {
        if self.state.mode != mode {
            debug!(?mode, "Correction mode changed");
        }
        self.state.mode = mode;
    }

    /// Ask the platform for a photo and start decoding it.
    ///
    /// Returns whether a decode was started. Cancelling the picker is not an
    /// error.
    pub fn pick_photo<P>(&mut self, picker: &P) -> bool
    where
        P: NativePhotoPicker + ?Sized,
    {
        if self.ignore_while_busy("pick_photo") {
            return false;
        }
        match picker.pick_photo() {
            Ok(Some(bytes)) => self.load_photo_bytes(bytes),
            Ok(None) => {
                debug!("Photo picker cancelled");
                false
            }
            Err(err) => {
                self.report(err);
                false
            }
        }
    }

    /// Start decoding encoded photo bytes. The displayed image is replaced
    /// only if decoding succeeds.
    pub fn load_photo_bytes(&mut self, bytes: Vec<u8>) -> bool {
        if self.ignore_while_busy("load_photo_bytes") {
            return false;
        }
        self.state.stage = CorrectionStage::Decoding;

        let service = self.service.clone();
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = service.decode_photo(bytes).await;
            let _ = tx.send(SessionEvent::PhotoDecoded(result));
        });
        true
    }

    /// Start a correction of the displayed image in the current mode.
    ///
    /// `rendered` is the on-screen extent the corner handles were placed
    /// over; it is only used in manual mode. Returns whether a request was
    /// started.
    pub fn request_correction(&mut self, rendered: Size) -> bool {
        if self.ignore_while_busy("request_correction") {
            return false;
        }
        let Some(image) = self.state.displayed.clone() else {
            self.report(EntzerrError::NoPhotoLoaded);
            return false;
        };

        let id = CorrectionId::new();
        let mode = self.state.mode;
        let service = self.service.clone();
        let tx = self.events_tx.clone();

        match mode {
            CorrectionMode::Auto => {
                self.state.stage = CorrectionStage::Detecting;
                tokio::spawn(async move {
                    let result = service.auto_correct(image).await;
                    let _ = tx.send(SessionEvent::Corrected { id, mode, result });
                });
            }
            CorrectionMode::Manual => {
                let source = Size::of_raster(image.width(), image.height());
                let quad = match self.state.editor.to_source_space(rendered, source) {
                    Ok(quad) => quad,
                    Err(err) => {
                        self.report(err);
                        return false;
                    }
                };
                self.state.stage = CorrectionStage::Correcting;
                tokio::spawn(async move {
                    let result = service.manual_correct(image, quad).await;
                    let _ = tx.send(SessionEvent::Corrected { id, mode, result });
                });
            }
        }
        info!(%id, ?mode, "Correction requested");
        true
    }

    // -- Event delivery ------------------------------------------------------

    /// Wait for the in-flight request to finish and apply its result.
    ///
    /// Returns `false` straight away when nothing is in flight.
    pub async fn process_next_event(&mut self) -> bool {
        if !self.state.is_busy() {
            return false;
        }
        match self.events_rx.recv().await {
            Some(event) => {
                self.apply(event);
                true
            }
            None => false,
        }
    }

    /// Apply every result that has already arrived. Returns how many were
    /// applied.
    pub fn process_pending_events(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.apply(event);
            applied += 1;
        }
        applied
    }

    /// Fold one result into the state. Failures never touch the displayed
    /// image.
    pub fn apply(&mut self, event: SessionEvent) {
        self.state.stage = CorrectionStage::Idle;
        match event {
            SessionEvent::PhotoDecoded(Ok(image)) => {
                info!(width = image.width(), height = image.height(), "Photo loaded");
                self.state.displayed = Some(Arc::new(image));
                self.state.status = None;
            }
            SessionEvent::PhotoDecoded(Err(err)) => self.report(err),
            SessionEvent::Corrected {
                id,
                mode,
                result: Ok(image),
            } => {
                info!(%id, ?mode, "Correction applied");
                self.state.displayed = Some(Arc::new(image));
                self.state.status = None;
                if mode == CorrectionMode::Manual {
                    self.state.editor.reset();
                }
            }
            SessionEvent::Corrected {
                id,
                result: Err(err),
                ..
            } => {
                debug!(%id, "Correction did not produce an image");
                self.report(err);
            }
        }
    }

    fn ignore_while_busy(&self, action: &str) -> bool {
        if self.state.is_busy() {
            debug!(action, stage = ?self.state.stage, "Ignoring action while busy");
            return true;
        }
        false
    }

    fn report(&mut self, err: EntzerrError) {
        let human = humanize_error(&err);
        if human.is_visible() {
            warn!(error = %err, "Action failed");
            self.state.status = Some(human);
        } else {
            debug!(error = %err, "Action finished without a result");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use entzerr_core::human_errors::Severity;
    use entzerr_core::{Corner, Point, Quad};
    use entzerr_photo::{DetectedQuad, HoughQuadDetector, PerspectiveCorrector, QuadDetector};
    use image::codecs::png::PngEncoder;
    use image::{ExtendedColorType, ImageEncoder, ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    fn png_bytes(image: &DynamicImage) -> Vec<u8> {
        let mut buf = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .expect("encode png");
        buf
    }

    fn gradient_png(w: u32, h: u32) -> Vec<u8> {
        png_bytes(&DynamicImage::ImageRgba8(RgbaImage::from_fn(w, h, |x, y| {
            Rgba([(x * 3) as u8, (y * 5) as u8, 80, 255])
        })))
    }

    fn blank_png(w: u32, h: u32) -> Vec<u8> {
        png_bytes(&DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            w,
            h,
            Rgba([200, 200, 200, 255]),
        )))
    }

    /// PNG stored sideways with EXIF orientation 6 (rotate 90° clockwise).
    fn sideways_png(w: u32, h: u32) -> Vec<u8> {
        let mut exif = vec![b'I', b'I', 0x2A, 0x00];
        exif.extend_from_slice(&8u32.to_le_bytes());
        exif.extend_from_slice(&1u16.to_le_bytes());
        exif.extend_from_slice(&0x0112u16.to_le_bytes());
        exif.extend_from_slice(&3u16.to_le_bytes());
        exif.extend_from_slice(&1u32.to_le_bytes());
        exif.extend_from_slice(&6u16.to_le_bytes());
        exif.extend_from_slice(&[0, 0]);
        exif.extend_from_slice(&0u32.to_le_bytes());

        let img = RgbaImage::from_pixel(w, h, Rgba([10, 20, 30, 255]));
        let mut buf = Vec::new();
        let mut encoder = PngEncoder::new(&mut buf);
        encoder.set_exif_metadata(exif).expect("png carries exif");
        encoder
            .write_image(img.as_raw(), w, h, ExtendedColorType::Rgba8)
            .expect("encode png");
        buf
    }

    fn hough_controller() -> Controller {
        let config = AppConfig::default();
        Controller::new(CorrectionService::from_config(&config), &config)
    }

    async fn loaded(mut controller: Controller, bytes: Vec<u8>) -> Controller {
        assert!(controller.load_photo_bytes(bytes));
        assert!(controller.process_next_event().await);
        assert!(controller.state().displayed.is_some());
        controller
    }

    fn displayed(controller: &Controller) -> Arc<DynamicImage> {
        controller
            .state()
            .displayed
            .clone()
            .expect("an image is displayed")
    }

    struct CancellingPicker;

    impl NativePhotoPicker for CancellingPicker {
        fn pick_photo(&self) -> Result<Option<Vec<u8>>> {
            Ok(None)
        }
    }

    struct FixedPicker(Vec<u8>);

    impl NativePhotoPicker for FixedPicker {
        fn pick_photo(&self) -> Result<Option<Vec<u8>>> {
            Ok(Some(self.0.clone()))
        }
    }

    #[tokio::test]
    async fn blank_photo_in_auto_mode_changes_nothing() {
        let mut controller = loaded(hough_controller(), blank_png(64, 48)).await;
        let before = displayed(&controller);

        assert!(controller.request_correction(Size::new(64.0, 48.0)));
        controller.process_next_event().await;

        assert!(Arc::ptr_eq(&before, &displayed(&controller)));
        assert!(controller.state().status.is_none());
        assert!(!controller.state().is_busy());
    }

    #[tokio::test]
    async fn decode_failure_keeps_the_previous_photo() {
        let mut controller = loaded(hough_controller(), gradient_png(32, 24)).await;
        let before = displayed(&controller);

        assert!(controller.load_photo_bytes(b"definitely not an image".to_vec()));
        controller.process_next_event().await;

        assert!(Arc::ptr_eq(&before, &displayed(&controller)));
        let status = controller.state().status.clone().expect("decode error shown");
        assert_eq!(status.severity, Severity::Permanent);
    }

    #[tokio::test]
    async fn degenerate_manual_corners_are_reported() {
        let mut controller = loaded(hough_controller(), gradient_png(64, 48)).await;
        let before = displayed(&controller);
        controller.set_mode(CorrectionMode::Manual);
        let editor = controller.editor_mut();
        editor.move_corner(Corner::TopLeft, Point::new(0.0, 0.0));
        editor.move_corner(Corner::TopRight, Point::new(50.0, 0.0));
        editor.move_corner(Corner::BottomLeft, Point::new(100.0, 0.0));

        assert!(controller.request_correction(Size::new(64.0, 48.0)));
        controller.process_next_event().await;

        assert!(Arc::ptr_eq(&before, &displayed(&controller)));
        let status = controller.state().status.clone().expect("degenerate error shown");
        assert_eq!(status.severity, Severity::ActionRequired);
    }

    #[tokio::test]
    async fn manual_correction_replaces_the_photo_and_resets_handles() {
        let mut controller = loaded(hough_controller(), gradient_png(64, 48)).await;
        let before = displayed(&controller);
        controller.set_mode(CorrectionMode::Manual);
        let editor = controller.editor_mut();
        // Rendered at half size.
        editor.move_corner(Corner::TopLeft, Point::new(4.0, 3.0));
        editor.move_corner(Corner::TopRight, Point::new(28.0, 3.0));
        editor.move_corner(Corner::BottomLeft, Point::new(4.0, 21.0));
        editor.move_corner(Corner::BottomRight, Point::new(28.0, 21.0));

        assert!(controller.request_correction(Size::new(32.0, 24.0)));
        controller.process_next_event().await;

        let after = displayed(&controller);
        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!((after.width(), after.height()), (64, 48));
        assert!(controller.state().status.is_none());
        assert_eq!(controller.state().editor.snapshot(), Quad::square(100.0));
    }

    #[tokio::test]
    async fn auto_correction_uses_the_detector() {
        let detector: Arc<dyn QuadDetector> = Arc::new(|_: &DynamicImage| {
            Some(DetectedQuad::new(
                Quad::new(
                    Point::new(0.25, 0.75),
                    Point::new(0.75, 0.75),
                    Point::new(0.25, 0.25),
                    Point::new(0.75, 0.25),
                ),
                0.25,
            ))
        });
        let service = CorrectionService::new(detector, PerspectiveCorrector::default());
        let controller = Controller::new(service, &AppConfig::default());
        let mut controller = loaded(controller, gradient_png(40, 40)).await;
        let before = displayed(&controller);

        assert!(controller.request_correction(Size::new(1.0, 1.0)));
        controller.process_next_event().await;

        assert!(!Arc::ptr_eq(&before, &displayed(&controller)));
        assert!(controller.state().status.is_none());
    }

    #[tokio::test]
    async fn actions_are_ignored_while_busy() {
        let mut controller = loaded(hough_controller(), gradient_png(64, 48)).await;

        assert!(controller.request_correction(Size::new(64.0, 48.0)));
        assert!(controller.state().is_busy());
        assert!(!controller.request_correction(Size::new(64.0, 48.0)));
        assert!(!controller.load_photo_bytes(gradient_png(8, 8)));
        assert!(!controller.pick_photo(&FixedPicker(gradient_png(8, 8))));

        controller.process_next_event().await;
        assert!(!controller.state().is_busy());
        assert_eq!(controller.process_pending_events(), 0);
    }

    #[tokio::test]
    async fn loaded_photo_is_shown_upright() {
        let controller = loaded(hough_controller(), sideways_png(40, 10)).await;
        let image = displayed(&controller);
        assert_eq!((image.width(), image.height()), (10, 40));
    }

    #[tokio::test]
    async fn waiting_while_idle_returns_at_once() {
        let mut controller = hough_controller();
        assert!(!controller.process_next_event().await);

        let mut controller = loaded(controller, gradient_png(8, 8)).await;
        assert!(!controller.process_next_event().await);
    }

    #[tokio::test]
    async fn correcting_without_a_photo_asks_for_one() {
        let mut controller = hough_controller();
        assert!(!controller.request_correction(Size::new(10.0, 10.0)));
        let status = controller.state().status.clone().expect("status set");
        assert_eq!(status.severity, Severity::ActionRequired);
    }

    #[tokio::test]
    async fn zero_rendered_extent_is_reported_without_starting_work() {
        let mut controller = loaded(hough_controller(), gradient_png(16, 16)).await;
        controller.set_mode(CorrectionMode::Manual);
        assert!(!controller.request_correction(Size::new(0.0, 16.0)));
        assert!(!controller.state().is_busy());
        assert!(controller.state().status.is_some());
    }

    #[tokio::test]
    async fn picker_results_drive_loading() {
        let mut controller = hough_controller();
        assert!(!controller.pick_photo(&CancellingPicker));
        assert!(controller.state().status.is_none());

        let stub = entzerr_bridge::platform_bridge();
        assert!(!controller.pick_photo(&*stub));
        let status = controller.state().status.clone().expect("unavailable shown");
        assert_eq!(status.severity, Severity::Permanent);

        assert!(controller.pick_photo(&FixedPicker(gradient_png(12, 10))));
        controller.process_next_event().await;
        let image = displayed(&controller);
        assert_eq!((image.width(), image.height()), (12, 10));
        assert!(controller.state().status.is_none());
    }

    #[test]
    fn starts_in_the_configured_mode() {
        let config = AppConfig {
            default_mode: CorrectionMode::Manual,
            editor_default_side: 60.0,
            ..AppConfig::default()
        };
        let controller = Controller::new(
            CorrectionService::new(
                Arc::new(HoughQuadDetector::default()),
                PerspectiveCorrector::default(),
            ),
            &config,
        );
        assert_eq!(controller.state().mode, CorrectionMode::Manual);
        assert_eq!(controller.state().editor.snapshot(), Quad::square(60.0));
    }
}

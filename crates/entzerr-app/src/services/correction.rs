// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Correction service: decoding, detection, and perspective correction run on
// the blocking thread pool so the interactive task never stalls.

use std::sync::Arc;

use entzerr_core::error::{EntzerrError, Result};
use entzerr_core::{AppConfig, Quad};
use entzerr_photo::{HoughQuadDetector, PerspectiveCorrector, QuadDetector, decode_photo};
use image::DynamicImage;
use tracing::{debug, info, instrument};

/// Async facade over the photo pipeline.
///
/// Cheap to clone: the detector is shared behind an `Arc`.
#[derive(Clone)]
pub struct CorrectionService {
    detector: Arc<dyn QuadDetector>,
    corrector: PerspectiveCorrector,
}

impl CorrectionService {
    pub fn new(detector: Arc<dyn QuadDetector>, corrector: PerspectiveCorrector) -> Self {
        Self {
            detector,
            corrector,
        }
    }

    /// Hough detector and corrector configured from `config`.
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            Arc::new(HoughQuadDetector::new(config.detector.clone())),
            PerspectiveCorrector::new(config.background),
        )
    }

    pub fn corrector(&self) -> PerspectiveCorrector {
        self.corrector
    }

    /// Decode photo bytes and return the upright raster.
    #[instrument(skip_all, fields(len = bytes.len()))]
    pub async fn decode_photo(&self, bytes: Vec<u8>) -> Result<DynamicImage> {
        run_blocking(move || {
            let photo = decode_photo(&bytes)?;
            Ok(photo.into_upright())
        })
        .await
    }

    /// Detect a quadrilateral in `image` and correct it.
    ///
    /// Fails with `DetectionEmpty` when the detector finds nothing.
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub async fn auto_correct(&self, image: Arc<DynamicImage>) -> Result<DynamicImage> {
        let detector = Arc::clone(&self.detector);
        let corrector = self.corrector;
        run_blocking(move || {
            let detected = detector
                .detect(&image)
                .ok_or(EntzerrError::DetectionEmpty)?;
            let quad = detected.to_raster(image.width(), image.height());
            debug!(confidence = detected.confidence, ?quad, "Using detected corners");
            corrector.correct(&image, &quad)
        })
        .await
    }

    /// Correct `image` with corners already in its pixel space.
    #[instrument(skip(self, image), fields(width = image.width(), height = image.height()))]
    pub async fn manual_correct(&self, image: Arc<DynamicImage>, quad: Quad) -> Result<DynamicImage> {
        let corrector = self.corrector;
        let out = run_blocking(move || corrector.correct(&image, &quad)).await?;
        info!("Manual correction finished");
        Ok(out)
    }
}

/// Run `f` on the blocking pool. A panic inside `f` becomes `TaskFailed`.
async fn run_blocking<T, F>(f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| EntzerrError::TaskFailed(e.to_string()))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use entzerr_core::Point;
    use entzerr_photo::DetectedQuad;
    use image::{Rgba, RgbaImage};

    fn gradient(w: u32, h: u32) -> Arc<DynamicImage> {
        Arc::new(DynamicImage::ImageRgba8(RgbaImage::from_fn(w, h, |x, y| {
            Rgba([x as u8, y as u8, 0, 255])
        })))
    }

    #[tokio::test]
    async fn auto_correct_reports_empty_detection() {
        let detector: Arc<dyn QuadDetector> =
            Arc::new(|_: &DynamicImage| -> Option<DetectedQuad> { None });
        let svc = CorrectionService::new(detector, PerspectiveCorrector::default());
        let err = svc.auto_correct(gradient(40, 30)).await.unwrap_err();
        assert!(matches!(err, EntzerrError::DetectionEmpty));
    }

    #[tokio::test]
    async fn auto_correct_uses_detected_corners() {
        let detector: Arc<dyn QuadDetector> = Arc::new(|_: &DynamicImage| {
            Some(DetectedQuad::new(
                Quad::new(
                    Point::new(0.1, 0.9),
                    Point::new(0.9, 0.9),
                    Point::new(0.1, 0.1),
                    Point::new(0.9, 0.1),
                ),
                0.7,
            ))
        });
        let svc = CorrectionService::new(detector, PerspectiveCorrector::default());
        let out = svc.auto_correct(gradient(40, 30)).await.expect("corrected");
        assert_eq!((out.width(), out.height()), (40, 30));
        // Output top-left samples near raster (4, 3).
        let px = out.to_rgba8().get_pixel(0, 0).0;
        assert!(px[0].abs_diff(4) <= 1 && px[1].abs_diff(3) <= 1, "{px:?}");
    }

    #[tokio::test]
    async fn manual_correct_rejects_collinear_corners() {
        let svc = CorrectionService::from_config(&AppConfig::default());
        let quad = Quad::new(
            Point::new(0.0, 0.0),
            Point::new(50.0, 0.0),
            Point::new(100.0, 0.0),
            Point::new(100.0, 100.0),
        );
        let err = svc.manual_correct(gradient(40, 30), quad).await.unwrap_err();
        assert!(matches!(err, EntzerrError::DegenerateQuadrilateral(_)));
    }

    #[tokio::test]
    async fn decode_rejects_garbage() {
        let svc = CorrectionService::from_config(&AppConfig::default());
        let err = svc.decode_photo(b"not a photo".to_vec()).await.unwrap_err();
        assert!(matches!(err, EntzerrError::DecodeFailure(_)));
    }

    #[tokio::test]
    async fn panicking_detector_becomes_task_failed() {
        let detector: Arc<dyn QuadDetector> =
            Arc::new(|_: &DynamicImage| -> Option<DetectedQuad> { panic!("detector blew up") });
        let svc = CorrectionService::new(detector, PerspectiveCorrector::default());
        let err = svc.auto_correct(gradient(8, 8)).await.unwrap_err();
        assert!(matches!(err, EntzerrError::TaskFailed(_)));
    }
}

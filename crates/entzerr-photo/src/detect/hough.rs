// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Hough-line quadrilateral detector: finds the dominant document edges with
// Canny + the Hough line transform and intersects them into four corners.

use entzerr_core::{DetectorConfig, Point, Quad};
use image::{DynamicImage, GrayImage};
use imageproc::edges::canny;
use imageproc::filter::gaussian_blur_f32;
use imageproc::hough::{LineDetectionOptions, PolarLine, detect_lines};
use tracing::{debug, info, instrument, warn};

use super::{DetectedQuad, QuadDetector};

/// Corners may sit this fraction of the image size outside the frame
/// before a candidate is rejected.
const FRAME_TOLERANCE: f64 = 0.05;

const MIN_SIDE: u32 = 16;

/// Detects a single quadrilateral from the four extreme straight edges.
///
/// ## Pipeline
///
/// 1. Convert to grayscale
/// 2. Gaussian blur for noise reduction
/// 3. Canny edge detection
/// 4. Hough line detection to find dominant straight edges
/// 5. Classify lines as roughly horizontal or roughly vertical
/// 6. Select the four extreme edges (top/bottom, left/right)
/// 7. Compute corner points from pairwise line intersections
/// 8. Reject candidates that are too small or lie outside the frame
///
/// The result is reported in normalized y-up coordinates.
#[derive(Debug, Clone, Default)]
pub struct HoughQuadDetector {
    config: DetectorConfig,
}

impl HoughQuadDetector {
    pub fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Run the pipeline and return the quad in raster space (pixels, y down)
    /// together with its confidence.
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn detect_raster(&self, image: &DynamicImage) -> Option<(Quad, f64)> {
        let (w, h) = (image.width(), image.height());
        if w < MIN_SIDE || h < MIN_SIDE {
            warn!("Image too small for edge detection");
            return None;
        }
        let cfg = &self.config;

        let gray = image.to_luma8();
        let blurred = gaussian_blur_f32(&gray, cfg.blur_sigma);
        let edges = canny(&blurred, cfg.canny_low, cfg.canny_high);
        debug!(sigma = cfg.blur_sigma, "Edges extracted");

        let (horizontal, vertical) = self.edge_lines(&edges, w, h)?;

        let (cx, cy) = (w as f64 / 2.0, h as f64 / 2.0);
        let top = extreme_line(&horizontal, |l| y_at(l, cx), Extreme::Min)?;
        let bottom = extreme_line(&horizontal, |l| y_at(l, cx), Extreme::Max)?;
        let left = extreme_line(&vertical, |l| x_at(l, cy), Extreme::Min)?;
        let right = extreme_line(&vertical, |l| x_at(l, cy), Extreme::Max)?;

        let quad = Quad::new(
            intersect_polar_lines(&top, &left)?,
            intersect_polar_lines(&top, &right)?,
            intersect_polar_lines(&bottom, &left)?,
            intersect_polar_lines(&bottom, &right)?,
        );
        debug!(?quad, "Quadrilateral corners computed");

        let (wf, hf) = (w as f64, h as f64);
        let (mx, my) = (wf * FRAME_TOLERANCE, hf * FRAME_TOLERANCE);
        let in_frame = quad
            .to_array()
            .iter()
            .all(|p| p.x >= -mx && p.x <= wf + mx && p.y >= -my && p.y <= hf + my);
        if !in_frame {
            debug!("Candidate corners fall outside the frame");
            return None;
        }

        let image_area = wf * hf;
        let area = quad.area();
        if area < image_area * cfg.min_area_fraction {
            debug!(
                area,
                min_area = image_area * cfg.min_area_fraction,
                "Candidate too small"
            );
            return None;
        }

        let clamped = quad.map(|p| Point::new(p.x.clamp(0.0, wf), p.y.clamp(0.0, hf)));
        let confidence = (area / image_area).min(1.0);
        info!(confidence, "Quadrilateral detected");
        Some((clamped, confidence))
    }
}

impl HoughQuadDetector {
    /// Hough lines split into horizontal and vertical sets, with at least
    /// two of each.
    ///
    /// The first threshold scales with the diagonal so detection behaves the
    /// same across resolutions. Slanted edges spread their votes over
    /// neighbouring angle bins, so when an edge is missing the threshold is
    /// lowered by a quarter at a time, down to `relaxed_vote_fraction` of the
    /// shorter side.
    fn edge_lines(
        &self,
        edges: &GrayImage,
        w: u32,
        h: u32,
    ) -> Option<(Vec<PolarLine>, Vec<PolarLine>)> {
        let cfg = &self.config;
        let diagonal = (w as f64).hypot(h as f64);
        let floor = ((w.min(h) as f64 * cfg.relaxed_vote_fraction) as u32).max(1);
        let mut vote_threshold = ((diagonal * cfg.vote_fraction) as u32)
            .max(cfg.min_votes)
            .max(floor);

        loop {
            let options = LineDetectionOptions {
                vote_threshold,
                suppression_radius: cfg.suppression_radius,
            };
            let lines = detect_lines(edges, options);
            let (horizontal, vertical) = classify_lines(&lines);
            debug!(
                vote_threshold,
                horizontal = horizontal.len(),
                vertical = vertical.len(),
                "Hough lines detected"
            );
            if horizontal.len() >= 2 && vertical.len() >= 2 {
                return Some((horizontal, vertical));
            }
            if vote_threshold <= floor {
                debug!("Not enough edges for a quadrilateral");
                return None;
            }
            vote_threshold = (vote_threshold * 3 / 4).max(floor);
        }
    }
}

impl QuadDetector for HoughQuadDetector {
    fn detect(&self, image: &DynamicImage) -> Option<DetectedQuad> {
        let (quad, confidence) = self.detect_raster(image)?;
        Some(DetectedQuad::from_raster(
            &quad,
            image.width(),
            image.height(),
            confidence,
        ))
    }
}

#[derive(Debug, Clone, Copy)]
enum Extreme {
    Min,
    Max,
}

/// Split Hough lines into roughly horizontal and roughly vertical sets.
///
/// `PolarLine` describes `x*cos(θ) + y*sin(θ) = r`, so θ near 90° is a
/// horizontal line and θ near 0° or 180° a vertical one. Lines within 30° of
/// either axis are kept; diagonals are discarded.
fn classify_lines(lines: &[PolarLine]) -> (Vec<PolarLine>, Vec<PolarLine>) {
    let mut horizontal = Vec::new();
    let mut vertical = Vec::new();

    for line in lines {
        let angle = line.angle_in_degrees;
        if (60..=120).contains(&angle) {
            horizontal.push(*line);
        } else if angle <= 30 || angle >= 150 {
            vertical.push(*line);
        }
    }

    (horizontal, vertical)
}

/// The line whose `position` is smallest or largest.
fn extreme_line(
    lines: &[PolarLine],
    position: impl Fn(&PolarLine) -> f64,
    which: Extreme,
) -> Option<PolarLine> {
    let keyed = lines.iter().map(|l| (position(l), *l));
    let pick = match which {
        Extreme::Min => keyed.min_by(|a, b| a.0.total_cmp(&b.0)),
        Extreme::Max => keyed.max_by(|a, b| a.0.total_cmp(&b.0)),
    };
    pick.map(|(_, line)| line)
}

/// y where a (roughly horizontal) line crosses the vertical `x = x0`.
fn y_at(line: &PolarLine, x0: f64) -> f64 {
    let theta = (line.angle_in_degrees as f64).to_radians();
    (line.r as f64 - x0 * theta.cos()) / theta.sin()
}

/// x where a (roughly vertical) line crosses the horizontal `y = y0`.
fn x_at(line: &PolarLine, y0: f64) -> f64 {
    let theta = (line.angle_in_degrees as f64).to_radians();
    (line.r as f64 - y0 * theta.sin()) / theta.cos()
}

/// Intersection of two lines in polar (Hough) form, or `None` if they are
/// (nearly) parallel.
fn intersect_polar_lines(a: &PolarLine, b: &PolarLine) -> Option<Point> {
    let theta_a = (a.angle_in_degrees as f64).to_radians();
    let theta_b = (b.angle_in_degrees as f64).to_radians();

    let (sin_a, cos_a) = theta_a.sin_cos();
    let (sin_b, cos_b) = theta_b.sin_cos();

    let denom = cos_a * sin_b - sin_a * cos_b;
    if denom.abs() < 1e-6 {
        return None;
    }

    let (r_a, r_b) = (a.r as f64, b.r as f64);
    let x = (r_a * sin_b - r_b * sin_a) / denom;
    let y = (r_b * cos_a - r_a * cos_b) / denom;
    Some(Point::new(x, y))
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for Entzerrer.

use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::error::{EntzerrError, Result};

/// Unique identifier for a single detect/correct request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CorrectionId(pub Uuid);

impl CorrectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CorrectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CorrectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A position in raster space: pixels, top-left origin, y increasing downward.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance(&self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Scale each axis independently.
    pub fn scaled(&self, sx: f64, sy: f64) -> Self {
        Self::new(self.x * sx, self.y * sy)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

/// Width and height of a rendering or raster, in (possibly fractional) pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Size of a raster with integer dimensions.
    pub fn of_raster(width: u32, height: u32) -> Self {
        Self::new(width as f64, height as f64)
    }

    /// Both sides finite and strictly positive.
    pub fn is_usable(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// One of the four corner handles of a quadrilateral.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];
}

/// Four independent corner points. No convexity or ordering is enforced:
/// dragged handles may cross.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Quad {
    pub top_left: Point,
    pub top_right: Point,
    pub bottom_left: Point,
    pub bottom_right: Point,
}

impl Quad {
    pub const fn new(
        top_left: Point,
        top_right: Point,
        bottom_left: Point,
        bottom_right: Point,
    ) -> Self {
        Self {
            top_left,
            top_right,
            bottom_left,
            bottom_right,
        }
    }

    /// The quad spanning a whole `width` x `height` raster.
    pub fn full_extent(width: f64, height: f64) -> Self {
        Self::new(
            Point::new(0.0, 0.0),
            Point::new(width, 0.0),
            Point::new(0.0, height),
            Point::new(width, height),
        )
    }

    /// An axis-aligned square of side `side` anchored at the origin.
    pub fn square(side: f64) -> Self {
        Self::full_extent(side, side)
    }

    pub fn corner(&self, corner: Corner) -> Point {
        match corner {
            Corner::TopLeft => self.top_left,
            Corner::TopRight => self.top_right,
            Corner::BottomLeft => self.bottom_left,
            Corner::BottomRight => self.bottom_right,
        }
    }

    pub fn corner_mut(&mut self, corner: Corner) -> &mut Point {
        match corner {
            Corner::TopLeft => &mut self.top_left,
            Corner::TopRight => &mut self.top_right,
            Corner::BottomLeft => &mut self.bottom_left,
            Corner::BottomRight => &mut self.bottom_right,
        }
    }

    /// Corners in `[top_left, top_right, bottom_left, bottom_right]` order.
    pub fn to_array(&self) -> [Point; 4] {
        [
            self.top_left,
            self.top_right,
            self.bottom_left,
            self.bottom_right,
        ]
    }

    /// Apply `f` to every corner.
    pub fn map(&self, f: impl Fn(Point) -> Point) -> Self {
        Self::new(
            f(self.top_left),
            f(self.top_right),
            f(self.bottom_left),
            f(self.bottom_right),
        )
    }

    /// Exchange left and right corners (a horizontal mirror of the labelling).
    pub fn mirrored_horizontally(&self) -> Self {
        Self::new(
            self.top_right,
            self.top_left,
            self.bottom_right,
            self.bottom_left,
        )
    }

    /// Area via the shoelace formula over the perimeter order
    /// TL → TR → BR → BL. Self-intersecting quads yield a reduced area.
    pub fn area(&self) -> f64 {
        let ring = [
            self.top_left,
            self.top_right,
            self.bottom_right,
            self.bottom_left,
        ];
        let mut twice = 0.0;
        for i in 0..ring.len() {
            let j = (i + 1) % ring.len();
            twice += ring[i].x * ring[j].y - ring[j].x * ring[i].y;
        }
        twice.abs() / 2.0
    }
}

/// Orientation of a raster buffer relative to its upright appearance.
///
/// Discriminants are the EXIF Orientation tag (0x0112) codes. Each tag names
/// the transform that turns the stored buffer upright:
///
/// ```text
/// | Tag | Variant       | Restore with        | Swaps axes |
/// |-----|---------------|---------------------|------------|
/// | 1   | Up            | nothing             | no         |
/// | 2   | UpMirrored    | flip horizontal     | no         |
/// | 3   | Down          | rotate 180          | no         |
/// | 4   | DownMirrored  | flip vertical       | no         |
/// | 5   | LeftMirrored  | rotate 90 CW + flip | yes        |
/// | 6   | Right         | rotate 90 CW        | yes        |
/// | 7   | RightMirrored | rotate 270 CW + flip| yes        |
/// | 8   | Left          | rotate 270 CW       | yes        |
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Orientation {
    #[default]
    Up = 1,
    UpMirrored = 2,
    Down = 3,
    DownMirrored = 4,
    LeftMirrored = 5,
    Right = 6,
    RightMirrored = 7,
    Left = 8,
}

impl Orientation {
    /// Parse an EXIF orientation code.
    pub fn try_from_exif(code: u16) -> Result<Self> {
        match code {
            1 => Ok(Self::Up),
            2 => Ok(Self::UpMirrored),
            3 => Ok(Self::Down),
            4 => Ok(Self::DownMirrored),
            5 => Ok(Self::LeftMirrored),
            6 => Ok(Self::Right),
            7 => Ok(Self::RightMirrored),
            8 => Ok(Self::Left),
            other => Err(EntzerrError::OrientationUnknown(other)),
        }
    }

    /// Parse an EXIF orientation code, treating unknown codes as `Up`.
    pub fn from_exif_lossy(code: u16) -> Self {
        Self::try_from_exif(code).unwrap_or_else(|err| {
            warn!(code, error = %err, "Unknown orientation tag; treating as upright");
            Self::Up
        })
    }

    pub fn exif_code(&self) -> u16 {
        *self as u16
    }

    /// Whether re-orienting swaps width and height.
    pub fn swaps_axes(&self) -> bool {
        matches!(
            self,
            Self::LeftMirrored | Self::Right | Self::RightMirrored | Self::Left
        )
    }
}

/// Which collaborator supplies the corner points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CorrectionMode {
    /// Corners come from the quadrilateral detector.
    #[default]
    Auto,
    /// Corners come from the user-dragged handles.
    Manual,
}

/// Fill used for output pixels whose source coordinate lies outside the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BackgroundPolicy {
    /// Fully transparent RGBA(0, 0, 0, 0).
    #[default]
    Transparent,
    /// Opaque black.
    Black,
    /// Repeat the nearest edge pixel.
    ClampEdge,
}

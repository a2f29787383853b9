// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Manual corner editor: four draggable handles over an on-screen rendering
// of the photo.

use entzerr_core::error::{EntzerrError, Result};
use entzerr_core::{Corner, Point, Quad, Size};
use tokio::sync::watch;
use tracing::debug;

/// Side of the default handle square, in rendering units.
pub const DEFAULT_SIDE: f64 = 100.0;

/// Corner positions in on-screen rendering coordinates.
///
/// Handles move independently and may cross. Every change is published on a
/// `watch` channel so a view can redraw without polling.
#[derive(Debug)]
pub struct CornerEditor {
    default_side: f64,
    corners: Quad,
    changes: watch::Sender<Quad>,
}

impl CornerEditor {
    /// Editor with handles on the default 100 x 100 square.
    pub fn new() -> Self {
        Self::with_default_side(DEFAULT_SIDE)
    }

    /// Editor whose initial (and reset) square has side `side`.
    pub fn with_default_side(side: f64) -> Self {
        let side = if side.is_finite() && side > 0.0 {
            side
        } else {
            DEFAULT_SIDE
        };
        let corners = Quad::square(side);
        let (changes, _) = watch::channel(corners);
        Self {
            default_side: side,
            corners,
            changes,
        }
    }

    /// Current corner positions.
    pub fn snapshot(&self) -> Quad {
        self.corners
    }

    pub fn corner(&self, corner: Corner) -> Point {
        self.corners.corner(corner)
    }

    pub fn move_corner(&mut self, corner: Corner, to: Point) {
        *self.corners.corner_mut(corner) = to;
        debug!(?corner, x = to.x, y = to.y, "Corner moved");
        self.publish();
    }

    /// Put every handle back on the default square.
    pub fn reset(&mut self) {
        self.corners = Quad::square(self.default_side);
        debug!(side = self.default_side, "Corner editor reset");
        self.publish();
    }

    /// Receive the corner set after every change.
    pub fn subscribe(&self) -> watch::Receiver<Quad> {
        self.changes.subscribe()
    }

    /// Rescale the handles from a `rendered` extent to the `source` raster:
    /// `source = screen * (source_extent / rendered_extent)` per axis.
    ///
    /// Uses whatever extents are passed at call time; the editor does not
    /// remember the layout.
    pub fn to_source_space(&self, rendered: Size, source: Size) -> Result<Quad> {
        if !rendered.is_usable() {
            return Err(EntzerrError::InvalidRenderExtent {
                width: rendered.width,
                height: rendered.height,
            });
        }
        let sx = source.width / rendered.width;
        let sy = source.height / rendered.height;
        Ok(self.corners.map(|p| p.scaled(sx, sy)))
    }

    fn publish(&self) {
        self.changes.send_replace(self.corners);
    }
}

impl Default for CornerEditor {
    fn default() -> Self {
        Self::new()
    }
}

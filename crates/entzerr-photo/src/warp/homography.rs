// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Planar homography: solve the projective transform between two sets of
// four points and apply it.

use entzerr_core::Point;
use entzerr_core::error::{EntzerrError, Result};

/// Relative tolerance for the degeneracy tests. Applied after coordinates
/// are normalized by the caller-supplied scale, so it does not depend on the
/// image resolution.
const DEGENERACY_EPSILON: f64 = 1e-6;

/// Sine of the corner angle below which three points count as collinear.
/// Independent of how large the quadrilateral is.
const COLLINEAR_SINE_EPSILON: f64 = 1e-6;

/// Pivots below this magnitude (in scale-normalized coordinates) make the
/// 8x8 system singular.
const PIVOT_EPSILON: f64 = 1e-10;

/// Determinant-to-Hadamard-bound ratio below which a matrix is singular.
const SINGULAR_EPSILON: f64 = 1e-12;

/// Homogeneous weights below this magnitude send a point to infinity.
const W_EPSILON: f64 = 1e-12;

/// A 3x3 projective transform acting on pixel coordinates.
///
/// ```text
/// x' = (m00*x + m01*y + m02) / (m20*x + m21*y + m22)
/// y' = (m10*x + m11*y + m12) / (m20*x + m21*y + m22)
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Homography {
    m: [[f64; 3]; 3],
}

impl Homography {
    pub const IDENTITY: Self = Self {
        m: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
    };

    pub fn from_matrix(m: [[f64; 3]; 3]) -> Self {
        Self { m }
    }

    pub fn matrix(&self) -> [[f64; 3]; 3] {
        self.m
    }

    /// Solve the homography mapping each `src[i]` onto `dst[i]`.
    ///
    /// `scale` is the characteristic size of the coordinate space (the
    /// image's longer side). Each point set is centred on its centroid and
    /// divided by `scale` before the degeneracy checks and the solve, keeping
    /// the system well conditioned and the tolerances resolution-independent.
    ///
    /// Fails with `DegenerateQuadrilateral` when either set has coincident
    /// points, three collinear points, or non-finite coordinates.
    pub fn from_correspondences(src: &[Point; 4], dst: &[Point; 4], scale: f64) -> Result<Self> {
        if !(scale.is_finite() && scale > 0.0) {
            return Err(EntzerrError::DegenerateQuadrilateral(format!(
                "invalid coordinate scale {scale}"
            )));
        }

        let src_norm = Normalizer::new(src, scale);
        let dst_norm = Normalizer::new(dst, scale);
        let src_n = src.map(|p| src_norm.apply(p));
        let dst_n = dst.map(|p| dst_norm.apply(p));
        check_general_position(&src_n, "source")?;
        check_general_position(&dst_n, "target")?;

        let h = solve_normalized(&src_n, &dst_n).ok_or_else(|| {
            EntzerrError::DegenerateQuadrilateral("homography system is singular".into())
        })?;
        let normalized = [[h[0], h[1], h[2]], [h[3], h[4], h[5]], [h[6], h[7], 1.0]];

        // H = Nd^-1 * Hn * Ns, so it acts on pixel coordinates.
        Ok(Self {
            m: mul(&mul(&dst_norm.inverse_matrix(), &normalized), &src_norm.matrix()),
        })
    }

    /// Map a point. Returns `None` when the point goes to infinity.
    pub fn project(&self, p: Point) -> Option<Point> {
        let m = &self.m;
        let w = m[2][0] * p.x + m[2][1] * p.y + m[2][2];
        if w.abs() < W_EPSILON {
            return None;
        }
        let x = (m[0][0] * p.x + m[0][1] * p.y + m[0][2]) / w;
        let y = (m[1][0] * p.x + m[1][1] * p.y + m[1][2]) / w;
        Some(Point::new(x, y))
    }

    pub fn determinant(&self) -> f64 {
        let m = &self.m;
        m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
            - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
            + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
    }

    /// The inverse transform, or `None` if the matrix is singular.
    ///
    /// Singularity is judged by the determinant relative to the product of
    /// the row norms (its Hadamard bound), which is unaffected by the very
    /// different magnitudes of the translation and perspective entries.
    pub fn inverse(&self) -> Option<Self> {
        let m = self.m;
        let bound: f64 = m
            .iter()
            .map(|row| row.iter().map(|v| v * v).sum::<f64>().sqrt())
            .product();
        let det = self.determinant();
        if !(det.is_finite() && bound.is_finite() && bound > 0.0) {
            return None;
        }
        if (det / bound).abs() < SINGULAR_EPSILON {
            return None;
        }
        let inv_det = 1.0 / det;

        let mut inv = [[0.0f64; 3]; 3];
        inv[0][0] = (m[1][1] * m[2][2] - m[1][2] * m[2][1]) * inv_det;
        inv[0][1] = (m[0][2] * m[2][1] - m[0][1] * m[2][2]) * inv_det;
        inv[0][2] = (m[0][1] * m[1][2] - m[0][2] * m[1][1]) * inv_det;
        inv[1][0] = (m[1][2] * m[2][0] - m[1][0] * m[2][2]) * inv_det;
        inv[1][1] = (m[0][0] * m[2][2] - m[0][2] * m[2][0]) * inv_det;
        inv[1][2] = (m[0][2] * m[1][0] - m[0][0] * m[1][2]) * inv_det;
        inv[2][0] = (m[1][0] * m[2][1] - m[1][1] * m[2][0]) * inv_det;
        inv[2][1] = (m[0][1] * m[2][0] - m[0][0] * m[2][1]) * inv_det;
        inv[2][2] = (m[0][0] * m[1][1] - m[0][1] * m[1][0]) * inv_det;

        Some(Self { m: inv })
    }
}

/// Similarity that moves a point set's centroid to the origin and divides
/// by a common scale.
struct Normalizer {
    cx: f64,
    cy: f64,
    scale: f64,
}

impl Normalizer {
    fn new(points: &[Point; 4], scale: f64) -> Self {
        let cx = points.iter().map(|p| p.x).sum::<f64>() / 4.0;
        let cy = points.iter().map(|p| p.y).sum::<f64>() / 4.0;
        Self { cx, cy, scale }
    }

    fn apply(&self, p: Point) -> Point {
        Point::new((p.x - self.cx) / self.scale, (p.y - self.cy) / self.scale)
    }

    fn matrix(&self) -> [[f64; 3]; 3] {
        let s = self.scale;
        [
            [1.0 / s, 0.0, -self.cx / s],
            [0.0, 1.0 / s, -self.cy / s],
            [0.0, 0.0, 1.0],
        ]
    }

    fn inverse_matrix(&self) -> [[f64; 3]; 3] {
        let s = self.scale;
        [[s, 0.0, self.cx], [0.0, s, self.cy], [0.0, 0.0, 1.0]]
    }
}

fn mul(a: &[[f64; 3]; 3], b: &[[f64; 3]; 3]) -> [[f64; 3]; 3] {
    let mut out = [[0.0f64; 3]; 3];
    for (i, row) in out.iter_mut().enumerate() {
        for (j, cell) in row.iter_mut().enumerate() {
            *cell = (0..3).map(|k| a[i][k] * b[k][j]).sum();
        }
    }
    out
}

/// Reject point sets for which no homography exists.
fn check_general_position(points: &[Point; 4], which: &str) -> Result<()> {
    if points.iter().any(|p| !p.is_finite()) {
        return Err(EntzerrError::DegenerateQuadrilateral(format!(
            "{which} corners contain non-finite coordinates"
        )));
    }

    for i in 0..4 {
        for j in (i + 1)..4 {
            if points[i].distance(points[j]) < DEGENERACY_EPSILON {
                return Err(EntzerrError::DegenerateQuadrilateral(format!(
                    "{which} corners {i} and {j} coincide"
                )));
            }
        }
    }

    const TRIPLES: [(usize, usize, usize); 4] = [(0, 1, 2), (0, 1, 3), (0, 2, 3), (1, 2, 3)];
    for (a, b, c) in TRIPLES {
        let (pa, pb, pc) = (points[a], points[b], points[c]);
        let cross = (pb.x - pa.x) * (pc.y - pa.y) - (pb.y - pa.y) * (pc.x - pa.x);
        let sine = cross / (pa.distance(pb) * pa.distance(pc));
        if sine.abs() < COLLINEAR_SINE_EPSILON {
            return Err(EntzerrError::DegenerateQuadrilateral(format!(
                "{which} corners {a}, {b} and {c} are nearly collinear"
            )));
        }
    }

    Ok(())
}

/// Solve the 8 unknowns of `h` (with h22 = 1) from four correspondences.
///
/// Each pair (x, y) -> (X, Y) contributes
///
/// ```text
/// [x y 1 0 0 0 -xX -yX] h = X
/// [0 0 0 x y 1 -xY -yY] h = Y
/// ```
fn solve_normalized(src: &[Point; 4], dst: &[Point; 4]) -> Option<[f64; 8]> {
    // 8x9 augmented matrix.
    let mut a = [[0.0f64; 9]; 8];
    for i in 0..4 {
        let (x, y) = (src[i].x, src[i].y);
        let (u, v) = (dst[i].x, dst[i].y);

        a[2 * i] = [x, y, 1.0, 0.0, 0.0, 0.0, -x * u, -y * u, u];
        a[2 * i + 1] = [0.0, 0.0, 0.0, x, y, 1.0, -x * v, -y * v, v];
    }

    // Gaussian elimination with partial pivoting.
    for col in 0..8 {
        let (pivot_row, pivot_abs) = (col..8)
            .map(|row| (row, a[row][col].abs()))
            .fold((col, -1.0), |best, cand| if cand.1 > best.1 { cand } else { best });
        if pivot_abs < PIVOT_EPSILON {
            return None;
        }
        a.swap(col, pivot_row);

        let pivot = a[col][col];
        for row in (col + 1)..8 {
            let factor = a[row][col] / pivot;
            if factor == 0.0 {
                continue;
            }
            for c in col..9 {
                a[row][c] -= factor * a[col][c];
            }
        }
    }

    let mut h = [0.0f64; 8];
    for row in (0..8).rev() {
        let mut sum = a[row][8];
        for c in (row + 1)..8 {
            sum -= a[row][c] * h[c];
        }
        h[row] = sum / a[row][row];
    }

    h.iter().all(|v| v.is_finite()).then_some(h)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: Point, b: Point, tol: f64) {
        assert!(
            (a.x - b.x).abs() < tol && (a.y - b.y).abs() < tol,
            "expected {b:?}, got {a:?}"
        );
    }

    fn rect(w: f64, h: f64) -> [Point; 4] {
        [
            Point::new(0.0, 0.0),
            Point::new(w, 0.0),
            Point::new(0.0, h),
            Point::new(w, h),
        ]
    }

    #[test]
    fn identical_point_sets_give_identity() {
        let pts = rect(400.0, 300.0);
        let h = Homography::from_correspondences(&pts, &pts, 400.0).expect("solve");
        assert_close(
            h.project(Point::new(123.0, 45.0)).expect("finite"),
            Point::new(123.0, 45.0),
            1e-9,
        );
    }

    #[test]
    fn maps_each_source_corner_onto_its_target() {
        let src = [
            Point::new(50.0, 40.0),
            Point::new(350.0, 60.0),
            Point::new(40.0, 260.0),
            Point::new(360.0, 280.0),
        ];
        let dst = rect(400.0, 300.0);
        let h = Homography::from_correspondences(&src, &dst, 400.0).expect("solve");
        for (s, d) in src.iter().zip(dst.iter()) {
            assert_close(h.project(*s).expect("finite"), *d, 1e-6);
        }
    }

    #[test]
    fn inverse_undoes_forward() {
        let src = [
            Point::new(10.0, 20.0),
            Point::new(900.0, 5.0),
            Point::new(30.0, 700.0),
            Point::new(880.0, 760.0),
        ];
        let dst = rect(1000.0, 800.0);
        let h = Homography::from_correspondences(&src, &dst, 1000.0).expect("solve");
        let inv = h.inverse().expect("invertible");
        let p = Point::new(412.5, 333.25);
        let round_trip = inv.project(h.project(p).expect("finite")).expect("finite");
        assert_close(round_trip, p, 1e-6);
    }

    #[test]
    fn three_collinear_points_are_degenerate() {
        let src = [
            Point::new(0.0, 0.0),
            Point::new(50.0, 0.0),
            Point::new(100.0, 0.0),
            Point::new(100.0, 100.0),
        ];
        let err = Homography::from_correspondences(&src, &rect(200.0, 200.0), 200.0).unwrap_err();
        assert!(matches!(err, EntzerrError::DegenerateQuadrilateral(_)));
    }

    #[test]
    fn tiny_square_on_a_large_photo_solves() {
        // A 2 px square on a 4000x3000 photo spans a tiny area once scaled,
        // but its corners are far from collinear.
        let src = [
            Point::new(2000.0, 1500.0),
            Point::new(2002.0, 1500.0),
            Point::new(2000.0, 1502.0),
            Point::new(2002.0, 1502.0),
        ];
        let dst = rect(4000.0, 3000.0);
        let h = Homography::from_correspondences(&src, &dst, 4000.0).expect("solve");
        for (s, d) in src.iter().zip(dst.iter()) {
            assert_close(h.project(*s).expect("finite"), *d, 1e-3);
        }
        assert!(h.inverse().is_some());
    }

    #[test]
    fn nearly_collinear_points_are_degenerate() {
        // Third corner sits 1e-8 px off the line through the first two.
        let src = [
            Point::new(0.0, 0.0),
            Point::new(50.0, 0.0),
            Point::new(100.0, 1e-8),
            Point::new(100.0, 100.0),
        ];
        let err = Homography::from_correspondences(&src, &rect(200.0, 200.0), 200.0).unwrap_err();
        match err {
            EntzerrError::DegenerateQuadrilateral(msg) => assert!(msg.contains("collinear"), "{msg}"),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn coincident_points_are_degenerate() {
        let src = [
            Point::new(10.0, 10.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 100.0),
            Point::new(100.0, 100.0),
        ];
        let err = Homography::from_correspondences(&src, &rect(200.0, 200.0), 200.0).unwrap_err();
        assert!(matches!(err, EntzerrError::DegenerateQuadrilateral(_)));
    }

    #[test]
    fn nan_coordinates_are_degenerate() {
        let mut src = rect(100.0, 100.0);
        src[3] = Point::new(f64::NAN, 3.0);
        assert!(Homography::from_correspondences(&src, &rect(100.0, 100.0), 100.0).is_err());
    }

    #[test]
    fn crossed_corners_still_solve() {
        // Bottom corners dragged past each other: a bow-tie, but no three
        // points are collinear so a projective map exists.
        let src = [
            Point::new(20.0, 20.0),
            Point::new(180.0, 25.0),
            Point::new(170.0, 180.0),
            Point::new(30.0, 175.0),
        ];
        let dst = rect(200.0, 200.0);
        let h = Homography::from_correspondences(&src, &dst, 200.0).expect("solve");
        assert_close(h.project(src[2]).expect("finite"), dst[2], 1e-6);
    }

    #[test]
    fn singular_matrix_has_no_inverse() {
        let flat = Homography::from_matrix([[1.0, 2.0, 3.0], [2.0, 4.0, 6.0], [0.0, 0.0, 1.0]]);
        assert!(flat.inverse().is_none());
        assert!(Homography::IDENTITY.inverse().is_some());
    }

    #[test]
    fn points_on_the_vanishing_line_project_to_none() {
        let h = Homography::from_matrix([[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 0.0, -5.0]]);
        assert!(h.project(Point::new(5.0, 17.0)).is_none());
        assert!(h.project(Point::new(6.0, 17.0)).is_some());
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Inverse-mapping resampler with bilinear interpolation.
//
// Coordinates are continuous: pixel (i, j) covers [i, i+1) x [j, j+1) and its
// centre sits at (i + 0.5, j + 0.5).

use entzerr_core::{BackgroundPolicy, Point};
use image::{Rgba, RgbaImage};
use rayon::prelude::*;

use super::homography::Homography;

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);
const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Fill `width` x `height` output pixels by mapping each pixel centre
/// through `inverse` into `src` and sampling there.
///
/// Rows are processed in parallel. Output pixels whose centre maps to
/// infinity get the policy's fill, or transparent under `ClampEdge`.
pub fn warp_inverse(
    src: &RgbaImage,
    inverse: &Homography,
    width: u32,
    height: u32,
    policy: BackgroundPolicy,
) -> RgbaImage {
    let mut out = RgbaImage::new(width, height);
    if width == 0 || height == 0 {
        return out;
    }
    let row_len = width as usize * 4;

    out.par_chunks_mut(row_len)
        .enumerate()
        .for_each(|(v, row)| {
            let cy = v as f64 + 0.5;
            for (u, dst) in row.chunks_exact_mut(4).enumerate() {
                let centre = Point::new(u as f64 + 0.5, cy);
                let pixel = match inverse.project(centre) {
                    Some(p) => sample_bilinear(src, p, policy),
                    None => fill(policy),
                };
                dst.copy_from_slice(&pixel.0);
            }
        });

    out
}

/// Colour for output pixels with nothing to sample. `ClampEdge` has no edge
/// to clamp to here and falls back to transparent.
fn fill(policy: BackgroundPolicy) -> Rgba<u8> {
    match policy {
        BackgroundPolicy::Black => BLACK,
        BackgroundPolicy::Transparent | BackgroundPolicy::ClampEdge => TRANSPARENT,
    }
}

/// Sample `src` at continuous position `p` with bilinear weights.
///
/// Positions outside `[0, W] x [0, H]` get the background of `policy`
/// (`ClampEdge` clamps them onto the border), as does every position of an
/// empty source. Neighbour indices are clamped,
/// so positions on the last row or column never read out of bounds.
pub fn sample_bilinear(src: &RgbaImage, p: Point, policy: BackgroundPolicy) -> Rgba<u8> {
    let (w, h) = src.dimensions();
    if w == 0 || h == 0 {
        return fill(policy);
    }
    let (wf, hf) = (w as f64, h as f64);

    let inside = p.x >= 0.0 && p.y >= 0.0 && p.x <= wf && p.y <= hf;
    let (x, y) = if inside {
        (p.x, p.y)
    } else {
        match policy {
            BackgroundPolicy::Transparent => return TRANSPARENT,
            BackgroundPolicy::Black => return BLACK,
            BackgroundPolicy::ClampEdge => (p.x.clamp(0.0, wf), p.y.clamp(0.0, hf)),
        }
    };

    // Shift to index space where pixel centres are integers.
    let fx = (x - 0.5).clamp(0.0, wf - 1.0);
    let fy = (y - 0.5).clamp(0.0, hf - 1.0);
    let x0 = fx.floor() as u32;
    let y0 = fy.floor() as u32;
    let x1 = (x0 + 1).min(w - 1);
    let y1 = (y0 + 1).min(h - 1);
    let tx = fx - x0 as f64;
    let ty = fy - y0 as f64;

    let p00 = src.get_pixel(x0, y0).0;
    let p10 = src.get_pixel(x1, y0).0;
    let p01 = src.get_pixel(x0, y1).0;
    let p11 = src.get_pixel(x1, y1).0;

    let mut out = [0u8; 4];
    for (c, channel) in out.iter_mut().enumerate() {
        let top = p00[c] as f64 * (1.0 - tx) + p10[c] as f64 * tx;
        let bottom = p01[c] as f64 * (1.0 - tx) + p11[c] as f64 * tx;
        let value = top * (1.0 - ty) + bottom * ty;
        *channel = value.round().clamp(0.0, 255.0) as u8;
    }
    Rgba(out)
}

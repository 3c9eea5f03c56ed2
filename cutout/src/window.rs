//! Fixed-size window extraction with explicit edge policies.

use clap::ValueEnum;
use ndarray::{s, Array2};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Cutout dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CutoutSize {
    pub width: usize,
    pub height: usize,
}

impl CutoutSize {
    pub fn from_width_height(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    pub fn square(side: usize) -> Self {
        Self::from_width_height(side, side)
    }
}

impl Default for CutoutSize {
    fn default() -> Self {
        Self::square(40)
    }
}

impl fmt::Display for CutoutSize {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// How window bounds are clamped at raster edges.
///
/// The two policies produce different pixel content for centers near an
/// edge; a run uses exactly one, chosen up front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
pub enum ClampPolicy {
    /// Clamp each edge independently and zero-pad the shortfall. The clipped
    /// region stays anchored at the window's top-left, so the effective
    /// center shifts for edge samples.
    PadToSize,
    /// Shift the opposite bound inward so the extraction stays full-size
    /// whenever the raster allows; pads only when the raster itself is
    /// smaller than the window.
    ShiftToFit,
}

/// Extract an exactly `(height, width)` window around a pixel center.
///
/// The output always has the configured dimensions; any part of the window
/// falling outside the raster is zero-filled according to `policy`. A center
/// entirely outside the raster yields an all-zero window.
pub fn extract_window(
    raster: &Array2<f32>,
    center_x: i64,
    center_y: i64,
    size: CutoutSize,
    policy: ClampPolicy,
) -> Array2<f32> {
    let (rows, cols) = raster.dim();
    let (x0, x1) = axis_bounds(center_x, size.width, cols, policy);
    let (y0, y1) = axis_bounds(center_y, size.height, rows, policy);

    let mut out = Array2::<f32>::zeros((size.height, size.width));
    if x0 < x1 && y0 < y1 {
        out.slice_mut(s![..(y1 - y0), ..(x1 - x0)])
            .assign(&raster.slice(s![y0..y1, x0..x1]));
    }
    out
}

/// Clamped `[lo, hi)` extraction range along one axis.
fn axis_bounds(center: i64, window: usize, dim: usize, policy: ClampPolicy) -> (usize, usize) {
    let half = (window / 2) as i64;
    let window = window as i64;
    let dim = dim as i64;

    let (lo, hi) = match policy {
        ClampPolicy::PadToSize => {
            let lo = (center - half).clamp(0, dim);
            let hi = (center + half).clamp(lo, dim);
            (lo, hi)
        }
        ClampPolicy::ShiftToFit => {
            let mut lo = (center - half).max(0);
            let mut hi = lo + window;
            if hi > dim {
                hi = dim;
                lo = (hi - window).max(0);
            }
            (lo, hi.max(lo))
        }
    };
    (lo as usize, hi as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn gradient(rows: usize, cols: usize) -> Array2<f32> {
        Array2::from_shape_fn((rows, cols), |(y, x)| (y * cols + x) as f32)
    }

    #[test]
    fn test_interior_window_is_exact_subarray() {
        let raster = gradient(100, 100);
        for policy in [ClampPolicy::PadToSize, ClampPolicy::ShiftToFit] {
            let out = extract_window(&raster, 50, 50, CutoutSize::square(40), policy);
            assert_eq!(out.dim(), (40, 40));
            assert_eq!(out, raster.slice(s![30..70, 30..70]));
        }
    }

    #[test]
    fn test_corner_center_pads_with_zeros() {
        let raster = Array2::from_elem((100, 100), 3.0f32);
        let out = extract_window(&raster, 0, 0, CutoutSize::square(40), ClampPolicy::PadToSize);
        assert_eq!(out.dim(), (40, 40));

        // The clipped region is [0, 20) on each axis, anchored top-left;
        // everything else is zero.
        let mut expected = Array2::<f32>::zeros((40, 40));
        expected.slice_mut(s![..20, ..20]).fill(3.0);
        assert_eq!(out, expected);
    }

    #[test]
    fn test_block_at_center() {
        // 100x100 of 5s with a 3x3 block of 9s centered at (50, 50); the
        // block must land at the geometric center of the 40x40 output.
        let mut raster = Array2::from_elem((100, 100), 5.0f32);
        raster.slice_mut(s![49..52, 49..52]).fill(9.0);

        let out = extract_window(
            &raster,
            50,
            50,
            CutoutSize::square(40),
            ClampPolicy::PadToSize,
        );

        let mut expected = Array2::from_elem((40, 40), 5.0f32);
        expected.slice_mut(s![19..22, 19..22]).fill(9.0);
        assert_eq!(out, expected);
        assert_eq!(out[[20, 20]], 9.0);
        assert_eq!(out[[18, 18]], 5.0);
    }

    #[test]
    fn test_raster_smaller_than_window() {
        // 10x10 of 1s, 40x40 window at (5, 5): the whole raster lands in the
        // top-left corner of a zeroed window. ShiftToFit cannot produce an
        // exact fit here and degenerates to the same array.
        let raster = Array2::from_elem((10, 10), 1.0f32);

        let mut expected = Array2::<f32>::zeros((40, 40));
        expected.slice_mut(s![..10, ..10]).fill(1.0);

        let padded = extract_window(&raster, 5, 5, CutoutSize::square(40), ClampPolicy::PadToSize);
        let shifted = extract_window(&raster, 5, 5, CutoutSize::square(40), ClampPolicy::ShiftToFit);
        assert_eq!(padded, expected);
        assert_eq!(shifted, expected);
    }

    #[test]
    fn test_shift_to_fit_stays_full_size_near_edge() {
        let raster = gradient(100, 100);
        let out = extract_window(&raster, 5, 5, CutoutSize::square(40), ClampPolicy::ShiftToFit);
        // Shifted inward to [0, 40) on both axes: full content, no zeros.
        assert_eq!(out, raster.slice(s![..40, ..40]));
    }

    #[test]
    fn test_pad_policy_differs_from_shift_near_edge() {
        let raster = gradient(100, 100);
        let padded = extract_window(&raster, 5, 5, CutoutSize::square(40), ClampPolicy::PadToSize);
        let shifted = extract_window(&raster, 5, 5, CutoutSize::square(40), ClampPolicy::ShiftToFit);
        assert_ne!(padded, shifted);

        // PadToSize keeps only [0, 25) per axis, zero-filled beyond.
        assert_eq!(
            padded.slice(s![..25, ..25]),
            raster.slice(s![..25, ..25])
        );
        assert_eq!(padded[[30, 30]], 0.0);
    }

    #[test]
    fn test_center_far_outside_raster() {
        let raster = gradient(50, 50);
        for policy in [ClampPolicy::PadToSize, ClampPolicy::ShiftToFit] {
            let out = extract_window(&raster, -500, 1000, CutoutSize::square(40), policy);
            assert_eq!(out.dim(), (40, 40));
        }
        // PadToSize has nothing to copy at all.
        let out = extract_window(
            &raster,
            -500,
            -500,
            CutoutSize::square(40),
            ClampPolicy::PadToSize,
        );
        assert!(out.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_rectangular_window() {
        let raster = gradient(80, 120);
        let out = extract_window(
            &raster,
            60,
            40,
            CutoutSize::from_width_height(30, 20),
            ClampPolicy::PadToSize,
        );
        assert_eq!(out.dim(), (20, 30));
        assert_eq!(out, raster.slice(s![30..50, 45..75]));
    }
}

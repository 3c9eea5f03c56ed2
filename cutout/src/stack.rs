//! Multi-band cutout assembly.
//!
//! For one catalog position, extracts a fixed-size window from every band's
//! frame and stacks the windows along a new trailing axis in the configured
//! band order. A sample is all-or-nothing: any missing or unreadable band
//! drops the whole sample.

use crate::frame::{BandFrame, FrameError};
use crate::wcs::{project_to_pixel, ProjectionError};
use crate::window::{extract_window, ClampPolicy, CutoutSize};
use catalog::{Band, FrameId};
use ndarray::{Array3, Axis};
use std::path::PathBuf;
use thiserror::Error;

/// Reasons a sample cannot be assembled. Every variant is a per-sample skip
/// condition, never fatal to a batch.
#[derive(Error, Debug)]
pub enum CutoutError {
    #[error("missing band files: {}", missing.join(", "))]
    MissingBandFiles { missing: Vec<String> },
    #[error("unreadable image {}: {source}", path.display())]
    UnreadableImage {
        path: PathBuf,
        #[source]
        source: FrameError,
    },
    #[error("projection failed for {filename}: {source}")]
    InvalidProjection {
        filename: String,
        #[source]
        source: ProjectionError,
    },
}

/// Extracts stacked multi-band cutouts from a directory of frame files.
#[derive(Debug, Clone)]
pub struct CutoutExtractor {
    frames_dir: PathBuf,
    bands: Vec<Band>,
    size: CutoutSize,
    policy: ClampPolicy,
}

impl CutoutExtractor {
    pub fn new(
        frames_dir: impl Into<PathBuf>,
        bands: Vec<Band>,
        size: CutoutSize,
        policy: ClampPolicy,
    ) -> Self {
        assert!(!bands.is_empty(), "band list cannot be empty");
        Self {
            frames_dir: frames_dir.into(),
            bands,
            size,
            policy,
        }
    }

    pub fn bands(&self) -> &[Band] {
        &self.bands
    }

    /// Band file path for one frame.
    pub fn band_path(&self, frame_id: &FrameId, band: Band) -> PathBuf {
        self.frames_dir.join(frame_id.filename(band))
    }

    /// Assemble the (height, width, band_count) tensor for one sample.
    ///
    /// All band files are checked up front so a missing file skips the
    /// sample before any pixel work, and the error lists every absent
    /// filename. The projection is recomputed per band against that band's
    /// own WCS; aligned frames give the same pixel center for every band.
    pub fn extract_stack(
        &self,
        frame_id: &FrameId,
        ra: f64,
        dec: f64,
    ) -> Result<Array3<f32>, CutoutError> {
        let paths: Vec<(String, PathBuf)> = self
            .bands
            .iter()
            .map(|&band| {
                let name = frame_id.filename(band);
                let path = self.frames_dir.join(&name);
                (name, path)
            })
            .collect();

        let missing: Vec<String> = paths
            .iter()
            .filter(|(_, path)| !path.exists())
            .map(|(name, _)| name.clone())
            .collect();
        if !missing.is_empty() {
            return Err(CutoutError::MissingBandFiles { missing });
        }

        let mut planes = Vec::with_capacity(paths.len());
        for (name, path) in &paths {
            let frame = BandFrame::open(path).map_err(|e| CutoutError::UnreadableImage {
                path: path.clone(),
                source: e,
            })?;
            let (x, y) = project_to_pixel(&frame.wcs, ra, dec).map_err(|e| {
                CutoutError::InvalidProjection {
                    filename: name.clone(),
                    source: e,
                }
            })?;
            planes.push(extract_window(&frame.data, x, y, self.size, self.policy));
        }

        let views: Vec<_> = planes.iter().map(|p| p.view()).collect();
        // All planes share (height, width), so stacking along a new trailing
        // axis cannot fail.
        Ok(ndarray::stack(Axis(2), &views).expect("cutout planes share dimensions"))
    }
}

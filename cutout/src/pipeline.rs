//! Dataset build orchestration.
//!
//! Drives cutout extraction over a batch of catalog rows in either
//! sequential or parallel mode, converts every per-sample failure into a
//! structured skip, and persists surviving samples keyed by object id.

use crate::stack::{CutoutError, CutoutExtractor};
use crate::store::{SampleStore, StoreError};
use crate::window::{ClampPolicy, CutoutSize};
use catalog::{Band, CatalogRow};
use clap::ValueEnum;
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info};
use ndarray::Array3;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// How rows are processed within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
pub enum ExecutionMode {
    /// One row at a time, in order. Suitable for small batches or debugging.
    Sequential,
    /// Rows distributed across a fixed-size worker pool; each task performs
    /// the full per-row extraction independently and re-opens its own frame
    /// files (no shared cache).
    Parallel,
}

/// Run-scoped configuration for a dataset build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    pub size: CutoutSize,
    pub policy: ClampPolicy,
    /// Stacking order of the cutout tensor's trailing axis
    pub bands: Vec<Band>,
    pub mode: ExecutionMode,
    /// Worker threads for parallel mode; None uses one per available core
    pub workers: Option<usize>,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            size: CutoutSize::default(),
            policy: ClampPolicy::PadToSize,
            bands: Band::ALL.to_vec(),
            mode: ExecutionMode::Sequential,
            workers: None,
        }
    }
}

/// Fatal run errors. Per-sample failures are never fatal; they surface in
/// [`RunReport::skipped`] instead.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// One skipped sample with the reason it was dropped.
#[derive(Debug)]
pub struct SkippedSample {
    pub row_index: usize,
    pub object_id: u64,
    pub reason: CutoutError,
}

/// Outcome of a run: counts plus the structured skip list.
#[derive(Debug, Default)]
pub struct RunReport {
    pub attempted: usize,
    pub persisted: usize,
    pub skipped: Vec<SkippedSample>,
}

/// Builds a cutout dataset from catalog rows.
pub struct DatasetBuilder {
    extractor: CutoutExtractor,
    store: SampleStore,
    config: DatasetConfig,
}

impl DatasetBuilder {
    pub fn new(frames_dir: impl Into<PathBuf>, store: SampleStore, config: DatasetConfig) -> Self {
        let extractor = CutoutExtractor::new(
            frames_dir,
            config.bands.clone(),
            config.size,
            config.policy,
        );
        Self {
            extractor,
            store,
            config,
        }
    }

    /// Process every row and return the run report.
    ///
    /// Extraction failures are logged with the object id and recorded as
    /// skips; they never abort the batch. Persisted files are keyed by
    /// object id and written in row-input order in both modes, so the
    /// output never depends on completion order.
    pub fn run(&self, rows: &[CatalogRow]) -> Result<RunReport, PipelineError> {
        let results = match self.config.mode {
            ExecutionMode::Sequential => self.extract_sequential(rows),
            ExecutionMode::Parallel => self.extract_parallel(rows)?,
        };

        let mut report = RunReport {
            attempted: rows.len(),
            ..Default::default()
        };
        for (index, result) in results {
            let row = &rows[index];
            match result {
                Ok(tensor) => {
                    self.store.write_sample(row.obj_id, &tensor, &row.label())?;
                    info!("sample {index} ({}) persisted", row.obj_id);
                    report.persisted += 1;
                }
                Err(reason) => {
                    error!("sample {index} ({}) skipped: {reason}", row.obj_id);
                    report.skipped.push(SkippedSample {
                        row_index: index,
                        object_id: row.obj_id,
                        reason,
                    });
                }
            }
        }
        Ok(report)
    }

    fn extract_one(&self, row: &CatalogRow) -> Result<Array3<f32>, CutoutError> {
        self.extractor.extract_stack(&row.frame_id(), row.ra, row.dec)
    }

    fn extract_sequential(&self, rows: &[CatalogRow]) -> Vec<SampleResult> {
        let progress = batch_progress(rows.len() as u64);
        rows.iter()
            .enumerate()
            .map(|(index, row)| {
                let result = self.extract_one(row);
                progress.inc(1);
                (index, result)
            })
            .collect()
    }

    /// Parallel map over rows. Each result is tagged with its originating
    /// row index and the indexed collect reassembles them in input order,
    /// whatever order the workers finished in.
    fn extract_parallel(&self, rows: &[CatalogRow]) -> Result<Vec<SampleResult>, PipelineError> {
        let progress = batch_progress(rows.len() as u64);
        let task = |(index, row): (usize, &CatalogRow)| {
            let result = self.extract_one(row);
            progress.inc(1);
            (index, result)
        };

        let results = match self.config.workers {
            Some(workers) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(workers)
                    .build()?;
                pool.install(|| rows.par_iter().enumerate().map(task).collect())
            }
            None => rows.par_iter().enumerate().map(task).collect(),
        };
        Ok(results)
    }
}

type SampleResult = (usize, Result<Array3<f32>, CutoutError>);

fn batch_progress(len: u64) -> ProgressBar {
    let bar = ProgressBar::new(len);
    bar.set_style(
        ProgressStyle::with_template("{bar:40} {pos}/{len} [{elapsed_precise}]")
            .expect("static progress template"),
    );
    bar
}

//! Build a cutout training dataset from a rows CSV and a frames directory.
//!
//! Usage:
//! ```bash
//! # Sequential run with the default 40x40 ugriz cutouts
//! cargo run --release --bin build_dataset -- --rows rows.csv --frames frames/
//!
//! # Parallel run on 8 workers with the shift-to-fit edge policy
//! cargo run --release --bin build_dataset -- --rows rows.csv --frames frames/ \
//!     --mode parallel --workers 8 --policy shift-to-fit
//! ```
//!
//! Outputs land under `--out`: tensors in `X/{objID}.npy`, labels in
//! `y/{objID}.npy`. Skipped samples are listed on stdout and logged.

use anyhow::Context;
use catalog::{row, Band};
use clap::Parser;
use cutout::{ClampPolicy, CutoutSize, DatasetBuilder, DatasetConfig, ExecutionMode, SampleStore};
use std::path::PathBuf;

#[derive(Parser)]
#[command(about = "Extract multi-band cutouts for catalog rows")]
struct Args {
    /// Catalog rows CSV
    #[arg(long)]
    rows: PathBuf,

    /// Directory holding the per-band frame files
    #[arg(long)]
    frames: PathBuf,

    /// Output root; tensors under X/, labels under y/
    #[arg(short, long, default_value = "processed_data")]
    out: PathBuf,

    /// Cutout width in pixels
    #[arg(long, default_value = "40")]
    width: usize,

    /// Cutout height in pixels
    #[arg(long, default_value = "40")]
    height: usize,

    /// Edge handling policy
    #[arg(long, value_enum, default_value = "pad-to-size")]
    policy: ClampPolicy,

    /// Band letters, in stacking order
    #[arg(long, default_value = "ugriz")]
    bands: String,

    /// Execution mode
    #[arg(long, value_enum, default_value = "sequential")]
    mode: ExecutionMode,

    /// Worker threads for parallel mode (default: one per core)
    #[arg(long)]
    workers: Option<usize>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let rows = row::read_rows_csv(&args.rows)
        .with_context(|| format!("failed to read rows from {}", args.rows.display()))?;
    let bands = Band::parse_list(&args.bands).map_err(anyhow::Error::msg)?;

    let config = DatasetConfig {
        size: CutoutSize::from_width_height(args.width, args.height),
        policy: args.policy,
        bands,
        mode: args.mode,
        workers: args.workers,
    };
    let store = SampleStore::create(&args.out)?;
    let builder = DatasetBuilder::new(&args.frames, store, config);

    let report = builder.run(&rows)?;
    println!(
        "{} samples attempted, {} persisted, {} skipped",
        report.attempted,
        report.persisted,
        report.skipped.len()
    );
    for skip in &report.skipped {
        println!("  row {} ({}): {}", skip.row_index, skip.object_id, skip.reason);
    }
    Ok(())
}

//! Download the band frame archives referenced by a rows CSV.
//!
//! Fetches only files absent from the output directory, so re-running after
//! an interrupted sweep picks up where it left off. Archives land compressed
//! (`.fits.bz2`) exactly as served; expanding them into the frames directory
//! is left to the mirror tooling.

use anyhow::Context;
use catalog::frame_path::DEFAULT_FRAME_BASE_URL;
use catalog::{download, row, Band, FrameId};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(about = "Download missing band frames for catalog rows")]
struct Args {
    /// Catalog rows CSV
    #[arg(long)]
    rows: PathBuf,

    /// Directory to download frame archives into
    #[arg(short, long, default_value = "frames")]
    out: PathBuf,

    /// Archive base URL
    #[arg(long, default_value = DEFAULT_FRAME_BASE_URL)]
    base_url: String,

    /// Band letters to fetch
    #[arg(long, default_value = "ugriz")]
    bands: String,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let rows = row::read_rows_csv(&args.rows)
        .with_context(|| format!("failed to read rows from {}", args.rows.display()))?;
    let bands = Band::parse_list(&args.bands).map_err(anyhow::Error::msg)?;

    // Many rows share a field; fetch each frame once.
    let mut frame_ids: Vec<FrameId> = rows.iter().map(|r| r.frame_id()).collect();
    frame_ids.sort_unstable();
    frame_ids.dedup();

    std::fs::create_dir_all(&args.out)
        .with_context(|| format!("failed to create {}", args.out.display()))?;

    let fetched = download::download_missing(&frame_ids, &bands, &args.base_url, &args.out);
    println!(
        "Fetched {} of {} frame archives into {}",
        fetched,
        frame_ids.len() * bands.len(),
        args.out.display()
    );
    Ok(())
}

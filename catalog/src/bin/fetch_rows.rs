//! Fetch catalog rows from the survey query service into a CSV file.
//!
//! Usage:
//! ```bash
//! cargo run --release --bin fetch_rows -- --out rows.csv
//! cargo run --release --bin fetch_rows -- --query-file my_query.sql --out rows.csv
//! ```

use anyhow::Context;
use catalog::client::DEFAULT_SERVICE_URL;
use catalog::{row, SkyQueryClient};
use clap::Parser;
use std::path::PathBuf;

/// Canned spectroscopic galaxy selection with template photo-z columns.
const GALAXY_QUERY: &str = "\
SELECT
    p.objID, p.run, p.rerun, p.camcol, p.field, p.ra, p.dec,
    s.z, s.zErr,
    phz.z AS template_photo_z,
    phz.zErr AS template_photo_zErr
FROM PhotoObj AS p
JOIN SpecObj AS s ON p.objID = s.bestObjID
JOIN Photoz AS phz ON p.objID = phz.objID
WHERE
    s.class_noqso = 'GALAXY'
    AND s.zWarning = 0
    AND s.z BETWEEN 0.1 AND 1
ORDER BY p.objID";

#[derive(Parser)]
#[command(about = "Fetch catalog rows into a CSV file")]
struct Args {
    /// Query service URL
    #[arg(long, default_value = DEFAULT_SERVICE_URL)]
    url: String,

    /// File containing the SQL query (defaults to the built-in galaxy query)
    #[arg(long)]
    query_file: Option<PathBuf>,

    /// Output CSV path
    #[arg(short, long, default_value = "rows.csv")]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let sql = match &args.query_file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read query file {}", path.display()))?,
        None => GALAXY_QUERY.to_string(),
    };

    let client = SkyQueryClient::new(&args.url);
    let rows = client.query_rows(&sql)?;

    row::write_rows_csv(&args.out, &rows)
        .with_context(|| format!("failed to write {}", args.out.display()))?;
    println!("Wrote {} rows to {}", rows.len(), args.out.display());
    Ok(())
}

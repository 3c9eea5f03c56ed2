//! Sequential download of missing frame archives.
//!
//! Thin glue over the blocking HTTP client: one GET per absent file,
//! streamed to disk. Retry and backoff are left to the mirror tooling that
//! normally populates the frames directory; a failed fetch is logged and the
//! sweep moves on.

use crate::frame_path::{Band, FrameId};
use log::{error, info};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: Box<ureq::Error>,
    },
    #[error("server returned HTTP {status} for {url}")]
    Status { url: String, status: u16 },
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Download a single file to `dest`, streaming the body to disk.
pub fn download_file(url: &str, dest: &Path) -> Result<(), DownloadError> {
    let response = ureq::get(url).call().map_err(|e| DownloadError::Transport {
        url: url.to_string(),
        source: Box::new(e),
    })?;
    if response.status() != 200 {
        return Err(DownloadError::Status {
            url: url.to_string(),
            status: response.status().as_u16(),
        });
    }

    let mut reader = response.into_body().into_reader();
    let mut file = File::create(dest).map_err(|e| DownloadError::Io {
        path: dest.to_path_buf(),
        source: e,
    })?;
    io::copy(&mut reader, &mut file).map_err(|e| DownloadError::Io {
        path: dest.to_path_buf(),
        source: e,
    })?;
    Ok(())
}

/// Fetch every band frame archive missing from `dir`.
///
/// Already-present files are skipped, failures are logged per URL and do not
/// stop the sweep. Returns the number of files fetched.
pub fn download_missing(
    frame_ids: &[FrameId],
    bands: &[Band],
    base_url: &str,
    dir: &Path,
) -> usize {
    let mut fetched = 0;
    for id in frame_ids {
        for &band in bands {
            let archive_name = format!("{}.bz2", id.filename(band));
            let dest = dir.join(&archive_name);
            if dest.exists() {
                continue;
            }
            let url = id.url(base_url, band);
            match download_file(&url, &dest) {
                Ok(()) => {
                    info!("downloaded {archive_name}");
                    fetched += 1;
                }
                Err(e) => error!("download failed: {e}"),
            }
        }
    }
    fetched
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_missing_skips_existing() {
        let dir = tempfile::tempdir().unwrap();
        let id = FrameId::new(94, 301, 6, 100);

        // Pre-create every target so no network request is attempted.
        for band in Band::ALL {
            let name = format!("{}.bz2", id.filename(band));
            std::fs::write(dir.path().join(name), b"").unwrap();
        }

        let fetched = download_missing(&[id], &Band::ALL, "http://localhost:9", dir.path());
        assert_eq!(fetched, 0);
    }
}

//! FITS frame reading for cutout extraction.
//!
//! A frame is the primary (or first) 2D image HDU of a per-band FITS file.
//! Pixels are read as f32 in FITS row order, so the WCS y axis indexes rows
//! directly, and the optional BSCALE/BZERO linear rescale is applied when
//! both keywords are present.

use crate::wcs::TanWcs;
use fitsio::compat::fitsfile::FitsFile;
use fitsio::compat::hdu::FitsHdu;
use fitsio::compat::images::ReadImage;
use ndarray::Array2;
use std::path::Path;
use thiserror::Error;

/// Errors opening or interpreting a frame file.
#[derive(Error, Debug)]
pub enum FrameError {
    #[error("FITS I/O error: {0}")]
    FitsIo(#[from] fitsio::compat::errors::Error),
    #[error("no 2D image HDU found")]
    NoImageHdu,
    #[error("image data has {got} pixels, header promises {expected}")]
    ShapeMismatch { expected: usize, got: usize },
    #[error("header is missing WCS keyword(s): {0}")]
    MissingWcs(String),
}

/// One band image: pixel raster plus the WCS parsed from the same header.
#[derive(Debug, Clone)]
pub struct BandFrame {
    /// Pixel values, shape (rows, cols) = (NAXIS2, NAXIS1), FITS row order
    pub data: Array2<f32>,
    pub wcs: TanWcs,
}

impl BandFrame {
    /// Open a frame file: locate the first 2D image HDU, read its pixels,
    /// apply BSCALE/BZERO if both are present, and parse the TAN WCS.
    pub fn open(path: &Path) -> Result<Self, FrameError> {
        let fptr = FitsFile::open(path)?;
        let (hdu, naxis1, naxis2) = find_image_hdu(&fptr)?;

        let raw = f32::read_image(&fptr, &hdu)?;
        if raw.len() != naxis1 * naxis2 {
            return Err(FrameError::ShapeMismatch {
                expected: naxis1 * naxis2,
                got: raw.len(),
            });
        }
        let mut data = Array2::from_shape_vec((naxis2, naxis1), raw).map_err(|_| {
            FrameError::ShapeMismatch {
                expected: naxis1 * naxis2,
                got: 0,
            }
        })?;

        let bscale = hdu.read_key::<f64>(&fptr, "BSCALE");
        let bzero = hdu.read_key::<f64>(&fptr, "BZERO");
        if let (Ok(bscale), Ok(bzero)) = (bscale, bzero) {
            data.mapv_inplace(|v| (v as f64 * bscale + bzero) as f32);
        }

        let wcs = read_wcs(&fptr, &hdu)?;
        Ok(Self { data, wcs })
    }
}

/// Scan HDUs in order for the first one holding a non-empty 2D image.
fn find_image_hdu(fptr: &FitsFile) -> Result<(FitsHdu, usize, usize), FrameError> {
    let mut hdu_idx = 0;
    while let Ok(hdu) = fptr.hdu(hdu_idx) {
        let naxis = hdu.read_key::<i64>(fptr, "NAXIS").unwrap_or(0);
        if naxis == 2 {
            let naxis1 = hdu.read_key::<i64>(fptr, "NAXIS1").unwrap_or(0) as usize;
            let naxis2 = hdu.read_key::<i64>(fptr, "NAXIS2").unwrap_or(0) as usize;
            if naxis1 > 0 && naxis2 > 0 {
                return Ok((hdu, naxis1, naxis2));
            }
        }
        hdu_idx += 1;
    }
    Err(FrameError::NoImageHdu)
}

/// Parse the TAN WCS keywords, falling back from the CD matrix to CDELT
/// for axis-aligned headers.
fn read_wcs(fptr: &FitsFile, hdu: &FitsHdu) -> Result<TanWcs, FrameError> {
    let key = |name: &str| {
        hdu.read_key::<f64>(fptr, name)
            .map_err(|_| FrameError::MissingWcs(name.to_string()))
    };

    let crpix1 = key("CRPIX1")?;
    let crpix2 = key("CRPIX2")?;
    let crval1 = key("CRVAL1")?;
    let crval2 = key("CRVAL2")?;

    let cd_keys = (
        hdu.read_key::<f64>(fptr, "CD1_1"),
        hdu.read_key::<f64>(fptr, "CD1_2"),
        hdu.read_key::<f64>(fptr, "CD2_1"),
        hdu.read_key::<f64>(fptr, "CD2_2"),
    );
    let cd = match cd_keys {
        (Ok(cd11), Ok(cd12), Ok(cd21), Ok(cd22)) => [[cd11, cd12], [cd21, cd22]],
        _ => {
            let cdelt1 = key("CDELT1").map_err(|_| {
                FrameError::MissingWcs("CD matrix or CDELT1/CDELT2".to_string())
            })?;
            let cdelt2 = key("CDELT2").map_err(|_| {
                FrameError::MissingWcs("CD matrix or CDELT1/CDELT2".to_string())
            })?;
            [[cdelt1, 0.0], [0.0, cdelt2]]
        }
    };

    Ok(TanWcs::from_fits_cards(crpix1, crpix2, crval1, crval2, cd))
}

//! Canonical frame filenames and archive URLs.
//!
//! Every imaging field is stored as one FITS file per photometric band. The
//! filenames share a single template differing only in the band letter, so a
//! frame is addressed by its positional identifiers plus a [`Band`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default archive location for imaging frames.
pub const DEFAULT_FRAME_BASE_URL: &str =
    "https://data.sdss.org/sas/dr18/prior-surveys/sdss4-dr17-eboss/photoObj/frames";

/// Photometric band letters, in survey order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Band {
    U,
    G,
    R,
    I,
    Z,
}

impl Band {
    /// All five bands in the survey's canonical stacking order.
    pub const ALL: [Band; 5] = [Band::U, Band::G, Band::R, Band::I, Band::Z];

    /// Lowercase band letter as used in frame filenames.
    pub fn letter(&self) -> char {
        match self {
            Band::U => 'u',
            Band::G => 'g',
            Band::R => 'r',
            Band::I => 'i',
            Band::Z => 'z',
        }
    }

    pub fn from_letter(c: char) -> Option<Band> {
        match c {
            'u' => Some(Band::U),
            'g' => Some(Band::G),
            'r' => Some(Band::R),
            'i' => Some(Band::I),
            'z' => Some(Band::Z),
            _ => None,
        }
    }

    /// Parse an ordered band list from its letters, e.g. `"ugriz"` or `"gri"`.
    ///
    /// The order of the letters fixes the stacking order of the cutout
    /// tensor. Rejects empty lists, unknown letters, and duplicates.
    pub fn parse_list(s: &str) -> Result<Vec<Band>, String> {
        if s.is_empty() {
            return Err("band list cannot be empty".to_string());
        }
        let mut bands = Vec::with_capacity(s.len());
        for c in s.chars() {
            let band = Band::from_letter(c).ok_or_else(|| format!("unknown band letter '{c}'"))?;
            if bands.contains(&band) {
                return Err(format!("duplicate band letter '{c}'"));
            }
            bands.push(band);
        }
        Ok(bands)
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// Positional identifiers addressing one imaging field.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct FrameId {
    pub run: u32,
    pub rerun: u32,
    pub camcol: u32,
    pub field: u32,
}

impl FrameId {
    pub fn new(run: u32, rerun: u32, camcol: u32, field: u32) -> Self {
        Self {
            run,
            rerun,
            camcol,
            field,
        }
    }

    /// Canonical frame filename for one band:
    /// `frame-{band}-{run:06}-{camcol}-{field:04}.fits`.
    pub fn filename(&self, band: Band) -> String {
        format!(
            "frame-{}-{:06}-{}-{:04}.fits",
            band.letter(),
            self.run,
            self.camcol,
            self.field
        )
    }

    /// Archive URL for one band's frame. Archive copies are bzip2-compressed,
    /// hence the `.bz2` suffix on the canonical filename.
    pub fn url(&self, base_url: &str, band: Band) -> String {
        format!(
            "{}/{}/{}/{}/{}.bz2",
            base_url.trim_end_matches('/'),
            self.rerun,
            self.run,
            self.camcol,
            self.filename(band)
        )
    }
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "run {} rerun {} camcol {} field {}",
            self.run, self.rerun, self.camcol, self.field
        )
    }
}

//! Survey catalog access for the cutout pipeline.
//!
//! Covers the catalog side of dataset building: typed catalog rows with
//! label projection, a blocking query client for the survey's SQL web
//! service, canonical frame filename/URL derivation, and a thin download
//! helper for fetching missing frame archives.

pub mod client;
pub mod download;
pub mod frame_path;
pub mod row;

pub use client::{QueryError, SkyQueryClient};
pub use frame_path::{Band, FrameId};
pub use row::CatalogRow;

//! Multi-band cutout extraction for survey imaging frames.
//!
//! Turns catalog rows (object id, sky coordinate, frame identifiers) into
//! fixed-size multi-band pixel cutouts paired with label vectors, persisted
//! as NPY files for machine-learning training.
//!
//! The per-sample path is: project the sky coordinate into pixel space with
//! the frame's TAN WCS ([`wcs`]), extract a fixed-size zero-padded window
//! around that pixel ([`window`]), repeat per band and stack the windows
//! along a new trailing axis ([`stack`]), and write tensor + label keyed by
//! object id ([`store`]). [`pipeline`] runs that path over whole batches,
//! sequentially or on a worker pool, skipping failed samples.

pub mod frame;
pub mod pipeline;
pub mod stack;
pub mod store;
pub mod wcs;
pub mod window;

pub use pipeline::{DatasetBuilder, DatasetConfig, ExecutionMode, PipelineError, RunReport};
pub use stack::{CutoutError, CutoutExtractor};
pub use store::SampleStore;
pub use wcs::TanWcs;
pub use window::{extract_window, ClampPolicy, CutoutSize};

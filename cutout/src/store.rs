//! NPY sample persistence keyed by object id.
//!
//! Two parallel key spaces under one root: cutout tensors in `X/`, label
//! vectors in `y/`, one `{object_id}.npy` file each. No read-modify-write
//! ever happens; a key is written at most once per run and re-running a
//! batch simply overwrites the same keys.

use ndarray::{Array1, Array3};
use ndarray_npy::{WriteNpyError, WriteNpyExt};
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to create store directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to encode {}: {source}", path.display())]
    Npy {
        path: PathBuf,
        #[source]
        source: WriteNpyError,
    },
}

/// Output store for (cutout tensor, label vector) pairs.
#[derive(Debug, Clone)]
pub struct SampleStore {
    image_dir: PathBuf,
    label_dir: PathBuf,
}

impl SampleStore {
    /// Create (or reuse) the `X/` and `y/` directories under `root`.
    pub fn create(root: &Path) -> Result<Self, StoreError> {
        let image_dir = root.join("X");
        let label_dir = root.join("y");
        for dir in [&image_dir, &label_dir] {
            std::fs::create_dir_all(dir).map_err(|e| StoreError::CreateDir {
                path: dir.clone(),
                source: e,
            })?;
        }
        Ok(Self {
            image_dir,
            label_dir,
        })
    }

    pub fn image_path(&self, object_id: u64) -> PathBuf {
        self.image_dir.join(format!("{object_id}.npy"))
    }

    pub fn label_path(&self, object_id: u64) -> PathBuf {
        self.label_dir.join(format!("{object_id}.npy"))
    }

    /// Persist one sample under its object id.
    pub fn write_sample(
        &self,
        object_id: u64,
        image: &Array3<f32>,
        label: &Array1<f32>,
    ) -> Result<(), StoreError> {
        write_npy(self.image_path(object_id), image)?;
        write_npy(self.label_path(object_id), label)?;
        Ok(())
    }
}

fn write_npy<A: WriteNpyExt>(path: PathBuf, array: &A) -> Result<(), StoreError> {
    let file = File::create(&path).map_err(|e| StoreError::Io {
        path: path.clone(),
        source: e,
    })?;
    array
        .write_npy(BufWriter::new(file))
        .map_err(|e| StoreError::Npy { path, source: e })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array1, Array3};
    use ndarray_npy::ReadNpyExt;
    use std::fs::File;

    #[test]
    fn test_write_sample_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = SampleStore::create(dir.path()).unwrap();

        let image = Array3::from_shape_fn((4, 4, 2), |(y, x, b)| (y * 8 + x * 2 + b) as f32);
        let label = Array1::from(vec![0.42f32, 0.01, 0.40, 0.05]);
        store.write_sample(42, &image, &label).unwrap();

        assert!(dir.path().join("X/42.npy").exists());
        assert!(dir.path().join("y/42.npy").exists());

        let image_back =
            Array3::<f32>::read_npy(File::open(store.image_path(42)).unwrap()).unwrap();
        let label_back =
            Array1::<f32>::read_npy(File::open(store.label_path(42)).unwrap()).unwrap();
        assert_eq!(image_back, image);
        assert_eq!(label_back, label);
    }

    #[test]
    fn test_rerun_overwrites_same_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = SampleStore::create(dir.path()).unwrap();

        let first = Array3::from_elem((2, 2, 1), 1.0f32);
        let second = Array3::from_elem((2, 2, 1), 2.0f32);
        let label = Array1::from(vec![0.0f32]);

        store.write_sample(7, &first, &label).unwrap();
        store.write_sample(7, &second, &label).unwrap();

        let back = Array3::<f32>::read_npy(File::open(store.image_path(7)).unwrap()).unwrap();
        assert_eq!(back, second);
    }
}

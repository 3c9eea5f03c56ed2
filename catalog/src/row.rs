//! Catalog row model and CSV persistence.

use crate::frame_path::FrameId;
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One object from the survey catalog.
///
/// Column names follow the query service's CSV output, so rows deserialize
/// directly from either a service response or a previously saved CSV file.
/// The positional identifiers (`run`, `rerun`, `camcol`, `field`) address the
/// imaging frame the object falls on; the remaining numeric columns are the
/// regression targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogRow {
    /// Unique catalog identifier, the owning key for persisted files
    #[serde(rename = "objID")]
    pub obj_id: u64,
    pub run: u32,
    pub rerun: u32,
    pub camcol: u32,
    pub field: u32,
    /// Right ascension in degrees
    pub ra: f64,
    /// Declination in degrees
    pub dec: f64,
    /// Spectroscopic redshift
    pub z: f64,
    #[serde(rename = "zErr")]
    pub z_err: f64,
    /// Template-fit photometric redshift estimate
    pub template_photo_z: f64,
    #[serde(rename = "template_photo_zErr")]
    pub template_photo_z_err: f64,
}

impl CatalogRow {
    /// Frame identifier for the imaging field this object falls on.
    pub fn frame_id(&self) -> FrameId {
        FrameId::new(self.run, self.rerun, self.camcol, self.field)
    }

    /// Label vector paired with the cutout tensor for this object:
    /// `[z, zErr, template_photo_z, template_photo_zErr]` as f32.
    pub fn label(&self) -> Array1<f32> {
        Array1::from(vec![
            self.z as f32,
            self.z_err as f32,
            self.template_photo_z as f32,
            self.template_photo_z_err as f32,
        ])
    }
}

/// Read catalog rows from a CSV file with a header line.
pub fn read_rows_csv(path: &Path) -> Result<Vec<CatalogRow>, csv::Error> {
    let mut reader = csv::Reader::from_path(path)?;
    reader.deserialize().collect()
}

/// Write catalog rows to a CSV file, header included.
pub fn write_rows_csv(path: &Path, rows: &[CatalogRow]) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_row() -> CatalogRow {
        CatalogRow {
            obj_id: 1237648720693755918,
            run: 94,
            rerun: 301,
            camcol: 6,
            field: 100,
            ra: 180.1,
            dec: 0.2,
            z: 0.42,
            z_err: 0.01,
            template_photo_z: 0.40,
            template_photo_z_err: 0.05,
        }
    }

    #[test]
    fn test_label_projection() {
        let label = sample_row().label();
        assert_eq!(label.len(), 4);
        assert_eq!(label[0], 0.42f32);
        assert_eq!(label[1], 0.01f32);
        assert_eq!(label[2], 0.40f32);
        assert_eq!(label[3], 0.05f32);
    }

    #[test]
    fn test_csv_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rows.csv");

        let rows = vec![sample_row()];
        write_rows_csv(&path, &rows).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let header = contents.lines().next().unwrap();
        assert!(header.contains("objID"));
        assert!(header.contains("zErr"));
        assert!(header.contains("template_photo_zErr"));

        let read_back = read_rows_csv(&path).unwrap();
        assert_eq!(read_back, rows);
    }

    #[test]
    fn test_frame_id_from_row() {
        let id = sample_row().frame_id();
        assert_eq!(id.run, 94);
        assert_eq!(id.rerun, 301);
        assert_eq!(id.camcol, 6);
        assert_eq!(id.field, 100);
    }
}

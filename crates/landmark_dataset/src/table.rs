//! Flat CSV storage for extracted datasets: `label,x0,y0,z0,...,x20,y20,z20`.

use crate::types::{DatasetError, DatasetResult, LandmarkDataset, Sample};
use data_contracts::{feature_columns, FeatureVector, FEATURE_DIM};
use std::fs;
use std::path::Path;

pub const LABEL_COLUMN: &str = "label";

/// Full header row, label first.
pub fn table_header() -> Vec<String> {
    std::iter::once(LABEL_COLUMN.to_string())
        .chain(feature_columns())
        .collect()
}

/// Write the dataset as CSV. Rows go to a sibling temp file that is renamed into place,
/// so a failed write never leaves a truncated table behind.
pub fn write_table(path: &Path, dataset: &LandmarkDataset) -> DatasetResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| DatasetError::Io {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }
    let tmp = path.with_extension("csv.partial");
    let csv_err = |source: csv::Error| DatasetError::Csv {
        path: tmp.clone(),
        source,
    };

    let mut writer = csv::Writer::from_path(&tmp).map_err(csv_err)?;
    writer.write_record(table_header()).map_err(csv_err)?;
    let mut row: Vec<String> = Vec::with_capacity(FEATURE_DIM + 1);
    for sample in dataset.samples() {
        row.clear();
        row.push(sample.label.clone());
        row.extend(sample.features.as_slice().iter().map(|v| v.to_string()));
        writer.write_record(&row).map_err(csv_err)?;
    }
    writer.flush().map_err(|e| DatasetError::Io {
        path: tmp.clone(),
        source: e,
    })?;
    drop(writer);

    fs::rename(&tmp, path).map_err(|e| DatasetError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    tracing::info!(path = %path.display(), rows = dataset.len(), "wrote landmark table");
    Ok(())
}

/// Read a table written by [`write_table`]. The header must match exactly.
pub fn read_table(path: &Path) -> DatasetResult<LandmarkDataset> {
    let csv_err = |source: csv::Error| DatasetError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let table_err = |msg: String| DatasetError::Table {
        path: path.to_path_buf(),
        msg,
    };
    if !path.exists() {
        return Err(DatasetError::Io {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "landmark table missing"),
        });
    }

    let mut reader = csv::Reader::from_path(path).map_err(csv_err)?;
    let header: Vec<String> = reader
        .headers()
        .map_err(csv_err)?
        .iter()
        .map(str::to_string)
        .collect();
    if header != table_header() {
        return Err(table_err(format!(
            "unexpected header; expected {} columns starting with '{LABEL_COLUMN}', got {} columns",
            FEATURE_DIM + 1,
            header.len()
        )));
    }

    let mut samples = Vec::new();
    let mut values = Vec::with_capacity(FEATURE_DIM);
    for (row_idx, record) in reader.records().enumerate() {
        let record = record.map_err(csv_err)?;
        let line = row_idx + 2;
        let label = record
            .get(0)
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .ok_or_else(|| table_err(format!("line {line}: empty label")))?;
        values.clear();
        for (col, raw) in record.iter().enumerate().skip(1) {
            let v: f32 = raw.trim().parse().map_err(|_| {
                table_err(format!("line {line}, column {col}: '{raw}' is not a number"))
            })?;
            values.push(v);
        }
        let features = FeatureVector::from_slice(&values)
            .map_err(|e| table_err(format!("line {line}: {e}")))?;
        samples.push(Sample {
            label: label.to_string(),
            features,
        });
    }
    tracing::info!(path = %path.display(), rows = samples.len(), "read landmark table");
    Ok(LandmarkDataset::new(samples))
}

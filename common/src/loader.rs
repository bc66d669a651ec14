use std::{
    fs, io,
    path::{Path, PathBuf},
};

use thiserror::Error;
use tracing::debug;

use crate::record::{BenchmarkRecord, JmhResult};

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to read {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse {} as JMH results", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Reads one JMH json file, records keep the order they have in the file
pub fn load_records(path: &Path) -> Result<Vec<BenchmarkRecord>, LoadError> {
    let content = fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let results: Vec<JmhResult> =
        serde_json::from_str(&content).map_err(|source| LoadError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    debug!("Loaded {} records from {}", results.len(), path.display());

    Ok(results.into_iter().map(BenchmarkRecord::from).collect())
}

/// Loads every file in order and concatenates the records. The first failing
/// file aborts the whole load.
pub fn load_all<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<BenchmarkRecord>, LoadError> {
    let mut records = Vec::new();
    for path in paths {
        records.extend(load_records(path.as_ref())?);
    }
    debug!("Loaded {} records from {} files", records.len(), paths.len());
    Ok(records)
}

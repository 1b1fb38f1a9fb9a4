//! Error types for the file edges of the engine.
//!
//! The aggregations themselves are total over the data model and return
//! empty results rather than failing; only reading the survey CSV and the
//! boundary dataset can go wrong.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read survey file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// The boundary dataset could not be produced at all. Callers must treat
/// this as a structural failure, distinct from a successful join in which
/// some district simply has no responses.
#[derive(Debug, Error)]
pub enum BoundaryError {
    #[error("boundary dataset unavailable: cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("boundary dataset unavailable: cannot parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

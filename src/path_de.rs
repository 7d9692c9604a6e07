use std::path::{Path, PathBuf};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::syntax::SyntaxTree;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{origin}: at JSON path {json_path} → {message}")]
    Json {
        origin: String,
        json_path: String,
        message: String,
    },
}

/// Deserialize with JSON-path context in error messages.
pub fn from_str_with_path<T: DeserializeOwned>(origin: &str, src: &str) -> Result<T, SnapshotError> {
    let de = &mut serde_json::Deserializer::from_str(src);
    serde_path_to_error::deserialize::<_, T>(de).map_err(|err| SnapshotError::Json {
        origin: origin.to_string(),
        json_path: err.path().to_string(),
        message: err.into_inner().to_string(),
    })
}

pub fn from_slice_with_path<T: DeserializeOwned>(origin: &str, bytes: &[u8]) -> Result<T, SnapshotError> {
    let de = &mut serde_json::Deserializer::from_slice(bytes);
    serde_path_to_error::deserialize::<_, T>(de).map_err(|err| SnapshotError::Json {
        origin: origin.to_string(),
        json_path: err.path().to_string(),
        message: err.into_inner().to_string(),
    })
}

/// A snapshot file holds either one tree or an array of trees.
pub fn load_trees(path: &Path) -> Result<Vec<SyntaxTree>, SnapshotError> {
    let bytes = std::fs::read(path).map_err(|source| SnapshotError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let origin = path.to_string_lossy();
    if bytes.iter().find(|b| !b.is_ascii_whitespace()) == Some(&b'[') {
        from_slice_with_path::<Vec<SyntaxTree>>(&origin, &bytes)
    } else {
        from_slice_with_path::<SyntaxTree>(&origin, &bytes).map(|tree| vec![tree])
    }
}

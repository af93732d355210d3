use std::path::PathBuf;
use thiserror::Error;

pub type FcaResult<T> = Result<T, FcaError>;

#[derive(Error, Debug)]
pub enum FcaError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Cannot read workbook {}: {reason}", file.display())]
    Workbook { file: PathBuf, reason: String },

    #[error("{file}: required sheet {sheet} not found")]
    MissingSheet { file: String, sheet: String },

    #[error("Layout error: {0}")]
    Config(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("Selection error: {0}")]
    Selection(String),
}

impl FcaError {
    /// True for errors that exclude a single product but leave the others usable.
    pub fn is_per_product(&self) -> bool {
        matches!(
            self,
            FcaError::MissingSheet { .. } | FcaError::Workbook { .. }
        )
    }
}

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid protocol: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("page {page} sets on_success without a gate")]
    HookWithoutGate { page: String },
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("csv export failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("json export failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("export output is not valid utf-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

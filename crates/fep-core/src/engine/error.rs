use super::config::ConfigError;
use crate::core::io::namd::DocumentError;
use crate::core::models::lambda::LambdaError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Schedule generation failed: {0}")]
    Schedule(#[from] LambdaError),

    #[error("Failed to read template '{path}': {source}", path = path.display())]
    Template {
        path: PathBuf,
        #[source]
        source: DocumentError,
    },

    #[error("Missing result file '{path}': {source}", path = path.display())]
    MissingResult {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write '{path}': {source}", path = path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

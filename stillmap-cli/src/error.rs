//! CLI error type.

use thiserror::Error;

/// Errors surfaced to the command line with a non-zero exit code.
#[derive(Debug, Error)]
pub enum CliError {
    /// The job file could not be read.
    #[error("failed to read job file {path}: {source}")]
    JobRead {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// The job file is not valid JSON or misses required fields.
    #[error("invalid job file: {0}")]
    JobParse(#[from] serde_json::Error),
    /// A feature in the job is malformed.
    #[error(transparent)]
    Feature(#[from] stillmap::FeatureError),
    /// The render itself failed.
    #[error(transparent)]
    Render(#[from] stillmap::RenderError),
    /// The rendered image could not be written.
    #[error("failed to write output {path}: {source}")]
    OutputWrite {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

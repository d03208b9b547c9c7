//! Error types for the ray tracing crate.

use thiserror::Error;

/// Errors raised while configuring acceleration structure builds.
///
/// Building and querying a structure never fails; these only come from
/// setting things up.
#[derive(Error, Debug)]
pub enum TraceError {
    /// Build settings are out of range.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    /// Configuration named an acceleration structure that does not exist.
    #[error("unknown intersection structure type: {0}")]
    UnknownStructure(String),

    /// The worker threads could not be started.
    #[error("failed to create worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Result type for ray tracing setup operations.
pub type Result<T> = std::result::Result<T, TraceError>;

use thiserror::Error;

/// The environment could not produce a successor state.
///
/// This is the only failure a [`crate::Environment::step`] may report. Callers
/// treat it as "stop simulating" rather than as something to retry.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[error("environment could not produce a successor")]
pub struct StepFailure;

/// Errors that can occur when planning or setting up an environment
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GhostplanError {
    #[error("No legal actions available")]
    NoLegalActions,

    #[error("Invalid layout: {0}")]
    InvalidLayout(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Convenience Result type for ghostplan operations
pub type Result<T> = std::result::Result<T, GhostplanError>;

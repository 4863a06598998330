use thiserror::Error;

/// Failures internal to the tracing layer.
///
/// None of these ever reach the caller of a traced handler.
#[derive(Debug, Error)]
pub enum TraceError {
    #[error("trace sink rejected record: {0}")]
    Sink(String),
    #[error("invalid configuration: {0}")]
    Config(#[from] envy::Error),
}

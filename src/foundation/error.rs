/// Result alias used across the crate.
pub type CastResult<T> = Result<T, CastError>;

/// Errors produced by timeline loading, rendering, encoding and the frame pipeline.
#[derive(thiserror::Error, Debug)]
pub enum CastError {
    /// Invalid input (timeline, configuration, options).
    #[error("validation error: {0}")]
    Validation(String),

    /// A render surface or scene renderer failed.
    #[error("render error: {0}")]
    Render(String),

    /// The streaming encoder or muxer failed.
    #[error("encode error: {0}")]
    Encode(String),

    /// Pipeline orchestration failure (thread pool, writer, lifecycle).
    #[error("pipeline error: {0}")]
    Pipeline(String),

    /// A frame index was resolved without a raster and the policy forbids filling it.
    #[error("pipeline error: frame {index} was never rendered")]
    MissingFrame {
        /// Frame index the writer was waiting for.
        index: u64,
    },

    /// The ordered writer waited on one frame index longer than the stall timeout.
    #[error("pipeline error: writer stalled on frame {index} for {waited_ms} ms")]
    Stalled {
        /// Frame index the writer was waiting for.
        index: u64,
        /// Time spent waiting, in milliseconds.
        waited_ms: u64,
    },

    /// The pipeline was cancelled before all frames were written.
    #[error("pipeline error: cancelled")]
    Cancelled,

    /// JSON (de)serialization failure.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped error with context (I/O, process spawning).
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CastError {
    /// Build a [`CastError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`CastError::Render`].
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`CastError::Encode`].
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`CastError::Pipeline`].
    pub fn pipeline(msg: impl Into<String>) -> Self {
        Self::Pipeline(msg.into())
    }

    /// Build a [`CastError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;

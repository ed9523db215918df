//! Error types for the map engine.

use thiserror::Error;

/// Errors surfaced by the map session and reconciler.
///
/// Unresolvable coordinates are deliberately *not* an error: a record that
/// cannot be placed is skipped and logged, and the rest of the pass proceeds
/// with fewer markers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MapError {
    /// The mapping substrate could not create the interactive surface.
    /// Fatal for the visualization; callers must not retry on the same handle.
    #[error("map session creation failed: {0}")]
    SessionCreation(String),

    /// An operation was attempted on a session that has been torn down.
    #[error("map session is closed")]
    SessionClosed,
}

/// Convenience alias used throughout the engine.
pub type Result<T> = std::result::Result<T, MapError>;

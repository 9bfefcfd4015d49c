use thiserror::Error;

/// Errors that keep a session from starting. Per-frame conditions such
/// as silence or out-of-range estimates are not errors; they are `None`
/// values in the frame pipeline.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The audio source could not be set up, e.g. the microphone was
    /// unavailable or permission was denied. The session stays idle and
    /// the caller must retry explicitly.
    #[error("audio setup failed: {0}")]
    SetupFailure(String),
    /// A configuration value was rejected before the session started.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(&'static str),
}

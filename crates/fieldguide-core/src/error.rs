//! Error types for Fieldguide.
//!
//! Errors are split by component so every call site handles the failure
//! branch of the stage it called: permission, camera session, capture,
//! inference and confidence selection each carry their own discriminated kind.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for Fieldguide operations.
#[derive(Error, Debug)]
pub enum FieldguideError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Camera permission errors
    #[error("Permission error: {0}")]
    Permission(#[from] PermissionError),

    /// Camera session (device acquisition / binding) errors
    #[error("Camera session error: {0}")]
    Session(#[from] SessionError),

    /// Photo capture errors
    #[error("Capture error: {0}")]
    Capture(#[from] CaptureError),

    /// Classifier errors
    #[error("Inference error: {0}")]
    Inference(#[from] InferenceError),

    /// Top-label selection errors
    #[error("Confidence error: {0}")]
    Confidence(#[from] ConfidenceError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Camera permission errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PermissionError {
    /// The user declined, but the request may be issued again
    #[error("Camera permission was denied")]
    Denied,

    /// The user declined and asked not to be asked again
    #[error("Camera permission was permanently denied; re-enable it in settings")]
    DeniedPermanently,

    /// The permission registry could not be read or written
    #[error("Permission store error at {path}: {message}")]
    Store { path: PathBuf, message: String },

    /// The prompt itself failed (no terminal, interrupted, ...)
    #[error("Permission prompt failed: {0}")]
    Prompt(String),
}

/// Camera session lifecycle errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// `activate` was called while another activation is still pending
    #[error("Camera activation already in progress")]
    ActivationInProgress,

    /// The camera device could not be acquired
    #[error("Failed to acquire camera: {0}")]
    AcquisitionFailed(String),

    /// Preview/capture streams could not be bound to the device
    #[error("Failed to bind camera streams: {0}")]
    BindFailed(String),

    /// The device is already claimed by another binding
    #[error("Camera device is already bound")]
    DeviceClaimed,

    /// Device acquisition did not finish in time
    #[error("Camera acquisition timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// The session was deactivated (or dropped) before the operation finished
    #[error("Camera session was torn down")]
    TornDown,
}

/// Photo capture errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CaptureError {
    /// Capture requested while the session is not `Bound`
    #[error("Camera is not ready")]
    NotReady,

    /// A previous capture on this session has not completed yet
    #[error("Camera is busy with another capture")]
    DeviceBusy,

    /// The session was deactivated while the capture was pending
    #[error("Camera session was torn down before the capture completed")]
    SessionTornDown,

    /// The device reported a failure writing the photo
    #[error("Capture to {path} failed: {message}")]
    Failed { path: PathBuf, message: String },

    /// The device did not deliver the photo in time
    #[error("Capture to {path} timed out after {timeout_ms}ms")]
    Timeout { path: PathBuf, timeout_ms: u64 },
}

/// Inference service errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InferenceError {
    /// The classifier could not be initialized (fatal, not retried)
    #[error("Failed to load model from {path}: {message}")]
    ModelLoad { path: PathBuf, message: String },

    /// The image could not be read or has unsupported geometry
    #[error("Could not decode {path}: {message}")]
    Decode { path: PathBuf, message: String },

    /// The model ran but its output could not be used
    #[error("Inference failed for {path}: {message}")]
    Inference { path: PathBuf, message: String },

    /// A stage exceeded its time budget
    #[error("Timeout in {stage} stage for {path} after {timeout_ms}ms")]
    Timeout {
        path: PathBuf,
        stage: String,
        timeout_ms: u64,
    },
}

/// Confidence classifier errors.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceError {
    /// The classifier returned no (label, score) pairs
    #[error("Classifier returned an empty result")]
    EmptyResult,
}

/// Convenience type alias for Fieldguide results.
pub type Result<T> = std::result::Result<T, FieldguideError>;

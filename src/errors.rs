// SPDX-License-Identifier: MPL-2.0

//! Error types for the scanner application
//!
//! None of these are fatal: every failure degrades to dropping an event or
//! showing a static message, so callers mostly log them.

use std::fmt;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Main application error type
#[derive(Debug, Clone)]
pub enum AppError {
    /// Persistent store errors
    Store(StoreError),
    /// Embedded page view errors
    Browser(String),
}

/// Camera-specific errors
#[derive(Debug, Clone)]
pub enum CameraError {
    /// GStreamer could not be initialized
    InitializationFailed(String),
    /// No camera devices found
    NoCameraFound,
    /// The device exists but access was refused or it never started streaming
    AccessDenied(String),
    /// The capture pipeline failed after start
    PipelineError(String),
}

/// Persistent store errors
#[derive(Debug, Clone)]
pub enum StoreError {
    /// No directory available to hold the store
    NoStoreDirectory,
    /// Reading the slot failed
    ReadFailed(String),
    /// Writing the slot failed
    WriteFailed(String),
    /// The value could not be serialized
    Serialize(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Store(e) => write!(f, "Store error: {}", e),
            AppError::Browser(msg) => write!(f, "Page view error: {}", msg),
        }
    }
}

impl fmt::Display for CameraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraError::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            CameraError::NoCameraFound => write!(f, "No camera devices found"),
            CameraError::AccessDenied(msg) => write!(f, "Camera access denied: {}", msg),
            CameraError::PipelineError(msg) => write!(f, "Pipeline error: {}", msg),
        }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::NoStoreDirectory => write!(f, "No configuration directory available"),
            StoreError::ReadFailed(msg) => write!(f, "Read failed: {}", msg),
            StoreError::WriteFailed(msg) => write!(f, "Write failed: {}", msg),
            StoreError::Serialize(msg) => write!(f, "Serialization failed: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}
impl std::error::Error for CameraError {}
impl std::error::Error for StoreError {}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Store(err)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialize(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Browser(err.to_string())
    }
}

impl From<gstreamer::glib::Error> for CameraError {
    fn from(err: gstreamer::glib::Error) -> Self {
        CameraError::InitializationFailed(err.to_string())
    }
}

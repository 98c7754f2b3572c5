//! Error types for the Aurora3D engine
//!
//! This module defines the error types used throughout the engine,
//! including device failures, initialization, resource management,
//! and render graph compilation.

use std::fmt;
use crate::render_graph::BuildError;

/// Result type for Aurora3D engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Aurora3D engine errors
#[derive(Debug, Clone)]
pub enum Error {
    /// Backend-specific error (Vulkan device, allocator, etc.)
    BackendError(String),

    /// Out of GPU memory
    OutOfMemory,

    /// Invalid resource (image, buffer, binding group, scene handle, etc.)
    InvalidResource(String),

    /// Initialization failed (engine, renderer, subsystems)
    InitializationFailed(String),

    /// Render graph compilation failed
    Build(BuildError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of GPU memory"),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::Build(err) => write!(f, "Render graph build failed: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Build(err) => Some(err),
            _ => None,
        }
    }
}

impl From<BuildError> for Error {
    fn from(err: BuildError) -> Self {
        Error::Build(err)
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;

//! Scene errors

use std::path::PathBuf;
use thiserror::Error;

/// Problems with a scene that parsed but cannot be simulated
#[derive(Error, Debug)]
pub enum CliError {
    /// Scene file extension is not `.toml` or `.json`
    #[error("Unsupported scene format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    /// The motion has nothing to animate
    #[error("Scene '{scene}' has an empty {kind} motion")]
    EmptyMotion { scene: String, kind: &'static str },

    /// A duration or frame rate that must be positive is not
    #[error("Invalid {what}: {value}")]
    InvalidValue { what: &'static str, value: f64 },
}

pub type Result<T> = std::result::Result<T, CliError>;

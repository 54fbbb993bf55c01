//! Error types for calibration loading, device access and the redirect loop

use std::path::PathBuf;
use thiserror::Error;

/// Malformed or inconsistent calibration descriptor
#[derive(Error, Debug, PartialEq, Eq)]
pub enum FormatError {
    #[error("calibration descriptor is empty")]
    Empty,

    #[error("expected at least 3 tokens on the descriptor line, found {0}")]
    MissingCoefficients(usize),

    #[error("invalid axis count {0}")]
    InvalidAxisCount(i32),

    #[error("invalid integer {token:?} at position {position} of the coefficient list")]
    InvalidNumber { position: usize, token: String },

    #[error("{0} coefficients do not form groups of 6")]
    IncompleteGroup(usize),

    #[error("descriptor declares {declared} axes but contains {parsed}")]
    AxisCountMismatch { declared: usize, parsed: usize },
}

/// Failure to read or parse a calibration file
#[derive(Error, Debug)]
pub enum CalibrationError {
    #[error("failed to read calibration file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid calibration file: {0}")]
    Format(#[from] FormatError),
}

/// Failure to load an axis map override
#[derive(Error, Debug)]
pub enum AxisMapError {
    #[error("failed to read axis map {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid axis map: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("event code {0} is mapped more than once")]
    DuplicateCode(u16),
}

/// Errors from raw and virtual device operations
#[derive(Error, Debug)]
pub enum DeviceError {
    #[error("failed to open input device {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The uinput facility refused to create the virtual device
    #[error("permission denied creating virtual device: {0}")]
    PermissionDenied(#[source] std::io::Error),

    #[error("failed to create virtual device: {0}")]
    CreateVirtual(#[source] std::io::Error),

    #[error("failed to query device capabilities: {0}")]
    Capabilities(#[source] std::io::Error),

    #[error("failed to read events: {0}")]
    Read(#[source] std::io::Error),

    #[error("failed to write event: {0}")]
    Write(#[source] std::io::Error),
}

impl DeviceError {
    /// Classify a uinput creation failure
    pub fn from_uinput(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::PermissionDenied {
            DeviceError::PermissionDenied(err)
        } else {
            DeviceError::CreateVirtual(err)
        }
    }
}

/// Errors that stop the redirect loop
#[derive(Error, Debug)]
pub enum RedirectError {
    #[error(transparent)]
    Device(#[from] DeviceError),

    #[error("event code {code} maps to axis {axis}, but only {available} calibration profiles are loaded")]
    MissingProfile {
        code: u16,
        axis: usize,
        available: usize,
    },
}

//! Error types for Linux i2c-dev operations

use std::io;
use thiserror::Error;

/// Linux i2c-dev specific errors
#[derive(Debug, Error)]
pub enum LinuxI2cError {
    /// Device node does not exist
    #[error("Could not open file `{path}': {source}")]
    NotFound {
        path: String,
        #[source]
        source: io::Error,
    },

    /// Device node exists but may not be opened by this user
    #[error("Could not open file `{path}': {source}\nRun as root?")]
    PermissionDenied {
        path: String,
        #[source]
        source: io::Error,
    },

    /// Failed to open device
    #[error("Could not open file `{path}': {source}")]
    OpenFailed {
        path: String,
        #[source]
        source: io::Error,
    },

    /// I2C_FUNCS failed
    #[error("Could not get the adapter functionality matrix: {0}")]
    FunctionalityFailed(#[source] io::Error),

    /// I2C_SLAVE / I2C_SLAVE_FORCE failed
    #[error("Could not set address to 0x{address:02x}: {source}")]
    SetAddressFailed {
        address: u8,
        #[source]
        source: io::Error,
    },

    /// I2C_TIMEOUT failed
    #[error("Could not set timeout to {timeout}: {source}")]
    SetTimeoutFailed {
        timeout: u32,
        #[source]
        source: io::Error,
    },

    /// I2C_RETRIES failed
    #[error("Could not set retries to {retries}: {source}")]
    SetRetriesFailed {
        retries: u32,
        #[source]
        source: io::Error,
    },

    /// I2C_RDWR failed as a whole
    #[error("Sending messages failed: {0}")]
    TransferFailed(#[source] io::Error),

    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type for Linux i2c-dev operations
pub type Result<T> = std::result::Result<T, LinuxI2cError>;

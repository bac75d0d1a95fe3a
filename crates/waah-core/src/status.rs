//! Backend status codes
//!
//! Codec and surface operations report a [`Status`]. Only a fixed set of
//! statuses is raised as an error; everything else is logged and ignored.

use std::io;

use crate::{Result, WaahError};

/// Status reported by a codec or surface operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    NoMemory,
    FileNotFound,
    ReadError,
    SurfaceTypeMismatch,
    WriteError,
    InvalidFormat,
    InvalidSize,
    PngError,
}

impl Status {
    /// The error this status maps to, if it is one of the raised kinds
    pub fn error(self) -> Option<WaahError> {
        match self {
            Status::NoMemory => Some(WaahError::NoMemory),
            Status::FileNotFound => Some(WaahError::FileNotFound),
            Status::ReadError => Some(WaahError::ReadError),
            Status::SurfaceTypeMismatch => Some(WaahError::SurfaceTypeMismatch),
            Status::WriteError => Some(WaahError::WriteError),
            Status::Success | Status::InvalidFormat | Status::InvalidSize | Status::PngError => None,
        }
    }

    /// Raise mapped statuses, ignore the rest
    pub fn raise(self) -> Result<()> {
        match self.error() {
            Some(err) => Err(err),
            None => {
                if self != Status::Success {
                    tracing::warn!("Ignoring unmapped status: {:?}", self);
                }
                Ok(())
            }
        }
    }

    /// Status for a failure to open a file
    pub fn from_open_error(err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::OutOfMemory => Status::NoMemory,
            _ => Status::FileNotFound,
        }
    }

    /// Status for a failure while reading
    pub fn from_read_error(err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::OutOfMemory => Status::NoMemory,
            io::ErrorKind::NotFound => Status::FileNotFound,
            _ => Status::ReadError,
        }
    }

    /// Status for a failure while creating or writing a file
    pub fn from_write_error(err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::OutOfMemory => Status::NoMemory,
            _ => Status::WriteError,
        }
    }
}

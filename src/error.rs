//! Error types for container operations.

use std::fmt;
use std::io;

/// Errors raised by container insertion and import.
///
/// A cell annihilated by walls or neighbors is *not* an error: cell
/// computations report it by returning `false` and callers skip the
/// particle.
#[derive(Debug)]
pub enum Error {
    /// A coordinate on a non-periodic axis fell outside the container.
    OutOfDomain { x: f64, y: f64, z: f64 },

    /// A computational box grew past the configured particle ceiling.
    /// This indicates a sizing mistake rather than a recoverable state.
    MemoryCeiling { limit: usize },

    /// An I/O failure while importing particles.
    Io(io::Error),

    /// A malformed record encountered while importing particles.
    /// `line` is 1-based.
    Parse { line: usize },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::OutOfDomain { x, y, z } => {
                write!(f, "point ({}, {}, {}) outside the non-periodic container", x, y, z)
            }
            Error::MemoryCeiling { limit } => {
                write!(f, "per-box particle memory exceeded the ceiling of {}", limit)
            }
            Error::Io(e) => write!(f, "import failed: {}", e),
            Error::Parse { line } => write!(f, "malformed particle record on line {}", line),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}

//! Shared types used across the keysweep library.

use core::fmt;
use std::error;
use std::io;
use std::path::PathBuf;

// =============================================================================
// BLOCKS & KEYS
// =============================================================================

/// Key width in bytes (DES: 64-bit key, 56 effective bits + 8 parity bits).
pub const KEY_SIZE: usize = 8;

/// Cipher block width in bytes.
pub const BLOCK_SIZE: usize = 8;

/// A full cipher key.
pub type Key = [u8; KEY_SIZE];

/// One cipher block (plaintext or ciphertext).
pub type Block = [u8; BLOCK_SIZE];

/// Result-slot value meaning "no lane matched".
pub const NOT_FOUND: Key = [0u8; KEY_SIZE];

// =============================================================================
// SEARCH REQUEST
// =============================================================================

/// Fixed inputs of one exhaustive search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchRequest {
    /// Key with its unknown region zeroed.
    pub known_prefix: Key,
    /// Known plaintext block.
    pub plaintext: Block,
    /// Ciphertext the true key produces from `plaintext`.
    pub target: Block,
    /// Width of the unknown region; the search runs `2^unknown_bits` lanes.
    pub unknown_bits: u32,
}

impl SearchRequest {
    /// Bundle the search inputs.
    #[must_use]
    pub const fn new(known_prefix: Key, plaintext: Block, target: Block, unknown_bits: u32) -> Self {
        Self {
            known_prefix,
            plaintext,
            target,
            unknown_bits,
        }
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Every failure a search can report.
///
/// An exhausted keyspace without a match is not an error: searches return
/// `Ok(None)` for it.
#[derive(Debug)]
pub enum SearchError {
    /// A device operation failed (discovery, allocation, transfer, dispatch, wait).
    Device {
        /// Name of the failing operation.
        operation: &'static str,
        /// Status code, `OpenCL` numbering (see [`crate::engine::device::status`]).
        code: i32,
    },
    /// The kernel failed to compile for the selected device.
    Build {
        /// Compiler diagnostic output.
        log: String,
    },
    /// The kernel source artifact could not be read.
    Io {
        /// Path of the artifact.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// The kernel source artifact exceeds the loader's size limit.
    SourceTooLarge {
        /// Path of the artifact.
        path: PathBuf,
        /// Maximum accepted size in bytes.
        limit: usize,
    },
    /// No kernel source defines the oracle's device entry point.
    MissingKernel {
        /// Entry point that was looked for.
        entry: String,
    },
    /// `unknown_bits` does not fit the lane index space.
    KeyspaceTooWide {
        /// Requested width.
        bits: u32,
    },
    /// The lane count exceeds the device's maximum 1-D dispatch width.
    DispatchTooWide {
        /// Requested lane count.
        lanes: u64,
        /// Device limit.
        max: u64,
    },
    /// The known prefix has non-zero bits inside the unknown region.
    PrefixNotCleared,
    /// The requested backend is not compiled in or has no usable device.
    BackendUnavailable {
        /// Backend name.
        backend: &'static str,
    },
}

impl SearchError {
    /// Shorthand for a failed device operation.
    pub const fn device(operation: &'static str, code: i32) -> Self {
        Self::Device { operation, code }
    }
}

impl fmt::Display for SearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Device { operation, code } => {
                write!(f, "Error {code} executing {operation}")
            }
            Self::Build { log } => write!(f, "Kernel compilation failed:\n{log}"),
            Self::Io { path, source } => {
                write!(f, "Failed to load kernel {}: {source}", path.display())
            }
            Self::SourceTooLarge { path, limit } => write!(
                f,
                "Kernel source {} exceeds the {limit} byte limit",
                path.display()
            ),
            Self::MissingKernel { entry } => write!(
                f,
                "No kernel source defines entry point '{entry}' (set a kernel path)"
            ),
            Self::KeyspaceTooWide { bits } => write!(
                f,
                "Unknown region of {bits} bits is too wide (maximum {})",
                crate::keyspace::MAX_UNKNOWN_BITS
            ),
            Self::DispatchTooWide { lanes, max } => write!(
                f,
                "Search needs {lanes} lanes but the device dispatches at most {max}"
            ),
            Self::PrefixNotCleared => {
                write!(f, "Known prefix must have its unknown region zeroed")
            }
            Self::BackendUnavailable { backend } => {
                write!(f, "Backend '{backend}' is not available")
            }
        }
    }
}

impl error::Error for SearchError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

//! Kernel source artifact.
//!
//! Compiled backends build the search routine from `OpenCL` C text, either
//! the copy embedded at compile time or a file supplied at runtime.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::types::SearchError;

// =============================================================================
// CONSTANTS
// =============================================================================

/// Largest kernel source accepted from disk (bytes).
pub const MAX_SOURCE_SIZE: usize = 100_000;

/// Entry point of the DES search kernel.
pub const DES_ENTRY: &str = "des_brute_kernel";

/// DES search kernel embedded at compile time.
pub const DES_KERNEL: &str = include_str!("../../kernels/des_brute_kernel.cl");

// =============================================================================
// KERNEL SOURCE
// =============================================================================

/// `OpenCL` C program text plus the name of its search entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KernelSource {
    /// Kernel function to launch.
    pub entry: String,
    /// Program text.
    pub text: String,
    /// File the text was read from (`None` when embedded).
    pub origin: Option<PathBuf>,
}

impl KernelSource {
    /// The embedded DES search kernel.
    #[must_use]
    pub fn embedded() -> Self {
        Self {
            entry: DES_ENTRY.to_owned(),
            text: DES_KERNEL.to_owned(),
            origin: None,
        }
    }

    /// The embedded kernel defining `entry`, if there is one.
    #[must_use]
    pub fn embedded_for(entry: &str) -> Option<Self> {
        (entry == DES_ENTRY).then(Self::embedded)
    }

    /// Human-readable origin for diagnostics.
    pub fn origin_label(&self) -> String {
        self.origin
            .as_ref()
            .map_or_else(|| "embedded".to_owned(), |p| p.display().to_string())
    }
}

/// Load the search kernel with entry point `entry` from `path`.
///
/// # Errors
/// Returns `SearchError::Io` if the file cannot be opened or read, and
/// `SearchError::SourceTooLarge` if it holds more than `MAX_SOURCE_SIZE` bytes.
pub fn load(path: &Path, entry: &str) -> Result<KernelSource, SearchError> {
    let io_error = |source| SearchError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(io_error)?;

    // One byte past the limit tells a full-size file from an oversized one.
    let mut bytes = Vec::with_capacity(MAX_SOURCE_SIZE);
    file.take(MAX_SOURCE_SIZE as u64 + 1)
        .read_to_end(&mut bytes)
        .map_err(io_error)?;

    if bytes.len() > MAX_SOURCE_SIZE {
        return Err(SearchError::SourceTooLarge {
            path: path.to_path_buf(),
            limit: MAX_SOURCE_SIZE,
        });
    }

    tracing::debug!(path = %path.display(), bytes = bytes.len(), "loaded kernel source");

    Ok(KernelSource {
        entry: entry.to_owned(),
        text: String::from_utf8_lossy(&bytes).into_owned(),
        origin: Some(path.to_path_buf()),
    })
}

/// Kernel for `entry`: loaded from `path` if given, otherwise embedded.
///
/// # Errors
/// See [`load`]; `SearchError::MissingKernel` if no path is given and no
/// embedded kernel defines `entry`.
pub fn resolve(path: Option<&Path>, entry: &str) -> Result<KernelSource, SearchError> {
    match path {
        Some(path) => load(path, entry),
        None => KernelSource::embedded_for(entry).ok_or_else(|| SearchError::MissingKernel {
            entry: entry.to_owned(),
        }),
    }
}

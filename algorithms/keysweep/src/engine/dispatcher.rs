//! Backend Dispatcher
//!
//! Selects the compute backend for a search: `OpenCL` when it is compiled in,
//! a device is present and the cipher has a device kernel; the portable CPU
//! backend otherwise.

use crate::kernels::source::DES_ENTRY;
use crate::types::SearchError;

// =============================================================================
// BACKENDS
// =============================================================================

/// A concrete compute backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Host CPU (Rayon).
    Portable,
    /// `OpenCL` device.
    OpenCl,
}

impl Backend {
    /// Short backend name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Portable => "portable",
            Self::OpenCl => "opencl",
        }
    }
}

/// Which backend a search should use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BackendPreference {
    /// `OpenCL` if usable, portable otherwise.
    #[default]
    Auto,
    /// Always the portable backend.
    Portable,
    /// `OpenCL` or fail.
    OpenCl,
}

impl BackendPreference {
    /// Parse `auto`, `portable` or `opencl` (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "auto" => Some(Self::Auto),
            "portable" | "cpu" => Some(Self::Portable),
            "opencl" | "gpu" => Some(Self::OpenCl),
            _ => None,
        }
    }
}

// =============================================================================
// DISPATCHER
// =============================================================================

/// Whether an `OpenCL` device can be used.
#[cfg(feature = "opencl")]
pub fn opencl_available() -> bool {
    crate::engine::opencl::device_count() > 0
}

/// Whether an `OpenCL` device can be used (never: not compiled in).
#[cfg(not(feature = "opencl"))]
pub const fn opencl_available() -> bool {
    false
}

/// Resolve `preference` for an oracle whose device kernel is `device_kernel`.
///
/// # Errors
/// Returns `SearchError::BackendUnavailable` if `OpenCL` is requested but not
/// compiled in, has no device, or the oracle has no device kernel.
pub fn select_backend(
    preference: BackendPreference,
    device_kernel: Option<&str>,
) -> Result<Backend, SearchError> {
    let opencl_usable = || device_kernel.is_some() && opencl_available();

    match preference {
        BackendPreference::OpenCl | BackendPreference::Auto if opencl_usable() => {
            Ok(Backend::OpenCl)
        }
        BackendPreference::OpenCl => Err(SearchError::BackendUnavailable {
            backend: Backend::OpenCl.name(),
        }),
        BackendPreference::Portable | BackendPreference::Auto => Ok(Backend::Portable),
    }
}

/// Name of the backend a default DES search would use.
#[must_use]
pub fn active_backend_name() -> &'static str {
    select_backend(BackendPreference::Auto, Some(DES_ENTRY)).map_or("portable", Backend::name)
}

//! Search configuration.
//!
//! Defaults, optionally overridden from the environment:
//!
//! | Variable              | Field                | Example            |
//! |-----------------------|----------------------|--------------------|
//! | `KEYSWEEP_BACKEND`    | `backend`            | `portable`         |
//! | `KEYSWEEP_KERNEL`     | `kernel_path`        | `./des_brute.cl`   |
//! | `KEYSWEEP_GROUP_SIZE` | `group_size`         | `256`              |
//! | `KEYSWEEP_THREADS`    | `threads`            | `8`                |
//! | `KEYSWEEP_MAX_LANES`  | `max_portable_lanes` | `4294967296`       |

use std::path::PathBuf;
use std::str::FromStr;

use crate::engine::dispatcher::BackendPreference;
use crate::engine::portable::DEFAULT_MAX_LANES;

/// Preferred lanes per work group.
pub const DEFAULT_GROUP_SIZE: usize = 256;

/// Tunables of a [`crate::Searcher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    /// Backend selection.
    pub backend: BackendPreference,
    /// Kernel source file for compiled backends (`None` = embedded kernel).
    pub kernel_path: Option<PathBuf>,
    /// Preferred work-group size, clamped to the device limit.
    pub group_size: usize,
    /// Portable worker threads (0 = one per CPU).
    pub threads: usize,
    /// Dispatch width limit of the portable backend.
    pub max_portable_lanes: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            backend: BackendPreference::Auto,
            kernel_path: None,
            group_size: DEFAULT_GROUP_SIZE,
            threads: 0,
            max_portable_lanes: DEFAULT_MAX_LANES,
        }
    }
}

impl SearchConfig {
    /// Defaults overridden by `KEYSWEEP_*` environment variables.
    pub fn from_env() -> Self {
        Self::default().with_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides from `lookup` (variable name to value).
    ///
    /// Unparseable values are ignored with a warning.
    #[must_use]
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("KEYSWEEP_BACKEND") {
            if let Some(backend) = BackendPreference::from_name(&value) {
                self.backend = backend;
            } else {
                tracing::warn!(%value, "ignoring KEYSWEEP_BACKEND");
            }
        }
        if let Some(value) = lookup("KEYSWEEP_KERNEL") {
            if !value.is_empty() {
                self.kernel_path = Some(PathBuf::from(value));
            }
        }
        if let Some(size) = parse_var::<usize>(&lookup, "KEYSWEEP_GROUP_SIZE") {
            if size > 0 {
                self.group_size = size;
            }
        }
        if let Some(threads) = parse_var(&lookup, "KEYSWEEP_THREADS") {
            self.threads = threads;
        }
        if let Some(lanes) = parse_var::<u64>(&lookup, "KEYSWEEP_MAX_LANES") {
            if lanes > 0 {
                self.max_portable_lanes = lanes;
            }
        }
        self
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<T> {
    let value = lookup(name)?;
    let parsed = value.trim().parse().ok();
    if parsed.is_none() {
        tracing::warn!(variable = name, %value, "ignoring unparseable value");
    }
    parsed
}

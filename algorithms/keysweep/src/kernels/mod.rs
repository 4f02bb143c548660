//! Search Kernels
//!
//! The per-lane search routine: a native Rust version for the portable
//! backend and the `OpenCL` source artifact for compiled devices.

pub mod portable;
pub mod source;

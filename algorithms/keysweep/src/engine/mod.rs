//! Execution Engine
//!
//! Compute device contract, the backends implementing it, and backend
//! selection.

pub mod device;
pub mod dispatcher;
#[cfg(feature = "opencl")]
pub mod opencl;
pub mod portable;

pub use dispatcher::active_backend_name;

//! Compute Device Contract
//!
//! What the search orchestrator needs from an accelerator: buffers,
//! synchronous host/device copies, a 1-D dispatch over `lanes` work-items in
//! groups of `group_size`, and a blocking wait for completion.

use crate::types::SearchError;

// =============================================================================
// STATUS CODES
// =============================================================================

/// Device status codes (`OpenCL` numbering, shared by every backend).
pub mod status {
    /// No device of the requested type.
    pub const DEVICE_NOT_FOUND: i32 = -1;
    /// Buffer storage could not be allocated.
    pub const MEM_OBJECT_ALLOCATION_FAILURE: i32 = -4;
    /// Host-side resources (threads, queues) could not be created.
    pub const OUT_OF_RESOURCES: i32 = -5;
    /// A size or argument value is out of range.
    pub const INVALID_VALUE: i32 = -30;
    /// Buffer used against its access mode.
    pub const INVALID_MEM_OBJECT: i32 = -38;
    /// Kernel argument has the wrong value.
    pub const INVALID_ARG_VALUE: i32 = -50;
    /// Kernel argument has the wrong size.
    pub const INVALID_ARG_SIZE: i32 = -51;
    /// Work-group size does not divide the global size or exceeds the limit.
    pub const INVALID_WORK_GROUP_SIZE: i32 = -54;
    /// Zero-sized buffer requested.
    pub const INVALID_BUFFER_SIZE: i32 = -61;
    /// Global size exceeds what the device dispatches.
    pub const INVALID_GLOBAL_WORK_SIZE: i32 = -63;
}

// =============================================================================
// DESCRIPTORS
// =============================================================================

/// Device-side access mode of a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemAccess {
    /// Kernels only read it.
    ReadOnly,
    /// Kernels read and write it.
    ReadWrite,
}

/// Dispatch limits of a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceLimits {
    /// Largest 1-D global size a single dispatch accepts.
    pub max_dispatch_width: u64,
    /// Largest work-group size.
    pub max_group_size: usize,
}

/// Shape of a 1-D dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
    /// Total work-items.
    pub lanes: u64,
    /// Work-items per group (divides `lanes`).
    pub group_size: usize,
}

/// Arguments of the search kernel, in kernel parameter order.
pub struct KernelArgs<'a, B> {
    /// Known key prefix (read-only).
    pub key: &'a B,
    /// Known plaintext (read-only).
    pub plaintext: &'a B,
    /// Target ciphertext (read-only).
    pub target: &'a B,
    /// Result slot (read-write).
    pub result: &'a mut B,
    /// Width of the unknown key region.
    pub unknown_bits: u32,
}

// =============================================================================
// CONTRACT
// =============================================================================

/// One execution context on a compute device.
///
/// A context lives for a single search: dropping it releases the queue,
/// program and buffers it created.
pub trait ComputeContext {
    /// Device-visible memory.
    type Buffer;
    /// Compiled search kernel.
    type Program;
    /// Completion signal of a dispatch.
    type Event;

    /// Device name for diagnostics.
    fn name(&self) -> &str;

    /// Dispatch limits of the underlying device.
    fn limits(&self) -> DeviceLimits;

    /// Build the search kernel for this device.
    ///
    /// # Errors
    /// `SearchError::Build` carrying the compiler log, or a device error.
    fn build_program(&self) -> Result<Self::Program, SearchError>;

    /// Allocate a zero-initialised buffer of `len` bytes.
    ///
    /// # Errors
    /// Device error on allocation failure.
    fn create_buffer(&self, access: MemAccess, len: usize) -> Result<Self::Buffer, SearchError>;

    /// Blocking host-to-device copy of the whole buffer.
    ///
    /// # Errors
    /// Device error if the transfer fails or sizes differ.
    fn write_buffer(&self, buffer: &mut Self::Buffer, data: &[u8]) -> Result<(), SearchError>;

    /// Blocking device-to-host copy of the whole buffer.
    ///
    /// # Errors
    /// Device error if the transfer fails or sizes differ.
    fn read_buffer(&self, buffer: &Self::Buffer, out: &mut [u8]) -> Result<(), SearchError>;

    /// Launch the search kernel over `grid`.
    ///
    /// # Errors
    /// Device error if the dispatch is rejected.
    fn enqueue(
        &self,
        program: &Self::Program,
        args: KernelArgs<'_, Self::Buffer>,
        grid: Grid,
    ) -> Result<Self::Event, SearchError>;

    /// Block until the dispatch behind `event` completes.
    ///
    /// # Errors
    /// Device error if the dispatch failed on the device.
    fn wait(&self, event: Self::Event) -> Result<(), SearchError>;
}

// =============================================================================
// HELPERS
// =============================================================================

/// Work-group size for a dispatch of `lanes` (a power of two).
///
/// Largest power of two not above `preferred`, `max` or `lanes`, so it
/// always divides `lanes`.
#[must_use]
pub fn work_group_size(lanes: u64, preferred: usize, max: usize) -> usize {
    let capped = preferred.min(max).max(1);
    let pow2 = 1usize << (usize::BITS - 1 - capped.leading_zeros());
    usize::try_from(lanes).map_or(pow2, |lanes| pow2.min(lanes.max(1)))
}

//! Portable Compute Device
//!
//! Runs the search kernel on the host CPU. Work groups are spread over a
//! Rayon thread pool (if `multithread` feature enabled, otherwise serial);
//! each group walks its lanes in order.

use crate::engine::device::{status, ComputeContext, DeviceLimits, Grid, KernelArgs, MemAccess};
use crate::kernels::portable::{run_group, LaneInputs, ResultSlot};
use crate::keyspace::Keyspace;
use crate::oracle::BlockCipherOracle;
use crate::types::{Block, SearchError};

// =============================================================================
// CONSTANTS
// =============================================================================

/// Default dispatch limit: 2^32 lanes.
pub const DEFAULT_MAX_LANES: u64 = 1 << 32;

/// Largest accepted work-group size.
pub const MAX_GROUP_SIZE: usize = 1024;

// =============================================================================
// DEVICE OBJECTS
// =============================================================================

/// Host-memory buffer with a device access mode.
#[derive(Debug, Clone)]
pub struct PortableBuffer {
    access: MemAccess,
    bytes: Vec<u8>,
}

/// The native lane kernel. Portable contexts have nothing to compile.
#[derive(Debug, Clone, Copy)]
pub struct PortableProgram;

/// Completion signal. Dispatch is synchronous, so it is signalled on creation.
#[derive(Debug, Clone, Copy)]
pub struct PortableEvent {
    lanes: u64,
}

// =============================================================================
// CONTEXT
// =============================================================================

/// CPU execution context evaluating `oracle` in every lane.
pub struct PortableContext<'a, O> {
    oracle: &'a O,
    name: String,
    max_lanes: u64,
    #[cfg(feature = "multithread")]
    pool: rayon::ThreadPool,
}

impl<'a, O: BlockCipherOracle> PortableContext<'a, O> {
    /// Create a context with `threads` workers (0 = one per CPU) accepting
    /// dispatches of up to `max_lanes` lanes.
    ///
    /// # Errors
    /// Returns a device error if the worker pool cannot be started.
    pub fn new(oracle: &'a O, threads: usize, max_lanes: u64) -> Result<Self, SearchError> {
        #[cfg(feature = "multithread")]
        {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .thread_name(|i| format!("keysweep-lane-{i}"))
                .build()
                .map_err(|_| SearchError::device("ThreadPoolBuilder::build", status::OUT_OF_RESOURCES))?;
            let name = format!("Portable ({})", thread_count_label(pool.current_num_threads()));
            Ok(Self {
                oracle,
                name,
                max_lanes,
                pool,
            })
        }
        #[cfg(not(feature = "multithread"))]
        {
            let _ = threads;
            Ok(Self {
                oracle,
                name: "Portable (serial)".to_owned(),
                max_lanes,
            })
        }
    }

    fn dispatch_groups(
        &self,
        keyspace: Keyspace,
        inputs: &LaneInputs,
        grid: Grid,
        slot: &ResultSlot,
    ) {
        let group = grid.group_size as u64;
        let groups = grid.lanes / group;
        let run = |g: u64| {
            let start = g * group;
            run_group(self.oracle, &keyspace, inputs, start..start + group, slot);
        };

        #[cfg(feature = "multithread")]
        {
            use rayon::prelude::*;
            self.pool.install(|| (0..groups).into_par_iter().for_each(run));
        }
        #[cfg(not(feature = "multithread"))]
        {
            (0..groups).for_each(run);
        }
    }
}

impl<O: BlockCipherOracle> ComputeContext for PortableContext<'_, O> {
    type Buffer = PortableBuffer;
    type Program = PortableProgram;
    type Event = PortableEvent;

    fn name(&self) -> &str {
        &self.name
    }

    fn limits(&self) -> DeviceLimits {
        DeviceLimits {
            max_dispatch_width: self.max_lanes,
            max_group_size: MAX_GROUP_SIZE,
        }
    }

    fn build_program(&self) -> Result<PortableProgram, SearchError> {
        Ok(PortableProgram)
    }

    fn create_buffer(&self, access: MemAccess, len: usize) -> Result<PortableBuffer, SearchError> {
        if len == 0 {
            return Err(SearchError::device("create_buffer", status::INVALID_BUFFER_SIZE));
        }
        let mut bytes = Vec::new();
        bytes.try_reserve_exact(len).map_err(|_| {
            SearchError::device("create_buffer", status::MEM_OBJECT_ALLOCATION_FAILURE)
        })?;
        bytes.resize(len, 0);
        Ok(PortableBuffer { access, bytes })
    }

    fn write_buffer(&self, buffer: &mut PortableBuffer, data: &[u8]) -> Result<(), SearchError> {
        if buffer.bytes.len() != data.len() {
            return Err(SearchError::device("write_buffer", status::INVALID_VALUE));
        }
        buffer.bytes.copy_from_slice(data);
        Ok(())
    }

    fn read_buffer(&self, buffer: &PortableBuffer, out: &mut [u8]) -> Result<(), SearchError> {
        if buffer.bytes.len() != out.len() {
            return Err(SearchError::device("read_buffer", status::INVALID_VALUE));
        }
        out.copy_from_slice(&buffer.bytes);
        Ok(())
    }

    fn enqueue(
        &self,
        _program: &PortableProgram,
        args: KernelArgs<'_, PortableBuffer>,
        grid: Grid,
    ) -> Result<PortableEvent, SearchError> {
        const OP: &str = "enqueue";

        if grid.lanes == 0 || grid.lanes > self.max_lanes {
            return Err(SearchError::device(OP, status::INVALID_GLOBAL_WORK_SIZE));
        }
        if grid.group_size == 0
            || grid.group_size > MAX_GROUP_SIZE
            || !grid.lanes.is_multiple_of(grid.group_size as u64)
        {
            return Err(SearchError::device(OP, status::INVALID_WORK_GROUP_SIZE));
        }
        if args.result.access != MemAccess::ReadWrite {
            return Err(SearchError::device(OP, status::INVALID_MEM_OBJECT));
        }

        let keyspace = Keyspace::new(args.unknown_bits)
            .map_err(|_| SearchError::device(OP, status::INVALID_ARG_VALUE))?;
        let inputs = LaneInputs {
            known_prefix: block_arg(args.key)?,
            plaintext: block_arg(args.plaintext)?,
            target: block_arg(args.target)?,
        };
        let slot = ResultSlot::new(&block_arg(args.result)?);

        self.dispatch_groups(keyspace, &inputs, grid, &slot);

        args.result.bytes.copy_from_slice(&slot.load());
        Ok(PortableEvent { lanes: grid.lanes })
    }

    fn wait(&self, event: PortableEvent) -> Result<(), SearchError> {
        tracing::trace!(lanes = event.lanes, "portable dispatch complete");
        Ok(())
    }
}

/// `"1 thread"`, `"8 threads"`.
pub fn thread_count_label(threads: usize) -> String {
    if threads == 1 {
        "1 thread".to_owned()
    } else {
        format!("{threads} threads")
    }
}

/// Interpret an 8-byte kernel argument.
fn block_arg(buffer: &PortableBuffer) -> Result<Block, SearchError> {
    buffer
        .bytes
        .as_slice()
        .try_into()
        .map_err(|_| SearchError::device("enqueue", status::INVALID_ARG_SIZE))
}

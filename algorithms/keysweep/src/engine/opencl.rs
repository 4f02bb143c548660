//! `OpenCL` Compute Device
//!
//! Compiles the search kernel from `OpenCL` C and runs it on the first GPU
//! (falling back to any `OpenCL` device).
//!
//! ```text
//! ┌──────────────┐     ┌──────────────────┐     ┌─────────────┐
//! │  Host (CPU)  │────▶│  OpenCL Device   │────▶│  Host (CPU) │
//! │ prefix, pt,  │     │ one work-item    │     │ read result │
//! │ target       │     │ per candidate    │     │ slot        │
//! └──────────────┘     └──────────────────┘     └─────────────┘
//! ```

#![allow(unsafe_code)]

use std::ptr;

use opencl3::command_queue::CommandQueue;
use opencl3::context::Context;
use opencl3::device::{get_all_devices, Device, CL_DEVICE_TYPE_ALL, CL_DEVICE_TYPE_GPU};
use opencl3::event::Event;
use opencl3::kernel::{ExecuteKernel, Kernel};
use opencl3::memory::{Buffer, CL_MEM_READ_ONLY, CL_MEM_READ_WRITE};
use opencl3::program::Program;
use opencl3::types::{cl_device_type, cl_uint, CL_BLOCKING};

use crate::engine::device::{status, ComputeContext, DeviceLimits, Grid, KernelArgs, MemAccess};
use crate::kernels::source::KernelSource;
use crate::types::SearchError;

// =============================================================================
// DEVICE DISCOVERY
// =============================================================================

/// Information about a discovered `OpenCL` device.
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    /// Device name (e.g. "NVIDIA GeForce RTX 3080").
    pub name: String,
    /// Device vendor string.
    pub vendor: String,
    /// Whether this is a GPU (vs CPU or accelerator).
    pub is_gpu: bool,
    /// Maximum work-group size.
    pub max_work_group_size: usize,
    /// Width of device addresses in bits.
    pub address_bits: u32,
}

/// Probe all `OpenCL` devices. Empty if no runtime is installed.
pub fn probe_devices() -> Vec<DeviceInfo> {
    let Ok(ids) = get_all_devices(CL_DEVICE_TYPE_ALL) else {
        return Vec::new();
    };

    ids.into_iter()
        .map(|id| {
            let dev = Device::new(id);
            let dev_type: cl_device_type = dev.dev_type().unwrap_or(0);
            DeviceInfo {
                name: dev.name().unwrap_or_default().trim().to_owned(),
                vendor: dev.vendor().unwrap_or_default().trim().to_owned(),
                is_gpu: (dev_type & CL_DEVICE_TYPE_GPU) != 0,
                max_work_group_size: dev.max_work_group_size().unwrap_or(1),
                address_bits: dev.address_bits().unwrap_or(32),
            }
        })
        .collect()
}

/// Number of `OpenCL` devices (0 if `OpenCL` is unavailable).
pub fn device_count() -> usize {
    get_all_devices(CL_DEVICE_TYPE_ALL).map_or(0, |ids| ids.len())
}

// =============================================================================
// DEVICE OBJECTS
// =============================================================================

/// Compiled search program and its kernel.
pub struct OpenClProgram {
    _program: Program,
    kernel: Kernel,
}

// =============================================================================
// CONTEXT
// =============================================================================

/// `OpenCL` context, command queue and kernel source for one search.
pub struct OpenClContext {
    _device: Device,
    context: Context,
    queue: CommandQueue,
    source: KernelSource,
    name: String,
    limits: DeviceLimits,
}

impl OpenClContext {
    /// Open a context on the preferred device.
    ///
    /// # Errors
    /// Returns a device error if no device exists or the context or queue
    /// cannot be created.
    pub fn new(source: KernelSource) -> Result<Self, SearchError> {
        let all_ids = get_all_devices(CL_DEVICE_TYPE_ALL)
            .map_err(|e| SearchError::device("clGetDeviceIDs", e.0))?;
        let gpu_ids = get_all_devices(CL_DEVICE_TYPE_GPU).unwrap_or_default();
        let selected = gpu_ids
            .first()
            .or_else(|| all_ids.first())
            .copied()
            .ok_or(SearchError::device("clGetDeviceIDs", status::DEVICE_NOT_FOUND))?;

        let device = Device::new(selected);
        let name = device.name().unwrap_or_default().trim().to_owned();
        let max_group_size = device
            .max_work_group_size()
            .map_err(|e| SearchError::device("clGetDeviceInfo", e.0))?;
        let address_bits = device.address_bits().unwrap_or(32);
        let max_dispatch_width = if address_bits >= 64 {
            u64::MAX
        } else {
            (1u64 << address_bits) - 1
        };

        let context =
            Context::from_device(&device).map_err(|e| SearchError::device("clCreateContext", e.0))?;

        // OpenCL 1.2 entry point: macOS has no 2.0 queue properties.
        #[allow(deprecated)]
        let queue = CommandQueue::create_default(&context, 0)
            .map_err(|e| SearchError::device("clCreateCommandQueue", e.0))?;

        tracing::debug!(device = %name, max_group_size, address_bits, "opened OpenCL context");

        Ok(Self {
            _device: device,
            context,
            queue,
            source,
            name,
            limits: DeviceLimits {
                max_dispatch_width,
                max_group_size,
            },
        })
    }

    fn wait_event(event: &Event, operation: &'static str) -> Result<(), SearchError> {
        event.wait().map_err(|e| SearchError::device(operation, e.0))
    }
}

impl ComputeContext for OpenClContext {
    type Buffer = Buffer<u8>;
    type Program = OpenClProgram;
    type Event = Event;

    fn name(&self) -> &str {
        &self.name
    }

    fn limits(&self) -> DeviceLimits {
        self.limits
    }

    fn build_program(&self) -> Result<OpenClProgram, SearchError> {
        tracing::debug!(origin = %self.source.origin_label(), entry = %self.source.entry, "building kernel");
        let program = Program::create_and_build_from_source(&self.context, &self.source.text, "")
            .map_err(|log| SearchError::Build { log })?;
        let kernel = Kernel::create(&program, &self.source.entry)
            .map_err(|e| SearchError::device("clCreateKernel", e.0))?;
        Ok(OpenClProgram {
            _program: program,
            kernel,
        })
    }

    fn create_buffer(&self, access: MemAccess, len: usize) -> Result<Buffer<u8>, SearchError> {
        let flags = match access {
            MemAccess::ReadOnly => CL_MEM_READ_ONLY,
            MemAccess::ReadWrite => CL_MEM_READ_WRITE,
        };
        // SAFETY: no host pointer is passed; the runtime owns the storage.
        unsafe { Buffer::<u8>::create(&self.context, flags, len, ptr::null_mut()) }
            .map_err(|e| SearchError::device("clCreateBuffer", e.0))
    }

    fn write_buffer(&self, buffer: &mut Buffer<u8>, data: &[u8]) -> Result<(), SearchError> {
        // SAFETY: blocking write; `data` outlives the call.
        let event = unsafe {
            self.queue
                .enqueue_write_buffer(buffer, CL_BLOCKING, 0, data, &[])
                .map_err(|e| SearchError::device("clEnqueueWriteBuffer", e.0))?
        };
        Self::wait_event(&event, "clEnqueueWriteBuffer")
    }

    fn read_buffer(&self, buffer: &Buffer<u8>, out: &mut [u8]) -> Result<(), SearchError> {
        // SAFETY: blocking read; `out` outlives the call.
        let event = unsafe {
            self.queue
                .enqueue_read_buffer(buffer, CL_BLOCKING, 0, out, &[])
                .map_err(|e| SearchError::device("clEnqueueReadBuffer", e.0))?
        };
        Self::wait_event(&event, "clEnqueueReadBuffer")
    }

    fn enqueue(
        &self,
        program: &OpenClProgram,
        args: KernelArgs<'_, Buffer<u8>>,
        grid: Grid,
    ) -> Result<Event, SearchError> {
        const OP: &str = "clEnqueueNDRangeKernel";

        let global = usize::try_from(grid.lanes)
            .map_err(|_| SearchError::device(OP, status::INVALID_GLOBAL_WORK_SIZE))?;
        let unknown_bits: cl_uint = args.unknown_bits;
        let result: &Buffer<u8> = args.result;

        // SAFETY: argument order and types match `des_brute_kernel`; all
        // buffers stay alive until the event is waited on.
        unsafe {
            ExecuteKernel::new(&program.kernel)
                .set_arg(args.key)
                .set_arg(args.plaintext)
                .set_arg(args.target)
                .set_arg(result)
                .set_arg(&unknown_bits)
                .set_global_work_size(global)
                .set_local_work_size(grid.group_size)
                .enqueue_nd_range(&self.queue)
        }
        .map_err(|e| SearchError::device(OP, e.0))
    }

    fn wait(&self, event: Event) -> Result<(), SearchError> {
        Self::wait_event(&event, "clWaitForEvents")
    }
}

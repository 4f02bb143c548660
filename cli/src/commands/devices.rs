//! Devices Command
//!
//! Lists compute backends and the OpenCL devices they can use.

use keysweep::engine::portable::thread_count_label;
use keysweep::SearchConfig;

/// Print backend availability.
pub fn list_devices(config: &SearchConfig) {
    let threads = std::thread::available_parallelism().map_or(1, usize::from);
    let threads = if config.threads == 0 { threads } else { config.threads };

    println!("Default backend: {}", keysweep::active_backend());
    println!(
        "portable: {}, max {} lanes",
        thread_count_label(threads),
        config.max_portable_lanes
    );
    print_opencl();
}

#[cfg(feature = "opencl")]
fn print_opencl() {
    let devices = keysweep::engine::opencl::probe_devices();
    if devices.is_empty() {
        println!("opencl: no devices");
    }
    for (index, device) in devices.iter().enumerate() {
        println!(
            "opencl[{index}]: {} ({}){} max group {}, {}-bit addresses",
            device.name,
            device.vendor,
            if device.is_gpu { " GPU," } else { "," },
            device.max_work_group_size,
            device.address_bits
        );
    }
}

#[cfg(not(feature = "opencl"))]
fn print_opencl() {
    println!("opencl: not compiled in (build with --features opencl)");
}

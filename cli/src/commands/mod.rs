//! CLI Commands
//!
//! All keysweep CLI commands organized as separate modules.

mod devices;
mod search;
mod selftest;

pub use devices::list_devices;
pub use search::{run_search, SearchArgs};
pub use selftest::{run_selftest, SelfTestArgs};

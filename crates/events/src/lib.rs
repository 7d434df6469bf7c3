//! Diagnostic trace events for the scenario monitor
//!
//! One structured event per state transition, published on a broadcast
//! bus so observers (telemetry sinks, tests) can follow the monitor.

mod bus;
mod types;

pub use bus::EventBus;
pub use types::*;

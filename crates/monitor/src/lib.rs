//! Scenario health monitoring engine.
//!
//! Tracks multi-phase scenarios and reports a single healthy/unhealthy
//! verdict exactly once per scenario instance, governed by the set of
//! required phases and a timeout. Application code drives the engine
//! through [`ScenarioMonitor`] (or the thin [`MonitorProvider`]
//! facade); verdicts leave through a [`reporter::HealthReporter`] and
//! every transition is published on the [`events::EventBus`].

pub mod error;
pub mod monitor;
pub mod provider;
pub mod timing;

pub use error::{MonitorError, Result};
pub use monitor::ScenarioMonitor;
pub use provider::MonitorProvider;
pub use timing::{PerformanceTimeline, TimingProvider};

//! Thin adapter between application call sites and the monitor.
//!
//! Application code (views, data clients) holds a [`MonitorProvider`]
//! and reports progress through it; the provider forwards to one
//! shared [`ScenarioMonitor`] and exposes nothing else.

use scenario_core::{Phase, Scenario};

use crate::error::Result;
use crate::monitor::ScenarioMonitor;

#[derive(Clone)]
pub struct MonitorProvider {
    monitor: ScenarioMonitor,
}

impl MonitorProvider {
    pub fn new(monitor: ScenarioMonitor) -> Self {
        Self { monitor }
    }

    pub fn start_scenario(&self, scenario: Scenario) -> Result<()> {
        self.monitor.start(scenario)
    }

    pub fn start_phase(&self, scenario: Scenario, phase: Phase) {
        self.monitor.start_phase(scenario, phase)
    }

    pub fn complete_phase(&self, scenario: Scenario, phase: Phase) {
        self.monitor.complete_phase(scenario, phase)
    }

    pub fn mark_expected_failure(&self) {
        self.monitor.mark_expected_failure()
    }
}

//! Trace event types emitted by the scenario monitor

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use scenario_core::{Phase, Scenario, WebVitals};

/// Envelope wrapping every trace event with identity and timing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Unique event ID
    pub id: Uuid,
    /// When the event occurred
    pub timestamp: DateTime<Utc>,
    /// The actual event
    pub event: MonitorEvent,
}

impl EventEnvelope {
    /// Create a new envelope with auto-generated ID and timestamp
    pub fn new(event: MonitorEvent) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            event,
        }
    }
}

/// One event per scenario state transition
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum MonitorEvent {
    /// A scenario context was opened and its timeout armed
    ScenarioStart {
        scenario: Scenario,
        required_phases: Vec<Phase>,
        timeout_ms: u64,
    },

    /// A phase start mark was explicitly re-captured
    PhaseStart { scenario: Scenario, phase: Phase },

    /// A required phase completed
    PhaseComplete {
        scenario: Scenario,
        phase: Phase,
        #[serde(skip_serializing_if = "Option::is_none")]
        duration_ms: Option<f64>,
        completed_count: usize,
        required_count: usize,
    },

    /// A phase failed; the remaining incomplete phases fail with it
    PhaseFail {
        scenario: Scenario,
        phase: Phase,
        failed_phases: Vec<Phase>,
        completed_phases: Vec<Phase>,
    },

    /// The scenario deadline elapsed before all phases completed
    ScenarioTimeout {
        scenario: Scenario,
        missing_phases: Vec<Phase>,
        completed_phases: Vec<Phase>,
        expected_failure: bool,
    },

    /// An expected failure was flagged for an active scenario
    ExpectedFailureMarked { scenario: Scenario },

    /// The verdict was decided and handed to the reporter
    ScenarioEnd {
        scenario: Scenario,
        healthy: bool,
        timed_out: bool,
        duration_ms: f64,
        completed_phases: Vec<Phase>,
        #[serde(skip_serializing_if = "Option::is_none")]
        failed_phases: Option<Vec<Phase>>,
        vitals: WebVitals,
    },
}

impl MonitorEvent {
    /// Get the scenario this event belongs to
    pub fn scenario(&self) -> Scenario {
        match self {
            Self::ScenarioStart { scenario, .. } => *scenario,
            Self::PhaseStart { scenario, .. } => *scenario,
            Self::PhaseComplete { scenario, .. } => *scenario,
            Self::PhaseFail { scenario, .. } => *scenario,
            Self::ScenarioTimeout { scenario, .. } => *scenario,
            Self::ExpectedFailureMarked { scenario } => *scenario,
            Self::ScenarioEnd { scenario, .. } => *scenario,
        }
    }

    /// Get the phase this event refers to, if any
    pub fn phase(&self) -> Option<Phase> {
        match self {
            Self::PhaseStart { phase, .. } => Some(*phase),
            Self::PhaseComplete { phase, .. } => Some(*phase),
            Self::PhaseFail { phase, .. } => Some(*phase),
            _ => None,
        }
    }
}

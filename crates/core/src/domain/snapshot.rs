use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::scenario::{Phase, Scenario};

/// Timing for one completed phase. Phases missing either mark are
/// omitted from the snapshot rather than reported with partial data.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PhaseTiming {
    pub end_time: DateTime<Utc>,
    pub duration_ms: f64,
}

/// Web-vital kinds fed by the asynchronous vitals source.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VitalKind {
    Lcp,
    Inp,
    Cls,
    Fcp,
    Ttfb,
}

/// Whatever web-vital values are known at emission time. All fields
/// are optional; the monitor snapshots them as-is, never waits.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WebVitals {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lcp: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inp: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cls: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fcp: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttfb: Option<f64>,
}

impl WebVitals {
    pub fn set(&mut self, kind: VitalKind, value: f64) {
        match kind {
            VitalKind::Lcp => self.lcp = Some(value),
            VitalKind::Inp => self.inp = Some(value),
            VitalKind::Cls => self.cls = Some(value),
            VitalKind::Fcp => self.fcp = Some(value),
            VitalKind::Ttfb => self.ttfb = Some(value),
        }
    }
}

/// Immutable view of a scenario at the moment its verdict was decided.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioSnapshot {
    pub scenario: Scenario,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_ms: f64,
    pub completed: Vec<Phase>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed: Option<Vec<Phase>>,
    pub timed_out: bool,
    pub vitals: WebVitals,
    pub phase_timings: HashMap<Phase, PhaseTiming>,
}

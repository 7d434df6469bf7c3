use scenario_core::Scenario;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MonitorError {
    /// Starting a scenario with no registry entry can only be a
    /// coding or configuration mistake, never a runtime condition.
    #[error("No scenario definition registered for {scenario}")]
    UnregisteredScenario { scenario: Scenario },
}

pub type Result<T> = std::result::Result<T, MonitorError>;

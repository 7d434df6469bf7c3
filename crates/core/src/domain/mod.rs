mod definition;
mod scenario;
mod snapshot;

pub use definition::{ScenarioDefinition, ScenarioRegistry, DEFAULT_TIMEOUT_MS};
pub use scenario::{Phase, Platform, Scenario};
pub use snapshot::{PhaseTiming, ScenarioSnapshot, VitalKind, WebVitals};

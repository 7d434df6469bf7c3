use std::collections::HashMap;

use super::scenario::{Phase, Scenario};
use super::snapshot::ScenarioSnapshot;

/// Default verdict deadline for the built-in scenarios.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Immutable description of a scenario: which phases must complete,
/// how long the monitor waits, and an optional extra verdict predicate
/// applied to the final snapshot (defaults to healthy).
#[derive(Debug, Clone)]
pub struct ScenarioDefinition {
    pub scenario: Scenario,
    pub required_phases: Vec<Phase>,
    pub timeout_ms: u64,
    pub validate: Option<fn(&ScenarioSnapshot) -> bool>,
}

impl ScenarioDefinition {
    pub fn new(scenario: Scenario, required_phases: Vec<Phase>, timeout_ms: u64) -> Self {
        Self {
            scenario,
            required_phases,
            timeout_ms,
            validate: None,
        }
    }

    pub fn with_validator(mut self, validate: fn(&ScenarioSnapshot) -> bool) -> Self {
        self.validate = Some(validate);
        self
    }
}

/// Static mapping from scenario to definition. Pure lookup; loaded
/// once at startup. Starting an unregistered scenario is a
/// configuration error, never a runtime condition.
#[derive(Debug, Clone, Default)]
pub struct ScenarioRegistry {
    definitions: HashMap<Scenario, ScenarioDefinition>,
}

impl ScenarioRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in scenario definitions.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(ScenarioDefinition::new(
            Scenario::ApplicationLoad,
            vec![Phase::ExplorerInitialized, Phase::Interactive],
            DEFAULT_TIMEOUT_MS,
        ));
        registry.register(ScenarioDefinition::new(
            Scenario::DatabaseLoad,
            vec![Phase::DatabasesLoaded, Phase::Interactive],
            DEFAULT_TIMEOUT_MS,
        ));
        registry
    }

    pub fn register(&mut self, definition: ScenarioDefinition) {
        self.definitions.insert(definition.scenario, definition);
    }

    pub fn get(&self, scenario: Scenario) -> Option<&ScenarioDefinition> {
        self.definitions.get(&scenario)
    }

    pub fn contains(&self, scenario: Scenario) -> bool {
        self.definitions.contains_key(&scenario)
    }
}

use serde::{Deserialize, Serialize};

/// A logical unit of work whose overall health is reported exactly once.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Scenario {
    ApplicationLoad,
    DatabaseLoad,
}

impl Scenario {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ApplicationLoad => "ApplicationLoad",
            Self::DatabaseLoad => "DatabaseLoad",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ApplicationLoad" => Some(Self::ApplicationLoad),
            "DatabaseLoad" => Some(Self::DatabaseLoad),
            _ => None,
        }
    }
}

impl std::fmt::Display for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named sub-step of a scenario that must complete for the scenario
/// to be considered healthy.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Phase {
    ExplorerInitialized,
    DatabasesLoaded,
    Interactive,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ExplorerInitialized => "ExplorerInitialized",
            Self::DatabasesLoaded => "DatabasesLoaded",
            Self::Interactive => "Interactive",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ExplorerInitialized" => Some(Self::ExplorerInitialized),
            "DatabasesLoaded" => Some(Self::DatabasesLoaded),
            "Interactive" => Some(Self::Interactive),
            _ => None,
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hosting platform identifier attached to every health report.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum Platform {
    #[default]
    Portal,
    Hosted,
    Emulator,
    Fabric,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Portal => "Portal",
            Self::Hosted => "Hosted",
            Self::Emulator => "Emulator",
            Self::Fabric => "Fabric",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenario_round_trip() {
        assert_eq!(Scenario::ApplicationLoad.as_str(), "ApplicationLoad");
        assert_eq!(
            Scenario::parse("DatabaseLoad"),
            Some(Scenario::DatabaseLoad)
        );
        assert_eq!(Scenario::parse("Unknown"), None);
    }

    #[test]
    fn test_phase_round_trip() {
        assert_eq!(Phase::Interactive.as_str(), "Interactive");
        assert_eq!(
            Phase::parse("ExplorerInitialized"),
            Some(Phase::ExplorerInitialized)
        );
        assert_eq!(Phase::parse(""), None);
    }

    #[test]
    fn test_scenario_serialization() {
        let json = serde_json::to_string(&Scenario::ApplicationLoad).unwrap();
        assert_eq!(json, r#""ApplicationLoad""#);
    }
}

//! Health verdict delivery
//!
//! The monitor hands each scenario verdict to a [`HealthReporter`]
//! exactly once, fire-and-forget: the outcome of the transport call
//! never feeds back into scenario bookkeeping.

mod error;
mod http;

pub use error::{ReporterError, Result};
pub use http::HttpHealthReporter;

use async_trait::async_trait;

use scenario_core::{Platform, Scenario};

/// Identifiers attached to every health report.
#[derive(Debug, Clone)]
pub struct ReportContext {
    /// Hosting platform the client runs under
    pub platform: Platform,
    /// API/category identifier (e.g. "SQL")
    pub api: String,
}

impl ReportContext {
    pub fn new(platform: Platform, api: impl Into<String>) -> Self {
        Self {
            platform,
            api: api.into(),
        }
    }
}

impl Default for ReportContext {
    fn default() -> Self {
        Self::new(Platform::default(), "SQL")
    }
}

/// Delivers the final healthy/unhealthy verdict for a scenario.
#[async_trait]
pub trait HealthReporter: Send + Sync {
    async fn report(
        &self,
        scenario: Scenario,
        context: &ReportContext,
        healthy: bool,
    ) -> Result<()>;
}

/// Reporter that discards every verdict. For embedders that disable
/// reporting and for tests that only observe the event stream.
#[derive(Debug, Clone, Default)]
pub struct NoopReporter;

#[async_trait]
impl HealthReporter for NoopReporter {
    async fn report(
        &self,
        _scenario: Scenario,
        _context: &ReportContext,
        _healthy: bool,
    ) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_noop_reporter() {
        let reporter = NoopReporter;
        let context = ReportContext::default();
        assert!(reporter
            .report(Scenario::ApplicationLoad, &context, true)
            .await
            .is_ok());
    }

    #[test]
    fn test_default_context() {
        let context = ReportContext::default();
        assert_eq!(context.platform, Platform::Portal);
        assert_eq!(context.api, "SQL");
    }
}

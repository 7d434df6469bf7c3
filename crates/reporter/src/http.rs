//! HTTP reporter posting verdicts to the health metrics endpoint

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use scenario_core::Scenario;

use crate::error::{ReporterError, Result};
use crate::{HealthReporter, ReportContext};

const REPORT_TIMEOUT_MS: u64 = 5_000;
const HEALTH_PATH: &str = "/api/metrics/health";

#[derive(Debug, Serialize)]
struct HealthReport<'a> {
    scenario: Scenario,
    platform: &'a str,
    api: &'a str,
    healthy: bool,
}

/// Posts each verdict as JSON to `{endpoint}/api/metrics/health`.
///
/// The request carries its own bounded timeout; callers treat the
/// whole call as fire-and-forget.
#[derive(Debug, Clone)]
pub struct HttpHealthReporter {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpHealthReporter {
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(REPORT_TIMEOUT_MS))
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl HealthReporter for HttpHealthReporter {
    async fn report(
        &self,
        scenario: Scenario,
        context: &ReportContext,
        healthy: bool,
    ) -> Result<()> {
        let url = format!("{}{}", self.endpoint, HEALTH_PATH);
        let body = HealthReport {
            scenario,
            platform: context.platform.as_str(),
            api: context.api.as_str(),
            healthy,
        };

        tracing::debug!(
            scenario = %scenario,
            healthy,
            "Posting health report to {url}"
        );

        let response = self.client.post(&url).json(&body).send().await?;
        if !response.status().is_success() {
            return Err(ReporterError::Rejected {
                status: response.status().as_u16(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_posts_healthy_report() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/metrics/health"))
            .and(body_json(serde_json::json!({
                "scenario": "ApplicationLoad",
                "platform": "Portal",
                "api": "SQL",
                "healthy": true,
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let reporter = HttpHealthReporter::new(server.uri()).unwrap();
        let context = ReportContext::default();

        reporter
            .report(Scenario::ApplicationLoad, &context, true)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_posts_unhealthy_report() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/metrics/health"))
            .and(body_json(serde_json::json!({
                "scenario": "DatabaseLoad",
                "platform": "Fabric",
                "api": "Mongo",
                "healthy": false,
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let reporter = HttpHealthReporter::new(server.uri()).unwrap();
        let context = ReportContext::new(scenario_core::Platform::Fabric, "Mongo");

        reporter
            .report(Scenario::DatabaseLoad, &context, false)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_rejected_report_is_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/metrics/health"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let reporter = HttpHealthReporter::new(server.uri()).unwrap();
        let context = ReportContext::default();

        let err = reporter
            .report(Scenario::ApplicationLoad, &context, true)
            .await
            .unwrap_err();
        assert!(matches!(err, ReporterError::Rejected { status: 500 }));
    }
}

use crate::adapters::http::UpstreamClient;
use crate::domain::model::DemographicsResult;
use crate::domain::ports::DemographicsProvider;
use crate::utils::error::{EnhancerError, Result};
use async_trait::async_trait;
use serde_json::Value;

/// Audience split lookups against the demographics service.
pub struct DemographicsClient {
    upstream: UpstreamClient,
}

impl DemographicsClient {
    pub fn new(endpoint: impl Into<String>, timeout_ms: Option<u64>) -> Self {
        Self {
            upstream: UpstreamClient::new(endpoint, timeout_ms),
        }
    }
}

#[async_trait]
impl DemographicsProvider for DemographicsClient {
    async fn fetch_demographics(&self, site_id: &str) -> Result<DemographicsResult> {
        if site_id.is_empty() {
            return Err(EnhancerError::invalid_input("siteId cannot be empty"));
        }

        let path = format!("/api/sites/{}/demographics", site_id);
        tracing::debug!("Fetching demographics for site {}", site_id);
        let body = self.upstream.send_json(self.upstream.get(&path)).await?;

        parse_demographics(&body)
    }
}

fn parse_demographics(body: &Value) -> Result<DemographicsResult> {
    let demographics = body
        .get("demographics")
        .filter(|section| section.is_object())
        .ok_or_else(|| EnhancerError::malformed("Response does not have demographics data"))?;

    let pct_female = demographics
        .get("pct_female")
        .and_then(Value::as_f64)
        .ok_or_else(|| {
            EnhancerError::malformed("Demographics does not have the expected property pct_female")
        })?;

    Ok(DemographicsResult::from_female_percent(pct_female))
}

use crate::adapters::maxmind::MaxMindCountryClient;
use crate::core::demographics::DemographicsClient;
use crate::core::geo::UsOnlyGeoLocator;
use crate::core::publisher::PublisherClient;
use crate::core::{
    ConfigProvider, DemographicsProvider, Enhancement, Enhancer, EnrichmentRequest, GeoLocator,
    PublisherResolver,
};
use crate::utils::error::{EnhancerError, Result};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Settled outcome of every enhancer that was dispatched for one request.
pub type Outcomes = BTreeMap<Enhancer, Result<Enhancement>>;

/// Fans a request out to the enhancers and merges what came back.
#[derive(Clone)]
pub struct EnrichmentOrchestrator {
    demographics: Arc<dyn DemographicsProvider>,
    publisher: Arc<dyn PublisherResolver>,
    geo: Arc<dyn GeoLocator>,
}

impl EnrichmentOrchestrator {
    pub fn new(
        demographics: Arc<dyn DemographicsProvider>,
        publisher: Arc<dyn PublisherResolver>,
        geo: Arc<dyn GeoLocator>,
    ) -> Self {
        Self {
            demographics,
            publisher,
            geo,
        }
    }

    /// Wires the HTTP-backed enhancers described by `config`.
    pub fn from_config<C: ConfigProvider>(config: &C) -> Self {
        let (account_id, license_key) = config.geo_credentials();
        let country_lookup = MaxMindCountryClient::new(
            config.geo_endpoint(),
            account_id,
            license_key,
            config.timeout_ms(Enhancer::Geo),
        );

        Self::new(
            Arc::new(DemographicsClient::new(
                config.demographics_endpoint(),
                config.timeout_ms(Enhancer::Demographics),
            )),
            Arc::new(PublisherClient::new(
                config.publisher_endpoint(),
                config.timeout_ms(Enhancer::Publisher),
            )),
            Arc::new(UsOnlyGeoLocator::new(country_lookup)),
        )
    }

    /// Enriches a raw JSON request body.
    pub async fn enrich_value(&self, input: Value) -> Result<Value> {
        if input.is_null() {
            return Err(EnhancerError::invalid_request(
                "Input is empty, enhancement is not possible",
            ));
        }

        let request: EnrichmentRequest = serde_json::from_value(input)
            .map_err(|e| EnhancerError::invalid_request(format!("Input is invalid: {}", e)))?;
        let enriched = self.enrich(request).await?;

        Ok(serde_json::to_value(enriched)?)
    }

    pub async fn enrich(&self, request: EnrichmentRequest) -> Result<EnrichmentRequest> {
        let site_id = request
            .site_id()
            .ok_or_else(|| {
                EnhancerError::invalid_request("Input is invalid, does not have site id")
            })?
            .to_string();
        let ip = request.device_ip().cloned();

        tracing::info!(
            "Enriching request for site {} (geo lookup: {})",
            site_id,
            ip.is_some()
        );

        let outcomes = self.dispatch(site_id, ip).await;
        let enhancements = settle(outcomes)?;

        Ok(merge(request, enhancements))
    }

    /// Starts every applicable enhancer at once and waits for all of them.
    async fn dispatch(&self, site_id: String, ip: Option<Value>) -> Outcomes {
        let mut tasks: BTreeMap<Enhancer, JoinHandle<Result<Enhancement>>> = BTreeMap::new();

        let demographics = Arc::clone(&self.demographics);
        let id = site_id.clone();
        tasks.insert(
            Enhancer::Demographics,
            tokio::spawn(async move {
                demographics
                    .fetch_demographics(&id)
                    .await
                    .map(Enhancement::Demographics)
            }),
        );

        let publisher = Arc::clone(&self.publisher);
        tasks.insert(
            Enhancer::Publisher,
            tokio::spawn(async move {
                publisher
                    .resolve_publisher(&site_id)
                    .await
                    .map(Enhancement::Publisher)
            }),
        );

        if let Some(ip) = ip {
            let geo = Arc::clone(&self.geo);
            tasks.insert(
                Enhancer::Geo,
                tokio::spawn(async move {
                    match ip.as_str() {
                        Some(ip) => geo.resolve_geo(ip).await.map(Enhancement::Geo),
                        None => Err(EnhancerError::invalid_input("invalid input")),
                    }
                }),
            );
        }

        let mut outcomes = Outcomes::new();
        for (enhancer, task) in tasks {
            let outcome = task.await.unwrap_or_else(|e| {
                Err(EnhancerError::TaskFailed {
                    message: e.to_string(),
                })
            });
            outcomes.insert(enhancer, outcome);
        }
        outcomes
    }
}

/// Whether a failure of `enhancer` aborts the whole enrichment.
pub fn is_fatal(enhancer: Enhancer, err: &EnhancerError) -> bool {
    match enhancer {
        Enhancer::Demographics => false,
        Enhancer::Publisher => true,
        Enhancer::Geo => matches!(err, EnhancerError::InvalidCountry { .. }),
    }
}

/// Splits settled outcomes into enhancements to merge, or the first fatal
/// failure in enhancer order.
pub fn settle(outcomes: Outcomes) -> Result<Vec<Enhancement>> {
    let mut enhancements = Vec::with_capacity(outcomes.len());
    let mut fatal = None;

    for (enhancer, outcome) in outcomes {
        match outcome {
            Ok(enhancement) => enhancements.push(enhancement),
            Err(err) if is_fatal(enhancer, &err) => {
                tracing::error!("Error in {}: {}", enhancer, err);
                fatal.get_or_insert(err);
            }
            Err(err) => tracing::warn!("Error in {}: {}", enhancer, err),
        }
    }

    match fatal {
        Some(err) => Err(err),
        None => Ok(enhancements),
    }
}

/// Writes each enhancement into its section. A section only exists as an
/// object here because its enhancer was dispatched from it.
fn merge(mut request: EnrichmentRequest, enhancements: Vec<Enhancement>) -> EnrichmentRequest {
    for enhancement in enhancements {
        match enhancement {
            Enhancement::Demographics(demographics) => {
                if let Some(site) = request.site_mut() {
                    site.set_demographics(demographics);
                }
            }
            Enhancement::Publisher(publisher) => {
                if let Some(site) = request.site_mut() {
                    site.set_publisher(publisher);
                }
            }
            Enhancement::Geo(geo) => {
                if let Some(device) = request.device_mut() {
                    device.set_geo(geo);
                }
            }
        }
    }
    request
}

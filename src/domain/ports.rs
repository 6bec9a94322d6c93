use crate::domain::model::{DemographicsResult, Enhancer, GeoResult, PublisherResult};
use crate::utils::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait DemographicsProvider: Send + Sync {
    async fn fetch_demographics(&self, site_id: &str) -> Result<DemographicsResult>;
}

#[async_trait]
pub trait PublisherResolver: Send + Sync {
    async fn resolve_publisher(&self, site_id: &str) -> Result<PublisherResult>;
}

#[async_trait]
pub trait GeoLocator: Send + Sync {
    async fn resolve_geo(&self, ip: &str) -> Result<GeoResult>;
}

/// Raw IP to country-name lookup against a geolocation service.
#[async_trait]
pub trait CountryLookup: Send + Sync {
    async fn country(&self, ip: &str) -> Result<String>;
}

/// Where and how to reach each upstream provider.
pub trait ConfigProvider: Send + Sync {
    fn demographics_endpoint(&self) -> &str;
    fn publisher_endpoint(&self) -> &str;
    fn geo_endpoint(&self) -> &str;
    fn geo_credentials(&self) -> (&str, &str);
    fn timeout_ms(&self, enhancer: Enhancer) -> Option<u64>;
}

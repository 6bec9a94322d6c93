use crate::adapters::http::UpstreamClient;
use crate::domain::ports::CountryLookup;
use crate::utils::error::{EnhancerError, Result};
use async_trait::async_trait;

pub const DEFAULT_GEO_ENDPOINT: &str = "https://geoip.maxmind.com";
pub const DEFAULT_GEO_TIMEOUT_MS: u64 = 2000;

/// Country lookups against the MaxMind GeoIP2 Country web service.
pub struct MaxMindCountryClient {
    upstream: UpstreamClient,
    account_id: String,
    license_key: String,
}

impl MaxMindCountryClient {
    pub fn new(
        endpoint: impl Into<String>,
        account_id: impl Into<String>,
        license_key: impl Into<String>,
        timeout_ms: Option<u64>,
    ) -> Self {
        Self {
            upstream: UpstreamClient::new(endpoint, timeout_ms),
            account_id: account_id.into(),
            license_key: license_key.into(),
        }
    }
}

#[async_trait]
impl CountryLookup for MaxMindCountryClient {
    async fn country(&self, ip: &str) -> Result<String> {
        let request = self
            .upstream
            .get(&format!("/geoip/v2.1/country/{}", ip))
            .basic_auth(&self.account_id, Some(&self.license_key));
        let body = self.upstream.send_json(request).await?;

        body.pointer("/country/names/en")
            .and_then(|name| name.as_str())
            .map(str::to_string)
            .ok_or_else(|| EnhancerError::malformed("Response does not have a country name"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_country_reads_english_name() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/geoip/v2.1/country/69.250.196.118")
                .header_exists("Authorization");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(json!({
                    "country": { "iso_code": "US", "names": { "en": "United States", "de": "USA" } }
                }));
        });

        let client = MaxMindCountryClient::new(server.base_url(), "135482", "secret", None);
        let country = client.country("69.250.196.118").await.unwrap();

        mock.assert();
        assert_eq!(country, "United States");
    }

    #[tokio::test]
    async fn test_provider_error_message_is_kept() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/geoip/v2.1/country/10.10.10.10");
            then.status(404)
                .header("Content-Type", "application/json")
                .json_body(json!({
                    "code": "IP_ADDRESS_RESERVED",
                    "error": "The value 10.10.10.10 belongs to a reserved range."
                }));
        });

        let client = MaxMindCountryClient::new(server.base_url(), "135482", "secret", None);
        let err = client.country("10.10.10.10").await.unwrap_err();

        assert_eq!(
            err.to_string(),
            "The value 10.10.10.10 belongs to a reserved range."
        );
    }

    #[tokio::test]
    async fn test_missing_country_name_is_malformed() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/geoip/v2.1/country/1.1.1.1");
            then.status(200).json_body(json!({ "continent": { "code": "OC" } }));
        });

        let client = MaxMindCountryClient::new(server.base_url(), "135482", "secret", None);
        let err = client.country("1.1.1.1").await.unwrap_err();

        assert!(matches!(err, EnhancerError::MalformedResponse { .. }));
    }
}

use crate::adapters::http::UpstreamClient;
use crate::domain::model::PublisherResult;
use crate::domain::ports::PublisherResolver;
use crate::utils::error::{EnhancerError, Result};
use async_trait::async_trait;
use serde_json::{json, Value};

/// Publisher identity lookups against the publisher query service.
pub struct PublisherClient {
    upstream: UpstreamClient,
}

impl PublisherClient {
    pub fn new(endpoint: impl Into<String>, timeout_ms: Option<u64>) -> Self {
        Self {
            upstream: UpstreamClient::new(endpoint, timeout_ms),
        }
    }

    async fn find(&self, site_id: &str) -> Result<PublisherResult> {
        let request = self
            .upstream
            .post("/api/publishers/find")
            .json(&json!({ "q": { "siteID": site_id } }));
        let body = self.upstream.send_json(request).await?;

        parse_publisher(body)
    }
}

#[async_trait]
impl PublisherResolver for PublisherClient {
    async fn resolve_publisher(&self, site_id: &str) -> Result<PublisherResult> {
        tracing::debug!("Resolving publisher for site {}", site_id);
        self.find(site_id).await.inspect_err(|e| {
            tracing::error!("Error in PUBLISHER: {}", e);
        })
    }
}

fn parse_publisher(mut body: Value) -> Result<PublisherResult> {
    let publisher = match body.get_mut("publisher").map(Value::take) {
        Some(Value::Object(publisher)) => publisher,
        _ => return Err(EnhancerError::MissingPublisherId),
    };

    match publisher.get("id") {
        None | Some(Value::Null) => return Err(EnhancerError::MissingPublisherId),
        Some(Value::String(id)) if id.is_empty() => return Err(EnhancerError::MissingPublisherId),
        Some(Value::String(_)) => {}
        Some(other) => {
            return Err(EnhancerError::malformed(format!(
                "Publisher id is not a string: {}",
                other
            )))
        }
    }

    serde_json::from_value(Value::Object(publisher))
        .map_err(|e| EnhancerError::malformed(format!("Publisher data is invalid: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn test_resolve_publisher_success() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/api/publishers/find")
                .json_body(json!({ "q": { "siteID": "random_site_id" } }));
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(json!({ "publisher": { "id": "ksjdf9325", "name": "ACME Inc." } }));
        });

        let client = PublisherClient::new(server.base_url(), None);
        let result = client.resolve_publisher("random_site_id").await.unwrap();

        mock.assert();
        assert_eq!(result.id, "ksjdf9325");
        assert_eq!(result.name.as_deref(), Some("ACME Inc."));
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({ "id": "ksjdf9325", "name": "ACME Inc." })
        );
    }

    #[tokio::test]
    async fn test_publisher_without_id_is_rejected() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/publishers/find");
            then.status(200)
                .json_body(json!({ "publisher": { "name": "ACME Inc.", "domain": "acme.com" } }));
        });

        let client = PublisherClient::new(server.base_url(), None);
        let err = client.resolve_publisher("random_site_id").await.unwrap_err();

        assert!(matches!(err, EnhancerError::MissingPublisherId));
        assert_eq!(err.to_string(), "Publisher id not available");
    }

    #[tokio::test]
    async fn test_upstream_failure_keeps_status() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/publishers/find");
            then.status(404)
                .json_body(json!({ "error": { "message": "Publisher not found" } }));
        });

        let client = PublisherClient::new(server.base_url(), None);
        let err = client.resolve_publisher("unknown").await.unwrap_err();

        assert_eq!(err.status(), 404);
        assert_eq!(err.to_string(), "Publisher not found");
    }

    #[test]
    fn test_parse_publisher_passes_extra_fields_through() {
        let result = parse_publisher(json!({
            "publisher": { "id": "ksjdf9325", "tier": 2 }
        }))
        .unwrap();

        assert_eq!(result.name, None);
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({ "id": "ksjdf9325", "tier": 2 })
        );
    }

    #[test]
    fn test_parse_publisher_rejects_empty_or_null_id() {
        for body in [
            json!({ "publisher": { "id": "", "name": "ACME Inc." } }),
            json!({ "publisher": { "id": null } }),
            json!({ "publisher": {} }),
        ] {
            assert!(matches!(
                parse_publisher(body),
                Err(EnhancerError::MissingPublisherId)
            ));
        }
    }

    #[test]
    fn test_parse_publisher_without_section() {
        for body in [
            json!({ "results": [] }),
            json!({}),
            json!({ "publisher": null }),
            json!({ "publisher": "ACME Inc." }),
        ] {
            let err = parse_publisher(body).unwrap_err();
            assert!(matches!(err, EnhancerError::MissingPublisherId));
            assert_eq!(err.status(), 400);
        }
    }
}

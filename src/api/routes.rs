//! HTTP binding for the enrichment orchestrator.
//!
//! - `POST /` enriches the JSON body and answers with the enriched request
//! - `GET /health` liveness probe
//!
//! Failures are answered with the error's status and its message as plain text.

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde_json::Value;

use crate::core::orchestrator::EnrichmentOrchestrator;
use crate::utils::error::EnhancerError;

pub fn build_router(orchestrator: EnrichmentOrchestrator) -> Router {
    Router::new()
        .route("/", post(enrich))
        .route("/health", get(health))
        .with_state(orchestrator)
}

async fn health() -> &'static str {
    "ok"
}

async fn enrich(State(orchestrator): State<EnrichmentOrchestrator>, body: Bytes) -> Response {
    let input = if body.iter().all(u8::is_ascii_whitespace) {
        Value::Null
    } else {
        match serde_json::from_slice::<Value>(&body) {
            Ok(input) => input,
            Err(e) => {
                return error_response(EnhancerError::invalid_request(format!(
                    "Input is invalid: {}",
                    e
                )))
            }
        }
    };

    match orchestrator.enrich_value(input).await {
        Ok(output) => (StatusCode::OK, Json(output)).into_response(),
        Err(e) => error_response(e),
    }
}

fn error_response(err: EnhancerError) -> Response {
    let status =
        StatusCode::from_u16(err.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
        tracing::error!("Enrichment failed with {}: {}", status, err);
    } else {
        tracing::warn!("Enrichment rejected with {}: {}", status, err);
    }
    (status, err.to_string()).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{
        DemographicsProvider, DemographicsResult, GeoLocator, GeoResult, PublisherResolver,
        PublisherResult,
    };
    use crate::utils::error::Result;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use serde_json::json;
    use std::sync::Arc;
    use tower::ServiceExt;

    struct Demographics;
    struct Publisher;
    struct Geo;

    #[async_trait]
    impl DemographicsProvider for Demographics {
        async fn fetch_demographics(&self, _site_id: &str) -> Result<DemographicsResult> {
            Ok(DemographicsResult::from_female_percent(41.0))
        }
    }

    #[async_trait]
    impl PublisherResolver for Publisher {
        async fn resolve_publisher(&self, site_id: &str) -> Result<PublisherResult> {
            if site_id == "unknown" {
                return Err(EnhancerError::Upstream {
                    status: 404,
                    message: "Publisher not found".to_string(),
                });
            }
            Ok(serde_json::from_value(json!({ "id": "ksjdf9325" })).unwrap())
        }
    }

    #[async_trait]
    impl GeoLocator for Geo {
        async fn resolve_geo(&self, ip: &str) -> Result<GeoResult> {
            if ip.starts_with("81.") {
                return Err(EnhancerError::InvalidCountry {
                    country: "United Kingdom".to_string(),
                });
            }
            Ok(GeoResult {
                country: "United States".to_string(),
            })
        }
    }

    fn app() -> Router {
        build_router(EnrichmentOrchestrator::new(
            Arc::new(Demographics),
            Arc::new(Publisher),
            Arc::new(Geo),
        ))
    }

    async fn post_body(body: &str) -> (StatusCode, Vec<u8>) {
        let resp = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        (status, bytes.to_vec())
    }

    #[tokio::test]
    async fn test_health() {
        let resp = app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_post_enriches_request() {
        let (status, body) = post_body(
            r#"{"site":{"id":"foo123"},"device":{"ip":"69.250.196.118"},"user":{"id":"9cb89r"}}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let output: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            output,
            json!({
                "site": {
                    "id": "foo123",
                    "demographics": { "female_percent": 41.0, "male_percent": 59.0 },
                    "publisher": { "id": "ksjdf9325" }
                },
                "device": { "ip": "69.250.196.118", "geo": { "country": "United States" } },
                "user": { "id": "9cb89r" }
            })
        );
    }

    #[tokio::test]
    async fn test_missing_site_id_is_400() {
        let (status, body) = post_body(r#"{"site":{}}"#).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, b"Input is invalid, does not have site id");
    }

    #[tokio::test]
    async fn test_empty_body_is_400() {
        let (status, body) = post_body("").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, b"Input is empty, enhancement is not possible");
    }

    #[tokio::test]
    async fn test_upstream_status_is_forwarded() {
        let (status, body) = post_body(r#"{"site":{"id":"unknown"}}"#).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, b"Publisher not found");
    }

    #[tokio::test]
    async fn test_invalid_country_is_400() {
        let (status, body) =
            post_body(r#"{"site":{"id":"foo123"},"device":{"ip":"81.2.69.160"}}"#).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, b"ip is not from united states");
    }
}

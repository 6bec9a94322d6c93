use crate::utils::error::{EnhancerError, Result};
use url::Url;

/// Upper bound for any per-upstream transport timeout.
pub const MAX_TIMEOUT_MS: u64 = 60_000;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field: &str, value: impl ToString, reason: impl Into<String>) -> EnhancerError {
    EnhancerError::InvalidConfigValueError {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

/// An upstream base URL. Request paths are appended to it, so it needs a
/// host and must not carry a query or fragment.
pub fn validate_endpoint(field: &str, endpoint: &str) -> Result<()> {
    if endpoint.trim().is_empty() {
        return Err(invalid(field, endpoint, "Endpoint cannot be empty"));
    }

    let url = Url::parse(endpoint)
        .map_err(|e| invalid(field, endpoint, format!("Invalid URL format: {}", e)))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(
            field,
            endpoint,
            format!("Unsupported URL scheme: {}", url.scheme()),
        ));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(invalid(field, endpoint, "Endpoint has no host"));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(invalid(
            field,
            endpoint,
            "Endpoint must be a base URL without query or fragment",
        ));
    }
    Ok(())
}

/// A credential value. A `${VAR}` placeholder that survived substitution
/// means the variable was never set.
pub fn validate_credential(field: &str, value: &str) -> Result<()> {
    let value = value.trim();
    if value.is_empty() {
        return Err(EnhancerError::MissingConfigError {
            field: field.to_string(),
        });
    }
    if let Some(var) = value
        .strip_prefix("${")
        .and_then(|rest| rest.strip_suffix('}'))
    {
        return Err(EnhancerError::MissingConfigError {
            field: format!("{} (environment variable {} is not set)", field, var),
        });
    }
    Ok(())
}

pub fn validate_host(field: &str, host: &str) -> Result<()> {
    if host.trim().is_empty() {
        return Err(invalid(field, host, "Host cannot be empty"));
    }
    if host.contains(char::is_whitespace) {
        return Err(invalid(field, host, "Host cannot contain whitespace"));
    }
    Ok(())
}

pub fn validate_port(field: &str, port: u16) -> Result<()> {
    if port == 0 {
        return Err(invalid(field, port, "Port must be between 1 and 65535"));
    }
    Ok(())
}

/// `None` means no transport timeout, which is always accepted.
pub fn validate_timeout(field: &str, timeout_ms: Option<u64>) -> Result<()> {
    match timeout_ms {
        Some(ms) if ms == 0 || ms > MAX_TIMEOUT_MS => Err(invalid(
            field,
            ms,
            format!("Timeout must be between 1 and {} ms", MAX_TIMEOUT_MS),
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_endpoint() {
        assert!(validate_endpoint("geo.endpoint", "https://geoip.maxmind.com").is_ok());
        assert!(validate_endpoint("publisher.endpoint", "http://127.0.0.1:3000").is_ok());
        assert!(validate_endpoint("publisher.endpoint", "http://publishers.local/v1/").is_ok());

        assert!(validate_endpoint("publisher.endpoint", "").is_err());
        assert!(validate_endpoint("publisher.endpoint", "not a url").is_err());
        assert!(validate_endpoint("publisher.endpoint", "ftp://example.com").is_err());
        assert!(validate_endpoint("publisher.endpoint", "http://example.com/?site=1").is_err());
        assert!(validate_endpoint("publisher.endpoint", "http://example.com/#top").is_err());
    }

    #[test]
    fn test_unresolved_placeholder_is_missing_credential() {
        let err = validate_credential("geo.license_key", "${GEO_LICENSE_KEY}").unwrap_err();
        match err {
            EnhancerError::MissingConfigError { field } => {
                assert!(field.starts_with("geo.license_key"));
                assert!(field.contains("GEO_LICENSE_KEY"));
            }
            other => panic!("unexpected error: {:?}", other),
        }

        assert!(validate_credential("geo.account_id", "   ").is_err());
        assert!(validate_credential("geo.account_id", "135482").is_ok());
    }

    #[test]
    fn test_validate_server_and_timeouts() {
        assert!(validate_host("server.host", "0.0.0.0").is_ok());
        assert!(validate_host("server.host", "local host").is_err());
        assert!(validate_port("server.port", 8080).is_ok());
        assert!(validate_port("server.port", 0).is_err());

        assert!(validate_timeout("geo.timeout_ms", None).is_ok());
        assert!(validate_timeout("geo.timeout_ms", Some(2000)).is_ok());
        assert!(validate_timeout("geo.timeout_ms", Some(0)).is_err());
        assert!(validate_timeout("geo.timeout_ms", Some(MAX_TIMEOUT_MS + 1)).is_err());
    }
}

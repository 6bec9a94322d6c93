use crate::adapters::maxmind::{DEFAULT_GEO_ENDPOINT, DEFAULT_GEO_TIMEOUT_MS};
use crate::core::{ConfigProvider, Enhancer};
use crate::utils::error::{EnhancerError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

pub const DEFAULT_UPSTREAM_ENDPOINT: &str = "http://localhost:3000";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnhancerConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub demographics: UpstreamConfig,
    pub publisher: UpstreamConfig,
    pub geo: GeoConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    pub endpoint: String,
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoConfig {
    #[serde(default = "default_geo_endpoint")]
    pub endpoint: String,
    pub account_id: String,
    pub license_key: String,
    #[serde(default = "default_geo_timeout")]
    pub timeout_ms: Option<u64>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_geo_endpoint() -> String {
    DEFAULT_GEO_ENDPOINT.to_string()
}

fn default_geo_timeout() -> Option<u64> {
    Some(DEFAULT_GEO_TIMEOUT_MS)
}

impl EnhancerConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// Parses TOML after substituting `${VAR}` references from the environment.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| EnhancerError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| EnhancerError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// Builds the configuration from environment variables.
    ///
    /// Geo credentials are required; everything else has a default.
    pub fn from_env() -> Result<Self> {
        let upstream_endpoint = |name: &str| {
            env::var(name).unwrap_or_else(|_| DEFAULT_UPSTREAM_ENDPOINT.to_string())
        };
        let required = |name: &str| {
            env::var(name).map_err(|_| EnhancerError::MissingConfigError {
                field: name.to_string(),
            })
        };

        Ok(Self {
            server: ServerConfig {
                host: env::var("HOST").unwrap_or_else(|_| default_host()),
                port: parse_env("PORT")?.unwrap_or_else(default_port),
            },
            demographics: UpstreamConfig {
                endpoint: upstream_endpoint("DEMOGRAPHICS_ENDPOINT"),
                timeout_ms: parse_env("DEMOGRAPHICS_TIMEOUT_MS")?,
            },
            publisher: UpstreamConfig {
                endpoint: upstream_endpoint("PUBLISHER_ENDPOINT"),
                timeout_ms: parse_env("PUBLISHER_TIMEOUT_MS")?,
            },
            geo: GeoConfig {
                endpoint: env::var("GEO_ENDPOINT").unwrap_or_else(|_| default_geo_endpoint()),
                account_id: required("GEO_ACCOUNT_ID")?,
                license_key: required("GEO_LICENSE_KEY")?,
                timeout_ms: parse_env("GEO_TIMEOUT_MS")?.or_else(default_geo_timeout),
            },
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| EnhancerError::InvalidConfigValueError {
                field: name.to_string(),
                value: raw.clone(),
                reason: "Value is not a valid number".to_string(),
            }),
        Err(_) => Ok(None),
    }
}

impl ConfigProvider for EnhancerConfig {
    fn demographics_endpoint(&self) -> &str {
        &self.demographics.endpoint
    }

    fn publisher_endpoint(&self) -> &str {
        &self.publisher.endpoint
    }

    fn geo_endpoint(&self) -> &str {
        &self.geo.endpoint
    }

    fn geo_credentials(&self) -> (&str, &str) {
        (&self.geo.account_id, &self.geo.license_key)
    }

    fn timeout_ms(&self, enhancer: Enhancer) -> Option<u64> {
        match enhancer {
            Enhancer::Demographics => self.demographics.timeout_ms,
            Enhancer::Publisher => self.publisher.timeout_ms,
            Enhancer::Geo => self.geo.timeout_ms,
        }
    }
}

impl Validate for EnhancerConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_host("server.host", &self.server.host)?;
        validation::validate_port("server.port", self.server.port)?;

        validation::validate_endpoint("demographics.endpoint", &self.demographics.endpoint)?;
        validation::validate_endpoint("publisher.endpoint", &self.publisher.endpoint)?;
        validation::validate_endpoint("geo.endpoint", &self.geo.endpoint)?;

        validation::validate_credential("geo.account_id", &self.geo.account_id)?;
        validation::validate_credential("geo.license_key", &self.geo.license_key)?;

        validation::validate_timeout("demographics.timeout_ms", self.demographics.timeout_ms)?;
        validation::validate_timeout("publisher.timeout_ms", self.publisher.timeout_ms)?;
        validation::validate_timeout("geo.timeout_ms", self.geo.timeout_ms)?;

        tracing::debug!("Configuration validation passed");
        Ok(())
    }
}

use crate::domain::model::GeoResult;
use crate::domain::ports::{CountryLookup, GeoLocator};
use crate::utils::error::{EnhancerError, Result};
use async_trait::async_trait;

pub const ACCEPTED_COUNTRY: &str = "United States";

/// Status for geo failures that did not come with one of their own.
pub const GEO_FAILURE_STATUS: u16 = 424;

/// Resolves an IP to its country and only lets U.S. locations through.
pub struct UsOnlyGeoLocator<L: CountryLookup> {
    lookup: L,
}

impl<L: CountryLookup> UsOnlyGeoLocator<L> {
    pub fn new(lookup: L) -> Self {
        Self { lookup }
    }
}

#[async_trait]
impl<L: CountryLookup> GeoLocator for UsOnlyGeoLocator<L> {
    async fn resolve_geo(&self, ip: &str) -> Result<GeoResult> {
        if !is_valid_ipv4(ip) {
            return Err(EnhancerError::invalid_input("invalid input"));
        }

        let country = self.lookup.country(ip).await.map_err(normalize_geo_error)?;
        if country != ACCEPTED_COUNTRY {
            return Err(EnhancerError::InvalidCountry { country });
        }

        Ok(GeoResult { country })
    }
}

fn normalize_geo_error(err: EnhancerError) -> EnhancerError {
    match err {
        EnhancerError::InvalidInput { .. } | EnhancerError::InvalidCountry { .. } => err,
        other => EnhancerError::Upstream {
            status: GEO_FAILURE_STATUS,
            message: other.to_string(),
        },
    }
}

/// Four dot-separated decimal blocks, each in `[0, 256)`.
pub fn is_valid_ipv4(ip: &str) -> bool {
    let blocks: Vec<&str> = ip.split('.').collect();
    blocks.len() == 4
        && blocks.iter().all(|block| {
            !block.is_empty()
                && block.bytes().all(|b| b.is_ascii_digit())
                && block.parse::<u32>().map(|n| n < 256).unwrap_or(false)
        })
}

pub mod demographics;
pub mod geo;
pub mod orchestrator;
pub mod publisher;

pub use crate::domain::model::{
    DemographicsResult, Device, Enhancement, Enhancer, EnrichmentRequest, Facet, GeoResult,
    PublisherResult, Site,
};
pub use crate::domain::ports::{
    ConfigProvider, CountryLookup, DemographicsProvider, GeoLocator, PublisherResolver,
};
pub use crate::utils::error::Result;

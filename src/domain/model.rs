use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// An inbound ad request. Fields the enhancer does not know about are kept
/// as-is so the response mirrors the request shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentRequest {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub site: Option<Facet<Site>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub device: Option<Facet<Device>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EnrichmentRequest {
    /// The site id, if it is a non-empty string.
    pub fn site_id(&self) -> Option<&str> {
        self.site.as_ref().and_then(Facet::known).and_then(Site::id)
    }

    /// The device ip as sent, unless it is missing, null or empty.
    pub fn device_ip(&self) -> Option<&Value> {
        self.device.as_ref().and_then(Facet::known).and_then(Device::ip)
    }

    pub fn site_mut(&mut self) -> Option<&mut Site> {
        self.site.as_mut().and_then(Facet::known_mut)
    }

    pub fn device_mut(&mut self) -> Option<&mut Device> {
        self.device.as_mut().and_then(Facet::known_mut)
    }
}

/// A request section that is either the object we understand or any other
/// JSON value, which is passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Facet<T> {
    Known(T),
    Opaque(Value),
}

impl<T> Facet<T> {
    pub fn known(&self) -> Option<&T> {
        match self {
            Facet::Known(inner) => Some(inner),
            Facet::Opaque(_) => None,
        }
    }

    pub fn known_mut(&mut self) -> Option<&mut T> {
        match self {
            Facet::Known(inner) => Some(inner),
            Facet::Opaque(_) => None,
        }
    }
}

/// Inbound `demographics` and `publisher` stay in `extra` until an
/// enhancement replaces them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Site {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub page: Option<Value>,
    #[serde(default, skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub demographics: Option<DemographicsResult>,
    #[serde(default, skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<PublisherResult>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Site {
    pub fn id(&self) -> Option<&str> {
        self.id
            .as_ref()
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
    }

    pub fn set_demographics(&mut self, demographics: DemographicsResult) {
        self.extra.remove("demographics");
        self.demographics = Some(demographics);
    }

    pub fn set_publisher(&mut self, publisher: PublisherResult) {
        self.extra.remove("publisher");
        self.publisher = Some(publisher);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Device {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub ip: Option<Value>,
    #[serde(default, skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub geo: Option<GeoResult>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Device {
    pub fn ip(&self) -> Option<&Value> {
        self.ip.as_ref().filter(|ip| match ip {
            Value::Null => false,
            Value::String(s) => !s.is_empty(),
            _ => true,
        })
    }

    pub fn set_geo(&mut self, geo: GeoResult) {
        self.extra.remove("geo");
        self.geo = Some(geo);
    }
}

// An explicit `null` becomes `Some(..)` so it is echoed back; only a missing
// key falls through to `default`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Audience gender split. `male_percent` is always `100 - female_percent`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DemographicsResult {
    pub female_percent: f64,
    pub male_percent: f64,
}

impl DemographicsResult {
    pub fn from_female_percent(pct_female: f64) -> Self {
        let female_percent = round_to_hundredths(pct_female);
        Self {
            female_percent,
            male_percent: 100.0 - female_percent,
        }
    }
}

fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublisherResult {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoResult {
    pub country: String,
}

/// Identity of one enrichment operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Enhancer {
    Demographics,
    Publisher,
    Geo,
}

impl std::fmt::Display for Enhancer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Enhancer::Demographics => write!(f, "demographics"),
            Enhancer::Publisher => write!(f, "publisher"),
            Enhancer::Geo => write!(f, "geo location"),
        }
    }
}

/// A successful enhancement, tagged by the facet it fills in.
#[derive(Debug, Clone, PartialEq)]
pub enum Enhancement {
    Demographics(DemographicsResult),
    Publisher(PublisherResult),
    Geo(GeoResult),
}

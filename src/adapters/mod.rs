// Adapters layer: concrete clients for the upstream providers.

pub mod http;
pub mod maxmind;

// Domain layer: request model and the ports each enhancer is reached through.

pub mod model;
pub mod ports;

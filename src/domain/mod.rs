// Domain layer: core models and ports (interfaces). No storage or HTTP types in here.

pub mod model;
pub mod ports;

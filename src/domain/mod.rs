// Domain layer: curriculum records, raw service payloads and ports (interfaces).

pub mod model;
pub mod ports;
pub mod raw;

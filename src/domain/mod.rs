// Domain layer: value objects and the transport port. No HTTP or XML here.

pub mod model;
pub mod pickup_point;
pub mod ports;

// Domain layer: backend records and the ports (interfaces) the client is built against.

pub mod model;
pub mod ports;

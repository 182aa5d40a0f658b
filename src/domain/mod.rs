// Domain layer: launcher models and ports (process, terminal, network probe).

pub mod model;
pub mod ports;

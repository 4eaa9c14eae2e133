// Domain layer: site models and ports to the outside world (hosting API, upload storage).

pub mod model;
pub mod ports;

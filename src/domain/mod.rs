// Domain layer: export/date models, backend record shapes and ports.

pub mod model;
pub mod ports;
pub mod records;

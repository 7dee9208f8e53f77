// Domain layer: the row model, the destination row shape and the ports the
// pipeline is written against.

pub mod model;
pub mod ports;
pub mod target_row;

// Persistent vector index: exact k-NN over a flat array.

pub mod flat;
pub mod shared;

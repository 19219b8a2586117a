pub mod power;
pub mod sampling;

//! CLI command implementations.

mod doctor;
mod serve;

pub use doctor::run_doctor;
pub use serve::run_serve;

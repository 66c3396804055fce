// particle/mod.rs
// Re-exports for the particle module

mod bunch;
mod integrator;
mod types;

pub use bunch::*;
pub use integrator::*;
pub use types::*;

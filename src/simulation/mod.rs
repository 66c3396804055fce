// simulation/mod.rs
// Re-exports and module declarations for simulation submodules

mod conservation;
mod grid;
mod history;
mod phase_sweep;
mod standard;
mod stepper;

pub use conservation::*;
pub use grid::*;
pub use history::*;
pub use phase_sweep::*;
pub use standard::*;
pub use stepper::*;

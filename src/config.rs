// config.rs
// Run defaults: timestep control, stability guard, sampling and sweep settings

use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

// ====================
// Timestep Parameters
// ====================
/// Timestep used while the bunch is outside the governing accelerating field (s).
pub const DEFAULT_LARGE_TIMESTEP: f64 = 1e-3;
/// Timestep used while the bunch traverses the governing accelerating field (s).
pub const DEFAULT_SMALL_TIMESTEP: f64 = 1e-8;
/// Default run duration (s).
pub const DEFAULT_DURATION: f64 = 1.0;

// ====================
// Stability Guard
// ====================
/// Factor applied to the timestep each time the predicted mean speed reaches c.
pub const TIMESTEP_SHRINK_FACTOR: f64 = 0.1;
/// Number of shrinks tolerated before the run is halted.
pub const MAX_TIMESTEP_SHRINKS: u32 = 5;

// ====================
// Bunch Generation
// ====================
/// Re-draws allowed per particle when the sampled energy is at or below rest energy.
pub const MAX_ENERGY_RESAMPLES: usize = 100;

// ====================
// Phase Sweep
// ====================
pub const DEFAULT_PHASE_RESOLUTION: usize = 50;
/// Decimal places phase shifts are rounded to.
pub const PHASE_DECIMALS: i32 = 5;

// ====================
// Conservation Run
// ====================
pub const DEFAULT_SPACE_RESOLUTION: usize = 10;
/// Edge of the default integration cube in units of the bunch position spread.
pub const INTEGRATION_EXTENT_SPREADS: f64 = 10.0;

fn default_max_timestep_shrinks() -> u32 {
    MAX_TIMESTEP_SHRINKS
}

fn default_timestep_shrink_factor() -> f64 {
    TIMESTEP_SHRINK_FACTOR
}

/// Time control shared by every driver.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Total simulated time (s).
    pub duration: f64,
    pub large_timestep: f64,
    pub small_timestep: f64,
    #[serde(default = "default_max_timestep_shrinks")]
    pub max_timestep_shrinks: u32,
    #[serde(default = "default_timestep_shrink_factor")]
    pub timestep_shrink_factor: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            duration: DEFAULT_DURATION,
            large_timestep: DEFAULT_LARGE_TIMESTEP,
            small_timestep: DEFAULT_SMALL_TIMESTEP,
            max_timestep_shrinks: MAX_TIMESTEP_SHRINKS,
            timestep_shrink_factor: TIMESTEP_SHRINK_FACTOR,
        }
    }
}

impl SimConfig {
    pub fn new(duration: f64, large_timestep: f64, small_timestep: f64) -> Self {
        Self {
            duration,
            large_timestep,
            small_timestep,
            ..Self::default()
        }
    }

    /// Reject settings that cannot produce a meaningful run.
    pub fn validate(&self) -> SimResult<()> {
        if !(self.duration.is_finite() && self.duration > 0.0) {
            return Err(SimError::config(format!(
                "duration must be positive, got {}",
                self.duration
            )));
        }
        for (label, dt) in [
            ("large_timestep", self.large_timestep),
            ("small_timestep", self.small_timestep),
        ] {
            if !(dt.is_finite() && dt > 0.0) {
                return Err(SimError::config(format!(
                    "{label} must be positive, got {dt}"
                )));
            }
            if dt >= self.duration {
                return Err(SimError::config(format!(
                    "{label} ({dt}) must be smaller than the duration ({})",
                    self.duration
                )));
            }
        }
        if self.small_timestep > self.large_timestep {
            return Err(SimError::config(format!(
                "small_timestep ({}) exceeds large_timestep ({})",
                self.small_timestep, self.large_timestep
            )));
        }
        if !(self.timestep_shrink_factor > 0.0 && self.timestep_shrink_factor < 1.0) {
            return Err(SimError::config(format!(
                "timestep_shrink_factor must lie in (0, 1), got {}",
                self.timestep_shrink_factor
            )));
        }
        // Elapsed time must still advance after the last allowed shrink.
        let smallest = self.smallest_timestep();
        if smallest <= self.duration * f64::EPSILON {
            return Err(SimError::config(format!(
                "fully shrunk timestep {smallest:e} s is lost in rounding against duration {} s",
                self.duration
            )));
        }
        Ok(())
    }

    /// `small_timestep` after every permitted shrink.
    pub fn smallest_timestep(&self) -> f64 {
        let shrinks = i32::try_from(self.max_timestep_shrinks).unwrap_or(i32::MAX);
        self.small_timestep * self.timestep_shrink_factor.powi(shrinks)
    }
}

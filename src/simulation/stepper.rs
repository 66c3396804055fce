// simulation/stepper.rs
// Stepping machinery shared by every driver: timestep choice, the
// light-speed guard and the integrator pass

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::SimConfig;
use crate::error::SimResult;
use crate::field::{EmFieldAggregator, ExternalField};
use crate::io::{self, SaveFormat};
use crate::particle::{Integrator, ParticleBunch};
use crate::units::SPEED_OF_LIGHT;

/// How a run ended. Every variant keeps whatever was recorded up to `time`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum RunOutcome {
    /// Elapsed time reached the configured duration.
    Completed { time: f64 },
    /// The mean velocity would have reached c even after every allowed
    /// timestep shrink; the offending update was not applied.
    Unstable { time: f64, shrink_attempts: u32 },
    /// A particle left the energy-integration volume.
    OutOfBounds { time: f64, particle: String },
}

impl RunOutcome {
    pub fn time(&self) -> f64 {
        match self {
            RunOutcome::Completed { time }
            | RunOutcome::Unstable { time, .. }
            | RunOutcome::OutOfBounds { time, .. } => *time,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, RunOutcome::Completed { .. })
    }
}

/// Result of the light-speed prediction for one step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TimestepCheck {
    Stable { dt: f64, shrinks: u32 },
    Unstable { shrinks: u32 },
}

/// Small timestep while the bunch's mean x lies strictly inside the
/// governing field's x extent, large timestep otherwise.
pub fn choose_timestep(
    config: &SimConfig,
    governing: Option<&ExternalField>,
    bunch: &ParticleBunch,
) -> f64 {
    let mean_x = bunch.mean_position().x;
    match governing {
        Some(field) if field.bounds().contains_x(mean_x) => config.small_timestep,
        _ => config.large_timestep,
    }
}

/// Predict `|v̄ + ā·dt|` and shrink `dt` until it stays below c.
///
/// Accelerations must already be current. Gives up after
/// `config.max_timestep_shrinks` shrinks.
pub fn check_timestep(bunch: &ParticleBunch, dt: f64, config: &SimConfig) -> TimestepCheck {
    let mean_velocity = bunch.mean_velocity();
    let mean_acceleration = bunch.mean_acceleration();
    let mut dt = dt;
    let mut shrinks = 0;
    loop {
        let predicted = (mean_velocity + mean_acceleration * dt).mag();
        if predicted < SPEED_OF_LIGHT {
            return TimestepCheck::Stable { dt, shrinks };
        }
        if shrinks >= config.max_timestep_shrinks {
            return TimestepCheck::Unstable { shrinks };
        }
        dt *= config.timestep_shrink_factor;
        shrinks += 1;
        log::debug!(
            "predicted mean speed {:.6e} m/s reaches c, shrinking timestep to {:e} s",
            predicted,
            dt
        );
    }
}

/// Advance every particle by `dt`.
pub fn advance(bunch: &mut ParticleBunch, dt: f64, integrator: Integrator) {
    for particle in &mut bunch.particles {
        particle.update(dt, integrator);
    }
}

/// Outcome of a single force + guard + integrate step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Step {
    /// State advanced by this many seconds.
    Advanced(f64),
    /// Guard refused the step after this many shrinks; state untouched.
    Halted(u32),
}

/// Compute accelerations at `time`, guard the timestep and integrate.
pub fn step(
    aggregator: &EmFieldAggregator,
    bunch: &mut ParticleBunch,
    time: f64,
    dt: f64,
    config: &SimConfig,
    integrator: Integrator,
) -> Step {
    aggregator.give_acceleration(bunch, time);
    match check_timestep(bunch, dt, config) {
        TimestepCheck::Stable { dt, .. } => {
            advance(bunch, dt, integrator);
            Step::Advanced(dt)
        }
        TimestepCheck::Unstable { shrinks } => Step::Halted(shrinks),
    }
}

/// Log and package a guard halt.
pub(crate) fn unstable(driver: &str, time: f64, shrink_attempts: u32) -> RunOutcome {
    log::warn!(
        "{driver}: halted at t = {time:e} s, mean speed would reach c after {shrink_attempts} timestep shrinks"
    );
    RunOutcome::Unstable {
        time,
        shrink_attempts,
    }
}

/// Common surface of the three run kinds.
pub trait SimulationDriver {
    type Results: Serialize + DeserializeOwned;

    /// Run to completion or to the first halt. Halts are reported in the
    /// returned outcome, not as errors.
    fn run(&mut self) -> SimResult<RunOutcome>;

    fn results(&self) -> &Self::Results;

    /// Persist the results under `base` (extension chosen by `format`).
    fn save(&self, base: &Path, format: SaveFormat) -> SimResult<PathBuf> {
        io::save_results(self.results(), base, format)
    }
}

/// Round `value` to `decimals` decimal places.
pub fn round_to_decimals(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

// simulation/phase_sweep.rs
// Re-runs the same bunch while stepping the phase of nominated
// accelerating fields across one period

use serde::{Deserialize, Serialize};

use super::stepper::{self, choose_timestep, round_to_decimals, RunOutcome, SimulationDriver, Step};
use super::history::{PhaseSweepResults, SweepPoint};
use crate::config::{SimConfig, DEFAULT_PHASE_RESOLUTION, PHASE_DECIMALS};
use crate::error::{SimError, SimResult};
use crate::field::EmFieldAggregator;
use crate::particle::{Integrator, Particle, ParticleBunch};
use crate::profile_scope;

/// Which electric fields are shifted and how finely.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhaseSweepSettings {
    /// Number of runs spread over one period.
    #[serde(default = "default_resolution")]
    pub resolution: usize,
    /// Indices into the aggregator's electric fields.
    pub fields: Vec<usize>,
}

fn default_resolution() -> usize {
    DEFAULT_PHASE_RESOLUTION
}

impl PhaseSweepSettings {
    pub fn new(resolution: usize, fields: Vec<usize>) -> Self {
        Self { resolution, fields }
    }

    /// Phase (in periods) used by 0-based iteration `j`.
    pub fn phase_for(&self, iteration: usize) -> f64 {
        round_to_decimals((iteration + 1) as f64 / self.resolution as f64, PHASE_DECIMALS)
    }
}

pub struct PhaseSweepSimulation {
    pub aggregator: EmFieldAggregator,
    pub bunch: ParticleBunch,
    pub config: SimConfig,
    pub settings: PhaseSweepSettings,
    pub integrator: Integrator,
    results: PhaseSweepResults,
}

impl PhaseSweepSimulation {
    pub fn new(
        aggregator: EmFieldAggregator,
        bunch: ParticleBunch,
        config: SimConfig,
        settings: PhaseSweepSettings,
    ) -> SimResult<Self> {
        config.validate()?;
        if bunch.is_empty() {
            return Err(SimError::config("phase sweep needs at least one particle"));
        }
        if settings.resolution == 0 {
            return Err(SimError::config("phase sweep resolution must be at least 1"));
        }
        if settings.fields.is_empty() {
            return Err(SimError::config("phase sweep needs at least one nominated field"));
        }
        for &index in &settings.fields {
            aggregator.electric_field(index)?;
        }
        Ok(Self {
            aggregator,
            bunch,
            config,
            settings,
            integrator: Integrator::default(),
            results: PhaseSweepResults::default(),
        })
    }

    pub fn with_integrator(mut self, integrator: Integrator) -> Self {
        self.integrator = integrator;
        self
    }

    fn set_phase(&mut self, phase: f64) -> SimResult<()> {
        for &index in &self.settings.fields {
            self.aggregator.electric_field_mut(index)?.set_phase_shift(phase);
        }
        Ok(())
    }

    /// One full run from the current bunch state, nothing recorded.
    fn run_once(&mut self) -> SimResult<RunOutcome> {
        let governing = self.aggregator.electric_field(self.settings.fields[0])?;
        let mut time = 0.0;
        let outcome = loop {
            if time >= self.config.duration {
                break RunOutcome::Completed { time };
            }
            let dt = choose_timestep(&self.config, Some(governing), &self.bunch);
            match stepper::step(
                &self.aggregator,
                &mut self.bunch,
                time,
                dt,
                &self.config,
                self.integrator,
            ) {
                Step::Advanced(used) => time += used,
                Step::Halted(shrinks) => break stepper::unstable("phase sweep", time, shrinks),
            }
        };
        Ok(outcome)
    }
}

impl SimulationDriver for PhaseSweepSimulation {
    type Results = PhaseSweepResults;

    /// Every iteration starts from the bunch state held when `run` was
    /// called; the bunch is left in that state afterwards. Returns the first
    /// iteration's halt, if any iteration halted.
    fn run(&mut self) -> SimResult<RunOutcome> {
        profile_scope!("phase_sweep_run");
        log::info!(
            "phase sweep: {} runs over fields {:?}",
            self.settings.resolution,
            self.settings.fields
        );
        self.results = PhaseSweepResults::default();
        let initial: Vec<Particle> = self.bunch.particles.clone();
        for iteration in 0..self.settings.resolution {
            let phase = self.settings.phase_for(iteration);
            self.set_phase(phase)?;
            self.bunch.particles.clone_from(&initial);
            let outcome = self.run_once()?;
            let phase = self.aggregator.electric_field(self.settings.fields[0])?.phase_shift();
            self.results.points.push(SweepPoint {
                phase,
                final_spread: self.bunch.diagnostics().energy_spread,
                outcome,
            });
            log::info!("{} simulations completed", iteration + 1);
        }
        let halted = self
            .results
            .points
            .iter()
            .find(|p| !p.outcome.is_completed())
            .map(|p| p.outcome.clone());
        self.results.close_curve();
        self.bunch.particles.clone_from(&initial);
        Ok(halted.unwrap_or(RunOutcome::Completed {
            time: self.config.duration,
        }))
    }

    fn results(&self) -> &PhaseSweepResults {
        &self.results
    }
}

// simulation/conservation.rs
// Two-body style run with no external fields, tracking momentum,
// angular momentum and the field energy stored in a bounded volume

use serde::{Deserialize, Serialize};

use super::stepper::{self, choose_timestep, RunOutcome, SimulationDriver, Step};
use super::grid::{EnergyGrid, IntegrationVolume};
use super::history::ConservationHistory;
use crate::config::{SimConfig, DEFAULT_SPACE_RESOLUTION};
use crate::error::{SimError, SimResult};
use crate::field::EmFieldAggregator;
use crate::particle::{Integrator, ParticleBunch};
use crate::profile_scope;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConservationSettings {
    /// Cells per axis of the integration grid.
    #[serde(default = "default_space_resolution")]
    pub space_resolution: usize,
    /// Integration box; the cube `[0, 10·position spread]³` when absent.
    #[serde(default)]
    pub volume: Option<IntegrationVolume>,
}

fn default_space_resolution() -> usize {
    DEFAULT_SPACE_RESOLUTION
}

impl Default for ConservationSettings {
    fn default() -> Self {
        Self {
            space_resolution: DEFAULT_SPACE_RESOLUTION,
            volume: None,
        }
    }
}

pub struct ConservationSimulation {
    pub aggregator: EmFieldAggregator,
    pub bunch: ParticleBunch,
    pub config: SimConfig,
    pub integrator: Integrator,
    grid: EnergyGrid,
    history: ConservationHistory,
}

impl ConservationSimulation {
    pub fn new(
        aggregator: EmFieldAggregator,
        bunch: ParticleBunch,
        config: SimConfig,
        settings: ConservationSettings,
    ) -> SimResult<Self> {
        config.validate()?;
        if aggregator.has_external_fields() {
            return Err(SimError::config(
                "conservation run only supports inter-particle fields; remove external fields",
            ));
        }
        if bunch.len() < 2 {
            return Err(SimError::config(format!(
                "conservation run needs at least two particles, got {}",
                bunch.len()
            )));
        }
        let volume = match settings.volume {
            Some(volume) => volume,
            None => IntegrationVolume::from_position_spread(bunch.position_spread)?,
        };
        let grid = EnergyGrid::new(volume, settings.space_resolution)?;
        Ok(Self {
            aggregator,
            bunch,
            config,
            integrator: Integrator::default(),
            grid,
            history: ConservationHistory::default(),
        })
    }

    pub fn with_integrator(mut self, integrator: Integrator) -> Self {
        self.integrator = integrator;
        self
    }

    pub fn grid(&self) -> &EnergyGrid {
        &self.grid
    }

    pub fn history(&self) -> &ConservationHistory {
        &self.history
    }

    fn escaped_particle(&self) -> Option<&str> {
        let volume = self.grid.volume();
        self.bunch
            .particles
            .iter()
            .find(|p| !volume.contains(p.position))
            .map(|p| p.name.as_str())
    }
}

impl SimulationDriver for ConservationSimulation {
    type Results = ConservationHistory;

    fn run(&mut self) -> SimResult<RunOutcome> {
        profile_scope!("conservation_run");
        log::info!(
            "conservation run: {} particles, {}³ grid cells",
            self.bunch.len(),
            self.grid.resolution()
        );
        self.history = ConservationHistory::default();
        let mut time = 0.0;
        let outcome = loop {
            if time >= self.config.duration {
                break RunOutcome::Completed { time };
            }
            if let Some(name) = self.escaped_particle() {
                log::info!(
                    "conservation run: '{name}' left the integration volume at t = {time:e} s, stopping"
                );
                break RunOutcome::OutOfBounds {
                    time,
                    particle: name.to_string(),
                };
            }
            let dt = choose_timestep(&self.config, self.aggregator.electric_fields.first(), &self.bunch);
            let field_energy = self.grid.field_energy(&self.aggregator, &self.bunch, time);
            self.history.record(time, &self.bunch, field_energy);
            match stepper::step(
                &self.aggregator,
                &mut self.bunch,
                time,
                dt,
                &self.config,
                self.integrator,
            ) {
                Step::Advanced(used) => time += used,
                Step::Halted(shrinks) => break stepper::unstable("conservation run", time, shrinks),
            }
        };
        log::info!(
            "conservation run finished at t = {:e} s after {} samples",
            outcome.time(),
            self.history.len()
        );
        self.history.run.outcome = Some(outcome.clone());
        Ok(outcome)
    }

    fn results(&self) -> &ConservationHistory {
        &self.history
    }
}

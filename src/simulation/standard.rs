// simulation/standard.rs
// Plain time-stepped run recording the full state at every step

use super::stepper::{self, choose_timestep, RunOutcome, SimulationDriver, Step};
use super::history::RunHistory;
use crate::config::SimConfig;
use crate::error::{SimError, SimResult};
use crate::field::EmFieldAggregator;
use crate::particle::{Integrator, ParticleBunch};
use crate::profile_scope;

pub struct StandardSimulation {
    pub aggregator: EmFieldAggregator,
    pub bunch: ParticleBunch,
    pub config: SimConfig,
    pub integrator: Integrator,
    history: RunHistory,
}

impl StandardSimulation {
    pub fn new(aggregator: EmFieldAggregator, bunch: ParticleBunch, config: SimConfig) -> SimResult<Self> {
        config.validate()?;
        if bunch.is_empty() {
            return Err(SimError::config("standard run needs at least one particle"));
        }
        Ok(Self {
            aggregator,
            bunch,
            config,
            integrator: Integrator::default(),
            history: RunHistory::default(),
        })
    }

    pub fn with_integrator(mut self, integrator: Integrator) -> Self {
        self.integrator = integrator;
        self
    }

    pub fn history(&self) -> &RunHistory {
        &self.history
    }
}

impl SimulationDriver for StandardSimulation {
    type Results = RunHistory;

    fn run(&mut self) -> SimResult<RunOutcome> {
        profile_scope!("standard_run");
        log::info!(
            "standard run: {} particles for {:e} s",
            self.bunch.len(),
            self.config.duration
        );
        self.history.clear();
        let governing = self.aggregator.electric_fields.first();
        let mut time = 0.0;
        let outcome = loop {
            if time >= self.config.duration {
                break RunOutcome::Completed { time };
            }
            let dt = choose_timestep(&self.config, governing, &self.bunch);
            self.history.record(time, &self.bunch);
            match stepper::step(
                &self.aggregator,
                &mut self.bunch,
                time,
                dt,
                &self.config,
                self.integrator,
            ) {
                Step::Advanced(used) => time += used,
                Step::Halted(shrinks) => break stepper::unstable("standard run", time, shrinks),
            }
        };
        log::info!(
            "standard run finished at t = {:e} s after {} samples",
            outcome.time(),
            self.history.len()
        );
        self.history.outcome = Some(outcome.clone());
        Ok(outcome)
    }

    fn results(&self) -> &RunHistory {
        &self.history
    }
}

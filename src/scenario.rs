// scenario.rs
// Builds a runnable simulation from a scenario file and persists its results

use std::path::{Path, PathBuf};

use crate::error::{SimError, SimResult};
use crate::export::{
    export_csv, write_conservation_csv, write_run_csv, write_sweep_csv, write_trajectories_csv,
};
use crate::init_config::{ScenarioConfig, SimulationKind};
use crate::io::SaveFormat;
use crate::simulation::{
    ConservationSimulation, PhaseSweepSimulation, RunOutcome, SimulationDriver, StandardSimulation,
};

pub enum Scenario {
    Standard(StandardSimulation),
    PhaseSweep(PhaseSweepSimulation),
    Conservation(ConservationSimulation),
}

impl Scenario {
    pub fn load<P: AsRef<Path>>(path: P) -> SimResult<(Self, ScenarioConfig)> {
        let path = path.as_ref();
        let config = ScenarioConfig::load_from_file(path)?;
        log::info!("loaded scenario {}", path.display());
        let scenario = Self::from_config(&config)?;
        Ok((scenario, config))
    }

    pub fn from_config(config: &ScenarioConfig) -> SimResult<Self> {
        let bunch = config.build_bunch()?;
        let aggregator = config.build_aggregator(&bunch)?;
        let timing = config.simulation.timing.clone();
        let integrator = config.simulation.integrator;
        log::info!("{bunch}");
        log::debug!("{aggregator}");

        let scenario = match config.simulation.kind {
            SimulationKind::Standard => Scenario::Standard(
                StandardSimulation::new(aggregator, bunch, timing)?.with_integrator(integrator),
            ),
            SimulationKind::PhaseSweep => {
                let settings = config.phase_sweep.clone().ok_or_else(|| {
                    SimError::config(
                        "phase_sweep scenario needs a [phase_sweep] section",
                    )
                })?;
                Scenario::PhaseSweep(
                    PhaseSweepSimulation::new(aggregator, bunch, timing, settings)?
                        .with_integrator(integrator),
                )
            }
            SimulationKind::Conservation => {
                let settings = config.conservation.clone().unwrap_or_default();
                Scenario::Conservation(
                    ConservationSimulation::new(aggregator, bunch, timing, settings)?
                        .with_integrator(integrator),
                )
            }
        };
        Ok(scenario)
    }

    pub fn kind(&self) -> SimulationKind {
        match self {
            Scenario::Standard(_) => SimulationKind::Standard,
            Scenario::PhaseSweep(_) => SimulationKind::PhaseSweep,
            Scenario::Conservation(_) => SimulationKind::Conservation,
        }
    }

    pub fn run(&mut self) -> SimResult<RunOutcome> {
        match self {
            Scenario::Standard(sim) => sim.run(),
            Scenario::PhaseSweep(sim) => sim.run(),
            Scenario::Conservation(sim) => sim.run(),
        }
    }

    pub fn save(&self, base: &Path, format: SaveFormat) -> SimResult<PathBuf> {
        match self {
            Scenario::Standard(sim) => sim.save(base, format),
            Scenario::PhaseSweep(sim) => sim.save(base, format),
            Scenario::Conservation(sim) => sim.save(base, format),
        }
    }

    /// Write the CSV tables for this run kind next to `base`.
    pub fn export_csv(&self, base: &Path) -> SimResult<Vec<PathBuf>> {
        let mut written = Vec::new();
        match self {
            Scenario::Standard(sim) => {
                let history = sim.results();
                let path = csv_path(base, "run");
                export_csv(&path, |w| write_run_csv(w, history))?;
                written.push(path);
                let path = csv_path(base, "trajectories");
                export_csv(&path, |w| write_trajectories_csv(w, history))?;
                written.push(path);
            }
            Scenario::PhaseSweep(sim) => {
                let path = csv_path(base, "sweep");
                export_csv(&path, |w| write_sweep_csv(w, sim.results()))?;
                written.push(path);
            }
            Scenario::Conservation(sim) => {
                let history = sim.results();
                let path = csv_path(base, "conservation");
                export_csv(&path, |w| write_conservation_csv(w, history))?;
                written.push(path);
                let path = csv_path(base, "trajectories");
                export_csv(&path, |w| write_trajectories_csv(w, &history.run))?;
                written.push(path);
            }
        }
        Ok(written)
    }
}

/// `out/run` + `sweep` -> `out/run_sweep.csv`
pub fn csv_path(base: &Path, table: &str) -> PathBuf {
    let stem = base
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "results".to_string());
    base.with_file_name(format!("{stem}_{table}.csv"))
}

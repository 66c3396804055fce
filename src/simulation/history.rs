// simulation/history.rs
// Recorded time series and sweep results

use serde::{Deserialize, Serialize};

use super::stepper::RunOutcome;
use crate::particle::{ParticleBunch, ParticleSnapshot};

/// Per-step record of a standard run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RunHistory {
    pub time: Vec<f64>,
    pub states: Vec<Vec<ParticleSnapshot>>,
    pub mean_energy: Vec<f64>,
    pub energy_spread: Vec<f64>,
    pub outcome: Option<RunOutcome>,
}

impl RunHistory {
    /// Append one sample, recomputing the bunch diagnostics.
    pub fn record(&mut self, time: f64, bunch: &ParticleBunch) {
        let diagnostics = bunch.diagnostics();
        self.time.push(time);
        self.states
            .push(bunch.particles.iter().map(ParticleSnapshot::from).collect());
        self.mean_energy.push(diagnostics.mean_energy);
        self.energy_spread.push(diagnostics.energy_spread);
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Standard series plus the conserved quantities and field energy.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ConservationHistory {
    pub run: RunHistory,
    /// |Σp|
    pub momentum: Vec<f64>,
    /// |Σ r × p| about the origin.
    pub angular_momentum: Vec<f64>,
    /// Σ (E − E₀) over particles.
    pub kinetic_energy: Vec<f64>,
    /// Grid-integrated EM field energy.
    pub field_energy: Vec<f64>,
}

impl ConservationHistory {
    pub fn record(&mut self, time: f64, bunch: &ParticleBunch, field_energy: f64) {
        self.run.record(time, bunch);
        self.momentum.push(bunch.total_momentum().mag());
        self.angular_momentum
            .push(bunch.total_angular_momentum().mag());
        self.kinetic_energy.push(bunch.total_kinetic_energy());
        self.field_energy.push(field_energy);
    }

    pub fn len(&self) -> usize {
        self.run.len()
    }

    pub fn is_empty(&self) -> bool {
        self.run.is_empty()
    }

    /// Kinetic plus field energy per sample.
    pub fn total_energy(&self) -> Vec<f64> {
        self.kinetic_energy
            .iter()
            .zip(&self.field_energy)
            .map(|(k, f)| k + f)
            .collect()
    }
}

/// Final energy spread of one sweep iteration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SweepPoint {
    /// Phase shift of the nominated fields, in periods.
    pub phase: f64,
    pub final_spread: f64,
    pub outcome: RunOutcome,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PhaseSweepResults {
    /// One point per iteration, then the first point repeated one period on.
    pub points: Vec<SweepPoint>,
}

impl PhaseSweepResults {
    pub fn pairs(&self) -> Vec<(f64, f64)> {
        self.points
            .iter()
            .map(|p| (p.phase, p.final_spread))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Repeat the first point with its phase advanced by a full period so
    /// the curve closes on a polar plot.
    pub(crate) fn close_curve(&mut self) {
        if let Some(first) = self.points.first().cloned() {
            self.points.push(SweepPoint {
                phase: first.phase + 1.0,
                ..first
            });
        }
    }
}

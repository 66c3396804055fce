// particle/bunch.rs
// ParticleBunch: an ensemble of particles sharing rest mass and charge,
// plus generation from normal distributions and aggregate statistics.

use std::fmt;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use ultraviolet::DVec3;

use super::types::{array_vec, Particle};
use crate::config::MAX_ENERGY_RESAMPLES;
use crate::error::{SimError, SimResult};
use crate::units::{SPEED_OF_LIGHT, SPEED_OF_LIGHT_SQ};

/// Parameters for drawing a bunch.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BunchConfig {
    pub name: String,
    pub particle_count: usize,
    /// Rest mass shared by every particle (kg).
    pub rest_mass: f64,
    /// Charge shared by every particle (C).
    pub charge: f64,
    #[serde(default)]
    pub position_mean: [f64; 3],
    /// Standard deviation of each position component (m).
    pub position_spread: f64,
    /// Mean total energy (J), rest energy included.
    pub energy_mean: f64,
    /// Standard deviation of total energy (J).
    pub energy_spread: f64,
    /// Fixed seed for reproducible draws; entropy when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl BunchConfig {
    pub fn rest_energy(&self) -> f64 {
        self.rest_mass * SPEED_OF_LIGHT_SQ
    }

    pub fn validate(&self) -> SimResult<()> {
        if self.particle_count == 0 {
            return Err(SimError::config("bunch must contain at least one particle"));
        }
        if !(self.rest_mass.is_finite() && self.rest_mass > 0.0) {
            return Err(SimError::config(format!(
                "bunch rest mass must be positive, got {}",
                self.rest_mass
            )));
        }
        if !(self.position_spread.is_finite() && self.position_spread >= 0.0) {
            return Err(SimError::config("position spread must be non-negative"));
        }
        if !(self.energy_spread.is_finite() && self.energy_spread >= 0.0) {
            return Err(SimError::config("energy spread must be non-negative"));
        }
        if self.energy_spread == 0.0 && !(self.energy_mean > self.rest_energy()) {
            return Err(SimError::config(format!(
                "mean energy {:e} J does not exceed the rest energy {:e} J",
                self.energy_mean,
                self.rest_energy()
            )));
        }
        Ok(())
    }
}

/// Speed (m/s) of a particle with the given total energy, from
/// v = √(c² − m₀²c⁶/E²). `None` when the energy does not exceed the rest
/// energy, or is so large that the speed rounds to c.
pub fn speed_from_energy(total_energy: f64, rest_mass: f64) -> Option<f64> {
    let rest_energy = rest_mass * SPEED_OF_LIGHT_SQ;
    if !(total_energy.is_finite() && total_energy > rest_energy) {
        return None;
    }
    let ratio = rest_energy / total_energy;
    let speed = SPEED_OF_LIGHT * (1.0 - ratio * ratio).sqrt();
    (speed < SPEED_OF_LIGHT).then_some(speed)
}

/// Aggregate energy statistics computed from the bunch at one instant.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BunchDiagnostics {
    pub mean_energy: f64,
    /// Population standard deviation of total energy.
    pub energy_spread: f64,
    pub particle_count: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ParticleBunch {
    pub name: String,
    pub particles: Vec<Particle>,
    pub rest_mass: f64,
    pub charge: f64,
    /// Position spread the bunch was drawn with; zero for hand-built bunches.
    pub position_spread: f64,
}

impl ParticleBunch {
    /// Draw a bunch from `config`.
    pub fn generate(config: &BunchConfig) -> SimResult<Self> {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::generate_with_rng(config, &mut rng)
    }

    pub fn generate_with_rng<R: Rng + ?Sized>(
        config: &BunchConfig,
        rng: &mut R,
    ) -> SimResult<Self> {
        config.validate()?;
        let particles = create_list_of_particles(config, rng)?;
        Ok(Self {
            name: config.name.clone(),
            particles,
            rest_mass: config.rest_mass,
            charge: config.charge,
            position_spread: config.position_spread,
        })
    }

    /// Wrap explicitly constructed particles. Rest mass and charge are taken
    /// from the first particle.
    pub fn from_particles(name: impl Into<String>, particles: Vec<Particle>) -> SimResult<Self> {
        let first = particles
            .first()
            .ok_or_else(|| SimError::config("bunch must contain at least one particle"))?;
        let (rest_mass, charge) = (first.rest_mass, first.charge);
        Ok(Self {
            name: name.into(),
            particles,
            rest_mass,
            charge,
            position_spread: 0.0,
        })
    }

    pub fn with_position_spread(mut self, spread: f64) -> Self {
        self.position_spread = spread;
        self
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    fn mean_of<F>(&self, f: F) -> DVec3
    where
        F: Fn(&Particle) -> DVec3,
    {
        if self.particles.is_empty() {
            return DVec3::zero();
        }
        let sum = self
            .particles
            .iter()
            .fold(DVec3::zero(), |acc, p| acc + f(p));
        sum / self.particles.len() as f64
    }

    pub fn mean_position(&self) -> DVec3 {
        self.mean_of(|p| p.position)
    }

    pub fn mean_velocity(&self) -> DVec3 {
        self.mean_of(|p| p.velocity)
    }

    pub fn mean_acceleration(&self) -> DVec3 {
        self.mean_of(|p| p.acceleration)
    }

    pub fn mean_momentum(&self) -> DVec3 {
        self.mean_of(|p| p.momentum())
    }

    pub fn mean_energy(&self) -> f64 {
        if self.particles.is_empty() {
            return 0.0;
        }
        self.particles.iter().map(Particle::total_energy).sum::<f64>()
            / self.particles.len() as f64
    }

    pub fn energy_spread(&self) -> f64 {
        self.diagnostics().energy_spread
    }

    /// Recompute mean energy and spread from the current particle states.
    pub fn diagnostics(&self) -> BunchDiagnostics {
        let n = self.particles.len();
        if n == 0 {
            return BunchDiagnostics {
                mean_energy: 0.0,
                energy_spread: 0.0,
                particle_count: 0,
            };
        }
        let energies: Vec<f64> = self.particles.iter().map(Particle::total_energy).collect();
        let mean = energies.iter().sum::<f64>() / n as f64;
        let variance = energies.iter().map(|e| (e - mean) * (e - mean)).sum::<f64>() / n as f64;
        BunchDiagnostics {
            mean_energy: mean,
            energy_spread: variance.sqrt(),
            particle_count: n,
        }
    }

    pub fn total_momentum(&self) -> DVec3 {
        self.particles
            .iter()
            .fold(DVec3::zero(), |acc, p| acc + p.momentum())
    }

    /// Σ r × p about the origin.
    pub fn total_angular_momentum(&self) -> DVec3 {
        self.particles
            .iter()
            .fold(DVec3::zero(), |acc, p| acc + p.angular_momentum())
    }

    pub fn total_kinetic_energy(&self) -> f64 {
        self.particles.iter().map(Particle::kinetic_energy).sum()
    }
}

impl fmt::Display for ParticleBunch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let diag = self.diagnostics();
        write!(
            f,
            "Name of Bunch: {}, Particles: {}, Spread of Bunch: {:e}, Mean Energy of Bunch: {:e}",
            self.name, diag.particle_count, diag.energy_spread, diag.mean_energy
        )
    }
}

/// Draw `particle_count` particles: positions from an independent normal per
/// axis, speeds from a normal draw of total energy, velocity along +x.
fn create_list_of_particles<R: Rng + ?Sized>(
    config: &BunchConfig,
    rng: &mut R,
) -> SimResult<Vec<Particle>> {
    let mean = array_vec(config.position_mean);
    let position_dist = |m: f64| {
        Normal::new(m, config.position_spread)
            .map_err(|e| SimError::config(format!("position distribution: {e}")))
    };
    let (px, py, pz) = (
        position_dist(mean.x)?,
        position_dist(mean.y)?,
        position_dist(mean.z)?,
    );
    let energy = Normal::new(config.energy_mean, config.energy_spread)
        .map_err(|e| SimError::config(format!("energy distribution: {e}")))?;

    let mut particles = Vec::with_capacity(config.particle_count);
    for i in 0..config.particle_count {
        let position = DVec3::new(px.sample(rng), py.sample(rng), pz.sample(rng));
        let speed = sample_speed(config, &energy, rng)?;
        particles.push(Particle::new(
            format!("{} {}", config.name, i + 1),
            position,
            DVec3::new(speed, 0.0, 0.0),
            config.rest_mass,
            config.charge,
        ));
    }
    Ok(particles)
}

fn sample_speed<R: Rng + ?Sized>(
    config: &BunchConfig,
    energy: &Normal<f64>,
    rng: &mut R,
) -> SimResult<f64> {
    for attempt in 0..MAX_ENERGY_RESAMPLES {
        let drawn = energy.sample(rng);
        if let Some(speed) = speed_from_energy(drawn, config.rest_mass) {
            if attempt > 0 {
                log::warn!(
                    "bunch '{}': re-sampled energy {} times to stay above rest energy",
                    config.name,
                    attempt
                );
            }
            return Ok(speed);
        }
    }
    Err(SimError::DegenerateSampling {
        attempts: MAX_ENERGY_RESAMPLES,
        mean: config.energy_mean,
        rest_energy: config.rest_energy(),
    })
}

// particle/types.rs
// The Particle struct and its derived relativistic quantities

use std::fmt;

use serde::{Deserialize, Serialize};
use ultraviolet::DVec3;

use crate::units::{SPEED_OF_LIGHT, SPEED_OF_LIGHT_SQ};

/// A charged point mass.
///
/// Only position, velocity and acceleration are state; every energy and
/// momentum figure is derived on demand from them and the rest mass.
#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    pub name: String,
    pub position: DVec3,
    pub velocity: DVec3,
    pub acceleration: DVec3,
    /// Rest mass (kg).
    pub rest_mass: f64,
    /// Charge (C); the sign is the polarity.
    pub charge: f64,
}

impl Particle {
    pub fn new(
        name: impl Into<String>,
        position: DVec3,
        velocity: DVec3,
        rest_mass: f64,
        charge: f64,
    ) -> Self {
        Self {
            name: name.into(),
            position,
            velocity,
            acceleration: DVec3::zero(),
            rest_mass,
            charge,
        }
    }

    pub fn with_acceleration(mut self, acceleration: DVec3) -> Self {
        self.acceleration = acceleration;
        self
    }

    /// Zero-charge, zero-mass test particle used to sample fields at a point.
    pub fn probe(position: DVec3) -> Self {
        Self::new("Probe", position, DVec3::zero(), 0.0, 0.0)
    }

    /// Velocity as a fraction of c.
    pub fn beta(&self) -> DVec3 {
        self.velocity / SPEED_OF_LIGHT
    }

    /// γ = 1/√|1 − β²|.
    ///
    /// The absolute value keeps the factor finite when a too-large timestep
    /// has pushed |β| past one; such values are not physical. Use
    /// [`Particle::checked_lorentz_factor`] or [`Particle::is_subluminal`]
    /// where validity matters.
    pub fn lorentz_factor(&self) -> f64 {
        1.0 / (1.0 - self.beta().mag_sq()).abs().sqrt()
    }

    pub fn checked_lorentz_factor(&self) -> Option<f64> {
        let one_minus_beta_sq = 1.0 - self.beta().mag_sq();
        (one_minus_beta_sq > 0.0).then(|| 1.0 / one_minus_beta_sq.sqrt())
    }

    pub fn is_subluminal(&self) -> bool {
        self.velocity.mag() < SPEED_OF_LIGHT
    }

    /// γ·m₀, the inertia used by the Lorentz force law.
    pub fn relativistic_mass(&self) -> f64 {
        self.lorentz_factor() * self.rest_mass
    }

    /// p = γ·m₀·v
    pub fn momentum(&self) -> DVec3 {
        self.velocity * self.relativistic_mass()
    }

    pub fn rest_energy(&self) -> f64 {
        self.rest_mass * SPEED_OF_LIGHT_SQ
    }

    /// E = √(E₀² + (|p|c)²)
    pub fn total_energy(&self) -> f64 {
        let rest = self.rest_energy();
        let pc = self.momentum().mag() * SPEED_OF_LIGHT;
        (rest * rest + pc * pc).sqrt()
    }

    pub fn kinetic_energy(&self) -> f64 {
        self.total_energy() - self.rest_energy()
    }

    /// L = r × p about the origin.
    pub fn angular_momentum(&self) -> DVec3 {
        self.position.cross(self.momentum())
    }
}

impl fmt::Display for Particle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Particle: {}, Rest Mass: {:12.3e}, Position: {:?}, Velocity: {:?}, \
             Acceleration: {:?}, Charge: {:12.3e}",
            self.name,
            self.rest_mass,
            vec_array(self.position),
            vec_array(self.velocity),
            vec_array(self.acceleration),
            self.charge
        )
    }
}

pub fn vec_array(v: DVec3) -> [f64; 3] {
    [v.x, v.y, v.z]
}

pub fn array_vec(a: [f64; 3]) -> DVec3 {
    DVec3::new(a[0], a[1], a[2])
}

/// Plain-data copy of a particle's state, used in recorded histories.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParticleSnapshot {
    pub name: String,
    pub position: [f64; 3],
    pub velocity: [f64; 3],
    pub acceleration: [f64; 3],
    pub rest_mass: f64,
    pub charge: f64,
}

impl From<&Particle> for ParticleSnapshot {
    fn from(p: &Particle) -> Self {
        Self {
            name: p.name.clone(),
            position: vec_array(p.position),
            velocity: vec_array(p.velocity),
            acceleration: vec_array(p.acceleration),
            rest_mass: p.rest_mass,
            charge: p.charge,
        }
    }
}

impl From<&ParticleSnapshot> for Particle {
    fn from(s: &ParticleSnapshot) -> Self {
        Particle::new(
            s.name.clone(),
            array_vec(s.position),
            array_vec(s.velocity),
            s.rest_mass,
            s.charge,
        )
        .with_acceleration(array_vec(s.acceleration))
    }
}

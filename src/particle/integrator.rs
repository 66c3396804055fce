// particle/integrator.rs
// First-order update rules for advancing a particle by one timestep

use serde::{Deserialize, Serialize};

use super::types::Particle;

/// Selects the order in which position and velocity are advanced.
///
/// Neither rule touches `acceleration`; it must already hold the
/// force-derived value for the step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Integrator {
    /// Velocity from acceleration first, then position from the new velocity.
    #[default]
    EulerCromer,
    /// Position from the old velocity first, then velocity.
    EulerForward,
}

impl Particle {
    pub fn update(&mut self, dt: f64, integrator: Integrator) {
        match integrator {
            Integrator::EulerCromer => self.update_cromer(dt),
            Integrator::EulerForward => self.update_forward(dt),
        }
    }

    pub fn update_cromer(&mut self, dt: f64) {
        self.velocity += self.acceleration * dt;
        self.position += self.velocity * dt;
    }

    pub fn update_forward(&mut self, dt: f64) {
        self.position += self.velocity * dt;
        self.velocity += self.acceleration * dt;
    }
}

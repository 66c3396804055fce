// field/mod.rs
// Field sources and the aggregator that sums them into forces

use std::ops::Add;

use ultraviolet::DVec3;

use crate::particle::Particle;

mod aggregator;
mod bounds;
mod external;
mod point;

pub use aggregator::*;
pub use bounds::*;
pub use external::*;
pub use point::*;

/// An (E, B) pair at one point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EmField {
    pub electric: DVec3,
    pub magnetic: DVec3,
}

impl EmField {
    pub fn zero() -> Self {
        Self {
            electric: DVec3::zero(),
            magnetic: DVec3::zero(),
        }
    }

    pub fn electric(electric: DVec3) -> Self {
        Self {
            electric,
            magnetic: DVec3::zero(),
        }
    }

    pub fn magnetic(magnetic: DVec3) -> Self {
        Self {
            electric: DVec3::zero(),
            magnetic,
        }
    }
}

impl Add for EmField {
    type Output = EmField;

    fn add(self, rhs: EmField) -> EmField {
        EmField {
            electric: self.electric + rhs.electric,
            magnetic: self.magnetic + rhs.magnetic,
        }
    }
}

/// Bunch-level quantities a field may depend on, computed once per pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldEnv {
    pub mean_momentum: DVec3,
}

impl Default for FieldEnv {
    fn default() -> Self {
        Self {
            mean_momentum: DVec3::zero(),
        }
    }
}

/// Anything that contributes (E, B) at a particle's position.
pub trait FieldSource {
    fn field_at(&self, time: f64, affected: &Particle, env: &FieldEnv) -> EmField;
}

#[cfg(test)]
mod tests;

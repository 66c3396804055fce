// field/bounds.rs
// Axis-aligned region in which an external field is active

use std::fmt;

use serde::{Deserialize, Serialize};
use ultraviolet::DVec3;

use crate::error::{SimError, SimResult};
use crate::particle::Particle;

/// Per-axis `[min, max]` extents. Defaults to all of space.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldBounds {
    pub x: [f64; 2],
    pub y: [f64; 2],
    pub z: [f64; 2],
}

impl Default for FieldBounds {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl FieldBounds {
    pub fn unbounded() -> Self {
        let all = [f64::NEG_INFINITY, f64::INFINITY];
        Self { x: all, y: all, z: all }
    }

    pub fn new(x: [f64; 2], y: [f64; 2], z: [f64; 2]) -> SimResult<Self> {
        let bounds = Self { x, y, z };
        for (axis, [min, max]) in ["x", "y", "z"].iter().zip(bounds.axes()) {
            if min.is_nan() || max.is_nan() || min > max {
                return Err(SimError::config(format!(
                    "field bounds on {axis} must satisfy min <= max, got [{min}, {max}]"
                )));
            }
        }
        Ok(bounds)
    }

    pub fn from_axes(axes: [[f64; 2]; 3]) -> SimResult<Self> {
        Self::new(axes[0], axes[1], axes[2])
    }

    pub fn axes(&self) -> [[f64; 2]; 3] {
        [self.x, self.y, self.z]
    }

    /// Strictly inside on every axis.
    pub fn contains(&self, position: DVec3) -> bool {
        let inside = |[min, max]: [f64; 2], v: f64| min < v && v < max;
        inside(self.x, position.x) && inside(self.y, position.y) && inside(self.z, position.z)
    }

    pub fn contains_x(&self, x: f64) -> bool {
        self.x[0] < x && x < self.x[1]
    }

    pub fn is_particle_in_field(&self, particle: &Particle) -> bool {
        self.contains(particle.position)
    }
}

impl fmt::Display for FieldBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.axes())
    }
}

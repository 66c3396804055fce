// simulation/grid.rs
// Regular vertex grid over a cuboid for integrating EM field energy

use serde::{Deserialize, Serialize};
use ultraviolet::DVec3;

use crate::config::INTEGRATION_EXTENT_SPREADS;
use crate::error::{SimError, SimResult};
use crate::field::{EmField, EmFieldAggregator};
use crate::particle::{array_vec, Particle, ParticleBunch};
use crate::profile_scope;
use crate::units::{VACUUM_PERMEABILITY, VACUUM_PERMITTIVITY};

/// Closed axis-aligned box `[min, max]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct IntegrationVolume {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

impl IntegrationVolume {
    pub fn new(min: [f64; 3], max: [f64; 3]) -> SimResult<Self> {
        let volume = Self { min, max };
        volume.validate()?;
        Ok(volume)
    }

    /// The cube `[0, 10·spread]³`.
    pub fn from_position_spread(spread: f64) -> SimResult<Self> {
        let edge = INTEGRATION_EXTENT_SPREADS * spread;
        Self::new([0.0; 3], [edge; 3])
    }

    pub fn validate(&self) -> SimResult<()> {
        for axis in 0..3 {
            let (min, max) = (self.min[axis], self.max[axis]);
            if !(min.is_finite() && max.is_finite() && min < max) {
                return Err(SimError::config(format!(
                    "integration volume is degenerate on axis {axis}: [{min}, {max}]"
                )));
            }
        }
        Ok(())
    }

    /// Inclusive on every face.
    pub fn contains(&self, position: DVec3) -> bool {
        let p = [position.x, position.y, position.z];
        (0..3).all(|axis| self.min[axis] <= p[axis] && p[axis] <= self.max[axis])
    }

    pub fn extent(&self) -> DVec3 {
        array_vec(self.max) - array_vec(self.min)
    }
}

/// u = ε₀|E|²/2 + μ₀|B|²/2
pub fn energy_density(field: &EmField) -> f64 {
    0.5 * VACUUM_PERMITTIVITY * field.electric.mag_sq() + 0.5 * VACUUM_PERMEABILITY * field.magnetic.mag_sq()
}

/// Energy densities at the `(n+1)³` vertices of an `n³`-cell grid.
///
/// Vertex positions are fixed when the grid is built; sampling overwrites
/// every density in place.
#[derive(Clone, Debug, PartialEq)]
pub struct EnergyGrid {
    volume: IntegrationVolume,
    resolution: usize,
    spacing: DVec3,
    vertices: Vec<DVec3>,
    densities: Vec<f64>,
}

impl EnergyGrid {
    pub fn new(volume: IntegrationVolume, resolution: usize) -> SimResult<Self> {
        volume.validate()?;
        if resolution == 0 {
            return Err(SimError::config("space resolution must be at least 1"));
        }
        let spacing = volume.extent() / resolution as f64;
        let origin = array_vec(volume.min);
        let n = resolution + 1;
        let mut vertices = Vec::with_capacity(n * n * n);
        for i in 0..n {
            for j in 0..n {
                for k in 0..n {
                    vertices.push(
                        origin
                            + DVec3::new(
                                i as f64 * spacing.x,
                                j as f64 * spacing.y,
                                k as f64 * spacing.z,
                            ),
                    );
                }
            }
        }
        let densities = vec![0.0; vertices.len()];
        Ok(Self {
            volume,
            resolution,
            spacing,
            vertices,
            densities,
        })
    }

    pub fn volume(&self) -> &IntegrationVolume {
        &self.volume
    }

    pub fn resolution(&self) -> usize {
        self.resolution
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    fn index(&self, i: usize, j: usize, k: usize) -> usize {
        let n = self.resolution + 1;
        (i * n + j) * n + k
    }

    pub fn vertex(&self, i: usize, j: usize, k: usize) -> DVec3 {
        self.vertices[self.index(i, j, k)]
    }

    pub fn density(&self, i: usize, j: usize, k: usize) -> f64 {
        self.densities[self.index(i, j, k)]
    }

    pub fn cell_volume(&self) -> f64 {
        self.spacing.x * self.spacing.y * self.spacing.z
    }

    /// Overwrite every vertex density with `f(vertex)`.
    pub fn fill_with<F>(&mut self, mut f: F)
    where
        F: FnMut(DVec3) -> f64,
    {
        for (density, vertex) in self.densities.iter_mut().zip(&self.vertices) {
            *density = f(*vertex);
        }
    }

    /// Sample the field energy density of `bunch` plus the aggregator's
    /// external fields at every vertex, using a probe particle.
    pub fn sample(&mut self, aggregator: &EmFieldAggregator, bunch: &ParticleBunch, time: f64) {
        profile_scope!("energy_grid_sample");
        self.fill_with(|vertex| {
            let probe = Particle::probe(vertex);
            energy_density(&aggregator.sum_of_em_fields(bunch, &probe, time))
        });
    }

    /// Σ over cells of (mean of the 8 corner densities) × cell volume.
    pub fn integrate(&self) -> f64 {
        profile_scope!("energy_grid_integrate");
        let n = self.resolution;
        let mut total = 0.0;
        for i in 0..n {
            for j in 0..n {
                for k in 0..n {
                    let mut corners = 0.0;
                    for (di, dj, dk) in CORNERS {
                        corners += self.density(i + di, j + dj, k + dk);
                    }
                    total += corners / 8.0;
                }
            }
        }
        total * self.cell_volume()
    }

    /// Sample then integrate.
    pub fn field_energy(&mut self, aggregator: &EmFieldAggregator, bunch: &ParticleBunch, time: f64) -> f64 {
        self.sample(aggregator, bunch, time);
        self.integrate()
    }
}

const CORNERS: [(usize, usize, usize); 8] = [
    (0, 0, 0),
    (0, 0, 1),
    (0, 1, 0),
    (0, 1, 1),
    (1, 0, 0),
    (1, 0, 1),
    (1, 1, 0),
    (1, 1, 1),
];

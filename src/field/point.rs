// field/point.rs
// Field of a single moving charge, evaluated at another particle

use std::fmt;

use ultraviolet::DVec3;

use super::{EmField, FieldEnv, FieldSource};
use crate::particle::Particle;
use crate::units::{BIOT_SAVART_CONSTANT, COULOMB_CONSTANT};

/// Inverse-square E and B of `source`, borrowed for one evaluation pass.
#[derive(Clone, Copy, Debug)]
pub struct PointField<'a> {
    pub source: &'a Particle,
}

impl<'a> PointField<'a> {
    pub fn new(source: &'a Particle) -> Self {
        Self { source }
    }

    /// `affected.position − source.position` and its length, `None` when
    /// the two coincide.
    fn displacement(&self, affected: &Particle) -> Option<(DVec3, f64)> {
        let d = affected.position - self.source.position;
        let r = d.mag();
        (r > 0.0).then_some((d, r))
    }

    /// E = k_e · q · d / |d|³
    pub fn electric_at(&self, affected: &Particle) -> Option<DVec3> {
        let (d, r) = self.displacement(affected)?;
        Some(d * (COULOMB_CONSTANT * self.source.charge / (r * r * r)))
    }

    /// B = μ₀/4π · q · (v × d) / |d|³
    pub fn magnetic_at(&self, affected: &Particle) -> Option<DVec3> {
        let (d, r) = self.displacement(affected)?;
        Some(self.source.velocity.cross(d) * (BIOT_SAVART_CONSTANT * self.source.charge / (r * r * r)))
    }
}

impl FieldSource for PointField<'_> {
    fn field_at(&self, _time: f64, affected: &Particle, _env: &FieldEnv) -> EmField {
        match (self.electric_at(affected), self.magnetic_at(affected)) {
            (Some(electric), Some(magnetic)) => EmField { electric, magnetic },
            _ => {
                log::trace!(
                    "skipping point field of '{}': coincides with '{}'",
                    self.source.name,
                    affected.name
                );
                EmField::zero()
            }
        }
    }
}

impl fmt::Display for PointField<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Point Field: {}, Source Particle of Field: {}", self.source.name, self.source)
    }
}

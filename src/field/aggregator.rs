// field/aggregator.rs
// Superposition of external and inter-particle fields, and the Lorentz
// force law that turns them into accelerations

use std::fmt;

use ultraviolet::DVec3;

use super::external::{ExternalField, FieldKind};
use super::point::PointField;
use super::{EmField, FieldEnv, FieldSource};
use crate::error::{SimError, SimResult};
use crate::particle::{Particle, ParticleBunch};
use crate::profile_scope;

/// External electric and magnetic fields acting on one bunch, whose
/// particles also act on each other as point sources.
///
/// The bunch itself is passed to every call rather than stored, so the
/// drivers can keep mutating it between evaluations.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EmFieldAggregator {
    pub name: String,
    pub electric_fields: Vec<ExternalField>,
    pub magnetic_fields: Vec<ExternalField>,
}

impl EmFieldAggregator {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_fields(
        name: impl Into<String>,
        electric_fields: Vec<ExternalField>,
        magnetic_fields: Vec<ExternalField>,
    ) -> SimResult<Self> {
        let mut aggregator = Self::new(name);
        for field in electric_fields {
            aggregator.add_electric_field(field)?;
        }
        for field in magnetic_fields {
            aggregator.add_magnetic_field(field)?;
        }
        Ok(aggregator)
    }

    pub fn add_electric_field(&mut self, field: impl Into<ExternalField>) -> SimResult<()> {
        let field = field.into();
        if field.kind() != FieldKind::Electric {
            return Err(SimError::config(format!(
                "'{}' is not an electric field",
                field.name()
            )));
        }
        self.electric_fields.push(field);
        Ok(())
    }

    pub fn add_magnetic_field(&mut self, field: impl Into<ExternalField>) -> SimResult<()> {
        let field = field.into();
        if field.kind() != FieldKind::Magnetic {
            return Err(SimError::config(format!(
                "'{}' is not a magnetic field",
                field.name()
            )));
        }
        self.magnetic_fields.push(field);
        Ok(())
    }

    pub fn has_external_fields(&self) -> bool {
        !(self.electric_fields.is_empty() && self.magnetic_fields.is_empty())
    }

    pub fn electric_field(&self, index: usize) -> SimResult<&ExternalField> {
        self.electric_fields
            .get(index)
            .ok_or_else(|| SimError::UnknownField(format!("electric field #{index}")))
    }

    pub fn electric_field_mut(&mut self, index: usize) -> SimResult<&mut ExternalField> {
        self.electric_fields
            .get_mut(index)
            .ok_or_else(|| SimError::UnknownField(format!("electric field #{index}")))
    }

    pub fn field_env(bunch: &ParticleBunch) -> FieldEnv {
        FieldEnv {
            mean_momentum: bunch.mean_momentum(),
        }
    }

    /// Total (E, B) at `affected`: every external field plus the point
    /// field of every bunch particle other than `affected` itself.
    ///
    /// `affected` need not belong to the bunch; a probe placed anywhere in
    /// space sees all of the bunch's point fields.
    pub fn sum_of_em_fields(&self, bunch: &ParticleBunch, affected: &Particle, time: f64) -> EmField {
        self.sum_with_env(bunch, affected, time, &Self::field_env(bunch))
    }

    fn sum_with_env(
        &self,
        bunch: &ParticleBunch,
        affected: &Particle,
        time: f64,
        env: &FieldEnv,
    ) -> EmField {
        let external = self
            .electric_fields
            .iter()
            .chain(&self.magnetic_fields)
            .fold(EmField::zero(), |acc, field| {
                acc + field.field_at(time, affected, env)
            });
        bunch
            .particles
            .iter()
            .filter(|source| !std::ptr::eq(*source, affected))
            .fold(external, |acc, source| {
                acc + PointField::new(source).field_at(time, affected, env)
            })
    }

    /// Assign the Lorentz acceleration to every particle in `bunch`.
    ///
    /// All fields are evaluated against the current state before any
    /// particle's acceleration is overwritten.
    pub fn give_acceleration(&self, bunch: &mut ParticleBunch, time: f64) {
        profile_scope!("give_acceleration");
        let env = Self::field_env(bunch);
        let accelerations: Vec<DVec3> = bunch
            .particles
            .iter()
            .map(|p| lorentz_acceleration(p, &self.sum_with_env(bunch, p, time, &env)))
            .collect();
        for (particle, acceleration) in bunch.particles.iter_mut().zip(accelerations) {
            particle.acceleration = acceleration;
        }
    }
}

/// a = q(E + v × B) / (γ·m₀)
pub fn lorentz_acceleration(particle: &Particle, field: &EmField) -> DVec3 {
    let force = field.electric * particle.charge
        + particle.velocity.cross(field.magnetic) * particle.charge;
    force / particle.relativistic_mass()
}

impl fmt::Display for EmFieldAggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<String> = self
            .electric_fields
            .iter()
            .chain(&self.magnetic_fields)
            .map(ToString::to_string)
            .collect();
        write!(
            f,
            "EM Field Collection: {}, Constituent Fields: [{}]",
            self.name,
            fields.join("; ")
        )
    }
}

// field/external.rs
// Externally imposed fields: bounded cosine oscillation and the
// radius-keeping synchrotron magnet

use std::f64::consts::TAU;
use std::fmt;

use serde::{Deserialize, Serialize};
use ultraviolet::DVec3;

use super::bounds::FieldBounds;
use super::{EmField, FieldEnv, FieldSource};
use crate::error::{SimError, SimResult};
use crate::particle::{vec_array, Particle, ParticleBunch};

/// Whether a field value is an E or a B contribution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    Electric,
    Magnetic,
}

impl FieldKind {
    fn label(self) -> &'static str {
        match self {
            FieldKind::Electric => "Electric",
            FieldKind::Magnetic => "Magnetic",
        }
    }
}

/// `cos(ω·t + 2π·φ) · amplitude`, switched off outside `bounds`.
#[derive(Clone, Debug, PartialEq)]
pub struct OscillatingField {
    pub name: String,
    pub kind: FieldKind,
    pub amplitude: DVec3,
    /// ω in rad/s.
    pub angular_frequency: f64,
    /// Phase shift as a fraction of one period.
    pub phase_shift: f64,
    pub bounds: FieldBounds,
}

impl OscillatingField {
    pub fn new(name: impl Into<String>, kind: FieldKind, amplitude: DVec3) -> Self {
        Self {
            name: name.into(),
            kind,
            amplitude,
            angular_frequency: 0.0,
            phase_shift: 0.0,
            bounds: FieldBounds::unbounded(),
        }
    }

    pub fn electric(name: impl Into<String>, amplitude: DVec3) -> Self {
        Self::new(name, FieldKind::Electric, amplitude)
    }

    pub fn magnetic(name: impl Into<String>, amplitude: DVec3) -> Self {
        Self::new(name, FieldKind::Magnetic, amplitude)
    }

    pub fn with_angular_frequency(mut self, angular_frequency: f64) -> Self {
        self.angular_frequency = angular_frequency;
        self
    }

    pub fn with_phase_shift(mut self, phase_shift: f64) -> Self {
        self.phase_shift = phase_shift;
        self
    }

    pub fn with_bounds(mut self, bounds: FieldBounds) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn is_particle_in_field(&self, particle: &Particle) -> bool {
        self.bounds.is_particle_in_field(particle)
    }

    pub fn oscillation(&self, time: f64) -> f64 {
        (self.angular_frequency * time + self.phase_shift * TAU).cos()
    }

    /// Field vector at `time` as seen by `affected`; exactly zero when the
    /// particle is outside the bounds on any axis.
    pub fn generate_field(&self, time: f64, affected: &Particle) -> DVec3 {
        if !self.is_particle_in_field(affected) {
            return DVec3::zero();
        }
        self.amplitude * self.oscillation(time)
    }

    fn describe(&self, f: &mut fmt::Formatter<'_>, title: &str) -> fmt::Result {
        let label = self.kind.label();
        write!(
            f,
            "{title}: {}, Angular Frequency: {}, Phase Shift: {}, \
             {label} Field Strength: {:?}, Dimensions of the {label} Field: {}",
            self.name,
            self.angular_frequency,
            self.phase_shift,
            vec_array(self.amplitude),
            self.bounds
        )
    }
}

impl fmt::Display for OscillatingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let title = format!("External {} Field", self.kind.label());
        self.describe(f, &title)
    }
}

/// Magnetic field rescaled so the bunch's mean-momentum orbit keeps the
/// radius it had when the field was built.
#[derive(Clone, Debug, PartialEq)]
pub struct SynchrotronField {
    pub field: OscillatingField,
    /// r = |p̄₀| / (|B₀|·q), fixed at construction.
    pub radius: f64,
    pub initial_field_norm: f64,
    pub bunch_charge: f64,
}

impl SynchrotronField {
    pub fn new(field: OscillatingField, bunch: &ParticleBunch) -> SimResult<Self> {
        if field.kind != FieldKind::Magnetic {
            return Err(SimError::config(format!(
                "synchrotron field '{}' must be magnetic",
                field.name
            )));
        }
        let initial_field_norm = field.amplitude.mag();
        let radius = bunch.mean_momentum().mag() / (initial_field_norm * bunch.charge);
        if !(radius.is_finite() && radius != 0.0) {
            return Err(SimError::config(format!(
                "synchrotron field '{}' needs a non-zero field, bunch charge and mean momentum",
                field.name
            )));
        }
        Ok(Self {
            field,
            radius,
            initial_field_norm,
            bunch_charge: bunch.charge,
        })
    }

    /// Factor that keeps the orbit radius fixed for the given mean momentum.
    pub fn constant_radius(&self, mean_momentum: DVec3) -> f64 {
        mean_momentum.mag() / (self.radius * self.bunch_charge * self.initial_field_norm)
    }

    pub fn generate_field(&self, time: f64, affected: &Particle, mean_momentum: DVec3) -> DVec3 {
        self.field.generate_field(time, affected) * self.constant_radius(mean_momentum)
    }
}

impl fmt::Display for SynchrotronField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.field.describe(f, "Magnetic Synchrotron Field")
    }
}

/// The externally imposed field variants an aggregator can hold.
#[derive(Clone, Debug, PartialEq)]
pub enum ExternalField {
    Oscillating(OscillatingField),
    Synchrotron(SynchrotronField),
}

impl ExternalField {
    pub fn oscillating(&self) -> &OscillatingField {
        match self {
            ExternalField::Oscillating(f) => f,
            ExternalField::Synchrotron(s) => &s.field,
        }
    }

    fn oscillating_mut(&mut self) -> &mut OscillatingField {
        match self {
            ExternalField::Oscillating(f) => f,
            ExternalField::Synchrotron(s) => &mut s.field,
        }
    }

    pub fn name(&self) -> &str {
        &self.oscillating().name
    }

    pub fn kind(&self) -> FieldKind {
        self.oscillating().kind
    }

    pub fn bounds(&self) -> &FieldBounds {
        &self.oscillating().bounds
    }

    pub fn phase_shift(&self) -> f64 {
        self.oscillating().phase_shift
    }

    pub fn set_phase_shift(&mut self, phase_shift: f64) {
        self.oscillating_mut().phase_shift = phase_shift;
    }

    /// Field vector (E or B depending on the kind) for `affected`.
    pub fn generate_field(&self, time: f64, affected: &Particle, env: &FieldEnv) -> DVec3 {
        match self {
            ExternalField::Oscillating(f) => f.generate_field(time, affected),
            ExternalField::Synchrotron(s) => s.generate_field(time, affected, env.mean_momentum),
        }
    }
}

impl From<OscillatingField> for ExternalField {
    fn from(field: OscillatingField) -> Self {
        ExternalField::Oscillating(field)
    }
}

impl From<SynchrotronField> for ExternalField {
    fn from(field: SynchrotronField) -> Self {
        ExternalField::Synchrotron(field)
    }
}

impl FieldSource for ExternalField {
    fn field_at(&self, time: f64, affected: &Particle, env: &FieldEnv) -> EmField {
        let value = self.generate_field(time, affected, env);
        match self.kind() {
            FieldKind::Electric => EmField::electric(value),
            FieldKind::Magnetic => EmField::magnetic(value),
        }
    }
}

impl fmt::Display for ExternalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExternalField::Oscillating(field) => fmt::Display::fmt(field, f),
            ExternalField::Synchrotron(field) => fmt::Display::fmt(field, f),
        }
    }
}

// init_config.rs
// Scenario files: TOML description of the bunch, fields and run settings

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use ultraviolet::DVec3;

use crate::config::SimConfig;
use crate::error::{SimError, SimResult};
use crate::field::{EmFieldAggregator, ExternalField, FieldBounds, FieldKind, OscillatingField, SynchrotronField};
use crate::io::SaveFormat;
use crate::particle::{array_vec, BunchConfig, Integrator, Particle, ParticleBunch};
use crate::simulation::{ConservationSettings, PhaseSweepSettings};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulationKind {
    Standard,
    PhaseSweep,
    Conservation,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationSection {
    pub kind: SimulationKind,
    #[serde(default)]
    pub integrator: Integrator,
    #[serde(flatten)]
    pub timing: SimConfig,
}

/// One explicitly placed particle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParticleConfig {
    pub name: String,
    pub position: [f64; 3],
    #[serde(default)]
    pub velocity: [f64; 3],
    #[serde(default)]
    pub acceleration: [f64; 3],
    pub rest_mass: f64,
    pub charge: f64,
}

impl ParticleConfig {
    pub fn to_particle(&self) -> Particle {
        Particle::new(
            self.name.clone(),
            array_vec(self.position),
            array_vec(self.velocity),
            self.rest_mass,
            self.charge,
        )
        .with_acceleration(array_vec(self.acceleration))
    }
}

/// An external field entry; the list it appears in decides E or B.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldConfig {
    #[serde(default)]
    pub name: Option<String>,
    pub amplitude: [f64; 3],
    #[serde(default)]
    pub angular_frequency: f64,
    /// Fraction of a period.
    #[serde(default)]
    pub phase_shift: f64,
    /// `[[xmin, xmax], [ymin, ymax], [zmin, zmax]]`; unbounded when absent.
    #[serde(default)]
    pub bounds: Option<[[f64; 2]; 3]>,
    /// Rescale with the bunch momentum to hold the orbit radius (magnetic only).
    #[serde(default)]
    pub synchrotron: bool,
}

impl FieldConfig {
    pub fn to_field(&self, kind: FieldKind, bunch: &ParticleBunch) -> SimResult<ExternalField> {
        let name = self.name.clone().unwrap_or_else(|| match kind {
            FieldKind::Electric => "Electric External Field".to_string(),
            FieldKind::Magnetic => "Magnetic External Field".to_string(),
        });
        let bounds = match self.bounds {
            Some(axes) => FieldBounds::from_axes(axes)?,
            None => FieldBounds::unbounded(),
        };
        let field = OscillatingField::new(name, kind, array_vec(self.amplitude))
            .with_angular_frequency(self.angular_frequency)
            .with_phase_shift(self.phase_shift)
            .with_bounds(bounds);
        if self.synchrotron {
            Ok(SynchrotronField::new(field, bunch)?.into())
        } else {
            Ok(field.into())
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Base name results are saved under; the format adds the extension.
    #[serde(default)]
    pub base: Option<PathBuf>,
    #[serde(default)]
    pub format: SaveFormat,
    /// Also write CSV files next to the results.
    #[serde(default)]
    pub csv: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    pub simulation: SimulationSection,
    #[serde(default)]
    pub bunch: Option<BunchConfig>,
    /// Explicit particles; when present they replace bunch generation.
    #[serde(default)]
    pub particles: Vec<ParticleConfig>,
    #[serde(default)]
    pub electric_fields: Vec<FieldConfig>,
    #[serde(default)]
    pub magnetic_fields: Vec<FieldConfig>,
    #[serde(default)]
    pub phase_sweep: Option<PhaseSweepSettings>,
    #[serde(default)]
    pub conservation: Option<ConservationSettings>,
    #[serde(default)]
    pub output: OutputConfig,
}

impl ScenarioConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> SimResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> SimResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Explicit particles if listed, otherwise a generated bunch.
    pub fn build_bunch(&self) -> SimResult<ParticleBunch> {
        if !self.particles.is_empty() {
            let name = self
                .bunch
                .as_ref()
                .map_or_else(|| "Particles".to_string(), |b| b.name.clone());
            let spread = self.bunch.as_ref().map_or(0.0, |b| b.position_spread);
            let particles = self.particles.iter().map(ParticleConfig::to_particle).collect();
            return Ok(ParticleBunch::from_particles(name, particles)?.with_position_spread(spread));
        }
        match &self.bunch {
            Some(config) => ParticleBunch::generate(config),
            None => Err(SimError::config(
                "scenario needs either a [bunch] section or [[particles]] entries",
            )),
        }
    }

    /// Synchrotron fields take their fixed radius from `bunch` as it is now.
    pub fn build_aggregator(&self, bunch: &ParticleBunch) -> SimResult<EmFieldAggregator> {
        let electric = self
            .electric_fields
            .iter()
            .map(|f| f.to_field(FieldKind::Electric, bunch))
            .collect::<SimResult<Vec<_>>>()?;
        let magnetic = self
            .magnetic_fields
            .iter()
            .map(|f| f.to_field(FieldKind::Magnetic, bunch))
            .collect::<SimResult<Vec<_>>>()?;
        EmFieldAggregator::with_fields(format!("{} fields", bunch.name), electric, magnetic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SWEEP: &str = r#"
[simulation]
kind = "phase_sweep"
duration = 1e-6
large_timestep = 1e-9
small_timestep = 1e-11

[bunch]
name = "protons"
particle_count = 4
rest_mass = 1.67262192369e-27
charge = 1.602176634e-19
position_spread = 1e-3
energy_mean = 1.5033e-10
energy_spread = 1e-22
seed = 3

[[electric_fields]]
name = "cavity"
amplitude = [1e5, 0.0, 0.0]
angular_frequency = 1e8
bounds = [[-0.01, 0.01], [-1.0, 1.0], [-1.0, 1.0]]

[[magnetic_fields]]
amplitude = [0.0, 0.0, 0.5]
synchrotron = true

[phase_sweep]
resolution = 8
fields = [0]

[output]
base = "out/sweep"
format = "json_gz"
"#;

    #[test]
    fn parses_full_scenario() {
        let cfg = ScenarioConfig::from_toml_str(SWEEP).unwrap();
        assert_eq!(cfg.simulation.kind, SimulationKind::PhaseSweep);
        assert_eq!(cfg.simulation.integrator, Integrator::EulerCromer);
        assert_eq!(cfg.simulation.timing.small_timestep, 1e-11);
        assert_eq!(cfg.phase_sweep.as_ref().unwrap().resolution, 8);
        assert_eq!(cfg.output.format, SaveFormat::JsonGz);
        assert!(cfg.magnetic_fields[0].synchrotron);
    }

    #[test]
    fn builds_bunch_and_fields() {
        let cfg = ScenarioConfig::from_toml_str(SWEEP).unwrap();
        let bunch = cfg.build_bunch().unwrap();
        assert_eq!(bunch.len(), 4);
        let aggregator = cfg.build_aggregator(&bunch).unwrap();
        assert_eq!(aggregator.electric_fields[0].name(), "cavity");
        assert!(matches!(aggregator.magnetic_fields[0], ExternalField::Synchrotron(_)));
        assert_eq!(aggregator.magnetic_fields[0].name(), "Magnetic External Field");
    }

    #[test]
    fn explicit_particles_replace_generation() {
        let cfg = ScenarioConfig::from_toml_str(
            r#"
[simulation]
kind = "conservation"
integrator = "euler_forward"
duration = 1.0
large_timestep = 1e-3
small_timestep = 1e-4

[[particles]]
name = "plus"
position = [0.005, 0.005, 0.005]
velocity = [0.0, 0.0, 14.0]
rest_mass = 1.67262192369e-27
charge = 1.602176634e-19

[[particles]]
name = "minus"
position = [0.004, 0.005, 0.005]
rest_mass = 1.67262192369e-27
charge = -1.602176634e-19

[conservation]
space_resolution = 4
volume = { min = [0.0, 0.0, 0.0], max = [0.01, 0.01, 0.01] }
"#,
        )
        .unwrap();
        assert_eq!(cfg.simulation.integrator, Integrator::EulerForward);
        let bunch = cfg.build_bunch().unwrap();
        assert_eq!(bunch.particles[1].name, "minus");
        assert_eq!(bunch.particles[1].velocity, DVec3::zero());
        assert_eq!(cfg.conservation.unwrap().space_resolution, 4);
    }

    #[test]
    fn missing_particle_source_is_a_config_error() {
        let cfg = ScenarioConfig::from_toml_str(
            "[simulation]\nkind = \"standard\"\nduration = 1.0\nlarge_timestep = 0.1\nsmall_timestep = 0.01\n",
        )
        .unwrap();
        assert!(matches!(cfg.build_bunch(), Err(SimError::Config(_))));
    }

    #[test]
    fn malformed_toml_is_reported() {
        assert!(matches!(
            ScenarioConfig::from_toml_str("[simulation\nkind = 3"),
            Err(SimError::Toml(_))
        ));
    }
}

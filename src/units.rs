//! Physical constants in SI units.
//!
//! Base units:
//! - Length: metre (m)
//! - Time: second (s)
//! - Charge: coulomb (C)
//! - Mass: kilogram (kg)

use std::f64::consts::PI;

/// Speed of light in vacuum (m/s).
pub const SPEED_OF_LIGHT: f64 = 299_792_458.0;
/// Vacuum permittivity ε₀ (F/m).
pub const VACUUM_PERMITTIVITY: f64 = 8.854_187_812_8e-12;
/// Vacuum permeability μ₀ (N/A²).
pub const VACUUM_PERMEABILITY: f64 = 1.256_637_062_12e-6;
/// Elementary charge (C).
pub const ELEMENTARY_CHARGE: f64 = 1.602_176_634e-19;
/// Proton rest mass (kg).
pub const PROTON_MASS: f64 = 1.672_621_923_69e-27;
/// Electron rest mass (kg).
pub const ELECTRON_MASS: f64 = 9.109_383_701_5e-31;

/// Coulomb's constant 1/(4πε₀) in N⋅m²/C².
pub const COULOMB_CONSTANT: f64 = 1.0 / (4.0 * PI * VACUUM_PERMITTIVITY);
/// Biot–Savart prefactor μ₀/(4π) in T⋅m/A.
pub const BIOT_SAVART_CONSTANT: f64 = VACUUM_PERMEABILITY / (4.0 * PI);

/// c² in m²/s².
pub const SPEED_OF_LIGHT_SQ: f64 = SPEED_OF_LIGHT * SPEED_OF_LIGHT;

// Tests for external fields, point fields and the aggregator

use super::*;
use crate::particle::{Particle, ParticleBunch};
use crate::units::{COULOMB_CONSTANT, PROTON_MASS};
use approx::assert_relative_eq;
use ultraviolet::DVec3;

fn source_particle() -> Particle {
    Particle::new(
        "test_Particle",
        DVec3::new(10.0, 100.0, 1000.0),
        DVec3::new(1e6, 1.5e6, 2e6),
        3.0,
        7.0,
    )
}

fn affected_particle() -> Particle {
    Particle::new(
        "test_Particle2",
        DVec3::new(4.0, 3.0, 2.0),
        DVec3::new(2.5e6, 3e6, 3.5e6),
        3.0,
        14.0,
    )
}

fn electric_test_field() -> OscillatingField {
    OscillatingField::electric("test_Electric Field", DVec3::new(4.0, 5.0, 6.0))
        .with_angular_frequency(10.0)
        .with_phase_shift(0.1)
        .with_bounds(FieldBounds::new([-4.0, 4.0], [8.0, 16.0], [-16.0, -8.0]).unwrap())
}

fn magnetic_test_field() -> OscillatingField {
    OscillatingField::magnetic("test_Magnetic Field", DVec3::new(7.0, 8.0, 9.0))
        .with_angular_frequency(15.0)
        .with_phase_shift(0.2)
        .with_bounds(FieldBounds::new([-5.0, 5.0], [6.0, 12.0], [-12.0, -6.0]).unwrap())
}

fn probe_in_magnetic_region() -> Particle {
    Particle::new(
        "test_Particle",
        DVec3::new(-3.5, 10.0, -7.0),
        DVec3::new(1e6, 1.5e6, 2e6),
        3.0,
        7.0,
    )
}

fn assert_vec_close(actual: DVec3, expected: [f64; 3], rel: f64) {
    assert_relative_eq!(actual.x, expected[0], max_relative = rel);
    assert_relative_eq!(actual.y, expected[1], max_relative = rel);
    assert_relative_eq!(actual.z, expected[2], max_relative = rel);
}

/// Two unit charges at rest-ish, the second moving along +x.
fn pair_bunch() -> ParticleBunch {
    let a = Particle::new("pair 1", DVec3::new(1.0, 2.0, 3.0), DVec3::zero(), PROTON_MASS, 1.0);
    let b = Particle::new(
        "pair 2",
        DVec3::new(4.0, 5.0, 6.0),
        DVec3::new(1000.0, 0.0, 0.0),
        PROTON_MASS,
        1.0,
    );
    ParticleBunch::from_particles("test_Bunch", vec![a, b]).unwrap()
}

#[cfg(test)]
mod external {
    use super::*;

    #[test]
    fn field_is_zero_outside_bounds() {
        let field = electric_test_field();
        let p = probe_in_magnetic_region();
        assert!(!field.is_particle_in_field(&p));
        assert_eq!(field.generate_field(1.0, &p), DVec3::zero());
    }

    #[test]
    fn field_oscillates_inside_bounds() {
        let field = magnetic_test_field();
        let p = probe_in_magnetic_region();
        assert!(field.is_particle_in_field(&p));
        // cos(15 + 0.4π)
        assert_vec_close(
            field.generate_field(1.0, &p),
            [-5.972_518_74, -6.825_735_71, -7.678_952_67],
            1e-6,
        );
    }

    #[test]
    fn amplitude_recovered_at_time_zero() {
        let field = OscillatingField::electric("e", DVec3::new(3.0, 4.0, 12.0)).with_angular_frequency(1e9);
        let value = field.generate_field(0.0, &Particle::probe(DVec3::zero()));
        assert_relative_eq!(value.mag(), 13.0);
    }

    #[test]
    fn half_period_phase_flips_sign() {
        let field = OscillatingField::electric("e", DVec3::new(1.0, 0.0, 0.0)).with_phase_shift(0.5);
        let value = field.generate_field(0.0, &Particle::probe(DVec3::zero()));
        assert_relative_eq!(value.x, -1.0);
    }

    #[test]
    fn field_kind_selects_the_component() {
        let p = Particle::probe(DVec3::zero());
        let env = FieldEnv::default();
        let e = ExternalField::from(OscillatingField::electric("e", DVec3::new(1.0, 0.0, 0.0)));
        let b = ExternalField::from(OscillatingField::magnetic("b", DVec3::new(0.0, 1.0, 0.0)));
        assert_eq!(e.field_at(0.0, &p, &env), EmField::electric(DVec3::new(1.0, 0.0, 0.0)));
        assert_eq!(b.field_at(0.0, &p, &env), EmField::magnetic(DVec3::new(0.0, 1.0, 0.0)));
    }

    #[test]
    fn phase_shift_can_be_changed_through_the_variant() {
        let mut field = ExternalField::from(electric_test_field());
        field.set_phase_shift(0.75);
        assert_eq!(field.phase_shift(), 0.75);
        assert_eq!(field.name(), "test_Electric Field");
    }

    #[test]
    fn descriptions_name_the_field() {
        assert!(electric_test_field()
            .to_string()
            .starts_with("External Electric Field: test_Electric Field"));
        assert!(magnetic_test_field()
            .to_string()
            .starts_with("External Magnetic Field: test_Magnetic Field"));
    }
}

#[cfg(test)]
mod synchrotron {
    use super::*;
    use crate::particle::BunchConfig;
    use crate::units::ELEMENTARY_CHARGE;

    fn bunch() -> ParticleBunch {
        let reference = Particle::new("r", DVec3::zero(), DVec3::new(1000.0, 0.0, 0.0), PROTON_MASS, 1.0);
        ParticleBunch::generate(&BunchConfig {
            name: "test_Particle Bunch".to_string(),
            particle_count: 3,
            rest_mass: PROTON_MASS,
            charge: ELEMENTARY_CHARGE,
            position_mean: [0.0; 3],
            position_spread: 1e-3,
            energy_mean: reference.total_energy(),
            energy_spread: 1e-22,
            seed: Some(17),
        })
        .unwrap()
    }

    fn field(bunch: &ParticleBunch) -> SynchrotronField {
        let base = OscillatingField::magnetic("test_Magnetic Synchrotron Field", DVec3::new(7.0, 8.0, 9.0))
            .with_angular_frequency(15.0)
            .with_phase_shift(0.2)
            .with_bounds(FieldBounds::new([-5.0, 5.0], [-6.0, 12.0], [-12.0, 6.0]).unwrap());
        SynchrotronField::new(base, bunch).unwrap()
    }

    #[test]
    fn multiplier_starts_at_one() {
        let bunch = bunch();
        let field = field(&bunch);
        assert_relative_eq!(field.constant_radius(bunch.mean_momentum()), 1.0, max_relative = 1e-12);
    }

    #[test]
    fn multiplier_tracks_mean_momentum() {
        let bunch = bunch();
        let field = field(&bunch);
        let doubled = bunch.mean_momentum() * 2.0;
        assert_relative_eq!(field.constant_radius(doubled), 2.0, max_relative = 1e-12);
    }

    #[test]
    fn initial_field_matches_plain_oscillation() {
        let bunch = bunch();
        let field = field(&bunch);
        let value = field.generate_field(1.0, &bunch.particles[0], bunch.mean_momentum());
        assert_vec_close(value, [-5.972_518_74, -6.825_735_71, -7.678_952_67], 1e-6);
    }

    #[test]
    fn radius_follows_momentum_over_charge_and_field() {
        let bunch = bunch();
        let field = field(&bunch);
        let expected = bunch.mean_momentum().mag() / (DVec3::new(7.0, 8.0, 9.0).mag() * ELEMENTARY_CHARGE);
        assert_relative_eq!(field.radius, expected);
    }

    #[test]
    fn electric_base_is_rejected() {
        let bunch = bunch();
        let base = OscillatingField::electric("e", DVec3::new(1.0, 0.0, 0.0));
        assert!(SynchrotronField::new(base, &bunch).is_err());
    }

    #[test]
    fn description_uses_synchrotron_title() {
        let bunch = bunch();
        assert!(ExternalField::from(field(&bunch))
            .to_string()
            .starts_with("Magnetic Synchrotron Field: test_Magnetic Synchrotron Field"));
    }
}

#[cfg(test)]
mod point {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn electric_point_field_matches_coulomb() {
        let source = source_particle();
        let field = PointField::new(&source);
        let value = field.electric_at(&affected_particle()).unwrap();
        assert_vec_close(value, [-374.412_747_41, -6053.006_083_19, -62_277.320_319_87], 1e-6);
    }

    #[test]
    fn magnetic_point_field_matches_biot_savart() {
        let source = source_particle();
        let field = PointField::new(&source);
        let value = field.magnetic_at(&affected_particle()).unwrap();
        assert_vec_close(value, [-9.046_954_08e-7, 6.845_968_32e-7, -6.109_992_01e-8], 1e-6);
    }

    #[test]
    fn zero_distance_is_excluded() {
        let source = source_particle();
        let field = PointField::new(&source);
        assert!(field.electric_at(&source).is_none());
        assert!(field.magnetic_at(&source).is_none());
        assert_eq!(
            field.field_at(0.0, &source, &FieldEnv::default()),
            EmField::zero()
        );
    }

    #[test]
    fn description_names_the_source() {
        let source = source_particle();
        assert!(PointField::new(&source)
            .to_string()
            .starts_with("Point Field: test_Particle"));
    }

    proptest! {
        #[test]
        fn magnitude_falls_off_as_inverse_square(
            dir in (-1.0..1.0_f64, -1.0..1.0_f64, -1.0..1.0_f64),
            d in 1e-3..1e3_f64,
        ) {
            let unit = DVec3::new(dir.0, dir.1, dir.2);
            prop_assume!(unit.mag() > 1e-3);
            let unit = unit / unit.mag();
            let source = Particle::new("s", DVec3::zero(), DVec3::new(0.0, 0.0, 5e5), 1.0, 3.0);
            let field = PointField::new(&source);
            let near = Particle::probe(unit * d);
            let far = Particle::probe(unit * (2.0 * d));
            let e_ratio = field.electric_at(&near).unwrap().mag() / field.electric_at(&far).unwrap().mag();
            prop_assert!((e_ratio - 4.0).abs() < 1e-9);
            let expected = COULOMB_CONSTANT * 3.0 / (d * d);
            let e_near = field.electric_at(&near).unwrap().mag();
            prop_assert!(((e_near - expected) / expected).abs() < 1e-9);
        }
    }
}

#[cfg(test)]
mod aggregator {
    use super::*;

    #[test]
    fn sum_excludes_the_affected_particle() {
        let bunch = pair_bunch();
        let aggregator = EmFieldAggregator::new("test_EM Field");
        let total = aggregator.sum_of_em_fields(&bunch, &bunch.particles[0], 1.0);
        assert_vec_close(total.electric, [-1.921_839_05e8; 3], 1e-6);
        assert_eq!(total.magnetic.x, 0.0);
        assert_relative_eq!(total.magnetic.y, 2.138_334_33e-6, max_relative = 1e-6);
        assert_relative_eq!(total.magnetic.z, -2.138_334_33e-6, max_relative = 1e-6);
    }

    #[test]
    fn acceleration_follows_lorentz_law() {
        let mut bunch = pair_bunch();
        let aggregator = EmFieldAggregator::new("test_EM Field");
        aggregator.give_acceleration(&mut bunch, 1.0);
        assert_vec_close(bunch.particles[0].acceleration, [-1.148_997_9e35; 3], 1e-3);
    }

    #[test]
    fn equal_particles_accelerate_apart_symmetrically() {
        let a = Particle::new("a", DVec3::new(-1.0, 0.0, 0.0), DVec3::zero(), PROTON_MASS, 1.0);
        let b = Particle::new("b", DVec3::new(1.0, 0.0, 0.0), DVec3::zero(), PROTON_MASS, 1.0);
        let mut bunch = ParticleBunch::from_particles("sym", vec![a, b]).unwrap();
        EmFieldAggregator::new("agg").give_acceleration(&mut bunch, 0.0);
        let (a0, a1) = (bunch.particles[0].acceleration, bunch.particles[1].acceleration);
        assert!(a0.x < 0.0);
        assert_eq!(a0, a1 * -1.0);
    }

    #[test]
    fn superposition_of_external_and_point_fields() {
        let particles = vec![
            Particle::new("p1", DVec3::new(0.0, 0.0, 0.0), DVec3::new(1e5, 0.0, 0.0), PROTON_MASS, 2.0),
            Particle::new("p2", DVec3::new(1.0, 0.5, 0.0), DVec3::new(0.0, 2e5, 0.0), PROTON_MASS, 2.0),
            Particle::new("p3", DVec3::new(-0.5, 1.0, 2.0), DVec3::new(0.0, 0.0, 3e5), PROTON_MASS, 2.0),
        ];
        let bunch = ParticleBunch::from_particles("trio", particles).unwrap();
        let e = OscillatingField::electric("e", DVec3::new(1e3, 0.0, 0.0)).with_angular_frequency(2.0);
        let b = OscillatingField::magnetic("b", DVec3::new(0.0, 0.0, 0.5));
        let aggregator = EmFieldAggregator::with_fields("agg", vec![e.clone().into()], vec![b.clone().into()]).unwrap();

        let affected = &bunch.particles[1];
        let t = 0.3;
        let total = aggregator.sum_of_em_fields(&bunch, affected, t);

        let mut electric = e.generate_field(t, affected);
        let mut magnetic = b.generate_field(t, affected);
        for source in [&bunch.particles[0], &bunch.particles[2]] {
            let point = PointField::new(source);
            electric += point.electric_at(affected).unwrap();
            magnetic += point.magnetic_at(affected).unwrap();
        }
        assert_vec_close(total.electric, [electric.x, electric.y, electric.z], 1e-12);
        assert_vec_close(total.magnetic, [magnetic.x, magnetic.y, magnetic.z], 1e-12);
    }

    #[test]
    fn single_particle_feels_only_external_fields() {
        let p = Particle::new("solo", DVec3::zero(), DVec3::zero(), PROTON_MASS, 1.0);
        let bunch = ParticleBunch::from_particles("solo", vec![p]).unwrap();
        let e = OscillatingField::electric("e", DVec3::new(0.0, 7.0, 0.0));
        let aggregator = EmFieldAggregator::with_fields("agg", vec![e.into()], Vec::new()).unwrap();
        let total = aggregator.sum_of_em_fields(&bunch, &bunch.particles[0], 0.0);
        assert_eq!(total, EmField::electric(DVec3::new(0.0, 7.0, 0.0)));
    }

    #[test]
    fn coincident_probe_matches_the_particle_it_sits_on() {
        let bunch = pair_bunch();
        let aggregator = EmFieldAggregator::new("agg");
        let probe = Particle::probe(bunch.particles[0].position);
        assert_eq!(
            aggregator.sum_of_em_fields(&bunch, &probe, 0.0),
            aggregator.sum_of_em_fields(&bunch, &bunch.particles[0], 0.0)
        );
    }

    #[test]
    fn magnetic_force_is_perpendicular_to_velocity() {
        let p = Particle::new("p", DVec3::zero(), DVec3::new(1e3, 0.0, 0.0), 1.0, 1.0);
        let a = lorentz_acceleration(&p, &EmField::magnetic(DVec3::new(0.0, 0.0, 1.0)));
        assert_relative_eq!(a.y, -1e3 / p.lorentz_factor());
        assert_eq!(a.x, 0.0);
    }

    #[test]
    fn field_kinds_are_checked_on_insert() {
        let mut aggregator = EmFieldAggregator::new("agg");
        let b = OscillatingField::magnetic("b", DVec3::new(0.0, 0.0, 1.0));
        assert!(aggregator.add_electric_field(b.clone()).is_err());
        assert!(aggregator.add_magnetic_field(b).is_ok());
        assert!(aggregator.has_external_fields());
        assert!(matches!(
            aggregator.electric_field(0),
            Err(crate::error::SimError::UnknownField(_))
        ));
    }

    #[test]
    fn description_lists_constituents() {
        let aggregator = EmFieldAggregator::with_fields(
            "test_EM Field",
            vec![electric_test_field().into()],
            Vec::new(),
        )
        .unwrap();
        let text = aggregator.to_string();
        assert!(text.starts_with("EM Field Collection: test_EM Field"));
        assert!(text.contains("External Electric Field: test_Electric Field"));
    }
}

use forager_lib::model::chemical::ChemicalField;
use forager_lib::model::config::ForagingConfig;
use proptest::prelude::*;

fn config(torus: bool) -> ForagingConfig {
    let mut config = ForagingConfig::default();
    config.field_size = [100, 100];
    config.chemokine_res = 5;
    config.conf.torus = [torus, torus];
    config
}

#[test]
fn test_advance_mass_bookkeeping() {
    // Each advance adds SECR per source and multiplies the total by DECAY.
    let mut field = ChemicalField::from_config(&config(true));
    let sources = [(20.0, 20.0), (80.0, 30.0), (50.0, 90.0)];
    let mut expected = 0.0;
    for _ in 0..25 {
        field.advance(&sources);
        expected = (expected + 3.0 * 5.0) * 0.99;
        assert!((field.total_mass() - expected).abs() < 1e-6);
    }
}

#[test]
fn test_gradient_monotone_from_single_source() {
    let mut field = ChemicalField::from_config(&config(false));
    for _ in 0..100 {
        field.advance(&[(50.0, 50.0)]);
    }
    let at_source = field.value_at_world(50.0, 50.0);
    let mid = field.value_at_world(70.0, 50.0);
    let far = field.value_at_world(95.0, 50.0);
    assert!(at_source > mid);
    assert!(mid > far);
    assert!(far >= 0.0);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// A decay pass never increases total mass.
    #[test]
    fn test_decay_mass_non_increasing(
        injections in prop::collection::vec(((0.0f64..100.0, 0.0f64..100.0), 0.0f64..10.0), 1..20),
        factor in 0.01f64..1.0
    ) {
        let mut field = ChemicalField::from_config(&config(true));
        for (pos, amount) in injections {
            field.inject(pos, amount);
        }
        let before = field.total_mass();
        field.decay(factor);
        prop_assert!(field.total_mass() <= before + 1e-9);
    }

    /// A diffusion pass conserves total mass on both topologies.
    #[test]
    fn test_diffuse_conserves_mass(
        injections in prop::collection::vec(((0.0f64..100.0, 0.0f64..100.0), 0.0f64..10.0), 1..20),
        rate in 0.0f64..0.25,
        torus in any::<bool>()
    ) {
        let mut field = ChemicalField::from_config(&config(torus));
        for (pos, amount) in injections {
            field.inject(pos, amount);
        }
        let before = field.total_mass();
        field.diffuse(rate);
        prop_assert!((field.total_mass() - before).abs() < 1e-9 * before.max(1.0));
    }
}

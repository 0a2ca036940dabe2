#![cfg(feature = "serde1")]

use mtgp::kernel::GridDiagnostics;
use mtgp::prelude::*;

#[test]
fn config_with_defaults_from_json() {
    let json = r#"{
        "tasks": [
            {"smoothness": "squared_exponential", "l_min": 0.1, "l_max": 5.0},
            {"smoothness": "matern52", "l_min": 0.5, "l_max": 2.0},
            {"smoothness": {"general_matern": 1.5}, "l_min": 0.5, "l_max": 2.0}
        ],
        "n_points": 50
    }"#;
    let config: KernelConfig = serde_json::from_str(json).unwrap();

    assert_eq!(config.n_tasks(), 3);
    assert_eq!(config.tasks[1].smoothness, Smoothness::Matern52);
    assert_eq!(config.tasks[2].smoothness, Smoothness::GeneralMatern(1.5));
    assert_eq!(config.tolerance, QuadTolerance::default());
    assert_eq!(config.n_threads, None);
    assert_eq!(config.max_quad_error, None);
    assert!(!config.self_scale);
    assert!(config.validate().is_ok());
}

#[test]
fn config_survives_yaml() {
    let config = KernelConfig::new(
        vec![
            TaskDescriptor::squared_exponential(0.1, 5.0),
            TaskDescriptor::new(Smoothness::GeneralMatern(2.25), 1.0, 3.0),
        ],
        20,
    )
    .with_n_threads(4)
    .with_max_quad_error(1E-6)
    .with_self_scale(true);

    let yaml = serde_yaml::to_string(&config).unwrap();
    let back: KernelConfig = serde_yaml::from_str(&yaml).unwrap();
    assert_eq!(config, back);
}

#[test]
fn diagnostics_serialize_by_field_name() {
    let diagnostics = GridDiagnostics {
        n_points: 8,
        n_unconverged: 1,
        max_abs_err: 1E-9,
        mean_abs_err: 2E-10,
    };
    let value = serde_json::to_value(diagnostics).unwrap();
    assert_eq!(value["n_unconverged"], 1);
    assert_eq!(value["n_points"], 8);
}

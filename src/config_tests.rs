use super::*;

#[test]
fn missing_config_file_yields_defaults() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let config = load_config_or_default(temp.path()).expect("load config");
    assert_eq!(config, SweepConfig::default());
    assert_eq!(config.model_runs, 54);
    assert_eq!(config.antenna_tag, "GSSI1500");
}

#[test]
fn partial_config_keeps_remaining_defaults() {
    let temp = tempfile::tempdir().expect("create temp dir");
    std::fs::write(
        temp.path().join("sweep.json"),
        r#"{"model_runs": 2, "simulator_command": "sh ./fake-sim.sh"}"#,
    )
    .expect("write config");

    let config = load_config_or_default(temp.path()).expect("load config");
    assert_eq!(config.model_runs, 2);
    assert_eq!(config.simulator_command, "sh ./fake-sim.sh");
    assert_eq!(config.plan_file, DEFAULT_PLAN_FILE);
    assert_eq!(config.domain_depth, DEFAULT_DOMAIN_DEPTH);
}

#[test]
fn written_config_loads_back() {
    let temp = tempfile::tempdir().expect("create temp dir");
    let base = temp.path().join("nested");
    let config = SweepConfig {
        antenna_label: "GSSI 2000".to_string(),
        ..SweepConfig::default()
    };
    write_config(&base, &config).expect("write config");
    let loaded = load_config_or_default(&base).expect("load config");
    assert_eq!(loaded, config);
}

#[test]
fn unknown_field_is_rejected() {
    let temp = tempfile::tempdir().expect("create temp dir");
    std::fs::write(temp.path().join("sweep.json"), r#"{"model_run": 2}"#).expect("write config");
    let err = load_config_or_default(temp.path()).expect_err("unknown field");
    assert!(err.to_string().contains("parse config"));
}

#[test]
fn validate_rejects_bad_values() {
    let cases = [
        SweepConfig {
            schema_version: 9,
            ..SweepConfig::default()
        },
        SweepConfig {
            model_runs: 0,
            ..SweepConfig::default()
        },
        SweepConfig {
            plan_file: "../plan.csv".to_string(),
            ..SweepConfig::default()
        },
        SweepConfig {
            summary_file: " ".to_string(),
            ..SweepConfig::default()
        },
        SweepConfig {
            simulator_command: "   ".to_string(),
            ..SweepConfig::default()
        },
        SweepConfig {
            merge_command: "python 'unterminated".to_string(),
            ..SweepConfig::default()
        },
        SweepConfig {
            visualization_extension: "a/b".to_string(),
            ..SweepConfig::default()
        },
    ];
    for config in cases {
        assert!(validate_config(&config).is_err(), "accepted {config:?}");
    }
    validate_config(&SweepConfig::default()).expect("defaults are valid");
}

#[test]
fn command_spec_splits_shell_words() {
    let spec = CommandSpec::parse("python -m gprMax", "simulator_command").expect("parse");
    assert_eq!(spec.program, "python");
    assert_eq!(spec.args, vec!["-m".to_string(), "gprMax".to_string()]);
    assert_eq!(
        spec.display_with(&["/tmp/a b.in".to_string(), "-n".to_string()]),
        "python -m gprMax '/tmp/a b.in' -n"
    );
}

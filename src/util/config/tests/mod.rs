use super::*;
use std::collections::HashMap;

fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name| vars.get(name).cloned()
}

/// Defaults match the solver's own defaults
#[test]
fn test_default_config() {
    let config = SolverConfig::default();
    assert_eq!(config.into_choice(), SolverChoice::recursive_default());
}

/// Omitted fields fall back to their defaults
#[test]
fn test_partial_file() {
    let config = SolverConfig::from_ron_str("(max_size: 12)").unwrap();
    assert_eq!(config.max_size, 12);
    assert_eq!(config.overflow_depth, SolverChoice::DEFAULT_OVERFLOW_DEPTH);
    assert!(config.caching);

    let config = SolverConfig::from_ron_str("(overflow_policy: PartialGuidance)").unwrap();
    assert_eq!(config.overflow_policy, OverflowPolicy::PartialGuidance);
}

/// Written configs read back unchanged
#[test]
fn test_write_and_load() {
    let config = SolverConfig {
        overflow_depth: 7,
        max_size: 9,
        caching: false,
        overflow_policy: OverflowPolicy::PartialGuidance,
    };
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    fs::write(&path, config.to_ron_string().unwrap()).unwrap();
    assert_eq!(SolverConfig::load(&path).unwrap(), config);
}

/// Malformed files and missing files are reported
#[test]
fn test_load_errors() {
    assert!(matches!(
        SolverConfig::from_ron_str("(max_size: \"big\")"),
        Err(ConfigError::Parse(_))
    ));

    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.ron");
    let err = SolverConfig::load(&missing).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
    assert!(err.to_string().contains("missing.ron"));
}

/// Environment variables override file values
#[test]
fn test_env_overrides() {
    let config = SolverConfig::default()
        .with_overrides_from(env(&[
            (ENV_OVERFLOW_DEPTH, "12"),
            (ENV_MAX_SIZE, " 4 "),
            (ENV_NO_CACHE, "1"),
        ]))
        .unwrap();
    assert_eq!(config.overflow_depth, 12);
    assert_eq!(config.max_size, 4);
    assert!(!config.caching);

    let untouched = SolverConfig::default()
        .with_overrides_from(env(&[(ENV_NO_CACHE, "0")]))
        .unwrap();
    assert_eq!(untouched, SolverConfig::default());
}

/// Unparseable environment values are errors, not silently ignored
#[test]
fn test_invalid_env() {
    let err = SolverConfig::default()
        .with_overrides_from(env(&[(ENV_MAX_SIZE, "lots")]))
        .unwrap_err();
    assert!(matches!(
        err,
        ConfigError::InvalidVar {
            name: ENV_MAX_SIZE,
            ..
        }
    ));

    assert!(SolverConfig::default()
        .with_overrides_from(env(&[(ENV_NO_CACHE, "maybe")]))
        .is_err());
}

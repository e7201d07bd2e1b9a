use ipmon_domain::config::{CliOverrides, Config, NativeMode, MAX_CACHE_TTL_SECS};

#[test]
fn test_config_defaults() {
    let config = Config::default();

    assert_eq!(config.resolver.cache_ttl_secs, 300);
    assert_eq!(config.resolver.cache_capacity, 100);
    assert!(!config.resolver.coalesce_inflight);
    assert_eq!(config.native.mode, NativeMode::InProcess);
    assert_eq!(config.native.timeout_ms, 5000);
    assert_eq!(config.doh.endpoint, "https://dns.google/resolve");
    assert_eq!(config.webrtc.timeout_ms, 5000);
    assert_eq!(config.webrtc.ipv6_probe_timeout_ms, 2000);
    assert_eq!(config.storage.snapshot_max_age_secs, 1800);
    assert_eq!(config.logging.level, "info");
    assert!(config.validate().is_ok());
}

#[test]
fn test_partial_config_fills_defaults() {
    let config = Config::parse(
        r#"
        [resolver]
        cache_capacity = 10

        [native]
        mode = "process"
        host_command = "/usr/local/bin/ipmon"
        "#,
    )
    .unwrap();

    assert_eq!(config.resolver.cache_capacity, 10);
    assert_eq!(config.resolver.cache_ttl_secs, 300);
    assert_eq!(config.native.mode, NativeMode::Process);
    assert_eq!(config.native.host_command, "/usr/local/bin/ipmon");
    assert_eq!(config.doh.timeout_ms, 3000);
}

#[test]
fn test_invalid_native_mode_rejected() {
    assert!(Config::parse("[native]\nmode = \"bogus\"").is_err());
}

#[test]
fn test_validate_rejects_zero_values() {
    let mut config = Config::default();
    config.resolver.cache_ttl_secs = 0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.resolver.cache_capacity = 0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.doh.timeout_ms = 0;
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.doh.endpoint = String::new();
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_rejects_oversized_cache_ttl() {
    let config = Config::parse("[resolver]\ncache_ttl_secs = 9223372036854775807").unwrap();
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.resolver.cache_ttl_secs = MAX_CACHE_TTL_SECS;
    assert!(config.validate().is_ok());

    config.resolver.cache_ttl_secs = MAX_CACHE_TTL_SECS + 1;
    assert!(config.validate().is_err());
}

#[test]
fn test_load_applies_cli_overrides() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ipmon.toml");
    std::fs::write(&path, "[logging]\nlevel = \"warn\"\n").unwrap();

    let config = Config::load(
        Some(path.to_str().unwrap()),
        CliOverrides {
            log_level: Some("debug".to_string()),
            native_mode: Some(NativeMode::Disabled),
            ..Default::default()
        },
    )
    .unwrap();

    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.native.mode, NativeMode::Disabled);
}

#[test]
fn test_load_missing_file_fails() {
    let result = Config::load(Some("/nonexistent/ipmon.toml"), CliOverrides::default());
    assert!(result.is_err());
}

#[test]
fn test_save_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("saved.toml");

    let mut config = Config::default();
    config.resolver.coalesce_inflight = true;
    config.save(path.to_str().unwrap()).unwrap();

    let loaded = Config::load(Some(path.to_str().unwrap()), CliOverrides::default()).unwrap();
    assert!(loaded.resolver.coalesce_inflight);
}

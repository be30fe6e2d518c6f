use crate::tests::{EnvGuard, setup_config_dir, write_config};
use crate::{Config, ConfigError, DEFAULT_LM_STUDIO_PORT, DEFAULT_OLLAMA_PORT};

use googletest::assert_that;
use googletest::prelude::{anything, eq, err, ok};
use serial_test::serial;

// =========================================================================
// Happy Path Tests
// =========================================================================

#[test]
#[serial]
fn given_no_config_file_when_load_then_ok_with_defaults() {
    // Given
    let _temp = setup_config_dir();

    // When
    let result = Config::load();

    // Then
    assert_that!(result, ok(anything()));
    let config = result.unwrap();
    assert_that!(config.lm_studio.enabled, eq(true));
    assert_that!(config.lm_studio.port, eq(DEFAULT_LM_STUDIO_PORT));
    assert_that!(config.ollama.enabled, eq(true));
    assert_that!(config.ollama.port, eq(DEFAULT_OLLAMA_PORT));
    assert_that!(config.supervisor.poll_interval_ms, eq(2_000));
    assert_that!(config.supervisor.idle_wake_secs, eq(10));
}

#[test]
#[serial]
fn given_no_config_file_when_load_and_validate_then_ok() {
    // Given
    let _temp = setup_config_dir();

    // When
    let config = Config::load().unwrap();
    let result = config.validate();

    // Then
    assert_that!(result, ok(anything()));
}

#[test]
#[serial]
fn given_valid_toml_file_when_load_then_uses_toml_values() {
    // Given
    let (temp, _guard) = setup_config_dir();
    write_config(
        &temp,
        r#"
            [lm_studio]
            enabled = false
            port = 4321

            [ollama]
            port = 11500

            [supervisor]
            poll_interval_ms = 500
        "#,
    );

    // When
    let config = Config::load().unwrap();

    // Then
    assert_that!(config.lm_studio.enabled, eq(false));
    assert_that!(config.lm_studio.port, eq(4321));
    assert_that!(config.ollama.enabled, eq(true));
    assert_that!(config.ollama.port, eq(11500));
    assert_that!(config.supervisor.poll_interval_ms, eq(500));
    assert_that!(config.supervisor.idle_wake_secs, eq(10));
}

#[test]
#[serial]
fn given_partial_upstream_table_when_load_then_port_falls_back_to_that_upstreams_default() {
    // Given
    let (temp, _guard) = setup_config_dir();
    write_config(
        &temp,
        r#"
            [ollama]
            enabled = false
        "#,
    );

    // When
    let config = Config::load().unwrap();

    // Then
    assert_that!(config.ollama.enabled, eq(false));
    assert_that!(config.ollama.port, eq(DEFAULT_OLLAMA_PORT));
    assert_that!(config.lm_studio.port, eq(DEFAULT_LM_STUDIO_PORT));
}

#[test]
#[serial]
fn given_env_var_and_toml_when_load_then_env_var_overrides_toml() {
    // Given
    let (temp, _guard) = setup_config_dir();
    write_config(
        &temp,
        r#"
            [lm_studio]
            port = 4000
        "#,
    );
    let _port = EnvGuard::set("PALM_LM_STUDIO_PORT", "5000");
    let _enabled = EnvGuard::set("PALM_OLLAMA_ENABLED", "0");

    // When
    let config = Config::load().unwrap();

    // Then
    assert_that!(config.lm_studio.port, eq(5000));
    assert_that!(config.ollama.enabled, eq(false));
}

#[test]
#[serial]
fn given_unparseable_env_value_when_load_then_keeps_previous_value() {
    // Given
    let _temp = setup_config_dir();
    let _interval = EnvGuard::set("PALM_POLL_INTERVAL_MS", "soon");

    // When
    let config = Config::load().unwrap();

    // Then
    assert_that!(config.supervisor.poll_interval_ms, eq(2_000));
}

#[test]
#[serial]
fn given_explicit_dir_when_load_from_then_reads_that_dir() {
    // Given
    let (temp, _guard) = setup_config_dir();
    let other = tempfile::TempDir::new().unwrap();
    std::fs::write(
        other.path().join("config.toml"),
        "[lm_studio]\nport = 7777\n",
    )
    .unwrap();
    write_config(&temp, "[lm_studio]\nport = 8888\n");

    // When
    let config = Config::load_from(other.path()).unwrap();

    // Then
    assert_that!(config.lm_studio.port, eq(7777));
}

// =========================================================================
// Error Tests
// =========================================================================

#[test]
#[serial]
fn given_malformed_toml_when_load_then_toml_error() {
    // Given
    let (temp, _guard) = setup_config_dir();
    write_config(&temp, "[lm_studio\nport = ");

    // When
    let result = Config::load();

    // Then
    assert_that!(result, err(anything()));
    assert!(matches!(result.unwrap_err(), ConfigError::Toml { .. }));
}

#[test]
#[serial]
fn given_same_port_for_both_enabled_upstreams_when_validate_then_error() {
    // Given
    let (temp, _guard) = setup_config_dir();
    write_config(
        &temp,
        r#"
            [lm_studio]
            port = 9000

            [ollama]
            port = 9000
        "#,
    );

    // When
    let result = Config::load().unwrap().validate();

    // Then
    assert_that!(result, err(anything()));
    assert!(result.unwrap_err().to_string().contains("must differ"));
}

#[test]
#[serial]
fn given_same_port_but_one_upstream_disabled_when_validate_then_ok() {
    // Given
    let (temp, _guard) = setup_config_dir();
    write_config(
        &temp,
        r#"
            [lm_studio]
            port = 9000

            [ollama]
            enabled = false
            port = 9000
        "#,
    );

    // When
    let result = Config::load().unwrap().validate();

    // Then
    assert_that!(result, ok(anything()));
}

//! Per-user config file discovery. These tests change process environment
//! variables, so they run serially.
#![cfg(target_os = "linux")]

use markersense::EvictionPolicy;
use markersense::config::Config;
use serial_test::serial;
use std::fs;

#[test]
#[serial]
fn load_reads_user_config() {
    let dir = tempfile::tempdir().unwrap();
    let config_dir = dir.path().join("markersense");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(
        config_dir.join("config.toml"),
        "[tracking]\neviction = \"timeout\"\ntimeout_secs = 2.0\n",
    )
    .unwrap();

    temp_env::with_var("XDG_CONFIG_HOME", Some(dir.path()), || {
        let config = Config::load();
        assert_eq!(config.tracking.eviction, EvictionPolicy::Timeout);
        assert_eq!(config.tracking.timeout_secs, 2.0);
    });
}

#[test]
#[serial]
fn load_falls_back_on_invalid_file() {
    let dir = tempfile::tempdir().unwrap();
    let config_dir = dir.path().join("markersense");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(config_dir.join("config.toml"), "[scanner]\nqr_code_size = 0.0\n").unwrap();

    temp_env::with_var("XDG_CONFIG_HOME", Some(dir.path()), || {
        assert_eq!(Config::load(), Config::default());
    });
}

#[test]
#[serial]
fn save_writes_to_user_config_dir() {
    let dir = tempfile::tempdir().unwrap();

    temp_env::with_var("XDG_CONFIG_HOME", Some(dir.path()), || {
        let mut config = Config::default();
        config.output.color = false;
        let path = config.save().unwrap();

        assert_eq!(path, dir.path().join("markersense").join("config.toml"));
        assert!(!Config::load().output.color);
    });
}

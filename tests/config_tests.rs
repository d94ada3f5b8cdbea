use serial_test::serial;
use std::env;
use std::path::PathBuf;
use tempfile::tempdir;

use soulpages::config::Config;
use soulpages::errors::{AppError, AppResult};
use soulpages::storage;

const VARS: [&str; 5] = [
    "SOULPAGES_DIR",
    "SOULPAGES_BATCH_LIMIT",
    "SOULPAGES_ATTACHMENT_LIMIT",
    "SOULPAGES_PASSCODE",
    "HOME",
];

fn save_env() -> Vec<(&'static str, Option<String>)> {
    VARS.iter().map(|var| (*var, env::var(var).ok())).collect()
}

fn restore_env(saved: Vec<(&'static str, Option<String>)>) {
    for (var, value) in saved {
        match value {
            Some(val) => env::set_var(var, val),
            None => env::remove_var(var),
        }
    }
}

#[test]
#[serial]
fn test_config_load_with_environment_vars() {
    let saved = save_env();
    let temp_dir = tempdir().unwrap();
    let dir_path = temp_dir.path().to_string_lossy().to_string();

    env::set_var("SOULPAGES_DIR", &dir_path);
    env::set_var("SOULPAGES_BATCH_LIMIT", "5");
    env::remove_var("SOULPAGES_ATTACHMENT_LIMIT");
    env::remove_var("SOULPAGES_PASSCODE");

    let config = Config::load().unwrap();
    restore_env(saved);

    assert_eq!(config.data_dir, PathBuf::from(&dir_path));
    assert_eq!(config.batch_limit, 5);
    assert_eq!(config.attachment_limit, None);
    assert!(config.passcode.is_none());
}

#[test]
#[serial]
fn test_config_default_dir_under_home() {
    let saved = save_env();
    for var in VARS {
        env::remove_var(var);
    }
    env::set_var("HOME", "/home/diarist");

    let config = Config::load();
    restore_env(saved);

    assert_eq!(
        config.unwrap().data_dir,
        PathBuf::from("/home/diarist/Documents/soulpages")
    );
}

#[test]
#[serial]
fn test_config_rejects_out_of_range_batch_limit() {
    let saved = save_env();
    env::set_var("SOULPAGES_DIR", "/tmp/soulpages-config");
    env::set_var("SOULPAGES_BATCH_LIMIT", "100");

    let result = Config::load();
    restore_env(saved);

    match result {
        Err(AppError::Config(message)) => assert!(message.contains("SOULPAGES_BATCH_LIMIT")),
        other => panic!("Expected Config error, got {:?}", other),
    }
}

#[test]
fn test_config_validation_and_directory_creation() -> AppResult<()> {
    let temp_dir = tempdir()?;
    let data_dir = temp_dir.path().join("nested").join("journal");

    let config = Config {
        data_dir: data_dir.clone(),
        ..Config::default()
    };
    config.validate()?;

    storage::ensure_data_directory_exists(&config.data_dir)?;
    assert!(data_dir.is_dir());

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = std::fs::metadata(&data_dir)?.permissions().mode();
        assert_eq!(mode & 0o777, 0o700);
    }

    Ok(())
}

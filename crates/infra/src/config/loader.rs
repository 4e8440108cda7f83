//! Warm-up configuration loader
//!
//! Loads [`WarmupConfig`] from environment variables or files.
//!
//! ## Loading Strategy
//! 1. If any `CACHESTORM_*` variable is set, the environment wins
//! 2. Otherwise the first config file found is used
//! 3. With neither, defaults apply
//!
//! Environment variables that are unset keep their default value.
//!
//! ## Environment Variables
//! - `CACHESTORM_ENABLED`: Whether warm-up runs at all (true/false)
//! - `CACHESTORM_FAILURE_POLICY`: `continue_on_failure` or
//!   `abort_on_first_failure`
//! - `CACHESTORM_PER_KEY_LOCK`: Serialize check-then-set per key (true/false)
//! - `CACHESTORM_DEFAULT_EXPIRATION_SECS`: Expiration for markers without one
//!
//! ## File Locations
//! The loader searches the following paths (in order):
//! 1. `./cachestorm.toml` or `./cachestorm.json` (current working directory)
//! 2. Next to the executable

use std::path::{Path, PathBuf};

use cachestorm_common::CommonError;
use cachestorm_domain::{FailurePolicy, WarmupConfig};

use crate::errors::{InfraError, InfraResult};

const ENV_ENABLED: &str = "CACHESTORM_ENABLED";
const ENV_FAILURE_POLICY: &str = "CACHESTORM_FAILURE_POLICY";
const ENV_PER_KEY_LOCK: &str = "CACHESTORM_PER_KEY_LOCK";
const ENV_DEFAULT_EXPIRATION: &str = "CACHESTORM_DEFAULT_EXPIRATION_SECS";

const ENV_VARS: [&str; 4] =
    [ENV_ENABLED, ENV_FAILURE_POLICY, ENV_PER_KEY_LOCK, ENV_DEFAULT_EXPIRATION];

const FILE_NAMES: [&str; 2] = ["cachestorm.toml", "cachestorm.json"];

/// Load configuration with automatic fallback strategy
///
/// # Errors
/// Returns an error if a source exists but holds invalid values. Missing
/// sources are not errors.
pub fn load() -> InfraResult<WarmupConfig> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Warm-up configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) if e.is_not_found() => match find_config_file() {
            Some(path) => load_from_file(Some(path)),
            None => {
                tracing::debug!("No warm-up configuration found, using defaults");
                Ok(WarmupConfig::default())
            }
        },
        Err(e) => Err(e),
    }
}

/// Load configuration from environment variables
///
/// # Errors
/// - `NotFound` when none of the variables is set
/// - `Config` when a variable holds an invalid value
pub fn load_from_env() -> InfraResult<WarmupConfig> {
    if ENV_VARS.iter().all(|key| std::env::var_os(key).is_none()) {
        return Err(CommonError::not_found("CACHESTORM_* environment variables").into());
    }

    let defaults = WarmupConfig::default();

    let failure_policy = match std::env::var(ENV_FAILURE_POLICY) {
        Ok(value) => value
            .parse::<FailurePolicy>()
            .map_err(|e| CommonError::config_field(ENV_FAILURE_POLICY, e.0))?,
        Err(_) => defaults.failure_policy,
    };

    let default_expiration_secs = match std::env::var(ENV_DEFAULT_EXPIRATION) {
        Ok(value) => value.parse::<u64>().map_err(|e| {
            CommonError::config_field(ENV_DEFAULT_EXPIRATION, format!("Invalid expiration: {e}"))
        })?,
        Err(_) => defaults.default_expiration_secs,
    };

    let config = WarmupConfig {
        enabled: env_bool(ENV_ENABLED, defaults.enabled),
        failure_policy,
        per_key_lock: env_bool(ENV_PER_KEY_LOCK, defaults.per_key_lock),
        default_expiration_secs,
    };
    config.validate()?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, searches the standard locations. Format is detected by
/// extension (`.toml` or `.json`); absent keys take their default.
///
/// # Errors
/// - `NotFound` when no file exists
/// - `Io` when the file cannot be read
/// - `Serialization` or `Config` when the content is invalid
pub fn load_from_file(path: Option<PathBuf>) -> InfraResult<WarmupConfig> {
    let config_path = match path {
        Some(p) if p.exists() => p,
        Some(p) => {
            let id = p.display().to_string();
            return Err(CommonError::not_found_with_id("config file", id).into());
        }
        None => find_config_file().ok_or_else(|| CommonError::not_found("config file"))?,
    };

    tracing::info!(path = %config_path.display(), "Loading warm-up configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|source| InfraError::Io { path: config_path.clone(), source })?;

    let config = parse_config(&contents, &config_path)?;
    config.validate()?;
    Ok(config)
}

/// Parse configuration from string content
fn parse_config(contents: &str, path: &Path) -> InfraResult<WarmupConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match extension {
        "toml" => Ok(toml::from_str(contents).map_err(CommonError::from)?),
        "json" => Ok(serde_json::from_str(contents).map_err(CommonError::from)?),
        _ => Err(CommonError::config(format!("Unsupported config format: {extension}")).into()),
    }
}

/// Search the standard locations for a config file
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn find_config_file() -> Option<PathBuf> {
    let mut dirs = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        dirs.push(cwd);
    }
    let exe_dir = std::env::current_exe().ok().and_then(|p| p.parent().map(Path::to_path_buf));
    if let Some(exe_dir) = exe_dir {
        dirs.push(exe_dir);
    }

    dirs.iter()
        .flat_map(|dir| FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.exists())
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Mutex;

    use once_cell::sync::Lazy;
    use tempfile::NamedTempFile;

    use super::*;

    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    fn clear_env() {
        for key in ENV_VARS {
            std::env::remove_var(key);
        }
    }

    fn temp_config(contents: &str, extension: &str) -> NamedTempFile {
        let mut file =
            tempfile::Builder::new().suffix(&format!(".{extension}")).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_env_bool_parsing() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");

        std::env::set_var("CACHESTORM_TEST_BOOL_ON", "ON");
        std::env::set_var("CACHESTORM_TEST_BOOL_OFF", "0");
        assert!(env_bool("CACHESTORM_TEST_BOOL_ON", false));
        assert!(!env_bool("CACHESTORM_TEST_BOOL_OFF", true));

        std::env::remove_var("CACHESTORM_TEST_BOOL_MISSING");
        assert!(env_bool("CACHESTORM_TEST_BOOL_MISSING", true));

        std::env::remove_var("CACHESTORM_TEST_BOOL_ON");
        std::env::remove_var("CACHESTORM_TEST_BOOL_OFF");
    }

    #[test]
    fn test_load_from_env_partial() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var(ENV_FAILURE_POLICY, "abort_on_first_failure");
        std::env::set_var(ENV_DEFAULT_EXPIRATION, "120");

        let config = load_from_env().unwrap();
        assert!(config.enabled);
        assert_eq!(config.failure_policy, FailurePolicy::AbortOnFirstFailure);
        assert!(!config.per_key_lock);
        assert_eq!(config.default_expiration_secs, 120);

        clear_env();
    }

    #[test]
    fn test_load_from_env_none_set() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        let err = load_from_env().unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_load_from_env_invalid_values() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var(ENV_FAILURE_POLICY, "retry_forever");
        assert!(matches!(load_from_env(), Err(InfraError::Common(CommonError::Config { .. }))));

        clear_env();
        std::env::set_var(ENV_DEFAULT_EXPIRATION, "0");
        assert!(matches!(load_from_env(), Err(InfraError::InvalidConfig(_))));

        clear_env();
    }

    #[test]
    fn test_load_from_file_toml() {
        let file = temp_config("enabled = false\nper_key_lock = true\n", "toml");

        let config = load_from_file(Some(file.path().to_path_buf())).unwrap();
        assert!(!config.enabled);
        assert!(config.per_key_lock);
        assert_eq!(config.default_expiration_secs, 1800);
    }

    #[test]
    fn test_load_from_file_json() {
        let file = temp_config(
            r#"{ "failure_policy": "abort_on_first_failure", "default_expiration_secs": 90 }"#,
            "json",
        );

        let config = load_from_file(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(config.failure_policy, FailurePolicy::AbortOnFirstFailure);
        assert_eq!(config.default_expiration(), std::time::Duration::from_secs(90));
    }

    #[test]
    fn test_load_from_file_not_found() {
        let err = load_from_file(Some(PathBuf::from("/nonexistent/cachestorm.toml"))).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_load_from_file_invalid_json() {
        let file = temp_config(r#"{ "enabled": "#, "json");
        let err = load_from_file(Some(file.path().to_path_buf())).unwrap_err();
        assert!(matches!(err, InfraError::Common(CommonError::Serialization { .. })));
    }

    #[test]
    fn test_parse_config_unsupported_format() {
        let result = parse_config("enabled: true", Path::new("cachestorm.yaml"));
        assert!(matches!(result, Err(InfraError::Common(CommonError::Config { .. }))));
    }
}

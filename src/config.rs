use std::path::{Path, PathBuf};

use chrono::{Duration, Utc};
use clap::Parser;
use serde::Deserialize;
use thiserror::Error;

#[derive(Parser, Debug)]
#[command(name = "rusty-ledger", about = "Replays ledger operations and prints user balances")]
pub struct CliArgs {
    /// Input CSV with register/deposit/withdraw rows
    pub input: PathBuf,

    /// Path to config file
    #[arg(short, long, default_value = "ledger.toml")]
    pub config: PathBuf,

    /// Log level (overrides config file)
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Use the async reader/processor pipeline
    #[arg(long = "async")]
    pub use_async: bool,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config file {path}: {reason}")]
    Invalid { path: PathBuf, reason: String },

    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub json: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    /// HS256 signing secret. A random secret is generated per process when unset,
    /// so tokens then only verify within the same run.
    #[serde(default)]
    pub jwt_secret: Option<String>,

    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: i64,

    /// Argon2 memory cost in KiB.
    #[serde(default = "default_hash_mem_cost_kib")]
    pub hash_mem_cost_kib: u32,

    /// Argon2 iterations.
    #[serde(default = "default_hash_time_cost")]
    pub hash_time_cost: u32,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_token_ttl_hours() -> i64 {
    24
}

fn default_hash_mem_cost_kib() -> u32 {
    19456
}

fn default_hash_time_cost() -> u32 {
    2
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        AuthConfig {
            jwt_secret: None,
            token_ttl_hours: default_token_ttl_hours(),
            hash_mem_cost_kib: default_hash_mem_cost_kib(),
            hash_time_cost: default_hash_time_cost(),
        }
    }
}

/// Smallest memory cost argon2 accepts for a single lane.
const MIN_HASH_MEM_COST_KIB: u32 = 8;

impl AuthConfig {
    /// Checks the values a TOML file can get wrong without failing to parse.
    pub fn validate(&self) -> Result<(), String> {
        if self.token_ttl_hours <= 0 {
            return Err(format!(
                "token_ttl_hours must be positive, got {}",
                self.token_ttl_hours
            ));
        }
        Duration::try_hours(self.token_ttl_hours)
            .and_then(|ttl| Utc::now().checked_add_signed(ttl))
            .ok_or_else(|| format!("token_ttl_hours {} is out of range", self.token_ttl_hours))?;
        if self.hash_mem_cost_kib < MIN_HASH_MEM_COST_KIB {
            return Err(format!(
                "hash_mem_cost_kib must be at least {MIN_HASH_MEM_COST_KIB}, got {}",
                self.hash_mem_cost_kib
            ));
        }
        if self.hash_time_cost == 0 {
            return Err("hash_time_cost must be at least 1".to_string());
        }
        Ok(())
    }
}

impl Config {
    /// Loads the config file, falling back to defaults when it doesn't exist.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Config::default()),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_owned(),
                    source,
                })
            }
        };
        let config: Config = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })?;
        config
            .auth
            .validate()
            .map_err(|reason| ConfigError::Invalid {
                path: path.to_owned(),
                reason,
            })?;
        Ok(config)
    }

    /// Loads the config named on the command line and applies CLI overrides.
    pub fn load(cli: &CliArgs) -> Result<Self, ConfigError> {
        let mut config = Self::from_file(&cli.config)?;
        if let Some(ref level) = cli.log_level {
            config.logging.level = level.clone();
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.json);
        assert!(config.auth.jwt_secret.is_none());
        assert_eq!(config.auth.token_ttl_hours, 24);
        assert_eq!(config.auth.hash_mem_cost_kib, 19456);
        assert_eq!(config.auth.hash_time_cost, 2);
    }

    #[test]
    fn test_parse_partial_file() {
        let config: Config = toml::from_str(
            r#"
            [logging]
            json = true

            [auth]
            jwt_secret = "s3cret"
            token_ttl_hours = 1
            "#,
        )
        .unwrap();
        assert_eq!(config.logging.level, "info");
        assert!(config.logging.json);
        assert_eq!(config.auth.jwt_secret.as_deref(), Some("s3cret"));
        assert_eq!(config.auth.token_ttl_hours, 1);
        assert_eq!(config.auth.hash_time_cost, 2);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let config = Config::from_file(Path::new("does/not/exist.toml")).unwrap();
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_cli_overrides_log_level() {
        let cli = CliArgs::parse_from([
            "rusty-ledger",
            "--config",
            "does/not/exist.toml",
            "--log-level",
            "debug",
            "data/example_input.csv",
        ]);
        let config = Config::load(&cli).unwrap();
        assert_eq!(config.logging.level, "debug");
        assert!(!cli.use_async);
    }

    fn write_config(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("rusty_ledger_{name}.toml"));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_file_values_are_loaded() {
        let path = write_config("valid", "[auth]\ntoken_ttl_hours = 2\n");
        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.auth.token_ttl_hours, 2);
    }

    #[test]
    fn test_out_of_range_token_ttl_is_rejected() {
        for (name, ttl) in [
            ("ttl_max", i64::MAX.to_string()),
            ("ttl_huge", (1i64 << 40).to_string()),
            ("ttl_zero", "0".to_string()),
            ("ttl_negative", "-1".to_string()),
        ] {
            let path = write_config(name, &format!("[auth]\ntoken_ttl_hours = {ttl}\n"));
            assert!(matches!(
                Config::from_file(&path),
                Err(ConfigError::Invalid { .. })
            ));
        }
    }

    #[test]
    fn test_too_small_hash_costs_are_rejected() {
        let path = write_config("hash_cost", "[auth]\nhash_mem_cost_kib = 4\n");
        assert!(matches!(
            Config::from_file(&path),
            Err(ConfigError::Invalid { .. })
        ));
        assert!(AuthConfig {
            hash_time_cost: 0,
            ..AuthConfig::default()
        }
        .validate()
        .is_err());
        assert!(AuthConfig::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let result: Result<Config, _> = toml::from_str("[auth]\ntoken_ttl_hours = \"soon\"");
        assert!(result.is_err());
    }
}

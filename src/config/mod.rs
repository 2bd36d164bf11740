//! Application configuration for `icons.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── library    # [library]
//! │   ├── mail       # [mail]
//! │   └── serve      # [serve]
//! ├── error          # ConfigError
//! └── mod.rs         # AppConfig (this file)
//! ```
//!
//! # Precedence
//!
//! defaults < `icons.toml` < environment < command-line flags
//!
//! The resolved [`AppConfig`] is built once in `main` and handed to the
//! server and the mail notifier behind an `Arc`.

mod error;
pub mod section;

pub use error::ConfigError;
pub use section::{LibraryConfig, MailConfig, ServeConfig};

use crate::cli::{Cli, Commands};
use crate::log;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Root configuration structure representing icons.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Absolute path to the config file, empty when none was found
    #[serde(skip)]
    pub config_path: PathBuf,

    #[serde(default)]
    pub serve: ServeConfig,

    #[serde(default)]
    pub library: LibraryConfig,

    #[serde(default)]
    pub mail: MailConfig,
}

impl AppConfig {
    /// Load configuration for a CLI invocation.
    ///
    /// A missing config file is not an error: every section has defaults.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;

        let mut config = match find_config_file(&cwd, &cli.config) {
            Some(path) => {
                let mut config = Self::from_path(&path)?;
                config.config_path = path;
                config
            }
            None => {
                crate::debug!("config"; "no {} found, using defaults", cli.config.display());
                Self::default()
            }
        };

        config.apply_env(|key| std::env::var(key).ok());
        config.apply_cli(cli);

        let base = config
            .config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or(cwd);
        config.library.anchor(&base);

        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    /// Load configuration from file path, warning about unknown fields.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring: {}", display_path, fields.join(", "));
    }

    /// Apply environment overrides through `var` (normally `std::env::var`).
    ///
    /// Unparseable numeric values are reported and skipped.
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(port) = var("PORT") {
            Self::parse_env("PORT", &port, &mut self.serve.port);
        }

        let mail = &mut self.mail;
        if let Some(enabled) = var("ENABLE_EMAIL_NOTIFICATIONS") {
            mail.enabled = enabled.eq_ignore_ascii_case("true");
        }
        if let Some(port) = var("EMAIL_SMTP_PORT") {
            Self::parse_env("EMAIL_SMTP_PORT", &port, &mut mail.smtp_port);
        }
        for (key, field) in [
            ("EMAIL_SMTP_SERVER", &mut mail.smtp_server),
            ("EMAIL_USERNAME", &mut mail.username),
            ("EMAIL_PASSWORD", &mut mail.password),
            ("EMAIL_FROM", &mut mail.from),
            ("EMAIL_TO", &mut mail.to),
        ] {
            if let Some(value) = var(key) {
                *field = value;
            }
        }
    }

    fn parse_env(key: &str, raw: &str, target: &mut u16) {
        match raw.trim().parse() {
            Ok(value) => *target = value,
            Err(_) => log!("warning"; "ignoring {}={:?}: not a port number", key, raw),
        }
    }

    /// Apply command-line overrides.
    fn apply_cli(&mut self, cli: &Cli) {
        Self::update_option(&mut self.library.root, cli.root.as_ref());

        if let Commands::Serve {
            interface,
            port,
            threads,
        } = &cli.command
        {
            Self::update_option(&mut self.serve.interface, interface.as_ref());
            Self::update_option(&mut self.serve.port, port.as_ref());
            Self::update_option(&mut self.serve.threads, threads.as_ref());
        }
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.serve.threads == 0 {
            return Err(ConfigError::Validation(
                "[serve] threads must be at least 1".into(),
            ));
        }
        if self.library.infographics_master.contains(['/', '\\']) {
            return Err(ConfigError::Validation(
                "[library] infographics_master must be a file name".into(),
            ));
        }
        Ok(())
    }
}

/// Find `config_name` in `start` or the closest ancestor that has it.
///
/// An absolute `config_name` is only checked as is.
fn find_config_file(start: &Path, config_name: &Path) -> Option<PathBuf> {
    if config_name.is_absolute() {
        return config_name.exists().then(|| config_name.to_path_buf());
    }
    start
        .ancestors()
        .map(|dir| dir.join(config_name))
        .find(|candidate| candidate.is_file())
}

/// Parse a config string for section tests.
#[cfg(test)]
pub fn test_parse_config(content: &str) -> AppConfig {
    AppConfig::from_str(content).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_unknown_fields_collected() {
        let (config, ignored) =
            AppConfig::parse_with_ignored("[serve]\nport = 9000\nwatch = true\n[extra]\nx = 1")
                .unwrap();
        assert_eq!(config.serve.port, 9000);
        assert_eq!(ignored, vec!["serve.watch", "extra"]);
    }

    #[test]
    fn test_invalid_toml_is_error() {
        assert!(matches!(
            AppConfig::parse_with_ignored("[serve\nport = 1"),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = test_parse_config("[serve]\nport = 9000\n[mail]\nsmtp_port = 25");
        config.apply_env(env(&[
            ("PORT", "8123"),
            ("ENABLE_EMAIL_NOTIFICATIONS", "TRUE"),
            ("EMAIL_SMTP_SERVER", "mail.example.com"),
            ("EMAIL_SMTP_PORT", "2525"),
            ("EMAIL_TO", "team@example.com"),
        ]));

        assert_eq!(config.serve.port, 8123);
        assert!(config.mail.enabled);
        assert_eq!(config.mail.smtp_server, "mail.example.com");
        assert_eq!(config.mail.smtp_port, 2525);
        assert_eq!(config.mail.to, "team@example.com");
        assert!(config.mail.username.is_empty());
    }

    #[test]
    fn test_env_bad_port_keeps_value() {
        let mut config = test_parse_config("[serve]\nport = 9000");
        config.apply_env(env(&[("PORT", "eighty")]));
        assert_eq!(config.serve.port, 9000);
    }

    #[test]
    fn test_env_disable_mail() {
        let mut config = test_parse_config("[mail]\nenabled = true");
        config.apply_env(env(&[("ENABLE_EMAIL_NOTIFICATIONS", "no")]));
        assert!(!config.mail.enabled);
    }

    #[test]
    fn test_find_config_file_walks_up() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a/b");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join("icons.toml"), "").unwrap();

        let found = find_config_file(&nested, Path::new("icons.toml")).unwrap();
        assert_eq!(found, dir.path().join("icons.toml"));
        assert!(find_config_file(&nested, Path::new("missing.toml")).is_none());
    }

    #[test]
    fn test_validate_rejects_zero_threads() {
        let config = test_parse_config("[serve]\nthreads = 0");
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }
}

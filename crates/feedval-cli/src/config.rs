//! # Configuration File
//!
//! Optional YAML file holding defaults for the `validate` subcommand:
//!
//! ```yaml
//! schema: schemas/custom.schema.json
//! disabled-rules: [kafka-ssl-port]
//! deny-warnings: true
//! format: json
//! ```
//!
//! Resolution: an explicit `--config <path>` must exist; otherwise
//! `feedval.yaml` in the working directory is used when present. Command
//! line flags override file values. Unknown keys are rejected.

use std::path::{Path, PathBuf};

use clap::ValueEnum;
use feedval_engine::EngineSettings;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "feedval.yaml";

/// Error reading the configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Report format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Contents of a config file. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ConfigFile {
    /// Schema replacing the bundled feeds schema. Relative paths are
    /// resolved against the config file's directory.
    pub schema: Option<PathBuf>,
    #[serde(default)]
    pub disabled_rules: Vec<String>,
    pub deny_warnings: Option<bool>,
    pub format: Option<OutputFormat>,
}

impl ConfigFile {
    /// Read and parse a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let mut config: ConfigFile =
            serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        if let (Some(schema), Some(base)) = (config.schema.as_mut(), path.parent()) {
            if schema.is_relative() {
                *schema = base.join(&*schema);
            }
        }
        debug!(path = %path.display(), ?config, "config file loaded");
        Ok(config)
    }

    /// Find the config file to use.
    ///
    /// `explicit` comes from `--config` and must exist. Without it,
    /// [`DEFAULT_CONFIG_FILE`] in `dir` is read if present, else the
    /// defaults apply.
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let default = dir.join(DEFAULT_CONFIG_FILE);
        if default.is_file() {
            Self::load(&default)
        } else {
            Ok(Self::default())
        }
    }
}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub schema: Option<PathBuf>,
    pub disabled_rules: Vec<String>,
    pub deny_warnings: bool,
    pub format: Option<OutputFormat>,
}

/// Effective settings for one `validate` run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    /// `None` means the bundled feeds schema.
    pub schema: Option<PathBuf>,
    pub engine: EngineSettings,
    pub format: OutputFormat,
}

impl ConfigFile {
    /// Layer command-line overrides on top of this file.
    ///
    /// Disabled rules accumulate from both sources; `--deny-warnings` can
    /// only switch the setting on.
    pub fn resolve(self, overrides: Overrides) -> Resolved {
        let mut disabled_rules = self.disabled_rules;
        for id in overrides.disabled_rules {
            if !disabled_rules.contains(&id) {
                disabled_rules.push(id);
            }
        }
        Resolved {
            schema: overrides.schema.or(self.schema),
            engine: EngineSettings {
                disabled_rules,
                deny_warnings: overrides.deny_warnings || self.deny_warnings.unwrap_or(false),
            },
            format: overrides.format.or(self.format).unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn full_config_parses() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "feedval.yaml",
            "schema: custom.schema.json\ndisabled-rules: [kafka-ssl-port]\ndeny-warnings: true\nformat: json\n",
        );
        let config = ConfigFile::load(&path).unwrap();
        assert_eq!(config.schema, Some(dir.path().join("custom.schema.json")));
        assert_eq!(config.disabled_rules, ["kafka-ssl-port"]);
        assert_eq!(config.deny_warnings, Some(true));
        assert_eq!(config.format, Some(OutputFormat::Json));
    }

    #[test]
    fn absolute_schema_path_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let schema = dir.path().join("abs.schema.json");
        let path = write(
            dir.path(),
            "c.yaml",
            &format!("schema: {}\n", schema.display()),
        );
        assert_eq!(ConfigFile::load(&path).unwrap().schema, Some(schema));
    }

    #[test]
    fn unknown_key_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "c.yaml", "disable-rules: [kafka-ssl-port]\n");
        let err = ConfigFile::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("disable-rules"), "{err}");
    }

    #[test]
    fn unknown_format_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "c.yaml", "format: xml\n");
        assert!(matches!(ConfigFile::load(&path), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn discover_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(ConfigFile::discover(None, dir.path()).unwrap(), ConfigFile::default());
    }

    #[test]
    fn discover_reads_default_file() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), DEFAULT_CONFIG_FILE, "deny-warnings: true\n");
        let config = ConfigFile::discover(None, dir.path()).unwrap();
        assert_eq!(config.deny_warnings, Some(true));
    }

    #[test]
    fn explicit_config_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.yaml");
        let err = ConfigFile::discover(Some(&missing), dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn flags_override_file_values() {
        let config = ConfigFile {
            schema: Some(PathBuf::from("file.schema.json")),
            disabled_rules: vec!["kafka-ssl-port".into()],
            deny_warnings: Some(false),
            format: Some(OutputFormat::Json),
        };
        let resolved = config.resolve(Overrides {
            schema: Some(PathBuf::from("flag.schema.json")),
            disabled_rules: vec!["kafka-ssl-port".into(), "transaction-commit".into()],
            deny_warnings: true,
            format: Some(OutputFormat::Text),
        });
        assert_eq!(resolved.schema, Some(PathBuf::from("flag.schema.json")));
        assert_eq!(resolved.engine.disabled_rules, ["kafka-ssl-port", "transaction-commit"]);
        assert!(resolved.engine.deny_warnings);
        assert_eq!(resolved.format, OutputFormat::Text);
    }

    #[test]
    fn file_values_apply_without_flags() {
        let config = ConfigFile {
            deny_warnings: Some(true),
            format: Some(OutputFormat::Json),
            ..ConfigFile::default()
        };
        let resolved = config.resolve(Overrides::default());
        assert_eq!(resolved.schema, None);
        assert!(resolved.engine.deny_warnings);
        assert_eq!(resolved.format, OutputFormat::Json);
    }
}

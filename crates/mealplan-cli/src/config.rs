//! Configuration file and environment resolution for mealplan.
//!
//! Provides a TOML config file at `~/.config/mealplan/config.toml` and a
//! resolution chain: CLI flag > env var > config file > default.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use mealplan_core::delivery::{SmtpConfig, SmtpSecurity};
use mealplan_core::llm::GeminiConfig;

pub const DEFAULT_FAMILY_SIZE: u32 = 5;
pub const DEFAULT_SMTP_PORT: u16 = 587;

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub gemini: GeminiSection,
    #[serde(default)]
    pub smtp: SmtpSection,
    #[serde(default)]
    pub household: HouseholdSection,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeminiSection {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SmtpSection {
    pub server: Option<String>,
    pub port: Option<u16>,
    /// `starttls`, `tls`, or `none`.
    pub security: Option<String>,
    pub address: Option<String>,
    pub password: Option<String>,
    pub recipient: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HouseholdSection {
    pub family_size: Option<u32>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key} is not set (environment, .env, or config file)")]
    Missing { key: &'static str },

    #[error("invalid {key} value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("failed to read config file at {}: {source}", path.display())]
    File {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    Toml(#[from] toml::de::Error),
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the mealplan config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/mealplan` or
/// `~/.config/mealplan`, also on macOS.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("mealplan");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("mealplan")
}

pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read
// -----------------------------------------------------------------------

/// Load and parse a config file. Returns an error if it does not exist.
pub fn load_config(path: &Path) -> Result<ConfigFile, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::File {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(toml::from_str(&contents)?)
}

/// An explicit path must exist; the default path is optional.
fn load_config_or_default(explicit: Option<&Path>) -> Result<ConfigFile, ConfigError> {
    match explicit {
        Some(path) => load_config(path),
        None => {
            let path = config_path();
            if path.exists() {
                load_config(&path)
            } else {
                Ok(ConfigFile::default())
            }
        }
    }
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Values given on the command line. They win over everything else.
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub family_size: Option<u32>,
    pub model: Option<String>,
    pub no_email: bool,
}

/// Fully resolved configuration, ready for use.
#[derive(Debug)]
pub struct ResolvedConfig {
    pub gemini: GeminiConfig,
    /// `None` when email is disabled.
    pub smtp: Option<SmtpConfig>,
    pub family_size: u32,
}

impl ResolvedConfig {
    /// Resolve from the process environment and the config file.
    pub fn resolve(
        config_file: Option<&Path>,
        overrides: &CliOverrides,
    ) -> Result<Self, ConfigError> {
        let file = load_config_or_default(config_file)?;
        Self::resolve_from(|key| std::env::var(key).ok(), &file, overrides)
    }

    /// Resolve with an explicit environment lookup.
    ///
    /// - Family size: `--family-size` > `FAMILY_SIZE` > `household.family_size` > 5
    /// - Model: `--model` > `GEMINI_MODEL` > `gemini.model` > `gemini-2.5-flash`
    /// - API key: `GEMINI_API_KEY` > `gemini.api_key` > error
    /// - SMTP: skipped with `--no-email`, otherwise server, address,
    ///   password, and recipient are required.
    pub fn resolve_from(
        lookup: impl Fn(&str) -> Option<String>,
        file: &ConfigFile,
        overrides: &CliOverrides,
    ) -> Result<Self, ConfigError> {
        let env = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        // Household.
        let family_size = match overrides.family_size {
            Some(n) => n,
            None => match env("FAMILY_SIZE") {
                Some(raw) => parse_value("FAMILY_SIZE", &raw)?,
                None => file.household.family_size.unwrap_or(DEFAULT_FAMILY_SIZE),
            },
        };
        if family_size == 0 {
            return Err(ConfigError::Invalid {
                key: "FAMILY_SIZE",
                value: family_size.to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        // Gemini.
        let api_key = env("GEMINI_API_KEY")
            .or_else(|| file.gemini.api_key.clone())
            .ok_or(ConfigError::Missing {
                key: "GEMINI_API_KEY",
            })?;
        let mut gemini = GeminiConfig::new(api_key);
        if let Some(model) = overrides
            .model
            .clone()
            .or_else(|| env("GEMINI_MODEL"))
            .or_else(|| file.gemini.model.clone())
        {
            gemini.model = model;
        }
        if let Some(base_url) = env("GEMINI_BASE_URL").or_else(|| file.gemini.base_url.clone()) {
            gemini.base_url = base_url;
        }
        let timeout_secs = match env("GEMINI_TIMEOUT_SECS") {
            Some(raw) => Some(parse_value::<u64>("GEMINI_TIMEOUT_SECS", &raw)?),
            None => file.gemini.timeout_secs,
        };
        if let Some(secs) = timeout_secs {
            if secs == 0 {
                return Err(ConfigError::Invalid {
                    key: "GEMINI_TIMEOUT_SECS",
                    value: secs.to_string(),
                    reason: "must be greater than zero".to_string(),
                });
            }
            gemini.timeout = Duration::from_secs(secs);
        }

        // SMTP.
        let smtp = if overrides.no_email {
            None
        } else {
            let section = &file.smtp;
            let required = |key: &'static str, from_file: &Option<String>| {
                env(key)
                    .or_else(|| from_file.clone())
                    .ok_or(ConfigError::Missing { key })
            };
            let server = required("SMTP_SERVER", &section.server)?;
            let port = match env("SMTP_PORT") {
                Some(raw) => parse_value("SMTP_PORT", &raw)?,
                None => section.port.unwrap_or(DEFAULT_SMTP_PORT),
            };
            let security = match env("SMTP_SECURITY").or_else(|| section.security.clone()) {
                Some(raw) => parse_value("SMTP_SECURITY", &raw)?,
                None => SmtpSecurity::for_port(port),
            };
            Some(SmtpConfig {
                server,
                port,
                security,
                address: required("EMAIL_ADDRESS", &section.address)?,
                password: required("EMAIL_PASSWORD", &section.password)?,
                recipient: required("RECIPIENT_EMAIL", &section.recipient)?,
            })
        };

        Ok(Self {
            gemini,
            smtp,
            family_size,
        })
    }
}

fn parse_value<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------

//! # Configuration Module
//!
//! Resolves which booking service to talk to and how. Configuration is
//! assembled once per process from three sources, later ones winning:
//!
//! ```text
//! +-------------------+     +-------------------+     +-------------------+
//! | booker.toml       | --> | BOOKER_* env vars | --> | ENVIRONMENT +     |
//! | (optional)        |     | (overrides)       |     | <ENV>_BASE_URL    |
//! +-------------------+     +-------------------+     +-------------------+
//!                                                              |
//!                                                              v
//!                                                     +-------------------+
//!                                                     | Config struct     |
//!                                                     | (passed to client)|
//!                                                     +-------------------+
//! ```
//!
//! ## Environment selection
//!
//! `ENVIRONMENT` must be `TEST` or `PROD` (case-insensitive). The base URL is
//! then read from `TEST_BASE_URL` or `PROD_BASE_URL`. A `.env` file in the
//! working directory is honored.
//!
//! ## Config File Location
//!
//! 1. If `BOOKER_CONFIG` is set, load from that path (it must exist)
//! 2. Otherwise, load `booker.toml` from the current directory if present
//!
//! ```toml
//! username = "admin"
//! password = "password123"
//! timeout = "5s"
//! test_ignore = ["booking::delete::delete_twice"]
//! ```

use once_cell::sync::Lazy;
use serde::Deserialize;
use std::{collections::HashMap, path::Path, sync::Arc, time::Duration};
use tracing::*;
use url::Url;

/// Environment variable name for specifying the config file path.
const BOOKER_CONFIG_ENV: &str = "BOOKER_CONFIG";

/// Environment variable selecting the target environment.
pub const ENVIRONMENT_ENV: &str = "ENVIRONMENT";

/// Default request timeout, applied to every call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

const DEFAULT_USERNAME: &str = "admin";
const DEFAULT_PASSWORD: &str = "password123";

static CONFIG: Lazy<Result<Arc<Config>, Error>> = Lazy::new(|| {
    let _ = dotenv::dotenv();
    Config::load().map(Arc::new)
});

/// Get the process-wide configuration, loading it on first access.
pub fn get_config() -> Result<Arc<Config>, Error> {
    (*CONFIG).clone()
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("Unsupported environment value: {0}")]
    UnsupportedEnvironment(String),
    #[error("environment variable {0} is not set")]
    MissingVar(String),
    #[error("{var} is not a valid URL: {reason}")]
    InvalidUrl { var: String, reason: String },
    #[error("{var} is not a valid duration: {reason}")]
    InvalidTimeout { var: String, reason: String },
    #[error("failed to load config file: {0}")]
    LoadError(String),
}

/// Target environment of the booking service.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, strum::EnumString, strum::Display, strum::IntoStaticStr,
)]
#[strum(ascii_case_insensitive, serialize_all = "UPPERCASE")]
pub enum Environment {
    Test,
    Prod,
}

impl Environment {
    /// Name of the environment variable holding this environment's base URL.
    pub fn base_url_var(&self) -> &'static str {
        match self {
            Environment::Test => "TEST_BASE_URL",
            Environment::Prod => "PROD_BASE_URL",
        }
    }
}

/// Username and password used for both the token exchange and HTTP Basic auth.
#[derive(Clone, PartialEq, Eq, serde::Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"*****")
            .finish()
    }
}

impl Default for Credentials {
    fn default() -> Self {
        Credentials {
            username: DEFAULT_USERNAME.to_string(),
            password: DEFAULT_PASSWORD.to_string(),
        }
    }
}

/// booker's configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub environment: Environment,
    pub base_url: Url,
    pub credentials: Credentials,
    /// Timeout applied uniformly to every request.
    pub timeout: Duration,
    /// Full test names (`module::name`) skipped by the runner.
    pub test_ignore: Vec<String>,
}

/// Optional settings read from `booker.toml`.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    username: Option<String>,
    password: Option<String>,
    #[serde(default, with = "humantime_serde")]
    timeout: Option<Duration>,
    test_base_url: Option<String>,
    prod_base_url: Option<String>,
    #[serde(default)]
    test_ignore: Vec<String>,
}

impl FileConfig {
    fn load_from(path: &Path) -> Result<FileConfig, Error> {
        let buf = std::fs::read_to_string(path).map_err(|e| Error::LoadError(e.to_string()))?;
        let cfg = toml::from_str(&buf).map_err(|e| {
            Error::LoadError(format!("failed to deserialize {}: {e}", path.display()))
        })?;
        debug!("{} was successfully loaded: {cfg:#?}", path.display());
        Ok(cfg)
    }

    fn load() -> Result<FileConfig, Error> {
        match std::env::var(BOOKER_CONFIG_ENV) {
            Ok(path) => {
                let path = Path::new(&path);
                if !path.exists() {
                    return Err(Error::LoadError(format!(
                        "Config file specified by {BOOKER_CONFIG_ENV} not found: {path:?}"
                    )));
                }
                debug!("Loading config from {BOOKER_CONFIG_ENV}={path:?}");
                FileConfig::load_from(path)
            }
            Err(_) => {
                let path = Path::new("booker.toml");
                if path.exists() {
                    FileConfig::load_from(path)
                } else {
                    Ok(FileConfig::default())
                }
            }
        }
    }

    fn base_url(&self, environment: Environment) -> Option<&str> {
        match environment {
            Environment::Test => self.test_base_url.as_deref(),
            Environment::Prod => self.prod_base_url.as_deref(),
        }
    }
}

impl Config {
    /// Load configuration from the process environment and the optional config file.
    pub fn load() -> Result<Config, Error> {
        let file = FileConfig::load()?;
        let vars: HashMap<String, String> = std::env::vars().collect();
        Config::resolve(file, |key| vars.get(key).cloned())
    }

    /// Build configuration from an arbitrary variable lookup, ignoring any config file.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Config, Error> {
        Config::resolve(FileConfig::default(), lookup)
    }

    fn resolve(
        file: FileConfig,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Config, Error> {
        let raw_environment = lookup(ENVIRONMENT_ENV).unwrap_or_default();
        let environment: Environment = raw_environment
            .trim()
            .parse()
            .map_err(|_| Error::UnsupportedEnvironment(raw_environment.clone()))?;

        let url_var = environment.base_url_var();
        let raw_url = lookup(url_var)
            .filter(|s| !s.trim().is_empty())
            .or_else(|| file.base_url(environment).map(str::to_string))
            .ok_or_else(|| Error::MissingVar(url_var.to_string()))?;
        let base_url = Url::parse(raw_url.trim()).map_err(|e| Error::InvalidUrl {
            var: url_var.to_string(),
            reason: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(Error::InvalidUrl {
                var: url_var.to_string(),
                reason: "URL cannot be used as a base".to_string(),
            });
        }

        let defaults = Credentials::default();
        let credentials = Credentials {
            username: lookup("BOOKER_USERNAME")
                .or(file.username)
                .unwrap_or(defaults.username),
            password: lookup("BOOKER_PASSWORD")
                .or(file.password)
                .unwrap_or(defaults.password),
        };

        let timeout = match lookup("BOOKER_TIMEOUT") {
            Some(raw) => humantime_serde::re::humantime::parse_duration(raw.trim()).map_err(
                |e| Error::InvalidTimeout {
                    var: "BOOKER_TIMEOUT".to_string(),
                    reason: e.to_string(),
                },
            )?,
            None => file.timeout.unwrap_or(DEFAULT_TIMEOUT),
        };

        let cfg = Config {
            environment,
            base_url,
            credentials,
            timeout,
            test_ignore: file.test_ignore,
        };
        debug!("booker configuration resolved: {cfg:#?}");
        Ok(cfg)
    }

    /// Join an endpoint path onto the base URL, keeping any path prefix of the base.
    pub fn endpoint(&self, path: &str) -> Url {
        let mut url = self.base_url.clone();
        let joined = format!(
            "{}/{}",
            url.path().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        url.set_path(&joined);
        url
    }
}

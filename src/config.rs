//! Configuration file handling for CuanBook.
//!
//! The configuration file is stored at `$CUANBOOK_HOME/config.json` and contains the backend URL
//! and request settings. `Config` also knows where the session, the profile and exported reports
//! live inside the home directory.

use crate::error::{ErrorType, IntoResult};
use crate::profile::ProfileStore;
use crate::session::SessionStore;
use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

const APP_NAME: &str = "cuanbook";
const CONFIG_VERSION: u8 = 1;
const SECRETS: &str = ".secrets";
const EXPORTS: &str = "exports";
const CONFIG_JSON: &str = "config.json";
const SESSION_JSON: &str = "session.json";
const PROFILE_JSON: &str = "profile.json";
const TIMEOUT_SECS: u64 = 30;

/// The backend used when `cuan init` is not given one.
pub const DEFAULT_API_URL: &str = "http://localhost:3000/api";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$CUANBOOK_HOME` and from there it loads `$CUANBOOK_HOME/config.json`.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    secrets: PathBuf,
    exports: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
    api_url: Url,
}

impl Config {
    /// Creates the home directory, its subdirectories and an initial `config.json`.
    ///
    /// # Arguments
    /// - `dir` - The directory that will be the root of the home directory, e.g. `$HOME/cuanbook`
    /// - `api_url` - Base URL of the CuanBook REST backend, e.g. `http://localhost:3000/api`
    ///
    /// # Errors
    /// - Returns an error if `api_url` is not an http(s) URL, if the home directory has already
    ///   been initialized, or if any file operation fails.
    pub async fn create(dir: impl Into<PathBuf>, api_url: &str) -> Result<Self> {
        let api_url = parse_api_url(api_url)?;

        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the CuanBook home directory")
            .pub_result(ErrorType::Config)?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let config_path = root.join(CONFIG_JSON);
        if config_path.exists() {
            return Err(anyhow::anyhow!(
                "CuanBook is already initialized at '{}'",
                root.display()
            ))
            .pub_result(ErrorType::Config);
        }

        let secrets = root.join(SECRETS);
        utils::make_dir(&secrets).await?;
        let exports = root.join(EXPORTS);
        utils::make_dir(&exports).await?;

        let config_file = ConfigFile {
            api_url: api_url.to_string(),
            ..ConfigFile::default()
        };
        config_file.save(&config_path).await?;

        Ok(Self {
            root,
            secrets,
            exports,
            config_path,
            config_file,
            api_url,
        })
    }

    /// This will
    /// - validate that the home directory and the config file exist
    /// - load and validate the config file
    /// - validate that the secrets and exports directories exist
    pub async fn load(cuanbook_home: impl Into<PathBuf>) -> Result<Self> {
        Self::load_inner(cuanbook_home.into())
            .await
            .pub_result(ErrorType::Config)
    }

    async fn load_inner(maybe_relative: PathBuf) -> Result<Self> {
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("CuanBook home is missing, run 'cuan init' first")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!(
                "The config file is missing '{}', run 'cuan init' first",
                config_path.display()
            )
        }
        let config_file = ConfigFile::load(&config_path).await?;
        let api_url = parse_api_url(&config_file.api_url)?;

        let config = Self {
            secrets: root.join(SECRETS),
            exports: root.join(EXPORTS),
            root,
            config_path,
            config_file,
            api_url,
        };
        if !config.secrets.is_dir() {
            bail!(
                "The secrets directory is missing '{}'",
                config.secrets.display()
            )
        }
        if !config.exports.is_dir() {
            bail!(
                "The exports directory is missing '{}'",
                config.exports.display()
            )
        }
        Ok(config)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn secrets(&self) -> &Path {
        &self.secrets
    }

    /// Where exported reports go when no output path is given.
    pub fn exports(&self) -> &Path {
        &self.exports
    }

    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    /// Upper bound for a single backend request.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.config_file.timeout_secs)
    }

    pub fn session_path(&self) -> PathBuf {
        self.secrets.join(SESSION_JSON)
    }

    pub fn profile_path(&self) -> PathBuf {
        self.root.join(PROFILE_JSON)
    }

    pub fn session_store(&self) -> SessionStore {
        SessionStore::new(self.session_path())
    }

    pub fn profile_store(&self) -> ProfileStore {
        ProfileStore::new(self.profile_path())
    }
}

/// Parses and checks a backend base URL.
fn parse_api_url(s: &str) -> Result<Url> {
    let url = Url::parse(s.trim())
        .with_context(|| format!("Invalid API URL '{s}'"))
        .pub_result(ErrorType::Config)?;
    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(anyhow::anyhow!(
            "Invalid API URL '{s}': expected an http or https URL"
        ))
        .pub_result(ErrorType::Config);
    }
    Ok(url)
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "cuanbook",
///   "config_version": 1,
///   "api_url": "http://localhost:3000/api",
///   "timeout_secs": 30
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "cuanbook"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// Base URL of the REST backend
    api_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    TIMEOUT_SECS
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            api_url: DEFAULT_API_URL.to_string(),
            timeout_secs: TIMEOUT_SECS,
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile asynchronously from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or if it belongs to another app.
    async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config: ConfigFile = utils::deserialize(path).await?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );

        Ok(config)
    }

    async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        utils::serialize(path.as_ref(), self)
            .await
            .context("Unable to write config file")
    }
}

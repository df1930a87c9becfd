//! Run configuration
//!
//! Settings come from environment variables (optionally sourced from a
//! dotenv file by the binary) and can be overridden by command line flags.
//!
//! Recognised variables:
//! - FIRESTORE_PROJECT_ID: Google Cloud project (required unless dry-running)
//! - FIRESTORE_DATABASE: Database ID (default: `(default)`)
//! - FIRESTORE_EMULATOR_HOST: `host:port` of a local emulator
//! - FIRESTORE_ACCESS_TOKEN: OAuth2 access token for production Firestore
//! - FIRESTORE_BASE_URL: Override for the REST root
//! - SEED_BATCH_SIZE: Writes per atomic commit (default: 500)
//! - SEED_FILE: Seed file to load instead of the built-in data

use crate::batch::MAX_WRITES_PER_COMMIT;
use crate::client::{Auth, AuthType, DEFAULT_BASE_URL, DEFAULT_DATABASE};
use eyre::{Context, Result};
use std::path::PathBuf;
use url::Url;

#[derive(Debug, Clone, PartialEq)]
pub struct SeedConfig {
    pub project_id: Option<String>,
    pub database: String,
    pub emulator_host: Option<String>,
    pub access_token: Option<String>,
    pub base_url: Option<String>,
    pub batch_size: usize,
    pub seed_file: Option<PathBuf>,
    pub clear: bool,
    pub dry_run: bool,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            project_id: None,
            database: DEFAULT_DATABASE.to_string(),
            emulator_host: None,
            access_token: None,
            base_url: None,
            batch_size: MAX_WRITES_PER_COMMIT,
            seed_file: None,
            clear: false,
            dry_run: false,
        }
    }
}

impl SeedConfig {
    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary variable lookup
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let batch_size = match var("SEED_BATCH_SIZE") {
            Some(value) => value
                .trim()
                .parse()
                .with_context(|| format!("Invalid SEED_BATCH_SIZE: {}", value))?,
            None => MAX_WRITES_PER_COMMIT,
        };

        Ok(Self {
            project_id: var("FIRESTORE_PROJECT_ID"),
            database: var("FIRESTORE_DATABASE").unwrap_or_else(|| DEFAULT_DATABASE.to_string()),
            emulator_host: var("FIRESTORE_EMULATOR_HOST"),
            access_token: var("FIRESTORE_ACCESS_TOKEN"),
            base_url: var("FIRESTORE_BASE_URL"),
            batch_size,
            seed_file: var("SEED_FILE").map(PathBuf::from),
            clear: false,
            dry_run: false,
        })
    }

    /// Check the settings needed before any write is attempted
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 || self.batch_size > MAX_WRITES_PER_COMMIT {
            eyre::bail!(
                "Batch size must be between 1 and {}, got {}",
                MAX_WRITES_PER_COMMIT,
                self.batch_size
            );
        }
        if !self.dry_run && self.project_id.is_none() {
            eyre::bail!("FIRESTORE_PROJECT_ID environment variable not set");
        }
        Ok(())
    }

    /// Which authentication mode the settings imply
    ///
    /// An emulator host wins over an access token.
    pub fn auth_type(&self) -> AuthType {
        if self.emulator_host.is_some() {
            AuthType::Emulator
        } else if self.access_token.is_some() {
            AuthType::Bearer
        } else {
            AuthType::None
        }
    }

    pub fn auth(&self) -> Auth {
        Auth::new(&self.auth_type(), self.access_token.clone())
    }

    /// REST root: explicit override, then emulator, then production
    pub fn rest_url(&self) -> Result<Url> {
        let raw = match (&self.base_url, &self.emulator_host) {
            (Some(url), _) => url.clone(),
            (None, Some(host)) => format!("http://{}/v1/", host),
            (None, None) => DEFAULT_BASE_URL.to_string(),
        };
        Url::parse(&raw).with_context(|| format!("Invalid Firestore URL: {}", raw))
    }
}

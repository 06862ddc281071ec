//! Configuration for the table tools.
//!
//! A run is configured from three layers, highest precedence first: command
//! line flags, the named environment profile in the JSON config file, and the
//! config file's top-level settings. Everything is resolved once, before any
//! request is sent, into immutable values that are passed down by parameter.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use dynarchive_model::Key;
use dynarchive_model::types::KeyConditions;
use serde::Deserialize;

use crate::error::{ArchiveError, ArchiveResult};
use crate::pacing::{DEFAULT_QUOTA, DEFAULT_RATE};

/// Config file read when no path is given.
pub const DEFAULT_CONFIG_PATH: &str = "config.json";

// ---------------------------------------------------------------------------
// Config file
// ---------------------------------------------------------------------------

/// The JSON config file shared by all tools.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    /// Named connection profiles.
    #[serde(default)]
    pub env: HashMap<String, Profile>,
    /// Throughput percentage (or record count for `dynamo-top`).
    #[serde(default)]
    pub rate: Option<u64>,
    /// Upper bound on the capacity units used for pacing.
    #[serde(default)]
    pub quota: Option<u64>,
    /// Legacy key conditions, as a JSON string or an inline object.
    #[serde(default)]
    pub query: Option<serde_json::Value>,
    /// Profile used for the source side.
    #[serde(default)]
    pub srcenv: Option<String>,
    /// Profile used for the destination side.
    #[serde(default)]
    pub destenv: Option<String>,
    /// Continuation key to resume from, as a JSON string or an inline object.
    #[serde(default)]
    pub lastkey: Option<serde_json::Value>,
}

/// Connection details for one named environment.
#[derive(Clone, Default, Deserialize)]
pub struct Profile {
    /// Access key id.
    #[serde(default)]
    pub aws_access_key_id: Option<String>,
    /// Secret access key.
    #[serde(default)]
    pub aws_secret_access_key: Option<String>,
    /// Region name.
    #[serde(default)]
    pub region: Option<String>,
    /// Endpoint override, e.g. a local DynamoDB.
    #[serde(default, rename = "endpointUrl")]
    pub endpoint_url: Option<String>,
}

impl fmt::Debug for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Profile")
            .field("aws_access_key_id", &self.aws_access_key_id)
            .field(
                "aws_secret_access_key",
                &self.aws_secret_access_key.as_ref().map(|_| "***"),
            )
            .field("region", &self.region)
            .field("endpoint_url", &self.endpoint_url)
            .finish()
    }
}

impl ConfigFile {
    /// Parse a config file from its JSON text.
    pub fn from_json(text: &str) -> ArchiveResult<Self> {
        serde_json::from_str(text)
            .map_err(|e| ArchiveError::config(format!("invalid config file: {e}")))
    }

    /// Load a config file that must exist.
    pub fn load(path: &Path) -> ArchiveResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            ArchiveError::config(format!("cannot read config file {}: {e}", path.display()))
        })?;
        Self::from_json(&text).map_err(|e| match e {
            ArchiveError::Config(msg) => ArchiveError::Config(format!("{}: {msg}", path.display())),
            other => other,
        })
    }

    /// Load the requested config file, or the default one when none is
    /// requested.
    ///
    /// A requested file must exist. The default file is optional and an
    /// empty configuration is used when it is absent.
    pub fn resolve(requested: Option<&Path>) -> ArchiveResult<Self> {
        if let Some(path) = requested {
            return Self::load(path);
        }
        let default = Path::new(DEFAULT_CONFIG_PATH);
        if default.exists() {
            Self::load(default)
        } else {
            tracing::debug!(path = DEFAULT_CONFIG_PATH, "no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Look up a named profile.
    pub fn profile(&self, name: &str) -> ArchiveResult<&Profile> {
        self.env
            .get(name)
            .ok_or_else(|| ArchiveError::config(format!("environment {name} not found in config")))
    }

    /// Resolve the connection for one side of a run.
    ///
    /// Flags win over the profile; an unnamed profile contributes nothing, so
    /// the client library's default credential chain and region apply.
    pub fn connection(
        &self,
        env_name: Option<&str>,
        overrides: &ConnectionOverrides,
    ) -> ArchiveResult<Connection> {
        let empty = Profile::default();
        let profile = match env_name {
            Some(name) => self.profile(name)?,
            None => &empty,
        };

        let key = overrides
            .access_key_id
            .clone()
            .or_else(|| profile.aws_access_key_id.clone());
        let secret = overrides
            .secret_access_key
            .clone()
            .or_else(|| profile.aws_secret_access_key.clone());
        let credentials = match (key, secret) {
            (Some(access_key_id), Some(secret_access_key)) => Some(StaticCredentials {
                access_key_id,
                secret_access_key,
            }),
            (None, None) => None,
            (Some(_), None) => {
                return Err(ArchiveError::config("access key given without a secret key"));
            }
            (None, Some(_)) => {
                return Err(ArchiveError::config("secret key given without an access key"));
            }
        };

        Ok(Connection {
            credentials,
            region: overrides.region.clone().or_else(|| profile.region.clone()),
            endpoint_url: overrides
                .endpoint_url
                .clone()
                .or_else(|| profile.endpoint_url.clone()),
        })
    }
}

// ---------------------------------------------------------------------------
// Connections
// ---------------------------------------------------------------------------

/// Connection values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct ConnectionOverrides {
    /// `--key`.
    pub access_key_id: Option<String>,
    /// `--secret`.
    pub secret_access_key: Option<String>,
    /// `--region`.
    pub region: Option<String>,
    /// `--endpoint`.
    pub endpoint_url: Option<String>,
}

/// A static access key pair.
#[derive(Clone, PartialEq, Eq)]
pub struct StaticCredentials {
    /// Access key id.
    pub access_key_id: String,
    /// Secret access key.
    pub secret_access_key: String,
}

impl fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"***")
            .finish()
    }
}

/// Resolved connection for one side of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Connection {
    /// Explicit credentials; `None` defers to the default provider chain.
    pub credentials: Option<StaticCredentials>,
    /// Region; `None` defers to the default region chain.
    pub region: Option<String>,
    /// Endpoint override.
    pub endpoint_url: Option<String>,
}

// ---------------------------------------------------------------------------
// Run settings
// ---------------------------------------------------------------------------

/// Run values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct RunOverrides {
    /// `--rate`.
    pub rate: Option<u64>,
    /// `--query`, legacy key conditions as JSON.
    pub query: Option<String>,
    /// `--lastkey`, a continuation key as JSON.
    pub lastkey: Option<String>,
}

/// Immutable settings for one replication run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    /// Upper bound on the capacity units used for pacing.
    pub quota: u64,
    /// Percentage of the paced capacity to use.
    pub rate: u64,
    /// Key conditions; presence switches reads from `Scan` to `Query`.
    pub key_conditions: Option<KeyConditions>,
    /// Continuation key of a previous run to resume from.
    pub start_key: Option<Key>,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            quota: DEFAULT_QUOTA,
            rate: DEFAULT_RATE,
            key_conditions: None,
            start_key: None,
        }
    }
}

impl RunSettings {
    /// Merge flags over the config file.
    pub fn resolve(file: &ConfigFile, overrides: &RunOverrides) -> ArchiveResult<Self> {
        let rate = overrides.rate.or(file.rate).unwrap_or(DEFAULT_RATE);
        if rate == 0 {
            return Err(ArchiveError::config("rate must be a positive percentage"));
        }

        let key_conditions: Option<KeyConditions> = match &overrides.query {
            Some(text) => Some(parse_json_str(text, "query")?),
            None => file
                .query
                .as_ref()
                .map(|v| parse_json_value(v, "query"))
                .transpose()?,
        };

        let start_key: Option<Key> = match &overrides.lastkey {
            Some(text) => Some(parse_json_str(text, "lastkey")?),
            None => file
                .lastkey
                .as_ref()
                .map(|v| parse_json_value(v, "lastkey"))
                .transpose()?,
        };

        Ok(Self {
            quota: file.quota.unwrap_or(DEFAULT_QUOTA),
            rate,
            key_conditions: key_conditions.filter(|c| !c.is_empty()),
            start_key: start_key.filter(|k| !k.is_empty()),
        })
    }
}

fn parse_json_str<T: serde::de::DeserializeOwned>(text: &str, what: &str) -> ArchiveResult<T> {
    serde_json::from_str(text).map_err(|e| ArchiveError::config(format!("invalid {what}: {e}")))
}

/// Values stored as a JSON string are decoded twice; objects only once.
fn parse_json_value<T: serde::de::DeserializeOwned>(
    value: &serde_json::Value,
    what: &str,
) -> ArchiveResult<T> {
    match value {
        serde_json::Value::String(text) => parse_json_str(text, what),
        other => T::deserialize(other)
            .map_err(|e| ArchiveError::config(format!("invalid {what}: {e}"))),
    }
}

use anyhow::Result;
use chrono_tz::Tz;
use config::Config;
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_LINK_ATTRIBUTE, DEFAULT_TIMEZONE};
use crate::error::{CoreError, CoreResult};

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub airtable: AirtableConfig,
    pub chatwoot: ChatwootConfig,
    pub sync: SyncConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    /// ## Summary
    /// Returns the bind address as a string in the format "host:port".
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

#[derive(Clone, Deserialize)]
pub struct AirtableConfig {
    /// REST endpoint root, e.g. `https://api.airtable.com/v0`.
    pub api_url: String,
    /// Web UI root used to build record links shown to operators.
    pub web_url: String,
    pub base_id: String,
    pub token: String,
    pub contacts_table: String,
    pub tickets_table: String,
    pub channels_table: String,
    pub operators_table: String,
}

// Keeps the API token out of the startup log line.
impl std::fmt::Debug for AirtableConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AirtableConfig")
            .field("api_url", &self.api_url)
            .field("web_url", &self.web_url)
            .field("base_id", &self.base_id)
            .field("token", &"<redacted>")
            .field("contacts_table", &self.contacts_table)
            .field("tickets_table", &self.tickets_table)
            .field("channels_table", &self.channels_table)
            .field("operators_table", &self.operators_table)
            .finish()
    }
}

#[derive(Clone, Deserialize)]
pub struct ChatwootConfig {
    pub url: String,
    pub token: String,
    /// Contact custom attribute holding the record-store URL of the contact card.
    pub link_attribute: String,
}

impl std::fmt::Debug for ChatwootConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatwootConfig")
            .field("url", &self.url)
            .field("token", &"<redacted>")
            .field("link_attribute", &self.link_attribute)
            .finish()
    }
}

/// Which tickets an outgoing message may reassign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssigneePolicy {
    /// Every outgoing message overwrites the assignee.
    #[default]
    Always,
    /// Only tickets still in `New` are reassigned.
    OnlyNew,
}

/// Backing implementation for the record store and chat platform clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// Airtable for records, Chatwoot for notes and contact attributes.
    #[default]
    Airtable,
    /// Process-local dry-run backend; nothing leaves the process.
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    pub timezone: Tz,
    pub assignee_policy: AssigneePolicy,
    pub backend: Backend,
    /// Operator names seeded into the `memory` backend so assignee sync can resolve them.
    #[serde(default)]
    pub memory_operators: Vec<String>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            timezone: chrono_tz::Asia::Tbilisi,
            assignee_policy: AssigneePolicy::default(),
            backend: Backend::default(),
            memory_operators: Vec::new(),
        }
    }
}

impl Settings {
    /// ## Summary
    /// Loads configuration from environment variables and an optional `config.toml`.
    /// Environment variables take precedence over file values.
    ///
    /// ## Errors
    /// Returns an error if building the configuration or deserializing it fails.
    pub fn load() -> Result<Self> {
        Ok(Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8698)?
            .set_default("logging.level", "debug")?
            .set_default("airtable.api_url", "https://api.airtable.com/v0")?
            .set_default("airtable.web_url", "https://airtable.com")?
            .set_default("airtable.base_id", "")?
            .set_default("airtable.token", "")?
            .set_default("airtable.contacts_table", "Contacts")?
            .set_default("airtable.tickets_table", "Tickets")?
            .set_default("airtable.channels_table", "Channels")?
            .set_default("airtable.operators_table", "Operators")?
            .set_default("chatwoot.url", "")?
            .set_default("chatwoot.token", "")?
            .set_default("chatwoot.link_attribute", DEFAULT_LINK_ATTRIBUTE)?
            .set_default("sync.timezone", DEFAULT_TIMEZONE)?
            .set_default("sync.assignee_policy", "always")?
            .set_default("sync.backend", "airtable")?
            // TOML file
            .add_source(config::File::with_name("config.toml").required(false))
            // Env, e.g. DESKBRIDGE__AIRTABLE__BASE_ID
            .add_source(
                config::Environment::with_prefix("DESKBRIDGE")
                    .prefix_separator("__")
                    .separator("__")
                    .ignore_empty(true)
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("sync.memory_operators"),
            )
            .build()?
            .try_deserialize::<Settings>()?)
    }

    /// ## Summary
    /// Checks that the credentials needed by the selected backend are present.
    ///
    /// ## Errors
    /// Returns `CoreError::ConfigError` naming the first missing setting.
    pub fn validate(&self) -> CoreResult<()> {
        if self.sync.backend == Backend::Memory {
            return Ok(());
        }

        let required = [
            ("airtable.base_id", &self.airtable.base_id),
            ("airtable.token", &self.airtable.token),
            ("chatwoot.url", &self.chatwoot.url),
            ("chatwoot.token", &self.chatwoot.token),
        ];

        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(CoreError::ConfigError(format!("{key} must be set")));
            }
        }

        Ok(())
    }
}

/// ## Summary
/// Loads configuration from environment variables and `.env` file.
///
/// ## Errors
/// Returns an error if loading or deserializing the configuration fails.
pub fn load_config() -> Result<Settings> {
    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!(error = %e, "No .env file loaded");
    }

    Settings::load()
}

//! # Configuration Management

//! This module handles the configuration loading for the lift adapter.
//! It leverages the `config` crate to layer settings from several sources:

//! * YAML configuration files (default.yaml, then an optional development.yaml / production.yaml)
//! * Environment variables prefixed with `APP`

//! The core of this module is the `Settings` struct, which encapsulates everything the adapter needs to reach
//! the lift's vendor API and the fleet message bus.

use serde::Deserialize;
use config::{Config, Environment, File};
use std::{env, fmt};
use std::path::PathBuf;
use std::time::Duration;
use secrecy::{Secret, ExposeSecret};
use tracing::debug;
use url::Url;
use crate::errors::LiftAdapterError;

/// Represents the complete set of configuration settings for the lift adapter.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    /// Settings for reaching the lift's vendor API
    pub lift: LiftSettings,
    /// Poll cadence and retry backoffs
    #[serde(default)]
    pub timing: TimingSettings,
    /// Settings for application logging
    pub logging: LoggingSettings,
    /// Settings for connecting to the RabbitMQ message broker
    pub rabbitmq: RabbitMQSettings,
}

/// Identifies the lift and how to talk to its vendor API.
#[derive(Debug, Deserialize, Clone)]
pub struct LiftSettings {
    /// The lift name used on the bus; requests for other names are ignored
    pub name: String,
    /// Base URL of the vendor REST API
    pub api_endpoint: String,
    /// Name of the authentication header sent with every call
    pub header_key: String,
    /// Value of the authentication header
    #[serde(deserialize_with = "deserialize_secret")]
    pub header_value: Secret<String>,
    /// Device-side identifier placed in every request body
    pub lift_id: String,
    /// Per-call timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Number of handshake attempts before startup is abandoned
    #[serde(default = "default_connect_attempts")]
    pub connect_attempts: u32,
    /// Delay between handshake attempts in milliseconds
    #[serde(default = "default_connect_retry_ms")]
    pub connect_retry_ms: u64,
}

impl LiftSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn connect_retry(&self) -> Duration {
        Duration::from_millis(self.connect_retry_ms)
    }
}

/// Poll cadence and retry backoffs, all in milliseconds.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct TimingSettings {
    /// Period of the state poll / publish cycle
    pub poll_interval_ms: u64,
    /// Backoff between floor command attempts
    pub agv_retry_ms: u64,
    /// Backoff between door command attempts
    pub door_retry_ms: u64,
    /// How often a human mode request re-reads the state while waiting for arrival
    pub arrival_poll_ms: u64,
}

impl Default for TimingSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1000,
            agv_retry_ms: 2000,
            door_retry_ms: 3000,
            arrival_poll_ms: 1000,
        }
    }
}

impl TimingSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn floor_retry(&self) -> Duration {
        Duration::from_millis(self.agv_retry_ms)
    }

    pub fn door_retry(&self) -> Duration {
        Duration::from_millis(self.door_retry_ms)
    }

    pub fn arrival_poll(&self) -> Duration {
        Duration::from_millis(self.arrival_poll_ms)
    }
}

/// Holds the configuration settings for application logging
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSettings {
    /// The logging level (e.g., "info", "debug", "error")
    pub level: String,
    /// The directory path where log files will be stored (optional)
    pub path: Option<PathBuf>,
}

/// Holds the configuration settings required to establish a connection to the RabbitMQ message broker.
#[derive(Debug, Deserialize, Clone)]
pub struct RabbitMQSettings {
    /// The hostname or IP address of the RabbitMQ server
    pub host: String,
    /// The port number on which the RabbitMQ server is listening
    pub port: u16,
    /// The username for RabbitMQ authentication
    pub username: String,
    /// The password for RabbitMQ authentication
    #[serde(default, deserialize_with = "deserialize_optional_secret")]
    pub password: Option<Secret<String>>,
    /// The name of the RabbitMQ topic exchange carrying lift traffic
    pub exchange: String,
    /// The virtual host to connect to on the RabbitMQ server
    pub vhost: String,
    /// Routing key for outbound lift state
    #[serde(default = "default_state_routing_key")]
    pub state_routing_key: String,
    /// Routing key for inbound lift requests
    #[serde(default = "default_request_routing_key")]
    pub request_routing_key: String,
    /// Queue this adapter consumes requests from
    pub request_queue: String,
}

impl RabbitMQSettings {
    /// Constructs a connection string for RabbitMQ based on the settings.
    ///
    /// # Returns
    ///
    /// A `Secret<String>` containing the AMQP URL, or a `ConfigError` when the host or credentials
    /// cannot form a valid URL.
    pub fn connection_string(&self) -> Result<Secret<String>, LiftAdapterError> {
        let mut url = Url::parse(&format!("amqp://{}:{}", self.host, self.port))
            .map_err(|e| LiftAdapterError::ConfigError(format!("Invalid RabbitMQ URL: {}", e)))?;

        url.set_username(&self.username)
            .map_err(|_| LiftAdapterError::ConfigError("Failed to set RabbitMQ username".to_string()))?;
        if let Some(password) = &self.password {
            url.set_password(Some(password.expose_secret()))
                .map_err(|_| LiftAdapterError::ConfigError("Failed to set RabbitMQ password".to_string()))?;
        }
        url.set_path(&self.vhost);

        Ok(Secret::new(url.to_string()))
    }
}

fn default_timeout_ms() -> u64 { 1000 }
fn default_connect_attempts() -> u32 { 5 }
fn default_connect_retry_ms() -> u64 { 1000 }
fn default_state_routing_key() -> String { "lift_states".to_string() }
fn default_request_routing_key() -> String { "lift_requests".to_string() }

impl Settings {
    /// Loads and constructs the application settings from various configuration sources.
    ///
    /// Sources, in order of precedence (later overrides earlier):
    ///
    /// 1. `default.yaml`
    /// 2. Environment-specific YAML file (e.g. `development.yaml`) chosen by the `RUN_MODE` environment variable
    /// 3. Environment variables prefixed with `APP` (e.g. `APP__LIFT__NAME`)
    ///
    /// The `CONFIG_DIR` environment variable selects the directory holding the YAML files (defaults to "src/config").
    pub fn new() -> Result<Self, LiftAdapterError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
        let config_dir = env::var("CONFIG_DIR").unwrap_or_else(|_| "src/config".into());
        debug!("Run Mode: {:?}, Config Dir: {:?}", run_mode, config_dir);

        let s = Config::builder()
            .add_source(File::with_name(&format!("{}/default", config_dir)))
            .add_source(File::with_name(&format!("{}/{}", config_dir, run_mode)).required(false))
            .add_source(Environment::with_prefix("APP").separator("__"))
            .build()?;

        let mut s: Self = s.try_deserialize::<Settings>()
            .map_err(LiftAdapterError::from)?;

        if let Some(ref mut path) = s.logging.path {
            *path = env::current_dir()?.join(path.clone());
        }

        Ok(s)
    }
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<Secret<String>, D::Error>
    where
        D: serde::Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    Ok(Secret::new(value))
}

/// Deserializes an optional secret string from configuration into a `Secret<String>`
fn deserialize_optional_secret<'de, D>(deserializer: D) -> Result<Option<Secret<String>>, D::Error>
    where
        D: serde::Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt.map(Secret::new))
}

impl fmt::Display for LiftSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "LiftSettings {{ name: {}, api_endpoint: {}, header_key: {}, lift_id: {}, timeout_ms: {} }}",
            self.name, self.api_endpoint, self.header_key, self.lift_id, self.timeout_ms
        )
    }
}

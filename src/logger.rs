//! # Logging
//!
//! Diagram generation reports through `tracing`. Embedding applications usually
//! install their own subscriber; [`init`] is there for command line wrappers
//! and tests that want one set up from a [`LoggerConfig`].
use serde::{Deserialize, Serialize};
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

use crate::{Error, Result};

const MODULE_WHITELIST: &[&str] = &["loco_erd"];

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum LogLevel {
    #[serde(rename = "off")]
    Off,
    #[serde(rename = "trace")]
    Trace,
    #[serde(rename = "debug")]
    Debug,
    #[serde(rename = "info")]
    #[default]
    Info,
    #[serde(rename = "warn")]
    Warn,
    #[serde(rename = "error")]
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Off => "off",
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        })
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum Format {
    #[serde(rename = "compact")]
    #[default]
    Compact,
    #[serde(rename = "pretty")]
    Pretty,
    #[serde(rename = "json")]
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LoggerConfig {
    pub enable: bool,
    #[serde(default)]
    pub level: LogLevel,
    #[serde(default)]
    pub format: Format,
    /// Raw `EnvFilter` directives replacing the level based filter.
    #[serde(default)]
    pub override_filter: Option<String>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            enable: true,
            level: LogLevel::default(),
            format: Format::default(),
            override_filter: None,
        }
    }
}

/// Installs a global subscriber described by `config`.
///
/// `RUST_LOG` takes precedence over the configured level.
///
/// # Errors
///
/// Fails when the filter directives do not parse or when a global subscriber
/// is already installed.
pub fn init(config: &LoggerConfig) -> Result<()> {
    if !config.enable {
        return Ok(());
    }

    let layer: Box<dyn Layer<Registry> + Send + Sync> = match config.format {
        Format::Compact => fmt::Layer::default().compact().boxed(),
        Format::Pretty => fmt::Layer::default().pretty().boxed(),
        Format::Json => fmt::Layer::default().json().boxed(),
    };

    tracing_subscriber::registry()
        .with(layer)
        .with(env_filter(config)?)
        .try_init()
        .map_err(Error::wrap)
}

fn env_filter(config: &LoggerConfig) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(directives(config)).map_err(Error::wrap)
}

fn directives(config: &LoggerConfig) -> String {
    config.override_filter.clone().unwrap_or_else(|| {
        MODULE_WHITELIST
            .iter()
            .map(|module| format!("{module}={}", config.level))
            .collect::<Vec<_>>()
            .join(",")
    })
}

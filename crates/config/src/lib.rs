#![deny(
    trivial_numeric_casts,
    missing_docs,
    unsafe_code,
    unstable_features,
    unused_import_braces,
    unused_qualifications,
    unused_extern_crates,
    unused_results
)]
#![warn(rust_2021_compatibility, unreachable_pub)]

//! Orchestrator configuration: provider-order policy, plugin-search-path,
//! and verbosity.
//!
//! The core does not discover or load providers itself. An embedding
//! application constructs concrete `Provider`s and calls
//! `Orchestrator::register_provider`. This crate only resolves the
//! declarative knobs that govern *how* that embedding application should do
//! so: an explicit registration order versus a plugin-discovery directory,
//! where to look for dynamically discovered providers, and how noisy
//! provider-load failures should be. Environment variables and file paths
//! for provider-specific configuration are out of scope.

use std::{fs::File, io::BufReader, path::PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Errors for the config module.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The config file could not be read or did not parse.
    #[error("invalid configuration file `{file}` - {message}")]
    InvalidConfig {
        /// The path to the config file.
        file: String,
        /// The error message.
        message: String,
    },
}

/// How the embedding application should decide which providers to register,
/// and in what order.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProviderOrder {
    /// Register exactly the named providers, in this order. Registration
    /// priority follows this list reversed: the last name wins ties.
    Explicit {
        /// Provider names, in registration order.
        providers: Vec<String>,
    },
    /// Discover providers dynamically from `plugin_search_path`, in
    /// whatever order the embedding application's loader enumerates them.
    PluginDiscovery,
}

impl Default for ProviderOrder {
    fn default() -> Self {
        ProviderOrder::PluginDiscovery
    }
}

/// How noisy provider-load failures should be.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Verbosity {
    /// Provider load failures are not logged.
    Quiet,
    /// Provider load failures are logged at `warn`.
    Normal,
    /// Provider load failures are logged at `warn`, with every candidate's
    /// diagnostic message included.
    Verbose,
}

impl Default for Verbosity {
    fn default() -> Self {
        Verbosity::Normal
    }
}

/// Resolved orchestrator configuration.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Config {
    /// Explicit list vs. plugin-discovery.
    #[serde(default)]
    pub provider_order: ProviderOrder,

    /// Directories searched for dynamically discovered providers, in
    /// search order. Empty when `provider_order` is `Explicit`.
    #[serde(default)]
    pub plugin_search_path: Vec<PathBuf>,

    /// Controls whether provider load failures are logged by the embedding
    /// application's loader.
    #[serde(default)]
    pub verbosity: Verbosity,
}

impl Config {
    /// An empty configuration: plugin-discovery with no search path and
    /// normal verbosity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads and validates configuration from a YAML document at
    /// `config_file_path`.
    pub fn load(config_file_path: impl AsRef<std::path::Path>) -> Result<Self, Error> {
        let config_file_name = config_file_path.as_ref().display().to_string();
        debug!("loading {}", config_file_name);

        let config_file = File::open(config_file_path).map_err(|err| Error::InvalidConfig {
            file: config_file_name.clone(),
            message: err.to_string(),
        })?;
        let reader = BufReader::new(config_file);
        let config: Config = serde_yaml::from_reader(reader).map_err(|err| Error::InvalidConfig {
            file: config_file_name.clone(),
            message: err.to_string(),
        })?;

        debug!("{} loaded", config_file_name);
        Ok(config)
    }

    /// Logs a provider-load failure at the configured verbosity. A no-op
    /// under `Verbosity::Quiet`.
    pub fn log_provider_load_failure(&self, provider_name: &str, reason: &str) {
        match self.verbosity {
            Verbosity::Quiet => {}
            Verbosity::Normal => tracing::warn!(provider = provider_name, "provider failed to load"),
            Verbosity::Verbose => tracing::warn!(provider = provider_name, %reason, "provider failed to load"),
        }
    }
}

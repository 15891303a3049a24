//! Protocol Configuration Module
//!
//! Provides configuration loading for an AMM deployment: the identities of
//! the registry and router, the initial fee administrator, and an optional
//! override of the pair code fingerprint. Supports loading from TOML files
//! with environment-specific overrides and `AMM_`-prefixed variables.

use anyhow::{bail, Context, Result};
use config_crate::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use types::{Address, H256};

/// Default location of the base configuration file
pub const DEFAULT_CONFIG_PATH: &str = "config/amm.toml";

/// Main protocol configuration structure
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq, Default)]
#[serde(default)]
pub struct ProtocolConfig {
    /// Pair registry settings
    pub registry: RegistryConfig,

    /// Router settings
    pub router: RouterConfig,
}

/// Pair registry settings
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct RegistryConfig {
    /// Identity of the registry, hashed into every pair address
    pub address: Address,

    /// Initial fee administrator
    pub fee_to_setter: Address,

    /// Initial protocol fee recipient; protocol fee is off when absent
    pub fee_to: Option<Address>,

    /// Pair code fingerprint override
    pub pair_code_hash: Option<H256>,
}

/// Router settings
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct RouterConfig {
    /// Identity of the router, used as spender and as `sender` toward pairs
    pub address: Address,

    /// Deadline window (seconds) applied by tooling that builds router calls
    pub deadline_secs: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            address: Address::from_low_u64_be(0xFAC7),
            fee_to_setter: Address::from_low_u64_be(0xAD),
            fee_to: None,
            pair_code_hash: None,
        }
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            address: Address::from_low_u64_be(0x0E7E),
            deadline_secs: 600,
        }
    }
}

impl ProtocolConfig {
    /// Load configuration from files with environment overrides
    pub fn load(base_path: Option<&Path>, environment: Option<&str>) -> Result<Self> {
        let base = base_path.unwrap_or(Path::new(DEFAULT_CONFIG_PATH));

        let mut builder = Config::builder().add_source(File::from(base).required(true));

        // Add environment-specific overrides if specified
        if let Some(env) = environment {
            let env_file = base
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."))
                .join("environments")
                .join(format!("{}.toml", env));

            if env_file.exists() {
                info!("Loading environment config: {:?}", env_file);
                builder = builder.add_source(File::from(env_file));
            } else {
                warn!("Environment config not found: {:?}", env_file);
            }
        }

        // Override with environment variables (AMM_REGISTRY__FEE_TO, ...)
        builder = builder.add_source(
            Environment::with_prefix("AMM")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: Self = builder
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config.validate()?;
        debug!(
            registry = ?config.registry.address,
            router = ?config.router.address,
            "Protocol configuration loaded"
        );
        Ok(config)
    }

    /// Reject configurations the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.registry.address.is_zero() {
            bail!("registry.address must not be the zero address");
        }
        if self.registry.fee_to_setter.is_zero() {
            bail!("registry.fee_to_setter must not be the zero address");
        }
        if self.router.address.is_zero() {
            bail!("router.address must not be the zero address");
        }
        if self.router.address == self.registry.address {
            bail!("router.address and registry.address must differ");
        }
        Ok(())
    }
}

/// Convenience function to load configuration from the default path
pub fn load_config(environment: Option<&str>) -> Result<ProtocolConfig> {
    ProtocolConfig::load(None, environment)
}

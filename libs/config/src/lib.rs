//! # AMM Protocol Configuration
//!
//! This crate provides the protocol constants and deployment configuration
//! shared by the registry, the pair engine, the router and the scripts.
//!
//! ## Features
//!
//! - **Protocol Constants**: minimum locked liquidity, fee fractions, reserve bounds
//! - **Deployment Configuration**: registry/router identities and fee administration,
//!   loaded from TOML with environment overrides
//!
//! ## Usage
//!
//! ```rust
//! use protocol_config::{fees, ProtocolConfig, MINIMUM_LIQUIDITY};
//!
//! assert_eq!(MINIMUM_LIQUIDITY, 1_000);
//! assert_eq!(fees::AMOUNT_IN_WITH_FEE_NUMERATOR, 997);
//!
//! let config = ProtocolConfig::default();
//! assert!(config.validate().is_ok());
//! ```

pub mod protocol;
pub mod protocol_config;

// Re-export commonly used types
pub use protocol::*;
pub use protocol_config::{load_config, ProtocolConfig, RegistryConfig, RouterConfig};

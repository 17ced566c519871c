// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! Backend and provider configuration.
//!
//! ```toml
//! [backend]
//! file = "../state/goerli-state.json"
//!
//! [provider]
//! endpoint = "https://goerli-eth.compound.finance"
//!
//! [provider.send-opts]
//! from = { private-key = "0x..." }
//! gas = 6000000
//! gas-price = 100000000
//!
//! [provider.verification]
//! verify = true
//! api-key = "..."
//! raise-on-error = true
//! ```

use std::{
    convert::Infallible,
    fmt, fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use serde::Deserialize;
use typed_builder::TypedBuilder;

use crate::core::{state::StateStore, verification::VerificationOpts};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Network {
    Development,
    Named(String),
}

impl Network {
    pub fn is_development(&self) -> bool {
        matches!(self, Network::Development)
    }

    pub fn is_mainnet(&self) -> bool {
        matches!(self, Network::Named(name) if name == "mainnet")
    }

    pub fn name(&self) -> &str {
        match self {
            Network::Development => "development",
            Network::Named(name) => name,
        }
    }
}

impl FromStr for Network {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim() {
            "" | "development" => Network::Development,
            name => Network::Named(name.to_lowercase()),
        })
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, TypedBuilder)]
pub struct Config {
    pub backend: BackendConfig,
    pub provider: ProviderConfig,
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        text.parse()
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(toml::from_str(s)?)
    }
}

/// Where resolved addresses are persisted.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, TypedBuilder)]
pub struct BackendConfig {
    #[builder(setter(into))]
    pub file: PathBuf,
}

impl BackendConfig {
    pub fn store(&self) -> StateStore {
        StateStore::new(&self.file)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, TypedBuilder)]
#[serde(rename_all = "kebab-case")]
pub struct ProviderConfig {
    #[builder(setter(into))]
    pub endpoint: String,
    #[serde(default)]
    #[builder(default)]
    pub send_opts: SendOpts,
    #[serde(default)]
    #[builder(default)]
    pub verification: VerificationOpts,
}

/// Defaults applied to every transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, TypedBuilder)]
#[serde(rename_all = "kebab-case", default)]
pub struct SendOpts {
    #[builder(default)]
    pub from: Signer,
    #[builder(default, setter(strip_option))]
    pub gas: Option<u64>,
    #[builder(default, setter(strip_option))]
    pub gas_price: Option<u64>,
}

#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Signer {
    /// Account `n` of the node's unlocked accounts.
    Unlocked(usize),
    /// Hex-encoded private key.
    PrivateKey(String),
}

impl Default for Signer {
    fn default() -> Self {
        Signer::Unlocked(0)
    }
}

impl fmt::Debug for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signer::Unlocked(index) => f.debug_tuple("Unlocked").field(index).finish(),
            Signer::PrivateKey(_) => f.write_str("PrivateKey(..)"),
        }
    }
}

// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! Contract ABIs and creation bytecode, loaded from solc `--combined-json abi,bin` output.

use std::{collections::HashMap, fs, path::Path};

use alloy::{json_abi::JsonAbi, primitives::Bytes};
use serde::Deserialize;
use serde_json::Value as Json;

use crate::utils::decode0x;

#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    pub abi: JsonAbi,
    pub bytecode: Bytes,
}

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid bytecode for {contract}: {source}")]
    Bytecode {
        contract: String,
        #[source]
        source: hex::FromHexError,
    },
    #[error("unknown contract {0}")]
    Unknown(String),
}

#[derive(Deserialize)]
struct CombinedJson {
    contracts: HashMap<String, CombinedContract>,
}

#[derive(Deserialize)]
struct CombinedContract {
    abi: Json,
    #[serde(default)]
    bin: String,
}

/// Artifacts by contract name.
#[derive(Debug, Clone, Default)]
pub struct ArtifactStore {
    artifacts: HashMap<String, Artifact>,
}

impl ArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ArtifactError> {
        let text = fs::read_to_string(path)?;
        Self::from_combined_json(&text)
    }

    /// Parses combined json. Entries are keyed `path/to/File.sol:Name` and registered as `Name`;
    /// older solc versions encode each ABI as a JSON string.
    pub fn from_combined_json(text: &str) -> Result<Self, ArtifactError> {
        let combined: CombinedJson = serde_json::from_str(text)?;
        let mut store = Self::new();
        for (key, contract) in combined.contracts {
            let name = key.rsplit(':').next().unwrap_or(&key).to_owned();
            let abi = match contract.abi {
                Json::String(text) => serde_json::from_str(&text)?,
                other => serde_json::from_value(other)?,
            };
            let bytecode = decode0x(&contract.bin).map_err(|source| ArtifactError::Bytecode {
                contract: name.clone(),
                source,
            })?;
            store.insert(name, Artifact {
                abi,
                bytecode: bytecode.into(),
            });
        }
        Ok(store)
    }

    pub fn insert(&mut self, name: impl Into<String>, artifact: Artifact) {
        self.artifacts.insert(name.into(), artifact);
    }

    pub fn get(&self, name: &str) -> Result<&Artifact, ArtifactError> {
        self.artifacts
            .get(name)
            .ok_or_else(|| ArtifactError::Unknown(name.to_owned()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.artifacts.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COMBINED: &str = r#"{
        "contracts": {
            "contracts/Fauceteer.sol:Fauceteer": {
                "abi": "[{\"inputs\":[{\"name\":\"token\",\"type\":\"address\"}],\"name\":\"drip\",\"outputs\":[],\"stateMutability\":\"nonpayable\",\"type\":\"function\"}]",
                "bin": "6080604052"
            },
            "contracts/Maximillion.sol:Maximillion": {
                "abi": [{"inputs":[{"name":"cEther_","type":"address"}],"stateMutability":"nonpayable","type":"constructor"}],
                "bin": "0x60806040"
            }
        },
        "version": "0.5.16"
    }"#;

    #[test]
    fn loads_string_and_inline_abis() {
        let store = ArtifactStore::from_combined_json(COMBINED).unwrap();
        let fauceteer = store.get("Fauceteer").unwrap();
        assert!(fauceteer.abi.function("drip").is_some());
        assert_eq!(fauceteer.bytecode.as_ref(), &[0x60, 0x80, 0x60, 0x40, 0x52]);

        let maximillion = store.get("Maximillion").unwrap();
        let constructor = maximillion.abi.constructor().unwrap();
        assert_eq!(constructor.inputs[0].name, "cEther_");
    }

    #[test]
    fn unknown_contract() {
        let store = ArtifactStore::from_combined_json(COMBINED).unwrap();
        assert!(matches!(store.get("Comptroller"), Err(ArtifactError::Unknown(name)) if name == "Comptroller"));
    }
}

// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! Persisted resource addresses, keyed by resource name.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use alloy::primitives::{Address, B256};
use serde::{Deserialize, Serialize};
use tiny_keccak::{Hasher, Keccak};

use super::value::Resolved;

pub type Fingerprint = B256;

/// Hashes a contract identifier together with its constructor-relevant property values.
pub fn fingerprint<'a>(
    contract: &str,
    properties: impl IntoIterator<Item = (&'a str, &'a Resolved)>,
) -> Fingerprint {
    let mut preimage = Vec::with_capacity(256);
    write_str(&mut preimage, contract);
    for (name, value) in properties {
        write_str(&mut preimage, name);
        value.write_canonical(&mut preimage);
    }

    let mut keccak = Keccak::v256();
    keccak.update(&preimage);
    let mut hash = [0u8; 32];
    keccak.finalize(&mut hash);
    B256::from(hash)
}

fn write_str(out: &mut Vec<u8>, s: &str) {
    out.extend_from_slice(&(s.len() as u64).to_be_bytes());
    out.extend_from_slice(s.as_bytes());
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateRecord {
    pub address: Address,
    pub constructor_fingerprint: Fingerprint,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersistedState {
    records: BTreeMap<String, StateRecord>,
}

impl PersistedState {
    pub fn get(&self, name: &str) -> Option<&StateRecord> {
        self.records.get(name)
    }

    pub fn record(&mut self, name: impl Into<String>, record: StateRecord) {
        self.records.insert(name.into(), record);
    }

    /// True when `name` was never deployed or was deployed from different constructor inputs.
    pub fn should_redeploy(&self, name: &str, fingerprint: &Fingerprint) -> bool {
        self.records
            .get(name)
            .map_or(true, |record| record.constructor_fingerprint != *fingerprint)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("failed to read state file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write state file {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed state file {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// JSON file backend for [`PersistedState`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the state file. A missing file is an empty state.
    pub fn load(&self) -> Result<PersistedState, StateError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(PersistedState::default())
            }
            Err(source) => {
                return Err(StateError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        serde_json::from_str(&text).map_err(|source| StateError::Json {
            path: self.path.clone(),
            source,
        })
    }

    /// Writes the state file through a temporary sibling, so readers never see a partial file.
    pub fn save(&self, state: &PersistedState) -> Result<(), StateError> {
        let write_err = |source: std::io::Error| StateError::Write {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let json = serde_json::to_string_pretty(state).map_err(|source| StateError::Json {
            path: self.path.clone(),
            source,
        })?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(write_err)?;
        fs::rename(&tmp, &self.path).map_err(write_err)
    }
}

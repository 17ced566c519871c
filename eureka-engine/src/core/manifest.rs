// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! The resources requested for a network and their raw properties.

use std::{fs, path::Path};

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::{Map, Value as Json};

/// A requested resource. Its type defaults to its name.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ResourceSpec {
    #[serde(rename = "type")]
    pub type_name: Option<String>,
    #[serde(default)]
    pub properties: Map<String, Json>,
}

#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Named resources in declaration order, e.g.
///
/// ```json
/// {
///   "Comptroller": {},
///   "cZRX": { "type": "CToken", "properties": { "type": "immutable", "symbol": "cZRX" } }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    resources: IndexMap<String, ResourceSpec>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Adds a resource; `properties` must be a JSON object (anything else means no properties).
    pub fn resource(
        mut self,
        name: impl Into<String>,
        type_name: impl Into<String>,
        properties: Json,
    ) -> Self {
        let properties = match properties {
            Json::Object(map) => map,
            _ => Map::new(),
        };
        self.resources.insert(
            name.into(),
            ResourceSpec {
                type_name: Some(type_name.into()),
                properties,
            },
        );
        self
    }

    pub fn get(&self, name: &str) -> Option<&ResourceSpec> {
        self.resources.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.resources.keys().map(String::as_str)
    }
}

impl ResourceSpec {
    pub fn type_name<'a>(&'a self, name: &'a str) -> &'a str {
        self.type_name.as_deref().unwrap_or(name)
    }
}

// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! Resource definitions: per type name, an ordered list of variants.

use std::{collections::HashMap, fmt, sync::Arc};

use serde_json::{Map, Value as Json};

use super::{
    build::{Build, Deploy},
    schema::Schema,
};

/// Subset-equality predicate over supplied properties.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Match {
    properties: Vec<(String, Json)>,
}

impl Match {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn property(mut self, name: impl Into<String>, value: impl Into<Json>) -> Self {
        self.properties.push((name.into(), value.into()));
        self
    }

    /// True when every named property is supplied with an equal value.
    pub fn matches(&self, supplied: &Map<String, Json>) -> bool {
        self.properties
            .iter()
            .all(|(name, value)| supplied.get(name) == Some(value))
    }
}

/// One alternative shape of a resource type.
#[derive(Clone)]
pub struct Variant {
    pub matcher: Option<Match>,
    pub contract: String,
    pub schema: Schema,
    pub build: Arc<dyn Build>,
}

impl Variant {
    /// A variant deploying `contract` with no constructor arguments, matching unconditionally.
    pub fn new(contract: impl Into<String>) -> Self {
        Self {
            matcher: None,
            contract: contract.into(),
            schema: Schema::default(),
            build: Arc::new(Deploy::new()),
        }
    }

    pub fn matching(mut self, matcher: Match) -> Self {
        self.matcher = Some(matcher);
        self
    }

    pub fn schema(mut self, schema: Schema) -> Self {
        self.schema = schema;
        self
    }

    pub fn build(mut self, build: impl Build + 'static) -> Self {
        self.build = Arc::new(build);
        self
    }

    pub fn matches(&self, supplied: &Map<String, Json>) -> bool {
        self.matcher
            .as_ref()
            .map_or(true, |matcher| matcher.matches(supplied))
    }
}

impl fmt::Debug for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Variant")
            .field("matcher", &self.matcher)
            .field("contract", &self.contract)
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("no resource type named {0}")]
    UnknownType(String),
    #[error("no variant of {0} matches the supplied properties")]
    UnmatchedVariant(String),
}

/// Registered resource definitions. Built once at startup and passed to the engine by reference.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    definitions: HashMap<String, Vec<Arc<Variant>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a variant to `type_name`. Variants are tried in registration order.
    pub fn register(&mut self, type_name: impl Into<String>, variant: Variant) -> &mut Self {
        self.definitions
            .entry(type_name.into())
            .or_default()
            .push(Arc::new(variant));
        self
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.definitions.contains_key(type_name)
    }

    /// Selects the first variant of `type_name` whose predicate accepts `supplied`.
    pub fn resolve(
        &self,
        type_name: &str,
        supplied: &Map<String, Json>,
    ) -> Result<Arc<Variant>, RegistryError> {
        let variants = self
            .definitions
            .get(type_name)
            .ok_or_else(|| RegistryError::UnknownType(type_name.to_owned()))?;
        variants
            .iter()
            .find(|variant| variant.matches(supplied))
            .cloned()
            .ok_or_else(|| RegistryError::UnmatchedVariant(type_name.to_owned()))
    }
}

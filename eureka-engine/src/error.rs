// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

use crate::core::{
    executor::ChainError, reconcile::ReconciliationError, state::StateError,
    value::NumberError, verification::VerificationError,
};

pub type Result<T, E = EngineError> = std::result::Result<T, E>;

/// Errors that abort a deployment run.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("{resource}: no resource type named {type_name}")]
    UnknownType { resource: String, type_name: String },
    #[error("{resource}: no variant of {type_name} matches the supplied properties")]
    UnmatchedVariant { resource: String, type_name: String },
    #[error("{resource}: missing required property {property}")]
    MissingRequiredProperty { resource: String, property: String },
    #[error("{resource}: invalid value for {property}: {reason}")]
    PropertyCoercion {
        resource: String,
        property: String,
        reason: String,
    },
    #[error("cyclic dependency: {}", .cycle.join(" -> "))]
    CyclicDependency { cycle: Vec<String> },
    #[error("unresolved reference to {name}{}", .referenced_by.as_ref().map(|by| format!(" (from {by})")).unwrap_or_default())]
    UnresolvedReference {
        name: String,
        referenced_by: Option<String>,
    },
    #[error("failed to build {resource}: {source}")]
    Build {
        resource: String,
        #[source]
        source: ActorError,
    },
    #[error("{0}")]
    Reconciliation(#[from] ReconciliationError),
    #[error("{resource}: {source}")]
    Verification {
        resource: String,
        #[source]
        source: VerificationError,
    },
    #[error("{0}")]
    StateStore(#[from] StateError),
}

/// Errors surfaced by the capabilities handed to build and setter routines.
#[derive(Debug, thiserror::Error)]
pub enum ActorError {
    #[error("failed to deploy {contract}: {source}")]
    Deploy {
        contract: String,
        #[source]
        source: ChainError,
    },
    #[error("transaction {target}.{function} failed: {source}")]
    Transaction {
        target: String,
        function: String,
        #[source]
        source: ChainError,
    },
    #[error("read {target}.{function} failed: {source}")]
    Read {
        target: String,
        function: String,
        #[source]
        source: ChainError,
    },
    #[error("{function} returned no output at index {index}")]
    MissingOutput { function: String, index: usize },
    #[error("missing property {0}")]
    MissingProperty(String),
    #[error("property {name} is not {expected}")]
    PropertyType {
        name: String,
        expected: &'static str,
    },
    #[error("{0}")]
    Number(#[from] NumberError),
}

// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! Declarative contract deployment.
//!
//! Resource types are registered as one or more [`Variant`]s in a [`Registry`]. A [`Manifest`]
//! names the resources to deploy and their properties. The [`Engine`] selects a variant for each
//! resource, orders them by their constructor references, deploys what changed since the last
//! run, and reconciles post-construction settings by reading on-chain state before writing it.

#[macro_use]
mod macros;

pub mod config;
pub mod core;
pub mod env;
pub(crate) mod error;
pub mod rpc;
pub mod utils;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use crate::core::{
    actor::{Actor, InstanceRef},
    artifacts::{Artifact, ArtifactError, ArtifactStore},
    build::{Build, Deploy},
    engine::{Engine, Instance, Status},
    executor::{Call, CallOptions, Chain, ChainError, ConstructorArgs, Receipt},
    manifest::{Manifest, ResourceSpec},
    reconcile::{CallSetter, Entry, ReconciliationError, Setter},
    registry::{Match, Registry, Variant},
    schema::{Property, PropertyType, Schema},
    state::{Fingerprint, PersistedState, StateRecord, StateStore},
    value::{Number, Properties, Resolved, Value},
    verification::{Verifier, VerificationError, VerificationOpts},
};
pub use error::{ActorError, EngineError, Result};

// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

pub mod actor;
pub mod artifacts;
pub mod build;
pub mod engine;
pub mod executor;
pub mod manifest;
pub mod plan;
pub mod reconcile;
pub mod registry;
pub mod schema;
pub mod state;
pub mod value;
pub mod verification;

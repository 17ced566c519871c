// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! Capabilities handed to build and setter routines.

use alloy::primitives::Address;

use super::{
    executor::{Call, CallOptions, Chain, ConstructorArgs, Receipt},
    value::{Number, Resolved},
};
use crate::{utils::color::DebugColor, ActorError};

/// A deployed contract as seen by setters: its resource name, contract identifier and address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceRef {
    pub name: String,
    pub contract: String,
    pub address: Address,
}

impl InstanceRef {
    pub fn new(name: impl Into<String>, contract: impl Into<String>, address: Address) -> Self {
        Self {
            name: name.into(),
            contract: contract.into(),
            address,
        }
    }
}

/// Immutable capability bundle built once per run around the network client.
#[derive(Clone, Copy)]
pub struct Actor<'a> {
    chain: &'a dyn Chain,
}

impl<'a> Actor<'a> {
    pub fn new(chain: &'a dyn Chain) -> Self {
        Self { chain }
    }

    pub async fn deploy(&self, contract: &str, args: ConstructorArgs) -> Result<Address, ActorError> {
        debug!(@grey, "deploying {contract} with {} constructor args", args.len());
        let address = self
            .chain
            .deploy(contract, &args)
            .await
            .map_err(|source| ActorError::Deploy {
                contract: contract.to_owned(),
                source,
            })?;
        info!(@grey, "deployed {contract} at address: {}", address.debug_lavender());
        Ok(address)
    }

    /// Sends `function` to `target`, waiting for the receipt.
    pub async fn trx(
        &self,
        target: &InstanceRef,
        function: &str,
        args: Vec<Resolved>,
        options: &CallOptions,
    ) -> Result<Receipt, ActorError> {
        let call = Call::new(target, function, args, options);
        let receipt = self
            .chain
            .send(&call)
            .await
            .map_err(|source| ActorError::Transaction {
                target: target.name.clone(),
                function: function.to_owned(),
                source,
            })?;
        debug!(
            @grey,
            "{}.{function} tx hash: {} ({} gas)",
            target.name,
            receipt.tx_hash.debug_lavender(),
            receipt.gas_used
        );
        Ok(receipt)
    }

    pub async fn read(
        &self,
        target: &InstanceRef,
        function: &str,
        args: Vec<Resolved>,
        options: &CallOptions,
    ) -> Result<Vec<Resolved>, ActorError> {
        let call = Call::new(target, function, args, options);
        self.chain
            .read(&call)
            .await
            .map_err(|source| ActorError::Read {
                target: target.name.clone(),
                function: function.to_owned(),
                source,
            })
    }

    /// Exact numeric view of a value, for comparisons.
    pub fn bn(&self, value: &Resolved) -> Result<Number, ActorError> {
        match value {
            Resolved::String(s) => Ok(s.parse()?),
            other => other.as_number().ok_or_else(|| ActorError::PropertyType {
                name: other.to_string(),
                expected: "number",
            }),
        }
    }

    pub fn show(&self, value: &Resolved) -> String {
        match value {
            Resolved::Address(address) => address.debug_lavender(),
            other => other.to_string(),
        }
    }
}

// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! The network client interface used to deploy contracts, send transactions and read state.
//!
//! Transactions are never retried here: once a transaction has consumed a nonce, resubmitting it
//! could apply its side effects twice.

use alloy::primitives::{Address, TxHash};
use async_trait::async_trait;

use super::{actor::InstanceRef, artifacts::ArtifactError, value::Resolved};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstructorArgs {
    Positional(Vec<Resolved>),
    /// Matched to constructor inputs by parameter name.
    Named(Vec<(String, Resolved)>),
}

impl ConstructorArgs {
    pub fn none() -> Self {
        ConstructorArgs::Positional(Vec::new())
    }

    pub fn len(&self) -> usize {
        match self {
            ConstructorArgs::Positional(args) => args.len(),
            ConstructorArgs::Named(args) => args.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Options for [`Actor::trx`](super::actor::Actor::trx) and
/// [`Actor::read`](super::actor::Actor::read).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallOptions {
    /// Contract whose interface encodes the call. The call is still addressed to the target
    /// instance, which acts as the facade for the proxied contract's logic.
    pub proxy: Option<String>,
}

impl CallOptions {
    pub fn proxy(contract: impl Into<String>) -> Self {
        Self {
            proxy: Some(contract.into()),
        }
    }
}

/// A contract call as handed to the [`Chain`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub to: Address,
    /// Contract identifier whose ABI encodes `function`.
    pub interface: String,
    pub function: String,
    pub args: Vec<Resolved>,
}

impl Call {
    pub fn new(
        target: &InstanceRef,
        function: impl Into<String>,
        args: Vec<Resolved>,
        options: &CallOptions,
    ) -> Self {
        Self {
            to: target.address,
            interface: options
                .proxy
                .clone()
                .unwrap_or_else(|| target.contract.clone()),
            function: function.into(),
            args,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Receipt {
    pub tx_hash: TxHash,
    pub gas_used: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    #[error("rpc error: {0}")]
    Rpc(#[from] alloy::transports::RpcError<alloy::transports::TransportErrorKind>),
    #[error("{0}")]
    Artifact(#[from] ArtifactError),

    #[error("reverted: {}", .reason.as_deref().unwrap_or("no reason given"))]
    Reverted {
        tx_hash: Option<TxHash>,
        reason: Option<String>,
    },
    #[error("tx failed to complete")]
    FailedToComplete,
    #[error("missing contract address in deployment receipt")]
    NoContractAddress,
    #[error("abi error: {0}")]
    Abi(String),
    #[error("signer error: {0}")]
    Signer(String),
}

/// Network client. Every method completes before the engine issues the next operation.
#[async_trait]
pub trait Chain: Send + Sync {
    /// Deploys `contract` and returns its address once the deployment is confirmed.
    async fn deploy(&self, contract: &str, args: &ConstructorArgs) -> Result<Address, ChainError>;

    /// Sends a state-changing call and waits for its receipt.
    async fn send(&self, call: &Call) -> Result<Receipt, ChainError>;

    /// Performs a side-effect-free call, returning the decoded outputs.
    async fn read(&self, call: &Call) -> Result<Vec<Resolved>, ChainError>;
}

// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! In-memory [`Chain`] for unit testing definitions and the engine.
//!
//! ```ignore
//! use eureka_engine::{testing::MockChain, Actor, Resolved};
//!
//! let chain = MockChain::new();
//! chain.mock_read(comptroller, "oracle", vec![], vec![Resolved::Address(oracle)]);
//! chain.fail_send("_supportMarket", vec![Resolved::Address(market)]);
//!
//! // ... run the engine with Actor::new(&chain) ...
//!
//! for event in chain.events() {
//!     println!("{}", event.summary());
//! }
//! ```

use std::sync::{Mutex, MutexGuard, PoisonError};

use alloy::primitives::{Address, TxHash};
use async_trait::async_trait;

use crate::{Call, Chain, ChainError, ConstructorArgs, Receipt, Resolved};

/// Something the mock was asked to do, in request order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Deploy {
        contract: String,
        args: ConstructorArgs,
        address: Address,
    },
    Send(Call),
    Read(Call),
}

impl Event {
    /// Compact form such as `send _supportMarket(0x..)`, for ordering assertions.
    pub fn summary(&self) -> String {
        fn args(args: &[Resolved]) -> String {
            args.iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        }
        match self {
            Event::Deploy { contract, .. } => format!("deploy {contract}"),
            Event::Send(call) => format!("send {}({})", call.function, args(&call.args)),
            Event::Read(call) => format!("read {}({})", call.function, args(&call.args)),
        }
    }
}

struct MockRead {
    to: Address,
    function: String,
    args: Vec<Resolved>,
    outputs: Vec<Resolved>,
}

#[derive(Default)]
struct MockState {
    events: Vec<Event>,
    reads: Vec<MockRead>,
    failing_sends: Vec<(String, Vec<Resolved>)>,
    failing_deploys: Vec<String>,
    deployments: usize,
    transactions: u64,
}

/// Records every request. Deployments get sequential addresses (see [`MockChain::nth_address`]),
/// reads return scripted outputs and fail when unscripted, sends succeed unless told to fail.
#[derive(Default)]
pub struct MockChain {
    state: Mutex<MockState>,
}

impl MockChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Address given to the `n`th deployment, counting from zero.
    pub fn nth_address(n: usize) -> Address {
        Address::left_padding_from(&(n as u64 + 1).to_be_bytes())
    }

    /// Scripts the outputs of `function(args)` on the contract at `to`.
    pub fn mock_read(
        &self,
        to: Address,
        function: impl Into<String>,
        args: Vec<Resolved>,
        outputs: Vec<Resolved>,
    ) {
        self.state().reads.push(MockRead {
            to,
            function: function.into(),
            args,
            outputs,
        });
    }

    /// Makes transactions calling `function(args)` revert. The attempt is still recorded.
    pub fn fail_send(&self, function: impl Into<String>, args: Vec<Resolved>) {
        self.state().failing_sends.push((function.into(), args));
    }

    pub fn fail_deploy(&self, contract: impl Into<String>) {
        self.state().failing_deploys.push(contract.into());
    }

    pub fn events(&self) -> Vec<Event> {
        self.state().events.clone()
    }

    /// Contract identifiers of successful deployments, in order.
    pub fn deployed(&self) -> Vec<String> {
        self.state()
            .events
            .iter()
            .filter_map(|event| match event {
                Event::Deploy { contract, .. } => Some(contract.clone()),
                _ => None,
            })
            .collect()
    }

    /// Attempted transactions, in order.
    pub fn sent(&self) -> Vec<Call> {
        self.state()
            .events
            .iter()
            .filter_map(|event| match event {
                Event::Send(call) => Some(call.clone()),
                _ => None,
            })
            .collect()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl Chain for MockChain {
    async fn deploy(&self, contract: &str, args: &ConstructorArgs) -> Result<Address, ChainError> {
        let mut state = self.state();
        if state.failing_deploys.iter().any(|failing| failing == contract) {
            return Err(ChainError::Reverted {
                tx_hash: None,
                reason: Some(format!("mock deployment of {contract} failed")),
            });
        }
        let address = Self::nth_address(state.deployments);
        state.deployments += 1;
        state.events.push(Event::Deploy {
            contract: contract.to_owned(),
            args: args.clone(),
            address,
        });
        Ok(address)
    }

    async fn send(&self, call: &Call) -> Result<Receipt, ChainError> {
        let mut state = self.state();
        state.events.push(Event::Send(call.clone()));
        state.transactions += 1;
        let tx_hash = TxHash::left_padding_from(&state.transactions.to_be_bytes());
        let failing = state
            .failing_sends
            .iter()
            .any(|(function, args)| *function == call.function && *args == call.args);
        if failing {
            return Err(ChainError::Reverted {
                tx_hash: Some(tx_hash),
                reason: Some("mock revert".to_owned()),
            });
        }
        Ok(Receipt {
            tx_hash,
            gas_used: 21_000,
        })
    }

    async fn read(&self, call: &Call) -> Result<Vec<Resolved>, ChainError> {
        let mut state = self.state();
        state.events.push(Event::Read(call.clone()));
        state
            .reads
            .iter()
            .find(|read| read.to == call.to && read.function == call.function && read.args == call.args)
            .map(|read| read.outputs.clone())
            .ok_or_else(|| ChainError::Reverted {
                tx_hash: None,
                reason: Some(format!("no mocked result for {}", call.function)),
            })
    }
}

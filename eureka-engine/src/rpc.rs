// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! [`Chain`] backed by an alloy provider and compiled contract artifacts.

use alloy::{
    dyn_abi::{DynSolType, DynSolValue, FunctionExt, JsonAbiExt, Specifier},
    json_abi::{Constructor, Function, Param},
    network::{EthereumWallet, TransactionBuilder},
    primitives::{Address, Bytes, B256, I256},
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::types::{TransactionReceipt, TransactionRequest},
    signers::local::PrivateKeySigner,
    sol_types::decode_revert_reason,
    transports::{RpcError, TransportErrorKind},
};
use async_trait::async_trait;

use crate::{
    config::{ProviderConfig, SendOpts, Signer},
    core::artifacts::ArtifactStore,
    utils::{color::DebugColor, decode0x},
    Call, Chain, ChainError, ConstructorArgs, Number, Receipt, Resolved,
};

pub struct RpcChain<P> {
    provider: P,
    artifacts: ArtifactStore,
    from: Address,
    gas: Option<u64>,
    gas_price: Option<u128>,
}

impl<P: Provider> RpcChain<P> {
    pub fn new(provider: P, artifacts: ArtifactStore, from: Address) -> Self {
        Self {
            provider,
            artifacts,
            from,
            gas: None,
            gas_price: None,
        }
    }

    /// Fixed gas limit and legacy gas price, when configured.
    pub fn with_send_opts(mut self, opts: &SendOpts) -> Self {
        self.gas = opts.gas;
        self.gas_price = opts.gas_price.map(u128::from);
        self
    }

    pub fn sender(&self) -> Address {
        self.from
    }

    /// Estimates, sends and waits for a transaction. Estimation surfaces revert reasons before
    /// anything is broadcast.
    async fn submit(&self, tx: TransactionRequest) -> Result<TransactionReceipt, ChainError> {
        let tx = tx.with_from(self.from);
        let estimate = self
            .provider
            .estimate_gas(tx.clone())
            .await
            .map_err(reverted)?;
        let mut tx = tx.with_gas_limit(self.gas.unwrap_or(estimate));
        if let Some(gas_price) = self.gas_price {
            tx = tx.with_gas_price(gas_price);
        }

        let pending = self.provider.send_transaction(tx).await?;
        let tx_hash = *pending.tx_hash();
        debug!(@grey, "sent tx: {}", tx_hash.debug_lavender());

        let receipt = pending
            .get_receipt()
            .await
            .or(Err(ChainError::FailedToComplete))?;
        if !receipt.status() {
            return Err(ChainError::Reverted {
                tx_hash: Some(tx_hash),
                reason: None,
            });
        }
        Ok(receipt)
    }

    fn function(&self, call: &Call) -> Result<&Function, ChainError> {
        let artifact = self.artifacts.get(&call.interface)?;
        artifact
            .abi
            .function(&call.function)
            .and_then(|overloads| {
                overloads
                    .iter()
                    .find(|function| function.inputs.len() == call.args.len())
            })
            .ok_or_else(|| {
                ChainError::Abi(format!(
                    "{} has no function {} taking {} arguments",
                    call.interface,
                    call.function,
                    call.args.len()
                ))
            })
    }
}

#[async_trait]
impl<P: Provider> Chain for RpcChain<P> {
    async fn deploy(&self, contract: &str, args: &ConstructorArgs) -> Result<Address, ChainError> {
        let artifact = self.artifacts.get(contract)?;
        let mut code = artifact.bytecode.to_vec();
        match artifact.abi.constructor() {
            Some(constructor) => code.extend(encode_constructor(constructor, args)?),
            None if args.is_empty() => {}
            None => {
                return Err(ChainError::Abi(format!(
                    "{contract} takes no constructor arguments"
                )))
            }
        }

        let tx = TransactionRequest::default().with_deploy_code(code);
        let receipt = self.submit(tx).await?;
        debug!(@grey, "deployment tx hash: {}", receipt.transaction_hash.debug_lavender());
        receipt.contract_address.ok_or(ChainError::NoContractAddress)
    }

    async fn send(&self, call: &Call) -> Result<Receipt, ChainError> {
        let input = encode_call(self.function(call)?, &call.args)?;
        let tx = TransactionRequest::default()
            .with_to(call.to)
            .with_input(input);
        let receipt = self.submit(tx).await?;
        Ok(Receipt {
            tx_hash: receipt.transaction_hash,
            gas_used: receipt.gas_used,
        })
    }

    async fn read(&self, call: &Call) -> Result<Vec<Resolved>, ChainError> {
        let function = self.function(call)?;
        let input = encode_call(function, &call.args)?;
        let tx = TransactionRequest::default()
            .with_from(self.from)
            .with_to(call.to)
            .with_input(input);
        let output = self.provider.call(tx).await.map_err(reverted)?;
        let values = function
            .abi_decode_output(&output)
            .map_err(|err| ChainError::Abi(format!("{}: {err}", call.function)))?;
        Ok(values.into_iter().map(from_sol).collect())
    }
}

/// Connects to the configured endpoint with the configured signer.
pub async fn connect(
    config: &ProviderConfig,
    artifacts: ArtifactStore,
) -> Result<RpcChain<DynProvider>, ChainError> {
    let (provider, from) = match &config.send_opts.from {
        Signer::Unlocked(index) => {
            let provider = ProviderBuilder::new().connect(&config.endpoint).await?;
            let accounts = provider.get_accounts().await?;
            let from = accounts.get(*index).copied().ok_or_else(|| {
                ChainError::Signer(format!("node has no unlocked account {index}"))
            })?;
            (provider.erased(), from)
        }
        Signer::PrivateKey(key) => {
            let key = decode0x(key).map_err(|err| ChainError::Signer(err.to_string()))?;
            if key.len() != 32 {
                return Err(ChainError::Signer("private key must be 32 bytes".into()));
            }
            let signer = PrivateKeySigner::from_bytes(&B256::from_slice(&key))
                .map_err(|err| ChainError::Signer(err.to_string()))?;
            let from = signer.address();
            let provider = ProviderBuilder::new()
                .wallet(EthereumWallet::new(signer))
                .connect(&config.endpoint)
                .await?;
            (provider.erased(), from)
        }
    };
    debug!(@grey, "sender address: {}", from.debug_lavender());
    Ok(RpcChain::new(provider, artifacts, from).with_send_opts(&config.send_opts))
}

fn reverted(err: RpcError<TransportErrorKind>) -> ChainError {
    match err.as_error_resp() {
        Some(payload) => ChainError::Reverted {
            tx_hash: None,
            reason: payload
                .as_revert_data()
                .and_then(|data| decode_revert_reason(&data))
                .or_else(|| Some(payload.message.to_string())),
        },
        None => ChainError::Rpc(err),
    }
}

fn encode_call(function: &Function, args: &[Resolved]) -> Result<Vec<u8>, ChainError> {
    let values = function
        .inputs
        .iter()
        .zip(args)
        .map(|(param, arg)| to_sol(param, arg))
        .collect::<Result<Vec<_>, _>>()?;
    function
        .abi_encode_input(&values)
        .map_err(|err| ChainError::Abi(format!("{}: {err}", function.name)))
}

/// Encodes constructor arguments. Named arguments are matched to inputs by parameter name.
fn encode_constructor(constructor: &Constructor, args: &ConstructorArgs) -> Result<Vec<u8>, ChainError> {
    if args.len() != constructor.inputs.len() {
        return Err(ChainError::Abi(format!(
            "mismatch number of constructor arguments (want {}; got {})",
            constructor.inputs.len(),
            args.len()
        )));
    }
    let values = match args {
        ConstructorArgs::Positional(args) => constructor
            .inputs
            .iter()
            .zip(args)
            .map(|(param, arg)| to_sol(param, arg))
            .collect::<Result<Vec<_>, _>>()?,
        ConstructorArgs::Named(args) => constructor
            .inputs
            .iter()
            .map(|param| {
                let (_, arg) = args
                    .iter()
                    .find(|(name, _)| *name == param.name)
                    .ok_or_else(|| {
                        ChainError::Abi(format!("missing constructor argument {}", param.name))
                    })?;
                to_sol(param, arg)
            })
            .collect::<Result<Vec<_>, _>>()?,
    };
    constructor
        .abi_encode_input(&values)
        .map_err(|err| ChainError::Abi(err.to_string()))
}

fn to_sol(param: &Param, value: &Resolved) -> Result<DynSolValue, ChainError> {
    let ty = param
        .resolve()
        .map_err(|err| ChainError::Abi(format!("could not resolve {param}: {err}")))?;
    to_sol_value(&ty, value).map_err(|reason| ChainError::Abi(format!("{param}: {reason}")))
}

fn to_sol_value(ty: &DynSolType, value: &Resolved) -> Result<DynSolValue, String> {
    Ok(match (ty, value) {
        (DynSolType::Address, Resolved::Address(address)) => DynSolValue::Address(*address),
        (DynSolType::Bool, Resolved::Bool(b)) => DynSolValue::Bool(*b),
        (DynSolType::Uint(bits), Resolved::Number(n)) => DynSolValue::Uint(integer(n)?, *bits),
        (DynSolType::Int(bits), Resolved::Number(n)) => {
            let value = I256::try_from(integer(n)?).map_err(|err| err.to_string())?;
            DynSolValue::Int(value, *bits)
        }
        (DynSolType::String, Resolved::String(s)) => DynSolValue::String(s.clone()),
        (DynSolType::Bytes, Resolved::String(s)) => {
            DynSolValue::Bytes(decode0x(s).map_err(|err| err.to_string())?)
        }
        (DynSolType::Array(inner), Resolved::Array(items)) => DynSolValue::Array(
            items
                .iter()
                .map(|item| to_sol_value(inner, item))
                .collect::<Result<_, _>>()?,
        ),
        (DynSolType::FixedArray(inner, len), Resolved::Array(items)) if items.len() == *len => {
            DynSolValue::FixedArray(
                items
                    .iter()
                    .map(|item| to_sol_value(inner, item))
                    .collect::<Result<_, _>>()?,
            )
        }
        (DynSolType::Tuple(types), Resolved::Tuple(items) | Resolved::Array(items))
            if types.len() == items.len() =>
        {
            DynSolValue::Tuple(
                types
                    .iter()
                    .zip(items)
                    .map(|(ty, item)| to_sol_value(ty, item))
                    .collect::<Result<_, _>>()?,
            )
        }
        (ty, Resolved::String(s)) => ty.coerce_str(s).map_err(|err| err.to_string())?,
        (ty, value) => return Err(format!("cannot encode {value} as {}", ty.sol_type_name())),
    })
}

fn integer(n: &Number) -> Result<alloy::primitives::U256, String> {
    n.mantissa(0).map_err(|err| err.to_string())
}

fn from_sol(value: DynSolValue) -> Resolved {
    match value {
        DynSolValue::Address(address) => Resolved::Address(address),
        DynSolValue::Bool(b) => Resolved::Bool(b),
        DynSolValue::Uint(n, _) => Resolved::Number(Number::from(n)),
        DynSolValue::Int(n, _) if !n.is_negative() => Resolved::Number(Number::from(n.into_raw())),
        DynSolValue::Int(n, _) => Resolved::String(n.to_string()),
        DynSolValue::String(s) => Resolved::String(s),
        DynSolValue::Bytes(bytes) => Resolved::String(Bytes::from(bytes).to_string()),
        DynSolValue::FixedBytes(word, len) => {
            Resolved::String(Bytes::copy_from_slice(&word[..len]).to_string())
        }
        DynSolValue::Array(items) | DynSolValue::FixedArray(items) => {
            Resolved::Array(items.into_iter().map(from_sol).collect())
        }
        DynSolValue::Tuple(items) => Resolved::Tuple(items.into_iter().map(from_sol).collect()),
        other => Resolved::String(format!("{other:?}")),
    }
}

// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! Per-network backend and provider settings.

use std::{fs, path::PathBuf};

use eureka_engine::{
    config::{BackendConfig, Config, Network, ProviderConfig, SendOpts, Signer},
    env, VerificationOpts,
};
use eyre::{eyre, Context};

pub const GAS: u64 = 6_000_000;
pub const GAS_PRICE: u64 = 100_000_000;

/// Configuration for `network`, taking overrides from the environment.
pub fn config(network: &Network) -> eyre::Result<Config> {
    config_with(network, env::lookup)
}

/// Configuration for `network` with overrides looked up by `lookup`:
///
/// - `provider`: node endpoint
/// - `pk`: hex private key, otherwise read from `~/.ethereum/<network>` off development
/// - `etherscan`: explorer api key, enabling verification off development
pub fn config_with(
    network: &Network,
    lookup: impl Fn(&str) -> Option<String>,
) -> eyre::Result<Config> {
    let endpoint = env::resolve_with(&lookup, "provider", || default_endpoint(network));
    let from = match lookup("pk") {
        Some(key) => Signer::PrivateKey(key.trim().to_owned()),
        None => default_signer(network)?,
    };
    let verification = match lookup("etherscan") {
        Some(api_key) if !network.is_development() => VerificationOpts::builder()
            .verify(true)
            .api_key(api_key)
            .raise_on_error(true)
            .build(),
        _ => VerificationOpts::default(),
    };
    let provider = ProviderConfig::builder()
        .endpoint(endpoint)
        .send_opts(
            SendOpts::builder()
                .from(from)
                .gas(GAS)
                .gas_price(GAS_PRICE)
                .build(),
        )
        .verification(verification)
        .build();
    Ok(Config::builder()
        .backend(BackendConfig::builder().file(state_file(network)).build())
        .provider(provider)
        .build())
}

pub fn state_file(network: &Network) -> PathBuf {
    PathBuf::from(format!("../state/{network}-state.json"))
}

fn default_endpoint(network: &Network) -> String {
    match network {
        Network::Development => "http://localhost:8545".to_owned(),
        Network::Named(name) => format!("https://{name}-eth.compound.finance"),
    }
}

fn default_signer(network: &Network) -> eyre::Result<Signer> {
    if network.is_development() {
        return Ok(Signer::Unlocked(0));
    }
    let home = dirs::home_dir().ok_or_else(|| eyre!("could not determine home directory"))?;
    let path = home.join(".ethereum").join(network.name());
    let key = fs::read_to_string(&path)
        .wrap_err_with(|| format!("failed to read private key from {}", path.display()))?;
    Ok(Signer::PrivateKey(key.trim().to_owned()))
}

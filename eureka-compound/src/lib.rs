// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! Compound protocol deployment definitions.
//!
//! ```ignore
//! let network: Network = "goerli".parse()?;
//! let manifest = Manifest::from_file("networks/goerli.json")?;
//! let artifacts = ArtifactStore::from_file("out/contracts.json")?;
//! eureka_compound::run(&network, manifest, artifacts).await?;
//! ```

use eureka_engine::{config::Network, rpc, Actor, ArtifactStore, Engine, Manifest};

pub mod definitions;
pub mod network;

pub use definitions::{register, registry};

/// Deploys and reconciles every resource in `manifest` on `network`.
pub async fn run(
    network: &Network,
    manifest: Manifest,
    artifacts: ArtifactStore,
) -> eyre::Result<()> {
    let config = network::config(network)?;
    if config.provider.verification.verify {
        log::warn!("source verification requested but no verifier is available, skipping");
    }
    let chain = rpc::connect(&config.provider, artifacts).await?;
    log::info!(
        "deploying to {network} via {} from {}",
        config.provider.endpoint,
        chain.sender()
    );

    let registry = definitions::registry(network);
    let store = config.backend.store();
    let mut engine = Engine::new(&registry, manifest, Actor::new(&chain), store)?;
    engine.resolve_all().await?;

    for instance in engine.instances() {
        if let Some(address) = instance.address {
            log::info!("{}: {} at {address}", instance.name, instance.contract());
        }
    }
    Ok(())
}

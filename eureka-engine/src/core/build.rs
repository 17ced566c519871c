// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! Base construction of a resource.

use alloy::primitives::Address;
use async_trait::async_trait;

use super::{
    actor::Actor,
    executor::ConstructorArgs,
    value::{Number, Properties, Resolved},
};
use crate::ActorError;

/// Constructs the base contract of a resource from its resolved, non-deferred properties.
#[async_trait]
pub trait Build: Send + Sync {
    async fn build(
        &self,
        actor: &Actor<'_>,
        contract: &str,
        properties: &Properties<Resolved>,
    ) -> Result<Address, ActorError>;
}

#[derive(Debug, Clone)]
struct DeployArg {
    name: Option<String>,
    property: String,
    decimals: Option<u32>,
}

/// Deploys the variant's contract with constructor arguments taken from properties.
///
/// Arguments are passed by name when every argument is named, positionally otherwise.
#[derive(Debug, Clone, Default)]
pub struct Deploy {
    args: Vec<DeployArg>,
}

impl Deploy {
    /// Deploys with no constructor arguments.
    pub fn new() -> Self {
        Self::default()
    }

    /// Passes `property` as the constructor input named `name`.
    pub fn arg(mut self, name: impl Into<String>, property: impl Into<String>) -> Self {
        self.args.push(DeployArg {
            name: Some(name.into()),
            property: property.into(),
            decimals: None,
        });
        self
    }

    /// Passes the numeric `property` scaled to an integer mantissa with `decimals` places.
    pub fn mantissa(
        mut self,
        name: impl Into<String>,
        property: impl Into<String>,
        decimals: u32,
    ) -> Self {
        self.args.push(DeployArg {
            name: Some(name.into()),
            property: property.into(),
            decimals: Some(decimals),
        });
        self
    }

    pub fn positional(mut self, property: impl Into<String>) -> Self {
        self.args.push(DeployArg {
            name: None,
            property: property.into(),
            decimals: None,
        });
        self
    }

    fn constructor_args(&self, properties: &Properties<Resolved>) -> Result<ConstructorArgs, ActorError> {
        let mut values = Vec::with_capacity(self.args.len());
        for arg in &self.args {
            let value = match arg.decimals {
                Some(decimals) => {
                    let mantissa = properties.number(&arg.property)?.mantissa(decimals)?;
                    Resolved::Number(Number::from(mantissa))
                }
                None => properties.require(&arg.property)?.clone(),
            };
            values.push((arg.name.clone(), value));
        }
        if values.iter().all(|(name, _)| name.is_some()) && !values.is_empty() {
            Ok(ConstructorArgs::Named(
                values
                    .into_iter()
                    .filter_map(|(name, value)| Some((name?, value)))
                    .collect(),
            ))
        } else {
            Ok(ConstructorArgs::Positional(
                values.into_iter().map(|(_, value)| value).collect(),
            ))
        }
    }
}

#[async_trait]
impl Build for Deploy {
    async fn build(
        &self,
        actor: &Actor<'_>,
        contract: &str,
        properties: &Properties<Resolved>,
    ) -> Result<Address, ActorError> {
        let args = self.constructor_args(properties)?;
        actor.deploy(contract, args).await
    }
}

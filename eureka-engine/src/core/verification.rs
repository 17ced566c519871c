// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! Source verification hook, run after each fresh deployment.

use alloy::primitives::Address;
use async_trait::async_trait;
use serde::Deserialize;
use typed_builder::TypedBuilder;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, TypedBuilder)]
#[serde(rename_all = "kebab-case", default)]
pub struct VerificationOpts {
    #[builder(default)]
    pub verify: bool,
    #[builder(default, setter(strip_option, into))]
    pub api_key: Option<String>,
    /// Makes verification failures abort the run instead of logging a warning.
    #[builder(default)]
    pub raise_on_error: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum VerificationError {
    #[error("no verification api key configured")]
    MissingApiKey,
    #[error("verification of {contract} at {address} failed: {reason}")]
    Failed {
        contract: String,
        address: Address,
        reason: String,
    },
}

/// Submits deployed contracts for source verification.
#[async_trait]
pub trait Verifier: Send + Sync {
    async fn verify(
        &self,
        contract: &str,
        address: Address,
        api_key: &str,
    ) -> Result<(), VerificationError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_kebab_case() {
        let opts: VerificationOpts =
            toml::from_str("verify = true\napi-key = \"KEY\"\nraise-on-error = true").unwrap();
        assert_eq!(
            opts,
            VerificationOpts::builder()
                .verify(true)
                .api_key("KEY")
                .raise_on_error(true)
                .build()
        );
        assert_eq!(toml::from_str::<VerificationOpts>("").unwrap(), VerificationOpts::default());
    }
}

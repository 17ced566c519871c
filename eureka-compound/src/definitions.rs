// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! Resource definitions for the Compound protocol contracts.
//!
//! Interest rates and collateral factors are written as fractions (`0.05` for 5%) and passed to
//! the contracts as 18-decimal mantissas. Exchange rates are passed through as given.

use async_trait::async_trait;
use eureka_engine::{
    config::Network, Actor, ActorError, CallOptions, CallSetter, Deploy, Entry, InstanceRef, Match,
    Property, PropertyType, Registry, Resolved, Schema, Setter, Variant,
};

const MANTISSA: u32 = 18;

/// A registry holding every Compound definition available on `network`.
pub fn registry(network: &Network) -> Registry {
    let mut registry = Registry::new();
    register(&mut registry, network);
    registry
}

pub fn register(registry: &mut Registry, network: &Network) {
    // Never define a settable price oracle on mainnet.
    if !network.is_mainnet() {
        registry.register("SimplePriceOracle", simple_price_oracle());
    }
    registry
        .register("InterestRateModel", linear_rate_model())
        .register("InterestRateModel", jump_rate_model())
        .register("InterestRateModel", dsr_rate_model())
        .register("CErc20Delegate", Variant::new("CErc20Delegate"))
        .register("CToken", ctoken_immutable())
        .register("CToken", ctoken_delegator())
        .register("CToken", cether())
        .register("Maximillion", maximillion())
        .register("Comptroller", Variant::new("Comptroller"))
        .register("Unitroller", unitroller())
        .register("CompoundLens", Variant::new("CompoundLens"))
        .register("Fauceteer", Variant::new("Fauceteer"));
}

fn of_type(type_name: &str) -> Match {
    Match::new().property("type", type_name)
}

fn simple_price_oracle() -> Variant {
    Variant::new("SimplePriceOracle").schema(
        Schema::new().property(
            Property::dict(
                "prices",
                PropertyType::reference("CToken"),
                PropertyType::Number,
            )
            .deferred()
            .optional()
            .setter(CallSetter::new("setPrice").getter("assetPrices")),
        ),
    )
}

fn linear_rate_model() -> Variant {
    Variant::new("WhitePaperInterestRateModel")
        .matching(of_type("linear"))
        .schema(
            Schema::new()
                .property(Property::string("type"))
                .property(Property::number("base"))
                .property(Property::number("slope")),
        )
        .build(
            Deploy::new()
                .mantissa("baseRatePerYear", "base", MANTISSA)
                .mantissa("multiplierPerYear", "slope", MANTISSA),
        )
}

fn jump_rate_model() -> Variant {
    Variant::new("JumpRateModel")
        .matching(of_type("jump"))
        .schema(
            Schema::new()
                .property(Property::string("type"))
                .property(Property::number("base"))
                .property(Property::number("slope"))
                .property(Property::number("jump"))
                .property(Property::number("kink")),
        )
        .build(
            Deploy::new()
                .mantissa("baseRatePerYear", "base", MANTISSA)
                .mantissa("multiplierPerYear", "slope", MANTISSA)
                .mantissa("jumpMultiplierPerYear", "jump", MANTISSA)
                .mantissa("kink_", "kink", MANTISSA),
        )
}

fn dsr_rate_model() -> Variant {
    Variant::new("DAIInterestRateModelV2")
        .matching(of_type("dsr"))
        .schema(
            Schema::new()
                .property(Property::string("type"))
                .property(Property::number("jump"))
                .property(Property::number("kink"))
                .property(Property::reference("pot", "Pot"))
                .property(Property::reference("jug", "Jug")),
        )
        .build(
            Deploy::new()
                .mantissa("jumpMultiplierPerYear", "jump", MANTISSA)
                .mantissa("kink_", "kink", MANTISSA)
                .arg("pot_", "pot")
                .arg("jug_", "jug"),
        )
}

/// Properties shared by every cToken variant, with `extra` inserted before the defaulted ones.
fn ctoken_schema(extra: impl IntoIterator<Item = Property>) -> Schema {
    let schema = Schema::new()
        .property(Property::string("type"))
        .property(Property::string("symbol"))
        .property(Property::string("name"))
        .property(Property::address("admin"))
        .property(Property::reference("comptroller", "Unitroller"));
    extra
        .into_iter()
        .fold(schema, Schema::property)
        .property(Property::number("decimals").default(8))
        .property(Property::number("initial_exchange_rate").default("0.2e10"))
        .property(
            Property::reference("interest_rate_model", "InterestRateModel")
                .setter(CallSetter::new("_setInterestRateModel").getter("interestRateModel")),
        )
}

fn ctoken_args() -> Deploy {
    Deploy::new()
        .arg("comptroller_", "comptroller")
        .arg("interestRateModel_", "interest_rate_model")
        .arg("initialExchangeRateMantissa_", "initial_exchange_rate")
        .arg("name_", "name")
        .arg("symbol_", "symbol")
        .arg("decimals_", "decimals")
        .arg("admin_", "admin")
}

fn ctoken_immutable() -> Variant {
    Variant::new("CErc20Immutable")
        .matching(of_type("immutable"))
        .schema(ctoken_schema([Property::reference("underlying", "Erc20")]))
        .build(ctoken_args().arg("underlying_", "underlying"))
}

fn ctoken_delegator() -> Variant {
    Variant::new("CErc20Delegator")
        .matching(of_type("delegator"))
        .schema(ctoken_schema([
            Property::reference("underlying", "Erc20"),
            Property::reference("delegate", "CErc20Delegate"),
            Property::string("become_implementation_data").default("0x"),
        ]))
        .build(
            ctoken_args()
                .arg("underlying_", "underlying")
                .arg("implementation_", "delegate")
                .arg("becomeImplementationData", "become_implementation_data"),
        )
}

fn cether() -> Variant {
    Variant::new("CEther")
        .matching(of_type("cether"))
        .schema(ctoken_schema([]))
        .build(ctoken_args())
}

fn maximillion() -> Variant {
    Variant::new("Maximillion")
        .schema(Schema::new().property(Property::reference("cEther", "CToken")))
        .build(Deploy::new().positional("cEther"))
}

/// The Unitroller holds protocol state and forwards calls to its comptroller implementation, so
/// its settings are applied through the `Comptroller` interface. Declaration order is the order
/// they are applied: markets can only be listed once an implementation is in place.
fn unitroller() -> Variant {
    let via_comptroller = |setter: CallSetter| setter.proxy("Comptroller");
    Variant::new("Unitroller").schema(
        Schema::new()
            .property(
                Property::reference("implementation", "Comptroller")
                    .deferred()
                    .optional()
                    .setter(BecomeImplementation),
            )
            .property(
                Property::array("supported_markets", PropertyType::reference("CToken"))
                    .deferred()
                    .optional()
                    .setter(via_comptroller(
                        CallSetter::new("_supportMarket").getter_output("markets", 0),
                    )),
            )
            .property(
                Property::dict(
                    "collateral_factors",
                    PropertyType::reference("CToken"),
                    PropertyType::Number,
                )
                .deferred()
                .optional()
                .setter(via_comptroller(
                    CallSetter::new("_setCollateralFactor")
                        .getter_output("markets", 1)
                        .mantissa(MANTISSA),
                )),
            )
            .property(
                Property::reference("oracle", "PriceOracle")
                    .deferred()
                    .optional()
                    .setter(via_comptroller(
                        CallSetter::new("_setPriceOracle").getter("oracle"),
                    )),
            ),
    )
}

/// Installs a comptroller implementation: the Unitroller proposes it, then the implementation
/// accepts.
struct BecomeImplementation;

#[async_trait]
impl Setter for BecomeImplementation {
    async fn current(
        &self,
        actor: &Actor<'_>,
        unitroller: &InstanceRef,
        _entry: &Entry<'_>,
    ) -> Result<Option<Resolved>, ActorError> {
        let outputs = actor
            .read(
                unitroller,
                "comptrollerImplementation",
                Vec::new(),
                &CallOptions::default(),
            )
            .await?;
        Ok(outputs.into_iter().next())
    }

    async fn apply(
        &self,
        actor: &Actor<'_>,
        unitroller: &InstanceRef,
        entry: &Entry<'_>,
    ) -> Result<(), ActorError> {
        let Some(Resolved::Address(implementation)) = entry.value() else {
            return Err(ActorError::PropertyType {
                name: "implementation".into(),
                expected: "address",
            });
        };
        let options = CallOptions::default();
        actor
            .trx(
                unitroller,
                "_setPendingImplementation",
                vec![Resolved::Address(*implementation)],
                &options,
            )
            .await?;
        let comptroller = InstanceRef::new(
            format!("{}.implementation", unitroller.name),
            "Comptroller",
            *implementation,
        );
        actor
            .trx(
                &comptroller,
                "_become",
                vec![Resolved::Address(unitroller.address)],
                &options,
            )
            .await?;
        Ok(())
    }
}

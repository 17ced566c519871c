// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! Drives a run: plans requested resources, deploys what changed and reconciles the rest.
//!
//! Every network operation completes before the next one is issued, so transactions from the
//! signing account are submitted in order. The run stops at the first error.

use std::sync::Arc;

use alloy::primitives::Address;
use indexmap::IndexMap;

use super::{
    actor::{Actor, InstanceRef},
    manifest::Manifest,
    plan::{Node, Planner},
    reconcile::reconcile,
    registry::{Registry, Variant},
    schema::Property,
    state::{fingerprint, Fingerprint, PersistedState, StateRecord, StateStore},
    value::{Properties, Resolved, Value},
    verification::{VerificationError, VerificationOpts, Verifier},
};
use crate::{utils::color::DebugColor, EngineError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Status {
    Unresolved,
    Resolving,
    Deployed,
    Reconciled,
}

/// A resource resolved during this run.
#[derive(Debug, Clone)]
pub struct Instance {
    pub name: String,
    pub type_name: String,
    pub variant: Arc<Variant>,
    pub properties: Properties<Value>,
    pub hard: Vec<String>,
    pub soft: Vec<String>,
    pub status: Status,
    pub address: Option<Address>,
    pub fingerprint: Option<Fingerprint>,
    /// Taken from persisted state or an earlier attempt rather than freshly built.
    pub reused: bool,
    pending_reconcile: bool,
}

impl Instance {
    fn new(node: Node) -> Self {
        Self {
            name: node.name,
            type_name: node.type_name,
            variant: node.variant,
            properties: node.properties,
            hard: node.hard,
            soft: node.soft,
            status: Status::Unresolved,
            address: None,
            fingerprint: None,
            reused: false,
            pending_reconcile: false,
        }
    }

    pub fn contract(&self) -> &str {
        &self.variant.contract
    }

    /// Deployed with nothing left to reconcile.
    pub fn is_settled(&self) -> bool {
        match self.status {
            Status::Reconciled => true,
            Status::Deployed => !self.pending_reconcile,
            Status::Unresolved | Status::Resolving => false,
        }
    }

    fn deployed_address(&self) -> Option<Address> {
        self.address.filter(|_| self.status >= Status::Deployed)
    }

    /// Properties applied after construction: deferred ones, plus constructor properties with a
    /// setter when the contract was not rebuilt from them.
    fn reconciled_properties<'v>(&self, variant: &'v Variant) -> Vec<&'v Property> {
        variant
            .schema
            .properties()
            .filter(|property| self.properties.get(&property.name).is_some())
            .filter(|property| property.deferred || (self.reused && property.setter.is_some()))
            .collect()
    }
}

pub struct Engine<'a> {
    registry: &'a Registry,
    manifest: Manifest,
    actor: Actor<'a>,
    store: StateStore,
    state: PersistedState,
    verification: VerificationOpts,
    verifier: Option<&'a dyn Verifier>,
    instances: IndexMap<String, Instance>,
}

impl<'a> Engine<'a> {
    /// Loads persisted state. An unreadable state file is fatal here, before anything is sent.
    pub fn new(
        registry: &'a Registry,
        manifest: Manifest,
        actor: Actor<'a>,
        store: StateStore,
    ) -> Result<Self> {
        let state = store.load()?;
        debug!(@grey, "loaded {} state records from {}", state.len(), store.path().display());
        Ok(Self {
            registry,
            manifest,
            actor,
            store,
            state,
            verification: VerificationOpts::default(),
            verifier: None,
            instances: IndexMap::new(),
        })
    }

    pub fn with_verifier(mut self, opts: VerificationOpts, verifier: &'a dyn Verifier) -> Self {
        self.verification = opts;
        self.verifier = Some(verifier);
        self
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn state(&self) -> &PersistedState {
        &self.state
    }

    pub fn instance(&self, name: &str) -> Option<&Instance> {
        self.instances.get(name)
    }

    pub fn instances(&self) -> impl Iterator<Item = &Instance> {
        self.instances.values()
    }

    pub fn address(&self, name: &str) -> Option<Address> {
        self.instances.get(name)?.deployed_address()
    }

    /// Orders `names` and everything they reference, without touching the network.
    pub fn plan<'n>(&self, names: impl IntoIterator<Item = &'n str>) -> Result<Vec<Node>> {
        let done = |name: &str| {
            self.instances
                .get(name)
                .map_or(false, Instance::is_settled)
        };
        let mut planner = Planner::new(self.registry, &self.manifest, &done);
        for name in names {
            planner.request(name)?;
        }
        Ok(planner.finish())
    }

    /// Deploys and reconciles `name` and its dependencies. Settled resources are returned as is.
    pub async fn resolve(&mut self, name: &str) -> Result<&Instance> {
        let nodes = self.plan([name])?;
        self.execute(nodes).await?;
        self.instances
            .get(name)
            .ok_or_else(|| EngineError::UnresolvedReference {
                name: name.to_owned(),
                referenced_by: None,
            })
    }

    /// Resolves every resource in the manifest. The whole graph is planned first, so a cycle
    /// anywhere fails the run before the first transaction.
    pub async fn resolve_all(&mut self) -> Result<()> {
        let names: Vec<String> = self.manifest.names().map(str::to_owned).collect();
        let nodes = self.plan(names.iter().map(String::as_str))?;
        self.execute(nodes).await
    }

    async fn execute(&mut self, nodes: Vec<Node>) -> Result<()> {
        for node in nodes {
            let name = node.name.clone();
            let previous = self.instances.shift_remove(&name);
            self.instances.insert(name.clone(), Instance::new(node));
            self.deploy(&name, previous).await?;
            self.reconcile_ready().await?;
        }
        Ok(())
    }

    async fn deploy(&mut self, name: &str, previous: Option<Instance>) -> Result<()> {
        let (variant, resolved) = {
            let instance = self.instance_mut(name)?;
            instance.status = Status::Resolving;
            let variant = Arc::clone(&instance.variant);
            let instance = &self.instances[name];
            let mut resolved = Properties::default();
            for (property, value) in instance.properties.iter() {
                if variant.schema.get(property).map_or(false, |p| p.deferred) {
                    continue;
                }
                resolved.insert(property, self.resolve_value(name, value)?);
            }
            (variant, resolved)
        };

        let fp = fingerprint(
            &variant.contract,
            resolved.iter().filter(|(property, _)| {
                variant
                    .schema
                    .get(property)
                    .map_or(true, |p| p.setter.is_none())
            }),
        );

        let earlier = previous
            .filter(|previous| previous.fingerprint == Some(fp))
            .and_then(|previous| previous.address);
        let (address, reused) = match self.state.get(name) {
            Some(record) if !self.state.should_redeploy(name, &fp) => (record.address, true),
            _ => match earlier {
                Some(address) => (address, true),
                None => (self.build(name, &variant, &resolved).await?, false),
            },
        };
        if reused {
            info!(@grey, "{name}: reusing {} at {}", variant.contract, address.debug_lavender());
        }

        let instance = self.instance_mut(name)?;
        instance.address = Some(address);
        instance.fingerprint = Some(fp);
        instance.reused = reused;
        instance.status = Status::Deployed;
        instance.pending_reconcile = !instance.reconciled_properties(&variant).is_empty();
        if !instance.pending_reconcile {
            self.persist(name);
        }
        Ok(())
    }

    async fn build(
        &self,
        name: &str,
        variant: &Variant,
        properties: &Properties<Resolved>,
    ) -> Result<Address> {
        info!(@grey, "{name}: deploying {}", variant.contract);
        let address = variant
            .build
            .build(&self.actor, &variant.contract, properties)
            .await
            .map_err(|source| EngineError::Build {
                resource: name.to_owned(),
                source,
            })?;
        self.verify(name, &variant.contract, address).await?;
        Ok(address)
    }

    async fn verify(&self, name: &str, contract: &str, address: Address) -> Result<()> {
        if !self.verification.verify {
            return Ok(());
        }
        let Some(verifier) = self.verifier else {
            warn!(@yellow, "{name}: verification requested but no verifier attached, skipping");
            return Ok(());
        };
        let result = match &self.verification.api_key {
            Some(api_key) => verifier.verify(contract, address, api_key).await,
            None => Err(VerificationError::MissingApiKey),
        };
        match result {
            Ok(()) => Ok(()),
            Err(source) if self.verification.raise_on_error => Err(EngineError::Verification {
                resource: name.to_owned(),
                source,
            }),
            Err(err) => {
                warn!(@yellow, "{name}: {err}");
                Ok(())
            }
        }
    }

    /// Reconciles every deployed instance whose soft references are all deployed.
    async fn reconcile_ready(&mut self) -> Result<()> {
        loop {
            let ready = self.instances.values().find(|instance| {
                instance.status == Status::Deployed
                    && instance.pending_reconcile
                    && instance
                        .soft
                        .iter()
                        .all(|target| self.address(target).is_some())
            });
            let Some(name) = ready.map(|instance| instance.name.clone()) else {
                return Ok(());
            };
            self.reconcile(&name).await?;
        }
    }

    async fn reconcile(&mut self, name: &str) -> Result<()> {
        let instance = &self.instances[name];
        let variant = Arc::clone(&instance.variant);
        let target = InstanceRef::new(
            name,
            &variant.contract,
            instance.address.unwrap_or_default(),
        );
        let mut work = Vec::new();
        for property in instance.reconciled_properties(&variant) {
            if let Some(value) = instance.properties.get(&property.name) {
                work.push((property, self.resolve_value(name, value)?));
            }
        }

        reconcile(&self.actor, &target, &work).await?;

        let instance = self.instance_mut(name)?;
        instance.status = Status::Reconciled;
        instance.pending_reconcile = false;
        self.persist(name);
        Ok(())
    }

    fn resolve_value(&self, name: &str, value: &Value) -> Result<Resolved> {
        value
            .resolve(&|target: &str| self.address(target))
            .map_err(|missing| EngineError::UnresolvedReference {
                name: missing,
                referenced_by: Some(name.to_owned()),
            })
    }

    fn instance_mut(&mut self, name: &str) -> Result<&mut Instance> {
        self.instances
            .get_mut(name)
            .ok_or_else(|| EngineError::UnresolvedReference {
                name: name.to_owned(),
                referenced_by: None,
            })
    }

    /// Records the instance. A failed write only warns: the contract is already on chain.
    fn persist(&mut self, name: &str) {
        let Some(instance) = self.instances.get(name) else {
            return;
        };
        let (Some(address), Some(constructor_fingerprint)) = (instance.address, instance.fingerprint)
        else {
            return;
        };
        self.state.record(
            name,
            StateRecord {
                address,
                constructor_fingerprint,
            },
        );
        if let Err(err) = self.store.save(&self.state) {
            warn!(@yellow, "{name} deployed but not saved: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{
        core::reconcile::CallSetter, testing::MockChain, Deploy, Number, PropertyType, Schema,
    };

    fn registry() -> Registry {
        let mut registry = Registry::new();
        registry
            .register(
                "Token",
                Variant::new("Token")
                    .schema(Schema::new().property(Property::string("symbol")))
                    .build(Deploy::new().arg("symbol_", "symbol")),
            )
            .register("Model", Variant::new("Model"))
            .register(
                "Market",
                Variant::new("Market")
                    .schema(
                        Schema::new()
                            .property(Property::reference("underlying", "Token"))
                            .property(Property::reference("hub", "Hub").optional())
                            .property(
                                Property::reference("model", "Model")
                                    .optional()
                                    .setter(CallSetter::new("_setModel").getter("model")),
                            ),
                    )
                    .build(Deploy::new().arg("underlying_", "underlying")),
            )
            .register(
                "Hub",
                Variant::new("Hub").schema(
                    Schema::new()
                        .property(
                            Property::array("members", PropertyType::reference("Market"))
                                .deferred()
                                .optional()
                                .setter(CallSetter::new("_add")),
                        )
                        .property(
                            Property::dict(
                                "factors",
                                PropertyType::reference("Token"),
                                PropertyType::Number,
                            )
                            .deferred()
                            .optional()
                            .setter(
                                CallSetter::new("_setFactor")
                                    .getter_output("factors", 0)
                                    .mantissa(18),
                            ),
                        ),
                ),
            );
        registry
    }

    fn store() -> (tempfile::TempDir, StateStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = StateStore::new(dir.path().join("development-state.json"));
        (dir, store)
    }

    fn wei(n: u64) -> Resolved {
        Resolved::Number(Number::from(n))
    }

    fn summaries(chain: &MockChain) -> Vec<String> {
        chain.events().iter().map(|event| event.summary()).collect()
    }

    #[tokio::test]
    async fn deploys_in_dependency_order() {
        let registry = registry();
        let chain = MockChain::new();
        let (_dir, store) = store();
        let manifest = Manifest::new()
            .resource("mZRX", "Market", json!({ "underlying": "ZRX" }))
            .resource("ZRX", "Token", json!({ "symbol": "ZRX" }));
        let mut engine = Engine::new(&registry, manifest, Actor::new(&chain), store).unwrap();

        engine.resolve_all().await.unwrap();

        assert_eq!(chain.deployed(), vec!["Token", "Market"]);
        let zrx = engine.address("ZRX").unwrap();
        assert_eq!(
            chain.events()[1],
            crate::testing::Event::Deploy {
                contract: "Market".into(),
                args: crate::ConstructorArgs::Named(vec![(
                    "underlying_".into(),
                    Resolved::Address(zrx)
                )]),
                address: engine.address("mZRX").unwrap(),
            }
        );
        assert_eq!(engine.instance("mZRX").unwrap().status, Status::Deployed);
    }

    #[tokio::test]
    async fn rerun_with_unchanged_state_is_a_no_op() {
        let registry = registry();
        let (_dir, store) = store();
        let manifest = Manifest::new()
            .resource("mZRX", "Market", json!({ "underlying": "ZRX" }))
            .resource("ZRX", "Token", json!({ "symbol": "ZRX" }));

        let first = MockChain::new();
        let mut engine =
            Engine::new(&registry, manifest.clone(), Actor::new(&first), store.clone()).unwrap();
        engine.resolve_all().await.unwrap();
        let addresses = (engine.address("ZRX"), engine.address("mZRX"));
        assert_eq!(first.deployed().len(), 2);

        let second = MockChain::new();
        let mut engine = Engine::new(&registry, manifest, Actor::new(&second), store).unwrap();
        engine.resolve_all().await.unwrap();
        assert!(second.events().is_empty());
        assert_eq!((engine.address("ZRX"), engine.address("mZRX")), addresses);
        assert!(engine.instance("mZRX").unwrap().reused);
    }

    #[tokio::test]
    async fn changed_constructor_input_redeploys() {
        let registry = registry();
        let (_dir, store) = store();

        let first = MockChain::new();
        let manifest = Manifest::new().resource("ZRX", "Token", json!({ "symbol": "ZRX" }));
        let mut engine =
            Engine::new(&registry, manifest, Actor::new(&first), store.clone()).unwrap();
        engine.resolve("ZRX").await.unwrap();

        let second = MockChain::new();
        let manifest = Manifest::new().resource("ZRX", "Token", json!({ "symbol": "ZRX2" }));
        let mut engine = Engine::new(&registry, manifest, Actor::new(&second), store).unwrap();
        engine.resolve("ZRX").await.unwrap();
        assert_eq!(second.deployed(), vec!["Token"]);
    }

    #[tokio::test]
    async fn reused_instances_reconcile_mutable_constructor_properties() {
        let registry = registry();
        let (_dir, store) = store();

        let first = MockChain::new();
        let manifest = Manifest::new()
            .resource("ZRX", "Token", json!({ "symbol": "ZRX" }))
            .resource("Linear", "Model", json!({}))
            .resource("mZRX", "Market", json!({ "underlying": "ZRX", "model": "Linear" }));
        let mut engine =
            Engine::new(&registry, manifest, Actor::new(&first), store.clone()).unwrap();
        engine.resolve_all().await.unwrap();
        assert!(first.sent().is_empty());

        let second = MockChain::new();
        let manifest = Manifest::new()
            .resource("ZRX", "Token", json!({ "symbol": "ZRX" }))
            .resource("Jump", "Model", json!({}))
            .resource("mZRX", "Market", json!({ "underlying": "ZRX", "model": "Jump" }));
        let mut engine = Engine::new(&registry, manifest, Actor::new(&second), store).unwrap();
        engine.resolve_all().await.unwrap();

        assert_eq!(second.deployed(), vec!["Model"]);
        let jump = Resolved::Address(engine.address("Jump").unwrap());
        assert_eq!(
            summaries(&second),
            vec![
                "deploy Model".to_owned(),
                "read model()".to_owned(),
                format!("send _setModel({jump})"),
            ]
        );
        assert_eq!(engine.instance("mZRX").unwrap().status, Status::Reconciled);
    }

    #[tokio::test]
    async fn dictionary_reconciliation_reads_before_each_write() {
        let registry = registry();
        let chain = MockChain::new();
        let (_dir, store) = store();
        let manifest = Manifest::new()
            .resource("A", "Token", json!({ "symbol": "A" }))
            .resource("B", "Token", json!({ "symbol": "B" }))
            .resource("Hub", "Hub", json!({ "factors": { "A": 0.5, "B": 0.3 } }));
        let mut engine = Engine::new(&registry, manifest, Actor::new(&chain), store).unwrap();
        let a = engine.resolve("A").await.unwrap().address.unwrap();
        let b = engine.resolve("B").await.unwrap().address.unwrap();
        // Hub is deployed next.
        let hub = MockChain::nth_address(2);
        chain.mock_read(
            hub,
            "factors",
            vec![Resolved::Address(a)],
            vec![wei(500_000_000_000_000_000)],
        );
        chain.mock_read(hub, "factors", vec![Resolved::Address(b)], vec![wei(0)]);

        engine.resolve("Hub").await.unwrap();

        assert_eq!(
            summaries(&chain)[2..],
            [
                "deploy Hub".to_owned(),
                format!("read factors({})", Resolved::Address(a)),
                format!("read factors({})", Resolved::Address(b)),
                format!(
                    "send _setFactor({}, {})",
                    Resolved::Address(b),
                    wei(300_000_000_000_000_000)
                ),
            ]
        );
        assert_eq!(engine.instance("Hub").unwrap().status, Status::Reconciled);
        assert_eq!(engine.state().get("Hub").map(|record| record.address), Some(hub));
    }

    #[tokio::test]
    async fn failed_entry_aborts_the_rest() {
        let registry = registry();
        let chain = MockChain::new();
        let (_dir, store) = store();
        let manifest = Manifest::new()
            .resource("A", "Token", json!({ "symbol": "A" }))
            .resource("B", "Token", json!({ "symbol": "B" }))
            .resource("C", "Token", json!({ "symbol": "C" }))
            .resource("Hub", "Hub", json!({ "factors": { "A": 0.1, "B": 0.2, "C": 0.3 } }));
        let mut engine =
            Engine::new(&registry, manifest, Actor::new(&chain), store.clone()).unwrap();
        let b = engine.resolve("B").await.unwrap().address.unwrap();
        chain.fail_send(
            "_setFactor",
            vec![Resolved::Address(b), wei(200_000_000_000_000_000)],
        );

        let err = engine.resolve("Hub").await.unwrap_err();

        let EngineError::Reconciliation(err) = err else {
            panic!("unexpected error: {err}");
        };
        assert_eq!((err.resource.as_str(), err.property.as_str()), ("Hub", "factors"));
        assert!(err.entry.starts_with("entry 1"), "{}", err.entry);
        let sent: Vec<_> = chain.sent().into_iter().map(|call| call.args[0].clone()).collect();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[1], Resolved::Address(b));

        let saved = store.load().unwrap();
        assert!(saved.get("A").is_some());
        assert!(saved.get("Hub").is_none());
        assert_eq!(engine.instance("Hub").unwrap().status, Status::Deployed);
    }

    #[tokio::test]
    async fn cycle_fails_before_any_transaction() {
        let registry = registry();
        let chain = MockChain::new();
        let (_dir, store) = store();
        let manifest = Manifest::new()
            .resource("ZRX", "Token", json!({ "symbol": "ZRX" }))
            .resource("X", "Market", json!({ "underlying": "ZRX", "hub": "Y" }))
            .resource("Y", "Market", json!({ "underlying": "ZRX", "hub": "X" }));
        let mut engine = Engine::new(&registry, manifest, Actor::new(&chain), store).unwrap();

        let err = engine.resolve_all().await.unwrap_err();

        assert!(matches!(err, EngineError::CyclicDependency { .. }), "{err}");
        assert!(chain.events().is_empty());
    }

    #[tokio::test]
    async fn deferred_references_may_form_cycles() {
        let registry = registry();
        let chain = MockChain::new();
        let (_dir, store) = store();
        let manifest = Manifest::new()
            .resource("Hub", "Hub", json!({ "members": ["mZRX"] }))
            .resource("mZRX", "Market", json!({ "underlying": "ZRX", "hub": "Hub" }))
            .resource("ZRX", "Token", json!({ "symbol": "ZRX" }));
        let mut engine = Engine::new(&registry, manifest, Actor::new(&chain), store).unwrap();

        engine.resolve("Hub").await.unwrap();

        let market = Resolved::Address(engine.address("mZRX").unwrap());
        assert_eq!(
            summaries(&chain),
            vec![
                "deploy Hub".to_owned(),
                "deploy Token".to_owned(),
                "deploy Market".to_owned(),
                format!("send _add({market})"),
            ]
        );
        assert_eq!(chain.sent()[0].to, engine.address("Hub").unwrap());
    }

    #[tokio::test]
    async fn shared_dependency_deploys_once() {
        let registry = registry();
        let chain = MockChain::new();
        let (_dir, store) = store();
        let manifest = Manifest::new()
            .resource("ZRX", "Token", json!({ "symbol": "ZRX" }))
            .resource("mZRX", "Market", json!({ "underlying": "ZRX" }))
            .resource("nZRX", "Market", json!({ "underlying": "ZRX" }));
        let mut engine = Engine::new(&registry, manifest, Actor::new(&chain), store).unwrap();

        engine.resolve("mZRX").await.unwrap();
        engine.resolve("nZRX").await.unwrap();
        engine.resolve_all().await.unwrap();

        assert_eq!(chain.deployed(), vec!["Token", "Market", "Market"]);
    }

    #[tokio::test]
    async fn misspelled_reference_fails_loudly() {
        let registry = registry();
        let chain = MockChain::new();
        let (_dir, store) = store();
        let manifest = Manifest::new()
            .resource("cEther", "Token", json!({ "symbol": "cETH" }))
            .resource("Hub", "Hub", json!({ "factors": { "cETher": 0.75 } }));
        let mut engine = Engine::new(&registry, manifest, Actor::new(&chain), store).unwrap();

        let err = engine.resolve_all().await.unwrap_err();

        assert!(matches!(
            err,
            EngineError::UnresolvedReference { ref name, referenced_by: Some(ref by) }
                if name == "cETher" && by == "Hub"
        ));
        assert!(chain.events().is_empty());
    }

    #[tokio::test]
    async fn build_failure_names_the_resource() {
        let registry = registry();
        let chain = MockChain::new();
        chain.fail_deploy("Token");
        let (_dir, store) = store();
        let manifest = Manifest::new().resource("ZRX", "Token", json!({ "symbol": "ZRX" }));
        let mut engine = Engine::new(&registry, manifest, Actor::new(&chain), store).unwrap();

        let err = engine.resolve("ZRX").await.unwrap_err();
        assert!(matches!(err, EngineError::Build { ref resource, .. } if resource == "ZRX"));
        assert!(engine.address("ZRX").is_none());
        assert!(chain.deployed().is_empty());
    }

    struct RejectingVerifier;

    #[async_trait::async_trait]
    impl Verifier for RejectingVerifier {
        async fn verify(
            &self,
            contract: &str,
            address: Address,
            _api_key: &str,
        ) -> std::result::Result<(), VerificationError> {
            Err(VerificationError::Failed {
                contract: contract.to_owned(),
                address,
                reason: "source mismatch".into(),
            })
        }
    }

    #[tokio::test]
    async fn verification_failures_are_fatal_only_when_raised() {
        let registry = registry();
        let manifest = Manifest::new().resource("ZRX", "Token", json!({ "symbol": "ZRX" }));
        let verifier = RejectingVerifier;

        let chain = MockChain::new();
        let (_lenient_dir, lenient_store) = store();
        let opts = VerificationOpts::builder().verify(true).api_key("KEY").build();
        let mut engine = Engine::new(
            &registry,
            manifest.clone(),
            Actor::new(&chain),
            lenient_store,
        )
        .unwrap()
        .with_verifier(opts, &verifier);
        engine.resolve("ZRX").await.unwrap();

        let chain = MockChain::new();
        let (_strict_dir, strict_store) = store();
        let opts = VerificationOpts::builder()
            .verify(true)
            .api_key("KEY")
            .raise_on_error(true)
            .build();
        let mut engine = Engine::new(&registry, manifest, Actor::new(&chain), strict_store)
            .unwrap()
            .with_verifier(opts, &verifier);
        let err = engine.resolve("ZRX").await.unwrap_err();
        assert!(matches!(err, EngineError::Verification { .. }));
    }

    #[tokio::test]
    async fn missing_verifier_skips_verification() {
        let registry = registry();
        let manifest = Manifest::new().resource("ZRX", "Token", json!({ "symbol": "ZRX" }));
        let chain = MockChain::new();
        let (_dir, state) = store();
        let mut engine = Engine::new(&registry, manifest, Actor::new(&chain), state).unwrap();
        engine.verification = VerificationOpts::builder()
            .verify(true)
            .raise_on_error(true)
            .build();

        let instance = engine.resolve("ZRX").await.unwrap();
        assert_eq!(instance.status, Status::Deployed);
        assert_eq!(chain.deployed(), vec!["Token"]);
    }
}

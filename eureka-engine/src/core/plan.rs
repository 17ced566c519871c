// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! Dependency discovery and ordering, done before any network operation.
//!
//! Non-deferred references are hard edges: the target must be deployed before the referencing
//! resource is built, so they must form a DAG. Deferred references are soft edges: the target
//! joins the plan but only has to exist by the time the referencing resource is reconciled, so
//! soft edges may close cycles.

use std::{collections::VecDeque, sync::Arc};

use indexmap::IndexMap;

use super::{
    manifest::Manifest,
    registry::{Registry, RegistryError, Variant},
    schema::SchemaError,
    value::{Properties, Value},
};
use crate::{EngineError, Result};

/// A resource with its variant selected and its properties coerced.
#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub type_name: String,
    pub variant: Arc<Variant>,
    pub properties: Properties<Value>,
    /// Resources that must be deployed before this one is built.
    pub hard: Vec<String>,
    /// Resources that must be deployed before this one is reconciled.
    pub soft: Vec<String>,
}

/// Walks the reference graph from requested resources.
pub struct Planner<'a> {
    registry: &'a Registry,
    manifest: &'a Manifest,
    done: &'a dyn Fn(&str) -> bool,
    nodes: IndexMap<String, Node>,
    stack: Vec<String>,
    soft: VecDeque<(String, String)>,
}

impl<'a> Planner<'a> {
    /// Resources for which `done` returns true are treated as already settled and left out.
    pub fn new(
        registry: &'a Registry,
        manifest: &'a Manifest,
        done: &'a dyn Fn(&str) -> bool,
    ) -> Self {
        Self {
            registry,
            manifest,
            done,
            nodes: IndexMap::new(),
            stack: Vec::new(),
            soft: VecDeque::new(),
        }
    }

    /// Adds `name` and everything it reaches to the plan.
    pub fn request(&mut self, name: &str) -> Result<()> {
        self.visit(name, None)?;
        while let Some((target, source)) = self.soft.pop_front() {
            self.visit(&target, Some(&source))?;
        }
        Ok(())
    }

    /// Planned nodes, each after all of its hard dependencies.
    pub fn finish(self) -> Vec<Node> {
        self.nodes.into_values().collect()
    }

    fn visit(&mut self, name: &str, referenced_by: Option<&str>) -> Result<()> {
        if self.nodes.contains_key(name) || (self.done)(name) {
            return Ok(());
        }
        if let Some(pos) = self.stack.iter().position(|entry| entry == name) {
            let mut cycle = self.stack[pos..].to_vec();
            cycle.push(name.to_owned());
            return Err(EngineError::CyclicDependency { cycle });
        }

        let node = self.node(name, referenced_by)?;
        self.stack.push(name.to_owned());
        for dependency in &node.hard {
            self.visit(dependency, Some(name))?;
        }
        self.stack.pop();

        self.soft.extend(
            node.soft
                .iter()
                .map(|target| (target.clone(), name.to_owned())),
        );
        self.nodes.insert(name.to_owned(), node);
        Ok(())
    }

    fn node(&self, name: &str, referenced_by: Option<&str>) -> Result<Node> {
        let spec = self
            .manifest
            .get(name)
            .ok_or_else(|| EngineError::UnresolvedReference {
                name: name.to_owned(),
                referenced_by: referenced_by.map(str::to_owned),
            })?;
        let type_name = spec.type_name(name);

        let variant = self
            .registry
            .resolve(type_name, &spec.properties)
            .map_err(|err| match err {
                RegistryError::UnknownType(type_name) => EngineError::UnknownType {
                    resource: name.to_owned(),
                    type_name,
                },
                RegistryError::UnmatchedVariant(type_name) => EngineError::UnmatchedVariant {
                    resource: name.to_owned(),
                    type_name,
                },
            })?;
        let properties = variant
            .schema
            .coerce(&spec.properties)
            .map_err(|err| match err {
                SchemaError::Missing(property) => EngineError::MissingRequiredProperty {
                    resource: name.to_owned(),
                    property,
                },
                SchemaError::Coercion { property, reason } => EngineError::PropertyCoercion {
                    resource: name.to_owned(),
                    property,
                    reason,
                },
            })?;

        let mut hard = Vec::new();
        let mut soft = Vec::new();
        for (property, value) in properties.iter() {
            let deferred = variant
                .schema
                .get(property)
                .map_or(false, |property| property.deferred);
            let mut refs = Vec::new();
            value.references(&mut refs);
            let edges = if deferred { &mut soft } else { &mut hard };
            for target in refs {
                if !edges.iter().any(|edge| edge == target) {
                    edges.push(target.to_owned());
                }
            }
        }
        // A deferred self-reference is satisfied by the instance's own deployment.
        soft.retain(|target| target != name);

        Ok(Node {
            name: name.to_owned(),
            type_name: type_name.to_owned(),
            variant,
            properties,
            hard,
            soft,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{Property, PropertyType, Schema};

    fn registry() -> Registry {
        let mut registry = Registry::new();
        registry
            .register("Token", Variant::new("Token"))
            .register(
                "Market",
                Variant::new("Market").schema(
                    Schema::new()
                        .property(Property::reference("underlying", "Token"))
                        .property(Property::reference("hub", "Hub")),
                ),
            )
            .register(
                "Hub",
                Variant::new("Hub").schema(
                    Schema::new().property(
                        Property::array("markets", PropertyType::reference("Market"))
                            .deferred()
                            .optional(),
                    ),
                ),
            );
        registry
    }

    fn names(nodes: &[Node]) -> Vec<&str> {
        nodes.iter().map(|node| node.name.as_str()).collect()
    }

    fn plan(manifest: &Manifest, requests: &[&str]) -> Result<Vec<Node>> {
        let registry = registry();
        let done = |_: &str| false;
        let mut planner = Planner::new(&registry, manifest, &done);
        for name in requests {
            planner.request(name)?;
        }
        Ok(planner.finish())
    }

    #[test]
    fn hard_edges_come_first() {
        let manifest = Manifest::new()
            .resource("mZRX", "Market", json!({ "underlying": "ZRX", "hub": "Hub" }))
            .resource("ZRX", "Token", json!({}))
            .resource("Hub", "Hub", json!({ "markets": ["mZRX"] }));
        let nodes = plan(&manifest, &["mZRX"]).unwrap();
        assert_eq!(names(&nodes), vec!["ZRX", "Hub", "mZRX"]);
        assert_eq!(nodes[2].hard, vec!["ZRX", "Hub"]);
        assert_eq!(nodes[1].soft, vec!["mZRX"]);
    }

    #[test]
    fn soft_edges_join_the_plan() {
        let manifest = Manifest::new()
            .resource("Hub", "Hub", json!({ "markets": ["mZRX", "mBAT"] }))
            .resource("mZRX", "Market", json!({ "underlying": "ZRX", "hub": "Hub" }))
            .resource("mBAT", "Market", json!({ "underlying": "BAT", "hub": "Hub" }))
            .resource("ZRX", "Token", json!({}))
            .resource("BAT", "Token", json!({}));
        let nodes = plan(&manifest, &["Hub"]).unwrap();
        assert_eq!(names(&nodes), vec!["Hub", "ZRX", "mZRX", "BAT", "mBAT"]);
    }

    #[test]
    fn hard_cycle_is_reported() {
        let manifest = Manifest::new()
            .resource("mZRX", "Market", json!({ "underlying": "ZRX", "hub": "mBAT" }))
            .resource("mBAT", "Market", json!({ "underlying": "ZRX", "hub": "mZRX" }))
            .resource("ZRX", "Token", json!({}));
        let err = plan(&manifest, &["mZRX"]).unwrap_err();
        assert!(
            matches!(&err, EngineError::CyclicDependency { cycle } if cycle == &["mZRX", "mBAT", "mZRX"]),
            "{err}"
        );
    }

    #[test]
    fn unknown_name_is_unresolved() {
        let manifest = Manifest::new()
            .resource("cEther", "Market", json!({ "underlying": "ETH", "hub": "Hub" }))
            .resource("Hub", "Hub", json!({}));
        let err = plan(&manifest, &["cEther"]).unwrap_err();
        assert!(matches!(
            err,
            EngineError::UnresolvedReference { name, referenced_by: Some(by) }
                if name == "ETH" && by == "cEther"
        ));
    }

    #[test]
    fn literal_addresses_are_not_edges() {
        let manifest = Manifest::new().resource(
            "mDAI",
            "Market",
            json!({
                "underlying": "0x6B175474E89094C44Da98b954EedeAC495271d0F",
                "hub": "0x3d9819210A31b4961b30EF54bE2aeD79B9c9Cd3B",
            }),
        );
        let nodes = plan(&manifest, &["mDAI"]).unwrap();
        assert_eq!(names(&nodes), vec!["mDAI"]);
        assert!(nodes[0].hard.is_empty());
    }

    #[test]
    fn settled_resources_are_skipped() {
        let registry = registry();
        let manifest = Manifest::new()
            .resource("mZRX", "Market", json!({ "underlying": "ZRX", "hub": "Hub" }))
            .resource("ZRX", "Token", json!({}))
            .resource("Hub", "Hub", json!({}));
        let done = |name: &str| name == "Hub";
        let mut planner = Planner::new(&registry, &manifest, &done);
        planner.request("mZRX").unwrap();
        assert_eq!(names(&planner.finish()), vec!["ZRX", "mZRX"]);
    }

    #[test]
    fn schema_errors_name_the_resource() {
        let manifest = Manifest::new().resource("mZRX", "Market", json!({ "hub": "Hub" }));
        let err = plan(&manifest, &["mZRX"]).unwrap_err();
        assert!(matches!(
            err,
            EngineError::MissingRequiredProperty { resource, property }
                if resource == "mZRX" && property == "underlying"
        ));

        let manifest = Manifest::new().resource("x", "Widget", json!({}));
        assert!(matches!(
            plan(&manifest, &["x"]).unwrap_err(),
            EngineError::UnknownType { type_name, .. } if type_name == "Widget"
        ));
    }
}

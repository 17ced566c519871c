// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! Read-compare-write application of post-construction properties.
//!
//! Ordering: properties are applied in schema declaration order, and the entries of a dictionary
//! or array property strictly one after another. Entry `k + 1` is not read before entry `k`'s
//! transaction has been confirmed or skipped, so that transactions from the single signing
//! account go out with increasing nonces and a failure leaves every later entry untouched.
//! Transactions confirmed before a failure stay committed.

use async_trait::async_trait;

use super::{
    actor::{Actor, InstanceRef},
    executor::CallOptions,
    schema::Property,
    value::{Number, Resolved},
};
use crate::ActorError;

static PRESENT: Resolved = Resolved::Bool(true);

/// One unit of reconciliation work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entry<'a> {
    /// A scalar or reference property.
    Scalar(&'a Resolved),
    /// One entry of a dictionary property.
    Pair {
        key: &'a Resolved,
        value: &'a Resolved,
    },
    /// One element of an array property, to be present on chain.
    Element(&'a Resolved),
}

impl<'a> Entry<'a> {
    /// Splits a property value into entries, in iteration order.
    pub fn split(value: &'a Resolved) -> Vec<Entry<'a>> {
        match value {
            Resolved::Dict(entries) => entries
                .iter()
                .map(|(key, value)| Entry::Pair { key, value })
                .collect(),
            Resolved::Array(items) => items.iter().map(Entry::Element).collect(),
            other => vec![Entry::Scalar(other)],
        }
    }

    /// The value a getter must observe for this entry to count as already set.
    pub fn desired(&self) -> &'a Resolved {
        match self {
            Entry::Scalar(value) | Entry::Pair { value, .. } => *value,
            Entry::Element(_) => &PRESENT,
        }
    }

    /// Arguments identifying the entry: the key of a pair or the element itself.
    pub fn key_args(&self) -> Vec<Resolved> {
        match self {
            Entry::Scalar(_) => Vec::new(),
            Entry::Pair { key, .. } => vec![(*key).clone()],
            Entry::Element(element) => vec![(*element).clone()],
        }
    }

    /// The value to write, if the entry carries one.
    pub fn value(&self) -> Option<&'a Resolved> {
        match self {
            Entry::Scalar(value) | Entry::Pair { value, .. } => Some(*value),
            Entry::Element(_) => None,
        }
    }

    fn describe(&self, index: usize) -> String {
        match self {
            Entry::Scalar(_) => "value".to_owned(),
            Entry::Pair { key, .. } => format!("entry {index} ({key})"),
            Entry::Element(element) => format!("element {index} ({element})"),
        }
    }
}

/// Custom read and write routines for one property.
#[async_trait]
pub trait Setter: Send + Sync {
    /// Reads the on-chain value corresponding to `entry`, comparable with [`Entry::desired`].
    /// `None` means the value cannot be observed and the entry is always written.
    async fn current(
        &self,
        _actor: &Actor<'_>,
        _instance: &InstanceRef,
        _entry: &Entry<'_>,
    ) -> Result<Option<Resolved>, ActorError> {
        Ok(None)
    }

    /// Issues the transactions that make `entry` hold on chain.
    async fn apply(
        &self,
        actor: &Actor<'_>,
        instance: &InstanceRef,
        entry: &Entry<'_>,
    ) -> Result<(), ActorError>;
}

#[derive(Debug, Clone)]
struct Getter {
    function: String,
    output: usize,
}

/// Setter issuing a single call per entry: `function(key?, value?)`, optionally reading the
/// current value with `getter(key?)` first.
#[derive(Debug, Clone)]
pub struct CallSetter {
    function: String,
    getter: Option<Getter>,
    options: CallOptions,
    decimals: Option<u32>,
}

impl CallSetter {
    pub fn new(function: impl Into<String>) -> Self {
        Self {
            function: function.into(),
            getter: None,
            options: CallOptions::default(),
            decimals: None,
        }
    }

    pub fn getter(self, function: impl Into<String>) -> Self {
        self.getter_output(function, 0)
    }

    /// Reads the current value from output `output` of `function`.
    pub fn getter_output(mut self, function: impl Into<String>, output: usize) -> Self {
        self.getter = Some(Getter {
            function: function.into(),
            output,
        });
        self
    }

    pub fn proxy(mut self, contract: impl Into<String>) -> Self {
        self.options = CallOptions::proxy(contract);
        self
    }

    /// Numeric values are written and read as integer mantissas with `decimals` places.
    pub fn mantissa(mut self, decimals: u32) -> Self {
        self.decimals = Some(decimals);
        self
    }

    fn encode(&self, value: &Resolved) -> Result<Resolved, ActorError> {
        match (self.decimals, value) {
            (Some(decimals), Resolved::Number(n)) => {
                Ok(Resolved::Number(Number::from(n.mantissa(decimals)?)))
            }
            _ => Ok(value.clone()),
        }
    }

    fn decode(&self, value: Resolved) -> Resolved {
        match (self.decimals, value) {
            (Some(decimals), Resolved::Number(n)) => Resolved::Number(n.shifted(decimals)),
            (_, value) => value,
        }
    }
}

#[async_trait]
impl Setter for CallSetter {
    async fn current(
        &self,
        actor: &Actor<'_>,
        instance: &InstanceRef,
        entry: &Entry<'_>,
    ) -> Result<Option<Resolved>, ActorError> {
        let Some(getter) = &self.getter else {
            return Ok(None);
        };
        let outputs = actor
            .read(instance, &getter.function, entry.key_args(), &self.options)
            .await?;
        let value = outputs
            .into_iter()
            .nth(getter.output)
            .ok_or_else(|| ActorError::MissingOutput {
                function: getter.function.clone(),
                index: getter.output,
            })?;
        Ok(Some(self.decode(value)))
    }

    async fn apply(
        &self,
        actor: &Actor<'_>,
        instance: &InstanceRef,
        entry: &Entry<'_>,
    ) -> Result<(), ActorError> {
        let mut args = entry.key_args();
        if let Some(value) = entry.value() {
            args.push(self.encode(value)?);
        }
        actor
            .trx(instance, &self.function, args, &self.options)
            .await
            .map(drop)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("failed to reconcile {resource}.{property} at {entry}: {source}")]
pub struct ReconciliationError {
    pub resource: String,
    pub property: String,
    pub entry: String,
    #[source]
    pub source: ActorError,
}

/// Applies `work` to `instance`, stopping at the first failed transaction.
pub(crate) async fn reconcile(
    actor: &Actor<'_>,
    instance: &InstanceRef,
    work: &[(&Property, Resolved)],
) -> Result<(), ReconciliationError> {
    for (property, desired) in work {
        let Some(setter) = &property.setter else {
            warn!(@yellow, "{}.{} has no setter, skipping", instance.name, property.name);
            continue;
        };
        info!(@grey, "reconciling {}.{}", instance.name, property.name);
        for (index, entry) in Entry::split(desired).iter().enumerate() {
            settle(actor, instance, property, setter.as_ref(), entry)
                .await
                .map_err(|source| ReconciliationError {
                    resource: instance.name.clone(),
                    property: property.name.clone(),
                    entry: entry.describe(index),
                    source,
                })?;
        }
    }
    Ok(())
}

async fn settle(
    actor: &Actor<'_>,
    instance: &InstanceRef,
    property: &Property,
    setter: &dyn Setter,
    entry: &Entry<'_>,
) -> Result<(), ActorError> {
    match setter.current(actor, instance, entry).await {
        Ok(Some(current)) if current == *entry.desired() => {
            let what = match entry {
                Entry::Scalar(value) => actor.show(value),
                Entry::Pair { key, .. } => actor.show(key),
                Entry::Element(element) => actor.show(element),
            };
            info!(@grey, "{}.{} already set for {what}", instance.name, property.name);
            return Ok(());
        }
        Ok(_) => {}
        Err(err) => {
            warn!(@yellow, "could not read {}.{}, applying anyway: {err}", instance.name, property.name)
        }
    }
    setter.apply(actor, instance, entry).await
}

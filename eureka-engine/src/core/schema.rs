// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! Typed description of a resource's configurable properties, and coercion of raw values into it.

use std::{fmt, sync::Arc};

use alloy::primitives::Address;
use serde_json::{Map, Value as Json};

use super::{
    reconcile::Setter,
    value::{Number, Properties, Value},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyType {
    String,
    Number,
    Address,
    Bool,
    /// Reference to another resource, by name. The type name is informational.
    Ref(String),
    Dict {
        key: Box<PropertyType>,
        value: Box<PropertyType>,
    },
    Array(Box<PropertyType>),
}

impl PropertyType {
    pub fn reference(type_name: impl Into<String>) -> Self {
        PropertyType::Ref(type_name.into())
    }

    pub fn dict(key: PropertyType, value: PropertyType) -> Self {
        PropertyType::Dict {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    pub fn array(element: PropertyType) -> Self {
        PropertyType::Array(Box::new(element))
    }

    /// Coerces a raw JSON value. Object iteration order is preserved for dictionaries.
    pub fn coerce(&self, raw: &Json) -> Result<Value, String> {
        match (self, raw) {
            (PropertyType::String, Json::String(s)) => Ok(Value::String(s.clone())),
            (PropertyType::Number, Json::Number(n)) => number(&n.to_string()),
            (PropertyType::Number, Json::String(s)) => number(s),
            (PropertyType::Address, Json::String(s)) => address(s).map(Value::Address),
            (PropertyType::Bool, Json::Bool(b)) => Ok(Value::Bool(*b)),
            (PropertyType::Ref(_), Json::String(s)) => Ok(reference(s)),
            (PropertyType::Ref(_), Json::Object(object)) => match object.get("ref") {
                Some(Json::String(s)) => Ok(reference(s)),
                _ => Err(format!("expected a reference, got {raw}")),
            },
            (PropertyType::Dict { key, value }, Json::Object(object)) => object
                .iter()
                .map(|(k, v)| {
                    let k = key.coerce(&Json::String(k.clone()))?;
                    let v = value.coerce(v).map_err(|reason| format!("at {k:?}: {reason}"))?;
                    Ok((k, v))
                })
                .collect::<Result<_, String>>()
                .map(Value::Dict),
            (PropertyType::Array(element), Json::Array(items)) => items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    element
                        .coerce(item)
                        .map_err(|reason| format!("at index {i}: {reason}"))
                })
                .collect::<Result<_, String>>()
                .map(Value::Array),
            _ => Err(format!("expected {self}, got {raw}")),
        }
    }
}

fn number(text: &str) -> Result<Value, String> {
    text.parse::<Number>()
        .map(Value::Number)
        .map_err(|err| err.to_string())
}

fn address(text: &str) -> Result<Address, String> {
    text.trim()
        .parse::<Address>()
        .map_err(|err| format!("invalid address {text:?}: {err}"))
}

/// A literal address denotes a pre-existing contract rather than a manifest entry.
fn reference(text: &str) -> Value {
    match address(text) {
        Ok(address) => Value::Address(address),
        Err(_) => Value::Ref(text.to_owned()),
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyType::String => f.write_str("string"),
            PropertyType::Number => f.write_str("number"),
            PropertyType::Address => f.write_str("address"),
            PropertyType::Bool => f.write_str("bool"),
            PropertyType::Ref(type_name) => write!(f, "ref<{type_name}>"),
            PropertyType::Dict { key, value } => write!(f, "dictionary<{key}, {value}>"),
            PropertyType::Array(element) => write!(f, "array<{element}>"),
        }
    }
}

/// One entry of a [`Schema`].
#[derive(Clone)]
pub struct Property {
    pub name: String,
    pub ty: PropertyType,
    pub default: Option<Json>,
    pub optional: bool,
    /// Applied after construction instead of being a constructor input.
    pub deferred: bool,
    pub setter: Option<Arc<dyn Setter>>,
}

impl Property {
    pub fn new(name: impl Into<String>, ty: PropertyType) -> Self {
        Self {
            name: name.into(),
            ty,
            default: None,
            optional: false,
            deferred: false,
            setter: None,
        }
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, PropertyType::String)
    }

    pub fn number(name: impl Into<String>) -> Self {
        Self::new(name, PropertyType::Number)
    }

    pub fn address(name: impl Into<String>) -> Self {
        Self::new(name, PropertyType::Address)
    }

    pub fn reference(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::new(name, PropertyType::reference(type_name))
    }

    pub fn dict(name: impl Into<String>, key: PropertyType, value: PropertyType) -> Self {
        Self::new(name, PropertyType::dict(key, value))
    }

    pub fn array(name: impl Into<String>, element: PropertyType) -> Self {
        Self::new(name, PropertyType::array(element))
    }

    pub fn default(mut self, value: impl Into<Json>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn deferred(mut self) -> Self {
        self.deferred = true;
        self
    }

    pub fn setter(mut self, setter: impl Setter + 'static) -> Self {
        self.setter = Some(Arc::new(setter));
        self
    }
}

impl fmt::Debug for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("name", &self.name)
            .field("ty", &self.ty)
            .field("default", &self.default)
            .field("optional", &self.optional)
            .field("deferred", &self.deferred)
            .field("setter", &self.setter.is_some())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("missing required property {0}")]
    Missing(String),
    #[error("invalid value for {property}: {reason}")]
    Coercion { property: String, reason: String },
}

/// Ordered property declarations. Declaration order is the order deferred properties are applied.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    properties: Vec<Property>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn property(mut self, property: Property) -> Self {
        self.properties.push(property);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn properties(&self) -> impl Iterator<Item = &Property> {
        self.properties.iter()
    }

    /// Takes each property from `raw`, falling back to its default.
    pub fn coerce(&self, raw: &Map<String, Json>) -> Result<Properties<Value>, SchemaError> {
        let mut values = Properties::default();
        for property in &self.properties {
            let Some(raw_value) = raw.get(&property.name).or(property.default.as_ref()) else {
                if property.optional {
                    continue;
                }
                return Err(SchemaError::Missing(property.name.clone()));
            };
            let value = property
                .ty
                .coerce(raw_value)
                .map_err(|reason| SchemaError::Coercion {
                    property: property.name.clone(),
                    reason,
                })?;
            values.insert(property.name.clone(), value);
        }
        for key in raw.keys().filter(|key| self.get(key).is_none()) {
            warn!(@yellow, "ignoring undeclared property {key}");
        }
        Ok(values)
    }
}

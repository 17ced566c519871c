// Copyright 2025, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/stylus-sdk-rs/blob/main/licenses/COPYRIGHT.md

//! Property values, before and after reference resolution.

use std::{fmt, str::FromStr};

use alloy::primitives::{Address, U256};

use crate::ActorError;

/// Exact decimal quantity: `digits / 10^scale`.
///
/// Always kept normalized (no trailing zero digits after the decimal point), so derived equality
/// is numeric equality. Large on-chain quantities never pass through floating point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Number {
    digits: U256,
    scale: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NumberError {
    #[error("invalid number: {0:?}")]
    Invalid(String),
    #[error("number out of range: {0}")]
    Overflow(String),
    #[error("{value} has more than {decimals} decimal places")]
    Precision { value: String, decimals: u32 },
}

impl Number {
    pub const ZERO: Self = Self {
        digits: U256::ZERO,
        scale: 0,
    };

    /// Interprets `mantissa` as a fixed-point value with `decimals` decimal places.
    pub fn from_mantissa(mantissa: U256, decimals: u32) -> Self {
        Self {
            digits: mantissa,
            scale: decimals,
        }
        .normalized()
    }

    /// Scales to an integer mantissa with `decimals` decimal places.
    ///
    /// Fails rather than rounding when the value has more precision than `decimals` allows.
    pub fn mantissa(&self, decimals: u32) -> Result<U256, NumberError> {
        if self.scale > decimals {
            return Err(NumberError::Precision {
                value: self.to_string(),
                decimals,
            });
        }
        pow10(decimals - self.scale)
            .and_then(|factor| self.digits.checked_mul(factor))
            .ok_or_else(|| NumberError::Overflow(self.to_string()))
    }

    /// Reinterprets an integer read from chain as a mantissa with `decimals` places.
    pub fn shifted(&self, decimals: u32) -> Self {
        Self {
            digits: self.digits,
            scale: self.scale + decimals,
        }
        .normalized()
    }

    pub fn is_integer(&self) -> bool {
        self.scale == 0
    }

    fn normalized(mut self) -> Self {
        if self.digits.is_zero() {
            self.scale = 0;
            return self;
        }
        let ten = U256::from(10);
        while self.scale > 0 && (self.digits % ten).is_zero() {
            self.digits /= ten;
            self.scale -= 1;
        }
        self
    }
}

fn pow10(exp: u32) -> Option<U256> {
    U256::from(10).checked_pow(U256::from(exp))
}

impl FromStr for Number {
    type Err = NumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim().replace('_', "");
        let invalid = || NumberError::Invalid(s.to_owned());

        if let Some(hex) = text.strip_prefix("0x") {
            let digits = U256::from_str_radix(hex, 16).map_err(|_| invalid())?;
            return Ok(Self { digits, scale: 0 });
        }

        let (mantissa, exponent) = match text.split_once(['e', 'E']) {
            Some((mantissa, exponent)) => {
                (mantissa, exponent.parse::<i64>().map_err(|_| invalid())?)
            }
            None => (text.as_str(), 0),
        };
        let (int, frac) = mantissa.split_once('.').unwrap_or((mantissa, ""));
        if (int.is_empty() && frac.is_empty())
            || !int.chars().chain(frac.chars()).all(|c| c.is_ascii_digit())
        {
            return Err(invalid());
        }

        let digits = U256::from_str_radix(&format!("{int}{frac}"), 10).map_err(|_| invalid())?;
        let scale = i64::try_from(frac.len())
            .ok()
            .and_then(|len| len.checked_sub(exponent))
            .ok_or_else(invalid)?;
        let number = if scale >= 0 {
            Self {
                digits,
                scale: u32::try_from(scale).map_err(|_| invalid())?,
            }
        } else {
            let shift = scale.checked_neg().ok_or_else(invalid)?;
            let factor = u32::try_from(shift).ok().and_then(pow10);
            Self {
                digits: factor
                    .and_then(|factor| digits.checked_mul(factor))
                    .ok_or_else(|| NumberError::Overflow(s.to_owned()))?,
                scale: 0,
            }
        };
        Ok(number.normalized())
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.digits.to_string();
        if self.scale == 0 {
            return f.write_str(&digits);
        }
        let scale = self.scale as usize;
        let padded = format!("{digits:0>width$}", width = scale + 1);
        let (int, frac) = padded.split_at(padded.len() - scale);
        write!(f, "{int}.{frac}")
    }
}

impl From<U256> for Number {
    fn from(digits: U256) -> Self {
        Self { digits, scale: 0 }
    }
}

impl From<u64> for Number {
    fn from(value: u64) -> Self {
        U256::from(value).into()
    }
}

/// A coerced property value. References are still names at this stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    String(String),
    Number(Number),
    Address(Address),
    Bool(bool),
    /// Name of another resource in the manifest.
    Ref(String),
    /// Ordered entries; iteration order is reconciliation order.
    Dict(Vec<(Value, Value)>),
    Array(Vec<Value>),
}

impl Value {
    /// Collects every referenced resource name, including those nested in dictionaries and arrays.
    pub fn references<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Value::Ref(name) => out.push(name),
            Value::Dict(entries) => {
                for (key, value) in entries {
                    key.references(out);
                    value.references(out);
                }
            }
            Value::Array(items) => items.iter().for_each(|item| item.references(out)),
            _ => {}
        }
    }

    /// Replaces references by deployed addresses. Returns the first name `lookup` cannot resolve.
    pub fn resolve(&self, lookup: &dyn Fn(&str) -> Option<Address>) -> Result<Resolved, String> {
        Ok(match self {
            Value::String(s) => Resolved::String(s.clone()),
            Value::Number(n) => Resolved::Number(*n),
            Value::Address(address) => Resolved::Address(*address),
            Value::Bool(b) => Resolved::Bool(*b),
            Value::Ref(name) => Resolved::Address(lookup(name).ok_or_else(|| name.clone())?),
            Value::Dict(entries) => Resolved::Dict(
                entries
                    .iter()
                    .map(|(key, value)| Ok((key.resolve(lookup)?, value.resolve(lookup)?)))
                    .collect::<Result<_, String>>()?,
            ),
            Value::Array(items) => Resolved::Array(
                items
                    .iter()
                    .map(|item| item.resolve(lookup))
                    .collect::<Result<_, _>>()?,
            ),
        })
    }
}

/// A value with every reference replaced by an address, as passed to the chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    String(String),
    Number(Number),
    Address(Address),
    Bool(bool),
    Dict(Vec<(Resolved, Resolved)>),
    Array(Vec<Resolved>),
    /// Multiple return values or a struct read back from chain.
    Tuple(Vec<Resolved>),
}

impl Resolved {
    pub fn as_address(&self) -> Option<Address> {
        match self {
            Resolved::Address(address) => Some(*address),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<Number> {
        match self {
            Resolved::Number(n) => Some(*n),
            Resolved::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Resolved::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Resolved::String(s) => Some(s),
            _ => None,
        }
    }

    /// Appends an unambiguous byte encoding, used for fingerprints.
    pub fn write_canonical(&self, out: &mut Vec<u8>) {
        fn len(out: &mut Vec<u8>, n: usize) {
            out.extend_from_slice(&(n as u64).to_be_bytes());
        }
        match self {
            Resolved::String(s) => {
                out.push(0);
                len(out, s.len());
                out.extend_from_slice(s.as_bytes());
            }
            Resolved::Number(n) => {
                out.push(1);
                out.extend_from_slice(&n.digits.to_be_bytes::<32>());
                out.extend_from_slice(&n.scale.to_be_bytes());
            }
            Resolved::Address(address) => {
                out.push(2);
                out.extend_from_slice(address.as_slice());
            }
            Resolved::Bool(b) => out.extend_from_slice(&[3, *b as u8]),
            Resolved::Dict(entries) => {
                out.push(4);
                len(out, entries.len());
                for (key, value) in entries {
                    key.write_canonical(out);
                    value.write_canonical(out);
                }
            }
            Resolved::Array(items) | Resolved::Tuple(items) => {
                out.push(if matches!(self, Resolved::Array(_)) { 5 } else { 6 });
                len(out, items.len());
                items.iter().for_each(|item| item.write_canonical(out));
            }
        }
    }
}

impl fmt::Display for Resolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn list(f: &mut fmt::Formatter<'_>, items: &[Resolved]) -> fmt::Result {
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{item}")?;
            }
            Ok(())
        }
        match self {
            Resolved::String(s) => write!(f, "{s:?}"),
            Resolved::Number(n) => write!(f, "{n}"),
            Resolved::Address(address) => write!(f, "{address}"),
            Resolved::Bool(b) => write!(f, "{b}"),
            Resolved::Dict(entries) => {
                f.write_str("{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                f.write_str("}")
            }
            Resolved::Array(items) => {
                f.write_str("[")?;
                list(f, items)?;
                f.write_str("]")
            }
            Resolved::Tuple(items) => {
                f.write_str("(")?;
                list(f, items)?;
                f.write_str(")")
            }
        }
    }
}

impl From<Number> for Resolved {
    fn from(n: Number) -> Self {
        Resolved::Number(n)
    }
}

impl From<Address> for Resolved {
    fn from(address: Address) -> Self {
        Resolved::Address(address)
    }
}

/// Property values in schema declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Properties<V> {
    entries: Vec<(String, V)>,
}

impl<V> Default for Properties<V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<V> Properties<V> {
    pub fn get(&self, name: &str) -> Option<&V> {
        self.entries
            .iter()
            .find_map(|(key, value)| (key == name).then_some(value))
    }

    pub fn insert(&mut self, name: impl Into<String>, value: V) {
        let name = name.into();
        match self.entries.iter_mut().find(|(key, _)| *key == name) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Properties<Resolved> {
    pub fn require(&self, name: &str) -> Result<&Resolved, ActorError> {
        self.get(name).ok_or_else(|| ActorError::MissingProperty(name.to_owned()))
    }

    pub fn address(&self, name: &str) -> Result<Address, ActorError> {
        self.require(name)?
            .as_address()
            .ok_or_else(|| ActorError::PropertyType {
                name: name.to_owned(),
                expected: "address",
            })
    }

    pub fn number(&self, name: &str) -> Result<Number, ActorError> {
        self.require(name)?
            .as_number()
            .ok_or_else(|| ActorError::PropertyType {
                name: name.to_owned(),
                expected: "number",
            })
    }
}

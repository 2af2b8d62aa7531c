// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Attribute values attached to users for targeting.
//!
//! Custom attributes are open-ended, so their values are modelled as a tagged
//! sum type rather than an untyped map. Rule matching dispatches on the tag and
//! treats any shape it does not understand as "no match".

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A numeric attribute value.
///
/// Integers and floats are kept apart so that large integers never lose
/// precision, but they compare by canonical value: `Int(10000)` equals
/// `Float(10000.0)`, while `Int(1)` never equals `Float(1.5)`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Number {
	Int(i64),
	Float(f64),
}

impl Number {
	/// Returns the value as an `f64`. Large integers may round.
	pub fn as_f64(self) -> f64 {
		match self {
			Number::Int(i) => i as f64,
			Number::Float(f) => f,
		}
	}

	/// Returns the value as an `i64` when it is exactly representable.
	pub fn as_i64(self) -> Option<i64> {
		match self {
			Number::Int(i) => Some(i),
			Number::Float(f) => float_to_exact_int(f),
		}
	}
}

/// 2^63 as an `f64`; the first float past `i64::MAX`.
const I64_UPPER_BOUND: f64 = 9_223_372_036_854_775_808.0;

fn float_to_exact_int(f: f64) -> Option<i64> {
	if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f < I64_UPPER_BOUND {
		Some(f as i64)
	} else {
		None
	}
}

impl PartialEq for Number {
	fn eq(&self, other: &Self) -> bool {
		match (*self, *other) {
			(Number::Int(a), Number::Int(b)) => a == b,
			(Number::Float(a), Number::Float(b)) => a == b,
			(Number::Int(i), Number::Float(f)) | (Number::Float(f), Number::Int(i)) => {
				float_to_exact_int(f) == Some(i)
			}
		}
	}
}

impl fmt::Display for Number {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Number::Int(i) => write!(f, "{i}"),
			Number::Float(v) => write!(f, "{v}"),
		}
	}
}

/// A user attribute value.
///
/// Deserialises from untyped JSON: `null`, booleans, numbers, strings, arrays
/// and objects map onto the matching variant.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
	#[default]
	Null,
	Bool(bool),
	Number(Number),
	String(String),
	List(Vec<AttributeValue>),
	Map(BTreeMap<String, AttributeValue>),
}

impl AttributeValue {
	/// Returns true for booleans, numbers and strings.
	pub fn is_scalar(&self) -> bool {
		matches!(
			self,
			AttributeValue::Bool(_) | AttributeValue::Number(_) | AttributeValue::String(_)
		)
	}

	/// Value equality between two scalars of the same kind.
	///
	/// Numbers compare by canonical value. Values of different kinds, and any
	/// non-scalar value, are never equal.
	pub fn scalar_eq(&self, other: &AttributeValue) -> bool {
		match (self, other) {
			(AttributeValue::Bool(a), AttributeValue::Bool(b)) => a == b,
			(AttributeValue::Number(a), AttributeValue::Number(b)) => a == b,
			(AttributeValue::String(a), AttributeValue::String(b)) => a == b,
			_ => false,
		}
	}

	/// Short name of the variant, used in log fields.
	pub fn kind(&self) -> &'static str {
		match self {
			AttributeValue::Null => "null",
			AttributeValue::Bool(_) => "bool",
			AttributeValue::Number(_) => "number",
			AttributeValue::String(_) => "string",
			AttributeValue::List(_) => "list",
			AttributeValue::Map(_) => "map",
		}
	}

	pub fn as_str(&self) -> Option<&str> {
		match self {
			AttributeValue::String(s) => Some(s),
			_ => None,
		}
	}

	pub fn as_bool(&self) -> Option<bool> {
		match self {
			AttributeValue::Bool(b) => Some(*b),
			_ => None,
		}
	}
}

impl From<bool> for AttributeValue {
	fn from(value: bool) -> Self {
		AttributeValue::Bool(value)
	}
}

macro_rules! impl_from_int {
	($($ty:ty),*) => {
		$(
			impl From<$ty> for AttributeValue {
				fn from(value: $ty) -> Self {
					AttributeValue::Number(Number::Int(i64::from(value)))
				}
			}
		)*
	};
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<u64> for AttributeValue {
	fn from(value: u64) -> Self {
		match i64::try_from(value) {
			Ok(i) => AttributeValue::Number(Number::Int(i)),
			Err(_) => AttributeValue::Number(Number::Float(value as f64)),
		}
	}
}

impl From<usize> for AttributeValue {
	fn from(value: usize) -> Self {
		AttributeValue::from(value as u64)
	}
}

impl From<isize> for AttributeValue {
	fn from(value: isize) -> Self {
		AttributeValue::Number(Number::Int(value as i64))
	}
}

impl From<f32> for AttributeValue {
	fn from(value: f32) -> Self {
		AttributeValue::Number(Number::Float(f64::from(value)))
	}
}

impl From<f64> for AttributeValue {
	fn from(value: f64) -> Self {
		AttributeValue::Number(Number::Float(value))
	}
}

impl From<&str> for AttributeValue {
	fn from(value: &str) -> Self {
		AttributeValue::String(value.to_string())
	}
}

impl From<String> for AttributeValue {
	fn from(value: String) -> Self {
		AttributeValue::String(value)
	}
}

impl<T: Into<AttributeValue>> From<Vec<T>> for AttributeValue {
	fn from(values: Vec<T>) -> Self {
		AttributeValue::List(values.into_iter().map(Into::into).collect())
	}
}

impl<T: Into<AttributeValue>, const N: usize> From<[T; N]> for AttributeValue {
	fn from(values: [T; N]) -> Self {
		AttributeValue::List(values.into_iter().map(Into::into).collect())
	}
}

impl<T: Into<AttributeValue>> From<Option<T>> for AttributeValue {
	fn from(value: Option<T>) -> Self {
		value.map(Into::into).unwrap_or(AttributeValue::Null)
	}
}

impl From<serde_json::Value> for AttributeValue {
	fn from(value: serde_json::Value) -> Self {
		match value {
			serde_json::Value::Null => AttributeValue::Null,
			serde_json::Value::Bool(b) => AttributeValue::Bool(b),
			serde_json::Value::Number(n) => match (n.as_i64(), n.as_f64()) {
				(Some(i), _) => AttributeValue::Number(Number::Int(i)),
				(None, Some(f)) => AttributeValue::Number(Number::Float(f)),
				(None, None) => AttributeValue::Null,
			},
			serde_json::Value::String(s) => AttributeValue::String(s),
			serde_json::Value::Array(items) => {
				AttributeValue::List(items.into_iter().map(Into::into).collect())
			}
			serde_json::Value::Object(map) => {
				AttributeValue::Map(map.into_iter().map(|(k, v)| (k, v.into())).collect())
			}
		}
	}
}

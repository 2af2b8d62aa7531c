// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{FlagsCoreError, Result};
use crate::TargetRule;

/// The value a flag serves.
///
/// Serialised untagged, so `true`, `42`, `"blue"` and `{"a": 1}` on the wire
/// map to `Boolean`, `Number`, `String` and `Json` respectively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VariationValue {
	Boolean(bool),
	Number(f64),
	String(String),
	Json(serde_json::Value),
}

impl VariationValue {
	pub fn as_bool(&self) -> Option<bool> {
		match self {
			VariationValue::Boolean(b) => Some(*b),
			_ => None,
		}
	}

	pub fn as_f64(&self) -> Option<f64> {
		match self {
			VariationValue::Number(n) => Some(*n),
			_ => None,
		}
	}

	pub fn as_str(&self) -> Option<&str> {
		match self {
			VariationValue::String(s) => Some(s),
			_ => None,
		}
	}

	/// Returns the value as JSON. Every variation has a JSON form.
	pub fn to_json(&self) -> serde_json::Value {
		match self {
			VariationValue::Boolean(b) => serde_json::Value::Bool(*b),
			VariationValue::Number(n) => serde_json::Number::from_f64(*n)
				.map(serde_json::Value::Number)
				.unwrap_or(serde_json::Value::Null),
			VariationValue::String(s) => serde_json::Value::String(s.clone()),
			VariationValue::Json(v) => v.clone(),
		}
	}

	/// Name of the variant, used in type mismatch reports.
	pub fn type_name(&self) -> &'static str {
		match self {
			VariationValue::Boolean(_) => "boolean",
			VariationValue::Number(_) => "number",
			VariationValue::String(_) => "string",
			VariationValue::Json(_) => "json",
		}
	}
}

impl fmt::Display for VariationValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			VariationValue::Boolean(b) => write!(f, "{b}"),
			VariationValue::Number(n) => write!(f, "{n}"),
			VariationValue::String(s) => f.write_str(s),
			VariationValue::Json(v) => write!(f, "{v}"),
		}
	}
}

impl From<bool> for VariationValue {
	fn from(value: bool) -> Self {
		VariationValue::Boolean(value)
	}
}

impl From<f64> for VariationValue {
	fn from(value: f64) -> Self {
		VariationValue::Number(value)
	}
}

impl From<&str> for VariationValue {
	fn from(value: &str) -> Self {
		VariationValue::String(value.to_string())
	}
}

impl From<String> for VariationValue {
	fn from(value: String) -> Self {
		VariationValue::String(value)
	}
}

impl From<serde_json::Value> for VariationValue {
	fn from(value: serde_json::Value) -> Self {
		VariationValue::Json(value)
	}
}

/// A targeting rule paired with the value served when it matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlagRule {
	#[serde(flatten)]
	pub target: TargetRule,
	pub value: VariationValue,
}

/// One slice of a percentage rollout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedVariation {
	/// Share of users, 0-100.
	pub weight: u32,
	pub value: VariationValue,
}

/// A flag definition as supplied by the flag store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureFlag {
	pub key: String,
	#[serde(default)]
	pub name: String,
	/// Off flags always serve `default_value`.
	pub on: bool,
	#[serde(default)]
	pub salt: String,
	/// Evaluated in order; the first match wins.
	#[serde(default)]
	pub rules: Vec<FlagRule>,
	#[serde(default)]
	pub rollout: Vec<WeightedVariation>,
	pub default_value: VariationValue,
}

impl FeatureFlag {
	/// Creates an enabled flag with no rules.
	pub fn new(key: impl Into<String>, default_value: impl Into<VariationValue>) -> Self {
		let key = key.into();
		Self {
			name: key.clone(),
			salt: key.clone(),
			key,
			on: true,
			rules: Vec::new(),
			rollout: Vec::new(),
			default_value: default_value.into(),
		}
	}

	pub fn with_name(mut self, name: impl Into<String>) -> Self {
		self.name = name.into();
		self
	}

	pub fn with_salt(mut self, salt: impl Into<String>) -> Self {
		self.salt = salt.into();
		self
	}

	pub fn with_on(mut self, on: bool) -> Self {
		self.on = on;
		self
	}

	/// Appends a rule; rules are evaluated in insertion order.
	pub fn with_rule(mut self, target: TargetRule, value: impl Into<VariationValue>) -> Self {
		self.rules.push(FlagRule {
			target,
			value: value.into(),
		});
		self
	}

	pub fn with_rollout(mut self, weight: u32, value: impl Into<VariationValue>) -> Self {
		self.rollout.push(WeightedVariation {
			weight,
			value: value.into(),
		});
		self
	}

	/// Validates the flag key format.
	///
	/// - 3-100 characters
	/// - Starts with a lowercase letter
	/// - Lowercase alphanumerics, `_`, `-` and `.` after that
	pub fn validate_key(key: &str) -> bool {
		if key.len() < 3 || key.len() > 100 {
			return false;
		}

		let mut chars = key.chars();

		match chars.next() {
			Some(c) if c.is_ascii_lowercase() => {}
			_ => return false,
		}

		chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '_' | '-' | '.'))
	}

	/// Checks the key format and that rollout weights sum to at most 100.
	pub fn validate(&self) -> Result<()> {
		if !Self::validate_key(&self.key) {
			return Err(FlagsCoreError::InvalidFlagKey(self.key.clone()));
		}

		let total: u64 = self.rollout.iter().map(|v| u64::from(v.weight)).sum();
		if total > 100 {
			return Err(FlagsCoreError::InvalidWeights {
				key: self.key.clone(),
				total,
			});
		}

		Ok(())
	}

	/// Parses and validates a flag from its JSON wire form.
	pub fn from_json(json: &str) -> Result<Self> {
		let flag: FeatureFlag = serde_json::from_str(json)?;
		flag.validate()?;
		Ok(flag)
	}
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Targeting rules and the rule evaluator.
//!
//! A [`TargetRule`] names a user attribute, an [`Operator`] and a set of
//! candidate values. Matching never fails: a missing attribute, an empty value
//! set, an unknown operator or an attribute shape the operator cannot handle
//! all resolve to "no match".

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{AttributeValue, User};

/// Comparison applied between a user attribute and a rule's values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operator {
	/// Set membership: the attribute (or any element of it) is one of the values.
	In,
	/// Any operator this client does not understand. Never matches.
	#[serde(other)]
	Unknown,
}

/// Compares one scalar attribute value against a rule's candidate values.
type Matcher = fn(&AttributeValue, &[AttributeValue]) -> bool;

impl Operator {
	pub fn as_str(&self) -> &'static str {
		match self {
			Operator::In => "in",
			Operator::Unknown => "unknown",
		}
	}

	fn matcher(self) -> Option<Matcher> {
		match self {
			Operator::In => Some(match_in),
			Operator::Unknown => None,
		}
	}
}

impl fmt::Display for Operator {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

fn match_in(candidate: &AttributeValue, values: &[AttributeValue]) -> bool {
	values.iter().any(|value| candidate.scalar_eq(value))
}

/// A single targeting condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetRule {
	pub attribute: String,
	pub op: Operator,
	#[serde(default)]
	pub values: Vec<AttributeValue>,
}

impl TargetRule {
	pub fn new(attribute: impl Into<String>, op: Operator, values: Vec<AttributeValue>) -> Self {
		Self {
			attribute: attribute.into(),
			op,
			values,
		}
	}

	/// Builds an `in` rule from anything convertible to attribute values.
	pub fn is_in<I, V>(attribute: impl Into<String>, values: I) -> Self
	where
		I: IntoIterator<Item = V>,
		V: Into<AttributeValue>,
	{
		Self::new(
			attribute,
			Operator::In,
			values.into_iter().map(Into::into).collect(),
		)
	}

	/// Returns true if the user satisfies this rule.
	pub fn matches(&self, user: &User) -> bool {
		if self.values.is_empty() {
			return false;
		}

		let Some(matcher) = self.op.matcher() else {
			trace!(attribute = %self.attribute, op = %self.op, "unsupported operator");
			return false;
		};

		let Some(actual) = user.attribute(&self.attribute) else {
			trace!(attribute = %self.attribute, "attribute not present on user");
			return false;
		};

		let matched = match actual.as_ref() {
			scalar @ (AttributeValue::Bool(_) | AttributeValue::Number(_) | AttributeValue::String(_)) => {
				matcher(scalar, &self.values)
			}
			AttributeValue::List(items) => items
				.iter()
				.filter(|item| item.is_scalar())
				.any(|item| matcher(item, &self.values)),
			AttributeValue::Null | AttributeValue::Map(_) => false,
		};

		trace!(
			attribute = %self.attribute,
			op = %self.op,
			kind = actual.kind(),
			matched,
			"evaluated target rule"
		);

		matched
	}
}

/// Evaluates `rule` against `user`.
pub fn evaluate(rule: &TargetRule, user: &User) -> bool {
	rule.matches(user)
}

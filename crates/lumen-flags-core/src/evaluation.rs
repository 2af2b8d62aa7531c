// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::fmt;
use std::io::Cursor;

use murmur3::murmur3_32;
use serde::{Deserialize, Serialize};

use crate::{FeatureFlag, User, VariationValue};

/// Why a particular value was served.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EvaluationReason {
	/// The flag is switched off.
	Off,
	/// A targeting rule matched.
	#[serde(rename_all = "camelCase")]
	RuleMatch { rule_index: usize },
	/// The user was bucketed into a rollout slice.
	#[serde(rename_all = "camelCase")]
	Rollout { variation_index: usize },
	/// Nothing matched; the flag default was served.
	Fallthrough,
	/// The client is offline; the caller default was served.
	Offline,
	/// The flag store has no such flag; the caller default was served.
	FlagNotFound,
	/// Resolution failed; the caller default was served.
	Error,
}

impl fmt::Display for EvaluationReason {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			EvaluationReason::Off => f.write_str("Off"),
			EvaluationReason::RuleMatch { rule_index } => write!(f, "RuleMatch({rule_index})"),
			EvaluationReason::Rollout { variation_index } => write!(f, "Rollout({variation_index})"),
			EvaluationReason::Fallthrough => f.write_str("Fallthrough"),
			EvaluationReason::Offline => f.write_str("Offline"),
			EvaluationReason::FlagNotFound => f.write_str("FlagNotFound"),
			EvaluationReason::Error => f.write_str("Error"),
		}
	}
}

/// The value served for a flag and the reason it was chosen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationDetail {
	pub value: VariationValue,
	pub reason: EvaluationReason,
}

impl EvaluationDetail {
	pub fn new(value: VariationValue, reason: EvaluationReason) -> Self {
		Self { value, reason }
	}
}

/// Evaluates a flag for a user.
///
/// The evaluation order is:
/// 1. Off flags serve the flag default
/// 2. Rules in declared order; the first match serves its value
/// 3. Percentage rollout, for users with a key
/// 4. The flag default
pub fn evaluate_flag(flag: &FeatureFlag, user: &User) -> EvaluationDetail {
	if !flag.on {
		return EvaluationDetail::new(flag.default_value.clone(), EvaluationReason::Off);
	}

	for (rule_index, rule) in flag.rules.iter().enumerate() {
		if rule.target.matches(user) {
			return EvaluationDetail::new(
				rule.value.clone(),
				EvaluationReason::RuleMatch { rule_index },
			);
		}
	}

	if let Some(variation_index) = select_rollout(flag, user) {
		return EvaluationDetail::new(
			flag.rollout[variation_index].value.clone(),
			EvaluationReason::Rollout { variation_index },
		);
	}

	EvaluationDetail::new(flag.default_value.clone(), EvaluationReason::Fallthrough)
}

/// Picks the rollout slice a user falls into, if any.
///
/// Weights are cumulative percentages; a bucket past the total falls through.
fn select_rollout(flag: &FeatureFlag, user: &User) -> Option<usize> {
	if flag.rollout.is_empty() {
		return None;
	}

	let user_key = user.key.as_deref()?;
	let bucket = bucket_user(&flag.key, &flag.salt, user_key, user.secondary.as_deref());

	let mut cumulative = 0u32;
	for (index, variation) in flag.rollout.iter().enumerate() {
		cumulative = cumulative.saturating_add(variation.weight);
		if bucket < cumulative {
			return Some(index);
		}
	}

	None
}

/// Consistent hash of a user into one of 100 buckets.
fn bucket_user(flag_key: &str, salt: &str, user_key: &str, secondary: Option<&str>) -> u32 {
	let input = match secondary {
		Some(secondary) => format!("{flag_key}.{salt}.{user_key}.{secondary}"),
		None => format!("{flag_key}.{salt}.{user_key}"),
	};
	let hash = murmur3_32(&mut Cursor::new(input.as_bytes()), 0).unwrap_or(0);
	hash % 100
}

// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core types and evaluation engine for Lumen feature flags.
//!
//! This crate holds the pure, synchronous part of the flags system: the user
//! model, targeting rules, flag definitions, and the evaluator that decides
//! which value a user is served. It performs no I/O and is used by the client
//! SDK (`lumen-flags`).
//!
//! # Overview
//!
//! - Users carry an identity key, built-in profile fields and custom attributes
//! - Custom attribute values are a tagged sum type ([`AttributeValue`])
//! - Targeting rules test one attribute against a value set
//! - Flags serve the value of the first matching rule, then a percentage
//!   rollout, then their default
//!
//! # Example
//!
//! ```
//! use lumen_flags_core::{evaluate_flag, FeatureFlag, TargetRule, User, VariationValue};
//!
//! let flag = FeatureFlag::new("checkout.new_flow", false)
//!     .with_rule(TargetRule::is_in("groups", ["beta"]), true);
//!
//! let user = User::new("user123").with_custom("groups", vec!["beta", "staff"]);
//!
//! let detail = evaluate_flag(&flag, &user);
//! assert_eq!(detail.value, VariationValue::Boolean(true));
//! ```

pub mod attribute;
pub mod error;
pub mod evaluation;
pub mod flag;
pub mod rule;
pub mod user;

pub use attribute::{AttributeValue, Number};
pub use error::{FlagsCoreError, Result};
pub use evaluation::{evaluate_flag, EvaluationDetail, EvaluationReason};
pub use flag::{FeatureFlag, FlagRule, VariationValue, WeightedVariation};
pub use rule::{evaluate, Operator, TargetRule};
pub use user::{User, BUILTIN_ATTRIBUTES};

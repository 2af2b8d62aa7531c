// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for flag definitions.

use thiserror::Error;

/// Errors raised while loading or validating flag definitions.
///
/// Rule evaluation itself never fails; these only cover malformed input.
#[derive(Debug, Error)]
pub enum FlagsCoreError {
	#[error("invalid flag key: {0:?}")]
	InvalidFlagKey(String),

	#[error("rollout weights for flag {key} sum to {total}, expected at most 100")]
	InvalidWeights { key: String, total: u64 },

	#[error("serialization error: {0}")]
	Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FlagsCoreError>;

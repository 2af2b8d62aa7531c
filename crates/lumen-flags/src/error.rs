// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the flags SDK.

use lumen_flags_core::{EvaluationReason, FlagsCoreError};
use thiserror::Error;

/// Flags SDK errors.
///
/// These cover client construction and flag store failures. Flag resolution
/// never returns them directly; see [`ResolutionError`].
#[derive(Debug, Error)]
pub enum FlagsError {
	/// SDK key is missing or malformed.
	#[error("invalid SDK key: must be non-empty and contain no whitespace")]
	InvalidSdkKey,

	/// Base URL is missing or cannot carry a path.
	#[error("invalid base URL")]
	InvalidBaseUrl,

	/// Configuration could not be loaded.
	#[error("configuration error: {0}")]
	Config(String),

	/// HTTP request failed.
	#[error("HTTP request failed: {0}")]
	RequestFailed(#[from] reqwest::Error),

	/// Server returned an error response.
	#[error("server error ({status}): {message}")]
	ServerError { status: u16, message: String },

	/// Response body could not be parsed.
	#[error("failed to parse response: {0}")]
	ParseFailed(String),

	/// Flag definition failed validation.
	#[error("invalid flag definition: {0}")]
	InvalidFlag(#[from] FlagsCoreError),
}

/// Result type alias for SDK operations.
pub type Result<T> = std::result::Result<T, FlagsError>;

/// Why a resolution fell back to the caller's default.
///
/// Always reported alongside a usable value, never instead of one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
	#[error("client is offline")]
	Offline,

	#[error("flag not found: {key}")]
	FlagNotFound { key: String },

	#[error("flag {key} does not serve a {expected} value (got {actual})")]
	WrongType {
		key: String,
		expected: &'static str,
		actual: &'static str,
	},

	#[error("flag store unavailable: {0}")]
	Store(String),
}

impl ResolutionError {
	/// The evaluation reason reported with this error.
	pub fn reason(&self) -> EvaluationReason {
		match self {
			ResolutionError::Offline => EvaluationReason::Offline,
			ResolutionError::FlagNotFound { .. } => EvaluationReason::FlagNotFound,
			ResolutionError::WrongType { .. } | ResolutionError::Store(_) => EvaluationReason::Error,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_resolution_error_reasons() {
		assert_eq!(ResolutionError::Offline.reason(), EvaluationReason::Offline);
		assert_eq!(
			ResolutionError::FlagNotFound {
				key: "a.b".to_string()
			}
			.reason(),
			EvaluationReason::FlagNotFound
		);
		assert_eq!(
			ResolutionError::Store("timeout".to_string()).reason(),
			EvaluationReason::Error
		);
	}

	#[test]
	fn test_resolution_error_messages() {
		assert_eq!(ResolutionError::Offline.to_string(), "client is offline");
		let err = ResolutionError::WrongType {
			key: "theme".to_string(),
			expected: "boolean",
			actual: "string",
		};
		assert_eq!(
			err.to_string(),
			"flag theme does not serve a boolean value (got string)"
		);
	}

	#[test]
	fn test_server_error_message() {
		let err = FlagsError::ServerError {
			status: 503,
			message: "unavailable".to_string(),
		};
		assert_eq!(err.to_string(), "server error (503): unavailable");
	}
}

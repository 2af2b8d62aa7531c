// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::fmt;
use std::time::Duration;

use url::Url;
use zeroize::Zeroizing;

use crate::error::{FlagsError, Result};

/// Default timeout for flag store requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(1500);

/// SDK key used to authenticate against the flag service.
///
/// The key is wiped from memory on drop and never printed by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct SdkKey(Zeroizing<String>);

impl SdkKey {
	pub fn new(key: impl Into<String>) -> Result<Self> {
		let key = key.into();
		if key.is_empty() || key.chars().any(char::is_whitespace) {
			return Err(FlagsError::InvalidSdkKey);
		}
		Ok(Self(Zeroizing::new(key)))
	}

	/// Returns the raw key for use in request headers.
	pub fn expose(&self) -> &str {
		&self.0
	}
}

impl fmt::Debug for SdkKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("SdkKey([REDACTED])")
	}
}

/// Settings for a [`FlagsClient`](crate::FlagsClient).
#[derive(Debug, Clone)]
pub struct ClientConfig {
	/// Flag service base URL. Required for the HTTP flag store.
	pub base_url: Option<Url>,
	/// Required for the HTTP flag store.
	pub sdk_key: Option<SdkKey>,
	/// Timeout for flag store requests.
	pub timeout: Duration,
	/// Start in offline mode.
	pub offline: bool,
	/// Overrides the standard User-Agent.
	pub user_agent: Option<String>,
}

impl Default for ClientConfig {
	fn default() -> Self {
		Self {
			base_url: None,
			sdk_key: None,
			timeout: DEFAULT_TIMEOUT,
			offline: false,
			user_agent: None,
		}
	}
}

impl ClientConfig {
	/// Loads configuration from `LUMEN_FLAGS_*` environment variables.
	///
	/// - `LUMEN_FLAGS_BASE_URL`
	/// - `LUMEN_FLAGS_SDK_KEY`
	/// - `LUMEN_FLAGS_TIMEOUT_MS` (default 1500)
	/// - `LUMEN_FLAGS_OFFLINE` (`1`/`true` enables offline mode)
	/// - `LUMEN_FLAGS_USER_AGENT`
	pub fn from_env() -> Result<Self> {
		Self::from_lookup(|name| std::env::var(name).ok())
	}

	fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
		let base_url = lookup("LUMEN_FLAGS_BASE_URL")
			.map(|raw| {
				raw.parse::<Url>()
					.map_err(|e| FlagsError::Config(format!("invalid LUMEN_FLAGS_BASE_URL: {e}")))
			})
			.transpose()?;

		let sdk_key = lookup("LUMEN_FLAGS_SDK_KEY").map(SdkKey::new).transpose()?;

		let timeout = match lookup("LUMEN_FLAGS_TIMEOUT_MS") {
			Some(raw) => Duration::from_millis(raw.parse().map_err(|e| {
				FlagsError::Config(format!("invalid LUMEN_FLAGS_TIMEOUT_MS: {e}"))
			})?),
			None => DEFAULT_TIMEOUT,
		};

		let offline = lookup("LUMEN_FLAGS_OFFLINE")
			.map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
			.unwrap_or(false);

		let user_agent = lookup("LUMEN_FLAGS_USER_AGENT");

		Ok(Self {
			base_url,
			sdk_key,
			timeout,
			offline,
			user_agent,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::HashMap;

	fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
		let vars: HashMap<String, String> = vars
			.iter()
			.map(|(k, v)| (k.to_string(), v.to_string()))
			.collect();
		move |name| vars.get(name).cloned()
	}

	#[test]
	fn test_config_defaults() {
		let config = ClientConfig::default();
		assert_eq!(config.timeout, Duration::from_millis(1500));
		assert!(!config.offline);
		assert!(config.base_url.is_none());
		assert!(config.sdk_key.is_none());
	}

	#[test]
	fn test_config_from_lookup() {
		let config = ClientConfig::from_lookup(lookup_from(&[
			("LUMEN_FLAGS_BASE_URL", "https://flags.example.com"),
			("LUMEN_FLAGS_SDK_KEY", "sdk-123"),
			("LUMEN_FLAGS_TIMEOUT_MS", "250"),
			("LUMEN_FLAGS_OFFLINE", "TRUE"),
		]))
		.unwrap();

		assert_eq!(
			config.base_url.unwrap().as_str(),
			"https://flags.example.com/"
		);
		assert_eq!(config.sdk_key.unwrap().expose(), "sdk-123");
		assert_eq!(config.timeout, Duration::from_millis(250));
		assert!(config.offline);
	}

	#[test]
	fn test_config_from_empty_lookup_uses_defaults() {
		let config = ClientConfig::from_lookup(lookup_from(&[])).unwrap();
		assert_eq!(config.timeout, DEFAULT_TIMEOUT);
		assert!(!config.offline);
	}

	#[test]
	fn test_config_rejects_bad_timeout() {
		let result = ClientConfig::from_lookup(lookup_from(&[("LUMEN_FLAGS_TIMEOUT_MS", "soon")]));
		assert!(matches!(result, Err(FlagsError::Config(_))));
	}

	#[test]
	fn test_config_rejects_bad_url() {
		let result = ClientConfig::from_lookup(lookup_from(&[("LUMEN_FLAGS_BASE_URL", "not a url")]));
		assert!(matches!(result, Err(FlagsError::Config(_))));
	}

	#[test]
	fn test_sdk_key_validation() {
		assert!(SdkKey::new("abc").is_ok());
		assert!(matches!(SdkKey::new(""), Err(FlagsError::InvalidSdkKey)));
		assert!(matches!(SdkKey::new("a b"), Err(FlagsError::InvalidSdkKey)));
	}

	#[test]
	fn test_sdk_key_debug_is_redacted() {
		let key = SdkKey::new("super-secret").unwrap();
		let debug = format!("{key:?}");
		assert!(!debug.contains("super-secret"));
		assert!(debug.contains("REDACTED"));
	}
}

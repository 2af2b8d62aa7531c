// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! HTTP client builders with a consistent User-Agent header.

use reqwest::{Client, ClientBuilder};

const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Creates a new HTTP client builder with the standard Lumen User-Agent header.
///
/// # Example
/// ```ignore
/// let client = lumen_common_http::builder()
///     .timeout(Duration::from_millis(1500))
///     .build()?;
/// ```
pub fn builder() -> ClientBuilder {
	Client::builder().user_agent(user_agent())
}

/// Creates a new HTTP client builder with a custom User-Agent header.
///
/// Use this when an application wants its own name on SDK requests.
pub fn builder_with_user_agent(user_agent: impl Into<String>) -> ClientBuilder {
	Client::builder().user_agent(user_agent.into())
}

/// Returns the standard Lumen User-Agent string.
///
/// Format: `lumen/{version}/{os}-{arch}`
/// Example: `lumen/0.1.0/linux-x86_64`
pub fn user_agent() -> String {
	format!(
		"lumen/{}/{}-{}",
		SDK_VERSION,
		std::env::consts::OS,
		std::env::consts::ARCH
	)
}

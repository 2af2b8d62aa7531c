// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HTTP-backed flag store.
//!
//! Fetches flag definitions from the flag service on every request. Caching,
//! polling and retries are left to callers that wrap this store.

use std::sync::Arc;

use async_trait::async_trait;
use lumen_flags_core::FeatureFlag;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use crate::config::{ClientConfig, SdkKey};
use crate::error::{FlagsError, Result};
use crate::store::FlagStore;

const FEATURES_PATH: [&str; 3] = ["api", "eval", "features"];

/// Flag store that reads from `{base_url}/api/eval/features`.
#[derive(Debug, Clone)]
pub struct HttpFlagStore {
	client: Client,
	base_url: Url,
	sdk_key: SdkKey,
}

impl HttpFlagStore {
	/// Creates a store from client configuration.
	///
	/// Requires both `base_url` and `sdk_key`.
	pub fn new(config: &ClientConfig) -> Result<Self> {
		let base_url = config.base_url.clone().ok_or(FlagsError::InvalidBaseUrl)?;
		if base_url.cannot_be_a_base() {
			return Err(FlagsError::InvalidBaseUrl);
		}
		let sdk_key = config.sdk_key.clone().ok_or(FlagsError::InvalidSdkKey)?;

		let builder = match &config.user_agent {
			Some(user_agent) => lumen_common_http::builder_with_user_agent(user_agent),
			None => lumen_common_http::builder(),
		};
		let client = builder
			.timeout(config.timeout)
			.build()
			.map_err(FlagsError::RequestFailed)?;

		Ok(Self {
			client,
			base_url,
			sdk_key,
		})
	}

	fn features_url(&self, key: Option<&str>) -> Result<Url> {
		let mut url = self.base_url.clone();
		{
			let mut segments = url
				.path_segments_mut()
				.map_err(|_| FlagsError::InvalidBaseUrl)?;
			segments.pop_if_empty().extend(FEATURES_PATH);
			if let Some(key) = key {
				segments.push(key);
			}
		}
		Ok(url)
	}

	async fn get(&self, url: Url) -> Result<Option<String>> {
		let response = self
			.client
			.get(url)
			.header("Authorization", format!("api_key {}", self.sdk_key.expose()))
			.header("Accept", "application/json")
			.send()
			.await?;

		let status = response.status();
		if status == StatusCode::NOT_FOUND {
			return Ok(None);
		}
		if !status.is_success() {
			return Err(FlagsError::ServerError {
				status: status.as_u16(),
				message: response.text().await.unwrap_or_default(),
			});
		}

		Ok(Some(response.text().await?))
	}
}

fn parse_body<T: DeserializeOwned>(body: &str) -> Result<T> {
	serde_json::from_str(body).map_err(|e| FlagsError::ParseFailed(e.to_string()))
}

#[async_trait]
impl FlagStore for HttpFlagStore {
	#[instrument(skip(self), fields(flag_key = %key))]
	async fn fetch_flag(&self, key: &str) -> Result<Option<Arc<FeatureFlag>>> {
		let url = self.features_url(Some(key))?;
		let Some(body) = self.get(url).await? else {
			debug!("Flag not found on server");
			return Ok(None);
		};

		let flag: FeatureFlag = parse_body(&body)?;
		if flag.key != key {
			return Err(FlagsError::ParseFailed(format!(
				"requested flag {key} but received {}",
				flag.key
			)));
		}
		flag.validate()?;
		debug!("Fetched flag definition");
		Ok(Some(Arc::new(flag)))
	}

	#[instrument(skip(self))]
	async fn all_flags(&self) -> Result<Vec<Arc<FeatureFlag>>> {
		let url = self.features_url(None)?;
		let Some(body) = self.get(url).await? else {
			return Ok(Vec::new());
		};

		let flags: Vec<FeatureFlag> = parse_body(&body)?;
		for flag in &flags {
			flag.validate()?;
		}
		debug!(flags = flags.len(), "Fetched all flag definitions");
		Ok(flags.into_iter().map(Arc::new).collect())
	}
}

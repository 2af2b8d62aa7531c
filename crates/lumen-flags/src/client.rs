// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Flag resolution client.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use lumen_flags_core::{evaluate_flag, EvaluationDetail, EvaluationReason, User, VariationValue};
use tracing::{debug, info, warn};
use url::Url;

use crate::analytics::{
	AnalyticsEvent, AnalyticsHook, CustomEvent, FeatureRequestEvent, IdentifyEvent,
	NoOpAnalyticsHook, SharedAnalyticsHook,
};
use crate::config::{ClientConfig, SdkKey};
use crate::error::{FlagsError, ResolutionError, Result};
use crate::http::HttpFlagStore;
use crate::store::{FlagStore, SharedFlagStore};

/// The outcome of resolving a flag.
///
/// `value` is always usable: when `error` is set it holds the caller's default.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution<T> {
	pub value: T,
	pub reason: EvaluationReason,
	pub error: Option<ResolutionError>,
}

impl<T> Resolution<T> {
	fn served(value: T, reason: EvaluationReason) -> Self {
		Self {
			value,
			reason,
			error: None,
		}
	}

	fn fallback(default: T, error: ResolutionError) -> Self {
		Self {
			value: default,
			reason: error.reason(),
			error: Some(error),
		}
	}

	/// Returns true if the value came from the flag rather than a fallback.
	pub fn is_ok(&self) -> bool {
		self.error.is_none()
	}

	pub fn into_value(self) -> T {
		self.value
	}
}

/// Builder for constructing a [`FlagsClient`].
pub struct FlagsClientBuilder {
	config: ClientConfig,
	sdk_key: Option<String>,
	base_url: Option<String>,
	store: Option<SharedFlagStore>,
	analytics: SharedAnalyticsHook,
}

impl FlagsClientBuilder {
	/// Creates a new builder with default settings.
	pub fn new() -> Self {
		Self::from_config(ClientConfig::default())
	}

	/// Creates a builder seeded from existing configuration.
	pub fn from_config(config: ClientConfig) -> Self {
		Self {
			config,
			sdk_key: None,
			base_url: None,
			store: None,
			analytics: Arc::new(NoOpAnalyticsHook),
		}
	}

	/// Sets the SDK key used by the HTTP flag store.
	pub fn sdk_key(mut self, key: impl Into<String>) -> Self {
		self.sdk_key = Some(key.into());
		self
	}

	/// Sets the flag service base URL.
	///
	/// Example: `https://flags.example.com`
	pub fn base_url(mut self, url: impl Into<String>) -> Self {
		self.base_url = Some(url.into());
		self
	}

	/// Sets the flag store request timeout.
	pub fn timeout(mut self, timeout: Duration) -> Self {
		self.config.timeout = timeout;
		self
	}

	/// Starts the client offline.
	pub fn offline(mut self, offline: bool) -> Self {
		self.config.offline = offline;
		self
	}

	/// Overrides the User-Agent sent by the HTTP flag store.
	pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
		self.config.user_agent = Some(user_agent.into());
		self
	}

	/// Uses a custom flag store instead of the HTTP store.
	pub fn store(mut self, store: impl FlagStore) -> Self {
		self.store = Some(Arc::new(store));
		self
	}

	/// Uses an already shared flag store.
	pub fn shared_store(mut self, store: SharedFlagStore) -> Self {
		self.store = Some(store);
		self
	}

	/// Sets the hook that receives analytics events.
	pub fn analytics_hook(mut self, hook: impl AnalyticsHook) -> Self {
		self.analytics = Arc::new(hook);
		self
	}

	/// Builds the client.
	///
	/// Without an explicit store, an [`HttpFlagStore`] is built from the
	/// configuration, which then requires a base URL and SDK key.
	pub fn build(mut self) -> Result<FlagsClient> {
		if let Some(key) = self.sdk_key.take() {
			self.config.sdk_key = Some(SdkKey::new(key)?);
		}
		if let Some(raw) = self.base_url.take() {
			let url: Url = raw.parse().map_err(|_| FlagsError::InvalidBaseUrl)?;
			self.config.base_url = Some(url);
		}

		let store: SharedFlagStore = match self.store {
			Some(store) => store,
			None => Arc::new(HttpFlagStore::new(&self.config)?),
		};

		if self.config.offline {
			info!("Flags client starting in offline mode");
		}

		Ok(FlagsClient {
			inner: Arc::new(ClientInner {
				store,
				analytics: self.analytics,
				offline: AtomicBool::new(self.config.offline),
			}),
		})
	}
}

impl Default for FlagsClientBuilder {
	fn default() -> Self {
		Self::new()
	}
}

struct ClientInner {
	store: SharedFlagStore,
	analytics: SharedAnalyticsHook,
	offline: AtomicBool,
}

/// Resolves feature flags for users.
///
/// Cloning the client is cheap; clones share the store, the analytics hook
/// and the offline state.
#[derive(Clone)]
pub struct FlagsClient {
	inner: Arc<ClientInner>,
}

impl std::fmt::Debug for FlagsClient {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("FlagsClient")
			.field("offline", &self.is_offline())
			.finish_non_exhaustive()
	}
}

impl FlagsClient {
	pub fn builder() -> FlagsClientBuilder {
		FlagsClientBuilder::new()
	}

	/// Builds a client from configuration, using the HTTP flag store.
	pub fn from_config(config: ClientConfig) -> Result<Self> {
		FlagsClientBuilder::from_config(config).build()
	}

	/// Stops evaluating flags; every resolution returns the caller default.
	///
	/// No analytics events of any kind are sent while offline.
	pub fn set_offline(&self) {
		if !self.inner.offline.swap(true, Ordering::SeqCst) {
			info!("Flags client switched to offline mode");
		}
	}

	/// Resumes evaluating flags.
	pub fn set_online(&self) {
		if self.inner.offline.swap(false, Ordering::SeqCst) {
			info!("Flags client switched to online mode");
		}
	}

	pub fn is_offline(&self) -> bool {
		self.inner.offline.load(Ordering::SeqCst)
	}

	/// Resolves a boolean flag.
	pub async fn get_flag(&self, key: &str, user: &User, default: bool) -> Resolution<bool> {
		self
			.resolve_typed(key, user, default, "boolean", VariationValue::as_bool)
			.await
	}

	/// Resolves a string flag.
	pub async fn get_string(&self, key: &str, user: &User, default: &str) -> Resolution<String> {
		self
			.resolve_typed(key, user, default.to_string(), "string", |v| {
				v.as_str().map(str::to_string)
			})
			.await
	}

	/// Resolves a numeric flag.
	pub async fn get_number(&self, key: &str, user: &User, default: f64) -> Resolution<f64> {
		self
			.resolve_typed(key, user, default, "number", VariationValue::as_f64)
			.await
	}

	/// Resolves a flag as JSON. Any served value converts.
	pub async fn get_json(
		&self,
		key: &str,
		user: &User,
		default: serde_json::Value,
	) -> Resolution<serde_json::Value> {
		self
			.resolve_typed(key, user, default, "json", |v| Some(v.to_json()))
			.await
	}

	/// Resolves a flag without any type check.
	pub async fn get_variation(
		&self,
		key: &str,
		user: &User,
		default: VariationValue,
	) -> Resolution<VariationValue> {
		self
			.resolve_typed(key, user, default, "any", |v| Some(v.clone()))
			.await
	}

	/// Evaluates every flag in the store for a user.
	///
	/// Returns an empty map while offline. Analytics events are not recorded.
	pub async fn all_flags(&self, user: &User) -> Result<HashMap<String, EvaluationDetail>> {
		if self.is_offline() {
			debug!("Skipping all_flags while offline");
			return Ok(HashMap::new());
		}

		let flags = self.inner.store.all_flags().await?;
		Ok(flags
			.iter()
			.map(|flag| (flag.key.clone(), evaluate_flag(flag, user)))
			.collect())
	}

	/// Records a custom event for a user. Dropped while offline.
	pub async fn track(&self, event_key: &str, user: &User, data: Option<serde_json::Value>) {
		if self.is_offline() {
			return;
		}
		self
			.send_event(AnalyticsEvent::Custom(CustomEvent {
				key: event_key.to_string(),
				user: user.clone(),
				data,
				creation_date: Utc::now(),
			}))
			.await;
	}

	/// Registers a user with the analytics hook. Dropped while offline.
	pub async fn identify(&self, user: &User) {
		if self.is_offline() {
			return;
		}
		self
			.send_event(AnalyticsEvent::Identify(IdentifyEvent {
				user: user.clone(),
				creation_date: Utc::now(),
			}))
			.await;
	}

	async fn resolve_typed<T, F>(
		&self,
		key: &str,
		user: &User,
		default: T,
		expected: &'static str,
		extract: F,
	) -> Resolution<T>
	where
		T: Clone + Into<VariationValue>,
		F: FnOnce(&VariationValue) -> Option<T>,
	{
		let resolution = match self.resolve(key, user).await {
			Ok(detail) => match extract(&detail.value) {
				Some(value) => Resolution::served(value, detail.reason),
				None => {
					warn!(
						flag_key = %key,
						expected,
						actual = detail.value.type_name(),
						"Flag served a value of the wrong type"
					);
					Resolution::fallback(
						default.clone(),
						ResolutionError::WrongType {
							key: key.to_string(),
							expected,
							actual: detail.value.type_name(),
						},
					)
				}
			},
			Err(error) => Resolution::fallback(default.clone(), error),
		};

		if resolution.reason != EvaluationReason::Offline {
			let event = FeatureRequestEvent::new(
				key,
				user,
				resolution.value.clone().into(),
				default.into(),
				resolution.reason,
			);
			self.send_event(AnalyticsEvent::Feature(event)).await;
		}

		resolution
	}

	async fn resolve(
		&self,
		key: &str,
		user: &User,
	) -> std::result::Result<EvaluationDetail, ResolutionError> {
		if self.is_offline() {
			debug!(flag_key = %key, "Client offline, serving default");
			return Err(ResolutionError::Offline);
		}

		let flag = match self.inner.store.fetch_flag(key).await {
			Ok(Some(flag)) => flag,
			Ok(None) => {
				debug!(flag_key = %key, "Flag not found, serving default");
				return Err(ResolutionError::FlagNotFound {
					key: key.to_string(),
				});
			}
			Err(e) => {
				warn!(flag_key = %key, error = %e, "Flag store failed, serving default");
				return Err(ResolutionError::Store(e.to_string()));
			}
		};

		let detail = evaluate_flag(&flag, user);
		debug!(flag_key = %key, reason = %detail.reason, "Flag evaluated");
		Ok(detail)
	}

	async fn send_event(&self, event: AnalyticsEvent) {
		self.inner.analytics.on_event(event).await;
	}
}

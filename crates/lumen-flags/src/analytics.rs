// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Analytics integration for flag usage tracking.
//!
//! The client forwards every flag resolution, custom event and identify call
//! to an [`AnalyticsHook`] while online. Batching and delivery are the hook's business; the
//! client only hands events over.
//!
//! # Feature events
//!
//! A [`FeatureRequestEvent`] converts to the standard `$feature_flag_called`
//! properties:
//!
//! | Property | Description |
//! |----------|-------------|
//! | `$feature_flag` | The flag key that was evaluated |
//! | `$feature_flag_response` | The value served |
//! | `$feature_flag_reason` | The evaluation reason (e.g. "Fallthrough", "RuleMatch(0)") |
//!
//! # Example
//!
//! ```ignore
//! use lumen_flags::{AnalyticsEvent, AnalyticsHook, FlagsClient};
//! use async_trait::async_trait;
//!
//! struct PrintHook;
//!
//! #[async_trait]
//! impl AnalyticsHook for PrintHook {
//!     async fn on_event(&self, event: AnalyticsEvent) {
//!         println!("{} event for {:?}", event.kind(), event.user().key);
//!     }
//! }
//!
//! let client = FlagsClient::builder()
//!     .store(store)
//!     .analytics_hook(PrintHook)
//!     .build()?;
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lumen_flags_core::{EvaluationReason, User, VariationValue};
use serde::{Deserialize, Serialize};

/// Recorded each time a flag is resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureRequestEvent {
	pub key: String,
	pub user: User,
	/// The value returned to the caller.
	pub value: VariationValue,
	/// The default the caller supplied.
	pub default: VariationValue,
	pub reason: EvaluationReason,
	pub creation_date: DateTime<Utc>,
}

impl FeatureRequestEvent {
	pub fn new(
		key: impl Into<String>,
		user: &User,
		value: VariationValue,
		default: VariationValue,
		reason: EvaluationReason,
	) -> Self {
		Self {
			key: key.into(),
			user: user.clone(),
			value,
			default,
			reason,
			creation_date: Utc::now(),
		}
	}

	/// Converts this event to the standard `$feature_flag_called` properties.
	pub fn to_event_properties(&self) -> serde_json::Value {
		serde_json::json!({
			"$feature_flag": self.key,
			"$feature_flag_response": self.value.to_string(),
			"$feature_flag_reason": self.reason.to_string(),
		})
	}
}

/// An application-defined event recorded through [`FlagsClient::track`](crate::FlagsClient::track).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomEvent {
	pub key: String,
	pub user: User,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub data: Option<serde_json::Value>,
	pub creation_date: DateTime<Utc>,
}

/// Recorded through [`FlagsClient::identify`](crate::FlagsClient::identify).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentifyEvent {
	pub user: User,
	pub creation_date: DateTime<Utc>,
}

/// Every event the client hands to an analytics hook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum AnalyticsEvent {
	Feature(FeatureRequestEvent),
	Custom(CustomEvent),
	Identify(IdentifyEvent),
}

impl AnalyticsEvent {
	pub fn kind(&self) -> &'static str {
		match self {
			AnalyticsEvent::Feature(_) => "feature",
			AnalyticsEvent::Custom(_) => "custom",
			AnalyticsEvent::Identify(_) => "identify",
		}
	}

	pub fn user(&self) -> &User {
		match self {
			AnalyticsEvent::Feature(e) => &e.user,
			AnalyticsEvent::Custom(e) => &e.user,
			AnalyticsEvent::Identify(e) => &e.user,
		}
	}
}

/// Receives analytics events from the client.
///
/// The hook is awaited on the resolution path. Implementations should be fast
/// and non-blocking; queue expensive work such as HTTP delivery in the
/// background, and never let an analytics failure affect flag resolution.
#[async_trait]
pub trait AnalyticsHook: Send + Sync + 'static {
	async fn on_event(&self, event: AnalyticsEvent);
}

/// Type alias for a shared analytics hook.
pub type SharedAnalyticsHook = Arc<dyn AnalyticsHook>;

/// A no-op analytics hook that discards all events.
///
/// This is used when no analytics integration is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpAnalyticsHook;

#[async_trait]
impl AnalyticsHook for NoOpAnalyticsHook {
	async fn on_event(&self, _event: AnalyticsEvent) {}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::sync::atomic::{AtomicUsize, Ordering};

	#[test]
	fn feature_event_to_event_properties() {
		let event = FeatureRequestEvent::new(
			"feature.beta",
			&User::new("user123"),
			VariationValue::Boolean(true),
			VariationValue::Boolean(false),
			EvaluationReason::RuleMatch { rule_index: 0 },
		);

		let props = event.to_event_properties();

		assert_eq!(props["$feature_flag"], "feature.beta");
		assert_eq!(props["$feature_flag_response"], "true");
		assert_eq!(props["$feature_flag_reason"], "RuleMatch(0)");
	}

	#[test]
	fn analytics_event_serialization() {
		let event = AnalyticsEvent::Custom(CustomEvent {
			key: "checkout_completed".to_string(),
			user: User::new("user456"),
			data: Some(serde_json::json!({"total": 42})),
			creation_date: Utc::now(),
		});

		let json = serde_json::to_value(&event).unwrap();
		assert_eq!(json["kind"], "custom");
		assert_eq!(json["key"], "checkout_completed");
		assert_eq!(json["user"]["key"], "user456");

		let parsed: AnalyticsEvent = serde_json::from_value(json).unwrap();
		assert_eq!(parsed, event);
	}

	#[test]
	fn analytics_event_accessors() {
		let event = AnalyticsEvent::Identify(IdentifyEvent {
			user: User::new("user789"),
			creation_date: Utc::now(),
		});
		assert_eq!(event.kind(), "identify");
		assert_eq!(event.user().key.as_deref(), Some("user789"));
	}

	struct CountingHook {
		count: AtomicUsize,
	}

	#[async_trait]
	impl AnalyticsHook for CountingHook {
		async fn on_event(&self, _event: AnalyticsEvent) {
			self.count.fetch_add(1, Ordering::SeqCst);
		}
	}

	#[tokio::test]
	async fn analytics_hook_is_called() {
		let hook = CountingHook {
			count: AtomicUsize::new(0),
		};

		let event = AnalyticsEvent::Identify(IdentifyEvent {
			user: User::new("user"),
			creation_date: Utc::now(),
		});
		hook.on_event(event).await;

		assert_eq!(hook.count.load(Ordering::SeqCst), 1);
	}

	#[tokio::test]
	async fn noop_hook_does_nothing() {
		let hook = NoOpAnalyticsHook;
		let event = AnalyticsEvent::Identify(IdentifyEvent {
			user: User::new("user"),
			creation_date: Utc::now(),
		});

		hook.on_event(event).await;
	}
}

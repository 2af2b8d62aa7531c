// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Feature Flags Rust SDK for Lumen.
//!
//! This crate resolves feature flags for users. Flag definitions come from a
//! [`FlagStore`]; evaluation itself is the pure engine in `lumen-flags-core`.
//!
//! # Features
//!
//! - **Offline Mode**: Every resolution serves the caller default
//! - **Pluggable Stores**: In-memory snapshots or the HTTP flag service
//! - **Typed Resolution**: Boolean, string, number and JSON values
//! - **Analytics Hook**: Feature, custom and identify events for usage tracking
//!
//! Resolution never leaves the caller without a value: failures are reported
//! in [`Resolution::error`] next to the caller's default.
//!
//! # Example
//!
//! ```ignore
//! use lumen_flags::{FlagsClient, User};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = FlagsClient::builder()
//!         .sdk_key("sdk-xxx")
//!         .base_url("https://flags.example.com")
//!         .build()?;
//!
//!     let user = User::new("user123")
//!         .with_email("user@example.com")
//!         .with_custom("groups", vec!["beta", "staff"]);
//!
//!     let enabled = client.get_flag("checkout.new_flow", &user, false).await;
//!     if let Some(error) = &enabled.error {
//!         eprintln!("serving default: {error}");
//!     }
//!
//!     let theme = client.get_string("ui.theme", &user, "light").await.into_value();
//!
//!     Ok(())
//! }
//! ```

mod analytics;
mod client;
mod config;
mod error;
mod http;
mod store;

pub use analytics::{
	AnalyticsEvent, AnalyticsHook, CustomEvent, FeatureRequestEvent, IdentifyEvent,
	NoOpAnalyticsHook, SharedAnalyticsHook,
};
pub use client::{FlagsClient, FlagsClientBuilder, Resolution};
pub use config::{ClientConfig, SdkKey, DEFAULT_TIMEOUT};
pub use error::{FlagsError, ResolutionError, Result};
pub use http::HttpFlagStore;
pub use store::{FlagStore, InMemoryFlagStore, SharedFlagStore};

// Re-export core types for convenience
pub use lumen_flags_core::{
	AttributeValue, EvaluationDetail, EvaluationReason, FeatureFlag, FlagRule, Number, Operator,
	TargetRule, User, VariationValue, WeightedVariation,
};

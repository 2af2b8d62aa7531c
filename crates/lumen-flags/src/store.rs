// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Flag store collaborators.
//!
//! The client never fetches or caches flag definitions itself; it asks a
//! [`FlagStore`]. Implementations must hand out fully populated definitions:
//! a reader may never observe a flag halfway through an update.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use lumen_flags_core::FeatureFlag;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::Result;

/// Source of flag definitions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FlagStore: Send + Sync + 'static {
	/// Fetches a single flag. `Ok(None)` means the flag does not exist.
	async fn fetch_flag(&self, key: &str) -> Result<Option<Arc<FeatureFlag>>>;

	/// Fetches every flag the store knows about.
	async fn all_flags(&self) -> Result<Vec<Arc<FeatureFlag>>>;
}

/// Type alias for a shared flag store.
pub type SharedFlagStore = Arc<dyn FlagStore>;

type Snapshot = Arc<HashMap<String, Arc<FeatureFlag>>>;

/// In-memory flag store holding an immutable snapshot.
///
/// Writers build a new snapshot and swap it in under the lock, so readers
/// always see either the old or the new set of flags in full. Cloning the
/// store shares the underlying snapshot.
#[derive(Debug, Clone, Default)]
pub struct InMemoryFlagStore {
	snapshot: Arc<RwLock<Snapshot>>,
}

impl InMemoryFlagStore {
	/// Creates an empty store.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a store pre-populated with the given flags.
	pub fn with_flags(flags: impl IntoIterator<Item = FeatureFlag>) -> Self {
		let snapshot: HashMap<_, _> = flags
			.into_iter()
			.map(|flag| (flag.key.clone(), Arc::new(flag)))
			.collect();
		Self {
			snapshot: Arc::new(RwLock::new(Arc::new(snapshot))),
		}
	}

	/// Replaces every flag in one step.
	pub async fn replace_all(&self, flags: impl IntoIterator<Item = FeatureFlag>) {
		let next: HashMap<_, _> = flags
			.into_iter()
			.map(|flag| (flag.key.clone(), Arc::new(flag)))
			.collect();
		let count = next.len();
		*self.snapshot.write().await = Arc::new(next);
		debug!(flags = count, "Flag store snapshot replaced");
	}

	/// Inserts or replaces a single flag.
	pub async fn upsert(&self, flag: FeatureFlag) {
		let mut guard = self.snapshot.write().await;
		let mut next = HashMap::clone(&guard);
		debug!(flag_key = %flag.key, "Flag upserted");
		next.insert(flag.key.clone(), Arc::new(flag));
		*guard = Arc::new(next);
	}

	/// Removes a flag. Returns true if it was present.
	pub async fn remove(&self, key: &str) -> bool {
		let mut guard = self.snapshot.write().await;
		if !guard.contains_key(key) {
			return false;
		}
		let mut next = HashMap::clone(&guard);
		next.remove(key);
		*guard = Arc::new(next);
		debug!(flag_key = %key, "Flag removed");
		true
	}

	/// Returns the number of flags currently held.
	pub async fn flag_count(&self) -> usize {
		self.snapshot.read().await.len()
	}

	async fn current(&self) -> Snapshot {
		Arc::clone(&*self.snapshot.read().await)
	}
}

#[async_trait]
impl FlagStore for InMemoryFlagStore {
	async fn fetch_flag(&self, key: &str) -> Result<Option<Arc<FeatureFlag>>> {
		Ok(self.current().await.get(key).cloned())
	}

	async fn all_flags(&self) -> Result<Vec<Arc<FeatureFlag>>> {
		Ok(self.current().await.values().cloned().collect())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use lumen_flags_core::VariationValue;

	#[tokio::test]
	async fn test_fetch_missing_flag() {
		let store = InMemoryFlagStore::new();
		assert!(store.fetch_flag("missing.flag").await.unwrap().is_none());
	}

	#[tokio::test]
	async fn test_with_flags_and_fetch() {
		let store = InMemoryFlagStore::with_flags([FeatureFlag::new("feature.test", true)]);

		let flag = store.fetch_flag("feature.test").await.unwrap().unwrap();
		assert_eq!(flag.default_value, VariationValue::Boolean(true));
		assert_eq!(store.flag_count().await, 1);
	}

	#[tokio::test]
	async fn test_replace_all_swaps_snapshot() {
		let store = InMemoryFlagStore::with_flags([FeatureFlag::new("old.flag", true)]);

		store
			.replace_all([
				FeatureFlag::new("new.flag_a", false),
				FeatureFlag::new("new.flag_b", false),
			])
			.await;

		assert!(store.fetch_flag("old.flag").await.unwrap().is_none());
		assert_eq!(store.flag_count().await, 2);
		assert_eq!(store.all_flags().await.unwrap().len(), 2);
	}

	#[tokio::test]
	async fn test_upsert_and_remove() {
		let store = InMemoryFlagStore::new();

		store.upsert(FeatureFlag::new("feature.test", false)).await;
		store
			.upsert(FeatureFlag::new("feature.test", true).with_on(false))
			.await;

		let flag = store.fetch_flag("feature.test").await.unwrap().unwrap();
		assert!(!flag.on);
		assert_eq!(store.flag_count().await, 1);

		assert!(store.remove("feature.test").await);
		assert!(!store.remove("feature.test").await);
		assert_eq!(store.flag_count().await, 0);
	}

	#[tokio::test]
	async fn test_held_flag_survives_replacement() {
		let store = InMemoryFlagStore::with_flags([FeatureFlag::new("feature.test", true)]);

		let held = store.fetch_flag("feature.test").await.unwrap().unwrap();
		store.replace_all(Vec::new()).await;

		assert_eq!(held.key, "feature.test");
		assert_eq!(held.default_value, VariationValue::Boolean(true));
	}

	#[tokio::test]
	async fn test_clones_share_snapshot() {
		let store = InMemoryFlagStore::new();
		let reader = store.clone();

		store.upsert(FeatureFlag::new("feature.test", true)).await;

		assert!(reader.fetch_flag("feature.test").await.unwrap().is_some());
	}
}

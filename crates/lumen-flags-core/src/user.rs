// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::AttributeValue;

/// Built-in attribute names, as they appear in targeting rules.
pub const BUILTIN_ATTRIBUTES: &[&str] = &[
	"key",
	"secondary",
	"ip",
	"country",
	"email",
	"firstName",
	"lastName",
	"avatar",
	"name",
	"anonymous",
];

/// The subject a flag is evaluated for.
///
/// A user carries an optional identity key, a fixed set of profile fields and
/// an open-ended bag of custom attributes. Evaluation only ever borrows a user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub key: Option<String>,
	/// Extra input mixed into rollout bucketing.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub secondary: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub ip: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub country: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub email: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub first_name: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub last_name: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub avatar: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub anonymous: Option<bool>,
	#[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
	pub custom: BTreeMap<String, AttributeValue>,
}

impl User {
	/// Creates a user with the given identity key.
	pub fn new(key: impl Into<String>) -> Self {
		Self {
			key: Some(key.into()),
			..Default::default()
		}
	}

	pub fn with_secondary(mut self, secondary: impl Into<String>) -> Self {
		self.secondary = Some(secondary.into());
		self
	}

	pub fn with_ip(mut self, ip: impl Into<String>) -> Self {
		self.ip = Some(ip.into());
		self
	}

	pub fn with_country(mut self, country: impl Into<String>) -> Self {
		self.country = Some(country.into());
		self
	}

	pub fn with_email(mut self, email: impl Into<String>) -> Self {
		self.email = Some(email.into());
		self
	}

	pub fn with_first_name(mut self, first_name: impl Into<String>) -> Self {
		self.first_name = Some(first_name.into());
		self
	}

	pub fn with_last_name(mut self, last_name: impl Into<String>) -> Self {
		self.last_name = Some(last_name.into());
		self
	}

	pub fn with_avatar(mut self, avatar: impl Into<String>) -> Self {
		self.avatar = Some(avatar.into());
		self
	}

	pub fn with_name(mut self, name: impl Into<String>) -> Self {
		self.name = Some(name.into());
		self
	}

	pub fn with_anonymous(mut self, anonymous: bool) -> Self {
		self.anonymous = Some(anonymous);
		self
	}

	/// Adds or replaces a custom attribute.
	pub fn with_custom(mut self, name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
		self.custom.insert(name.into(), value.into());
		self
	}

	/// Looks up an attribute by the name used in targeting rules.
	///
	/// Built-in names resolve to the profile field when it is set. Any other
	/// name, or a built-in field that is unset, falls back to the custom
	/// attributes.
	pub fn attribute(&self, name: &str) -> Option<Cow<'_, AttributeValue>> {
		if let Some(value) = self.builtin(name) {
			return Some(Cow::Owned(value));
		}
		self.custom.get(name).map(Cow::Borrowed)
	}

	fn builtin(&self, name: &str) -> Option<AttributeValue> {
		let field = match name {
			"key" => &self.key,
			"secondary" => &self.secondary,
			"ip" => &self.ip,
			"country" => &self.country,
			"email" => &self.email,
			"firstName" => &self.first_name,
			"lastName" => &self.last_name,
			"avatar" => &self.avatar,
			"name" => &self.name,
			"anonymous" => return self.anonymous.map(AttributeValue::Bool),
			_ => return None,
		};
		field.as_deref().map(AttributeValue::from)
	}
}

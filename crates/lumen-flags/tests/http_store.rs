// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use lumen_flags::{
	ClientConfig, EvaluationReason, FlagStore, FlagsClient, FlagsError, HttpFlagStore,
	ResolutionError, SdkKey, User, VariationValue,
};
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn init_tracing() {
	let _ = tracing_subscriber::fmt()
		.with_env_filter("lumen_flags=debug")
		.with_test_writer()
		.try_init();
}

fn config_for(server: &MockServer) -> ClientConfig {
	ClientConfig {
		base_url: Some(server.uri().parse().unwrap()),
		sdk_key: Some(SdkKey::new("sdk-test").unwrap()),
		..Default::default()
	}
}

fn dashboard_flag() -> serde_json::Value {
	json!({
		"key": "new.dashboard",
		"name": "New dashboard",
		"on": true,
		"salt": "f1a2",
		"rules": [
			{"attribute": "groups", "op": "in", "values": ["beta"], "value": true}
		],
		"defaultValue": false
	})
}

#[tokio::test]
async fn fetches_flag_with_api_key_header() {
	init_tracing();
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.and(path("/api/eval/features/new.dashboard"))
		.and(header("Authorization", "api_key sdk-test"))
		.respond_with(ResponseTemplate::new(200).set_body_json(dashboard_flag()))
		.expect(1)
		.mount(&server)
		.await;

	let store = HttpFlagStore::new(&config_for(&server)).unwrap();
	let flag = store.fetch_flag("new.dashboard").await.unwrap().unwrap();

	assert_eq!(flag.key, "new.dashboard");
	assert_eq!(flag.rules.len(), 1);
	assert_eq!(flag.default_value, VariationValue::Boolean(false));
}

#[tokio::test]
async fn missing_flag_is_none() {
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.and(path("/api/eval/features/missing.flag"))
		.respond_with(ResponseTemplate::new(404))
		.mount(&server)
		.await;

	let store = HttpFlagStore::new(&config_for(&server)).unwrap();

	assert!(store.fetch_flag("missing.flag").await.unwrap().is_none());
}

#[tokio::test]
async fn server_error_is_reported() {
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
		.mount(&server)
		.await;

	let store = HttpFlagStore::new(&config_for(&server)).unwrap();
	let err = store.fetch_flag("new.dashboard").await.unwrap_err();

	match err {
		FlagsError::ServerError { status, message } => {
			assert_eq!(status, 503);
			assert_eq!(message, "maintenance");
		}
		other => panic!("expected server error, got {other:?}"),
	}
}

#[tokio::test]
async fn invalid_definition_is_rejected() {
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.and(path("/api/eval/features/Bad"))
		.respond_with(
			ResponseTemplate::new(200).set_body_json(json!({"key": "Bad", "on": true, "defaultValue": 1})),
		)
		.mount(&server)
		.await;

	let store = HttpFlagStore::new(&config_for(&server)).unwrap();

	assert!(matches!(
		store.fetch_flag("Bad").await,
		Err(FlagsError::InvalidFlag(_))
	));
}

#[tokio::test]
async fn malformed_body_is_a_parse_failure_on_both_paths() {
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
		.mount(&server)
		.await;

	let store = HttpFlagStore::new(&config_for(&server)).unwrap();

	assert!(matches!(
		store.fetch_flag("new.dashboard").await,
		Err(FlagsError::ParseFailed(_))
	));
	assert!(matches!(
		store.all_flags().await,
		Err(FlagsError::ParseFailed(_))
	));
}

#[tokio::test]
async fn mismatched_flag_key_is_rejected() {
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.and(path("/api/eval/features/other.flag"))
		.respond_with(ResponseTemplate::new(200).set_body_json(dashboard_flag()))
		.mount(&server)
		.await;

	let store = HttpFlagStore::new(&config_for(&server)).unwrap();

	assert!(matches!(
		store.fetch_flag("other.flag").await,
		Err(FlagsError::ParseFailed(_))
	));
}

#[tokio::test]
async fn overweight_rollout_falls_back_to_default() {
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.and(path("/api/eval/features/split.test"))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!({
			"key": "split.test",
			"on": true,
			"rollout": [
				{"weight": 4294967295u64, "value": true},
				{"weight": 1, "value": false}
			],
			"defaultValue": false
		})))
		.mount(&server)
		.await;

	let client = FlagsClient::from_config(config_for(&server)).unwrap();
	let res = client.get_flag("split.test", &User::new("u1"), true).await;

	assert!(res.value);
	assert_eq!(res.reason, EvaluationReason::Error);
	assert!(matches!(res.error, Some(ResolutionError::Store(_))));
}

#[tokio::test]
async fn lists_all_flags() {
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.and(path("/api/eval/features"))
		.respond_with(ResponseTemplate::new(200).set_body_json(json!([
			dashboard_flag(),
			{"key": "ui.theme", "on": false, "defaultValue": "light"}
		])))
		.mount(&server)
		.await;

	let store = HttpFlagStore::new(&config_for(&server)).unwrap();
	let flags = store.all_flags().await.unwrap();

	assert_eq!(flags.len(), 2);
}

#[tokio::test]
async fn client_resolves_through_http_store() {
	init_tracing();
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.and(path("/api/eval/features/new.dashboard"))
		.respond_with(ResponseTemplate::new(200).set_body_json(dashboard_flag()))
		.mount(&server)
		.await;
	Mock::given(method("GET"))
		.and(path("/api/eval/features/missing.flag"))
		.respond_with(ResponseTemplate::new(404))
		.mount(&server)
		.await;

	let client = FlagsClient::builder()
		.base_url(server.uri())
		.sdk_key("sdk-test")
		.build()
		.unwrap();
	let beta = User::new("test@test.com").with_custom("groups", ["microsoft", "beta"]);

	let res = client.get_flag("new.dashboard", &beta, false).await;
	assert!(res.value);
	assert_eq!(res.reason, EvaluationReason::RuleMatch { rule_index: 0 });

	let res = client.get_flag("missing.flag", &beta, true).await;
	assert!(res.value);
	assert_eq!(
		res.error,
		Some(ResolutionError::FlagNotFound {
			key: "missing.flag".to_string()
		})
	);
}

#[tokio::test]
async fn offline_client_makes_no_requests() {
	let server = MockServer::start().await;
	Mock::given(method("GET"))
		.respond_with(ResponseTemplate::new(200).set_body_json(dashboard_flag()))
		.expect(0)
		.mount(&server)
		.await;

	let client = FlagsClient::from_config(ClientConfig {
		offline: true,
		..config_for(&server)
	})
	.unwrap();

	let res = client
		.get_flag("new.dashboard", &User::new("foo"), true)
		.await;

	assert!(res.value);
	assert_eq!(res.error, Some(ResolutionError::Offline));
}

#![cfg(feature = "reqwest")]

// crates.io
use httpmock::prelude::*;
use serde_json::json;
// self
use steemconnect_sdk::{
	auth::Token,
	client::Client,
	config::Config,
	error::{ApiError, ConfigError, Error, TransportError},
	operation::{RawOperation, Vote},
	url::Url,
};

const RESULT_BODY: &str = r#"{"result":{"id":"abc123","block_num":42,"trx_num":1,"expired":false}}"#;

fn config_for(base: &str) -> Config {
	Config::new("app1").with_api_base(Url::parse(base).expect("Mock base URL should parse."))
}

fn vote() -> Vote {
	Vote::new("alice", "bob", "hello", 10_000)
}

#[tokio::test]
async fn broadcast_posts_operations_with_the_raw_access_token() -> color_eyre::Result<()> {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/api/broadcast")
				.header("authorization", "tok123")
				.header("content-type", "application/json")
				.json_body(json!({
					"operations": [[
						"vote",
						{ "voter": "alice", "author": "bob", "permlink": "hello", "weight": 10000 },
					]],
				}));
			then.status(200).header("content-type", "application/json").body(RESULT_BODY);
		})
		.await;
	let mut client = Client::new(config_for(&server.base_url()))?;

	client.set_token(Token::new("tok123"));

	let response = client.broadcast(&[&vote()]).await?;

	mock.assert_async().await;

	assert_eq!(response.result.id, "abc123");
	assert_eq!(response.result.block_num, 42);
	assert!(!response.result.expired);

	Ok(())
}

#[tokio::test]
async fn api_base_paths_are_kept_as_a_prefix() -> color_eyre::Result<()> {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/sc2/api/broadcast");
			then.status(200).header("content-type", "application/json").body(RESULT_BODY);
		})
		.await;
	let mut client = Client::new(config_for(&server.url("/sc2")))?;

	client.broadcast(&[&vote()]).await?;
	mock.assert_async().await;

	Ok(())
}

#[tokio::test]
async fn config_swaps_redirect_the_next_broadcast() -> color_eyre::Result<()> {
	let first = MockServer::start_async().await;
	let second = MockServer::start_async().await;
	let second_mock = second
		.mock_async(|when, then| {
			when.method(POST).path("/api/broadcast").header("authorization", "tok456");
			then.status(200).header("content-type", "application/json").body(RESULT_BODY);
		})
		.await;
	let mut client = Client::new(config_for(&first.base_url()))?;

	client.set_config(config_for(&second.base_url())).set_token(Token::new("tok456"));
	client.broadcast(&[&vote()]).await?;
	second_mock.assert_async().await;

	Ok(())
}

#[tokio::test]
async fn error_statuses_surface_the_api_error_fields() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(POST).path("/api/broadcast");
			then.status(401)
				.header("content-type", "application/json")
				.header("retry-after", "30")
				.body(r#"{"error":"invalid_token","error_description":"Token expired"}"#);
		})
		.await;

	let mut client =
		Client::new(config_for(&server.base_url())).expect("Client should build for mock server.");
	let err = client.broadcast(&[&vote()]).await.expect_err("401 must fail the broadcast.");

	match err {
		Error::Api(ApiError::Status { status, error, description, retry_after }) => {
			assert_eq!(status, 401);
			assert_eq!(error.as_deref(), Some("invalid_token"));
			assert_eq!(description.as_deref(), Some("Token expired"));
			assert_eq!(retry_after.map(|delay| delay.whole_seconds()), Some(30));
		},
		other => panic!("Unexpected error: {other:?}"),
	}
}

#[tokio::test]
async fn malformed_results_report_the_json_path() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(POST).path("/api/broadcast");
			then.status(200).header("content-type", "application/json").body(r#"{"result":{"id":7}}"#);
		})
		.await;

	let mut client =
		Client::new(config_for(&server.base_url())).expect("Client should build for mock server.");
	let err = client.broadcast(&[&vote()]).await.expect_err("Numeric id must not parse.");

	match err {
		Error::Api(ApiError::MalformedResponse { source, status }) => {
			assert_eq!(source.path().to_string(), "result.id");
			assert_eq!(status, Some(200));
		},
		other => panic!("Unexpected error: {other:?}"),
	}
}

#[tokio::test]
async fn unreachable_endpoints_surface_transport_errors() {
	let mut client =
		Client::new(config_for("http://127.0.0.1:1")).expect("Client should build for any base.");
	let err = client.broadcast(&[&vote()]).await.expect_err("Closed port must fail.");

	assert!(matches!(err, Error::Transport(TransportError::Network { .. })));
}

#[tokio::test]
async fn unnamed_operations_fail_before_sending() {
	let mut client =
		Client::new(config_for("http://127.0.0.1:1")).expect("Client should build for any base.");
	let raw = RawOperation::unnamed(json!({ "from": "alice" }));
	let err = client.broadcast(&[&vote(), &raw]).await.expect_err("Unnamed operation must fail.");

	assert!(matches!(err, Error::Config(ConfigError::UnnamedOperation { index: 1 })));
}

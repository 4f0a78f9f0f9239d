//! Broadcasting named operations through the API.

// self
use crate::{
	_prelude::*,
	auth::Token,
	config::{BROADCAST_PATH, Config},
	error::ConfigError,
	http::{ApiHttpClient, CallFuture},
	operation::Operation,
};

/// Serializes operations and sends them to the broadcast endpoint.
///
/// The client facade creates a broadcaster once and then pushes its current HTTP client,
/// config, and token into the same instance before every broadcast, so implementations
/// must treat the setters as the only source of that state.
pub trait Broadcaster
where
	Self: Send + Sync,
{
	/// Replaces the HTTP client used to send broadcasts.
	fn set_http_client(&mut self, http_client: Arc<dyn ApiHttpClient>);

	/// Replaces the config view.
	fn set_config(&mut self, config: Config);

	/// Replaces (or clears) the token view.
	fn set_token(&mut self, token: Option<Token>);

	/// Current config view, if one was pushed.
	fn config(&self) -> Option<&Config>;

	/// Current token view.
	fn token(&self) -> Option<&Token>;

	/// Sends `operations` in order as one broadcast.
	fn broadcast<'a>(
		&'a self,
		operations: &'a [&'a dyn Operation],
	) -> CallFuture<'a, BroadcastResponse>;
}

/// Parsed broadcast endpoint reply.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastResponse {
	/// Inclusion details of the broadcast transaction.
	pub result: TransactionResult,
}

/// Where the broadcast transaction landed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransactionResult {
	/// Transaction id.
	pub id: String,
	/// Block containing the transaction.
	pub block_num: u64,
	/// Position of the transaction inside the block.
	pub trx_num: u32,
	/// Whether the transaction expired before inclusion.
	pub expired: bool,
}

/// Default [`Broadcaster`] posting `{"operations": [[name, params], ...]}` to
/// `api/broadcast`.
pub struct HttpBroadcaster {
	config: Config,
	token: Option<Token>,
	http_client: Arc<dyn ApiHttpClient>,
}
impl HttpBroadcaster {
	/// Creates a broadcaster sending through `http_client`.
	pub fn new(config: Config, token: Option<Token>, http_client: Arc<dyn ApiHttpClient>) -> Self {
		Self { config, token, http_client }
	}

	/// HTTP client broadcasts are sent through.
	pub fn http_client(&self) -> &Arc<dyn ApiHttpClient> {
		&self.http_client
	}
}
impl Debug for HttpBroadcaster {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("HttpBroadcaster")
			.field("config", &self.config)
			.field("token", &self.token)
			.finish_non_exhaustive()
	}
}
impl Broadcaster for HttpBroadcaster {
	fn set_http_client(&mut self, http_client: Arc<dyn ApiHttpClient>) {
		self.http_client = http_client;
	}

	fn set_config(&mut self, config: Config) {
		self.config = config;
	}

	fn set_token(&mut self, token: Option<Token>) {
		self.token = token;
	}

	fn config(&self) -> Option<&Config> {
		Some(&self.config)
	}

	fn token(&self) -> Option<&Token> {
		self.token.as_ref()
	}

	fn broadcast<'a>(
		&'a self,
		operations: &'a [&'a dyn Operation],
	) -> CallFuture<'a, BroadcastResponse> {
		Box::pin(async move {
			let payload = encode_operations(operations)?;
			let response = self.http_client.post_json(BROADCAST_PATH, payload).await?;

			response.parse()
		})
	}
}

/// Builds the broadcast request body, keeping the order of `operations`.
pub fn encode_operations(operations: &[&dyn Operation]) -> Result<serde_json::Value> {
	let encoded = operations
		.iter()
		.enumerate()
		.map(|(index, op)| -> Result<serde_json::Value> {
			let name = op.name().ok_or(ConfigError::UnnamedOperation { index })?;
			let params =
				op.params().map_err(|source| ConfigError::OperationEncode { index, source })?;

			Ok(serde_json::json!([name, params]))
		})
		.collect::<Result<Vec<_>>>()?;

	Ok(serde_json::json!({ "operations": encoded }))
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{
		_preludet::{RecordingHttpClient, test_config},
		error::TransportError,
		operation::{CustomJson, RawOperation, Vote},
	};

	#[test]
	fn operations_encode_as_ordered_name_params_pairs() {
		let vote = Vote::new("alice", "bob", "hello", 10_000);
		let follow = CustomJson::follow("alice", "bob");
		let body = encode_operations(&[&vote, &follow]).expect("Operations should encode.");
		let pairs = body["operations"].as_array().expect("Operations should be an array.");

		assert_eq!(pairs.len(), 2);
		assert_eq!(pairs[0][0], "vote");
		assert_eq!(pairs[0][1]["weight"], 10_000);
		assert_eq!(pairs[1][0], "custom_json");
		assert_eq!(pairs[1][1]["id"], "follow");
	}

	#[test]
	fn unnamed_operations_are_rejected_with_their_position() {
		let vote = Vote::new("alice", "bob", "hello", 100);
		let raw = RawOperation::unnamed(serde_json::json!({}));
		let err = encode_operations(&[&vote, &raw]).expect_err("Unnamed operation must fail.");

		assert!(matches!(err, Error::Config(ConfigError::UnnamedOperation { index: 1 })));
	}

	#[test]
	fn transaction_results_tolerate_missing_fields() {
		let response: BroadcastResponse =
			serde_json::from_str(r#"{"result":{"id":"abc"}}"#).expect("Partial result should parse.");

		assert_eq!(response.result.id, "abc");
		assert_eq!(response.result.block_num, 0);
	}

	#[tokio::test]
	async fn broadcasts_post_to_the_broadcast_path_and_parse_the_reply() {
		let config = test_config("https://api.example");
		let http = Arc::new(RecordingHttpClient::new(config.clone()));
		let broadcaster = HttpBroadcaster::new(config, None, http.clone());
		let vote = Vote::new("alice", "bob", "hello", 100);
		let response = broadcaster.broadcast(&[&vote]).await.expect("Broadcast should succeed.");
		let log = http.log.lock();

		assert_eq!(response.result.id, "abc123");
		assert_eq!(response.result.block_num, 42);
		assert_eq!(log.requests.len(), 1);
		assert_eq!(log.requests[0].0, BROADCAST_PATH);
		assert_eq!(log.requests[0].1["operations"][0][0], "vote");
	}

	#[tokio::test]
	async fn transport_errors_pass_through() {
		let config = test_config("https://api.example");
		let http = Arc::new(RecordingHttpClient::failing(config.clone(), "connection reset"));
		let broadcaster = HttpBroadcaster::new(config, None, http);
		let vote = Vote::new("alice", "bob", "hello", 100);
		let err = broadcaster.broadcast(&[&vote]).await.expect_err("Broadcast should fail.");

		match err {
			Error::Transport(TransportError::Network { source }) =>
				assert_eq!(source.to_string(), "connection reset"),
			other => panic!("Unexpected error: {other:?}"),
		}
	}
}

//! Client facade keeping its collaborators in sync with the current config and token.
//!
//! [`Client`] owns one [`Config`] and at most one [`Token`]. Setting either never touches a
//! collaborator; instead every call that needs one re-synchronizes it first:
//!
//! - the provider is always rebuilt from the config through the [`ProviderFactory`],
//! - the HTTP client is kept and has the config and token pushed into it,
//! - the broadcaster is created on first use (or kept when injected) and has the HTTP
//!   client, config, and token pushed into it.
//!
//! [`Client::broadcast`] runs those refreshes in that order and returns whatever the
//! broadcaster returns, errors included.

pub mod slot;

// std
use std::convert::Infallible;
// self
use crate::{
	_prelude::*,
	auth::{AuthManager, Token},
	broadcast::{BroadcastResponse, Broadcaster, HttpBroadcaster},
	client::slot::Collaborator,
	config::Config,
	http::ApiHttpClient,
	obs::{self, CallKind, CallOutcome, CallSpan},
	operation::Operation,
	provider::{OAuthProvider, ProviderFactory},
};
#[cfg(feature = "reqwest")]
use crate::{
	http::{ReqwestApiClient, ReqwestHttpClient},
	provider::ReqwestProviderFactory,
};

/// Entry point of the SDK.
pub struct Client {
	config: Config,
	token: Option<Token>,
	provider_factory: Arc<dyn ProviderFactory>,
	provider: Collaborator<Arc<dyn OAuthProvider>>,
	http_client: Arc<dyn ApiHttpClient>,
	broadcaster: Collaborator<Box<dyn Broadcaster>>,
}
impl Client {
	/// Creates an unauthenticated client on the reqwest stack.
	///
	/// The provider is built eagerly, so a structurally invalid config fails here.
	#[cfg(feature = "reqwest")]
	pub fn new(config: Config) -> Result<Self> {
		let transport = ReqwestHttpClient::default();
		let http_client = Arc::new(ReqwestApiClient::new(config.clone(), None, transport.clone()));
		let provider_factory = Arc::new(ReqwestProviderFactory::new(transport));

		Self::with_collaborators(config, http_client, provider_factory)
	}

	/// Creates an unauthenticated client from explicit collaborators.
	pub fn with_collaborators(
		config: Config,
		http_client: Arc<dyn ApiHttpClient>,
		provider_factory: Arc<dyn ProviderFactory>,
	) -> Result<Self> {
		let mut client = Self {
			config,
			token: None,
			provider_factory,
			provider: Collaborator::rebuild(),
			http_client,
			broadcaster: Collaborator::reuse(),
		};

		client.refresh_provider()?;

		Ok(client)
	}

	/// Replaces the config; collaborators pick it up on their next refresh.
	pub fn set_config(&mut self, config: Config) -> &mut Self {
		self.config = config;

		self
	}

	/// Current config.
	pub fn config(&self) -> &Config {
		&self.config
	}

	/// Replaces or clears the token; `None` means unauthenticated.
	pub fn set_token(&mut self, token: impl Into<Option<Token>>) -> &mut Self {
		self.token = token.into();

		self
	}

	/// Current token.
	pub fn token(&self) -> Option<&Token> {
		self.token.as_ref()
	}

	/// Substitutes the provider until the next refresh rebuilds it.
	///
	/// Every [`Client::auth`] and [`Client::broadcast`] rebuilds the provider; use
	/// [`Client::set_provider_factory`] to control what they build.
	pub fn set_oauth_provider(&mut self, provider: Arc<dyn OAuthProvider>) -> &mut Self {
		self.provider.replace(provider);

		self
	}

	/// Current provider; `None` only after a failed rebuild.
	pub fn oauth_provider(&self) -> Option<&Arc<dyn OAuthProvider>> {
		self.provider.get()
	}

	/// Replaces the factory used by [`Client::refresh_provider`].
	pub fn set_provider_factory(&mut self, provider_factory: Arc<dyn ProviderFactory>) -> &mut Self {
		self.provider_factory = provider_factory;

		self
	}

	/// Replaces the HTTP client.
	pub fn set_http_client(&mut self, http_client: Arc<dyn ApiHttpClient>) -> &mut Self {
		self.http_client = http_client;

		self
	}

	/// Current HTTP client.
	pub fn http_client(&self) -> &Arc<dyn ApiHttpClient> {
		&self.http_client
	}

	/// Injects a broadcaster; refreshes keep it and only update its state.
	pub fn set_broadcaster(&mut self, broadcaster: Box<dyn Broadcaster>) -> &mut Self {
		self.broadcaster.replace(broadcaster);

		self
	}

	/// Current broadcaster, if one was injected or created.
	pub fn broadcaster(&self) -> Option<&dyn Broadcaster> {
		self.broadcaster.get().map(|broadcaster| &**broadcaster)
	}

	/// Discards the provider and builds a new one from the current config.
	///
	/// On failure the provider slot stays empty and the factory's error is returned.
	pub fn refresh_provider(&mut self) -> Result<&mut Self> {
		self.rebuild_provider()?;

		Ok(self)
	}

	/// Pushes the current config and token into the existing HTTP client.
	pub fn refresh_http_client(&mut self) -> &mut Self {
		self.http_client.set_config(self.config.clone());
		self.http_client.set_access_token(self.token.clone());

		obs::trace_refresh("http_client", false, self.token.is_some());

		self
	}

	/// Creates the broadcaster if absent, then pushes the HTTP client, config, and token
	/// into it.
	pub fn refresh_broadcaster(&mut self) -> &mut Self {
		self.sync_broadcaster();

		self
	}

	/// Rebuilds the provider and returns a handshake manager bound to the current config,
	/// provider, and token.
	pub fn auth(&mut self) -> Result<AuthManager> {
		let provider = Arc::clone(self.rebuild_provider()?);

		Ok(AuthManager::new(self.config.clone(), provider, self.token.clone()))
	}

	/// Refreshes the provider, HTTP client, and broadcaster, then broadcasts `operations`.
	///
	/// Broadcaster errors are returned as-is.
	pub async fn broadcast(&mut self, operations: &[&dyn Operation]) -> Result<BroadcastResponse> {
		const KIND: CallKind = CallKind::Broadcast;

		let span = CallSpan::new(KIND, "client.broadcast");

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let result = span.instrument(self.refresh_and_broadcast(operations)).await;

		obs::record_call_outcome(KIND, CallOutcome::from_result(&result));

		result
	}

	async fn refresh_and_broadcast(
		&mut self,
		operations: &[&dyn Operation],
	) -> Result<BroadcastResponse> {
		self.refresh_provider()?.refresh_http_client();
		self.sync_broadcaster().broadcast(operations).await
	}

	fn rebuild_provider(&mut self) -> Result<&Arc<dyn OAuthProvider>> {
		let (factory, config) = (&self.provider_factory, &self.config);
		let provider = self.provider.refresh(|| factory.build(config))?;

		obs::trace_refresh("provider", true, self.token.is_some());

		Ok(provider)
	}

	fn sync_broadcaster(&mut self) -> &mut dyn Broadcaster {
		let created = self.broadcaster.is_empty();
		let (config, token, http_client) = (&self.config, &self.token, &self.http_client);
		let Ok(broadcaster) = self.broadcaster.refresh(|| {
			let broadcaster: Box<dyn Broadcaster> =
				Box::new(HttpBroadcaster::new(config.clone(), token.clone(), Arc::clone(http_client)));

			Ok::<_, Infallible>(broadcaster)
		});

		broadcaster.set_http_client(Arc::clone(http_client));
		broadcaster.set_config(config.clone());
		broadcaster.set_token(token.clone());

		obs::trace_refresh("broadcaster", created, token.is_some());

		&mut **broadcaster
	}
}
impl Debug for Client {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Client")
			.field("config", &self.config)
			.field("token", &self.token)
			.field("has_provider", &!self.provider.is_empty())
			.field("has_broadcaster", &!self.broadcaster.is_empty())
			.finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{
		_preludet::{
			CountingProviderFactory, RecordingBroadcaster, RecordingHttpClient, StaticProvider,
			test_config,
		},
		error::{ConfigError, TransportError},
		operation::{Comment, Vote},
	};

	struct Harness {
		client: Client,
		http: Arc<RecordingHttpClient>,
		factory: Arc<CountingProviderFactory>,
	}

	fn harness() -> Harness {
		harness_with(RecordingHttpClient::new(test_config("https://api.example")))
	}

	fn harness_with(http: RecordingHttpClient) -> Harness {
		let http = Arc::new(http);
		let factory = Arc::new(CountingProviderFactory::default());
		let client = Client::with_collaborators(
			test_config("https://api.example"),
			http.clone(),
			factory.clone(),
		)
		.expect("Client should build from a valid config.");

		Harness { client, http, factory }
	}

	fn vote() -> Vote {
		Vote::new("alice", "bob", "hello", 10_000)
	}

	fn broadcaster_addr(client: &Client) -> Option<*const ()> {
		client.broadcaster().map(|broadcaster| std::ptr::from_ref(broadcaster).cast::<()>())
	}

	#[test]
	fn token_is_none_until_set_then_tracks_the_last_value() {
		let Harness { mut client, .. } = harness();

		assert!(client.token().is_none());

		client.set_token(Token::new("first")).set_token(Token::new("second"));

		assert_eq!(client.token().map(|token| token.access_token.expose()), Some("second"));

		client.set_token(None);

		assert!(client.token().is_none());
	}

	#[test]
	fn provider_is_rebuilt_on_every_refresh() {
		let Harness { mut client, factory, .. } = harness();

		assert_eq!(factory.build_count(), 1);

		let before = Arc::clone(client.oauth_provider().expect("Provider should be built."));

		client.refresh_provider().expect("Refresh should succeed.");

		let after = client.oauth_provider().expect("Provider should be rebuilt.");

		assert!(!Arc::ptr_eq(&before, after));
		assert_eq!(factory.build_count(), 2);
	}

	#[test]
	fn injected_provider_lasts_until_the_next_refresh() {
		let Harness { mut client, .. } = harness();
		let injected: Arc<dyn OAuthProvider> =
			Arc::new(StaticProvider { app_id: "fake".into(), generation: 99 });

		client.set_oauth_provider(Arc::clone(&injected));

		assert!(client.oauth_provider().is_some_and(|provider| Arc::ptr_eq(provider, &injected)));

		client.refresh_provider().expect("Refresh should succeed.");

		assert!(!client.oauth_provider().is_some_and(|provider| Arc::ptr_eq(provider, &injected)));
	}

	#[test]
	fn failed_provider_rebuild_surfaces_a_config_error() {
		let Harness { mut client, .. } = harness();

		client.set_config(Config::new(""));

		let err = client.auth().expect_err("Empty app id must fail.");

		assert!(matches!(err, Error::Config(ConfigError::MissingAppId)));
		assert!(client.oauth_provider().is_none());
	}

	#[tokio::test]
	async fn failed_provider_rebuild_stops_broadcast_before_other_refreshes() {
		let Harness { mut client, http, .. } = harness();

		client.set_config(Config::new("")).set_token(Token::new("tok123"));

		let err = client.broadcast(&[&vote()]).await.expect_err("Empty app id must fail.");

		assert!(matches!(err, Error::Config(ConfigError::MissingAppId)));
		assert!(client.broadcaster().is_none());

		let log = http.log.lock();

		assert_eq!(log.config_pushes, 0);
		assert_eq!(log.token_pushes, 0);
		assert!(log.requests.is_empty());
	}

	#[test]
	fn invalid_configs_fail_construction() {
		let http = Arc::new(RecordingHttpClient::new(Config::new("")));
		let err = Client::with_collaborators(
			Config::new(""),
			http,
			Arc::new(CountingProviderFactory::default()),
		)
		.expect_err("Empty app id must fail.");

		assert!(matches!(err, Error::Config(ConfigError::MissingAppId)));
	}

	#[tokio::test]
	async fn auth_binds_the_current_config_and_token() {
		let Harness { mut client, .. } = harness();

		client.set_token(Token::new("tok123").with_refresh_token("r-1"));

		let manager = client.auth().expect("Auth manager should build.");

		assert_eq!(manager.config().app_id, "app1");
		assert_eq!(manager.token().map(|token| token.access_token.expose()), Some("tok123"));

		let refreshed = manager.refresh().await.expect("Refresh should succeed.");

		assert_eq!(refreshed.access_token.expose(), "refreshed-by-r-1");
	}

	#[test]
	fn http_client_refresh_mutates_the_same_instance() {
		let Harness { mut client, http, .. } = harness();
		let before = Arc::clone(client.http_client());

		client.set_token(Token::new("tok123")).refresh_http_client();

		assert!(Arc::ptr_eq(&before, client.http_client()));

		let log = http.log.lock();

		assert_eq!(log.config_pushes, 1);
		assert_eq!(log.token_pushes, 1);
		assert_eq!(log.token.as_ref().map(|token| token.access_token.expose()), Some("tok123"));
	}

	#[test]
	fn default_broadcaster_is_created_once() {
		let Harness { mut client, .. } = harness();

		assert!(client.broadcaster().is_none());

		client.refresh_broadcaster();

		let first = broadcaster_addr(&client);

		client.set_token(Token::new("tok123")).refresh_broadcaster();

		assert!(first.is_some());
		assert_eq!(first, broadcaster_addr(&client));
		assert_eq!(
			client
				.broadcaster()
				.and_then(|broadcaster| broadcaster.token())
				.map(|token| token.access_token.expose()),
			Some("tok123")
		);
	}

	#[tokio::test]
	async fn unauthenticated_broadcast_reaches_the_http_client() {
		let Harness { mut client, http, .. } = harness();
		let response = client.broadcast(&[&vote()]).await.expect("Broadcast should succeed.");

		assert_eq!(response.result.id, "abc123");

		let log = http.log.lock();

		assert_eq!(log.config.api_base.as_str(), "https://api.example/");
		assert!(log.token.is_none());
		assert_eq!(log.token_pushes, 1);
		assert_eq!(log.requests.len(), 1);
		assert_eq!(log.requests[0].1["operations"][0][0], "vote");
	}

	#[tokio::test]
	async fn injected_broadcaster_sees_the_token_and_ordered_operations() {
		let Harness { mut client, .. } = harness();
		let (broadcaster, log) = RecordingBroadcaster::new(7);
		let comment = Comment::new("", "steem", "alice", "hello", "Body");

		client.set_broadcaster(Box::new(broadcaster)).set_token(Token::new("tok123"));
		client.broadcast(&[&vote(), &comment]).await.expect("Broadcast should succeed.");

		let log = log.lock();

		assert_eq!(log.instance, 7);
		assert_eq!(log.token.as_ref().map(|token| token.access_token.expose()), Some("tok123"));
		assert_eq!(log.broadcasts, vec![vec![Some("vote".to_owned()), Some("comment".to_owned())]]);
	}

	#[tokio::test]
	async fn broadcasts_observe_state_at_call_time() {
		let Harness { mut client, http, factory } = harness();
		let (broadcaster, log) = RecordingBroadcaster::new(1);

		client.set_broadcaster(Box::new(broadcaster));
		client.broadcast(&[&vote()]).await.expect("First broadcast should succeed.");

		let second = test_config("https://other.example/sc2");

		client.set_config(second.clone()).set_token(Token::new("tok456"));
		client.broadcast(&[&vote()]).await.expect("Second broadcast should succeed.");

		let log = log.lock();

		assert_eq!(log.config.as_ref(), Some(&second));
		assert_eq!(log.token.as_ref().map(|token| token.access_token.expose()), Some("tok456"));
		assert_eq!(log.http_client_pushes, 2);
		assert_eq!(log.broadcasts.len(), 2);
		assert_eq!(http.log.lock().config, second);
		// One build at construction plus one per broadcast.
		assert_eq!(factory.build_count(), 3);
	}

	#[tokio::test]
	async fn injected_broadcaster_identity_survives_refreshes() {
		let Harness { mut client, .. } = harness();
		let (broadcaster, log) = RecordingBroadcaster::new(3);

		client.set_broadcaster(Box::new(broadcaster));

		let injected = broadcaster_addr(&client);

		client.broadcast(&[&vote()]).await.expect("Broadcast should succeed.");
		client.refresh_broadcaster();

		assert_eq!(injected, broadcaster_addr(&client));
		assert_eq!(log.lock().http_client_pushes, 2);
	}

	#[tokio::test]
	async fn transport_errors_propagate_unchanged() {
		let Harness { mut client, .. } = harness_with(RecordingHttpClient::failing(
			test_config("https://api.example"),
			"connection reset",
		));
		let err = client.broadcast(&[&vote()]).await.expect_err("Broadcast should fail.");

		match err {
			Error::Transport(TransportError::Network { source }) =>
				assert_eq!(source.to_string(), "connection reset"),
			other => panic!("Unexpected error: {other:?}"),
		}
	}

	#[test]
	fn debug_output_redacts_the_token() {
		let Harness { mut client, .. } = harness();

		client.set_token(Token::new("tok123"));

		assert!(!format!("{client:?}").contains("tok123"));
	}
}

//! SteemConnect client SDK: OAuth 2.0 authorization-code login plus authenticated
//! broadcasting of named blockchain operations.
//!
//! [`Client`](client::Client) is the entry point. It owns one [`Config`](config::Config) and
//! an optional [`Token`](auth::Token), and re-synchronizes its provider, HTTP client, and
//! broadcaster with them before every call, so the config and token can be swapped at any
//! time.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod broadcast;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod obs;
pub mod operation;
pub mod provider;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and recording test doubles; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// std
	use std::sync::atomic::{AtomicUsize, Ordering};
	// self
	use crate::{
		auth::{Token, TokenSecret},
		broadcast::{BroadcastResponse, Broadcaster, TransactionResult, encode_operations},
		config::{BROADCAST_PATH, Config},
		error::{ConfigError, TransportError},
		http::{ApiHttpClient, ApiResponse, CallFuture},
		operation::Operation,
		provider::{OAuthProvider, ProviderFactory},
	};

	/// Builds a config pointing at `api_base` with the `app1` application identifier.
	pub fn test_config(api_base: &str) -> Config {
		let api_base = Url::parse(api_base).expect("Test API base URL should parse.");

		Config::new("app1").with_api_base(api_base)
	}

	/// State pushed into a [`RecordingHttpClient`].
	#[derive(Debug)]
	pub struct HttpClientLog {
		/// Last config pushed through [`ApiHttpClient::set_config`].
		pub config: Config,
		/// Last token pushed through [`ApiHttpClient::set_access_token`].
		pub token: Option<Token>,
		/// Number of `set_config` calls.
		pub config_pushes: usize,
		/// Number of `set_access_token` calls.
		pub token_pushes: usize,
		/// `(path, payload)` of every request sent.
		pub requests: Vec<(String, serde_json::Value)>,
	}

	/// HTTP client double that records pushed state and replies with a canned broadcast
	/// result or a network error.
	#[derive(Debug)]
	pub struct RecordingHttpClient {
		/// Everything the client observed.
		pub log: Mutex<HttpClientLog>,
		fail_with: Option<String>,
	}
	impl RecordingHttpClient {
		/// Creates a client whose initial view is `config` and no token.
		pub fn new(config: Config) -> Self {
			let log = HttpClientLog {
				config,
				token: None,
				config_pushes: 0,
				token_pushes: 0,
				requests: Vec::new(),
			};

			Self { log: Mutex::new(log), fail_with: None }
		}

		/// Creates a client that fails every request with a network error carrying `message`.
		pub fn failing(config: Config, message: impl Into<String>) -> Self {
			Self { fail_with: Some(message.into()), ..Self::new(config) }
		}
	}
	impl ApiHttpClient for RecordingHttpClient {
		fn set_config(&self, config: Config) {
			let mut log = self.log.lock();

			log.config = config;
			log.config_pushes += 1;
		}

		fn set_access_token(&self, token: Option<Token>) {
			let mut log = self.log.lock();

			log.token = token;
			log.token_pushes += 1;
		}

		fn config(&self) -> Config {
			self.log.lock().config.clone()
		}

		fn access_token(&self) -> Option<Token> {
			self.log.lock().token.clone()
		}

		fn post_json<'a>(
			&'a self,
			path: &'a str,
			payload: serde_json::Value,
		) -> CallFuture<'a, ApiResponse> {
			self.log.lock().requests.push((path.to_owned(), payload));

			let outcome = match &self.fail_with {
				Some(message) =>
					Err(TransportError::network(std::io::Error::other(message.clone())).into()),
				None => Ok(ApiResponse::new(
					200,
					br#"{"result":{"id":"abc123","block_num":42,"trx_num":1,"expired":false}}"#
						.to_vec(),
				)),
			};

			Box::pin(async move { outcome })
		}
	}

	/// Observations made by a [`RecordingBroadcaster`].
	#[derive(Debug, Default)]
	pub struct BroadcastLog {
		/// Identity tag of the broadcaster instance that recorded this log.
		pub instance: usize,
		/// Last config pushed into the broadcaster.
		pub config: Option<Config>,
		/// Last token pushed into the broadcaster.
		pub token: Option<Token>,
		/// Number of `set_http_client` calls.
		pub http_client_pushes: usize,
		/// Operation names of every broadcast call, in order.
		pub broadcasts: Vec<Vec<Option<String>>>,
	}

	/// Broadcaster double that records what the client pushes into it, then delegates the
	/// actual send to whatever HTTP client it was last given.
	pub struct RecordingBroadcaster {
		/// Shared log, kept alive by the test after the broadcaster moves into a client.
		pub log: Arc<Mutex<BroadcastLog>>,
		config: Option<Config>,
		token: Option<Token>,
		http_client: Option<Arc<dyn ApiHttpClient>>,
	}
	impl RecordingBroadcaster {
		/// Creates a broadcaster tagged with `instance` and returns it with its log handle.
		pub fn new(instance: usize) -> (Self, Arc<Mutex<BroadcastLog>>) {
			let log = Arc::new(Mutex::new(BroadcastLog { instance, ..Default::default() }));
			let broadcaster =
				Self { log: Arc::clone(&log), config: None, token: None, http_client: None };

			(broadcaster, log)
		}
	}
	impl Debug for RecordingBroadcaster {
		fn fmt(&self, f: &mut Formatter) -> FmtResult {
			f.debug_struct("RecordingBroadcaster").field("log", &self.log).finish()
		}
	}
	impl Broadcaster for RecordingBroadcaster {
		fn set_http_client(&mut self, http_client: Arc<dyn ApiHttpClient>) {
			self.http_client = Some(http_client);
			self.log.lock().http_client_pushes += 1;
		}

		fn set_config(&mut self, config: Config) {
			self.log.lock().config = Some(config.clone());
			self.config = Some(config);
		}

		fn set_token(&mut self, token: Option<Token>) {
			self.log.lock().token = token.clone();
			self.token = token;
		}

		fn config(&self) -> Option<&Config> {
			self.config.as_ref()
		}

		fn token(&self) -> Option<&Token> {
			self.token.as_ref()
		}

		fn broadcast<'a>(
			&'a self,
			operations: &'a [&'a dyn Operation],
		) -> CallFuture<'a, BroadcastResponse> {
			let names = operations.iter().map(|op| op.name().map(str::to_owned)).collect();

			self.log.lock().broadcasts.push(names);

			Box::pin(async move {
				let Some(http_client) = self.http_client.as_ref() else {
					return Ok(BroadcastResponse { result: TransactionResult::default() });
				};
				let response =
					http_client.post_json(BROADCAST_PATH, encode_operations(operations)?).await?;

				response.parse()
			})
		}
	}

	/// Provider double that hands out fixed tokens and a deterministic authorize URL.
	#[derive(Debug)]
	pub struct StaticProvider {
		/// Application identifier captured from the config at build time.
		pub app_id: String,
		/// Build sequence number assigned by [`CountingProviderFactory`].
		pub generation: usize,
	}
	impl OAuthProvider for StaticProvider {
		fn authorization_url(&self, state: &str) -> Result<Url> {
			let mut url = Url::parse("https://auth.example/oauth2/authorize")
				.map_err(ConfigError::from)?;

			url.query_pairs_mut().append_pair("client_id", &self.app_id).append_pair("state", state);

			Ok(url)
		}

		fn exchange_code<'a>(&'a self, code: &'a str) -> CallFuture<'a, Token> {
			Box::pin(async move {
				Ok(Token::new(format!("access-for-{code}")).with_refresh_token("refresh-1"))
			})
		}

		fn refresh_token<'a>(&'a self, refresh_token: &'a TokenSecret) -> CallFuture<'a, Token> {
			Box::pin(async move {
				Ok(Token::new(format!("refreshed-by-{}", refresh_token.expose())))
			})
		}
	}

	/// Factory double that counts builds and validates the config like the real factory.
	#[derive(Debug, Default)]
	pub struct CountingProviderFactory {
		/// Number of providers built so far.
		pub builds: AtomicUsize,
	}
	impl CountingProviderFactory {
		/// Returns how many providers were built.
		pub fn build_count(&self) -> usize {
			self.builds.load(Ordering::SeqCst)
		}
	}
	impl ProviderFactory for CountingProviderFactory {
		fn build(&self, config: &Config) -> Result<Arc<dyn OAuthProvider>> {
			config.validate()?;

			let generation = self.builds.fetch_add(1, Ordering::SeqCst) + 1;

			Ok(Arc::new(StaticProvider { app_id: config.app_id.clone(), generation }))
		}
	}
}

mod _prelude {
	pub use std::{
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};

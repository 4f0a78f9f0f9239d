//! Authorization-code handshake orchestration.
//!
//! An [`AuthManager`] is produced per call by [`Client::auth`](crate::client::Client::auth)
//! and bound to the client's config, freshly rebuilt provider, and current token. The
//! handshake has three steps:
//!
//! 1. [`AuthManager::start`] generates an opaque `state` and the authorize URL to send the user
//!    to.
//! 2. The authorization page redirects to the configured redirect URI with `code` and `state`.
//! 3. [`AuthManager::complete`] checks the returned `state` and exchanges the code for a
//!    [`Token`], which the caller hands back to the client via `set_token`.

// crates.io
use rand::{Rng, distr::Alphanumeric};
// self
use crate::{
	_prelude::*,
	auth::Token,
	config::Config,
	error::ConfigError,
	obs::{self, CallKind, CallOutcome, CallSpan},
	provider::OAuthProvider,
};

const STATE_LEN: usize = 32;

/// Metadata for one pending authorization, returned by [`AuthManager::start`].
#[derive(Clone, Debug)]
pub struct AuthorizationRequest {
	/// Opaque state value that must round-trip via the redirect handler.
	pub state: String,
	/// Fully-formed authorize URL that callers should send end-users to.
	pub authorize_url: Url,
}
impl AuthorizationRequest {
	/// Validates the returned `state` parameter after the authorization redirect.
	pub fn validate_state(&self, returned_state: &str) -> Result<()> {
		if returned_state == self.state {
			Ok(())
		} else {
			Err(Error::InvalidGrant { reason: "Authorization state mismatch.".into() })
		}
	}
}

/// Drives the OAuth handshake against one provider snapshot.
#[derive(Clone)]
pub struct AuthManager {
	config: Config,
	provider: Arc<dyn OAuthProvider>,
	token: Option<Token>,
}
impl AuthManager {
	/// Binds a manager to the given config, provider, and current token.
	pub fn new(config: Config, provider: Arc<dyn OAuthProvider>, token: Option<Token>) -> Self {
		Self { config, provider, token }
	}

	/// Config the manager was bound to.
	pub fn config(&self) -> &Config {
		&self.config
	}

	/// Provider the manager delegates protocol work to.
	pub fn provider(&self) -> &Arc<dyn OAuthProvider> {
		&self.provider
	}

	/// Token held by the client when the manager was created.
	pub fn token(&self) -> Option<&Token> {
		self.token.as_ref()
	}

	/// Starts a handshake with a freshly generated `state`.
	pub fn start(&self) -> Result<AuthorizationRequest> {
		let state = random_state();
		let authorize_url = self.authorization_url(&state)?;

		Ok(AuthorizationRequest { state, authorize_url })
	}

	/// Builds the authorize URL for a caller-managed `state`.
	pub fn authorization_url(&self, state: &str) -> Result<Url> {
		self.provider.authorization_url(state)
	}

	/// Exchanges an authorization code for a token.
	pub async fn exchange_code(&self, code: &str) -> Result<Token> {
		const KIND: CallKind = CallKind::CodeExchange;

		let span = CallSpan::new(KIND, "auth.exchange_code");

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let result = span.instrument(self.provider.exchange_code(code)).await;

		obs::record_call_outcome(KIND, CallOutcome::from_result(&result));

		result
	}

	/// Validates the redirect's `state` and then exchanges its `code`.
	pub async fn complete(
		&self,
		request: &AuthorizationRequest,
		returned_state: &str,
		code: &str,
	) -> Result<Token> {
		request.validate_state(returned_state)?;

		self.exchange_code(code).await
	}

	/// Trades the held token's refresh secret for a new token.
	pub async fn refresh(&self) -> Result<Token> {
		const KIND: CallKind = CallKind::Refresh;

		let token = self.token.as_ref().ok_or(ConfigError::MissingToken)?;
		let refresh_token = token.refresh_token.as_ref().ok_or(ConfigError::MissingRefreshToken)?;
		let span = CallSpan::new(KIND, "auth.refresh");

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let result = span.instrument(self.provider.refresh_token(refresh_token)).await;

		obs::record_call_outcome(KIND, CallOutcome::from_result(&result));

		result
	}
}
impl Debug for AuthManager {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthManager")
			.field("config", &self.config)
			.field("token", &self.token)
			.finish_non_exhaustive()
	}
}

fn random_state() -> String {
	rand::rng().sample_iter(Alphanumeric).take(STATE_LEN).map(char::from).collect()
}

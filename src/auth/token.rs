//! Access token model.
//!
//! A [`Token`] is produced by the provider after a code exchange or refresh, or supplied
//! directly by the caller. The SDK never mutates a token in place; the client replaces it
//! wholesale through [`Client::set_token`](crate::client::Client::set_token).

// self
use crate::{_prelude::*, auth::ScopeSet};

/// Redacted secret wrapper keeping token material out of logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps a new secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("TokenSecret(<redacted>)")
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Lifecycle status of a token at a given instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenStatus {
	/// Token has no expiry or has not reached it.
	Active,
	/// Token reached its expiry instant.
	Expired,
}

/// Access token plus the optional metadata a provider returns with it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
	/// Bearer credential attached to API calls.
	pub access_token: TokenSecret,
	/// Refresh credential, issued when the `offline` scope was granted.
	#[serde(default)]
	pub refresh_token: Option<TokenSecret>,
	/// Instant the token was issued or handed to the SDK.
	pub issued_at: OffsetDateTime,
	/// Expiry instant, if the provider reported one.
	#[serde(default)]
	pub expires_at: Option<OffsetDateTime>,
	/// Scopes granted to the token, if the provider reported them.
	#[serde(default)]
	pub scope: Option<ScopeSet>,
	/// Account the token acts for, if the provider reported it.
	#[serde(default)]
	pub username: Option<String>,
}
impl Token {
	/// Wraps an access token issued now with no further metadata.
	pub fn new(access_token: impl Into<String>) -> Self {
		Self {
			access_token: TokenSecret::new(access_token),
			refresh_token: None,
			issued_at: OffsetDateTime::now_utc(),
			expires_at: None,
			scope: None,
			username: None,
		}
	}

	/// Attaches a refresh token.
	pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
		self.refresh_token = Some(TokenSecret::new(refresh_token));

		self
	}

	/// Overrides the issued-at instant.
	pub fn with_issued_at(mut self, instant: OffsetDateTime) -> Self {
		self.issued_at = instant;

		self
	}

	/// Sets an absolute expiry instant.
	pub fn with_expires_at(mut self, instant: OffsetDateTime) -> Self {
		self.expires_at = Some(instant);

		self
	}

	/// Sets the expiry relative to [`Token::issued_at`].
	pub fn with_expires_in(self, lifetime: Duration) -> Self {
		let expires_at = self.issued_at + lifetime;

		self.with_expires_at(expires_at)
	}

	/// Records the granted scopes.
	pub fn with_scope(mut self, scope: ScopeSet) -> Self {
		self.scope = Some(scope);

		self
	}

	/// Records the account the token acts for.
	pub fn with_username(mut self, username: impl Into<String>) -> Self {
		self.username = Some(username.into());

		self
	}

	/// Computes the lifecycle status at a given instant.
	pub fn status_at(&self, instant: OffsetDateTime) -> TokenStatus {
		match self.expires_at {
			Some(expires_at) if instant >= expires_at => TokenStatus::Expired,
			_ => TokenStatus::Active,
		}
	}

	/// Returns `true` if the token is expired relative to the current clock.
	pub fn is_expired(&self) -> bool {
		matches!(self.status_at(OffsetDateTime::now_utc()), TokenStatus::Expired)
	}

	/// Returns `true` if the token can be refreshed.
	pub fn is_refreshable(&self) -> bool {
		self.refresh_token.is_some()
	}
}
impl Debug for Token {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Token")
			.field("access_token", &"<redacted>")
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
			.field("issued_at", &self.issued_at)
			.field("expires_at", &self.expires_at)
			.field("scope", &self.scope)
			.field("username", &self.username)
			.finish()
	}
}
impl From<&str> for Token {
	fn from(access_token: &str) -> Self {
		Self::new(access_token)
	}
}
impl From<String> for Token {
	fn from(access_token: String) -> Self {
		Self::new(access_token)
	}
}

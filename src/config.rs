//! Connection and authorization settings shared by every collaborator.
//!
//! [`Config`] is plain data. Nothing is validated at construction time; the provider
//! factory calls [`Config::validate`] whenever the client rebuilds its provider, and the
//! authorization flow checks for a redirect URI only when it needs one.

// self
use crate::{_prelude::*, auth::ScopeSet, error::ConfigError};

/// Default SteemConnect host.
pub const DEFAULT_API_BASE: &str = "https://steemconnect.com";
/// Authorization page path, relative to the API base.
pub const AUTHORIZE_PATH: &str = "oauth2/authorize";
/// Token endpoint path, relative to the API base.
pub const TOKEN_PATH: &str = "api/oauth2/token";
/// Broadcast endpoint path, relative to the API base.
pub const BROADCAST_PATH: &str = "api/broadcast";

/// Preferred client authentication modes for token endpoint calls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientAuthMethod {
	/// Form POST body parameters for `client_id`/`client_secret`.
	#[default]
	ClientSecretPost,
	/// HTTP Basic with `client_id`/`client_secret`.
	ClientSecretBasic,
}

/// Settings for one application talking to one SteemConnect deployment.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
	/// OAuth client identifier (the SteemConnect application account).
	pub app_id: String,
	/// Optional client secret; required by the provider for offline (refresh) access.
	#[serde(default, skip_serializing)]
	pub client_secret: Option<String>,
	/// Callback URL the authorization page redirects back to.
	#[serde(default)]
	pub redirect_uri: Option<Url>,
	/// Base URL every endpoint path is resolved against.
	#[serde(default = "default_api_base")]
	pub api_base: Url,
	/// Scopes requested during authorization.
	#[serde(default)]
	pub scopes: ScopeSet,
	/// Character used to join scopes in the authorize URL.
	#[serde(default = "default_scope_delimiter")]
	pub scope_delimiter: char,
	/// How the client secret is presented to the token endpoint.
	#[serde(default)]
	pub client_auth: ClientAuthMethod,
}
impl Config {
	/// Creates a config for `app_id` against the default SteemConnect host.
	pub fn new(app_id: impl Into<String>) -> Self {
		Self {
			app_id: app_id.into(),
			client_secret: None,
			redirect_uri: None,
			api_base: default_api_base(),
			scopes: ScopeSet::default(),
			scope_delimiter: default_scope_delimiter(),
			client_auth: ClientAuthMethod::default(),
		}
	}

	/// Sets or replaces the client secret.
	pub fn with_client_secret(mut self, secret: impl Into<String>) -> Self {
		self.client_secret = Some(secret.into());

		self
	}

	/// Sets the authorization callback URL.
	pub fn with_redirect_uri(mut self, redirect_uri: Url) -> Self {
		self.redirect_uri = Some(redirect_uri);

		self
	}

	/// Points the config at another deployment.
	pub fn with_api_base(mut self, api_base: Url) -> Self {
		self.api_base = api_base;

		self
	}

	/// Replaces the requested scopes.
	pub fn with_scopes(mut self, scopes: ScopeSet) -> Self {
		self.scopes = scopes;

		self
	}

	/// Overrides the scope delimiter (defaults to `,`).
	pub fn with_scope_delimiter(mut self, delimiter: char) -> Self {
		self.scope_delimiter = delimiter;

		self
	}

	/// Overrides the client authentication method.
	pub fn with_client_auth(mut self, method: ClientAuthMethod) -> Self {
		self.client_auth = method;

		self
	}

	/// Checks the fields every collaborator relies on.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.app_id.trim().is_empty() {
			return Err(ConfigError::MissingAppId);
		}
		if !matches!(self.api_base.scheme(), "http" | "https") || self.api_base.cannot_be_a_base() {
			return Err(ConfigError::InvalidApiBase { url: self.api_base.to_string() });
		}
		if self.scope_delimiter.is_control() {
			return Err(ConfigError::InvalidScopeDelimiter { delimiter: self.scope_delimiter });
		}

		Ok(())
	}

	/// Resolves `path` against [`Config::api_base`].
	///
	/// The base is treated as a directory, so `https://host/sc2` and `https://host/sc2/`
	/// both resolve `api/broadcast` to `https://host/sc2/api/broadcast`.
	pub fn endpoint(&self, path: &str) -> Result<Url, ConfigError> {
		let mut base = self.api_base.clone();

		if !base.path().ends_with('/') {
			let dir = format!("{}/", base.path());

			base.set_path(&dir);
		}

		Ok(base.join(path.trim_start_matches('/'))?)
	}

	/// Returns the redirect URI or [`ConfigError::MissingRedirectUri`].
	pub fn require_redirect_uri(&self) -> Result<&Url, ConfigError> {
		self.redirect_uri.as_ref().ok_or(ConfigError::MissingRedirectUri)
	}

	/// Scopes joined with [`Config::scope_delimiter`], or `None` when no scope is requested.
	pub fn scope_param(&self) -> Option<String> {
		if self.scopes.is_empty() { None } else { Some(self.scopes.join(self.scope_delimiter)) }
	}
}
impl Debug for Config {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Config")
			.field("app_id", &self.app_id)
			.field("client_secret_set", &self.client_secret.is_some())
			.field("redirect_uri", &self.redirect_uri.as_ref().map(Url::as_str))
			.field("api_base", &self.api_base.as_str())
			.field("scopes", &self.scopes)
			.field("scope_delimiter", &self.scope_delimiter)
			.field("client_auth", &self.client_auth)
			.finish()
	}
}

fn default_api_base() -> Url {
	Url::parse(DEFAULT_API_BASE).expect("Default API base URL is a valid constant.")
}

fn default_scope_delimiter() -> char {
	','
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn url(value: &str) -> Url {
		Url::parse(value).expect("Test URL should parse.")
	}

	#[test]
	fn endpoints_resolve_against_bases_with_and_without_paths() {
		let root = Config::new("app1").with_api_base(url("https://api.example"));

		assert_eq!(
			root.endpoint(BROADCAST_PATH).expect("Root endpoint should resolve.").as_str(),
			"https://api.example/api/broadcast"
		);

		let nested = Config::new("app1").with_api_base(url("https://host.example/sc2"));

		assert_eq!(
			nested.endpoint("/api/oauth2/token").expect("Nested endpoint should resolve.").as_str(),
			"https://host.example/sc2/api/oauth2/token"
		);
	}

	#[test]
	fn validation_rejects_structurally_invalid_configs() {
		assert!(Config::new("app1").validate().is_ok());
		assert!(matches!(Config::new("  ").validate(), Err(ConfigError::MissingAppId)));
		assert!(matches!(
			Config::new("app1").with_api_base(url("ftp://api.example")).validate(),
			Err(ConfigError::InvalidApiBase { .. })
		));
		assert!(matches!(
			Config::new("app1").with_api_base(url("mailto:ops@example.com")).validate(),
			Err(ConfigError::InvalidApiBase { .. })
		));
		assert!(matches!(
			Config::new("app1").with_scope_delimiter('\n').validate(),
			Err(ConfigError::InvalidScopeDelimiter { delimiter: '\n' })
		));
	}

	#[test]
	fn scope_param_uses_the_configured_delimiter() {
		let scopes = ScopeSet::new(["vote", "comment"]).expect("Scope fixture should be valid.");
		let config = Config::new("app1").with_scopes(scopes);

		assert_eq!(config.scope_param().as_deref(), Some("comment,vote"));
		assert_eq!(config.with_scope_delimiter(' ').scope_param().as_deref(), Some("comment vote"));
		assert_eq!(Config::new("app1").scope_param(), None);
	}

	#[test]
	fn debug_and_serialization_hide_the_secret() {
		let config = Config::new("app1").with_client_secret("hunter2");
		let debug = format!("{config:?}");
		let json = serde_json::to_string(&config).expect("Config should serialize.");

		assert!(!debug.contains("hunter2"));
		assert!(!json.contains("hunter2"));
	}

	#[test]
	fn deserialization_fills_defaults() {
		let config: Config = serde_json::from_str(r#"{"app_id":"app1","scopes":["vote"]}"#)
			.expect("Minimal config should deserialize.");

		assert_eq!(config.api_base.as_str(), "https://steemconnect.com/");
		assert_eq!(config.scope_delimiter, ',');
		assert_eq!(config.client_auth, ClientAuthMethod::ClientSecretPost);
		assert!(config.scopes.contains("vote"));
		assert!(config.require_redirect_uri().is_err());
	}
}

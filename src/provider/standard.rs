//! Provider built on the `oauth2` crate's authorization-code client.

// crates.io
use oauth2::{
	AuthType, AuthUrl, AuthorizationCode, ClientId, ClientSecret, EndpointNotSet, EndpointSet,
	ExtraTokenFields, HttpClientError, RedirectUrl, RefreshToken, RequestTokenError,
	StandardRevocableToken, StandardTokenResponse, TokenResponse, TokenUrl,
	basic::{
		BasicErrorResponse, BasicRevocationErrorResponse, BasicTokenIntrospectionResponse,
		BasicTokenType,
	},
};
// self
use crate::{
	_prelude::*,
	auth::{ScopeSet, Token, TokenSecret},
	config::{AUTHORIZE_PATH, ClientAuthMethod, Config, TOKEN_PATH},
	error::{ApiError, ConfigError, TransportError},
	http::{CallFuture, ResponseMetadata, ResponseMetadataSlot, TokenHttpClient},
	provider::OAuthProvider,
};

/// Non-standard fields SteemConnect adds to token responses.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountFields {
	/// Account the issued token acts for.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub username: Option<String>,
}
impl ExtraTokenFields for AccountFields {}

type ProviderTokenResponse = StandardTokenResponse<AccountFields, BasicTokenType>;
type ConfiguredClient = oauth2::Client<
	BasicErrorResponse,
	ProviderTokenResponse,
	BasicTokenIntrospectionResponse,
	StandardRevocableToken,
	BasicRevocationErrorResponse,
	EndpointSet,
	EndpointNotSet,
	EndpointNotSet,
	EndpointNotSet,
	EndpointSet,
>;

/// [`OAuthProvider`] backed by an `oauth2` client and a [`TokenHttpClient`] transport.
pub struct StandardProvider<C>
where
	C: TokenHttpClient,
{
	oauth_client: ConfiguredClient,
	authorize_endpoint: Url,
	app_id: String,
	redirect_uri: Option<Url>,
	scope: Option<String>,
	http_client: Arc<C>,
}
impl<C> StandardProvider<C>
where
	C: TokenHttpClient,
{
	/// Validates `config` and snapshots everything the provider needs from it.
	pub fn from_config(config: &Config, http_client: impl Into<Arc<C>>) -> Result<Self> {
		config.validate()?;

		let authorize_endpoint = config.endpoint(AUTHORIZE_PATH)?;
		let token_endpoint = config.endpoint(TOKEN_PATH)?;
		let mut oauth_client: ConfiguredClient =
			oauth2::Client::new(ClientId::new(config.app_id.clone()))
				.set_auth_uri(AuthUrl::from_url(authorize_endpoint.clone()))
				.set_token_uri(TokenUrl::from_url(token_endpoint));

		if let Some(secret) = &config.client_secret {
			oauth_client = oauth_client.set_client_secret(ClientSecret::new(secret.clone()));
		}
		if let Some(redirect) = &config.redirect_uri {
			oauth_client = oauth_client.set_redirect_uri(RedirectUrl::from_url(redirect.clone()));
		}
		if matches!(config.client_auth, ClientAuthMethod::ClientSecretPost) {
			oauth_client = oauth_client.set_auth_type(AuthType::RequestBody);
		}

		Ok(Self {
			oauth_client,
			authorize_endpoint,
			app_id: config.app_id.clone(),
			redirect_uri: config.redirect_uri.clone(),
			scope: config.scope_param(),
			http_client: http_client.into(),
		})
	}
}
impl<C> OAuthProvider for StandardProvider<C>
where
	C: TokenHttpClient,
{
	fn authorization_url(&self, state: &str) -> Result<Url> {
		let redirect_uri = self.redirect_uri.as_ref().ok_or(ConfigError::MissingRedirectUri)?;
		let mut url = self.authorize_endpoint.clone();
		let mut pairs = url.query_pairs_mut();

		pairs.append_pair("response_type", "code");
		pairs.append_pair("client_id", &self.app_id);
		pairs.append_pair("redirect_uri", redirect_uri.as_str());

		if let Some(scope) = &self.scope {
			pairs.append_pair("scope", scope);
		}

		pairs.append_pair("state", state);

		drop(pairs);

		Ok(url)
	}

	fn exchange_code<'a>(&'a self, code: &'a str) -> CallFuture<'a, Token> {
		let meta = ResponseMetadataSlot::default();

		Box::pin(async move {
			let handle = self.http_client.with_metadata(meta.clone());
			let response = self
				.oauth_client
				.exchange_code(AuthorizationCode::new(code.to_owned()))
				.request_async(&handle)
				.await
				.map_err(|err| map_request_error(meta.take(), err))?;

			token_from_response(&response)
		})
	}

	fn refresh_token<'a>(&'a self, refresh_token: &'a TokenSecret) -> CallFuture<'a, Token> {
		let meta = ResponseMetadataSlot::default();

		Box::pin(async move {
			let handle = self.http_client.with_metadata(meta.clone());
			let secret = RefreshToken::new(refresh_token.expose().to_owned());
			let response = self
				.oauth_client
				.exchange_refresh_token(&secret)
				.request_async(&handle)
				.await
				.map_err(|err| map_request_error(meta.take(), err))?;
			let token = token_from_response(&response)?;

			// Providers may omit the refresh token when it does not rotate.
			if token.refresh_token.is_none() {
				return Ok(token.with_refresh_token(refresh_token.expose()));
			}

			Ok(token)
		})
	}
}
impl<C> Debug for StandardProvider<C>
where
	C: TokenHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("StandardProvider")
			.field("app_id", &self.app_id)
			.field("authorize_endpoint", &self.authorize_endpoint.as_str())
			.field("redirect_uri", &self.redirect_uri.as_ref().map(Url::as_str))
			.field("scope", &self.scope)
			.finish_non_exhaustive()
	}
}

fn token_from_response(response: &ProviderTokenResponse) -> Result<Token> {
	let mut token = Token::new(response.access_token().secret().to_owned());

	if let Some(lifetime) = response.expires_in() {
		let secs = i64::try_from(lifetime.as_secs()).map_err(|_| ConfigError::ExpiresInOutOfRange)?;
		let expires_at = token
			.issued_at
			.checked_add(Duration::seconds(secs))
			.ok_or(ConfigError::ExpiresInOutOfRange)?;

		token = token.with_expires_at(expires_at);
	}
	if let Some(refresh) = response.refresh_token() {
		token = token.with_refresh_token(refresh.secret().to_owned());
	}
	if let Some(scopes) = response.scopes() {
		let raw = scopes.iter().map(|scope| scope.as_str()).collect::<Vec<_>>().join(" ");

		token = token.with_scope(ScopeSet::parse_delimited(&raw).map_err(ConfigError::from)?);
	}
	if let Some(username) = &response.extra_fields().username {
		token = token.with_username(username.clone());
	}

	Ok(token)
}

fn map_request_error<E>(
	meta: Option<ResponseMetadata>,
	err: RequestTokenError<HttpClientError<E>, BasicErrorResponse>,
) -> Error
where
	E: 'static + Send + Sync + StdError,
{
	let status = meta.and_then(|value| value.status);

	match err {
		RequestTokenError::ServerResponse(response) => map_server_response_error(response, status),
		RequestTokenError::Request(error) => map_transport_error(error, status),
		RequestTokenError::Parse(source, _body) =>
			ApiError::MalformedResponse { source, status }.into(),
		RequestTokenError::Other(message) => ApiError::Unexpected { message, status }.into(),
	}
}

fn map_server_response_error(response: BasicErrorResponse, status: Option<u16>) -> Error {
	let code = response.error().as_ref().to_owned();
	let description = response.error_description().cloned();
	let reason = description.clone().unwrap_or_else(|| code.clone());

	match code.as_str() {
		"invalid_grant" => Error::InvalidGrant { reason },
		"invalid_client" | "unauthorized_client" => Error::InvalidClient { reason },
		_ => ApiError::OAuth { error: code, description, status }.into(),
	}
}

fn map_transport_error<E>(err: HttpClientError<E>, status: Option<u16>) -> Error
where
	E: 'static + Send + Sync + StdError,
{
	match err {
		HttpClientError::Reqwest(inner) => TransportError::network(*inner).into(),
		HttpClientError::Http(inner) => ConfigError::from(inner).into(),
		HttpClientError::Io(inner) => TransportError::Io(inner).into(),
		HttpClientError::Other(message) => ApiError::Unexpected { message, status }.into(),
		_ => ApiError::Unexpected {
			message: "HTTP client error occurred while calling the token endpoint".into(),
			status,
		}
		.into(),
	}
}

//! reqwest-backed implementations of the HTTP collaborators.

// std
use std::ops::Deref;
// crates.io
use oauth2::{AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue, RETRY_AFTER};
use time::format_description::well_known::Rfc2822;
// self
use crate::{
	_prelude::*,
	auth::Token,
	config::Config,
	error::{ApiError, ConfigError, TransportError},
	http::{
		ApiHttpClient, ApiResponse, CallFuture, ResponseMetadata, ResponseMetadataSlot,
		TokenHttpClient,
	},
};

const JSON: &str = "application/json";

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// One instance backs both the API client and every provider the client facade rebuilds,
/// so they share a connection pool. Token requests should not follow redirects; configure
/// any custom [`ReqwestClient`] accordingly.
#[derive(Clone, Debug, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
impl TokenHttpClient for ReqwestHttpClient {
	type Handle = InstrumentedHandle;
	type TransportError = ReqwestError;

	fn with_metadata(&self, slot: ResponseMetadataSlot) -> Self::Handle {
		InstrumentedHandle(Arc::new(InstrumentedHttpClient { client: self.0.clone(), slot }))
	}
}

struct InstrumentedHttpClient {
	client: ReqwestClient,
	slot: ResponseMetadataSlot,
}

/// Handle returned by [`ReqwestHttpClient`] that satisfies [`TokenHttpClient`].
#[derive(Clone)]
pub struct InstrumentedHandle(Arc<InstrumentedHttpClient>);
impl<'c> AsyncHttpClient<'c> for InstrumentedHandle {
	type Error = HttpClientError<ReqwestError>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send + Sync>>;

	fn call(&'c self, request: HttpRequest) -> Self::Future {
		let inner = Arc::clone(&self.0);

		Box::pin(async move {
			inner.slot.take();

			let response = inner
				.client
				.execute(request.try_into().map_err(Box::new)?)
				.await
				.map_err(Box::new)?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let retry_after = parse_retry_after(&headers);

			inner.slot.store(ResponseMetadata { status: Some(status.as_u16()), retry_after });

			let mut converted =
				HttpResponse::new(response.bytes().await.map_err(Box::new)?.to_vec());

			*converted.status_mut() = status;
			*converted.headers_mut() = headers;

			Ok(converted)
		})
	}
}

#[derive(Debug)]
struct ApiState {
	config: Config,
	token: Option<Token>,
}

/// Default [`ApiHttpClient`]: JSON over reqwest with the raw access token in the
/// `Authorization` header.
pub struct ReqwestApiClient {
	transport: ReqwestHttpClient,
	state: RwLock<ApiState>,
}
impl ReqwestApiClient {
	/// Creates a client for `config`, optionally already authenticated with `token`.
	pub fn new(config: Config, token: Option<Token>, transport: ReqwestHttpClient) -> Self {
		Self { transport, state: RwLock::new(ApiState { config, token }) }
	}

	/// Underlying transport.
	pub fn transport(&self) -> &ReqwestHttpClient {
		&self.transport
	}
}
impl Debug for ReqwestApiClient {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let state = self.state.read();

		f.debug_struct("ReqwestApiClient")
			.field("config", &state.config)
			.field("authenticated", &state.token.is_some())
			.finish()
	}
}
impl ApiHttpClient for ReqwestApiClient {
	fn set_config(&self, config: Config) {
		self.state.write().config = config;
	}

	fn set_access_token(&self, token: Option<Token>) {
		self.state.write().token = token;
	}

	fn config(&self) -> Config {
		self.state.read().config.clone()
	}

	fn access_token(&self) -> Option<Token> {
		self.state.read().token.clone()
	}

	fn post_json<'a>(
		&'a self,
		path: &'a str,
		payload: serde_json::Value,
	) -> CallFuture<'a, ApiResponse> {
		// Snapshot the state so no lock guard lives across an await point.
		let (url, token) = {
			let state = self.state.read();

			(state.config.endpoint(path), state.token.clone())
		};

		Box::pin(async move {
			let url = url?;
			let body = serde_json::to_vec(&payload)
				.map_err(|source| ConfigError::PayloadEncode { source })?;
			let mut request = self
				.transport
				.post(url)
				.header(CONTENT_TYPE, JSON)
				.header(ACCEPT, JSON)
				.body(body);

			if let Some(token) = &token {
				let value = HeaderValue::from_str(token.access_token.expose())
					.map_err(|source| ConfigError::InvalidAccessToken { source })?;

				request = request.header(AUTHORIZATION, value);
			}

			let response = request.send().await.map_err(map_send_error)?;
			let status = response.status().as_u16();
			let retry_after = parse_retry_after(response.headers());
			let body = response.bytes().await.map_err(TransportError::from)?.to_vec();

			if !(200..300).contains(&status) {
				return Err(ApiError::from_body(status, &body, retry_after).into());
			}

			Ok(ApiResponse::new(status, body))
		})
	}
}

fn map_send_error(err: ReqwestError) -> Error {
	if err.is_builder() {
		return ConfigError::from(err).into();
	}

	TransportError::from(err).into()
}

fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
	let value = headers.get(RETRY_AFTER)?;
	let raw = value.to_str().ok()?.trim();

	if let Ok(secs) = raw.parse::<u64>() {
		return Some(Duration::seconds(i64::try_from(secs).ok()?));
	}
	if let Ok(moment) = OffsetDateTime::parse(raw, &Rfc2822) {
		let delta = moment - OffsetDateTime::now_utc();

		if delta.is_positive() {
			return Some(delta);
		}
	}

	None
}

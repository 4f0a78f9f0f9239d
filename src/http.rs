//! HTTP collaborators.
//!
//! Two seams live here:
//!
//! - [`ApiHttpClient`] performs authenticated JSON calls against the SteemConnect API. It is
//!   configured from a [`Config`] and an optional [`Token`], and exposes in-place setters so
//!   the [`Client`](crate::client::Client) can push fresh state into a long-lived instance
//!   without discarding it.
//! - [`TokenHttpClient`] adapts a transport into `oauth2` [`AsyncHttpClient`] handles for the
//!   token endpoint. Each handle carries a [`ResponseMetadataSlot`]; implementations call
//!   [`ResponseMetadataSlot::take`] before dispatching a request and
//!   [`ResponseMetadataSlot::store`] once an HTTP status or retry hint is known, so token
//!   errors can be classified with consistent metadata.

#[cfg(feature = "reqwest")] mod transport;
#[cfg(feature = "reqwest")] pub use transport::*;

// crates.io
use oauth2::{AsyncHttpClient, HttpClientError};
use serde::de::DeserializeOwned;
// self
use crate::{_prelude::*, auth::Token, config::Config, error::ApiError};

/// Boxed `Send` future returned by collaborator calls.
pub type CallFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + 'a + Send>>;

/// Authenticated JSON client for the SteemConnect API.
///
/// Implementations keep their own view of the config and token. The client facade keeps
/// that view current through [`ApiHttpClient::set_config`] and
/// [`ApiHttpClient::set_access_token`] before each call, and shares the instance with the
/// broadcaster behind an [`Arc`], which is why the setters take `&self`.
pub trait ApiHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Replaces the config requests are resolved against.
	fn set_config(&self, config: Config);

	/// Replaces (or clears) the token attached to requests.
	fn set_access_token(&self, token: Option<Token>);

	/// Current config view.
	fn config(&self) -> Config;

	/// Current token view.
	fn access_token(&self) -> Option<Token>;

	/// POSTs `payload` as JSON to `path`, resolved against the current config's API base.
	///
	/// Non-success statuses surface as [`ApiError::Status`]; network failures surface as
	/// [`TransportError`](crate::error::TransportError).
	fn post_json<'a>(&'a self, path: &'a str, payload: serde_json::Value)
	-> CallFuture<'a, ApiResponse>;
}

/// Successful raw response from the API.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiResponse {
	/// HTTP status code.
	pub status: u16,
	/// Raw response body.
	pub body: Vec<u8>,
}
impl ApiResponse {
	/// Wraps a status and body.
	pub fn new(status: u16, body: Vec<u8>) -> Self {
		Self { status, body }
	}

	/// Deserializes the body, reporting the failing JSON path on mismatch.
	pub fn parse<T>(&self) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let mut de = serde_json::Deserializer::from_slice(&self.body);

		serde_path_to_error::deserialize(&mut de).map_err(|source| {
			ApiError::MalformedResponse { source, status: Some(self.status) }.into()
		})
	}
}

/// Abstraction over HTTP transports capable of executing OAuth token exchanges while
/// publishing response metadata for error classification.
///
/// Implementations must be `Send + Sync + 'static` so a single transport can back every
/// provider the client rebuilds, and the handles they return must own whatever state is
/// required so their request futures remain `Send`.
pub trait TokenHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;

	/// [`AsyncHttpClient`] handle tied to a [`ResponseMetadataSlot`].
	type Handle: for<'c> AsyncHttpClient<
			'c,
			Error = HttpClientError<Self::TransportError>,
			Future: 'c + Send,
		>
		+ 'static
		+ Send
		+ Sync;

	/// Builds an [`AsyncHttpClient`] handle that records outcomes in `slot`.
	fn with_metadata(&self, slot: ResponseMetadataSlot) -> Self::Handle;
}

/// Captures metadata from the most recent HTTP response for downstream error mapping.
#[derive(Clone, Debug, Default)]
pub struct ResponseMetadata {
	/// HTTP status code returned by the endpoint, if available.
	pub status: Option<u16>,
	/// Retry-After hint expressed as a relative duration.
	pub retry_after: Option<Duration>,
}

/// Thread-safe slot for sharing [`ResponseMetadata`] between transport and error layers.
#[derive(Clone, Debug, Default)]
pub struct ResponseMetadataSlot(Arc<Mutex<Option<ResponseMetadata>>>);
impl ResponseMetadataSlot {
	/// Stores new metadata for the current request.
	pub fn store(&self, meta: ResponseMetadata) {
		*self.0.lock() = Some(meta);
	}

	/// Returns the captured metadata, if any, consuming it from the slot.
	pub fn take(&self) -> Option<ResponseMetadata> {
		self.0.lock().take()
	}
}

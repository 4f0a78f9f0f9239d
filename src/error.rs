//! SDK-level error types shared by the client facade and its collaborators.

// self
use crate::_prelude::*;

/// SDK-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical SDK error exposed by public APIs.
///
/// The [`Client`](crate::client::Client) never wraps collaborator failures, so the variant a
/// caller observes is the one the provider, HTTP client, or broadcaster produced.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// The remote API answered, but not with a usable success response.
	#[error(transparent)]
	Api(#[from] ApiError),

	/// Provider rejected the grant (e.g., bad code or refresh token).
	#[error("Provider rejected the grant: {reason}.")]
	InvalidGrant {
		/// Provider- or SDK-supplied reason string.
		reason: String,
	},
	/// Client authentication failed or credentials are malformed.
	#[error("Client authentication failed: {reason}.")]
	InvalidClient {
		/// Provider-supplied reason string.
		reason: String,
	},
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// The application identifier is empty.
	#[error("Application identifier must not be empty.")]
	MissingAppId,
	/// The API base URL cannot serve as a base for endpoint paths.
	#[error("API base URL must be an absolute http(s) URL: {url}.")]
	InvalidApiBase {
		/// Offending URL.
		url: String,
	},
	/// An endpoint URL could not be derived or parsed.
	#[error("Endpoint URL is invalid.")]
	InvalidEndpoint {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// The authorization flow needs a redirect URI but none is configured.
	#[error("Redirect URI is required for the authorization flow.")]
	MissingRedirectUri,
	/// Scope delimiters must be printable.
	#[error("Scope delimiter must be a printable character.")]
	InvalidScopeDelimiter {
		/// Invalid delimiter that was supplied.
		delimiter: char,
	},
	/// Scopes cannot be normalized.
	#[error("Scopes are invalid.")]
	InvalidScope(#[from] crate::auth::ScopeValidationError),
	/// Refreshing requires a token but none is held.
	#[error("No access token is available.")]
	MissingToken,
	/// The access token cannot be sent as an `Authorization` header value.
	#[error("Access token contains characters not allowed in an HTTP header.")]
	InvalidAccessToken {
		/// Underlying header validation failure.
		#[source]
		source: oauth2::http::header::InvalidHeaderValue,
	},
	/// The held token carries no refresh secret.
	#[error("Token is missing a refresh token.")]
	MissingRefreshToken,
	/// Token endpoint returned an excessively large `expires_in`.
	#[error("The expires_in value exceeds the supported range.")]
	ExpiresInOutOfRange,
	/// An operation reached the broadcaster without a name.
	#[error("Operation at index {index} has no name.")]
	UnnamedOperation {
		/// Position of the operation in the broadcast list.
		index: usize,
	},
	/// Operation parameters could not be encoded as JSON.
	#[error("Operation at index {index} could not be encoded.")]
	OperationEncode {
		/// Position of the operation in the broadcast list.
		index: usize,
		/// Underlying serialization failure.
		#[source]
		source: serde_json::Error,
	},
	/// A request payload could not be encoded as JSON.
	#[error("Request payload could not be encoded.")]
	PayloadEncode {
		/// Underlying serialization failure.
		#[source]
		source: serde_json::Error,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
impl From<url::ParseError> for ConfigError {
	fn from(source: url::ParseError) -> Self {
		Self::InvalidEndpoint { source }
	}
}

/// Failures reported by a reachable remote endpoint.
#[derive(Debug, ThisError)]
pub enum ApiError {
	/// Endpoint answered with a non-success status.
	#[error("API returned HTTP {status}{}.", describe(.error, .description))]
	Status {
		/// HTTP status code.
		status: u16,
		/// Machine-readable `error` field, when the body carried one.
		error: Option<String>,
		/// Human-readable `error_description` field, when the body carried one.
		description: Option<String>,
		/// Retry-After hint from upstream, if supplied.
		retry_after: Option<Duration>,
	},
	/// OAuth endpoint returned an error code the SDK does not classify further.
	#[error("Token endpoint returned an OAuth error: {error}.")]
	OAuth {
		/// OAuth `error` code.
		error: String,
		/// OAuth `error_description`, if any.
		description: Option<String>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Endpoint responded with JSON that does not match the expected shape.
	#[error("API returned malformed JSON.")]
	MalformedResponse {
		/// Structured parsing failure, including the JSON path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Any other unexpected response.
	#[error("API returned an unexpected response: {message}.")]
	Unexpected {
		/// Summary of the failure.
		message: String,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
}
impl ApiError {
	/// Returns the HTTP status attached to the failure, if known.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Status { status, .. } => Some(*status),
			Self::OAuth { status, .. }
			| Self::MalformedResponse { status, .. }
			| Self::Unexpected { status, .. } => *status,
		}
	}

	/// Builds a [`ApiError::Status`] from a raw error body, lifting OAuth-style
	/// `error`/`error_description` fields when the body is JSON.
	pub fn from_body(status: u16, body: &[u8], retry_after: Option<Duration>) -> Self {
		#[derive(Deserialize)]
		struct ErrorBody {
			error: Option<String>,
			error_description: Option<String>,
		}

		let (error, description) = serde_json::from_slice::<ErrorBody>(body)
			.map(|b| (b.error, b.error_description))
			.unwrap_or_default();

		Self::Status { status, error, description, retry_after }
	}
}

fn describe(error: &Option<String>, description: &Option<String>) -> String {
	match (error, description) {
		(_, Some(description)) => format!(": {description}"),
		(Some(error), None) => format!(": {error}"),
		(None, None) => String::new(),
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the API.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the API.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

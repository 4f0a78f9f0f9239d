//! OAuth 2.0 provider collaborators.
//!
//! A provider is cheap and immutable once built: the client facade throws it away and asks
//! its [`ProviderFactory`] for a new one whenever it needs authorization to reflect the
//! current [`Config`].

mod standard;

pub use standard::*;

// self
use crate::{
	_prelude::*,
	auth::{Token, TokenSecret},
	config::Config,
	http::{CallFuture, TokenHttpClient},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

/// Authorization URL construction and token exchanges for one config snapshot.
pub trait OAuthProvider
where
	Self: Send + Sync,
{
	/// Builds the authorize URL the end-user is sent to, carrying `state`.
	fn authorization_url(&self, state: &str) -> Result<Url>;

	/// Exchanges an authorization code for a token.
	fn exchange_code<'a>(&'a self, code: &'a str) -> CallFuture<'a, Token>;

	/// Trades a refresh secret for a new token.
	fn refresh_token<'a>(&'a self, refresh_token: &'a TokenSecret) -> CallFuture<'a, Token>;
}

/// Builds providers from a config; the client calls it on every provider refresh.
pub trait ProviderFactory
where
	Self: Send + Sync,
{
	/// Builds a provider bound to `config`, failing with a config error when the config is
	/// structurally invalid.
	fn build(&self, config: &Config) -> Result<Arc<dyn OAuthProvider>>;
}
impl<F> ProviderFactory for F
where
	F: Send + Sync + Fn(&Config) -> Result<Arc<dyn OAuthProvider>>,
{
	fn build(&self, config: &Config) -> Result<Arc<dyn OAuthProvider>> {
		self(config)
	}
}

/// Factory for [`StandardProvider`]s that all share one transport.
#[derive(Debug)]
pub struct StandardProviderFactory<C>
where
	C: TokenHttpClient,
{
	http_client: Arc<C>,
}
impl<C> StandardProviderFactory<C>
where
	C: TokenHttpClient,
{
	/// Creates a factory handing `http_client` to every provider it builds.
	pub fn new(http_client: impl Into<Arc<C>>) -> Self {
		Self { http_client: http_client.into() }
	}
}
impl<C> ProviderFactory for StandardProviderFactory<C>
where
	C: TokenHttpClient,
{
	fn build(&self, config: &Config) -> Result<Arc<dyn OAuthProvider>> {
		let provider = StandardProvider::<C>::from_config(config, Arc::clone(&self.http_client))?;

		Ok(Arc::new(provider))
	}
}

#[cfg(feature = "reqwest")]
/// Provider factory specialized for the crate's default reqwest transport.
pub type ReqwestProviderFactory = StandardProviderFactory<ReqwestHttpClient>;

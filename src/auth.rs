//! Auth-domain models and the authorization handshake.

pub mod manager;
pub mod scope;
pub mod token;

pub use manager::*;
pub use scope::{ScopeSet, ScopeValidationError, known};
pub use token::*;

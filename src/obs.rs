//! Optional observability helpers for SDK calls.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `steemconnect.call` with the `call` and
//!   `stage` (call site) fields, plus `debug` events whenever the client refreshes a
//!   collaborator.
//! - Enable `metrics` to increment the `steemconnect_call_total` counter for every
//!   attempt/success/failure, labeled by `call` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Remote calls observed by the SDK.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallKind {
	/// Authorization code exchanged for a token.
	CodeExchange,
	/// Refresh token traded for a new token.
	Refresh,
	/// Operations posted to the broadcast endpoint.
	Broadcast,
}
impl CallKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallKind::CodeExchange => "code_exchange",
			CallKind::Refresh => "refresh",
			CallKind::Broadcast => "broadcast",
		}
	}
}
impl Display for CallKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallOutcome {
	/// Entry to an SDK call.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl CallOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallOutcome::Attempt => "attempt",
			CallOutcome::Success => "success",
			CallOutcome::Failure => "failure",
		}
	}

	/// Maps a finished call's result to [`CallOutcome::Success`] or [`CallOutcome::Failure`].
	pub fn from_result<T, E>(result: &Result<T, E>) -> Self {
		if result.is_ok() { CallOutcome::Success } else { CallOutcome::Failure }
	}
}
impl Display for CallOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

//! Broadcastable operations and the naming capability they share.
//!
//! Every operation embeds an [`OperationName`] and exposes it through [`Named`]. The
//! broadcaster reads the name to build each `[name, params]` pair, so an operation whose
//! name was never set cannot be broadcast. Concrete operations start out with their
//! canonical chain name, and [`Named::set_name`] accepts any string to target operations
//! this crate does not model.

mod comment;
mod custom_json;
mod reward;
mod vote;

pub use comment::*;
pub use custom_json::*;
pub use reward::*;
pub use vote::*;

// self
use crate::_prelude::*;

/// Name slot embedded in every operation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct OperationName(Option<String>);
impl OperationName {
	/// Creates a slot holding `name`.
	pub fn new(name: impl Into<String>) -> Self {
		Self(Some(name.into()))
	}

	/// Current name, if any.
	pub fn get(&self) -> Option<&str> {
		self.0.as_deref()
	}

	/// Replaces the name.
	pub fn set(&mut self, name: impl Into<String>) {
		self.0 = Some(name.into());
	}
}

/// Capability of carrying a canonical operation name.
pub trait Named {
	/// Embedded name slot.
	fn name_tag(&self) -> &OperationName;

	/// Mutable access to the embedded name slot.
	fn name_tag_mut(&mut self) -> &mut OperationName;

	/// Current name, if any.
	fn name(&self) -> Option<&str> {
		self.name_tag().get()
	}

	/// Replaces the name; any string is accepted.
	fn set_name(&mut self, name: impl Into<String>) -> &mut Self
	where
		Self: Sized,
	{
		self.name_tag_mut().set(name);

		self
	}
}

/// A named payload the broadcaster can encode as `[name, params]`.
///
/// Implemented for every [`Named`] + [`Serialize`] type; the serialized form of the value is
/// its parameter object, so the name field itself should be `#[serde(skip)]`.
pub trait Operation
where
	Self: Named + Debug + Send + Sync,
{
	/// Parameter object sent next to the name.
	fn params(&self) -> serde_json::Result<serde_json::Value>;
}
impl<T> Operation for T
where
	T: Named + Serialize + Debug + Send + Sync,
{
	fn params(&self) -> serde_json::Result<serde_json::Value> {
		serde_json::to_value(self)
	}
}

/// Operation with caller-supplied name and parameters.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RawOperation {
	#[serde(skip)]
	name: OperationName,
	params: serde_json::Value,
}
impl RawOperation {
	/// Creates an operation named `name` carrying `params` verbatim.
	pub fn new(name: impl Into<String>, params: serde_json::Value) -> Self {
		Self { name: OperationName::new(name), params }
	}

	/// Creates an operation without a name; one must be set before broadcasting.
	pub fn unnamed(params: serde_json::Value) -> Self {
		Self { name: OperationName::default(), params }
	}
}
impl Named for RawOperation {
	fn name_tag(&self) -> &OperationName {
		&self.name
	}

	fn name_tag_mut(&mut self) -> &mut OperationName {
		&mut self.name
	}
}

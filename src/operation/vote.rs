// self
use crate::{
	_prelude::*,
	operation::{Named, OperationName},
};

/// Upvote (positive weight) or downvote (negative weight) on a post or comment.
///
/// `weight` is expressed in basis points, `10_000` being a full upvote.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Vote {
	#[serde(skip)]
	name: OperationName,
	/// Account casting the vote.
	pub voter: String,
	/// Author of the voted content.
	pub author: String,
	/// Permlink of the voted content.
	pub permlink: String,
	/// Vote weight in basis points.
	pub weight: i16,
}
impl Vote {
	/// Canonical operation name.
	pub const NAME: &'static str = "vote";

	/// Creates a vote by `voter` on `author`/`permlink`.
	pub fn new(
		voter: impl Into<String>,
		author: impl Into<String>,
		permlink: impl Into<String>,
		weight: i16,
	) -> Self {
		Self {
			name: OperationName::new(Self::NAME),
			voter: voter.into(),
			author: author.into(),
			permlink: permlink.into(),
			weight,
		}
	}
}
impl Named for Vote {
	fn name_tag(&self) -> &OperationName {
		&self.name
	}

	fn name_tag_mut(&mut self) -> &mut OperationName {
		&mut self.name
	}
}

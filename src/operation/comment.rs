// self
use crate::{
	_prelude::*,
	operation::{Named, OperationName},
};

/// Post (empty `parent_author`) or reply.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Comment {
	#[serde(skip)]
	name: OperationName,
	/// Author of the parent content; empty for a top-level post.
	pub parent_author: String,
	/// Parent permlink, or the main tag for a top-level post.
	pub parent_permlink: String,
	/// Account publishing the content.
	pub author: String,
	/// Permlink of the new content.
	pub permlink: String,
	/// Title; usually empty for replies.
	pub title: String,
	/// Markdown body.
	pub body: String,
	/// JSON metadata, encoded as a string.
	pub json_metadata: String,
}
impl Comment {
	/// Canonical operation name.
	pub const NAME: &'static str = "comment";

	/// Creates a comment with an empty title and metadata.
	pub fn new(
		parent_author: impl Into<String>,
		parent_permlink: impl Into<String>,
		author: impl Into<String>,
		permlink: impl Into<String>,
		body: impl Into<String>,
	) -> Self {
		Self {
			name: OperationName::new(Self::NAME),
			parent_author: parent_author.into(),
			parent_permlink: parent_permlink.into(),
			author: author.into(),
			permlink: permlink.into(),
			title: String::new(),
			body: body.into(),
			json_metadata: String::new(),
		}
	}

	/// Sets the title.
	pub fn with_title(mut self, title: impl Into<String>) -> Self {
		self.title = title.into();

		self
	}

	/// Sets the metadata from a JSON value.
	pub fn with_json_metadata(mut self, metadata: &serde_json::Value) -> Self {
		self.json_metadata = metadata.to_string();

		self
	}
}
impl Named for Comment {
	fn name_tag(&self) -> &OperationName {
		&self.name
	}

	fn name_tag_mut(&mut self) -> &mut OperationName {
		&mut self.name
	}
}

/// Deletes a post or comment that has no replies or positive votes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DeleteComment {
	#[serde(skip)]
	name: OperationName,
	/// Author of the content.
	pub author: String,
	/// Permlink of the content.
	pub permlink: String,
}
impl DeleteComment {
	/// Canonical operation name.
	pub const NAME: &'static str = "delete_comment";

	/// Creates a deletion of `author`/`permlink`.
	pub fn new(author: impl Into<String>, permlink: impl Into<String>) -> Self {
		Self { name: OperationName::new(Self::NAME), author: author.into(), permlink: permlink.into() }
	}
}
impl Named for DeleteComment {
	fn name_tag(&self) -> &OperationName {
		&self.name
	}

	fn name_tag_mut(&mut self) -> &mut OperationName {
		&mut self.name
	}
}

/// Reward routing entry of [`CommentOptions`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Beneficiary {
	/// Receiving account.
	pub account: String,
	/// Share in basis points.
	pub weight: u16,
}

/// Payout settings attached to a comment, usually broadcast right after it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CommentOptions {
	#[serde(skip)]
	name: OperationName,
	/// Author of the content.
	pub author: String,
	/// Permlink of the content.
	pub permlink: String,
	/// Payout cap, as an asset string such as `1000000.000 SBD`.
	pub max_accepted_payout: String,
	/// Share of the author payout paid in SBD, in basis points.
	pub percent_steem_dollars: u16,
	/// Whether the content accepts votes.
	pub allow_votes: bool,
	/// Whether curators are rewarded.
	pub allow_curation_rewards: bool,
	/// Protocol extensions, as `[tag, value]` pairs.
	pub extensions: Vec<serde_json::Value>,
}
impl CommentOptions {
	/// Canonical operation name.
	pub const NAME: &'static str = "comment_options";

	/// Creates options matching the chain defaults.
	pub fn new(author: impl Into<String>, permlink: impl Into<String>) -> Self {
		Self {
			name: OperationName::new(Self::NAME),
			author: author.into(),
			permlink: permlink.into(),
			max_accepted_payout: "1000000.000 SBD".into(),
			percent_steem_dollars: 10_000,
			allow_votes: true,
			allow_curation_rewards: true,
			extensions: Vec::new(),
		}
	}

	/// Declines every payout.
	pub fn decline_payout(mut self) -> Self {
		self.max_accepted_payout = "0.000 SBD".into();

		self
	}

	/// Routes part of the author reward to `beneficiaries` (extension tag `0`).
	///
	/// The chain requires the accounts to be sorted; they are sorted here.
	pub fn with_beneficiaries(mut self, mut beneficiaries: Vec<Beneficiary>) -> Self {
		beneficiaries.sort_by(|a, b| a.account.cmp(&b.account));

		self.extensions.push(serde_json::json!([0, { "beneficiaries": beneficiaries }]));

		self
	}
}
impl Named for CommentOptions {
	fn name_tag(&self) -> &OperationName {
		&self.name
	}

	fn name_tag_mut(&mut self) -> &mut OperationName {
		&mut self.name
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::operation::Operation;

	#[test]
	fn comment_metadata_is_a_json_string() {
		let comment = Comment::new("", "steem", "alice", "hello", "Body")
			.with_title("Hello")
			.with_json_metadata(&serde_json::json!({ "tags": ["steem"] }));
		let params = comment.params().expect("Comment should encode.");

		assert_eq!(params["title"], "Hello");
		assert_eq!(params["json_metadata"], r#"{"tags":["steem"]}"#);
		assert_eq!(comment.name(), Some("comment"));
	}

	#[test]
	fn beneficiaries_are_sorted_into_extensions() {
		let options = CommentOptions::new("alice", "hello").with_beneficiaries(vec![
			Beneficiary { account: "zed".into(), weight: 500 },
			Beneficiary { account: "amy".into(), weight: 1_000 },
		]);
		let params = options.params().expect("Options should encode.");

		assert_eq!(
			params["extensions"],
			serde_json::json!([[0, { "beneficiaries": [
				{ "account": "amy", "weight": 1000 },
				{ "account": "zed", "weight": 500 },
			] }]])
		);
		assert_eq!(params["max_accepted_payout"], "1000000.000 SBD");
	}

	#[test]
	fn delete_comment_has_its_own_name() {
		assert_eq!(DeleteComment::new("alice", "hello").name(), Some(DeleteComment::NAME));
	}
}

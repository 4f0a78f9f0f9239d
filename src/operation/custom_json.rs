// self
use crate::{
	_prelude::*,
	operation::{Named, OperationName},
};

/// Application-level JSON payload recorded on chain.
///
/// Follows, mutes, and reblogs are `custom_json` operations with the `follow` id; see
/// [`CustomJson::follow`] and friends.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CustomJson {
	#[serde(skip)]
	name: OperationName,
	/// Accounts signing with active authority.
	pub required_auths: Vec<String>,
	/// Accounts signing with posting authority.
	pub required_posting_auths: Vec<String>,
	/// Application identifier.
	pub id: String,
	/// JSON payload, encoded as a string.
	pub json: String,
}
impl CustomJson {
	/// Canonical operation name.
	pub const NAME: &'static str = "custom_json";
	/// Id used by the follow plugin.
	pub const FOLLOW_ID: &'static str = "follow";

	/// Creates a payload signed with `account`'s posting authority.
	pub fn posting(
		account: impl Into<String>,
		id: impl Into<String>,
		json: &serde_json::Value,
	) -> Self {
		Self {
			name: OperationName::new(Self::NAME),
			required_auths: Vec::new(),
			required_posting_auths: vec![account.into()],
			id: id.into(),
			json: json.to_string(),
		}
	}

	/// `follower` follows `following`'s blog.
	pub fn follow(follower: &str, following: &str) -> Self {
		Self::follow_what(follower, following, &["blog"])
	}

	/// `follower` stops following or muting `following`.
	pub fn unfollow(follower: &str, following: &str) -> Self {
		Self::follow_what(follower, following, &[])
	}

	/// `follower` mutes `following`.
	pub fn mute(follower: &str, following: &str) -> Self {
		Self::follow_what(follower, following, &["ignore"])
	}

	/// `account` reblogs `author`/`permlink`.
	pub fn reblog(account: &str, author: &str, permlink: &str) -> Self {
		let json = serde_json::json!([
			"reblog",
			{ "account": account, "author": author, "permlink": permlink },
		]);

		Self::posting(account, Self::FOLLOW_ID, &json)
	}

	fn follow_what(follower: &str, following: &str, what: &[&str]) -> Self {
		let json = serde_json::json!([
			"follow",
			{ "follower": follower, "following": following, "what": what },
		]);

		Self::posting(follower, Self::FOLLOW_ID, &json)
	}
}
impl Named for CustomJson {
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

	fn payload(op: &CustomJson) -> serde_json::Value {
		serde_json::from_str(&op.json).expect("Payload should be JSON.")
	}

	#[test]
	fn follow_family_targets_the_follow_plugin() {
		let follow = CustomJson::follow("alice", "bob");

		assert_eq!(follow.id, "follow");
		assert_eq!(follow.required_posting_auths, ["alice"]);
		assert!(follow.required_auths.is_empty());
		assert_eq!(payload(&follow)[1]["what"], serde_json::json!(["blog"]));
		assert_eq!(payload(&CustomJson::unfollow("alice", "bob"))[1]["what"], serde_json::json!([]));
		assert_eq!(
			payload(&CustomJson::mute("alice", "bob"))[1]["what"],
			serde_json::json!(["ignore"])
		);
	}

	#[test]
	fn reblog_carries_the_reblogged_content() {
		let reblog = CustomJson::reblog("alice", "bob", "hello");

		assert_eq!(
			payload(&reblog),
			serde_json::json!(["reblog", { "account": "alice", "author": "bob", "permlink": "hello" }])
		);
		assert_eq!(reblog.name(), Some("custom_json"));
	}
}

// self
use crate::{
	_prelude::*,
	operation::{Named, OperationName},
};

/// Moves pending rewards into the account's balances.
///
/// Amounts are asset strings such as `0.000 STEEM`, `1.234 SBD`, or `10.000000 VESTS`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ClaimRewardBalance {
	#[serde(skip)]
	name: OperationName,
	/// Claiming account.
	pub account: String,
	/// STEEM to claim.
	pub reward_steem: String,
	/// SBD to claim.
	pub reward_sbd: String,
	/// VESTS to claim.
	pub reward_vests: String,
}
impl ClaimRewardBalance {
	/// Canonical operation name.
	pub const NAME: &'static str = "claim_reward_balance";

	/// Creates a claim of the given amounts.
	pub fn new(
		account: impl Into<String>,
		reward_steem: impl Into<String>,
		reward_sbd: impl Into<String>,
		reward_vests: impl Into<String>,
	) -> Self {
		Self {
			name: OperationName::new(Self::NAME),
			account: account.into(),
			reward_steem: reward_steem.into(),
			reward_sbd: reward_sbd.into(),
			reward_vests: reward_vests.into(),
		}
	}
}
impl Named for ClaimRewardBalance {
	fn name_tag(&self) -> &OperationName {
		&self.name
	}

	fn name_tag_mut(&mut self) -> &mut OperationName {
		&mut self.name
	}
}

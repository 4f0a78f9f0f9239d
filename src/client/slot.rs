//! Owned, optional collaborator slot with an explicit refresh policy.

/// How a [`Collaborator`] slot reacts to a refresh.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefreshPolicy {
	/// Discard the held value and build a new one every time.
	Rebuild,
	/// Keep the held value; build one only when the slot is empty.
	ReuseOrCreate,
}

/// Slot holding at most one collaborator instance.
#[derive(Debug)]
pub struct Collaborator<T> {
	policy: RefreshPolicy,
	value: Option<T>,
}
impl<T> Collaborator<T> {
	/// Empty slot using [`RefreshPolicy::Rebuild`].
	pub const fn rebuild() -> Self {
		Self { policy: RefreshPolicy::Rebuild, value: None }
	}

	/// Empty slot using [`RefreshPolicy::ReuseOrCreate`].
	pub const fn reuse() -> Self {
		Self { policy: RefreshPolicy::ReuseOrCreate, value: None }
	}

	/// Policy applied by [`Collaborator::refresh`].
	pub fn policy(&self) -> RefreshPolicy {
		self.policy
	}

	/// Held value, if any.
	pub fn get(&self) -> Option<&T> {
		self.value.as_ref()
	}

	/// Returns true when nothing is held.
	pub fn is_empty(&self) -> bool {
		self.value.is_none()
	}

	/// Stores `value`, returning the previous one.
	pub fn replace(&mut self, value: T) -> Option<T> {
		self.value.replace(value)
	}

	/// Applies the policy, calling `build` when a new value is needed.
	///
	/// Under [`RefreshPolicy::Rebuild`] the old value is dropped before `build` runs, so a
	/// failed build leaves the slot empty.
	pub fn refresh<E>(&mut self, build: impl FnOnce() -> Result<T, E>) -> Result<&mut T, E> {
		let value = match self.policy {
			RefreshPolicy::Rebuild => {
				self.value = None;

				build()?
			},
			RefreshPolicy::ReuseOrCreate => match self.value.take() {
				Some(value) => value,
				None => build()?,
			},
		};

		Ok(self.value.insert(value))
	}
}

// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	collections::HashSet,
	fmt::{Display, Formatter},
};

use indexmap::IndexSet;

/// Identifies one mutating statement; used to walk its affected tables at
/// most once per transaction.
#[repr(transparent)]
#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct MutationId(pub i32);

impl From<i32> for MutationId {
	fn from(value: i32) -> Self {
		Self(value)
	}
}

impl Display for MutationId {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

/// Tables dirtied inside one transaction, in first-touched order.
#[derive(Debug, Default, Clone)]
pub struct ChangeSet {
	dirtied: IndexSet<String>,
	seen: HashSet<MutationId>,
}

impl ChangeSet {
	pub fn new() -> Self {
		Self::default()
	}

	/// Marks `mutation` as seen. Returns false if it was already seen, in
	/// which case its tables must not be walked again.
	pub fn mark_seen(&mut self, mutation: MutationId) -> bool {
		self.seen.insert(mutation)
	}

	pub fn has_seen(&self, mutation: MutationId) -> bool {
		self.seen.contains(&mutation)
	}

	pub fn add_tables<I, S>(&mut self, tables: I)
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.dirtied.extend(tables.into_iter().map(Into::into));
	}

	/// Records the tables of `mutation` unless it was already recorded.
	pub fn record<F, I, S>(&mut self, mutation: MutationId, tables: F) -> bool
	where
		F: FnOnce() -> I,
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		if !self.mark_seen(mutation) {
			return false;
		}
		self.add_tables(tables());
		true
	}

	pub fn merge(&mut self, other: ChangeSet) {
		self.dirtied.extend(other.dirtied);
		self.seen.extend(other.seen);
	}

	pub fn dirtied_tables(&self) -> &IndexSet<String> {
		&self.dirtied
	}

	pub fn is_empty(&self) -> bool {
		self.dirtied.is_empty()
	}

	pub fn into_tables(self) -> IndexSet<String> {
		self.dirtied
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_record_walks_tables_once_per_mutation() {
		let mut changes = ChangeSet::new();
		let mut walks = 0;

		assert!(changes.record(MutationId(1), || {
			walks += 1;
			["data"]
		}));
		assert!(!changes.record(MutationId(1), || {
			walks += 1;
			["data"]
		}));

		assert_eq!(walks, 1);
		assert_eq!(changes.dirtied_tables().len(), 1);
	}

	#[test]
	fn test_distinct_mutations_coalesce_tables() {
		let mut changes = ChangeSet::new();
		changes.record(MutationId(1), || ["data", "other"]);
		changes.record(MutationId(2), || ["data"]);

		let tables: Vec<_> = changes.dirtied_tables().iter().map(String::as_str).collect();
		assert_eq!(tables, vec!["data", "other"]);
	}

	#[test]
	fn test_merge() {
		let mut outer = ChangeSet::new();
		outer.record(MutationId(1), || ["a"]);

		let mut inner = ChangeSet::new();
		inner.record(MutationId(2), || ["b", "a"]);

		outer.merge(inner);
		assert!(outer.has_seen(MutationId(2)));
		let tables: Vec<_> = outer.into_tables().into_iter().collect();
		assert_eq!(tables, vec!["a".to_string(), "b".to_string()]);
	}
}

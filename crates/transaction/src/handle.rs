// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	fmt::{Debug, Display, Formatter},
	sync::{Arc, Weak},
};

use parking_lot::Mutex;
use tracing::trace;
use weft_type::Result;

use crate::{
	TransactionId,
	change::{ChangeSet, MutationId},
	context::{Confinement, ContextId},
	error::TransactionError,
	hook::{Hook, HookList},
};

/// Lifecycle of a transaction handle. Transitions only move forward:
/// `Running -> Committing | RollingBack -> Ended`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
	Running,
	Committing,
	RollingBack,
	Ended,
}

impl Display for TransactionState {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			TransactionState::Running => f.write_str("RUNNING"),
			TransactionState::Committing => f.write_str("COMMITTING"),
			TransactionState::RollingBack => f.write_str("ROLLING_BACK"),
			TransactionState::Ended => f.write_str("ENDED"),
		}
	}
}

/// One level of the transaction stack of an execution context.
///
/// A handle only refers weakly to the transaction enclosing it: the call
/// that opened the enclosing transaction keeps it alive for at least as
/// long as any transaction nested inside.
pub struct TransactionHandle {
	id: TransactionId,
	owner: ContextId,
	confinement: Confinement,
	depth: usize,
	enclosing: Option<Weak<TransactionHandle>>,
	inner: Mutex<Inner>,
}

struct Inner {
	state: TransactionState,
	successful: bool,
	children_successful: bool,
	post_commit: HookList,
	post_rollback: HookList,
	changes: ChangeSet,
}

/// Everything a handle accumulated while running, taken out when it ends.
pub(crate) struct Pending {
	pub(crate) changes: ChangeSet,
	pub(crate) post_commit: HookList,
	pub(crate) post_rollback: HookList,
}

impl TransactionHandle {
	pub(crate) fn new(
		owner: ContextId,
		confinement: Confinement,
		enclosing: Option<&Arc<TransactionHandle>>,
	) -> Arc<Self> {
		Arc::new(Self {
			id: TransactionId::generate(),
			owner,
			confinement,
			depth: enclosing.map_or(0, |enclosing| enclosing.depth + 1),
			enclosing: enclosing.map(Arc::downgrade),
			inner: Mutex::new(Inner {
				state: TransactionState::Running,
				successful: false,
				children_successful: true,
				post_commit: HookList::new(),
				post_rollback: HookList::new(),
				changes: ChangeSet::new(),
			}),
		})
	}

	pub fn id(&self) -> TransactionId {
		self.id
	}

	pub fn owner(&self) -> ContextId {
		self.owner
	}

	pub fn confinement(&self) -> Confinement {
		self.confinement
	}

	/// Nesting depth; 0 for the outermost transaction.
	pub fn depth(&self) -> usize {
		self.depth
	}

	pub fn is_outermost(&self) -> bool {
		self.enclosing.is_none()
	}

	pub fn enclosing(&self) -> Option<Arc<TransactionHandle>> {
		self.enclosing.as_ref().and_then(Weak::upgrade)
	}

	pub fn state(&self) -> TransactionState {
		self.inner.lock().state
	}

	pub fn is_successful(&self) -> bool {
		self.inner.lock().successful
	}

	pub fn children_successful(&self) -> bool {
		self.inner.lock().children_successful
	}

	/// Tables dirtied so far by this transaction and the nested ones that already ended.
	pub fn dirtied_tables(&self) -> Vec<String> {
		self.inner.lock().changes.dirtied_tables().iter().cloned().collect()
	}

	/// Fails unless called from the owning context while the handle is running.
	pub fn ensure_running(&self, operation: &'static str) -> std::result::Result<(), TransactionError> {
		let inner = self.inner.lock();
		self.check(&inner, operation)
	}

	pub fn after_commit<F>(&self, hook: F) -> std::result::Result<(), TransactionError>
	where
		F: FnOnce() -> Result<()> + Send + 'static,
	{
		let mut inner = self.inner.lock();
		self.check(&inner, "register a commit hook on")?;
		inner.post_commit.push(Box::new(hook) as Hook);
		trace!(id = %self.id, hooks = inner.post_commit.len(), "commit hook registered");
		Ok(())
	}

	pub fn after_rollback<F>(&self, hook: F) -> std::result::Result<(), TransactionError>
	where
		F: FnOnce() -> Result<()> + Send + 'static,
	{
		let mut inner = self.inner.lock();
		self.check(&inner, "register a rollback hook on")?;
		inner.post_rollback.push(Box::new(hook) as Hook);
		trace!(id = %self.id, hooks = inner.post_rollback.len(), "rollback hook registered");
		Ok(())
	}

	/// Records the tables touched by `mutation`, walking `tables` only the
	/// first time the mutation is seen by this handle.
	pub(crate) fn record_changes<F, I, S>(
		&self,
		mutation: MutationId,
		tables: F,
	) -> std::result::Result<bool, TransactionError>
	where
		F: FnOnce() -> I,
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		{
			let mut inner = self.inner.lock();
			self.check(&inner, "record changes on")?;
			if !inner.changes.mark_seen(mutation) {
				return Ok(false);
			}
		}

		// the provider runs unlocked; it may consult the transacter itself
		let tables: Vec<String> = tables().into_iter().map(Into::into).collect();
		trace!(id = %self.id, %mutation, ?tables, "changes recorded");
		self.inner.lock().changes.add_tables(tables);
		Ok(true)
	}

	/// Stores the body outcome and moves the handle to `Committing` or
	/// `RollingBack`. Returns whether this level and all of its children
	/// succeeded, along with the accumulated hooks and changes.
	pub(crate) fn seal(&self, successful: bool) -> (bool, Pending) {
		let mut inner = self.inner.lock();
		inner.successful = successful;
		let commit = successful && inner.children_successful;
		inner.state = if commit {
			TransactionState::Committing
		} else {
			TransactionState::RollingBack
		};

		let pending = Pending {
			changes: std::mem::take(&mut inner.changes),
			post_commit: std::mem::take(&mut inner.post_commit),
			post_rollback: std::mem::take(&mut inner.post_rollback),
		};
		(commit, pending)
	}

	/// Takes over what an ended child transaction accumulated.
	pub(crate) fn absorb(&self, child: Pending, child_successful: bool) {
		let mut inner = self.inner.lock();
		inner.children_successful &= child_successful;
		inner.post_commit.append(child.post_commit);
		inner.post_rollback.append(child.post_rollback);
		inner.changes.merge(child.changes);
	}

	pub(crate) fn mark_ended(&self) {
		self.inner.lock().state = TransactionState::Ended;
	}

	fn check(&self, inner: &Inner, operation: &'static str) -> std::result::Result<(), TransactionError> {
		let caller = ContextId::current(self.confinement);
		if caller != self.owner {
			return Err(TransactionError::ConfinementViolation {
				transaction: self.id,
				owner: self.owner,
				caller,
			});
		}

		if inner.state != TransactionState::Running {
			return Err(TransactionError::InvalidHandleState {
				transaction: self.id,
				state: inner.state,
				operation,
			});
		}

		Ok(())
	}
}

impl Debug for TransactionHandle {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		let inner = self.inner.lock();
		f.debug_struct("TransactionHandle")
			.field("id", &self.id)
			.field("owner", &self.owner)
			.field("depth", &self.depth)
			.field("state", &inner.state)
			.field("successful", &inner.successful)
			.field("children_successful", &inner.children_successful)
			.field("post_commit", &inner.post_commit)
			.field("post_rollback", &inner.post_rollback)
			.field("changes", &inner.changes)
			.finish()
	}
}

/// Moves a handle to `Ended` when dropped, so it ends even if the physical
/// commit or rollback is cancelled midway.
pub(crate) struct EndOnDrop<'a>(pub(crate) &'a TransactionHandle);

impl Drop for EndOnDrop<'_> {
	fn drop(&mut self) {
		self.0.mark_ended();
	}
}

// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! The last steps of ending an outermost transaction, shared by the
//! synchronous and asynchronous managers.

use tracing::{debug, trace, warn};
use weft_type::{Error, Result, error::diagnostic::transaction::rollback_failed_after_error};

use crate::{
	TransactionId,
	driver::Listeners,
	error::{Abort, Rollback, TransactionResult},
	handle::{EndOnDrop, Pending, TransactionHandle, TransactionState},
	interceptor::{Interceptors, PostCommitContext, PostRollbackContext},
	stack::ContextStack,
};

/// Runs after the driver acknowledged the commit: flushes the coalesced
/// table changes, then post-commit interceptors, then commit hooks.
pub(crate) fn committed<L>(listeners: &L, interceptors: &Interceptors, id: TransactionId, pending: Pending) -> Result<()>
where
	L: Listeners + ?Sized,
{
	let tables = pending.changes.into_tables();
	if !tables.is_empty() {
		debug!(%id, ?tables, "notifying listeners");
		listeners.notify_listeners(&tables);
	}

	let intercepted = if interceptors.post_commit.is_empty() {
		Ok(())
	} else {
		interceptors.post_commit.execute(&PostCommitContext {
			id,
			tables,
		})
	};

	trace!(%id, hooks = pending.post_commit.len(), "running commit hooks");
	also(intercepted, pending.post_commit.run("commit"))
}

/// Runs after the driver was asked to roll back: post-rollback interceptors,
/// then rollback hooks. The change set is discarded.
pub(crate) fn rolled_back(
	rollback: Result<()>,
	interceptors: &Interceptors,
	id: TransactionId,
	pending: Pending,
) -> Result<()> {
	if let Err(err) = &rollback {
		warn!(%id, code = %err.code, "physical rollback failed");
	}

	let discarded = pending.changes.into_tables();
	if !discarded.is_empty() {
		trace!(%id, ?discarded, "discarding table changes");
	}

	let intercepted = if interceptors.post_rollback.is_empty() {
		Ok(())
	} else {
		interceptors.post_rollback.execute(&PostRollbackContext {
			id,
			discarded,
		})
	};

	trace!(%id, hooks = pending.post_rollback.len(), "running rollback hooks");
	also(also(rollback, intercepted), pending.post_rollback.run("rollback"))
}

/// The driver refused the commit. The transaction counts as rolled back:
/// changes and commit hooks are dropped and the rollback side runs.
pub(crate) fn commit_failed(err: Error, interceptors: &Interceptors, id: TransactionId, pending: Pending) -> Error {
	warn!(%id, code = %err.code, "commit failed");
	match rolled_back(Ok(()), interceptors, id, pending) {
		Ok(()) => err,
		Err(rollback) => compose(err, rollback),
	}
}

/// Keeps both the error that made a transaction roll back and the error
/// raised while rolling back.
pub(crate) fn compose(original: Error, rollback: Error) -> Error {
	warn!(original = %original.code, rollback = %rollback.code, "rollback failed after error");
	weft_type::error!(rollback_failed_after_error(original.0, rollback.0))
}

/// Combines the outcome of a transaction body with the outcome of ending
/// its transaction.
///
/// A rollback reaching the outermost transaction becomes a normal return
/// through `on_rollback`; nested transactions pass it on unchanged.
pub(crate) fn settle<T>(
	outermost: bool,
	result: TransactionResult<T>,
	ended: Result<()>,
	on_rollback: impl FnOnce(Rollback) -> TransactionResult<T>,
) -> TransactionResult<T> {
	match (result, ended) {
		(Ok(value), Ok(())) => Ok(value),
		(Ok(_), Err(err)) => Err(Abort::Failed(err)),
		(Err(Abort::Failed(err)), Ok(())) => Err(Abort::Failed(err)),
		(Err(Abort::Failed(original)), Err(err)) => Err(Abort::Failed(compose(original, err))),
		(Err(Abort::Rollback(_)), Err(err)) => Err(Abort::Failed(err)),
		(Err(Abort::Rollback(rollback)), Ok(())) if outermost => {
			debug!(transaction = %rollback.transaction(), "rolled back on request");
			on_rollback(rollback)
		}
		(Err(Abort::Rollback(rollback)), Ok(())) => Err(Abort::Rollback(rollback)),
	}
}

/// Ends a handle whose body never returned, because it panicked or its
/// future was dropped. Skips the confinement check, as this may run while
/// unwinding on whatever context dropped the body.
///
/// A nested handle is absorbed by its enclosing one as failed. For an
/// outermost handle the physical token and pending state are returned so
/// the caller can roll back and then finish with [`rolled_back`].
pub(crate) fn abandon<T>(stack: &ContextStack<T>, handle: &TransactionHandle) -> Option<(Option<T>, Pending)> {
	if handle.state() != TransactionState::Running {
		return None;
	}
	warn!(id = %handle.id(), depth = handle.depth(), "transaction abandoned");

	let token = match stack.pop(handle) {
		Ok(token) => token,
		Err(err) => {
			warn!(id = %handle.id(), code = %err.code, "failed to restore enclosing transaction");
			None
		}
	};

	let (_, pending) = handle.seal(false);
	let _ended = EndOnDrop(handle);

	if handle.is_outermost() {
		return Some((token, pending));
	}
	if let Some(enclosing) = handle.enclosing() {
		enclosing.absorb(pending, false);
	}
	None
}

/// Keeps the first failure, noting a later one on it.
fn also(first: Result<()>, second: Result<()>) -> Result<()> {
	match (first, second) {
		(Ok(()), second) => second,
		(Err(first), Ok(())) => Err(first),
		(Err(first), Err(second)) => Err(weft_type::error!(
			first.diagnostic().with_note(format!("also failed: error[{}]: {}", second.code, second.message))
		)),
	}
}

// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::Arc;

use tracing::{debug, instrument, warn};
use weft_type::{Result, return_internal_error};

use crate::{
	config::TransacterConfig,
	context::ContextId,
	driver::Driver,
	error::{Rollback, TransactionError, TransactionResult},
	finish,
	handle::{EndOnDrop, TransactionHandle},
	interceptor::Interceptors,
	notifier::ChangeNotifier,
	stack::ContextStack,
};

/// Tracks the current transaction of every execution context of one
/// synchronous connection. The only part that begins, commits or rolls
/// back the physical transaction.
pub struct TransactionManager<D: Driver> {
	driver: D,
	stack: ContextStack<D::Token>,
	config: TransacterConfig,
	interceptors: Interceptors,
}

impl<D: Driver> TransactionManager<D> {
	pub(crate) fn new(driver: D, config: TransacterConfig, interceptors: Interceptors) -> Self {
		Self {
			driver,
			stack: ContextStack::new(),
			config,
			interceptors,
		}
	}

	pub fn driver(&self) -> &D {
		&self.driver
	}

	pub fn context(&self) -> ContextId {
		ContextId::current(self.config.confinement)
	}

	/// The running transaction of the calling context, if any.
	pub fn current(&self) -> Option<Arc<TransactionHandle>> {
		self.stack.current(self.context())
	}

	pub fn notifier(&self) -> ChangeNotifier<'_, D::Token, D> {
		ChangeNotifier::new(&self.stack, &self.driver, self.config.confinement)
	}

	/// Starts a transaction in the calling context, nested in its current
	/// transaction if there is one. Only an outermost transaction begins a
	/// physical transaction.
	#[instrument(name = "transaction::begin", level = "debug", skip(self))]
	pub fn begin(&self, no_enclosing: bool) -> Result<Arc<TransactionHandle>> {
		let context = self.context();

		match self.stack.current(context) {
			Some(_) if no_enclosing => Err(TransactionError::AlreadyInTransaction {
				context,
			}
			.into()),
			Some(enclosing) => {
				enclosing.ensure_running("nest a transaction in")?;
				let handle = TransactionHandle::new(context, self.config.confinement, Some(&enclosing));
				self.stack.push(handle.clone(), None);
				debug!(id = %handle.id(), depth = handle.depth(), "nested transaction started");
				Ok(handle)
			}
			None => {
				let token = self.driver.begin_transaction()?;
				let handle = TransactionHandle::new(context, self.config.confinement, None);
				self.stack.push(handle.clone(), Some(token));
				debug!(id = %handle.id(), %context, "physical transaction started");
				Ok(handle)
			}
		}
	}

	/// Ends `handle`, which must be the current transaction of the calling
	/// context. A nested transaction hands its hooks and changes to the one
	/// enclosing it; an outermost one commits or rolls back.
	#[instrument(name = "transaction::end", level = "debug", skip(self, handle), fields(id = %handle.id(), depth = handle.depth()))]
	pub fn end(&self, handle: &TransactionHandle, successful: bool) -> Result<()> {
		handle.ensure_running("end")?;
		let token = self.stack.pop(handle)?;
		let (commit, pending) = handle.seal(successful);
		let _ended = EndOnDrop(handle);

		match (handle.enclosing(), token) {
			(Some(enclosing), _) => {
				enclosing.absorb(pending, commit);
				Ok(())
			}
			(None, Some(token)) if commit => match self.driver.commit(token) {
				Ok(()) => {
					debug!("physical transaction committed");
					finish::committed(&self.driver, &self.interceptors, handle.id(), pending)
				}
				Err(err) => Err(finish::commit_failed(err, &self.interceptors, handle.id(), pending)),
			},
			(None, Some(token)) => {
				let rolled_back = self.driver.rollback(token);
				debug!(successful, "physical transaction rolled back");
				finish::rolled_back(rolled_back, &self.interceptors, handle.id(), pending)
			}
			(None, None) => {
				return_internal_error!("transaction {} ended without a physical transaction", handle.id())
			}
		}
	}

	/// Runs `body` in a new transaction and ends it on every exit path,
	/// including a panic of the body.
	pub(crate) fn run<T>(
		&self,
		no_enclosing: bool,
		body: impl FnOnce(&Arc<TransactionHandle>) -> TransactionResult<T>,
		on_rollback: impl FnOnce(Rollback) -> TransactionResult<T>,
	) -> TransactionResult<T> {
		let handle = self.begin(no_enclosing)?;

		let guard = AbandonOnDrop {
			manager: self,
			handle: &handle,
		};
		let result = body(&handle);
		std::mem::forget(guard);

		let ended = self.end(&handle, result.is_ok());
		finish::settle(handle.is_outermost(), result, ended, on_rollback)
	}

	fn abandon(&self, handle: &TransactionHandle) {
		let Some((token, pending)) = finish::abandon(&self.stack, handle) else {
			return;
		};

		let rolled_back = match token {
			Some(token) => self.driver.rollback(token),
			None => Ok(()),
		};
		if let Err(err) = finish::rolled_back(rolled_back, &self.interceptors, handle.id(), pending) {
			warn!(id = %handle.id(), code = %err.code, message = %err.message, "rollback of abandoned transaction failed");
		}
	}
}

struct AbandonOnDrop<'a, D: Driver> {
	manager: &'a TransactionManager<D>,
	handle: &'a TransactionHandle,
}

impl<D: Driver> Drop for AbandonOnDrop<'_, D> {
	fn drop(&mut self) {
		self.manager.abandon(self.handle);
	}
}

// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{future::Future, sync::Arc};

use tracing::{debug, instrument, warn};
use weft_type::{Result, return_internal_error};

use crate::{
	config::TransacterConfig,
	context::ContextId,
	driver::AsyncDriver,
	error::{Rollback, TransactionError, TransactionResult},
	finish,
	handle::{EndOnDrop, TransactionHandle},
	interceptor::Interceptors,
	notifier::ChangeNotifier,
	stack::ContextStack,
};

/// Asynchronous counterpart of [`TransactionManager`](crate::manager::TransactionManager).
pub struct AsyncTransactionManager<D: AsyncDriver> {
	driver: D,
	stack: ContextStack<D::Token>,
	config: TransacterConfig,
	interceptors: Interceptors,
}

impl<D: AsyncDriver> AsyncTransactionManager<D> {
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

	pub fn current(&self) -> Option<Arc<TransactionHandle>> {
		self.stack.current(self.context())
	}

	pub fn notifier(&self) -> ChangeNotifier<'_, D::Token, D> {
		ChangeNotifier::new(&self.stack, &self.driver, self.config.confinement)
	}

	#[instrument(name = "transaction::begin", level = "debug", skip(self))]
	pub async fn begin(&self, no_enclosing: bool) -> Result<Arc<TransactionHandle>> {
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
				let token = self.driver.begin_transaction().await?;
				// under thread confinement another task of this thread may have begun one meanwhile
				if self.stack.current(context).is_some() {
					self.driver.abandon(token);
					return Err(TransactionError::AlreadyInTransaction {
						context,
					}
					.into());
				}
				let handle = TransactionHandle::new(context, self.config.confinement, None);
				self.stack.push(handle.clone(), Some(token));
				debug!(id = %handle.id(), %context, "physical transaction started");
				Ok(handle)
			}
		}
	}

	#[instrument(name = "transaction::end", level = "debug", skip(self, handle), fields(id = %handle.id(), depth = handle.depth()))]
	pub async fn end(&self, handle: &TransactionHandle, successful: bool) -> Result<()> {
		handle.ensure_running("end")?;
		let token = self.stack.pop(handle)?;
		let (commit, pending) = handle.seal(successful);
		let _ended = EndOnDrop(handle);

		match (handle.enclosing(), token) {
			(Some(enclosing), _) => {
				enclosing.absorb(pending, commit);
				Ok(())
			}
			(None, Some(token)) if commit => match self.driver.commit(token).await {
				Ok(()) => {
					debug!("physical transaction committed");
					finish::committed(&self.driver, &self.interceptors, handle.id(), pending)
				}
				Err(err) => Err(finish::commit_failed(err, &self.interceptors, handle.id(), pending)),
			},
			(None, Some(token)) => {
				let rolled_back = self.driver.rollback(token).await;
				debug!(successful, "physical transaction rolled back");
				finish::rolled_back(rolled_back, &self.interceptors, handle.id(), pending)
			}
			(None, None) => {
				return_internal_error!("transaction {} ended without a physical transaction", handle.id())
			}
		}
	}

	/// Runs the future returned by `body` in a new transaction and ends it
	/// on every exit path. If the returned future is dropped before the body
	/// finishes, the transaction is abandoned.
	pub(crate) async fn run<T, Fut>(
		&self,
		no_enclosing: bool,
		body: impl FnOnce(&Arc<TransactionHandle>) -> Fut,
		on_rollback: impl FnOnce(Rollback) -> TransactionResult<T>,
	) -> TransactionResult<T>
	where
		Fut: Future<Output = TransactionResult<T>>,
	{
		let handle = self.begin(no_enclosing).await?;

		let guard = AbandonOnDrop {
			manager: self,
			handle: &handle,
		};
		let result = body(&handle).await;
		std::mem::forget(guard);

		let ended = self.end(&handle, result.is_ok()).await;
		finish::settle(handle.is_outermost(), result, ended, on_rollback)
	}

	fn abandon(&self, handle: &TransactionHandle) {
		let Some((token, pending)) = finish::abandon(&self.stack, handle) else {
			return;
		};

		if let Some(token) = token {
			self.driver.abandon(token);
		}
		if let Err(err) = finish::rolled_back(Ok(()), &self.interceptors, handle.id(), pending) {
			warn!(id = %handle.id(), code = %err.code, message = %err.message, "rollback of abandoned transaction failed");
		}
	}
}

struct AbandonOnDrop<'a, D: AsyncDriver> {
	manager: &'a AsyncTransactionManager<D>,
	handle: &'a TransactionHandle,
}

impl<D: AsyncDriver> Drop for AbandonOnDrop<'_, D> {
	fn drop(&mut self) {
		self.manager.abandon(self.handle);
	}
}

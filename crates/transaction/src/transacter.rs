// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::Arc;

use weft_type::Result;

use crate::{
	change::MutationId,
	config::{TransacterBuilder, TransacterConfig},
	driver::Driver,
	error::{Abort, TransactionResult},
	handle::TransactionHandle,
	interceptor::Interceptors,
	manager::TransactionManager,
	scope::{TransactionWithReturn, TransactionWithoutReturn},
};

/// Entry point for running transactions against a synchronous driver.
///
/// Cloning is cheap; clones share the same driver and transaction stacks.
pub struct Transacter<D: Driver> {
	manager: Arc<TransactionManager<D>>,
}

impl<D: Driver> Clone for Transacter<D> {
	fn clone(&self) -> Self {
		Self {
			manager: self.manager.clone(),
		}
	}
}

impl<D: Driver> Transacter<D> {
	pub fn new(driver: D) -> Self {
		TransacterBuilder::new(driver).build()
	}

	pub fn builder(driver: D) -> TransacterBuilder<D> {
		TransacterBuilder::new(driver)
	}

	pub(crate) fn from_parts(driver: D, config: TransacterConfig, interceptors: Interceptors) -> Self {
		Self {
			manager: Arc::new(TransactionManager::new(driver, config, interceptors)),
		}
	}

	pub fn driver(&self) -> &D {
		self.manager.driver()
	}

	pub fn manager(&self) -> &TransactionManager<D> {
		&self.manager
	}

	/// The running transaction of the calling context, if any.
	pub fn current_transaction(&self) -> Option<Arc<TransactionHandle>> {
		self.manager.current()
	}

	/// Runs `body` in a transaction, nested in the running transaction of
	/// the calling context unless `no_enclosing` is set, in which case a
	/// running transaction is an error.
	///
	/// A rollback requested anywhere inside rolls back the physical
	/// transaction and returns `Ok(())` from the outermost call.
	pub fn transaction<F>(&self, no_enclosing: bool, body: F) -> TransactionResult<()>
	where
		F: FnOnce(&TransactionWithoutReturn<D>) -> TransactionResult<()>,
	{
		self.manager.run(
			no_enclosing,
			|handle| body(&TransactionWithoutReturn::new(self.clone(), handle.clone())),
			|_| Ok(()),
		)
	}

	/// Like [`transaction`](Self::transaction), returning the value of
	/// `body`, or the value passed to
	/// [`rollback`](TransactionWithReturn::rollback).
	pub fn transaction_with_result<R, F>(&self, no_enclosing: bool, body: F) -> TransactionResult<R>
	where
		R: Send + 'static,
		F: FnOnce(&TransactionWithReturn<D, R>) -> TransactionResult<R>,
	{
		self.manager.run(
			no_enclosing,
			|handle| body(&TransactionWithReturn::new(self.clone(), handle.clone())),
			|rollback| rollback.into_value::<R>().map_err(Abort::from),
		)
	}

	/// Reports that `mutation` changed the tables returned by `tables`.
	///
	/// Inside a transaction the tables are collected and their listeners
	/// notified once after the commit; otherwise listeners are notified
	/// immediately.
	pub fn notify_queries<F, I, S>(&self, mutation: impl Into<MutationId>, tables: F) -> Result<()>
	where
		F: FnOnce() -> I,
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.manager.notifier().notify_queries(mutation.into(), tables)
	}
}

// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{marker::PhantomData, sync::Arc};

use weft_type::Result;

use crate::{
	TransactionId,
	change::MutationId,
	driver::Driver,
	error::{Abort, Rollback, TransactionResult},
	handle::TransactionHandle,
	transacter::Transacter,
};

/// Scope handed to the body of a transaction that returns nothing.
pub struct TransactionWithoutReturn<D: Driver> {
	transacter: Transacter<D>,
	handle: Arc<TransactionHandle>,
}

impl<D: Driver> TransactionWithoutReturn<D> {
	pub(crate) fn new(transacter: Transacter<D>, handle: Arc<TransactionHandle>) -> Self {
		Self {
			transacter,
			handle,
		}
	}

	pub fn id(&self) -> TransactionId {
		self.handle.id()
	}

	pub fn handle(&self) -> &Arc<TransactionHandle> {
		&self.handle
	}

	/// Queues `hook` to run after the outermost transaction commits.
	pub fn after_commit<F>(&self, hook: F) -> Result<()>
	where
		F: FnOnce() -> Result<()> + Send + 'static,
	{
		self.handle.after_commit(hook)?;
		Ok(())
	}

	/// Queues `hook` to run after the outermost transaction rolls back.
	pub fn after_rollback<F>(&self, hook: F) -> Result<()>
	where
		F: FnOnce() -> Result<()> + Send + 'static,
	{
		self.handle.after_rollback(hook)?;
		Ok(())
	}

	/// Aborts the body, rolling back this transaction and every transaction
	/// enclosing it. Return the result from the body, usually with `?`.
	pub fn rollback<T>(&self) -> TransactionResult<T> {
		self.handle.ensure_running("roll back")?;
		Err(Abort::Rollback(Rollback::new(self.handle.id(), None)))
	}

	pub fn transaction<F>(&self, body: F) -> TransactionResult<()>
	where
		F: FnOnce(&TransactionWithoutReturn<D>) -> TransactionResult<()>,
	{
		self.handle.ensure_running("nest a transaction in")?;
		self.transacter.transaction(false, body)
	}

	pub fn transaction_with_result<R, F>(&self, body: F) -> TransactionResult<R>
	where
		R: Send + 'static,
		F: FnOnce(&TransactionWithReturn<D, R>) -> TransactionResult<R>,
	{
		self.handle.ensure_running("nest a transaction in")?;
		self.transacter.transaction_with_result(false, body)
	}

	pub fn notify_queries<F, I, S>(&self, mutation: impl Into<MutationId>, tables: F) -> Result<()>
	where
		F: FnOnce() -> I,
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.transacter.notify_queries(mutation, tables)
	}
}

/// Scope handed to the body of a transaction returning an `R`.
pub struct TransactionWithReturn<D: Driver, R> {
	transacter: Transacter<D>,
	handle: Arc<TransactionHandle>,
	_result: PhantomData<fn() -> R>,
}

impl<D: Driver, R: Send + 'static> TransactionWithReturn<D, R> {
	pub(crate) fn new(transacter: Transacter<D>, handle: Arc<TransactionHandle>) -> Self {
		Self {
			transacter,
			handle,
			_result: PhantomData,
		}
	}

	pub fn id(&self) -> TransactionId {
		self.handle.id()
	}

	pub fn handle(&self) -> &Arc<TransactionHandle> {
		&self.handle
	}

	pub fn after_commit<F>(&self, hook: F) -> Result<()>
	where
		F: FnOnce() -> Result<()> + Send + 'static,
	{
		self.handle.after_commit(hook)?;
		Ok(())
	}

	pub fn after_rollback<F>(&self, hook: F) -> Result<()>
	where
		F: FnOnce() -> Result<()> + Send + 'static,
	{
		self.handle.after_rollback(hook)?;
		Ok(())
	}

	/// Aborts the body, rolling back every enclosing transaction. The
	/// outermost transaction returns `value` as its result.
	pub fn rollback<T>(&self, value: R) -> TransactionResult<T> {
		self.handle.ensure_running("roll back")?;
		Err(Abort::Rollback(Rollback::new(self.handle.id(), Some(Box::new(value)))))
	}

	pub fn transaction<F>(&self, body: F) -> TransactionResult<R>
	where
		F: FnOnce(&TransactionWithReturn<D, R>) -> TransactionResult<R>,
	{
		self.handle.ensure_running("nest a transaction in")?;
		self.transacter.transaction_with_result(false, body)
	}

	pub fn notify_queries<F, I, S>(&self, mutation: impl Into<MutationId>, tables: F) -> Result<()>
	where
		F: FnOnce() -> I,
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.transacter.notify_queries(mutation, tables)
	}
}

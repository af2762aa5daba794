// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{future::Future, marker::PhantomData, sync::Arc};

use weft_type::Result;

use crate::{
	TransactionId,
	asynchronous::transacter::AsyncTransacter,
	change::MutationId,
	driver::AsyncDriver,
	error::{Abort, Rollback, TransactionResult},
	handle::TransactionHandle,
};

/// Scope handed to the body of an asynchronous transaction that returns
/// nothing. Owned, so it can be moved into the body's future.
pub struct AsyncTransactionWithoutReturn<D: AsyncDriver> {
	transacter: AsyncTransacter<D>,
	handle: Arc<TransactionHandle>,
}

impl<D: AsyncDriver> Clone for AsyncTransactionWithoutReturn<D> {
	fn clone(&self) -> Self {
		Self {
			transacter: self.transacter.clone(),
			handle: self.handle.clone(),
		}
	}
}

impl<D: AsyncDriver> AsyncTransactionWithoutReturn<D> {
	pub(crate) fn new(transacter: AsyncTransacter<D>, handle: Arc<TransactionHandle>) -> Self {
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

	pub fn rollback<T>(&self) -> TransactionResult<T> {
		self.handle.ensure_running("roll back")?;
		Err(Abort::Rollback(Rollback::new(self.handle.id(), None)))
	}

	pub async fn transaction<F, Fut>(&self, body: F) -> TransactionResult<()>
	where
		F: FnOnce(AsyncTransactionWithoutReturn<D>) -> Fut,
		Fut: Future<Output = TransactionResult<()>>,
	{
		self.handle.ensure_running("nest a transaction in")?;
		self.transacter.transaction(false, body).await
	}

	pub async fn transaction_with_result<R, F, Fut>(&self, body: F) -> TransactionResult<R>
	where
		R: Send + 'static,
		F: FnOnce(AsyncTransactionWithReturn<D, R>) -> Fut,
		Fut: Future<Output = TransactionResult<R>>,
	{
		self.handle.ensure_running("nest a transaction in")?;
		self.transacter.transaction_with_result(false, body).await
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

/// Scope handed to the body of an asynchronous transaction returning an `R`.
pub struct AsyncTransactionWithReturn<D: AsyncDriver, R> {
	transacter: AsyncTransacter<D>,
	handle: Arc<TransactionHandle>,
	_result: PhantomData<fn() -> R>,
}

impl<D: AsyncDriver, R> Clone for AsyncTransactionWithReturn<D, R> {
	fn clone(&self) -> Self {
		Self {
			transacter: self.transacter.clone(),
			handle: self.handle.clone(),
			_result: PhantomData,
		}
	}
}

impl<D: AsyncDriver, R: Send + 'static> AsyncTransactionWithReturn<D, R> {
	pub(crate) fn new(transacter: AsyncTransacter<D>, handle: Arc<TransactionHandle>) -> Self {
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

	pub fn rollback<T>(&self, value: R) -> TransactionResult<T> {
		self.handle.ensure_running("roll back")?;
		Err(Abort::Rollback(Rollback::new(self.handle.id(), Some(Box::new(value)))))
	}

	pub async fn transaction<F, Fut>(&self, body: F) -> TransactionResult<R>
	where
		F: FnOnce(AsyncTransactionWithReturn<D, R>) -> Fut,
		Fut: Future<Output = TransactionResult<R>>,
	{
		self.handle.ensure_running("nest a transaction in")?;
		self.transacter.transaction_with_result(false, body).await
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

// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{future::Future, sync::Arc};

use weft_type::Result;

use crate::{
	asynchronous::{
		manager::AsyncTransactionManager,
		scope::{AsyncTransactionWithReturn, AsyncTransactionWithoutReturn},
	},
	change::MutationId,
	config::{TransacterBuilder, TransacterConfig},
	driver::AsyncDriver,
	error::{Abort, TransactionResult},
	handle::TransactionHandle,
	interceptor::Interceptors,
};

/// Entry point for running transactions against an asynchronous driver.
pub struct AsyncTransacter<D: AsyncDriver> {
	manager: Arc<AsyncTransactionManager<D>>,
}

impl<D: AsyncDriver> Clone for AsyncTransacter<D> {
	fn clone(&self) -> Self {
		Self {
			manager: self.manager.clone(),
		}
	}
}

impl<D: AsyncDriver> AsyncTransacter<D> {
	pub fn new(driver: D) -> Self {
		TransacterBuilder::new(driver).build_async()
	}

	pub fn builder(driver: D) -> TransacterBuilder<D> {
		TransacterBuilder::new(driver)
	}

	pub(crate) fn from_parts(driver: D, config: TransacterConfig, interceptors: Interceptors) -> Self {
		Self {
			manager: Arc::new(AsyncTransactionManager::new(driver, config, interceptors)),
		}
	}

	pub fn driver(&self) -> &D {
		self.manager.driver()
	}

	pub fn manager(&self) -> &AsyncTransactionManager<D> {
		&self.manager
	}

	pub fn current_transaction(&self) -> Option<Arc<TransactionHandle>> {
		self.manager.current()
	}

	pub async fn transaction<F, Fut>(&self, no_enclosing: bool, body: F) -> TransactionResult<()>
	where
		F: FnOnce(AsyncTransactionWithoutReturn<D>) -> Fut,
		Fut: Future<Output = TransactionResult<()>>,
	{
		let transacter = self.clone();
		self.manager
			.run(
				no_enclosing,
				move |handle| body(AsyncTransactionWithoutReturn::new(transacter, handle.clone())),
				|_| Ok(()),
			)
			.await
	}

	pub async fn transaction_with_result<R, F, Fut>(&self, no_enclosing: bool, body: F) -> TransactionResult<R>
	where
		R: Send + 'static,
		F: FnOnce(AsyncTransactionWithReturn<D, R>) -> Fut,
		Fut: Future<Output = TransactionResult<R>>,
	{
		let transacter = self.clone();
		self.manager
			.run(
				no_enclosing,
				move |handle| body(AsyncTransactionWithReturn::new(transacter, handle.clone())),
				|rollback| rollback.into_value::<R>().map_err(Abort::from),
			)
			.await
	}

	pub fn notify_queries<F, I, S>(&self, mutation: impl Into<MutationId>, tables: F) -> Result<()>
	where
		F: FnOnce() -> I,
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.manager.notifier().notify_queries(mutation.into(), tables)
	}
}

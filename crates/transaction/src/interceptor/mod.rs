// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Transacter-wide interceptors, run once per outermost transaction.

use std::sync::Arc;

pub mod chain;
pub mod transaction;

pub use chain::InterceptorChain;
pub use transaction::{
	PostCommitContext, PostCommitInterceptor, PostRollbackContext, PostRollbackInterceptor, post_commit,
	post_rollback,
};

#[derive(Default, Clone)]
pub struct Interceptors {
	pub post_commit: InterceptorChain<dyn PostCommitInterceptor>,
	pub post_rollback: InterceptorChain<dyn PostRollbackInterceptor>,
}

impl Interceptors {
	pub fn new() -> Self {
		Self::default()
	}
}

/// Collects interceptors while a transacter is being configured.
#[derive(Default)]
pub struct InterceptorBuilder {
	interceptors: Interceptors,
}

impl InterceptorBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn add_post_commit<I>(mut self, interceptor: I) -> Self
	where
		I: PostCommitInterceptor + 'static,
	{
		self.interceptors.post_commit.add(Arc::new(interceptor));
		self
	}

	pub fn add_post_rollback<I>(mut self, interceptor: I) -> Self
	where
		I: PostRollbackInterceptor + 'static,
	{
		self.interceptors.post_rollback.add(Arc::new(interceptor));
		self
	}

	pub fn build(self) -> Interceptors {
		self.interceptors
	}
}

#[cfg(test)]
mod tests {
	use std::sync::{Arc, Mutex};

	use indexmap::IndexSet;
	use weft_type::{err, error::diagnostic::application::failure};

	use super::*;
	use crate::TransactionId;

	#[test]
	fn test_chain_runs_in_order_and_stops_at_failure() {
		let order = Arc::new(Mutex::new(Vec::new()));
		let first = order.clone();
		let third = order.clone();

		let interceptors = InterceptorBuilder::new()
			.add_post_commit(post_commit(move |_| {
				first.lock().unwrap().push(1);
				Ok(())
			}))
			.add_post_commit(post_commit(|_| err!(failure("second"))))
			.add_post_commit(post_commit(move |_| {
				third.lock().unwrap().push(3);
				Ok(())
			}))
			.build();

		assert_eq!(interceptors.post_commit.len(), 3);
		assert!(interceptors.post_rollback.is_empty());

		let ctx = PostCommitContext {
			id: TransactionId::generate(),
			tables: IndexSet::new(),
		};
		let err = interceptors.post_commit.execute(&ctx).unwrap_err();
		assert_eq!(err.message, "second");
		assert_eq!(*order.lock().unwrap(), vec![1]);
	}
}

// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use indexmap::IndexSet;
use weft_type::Result;

use crate::{TransactionId, interceptor::chain::InterceptorChain};

// ============================================================================
// POST COMMIT
// ============================================================================

/// Context for post-commit interceptors
pub struct PostCommitContext {
	pub id: TransactionId,
	/// Tables changed by the transaction, already delivered to the listeners.
	pub tables: IndexSet<String>,
}

pub trait PostCommitInterceptor: Send + Sync {
	fn intercept(&self, ctx: &PostCommitContext) -> Result<()>;
}

impl InterceptorChain<dyn PostCommitInterceptor> {
	pub fn execute(&self, ctx: &PostCommitContext) -> Result<()> {
		for interceptor in &self.interceptors {
			interceptor.intercept(ctx)?;
		}
		Ok(())
	}
}

/// Closure wrapper for post-commit interceptors
pub struct ClosurePostCommitInterceptor<F>
where
	F: Fn(&PostCommitContext) -> Result<()> + Send + Sync,
{
	closure: F,
}

impl<F> PostCommitInterceptor for ClosurePostCommitInterceptor<F>
where
	F: Fn(&PostCommitContext) -> Result<()> + Send + Sync,
{
	fn intercept(&self, ctx: &PostCommitContext) -> Result<()> {
		(self.closure)(ctx)
	}
}

/// Helper function to create a closure post-commit interceptor
pub fn post_commit<F>(f: F) -> ClosurePostCommitInterceptor<F>
where
	F: Fn(&PostCommitContext) -> Result<()> + Send + Sync + 'static,
{
	ClosurePostCommitInterceptor {
		closure: f,
	}
}

// ============================================================================
// POST ROLLBACK
// ============================================================================

/// Context for post-rollback interceptors
pub struct PostRollbackContext {
	pub id: TransactionId,
	/// Tables the transaction had changed; their notifications were dropped.
	pub discarded: IndexSet<String>,
}

pub trait PostRollbackInterceptor: Send + Sync {
	fn intercept(&self, ctx: &PostRollbackContext) -> Result<()>;
}

impl InterceptorChain<dyn PostRollbackInterceptor> {
	pub fn execute(&self, ctx: &PostRollbackContext) -> Result<()> {
		for interceptor in &self.interceptors {
			interceptor.intercept(ctx)?;
		}
		Ok(())
	}
}

/// Closure wrapper for post-rollback interceptors
pub struct ClosurePostRollbackInterceptor<F>
where
	F: Fn(&PostRollbackContext) -> Result<()> + Send + Sync,
{
	closure: F,
}

impl<F> PostRollbackInterceptor for ClosurePostRollbackInterceptor<F>
where
	F: Fn(&PostRollbackContext) -> Result<()> + Send + Sync,
{
	fn intercept(&self, ctx: &PostRollbackContext) -> Result<()> {
		(self.closure)(ctx)
	}
}

/// Helper function to create a closure post-rollback interceptor
pub fn post_rollback<F>(f: F) -> ClosurePostRollbackInterceptor<F>
where
	F: Fn(&PostRollbackContext) -> Result<()> + Send + Sync + 'static,
{
	ClosurePostRollbackInterceptor {
		closure: f,
	}
}

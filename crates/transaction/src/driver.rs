// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::Arc;

use async_trait::async_trait;
use indexmap::IndexSet;
use weft_type::Result;

use crate::listener::QueryListener;

/// The listener half of a driver: a registry of query listeners keyed by table name.
pub trait Listeners {
	/// Synchronously notifies every listener observing at least one of `tables`.
	fn notify_listeners(&self, tables: &IndexSet<String>);

	fn add_listener(&self, listener: Arc<dyn QueryListener>, tables: &[&str]);

	fn remove_listener(&self, listener: &Arc<dyn QueryListener>, tables: &[&str]);
}

/// A synchronous connection able to run one physical transaction at a time.
pub trait Driver: Listeners + Send + Sync + 'static {
	/// Identifies the physical transaction between begin and commit/rollback.
	type Token: Send + 'static;

	fn begin_transaction(&self) -> Result<Self::Token>;

	fn commit(&self, token: Self::Token) -> Result<()>;

	fn rollback(&self, token: Self::Token) -> Result<()>;
}

/// An asynchronous connection able to run one physical transaction at a time.
#[async_trait]
pub trait AsyncDriver: Listeners + Send + Sync + 'static {
	type Token: Send + 'static;

	async fn begin_transaction(&self) -> Result<Self::Token>;

	async fn commit(&self, token: Self::Token) -> Result<()>;

	async fn rollback(&self, token: Self::Token) -> Result<()>;

	/// Receives the token of an outermost transaction whose future was
	/// dropped before it could end. Implementations are expected to roll
	/// the physical transaction back without blocking.
	fn abandon(&self, token: Self::Token) {
		drop(token);
	}
}

// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::{
	Arc,
	atomic::{AtomicU64, Ordering},
};

use async_trait::async_trait;
use indexmap::IndexSet;
use parking_lot::Mutex;
use tracing::debug;
use weft_transaction::{AsyncDriver, Driver, ListenerRegistry, Listeners, QueryListener};
use weft_type::{
	Result, err,
	error::diagnostic::driver::{begin_failed, commit_failed, rollback_failed},
};

/// A call received by a [`MemoryDriver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverCall {
	Begin(u64),
	Commit(u64),
	Rollback(u64),
	/// A token handed over by an async transaction whose future was dropped.
	Abandon(u64),
	Notify(Vec<String>),
}

/// Physical transaction of a [`MemoryDriver`].
#[derive(Debug, PartialEq, Eq)]
pub struct MemoryToken(pub u64);

/// A driver without storage that records the calls it receives.
///
/// Clones share the call log, so a test can keep one clone for assertions
/// while a transacter owns another.
#[derive(Clone, Default)]
pub struct MemoryDriver {
	shared: Arc<Shared>,
}

#[derive(Default)]
struct Shared {
	next_token: AtomicU64,
	calls: Mutex<Vec<DriverCall>>,
	failures: Mutex<Failures>,
	listeners: ListenerRegistry,
}

#[derive(Default)]
struct Failures {
	begin: bool,
	commit: bool,
	rollback: bool,
}

impl MemoryDriver {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn calls(&self) -> Vec<DriverCall> {
		self.shared.calls.lock().clone()
	}

	pub fn clear_calls(&self) {
		self.shared.calls.lock().clear();
	}

	pub fn begins(&self) -> usize {
		self.count(|call| matches!(call, DriverCall::Begin(_)))
	}

	pub fn commits(&self) -> usize {
		self.count(|call| matches!(call, DriverCall::Commit(_)))
	}

	pub fn rollbacks(&self) -> usize {
		self.count(|call| matches!(call, DriverCall::Rollback(_)))
	}

	pub fn abandons(&self) -> usize {
		self.count(|call| matches!(call, DriverCall::Abandon(_)))
	}

	/// Table sets passed to `notify_listeners`, in call order.
	pub fn notifications(&self) -> Vec<Vec<String>> {
		self.shared
			.calls
			.lock()
			.iter()
			.filter_map(|call| match call {
				DriverCall::Notify(tables) => Some(tables.clone()),
				_ => None,
			})
			.collect()
	}

	pub fn registry(&self) -> &ListenerRegistry {
		&self.shared.listeners
	}

	pub fn fail_begin(&self, fail: bool) {
		self.shared.failures.lock().begin = fail;
	}

	pub fn fail_commit(&self, fail: bool) {
		self.shared.failures.lock().commit = fail;
	}

	pub fn fail_rollback(&self, fail: bool) {
		self.shared.failures.lock().rollback = fail;
	}

	fn count(&self, predicate: impl Fn(&DriverCall) -> bool) -> usize {
		self.shared.calls.lock().iter().filter(|call| predicate(call)).count()
	}

	fn record(&self, call: DriverCall) {
		debug!(?call, "memory driver");
		self.shared.calls.lock().push(call);
	}

	fn begin(&self) -> Result<MemoryToken> {
		if self.shared.failures.lock().begin {
			return err!(begin_failed("injected failure"));
		}
		let token = self.shared.next_token.fetch_add(1, Ordering::SeqCst);
		self.record(DriverCall::Begin(token));
		Ok(MemoryToken(token))
	}

	fn finish_commit(&self, token: MemoryToken) -> Result<()> {
		self.record(DriverCall::Commit(token.0));
		if self.shared.failures.lock().commit {
			return err!(commit_failed("injected failure"));
		}
		Ok(())
	}

	fn finish_rollback(&self, token: MemoryToken) -> Result<()> {
		self.record(DriverCall::Rollback(token.0));
		if self.shared.failures.lock().rollback {
			return err!(rollback_failed("injected failure"));
		}
		Ok(())
	}
}

impl Listeners for MemoryDriver {
	fn notify_listeners(&self, tables: &IndexSet<String>) {
		self.record(DriverCall::Notify(tables.iter().cloned().collect()));
		self.shared.listeners.notify_listeners(tables);
	}

	fn add_listener(&self, listener: Arc<dyn QueryListener>, tables: &[&str]) {
		self.shared.listeners.add_listener(listener, tables);
	}

	fn remove_listener(&self, listener: &Arc<dyn QueryListener>, tables: &[&str]) {
		self.shared.listeners.remove_listener(listener, tables);
	}
}

impl Driver for MemoryDriver {
	type Token = MemoryToken;

	fn begin_transaction(&self) -> Result<MemoryToken> {
		self.begin()
	}

	fn commit(&self, token: MemoryToken) -> Result<()> {
		self.finish_commit(token)
	}

	fn rollback(&self, token: MemoryToken) -> Result<()> {
		self.finish_rollback(token)
	}
}

#[async_trait]
impl AsyncDriver for MemoryDriver {
	type Token = MemoryToken;

	async fn begin_transaction(&self) -> Result<MemoryToken> {
		tokio::task::yield_now().await;
		self.begin()
	}

	async fn commit(&self, token: MemoryToken) -> Result<()> {
		tokio::task::yield_now().await;
		self.finish_commit(token)
	}

	async fn rollback(&self, token: MemoryToken) -> Result<()> {
		tokio::task::yield_now().await;
		self.finish_rollback(token)
	}

	fn abandon(&self, token: MemoryToken) {
		self.record(DriverCall::Abandon(token.0));
	}
}

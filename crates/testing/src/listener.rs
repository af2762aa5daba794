// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::{
	Arc,
	atomic::{AtomicUsize, Ordering},
};

use weft_transaction::QueryListener;

/// Counts how often the results of a query were reported as changed.
#[derive(Debug, Default)]
pub struct CountingListener {
	count: AtomicUsize,
}

impl CountingListener {
	pub fn new() -> Arc<Self> {
		Arc::new(Self::default())
	}

	pub fn count(&self) -> usize {
		self.count.load(Ordering::SeqCst)
	}
}

impl QueryListener for CountingListener {
	fn query_results_changed(&self) {
		self.count.fetch_add(1, Ordering::SeqCst);
	}
}

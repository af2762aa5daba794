// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{collections::HashMap, sync::Arc};

use indexmap::IndexSet;
use parking_lot::RwLock;
use tracing::trace;

/// Observes the results of a query; called when a table it reads from changed.
pub trait QueryListener: Send + Sync {
	fn query_results_changed(&self);
}

/// Query listeners keyed by table name.
///
/// Drivers embed a registry to implement [`Listeners`](crate::Listeners).
#[derive(Default)]
pub struct ListenerRegistry {
	listeners: RwLock<HashMap<String, Vec<Arc<dyn QueryListener>>>>,
}

impl ListenerRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn add_listener(&self, listener: Arc<dyn QueryListener>, tables: &[&str]) {
		let mut listeners = self.listeners.write();
		for table in tables {
			let entry = listeners.entry(table.to_string()).or_default();
			if !entry.iter().any(|existing| same(existing, &listener)) {
				entry.push(listener.clone());
			}
		}
	}

	pub fn remove_listener(&self, listener: &Arc<dyn QueryListener>, tables: &[&str]) {
		let mut listeners = self.listeners.write();
		for table in tables {
			if let Some(entry) = listeners.get_mut(*table) {
				entry.retain(|existing| !same(existing, listener));
				if entry.is_empty() {
					listeners.remove(*table);
				}
			}
		}
	}

	/// Notifies each listener observing any of `tables` exactly once.
	pub fn notify_listeners(&self, tables: &IndexSet<String>) {
		let targets = {
			let listeners = self.listeners.read();
			let mut targets: Vec<Arc<dyn QueryListener>> = Vec::new();
			for table in tables {
				for listener in listeners.get(table).into_iter().flatten() {
					if !targets.iter().any(|target| same(target, listener)) {
						targets.push(listener.clone());
					}
				}
			}
			targets
		};

		trace!(?tables, listeners = targets.len(), "notifying query listeners");
		// listeners run unlocked so they may re-register themselves
		for listener in targets {
			listener.query_results_changed();
		}
	}

	pub fn listener_count(&self, table: &str) -> usize {
		self.listeners.read().get(table).map_or(0, Vec::len)
	}
}

fn same(left: &Arc<dyn QueryListener>, right: &Arc<dyn QueryListener>) -> bool {
	std::ptr::addr_eq(Arc::as_ptr(left), Arc::as_ptr(right))
}

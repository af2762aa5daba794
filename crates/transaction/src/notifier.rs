// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use indexmap::IndexSet;
use tracing::{instrument, trace};
use weft_type::Result;

use crate::{
	change::MutationId,
	context::{Confinement, ContextId},
	driver::Listeners,
	stack::ContextStack,
};

/// Routes table change notifications.
///
/// Inside a transaction the changed tables are buffered in the current
/// transaction and flushed once after the physical commit; outside of one
/// the driver's listeners are notified right away.
pub struct ChangeNotifier<'a, T, L: ?Sized> {
	stack: &'a ContextStack<T>,
	listeners: &'a L,
	confinement: Confinement,
}

impl<'a, T, L> ChangeNotifier<'a, T, L>
where
	L: Listeners + ?Sized,
{
	pub(crate) fn new(stack: &'a ContextStack<T>, listeners: &'a L, confinement: Confinement) -> Self {
		Self {
			stack,
			listeners,
			confinement,
		}
	}

	/// Reports that `mutation` changed the tables produced by `tables`.
	///
	/// Within one transaction a given mutation contributes its tables once;
	/// `tables` is not called again for a mutation already seen.
	#[instrument(name = "transaction::notify_queries", level = "trace", skip(self, tables))]
	pub fn notify_queries<F, I, S>(&self, mutation: MutationId, tables: F) -> Result<()>
	where
		F: FnOnce() -> I,
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let context = ContextId::current(self.confinement);
		if let Some(handle) = self.stack.current(context) {
			handle.record_changes(mutation, tables)?;
			return Ok(());
		}

		let tables: IndexSet<String> = tables().into_iter().map(Into::into).collect();
		if !tables.is_empty() {
			trace!(?tables, "no transaction, notifying listeners immediately");
			self.listeners.notify_listeners(&tables);
		}
		Ok(())
	}
}

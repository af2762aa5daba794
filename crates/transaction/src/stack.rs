// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{collections::HashMap, sync::Arc};

use parking_lot::Mutex;
use weft_type::{Result, return_internal_error};

use crate::{context::ContextId, error::TransactionError, handle::TransactionHandle};

/// The current transaction of every execution context, together with the
/// physical transaction token held by its outermost transaction.
pub(crate) struct ContextStack<T> {
	frames: Mutex<HashMap<ContextId, Frame<T>>>,
}

struct Frame<T> {
	current: Arc<TransactionHandle>,
	token: Option<T>,
}

impl<T> ContextStack<T> {
	pub(crate) fn new() -> Self {
		Self {
			frames: Mutex::new(HashMap::new()),
		}
	}

	pub(crate) fn current(&self, context: ContextId) -> Option<Arc<TransactionHandle>> {
		self.frames.lock().get(&context).map(|frame| frame.current.clone())
	}

	/// Makes `handle` the current transaction of its owner. The token is only
	/// kept for an outermost handle.
	pub(crate) fn push(&self, handle: Arc<TransactionHandle>, token: Option<T>) {
		let mut frames = self.frames.lock();
		match frames.get_mut(&handle.owner()) {
			Some(frame) => frame.current = handle,
			None => {
				frames.insert(
					handle.owner(),
					Frame {
						current: handle,
						token,
					},
				);
			}
		}
	}

	/// Restores the enclosing transaction of `handle` as current. Returns the
	/// physical token when `handle` was the outermost transaction.
	pub(crate) fn pop(&self, handle: &TransactionHandle) -> Result<Option<T>> {
		let mut frames = self.frames.lock();
		let owner = handle.owner();

		let Some(frame) = frames.get_mut(&owner) else {
			return Err(TransactionError::NotInnermost {
				transaction: handle.id(),
			}
			.into());
		};

		if frame.current.id() != handle.id() {
			return Err(TransactionError::NotInnermost {
				transaction: handle.id(),
			}
			.into());
		}

		if handle.is_outermost() {
			return Ok(frames.remove(&owner).and_then(|frame| frame.token));
		}

		let Some(enclosing) = handle.enclosing() else {
			return_internal_error!("transaction enclosing {} was dropped before it ended", handle.id());
		};
		frame.current = enclosing;
		Ok(None)
	}

	#[cfg(test)]
	pub(crate) fn is_empty(&self) -> bool {
		self.frames.lock().is_empty()
	}
}

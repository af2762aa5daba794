// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt::{Debug, Formatter};

use tracing::{trace, warn};
use weft_type::{Error, Result};

/// A callback run once after the outermost transaction commits or rolls back.
pub type Hook = Box<dyn FnOnce() -> Result<()> + Send + 'static>;

/// Hooks in registration order.
#[derive(Default)]
pub struct HookList {
	hooks: Vec<Hook>,
}

impl HookList {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn push(&mut self, hook: Hook) {
		self.hooks.push(hook);
	}

	pub fn append(&mut self, other: HookList) {
		self.hooks.extend(other.hooks);
	}

	pub fn len(&self) -> usize {
		self.hooks.len()
	}

	pub fn is_empty(&self) -> bool {
		self.hooks.is_empty()
	}

	/// Runs every hook in order, even after a failure. The first failure is
	/// returned; later ones are attached to it as notes.
	pub fn run(self, kind: &'static str) -> Result<()> {
		let mut failure: Option<Error> = None;

		for (index, hook) in self.hooks.into_iter().enumerate() {
			trace!(kind, index, "running hook");
			if let Err(err) = hook() {
				warn!(kind, index, code = %err.code, "hook failed");
				failure = Some(match failure {
					None => err,
					Some(first) => weft_type::error!(first.diagnostic().with_note(format!(
						"{} hook #{} also failed: error[{}]: {}",
						kind, index, err.code, err.message
					))),
				});
			}
		}

		failure.map_or(Ok(()), Err)
	}
}

impl Debug for HookList {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("HookList").field("len", &self.hooks.len()).finish()
	}
}

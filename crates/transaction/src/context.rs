// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	fmt::{Display, Formatter},
	thread::{self, ThreadId},
};

use tokio::task;

/// How the execution context owning a transaction is identified.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Confinement {
	/// The current tokio task when running inside one, the OS thread otherwise.
	#[default]
	Task,
	/// Always the OS thread. Only suitable for synchronous drivers, since a
	/// task may resume on another worker thread after a suspension point.
	Thread,
}

/// Identity of the thread or task a transaction is confined to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextId {
	Thread(ThreadId),
	Task(task::Id),
}

impl ContextId {
	pub fn current(confinement: Confinement) -> Self {
		match confinement {
			Confinement::Thread => Self::thread(),
			Confinement::Task => task::try_id().map(Self::Task).unwrap_or_else(Self::thread),
		}
	}

	/// Whether the caller, identified under `confinement`, is this context.
	/// A thread context is not current for a task running on that thread
	/// when tasks are told apart.
	pub fn is_current(&self, confinement: Confinement) -> bool {
		Self::current(confinement) == *self
	}

	fn thread() -> Self {
		Self::Thread(thread::current().id())
	}
}

impl Display for ContextId {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Thread(id) => write!(f, "thread {:?}", id),
			Self::Task(id) => write!(f, "task {}", id),
		}
	}
}

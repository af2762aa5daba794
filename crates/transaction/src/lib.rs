// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Nested transactions over a single physical connection.
//!
//! A [`Transacter`] (or [`AsyncTransacter`] for asynchronous drivers) runs
//! transaction bodies against a scope that can register commit and rollback
//! hooks, roll the whole transaction back, and open nested transactions.
//! Only the outermost transaction of an execution context talks to the
//! driver; nested ones merge their hooks and table changes into the
//! transaction that encloses them.
//!
//! Table changes recorded through [`Transacter::notify_queries`] are
//! coalesced per physical transaction and delivered to the driver's
//! listeners once, after the commit.

use std::fmt::{Display, Formatter};

use uuid::Uuid;

pub mod asynchronous;
pub mod change;
pub mod config;
pub mod context;
pub mod driver;
pub mod error;
mod finish;
pub mod handle;
pub mod hook;
pub mod interceptor;
pub mod listener;
pub mod manager;
pub mod notifier;
pub mod scope;
mod stack;
pub mod transacter;

pub use asynchronous::{AsyncTransacter, AsyncTransactionWithReturn, AsyncTransactionWithoutReturn};
pub use change::{ChangeSet, MutationId};
pub use config::{TransacterBuilder, TransacterConfig};
pub use context::{Confinement, ContextId};
pub use driver::{AsyncDriver, Driver, Listeners};
pub use error::{Abort, Rollback, TransactionError, TransactionResult};
pub use handle::{TransactionHandle, TransactionState};
pub use listener::{ListenerRegistry, QueryListener};
pub use scope::{TransactionWithReturn, TransactionWithoutReturn};
pub use transacter::Transacter;
pub use weft_type::{Error, Result};

/// A unique identifier for a transaction using UUIDv7 for time-ordered
/// uniqueness
#[repr(transparent)]
#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct TransactionId(Uuid);

impl Default for TransactionId {
	fn default() -> Self {
		Self::generate()
	}
}

impl TransactionId {
	pub fn generate() -> Self {
		Self(Uuid::now_v7())
	}
}

impl Display for TransactionId {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

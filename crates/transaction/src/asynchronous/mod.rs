// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Transactions over an [`AsyncDriver`](crate::AsyncDriver).
//!
//! Bookkeeping is the same as for synchronous drivers; the only suspension
//! points are the driver's begin, commit and rollback. Dropping the future
//! of a transaction body abandons the transaction: it is rolled back and
//! removed from its context.

mod manager;
mod scope;
mod transacter;

pub use manager::AsyncTransactionManager;
pub use scope::{AsyncTransactionWithReturn, AsyncTransactionWithoutReturn};
pub use transacter::AsyncTransacter;

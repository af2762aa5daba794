// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	panic::{AssertUnwindSafe, catch_unwind},
	sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	},
};

use weft_testing::{DriverCall, MemoryDriver};
use weft_transaction::{Transacter, TransactionState};

fn setup() -> (MemoryDriver, Transacter<MemoryDriver>) {
	weft_testing::tracing::init();
	let driver = MemoryDriver::new();
	(driver.clone(), Transacter::new(driver))
}

#[test]
fn test_panicking_body_rolls_back() {
	let (driver, transacter) = setup();
	let rollbacks = Arc::new(AtomicUsize::new(0));
	let mut kept = None;

	let counter = rollbacks.clone();
	let result = catch_unwind(AssertUnwindSafe(|| {
		transacter.transaction(false, |tx| {
			kept = Some(tx.handle().clone());
			tx.after_rollback(move || {
				counter.fetch_add(1, Ordering::SeqCst);
				Ok(())
			})?;
			tx.after_commit(|| panic!("commit hook of a panicked transaction"))?;
			panic!("boom")
		})
	}));

	assert!(result.is_err());
	assert_eq!(rollbacks.load(Ordering::SeqCst), 1);
	assert_eq!(kept.unwrap().state(), TransactionState::Ended);
	assert!(transacter.current_transaction().is_none());
	assert_eq!(driver.calls(), vec![DriverCall::Begin(0), DriverCall::Rollback(0)]);

	transacter.transaction(true, |_| Ok(())).unwrap();
	assert_eq!(driver.calls()[2..], [DriverCall::Begin(1), DriverCall::Commit(1)]);
}

#[test]
fn test_panicking_nested_body_fails_enclosing() {
	let (driver, transacter) = setup();

	transacter
		.transaction(false, |tx| {
			let caught = catch_unwind(AssertUnwindSafe(|| tx.transaction(|_| panic!("inner"))));
			assert!(caught.is_err());

			assert_eq!(transacter.current_transaction().unwrap().id(), tx.id());
			assert!(!tx.handle().children_successful());
			Ok(())
		})
		.unwrap();

	assert_eq!(driver.calls(), vec![DriverCall::Begin(0), DriverCall::Rollback(0)]);
}

#[test]
fn test_panicking_nested_body_hooks_move_to_enclosing() {
	let (driver, transacter) = setup();
	let rollbacks = Arc::new(AtomicUsize::new(0));

	let counter = rollbacks.clone();
	let result = catch_unwind(AssertUnwindSafe(|| {
		transacter.transaction(false, |tx| {
			tx.transaction(|tx| {
				tx.after_rollback(move || {
					counter.fetch_add(1, Ordering::SeqCst);
					Ok(())
				})?;
				panic!("inner")
			})
		})
	}));

	assert!(result.is_err());
	assert_eq!(rollbacks.load(Ordering::SeqCst), 1);
	assert_eq!(driver.rollbacks(), 1);
	assert!(transacter.current_transaction().is_none());
}

// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	sync::{
		Arc,
		atomic::{AtomicBool, Ordering},
	},
	thread,
};

use weft_testing::{DriverCall, MemoryDriver};
use weft_transaction::{Confinement, Transacter, TransactionError};

fn setup() -> (MemoryDriver, Transacter<MemoryDriver>) {
	weft_testing::tracing::init();
	let driver = MemoryDriver::new();
	let transacter = Transacter::builder(driver.clone()).confinement(Confinement::Thread).build();
	(driver, transacter)
}

#[test]
fn test_after_commit_from_other_thread_is_rejected() {
	let (driver, transacter) = setup();
	let ran = Arc::new(AtomicBool::new(false));

	let flag = ran.clone();
	transacter
		.transaction(false, |tx| {
			let handle = tx.handle().clone();
			let result = thread::spawn(move || {
				handle.after_commit(move || {
					flag.store(true, Ordering::SeqCst);
					Ok(())
				})
			})
			.join()
			.unwrap();

			assert!(matches!(result, Err(TransactionError::ConfinementViolation { .. })));
			Ok(())
		})
		.unwrap();

	assert!(!ran.load(Ordering::SeqCst));
	assert_eq!(driver.calls(), vec![DriverCall::Begin(0), DriverCall::Commit(0)]);
}

#[test]
fn test_scope_operations_from_other_thread_are_rejected() {
	let (driver, transacter) = setup();

	transacter
		.transaction(false, |tx| {
			thread::scope(|s| {
				let hook = s.spawn(|| tx.after_rollback(|| Ok(())).unwrap_err());
				assert_eq!(hook.join().unwrap().code, "TXN_002");

				let rollback = s.spawn(|| tx.rollback::<()>().unwrap_err().into_error());
				assert_eq!(rollback.join().unwrap().code, "TXN_002");

				let nested = s.spawn(|| tx.transaction(|_| Ok(())).unwrap_err().into_error());
				assert_eq!(nested.join().unwrap().code, "TXN_002");
			});

			// the rejected calls left the transaction as it was
			assert!(tx.handle().children_successful());
			Ok(())
		})
		.unwrap();

	assert_eq!(driver.calls(), vec![DriverCall::Begin(0), DriverCall::Commit(0)]);
}

#[test]
fn test_other_thread_gets_its_own_transaction() {
	let (driver, transacter) = setup();

	transacter
		.transaction(false, |tx| {
			let remote = transacter.clone();
			let outer = tx.id();
			thread::spawn(move || {
				remote
					.transaction(true, |tx| {
						assert_ne!(tx.id(), outer);
						assert!(tx.handle().is_outermost());
						Ok(())
					})
					.unwrap();
			})
			.join()
			.unwrap();
			Ok(())
		})
		.unwrap();

	assert_eq!(driver.begins(), 2);
	assert_eq!(driver.commits(), 2);
}

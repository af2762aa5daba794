// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::{
	Arc,
	atomic::{AtomicBool, AtomicUsize, Ordering},
};

use weft_testing::{DriverCall, MemoryDriver};
use weft_transaction::{Abort, Transacter, TransactionState};
use weft_type::{error, error::diagnostic::application::failure};

fn setup() -> (MemoryDriver, Transacter<MemoryDriver>) {
	weft_testing::tracing::init();
	let driver = MemoryDriver::new();
	(driver.clone(), Transacter::new(driver))
}

fn counting(counter: &Arc<AtomicUsize>) -> impl FnOnce() -> weft_type::Result<()> + Send + 'static {
	let counter = counter.clone();
	move || {
		counter.fetch_add(1, Ordering::SeqCst);
		Ok(())
	}
}

#[test]
fn test_outermost_transaction_commits() {
	let (driver, transacter) = setup();

	transacter.transaction(false, |_| Ok(())).unwrap();

	assert_eq!(driver.calls(), vec![DriverCall::Begin(0), DriverCall::Commit(0)]);
}

#[test]
fn test_nested_transactions_share_one_physical_transaction() {
	let (driver, transacter) = setup();

	transacter.transaction(false, |tx| tx.transaction(|tx| tx.transaction(|tx| tx.transaction(|_| Ok(()))))).unwrap();

	assert_eq!(driver.calls(), vec![DriverCall::Begin(0), DriverCall::Commit(0)]);
}

#[test]
fn test_sequential_transactions_each_begin() {
	let (driver, transacter) = setup();

	transacter.transaction(false, |_| Ok(())).unwrap();
	transacter.transaction(false, |_| Ok(())).unwrap();

	assert_eq!(driver.begins(), 2);
	assert_eq!(driver.commits(), 2);
}

#[test]
fn test_rollback_unwinds_every_enclosing_scope() {
	let (driver, transacter) = setup();
	let rollbacks = Arc::new(AtomicUsize::new(0));
	let reached = AtomicBool::new(false);

	let counter = rollbacks.clone();
	let result = transacter.transaction(false, |tx| {
		tx.after_rollback(move || {
			counter.fetch_add(1, Ordering::SeqCst);
			Ok(())
		})?;
		tx.transaction(|tx| tx.rollback())?;
		reached.store(true, Ordering::SeqCst);
		Ok(())
	});

	assert!(result.is_ok());
	assert_eq!(rollbacks.load(Ordering::SeqCst), 1);
	assert!(!reached.load(Ordering::SeqCst));
	assert_eq!(driver.calls(), vec![DriverCall::Begin(0), DriverCall::Rollback(0)]);
}

#[test]
fn test_rollback_deep_runs_every_level_rollback_hook_once() {
	let (driver, transacter) = setup();
	let rollbacks = Arc::new(AtomicUsize::new(0));
	let commits = Arc::new(AtomicUsize::new(0));

	let result = transacter.transaction(false, |tx| {
		tx.after_rollback(counting(&rollbacks))?;
		tx.after_commit(counting(&commits))?;
		tx.transaction(|tx| {
			tx.after_rollback(counting(&rollbacks))?;
			tx.after_commit(counting(&commits))?;
			tx.transaction(|tx| {
				tx.after_rollback(counting(&rollbacks))?;
				tx.after_commit(counting(&commits))?;
				tx.rollback()
			})
		})
	});

	assert!(result.is_ok());
	assert_eq!(rollbacks.load(Ordering::SeqCst), 3);
	assert_eq!(commits.load(Ordering::SeqCst), 0);
	assert_eq!(driver.rollbacks(), 1);
	assert_eq!(driver.commits(), 0);
}

#[test]
fn test_failed_nested_transaction_rolls_back_outermost() {
	let (driver, transacter) = setup();

	let result = transacter.transaction(false, |tx| {
		let nested = tx.transaction(|_| Err(Abort::Failed(error!(failure("nested failed")))));
		assert!(nested.is_err());
		Ok(())
	});

	// the body recovered, but the physical transaction cannot commit
	assert!(result.is_ok());
	assert_eq!(driver.calls(), vec![DriverCall::Begin(0), DriverCall::Rollback(0)]);
}

#[test]
fn test_no_enclosing_inside_transaction_fails() {
	let (driver, transacter) = setup();

	let result = transacter.transaction(true, |_| transacter.transaction(true, |_| Ok(())));

	let err = result.unwrap_err().into_error();
	assert_eq!(err.code, "TXN_001");
	assert_eq!(driver.calls(), vec![DriverCall::Begin(0), DriverCall::Rollback(0)]);
}

#[test]
fn test_no_enclosing_failure_leaves_running_transaction_untouched() {
	let (driver, transacter) = setup();

	transacter
		.transaction(false, |tx| {
			let inner = transacter.transaction(true, |_| Ok(()));
			assert_eq!(inner.unwrap_err().into_error().code, "TXN_001");
			assert_eq!(transacter.current_transaction().unwrap().id(), tx.id());
			Ok(())
		})
		.unwrap();

	assert_eq!(driver.calls(), vec![DriverCall::Begin(0), DriverCall::Commit(0)]);
}

#[test]
fn test_transacter_call_inside_body_nests() {
	let (driver, transacter) = setup();

	transacter
		.transaction(false, |outer| {
			transacter.transaction(false, |inner| {
				assert_eq!(inner.handle().depth(), 1);
				assert_eq!(inner.handle().enclosing().unwrap().id(), outer.id());
				Ok(())
			})
		})
		.unwrap();

	assert_eq!(driver.begins(), 1);
}

#[test]
fn test_current_transaction_tracks_nesting() {
	let (_, transacter) = setup();
	assert!(transacter.current_transaction().is_none());

	transacter
		.transaction(false, |outer| {
			assert_eq!(transacter.current_transaction().unwrap().id(), outer.id());
			outer.transaction(|inner| {
				let current = transacter.current_transaction().unwrap();
				assert_eq!(current.id(), inner.id());
				assert_eq!(current.depth(), 1);
				Ok(())
			})?;
			assert_eq!(transacter.current_transaction().unwrap().id(), outer.id());
			Ok(())
		})
		.unwrap();

	assert!(transacter.current_transaction().is_none());
}

#[test]
fn test_handle_is_ended_after_transaction() {
	let (_, transacter) = setup();
	let mut kept = None;

	transacter
		.transaction(false, |tx| {
			assert_eq!(tx.handle().state(), TransactionState::Running);
			kept = Some(tx.handle().clone());
			Ok(())
		})
		.unwrap();

	let handle = kept.unwrap();
	assert_eq!(handle.state(), TransactionState::Ended);
	assert!(handle.is_successful());

	let err = handle.after_commit(|| Ok(())).unwrap_err();
	assert_eq!(weft_type::Error::from(err).code, "TXN_003");
}

#[test]
fn test_begin_failure_skips_body() {
	let (driver, transacter) = setup();
	driver.fail_begin(true);
	let ran = AtomicBool::new(false);

	let result = transacter.transaction(false, |_| {
		ran.store(true, Ordering::SeqCst);
		Ok(())
	});

	assert_eq!(result.unwrap_err().into_error().code, "DRV_001");
	assert!(!ran.load(Ordering::SeqCst));
	assert!(transacter.current_transaction().is_none());
}

// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::atomic::{AtomicUsize, Ordering};

use weft_testing::{CountingListener, DriverCall, MemoryDriver};
use weft_transaction::{Listeners, Transacter};

fn setup() -> (MemoryDriver, Transacter<MemoryDriver>) {
	weft_testing::tracing::init();
	let driver = MemoryDriver::new();
	(driver.clone(), Transacter::new(driver))
}

fn tables(names: &[&str]) -> Vec<String> {
	names.iter().map(|name| name.to_string()).collect()
}

#[test]
fn test_changes_are_flushed_once_after_commit() {
	let (driver, transacter) = setup();
	let listener = CountingListener::new();
	driver.add_listener(listener.clone(), &["data"]);

	transacter
		.transaction(false, |tx| {
			tx.notify_queries(1, || ["data"])?;
			tx.notify_queries(2, || ["data"])?;
			assert_eq!(listener.count(), 0);
			Ok(())
		})
		.unwrap();

	assert_eq!(listener.count(), 1);
	assert_eq!(
		driver.calls(),
		vec![DriverCall::Begin(0), DriverCall::Commit(0), DriverCall::Notify(tables(&["data"]))]
	);
}

#[test]
fn test_nested_changes_are_coalesced_into_outermost() {
	let (driver, transacter) = setup();

	transacter
		.transaction(false, |tx| {
			tx.notify_queries(1, || ["users"])?;
			tx.transaction(|tx| {
				tx.notify_queries(2, || ["orders", "users"])?;
				tx.transaction(|tx| tx.notify_queries(3, || ["items"]).map_err(Into::into))
			})?;
			assert_eq!(tx.handle().dirtied_tables(), tables(&["users", "orders", "items"]));
			Ok(())
		})
		.unwrap();

	assert_eq!(driver.notifications(), vec![tables(&["users", "orders", "items"])]);
}

#[test]
fn test_same_mutation_walks_tables_once() {
	let (driver, transacter) = setup();
	let walks = AtomicUsize::new(0);

	let provider = || {
		walks.fetch_add(1, Ordering::SeqCst);
		vec!["data"]
	};

	transacter
		.transaction(false, |tx| {
			tx.notify_queries(7, provider)?;
			tx.notify_queries(7, provider)?;
			tx.transaction(|tx| tx.notify_queries(7, provider).map_err(Into::into))?;
			Ok(())
		})
		.unwrap();

	// the nested transaction has its own dedup set until it merges
	assert_eq!(walks.load(Ordering::SeqCst), 2);
	assert_eq!(driver.notifications(), vec![tables(&["data"])]);
}

#[test]
fn test_changes_are_discarded_on_rollback() {
	let (driver, transacter) = setup();
	let listener = CountingListener::new();
	driver.add_listener(listener.clone(), &["data"]);

	transacter
		.transaction(false, |tx| {
			tx.notify_queries(1, || ["data"])?;
			tx.rollback()
		})
		.unwrap();

	assert_eq!(listener.count(), 0);
	assert!(driver.notifications().is_empty());
}

#[test]
fn test_outside_transaction_notifies_immediately() {
	let (driver, transacter) = setup();
	let listener = CountingListener::new();
	driver.add_listener(listener.clone(), &["data"]);

	transacter.notify_queries(1, || ["data"]).unwrap();
	transacter.notify_queries(1, || ["data"]).unwrap();

	assert_eq!(listener.count(), 2);
	assert_eq!(driver.begins(), 0);
}

#[test]
fn test_transaction_without_changes_does_not_notify() {
	let (driver, transacter) = setup();

	transacter.transaction(false, |_| Ok(())).unwrap();

	assert!(driver.notifications().is_empty());
}

#[test]
fn test_listener_on_several_dirtied_tables_is_notified_once() {
	let (driver, transacter) = setup();
	let both = CountingListener::new();
	let orders = CountingListener::new();
	let unrelated = CountingListener::new();
	driver.add_listener(both.clone(), &["users", "orders"]);
	driver.add_listener(orders.clone(), &["orders"]);
	driver.add_listener(unrelated.clone(), &["audit"]);

	transacter
		.transaction(false, |tx| {
			tx.notify_queries(1, || ["users"])?;
			tx.notify_queries(2, || ["orders"])?;
			Ok(())
		})
		.unwrap();

	assert_eq!(both.count(), 1);
	assert_eq!(orders.count(), 1);
	assert_eq!(unrelated.count(), 0);
}

#[test]
fn test_removed_listener_is_not_notified() {
	let (driver, transacter) = setup();
	let listener = CountingListener::new();
	let registered: std::sync::Arc<dyn weft_transaction::QueryListener> = listener.clone();
	driver.add_listener(registered.clone(), &["data"]);
	driver.remove_listener(&registered, &["data"]);

	transacter.transaction(false, |tx| tx.notify_queries(1, || ["data"]).map_err(Into::into)).unwrap();

	assert_eq!(listener.count(), 0);
	assert_eq!(driver.registry().listener_count("data"), 0);
}

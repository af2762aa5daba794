// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Polling instead of fixed sleeps, for effects that land on another task.

use std::time::{Duration, Instant};

use tokio::time::sleep;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Polls `condition` every `poll_interval` until it holds.
///
/// # Panics
/// Panics if the condition doesn't become true within `timeout`
pub async fn wait_for_condition<F>(condition: F, timeout: Duration, poll_interval: Duration, message: &str)
where
	F: Fn() -> bool,
{
	let start = Instant::now();
	while !condition() {
		if start.elapsed() > timeout {
			panic!("Timeout after {:?}: {}", timeout, message);
		}
		sleep(poll_interval).await;
	}
}

/// Wait for a condition with default timeout and poll interval
pub async fn wait_for<F>(condition: F, message: &str)
where
	F: Fn() -> bool,
{
	wait_for_condition(condition, DEFAULT_TIMEOUT, DEFAULT_POLL_INTERVAL, message).await;
}

#[cfg(test)]
pub mod tests {
	use std::sync::{
		Arc,
		atomic::{AtomicBool, Ordering},
	};

	use super::*;

	#[tokio::test]
	async fn test_wait_for_immediate() {
		wait_for(|| true, "Should not timeout").await;
	}

	#[tokio::test]
	async fn test_wait_for_spawned_task() {
		let done = Arc::new(AtomicBool::new(false));
		let flag = done.clone();
		tokio::spawn(async move {
			sleep(Duration::from_millis(20)).await;
			flag.store(true, Ordering::SeqCst);
		});

		wait_for(|| done.load(Ordering::SeqCst), "task should set the flag").await;
	}

	#[tokio::test]
	#[should_panic(expected = "Timeout after")]
	async fn test_wait_for_timeout() {
		wait_for_condition(|| false, Duration::from_millis(10), Duration::from_millis(1), "never").await;
	}
}

// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use tracing_subscriber::{EnvFilter, fmt};

/// Installs a subscriber writing to the test output, filtered by `RUST_LOG`
/// (default `warn`). Calling it more than once is harmless.
pub fn init() {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
	let _ = fmt().with_env_filter(filter).with_test_writer().with_target(true).try_init();
}

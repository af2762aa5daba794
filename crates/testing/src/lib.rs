// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Test support: an in-memory driver that records every call it receives,
//! a counting query listener and a tracing subscriber for tests.

pub mod driver;
pub mod listener;
pub mod tracing;
pub mod util;

pub use driver::{DriverCall, MemoryDriver, MemoryToken};
pub use listener::CountingListener;

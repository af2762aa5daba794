// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

pub mod error;

pub use error::{Error, diagnostic::Diagnostic};

pub type Result<T> = std::result::Result<T, Error>;

// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use crate::error::diagnostic::Diagnostic;

/// Failure raised by caller code running inside a transaction body or hook
pub fn failure(message: impl Into<String>) -> Diagnostic {
	Diagnostic {
		code: "APP_001".to_string(),
		message: message.into(),
		label: None,
		help: None,
		notes: vec![],
		cause: None,
	}
}

// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use crate::error::diagnostic::Diagnostic;

/// The driver could not open a physical transaction
pub fn begin_failed(reason: impl Into<String>) -> Diagnostic {
	Diagnostic {
		code: "DRV_001".to_string(),
		message: format!("Failed to begin transaction: {}", reason.into()),
		label: None,
		help: Some("Check that the connection is open and not already inside a transaction".to_string()),
		notes: vec![],
		cause: None,
	}
}

/// The driver could not commit the physical transaction
pub fn commit_failed(reason: impl Into<String>) -> Diagnostic {
	Diagnostic {
		code: "DRV_002".to_string(),
		message: format!("Failed to commit transaction: {}", reason.into()),
		label: None,
		help: Some("The transaction was not applied; retry it if appropriate".to_string()),
		notes: vec!["Post-commit hooks were not run and table change notifications were discarded".to_string()],
		cause: None,
	}
}

/// The driver could not roll back the physical transaction
pub fn rollback_failed(reason: impl Into<String>) -> Diagnostic {
	Diagnostic {
		code: "DRV_003".to_string(),
		message: format!("Failed to roll back transaction: {}", reason.into()),
		label: None,
		help: Some("The connection may be in an unknown state and should be discarded".to_string()),
		notes: vec![],
		cause: None,
	}
}

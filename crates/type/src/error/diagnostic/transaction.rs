// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use crate::error::diagnostic::Diagnostic;

/// A transaction that must not be nested was started inside another one
pub fn already_in_transaction(context: impl Into<String>) -> Diagnostic {
	Diagnostic {
		code: "TXN_001".to_string(),
		message: format!("Already in a transaction on {}", context.into()),
		label: None,
		help: Some("Pass no_enclosing = false to nest it, or start it outside the running transaction".to_string()),
		notes: vec![],
		cause: None,
	}
}

/// A transaction was touched from an execution context other than the one that created it
pub fn confinement_violation(
	transaction: impl Into<String>,
	owner: impl Into<String>,
	caller: impl Into<String>,
) -> Diagnostic {
	Diagnostic {
		code: "TXN_002".to_string(),
		message: format!("Transaction {} is confined to {} but was used from {}", transaction.into(), owner.into(), caller.into()),
		label: None,
		help: Some("Register hooks, roll back and nest transactions only from the thread or task that started the transaction".to_string()),
		notes: vec!["The transaction itself was left unchanged".to_string()],
		cause: None,
	}
}

/// An operation was attempted on a transaction that is no longer running
pub fn invalid_handle_state(
	transaction: impl Into<String>,
	state: impl Into<String>,
	operation: impl Into<String>,
) -> Diagnostic {
	Diagnostic {
		code: "TXN_003".to_string(),
		message: format!("Cannot {} transaction {} in state {}", operation.into(), transaction.into(), state.into()),
		label: None,
		help: Some("A transaction can only be used while its body is running".to_string()),
		notes: vec![],
		cause: None,
	}
}

/// The transaction body failed and a rollback step failed while unwinding
pub fn rollback_failed_after_error(original: Diagnostic, rollback: Diagnostic) -> Diagnostic {
	let notes = vec![
		format!("original error: error[{}]: {}", original.code, original.message),
		format!("rollback error: error[{}]: {}", rollback.code, rollback.message),
	];

	Diagnostic {
		code: "TXN_004".to_string(),
		message: format!(
			"Error while rolling back from an error: {} (rollback failed with: {})",
			original.message, rollback.message
		),
		label: None,
		help: Some("Both failures are listed; the original error is the first cause".to_string()),
		notes,
		cause: Some(Box::new(original.with_cause(rollback))),
	}
}

/// The value carried by a rollback does not have the type the outermost transaction returns
pub fn rollback_value_mismatch(expected: impl Into<String>) -> Diagnostic {
	Diagnostic {
		code: "TXN_005".to_string(),
		message: format!("Rollback value does not match the transaction result type {}", expected.into()),
		label: None,
		help: Some("Roll back with a value of the outermost transaction's result type".to_string()),
		notes: vec!["The transaction was rolled back".to_string()],
		cause: None,
	}
}

/// A transaction was ended while a transaction nested inside it was still current
pub fn not_innermost(transaction: impl Into<String>) -> Diagnostic {
	Diagnostic {
		code: "TXN_006".to_string(),
		message: format!("Transaction {} is not the innermost transaction of its context", transaction.into()),
		label: None,
		help: Some("End nested transactions before the transaction that encloses them".to_string()),
		notes: vec![],
		cause: None,
	}
}

/// A transaction was rolled back explicitly
pub fn rolled_back(transaction: impl Into<String>) -> Diagnostic {
	Diagnostic {
		code: "TXN_007".to_string(),
		message: format!("Transaction {} was rolled back", transaction.into()),
		label: None,
		help: None,
		notes: vec!["No changes of the transaction were applied".to_string()],
		cause: None,
	}
}

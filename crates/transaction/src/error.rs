// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	any::{Any, type_name},
	fmt::{Debug, Display, Formatter},
};

use weft_type::{
	Error,
	error::diagnostic::{Diagnostic, IntoDiagnostic, transaction as diagnostic},
};

use crate::{TransactionId, context::ContextId, handle::TransactionState};

/// Misuse of the transaction API.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransactionError {
	#[error("already in a transaction on {context}")]
	AlreadyInTransaction {
		context: ContextId,
	},

	#[error("transaction {transaction} is confined to {owner} but was used from {caller}")]
	ConfinementViolation {
		transaction: TransactionId,
		owner: ContextId,
		caller: ContextId,
	},

	#[error("cannot {operation} transaction {transaction} in state {state}")]
	InvalidHandleState {
		transaction: TransactionId,
		state: TransactionState,
		operation: &'static str,
	},

	#[error("transaction {transaction} is not the innermost transaction of its context")]
	NotInnermost {
		transaction: TransactionId,
	},

	#[error("rollback value does not match the transaction result type {expected}")]
	RollbackValueMismatch {
		expected: &'static str,
	},
}

impl IntoDiagnostic for TransactionError {
	fn into_diagnostic(self) -> Diagnostic {
		match self {
			TransactionError::AlreadyInTransaction {
				context,
			} => diagnostic::already_in_transaction(context.to_string()),
			TransactionError::ConfinementViolation {
				transaction,
				owner,
				caller,
			} => diagnostic::confinement_violation(transaction.to_string(), owner.to_string(), caller.to_string()),
			TransactionError::InvalidHandleState {
				transaction,
				state,
				operation,
			} => diagnostic::invalid_handle_state(transaction.to_string(), state.to_string(), operation),
			TransactionError::NotInnermost {
				transaction,
			} => diagnostic::not_innermost(transaction.to_string()),
			TransactionError::RollbackValueMismatch {
				expected,
			} => diagnostic::rollback_value_mismatch(expected),
		}
	}
}

impl From<TransactionError> for Error {
	fn from(err: TransactionError) -> Self {
		weft_type::error!(err.into_diagnostic())
	}
}

/// The unwind signal raised by an explicit rollback.
///
/// It travels through every enclosing transaction body and is turned back
/// into a normal return by the outermost one.
pub struct Rollback {
	transaction: TransactionId,
	value: Option<Box<dyn Any + Send>>,
}

impl Rollback {
	pub(crate) fn new(transaction: TransactionId, value: Option<Box<dyn Any + Send>>) -> Self {
		Self {
			transaction,
			value,
		}
	}

	/// The transaction on which the rollback was requested.
	pub fn transaction(&self) -> TransactionId {
		self.transaction
	}

	pub fn has_value(&self) -> bool {
		self.value.is_some()
	}

	pub(crate) fn into_value<R: 'static>(self) -> Result<R, TransactionError> {
		let mismatch = || TransactionError::RollbackValueMismatch {
			expected: type_name::<R>(),
		};

		match self.value {
			Some(value) => value.downcast::<R>().map(|value| *value).map_err(|_| mismatch()),
			None => Err(mismatch()),
		}
	}
}

impl Debug for Rollback {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Rollback")
			.field("transaction", &self.transaction)
			.field("has_value", &self.value.is_some())
			.finish()
	}
}

/// Why a transaction body stopped before returning a value.
#[derive(Debug)]
pub enum Abort {
	Rollback(Rollback),
	Failed(Error),
}

impl Abort {
	pub fn is_rollback(&self) -> bool {
		matches!(self, Abort::Rollback(_))
	}

	/// Converts into an error, describing a rollback as an aborted transaction.
	pub fn into_error(self) -> Error {
		match self {
			Abort::Rollback(rollback) => weft_type::error!(diagnostic::rolled_back(rollback.transaction.to_string())),
			Abort::Failed(err) => err,
		}
	}
}

impl Display for Abort {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			Abort::Rollback(rollback) => write!(f, "transaction {} rolled back", rollback.transaction),
			Abort::Failed(err) => Display::fmt(err, f),
		}
	}
}

impl std::error::Error for Abort {}

impl From<Error> for Abort {
	fn from(err: Error) -> Self {
		Abort::Failed(err)
	}
}

impl From<TransactionError> for Abort {
	fn from(err: TransactionError) -> Self {
		Abort::Failed(err.into())
	}
}

pub type TransactionResult<T> = std::result::Result<T, Abort>;

// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

pub mod application;
pub mod driver;
pub mod internal;
pub mod render;
pub mod transaction;

/// A structured, renderable description of a failure.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Diagnostic {
	pub code: String,
	pub message: String,
	pub label: Option<String>,
	pub help: Option<String>,
	pub notes: Vec<String>,
	pub cause: Option<Box<Diagnostic>>,
}

pub trait IntoDiagnostic {
	fn into_diagnostic(self) -> Diagnostic;
}

impl IntoDiagnostic for Diagnostic {
	fn into_diagnostic(self) -> Diagnostic {
		self
	}
}

impl Diagnostic {
	/// Appends `cause` at the tail of this diagnostic's cause chain.
	pub fn with_cause(mut self, cause: Diagnostic) -> Self {
		self.append_cause(cause);
		self
	}

	fn append_cause(&mut self, cause: Diagnostic) {
		match self.cause.as_mut() {
			Some(next) => next.append_cause(cause),
			None => self.cause = Some(Box::new(cause)),
		}
	}

	pub fn with_note(mut self, note: impl Into<String>) -> Self {
		self.notes.push(note.into());
		self
	}

	/// Iterates this diagnostic followed by every diagnostic in its cause chain.
	pub fn chain(&self) -> Chain<'_> {
		Chain {
			next: Some(self),
		}
	}
}

pub struct Chain<'a> {
	next: Option<&'a Diagnostic>,
}

impl<'a> Iterator for Chain<'a> {
	type Item = &'a Diagnostic;

	fn next(&mut self) -> Option<Self::Item> {
		let current = self.next?;
		self.next = current.cause.as_deref();
		Some(current)
	}
}

#[cfg(test)]
mod tests {
	use super::{application::failure, *};

	#[test]
	fn test_with_cause_appends_to_tail() {
		let d = failure("a").with_cause(failure("b")).with_cause(failure("c"));
		let messages: Vec<_> = d.chain().map(|d| d.message.clone()).collect();
		assert_eq!(messages, vec!["a", "b", "c"]);
	}

	#[test]
	fn test_chain_single() {
		let d = failure("only");
		assert_eq!(d.chain().count(), 1);
	}
}

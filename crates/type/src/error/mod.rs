// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use std::{
	fmt::{Display, Formatter},
	ops::{Deref, DerefMut},
};

pub mod diagnostic;
#[macro_use]
mod r#macro;

use diagnostic::{Diagnostic, render::DefaultRenderer};

#[derive(Debug, Clone, PartialEq)]
pub struct Error(pub Diagnostic);

impl Deref for Error {
	type Target = Diagnostic;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

impl DerefMut for Error {
	fn deref_mut(&mut self) -> &mut Self::Target {
		&mut self.0
	}
}

impl Display for Error {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		let out = DefaultRenderer::render_string(&self.0);
		f.write_str(out.as_str())
	}
}

impl Error {
	pub fn diagnostic(self) -> Diagnostic {
		self.0
	}

	pub fn code(&self) -> &str {
		self.0.code.as_str()
	}

	/// Returns true if this error or any diagnostic in its cause chain carries `code`.
	pub fn has_code(&self, code: &str) -> bool {
		self.0.chain().any(|d| d.code == code)
	}
}

impl std::error::Error for Error {}

impl From<Diagnostic> for Error {
	fn from(diagnostic: Diagnostic) -> Self {
		Self(diagnostic)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::diagnostic::{application, driver};

	#[test]
	fn test_display_renders_code_and_message() {
		let err = Error(application::failure("disk is full"));
		let rendered = err.to_string();
		assert!(rendered.starts_with("error[APP_001]: disk is full"));
	}

	#[test]
	fn test_has_code_walks_cause_chain() {
		let err = Error(driver::commit_failed("lock timeout").with_cause(application::failure("inner")));
		assert!(err.has_code("DRV_002"));
		assert!(err.has_code("APP_001"));
		assert!(!err.has_code("TXN_001"));
	}

	#[test]
	fn test_error_macro() {
		let err = error!(application::failure("x"));
		assert_eq!(err.code(), "APP_001");

		fn fails() -> crate::Result<()> {
			return_error!(application::failure("y"));
		}
		assert_eq!(fails().unwrap_err().code(), "APP_001");
	}
}

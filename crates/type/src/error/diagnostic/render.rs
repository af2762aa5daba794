// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use std::fmt::Write;

use crate::error::diagnostic::Diagnostic;

pub trait DiagnosticRenderer {
	fn render(&self, diagnostic: &Diagnostic) -> String;
}

pub struct DefaultRenderer;

impl DiagnosticRenderer for DefaultRenderer {
	fn render(&self, diagnostic: &Diagnostic) -> String {
		let mut output = String::new();
		self.render_level(&mut output, diagnostic, 0);
		output
	}
}

impl DefaultRenderer {
	pub fn render_string(diagnostic: &Diagnostic) -> String {
		DefaultRenderer.render(diagnostic)
	}

	fn render_level(&self, output: &mut String, d: &Diagnostic, depth: usize) {
		let indent = "  ".repeat(depth);

		if depth == 0 {
			let _ = writeln!(output, "error[{}]: {}", d.code, d.message);
		} else {
			let _ = writeln!(output, "{}caused by: error[{}]: {}", indent, d.code, d.message);
		}

		if let Some(label) = &d.label {
			let _ = writeln!(output, "{}  = {}", indent, label);
		}

		if let Some(help) = &d.help {
			let _ = writeln!(output, "{}help: {}", indent, help);
		}

		for note in &d.notes {
			let _ = writeln!(output, "{}note: {}", indent, note);
		}

		if let Some(cause) = &d.cause {
			self.render_level(output, cause, depth + 1);
		}
	}
}

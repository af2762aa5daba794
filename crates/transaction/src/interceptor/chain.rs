// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	fmt::{Debug, Formatter},
	sync::Arc,
};

/// Interceptors of one kind, run in the order they were added
pub struct InterceptorChain<I: ?Sized> {
	pub(crate) interceptors: Vec<Arc<I>>,
}

impl<I: ?Sized> InterceptorChain<I> {
	pub fn new() -> Self {
		Self {
			interceptors: Vec::new(),
		}
	}

	pub fn add(&mut self, interceptor: Arc<I>) {
		self.interceptors.push(interceptor);
	}

	pub fn is_empty(&self) -> bool {
		self.interceptors.is_empty()
	}

	pub fn len(&self) -> usize {
		self.interceptors.len()
	}
}

impl<I: ?Sized> Default for InterceptorChain<I> {
	fn default() -> Self {
		Self::new()
	}
}

impl<I: ?Sized> Clone for InterceptorChain<I> {
	fn clone(&self) -> Self {
		Self {
			interceptors: self.interceptors.clone(),
		}
	}
}

impl<I: ?Sized> Debug for InterceptorChain<I> {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("InterceptorChain").field("len", &self.interceptors.len()).finish()
	}
}

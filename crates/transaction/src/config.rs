// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use crate::{
	asynchronous::AsyncTransacter,
	context::Confinement,
	driver::{AsyncDriver, Driver},
	interceptor::InterceptorBuilder,
	transacter::Transacter,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransacterConfig {
	pub confinement: Confinement,
}

/// Configures and creates a [`Transacter`] or an [`AsyncTransacter`].
///
/// ```ignore
/// let transacter = TransacterBuilder::new(driver)
/// 	.confinement(Confinement::Thread)
/// 	.interceptors(|b| b.add_post_commit(post_commit(|ctx| audit(ctx.id))))
/// 	.build();
/// ```
pub struct TransacterBuilder<D> {
	driver: D,
	config: TransacterConfig,
	interceptors: InterceptorBuilder,
}

impl<D> TransacterBuilder<D> {
	pub fn new(driver: D) -> Self {
		Self {
			driver,
			config: TransacterConfig::default(),
			interceptors: InterceptorBuilder::new(),
		}
	}

	pub fn confinement(mut self, confinement: Confinement) -> Self {
		self.config.confinement = confinement;
		self
	}

	pub fn config(mut self, config: TransacterConfig) -> Self {
		self.config = config;
		self
	}

	pub fn interceptors<F>(mut self, configurator: F) -> Self
	where
		F: FnOnce(InterceptorBuilder) -> InterceptorBuilder,
	{
		self.interceptors = configurator(self.interceptors);
		self
	}
}

impl<D: Driver> TransacterBuilder<D> {
	pub fn build(self) -> Transacter<D> {
		Transacter::from_parts(self.driver, self.config, self.interceptors.build())
	}
}

impl<D: AsyncDriver> TransacterBuilder<D> {
	pub fn build_async(self) -> AsyncTransacter<D> {
		AsyncTransacter::from_parts(self.driver, self.config, self.interceptors.build())
	}
}

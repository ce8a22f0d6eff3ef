// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::time::Duration;

use rand::{Rng, SeedableRng, rngs::StdRng};

/// How a lost connection is retried.
///
/// The delay before attempt `n` (starting at 1) is
/// `initial_delay * multiplier^(n-1)`, capped at `max_delay`, then scaled by a
/// random factor in `1 ± jitter` and capped again. After `max_retries`
/// consecutive failed attempts the feed gives up.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconnectPolicy {
	pub initial_delay: Duration,
	pub max_delay: Duration,
	pub multiplier: f64,
	/// Fraction in `[0, 1]`.
	pub jitter: f64,
	/// `None` retries forever.
	pub max_retries: Option<u32>,
}

impl Default for ReconnectPolicy {
	fn default() -> Self {
		Self {
			initial_delay: Duration::from_secs(1),
			max_delay: Duration::from_secs(30),
			multiplier: 2.0,
			jitter: 0.2,
			max_retries: Some(10),
		}
	}
}

impl ReconnectPolicy {
	pub fn initial_delay(mut self, delay: Duration) -> Self {
		self.initial_delay = delay;
		self
	}

	pub fn max_delay(mut self, delay: Duration) -> Self {
		self.max_delay = delay;
		self
	}

	pub fn multiplier(mut self, multiplier: f64) -> Self {
		self.multiplier = multiplier;
		self
	}

	pub fn jitter(mut self, jitter: f64) -> Self {
		self.jitter = jitter;
		self
	}

	pub fn max_retries(mut self, max_retries: Option<u32>) -> Self {
		self.max_retries = max_retries;
		self
	}

	/// Delay before `attempt` without jitter.
	pub fn base_delay(&self, attempt: u32) -> Duration {
		let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
		let secs = self.initial_delay.as_secs_f64() * self.multiplier.max(1.0).powi(exponent);
		let max = self.max_delay.as_secs_f64();
		if !secs.is_finite() || secs >= max {
			self.max_delay
		} else {
			Duration::from_secs_f64(secs)
		}
	}
}

/// Attempt counter for one [`ReconnectPolicy`].
pub struct Backoff {
	policy: ReconnectPolicy,
	attempt: u32,
	rng: StdRng,
}

impl Backoff {
	pub fn new(policy: ReconnectPolicy) -> Self {
		Self {
			policy,
			attempt: 0,
			rng: StdRng::from_rng(&mut rand::rng()),
		}
	}

	/// Deterministic jitter.
	pub fn with_seed(policy: ReconnectPolicy, seed: u64) -> Self {
		Self {
			policy,
			attempt: 0,
			rng: StdRng::seed_from_u64(seed),
		}
	}

	/// Attempts made since the last reset.
	pub fn attempt(&self) -> u32 {
		self.attempt
	}

	pub fn is_exhausted(&self) -> bool {
		self.policy.max_retries.is_some_and(|max| self.attempt >= max)
	}

	/// Delay before the next attempt, or `None` once retries are exhausted.
	pub fn next_delay(&mut self) -> Option<Duration> {
		if self.is_exhausted() {
			return None;
		}
		self.attempt += 1;

		let base = self.policy.base_delay(self.attempt);
		let jitter = self.policy.jitter;
		if !jitter.is_finite() || jitter <= 0.0 {
			return Some(base);
		}

		let jitter = jitter.min(1.0);
		let factor = self.rng.random_range((1.0 - jitter)..=(1.0 + jitter));
		Some(base.mul_f64(factor).min(self.policy.max_delay))
	}

	/// Called after a successful connect.
	pub fn reset(&mut self) {
		self.attempt = 0;
	}
}

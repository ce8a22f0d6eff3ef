// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	fmt::{self, Display, Formatter},
	time::Duration,
};

/// Connection state of a [`super::RealtimeFeed`].
#[derive(Debug, Clone, PartialEq)]
pub enum FeedStatus {
	Connecting,
	Connected,
	Reconnecting {
		attempt: u32,
		delay: Duration,
	},
	/// Reconnect attempts are exhausted. The feed no longer opens channels.
	Failed {
		reason: String,
	},
	Closed,
}

impl FeedStatus {
	/// Whether the feed can still deliver events now or after reconnecting.
	pub fn is_live(&self) -> bool {
		!matches!(self, FeedStatus::Failed { .. } | FeedStatus::Closed)
	}
}

impl Display for FeedStatus {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			FeedStatus::Connecting => f.write_str("connecting"),
			FeedStatus::Connected => f.write_str("connected"),
			FeedStatus::Reconnecting {
				attempt,
				delay,
			} => write!(f, "reconnecting (attempt {} in {:?})", attempt, delay),
			FeedStatus::Failed {
				reason,
			} => write!(f, "failed: {}", reason),
			FeedStatus::Closed => f.write_str("closed"),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
	Healthy,
	Warning {
		description: String,
	},
	Failed {
		description: String,
	},
}

impl From<&FeedStatus> for HealthStatus {
	fn from(status: &FeedStatus) -> Self {
		match status {
			FeedStatus::Connected => HealthStatus::Healthy,
			FeedStatus::Connecting => HealthStatus::Warning {
				description: "Connecting".to_string(),
			},
			FeedStatus::Reconnecting {
				attempt,
				..
			} => HealthStatus::Warning {
				description: format!("Reconnecting, attempt {}", attempt),
			},
			FeedStatus::Failed {
				reason,
			} => HealthStatus::Failed {
				description: reason.clone(),
			},
			FeedStatus::Closed => HealthStatus::Failed {
				description: "Not running".to_string(),
			},
		}
	}
}

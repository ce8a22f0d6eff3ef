// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::time::Duration;

use crate::{FeedError, realtime::ReconnectPolicy};

/// Protocol version sent in the connect URL.
pub const PROTOCOL_VERSION: &str = "1.0.0";

#[derive(Debug, Clone)]
pub struct RealtimeConfig {
	/// Base URL of the realtime service, e.g. `wss://host/realtime/v1`.
	pub endpoint: String,
	pub api_key: String,
	/// User access token sent with every channel join.
	pub access_token: Option<String>,
	pub heartbeat_interval: Duration,
	pub connect_timeout: Duration,
	pub reconnect: ReconnectPolicy,
}

impl RealtimeConfig {
	pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
		Self {
			endpoint: endpoint.into(),
			api_key: api_key.into(),
			access_token: None,
			heartbeat_interval: Duration::from_secs(30),
			connect_timeout: Duration::from_secs(10),
			reconnect: ReconnectPolicy::default(),
		}
	}

	pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
		self.access_token = Some(token.into());
		self
	}

	pub fn with_heartbeat_interval(mut self, interval: Duration) -> Self {
		self.heartbeat_interval = interval;
		self
	}

	pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
		self.connect_timeout = timeout;
		self
	}

	pub fn with_reconnect<F>(mut self, configure: F) -> Self
	where
		F: FnOnce(ReconnectPolicy) -> ReconnectPolicy,
	{
		self.reconnect = configure(self.reconnect);
		self
	}

	/// WebSocket URL to connect to.
	///
	/// `http` and `https` endpoints are mapped to `ws` and `wss`.
	pub fn socket_url(&self) -> Result<String, FeedError> {
		let endpoint = self.endpoint.trim().trim_end_matches('/');
		let invalid = |reason: &str| FeedError::InvalidEndpoint {
			endpoint: self.endpoint.clone(),
			reason: reason.to_string(),
		};

		let (scheme, rest) = endpoint.split_once("://").ok_or_else(|| invalid("missing scheme"))?;
		let scheme = match scheme.to_ascii_lowercase().as_str() {
			"ws" | "http" => "ws",
			"wss" | "https" => "wss",
			_ => return Err(invalid("unsupported scheme")),
		};
		if rest.is_empty() || rest.starts_with('/') {
			return Err(invalid("missing host"));
		}
		if rest.contains('?') || rest.contains('#') {
			return Err(invalid("endpoint must not carry a query or fragment"));
		}

		Ok(format!(
			"{}://{}/websocket?apikey={}&vsn={}",
			scheme,
			rest,
			urlencoding::encode(&self.api_key),
			PROTOCOL_VERSION
		))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_defaults() {
		let config = RealtimeConfig::new("wss://example.org/realtime/v1", "key");
		assert_eq!(config.heartbeat_interval, Duration::from_secs(30));
		assert_eq!(config.connect_timeout, Duration::from_secs(10));
		assert_eq!(config.reconnect, ReconnectPolicy::default());
		assert_eq!(config.access_token, None);
	}

	#[test]
	fn test_with_reconnect() {
		let config = RealtimeConfig::new("wss://example.org", "key")
			.with_reconnect(|r| r.max_retries(Some(3)).initial_delay(Duration::from_millis(50)));
		assert_eq!(config.reconnect.max_retries, Some(3));
		assert_eq!(config.reconnect.initial_delay, Duration::from_millis(50));
		assert_eq!(config.reconnect.max_delay, Duration::from_secs(30));
	}

	#[test]
	fn test_socket_url() {
		let url = RealtimeConfig::new("https://example.org/realtime/v1/", "a b").socket_url().unwrap();
		assert_eq!(url, "wss://example.org/realtime/v1/websocket?apikey=a%20b&vsn=1.0.0");

		let url = RealtimeConfig::new("ws://127.0.0.1:4000", "k").socket_url().unwrap();
		assert_eq!(url, "ws://127.0.0.1:4000/websocket?apikey=k&vsn=1.0.0");
	}

	#[test]
	fn test_invalid_endpoints() {
		for endpoint in ["example.org", "ftp://example.org", "wss://", "wss:///path", "wss://host?x=1"] {
			assert!(
				matches!(
					RealtimeConfig::new(endpoint, "k").socket_url(),
					Err(FeedError::InvalidEndpoint { .. })
				),
				"{}",
				endpoint
			);
		}
	}
}

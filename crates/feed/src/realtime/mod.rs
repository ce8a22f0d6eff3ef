// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! WebSocket change feed for the hosted realtime service.
//!
//! One task owns the socket. [`RealtimeFeed::open`] and
//! [`RealtimeFeed::close`] only enqueue commands for that task, so they
//! never block. The task joins channels, routes `postgres_changes` messages to
//! their sinks, keeps the connection alive with heartbeats and reconnects
//! according to the [`ReconnectPolicy`], re-joining every live channel.

use std::sync::atomic::{AtomicU64, Ordering};

use carewire_core::{ChangeFeed, ChangeSink, ChannelKey, FeedChannelId, Result};
use parking_lot::Mutex;
use tokio::{
	sync::{mpsc, watch},
	task::JoinHandle,
};
use tracing::{debug, warn};

pub use backoff::{Backoff, ReconnectPolicy};
pub use config::{PROTOCOL_VERSION, RealtimeConfig};
pub use status::{FeedStatus, HealthStatus};

use crate::{FeedError, realtime::connection::Connection};

mod backoff;
mod config;
mod connection;
pub mod protocol;
mod status;

pub(crate) enum Command {
	Open {
		id: FeedChannelId,
		key: ChannelKey,
		sink: ChangeSink,
	},
	Close(FeedChannelId),
	Shutdown,
}

pub struct RealtimeFeed {
	commands: mpsc::UnboundedSender<Command>,
	status: watch::Receiver<FeedStatus>,
	next_id: AtomicU64,
	task: Mutex<Option<JoinHandle<()>>>,
}

impl RealtimeFeed {
	/// Spawn the connection task on the current tokio runtime.
	///
	/// Returns once the task is spawned; the connection is established in the
	/// background. Fails if the endpoint is not a usable URL.
	pub fn start(config: RealtimeConfig) -> Result<Self> {
		let url = config.socket_url()?;
		let (commands, commands_rx) = mpsc::unbounded_channel();
		let (status_tx, status) = watch::channel(FeedStatus::Connecting);

		let connection = Connection::new(config, url, commands_rx, status_tx);
		let task = tokio::spawn(connection.run());

		Ok(Self {
			commands,
			status,
			next_id: AtomicU64::new(1),
			task: Mutex::new(Some(task)),
		})
	}

	pub fn status(&self) -> FeedStatus {
		self.status.borrow().clone()
	}

	/// Receiver notified on every status change.
	pub fn watch_status(&self) -> watch::Receiver<FeedStatus> {
		self.status.clone()
	}

	pub fn health_status(&self) -> HealthStatus {
		HealthStatus::from(&*self.status.borrow())
	}

	/// Leave every channel, close the socket and wait for the connection task
	/// to finish.
	pub async fn shutdown(&self) {
		let _ = self.commands.send(Command::Shutdown);

		let task = self.task.lock().take();
		if let Some(task) = task {
			if let Err(err) = task.await {
				warn!("realtime connection task ended abnormally: {}", err);
			}
		}
	}
}

impl ChangeFeed for RealtimeFeed {
	fn open(&self, key: &ChannelKey, sink: ChangeSink) -> Result<FeedChannelId> {
		let status = self.status();
		if !status.is_live() {
			return Err(FeedError::unavailable(status.to_string()).into());
		}

		let id = FeedChannelId(self.next_id.fetch_add(1, Ordering::SeqCst));
		self.commands
			.send(Command::Open {
				id,
				key: key.clone(),
				sink,
			})
			.map_err(|_| FeedError::unavailable("connection task stopped"))?;

		debug!(channel = %id, key = %key, "requested realtime channel");
		Ok(id)
	}

	fn close(&self, channel: FeedChannelId) -> Result<()> {
		if self.commands.send(Command::Close(channel)).is_err() {
			debug!(channel = %channel, "realtime connection already stopped, nothing to close");
		}
		Ok(())
	}
}

impl Drop for RealtimeFeed {
	fn drop(&mut self) {
		let _ = self.commands.send(Command::Shutdown);
	}
}

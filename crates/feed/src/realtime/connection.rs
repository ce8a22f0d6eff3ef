// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{collections::HashMap, time::Duration};

use carewire_core::{ChangeSink, ChannelKey, FeedChannelId};
use futures_util::{
	SinkExt, StreamExt,
	stream::{SplitSink, SplitStream},
};
use tokio::{
	net::TcpStream,
	sync::{mpsc, watch},
	time::{self, Instant, MissedTickBehavior},
};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};
use tracing::{debug, error, info, trace, warn};

use crate::{
	FeedError,
	realtime::{
		Backoff, Command, FeedStatus, RealtimeConfig,
		protocol::{
			EVENT_CLOSE, EVENT_ERROR, EVENT_POSTGRES_CHANGES, EVENT_REPLY, EVENT_SYSTEM, PHOENIX_TOPIC,
			PhoenixMessage, decode_change,
		},
	},
};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;
type Writer = SplitSink<Socket, Message>;
type Reader = SplitStream<Socket>;

struct Channel {
	topic: String,
	key: ChannelKey,
	sink: ChangeSink,
	joined: bool,
}

enum Exit {
	Shutdown,
	Disconnected(String),
}

/// State owned by the connection task.
pub(crate) struct Connection {
	config: RealtimeConfig,
	url: String,
	commands: mpsc::UnboundedReceiver<Command>,
	status: watch::Sender<FeedStatus>,
	channels: HashMap<FeedChannelId, Channel>,
	topics: HashMap<String, FeedChannelId>,
	next_ref: u64,
}

impl Connection {
	pub(crate) fn new(
		config: RealtimeConfig,
		url: String,
		commands: mpsc::UnboundedReceiver<Command>,
		status: watch::Sender<FeedStatus>,
	) -> Self {
		Self {
			config,
			url,
			commands,
			status,
			channels: HashMap::new(),
			topics: HashMap::new(),
			next_ref: 0,
		}
	}

	pub(crate) async fn run(mut self) {
		let mut backoff = Backoff::new(self.config.reconnect.clone());

		loop {
			let reason = match self.connect().await {
				Ok(Some(socket)) => {
					backoff.reset();
					info!(endpoint = %self.config.endpoint, channels = self.channels.len(), "connected to realtime service");
					self.set_status(FeedStatus::Connected);

					let (writer, reader) = socket.split();
					match self.serve(writer, reader).await {
						Exit::Shutdown => break,
						Exit::Disconnected(reason) => reason,
					}
				}
				Ok(None) => break,
				Err(err) => err.to_string(),
			};

			for channel in self.channels.values_mut() {
				channel.joined = false;
			}

			let Some(delay) = backoff.next_delay() else {
				error!(attempts = backoff.attempt(), "giving up on realtime service: {}", reason);
				self.set_status(FeedStatus::Failed {
					reason,
				});
				return;
			};

			warn!(attempt = backoff.attempt(), ?delay, "realtime connection lost: {}", reason);
			self.set_status(FeedStatus::Reconnecting {
				attempt: backoff.attempt(),
				delay,
			});

			if !self.wait(delay).await {
				break;
			}
			self.set_status(FeedStatus::Connecting);
		}

		self.set_status(FeedStatus::Closed);
		info!("realtime feed closed");
	}

	fn set_status(&self, status: FeedStatus) {
		self.status.send_replace(status);
	}

	fn next_reference(&mut self) -> String {
		self.next_ref += 1;
		self.next_ref.to_string()
	}

	/// Connect while still accepting commands. `Ok(None)` means shutdown was
	/// requested before the socket was up.
	async fn connect(&mut self) -> Result<Option<Socket>, FeedError> {
		let timeout = self.config.connect_timeout;
		let connect = time::timeout(timeout, connect_async(self.url.clone()));
		tokio::pin!(connect);

		loop {
			tokio::select! {
				result = &mut connect => {
					return match result {
						Ok(Ok((socket, _))) => Ok(Some(socket)),
						Ok(Err(err)) => Err(FeedError::ConnectFailed {
							endpoint: self.config.endpoint.clone(),
							reason: err.to_string(),
						}),
						Err(_) => Err(FeedError::ConnectFailed {
							endpoint: self.config.endpoint.clone(),
							reason: format!("timed out after {:?}", timeout),
						}),
					};
				}
				command = self.commands.recv() => {
					if !self.apply_offline(command) {
						return Ok(None);
					}
				}
			}
		}
	}

	/// Sleep for `delay` while still accepting commands. Returns `false` on
	/// shutdown.
	async fn wait(&mut self, delay: Duration) -> bool {
		let sleep = time::sleep(delay);
		tokio::pin!(sleep);

		loop {
			tokio::select! {
				_ = &mut sleep => return true,
				command = self.commands.recv() => {
					if !self.apply_offline(command) {
						return false;
					}
				}
			}
		}
	}

	fn apply_offline(&mut self, command: Option<Command>) -> bool {
		match command {
			Some(Command::Open {
				id,
				key,
				sink,
			}) => {
				self.register(id, key, sink);
				true
			}
			Some(Command::Close(id)) => {
				self.unregister(id);
				true
			}
			Some(Command::Shutdown) | None => false,
		}
	}

	fn register(&mut self, id: FeedChannelId, key: ChannelKey, sink: ChangeSink) {
		let topic = format!("realtime:{}:{}", key.table, id);
		self.topics.insert(topic.clone(), id);
		self.channels.insert(
			id,
			Channel {
				topic,
				key,
				sink,
				joined: false,
			},
		);
	}

	fn unregister(&mut self, id: FeedChannelId) -> Option<Channel> {
		let channel = self.channels.remove(&id)?;
		self.topics.remove(&channel.topic);
		Some(channel)
	}

	async fn serve(&mut self, mut writer: Writer, mut reader: Reader) -> Exit {
		let ids: Vec<FeedChannelId> = self.channels.keys().copied().collect();
		for id in ids {
			if let Err(reason) = self.join(&mut writer, id).await {
				return Exit::Disconnected(reason);
			}
		}

		let period = self.config.heartbeat_interval;
		let mut heartbeat = time::interval_at(Instant::now() + period, period);
		heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);
		let mut pending_heartbeat: Option<String> = None;

		loop {
			tokio::select! {
				message = reader.next() => match message {
					Some(Ok(Message::Text(text))) => self.handle_text(text.as_str(), &mut pending_heartbeat),
					Some(Ok(Message::Ping(data))) => {
						if writer.send(Message::Pong(data)).await.is_err() {
							return Exit::Disconnected("failed to answer ping".to_string());
						}
					}
					Some(Ok(Message::Close(frame))) => {
						return Exit::Disconnected(format!("server closed the connection: {:?}", frame));
					}
					Some(Ok(_)) => {}
					Some(Err(err)) => return Exit::Disconnected(err.to_string()),
					None => return Exit::Disconnected("connection closed".to_string()),
				},

				command = self.commands.recv() => match command {
					Some(Command::Open { id, key, sink }) => {
						self.register(id, key, sink);
						if let Err(reason) = self.join(&mut writer, id).await {
							return Exit::Disconnected(reason);
						}
					}
					Some(Command::Close(id)) => {
						if let Some(channel) = self.unregister(id) {
							debug!(channel = %id, topic = %channel.topic, "leaving channel");
							let leave = PhoenixMessage::leave(&channel.topic, self.next_reference());
							if let Err(reason) = send(&mut writer, &leave).await {
								return Exit::Disconnected(reason);
							}
						}
					}
					Some(Command::Shutdown) | None => {
						self.leave_all(&mut writer).await;
						let _ = writer.send(Message::Close(None)).await;
						return Exit::Shutdown;
					}
				},

				_ = heartbeat.tick() => {
					if let Some(reference) = pending_heartbeat.take() {
						return Exit::Disconnected(format!("heartbeat {} was not acknowledged", reference));
					}
					let reference = self.next_reference();
					if let Err(reason) = send(&mut writer, &PhoenixMessage::heartbeat(reference.clone())).await {
						return Exit::Disconnected(reason);
					}
					trace!(reference = %reference, "heartbeat sent");
					pending_heartbeat = Some(reference);
				}
			}
		}
	}

	async fn join(&mut self, writer: &mut Writer, id: FeedChannelId) -> Result<(), String> {
		let reference = self.next_reference();
		let Some(channel) = self.channels.get(&id) else {
			return Ok(());
		};

		let join = PhoenixMessage::join(&channel.topic, &channel.key, self.config.access_token.as_deref(), reference);
		debug!(channel = %id, topic = %channel.topic, key = %channel.key, "joining channel");
		send(writer, &join).await
	}

	async fn leave_all(&mut self, writer: &mut Writer) {
		let topics: Vec<String> = self.channels.values().map(|channel| channel.topic.clone()).collect();
		for topic in topics {
			let leave = PhoenixMessage::leave(&topic, self.next_reference());
			if let Err(reason) = send(writer, &leave).await {
				debug!(topic = %topic, "failed to leave channel during shutdown: {}", reason);
				return;
			}
		}
	}

	fn handle_text(&mut self, text: &str, pending_heartbeat: &mut Option<String>) {
		let message = match PhoenixMessage::decode(text) {
			Ok(message) => message,
			Err(err) => {
				warn!("ignoring realtime message: {}", err);
				return;
			}
		};

		if message.topic == PHOENIX_TOPIC {
			if message.event == EVENT_REPLY && message.reference.is_some() && message.reference == *pending_heartbeat {
				*pending_heartbeat = None;
				trace!("heartbeat acknowledged");
			}
			return;
		}

		let Some(id) = self.topics.get(&message.topic).copied() else {
			trace!(topic = %message.topic, event = %message.event, "message for unknown topic");
			return;
		};

		match message.event.as_str() {
			EVENT_POSTGRES_CHANGES => match decode_change(&message.payload) {
				Ok(event) => {
					if let Some(sink) = self.channels.get(&id).map(|channel| channel.sink.clone()) {
						sink(event);
					}
				}
				Err(err) => warn!(topic = %message.topic, "dropping change event: {}", err),
			},
			EVENT_REPLY => match message.reply_status() {
				Some(Ok(())) => {
					if let Some(channel) = self.channels.get_mut(&id) {
						if !channel.joined {
							channel.joined = true;
							debug!(channel = %id, topic = %channel.topic, "channel joined");
						}
					}
				}
				Some(Err(reason)) => warn!(topic = %message.topic, "channel join rejected: {}", reason),
				None => {}
			},
			EVENT_ERROR => {
				if let Some(channel) = self.channels.get_mut(&id) {
					channel.joined = false;
				}
				warn!(topic = %message.topic, payload = %message.payload, "channel error");
			}
			EVENT_CLOSE => debug!(topic = %message.topic, "channel closed by server"),
			EVENT_SYSTEM => debug!(topic = %message.topic, payload = %message.payload, "system message"),
			other => trace!(topic = %message.topic, event = other, "unhandled realtime event"),
		}
	}
}

async fn send(writer: &mut Writer, message: &PhoenixMessage) -> Result<(), String> {
	let text = message.encode().map_err(|err| err.to_string())?;
	writer.send(Message::Text(text.into())).await.map_err(|err| err.to_string())
}

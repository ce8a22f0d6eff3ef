// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	fmt::{self, Display, Formatter},
	sync::Arc,
};

use carewire_type::Result;

use crate::interface::{ChangeEvent, ChannelKey};

/// Identifier a [`ChangeFeed`] assigns to a channel it opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FeedChannelId(pub u64);

impl Display for FeedChannelId {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

/// Receiver of the change events routed to one channel.
pub type ChangeSink = Arc<dyn Fn(ChangeEvent) + Send + Sync>;

/// Backend change feed.
///
/// `open` only requests the channel and returns without waiting for the
/// backend to confirm it. Events for the channel are pushed into `sink` in the
/// order the backend delivers them until the channel is closed.
pub trait ChangeFeed: Send + Sync {
	fn open(&self, key: &ChannelKey, sink: ChangeSink) -> Result<FeedChannelId>;

	fn close(&self, channel: FeedChannelId) -> Result<()>;
}

impl<T: ChangeFeed + ?Sized> ChangeFeed for Arc<T> {
	fn open(&self, key: &ChannelKey, sink: ChangeSink) -> Result<FeedChannelId> {
		(**self).open(key, sink)
	}

	fn close(&self, channel: FeedChannelId) -> Result<()> {
		(**self).close(channel)
	}
}

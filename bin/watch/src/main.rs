// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

#![cfg_attr(not(debug_assertions), deny(warnings))]

use std::{process::ExitCode, sync::Arc};

use carewire_core::{ChangeEvent, DEFAULT_SCHEMA, Result, SubscriptionConfig};
use carewire_feed::{FeedError, FeedStatus, RealtimeConfig, RealtimeFeed};
use carewire_subscription::SubscriptionRegistry;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Subscribe to one table of the realtime service and log every change.
#[derive(Parser, Debug)]
#[command(name = "carewire-watch", version, about, long_about = None)]
struct Args {
	/// Realtime endpoint, e.g. wss://project.example.org/realtime/v1
	#[arg(long, env = "CAREWIRE_ENDPOINT")]
	endpoint: String,

	#[arg(long, env = "CAREWIRE_API_KEY", hide_env_values = true)]
	api_key: String,

	/// User access token sent with every channel join
	#[arg(long, env = "CAREWIRE_ACCESS_TOKEN", hide_env_values = true)]
	access_token: Option<String>,

	#[arg(long)]
	table: String,

	/// INSERT, UPDATE, DELETE or *
	#[arg(long, default_value = "*")]
	event: String,

	/// Row filter of the form column=op.value
	#[arg(long)]
	filter: Option<String>,

	#[arg(long, default_value = DEFAULT_SCHEMA)]
	schema: String,

	/// Reconnect attempts before giving up
	#[arg(long)]
	max_retries: Option<u32>,

	/// Log as JSON lines
	#[arg(long)]
	json: bool,
}

fn init_tracing(json: bool) {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
	let registry = tracing_subscriber::registry().with(filter);
	if json {
		registry.with(fmt::layer().json()).init();
	} else {
		registry.with(fmt::layer()).init();
	}
}

fn log_event(event: &ChangeEvent) {
	match serde_json::to_string(event) {
		Ok(payload) => info!(table = %event.table, kind = %event.event_type, event = %payload, "change"),
		Err(err) => error!(table = %event.table, "failed to encode change event: {}", err),
	}
}

async fn run(args: Args) -> Result<()> {
	let config = SubscriptionConfig::parse(&args.table, Some(&args.event), args.filter.as_deref(), Some(&args.schema))?;

	let mut realtime = RealtimeConfig::new(args.endpoint, args.api_key);
	if let Some(token) = args.access_token {
		realtime = realtime.with_access_token(token);
	}
	if let Some(max_retries) = args.max_retries {
		realtime = realtime.with_reconnect(|r| r.max_retries(Some(max_retries)));
	}

	let feed = Arc::new(RealtimeFeed::start(realtime)?);
	let registry = SubscriptionRegistry::new(feed.clone());
	let subscription = registry.subscribe(&config, log_event)?;
	info!(key = %subscription.key(), "watching for changes");

	let mut status = feed.watch_status();
	let ctrl_c = tokio::signal::ctrl_c();
	tokio::pin!(ctrl_c);

	let outcome = loop {
		tokio::select! {
			_ = &mut ctrl_c => {
				info!("interrupted, shutting down");
				break Ok(());
			}
			changed = status.changed() => {
				if changed.is_err() {
					break Ok(());
				}
				let current = status.borrow_and_update().clone();
				match current {
					FeedStatus::Failed { reason } => break Err(FeedError::Unavailable { reason }.into()),
					other => info!(status = %other, "feed status changed"),
				}
			}
		}
	};

	subscription.unsubscribe();
	registry.shutdown();
	feed.shutdown().await;
	outcome
}

#[tokio::main]
async fn main() -> ExitCode {
	let args = Args::parse();
	init_tracing(args.json);

	match run(args).await {
		Ok(()) => ExitCode::SUCCESS,
		Err(err) => {
			error!("{}", err);
			ExitCode::FAILURE
		}
	}
}

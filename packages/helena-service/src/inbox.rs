//! Messaging-channel inbox.
//!
//! Each accepted message is rate limited per sender, appended to a capped history, and buffered.
//! Bursts are coalesced: every new message re-arms one delayed flush per sender, and the flush
//! sends the joined buffer to the dialog agent and relays the reply.

use std::{
	collections::{HashMap, VecDeque},
	sync::{Arc, Mutex, MutexGuard},
	time::Duration,
};

use serde_json::{Map, Value};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use tokio::task::JoinHandle;

use crate::{BoxFuture, HelenaService, Providers, Result, preferences::SESSIONS};
use helena_config::Config;

pub const USERS: &str = "users";
pub const LAST_MESSAGE_FIELD: &str = "last_message_time";
pub const HISTORY_FIELD: &str = "messages";
pub const AGENT_ERROR_REPLY: &str = "Erro ao processar a resposta";
pub const EMPTY_AGENT_REPLY: &str = "Não entendi sua mensagem.";
const BUFFER_SEPARATOR: &str = " \n";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboundOutcome {
	Accepted,
	RateLimited,
}

/// Receives the coalesced text of one sender.
pub trait FlushSink
where
	Self: Send + Sync,
{
	fn flush<'a>(&'a self, sender: &'a str, text: String) -> BoxFuture<'a, ()>;
}

#[derive(Default)]
struct Pending {
	messages: VecDeque<String>,
	generation: u64,
	task: Option<JoinHandle<()>>,
}

pub struct MessageCoalescer {
	debounce: Duration,
	buffer_limit: usize,
	sink: Arc<dyn FlushSink>,
	buffers: Mutex<HashMap<String, Pending>>,
}
impl MessageCoalescer {
	pub fn new(debounce: Duration, buffer_limit: usize, sink: Arc<dyn FlushSink>) -> Arc<Self> {
		Arc::new(Self { debounce, buffer_limit, sink, buffers: Mutex::default() })
	}

	/// Buffers `text` and re-arms the sender's flush. Must be called inside a Tokio runtime.
	pub fn push(self: &Arc<Self>, sender: &str, text: String) {
		let mut buffers = self.lock();
		let pending = buffers.entry(sender.to_string()).or_default();

		pending.messages.push_back(text);

		while pending.messages.len() > self.buffer_limit {
			pending.messages.pop_front();
		}

		pending.generation += 1;

		if let Some(task) = pending.task.take() {
			task.abort();
		}

		let generation = pending.generation;
		let coalescer = Arc::clone(self);
		let sender = sender.to_string();

		pending.task = Some(tokio::spawn(async move {
			tokio::time::sleep(coalescer.debounce).await;

			let Some(text) = coalescer.take(&sender, generation) else {
				return;
			};

			tracing::debug!(sender = %sender, "Flushing coalesced messages.");

			coalescer.sink.flush(&sender, text).await;
		}));
	}

	/// Messages currently buffered for `sender`.
	pub fn buffered(&self, sender: &str) -> usize {
		self.lock().get(sender).map(|pending| pending.messages.len()).unwrap_or(0)
	}

	/// Drains the buffer if `generation` is still the latest one. The entry is removed, so the
	/// flushing task is never aborted by a later push.
	fn take(&self, sender: &str, generation: u64) -> Option<String> {
		let mut buffers = self.lock();

		if buffers.get(sender)?.generation != generation {
			return None;
		}

		let pending = buffers.remove(sender)?;

		Some(Vec::from(pending.messages).join(BUFFER_SEPARATOR))
	}

	fn lock(&self) -> MutexGuard<'_, HashMap<String, Pending>> {
		self.buffers.lock().unwrap_or_else(|err| err.into_inner())
	}
}

/// Default flush target: dialog agent, then the messaging channel.
pub(crate) struct AgentRelay {
	cfg: Arc<Config>,
	providers: Providers,
}
impl AgentRelay {
	pub(crate) fn new(cfg: Arc<Config>, providers: Providers) -> Self {
		Self { cfg, providers }
	}

	async fn relay(&self, sender: &str, text: String) {
		let reply =
			match self.providers.dialog.detect_intent(&self.cfg.providers.dialog, sender, &text).await
			{
				Ok(reply) if reply.trim().is_empty() => EMPTY_AGENT_REPLY.to_string(),
				Ok(reply) => reply,
				Err(err) => {
					tracing::warn!(error = %err, sender, stage = "dialog_agent", "Dialog agent call failed.");

					AGENT_ERROR_REPLY.to_string()
				},
			};

		if let Err(err) = self.providers.messaging.send_text(&self.cfg.whatsapp, sender, &reply).await
		{
			tracing::error!(error = %err, sender, stage = "messaging_send", "Reply delivery failed.");
		}
	}
}

impl FlushSink for AgentRelay {
	fn flush<'a>(&'a self, sender: &'a str, text: String) -> BoxFuture<'a, ()> {
		Box::pin(self.relay(sender, text))
	}
}

impl HelenaService {
	pub async fn receive_message(&self, sender: &str, text: &str) -> Result<InboundOutcome> {
		self.receive_message_at(sender, text, OffsetDateTime::now_utc()).await
	}

	/// Handles one inbound message as if received at `now`.
	pub async fn receive_message_at(
		&self,
		sender: &str,
		text: &str,
		now: OffsetDateTime,
	) -> Result<InboundOutcome> {
		let now_secs = now.unix_timestamp();
		let limit = self.cfg.inbox.rate_limit_secs;

		if limit > 0 {
			let last = self
				.documents
				.get(USERS, sender)
				.await?
				.and_then(|doc| doc.get(LAST_MESSAGE_FIELD).and_then(Value::as_i64));

			if let Some(last) = last
				&& now_secs - last < limit
			{
				tracing::info!(sender, "Message rate limited.");

				return Ok(InboundOutcome::RateLimited);
			}
		}

		let mut patch = Map::new();

		patch.insert(LAST_MESSAGE_FIELD.to_string(), Value::from(now_secs));

		self.documents.merge(USERS, sender, patch).await?;

		let timestamp = now.format(&Rfc3339).unwrap_or_else(|_| now_secs.to_string());

		self.documents
			.push_capped(
				SESSIONS,
				sender,
				HISTORY_FIELD,
				serde_json::json!({ "message": text, "timestamp": timestamp }),
				self.cfg.inbox.history_limit,
			)
			.await?;
		self.inbox.push(sender, text.to_string());

		Ok(InboundOutcome::Accepted)
	}
}

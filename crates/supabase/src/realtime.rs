//! Supabase Realtime client
//!
//! Speaks the Phoenix channels protocol (v1 JSON serializer) used by
//! Supabase Realtime:
//!
//! ```text
//!  client                                   server
//!    │ ── phx_join realtime:{schema}:{table} ──► │
//!    │ ◄──────────── phx_reply {status: ok} ──── │
//!    │ ◄──────────── postgres_changes ────────── │  (repeated)
//!    │ ── heartbeat (topic "phoenix") ─────────► │  (every 25s)
//!    │ ◄──────────── phx_reply (topic "phoenix") │
//!    │ ── phx_leave, close ────────────────────► │
//! ```
//!
//! Reading and writing run in separate tasks, like the gateway clients.
//! Anything that ends the socket ends the stream, and so does a heartbeat
//! left unanswered until the next one is due. A change frame that cannot be
//! parsed also ends the stream: skipping it would leave the subscriber's
//! snapshot silently behind the table.

use async_trait::async_trait;
use aurum_core::{FeedEvent, Signal, SignalId};
use aurum_ports::{ChangeStream, TransportError, TransportResult};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

use crate::config::SupabaseConfig;
use crate::error::SupabaseError;

pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(25);

/// Topic Phoenix uses for heartbeats and their replies
const HEARTBEAT_TOPIC: &str = "phoenix";

/// `awaiting` value while no heartbeat is outstanding; refs start at 1
const NO_HEARTBEAT: u64 = 0;

/// How long `close` waits for the leave message to go out
const CLOSE_GRACE: Duration = Duration::from_secs(1);

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// One Phoenix channel frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhoenixMessage {
    pub topic: String,
    pub event: String,
    #[serde(default)]
    pub payload: Value,
    #[serde(rename = "ref", default)]
    pub reference: Option<String>,
}

impl PhoenixMessage {
    pub fn new(topic: &str, event: &str, payload: Value, reference: Option<String>) -> Self {
        PhoenixMessage {
            topic: topic.to_string(),
            event: event.to_string(),
            payload,
            reference,
        }
    }

    /// Join request subscribing to every change of `schema.table`
    pub fn join(
        topic: &str,
        schema: &str,
        table: &str,
        access_token: &str,
        reference: String,
    ) -> Self {
        let payload = json!({
            "config": {
                "broadcast": { "ack": false, "self": false },
                "presence": { "key": "" },
                "postgres_changes": [
                    { "event": "*", "schema": schema, "table": table }
                ],
                "private": false
            },
            "access_token": access_token
        });
        Self::new(topic, "phx_join", payload, Some(reference))
    }

    pub fn heartbeat(reference: String) -> Self {
        Self::new(HEARTBEAT_TOPIC, "heartbeat", json!({}), Some(reference))
    }

    pub fn leave(topic: &str, reference: String) -> Self {
        Self::new(topic, "phx_leave", json!({}), Some(reference))
    }

    /// `payload.status` of a reply
    fn reply_status(&self) -> Option<&str> {
        self.payload.get("status").and_then(Value::as_str)
    }

    fn reply_reason(&self) -> String {
        self.payload
            .pointer("/response/reason")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| self.payload.to_string())
    }
}

#[derive(Deserialize)]
struct ChangePayload {
    data: ChangeData,
}

#[derive(Deserialize)]
struct ChangeData {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    record: Option<Value>,
    #[serde(default)]
    old_record: Option<Value>,
}

#[derive(Deserialize)]
struct RecordKey {
    id: SignalId,
}

/// Map a `postgres_changes` payload to a feed event.
///
/// Returns `Ok(None)` for change types the feed does not model.
pub fn parse_change(payload: Value) -> Result<Option<FeedEvent>, SupabaseError> {
    let change: ChangePayload = serde_json::from_value(payload)?;
    let data = change.data;

    let record = |value: Option<Value>| -> Result<Value, SupabaseError> {
        value.ok_or_else(|| SupabaseError::Parse(format!("{} change without a record", data.kind)))
    };

    let event = match data.kind.as_str() {
        "INSERT" => {
            let signal: Signal = serde_json::from_value(record(data.record.clone())?)?;
            FeedEvent::Insert(signal)
        }
        "UPDATE" => {
            let signal: Signal = serde_json::from_value(record(data.record.clone())?)?;
            FeedEvent::Update(signal)
        }
        "DELETE" => {
            let key: RecordKey = serde_json::from_value(record(data.old_record.clone())?)?;
            FeedEvent::Delete(key.id)
        }
        other => {
            debug!("Ignoring {} change", other);
            return Ok(None);
        }
    };
    Ok(Some(event))
}

/// What the reader does with one inbound frame
#[derive(Debug)]
enum Inbound {
    Event(FeedEvent),
    Closed(TransportError),
    Ignore,
}

fn classify(topic: &str, msg: PhoenixMessage) -> Inbound {
    if msg.topic != topic {
        return Inbound::Ignore;
    }

    match msg.event.as_str() {
        "postgres_changes" => match parse_change(msg.payload) {
            Ok(Some(event)) => Inbound::Event(event),
            Ok(None) => Inbound::Ignore,
            Err(e) => {
                warn!("Malformed change on {}, ending stream: {}", topic, e);
                Inbound::Closed(TransportError::Deserialization(e.to_string()))
            }
        },
        "phx_error" => Inbound::Closed(TransportError::Subscribe(msg.reply_reason())),
        "phx_close" => Inbound::Closed(TransportError::ChannelClosed),
        "phx_reply" => {
            if msg.reply_status() != Some("ok") {
                debug!("Non-ok reply on {}: {}", topic, msg.reply_reason());
            }
            Inbound::Ignore
        }
        "system" => {
            if msg.reply_status() == Some("error") {
                warn!("Realtime system error on {}: {}", topic, msg.payload);
            }
            Inbound::Ignore
        }
        _ => Inbound::Ignore,
    }
}

/// Realtime websocket client for one table
#[derive(Debug, Clone)]
pub struct RealtimeClient {
    config: SupabaseConfig,
    heartbeat_interval: Duration,
}

impl RealtimeClient {
    pub fn new(config: SupabaseConfig) -> Self {
        RealtimeClient {
            config,
            heartbeat_interval: DEFAULT_HEARTBEAT_INTERVAL,
        }
    }

    pub fn with_heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = interval;
        self
    }

    /// Connect, join the table's channel, and start streaming changes.
    ///
    /// Resolves once the server has acknowledged the join.
    pub async fn connect(&self) -> Result<RealtimeStream, SupabaseError> {
        let url = self.config.realtime_url()?;
        let topic = self.config.topic();
        let (mut ws, _) = connect_async(url.as_str()).await?;

        let refs = Arc::new(AtomicU64::new(1));
        let join_ref = next_ref(&refs);
        let join = PhoenixMessage::join(
            &topic,
            &self.config.schema,
            &self.config.table,
            &self.config.anon_key,
            join_ref.clone(),
        );
        ws.send(Message::Text(serde_json::to_string(&join)?.into()))
            .await?;

        let joined = tokio::time::timeout(
            self.config.request_timeout,
            await_join(&mut ws, &topic, &join_ref),
        )
        .await
        .unwrap_or(Err(SupabaseError::Timeout("channel join")));
        if let Err(e) = joined {
            let _ = ws.close(None).await;
            return Err(e);
        }
        info!("Joined realtime channel {}", topic);

        let (write, read) = ws.split();
        let (event_tx, event_rx) = mpsc::channel(1024);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let (stale_tx, stale_rx) = oneshot::channel();
        let awaiting = Arc::new(AtomicU64::new(NO_HEARTBEAT));

        let writer = tokio::spawn(write_loop(
            write,
            topic.clone(),
            Heartbeats {
                refs,
                awaiting: awaiting.clone(),
                interval: self.heartbeat_interval,
                stale_tx,
            },
            shutdown_rx,
        ));
        let reader = tokio::spawn(read_loop(read, topic, awaiting, event_tx, stale_rx));

        Ok(RealtimeStream {
            events: event_rx,
            shutdown: Some(shutdown_tx),
            writer: Some(writer),
            reader,
        })
    }
}

fn next_ref(refs: &AtomicU64) -> String {
    refs.fetch_add(1, Ordering::SeqCst).to_string()
}

async fn await_join(ws: &mut WsStream, topic: &str, join_ref: &str) -> Result<(), SupabaseError> {
    while let Some(msg) = ws.next().await {
        match msg? {
            Message::Text(text) => {
                let msg: PhoenixMessage = match serde_json::from_str(&text) {
                    Ok(msg) => msg,
                    Err(e) => {
                        debug!("Skipping unparseable frame while joining: {}", e);
                        continue;
                    }
                };
                if msg.event == "phx_reply"
                    && msg.topic == topic
                    && msg.reference.as_deref() == Some(join_ref)
                {
                    return match msg.reply_status() {
                        Some("ok") => Ok(()),
                        _ => Err(SupabaseError::JoinRejected(msg.reply_reason())),
                    };
                }
            }
            Message::Close(_) => return Err(SupabaseError::ChannelClosed),
            _ => {}
        }
    }
    Err(SupabaseError::ChannelClosed)
}

async fn send_message(
    write: &mut SplitSink<WsStream, Message>,
    msg: &PhoenixMessage,
) -> Result<(), SupabaseError> {
    let json = serde_json::to_string(msg)?;
    write.send(Message::Text(json.into())).await?;
    Ok(())
}

/// Writer-side heartbeat state
struct Heartbeats {
    refs: Arc<AtomicU64>,
    /// Ref of the heartbeat still waiting for its reply
    awaiting: Arc<AtomicU64>,
    interval: Duration,
    /// Fired when a heartbeat went unanswered for a whole interval
    stale_tx: oneshot::Sender<()>,
}

async fn write_loop(
    mut write: SplitSink<WsStream, Message>,
    topic: String,
    heartbeats: Heartbeats,
    mut shutdown_rx: oneshot::Receiver<()>,
) {
    let Heartbeats {
        refs,
        awaiting,
        interval,
        stale_tx,
    } = heartbeats;
    let mut heartbeat = tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);

    loop {
        tokio::select! {
            _ = heartbeat.tick() => {
                let missed = awaiting.load(Ordering::SeqCst);
                if missed != NO_HEARTBEAT {
                    warn!("Realtime heartbeat {} unanswered, ending stream", missed);
                    let _ = stale_tx.send(());
                    break;
                }

                let reference = refs.fetch_add(1, Ordering::SeqCst);
                awaiting.store(reference, Ordering::SeqCst);
                let beat = PhoenixMessage::heartbeat(reference.to_string());
                if let Err(e) = send_message(&mut write, &beat).await {
                    warn!("Realtime heartbeat failed: {}", e);
                    break;
                }
            }
            // Fires on an explicit close and when the stream is dropped
            _ = &mut shutdown_rx => {
                let leave = PhoenixMessage::leave(&topic, next_ref(&refs));
                let _ = send_message(&mut write, &leave).await;
                let _ = write.close().await;
                debug!("Left realtime channel {}", topic);
                break;
            }
        }
    }
}

/// Clear the outstanding heartbeat if `msg` is its reply
fn acknowledge_heartbeat(msg: &PhoenixMessage, awaiting: &AtomicU64) -> bool {
    if msg.topic != HEARTBEAT_TOPIC || msg.event != "phx_reply" {
        return false;
    }
    let Some(reference) = msg.reference.as_deref().and_then(|r| r.parse::<u64>().ok()) else {
        return true;
    };
    let _ = awaiting.compare_exchange(
        reference,
        NO_HEARTBEAT,
        Ordering::SeqCst,
        Ordering::SeqCst,
    );
    true
}

async fn read_loop(
    mut read: SplitStream<WsStream>,
    topic: String,
    awaiting: Arc<AtomicU64>,
    events: mpsc::Sender<TransportResult<FeedEvent>>,
    mut stale_rx: oneshot::Receiver<()>,
) {
    let mut writer_running = true;
    let end = loop {
        let next = tokio::select! {
            stale = &mut stale_rx, if writer_running => {
                match stale {
                    Ok(()) => break TransportError::Timeout,
                    Err(_) => {
                        writer_running = false;
                        continue;
                    }
                }
            }
            next = read.next() => next,
        };
        let Some(msg) = next else {
            break TransportError::ChannelClosed;
        };
        match msg {
            Ok(Message::Text(text)) => {
                let msg: PhoenixMessage = match serde_json::from_str(&text) {
                    Ok(msg) => msg,
                    Err(e) => {
                        debug!("Skipping unparseable realtime frame: {}", e);
                        continue;
                    }
                };
                if acknowledge_heartbeat(&msg, &awaiting) {
                    continue;
                }
                match classify(&topic, msg) {
                    Inbound::Event(event) => {
                        if events.send(Ok(event)).await.is_err() {
                            return;
                        }
                    }
                    Inbound::Closed(reason) => break reason,
                    Inbound::Ignore => {}
                }
            }
            Ok(Message::Close(frame)) => {
                debug!("Realtime socket closed by server: {:?}", frame);
                break TransportError::ChannelClosed;
            }
            Ok(_) => {}
            Err(e) => break TransportError::Connection(e.to_string()),
        }
    };

    let _ = events.send(Err(end)).await;
}

/// Change stream over a joined realtime channel
pub struct RealtimeStream {
    events: mpsc::Receiver<TransportResult<FeedEvent>>,
    shutdown: Option<oneshot::Sender<()>>,
    writer: Option<JoinHandle<()>>,
    reader: JoinHandle<()>,
}

#[async_trait]
impl ChangeStream for RealtimeStream {
    async fn next(&mut self) -> TransportResult<FeedEvent> {
        self.events
            .recv()
            .await
            .unwrap_or(Err(TransportError::ChannelClosed))
    }

    async fn close(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(writer) = self.writer.take() {
            let _ = tokio::time::timeout(CLOSE_GRACE, writer).await;
        }
        self.reader.abort();
        self.events.close();
    }
}

impl Drop for RealtimeStream {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

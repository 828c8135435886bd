//! The realtime WebSocket client actor.
//!
//! Owns exactly one logical connection to the game server. Views subscribe by
//! message type (one recipient per type, last registration wins) and forward
//! intents with [`Outbound`]; the actor handles framing, the heartbeat, and
//! the bounded reconnect policy on top of the pure [`Connection`] machine.

use std::collections::HashMap;

use actix::io::SinkWrite;
use actix::prelude::*;
use actix_codec::Framed;
use awc::error::WsProtocolError;
use awc::{ws, BoxedSocket};
use futures::stream::{SplitSink, StreamExt};
use log::{debug, info, warn};
use serde_json::Value;

use crate::models::Envelope;
use crate::websocket::connection::{ConnState, Connection, SendAction, HEARTBEAT_INTERVAL};
use crate::websocket::protocol;

type WsSink = SinkWrite<ws::Message, SplitSink<Framed<BoxedSocket, ws::Codec>, ws::Message>>;

/// One decoded server message, delivered to the subscriber for its type.
#[derive(Message, Debug, Clone)]
#[rtype(result = "()")]
pub struct ServerFrame {
    pub msg_type: String,
    pub payload: Value,
}

/// Sent to the lifecycle recipient every time the socket (re)opens.
#[derive(Message, Debug, Clone, Copy)]
#[rtype(result = "()")]
pub struct Opened;

/// Open the socket (no-op while already connecting or connected).
#[derive(Message)]
#[rtype(result = "()")]
pub struct Connect;

/// An outbound intent. Queued while connecting, dropped (with a log line)
/// while disconnected; there is deliberately no error return.
#[derive(Message)]
#[rtype(result = "()")]
pub struct Outbound(pub Envelope);

/// Register the handler for one message type, replacing any previous one.
#[derive(Message)]
#[rtype(result = "()")]
pub struct Subscribe {
    pub msg_type: String,
    pub recipient: Recipient<ServerFrame>,
}

/// Remove the handler for one message type.
#[derive(Message)]
#[rtype(result = "()")]
pub struct Unsubscribe {
    pub msg_type: String,
}

/// One raw inbound text frame, possibly carrying several envelopes. Lets
/// tests drive the dispatch path without a live socket.
#[derive(Message)]
#[rtype(result = "()")]
pub(crate) struct FrameText(pub String);

/// Intentional teardown: close the socket without reconnecting and stop.
#[derive(Message)]
#[rtype(result = "()")]
pub struct Shutdown;

pub struct RealtimeClient {
    url: String,
    conn: Connection,
    handlers: HashMap<String, Recipient<ServerFrame>>,
    lifecycle: Option<Recipient<Opened>>,
    sink: Option<WsSink>,
    heartbeat: Option<SpawnHandle>,
    reconnect: Option<SpawnHandle>,
}

impl RealtimeClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            conn: Connection::new(),
            handlers: HashMap::new(),
            lifecycle: None,
            sink: None,
            heartbeat: None,
            reconnect: None,
        }
    }

    /// Set the recipient notified on every successful open.
    pub fn with_lifecycle(mut self, recipient: Recipient<Opened>) -> Self {
        self.lifecycle = Some(recipient);
        self
    }

    fn connect_ws(&mut self, ctx: &mut Context<Self>) {
        self.conn.begin_connect();
        let url = self.url.clone();
        info!("Connecting to {}", url);
        let fut = async move { awc::Client::new().ws(url).connect().await };
        fut.into_actor(self)
            .map(|res, act, ctx| match res {
                Ok((_response, framed)) => {
                    let (sink, stream) = framed.split();
                    ctx.add_stream(stream);
                    act.sink = Some(SinkWrite::new(sink, ctx));
                    act.on_opened(ctx);
                }
                Err(e) => {
                    warn!("WebSocket connect failed: {}", e);
                    act.on_closed(ctx);
                }
            })
            .spawn(ctx);
    }

    fn on_opened(&mut self, ctx: &mut Context<Self>) {
        info!("WebSocket connected");
        // Flush frames queued while the socket was connecting, in order.
        for frame in self.conn.opened() {
            self.transmit(frame);
        }
        if let Some(lifecycle) = &self.lifecycle {
            lifecycle.do_send(Opened);
        }
        self.start_heartbeat(ctx);
    }

    fn on_closed(&mut self, ctx: &mut Context<Self>) {
        if self.conn.state() == ConnState::Disconnected {
            // Close frame and stream end can both land here; act once.
            return;
        }
        self.stop_heartbeat(ctx);
        self.sink = None;
        match self.conn.closed() {
            Some(delay) => {
                info!(
                    "WebSocket disconnected, reconnecting in {}s (attempt {})",
                    delay.as_secs(),
                    self.conn.reconnect_attempts()
                );
                if let Some(handle) = self.reconnect.take() {
                    ctx.cancel_future(handle);
                }
                self.reconnect = Some(ctx.run_later(delay, |act, ctx| {
                    act.reconnect = None;
                    act.connect_ws(ctx);
                }));
            }
            None => info!("WebSocket disconnected"),
        }
    }

    fn transmit(&mut self, frame: String) {
        match self.sink.as_mut() {
            Some(sink) => {
                if sink.write(ws::Message::Text(frame.into())).is_err() {
                    warn!("WebSocket sink closed, frame dropped");
                }
            }
            None => warn!("WebSocket not ready, frame dropped"),
        }
    }

    /// Starting clears any prior timer first, so the heartbeat is never
    /// double-started across reconnects.
    fn start_heartbeat(&mut self, ctx: &mut Context<Self>) {
        self.stop_heartbeat(ctx);
        self.heartbeat = Some(ctx.run_interval(HEARTBEAT_INTERVAL, |act, _ctx| {
            if act.conn.is_connected() {
                act.transmit(protocol::encode_frame(&Envelope::heartbeat()));
            }
        }));
    }

    fn stop_heartbeat(&mut self, ctx: &mut Context<Self>) {
        if let Some(handle) = self.heartbeat.take() {
            ctx.cancel_future(handle);
        }
    }

    fn dispatch(&mut self, raw: &str) {
        for envelope in protocol::decode_frame(raw) {
            match self.handlers.get(&envelope.msg_type) {
                Some(recipient) => recipient.do_send(ServerFrame {
                    msg_type: envelope.msg_type,
                    payload: envelope.payload,
                }),
                None => debug!("No handler for message type: {}", envelope.msg_type),
            }
        }
    }
}

impl Actor for RealtimeClient {
    type Context = Context<Self>;

    fn stopping(&mut self, ctx: &mut Self::Context) -> Running {
        // Leave no dangling timers behind.
        self.stop_heartbeat(ctx);
        if let Some(handle) = self.reconnect.take() {
            ctx.cancel_future(handle);
        }
        if let Some(sink) = self.sink.as_mut() {
            sink.close();
        }
        Running::Stop
    }
}

impl StreamHandler<Result<ws::Frame, WsProtocolError>> for RealtimeClient {
    fn handle(&mut self, item: Result<ws::Frame, WsProtocolError>, ctx: &mut Self::Context) {
        match item {
            Ok(ws::Frame::Text(bytes)) => match std::str::from_utf8(&bytes) {
                Ok(text) => self.dispatch(text),
                Err(e) => warn!("Discarding non-UTF-8 text frame: {}", e),
            },
            Ok(ws::Frame::Ping(payload)) => {
                if let Some(sink) = self.sink.as_mut() {
                    let _ = sink.write(ws::Message::Pong(payload));
                }
            }
            Ok(ws::Frame::Pong(_)) => {}
            Ok(ws::Frame::Close(reason)) => {
                info!("Server closed the connection: {:?}", reason);
                self.on_closed(ctx);
            }
            Ok(ws::Frame::Binary(_)) => {
                warn!("Binary frames are not supported");
            }
            Ok(ws::Frame::Continuation(_)) => {}
            Err(e) => {
                warn!("WebSocket protocol error: {}", e);
                self.on_closed(ctx);
            }
        }
    }

    fn finished(&mut self, ctx: &mut Self::Context) {
        self.on_closed(ctx);
    }
}

impl actix::io::WriteHandler<WsProtocolError> for RealtimeClient {
    fn error(&mut self, err: WsProtocolError, ctx: &mut Self::Context) -> Running {
        warn!("WebSocket write error: {}", err);
        self.on_closed(ctx);
        Running::Continue
    }

    fn finished(&mut self, _ctx: &mut Self::Context) {
        // Sink teardown is handled through on_closed; keep the actor alive.
    }
}

impl Handler<Connect> for RealtimeClient {
    type Result = ();

    fn handle(&mut self, _msg: Connect, ctx: &mut Self::Context) {
        match self.conn.state() {
            ConnState::Connecting | ConnState::Connected => {
                debug!("Connect ignored, already {:?}", self.conn.state());
            }
            _ => self.connect_ws(ctx),
        }
    }
}

impl Handler<Outbound> for RealtimeClient {
    type Result = ();

    fn handle(&mut self, msg: Outbound, _ctx: &mut Self::Context) {
        let msg_type = msg.0.msg_type.clone();
        let frame = protocol::encode_frame(&msg.0);
        match self.conn.send(frame) {
            SendAction::Transmit(frame) => {
                debug!("Sent message: {}", msg_type);
                self.transmit(frame);
            }
            SendAction::Queued => debug!("Queued message (connecting): {}", msg_type),
            SendAction::Dropped => warn!("WebSocket not ready, dropping message: {}", msg_type),
        }
    }
}

impl Handler<Subscribe> for RealtimeClient {
    type Result = ();

    fn handle(&mut self, msg: Subscribe, _ctx: &mut Self::Context) {
        // Last registration wins; there is no multi-subscriber fan-out.
        self.handlers.insert(msg.msg_type, msg.recipient);
    }
}

impl Handler<Unsubscribe> for RealtimeClient {
    type Result = ();

    fn handle(&mut self, msg: Unsubscribe, _ctx: &mut Self::Context) {
        self.handlers.remove(&msg.msg_type);
    }
}

impl Handler<FrameText> for RealtimeClient {
    type Result = ();

    fn handle(&mut self, msg: FrameText, _ctx: &mut Self::Context) {
        self.dispatch(&msg.0);
    }
}

impl Handler<Shutdown> for RealtimeClient {
    type Result = ();

    fn handle(&mut self, _msg: Shutdown, ctx: &mut Self::Context) {
        self.conn.begin_close();
        ctx.stop();
    }
}

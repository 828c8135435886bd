//! Connection lifecycle state machine.
//!
//! The implicit `onopen`/`onmessage`/`onclose` callback chain of a browser
//! client is modeled here as an explicit machine with states
//! `{Disconnected, Connecting, Connected, Closing}`. The machine owns the
//! outbound queue and the reconnect/backoff policy; it never touches a real
//! socket, so the whole policy is unit-testable. The actor in
//! [`crate::websocket::client`] drives it against an actual `awc` socket.

use std::collections::VecDeque;
use std::time::Duration;

/// Maximum number of automatic reconnect attempts after an unexpected close.
pub const MAX_RECONNECT_ATTEMPTS: u32 = 5;

/// Base delay multiplied by the attempt number: 2s, 4s, 6s, 8s, 10s.
pub const RECONNECT_BASE_DELAY: Duration = Duration::from_secs(2);

/// Interval between outbound heartbeat messages while connected.
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnState {
    Disconnected,
    Connecting,
    Connected,
    Closing,
}

/// What [`Connection::send`] decided to do with an outbound frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendAction {
    /// Socket is open; transmit the frame now.
    Transmit(String),
    /// Socket is still connecting; frame was queued for the open flush.
    Queued,
    /// Socket is closed; frame was dropped (logged by the caller).
    Dropped,
}

/// Pure connection state: lifecycle, outbound queue, reconnect counter.
#[derive(Debug)]
pub struct Connection {
    state: ConnState,
    pending: VecDeque<String>,
    reconnect_attempts: u32,
}

impl Default for Connection {
    fn default() -> Self {
        Self::new()
    }
}

impl Connection {
    pub fn new() -> Self {
        Self {
            state: ConnState::Disconnected,
            pending: VecDeque::new(),
            reconnect_attempts: 0,
        }
    }

    pub fn state(&self) -> ConnState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnState::Connected
    }

    pub fn reconnect_attempts(&self) -> u32 {
        self.reconnect_attempts
    }

    /// A connect was initiated; sends from now on are queued.
    pub fn begin_connect(&mut self) {
        self.state = ConnState::Connecting;
    }

    /// The socket opened. Resets the attempt counter and drains the frames
    /// queued while connecting, in original enqueue order.
    pub fn opened(&mut self) -> Vec<String> {
        self.state = ConnState::Connected;
        self.reconnect_attempts = 0;
        self.pending.drain(..).collect()
    }

    /// Decide what to do with one outbound frame given the current state.
    pub fn send(&mut self, frame: String) -> SendAction {
        match self.state {
            ConnState::Connected => SendAction::Transmit(frame),
            ConnState::Connecting => {
                self.pending.push_back(frame);
                SendAction::Queued
            }
            ConnState::Disconnected | ConnState::Closing => SendAction::Dropped,
        }
    }

    /// An intentional teardown started; the close that follows must not
    /// trigger a reconnect.
    pub fn begin_close(&mut self) {
        self.state = ConnState::Closing;
    }

    /// The socket closed (or a connect attempt failed). Returns the delay
    /// before the next automatic reconnect, or `None` when the close was
    /// intentional or the attempt budget is spent.
    pub fn closed(&mut self) -> Option<Duration> {
        if self.state == ConnState::Closing {
            self.state = ConnState::Disconnected;
            return None;
        }
        self.state = ConnState::Disconnected;
        if self.reconnect_attempts >= MAX_RECONNECT_ATTEMPTS {
            return None;
        }
        self.reconnect_attempts += 1;
        Some(RECONNECT_BASE_DELAY * self.reconnect_attempts)
    }
}

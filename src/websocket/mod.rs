pub mod client;
pub mod connection;
pub mod protocol;

pub use client::{
    Connect, Opened, Outbound, RealtimeClient, ServerFrame, Shutdown, Subscribe, Unsubscribe,
};
pub use connection::{ConnState, Connection, SendAction};

//! # Connect Four client
//!
//! Terminal client for the "4 in a Row" realtime game server. The server
//! owns all game rules, matchmaking, and timeout enforcement; this crate
//! renders the state it is handed and forwards user intents as messages.
//!
//! ## Modules
//!
//! - [`websocket`]: realtime client with the connection state machine,
//!   frame splitting, dispatch table, heartbeat, and bounded reconnect
//! - [`api`]: REST client for leaderboard, history, and analytics
//! - [`models`]: wire types shared with the server
//! - [`session`]: saved-session persistence with a 30 s validity window
//! - [`game`]: view state machine and countdown derivation
//! - [`ui`]: plain-text rendering
//! - [`config`]: environment configuration

pub mod api;
pub mod config;
pub mod game;
pub mod models;
pub mod session;
pub mod ui;
pub mod websocket;

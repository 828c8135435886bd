//! Countdown derivation for the turn and inactivity timers.
//!
//! Both countdowns are recomputed from server-provided timestamps each tick;
//! the client clock is never authoritative and the server alone enforces the
//! real timeouts. Displayed values floor at zero.

use chrono::{DateTime, Utc};

use crate::models::GameState;

/// Seconds of idleness after which the server abandons a game.
pub const INACTIVITY_LIMIT_SECS: i64 = 60;

/// Seconds left on the current turn, floored at zero.
pub fn turn_remaining(game: &GameState, now: DateTime<Utc>) -> i64 {
    let elapsed = now.signed_duration_since(game.turn_started_at).num_seconds();
    (game.turn_timeout_sec - elapsed).max(0)
}

/// Seconds left before the inactivity limit, floored at zero.
pub fn inactivity_remaining(game: &GameState, now: DateTime<Utc>) -> i64 {
    let elapsed = now.signed_duration_since(game.last_move_at).num_seconds();
    (INACTIVITY_LIMIT_SECS - elapsed).max(0)
}

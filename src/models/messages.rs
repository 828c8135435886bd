use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Server-to-client message types the views subscribe to.
pub const PLAYER_INFO: &str = "player_info";
pub const WAITING: &str = "waiting";
pub const GAME_UPDATE: &str = "game_update";
pub const ERROR: &str = "error";
pub const RECONNECTED: &str = "reconnected";

/// Wire envelope used in both directions: `{"type": ..., "payload": ...}`.
///
/// One physical WebSocket text frame may carry several envelopes separated by
/// newlines; see [`crate::websocket::protocol`].
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Envelope {
    #[serde(rename = "type")]
    pub msg_type: String,
    #[serde(default)]
    pub payload: Value,
}

impl Envelope {
    pub fn new(msg_type: impl Into<String>, payload: Value) -> Self {
        Self {
            msg_type: msg_type.into(),
            payload,
        }
    }

    /// `join` intent carrying the chosen username.
    pub fn join(username: &str) -> Self {
        Self::new("join", json!({ "username": username }))
    }

    /// `move` intent dropping a disc into `column` (0-based).
    pub fn make_move(column: usize) -> Self {
        Self::new("move", json!({ "column": column }))
    }

    /// `reconnect` intent bearing a previously issued session token.
    pub fn reconnect(session_token: &str) -> Self {
        Self::new("reconnect", json!({ "session_token": session_token }))
    }

    pub fn heartbeat() -> Self {
        Self::new("heartbeat", json!({}))
    }
}

/// Payload of `player_info` and `reconnected` messages: the identity the
/// server issued for this connection.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PlayerInfo {
    pub player_id: String,
    pub game_id: String,
    pub username: String,
    pub session_token: String,
}

/// Payload of `waiting` messages.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct WaitingNotice {
    #[serde(default)]
    pub message: Option<String>,
}

/// Payload of server `error` messages.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ErrorNotice {
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_round_trips_type_field() {
        let env = Envelope::join("alice");
        let text = serde_json::to_string(&env).unwrap();
        assert!(text.contains("\"type\":\"join\""));
        let back: Envelope = serde_json::from_str(&text).unwrap();
        assert_eq!(back.msg_type, "join");
        assert_eq!(back.payload["username"], "alice");
    }

    #[test]
    fn move_payload_carries_column() {
        let env = Envelope::make_move(3);
        assert_eq!(env.msg_type, "move");
        assert_eq!(env.payload["column"], 3);
    }

    #[test]
    fn heartbeat_has_empty_payload() {
        let env = Envelope::heartbeat();
        let text = serde_json::to_string(&env).unwrap();
        assert_eq!(text, r#"{"type":"heartbeat","payload":{}}"#);
    }

    #[test]
    fn missing_payload_defaults_to_null() {
        let env: Envelope = serde_json::from_str(r#"{"type":"waiting"}"#).unwrap();
        assert_eq!(env.msg_type, "waiting");
        assert!(env.payload.is_null());
    }

    #[test]
    fn player_info_parses_server_shape() {
        let info: PlayerInfo = serde_json::from_str(
            r#"{"player_id":"p-1","game_id":"g-1","username":"alice","session_token":"tok"}"#,
        )
        .unwrap();
        assert_eq!(info.player_id, "p-1");
        assert_eq!(info.session_token, "tok");
    }
}

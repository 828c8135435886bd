//! View-level game state machine.
//!
//! Tracks which screen the player is on and reacts to dispatched server
//! messages: persisting the session on `player_info`, replacing the snapshot
//! on `game_update`, classifying `error` payloads, and deriving the result
//! message when a game finishes. Pure apart from the session file, so every
//! transition is unit-testable without a socket.

use chrono::{DateTime, Utc};
use log::{info, warn};

use crate::models::{Envelope, ErrorNotice, GameState, GameStatus, PlayerInfo, WaitingNotice};
use crate::session::{SavedSession, SessionStore};

/// Seconds before a transient error line is auto-dismissed.
pub const ERROR_DISMISS_SECS: i64 = 5;

/// Seconds before a transient notice (like the reconnect banner) is
/// auto-dismissed. Persistent notices such as "Waiting for opponent..."
/// never expire.
pub const NOTICE_DISMISS_SECS: i64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Lobby,
    Connecting,
    Waiting,
    Playing,
    Finished,
}

/// A server `error` payload is session-invalidating when it reports the game
/// or session as missing/expired. The backend only gives us prose, so this
/// matches substrings of the known messages ("Game not found",
/// "Reconnect failed: ...", "Session token is required", "... expired").
pub fn is_session_invalidating(message: &str) -> bool {
    let message = message.to_lowercase();
    ["game not found", "session", "expired", "reconnect failed"]
        .iter()
        .any(|needle| message.contains(needle))
}

pub struct GameView {
    phase: Phase,
    game: Option<GameState>,
    me: Option<PlayerInfo>,
    notice: Option<String>,
    notice_set_at: Option<DateTime<Utc>>,
    error: Option<String>,
    error_set_at: Option<DateTime<Utc>>,
    store: SessionStore,
}

impl GameView {
    pub fn new(store: SessionStore) -> Self {
        Self {
            phase: Phase::Lobby,
            game: None,
            me: None,
            notice: None,
            notice_set_at: None,
            error: None,
            error_set_at: None,
            store,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn game(&self) -> Option<&GameState> {
        self.game.as_ref()
    }

    pub fn me(&self) -> Option<&PlayerInfo> {
        self.me.as_ref()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn my_player_id(&self) -> Option<&str> {
        self.me.as_ref().map(|info| info.player_id.as_str())
    }

    pub fn is_my_turn(&self) -> bool {
        match (&self.game, self.my_player_id()) {
            (Some(game), Some(id)) => game.is_turn_of(id),
            _ => false,
        }
    }

    // User intents.

    /// Resume a previously saved session, if one exists and is still inside
    /// its validity window. A stale session is discarded and never sent.
    pub fn resume(&mut self, now: DateTime<Utc>) -> Option<Envelope> {
        let session = self.store.load()?;
        if !session.is_fresh(now) {
            info!("Stored session for {} is stale, discarding", session.username);
            self.store.clear();
            return None;
        }
        info!("Resuming session for {}", session.username);
        self.phase = Phase::Connecting;
        Some(Envelope::reconnect(&session.session_token))
    }

    /// Join matchmaking under the given username.
    pub fn join(&mut self, username: &str) -> Envelope {
        self.phase = Phase::Waiting;
        self.set_notice("Waiting for opponent...");
        Envelope::join(username)
    }

    /// Reconnect with a token the user supplied manually (e.g. copied from
    /// another device).
    pub fn manual_reconnect(&mut self, session_token: &str) -> Envelope {
        self.phase = Phase::Connecting;
        Envelope::reconnect(session_token)
    }

    /// Drop a disc into `column`, when playing and it is this player's turn.
    pub fn make_move(&mut self, column: usize) -> Option<Envelope> {
        if self.phase != Phase::Playing {
            warn!("Ignoring move: no game in progress");
            return None;
        }
        if !self.is_my_turn() {
            warn!("Ignoring move: not your turn");
            return None;
        }
        Some(Envelope::make_move(column))
    }

    /// Back to the lobby, dropping all game and session state.
    pub fn play_again(&mut self) {
        self.phase = Phase::Lobby;
        self.game = None;
        self.me = None;
        self.notice = None;
        self.notice_set_at = None;
        self.error = None;
        self.error_set_at = None;
        self.store.clear();
    }

    // Server messages.

    pub fn on_player_info(&mut self, info: PlayerInfo, now: DateTime<Utc>) {
        if let Err(e) = self
            .store
            .save(&SavedSession::from_player_info(&info, now))
        {
            warn!("Could not persist session: {}", e);
        }
        self.me = Some(info);
        if matches!(self.phase, Phase::Lobby | Phase::Connecting) {
            self.phase = Phase::Waiting;
        }
    }

    pub fn on_waiting(&mut self, payload: WaitingNotice) {
        self.phase = Phase::Waiting;
        let message = payload
            .message
            .unwrap_or_else(|| "Waiting for opponent...".to_string());
        self.set_notice(&message);
    }

    /// Replace the snapshot wholesale and transition by its status.
    pub fn on_game_update(&mut self, game: GameState, _now: DateTime<Utc>) {
        match game.status {
            GameStatus::InProgress => {
                self.phase = Phase::Playing;
                self.notice = None;
                self.notice_set_at = None;
            }
            GameStatus::Finished | GameStatus::Abandoned => {
                self.phase = Phase::Finished;
                let message = game.describe_result(self.my_player_id());
                self.set_notice(&message);
                self.store.clear();
            }
            GameStatus::Waiting => {
                self.phase = Phase::Waiting;
            }
        }
        self.game = Some(game);
    }

    pub fn on_error(&mut self, payload: ErrorNotice, now: DateTime<Utc>) {
        let message = if payload.message.is_empty() {
            "An error occurred".to_string()
        } else {
            payload.message
        };
        if is_session_invalidating(&message) {
            info!("Session invalidated by server: {}", message);
            self.store.clear();
            self.me = None;
            self.game = None;
            self.phase = Phase::Lobby;
            self.set_error("Previous game expired. Please join a new game.", now);
        } else {
            self.set_error(&message, now);
        }
    }

    pub fn on_reconnected(&mut self, info: PlayerInfo, now: DateTime<Utc>) {
        if let Err(e) = self
            .store
            .save(&SavedSession::from_player_info(&info, now))
        {
            warn!("Could not refresh session: {}", e);
        }
        self.me = Some(info);
        self.phase = Phase::Playing;
        self.set_transient_notice("Reconnected to game!", now);
    }

    /// Once-per-second housekeeping: transient errors and notices dismiss
    /// themselves.
    pub fn tick(&mut self, now: DateTime<Utc>) {
        if let Some(set_at) = self.error_set_at {
            if now.signed_duration_since(set_at).num_seconds() >= ERROR_DISMISS_SECS {
                self.error = None;
                self.error_set_at = None;
            }
        }
        if let Some(set_at) = self.notice_set_at {
            if now.signed_duration_since(set_at).num_seconds() >= NOTICE_DISMISS_SECS {
                self.notice = None;
                self.notice_set_at = None;
            }
        }
    }

    fn set_notice(&mut self, message: &str) {
        self.notice = Some(message.to_string());
        self.notice_set_at = None;
    }

    fn set_transient_notice(&mut self, message: &str, now: DateTime<Utc>) {
        self.notice = Some(message.to_string());
        self.notice_set_at = Some(now);
    }

    fn set_error(&mut self, message: &str, now: DateTime<Utc>) {
        self.error = Some(message.to_string());
        self.error_set_at = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SavedSession;
    use chrono::Duration;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static COUNTER: AtomicUsize = AtomicUsize::new(0);

    fn view() -> GameView {
        let n = COUNTER.fetch_add(1, Ordering::SeqCst);
        let path = std::env::temp_dir().join(format!(
            "connect-four-view-test-{}-{}/session.json",
            std::process::id(),
            n
        ));
        GameView::new(SessionStore::new(path))
    }

    fn player_info() -> PlayerInfo {
        PlayerInfo {
            player_id: "p-1".into(),
            game_id: "g-1".into(),
            username: "alice".into(),
            session_token: "tok-1".into(),
        }
    }

    fn in_progress_game(current_turn: u8) -> GameState {
        serde_json::from_str(&format!(
            r#"{{
                "id": "g-1",
                "player1": {{"id": "p-1", "username": "alice", "is_bot": false, "connected": true}},
                "player2": {{"id": "p-2", "username": "bob", "is_bot": false, "connected": true}},
                "board": [[0,0,0,0,0,0,0],[0,0,0,0,0,0,0],[0,0,0,0,0,0,0],
                          [0,0,0,0,0,0,0],[0,0,0,0,0,0,0],[0,0,0,0,0,0,0]],
                "current_turn": {},
                "status": "in_progress",
                "created_at": "2025-01-05T10:00:00Z",
                "last_move_at": "2025-01-05T10:00:00Z",
                "turn_started_at": "2025-01-05T10:00:00Z",
                "turn_timeout_sec": 30
            }}"#,
            current_turn
        ))
        .unwrap()
    }

    #[test]
    fn player_info_persists_session_and_enters_waiting() {
        let mut view = view();
        let now = Utc::now();
        view.join("alice");
        view.on_player_info(player_info(), now);
        assert_eq!(view.phase(), Phase::Waiting);
        assert_eq!(view.my_player_id(), Some("p-1"));
    }

    #[test]
    fn game_update_in_progress_enters_playing() {
        let mut view = view();
        let now = Utc::now();
        view.on_player_info(player_info(), now);
        view.on_game_update(in_progress_game(1), now);
        assert_eq!(view.phase(), Phase::Playing);
        assert!(view.is_my_turn());
        assert!(view.notice().is_none());
    }

    #[test]
    fn finished_draw_shows_exact_message_and_clears_session() {
        let mut view = view();
        let now = Utc::now();
        view.on_player_info(player_info(), now);

        let mut game = in_progress_game(1);
        game.status = GameStatus::Finished;
        game.result = Some(crate::models::GameResult::Draw);
        view.on_game_update(game, now);

        assert_eq!(view.phase(), Phase::Finished);
        assert_eq!(view.notice(), Some("It's a draw!"));
        // Session was cleared: a later resume finds nothing.
        let mut fresh = GameView::new(SessionStore::new(view.store.path().clone()));
        assert!(fresh.resume(now).is_none());
    }

    #[test]
    fn invalidating_error_clears_everything_from_any_phase() {
        let mut view = view();
        let now = Utc::now();
        view.on_player_info(player_info(), now);
        view.on_game_update(in_progress_game(1), now);
        assert_eq!(view.phase(), Phase::Playing);

        view.on_error(
            ErrorNotice {
                message: "Game not found".into(),
            },
            now,
        );
        assert_eq!(view.phase(), Phase::Lobby);
        assert!(view.me().is_none());
        assert!(view.game().is_none());
        assert_eq!(
            view.error(),
            Some("Previous game expired. Please join a new game.")
        );
        assert!(view.store.load().is_none());
    }

    #[test]
    fn transient_error_keeps_phase_and_dismisses_after_five_seconds() {
        let mut view = view();
        let now = Utc::now();
        view.on_player_info(player_info(), now);
        view.on_game_update(in_progress_game(1), now);

        view.on_error(
            ErrorNotice {
                message: "Not your turn".into(),
            },
            now,
        );
        assert_eq!(view.phase(), Phase::Playing);
        assert_eq!(view.error(), Some("Not your turn"));

        view.tick(now + Duration::seconds(4));
        assert_eq!(view.error(), Some("Not your turn"));
        view.tick(now + Duration::seconds(5));
        assert!(view.error().is_none());
    }

    #[test]
    fn stale_session_is_never_used_for_reconnect() {
        let mut view = view();
        let now = Utc::now();
        view.store
            .save(&SavedSession {
                session_token: "tok-old".into(),
                player_id: "p-1".into(),
                game_id: "g-1".into(),
                username: "alice".into(),
                saved_at: now - Duration::seconds(31),
            })
            .unwrap();

        assert!(view.resume(now).is_none());
        assert_eq!(view.phase(), Phase::Lobby);
        assert!(view.store.load().is_none());
    }

    #[test]
    fn fresh_session_resumes_with_its_token() {
        let mut view = view();
        let now = Utc::now();
        view.store
            .save(&SavedSession {
                session_token: "tok-live".into(),
                player_id: "p-1".into(),
                game_id: "g-1".into(),
                username: "alice".into(),
                saved_at: now - Duration::seconds(10),
            })
            .unwrap();

        let envelope = view.resume(now).unwrap();
        assert_eq!(envelope.msg_type, "reconnect");
        assert_eq!(envelope.payload["session_token"], "tok-live");
        assert_eq!(view.phase(), Phase::Connecting);
    }

    #[test]
    fn reconnected_restores_playing_and_refreshes_session() {
        let mut view = view();
        let now = Utc::now();
        view.on_reconnected(player_info(), now);
        assert_eq!(view.phase(), Phase::Playing);
        assert_eq!(view.notice(), Some("Reconnected to game!"));
        let saved = view.store.load().unwrap();
        assert_eq!(saved.session_token, "tok-1");
        assert_eq!(saved.saved_at, now);
    }

    #[test]
    fn reconnected_notice_dismisses_after_three_seconds() {
        let mut view = view();
        let now = Utc::now();
        view.on_reconnected(player_info(), now);
        assert_eq!(view.notice(), Some("Reconnected to game!"));

        view.tick(now + Duration::seconds(2));
        assert_eq!(view.notice(), Some("Reconnected to game!"));
        view.tick(now + Duration::seconds(3));
        assert!(view.notice().is_none());
        assert_eq!(view.phase(), Phase::Playing);
    }

    #[test]
    fn waiting_notice_never_expires() {
        let mut view = view();
        let now = Utc::now();
        view.join("alice");
        view.tick(now + Duration::seconds(600));
        assert_eq!(view.notice(), Some("Waiting for opponent..."));
    }

    #[test]
    fn moves_are_gated_on_phase_and_turn() {
        let mut view = view();
        let now = Utc::now();
        assert!(view.make_move(3).is_none());

        view.on_player_info(player_info(), now);
        view.on_game_update(in_progress_game(2), now);
        // Opponent's turn.
        assert!(view.make_move(3).is_none());

        view.on_game_update(in_progress_game(1), now);
        let envelope = view.make_move(3).unwrap();
        assert_eq!(envelope.msg_type, "move");
        assert_eq!(envelope.payload["column"], 3);
    }

    #[test]
    fn classifier_matches_known_server_messages() {
        assert!(is_session_invalidating("Game not found"));
        assert!(is_session_invalidating("Reconnect failed: game not found"));
        assert!(is_session_invalidating("Session token is required"));
        assert!(is_session_invalidating("Your session has expired"));
        assert!(!is_session_invalidating("Not your turn"));
        assert!(!is_session_invalidating("column is full"));
    }

    #[test]
    fn play_again_resets_to_lobby() {
        let mut view = view();
        let now = Utc::now();
        view.on_player_info(player_info(), now);
        view.on_game_update(in_progress_game(1), now);
        view.play_again();
        assert_eq!(view.phase(), Phase::Lobby);
        assert!(view.game().is_none());
        assert!(view.me().is_none());
        assert!(view.store.load().is_none());
    }
}

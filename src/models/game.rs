use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Board dimensions, fixed by the game rules.
pub const ROWS: usize = 6;
pub const COLS: usize = 7;

/// A player as reported by the server.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub id: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_token: Option<String>,
    #[serde(default)]
    pub is_bot: bool,
    #[serde(default)]
    pub connected: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    Waiting,
    InProgress,
    Finished,
    Abandoned,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GameResult {
    Player1Win,
    Player2Win,
    Draw,
    Abandoned,
}

/// Full game snapshot received in every `game_update` message.
///
/// The server is authoritative; the client replaces its copy wholesale on
/// every update and never mutates the board locally.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct GameState {
    pub id: String,
    pub player1: Option<Player>,
    pub player2: Option<Player>,
    /// 6 rows of 7 cells: 0 empty, 1 player one, 2 player two. Row 0 is the top.
    pub board: Vec<Vec<u8>>,
    /// 1 or 2.
    pub current_turn: u8,
    pub status: GameStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner: Option<Player>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<GameResult>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    pub last_move_at: DateTime<Utc>,
    pub turn_started_at: DateTime<Utc>,
    pub turn_timeout_sec: i64,
}

impl GameState {
    /// The player whose turn it currently is.
    pub fn current_player(&self) -> Option<&Player> {
        match self.current_turn {
            1 => self.player1.as_ref(),
            2 => self.player2.as_ref(),
            _ => None,
        }
    }

    /// Seat number (1 or 2) of the given player id, if they are in this game.
    pub fn seat_of(&self, player_id: &str) -> Option<u8> {
        if self.player1.as_ref().map(|p| p.id.as_str()) == Some(player_id) {
            Some(1)
        } else if self.player2.as_ref().map(|p| p.id.as_str()) == Some(player_id) {
            Some(2)
        } else {
            None
        }
    }

    pub fn is_turn_of(&self, player_id: &str) -> bool {
        self.current_player().map(|p| p.id.as_str()) == Some(player_id)
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.status, GameStatus::Finished | GameStatus::Abandoned)
    }

    /// Human-readable outcome line for a finished game, from the perspective
    /// of `my_player_id`.
    pub fn describe_result(&self, my_player_id: Option<&str>) -> String {
        if self.result == Some(GameResult::Draw) {
            return "It's a draw!".to_string();
        }
        match &self.winner {
            Some(winner) if Some(winner.id.as_str()) == my_player_id => "You won!".to_string(),
            Some(winner) => format!("{} won!", winner.username),
            None => "Game ended".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_json() -> &'static str {
        r#"{
            "id": "g-1",
            "player1": {"id": "p-1", "username": "alice", "is_bot": false, "connected": true},
            "player2": {"id": "p-2", "username": "bot-7", "is_bot": true, "connected": true},
            "board": [[0,0,0,0,0,0,0],[0,0,0,0,0,0,0],[0,0,0,0,0,0,0],
                      [0,0,0,0,0,0,0],[0,0,0,0,0,0,0],[1,2,0,0,0,0,0]],
            "current_turn": 1,
            "status": "in_progress",
            "created_at": "2025-01-05T10:00:00Z",
            "started_at": "2025-01-05T10:00:02Z",
            "last_move_at": "2025-01-05T10:00:10Z",
            "turn_started_at": "2025-01-05T10:00:10Z",
            "turn_timeout_sec": 30
        }"#
    }

    #[test]
    fn parses_server_snapshot() {
        let game: GameState = serde_json::from_str(sample_json()).unwrap();
        assert_eq!(game.status, GameStatus::InProgress);
        assert_eq!(game.board.len(), ROWS);
        assert_eq!(game.board[5].len(), COLS);
        assert_eq!(game.board[5][1], 2);
        assert_eq!(game.current_player().unwrap().username, "alice");
        assert_eq!(game.seat_of("p-2"), Some(2));
        assert!(game.is_turn_of("p-1"));
        assert!(!game.is_turn_of("p-2"));
        assert!(game.winner.is_none());
    }

    #[test]
    fn parses_result_strings() {
        for (text, expected) in [
            ("player1_win", GameResult::Player1Win),
            ("player2_win", GameResult::Player2Win),
            ("draw", GameResult::Draw),
            ("abandoned", GameResult::Abandoned),
        ] {
            let parsed: GameResult = serde_json::from_str(&format!("\"{}\"", text)).unwrap();
            assert_eq!(parsed, expected);
        }
    }

    #[test]
    fn draw_message_is_exact() {
        let mut game: GameState = serde_json::from_str(sample_json()).unwrap();
        game.status = GameStatus::Finished;
        game.result = Some(GameResult::Draw);
        assert_eq!(game.describe_result(Some("p-1")), "It's a draw!");
    }

    #[test]
    fn winner_messages_depend_on_perspective() {
        let mut game: GameState = serde_json::from_str(sample_json()).unwrap();
        game.status = GameStatus::Finished;
        game.result = Some(GameResult::Player1Win);
        game.winner = game.player1.clone();
        assert_eq!(game.describe_result(Some("p-1")), "You won!");
        assert_eq!(game.describe_result(Some("p-2")), "alice won!");
        assert_eq!(game.describe_result(None), "alice won!");
    }

    #[test]
    fn missing_winner_falls_back_to_generic_message() {
        let mut game: GameState = serde_json::from_str(sample_json()).unwrap();
        game.status = GameStatus::Abandoned;
        game.result = Some(GameResult::Abandoned);
        assert_eq!(game.describe_result(Some("p-1")), "Game ended");
        assert!(game.is_finished());
    }
}

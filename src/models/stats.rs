//! Leaderboard, history, and analytics records returned by the REST API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One leaderboard row / user stats record.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UserStats {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub is_bot: bool,
    pub games_won: i64,
    pub games_lost: i64,
    pub games_drawn: i64,
    pub created_at: DateTime<Utc>,
}

impl UserStats {
    pub fn total_games(&self) -> i64 {
        self.games_won + self.games_lost + self.games_drawn
    }

    /// Win rate in percent, 0.0 when no games were played.
    pub fn win_rate(&self) -> f64 {
        let total = self.total_games();
        if total == 0 {
            0.0
        } else {
            self.games_won as f64 * 100.0 / total as f64
        }
    }
}

/// A finished game as stored in history.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct GameRecord {
    pub id: String,
    pub player1: String,
    pub player2: String,
    #[serde(default)]
    pub winner: Option<String>,
    pub result: String,
    #[serde(default)]
    pub board_state: Vec<Vec<u8>>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub finished_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct HourlyAnalytics {
    pub hour: DateTime<Utc>,
    pub games_started: i64,
    pub games_completed: i64,
    pub total_moves: i64,
    pub avg_game_duration: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct DailyAnalytics {
    pub date: DateTime<Utc>,
    pub games_started: i64,
    pub games_completed: i64,
    pub total_moves: i64,
    pub avg_game_duration: f64,
    #[serde(default)]
    pub peak_hour: Option<i32>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Health {
    pub status: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}

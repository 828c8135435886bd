//! Plain-text rendering for the terminal front-end.
//!
//! Everything here is a pure string function over server-provided state; the
//! binary decides when to print.

use chrono::{DateTime, Utc};

use crate::game::timers;
use crate::models::{
    DailyAnalytics, GameRecord, GameState, HourlyAnalytics, Player, UserStats, COLS,
};

/// Marker for a board cell: `.` empty, `X` player one, `O` player two.
pub fn cell_char(cell: u8) -> char {
    match cell {
        0 => '.',
        1 => 'X',
        2 => 'O',
        _ => '?',
    }
}

/// The 6×7 grid with 1-based column headers, top row first.
pub fn render_board(game: &GameState) -> String {
    let mut out = String::new();
    for col in 1..=COLS {
        out.push(' ');
        out.push_str(&col.to_string());
    }
    out.push('\n');
    for row in &game.board {
        for cell in row {
            out.push(' ');
            out.push(cell_char(*cell));
        }
        out.push('\n');
    }
    out
}

fn player_label(player: Option<&Player>, marker: char) -> String {
    match player {
        Some(p) if p.is_bot => format!("{} ({}) [BOT]", p.username, marker),
        Some(p) => format!("{} ({})", p.username, marker),
        None => "Waiting...".to_string(),
    }
}

/// `alice (X) vs bot-7 (O) [BOT]`
pub fn render_players(game: &GameState) -> String {
    format!(
        "{} vs {}",
        player_label(game.player1.as_ref(), 'X'),
        player_label(game.player2.as_ref(), 'O')
    )
}

/// Whose turn it is, from the perspective of `my_player_id`.
pub fn render_turn(game: &GameState, my_player_id: Option<&str>) -> String {
    match game.current_player() {
        Some(p) if Some(p.id.as_str()) == my_player_id => "Your Turn".to_string(),
        Some(p) => format!("{}'s Turn", p.username),
        None => String::new(),
    }
}

/// Countdown line shown once per second while playing.
pub fn render_countdowns(game: &GameState, now: DateTime<Utc>) -> String {
    format!(
        "turn: {}s | activity: {}s",
        timers::turn_remaining(game, now),
        timers::inactivity_remaining(game, now)
    )
}

pub fn render_leaderboard(rows: &[UserStats]) -> String {
    if rows.is_empty() {
        return "No games played yet. Be the first!".to_string();
    }
    let mut out = format!(
        "{:<5} {:<20} {:>5} {:>7} {:>6} {:>9}\n",
        "Rank", "Player", "Wins", "Losses", "Draws", "Win Rate"
    );
    for (index, row) in rows.iter().enumerate() {
        out.push_str(&format!(
            "{:<5} {:<20} {:>5} {:>7} {:>6} {:>8.1}%\n",
            index + 1,
            row.username,
            row.games_won,
            row.games_lost,
            row.games_drawn,
            row.win_rate()
        ));
    }
    out
}

pub fn render_user(stats: &UserStats) -> String {
    format!(
        "{}: {} played, {} won, {} lost, {} drawn ({:.1}% win rate)",
        stats.username,
        stats.total_games(),
        stats.games_won,
        stats.games_lost,
        stats.games_drawn,
        stats.win_rate()
    )
}

pub fn render_games(rows: &[GameRecord]) -> String {
    if rows.is_empty() {
        return "No games recorded.".to_string();
    }
    let mut out = String::new();
    for row in rows {
        let outcome = match &row.winner {
            Some(winner) => format!("{} won", winner),
            None => row.result.clone(),
        };
        out.push_str(&format!(
            "{} vs {}: {}\n",
            row.player1, row.player2, outcome
        ));
    }
    out
}

pub fn render_hourly_analytics(rows: &[HourlyAnalytics]) -> String {
    if rows.is_empty() {
        return "No hourly activity recorded.".to_string();
    }
    let mut out = format!(
        "{:<17} {:>8} {:>10} {:>6} {:>13}\n",
        "Hour", "Started", "Completed", "Moves", "Avg Duration"
    );
    for row in rows {
        out.push_str(&format!(
            "{:<17} {:>8} {:>10} {:>6} {:>12.0}s\n",
            row.hour.format("%Y-%m-%d %H:00"),
            row.games_started,
            row.games_completed,
            row.total_moves,
            row.avg_game_duration
        ));
    }
    out
}

pub fn render_daily_analytics(rows: &[DailyAnalytics]) -> String {
    if rows.is_empty() {
        return "No daily activity recorded.".to_string();
    }
    let mut out = format!(
        "{:<11} {:>8} {:>10} {:>6} {:>13} {:>10}\n",
        "Date", "Started", "Completed", "Moves", "Avg Duration", "Peak Hour"
    );
    for row in rows {
        let peak = match row.peak_hour {
            Some(hour) => format!("{:02}:00", hour),
            None => "-".to_string(),
        };
        out.push_str(&format!(
            "{:<11} {:>8} {:>10} {:>6} {:>12.0}s {:>10}\n",
            row.date.format("%Y-%m-%d"),
            row.games_started,
            row.games_completed,
            row.total_moves,
            row.avg_game_duration,
            peak
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game() -> GameState {
        serde_json::from_str(
            r#"{
                "id": "g-1",
                "player1": {"id": "p-1", "username": "alice", "is_bot": false, "connected": true},
                "player2": {"id": "p-2", "username": "bot-7", "is_bot": true, "connected": true},
                "board": [[0,0,0,0,0,0,0],[0,0,0,0,0,0,0],[0,0,0,0,0,0,0],
                          [0,0,0,0,0,0,0],[0,0,0,0,0,0,0],[1,2,0,0,0,0,0]],
                "current_turn": 1,
                "status": "in_progress",
                "created_at": "2025-01-05T10:00:00Z",
                "last_move_at": "2025-01-05T10:00:00Z",
                "turn_started_at": "2025-01-05T10:00:00Z",
                "turn_timeout_sec": 30
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn board_renders_all_rows_with_header() {
        let text = render_board(&game());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 7);
        assert_eq!(lines[0], " 1 2 3 4 5 6 7");
        assert_eq!(lines[6], " X O . . . . .");
    }

    #[test]
    fn players_line_marks_bots() {
        assert_eq!(render_players(&game()), "alice (X) vs bot-7 (O) [BOT]");
    }

    #[test]
    fn turn_line_uses_perspective() {
        let game = game();
        assert_eq!(render_turn(&game, Some("p-1")), "Your Turn");
        assert_eq!(render_turn(&game, Some("p-2")), "alice's Turn");
    }

    #[test]
    fn hourly_analytics_rows_render_with_header() {
        let rows: Vec<HourlyAnalytics> = serde_json::from_str(
            r#"[{"hour":"2025-01-05T14:00:00Z","games_started":12,"games_completed":10,
                 "total_moves":240,"avg_game_duration":95.4}]"#,
        )
        .unwrap();
        let text = render_hourly_analytics(&rows);
        assert!(text.starts_with("Hour"));
        assert!(text.contains("2025-01-05 14:00"));
        assert!(text.contains("95s"));
    }

    #[test]
    fn daily_analytics_shows_peak_hour_or_dash() {
        let rows: Vec<DailyAnalytics> = serde_json::from_str(
            r#"[{"date":"2025-01-05T00:00:00Z","games_started":40,"games_completed":35,
                 "total_moves":900,"avg_game_duration":102.0,"peak_hour":20},
                {"date":"2025-01-06T00:00:00Z","games_started":0,"games_completed":0,
                 "total_moves":0,"avg_game_duration":0.0}]"#,
        )
        .unwrap();
        let text = render_daily_analytics(&rows);
        assert!(text.contains("2025-01-05"));
        assert!(text.contains("20:00"));
        let last_line = text.lines().last().unwrap();
        assert!(last_line.ends_with('-'));
    }

    #[test]
    fn empty_analytics_have_friendly_messages() {
        assert_eq!(render_hourly_analytics(&[]), "No hourly activity recorded.");
        assert_eq!(render_daily_analytics(&[]), "No daily activity recorded.");
    }

    #[test]
    fn empty_leaderboard_has_friendly_message() {
        assert_eq!(render_leaderboard(&[]), "No games played yet. Be the first!");
    }

    #[test]
    fn leaderboard_rows_are_ranked() {
        let rows: Vec<UserStats> = serde_json::from_str(
            r#"[{"id":1,"username":"alice","games_won":8,"games_lost":2,
                 "games_drawn":0,"created_at":"2025-01-01T00:00:00Z"}]"#,
        )
        .unwrap();
        let text = render_leaderboard(&rows);
        assert!(text.contains("alice"));
        assert!(text.contains("80.0%"));
    }
}

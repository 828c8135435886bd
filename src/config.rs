//! Environment-driven configuration, resolved once at startup.

use std::env;
use std::path::PathBuf;

pub const DEFAULT_WS_URL: &str = "ws://127.0.0.1:8080/ws";
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8080/api";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// WebSocket endpoint (`CONNECT4_WS_URL`).
    pub ws_url: String,
    /// REST base path (`CONNECT4_API_URL`).
    pub api_url: String,
    /// Session file location (`CONNECT4_SESSION_FILE`).
    pub session_file: PathBuf,
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self {
            ws_url: env::var("CONNECT4_WS_URL").unwrap_or_else(|_| DEFAULT_WS_URL.to_string()),
            api_url: env::var("CONNECT4_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            session_file: env::var_os("CONNECT4_SESSION_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(default_session_file),
        }
    }
}

fn default_session_file() -> PathBuf {
    match env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join(".connect-four").join("session.json"),
        None => env::temp_dir().join("connect-four-session.json"),
    }
}

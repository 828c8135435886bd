use std::io::{self, BufRead};
use std::thread;
use std::time::Duration;

use actix::prelude::*;
use chrono::Utc;
use log::{debug, info, warn};

use connect_four_client::api::{ApiClient, ApiError};
use connect_four_client::config::ClientConfig;
use connect_four_client::game::{timers, GameView, Phase};
use connect_four_client::models::{
    self, Envelope, ErrorNotice, GameState, PlayerInfo, WaitingNotice,
};
use connect_four_client::session::SessionStore;
use connect_four_client::ui;
use connect_four_client::websocket::{
    Connect, Opened, Outbound, RealtimeClient, ServerFrame, Shutdown, Subscribe,
};

const HELP: &str = "Commands:\n\
    \x20 join <name>        join matchmaking\n\
    \x20 move <1-7>         drop a disc into a column\n\
    \x20 reconnect <token>  resume a game with a session token\n\
    \x20 board              reprint the board\n\
    \x20 leaderboard        top players\n\
    \x20 stats <name>       one player's record\n\
    \x20 recent             recently finished games\n\
    \x20 games <name>       one player's recent games\n\
    \x20 analytics          hourly and daily activity\n\
    \x20 health             backend health check\n\
    \x20 quit               exit";

/// One line read from stdin.
#[derive(Message)]
#[rtype(result = "()")]
struct Command(String);

/// Coordinates the realtime client, the REST client, and the view.
struct GameActor {
    ws_url: String,
    api: ApiClient,
    view: GameView,
    client: Option<Addr<RealtimeClient>>,
    last_countdown: Option<String>,
}

impl GameActor {
    fn new(config: ClientConfig) -> Self {
        Self {
            ws_url: config.ws_url,
            api: ApiClient::new(config.api_url),
            view: GameView::new(SessionStore::new(config.session_file)),
            client: None,
            last_countdown: None,
        }
    }

    fn send_ws(&self, envelope: Envelope) {
        match &self.client {
            Some(client) => client.do_send(Outbound(envelope)),
            None => warn!("Realtime client not started yet"),
        }
    }

    fn print_game(&self) {
        if let Some(game) = self.view.game() {
            println!("\n{}", ui::render_players(game));
            print!("{}", ui::render_board(game));
            if self.view.phase() == Phase::Playing {
                println!("{}", ui::render_turn(game, self.view.my_player_id()));
            }
        }
    }

    fn tick(&mut self) {
        let now = Utc::now();
        self.view.tick(now);
        if self.view.phase() != Phase::Playing {
            self.last_countdown = None;
            return;
        }
        if let Some(game) = self.view.game() {
            let line = ui::render_countdowns(game, now);
            if self.last_countdown.as_deref() != Some(&line) {
                if timers::turn_remaining(game, now) <= 10 {
                    println!("{}", line);
                }
                self.last_countdown = Some(line);
            }
        }
    }
}

impl Actor for GameActor {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        let me = ctx.address();
        let client = RealtimeClient::new(self.ws_url.clone())
            .with_lifecycle(me.clone().recipient())
            .start();
        for msg_type in [
            models::PLAYER_INFO,
            models::WAITING,
            models::GAME_UPDATE,
            models::ERROR,
            models::RECONNECTED,
        ] {
            client.do_send(Subscribe {
                msg_type: msg_type.to_string(),
                recipient: me.clone().recipient(),
            });
        }
        client.do_send(Connect);
        self.client = Some(client);
        ctx.run_interval(Duration::from_secs(1), |act, _ctx| act.tick());
    }
}

impl Handler<Opened> for GameActor {
    type Result = ();

    fn handle(&mut self, _msg: Opened, _ctx: &mut Self::Context) {
        // After a transport drop mid-game, pick the live session back up;
        // on a cold start, resume only a saved session that is still fresh.
        let live_token = self.view.me().map(|me| me.session_token.clone());
        if let Some(token) = live_token {
            let envelope = self.view.manual_reconnect(&token);
            self.send_ws(envelope);
            println!("Connection restored, resuming game...");
        } else if let Some(envelope) = self.view.resume(Utc::now()) {
            self.send_ws(envelope);
            println!("Found a recent session, reconnecting...");
        }
    }
}

impl Handler<ServerFrame> for GameActor {
    type Result = ();

    fn handle(&mut self, msg: ServerFrame, _ctx: &mut Self::Context) {
        let now = Utc::now();
        match msg.msg_type.as_str() {
            models::PLAYER_INFO => match serde_json::from_value::<PlayerInfo>(msg.payload) {
                Ok(info) => {
                    info!("Joined as {} (game {})", info.username, info.game_id);
                    println!("Session token (for reconnecting): {}", info.session_token);
                    self.view.on_player_info(info, now);
                }
                Err(e) => warn!("Bad player_info payload: {}", e),
            },
            models::WAITING => {
                let payload: WaitingNotice = serde_json::from_value(msg.payload).unwrap_or_default();
                self.view.on_waiting(payload);
                if let Some(notice) = self.view.notice() {
                    println!("{}", notice);
                }
            }
            models::GAME_UPDATE => match serde_json::from_value::<GameState>(msg.payload) {
                Ok(game) => {
                    let was_finished = self.view.phase() == Phase::Finished;
                    self.view.on_game_update(game, now);
                    self.print_game();
                    if self.view.phase() == Phase::Finished && !was_finished {
                        if let Some(notice) = self.view.notice() {
                            println!("{}", notice);
                        }
                        println!("Type 'join <name>' to play again.");
                    }
                }
                Err(e) => warn!("Bad game_update payload: {}", e),
            },
            models::ERROR => {
                let payload: ErrorNotice = serde_json::from_value(msg.payload).unwrap_or_default();
                self.view.on_error(payload, now);
                if let Some(error) = self.view.error() {
                    println!("Error: {}", error);
                }
            }
            models::RECONNECTED => match serde_json::from_value::<PlayerInfo>(msg.payload) {
                Ok(info) => {
                    self.view.on_reconnected(info, now);
                    println!("Reconnected to game!");
                }
                Err(e) => warn!("Bad reconnected payload: {}", e),
            },
            other => debug!("Unhandled message type: {}", other),
        }
    }
}

impl Handler<Command> for GameActor {
    type Result = ();

    fn handle(&mut self, msg: Command, ctx: &mut Self::Context) {
        let line = msg.0.trim().to_string();
        if line.is_empty() {
            return;
        }
        let (command, rest) = match line.split_once(' ') {
            Some((head, tail)) => (head, tail.trim()),
            None => (line.as_str(), ""),
        };
        match command {
            "join" if !rest.is_empty() => {
                if self.view.phase() == Phase::Finished {
                    self.view.play_again();
                }
                let envelope = self.view.join(rest);
                self.send_ws(envelope);
            }
            "move" => match rest.parse::<usize>() {
                Ok(column @ 1..=7) => {
                    if let Some(envelope) = self.view.make_move(column - 1) {
                        self.send_ws(envelope);
                    } else {
                        println!("Cannot move right now.");
                    }
                }
                _ => println!("Usage: move <1-7>"),
            },
            "reconnect" if !rest.is_empty() => {
                let envelope = self.view.manual_reconnect(rest);
                self.send_ws(envelope);
            }
            "board" => {
                if self.view.game().is_some() {
                    self.print_game();
                } else {
                    println!("No game yet. {}", HELP);
                }
            }
            "leaderboard" => {
                let api = self.api.clone();
                async move { api.leaderboard(10).await }
                    .into_actor(self)
                    .map(|res, _act, _ctx| match res {
                        Ok(rows) => print!("{}", ui::render_leaderboard(&rows)),
                        Err(e) => println!("Failed to load leaderboard: {} (try again)", e),
                    })
                    .spawn(ctx);
            }
            "stats" if !rest.is_empty() => {
                let api = self.api.clone();
                let username = rest.to_string();
                async move { api.user_stats(&username).await }
                    .into_actor(self)
                    .map(|res, _act, _ctx| match res {
                        Ok(stats) => println!("{}", ui::render_user(&stats)),
                        Err(e) => println!("Failed to load stats: {} (try again)", e),
                    })
                    .spawn(ctx);
            }
            "recent" => {
                let api = self.api.clone();
                async move { api.recent_games(20).await }
                    .into_actor(self)
                    .map(|res, _act, _ctx| match res {
                        Ok(rows) => print!("{}", ui::render_games(&rows)),
                        Err(e) => println!("Failed to load games: {} (try again)", e),
                    })
                    .spawn(ctx);
            }
            "games" if !rest.is_empty() => {
                let api = self.api.clone();
                let username = rest.to_string();
                async move { api.user_games(&username, 20).await }
                    .into_actor(self)
                    .map(|res, _act, _ctx| match res {
                        Ok(rows) => print!("{}", ui::render_games(&rows)),
                        Err(e) => println!("Failed to load games: {} (try again)", e),
                    })
                    .spawn(ctx);
            }
            "analytics" => {
                let api = self.api.clone();
                async move {
                    let hourly = api.hourly_analytics(24).await?;
                    let daily = api.daily_analytics(30).await?;
                    Ok::<_, ApiError>((hourly, daily))
                }
                .into_actor(self)
                .map(|res, _act, _ctx| match res {
                    Ok((hourly, daily)) => {
                        print!("{}", ui::render_hourly_analytics(&hourly));
                        println!();
                        print!("{}", ui::render_daily_analytics(&daily));
                    }
                    Err(e) => println!("Failed to load analytics: {} (try again)", e),
                })
                .spawn(ctx);
            }
            "health" => {
                let api = self.api.clone();
                async move { api.health().await }
                    .into_actor(self)
                    .map(|res, _act, _ctx| match res {
                        Ok(health) => println!("Backend is {}", health.status),
                        Err(e) => println!("Health check failed: {}", e),
                    })
                    .spawn(ctx);
            }
            "help" => println!("{}", HELP),
            "quit" | "exit" => {
                if let Some(client) = &self.client {
                    client.do_send(Shutdown);
                }
                System::current().stop();
            }
            _ => println!("Unknown command. {}", HELP),
        }
    }
}

fn stdin_loop(addr: Addr<GameActor>) {
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        match line {
            Ok(line) => addr.do_send(Command(line)),
            Err(_) => break,
        }
    }
    addr.do_send(Command("quit".to_string()));
}

fn main() -> io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = ClientConfig::from_env();
    info!(
        "Starting Connect Four client (ws: {}, api: {})",
        config.ws_url, config.api_url
    );
    println!("4 in a Row: connect four discs to win!");
    println!("{}", HELP);

    let system = System::new();
    let addr = system.block_on(async { GameActor::new(config).start() });

    let stdin_addr = addr.clone();
    thread::spawn(move || stdin_loop(stdin_addr));

    system.run()
}

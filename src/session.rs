use crate::config::Lifetimes;
use crate::error::GameError;
use crate::game::update::{Dispatch, GameUpdate};
use crate::game::{Audience, Game, GameOptions, Player, PlayerId, PublicPlayer, PublicState, Status, MAX_PLAYERS, MIN_PLAYERS};
use crate::time::iso8601;
use dashmap::{mapref::entry::Entry, DashMap};
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Instant, SystemTime};
use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 64;
const MAX_NAME_LEN: usize = 32;

/// Manages all the game sessions running on the server.
pub struct SessionManager {
    sessions: DashMap<String, SessionHandle>,
    rng: Mutex<ChaCha8Rng>,
    lifetimes: Lifetimes,
}

/// A single game session.
#[derive(Debug)]
pub struct Session {
    /// The game ID.
    id: String,
    /// The game itself.
    game: SessionGame,
    options: GameOptions,
    /// Source of player ids and game seeds.
    rng: ChaCha8Rng,
    /// Channel for updates everyone may see.
    public: broadcast::Sender<Outbound>,
    /// Channels for updates only one player may see.
    private: HashMap<PlayerId, broadcast::Sender<Outbound>>,
    /// Reconnection credentials of the seated players.
    tokens: HashMap<SessionToken, PlayerId>,
    /// Timestamp that the session was created.
    created_ts: SystemTime,
    /// Timestamp of the last time this session was interacted with.
    last_ts: Instant,
    /// Timestamp that the game finished or was aborted.
    ended_ts: Option<Instant>,
}

pub type SessionHandle = Arc<Mutex<Session>>;

#[allow(clippy::large_enum_variant)]
#[derive(Debug)]
enum SessionGame {
    Lobby {
        players: Vec<Player>,
    },
    Playing {
        game: Game,
    },
    /// The game hit an internal fault and was stopped.
    Aborted {
        state: PublicState,
    },
}

/// A message sent from a session to its connected clients.
#[derive(Clone, Serialize, Debug)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Outbound {
    State { state: PublicState },
    Update { update: GameUpdate },
    PlayerLeft { player: PlayerId },
    Aborted { reason: String },
}

/// Secret credential that lets a new connection act as an existing player.
///
/// Only ever sent to the player it belongs to; unlike a [PlayerId] it never appears in an update.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct SessionToken(u128);

impl SessionToken {
    fn random(rng: &mut impl Rng) -> Self {
        Self(rng.gen())
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.0)
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(..)")
    }
}

impl FromStr for SessionToken {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 32 {
            return Err(GameError::InvalidToken);
        }
        u128::from_str_radix(s, 16)
            .map(SessionToken)
            .map_err(|_| GameError::InvalidToken)
    }
}

impl From<SessionToken> for String {
    fn from(token: SessionToken) -> Self {
        token.to_string()
    }
}

impl TryFrom<String> for SessionToken {
    type Error = GameError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// A player's place in a session, as handed to the connection that holds it.
#[derive(Debug)]
pub struct Seat {
    pub player: PlayerId,
    pub token: SessionToken,
    /// Subscribed before the session lock was released, so nothing sent to the player is missed.
    pub updates: Subscription,
}

/// The channels a client listens to.
#[derive(Debug)]
pub struct Subscription {
    pub public: broadcast::Receiver<Outbound>,
    pub private: broadcast::Receiver<Outbound>,
}

/// A short description of a session, for monitoring.
#[derive(Clone, Serialize, Debug)]
pub struct SessionSummary {
    pub id: String,
    pub status: Status,
    pub players: usize,
    pub created: String,
}

impl SessionManager {
    pub fn new(seed: u64, lifetimes: Lifetimes) -> Self {
        Self {
            sessions: DashMap::new(),
            rng: Mutex::new(ChaCha8Rng::seed_from_u64(seed)),
            lifetimes,
        }
    }

    /// Creates a new game hosted by the named player, returning the session and the host's seat.
    pub fn create_game(&self, host_name: &str, options: GameOptions) -> Result<(SessionHandle, Seat), GameError> {
        let host_name = validate_name(host_name)?;
        let seed = self.lock_rng()?.next_u64();
        loop {
            let id = self.random_id()?;
            let entry = self.sessions.entry(id);
            if let Entry::Occupied(_) = entry {
                continue;
            }
            let mut session = Session::new(entry.key().clone(), options, seed);
            let host = session.add_player(host_name)?;
            log::info!("Created game {}", session.id);
            let session = Arc::new(Mutex::new(session));
            entry.or_insert(session.clone());
            break Ok((session, host));
        }
    }

    pub fn find_game(&self, game_id: &str) -> Result<SessionHandle, GameError> {
        self.sessions
            .get(&game_id.to_ascii_uppercase())
            .map(|session| session.clone())
            .ok_or(GameError::GameNotFound)
    }

    pub fn num_games(&self) -> usize {
        self.sessions.len()
    }

    pub fn list_games(&self) -> Vec<SessionSummary> {
        self.sessions
            .iter()
            .filter_map(|session| session.lock().ok().map(|s| s.summary()))
            .collect()
    }

    /// Evicts sessions that have ended or been abandoned, returning how many were removed.
    pub fn purge_games(&self, now: Instant) -> usize {
        let mut ids_to_delete = vec![];

        // Find expired sessions
        for session in self.sessions.iter() {
            let game_id = session.key();
            let Ok(session) = session.lock() else {
                log::error!("Found poisoned session: {}", game_id);
                ids_to_delete.push(game_id.clone());
                continue;
            };
            if session.is_expired(now, &self.lifetimes) {
                ids_to_delete.push(game_id.clone());
            }
        }

        // Delete the expired games
        let count = ids_to_delete.len();
        for game_id in ids_to_delete.into_iter() {
            log::info!("Evicting game {}", game_id);
            self.sessions.remove(&game_id);
        }
        count
    }

    fn random_id(&self) -> Result<String, GameError> {
        let mut rng = self.lock_rng()?;
        Ok((0..4).map(|_| rng.gen_range('A'..='Z')).collect())
    }

    fn lock_rng(&self) -> Result<MutexGuard<'_, ChaCha8Rng>, GameError> {
        self.rng.lock().map_err(|_| {
            log::error!("Registry random source is poisoned");
            GameError::RegistryUnavailable
        })
    }
}

/// Locks a session, treating a poisoned session as gone.
pub fn lock(session: &SessionHandle) -> Result<MutexGuard<'_, Session>, GameError> {
    session.lock().map_err(|_| GameError::GameNotFound)
}

fn validate_name(name: &str) -> Result<&str, GameError> {
    let name = name.trim();
    if name.is_empty() || name.chars().count() > MAX_NAME_LEN {
        return Err(GameError::InvalidPlayerName);
    }
    Ok(name)
}

impl Session {
    fn new(id: String, options: GameOptions, seed: u64) -> Self {
        Self {
            id,
            game: SessionGame::Lobby { players: vec![] },
            options,
            rng: ChaCha8Rng::seed_from_u64(seed),
            public: broadcast::channel(CHANNEL_CAPACITY).0,
            private: HashMap::new(),
            tokens: HashMap::new(),
            created_ts: SystemTime::now(),
            last_ts: Instant::now(),
            ended_ts: None,
        }
    }

    /// Gets the unique game ID.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn status(&self) -> Status {
        match &self.game {
            SessionGame::Lobby { .. } => Status::Lobby,
            SessionGame::Playing { game } if game.game_over() => Status::Finished,
            SessionGame::Playing { .. } => Status::Playing,
            SessionGame::Aborted { .. } => Status::Aborted,
        }
    }

    fn summary(&self) -> SessionSummary {
        SessionSummary {
            id: self.id.clone(),
            status: self.status(),
            players: self.num_players(),
            created: iso8601(self.created_ts),
        }
    }

    fn num_players(&self) -> usize {
        match &self.game {
            SessionGame::Lobby { players } => players.len(),
            SessionGame::Playing { game } => game.num_players(),
            SessionGame::Aborted { state } => state.players.len(),
        }
    }

    /// Adds a player to the lobby, returning their new seat.
    pub fn join(&mut self, name: &str) -> Result<Seat, GameError> {
        let seat = self.add_player(validate_name(name)?)?;
        log::info!("Player {} joined game {}", seat.player, self.id);
        self.notify();
        Ok(seat)
    }

    /// Hands the seat of the player holding `token` to a new connection.
    pub fn rejoin(&mut self, token: SessionToken) -> Result<Seat, GameError> {
        let player = *self.tokens.get(&token).ok_or(GameError::InvalidToken)?;
        let updates = self.subscribe(player)?;
        log::info!("Player {} reconnected to game {}", player, self.id);
        Ok(Seat { player, token, updates })
    }

    fn add_player(&mut self, name: &str) -> Result<Seat, GameError> {
        let SessionGame::Lobby { players } = &mut self.game else {
            return Err(GameError::CannotJoinStartedGame);
        };
        if players.len() >= MAX_PLAYERS {
            return Err(GameError::TooManyPlayers);
        }
        if players.iter().any(|p| p.name.eq_ignore_ascii_case(name)) {
            return Err(GameError::NameTaken);
        }
        let player = PlayerId::random(&mut self.rng);
        let token = SessionToken::random(&mut self.rng);
        players.push(Player::new(player, name.to_string(), players.is_empty()));
        self.private.insert(player, broadcast::channel(CHANNEL_CAPACITY).0);
        self.tokens.insert(token, player);
        let updates = self.subscribe(player)?;
        Ok(Seat { player, token, updates })
    }

    /// Called when a player leaves or disconnects.
    /// Players only give up their seat before the game has started.
    pub fn leave(&mut self, player: PlayerId) {
        let SessionGame::Lobby { players } = &mut self.game else {
            return;
        };
        let Some(idx) = players.iter().position(|p| p.id == player) else {
            return;
        };
        let removed = players.remove(idx);
        if removed.is_host {
            if let Some(next) = players.first_mut() {
                next.is_host = true;
            }
        }
        self.private.remove(&player);
        self.tokens.retain(|_, seated| *seated != player);
        log::info!("Player {} left game {}", player, self.id);
        self.public.send(Outbound::PlayerLeft { player }).ok();
        self.notify();
    }

    /// Subscribes to the session's updates along with one player's private updates.
    fn subscribe(&mut self, player: PlayerId) -> Result<Subscription, GameError> {
        let private = self.private.get(&player).ok_or(GameError::PlayerNotFound)?.subscribe();
        self.last_ts = Instant::now();
        Ok(Subscription {
            public: self.public.subscribe(),
            private,
        })
    }

    /// Starts the game.
    pub fn start(&mut self, player: PlayerId) -> Result<(), GameError> {
        let SessionGame::Lobby { players } = &self.game else {
            return Err(GameError::InvalidAction);
        };
        let host = players.iter().find(|p| p.id == player).ok_or(GameError::PlayerNotFound)?;
        if !host.is_host {
            return Err(GameError::NotHost);
        }
        if players.len() < MIN_PLAYERS {
            return Err(GameError::TooFewPlayers);
        }

        let seed = self.rng.next_u64();
        let game = match Game::new(self.options, players.clone(), seed) {
            Ok(game) => game,
            Err(err) if err.is_fatal() => {
                self.abort(err.clone());
                return Err(err);
            }
            Err(err) => return Err(err),
        };
        log::info!("Started game {} with {} players", self.id, game.num_players());

        let roles = game.role_dispatches();
        self.game = SessionGame::Playing { game };
        self.publish(roles);
        self.notify();
        Ok(())
    }

    /// Performs a player's action on the game.
    pub fn mutate_game<F>(&mut self, player: PlayerId, mutation: F) -> Result<(), GameError>
    where
        F: FnOnce(&mut Game, usize, &mut Vec<Dispatch>) -> Result<(), GameError>,
    {
        let game = match &mut self.game {
            SessionGame::Lobby { .. } => return Err(GameError::InvalidAction),
            SessionGame::Playing { game } => game,
            SessionGame::Aborted { .. } => return Err(GameError::GameOver),
        };
        let seat = game.find_player(player)?;

        let mut log = vec![];
        if let Err(err) = mutation(game, seat, &mut log) {
            if err.is_fatal() {
                self.abort(err.clone());
            }
            return Err(err);
        }

        if game.game_over() && self.ended_ts.is_none() {
            self.ended_ts = Some(Instant::now());
        }
        self.publish(log);
        self.notify();
        Ok(())
    }

    /// Gets the latest state visible to everyone.
    pub fn public_state(&self) -> PublicState {
        match &self.game {
            SessionGame::Lobby { players } => {
                let players = players
                    .iter()
                    .map(|p| PublicPlayer {
                        id: p.id,
                        name: p.name.clone(),
                        is_host: p.is_host,
                        is_alive: true,
                        is_president: false,
                        is_chancellor: false,
                    })
                    .collect();
                PublicState::lobby(&self.id, players)
            }
            SessionGame::Playing { game } => game.public_state(&self.id),
            SessionGame::Aborted { state } => state.clone(),
        }
    }

    /// Keeps the game session alive.
    pub fn heartbeat(&mut self) {
        self.last_ts = Instant::now();
    }

    fn is_expired(&self, now: Instant, lifetimes: &Lifetimes) -> bool {
        if let Some(ended) = self.ended_ts {
            if now.saturating_duration_since(ended) > lifetimes.finished {
                return true;
            }
        }
        if let SessionGame::Lobby { players } = &self.game {
            if players.is_empty() {
                return true;
            }
        }
        now.saturating_duration_since(self.last_ts) > lifetimes.idle
    }

    /// Stops a game that can no longer continue safely.
    fn abort(&mut self, reason: GameError) {
        log::error!("Aborting game {}: {}", self.id, reason);
        let mut state = self.public_state();
        state.status = Status::Aborted;
        self.public.send(Outbound::Aborted { reason: reason.to_string() }).ok();
        self.game = SessionGame::Aborted { state };
        self.ended_ts = Some(Instant::now());
        self.notify();
    }

    /// Routes each dispatch to its audience.
    fn publish(&self, log: Vec<Dispatch>) {
        let SessionGame::Playing { game } = &self.game else {
            return;
        };
        for Dispatch { audience, update } in log {
            let message = Outbound::Update { update };
            match audience {
                Audience::Everyone => {
                    self.public.send(message).ok();
                }
                Audience::Player(seat) => {
                    let Some(channel) = game.players().get(seat).and_then(|p| self.private.get(&p.id)) else {
                        continue;
                    };
                    channel.send(message).ok();
                }
            }
        }
    }

    /// Notifies all connected clients of the new game state.
    fn notify(&mut self) {
        self.public.send(Outbound::State { state: self.public_state() }).ok();
        self.last_ts = Instant::now();
    }
}

use crate::{
    error::GameError,
    game::{ExecutivePower, GameOptions, PlayerId, PublicState, Vote},
    session::{lock, Outbound, Seat, SessionHandle, SessionManager, SessionToken, Subscription},
};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::error::RecvError;

/// A single connected client, bound to at most one player in one game.
///
/// This is the only place a transport connection is associated with a player identity.
pub struct Client<'a> {
    manager: &'a SessionManager,
    session: Option<SessionHandle>,
    player: Option<PlayerId>,
    game_id: Option<String>,
    updates: Option<Subscription>,
}

/// What a connection learns when it takes a seat. The token is only ever sent to its owner.
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Joined {
    pub game_id: String,
    pub player_id: PlayerId,
    pub token: SessionToken,
    pub state: PublicState,
}

/// An action performed by a player during the game.
#[derive(Deserialize, Debug)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PlayerAction {
    Nominate { chancellor: PlayerId },
    Vote { vote: Vote },
    PresidentDiscard { index: usize },
    ChancellorDiscard { index: usize },
    UsePower { power: ExecutivePower, target: PlayerId },
}

impl<'a> Client<'a> {
    /// Creates a new game client.
    pub fn new(manager: &'a SessionManager) -> Self {
        Self {
            manager,
            session: None,
            game_id: None,
            player: None,
            updates: None,
        }
    }

    /// Creates a new game session and joins it as the host.
    pub fn create_game(&mut self, name: &str, options: GameOptions) -> Result<Joined, GameError> {
        let (session, seat) = self.manager.create_game(name, options)?;
        self.bind(session, seat)
    }

    /// Joins a game in its lobby as a new player.
    pub fn join_game(&mut self, game_id: &str, name: &str) -> Result<Joined, GameError> {
        let session = self.manager.find_game(game_id)?;
        let seat = lock(&session)?.join(name)?;
        self.bind(session, seat)
    }

    /// Binds this connection to the player holding `token`, who joined on an earlier connection.
    pub fn rejoin_game(&mut self, game_id: &str, token: SessionToken) -> Result<Joined, GameError> {
        let session = self.manager.find_game(game_id)?;
        let seat = lock(&session)?.rejoin(token)?;
        self.bind(session, seat)
    }

    fn bind(&mut self, session: SessionHandle, seat: Seat) -> Result<Joined, GameError> {
        // Reclaiming our own seat must not give it up
        if self.player == Some(seat.player) {
            self.detach();
        } else {
            self.leave();
        }
        let (game_id, state) = {
            let session = lock(&session)?;
            (session.id().to_string(), session.public_state())
        };
        self.player = Some(seat.player);
        self.game_id = Some(game_id.clone());
        self.updates = Some(seat.updates);
        self.session = Some(session);
        Ok(Joined {
            game_id,
            player_id: seat.player,
            token: seat.token,
            state,
        })
    }

    /// Waits for the next message for this client.
    /// Returns `None` once the session has gone away.
    pub async fn next_message(&mut self) -> Option<Outbound> {
        let Some(updates) = &mut self.updates else {
            return std::future::pending().await;
        };

        loop {
            let received = tokio::select! {
                msg = updates.public.recv() => msg,
                msg = updates.private.recv() => msg,
            };
            match received {
                Ok(message) => return Some(message),
                Err(RecvError::Lagged(skipped)) => {
                    log::warn!("Client fell behind by {} messages", skipped);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Leaves the game. Before the game starts this also gives up the player's seat.
    pub fn leave(&mut self) {
        if let (Some(session), Some(player)) = (&self.session, self.player) {
            if let Ok(mut session) = lock(session) {
                session.leave(player);
            }
        }
        self.detach();
    }

    /// Stops listening to the current game without leaving it.
    pub fn detach(&mut self) {
        self.player = None;
        self.game_id = None;
        self.updates = None;
        self.session = None;
    }

    /// Starts the game.
    pub fn start_game(&self) -> Result<(), GameError> {
        let (Some(session), Some(player)) = (&self.session, self.player) else {
            return Err(GameError::InvalidAction);
        };
        lock(session)?.start(player)
    }

    /// Called when a player performs an action.
    pub fn player_action(&self, action: PlayerAction) -> Result<(), GameError> {
        let (Some(session), Some(player)) = (&self.session, self.player) else {
            return Err(GameError::InvalidAction);
        };
        log::debug!("Player {} requested {:?}", player, action);
        lock(session)?.mutate_game(player, |game, seat, log| match action {
            PlayerAction::Nominate { chancellor } => {
                let chancellor = game.find_player(chancellor)?;
                game.nominate(seat, chancellor, log)
            }
            PlayerAction::Vote { vote } => game.cast_vote(seat, vote, log),
            PlayerAction::PresidentDiscard { index } => game.president_discard(seat, index, log),
            PlayerAction::ChancellorDiscard { index } => game.chancellor_discard(seat, index, log),
            PlayerAction::UsePower { power, target } => {
                let target = game.find_player(target)?;
                game.use_power(seat, power, target, log)
            }
        })
    }

    /// Keeps the game session alive.
    pub fn heartbeat(&self) {
        let Some(session) = &self.session else {
            return;
        };
        if let Ok(mut session) = lock(session) {
            session.heartbeat();
        }
    }

    pub fn game_id(&self) -> Option<&str> {
        self.game_id.as_deref()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::Lifetimes;

    fn lobby(manager: &SessionManager) -> (Client<'_>, Client<'_>, Joined, Joined) {
        let mut host = Client::new(manager);
        let mut guest = Client::new(manager);
        let hosted = host.create_game("Host", GameOptions::default()).unwrap();
        let joined = guest.join_game(&hosted.game_id, "Guest").unwrap();
        (host, guest, hosted, joined)
    }

    #[test]
    fn public_ids_cannot_take_over_a_seat() {
        let manager = SessionManager::new(5, Lifetimes::default());
        let (_host, _guest, hosted, joined) = lobby(&manager);

        // Everything a spectator can see about the host
        let state = serde_json::to_string(&joined.state).unwrap();
        assert!(state.contains(&hosted.player_id.to_string()));
        assert!(!state.contains(&hosted.token.to_string()));

        let forged: SessionToken = format!("{:0>32}", hosted.player_id.to_string()).parse().unwrap();
        let mut intruder = Client::new(&manager);
        assert_eq!(
            intruder.rejoin_game(&hosted.game_id, forged).unwrap_err(),
            GameError::InvalidToken
        );
        assert_eq!(intruder.start_game(), Err(GameError::InvalidAction));
        assert_eq!(
            intruder.player_action(PlayerAction::Vote { vote: Vote::Ja }),
            Err(GameError::InvalidAction)
        );
        assert_eq!(intruder.game_id(), None);
    }

    #[test]
    fn tokens_reclaim_the_same_seat() {
        let manager = SessionManager::new(5, Lifetimes::default());
        let (_host, mut guest, hosted, joined) = lobby(&manager);

        // A dropped connection keeps the seat
        guest.detach();
        let mut reconnected = Client::new(&manager);
        let again = reconnected
            .rejoin_game(&hosted.game_id.to_ascii_lowercase(), joined.token)
            .unwrap();
        assert_eq!(again.player_id, joined.player_id);
        assert_eq!(again.token, joined.token);
        assert_eq!(again.state.players.len(), 2);

        // Rejoining the seat this connection already holds does not give it up
        reconnected.rejoin_game(&hosted.game_id, joined.token).unwrap();
        let session = manager.find_game(&hosted.game_id).unwrap();
        assert_eq!(lock(&session).unwrap().public_state().players.len(), 2);
    }

    #[test]
    fn tokens_only_open_their_own_game() {
        let manager = SessionManager::new(5, Lifetimes::default());
        let (_host, _guest, hosted, _) = lobby(&manager);
        let (_other_host, _other_guest, other, _) = lobby(&manager);

        let mut client = Client::new(&manager);
        assert_eq!(
            client.rejoin_game(&other.game_id, hosted.token).unwrap_err(),
            GameError::InvalidToken
        );
    }

    #[tokio::test]
    async fn joined_players_see_their_role_when_the_game_starts() {
        let manager = SessionManager::new(5, Lifetimes::default());
        let mut host = Client::new(&manager);
        let hosted = host.create_game("Host", GameOptions::default()).unwrap();
        let mut guests = (1..5)
            .map(|i| {
                let mut guest = Client::new(&manager);
                guest.join_game(&hosted.game_id, &format!("Player{}", i)).unwrap();
                guest
            })
            .collect::<Vec<_>>();
        host.start_game().unwrap();

        for guest in guests.iter_mut() {
            let mut role_assigned = false;
            let private = &mut guest.updates.as_mut().unwrap().private;
            while let Ok(message) = private.try_recv() {
                if let Outbound::Update {
                    update: crate::game::update::GameUpdate::RoleAssigned { .. },
                } = message
                {
                    role_assigned = true;
                }
            }
            assert!(role_assigned);
        }
    }
}

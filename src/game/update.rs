use super::{
    executive_power::ExecutivePower,
    party::Party,
    player::{PlayerId, Role},
    victory::WinCondition,
    votes::Tally,
    Game, GameState,
};
use serde::Serialize;

/// Who may see an update.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Audience {
    Everyone,
    /// Only the player in the given seat.
    Player(usize),
}

/// An update produced by a command, addressed to its audience.
#[derive(Clone, PartialEq, Debug)]
pub struct Dispatch {
    pub audience: Audience,
    pub update: GameUpdate,
}

impl Dispatch {
    pub fn public(update: GameUpdate) -> Self {
        Self {
            audience: Audience::Everyone,
            update,
        }
    }

    pub fn private(player: usize, update: GameUpdate) -> Self {
        Self {
            audience: Audience::Player(player),
            update,
        }
    }
}

#[derive(Clone, Serialize, PartialEq, Debug)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum GameUpdate {
    RoleAssigned {
        role: Role,
        /// The other fascists this player knows about.
        fascists: Vec<PlayerId>,
        hitler: Option<PlayerId>,
    },
    ChancellorNominated {
        president: PlayerId,
        chancellor: PlayerId,
    },
    VoteProgress {
        cast: usize,
        eligible: usize,
    },
    VoteTally {
        ja: usize,
        nein: usize,
        passed: bool,
    },
    GovernmentFormed {
        president: PlayerId,
        chancellor: PlayerId,
    },
    GovernmentFailed {
        #[serde(rename = "failedElections")]
        failed_elections: usize,
    },
    PresidentHand {
        cards: [Party; 3],
    },
    ChancellorHand {
        cards: [Party; 2],
    },
    PolicyEnacted {
        policy: Party,
        chaos: bool,
    },
    PowerUnlocked {
        power: ExecutivePower,
    },
    InvestigationResult {
        target: PlayerId,
        party: Party,
    },
    PlayerInvestigated {
        target: PlayerId,
    },
    SpecialElectionCalled {
        target: PlayerId,
    },
    PlayerExecuted {
        target: PlayerId,
    },
    GameOver {
        winner: Party,
        reason: &'static str,
    },
}

impl From<Tally> for GameUpdate {
    fn from(tally: Tally) -> Self {
        GameUpdate::VoteTally {
            ja: tally.ja,
            nein: tally.nein,
            passed: tally.passed,
        }
    }
}

/// The overall lifecycle of a game session.
#[derive(Clone, Copy, Serialize, PartialEq, Eq, Debug)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Lobby,
    Playing,
    Finished,
    Aborted,
}

/// The phase of the game loop.
#[derive(Clone, Copy, Serialize, PartialEq, Eq, Debug)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    Lobby,
    Nomination,
    Voting,
    PresidentDiscard,
    ChancellorDiscard,
    Finished,
}

#[derive(Clone, Serialize, PartialEq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PublicPlayer {
    pub id: PlayerId,
    pub name: String,
    pub is_host: bool,
    pub is_alive: bool,
    pub is_president: bool,
    pub is_chancellor: bool,
}

#[derive(Clone, Copy, Serialize, PartialEq, Eq, Debug, Default)]
pub struct EnactedPolicies {
    pub liberal: usize,
    pub fascist: usize,
}

#[derive(Clone, Serialize, PartialEq, Debug)]
pub struct Outcome {
    pub winner: Party,
    pub reason: &'static str,
}

#[derive(Clone, Serialize, PartialEq, Debug)]
pub struct RevealedRole {
    pub player: PlayerId,
    pub role: Role,
}

/// Everything every participant is allowed to see.
#[derive(Clone, Serialize, PartialEq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PublicState {
    pub game_id: String,
    pub status: Status,
    pub phase: Phase,
    pub players: Vec<PublicPlayer>,
    pub president: Option<PlayerId>,
    pub chancellor: Option<PlayerId>,
    pub nominated_chancellor: Option<PlayerId>,
    pub last_elected_president: Option<PlayerId>,
    pub last_elected_chancellor: Option<PlayerId>,
    pub eligible_chancellors: Vec<PlayerId>,
    pub enacted_policies: EnactedPolicies,
    pub failed_elections: usize,
    pub executive_powers: Vec<ExecutivePower>,
    pub deck_size: usize,
    pub discard_size: usize,
    pub outcome: Option<Outcome>,
    /// Only present once the game is over.
    pub revealed_roles: Option<Vec<RevealedRole>>,
}

impl PublicState {
    /// The state of a game that has not started yet.
    pub fn lobby(game_id: &str, players: Vec<PublicPlayer>) -> Self {
        Self {
            game_id: game_id.to_string(),
            status: Status::Lobby,
            phase: Phase::Lobby,
            players,
            president: None,
            chancellor: None,
            nominated_chancellor: None,
            last_elected_president: None,
            last_elected_chancellor: None,
            eligible_chancellors: vec![],
            enacted_policies: EnactedPolicies::default(),
            failed_elections: 0,
            executive_powers: vec![],
            deck_size: 0,
            discard_size: 0,
            outcome: None,
            revealed_roles: None,
        }
    }
}

impl Game {
    /// Gets the current phase of the game loop.
    pub fn phase(&self) -> Phase {
        match &self.state {
            GameState::Nomination { .. } => Phase::Nomination,
            GameState::Voting { .. } => Phase::Voting,
            GameState::PresidentDiscard { .. } => Phase::PresidentDiscard,
            GameState::ChancellorDiscard { .. } => Phase::ChancellorDiscard,
            GameState::GameOver(_) => Phase::Finished,
        }
    }

    /// Projects the game onto what every participant may see.
    pub fn public_state(&self, game_id: &str) -> PublicState {
        let id = |seat: usize| self.players[seat].id;

        let nominee = match &self.state {
            GameState::Voting { chancellor, .. } => Some(*chancellor),
            _ => None,
        };
        let flagged_chancellor = nominee.or(self.chancellor);

        let players = self
            .players
            .iter()
            .enumerate()
            .map(|(seat, player)| PublicPlayer {
                id: player.id,
                name: player.name.clone(),
                is_host: player.is_host,
                is_alive: player.alive,
                is_president: !self.game_over() && seat == self.president,
                is_chancellor: flagged_chancellor == Some(seat),
            })
            .collect();

        let eligible_chancellors = match &self.state {
            GameState::Nomination { eligible_chancellors } => eligible_chancellors.seats().map(id).collect(),
            _ => vec![],
        };

        let outcome = self.outcome().map(|win| Outcome {
            winner: win.winner(),
            reason: win.reason(),
        });

        let revealed_roles = self.game_over().then(|| {
            (0..self.num_players())
                .map(|seat| RevealedRole {
                    player: id(seat),
                    role: self.roles.role(seat),
                })
                .collect()
        });

        PublicState {
            game_id: game_id.to_string(),
            status: if self.game_over() { Status::Finished } else { Status::Playing },
            phase: self.phase(),
            players,
            president: Some(id(self.president)),
            chancellor: self.chancellor.map(id),
            nominated_chancellor: nominee.map(id),
            last_elected_president: self.last_government.map(|g| id(g.president)),
            last_elected_chancellor: self.last_government.map(|g| id(g.chancellor)),
            eligible_chancellors,
            enacted_policies: EnactedPolicies {
                liberal: self.board.liberal_cards,
                fascist: self.board.fascist_cards,
            },
            failed_elections: self.election_tracker,
            executive_powers: self.powers.clone(),
            deck_size: self.deck.count(),
            discard_size: self.deck.discard_count(),
            outcome,
            revealed_roles,
        }
    }

    /// The private role payload for one player, sent once when the game starts.
    pub fn role_update(&self, seat: usize) -> GameUpdate {
        let view = self.view_for(seat);
        GameUpdate::RoleAssigned {
            role: view.role,
            fascists: view.fascists.into_iter().map(|s| self.players[s].id).collect(),
            hitler: view.hitler.map(|s| self.players[s].id),
        }
    }

    /// The private role payloads for every player.
    pub fn role_dispatches(&self) -> Vec<Dispatch> {
        (0..self.num_players())
            .map(|seat| Dispatch::private(seat, self.role_update(seat)))
            .collect()
    }
}

impl From<WinCondition> for GameUpdate {
    fn from(win: WinCondition) -> Self {
        GameUpdate::GameOver {
            winner: win.winner(),
            reason: win.reason(),
        }
    }
}

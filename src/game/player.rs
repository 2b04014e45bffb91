use super::party::Party;
use crate::error::GameError;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const MIN_PLAYERS: usize = 5;
pub const MAX_PLAYERS: usize = 10;

/// Opaque identity of a player, stable for the lifetime of a game session.
///
/// This is never derived from a transport connection and is visible to every player, so it
/// grants nothing on its own. Reconnecting takes the seat's secret `SessionToken`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct PlayerId(u64);

impl PlayerId {
    pub fn random(rng: &mut impl Rng) -> Self {
        Self(rng.gen())
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl FromStr for PlayerId {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 16 {
            return Err(GameError::PlayerNotFound);
        }
        u64::from_str_radix(s, 16)
            .map(PlayerId)
            .map_err(|_| GameError::PlayerNotFound)
    }
}

impl From<PlayerId> for String {
    fn from(id: PlayerId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for PlayerId {
    type Error = GameError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// A seated player.
#[derive(Clone, Debug)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub is_host: bool,
    pub alive: bool,
}

impl Player {
    pub fn new(id: PlayerId, name: String, is_host: bool) -> Self {
        Self {
            id,
            name,
            is_host,
            alive: true,
        }
    }
}

/// A player's secret role.
#[derive(Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Debug)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Liberal,
    Fascist,
    Hitler,
}

impl Role {
    /// The party this role belongs to; this is what an investigation reveals.
    pub fn party(&self) -> Party {
        match self {
            Role::Liberal => Party::Liberal,
            Role::Fascist | Role::Hitler => Party::Fascist,
        }
    }
}

/// Gets the number of fascists, including hitler, for the given number of players.
pub fn num_fascists(num_players: usize) -> Result<usize, GameError> {
    match num_players {
        0..=4 => Err(GameError::TooFewPlayers),
        5..=6 => Ok(2),
        7..=8 => Ok(3),
        9..=10 => Ok(4),
        _ => Err(GameError::TooManyPlayers),
    }
}

/// The secret roles of every seat in a game, fixed at game start.
#[derive(Clone, Debug)]
pub struct RoleAssignment {
    roles: Vec<Role>,
    /// Seats of the fascist team; the first is always hitler
    fascists: Vec<usize>,
}

/// What one player is entitled to know about the secret roles.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct RoleView {
    pub role: Role,
    /// Other members of the fascist team this player can see.
    pub fascists: Vec<usize>,
    /// Hitler's seat, if this player can see it and is not hitler themself.
    pub hitler: Option<usize>,
}

/// Randomly assigns roles to `num_players` seats.
pub fn assign_roles(num_players: usize, rng: &mut impl Rng) -> Result<RoleAssignment, GameError> {
    let num_fascists = num_fascists(num_players)?;

    let mut seats = (0..num_players).collect::<Vec<_>>();
    seats.shuffle(rng);
    let fascists = seats[..num_fascists].to_vec();

    let mut roles = vec![Role::Liberal; num_players];
    for (i, seat) in fascists.iter().enumerate() {
        roles[*seat] = if i == 0 { Role::Hitler } else { Role::Fascist };
    }

    let assignment = RoleAssignment { roles, fascists };
    if assignment.roles.iter().filter(|r| **r == Role::Hitler).count() != 1 {
        return Err(GameError::MissingHitler);
    }
    Ok(assignment)
}

impl RoleAssignment {
    /// Builds an assignment from an explicit list of roles.
    #[cfg(test)]
    pub fn from_roles(roles: Vec<Role>) -> Self {
        let mut fascists = vec![];
        fascists.extend(roles.iter().position(|r| *r == Role::Hitler));
        fascists.extend((0..roles.len()).filter(|i| roles[*i] == Role::Fascist));
        Self { roles, fascists }
    }

    pub fn role(&self, seat: usize) -> Role {
        self.roles[seat]
    }

    pub fn num_players(&self) -> usize {
        self.roles.len()
    }

    pub fn hitler(&self) -> Result<usize, GameError> {
        self.fascists.first().copied().ok_or(GameError::MissingHitler)
    }

    #[cfg(test)]
    pub fn fascists(&self) -> &[usize] {
        &self.fascists
    }

    /// Computes what the given seat is allowed to know.
    pub fn view_for(&self, seat: usize) -> RoleView {
        let role = self.roles[seat];
        let others = || self.fascists.iter().copied().filter(|s| *s != seat).collect::<Vec<_>>();
        let hitler = self.fascists.first().copied();
        match role {
            Role::Liberal => RoleView {
                role,
                fascists: vec![],
                hitler: None,
            },
            Role::Fascist => RoleView {
                role,
                fascists: others(),
                hitler,
            },
            Role::Hitler if self.num_players() >= 7 => RoleView {
                role,
                fascists: vec![],
                hitler: None,
            },
            Role::Hitler => RoleView {
                role,
                fascists: others(),
                hitler: None,
            },
        }
    }
}

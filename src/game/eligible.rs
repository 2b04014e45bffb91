use super::{player::MAX_PLAYERS, Game};

/// A set of seats that may be chosen for some purpose.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EligiblePlayers {
    eligible: [bool; MAX_PLAYERS],
}

impl EligiblePlayers {
    /// Every seat at a table of `num_players`, except the given one.
    pub fn all_except(num_players: usize, player: usize) -> Self {
        Self {
            eligible: core::array::from_fn(|i| i < num_players && i != player),
        }
    }

    pub fn includes(&self, player: usize) -> bool {
        self.eligible.get(player).copied().unwrap_or(false)
    }

    pub fn seats(&self) -> impl Iterator<Item = usize> + '_ {
        (0..MAX_PLAYERS).filter(|i| self.eligible[*i])
    }
}

pub struct EligiblePlayersBuilder {
    eligible: [bool; MAX_PLAYERS],
}

impl Game {
    /// Starts building a set of eligible players from every living player.
    pub fn eligible_players(&self) -> EligiblePlayersBuilder {
        EligiblePlayersBuilder {
            eligible: core::array::from_fn(|i| self.players.get(i).map(|p| p.alive).unwrap_or(false)),
        }
    }
}

impl EligiblePlayersBuilder {
    pub fn exclude(mut self, player: usize) -> Self {
        self.eligible[player] = false;
        self
    }

    pub fn make(self) -> EligiblePlayers {
        EligiblePlayers { eligible: self.eligible }
    }
}

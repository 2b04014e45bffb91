use super::{executive_power::ExecutivePower, party::Party};
use serde::Serialize;

pub const MAX_LIBERAL_CARDS: usize = 5;
pub const MAX_FASCIST_CARDS: usize = 6;

/// The policies enacted so far.
#[derive(Clone, Serialize, Debug)]
pub struct Board {
    #[serde(skip)]
    pub num_players: usize,
    #[serde(rename = "liberal")]
    pub liberal_cards: usize,
    #[serde(rename = "fascist")]
    pub fascist_cards: usize,
}

impl Board {
    /// Creates a new board.
    pub fn new(num_players: usize) -> Self {
        Board {
            num_players,
            liberal_cards: 0,
            fascist_cards: 0,
        }
    }

    /// Plays a card onto the board.
    pub fn play_card(&mut self, card: Party) {
        match card {
            Party::Liberal => self.liberal_cards += 1,
            Party::Fascist => self.fascist_cards += 1,
        }
    }

    /// Gets the executive power unlocked by the last played fascist card, if there is any.
    pub fn get_executive_power(&self) -> Option<ExecutivePower> {
        use ExecutivePower::*;
        match (self.num_players, self.fascist_cards) {
            (7.., 1) => Some(Investigate),
            (7.., 2) => Some(Investigate),
            (_, 3) => Some(SpecialElection),
            (_, 4) => Some(Execute),
            (_, 5) => Some(Execute),
            _ => None,
        }
    }

    /// Checks whether either party has completed their policy track.
    pub fn check_tracks(&self) -> Option<Party> {
        if self.liberal_cards >= MAX_LIBERAL_CARDS {
            return Some(Party::Liberal);
        }
        if self.fascist_cards >= MAX_FASCIST_CARDS {
            return Some(Party::Fascist);
        }
        None
    }

    /// Checks whether hitler becoming chancellor now wins the game for the fascists.
    pub fn hitler_chancellor_wins(&self) -> bool {
        self.fascist_cards >= 3
    }
}

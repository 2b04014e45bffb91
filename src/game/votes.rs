use super::player::MAX_PLAYERS;
use serde::{Deserialize, Serialize};

/// A ballot.
#[derive(Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Debug)]
#[serde(rename_all = "lowercase")]
pub enum Vote {
    Ja,
    Nein,
}

/// The counted result of a completed vote.
#[derive(Clone, Copy, Serialize, PartialEq, Eq, Debug)]
pub struct Tally {
    pub ja: usize,
    pub nein: usize,
    pub passed: bool,
}

/// Tracks the vote of each player.
#[derive(Clone, Copy, Debug)]
pub struct Votes {
    num_voters: usize,
    votes: [Option<Vote>; MAX_PLAYERS],
}

impl Votes {
    /// Creates a new `Votes`, where `num_voters` is the number of ballots needed to close the vote.
    pub fn new(num_voters: usize) -> Self {
        let votes = [None; MAX_PLAYERS];
        Self { num_voters, votes }
    }

    /// Returns whether the given player has cast their vote.
    pub fn has_cast(&self, player_idx: usize) -> bool {
        self.votes[player_idx].is_some()
    }

    /// Records the vote of a player.
    pub fn vote(&mut self, player_idx: usize, vote: Vote) {
        self.votes[player_idx] = Some(vote);
    }

    /// The number of ballots cast so far.
    pub fn cast(&self) -> usize {
        self.votes.iter().filter(|v| v.is_some()).count()
    }

    /// The number of ballots needed to close the vote.
    pub fn eligible(&self) -> usize {
        self.num_voters
    }

    /// If all votes are counted, returns the outcome, otherwise returns `None`.
    /// Ties are a rejection.
    pub fn outcome(&self) -> Option<Tally> {
        let ja = self.votes.iter().filter(|v| **v == Some(Vote::Ja)).count();
        let nein = self.votes.iter().filter(|v| **v == Some(Vote::Nein)).count();
        (ja + nein >= self.num_voters).then_some(Tally { ja, nein, passed: ja > nein })
    }
}

use super::{board::Board, party::Party, player::Player};
use serde::Serialize;

#[derive(Clone, Copy, Serialize, PartialEq, Eq, Debug)]
#[serde(rename_all = "camelCase")]
pub enum WinCondition {
    /// The liberals completed their policy track.
    LiberalPolicyTrack,
    /// The fascists completed their policy track.
    FascistPolicyTrack,
    /// Hitler was executed
    HitlerExecuted,
    /// Hitler was elected chancellor
    HitlerChancellor,
}

impl WinCondition {
    /// The team that wins.
    pub fn winner(&self) -> Party {
        match self {
            WinCondition::LiberalPolicyTrack | WinCondition::HitlerExecuted => Party::Liberal,
            WinCondition::FascistPolicyTrack | WinCondition::HitlerChancellor => Party::Fascist,
        }
    }

    /// A human readable explanation of the outcome.
    pub fn reason(&self) -> &'static str {
        match self {
            WinCondition::LiberalPolicyTrack => "5 Liberal policies enacted",
            WinCondition::FascistPolicyTrack => "6 Fascist policies enacted",
            WinCondition::HitlerExecuted => "Hitler was executed",
            WinCondition::HitlerChancellor => "Hitler was elected Chancellor",
        }
    }
}

/// Decides whether the game is over.
///
/// The checks run in a fixed order and the first that holds wins, so a completed policy track
/// takes precedence over hitler's death, which takes precedence over hitler's chancellorship.
pub fn evaluate(board: &Board, players: &[Player], hitler: usize, chancellor: Option<usize>) -> Option<WinCondition> {
    if let Some(party) = board.check_tracks() {
        return Some(match party {
            Party::Liberal => WinCondition::LiberalPolicyTrack,
            Party::Fascist => WinCondition::FascistPolicyTrack,
        });
    }

    if !players[hitler].alive {
        return Some(WinCondition::HitlerExecuted);
    }

    if board.hitler_chancellor_wins() && chancellor == Some(hitler) {
        return Some(WinCondition::HitlerChancellor);
    }

    None
}

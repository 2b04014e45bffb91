use super::{
    update::{Dispatch, GameUpdate},
    Game, GameState,
};
use crate::error::GameError;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Debug)]
#[serde(rename_all = "kebab-case")]
pub enum ExecutivePower {
    /// The president learns the party membership of one player.
    Investigate,
    /// The president chooses the next presidential candidate.
    SpecialElection,
    /// The president executes a player.
    Execute,
}

impl fmt::Display for ExecutivePower {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutivePower::Investigate => f.write_str("investigate"),
            ExecutivePower::SpecialElection => f.write_str("special-election"),
            ExecutivePower::Execute => f.write_str("execute"),
        }
    }
}

impl Game {
    /// Called when the president uses one of the unlocked executive powers on another player.
    pub fn use_power(
        &mut self,
        player: usize,
        power: ExecutivePower,
        target: usize,
        log: &mut Vec<Dispatch>,
    ) -> Result<(), GameError> {
        self.check_player_index(player)?;
        self.check_player_index(target)?;
        self.check_in_progress()?;

        let in_session = match &self.state {
            GameState::Nomination { .. } => false,
            GameState::PresidentDiscard { .. } | GameState::ChancellorDiscard { .. } => true,
            _ => return Err(GameError::InvalidAction),
        };
        if player != self.president {
            return Err(GameError::NotYourTurn);
        }
        let Some(slot) = self.powers.iter().position(|p| *p == power) else {
            return Err(GameError::PowerUnavailable);
        };
        if target == player || !self.players[target].alive {
            return Err(GameError::InvalidPlayerChoice);
        }
        if power == ExecutivePower::Execute && in_session && self.chancellor == Some(target) {
            return Err(GameError::InvalidPlayerChoice);
        }

        self.powers.remove(slot);
        let target_id = self.players[target].id;
        log::debug!("President used {} on player {}", power, target_id);

        match power {
            ExecutivePower::Investigate => {
                let party = self.roles.role(target).party();
                log.push(Dispatch::private(player, GameUpdate::InvestigationResult { target: target_id, party }));
                log.push(Dispatch::public(GameUpdate::PlayerInvestigated { target: target_id }));
            }
            ExecutivePower::SpecialElection => {
                self.special_election = Some(target);
                log.push(Dispatch::public(GameUpdate::SpecialElectionCalled { target: target_id }));
            }
            ExecutivePower::Execute => {
                self.players[target].alive = false;
                log.push(Dispatch::public(GameUpdate::PlayerExecuted { target: target_id }));
                if self.check_game_over(log)? {
                    return Ok(());
                }
                if !in_session {
                    self.start_nomination();
                }
            }
        }

        Ok(())
    }
}

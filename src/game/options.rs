use serde::{Deserialize, Serialize};

/// Options for customising a game.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct GameOptions {
    /// Whether the last elected president is also ineligible for chancellor,
    /// once at least seven players are alive.
    pub president_term_limit: bool,
}

impl GameOptions {
    /// Returns whether the last president is term limited with `num_alive` living players.
    pub fn president_term_limited(&self, num_alive: usize) -> bool {
        self.president_term_limit && num_alive >= 7
    }
}

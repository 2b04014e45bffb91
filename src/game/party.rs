use serde::{Deserialize, Serialize};
use std::fmt;

/// The two political parties of the game, which double as the two kinds of policy card.
#[derive(Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Debug)]
#[serde(rename_all = "lowercase")]
pub enum Party {
    Liberal,
    Fascist,
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Party::Liberal => f.write_str("liberal"),
            Party::Fascist => f.write_str("fascist"),
        }
    }
}

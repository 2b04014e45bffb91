use thiserror::Error;

/// The result of attempting to perform an invalid operation on a [Game] or [Session].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("game does not exist")]
    GameNotFound,
    #[error("too few players in the game")]
    TooFewPlayers,
    #[error("too many players in the game")]
    TooManyPlayers,
    #[error("no player exists with the given id")]
    PlayerNotFound,
    #[error("unknown session token")]
    InvalidToken,
    #[error("player names must be between 1 and 32 characters")]
    InvalidPlayerName,
    #[error("a player with that name has already joined")]
    NameTaken,
    #[error("cannot join a game in progress")]
    CannotJoinStartedGame,
    #[error("only the host can do that")]
    NotHost,
    #[error("this player cannot be chosen for this action")]
    InvalidPlayerChoice,
    #[error("invalid player index")]
    InvalidPlayerIndex,
    #[error("this action cannot be performed during this phase of the game")]
    InvalidAction,
    #[error("it is not your turn to do that")]
    NotYourTurn,
    #[error("you have already voted")]
    AlreadyVoted,
    #[error("dead players cannot act")]
    PlayerIsDead,
    #[error("an invalid card was chosen")]
    InvalidCard,
    #[error("that executive power is not available")]
    PowerUnavailable,
    #[error("the game is over")]
    GameOver,
    #[error("the policy deck and discard pile are both empty")]
    DeckExhausted,
    #[error("role assignment did not produce exactly one hitler")]
    MissingHitler,
    #[error("the server cannot create games right now")]
    RegistryUnavailable,
}

/// How an error should be handled by the session, following the kind of fault it represents.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The command was illegal in the current phase or for the acting player.
    IllegalCommand,
    /// The game is full or no longer accepting players.
    CapacityViolation,
    /// A programming defect; the game cannot safely continue.
    InvariantViolation,
}

impl GameError {
    pub fn kind(&self) -> ErrorKind {
        use GameError::*;
        match self {
            TooManyPlayers | CannotJoinStartedGame => ErrorKind::CapacityViolation,
            DeckExhausted | MissingHitler | RegistryUnavailable => ErrorKind::InvariantViolation,
            _ => ErrorKind::IllegalCommand,
        }
    }

    /// Returns `true` if the game that raised this error must be aborted.
    pub fn is_fatal(&self) -> bool {
        self.kind() == ErrorKind::InvariantViolation
    }
}

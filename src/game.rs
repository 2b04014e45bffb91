use self::board::Board;
use self::deck::Deck;
use self::eligible::EligiblePlayers;
use self::government::Government;
use self::update::{Dispatch, GameUpdate};
use self::victory::WinCondition;
use self::votes::{Tally, Votes};
use crate::error::GameError;
use rand::{Rng, SeedableRng};

pub use self::executive_power::ExecutivePower;
pub use self::options::GameOptions;
pub use self::party::Party;
pub use self::player::{Player, PlayerId, RoleAssignment, RoleView, MAX_PLAYERS, MIN_PLAYERS};
pub use self::update::{Audience, PublicPlayer, PublicState, Status};
pub use self::votes::Vote;

mod board;
mod deck;
mod eligible;
mod executive_power;
mod government;
mod options;
mod party;
mod player;
mod test;
pub mod update;
mod victory;
mod votes;

/// A game of Secret Hitler, from the first nomination until one team wins.
#[derive(Clone, Debug)]
pub struct Game {
    opts: GameOptions,
    players: Vec<Player>,
    roles: RoleAssignment,
    board: Board,
    deck: Deck,
    state: GameState,
    /// Seat of the sitting or nominating president
    president: usize,
    /// Seat of the chancellor of the sitting government, once elected
    chancellor: Option<usize>,
    election_tracker: usize,
    last_government: Option<Government>,
    /// The president chosen by a special election, who takes the next turn
    special_election: Option<usize>,
    /// Executive powers unlocked but not yet used, in the order they were unlocked
    powers: Vec<ExecutivePower>,
    rng: rand_chacha::ChaCha8Rng,
}

/// Represents the current phase in the game loop.
#[derive(Clone, Debug)]
enum GameState {
    Nomination {
        eligible_chancellors: EligiblePlayers,
    },
    Voting {
        chancellor: usize,
        votes: Votes,
    },
    /// President must discard a card.
    PresidentDiscard {
        cards: [Party; 3],
    },
    /// Chancellor must discard a card; the other is enacted.
    ChancellorDiscard {
        cards: [Party; 2],
    },
    GameOver(WinCondition),
}

impl Game {
    /// Creates a new game with the given seated players, in seating order.
    pub fn new(opts: GameOptions, players: Vec<Player>, seed: u64) -> Result<Self, GameError> {
        let num_players = players.len();

        // Deal the roles
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(seed);
        let roles = player::assign_roles(num_players, &mut rng)?;

        // Create the board; shuffle the deck
        let board = Board::new(num_players);
        let deck = Deck::new(num_players, &mut rng);
        let president = rng.gen_range(0..num_players);
        let eligible_chancellors = EligiblePlayers::all_except(num_players, president);

        Ok(Game {
            opts,
            players,
            roles,
            board,
            deck,
            state: GameState::Nomination { eligible_chancellors },
            president,
            chancellor: None,
            election_tracker: 0,
            last_government: None,
            special_election: None,
            powers: vec![],
            rng,
        })
    }

    /// Gets the number of players in the game.
    pub fn num_players(&self) -> usize {
        self.players.len()
    }

    /// Gets the number of players in the game that are alive.
    pub fn num_players_alive(&self) -> usize {
        self.players.iter().filter(|p| p.alive).count()
    }

    /// Gets the players in seating order.
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Finds the seat of the player with the given id.
    pub fn find_player(&self, id: PlayerId) -> Result<usize, GameError> {
        self.players
            .iter()
            .position(|p| p.id == id)
            .ok_or(GameError::PlayerNotFound)
    }

    /// Computes what the given player is entitled to know about the secret roles.
    pub fn view_for(&self, seat: usize) -> RoleView {
        self.roles.view_for(seat)
    }

    /// Returns true if the game is over.
    pub fn game_over(&self) -> bool {
        matches!(self.state, GameState::GameOver(_))
    }

    /// Gets the way the game was won, if it is over.
    pub fn outcome(&self) -> Option<WinCondition> {
        match self.state {
            GameState::GameOver(win) => Some(win),
            _ => None,
        }
    }

    /// Called when the president nominates a chancellor.
    pub fn nominate(&mut self, player: usize, chancellor: usize, log: &mut Vec<Dispatch>) -> Result<(), GameError> {
        self.check_player_index(player)?;
        self.check_player_index(chancellor)?;
        self.check_in_progress()?;

        let GameState::Nomination { eligible_chancellors } = &self.state else {
            return Err(GameError::InvalidAction);
        };
        if player != self.president {
            return Err(GameError::NotYourTurn);
        }
        if !eligible_chancellors.includes(chancellor) {
            return Err(GameError::InvalidPlayerChoice);
        }

        self.state = GameState::Voting {
            chancellor,
            votes: Votes::new(self.num_players_alive()),
        };
        log.push(Dispatch::public(GameUpdate::ChancellorNominated {
            president: self.players[player].id,
            chancellor: self.players[chancellor].id,
        }));
        Ok(())
    }

    /// Called when a player casts their vote. The election is resolved by the last ballot.
    pub fn cast_vote(&mut self, player: usize, vote: Vote, log: &mut Vec<Dispatch>) -> Result<(), GameError> {
        self.check_player_index(player)?;
        self.check_in_progress()?;

        let alive = self.players[player].alive;
        let GameState::Voting { chancellor, votes } = &mut self.state else {
            return Err(GameError::InvalidAction);
        };
        if !alive {
            return Err(GameError::PlayerIsDead);
        }
        if votes.has_cast(player) {
            return Err(GameError::AlreadyVoted);
        }

        votes.vote(player, vote);
        log.push(Dispatch::public(GameUpdate::VoteProgress {
            cast: votes.cast(),
            eligible: votes.eligible(),
        }));

        let chancellor = *chancellor;
        if let Some(tally) = votes.outcome() {
            self.end_voting(chancellor, tally, log)?;
        }
        Ok(())
    }

    /// Called when the president discards a policy from their hand of three.
    pub fn president_discard(&mut self, player: usize, card_idx: usize, log: &mut Vec<Dispatch>) -> Result<(), GameError> {
        self.check_player_index(player)?;
        self.check_in_progress()?;

        let GameState::PresidentDiscard { cards } = &self.state else {
            return Err(GameError::InvalidAction);
        };
        if player != self.president {
            return Err(GameError::NotYourTurn);
        }
        let Some(chancellor) = self.chancellor else {
            return Err(GameError::InvalidAction);
        };
        let (discarded, cards) = match card_idx {
            0 => (cards[0], [cards[1], cards[2]]),
            1 => (cards[1], [cards[0], cards[2]]),
            2 => (cards[2], [cards[0], cards[1]]),
            _ => return Err(GameError::InvalidCard),
        };

        self.deck.discard(discarded);
        self.state = GameState::ChancellorDiscard { cards };
        log.push(Dispatch::private(chancellor, GameUpdate::ChancellorHand { cards }));
        Ok(())
    }

    /// Called when the chancellor discards a policy; the remaining policy is enacted.
    pub fn chancellor_discard(&mut self, player: usize, card_idx: usize, log: &mut Vec<Dispatch>) -> Result<(), GameError> {
        self.check_player_index(player)?;
        self.check_in_progress()?;

        let GameState::ChancellorDiscard { cards } = &self.state else {
            return Err(GameError::InvalidAction);
        };
        if Some(player) != self.chancellor {
            return Err(GameError::NotYourTurn);
        }
        let (discarded, enacted) = match card_idx {
            0 => (cards[0], cards[1]),
            1 => (cards[1], cards[0]),
            _ => return Err(GameError::InvalidCard),
        };

        self.deck.discard(discarded);
        if !self.enact_policy(enacted, false, log)? {
            self.start_next_round();
        }
        Ok(())
    }

    fn end_voting(&mut self, chancellor: usize, tally: Tally, log: &mut Vec<Dispatch>) -> Result<(), GameError> {
        log.push(Dispatch::public(tally.into()));

        if tally.passed {
            let government = Government {
                president: self.president,
                chancellor,
            };
            let cards = self.deck.draw_three(&mut self.rng)?;
            self.chancellor = Some(chancellor);
            self.last_government = Some(government);
            self.election_tracker = 0;
            self.state = GameState::PresidentDiscard { cards };
            log.push(Dispatch::public(GameUpdate::GovernmentFormed {
                president: self.players[government.president].id,
                chancellor: self.players[chancellor].id,
            }));
            log.push(Dispatch::private(government.president, GameUpdate::PresidentHand { cards }));
            return Ok(());
        }

        self.election_tracker += 1;
        log.push(Dispatch::public(GameUpdate::GovernmentFailed {
            failed_elections: self.election_tracker,
        }));

        if self.election_tracker >= 3 {
            let card = self.deck.draw_one(&mut self.rng)?;
            let game_over = self.enact_policy(card, true, log)?;
            self.election_tracker = 0;
            if game_over {
                return Ok(());
            }
        }

        self.start_next_round();
        Ok(())
    }

    /// Places a policy on the board, unlocking any executive power, and returns whether the game is over.
    fn enact_policy(&mut self, card: Party, chaos: bool, log: &mut Vec<Dispatch>) -> Result<bool, GameError> {
        self.board.play_card(card);
        log.push(Dispatch::public(GameUpdate::PolicyEnacted { policy: card, chaos }));

        if card == Party::Fascist {
            if let Some(power) = self.board.get_executive_power() {
                self.powers.push(power);
                log.push(Dispatch::public(GameUpdate::PowerUnlocked { power }));
            }
        }

        self.check_game_over(log)
    }

    /// Moves the presidency on and opens the next nomination.
    fn start_next_round(&mut self) {
        self.chancellor = None;
        self.president = match self.special_election.take() {
            Some(seat) if self.players[seat].alive => seat,
            _ => self.next_player(self.president),
        };
        self.start_nomination();
    }

    fn start_nomination(&mut self) {
        self.state = GameState::Nomination {
            eligible_chancellors: self.eligible_chancellors(self.president),
        };
    }

    /// Ends the game if a win condition holds, returning whether it did.
    fn check_game_over(&mut self, log: &mut Vec<Dispatch>) -> Result<bool, GameError> {
        let hitler = self.roles.hitler()?;
        let Some(win) = victory::evaluate(&self.board, &self.players, hitler, self.chancellor) else {
            return Ok(false);
        };
        log::info!("Game over: {}", win.reason());
        self.state = GameState::GameOver(win);
        log.push(Dispatch::public(win.into()));
        Ok(true)
    }

    /// Returns `Err` once the game has finished.
    fn check_in_progress(&self) -> Result<(), GameError> {
        match self.game_over() {
            true => Err(GameError::GameOver),
            false => Ok(()),
        }
    }

    /// Returns `Ok` if the given player index is valid, and an `Err` otherwise.
    fn check_player_index(&self, player: usize) -> Result<(), GameError> {
        if player < self.num_players() {
            Ok(())
        } else {
            Err(GameError::InvalidPlayerIndex)
        }
    }

    /// Finds the next alive player after the given seat.
    fn next_player(&self, player: usize) -> usize {
        (player + 1..self.num_players())
            .chain(0..player)
            .find(|idx| self.players[*idx].alive)
            .unwrap_or(player)
    }

    /// Determines which players are eligible to be chancellor.
    fn eligible_chancellors(&self, president: usize) -> EligiblePlayers {
        let mut result = self.eligible_players().exclude(president);

        if let Some(government) = self.last_government {
            result = result.exclude(government.chancellor);
            if self.opts.president_term_limited(self.num_players_alive()) {
                result = result.exclude(government.president);
            }
        }

        let result = result.make();
        if result.seats().next().is_none() {
            // Term limits are waived when nobody else is left
            return self.eligible_players().exclude(president).make();
        }
        result
    }
}

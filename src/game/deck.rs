use super::party::Party;
use crate::error::GameError;
use rand::prelude::SliceRandom;
use rand::Rng;
use std::iter::repeat;

#[derive(Clone, Debug)]
pub struct Deck {
    /// The current draw pile; the top card is the last element
    deck: Vec<Party>,
    /// Cards discarded during legislative sessions
    discard: Vec<Party>,
}

/// Gets the number of liberal and fascist cards for the given number of players.
pub fn policy_counts(num_players: usize) -> (usize, usize) {
    match num_players {
        0..=6 => (6, 11),
        7..=8 => (5, 13),
        _ => (4, 15),
    }
}

impl Deck {
    /// Creates a freshly shuffled deck for a game with `num_players` players.
    pub fn new(num_players: usize, rng: &mut impl Rng) -> Self {
        let (liberal, fascist) = policy_counts(num_players);
        let mut deck = Vec::with_capacity(liberal + fascist);
        deck.extend(repeat(Party::Liberal).take(liberal));
        deck.extend(repeat(Party::Fascist).take(fascist));
        deck.shuffle(rng);
        Self { deck, discard: vec![] }
    }

    /// Creates a deck with the given draw pile, where the last card is on top.
    #[cfg(test)]
    pub fn stacked(deck: Vec<Party>) -> Self {
        Self { deck, discard: vec![] }
    }

    /// Shuffles the discard pile back into the (empty) draw pile.
    fn reshuffle(&mut self, rng: &mut impl Rng) {
        log::debug!("Reshuffling {} discarded policies into the deck", self.discard.len());
        self.deck.append(&mut self.discard);
        self.deck.shuffle(rng);
    }

    /// Draws the top card from the deck, reshuffling the discard pile if the deck is empty.
    pub fn draw_one(&mut self, rng: &mut impl Rng) -> Result<Party, GameError> {
        if self.deck.is_empty() {
            self.reshuffle(rng);
        }
        self.deck.pop().ok_or(GameError::DeckExhausted)
    }

    /// Draws the top three cards from the deck, in the order they were drawn.
    pub fn draw_three(&mut self, rng: &mut impl Rng) -> Result<[Party; 3], GameError> {
        Ok([self.draw_one(rng)?, self.draw_one(rng)?, self.draw_one(rng)?])
    }

    /// Places a card on the discard pile.
    pub fn discard(&mut self, card: Party) {
        self.discard.push(card);
    }

    /// The number of cards in the draw pile.
    pub fn count(&self) -> usize {
        self.deck.len()
    }

    /// The number of cards in the discard pile.
    pub fn discard_count(&self) -> usize {
        self.discard.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn deck_sizes_follow_player_count() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for (players, liberal, fascist) in [(5, 6, 11), (6, 6, 11), (7, 5, 13), (8, 5, 13), (9, 4, 15), (10, 4, 15)] {
            let deck = Deck::new(players, &mut rng);
            assert_eq!(deck.count(), liberal + fascist);
            assert_eq!(deck.deck.iter().filter(|c| **c == Party::Liberal).count(), liberal);
            assert_eq!(deck.discard_count(), 0);
        }
    }

    #[test]
    fn empty_deck_reshuffles_discard_pile() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut deck = Deck::stacked(vec![Party::Fascist]);
        deck.discard(Party::Liberal);
        deck.discard(Party::Liberal);

        assert_eq!(deck.draw_one(&mut rng), Ok(Party::Fascist));
        assert_eq!(deck.draw_one(&mut rng), Ok(Party::Liberal));
        assert_eq!(deck.count(), 1);
        assert_eq!(deck.discard_count(), 0);
    }

    #[test]
    fn drawing_from_nothing_is_an_invariant_violation() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut deck = Deck::stacked(vec![Party::Liberal, Party::Liberal]);
        assert_eq!(deck.draw_three(&mut rng), Err(GameError::DeckExhausted));
        assert!(GameError::DeckExhausted.is_fatal());
    }
}

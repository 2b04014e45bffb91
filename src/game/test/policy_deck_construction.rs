//! Plays whole games with random choices and checks the invariants that must hold throughout.

use super::test_utils::*;
use crate::game::update::Phase;
use crate::game::{Game, GameState, Vote};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Makes one random but legal move, returning false once the game is over.
fn random_move(game: &mut Game, rng: &mut impl Rng) -> bool {
    let president = game.president;
    let mut log = vec![];

    let nominating = matches!(game.state, GameState::Nomination { .. });
    if let (Some(power), true) = (game.powers.first().copied(), nominating) {
        let targets = (0..game.num_players())
            .filter(|s| *s != president && game.players[*s].alive)
            .collect::<Vec<_>>();
        let target = targets[rng.gen_range(0..targets.len())];
        game.use_power(president, power, target, &mut log).unwrap();
        return true;
    }

    match &game.state {
        GameState::Nomination { eligible_chancellors } => {
            let eligible = eligible_chancellors.seats().collect::<Vec<_>>();
            let chancellor = eligible[rng.gen_range(0..eligible.len())];
            game.nominate(president, chancellor, &mut log).unwrap();
        }
        GameState::Voting { .. } => {
            for seat in 0..game.num_players() {
                if game.players[seat].alive {
                    let vote = if rng.gen_bool(0.6) { Vote::Ja } else { Vote::Nein };
                    game.cast_vote(seat, vote, &mut log).unwrap();
                }
            }
        }
        GameState::PresidentDiscard { .. } => {
            game.president_discard(president, rng.gen_range(0..3), &mut log).unwrap();
        }
        GameState::ChancellorDiscard { .. } => {
            let chancellor = game.chancellor.unwrap();
            game.chancellor_discard(chancellor, rng.gen_range(0..2), &mut log).unwrap();
        }
        GameState::GameOver(_) => return false,
    }
    true
}

fn check_invariants(game: &Game, total: usize) {
    assert_eq!(total_cards(game), total);
    assert!(game.election_tracker < 3);

    let state = game.public_state("TEST");
    assert!(state.players.iter().filter(|p| p.is_president).count() <= 1);
    assert!(state.players.iter().filter(|p| p.is_chancellor).count() <= 1);
    assert_eq!(state.players.iter().filter(|p| p.is_host).count(), 1);
    assert!(game.players[game.president].alive || game.game_over());
    assert!(!state.eligible_chancellors.contains(&game.players[game.president].id));
    for id in &state.eligible_chancellors {
        assert!(game.players[game.find_player(*id).unwrap()].alive);
    }

    let json = serde_json::to_value(&state).unwrap();
    assert_eq!(json["revealedRoles"].is_null(), !game.game_over());
}

fn play_random_game(num_players: usize, seed: u64) -> Game {
    let mut game = create_test_game(num_players, seed);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let total = total_cards(&game);

    for _ in 0..1000 {
        if !random_move(&mut game, &mut rng) {
            break;
        }
        check_invariants(&game, total);
    }
    game
}

#[test]
fn random_games_conserve_cards_and_finish() {
    for num_players in 5..=10 {
        for seed in 0..20 {
            let game = play_random_game(num_players, seed);
            assert!(game.game_over(), "{num_players} players, seed {seed}");
            assert_eq!(game.phase(), Phase::Finished);
        }
    }
}

#[test]
fn random_games_reach_every_ending() {
    let mut endings = std::collections::HashSet::new();
    for seed in 0..200 {
        let game = play_random_game(5 + (seed as usize % 6), seed);
        endings.insert(game.outcome().unwrap().reason());
    }
    assert!(endings.len() >= 3, "{endings:?}");
}

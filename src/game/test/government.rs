//! Tests for nomination, voting and presidential succession.

use super::test_utils::*;
use crate::error::GameError;
use crate::game::government::Government;
use crate::game::update::{Audience, GameUpdate, Phase};
use crate::game::{GameOptions, Party, Vote};

#[test]
fn nomination_opens_the_vote() {
    let mut game = create_5_player_game_with_known_roles();
    let mut log = vec![];
    game.nominate(0, 2, &mut log).unwrap();

    assert_eq!(game.phase(), Phase::Voting);
    assert_eq!(
        log[0].update,
        GameUpdate::ChancellorNominated {
            president: game.players[0].id,
            chancellor: game.players[2].id,
        }
    );

    let state = game.public_state("TEST");
    assert_eq!(state.nominated_chancellor, Some(game.players[2].id));
    assert!(state.players[2].is_chancellor);
    assert!(state.players[0].is_president);
    assert_eq!(state.chancellor, None);
}

#[test]
fn only_the_president_can_nominate() {
    let mut game = create_5_player_game_with_known_roles();
    assert_eq!(game.nominate(1, 2, &mut vec![]), Err(GameError::NotYourTurn));
    assert_eq!(game.phase(), Phase::Nomination);
}

#[test]
fn cannot_nominate_ineligible_players() {
    let mut game = create_5_player_game_with_known_roles();
    game.players[3].alive = false;
    set_president(&mut game, 0);

    assert_eq!(game.nominate(0, 0, &mut vec![]), Err(GameError::InvalidPlayerChoice));
    assert_eq!(game.nominate(0, 3, &mut vec![]), Err(GameError::InvalidPlayerChoice));
    assert_eq!(game.nominate(0, 12, &mut vec![]), Err(GameError::InvalidPlayerIndex));
}

#[test]
fn cannot_nominate_outside_the_nomination_phase() {
    let mut game = create_5_player_game_with_known_roles();
    game.nominate(0, 2, &mut vec![]).unwrap();
    assert_eq!(game.nominate(0, 3, &mut vec![]), Err(GameError::InvalidAction));
}

#[test]
fn votes_are_validated() {
    let mut game = create_5_player_game_with_known_roles();
    assert_eq!(game.cast_vote(1, Vote::Ja, &mut vec![]), Err(GameError::InvalidAction));

    game.players[4].alive = false;
    set_president(&mut game, 0);
    game.nominate(0, 2, &mut vec![]).unwrap();

    game.cast_vote(1, Vote::Ja, &mut vec![]).unwrap();
    assert_eq!(game.cast_vote(1, Vote::Nein, &mut vec![]), Err(GameError::AlreadyVoted));
    assert_eq!(game.cast_vote(4, Vote::Ja, &mut vec![]), Err(GameError::PlayerIsDead));
    assert_eq!(game.cast_vote(10, Vote::Ja, &mut vec![]), Err(GameError::InvalidPlayerIndex));
}

#[test]
fn vote_progress_is_public_but_ballots_are_not() {
    let mut game = create_5_player_game_with_known_roles();
    game.nominate(0, 2, &mut vec![]).unwrap();

    let mut log = vec![];
    game.cast_vote(3, Vote::Nein, &mut log).unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].audience, Audience::Everyone);
    assert_eq!(log[0].update, GameUpdate::VoteProgress { cast: 1, eligible: 5 });
    assert_eq!(game.phase(), Phase::Voting);
}

#[test]
fn passing_vote_forms_a_government() {
    let mut game = create_5_player_game_with_known_roles();
    let log = run_election(&mut game, 2, Vote::Ja);

    assert_eq!(game.phase(), Phase::PresidentDiscard);
    assert_eq!(game.chancellor, Some(2));
    assert_eq!(game.last_government, Some(Government { president: 0, chancellor: 2 }));
    assert_eq!(game.election_tracker, 0);
    assert_eq!(game.deck.count(), 14);
    assert_eq!(total_cards(&game), 17);

    let public = updates_for(&log, Audience::Everyone);
    assert!(public.contains(&&GameUpdate::VoteTally { ja: 5, nein: 0, passed: true }));
    assert!(public.contains(&&GameUpdate::GovernmentFormed {
        president: game.players[0].id,
        chancellor: game.players[2].id,
    }));
    assert!(!public.iter().any(|u| matches!(u, GameUpdate::PresidentHand { .. })));

    let hand = updates_for(&log, Audience::Player(0));
    assert!(matches!(hand[..], [GameUpdate::PresidentHand { .. }]));
}

#[test]
fn strict_majority_is_needed() {
    let mut game = create_test_game(10, 3);
    set_president(&mut game, 0);
    game.nominate(0, 1, &mut vec![]).unwrap();

    let mut log = vec![];
    for seat in 0..10 {
        let vote = if seat < 5 { Vote::Ja } else { Vote::Nein };
        game.cast_vote(seat, vote, &mut log).unwrap();
    }

    assert!(log.iter().any(|d| d.update == GameUpdate::VoteTally { ja: 5, nein: 5, passed: false }));
    assert_eq!(game.election_tracker, 1);
    assert_eq!(game.phase(), Phase::Nomination);
}

#[test]
fn simple_majority_passes() {
    let mut game = create_5_player_game_with_known_roles();
    game.nominate(0, 1, &mut vec![]).unwrap();

    let mut log = vec![];
    for (seat, vote) in [Vote::Ja, Vote::Nein, Vote::Ja, Vote::Nein, Vote::Ja].into_iter().enumerate() {
        game.cast_vote(seat, vote, &mut log).unwrap();
    }
    assert!(log.iter().any(|d| d.update == GameUpdate::VoteTally { ja: 3, nein: 2, passed: true }));
    assert_eq!(game.phase(), Phase::PresidentDiscard);
}

#[test]
fn failed_vote_passes_the_presidency_left() {
    let mut game = create_5_player_game_with_known_roles();
    let log = fail_election(&mut game);

    assert!(log.iter().any(|d| d.update == GameUpdate::GovernmentFailed { failed_elections: 1 }));
    assert_eq!(game.election_tracker, 1);
    assert_eq!(game.president, 1);
    assert_eq!(game.chancellor, None);
    assert_eq!(game.phase(), Phase::Nomination);
    assert!(game.last_government.is_none());
}

#[test]
fn succession_skips_the_dead_and_wraps_around() {
    let mut game = create_5_player_game_with_known_roles();
    game.players[0].alive = false;
    set_president(&mut game, 3);

    fail_election(&mut game);
    assert_eq!(game.president, 4);
    fail_election(&mut game);
    assert_eq!(game.president, 1);
}

#[test]
fn third_failed_election_enacts_the_top_policy() {
    let mut game = create_5_player_game_with_known_roles();
    let mut cards = vec![Party::Fascist; 11];
    cards.extend([Party::Liberal; 6]);
    stack_deck(&mut game, &cards);

    fail_election(&mut game);
    fail_election(&mut game);
    assert_eq!(game.election_tracker, 2);
    let log = fail_election(&mut game);

    assert!(log.iter().any(|d| d.update == GameUpdate::PolicyEnacted { policy: Party::Liberal, chaos: true }));
    assert_eq!(game.board.liberal_cards, 1);
    assert_eq!(game.election_tracker, 0);
    assert_eq!(game.deck.count(), 16);
    assert_eq!(total_cards(&game), 17);
    assert!(game.last_government.is_none());
    assert_eq!(game.president, 3);
    assert_eq!(game.phase(), Phase::Nomination);
}

#[test]
fn successful_election_resets_the_tracker() {
    let mut game = create_5_player_game_with_known_roles();
    fail_election(&mut game);
    fail_election(&mut game);

    let chancellor = first_eligible(&game);
    run_election(&mut game, chancellor, Vote::Ja);
    assert_eq!(game.election_tracker, 0);
}

#[test]
fn last_chancellor_is_term_limited() {
    let mut game = create_5_player_game_with_known_roles();
    stack_deck(&mut game, &[Party::Liberal; 17]);
    run_election(&mut game, 2, Vote::Ja);
    game.president_discard(0, 0, &mut vec![]).unwrap();
    game.chancellor_discard(2, 0, &mut vec![]).unwrap();

    assert_eq!(game.president, 1);
    let state = game.public_state("TEST");
    let ids = |seats: &[usize]| seats.iter().map(|s| game.players[*s].id).collect::<Vec<_>>();
    assert_eq!(state.eligible_chancellors, ids(&[0, 3, 4]));
    assert_eq!(state.last_elected_president, Some(game.players[0].id));
    assert_eq!(state.last_elected_chancellor, Some(game.players[2].id));
}

#[test]
fn failed_elections_do_not_change_term_limits() {
    let mut game = create_5_player_game_with_known_roles();
    game.last_government = Some(Government { president: 4, chancellor: 3 });
    set_president(&mut game, 0);
    fail_election(&mut game);

    assert_eq!(game.last_government, Some(Government { president: 4, chancellor: 3 }));
    assert_eq!(game.president, 1);
    assert!(game.nominate(1, 3, &mut vec![]).is_err());
}

#[test]
fn president_term_limit_is_optional() {
    for (term_limit, eligible) in [(false, true), (true, false)] {
        let opts = GameOptions {
            president_term_limit: term_limit,
        };
        let mut game = create_game_with_options(7, opts, 5);
        game.last_government = Some(Government { president: 0, chancellor: 1 });
        set_president(&mut game, 2);

        let state = game.public_state("TEST");
        assert_eq!(state.eligible_chancellors.contains(&game.players[0].id), eligible);
        assert!(!state.eligible_chancellors.contains(&game.players[1].id));
    }
}

#[test]
fn president_term_limit_lapses_below_seven_alive() {
    let opts = GameOptions {
        president_term_limit: true,
    };
    let mut game = create_game_with_options(7, opts, 5);
    game.players[6].alive = false;
    game.last_government = Some(Government { president: 0, chancellor: 1 });
    set_president(&mut game, 2);

    assert_eq!(game.num_players_alive(), 6);
    game.nominate(2, 0, &mut vec![]).unwrap();
}

#[test]
fn term_limits_are_waived_when_nobody_else_is_left() {
    let mut game = create_5_player_game_with_known_roles();
    for seat in 2..5 {
        game.players[seat].alive = false;
    }
    game.last_government = Some(Government { president: 1, chancellor: 1 });
    set_president(&mut game, 0);

    game.nominate(0, 1, &mut vec![]).unwrap();
}

//! Elimination brackets: setup validation, bracket progression, multi-game
//! matches, and tiebreak extension.

mod common;

use common::{build_division, controls, init_logging, submit_win};
use tournament_division::{
    add_players, remove_players, set_round_controls, submit_result, Division, DivisionError,
    GameEndReason, GameResult, PairingMethod, Player, RoundControl, StrategyOracle,
};

fn heads_up_division(games_per_round: usize) -> (Division, StrategyOracle) {
    init_logging();
    let mut control = RoundControl::new(PairingMethod::Elimination);
    control.games_per_round = games_per_round;
    build_division(&[("x:Xan", 1600), ("y:Yun", 1500)], vec![control])
}

#[test]
fn roster_must_be_a_power_of_two() {
    init_logging();
    let oracle = StrategyOracle::new();
    let mut division = Division::new("main");
    add_players(
        &mut division,
        &oracle,
        vec![
            Player::new("a:Ava", 1600),
            Player::new("b:Ben", 1500),
            Player::new("c:Cam", 1400),
        ],
    )
    .unwrap();
    assert!(matches!(
        set_round_controls(&mut division, &oracle, controls(PairingMethod::Elimination, 2)),
        Err(DivisionError::InvalidEliminationPlayerCount {
            players: 3,
            expected: 4,
            rounds: 2,
        })
    ));
}

#[test]
fn absurd_round_count_is_rejected_not_overflowed() {
    init_logging();
    let oracle = StrategyOracle::new();
    let mut division = Division::new("main");
    add_players(
        &mut division,
        &oracle,
        vec![Player::new("a:Ava", 1600), Player::new("b:Ben", 1500)],
    )
    .unwrap();
    // No roster can satisfy a 64-round bracket; this must come back as the
    // usual configuration error, not a shift overflow.
    assert!(matches!(
        set_round_controls(&mut division, &oracle, controls(PairingMethod::Elimination, 64)),
        Err(DivisionError::InvalidEliminationPlayerCount {
            players: 2,
            rounds: 64,
            ..
        })
    ));
    assert!(!division.is_started());
    assert_eq!(division.round_count(), 0);
}

#[test]
fn pre_start_roster_changes_keep_the_bracket_size() {
    let (mut division, oracle) = build_division(
        &[("a:Ava", 2000), ("b:Ben", 1900), ("c:Cam", 1800), ("d:Dot", 1700)],
        controls(PairingMethod::Elimination, 2),
    );

    assert!(matches!(
        add_players(&mut division, &oracle, vec![Player::new("e:Eve", 1850)]),
        Err(DivisionError::InvalidEliminationPlayerCount {
            players: 5,
            expected: 4,
            rounds: 2,
        })
    ));
    assert!(matches!(
        remove_players(&mut division, &oracle, &["d:Dot".to_string()]),
        Err(DivisionError::InvalidEliminationPlayerCount {
            players: 3,
            expected: 4,
            rounds: 2,
        })
    ));

    // The division is untouched: still four players, bracket still paired.
    assert_eq!(division.players.len(), 4);
    assert_eq!(division.opponent_of("a:Ava", 0).unwrap(), Some("b:Ben".into()));
}

#[test]
fn elimination_cannot_be_mixed_with_other_methods() {
    init_logging();
    let oracle = StrategyOracle::new();
    let mut division = Division::new("main");
    add_players(
        &mut division,
        &oracle,
        vec![Player::new("a:Ava", 1600), Player::new("b:Ben", 1500)],
    )
    .unwrap();
    let mixed = vec![
        RoundControl::new(PairingMethod::Elimination),
        RoundControl::new(PairingMethod::KingOfTheHill),
    ];
    assert!(matches!(
        set_round_controls(&mut division, &oracle, mixed),
        Err(DivisionError::MixedEliminationControls)
    ));
}

#[test]
fn bracket_advances_winners_and_parks_the_eliminated() {
    let (mut division, oracle) = build_division(
        &[("a:Ava", 2000), ("b:Ben", 1900), ("c:Cam", 1800), ("d:Dot", 1700)],
        controls(PairingMethod::Elimination, 2),
    );
    division.start_round().unwrap();

    submit_win(&mut division, &oracle, 0, "a:Ava", "b:Ben", 400, 300);
    submit_win(&mut division, &oracle, 0, "c:Cam", "d:Dot", 450, 350);

    // Winners meet; the losers' bracket is a synthesized marker with no
    // players and no games.
    assert_eq!(division.opponent_of("a:Ava", 1).unwrap(), Some("c:Cam".into()));
    assert_eq!(division.opponent_of("b:Ben", 1).unwrap(), None);
    let parked = division.pairing_of("b:Ben", 1).unwrap();
    assert_eq!(parked.players, None);
    assert_eq!(parked.outcomes, [GameResult::Eliminated, GameResult::Eliminated]);

    division.start_round().unwrap();
    submit_win(&mut division, &oracle, 1, "a:Ava", "c:Cam", 420, 380);
    assert!(division.is_finished().unwrap());

    // A player eliminated in round k+1 holds exactly k wins.
    let standings = tournament_division::standings(&division, 1, false).unwrap();
    let wins: Vec<(String, u32)> = standings
        .iter()
        .map(|s| (s.player_id.clone(), s.wins))
        .collect();
    assert_eq!(
        wins,
        vec![
            ("a:Ava".to_string(), 2),
            ("c:Cam".to_string(), 1),
            ("b:Ben".to_string(), 0),
            ("d:Dot".to_string(), 0),
        ]
    );
}

#[test]
fn spread_decides_an_exhausted_match() {
    let (mut division, oracle) = heads_up_division(2);
    division.start_round().unwrap();

    submit_win(&mut division, &oracle, 0, "x:Xan", "y:Yun", 500, 300);
    assert!(!division.is_round_complete(0).unwrap());

    submit_result(
        &mut division,
        &oracle,
        0,
        "y:Yun",
        "x:Xan",
        [400, 350],
        [GameResult::Win, GameResult::Loss],
        GameEndReason::Standard,
        false,
        1,
        "",
    )
    .unwrap();

    // One game each; Xan leads the cumulative spread by 150.
    let pairing = division.pairing_of("x:Xan", 0).unwrap();
    let slot = usize::from(pairing.players.unwrap()[1] == division.player_index["x:Xan"]);
    assert_eq!(pairing.outcomes[slot], GameResult::Win);
    assert!(division.is_finished().unwrap());
}

#[test]
fn full_tie_extends_the_match_with_tiebreak_games() {
    let (mut division, oracle) = heads_up_division(2);
    division.start_round().unwrap();

    submit_win(&mut division, &oracle, 0, "x:Xan", "y:Yun", 400, 300);
    submit_result(
        &mut division,
        &oracle,
        0,
        "y:Yun",
        "x:Xan",
        [400, 300],
        [GameResult::Win, GameResult::Loss],
        GameEndReason::Standard,
        false,
        1,
        "",
    )
    .unwrap();

    // Tied on games and on spread: the match stays open.
    assert!(!division.is_round_complete(0).unwrap());

    // A tiebreak game must land at the next free index.
    assert!(matches!(
        submit_result(
            &mut division,
            &oracle,
            0,
            "x:Xan",
            "y:Yun",
            [350, 340],
            [GameResult::Win, GameResult::Loss],
            GameEndReason::Standard,
            false,
            5,
            "",
        ),
        Err(DivisionError::InvalidTiebreakGameIndex { game_index: 5, .. })
    ));

    submit_result(
        &mut division,
        &oracle,
        0,
        "x:Xan",
        "y:Yun",
        [350, 340],
        [GameResult::Win, GameResult::Loss],
        GameEndReason::Standard,
        false,
        2,
        "",
    )
    .unwrap();

    let pairing = division.pairing_of("x:Xan", 0).unwrap();
    assert_eq!(pairing.games.len(), 3);
    assert!(division.is_finished().unwrap());
    let standings = tournament_division::standings(&division, 0, false).unwrap();
    assert_eq!(standings[0].player_id, "x:Xan");
}

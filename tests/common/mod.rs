//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use tournament_division::{
    add_players, submit_result, Division, DivisionError, Edge, GameEndReason, GameResult, Matcher,
    PairingMethod, PairingOracle, Player, RoundControl, StrategyOracle,
};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// One default control per round, all using the same method.
pub fn controls(method: PairingMethod, rounds: usize) -> Vec<RoundControl> {
    (0..rounds).map(|_| RoundControl::new(method)).collect()
}

/// A division loaded with the given `(id, rating)` roster and round
/// controls, not yet started. Uses the built-in oracle.
pub fn build_division(
    players: &[(&str, u32)],
    round_controls: Vec<RoundControl>,
) -> (Division, StrategyOracle) {
    build_division_with_oracle(players, round_controls, StrategyOracle::new())
}

pub fn build_division_with_oracle(
    players: &[(&str, u32)],
    round_controls: Vec<RoundControl>,
    oracle: StrategyOracle,
) -> (Division, StrategyOracle) {
    init_logging();
    let mut division = Division::new("main");
    let roster: Vec<Player> = players
        .iter()
        .map(|(id, rating)| Player::new(*id, *rating))
        .collect();
    add_players(&mut division, &oracle, roster).unwrap();
    tournament_division::set_round_controls(&mut division, &oracle, round_controls).unwrap();
    (division, oracle)
}

/// Submit a plain win/loss result for two paired players.
pub fn submit_win(
    division: &mut Division,
    oracle: &dyn PairingOracle,
    round: usize,
    winner: &str,
    loser: &str,
    winner_score: i32,
    loser_score: i32,
) {
    submit_result(
        division,
        oracle,
        round,
        winner,
        loser,
        [winner_score, loser_score],
        [GameResult::Win, GameResult::Loss],
        GameEndReason::Standard,
        false,
        0,
        "",
    )
    .unwrap();
}

/// Minimum-weight matcher good enough for small test pools: greedily takes
/// the lightest edges first.
pub struct GreedyMatcher;

impl Matcher for GreedyMatcher {
    fn min_weight_matching(
        &self,
        edges: &[Edge],
        vertices: usize,
        _max_cardinality: bool,
    ) -> Result<(Vec<isize>, i64), DivisionError> {
        let mut sorted: Vec<&Edge> = edges.iter().collect();
        sorted.sort_by_key(|e| e.weight);
        let mut pairings = vec![-1isize; vertices];
        let mut weight = 0i64;
        for edge in sorted {
            if pairings[edge.i] == -1 && pairings[edge.j] == -1 {
                pairings[edge.i] = edge.j as isize;
                pairings[edge.j] = edge.i as isize;
                weight += edge.weight;
            }
        }
        Ok((pairings, weight))
    }
}

//! Result submission, amendment, and elimination outcome resolution.

use crate::logic::pairing::pair_round;
use crate::matchmaking::PairingOracle;
use crate::models::{
    Division, DivisionError, GameEndReason, GameResult, PairingMethod, TournamentGame,
};

/// Apply a reported result to the pairing of `player_one` and `player_two`
/// in `round`.
///
/// `scores[0]`/`results[0]` belong to `player_one` regardless of the
/// physical slot order inside the pairing. A past round requires `amend`; a
/// future round only accepts byes/forfeits. For elimination matches,
/// `game_index` addresses one game of the match and an index just past the
/// existing games appends a tiebreak game. Completing a round triggers
/// pairing of the next one (and auto-start when configured).
#[allow(clippy::too_many_arguments)]
pub fn submit_result(
    division: &mut Division,
    oracle: &dyn PairingOracle,
    round: usize,
    player_one: &str,
    player_two: &str,
    scores: [i32; 2],
    results: [GameResult; 2],
    reason: GameEndReason,
    amend: bool,
    game_index: usize,
    game_id: &str,
) -> Result<(), DivisionError> {
    log::debug!(
        "division {} submit result round {}: {} {:?} vs {} {:?} amend={} game_index={}",
        division.name,
        round,
        player_one,
        (scores[0], results[0]),
        player_two,
        (scores[1], results[1]),
        amend,
        game_index
    );

    let key_one = division.pairing_key_of(player_one, round)?;
    let key_two = division.pairing_key_of(player_two, round)?;

    if (round as i32) < division.current_round && !amend {
        return Err(DivisionError::PastRoundNotAmendment(round));
    }
    if (round as i32) > division.current_round
        && (!results[0].is_bye_or_forfeit() || !results[1].is_bye_or_forfeit())
    {
        return Err(DivisionError::FutureRoundNotByeOrForfeit(round));
    }

    let key_one = key_one.ok_or_else(|| DivisionError::UnpairedPlayer {
        player: player_one.to_string(),
        round,
    })?;
    let key_two = key_two.ok_or_else(|| DivisionError::UnpairedPlayer {
        player: player_two.to_string(),
        round,
    })?;
    if key_one != key_two {
        return Err(DivisionError::PlayersNotPaired {
            player_one: player_one.to_string(),
            player_two: player_two.to_string(),
            round,
        });
    }

    let method = division.round_controls[round].pairing_method;
    let games_per_round = division.round_controls[round].games_per_round;
    let player_one_index = division.index_of(player_one)?;

    let pairing = division
        .pairing_map
        .get_mut(&key_one)
        .ok_or(DivisionError::PairingMissing(key_one))?;

    // Elimination only: an index at or past the configured count is either
    // the next tiebreak game or out of range.
    if method == PairingMethod::Elimination && game_index >= games_per_round {
        if game_index != pairing.games.len() {
            return Err(DivisionError::InvalidTiebreakGameIndex {
                player_one: player_one.to_string(),
                player_two: player_two.to_string(),
                round,
                game_index,
            });
        }
        pairing.games.push(TournamentGame::new());
    }

    if game_index >= pairing.games.len() {
        return Err(DivisionError::GameIndexOutOfRange {
            game_index,
            games: pairing.games.len(),
        });
    }

    let aggregate_decided = !pairing.is_undecided();
    let game_decided = pairing.games[game_index].results[0] != GameResult::NoResult
        && pairing.games[game_index].results[1] != GameResult::NoResult;
    let game_absent = pairing.games[game_index].results[0] == GameResult::NoResult
        && pairing.games[game_index].results[1] == GameResult::NoResult;

    if !amend && (aggregate_decided || game_decided) {
        return Err(DivisionError::ResultAlreadySubmitted {
            player_one: player_one.to_string(),
            player_two: player_two.to_string(),
            round,
        });
    }

    // Amending a result that was never submitted is only allowed for
    // forfeit losses (players who showed up late).
    if amend
        && results[0] != GameResult::ForfeitLoss
        && results[1] != GameResult::ForfeitLoss
        && game_absent
    {
        return Err(DivisionError::AmendmentForAbsentResult {
            player_one: player_one.to_string(),
            player_two: player_two.to_string(),
            round,
        });
    }

    // The call arguments may be in either order; resolve player one's
    // physical slot by roster index.
    let slot_one = match pairing.players {
        Some([_, second]) if second == player_one_index => 1,
        _ => 0,
    };
    let slot_two = 1 - slot_one;

    let game_id = if amend && game_id.is_empty() {
        // Keep the id of the game being amended.
        pairing.games[game_index].game_id.clone()
    } else {
        game_id.to_string()
    };

    if method == PairingMethod::Elimination {
        let game = &mut pairing.games[game_index];
        game.scores[slot_one] = scores[0];
        game.scores[slot_two] = scores[1];
        game.results[slot_one] = results[0];
        game.results[slot_two] = results[1];
        game.end_reason = reason;
        game.game_id = game_id;
        pairing.outcomes = elimination_outcomes(&pairing.games, games_per_round);
    } else {
        // Non-elimination rounds only ever have one live game.
        let game = &mut pairing.games[0];
        game.scores[slot_one] = scores[0];
        game.scores[slot_two] = scores[1];
        game.results[slot_one] = results[0];
        game.results[slot_two] = results[1];
        game.end_reason = reason;
        game.game_id = game_id;
        pairing.outcomes[slot_one] = results[0];
        pairing.outcomes[slot_two] = results[1];
    }

    let round_complete = division.is_round_complete(round)?;
    let finished = division.is_finished()?;

    // A fresh submission that completes a round advances the event: pair
    // the next round unless its schedule already exists, then open it when
    // auto-start is on.
    if round_complete && !finished && !amend {
        let next = round + 1;
        let next_method = division.round_controls[next].pairing_method;
        if next_method != PairingMethod::Manual && !next_method.is_standings_independent() {
            pair_round(division, oracle, next, true)?;
        }
        if division.division_controls.auto_start {
            division.start_round()?;
        }
    }

    Ok(())
}

/// Aggregate outcomes of an elimination match from all of its games.
///
/// Wins are scaled (win 2, draw 1). With the configured games exhausted a
/// tied scaled count falls back to cumulative spread; a tie in both leaves
/// the match undecided so further tiebreak games must be submitted.
pub(crate) fn elimination_outcomes(
    games: &[TournamentGame],
    games_per_round: usize,
) -> [GameResult; 2] {
    let mut wins_one: u32 = 0;
    let mut wins_two: u32 = 0;
    let mut spread_one: i32 = 0;
    let mut spread_two: i32 = 0;
    for game in games {
        wins_one += game.results[0].scaled_win_value();
        wins_two += game.results[1].scaled_win_value();
        spread_one += game.scores[0] - game.scores[1];
        spread_two += game.scores[1] - game.scores[0];
    }

    let threshold = games_per_round as u32;
    let mut outcomes = [GameResult::NoResult, GameResult::NoResult];

    if games.len() > games_per_round {
        // Tiebreak games are present; any lead in wins or spread decides.
        if wins_one > wins_two || (wins_one == wins_two && spread_one > spread_two) {
            outcomes = [GameResult::Win, GameResult::Eliminated];
        } else if wins_two > wins_one || (wins_two == wins_one && spread_two > spread_one) {
            outcomes = [GameResult::Eliminated, GameResult::Win];
        }
    } else if wins_one > threshold
        || (wins_one == threshold && wins_two == threshold && spread_one > spread_two)
    {
        outcomes = [GameResult::Win, GameResult::Eliminated];
    } else if wins_two > threshold
        || (wins_one == threshold && wins_two == threshold && spread_one < spread_two)
    {
        outcomes = [GameResult::Eliminated, GameResult::Win];
    }
    outcomes
}

//! Pairing dispatcher: candidate pools, oracle invocation, explicit
//! pairings, and the invariants every paired round must satisfy.

use crate::logic::results::submit_result;
use crate::logic::standings::standings;
use crate::matchmaking::{repeat_key, PairingOracle, PoolMember, RepeatKey};
use crate::models::{
    Division, DivisionError, FirstMethod, GameEndReason, GameResult, Pairing, PairingMethod,
    TournamentGame, BYE_SCORE,
};
use rand::Rng;
use std::collections::{HashMap, HashSet};

/// Pair one round with its configured method.
///
/// Existing pairings in the round are cleared first so re-pairing after an
/// amendment or roster change is idempotent; `overwrite_byes = false`
/// preserves byes a director has already assigned. Candidates are ordered
/// by standings through the previous round (fixed roster order for round
/// robin), the oracle is called once, and its assignments are committed.
/// Oracle failures propagate unchanged.
pub fn pair_round(
    division: &mut Division,
    oracle: &dyn PairingOracle,
    round: usize,
    overwrite_byes: bool,
) -> Result<(), DivisionError> {
    division.check_round(round)?;
    let method = division.round_controls[round].pairing_method;
    log::debug!(
        "division {} pairing round {} with {:?}",
        division.name,
        round,
        method
    );

    let mut players_with_byes: HashSet<usize> = HashSet::new();
    if !overwrite_byes {
        for i in 0..division.players.len() {
            if division.pairing_is_bye(&division.players[i].id.clone(), round)? {
                players_with_byes.insert(i);
            }
        }
    }

    for i in 0..division.players.len() {
        if overwrite_byes || !players_with_byes.contains(&i) {
            division.clear_pairing_key(i, round)?;
        }
    }

    let standings_round = round.saturating_sub(1);
    let current_standings = standings(division, standings_round, false)?;

    // Round robin must see the same ordering every round; everyone else is
    // pooled in standings order with suspended players left out.
    let mut pool: Vec<PoolMember> = Vec::new();
    if method == PairingMethod::RoundRobin {
        for player in &division.players {
            pool.push(PoolMember {
                id: player.id.clone(),
                ..Default::default()
            });
        }
    } else {
        for standing in &current_standings {
            let index = division.index_of(&standing.player_id)?;
            if overwrite_byes || !players_with_byes.contains(&index) {
                pool.push(PoolMember {
                    id: standing.player_id.clone(),
                    wins: standing.wins,
                    draws: standing.draws,
                    spread: standing.spread,
                });
            }
        }
    }

    if division.division_controls.gibsonize {
        pair_gibsonized(division, oracle, round, &mut pool)?;
    }

    let repeats = get_repeats(division, round)?;
    let control = division.round_controls[round].clone();
    let assignments = oracle.pair(&pool, &control, &repeats)?;
    if assignments.len() != pool.len() {
        return Err(DivisionError::OracleCountMismatch {
            got: assignments.len(),
            want: pool.len(),
        });
    }

    let pool_size = pool.len();
    for i in 0..pool_size {
        let player_index = division.index_of(&pool[i].id)?;
        if method != PairingMethod::RoundRobin && division.players[player_index].suspended {
            return Err(DivisionError::SuspendedPlayerPaired {
                player: pool[i].id.clone(),
                round,
            });
        }
        if division.matrix[round][player_index].is_some() {
            continue;
        }

        let opponent_index = match assignments[i] {
            index if index < 0 => player_index,
            index if index as usize >= pool_size => {
                return Err(DivisionError::InvalidOpponentIndex { round, index })
            }
            index => division.index_of(&pool[index as usize].id)?,
        };

        let player_id = division.players[player_index].id.clone();
        let opponent_id = division.players[opponent_index].id.clone();

        if method == PairingMethod::Elimination && round > 0 && i >= pool_size >> round {
            // This bracket was decided in an earlier round; synthesize the
            // marker directly instead of going through set_pairing.
            let key = division.make_pairing_key();
            division.pairing_map.insert(key, eliminated_pairing(round));
            division.matrix[round][player_index] = Some(key);
        } else {
            set_pairing(division, oracle, &player_id, &opponent_id, round)?;
        }
    }

    // Suspended players sit out with forfeit self-pairs; everyone active
    // must have ended up paired.
    for i in 0..division.players.len() {
        let player_id = division.players[i].id.clone();
        let suspended = division.players[i].suspended;
        let paired = division.matrix[round][i].is_some();
        if method != PairingMethod::RoundRobin && suspended && paired {
            return Err(DivisionError::SuspendedPlayerPaired {
                player: player_id,
                round,
            });
        }
        if !suspended && !paired {
            return Err(DivisionError::ActivePlayerUnpaired {
                player: player_id,
                round,
            });
        }
        if method != PairingMethod::RoundRobin && suspended {
            set_pairing(division, oracle, &player_id, &player_id, round)?;
        }
    }

    validate_pairings(division, round)
}

/// Assign two players to each other for one round, un-pairing their
/// previous opponents first. Byes and pairings involving a suspended player
/// have their result submitted immediately.
pub fn set_pairing(
    division: &mut Division,
    oracle: &dyn PairingOracle,
    player_one: &str,
    player_two: &str,
    round: usize,
) -> Result<(), DivisionError> {
    let player_one_index = division.index_of(player_one)?;
    let player_two_index = division.index_of(player_two)?;

    let player_one_opponent = division.opponent_of(player_one, round)?;
    let player_two_opponent = division.opponent_of(player_two, round)?;

    if let Some(opponent) = &player_one_opponent {
        let index = division.index_of(opponent)?;
        division.clear_pairing_key(index, round)?;
    }
    if let Some(opponent) = &player_two_opponent {
        let index = division.index_of(opponent)?;
        division.clear_pairing_key(index, round)?;
    }

    let pairing = new_pairing(division, player_one_index, player_two_index, round);
    let key = division.make_pairing_key();
    division.pairing_map.insert(key, pairing);
    division.set_pairing_key(player_one, round, key)?;
    division.set_pairing_key(player_two, round, key)?;

    let player_one_suspended = division.players[player_one_index].suspended;
    let player_two_suspended = division.players[player_two_index].suspended;

    // A bye or a forfeit needs no director: submit the result right away.
    if player_one == player_two || player_one_suspended || player_two_suspended {
        let controls = &division.division_controls;
        let (scores, results) = if player_one == player_two {
            if player_one_suspended {
                (
                    [controls.suspended_spread, 0],
                    [controls.suspended_result, controls.suspended_result],
                )
            } else {
                ([BYE_SCORE, 0], [GameResult::Bye, GameResult::Bye])
            }
        } else {
            let mut scores = [0, 0];
            let mut results = [GameResult::ForfeitWin, GameResult::ForfeitWin];
            if player_one_suspended {
                scores[0] = controls.suspended_spread;
                results[0] = controls.suspended_result;
            }
            if player_two_suspended {
                scores[1] = controls.suspended_spread;
                results[1] = controls.suspended_result;
            }
            (scores, results)
        };

        // Passing round < current_round as the amend flag satisfies the
        // amendment guard; these results always need to be submitted.
        submit_result(
            division,
            oracle,
            round,
            player_one,
            player_two,
            scores,
            results,
            GameEndReason::None,
            (round as i32) < division.current_round,
            0,
            "",
        )?;
    }
    Ok(())
}

/// Unpair an entire round (director reset before manual pairing).
pub fn delete_pairings(division: &mut Division, round: usize) -> Result<(), DivisionError> {
    division.check_round(round)?;
    for i in 0..division.matrix[round].len() {
        division.clear_pairing_key(i, round)?;
    }
    Ok(())
}

/// Build a live pairing, choosing who goes first per the round's first-move
/// method.
fn new_pairing(
    division: &mut Division,
    player_one: usize,
    player_two: usize,
    round: usize,
) -> Pairing {
    let games = vec![TournamentGame::new(); division.round_controls[round].games_per_round];

    let mut going_first = player_one;
    let mut going_second = player_two;
    let first_method = division.round_controls[round].first_method;

    let mut switch_first = false;
    if first_method != FirstMethod::Manual {
        let one = division.firsts_and_seconds(going_first, round as i32 - 1);
        let two = division.firsts_and_seconds(going_second, round as i32 - 1);
        switch_first = match first_method {
            FirstMethod::Random => rand::thread_rng().gen::<bool>(),
            _ => {
                if one[0] != two[0] {
                    one[0] > two[0]
                } else if one[1] != two[1] {
                    one[1] < two[1]
                } else {
                    rand::thread_rng().gen::<bool>()
                }
            }
        };
    }
    if switch_first {
        std::mem::swap(&mut going_first, &mut going_second);
    }

    Pairing {
        players: Some([going_first, going_second]),
        games,
        outcomes: [GameResult::NoResult, GameResult::NoResult],
        ready_states: [String::new(), String::new()],
        round,
    }
}

/// Marker pairing for a bracket whose participants were both eliminated in
/// an earlier round. `players` stays `None` so the invariant checker can
/// tell it apart from a real pairing.
fn eliminated_pairing(round: usize) -> Pairing {
    Pairing {
        players: None,
        games: Vec::new(),
        outcomes: [GameResult::Eliminated, GameResult::Eliminated],
        ready_states: [String::new(), String::new()],
        round,
    }
}

/// Count prior meetings of every unordered player pair in rounds before
/// `round`.
pub(crate) fn get_repeats(
    division: &Division,
    round: usize,
) -> Result<HashMap<RepeatKey, usize>, DivisionError> {
    if round > division.matrix.len() {
        return Err(DivisionError::RoundOutOfRange(round));
    }
    let mut repeats: HashMap<RepeatKey, usize> = HashMap::new();
    for r in 0..round {
        for cell in &division.matrix[r] {
            let pairing = match cell.and_then(|key| division.pairing_map.get(&key)) {
                Some(pairing) => pairing,
                None => continue,
            };
            if let Some([one, two]) = pairing.players {
                if one != two {
                    let key = repeat_key(&division.players[one].id, &division.players[two].id);
                    *repeats.entry(key).or_insert(0) += 1;
                }
            }
        }
    }
    // Every meeting was counted from both cells; halve the tallies.
    for count in repeats.values_mut() {
        *count /= 2;
    }
    Ok(repeats)
}

/// Pair gibsonized leaders (players whose placement can no longer be
/// caught) against each other or against non-contenders, removing both
/// from the pool before the oracle runs.
fn pair_gibsonized(
    division: &mut Division,
    oracle: &dyn PairingOracle,
    round: usize,
    pool: &mut Vec<PoolMember>,
) -> Result<(), DivisionError> {
    if pool.len() < 2 {
        return Ok(());
    }
    let minimum_placement = division
        .division_controls
        .minimum_placement
        .min(pool.len() - 1);

    let mut gibson_rank: Option<usize> = None;
    for i in 0..pool.len() - 1 {
        if !can_catch(division, pool, round, i, i + 1)? {
            gibson_rank = Some(i);
        } else {
            break;
        }
    }

    let gibson_rank = match gibson_rank {
        Some(rank) => rank,
        None => return Ok(()),
    };

    let mut gibson_paired: HashSet<usize> = HashSet::new();
    for i in 0..=gibson_rank {
        let mut player_one = None;
        let mut player_two = None;
        if i % 2 == 1 {
            player_one = Some(i - 1);
            player_two = Some(i);
        } else if i == gibson_rank {
            // Pair the odd leader down against someone who can no longer
            // reach the paying placements, or failing that, last place.
            for j in i + 1..pool.len() {
                if !can_catch(division, pool, round, minimum_placement, j)? || j == pool.len() - 1 {
                    player_one = Some(i);
                    player_two = Some(j);
                    break;
                }
            }
        }
        if let (Some(one), Some(two)) = (player_one, player_two) {
            gibson_paired.insert(one);
            gibson_paired.insert(two);
            let one_id = pool[one].id.clone();
            let two_id = pool[two].id.clone();
            set_pairing(division, oracle, &one_id, &two_id, round)?;
        }
    }

    if !gibson_paired.is_empty() {
        let mut index = 0;
        pool.retain(|_| {
            let keep = !gibson_paired.contains(&index);
            index += 1;
            keep
        });
    }
    Ok(())
}

/// Whether the player ranked `behind` can still catch the player ranked
/// `ahead` given the rounds left to play.
fn can_catch(
    division: &Division,
    pool: &[PoolMember],
    round: usize,
    ahead: usize,
    behind: usize,
) -> Result<bool, DivisionError> {
    if ahead >= pool.len() || behind >= pool.len() {
        return Err(DivisionError::RoundOutOfRange(round));
    }
    let remaining_rounds = (division.matrix.len() - round) as i64;
    let ahead_wins = pool[ahead].wins as i64 * 2 + pool[ahead].draws as i64;
    let behind_wins = pool[behind].wins as i64 * 2 + pool[behind].draws as i64;
    let win_difference = ahead_wins - behind_wins;
    let surmountable = win_difference <= remaining_rounds * 2;
    let barely_catchable = win_difference == remaining_rounds * 2;
    if !barely_catchable || division.division_controls.gibson_spread == 0 {
        Ok(surmountable)
    } else {
        let spread_gap = pool[ahead].spread as i64 - pool[behind].spread as i64;
        Ok(spread_gap <= division.division_controls.gibson_spread as i64 * remaining_rounds)
    }
}

/// Every cell of the round must reference a pairing, and each player's
/// opponent's opponent must be the player themself. Eliminated-bracket
/// markers are the one legitimate `players == None` case.
fn validate_pairings(division: &Division, round: usize) -> Result<(), DivisionError> {
    division.check_round(round)?;
    for (i, cell) in division.matrix[round].iter().enumerate() {
        let player_id = &division.players[i].id;
        let key = cell.ok_or_else(|| DivisionError::ActivePlayerUnpaired {
            player: player_id.clone(),
            round,
        })?;
        let pairing = division
            .pairing_map
            .get(&key)
            .ok_or(DivisionError::PairingMissing(key))?;
        if pairing.players.is_none() {
            if division.round_controls[0].pairing_method != PairingMethod::Elimination {
                return Err(DivisionError::ActivePlayerUnpaired {
                    player: player_id.clone(),
                    round,
                });
            }
            continue;
        }
        let opponent = division.opponent_of(player_id, round)?.ok_or_else(|| {
            DivisionError::ActivePlayerUnpaired {
                player: player_id.clone(),
                round,
            }
        })?;
        let opponent_opponent = division.opponent_of(&opponent, round)?.unwrap_or_default();
        if *player_id != opponent_opponent {
            return Err(DivisionError::AsymmetricPairing {
                player: player_id.clone(),
                opponent,
                opponent_opponent,
            });
        }
    }
    Ok(())
}

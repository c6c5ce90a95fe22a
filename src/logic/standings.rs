//! Standings calculator with method-dependent ordering.

use crate::models::{Division, DivisionError, GameResult, PairingMethod, PlayerStanding};

/// Compute standings through `round` (inclusive) from the pairing arena.
///
/// Wins, byes and forfeit wins count as wins; draws as draws; everything
/// else with a decided aggregate outcome as a loss. Spread sums each game's
/// score differential, with the division's spread cap applied per game and
/// double forfeits scored at the configured suspended spread.
///
/// Elimination standings keep the bracket: wins descending with ties left
/// in roster order. All other methods order by wins, draws and spread
/// descending, then roster index ascending for determinism.
pub fn standings(
    division: &Division,
    round: usize,
    include_suspended: bool,
) -> Result<Vec<PlayerStanding>, DivisionError> {
    division.check_round(round)?;

    let mut records: Vec<PlayerStanding> = Vec::new();
    for (i, player) in division.players.iter().enumerate() {
        if player.suspended && !include_suspended {
            continue;
        }
        let mut record = PlayerStanding {
            player_id: player.id.clone(),
            ..Default::default()
        };
        for r in 0..=round {
            let pairing = match division.matrix[r][i].and_then(|k| division.pairing_map.get(&k)) {
                Some(pairing) => pairing,
                None => continue,
            };
            let players = match pairing.players {
                Some(players) => players,
                None => continue,
            };
            let slot = if division.players[players[1]].id == player.id {
                1
            } else {
                0
            };
            if pairing.outcomes[slot] == GameResult::NoResult {
                continue;
            }
            match pairing.outcomes[slot].scaled_win_value() {
                2 => record.wins += 1,
                1 => record.draws += 1,
                _ => record.losses += 1,
            }
            for game in &pairing.games {
                let mut spread = game.scores[slot] - game.scores[1 - slot];
                // A double forfeit has no real scores to subtract from
                // either side, so both get the suspended spread.
                if pairing.outcomes[0] == GameResult::ForfeitLoss
                    && pairing.outcomes[1] == GameResult::ForfeitLoss
                {
                    spread = division.division_controls.suspended_spread;
                }
                let cap = division.division_controls.spread_cap;
                if cap > 0 {
                    spread = spread.clamp(-cap, cap);
                }
                record.spread += spread;
            }
        }
        records.push(record);
    }

    let pairing_method = division.round_controls[round].pairing_method;
    if pairing_method == PairingMethod::Elimination {
        // The roster order is the bracket; a stable sort on wins alone
        // keeps groupings intact across rounds.
        records.sort_by(|a, b| b.wins.cmp(&a.wins));
    } else {
        records.sort_by(|a, b| {
            b.wins
                .cmp(&a.wins)
                .then(b.draws.cmp(&a.draws))
                .then(b.spread.cmp(&a.spread))
                // Roster index ascending, opposite in direction to the
                // fields above. Intentional: ties resolve to the higher seed.
                .then_with(|| {
                    division.player_index[&a.player_id].cmp(&division.player_index[&b.player_id])
                })
        });
    }
    Ok(records)
}

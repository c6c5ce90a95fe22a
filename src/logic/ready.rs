//! Ready-state tracker: the per-pairing readiness handshake that gates
//! live game start.

use crate::models::{Division, DivisionError};

/// Record (or clear, with `unready`) `conn_id` as `player_id`'s readiness
/// for their current-round game.
///
/// Returns the two `"<playerid>:<connid>"` entries for the pairing and
/// whether both sides are now ready; an unpaired player yields an empty
/// list. Only the current round accepts readiness updates.
pub fn set_ready_for_game(
    division: &mut Division,
    player_id: &str,
    conn_id: &str,
    round: usize,
    unready: bool,
) -> Result<(Vec<String>, bool), DivisionError> {
    division.check_round(round)?;
    if division.current_round != round as i32 {
        return Err(DivisionError::WrongRound {
            current: division.current_round,
            round,
        });
    }
    let to_set = if unready { "" } else { conn_id };

    let key = match division.pairing_key_of(player_id, round)? {
        Some(key) => key,
        None => return Ok((Vec::new(), false)),
    };
    let pairing = division
        .pairing_map
        .get(&key)
        .ok_or(DivisionError::PairingMissing(key))?;
    let players = match pairing.players {
        Some(players) => players,
        None => return Ok((Vec::new(), false)),
    };
    let ids = [
        division.players[players[0]].id.clone(),
        division.players[players[1]].id.clone(),
    ];

    let pairing = division
        .pairing_map
        .get_mut(&key)
        .ok_or(DivisionError::PairingMissing(key))?;
    for slot in 0..2 {
        if ids[slot] == player_id {
            pairing.ready_states[slot] = to_set.to_string();
        }
    }

    let involved = vec![
        format!("{}:{}", ids[0], pairing.ready_states[0]),
        format!("{}:{}", ids[1], pairing.ready_states[1]),
    ];
    let both_ready = !pairing.ready_states[0].is_empty() && !pairing.ready_states[1].is_empty();
    Ok((involved, both_ready))
}

/// Reset both sides' readiness on `player_id`'s pairing, used when an
/// offered game is aborted and must be re-offered.
pub fn clear_ready_states(
    division: &mut Division,
    player_id: &str,
    round: usize,
) -> Result<(), DivisionError> {
    division.check_round(round)?;
    let key = division.pairing_key_of(player_id, round)?.ok_or_else(|| {
        DivisionError::UnpairedPlayer {
            player: player_id.to_string(),
            round,
        }
    })?;
    let pairing = division
        .pairing_map
        .get_mut(&key)
        .ok_or(DivisionError::PairingMissing(key))?;
    pairing.ready_states = [String::new(), String::new()];
    Ok(())
}

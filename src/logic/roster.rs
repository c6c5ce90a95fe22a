//! Roster mutation: adding and removing players before and during the event.

use crate::logic::controls::{check_elimination_player_count, prepair};
use crate::logic::pairing::{pair_round, set_pairing};
use crate::matchmaking::PairingOracle;
use crate::models::{Division, DivisionError, PairingMethod, Player, PlayerId};
use std::collections::{HashMap, HashSet};

fn rebuild_index(division: &mut Division) {
    division.player_index = division
        .players
        .iter()
        .enumerate()
        .map(|(i, p)| (p.id.clone(), i))
        .collect::<HashMap<PlayerId, usize>>();
}

fn sort_by_rating(division: &mut Division) {
    division.players.sort_by(|a, b| b.rating.cmp(&a.rating));
}

/// Add players to the division.
///
/// Before the event starts this is a plain roster edit: re-sort by rating,
/// rebuild the matrix, and redo the up-front pairings. After the start, new
/// players join suspended and receive retroactive forfeits for every round
/// up to the current one, then become active; previously removed players
/// may rejoin the same way (without new retroactive forfeits).
pub fn add_players(
    division: &mut Division,
    oracle: &dyn PairingOracle,
    players: Vec<Player>,
) -> Result<(), DivisionError> {
    let mut brand_new: HashSet<PlayerId> = HashSet::new();
    for player in &players {
        match division.player_index.get(&player.id) {
            Some(&index) => {
                if !division.players[index].suspended || !division.is_started() {
                    return Err(DivisionError::PlayerAlreadyExists(player.id.clone()));
                }
            }
            None => {
                brand_new.insert(player.id.clone());
            }
        }
    }

    log::debug!(
        "division {} adding {} player(s), {} brand new",
        division.name,
        players.len(),
        brand_new.len()
    );

    if !division.is_started() {
        check_elimination_player_count(
            &division.round_controls,
            division.players.len() + players.len(),
        )?;
        division.players.extend(players);
        sort_by_rating(division);
        rebuild_index(division);
        let rounds = division.round_controls.len();
        division.matrix = vec![vec![None; division.players.len()]; rounds];
        return prepair(division, oracle);
    }

    let current = division.current_round as usize;
    if current == division.matrix.len() - 1 {
        return Err(DivisionError::LastRoundStarted(current));
    }

    let mut added_ids: Vec<PlayerId> = Vec::new();
    for player in players {
        if !division.player_index.contains_key(&player.id) {
            division
                .player_index
                .insert(player.id.clone(), division.players.len());
            division.players.push(player.clone());
        }
        let index = division.player_index[&player.id];
        // Temporarily suspended so past rounds record the proper late-join
        // results.
        division.players[index].suspended = true;
        added_ids.push(player.id);
    }

    for row in division.matrix.iter_mut() {
        row.resize(division.players.len(), None);
    }

    for round in 0..division.matrix.len() {
        if round <= current {
            for id in &added_ids {
                // Rejoining players already carry their removal forfeits;
                // only brand new players need the back-filled rounds.
                if brand_new.contains(id) {
                    set_pairing(division, oracle, id, id, round)?;
                }
                if round == current {
                    let index = division.player_index[id];
                    division.players[index].suspended = false;
                }
            }
        } else {
            let method = division.round_controls[round].pairing_method;
            if (round == current + 1 || method.is_standings_independent())
                && method != PairingMethod::Manual
            {
                pair_round(division, oracle, round, true)?;
            }
        }
    }
    Ok(())
}

/// Remove players from the division.
///
/// Before the start the players are dropped outright. Afterwards they are
/// suspended (kept in the roster for historical standings) and all
/// standings-dependent future rounds are re-paired; removal fails when it
/// would leave too few active players.
pub fn remove_players(
    division: &mut Division,
    oracle: &dyn PairingOracle,
    ids: &[PlayerId],
) -> Result<(), DivisionError> {
    for id in ids {
        let index = division.index_of(id)?;
        if division.players[index].suspended {
            return Err(DivisionError::PlayerAlreadyRemoved(id.clone()));
        }
    }

    log::debug!("division {} removing {} player(s)", division.name, ids.len());

    if !division.is_started() {
        let distinct: HashSet<&PlayerId> = ids.iter().collect();
        check_elimination_player_count(
            &division.round_controls,
            division.players.len() - distinct.len(),
        )?;
        division.players.retain(|p| !ids.contains(&p.id));
        sort_by_rating(division);
        rebuild_index(division);
        let rounds = division.round_controls.len();
        division.matrix = vec![vec![None; division.players.len()]; rounds];
        return prepair(division, oracle);
    }

    let already_removed = division.players.iter().filter(|p| p.suspended).count();
    if already_removed + ids.len() >= division.players.len() {
        return Err(DivisionError::RemovalWouldEmptyDivision);
    }

    for player in division.players.iter_mut() {
        if ids.contains(&player.id) {
            player.suspended = true;
        }
    }

    let current = division.current_round as usize;
    for round in current + 1..division.matrix.len() {
        let method = division.round_controls[round].pairing_method;
        if (round == current + 1 || method.is_standings_independent())
            && method != PairingMethod::Manual
        {
            pair_round(division, oracle, round, true)?;
        }
    }
    Ok(())
}

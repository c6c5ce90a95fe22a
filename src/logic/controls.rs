//! Round-control validation and pre-start pairing.

use crate::logic::pairing::pair_round;
use crate::matchmaking::PairingOracle;
use crate::models::{Division, DivisionControls, DivisionError, PairingMethod, RoundControl};

/// Replace the division's cross-round settings.
pub fn set_division_controls(
    division: &mut Division,
    controls: DivisionControls,
) -> Result<(), DivisionError> {
    log::debug!("division {} controls updated: {:?}", division.name, controls);
    division.division_controls = controls;
    Ok(())
}

/// Set the per-round configuration for the whole event, one control per
/// round. Only valid before the event starts. On success the pairing matrix
/// is allocated and every round that can be paired up front is.
pub fn set_round_controls(
    division: &mut Division,
    oracle: &dyn PairingOracle,
    mut controls: Vec<RoundControl>,
) -> Result<(), DivisionError> {
    let number_of_rounds = controls.len();
    let number_of_players = division.players.len();

    if number_of_rounds == 0 {
        return Err(DivisionError::EmptyRoundControls);
    }
    if division.is_started() {
        return Err(DivisionError::ControlsAfterStart);
    }

    let is_elimination = controls
        .iter()
        .any(|c| c.pairing_method == PairingMethod::Elimination);
    if is_elimination
        && controls
            .iter()
            .any(|c| c.pairing_method != PairingMethod::Elimination)
    {
        return Err(DivisionError::MixedEliminationControls);
    }

    let initial_fontes = controls
        .iter()
        .map(|c| c.initial_fontes)
        .max()
        .unwrap_or(0);
    if initial_fontes > 0 && initial_fontes % 2 == 0 {
        return Err(DivisionError::EvenInitialFontes {
            rounds: initial_fontes,
        });
    }

    check_elimination_player_count(&controls, number_of_players)?;

    for (i, control) in controls.iter_mut().enumerate() {
        control.round = i;
        control.initial_fontes = initial_fontes;
    }

    division.round_controls = controls;
    division.matrix = vec![vec![None; number_of_players]; number_of_rounds];
    prepair(division, oracle)
}

/// An elimination event requires exactly n rounds and 2^n players. Checked
/// at setup and again on pre-start roster changes. A round count too large
/// for 2^n to be representable can never match a real roster and is
/// rejected through the same error.
pub(crate) fn check_elimination_player_count(
    round_controls: &[RoundControl],
    number_of_players: usize,
) -> Result<(), DivisionError> {
    let is_elimination = round_controls
        .first()
        .is_some_and(|c| c.pairing_method == PairingMethod::Elimination);
    if !is_elimination {
        return Ok(());
    }
    let number_of_rounds = round_controls.len();
    let expected = 1usize.checked_shl(number_of_rounds as u32);
    if expected != Some(number_of_players) {
        return Err(DivisionError::InvalidEliminationPlayerCount {
            players: number_of_players,
            expected: expected.unwrap_or(0),
            rounds: number_of_rounds,
        });
    }
    Ok(())
}

/// Replace a single round's control, keeping the stamped round number and
/// initial Fontes segment.
pub fn set_single_round_controls(
    division: &mut Division,
    round: usize,
    mut controls: RoundControl,
) -> Result<(), DivisionError> {
    division.check_round(round)?;
    controls.round = division.round_controls[round].round;
    controls.initial_fontes = division.round_controls[round].initial_fontes;
    division.round_controls[round] = controls;
    Ok(())
}

/// Pair every round whose schedule does not depend on standings: round 0
/// (unless manual) plus all standings-independent rounds. Called whenever
/// the pre-start roster or controls change.
pub(crate) fn prepair(
    division: &mut Division,
    oracle: &dyn PairingOracle,
) -> Result<(), DivisionError> {
    division.pairing_map.clear();
    for row in division.matrix.iter_mut() {
        for cell in row.iter_mut() {
            *cell = None;
        }
    }
    if !division.is_startable() {
        return Ok(());
    }

    let number_of_players = division.players.len();
    for round in 0..division.round_controls.len() {
        let method = division.round_controls[round].pairing_method;
        let initial_fontes = division.round_controls[round].initial_fontes;
        // Initial Fontes rounds cannot be paired while the roster is
        // smaller than the segment itself.
        if number_of_players < initial_fontes + 1 {
            continue;
        }
        if method == PairingMethod::Manual {
            continue;
        }
        if round == 0 || method.is_standings_independent() {
            pair_round(division, oracle, round, true)?;
        }
    }
    Ok(())
}

/// Rewind the event to before round 0, keeping roster and controls, and
/// redo the up-front pairings.
pub fn reset_to_beginning(
    division: &mut Division,
    oracle: &dyn PairingOracle,
) -> Result<(), DivisionError> {
    division.current_round = -1;
    prepair(division, oracle)
}

//! Division operations: controls, pairing, results, standings, roster,
//! and readiness.

mod controls;
mod pairing;
mod ready;
mod results;
mod roster;
mod standings;

pub use controls::{
    reset_to_beginning, set_division_controls, set_round_controls, set_single_round_controls,
};
pub use pairing::{delete_pairings, pair_round, set_pairing};
pub use ready::{clear_ready_states, set_ready_for_game};
pub use results::submit_result;
pub use roster::{add_players, remove_players};
pub use standings::standings;

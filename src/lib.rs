//! Tournament division pairing and results engine.
//!
//! One [`Division`] tracks a group of players through a multi-round event:
//! round-by-round pairings, reported results, standings, and the
//! round-advancement state machine. Seven pairing methods share the same
//! state representation; the Swiss method's weighted-matching solver is
//! supplied externally through the [`Matcher`] trait.
//!
//! The division performs no I/O and no locking of its own. The owning
//! service serializes access, persists the division after each mutation,
//! and feeds in results from the gameplay engine.

pub mod logic;
pub mod matchmaking;
pub mod models;

pub use logic::{
    add_players, clear_ready_states, delete_pairings, pair_round, remove_players,
    reset_to_beginning, set_division_controls, set_pairing, set_ready_for_game,
    set_round_controls, set_single_round_controls, standings, submit_result,
};
pub use matchmaking::{
    repeat_key, Edge, Matcher, PairingOracle, PoolMember, RepeatKey, StrategyOracle,
};
pub use models::{
    Division, DivisionControls, DivisionError, DivisionId, FirstMethod, GameEndReason, GameResult,
    Pairing, PairingKey, PairingMethod, Player, PlayerId, PlayerStanding, RoundControl,
    TournamentGame, BYE_SCORE,
};

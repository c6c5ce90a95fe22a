//! Data structures for the division engine: players, pairings, controls,
//! and the division state itself.

mod controls;
mod division;
mod game;
mod player;

pub use controls::{DivisionControls, FirstMethod, PairingMethod, RoundControl};
pub use division::{Division, DivisionError, DivisionId};
pub use game::{GameEndReason, GameResult, Pairing, PairingKey, TournamentGame, BYE_SCORE};
pub use player::{Player, PlayerId, PlayerStanding};

//! Round and division configuration.

use crate::models::game::GameResult;
use serde::{Deserialize, Serialize};

/// How a round's pairings are produced.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PairingMethod {
    /// The director makes every pairing by hand.
    #[default]
    Manual,
    Random,
    RoundRobin,
    KingOfTheHill,
    /// Pair rank i with rank i+factor within each block of 2*factor.
    Factor,
    /// Repeat-avoiding weighted matching; needs an external solver.
    Swiss,
    /// Single-elimination bracket with multi-game matches.
    Elimination,
}

impl PairingMethod {
    /// Methods whose full schedule is known before any results exist.
    /// These rounds are paired once at setup and never re-paired by the
    /// round-advancement cascade.
    pub fn is_standings_independent(self) -> bool {
        matches!(self, PairingMethod::RoundRobin)
    }
}

/// How the first-moving player of a pairing is chosen.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FirstMethod {
    /// Keep the order the pairing was made in.
    #[default]
    Manual,
    /// Coin flip.
    Random,
    /// Balance firsts and seconds across prior rounds.
    Automatic,
}

/// Per-round configuration, validated once at setup.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct RoundControl {
    pub pairing_method: PairingMethod,
    pub first_method: FirstMethod,
    pub games_per_round: usize,
    /// Stamped by `set_round_controls`; position of this control.
    pub round: usize,
    /// For Factor pairing: pair rank i with rank i+factor.
    pub factor: usize,
    /// Meetings allowed between two players before the repeat weight kicks in.
    pub max_repeats: usize,
    /// Soft cap: weigh repeats over the max instead of forbidding them.
    pub allow_over_max_repeats: bool,
    pub repeat_relative_weight: usize,
    pub win_difference_relative_weight: usize,
    /// Length of the initial Fontes head segment; must be odd when non-zero.
    /// Stamped uniformly across all controls by `set_round_controls`.
    pub initial_fontes: usize,
}

impl RoundControl {
    /// A control for the given method with the defaults used by most events:
    /// one game per round, automatic firsts, hard single-repeat cap.
    pub fn new(pairing_method: PairingMethod) -> Self {
        Self {
            pairing_method,
            first_method: FirstMethod::Automatic,
            games_per_round: 1,
            round: 0,
            factor: 0,
            max_repeats: 1,
            allow_over_max_repeats: true,
            repeat_relative_weight: 1,
            win_difference_relative_weight: 1,
            initial_fontes: 0,
        }
    }
}

/// Cross-round division settings.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct DivisionControls {
    /// Aggregate result recorded for a suspended player's forced self-pairing.
    pub suspended_result: GameResult,
    /// Spread recorded for the suspended side of a forced pairing.
    pub suspended_spread: i32,
    /// Open the next round automatically once the previous one completes.
    pub auto_start: bool,
    /// Clamp per-game spread contributions to +/- this value; 0 disables.
    pub spread_cap: i32,
    /// Pair runaway leaders against players out of contention.
    pub gibsonize: bool,
    /// Spread margin used when a lead is exactly catchable by wins alone.
    pub gibson_spread: i32,
    /// Lowest placement that pays out; gibsonized leaders are paired
    /// against players who can no longer reach it.
    pub minimum_placement: usize,
}

impl Default for DivisionControls {
    fn default() -> Self {
        Self {
            suspended_result: GameResult::ForfeitLoss,
            suspended_spread: -50,
            auto_start: false,
            spread_cap: 0,
            gibsonize: false,
            gibson_spread: 0,
            minimum_placement: 0,
        }
    }
}

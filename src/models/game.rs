//! Games, results, and the shared Pairing record.

use serde::{Deserialize, Serialize};

/// Synthetic identifier for a pairing. Monotonically increasing per
/// division; two matrix cells in the same round share the key of the
/// pairing that joins them.
pub type PairingKey = usize;

/// Score for the non-bye side of a self-pairing.
pub const BYE_SCORE: i32 = 50;

/// Result of a single tournament game from one player's perspective.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameResult {
    #[default]
    NoResult,
    Win,
    Loss,
    Draw,
    Bye,
    ForfeitWin,
    ForfeitLoss,
    /// Knocked out of an elimination bracket; also marks whole pairings
    /// between players already out of contention.
    Eliminated,
    Void,
}

impl GameResult {
    /// True for results that may be submitted for a round that has not
    /// started yet.
    pub fn is_bye_or_forfeit(self) -> bool {
        matches!(
            self,
            GameResult::Bye | GameResult::ForfeitWin | GameResult::ForfeitLoss
        )
    }

    /// Scaled score for win accounting: 2 for any kind of win, 1 for a
    /// draw, 0 otherwise.
    pub(crate) fn scaled_win_value(self) -> u32 {
        match self {
            GameResult::Win | GameResult::Bye | GameResult::ForfeitWin => 2,
            GameResult::Draw => 1,
            _ => 0,
        }
    }
}

/// How a game ended, as reported by the gameplay engine.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameEndReason {
    #[default]
    None,
    Standard,
    Resigned,
    TimedOut,
    Abandoned,
}

/// One game between the two players of a pairing. Scores and results are
/// indexed by the players' physical slots within the pairing.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TournamentGame {
    pub scores: [i32; 2],
    pub results: [GameResult; 2],
    pub end_reason: GameEndReason,
    /// External game id assigned by the gameplay engine; empty until known.
    pub game_id: String,
}

impl TournamentGame {
    pub fn new() -> Self {
        Self {
            scores: [0, 0],
            results: [GameResult::NoResult, GameResult::NoResult],
            end_reason: GameEndReason::None,
            game_id: String::new(),
        }
    }
}

impl Default for TournamentGame {
    fn default() -> Self {
        Self::new()
    }
}

/// The record of two players' match for one round: all games played between
/// them, the aggregate outcome per side, and the readiness handshake state.
///
/// Stored once in the division's pairing arena; both participants' matrix
/// cells reference it by key.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Pairing {
    /// The two roster indices, first-moving player first. Equal indices are
    /// a bye. `None` marks a synthesized pairing between players already
    /// eliminated from a bracket.
    pub players: Option<[usize; 2]>,
    /// `games_per_round` entries for the round; elimination tiebreak games
    /// are appended past the configured count.
    pub games: Vec<TournamentGame>,
    /// Aggregate result per slot; `NoResult` until decided.
    pub outcomes: [GameResult; 2],
    /// Connection id per slot for the live-game readiness handshake; empty
    /// string means not ready.
    pub ready_states: [String; 2],
    pub round: usize,
}

impl Pairing {
    /// True when either side's aggregate outcome is still undecided.
    pub fn is_undecided(&self) -> bool {
        self.outcomes[0] == GameResult::NoResult || self.outcomes[1] == GameResult::NoResult
    }

    /// True when this pairing is a bye (a player paired with themself).
    pub fn is_bye(&self) -> bool {
        matches!(self.players, Some([a, b]) if a == b)
    }
}

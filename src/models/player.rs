//! Player and PlayerStanding data structures.

use serde::{Deserialize, Serialize};

/// Unique identifier for a player. Opaque to the engine; by convention
/// `<userid>:<displayname>`.
pub type PlayerId = String;

/// A player in the division roster.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub rating: u32,
    /// Excluded from active pairing (removed mid-event or joined late);
    /// kept in the roster for historical standings.
    pub suspended: bool,
}

impl Player {
    /// Create a new active player with the given id and rating.
    pub fn new(id: impl Into<PlayerId>, rating: u32) -> Self {
        Self {
            id: id.into(),
            rating,
            suspended: false,
        }
    }
}

/// One row of the standings for a round. Derived from the pairing map on
/// each query, never stored.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct PlayerStanding {
    pub player_id: PlayerId,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub spread: i32,
}

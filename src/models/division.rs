//! Division state: the pairing matrix, the pairing arena, and DivisionError.

use crate::models::controls::{DivisionControls, RoundControl};
use crate::models::game::{GameResult, Pairing, PairingKey};
use crate::models::player::{Player, PlayerId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

/// Unique identifier for a division.
pub type DivisionId = Uuid;

/// Errors that can occur during division operations. All are value-returned;
/// the division is left unchanged when an operation fails.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DivisionError {
    /// Round controls were set with an empty list.
    EmptyRoundControls,
    /// Round controls cannot be replaced after the event has started.
    ControlsAfterStart,
    /// Elimination cannot be mixed with any other pairing method.
    MixedEliminationControls,
    /// The initial Fontes head segment must have odd length.
    EvenInitialFontes { rounds: usize },
    /// Elimination needs exactly 2^rounds players.
    InvalidEliminationPlayerCount {
        players: usize,
        expected: usize,
        rounds: usize,
    },
    /// Round number out of range for this division.
    RoundOutOfRange(usize),
    PlayerNotFound(PlayerId),
    PlayerAlreadyExists(PlayerId),
    PlayerAlreadyRemoved(PlayerId),
    /// A result was submitted for a player with no pairing in the round.
    UnpairedPlayer { player: PlayerId, round: usize },
    /// A result was submitted for two players who did not play each other.
    PlayersNotPaired {
        player_one: PlayerId,
        player_two: PlayerId,
        round: usize,
    },
    /// A matrix cell references a key absent from the pairing arena.
    PairingMissing(PairingKey),
    /// Result submitted for a past round without the amend flag.
    PastRoundNotAmendment(usize),
    /// Result submitted for a future round that is not a bye or forfeit.
    FutureRoundNotByeOrForfeit(usize),
    GameIndexOutOfRange { game_index: usize, games: usize },
    /// Elimination tiebreak results must be submitted at the next free index.
    InvalidTiebreakGameIndex {
        player_one: PlayerId,
        player_two: PlayerId,
        round: usize,
        game_index: usize,
    },
    /// A fresh submission may not overwrite a decided result.
    ResultAlreadySubmitted {
        player_one: PlayerId,
        player_two: PlayerId,
        round: usize,
    },
    /// An amendment must reference a result that was actually submitted.
    AmendmentForAbsentResult {
        player_one: PlayerId,
        player_two: PlayerId,
        round: usize,
    },
    /// Programming invariant: a suspended player ended up paired.
    SuspendedPlayerPaired { player: PlayerId, round: usize },
    /// Programming invariant: an active player was left unpaired.
    ActivePlayerUnpaired { player: PlayerId, round: usize },
    /// Programming invariant: pairing references are not symmetric.
    AsymmetricPairing {
        player: PlayerId,
        opponent: PlayerId,
        opponent_opponent: PlayerId,
    },
    /// The oracle returned the wrong number of assignments.
    OracleCountMismatch { got: usize, want: usize },
    /// The oracle returned an opponent index outside the pool.
    InvalidOpponentIndex { round: usize, index: isize },
    /// No legal pairing exists under the current repeat/weight limits.
    NoLegalPairing(String),
    /// Swiss pairing was requested but no weight matcher is configured.
    MatcherUnavailable,
    /// A manual round cannot be paired automatically.
    ManualPairing,
    /// Factor pairing cannot fill a block with this factor and pool size.
    FactorTooLarge { factor: usize, players: usize },
    /// Fewer than 2 players or no rounds configured.
    NotEnoughPlayers,
    RoundNotComplete(usize),
    RoundNotReady(usize),
    /// The event is over; no further round can start.
    DivisionFinished,
    /// Players cannot be added once the last round has started.
    LastRoundStarted(usize),
    /// Removal would leave too few active players to pair a round.
    RemovalWouldEmptyDivision,
    /// Ready states can only be set for the current round.
    WrongRound { current: i32, round: usize },
    /// The external matching solver failed.
    MatchingFailed(String),
}

impl std::fmt::Display for DivisionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DivisionError::EmptyRoundControls => {
                write!(f, "cannot set round controls with an empty list")
            }
            DivisionError::ControlsAfterStart => {
                write!(f, "cannot set all round controls after the event has started")
            }
            DivisionError::MixedEliminationControls => {
                write!(f, "cannot mix Elimination pairings with any other pairing method")
            }
            DivisionError::EvenInitialFontes { rounds } => {
                write!(f, "number of initial Fontes rounds must be odd, have {rounds}")
            }
            DivisionError::InvalidEliminationPlayerCount {
                players,
                expected,
                rounds,
            } => write!(
                f,
                "invalid number of players: have {players}, expected {expected} for {rounds} elimination rounds"
            ),
            DivisionError::RoundOutOfRange(round) => write!(f, "round number out of range: {round}"),
            DivisionError::PlayerNotFound(id) => {
                write!(f, "player does not exist in the division: {id}")
            }
            DivisionError::PlayerAlreadyExists(id) => {
                write!(f, "player already exists in the division: {id}")
            }
            DivisionError::PlayerAlreadyRemoved(id) => {
                write!(f, "player has already been removed: {id}")
            }
            DivisionError::UnpairedPlayer { player, round } => {
                write!(f, "result submitted for unpaired player {player} in round {round}")
            }
            DivisionError::PlayersNotPaired {
                player_one,
                player_two,
                round,
            } => write!(
                f,
                "result submitted for players that did not play each other: {player_one}, {player_two} round {round}"
            ),
            DivisionError::PairingMissing(key) => {
                write!(f, "pairing does not exist in the pairing map: {key}")
            }
            DivisionError::PastRoundNotAmendment(round) => write!(
                f,
                "result submitted for past round {round} without being marked as an amendment"
            ),
            DivisionError::FutureRoundNotByeOrForfeit(round) => write!(
                f,
                "result submitted for future round {round} that is not a bye or forfeit"
            ),
            DivisionError::GameIndexOutOfRange { game_index, games } => {
                write!(f, "game index out of range: {game_index} >= {games}")
            }
            DivisionError::InvalidTiebreakGameIndex {
                player_one,
                player_two,
                round,
                game_index,
            } => write!(
                f,
                "tiebreak result with invalid game index {game_index}: {player_one} vs {player_two} round {round}"
            ),
            DivisionError::ResultAlreadySubmitted {
                player_one,
                player_two,
                round,
            } => write!(
                f,
                "result is already submitted for round {round}, {player_one} vs {player_two}"
            ),
            DivisionError::AmendmentForAbsentResult {
                player_one,
                player_two,
                round,
            } => write!(
                f,
                "amendment for a result that does not exist in round {round}, {player_one} vs {player_two}"
            ),
            DivisionError::SuspendedPlayerPaired { player, round } => {
                write!(f, "suspended player {player} was paired in round {round}")
            }
            DivisionError::ActivePlayerUnpaired { player, round } => {
                write!(f, "active player {player} was not paired in round {round}")
            }
            DivisionError::AsymmetricPairing {
                player,
                opponent,
                opponent_opponent,
            } => write!(
                f,
                "player {player}'s opponent's ({opponent}) opponent ({opponent_opponent}) is not themself"
            ),
            DivisionError::OracleCountMismatch { got, want } => write!(
                f,
                "oracle did not return the correct number of pairings: got {got}, want {want}"
            ),
            DivisionError::InvalidOpponentIndex { round, index } => {
                write!(f, "invalid opponent index for round {round}: {index}")
            }
            DivisionError::NoLegalPairing(msg) => write!(f, "no legal pairing: {msg}"),
            DivisionError::MatcherUnavailable => {
                write!(f, "Swiss pairing requires a weight matcher and none is configured")
            }
            DivisionError::ManualPairing => {
                write!(f, "cannot automatically pair a manual round")
            }
            DivisionError::FactorTooLarge { factor, players } => {
                write!(f, "cannot pair with factor {factor} on {players} players")
            }
            DivisionError::NotEnoughPlayers => {
                write!(f, "cannot start an event with fewer than 2 players or no rounds")
            }
            DivisionError::RoundNotComplete(round) => {
                write!(f, "round {round} is not complete")
            }
            DivisionError::RoundNotReady(round) => {
                write!(f, "cannot start round {round} because it is not ready")
            }
            DivisionError::DivisionFinished => write!(f, "the event is finished"),
            DivisionError::LastRoundStarted(round) => write!(
                f,
                "cannot add players because the last round ({round}) has already started"
            ),
            DivisionError::RemovalWouldEmptyDivision => {
                write!(f, "cannot remove players as the division would be empty")
            }
            DivisionError::WrongRound { current, round } => {
                write!(f, "wrong round number: {round}, current round is {current}")
            }
            DivisionError::MatchingFailed(msg) => write!(f, "matching failed: {msg}"),
        }
    }
}

impl std::error::Error for DivisionError {}

/// One self-contained group of players being paired and scored together.
///
/// Owns all mutation of the pairing matrix and the pairing arena. Performs
/// no internal locking; callers serialize access externally.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Division {
    pub id: DivisionId,
    pub name: String,
    pub created: DateTime<Utc>,
    /// Roster order matters: elimination brackets and deterministic
    /// tie-breaks follow it. Sorted by rating (descending) on pre-start load.
    pub players: Vec<Player>,
    /// Player id to roster position; kept in sync with `players`.
    pub player_index: HashMap<PlayerId, usize>,
    /// rounds x players; each cell holds the key of the pairing covering
    /// that player in that round, or `None` while unpaired.
    pub matrix: Vec<Vec<Option<PairingKey>>>,
    /// Pairing arena keyed by synthetic id.
    pub pairing_map: BTreeMap<PairingKey, Pairing>,
    pub round_controls: Vec<RoundControl>,
    pub division_controls: DivisionControls,
    /// -1 before the event starts; advanced only by `start_round`.
    pub current_round: i32,
    pairing_key_counter: PairingKey,
}

impl Division {
    /// Create an empty division with no rounds and no players.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            created: Utc::now(),
            players: Vec::new(),
            player_index: HashMap::new(),
            matrix: Vec::new(),
            pairing_map: BTreeMap::new(),
            round_controls: Vec::new(),
            division_controls: DivisionControls::default(),
            current_round: -1,
            pairing_key_counter: 0,
        }
    }

    pub fn round_count(&self) -> usize {
        self.matrix.len()
    }

    pub fn is_started(&self) -> bool {
        self.current_round >= 0
    }

    pub fn is_startable(&self) -> bool {
        self.players.len() >= 2 && !self.matrix.is_empty()
    }

    /// Error unless `round` indexes an allocated row of the matrix.
    pub(crate) fn check_round(&self, round: usize) -> Result<(), DivisionError> {
        if round >= self.matrix.len() {
            return Err(DivisionError::RoundOutOfRange(round));
        }
        Ok(())
    }

    pub(crate) fn index_of(&self, player: &str) -> Result<usize, DivisionError> {
        self.player_index
            .get(player)
            .copied()
            .ok_or_else(|| DivisionError::PlayerNotFound(player.to_string()))
    }

    /// The pairing key in `player`'s cell for `round`, or `None` while
    /// unpaired.
    pub fn pairing_key_of(
        &self,
        player: &str,
        round: usize,
    ) -> Result<Option<PairingKey>, DivisionError> {
        self.check_round(round)?;
        let index = self.index_of(player)?;
        Ok(self.matrix[round][index])
    }

    /// The pairing covering `player` in `round`; errors while unpaired.
    pub fn pairing_of(&self, player: &str, round: usize) -> Result<&Pairing, DivisionError> {
        let key = self.pairing_key_of(player, round)?.ok_or_else(|| {
            DivisionError::UnpairedPlayer {
                player: player.to_string(),
                round,
            }
        })?;
        self.pairing_map
            .get(&key)
            .ok_or(DivisionError::PairingMissing(key))
    }

    pub(crate) fn set_pairing_key(
        &mut self,
        player: &str,
        round: usize,
        key: PairingKey,
    ) -> Result<(), DivisionError> {
        self.check_round(round)?;
        let index = self.index_of(player)?;
        self.matrix[round][index] = Some(key);
        Ok(())
    }

    /// Drop the pairing referenced by this cell from the arena and empty the
    /// cell. The partner cell (if any) is the caller's responsibility.
    pub(crate) fn clear_pairing_key(
        &mut self,
        player_index: usize,
        round: usize,
    ) -> Result<(), DivisionError> {
        self.check_round(round)?;
        if player_index >= self.matrix[round].len() {
            return Err(DivisionError::RoundOutOfRange(round));
        }
        if let Some(key) = self.matrix[round][player_index].take() {
            self.pairing_map.remove(&key);
        }
        Ok(())
    }

    pub(crate) fn make_pairing_key(&mut self) -> PairingKey {
        let key = self.pairing_key_counter;
        self.pairing_key_counter += 1;
        key
    }

    /// The opponent's id for `player` in `round`; `None` while unpaired or
    /// for an eliminated-bracket marker.
    pub fn opponent_of(
        &self,
        player: &str,
        round: usize,
    ) -> Result<Option<PlayerId>, DivisionError> {
        let key = match self.pairing_key_of(player, round)? {
            Some(key) => key,
            None => return Ok(None),
        };
        let pairing = match self.pairing_map.get(&key) {
            Some(pairing) => pairing,
            None => return Ok(None),
        };
        let players = match pairing.players {
            Some(players) => players,
            None => return Ok(None),
        };
        let one = &self.players[players[0]].id;
        let two = &self.players[players[1]].id;
        if player != one && player != two {
            return Err(DivisionError::AsymmetricPairing {
                player: player.to_string(),
                opponent: one.clone(),
                opponent_opponent: two.clone(),
            });
        }
        if player != one {
            Ok(Some(one.clone()))
        } else {
            Ok(Some(two.clone()))
        }
    }

    /// True when `player` is self-paired in `round`.
    pub fn pairing_is_bye(&self, player: &str, round: usize) -> Result<bool, DivisionError> {
        match self.pairing_key_of(player, round)? {
            None => Ok(false),
            Some(key) => {
                let pairing = self
                    .pairing_map
                    .get(&key)
                    .ok_or(DivisionError::PairingMissing(key))?;
                Ok(pairing.is_bye())
            }
        }
    }

    /// A round is complete once every cell is paired and every pairing's
    /// aggregate outcomes are decided. Individual elimination games do not
    /// count; only the aggregate does.
    pub fn is_round_complete(&self, round: usize) -> Result<bool, DivisionError> {
        self.check_round(round)?;
        for cell in &self.matrix[round] {
            let pairing = match cell.and_then(|key| self.pairing_map.get(&key)) {
                Some(pairing) => pairing,
                None => return Ok(false),
            };
            if pairing.is_undecided() {
                return Ok(false);
            }
        }
        Ok(true)
    }

    pub fn is_finished(&self) -> Result<bool, DivisionError> {
        if self.matrix.is_empty() {
            return Ok(false);
        }
        self.is_round_complete(self.matrix.len() - 1)
    }

    /// A round is ready to start when everyone is paired and all earlier
    /// rounds are complete.
    pub fn is_round_ready(&self, round: usize) -> Result<bool, DivisionError> {
        self.check_round(round)?;
        for cell in &self.matrix[round] {
            match cell {
                None => return Ok(false),
                Some(key) => {
                    if !self.pairing_map.contains_key(key) {
                        return Err(DivisionError::PairingMissing(*key));
                    }
                }
            }
        }
        for earlier in 0..round {
            if !self.is_round_complete(earlier)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Advance to the next round. The previous round must be complete, the
    /// event unfinished, and the next round fully paired.
    pub fn start_round(&mut self) -> Result<(), DivisionError> {
        if self.current_round >= 0 {
            let current = self.current_round as usize;
            if !self.is_round_complete(current)? {
                return Err(DivisionError::RoundNotComplete(current));
            }
            if self.is_finished()? {
                return Err(DivisionError::DivisionFinished);
            }
        } else if !self.is_startable() {
            return Err(DivisionError::NotEnoughPlayers);
        }

        let next = (self.current_round + 1) as usize;
        if !self.is_round_ready(next)? {
            return Err(DivisionError::RoundNotReady(next));
        }
        self.current_round += 1;
        log::debug!("division {} started round {}", self.name, self.current_round);
        Ok(())
    }

    /// Counts of games gone first and second for a roster slot through
    /// `round` inclusive, used to balance firsts. Byes and forfeits do not
    /// count as either.
    pub(crate) fn firsts_and_seconds(&self, player_index: usize, round: i32) -> [u32; 2] {
        let mut counts = [0, 0];
        if round < 0 || round as usize >= self.matrix.len() || player_index >= self.players.len() {
            return counts;
        }
        for r in 0..=round as usize {
            let pairing = match self.matrix[r][player_index].and_then(|k| self.pairing_map.get(&k))
            {
                Some(pairing) => pairing,
                None => continue,
            };
            let players = match pairing.players {
                Some(players) => players,
                None => continue,
            };
            let slot = if players[1] == player_index {
                1
            } else if players[0] == player_index {
                0
            } else {
                return counts;
            };
            match pairing.outcomes[slot] {
                GameResult::NoResult | GameResult::Win | GameResult::Loss | GameResult::Draw => {
                    counts[slot] += 1;
                }
                _ => {}
            }
        }
        counts
    }
}

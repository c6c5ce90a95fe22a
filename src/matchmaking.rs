//! Matchmaking strategies and the pairing-oracle seam.
//!
//! The division calls a [`PairingOracle`] once per automatic pairing with
//! the unpaired pool, the round's control, and a repeat-count map, and gets
//! back one opponent index per pool member (-1 or a self index meaning bye).
//! [`StrategyOracle`] implements every built-in method; Swiss reduces to
//! minimum-weight matching, which is solved by an external [`Matcher`].

use crate::models::{DivisionError, PairingMethod, PlayerId, RoundControl};
use rand::seq::SliceRandom;
use std::collections::HashMap;

/// Scale applied to win differences so that any single win-difference edge
/// outweighs the sum of all possible spread contributions.
pub const WIN_WEIGHT_SCALING: i64 = 1 << 22;

/// Relative weights above this are clamped.
pub const MAX_RELATIVE_WEIGHT: usize = 100;

/// Edge weight past which a matching is considered impossible.
pub const PROHIBITIVE_WEIGHT: i64 = 1 << 52;

/// An unpaired candidate, carrying the record the strategies weigh on.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PoolMember {
    pub id: PlayerId,
    pub wins: u32,
    pub draws: u32,
    pub spread: i32,
}

/// Key of the unordered pair (a, b) in a repeat-count map.
pub type RepeatKey = (PlayerId, PlayerId);

/// The canonical (ordered) repeat key for two player ids.
pub fn repeat_key(player_one: &str, player_two: &str) -> RepeatKey {
    if player_two < player_one {
        (player_two.to_string(), player_one.to_string())
    } else {
        (player_one.to_string(), player_two.to_string())
    }
}

/// A weighted candidate pairing between two pool indices.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Edge {
    pub i: usize,
    pub j: usize,
    pub weight: i64,
}

/// The external minimum-weight matching solver.
///
/// Returns one entry per vertex (-1 = unmatched) plus the total weight of
/// the matching. Symmetry of the returned assignment is required by the
/// division's invariant checks, not enforced here.
pub trait Matcher {
    fn min_weight_matching(
        &self,
        edges: &[Edge],
        vertices: usize,
        max_cardinality: bool,
    ) -> Result<(Vec<isize>, i64), DivisionError>;
}

/// The matching algorithm the division consumes as a black box.
///
/// Must return exactly `pool.len()` entries; entry i is the pool index of
/// member i's opponent, or -1 (or i itself) for a bye.
pub trait PairingOracle {
    fn pair(
        &self,
        pool: &[PoolMember],
        control: &RoundControl,
        repeats: &HashMap<RepeatKey, usize>,
    ) -> Result<Vec<isize>, DivisionError>;
}

/// Built-in oracle covering every pairing method. Swiss needs a weight
/// matcher; the other methods are self-contained.
#[derive(Default)]
pub struct StrategyOracle {
    matcher: Option<Box<dyn Matcher + Send + Sync>>,
}

impl StrategyOracle {
    pub fn new() -> Self {
        Self { matcher: None }
    }

    pub fn with_matcher(matcher: Box<dyn Matcher + Send + Sync>) -> Self {
        Self {
            matcher: Some(matcher),
        }
    }
}

impl PairingOracle for StrategyOracle {
    fn pair(
        &self,
        pool: &[PoolMember],
        control: &RoundControl,
        repeats: &HashMap<RepeatKey, usize>,
    ) -> Result<Vec<isize>, DivisionError> {
        match control.pairing_method {
            PairingMethod::Manual => Err(DivisionError::ManualPairing),
            PairingMethod::Random => Ok(pair_random(pool.len())),
            PairingMethod::RoundRobin => Ok(pair_round_robin(pool.len(), control.round)),
            PairingMethod::KingOfTheHill | PairingMethod::Elimination => {
                Ok(pair_king_of_the_hill(pool.len()))
            }
            PairingMethod::Factor => pair_factor(pool.len(), control.factor),
            PairingMethod::Swiss => self.pair_swiss(pool, control, repeats),
        }
    }
}

impl StrategyOracle {
    fn pair_swiss(
        &self,
        pool: &[PoolMember],
        control: &RoundControl,
        repeats: &HashMap<RepeatKey, usize>,
    ) -> Result<Vec<isize>, DivisionError> {
        let matcher = self
            .matcher
            .as_ref()
            .ok_or(DivisionError::MatcherUnavailable)?;

        let mut edges = Vec::new();
        for i in 0..pool.len() {
            for j in i + 1..pool.len() {
                edges.push(Edge {
                    i,
                    j,
                    weight: weigh_swiss(pool, control, repeats, i, j),
                });
            }
        }

        let (pairings, weight) = matcher.min_weight_matching(&edges, pool.len(), true)?;
        if pairings.len() != pool.len() {
            return Err(DivisionError::OracleCountMismatch {
                got: pairings.len(),
                want: pool.len(),
            });
        }
        if weight >= PROHIBITIVE_WEIGHT {
            return Err(DivisionError::NoLegalPairing(
                "prohibitive weight reached, pairings are not possible with these settings".into(),
            ));
        }
        Ok(pairings)
    }
}

/// Swiss edge weight: win difference dominates, similar spreads repel
/// (players with close records but distant spreads should meet), and
/// repeats past the cap either weigh in scaled or forbid the edge.
fn weigh_swiss(
    pool: &[PoolMember],
    control: &RoundControl,
    repeats: &HashMap<RepeatKey, usize>,
    i: usize,
    j: usize,
) -> i64 {
    let p1 = &pool[i];
    let p2 = &pool[j];

    let win_relative = control
        .win_difference_relative_weight
        .min(MAX_RELATIVE_WEIGHT) as i64;
    let repeat_relative = control.repeat_relative_weight.min(MAX_RELATIVE_WEIGHT) as i64;

    // A win counts 2 and a draw 1, so halve the scaling afterwards to keep
    // the arithmetic in integers.
    let unscaled_win_diff = ((p1.wins as i64 - p2.wins as i64) * 2
        + (p1.draws as i64 - p2.draws as i64))
        .abs();
    let win_diff_weight = unscaled_win_diff * (WIN_WEIGHT_SCALING / 2) * win_relative;

    let spread_diff_weight = -((p1.spread as i64 - p2.spread as i64).abs());

    // The +1 accounts for the meeting this pairing would create.
    let prior = repeats.get(&repeat_key(&p1.id, &p2.id)).copied().unwrap_or(0);
    let repeats_over_max = (prior + 1).saturating_sub(control.max_repeats);
    let repeat_weight = if repeats_over_max == 0 {
        0
    } else if control.allow_over_max_repeats {
        repeats_over_max as i64 * WIN_WEIGHT_SCALING * repeat_relative
    } else {
        PROHIBITIVE_WEIGHT
    };

    win_diff_weight + spread_diff_weight + repeat_weight
}

fn pair_random(count: usize) -> Vec<isize> {
    let mut order: Vec<usize> = (0..count).collect();
    order.shuffle(&mut rand::thread_rng());

    let mut pairings = vec![-1isize; count];
    let mut i = 0;
    while i + 1 < count {
        pairings[order[i]] = order[i + 1] as isize;
        pairings[order[i + 1]] = order[i] as isize;
        i += 2;
    }
    pairings
}

fn pair_king_of_the_hill(count: usize) -> Vec<isize> {
    let mut pairings = vec![-1isize; count];
    let mut i = 0;
    while i + 1 < count {
        pairings[i] = (i + 1) as isize;
        pairings[i + 1] = i as isize;
        i += 2;
    }
    pairings
}

/// Rank i plays rank i+factor within each block of 2*factor ranks; any
/// trailing partial block keeps its king-of-the-hill pairs.
fn pair_factor(count: usize, factor: usize) -> Result<Vec<isize>, DivisionError> {
    let mut pairings = pair_king_of_the_hill(count);
    if factor == 0 {
        return Ok(pairings);
    }
    if 2 * factor > count {
        return Err(DivisionError::FactorTooLarge {
            factor,
            players: count,
        });
    }
    let mut block = 0;
    while block + 2 * factor <= count {
        for i in block..block + factor {
            pairings[i] = (i + factor) as isize;
            pairings[i + factor] = i as isize;
        }
        block += 2 * factor;
    }
    Ok(pairings)
}

/// Classic rotation schedule: player 0 stays fixed while the rest rotate
/// one seat per round; columns of the two rows play each other. A phantom
/// player is added for odd pools and converted back to byes.
fn pair_round_robin(count: usize, round: usize) -> Vec<isize> {
    if count < 2 {
        return vec![-1; count];
    }
    let bye = count % 2 == 1;
    let total = if bye { count + 1 } else { count };

    let mut rotated: Vec<usize> = (1..total).collect();
    let l = rotated.len();
    rotated.rotate_right(round % l);
    let mut seats = Vec::with_capacity(total);
    seats.push(0);
    seats.extend(rotated);

    let mut pairings = vec![-1isize; total];
    let half = total / 2;
    for i in 0..half {
        let top = seats[i];
        let bottom = seats[total - 1 - i];
        pairings[top] = bottom as isize;
        pairings[bottom] = top as isize;
    }

    if bye {
        for p in pairings.iter_mut() {
            if *p == count as isize {
                *p = -1;
            }
        }
        pairings.truncate(count);
    }
    pairings
}

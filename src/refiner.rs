//! Classifier group refinement
//!
//! The classifier only narrows a pose down to one of eight look-alike groups,
//! and its top pick is often the wrong neighbour. [`refine`] runs an ordered
//! table of correction rules over the top-2 ranking: each rule has a set of
//! (top-1, top-2) pairs it applies to and a geometric test, and overrides the
//! top-1 group when both match. Every rule sees the pair as left by the rules
//! before it, so the table order is part of the behavior.
//!
//! Thresholds are pixels on the 400x400 classifier canvas.

use crate::geometry::Bend::{self, Curled as C, Extended as E};
use crate::geometry::{Finger, LandmarkSet, landmarks::*};
use std::fmt;

/// Number of classifier output groups
pub const GROUP_COUNT: usize = 8;

/// Classifier group id, 0..GROUP_COUNT
pub type Group = u8;

/// Error type for malformed classifier output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RankingError {
    WrongClassCount { found: usize },
}

impl fmt::Display for RankingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RankingError::WrongClassCount { found } => write!(
                f,
                "expected {} class probabilities, got {}",
                GROUP_COUNT, found
            ),
        }
    }
}

impl std::error::Error for RankingError {}

/// Classifier output, one non-negative score per group
#[derive(Clone, Debug, PartialEq)]
pub struct ProbabilityVector([f32; GROUP_COUNT]);

impl ProbabilityVector {
    pub fn new(scores: [f32; GROUP_COUNT]) -> Self {
        Self(scores)
    }

    pub fn from_slice(scores: &[f32]) -> Result<Self, RankingError> {
        let scores: [f32; GROUP_COUNT] = scores
            .try_into()
            .map_err(|_| RankingError::WrongClassCount {
                found: scores.len(),
            })?;
        Ok(Self(scores))
    }

    /// Top three groups, taken by arg-max then zeroing the winner
    pub fn ranking(&self) -> ClassRanking {
        let mut scores = self.0;
        let first = take_max(&mut scores);
        let second = take_max(&mut scores);
        let third = take_max(&mut scores);
        ClassRanking {
            first,
            second,
            third,
        }
    }
}

/// First index holding the maximum, which is then zeroed
fn take_max(scores: &mut [f32; GROUP_COUNT]) -> Group {
    let mut best = 0;
    for (i, &score) in scores.iter().enumerate() {
        if score > scores[best] {
            best = i;
        }
    }
    scores[best] = 0.0;
    best as Group
}

/// Top-ranked classifier groups
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClassRanking {
    pub first: Group,
    pub second: Group,
    /// Computed for parity with the classifier tooling; no rule reads it
    pub third: Group,
}

/// One correction: when the current pair is listed and the pose test holds,
/// the top-1 group becomes `target`
pub struct Rule {
    pub name: &'static str,
    pub pairs: &'static [(Group, Group)],
    pub test: fn(&LandmarkSet) -> bool,
    pub target: Group,
}

impl Rule {
    pub fn applies(&self, first: Group, second: Group, hand: &LandmarkSet) -> bool {
        self.pairs.contains(&(first, second)) && (self.test)(hand)
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("pairs", &self.pairs.len())
            .field("target", &self.target)
            .finish()
    }
}

/// Apply the correction table to a top-2 ranking
pub fn refine(first: Group, second: Group, hand: &LandmarkSet) -> Group {
    let mut current = first;
    for rule in RULES {
        if rule.applies(current, second, hand) {
            tracing::trace!(rule = rule.name, from = current, to = rule.target, "group corrected");
            current = rule.target;
        }
    }
    current
}

// ============================================================================
// Pose tests
// ============================================================================

fn bends_are(hand: &LandmarkSet, pattern: [Bend; 4]) -> bool {
    hand.bends() == pattern
}

fn wrist_right_of_fingertips(hand: &LandmarkSet) -> bool {
    hand.fingertip_xs().iter().all(|&x| hand.x(WRIST) > x)
}

fn wrist_left_of_fingertips(hand: &LandmarkSet) -> bool {
    hand.fingertip_xs().iter().all(|&x| hand.x(WRIST) < x)
}

fn fist(hand: &LandmarkSet) -> bool {
    bends_are(hand, [C, C, C, C])
}

fn thumb_right_of_index_knuckle(hand: &LandmarkSet) -> bool {
    hand.x(INDEX_MCP) < hand.x(THUMB_TIP)
}

fn c_shape_facing_left(hand: &LandmarkSet) -> bool {
    wrist_right_of_fingertips(hand)
        && hand.x(WRIST) > hand.x(THUMB_TIP)
        && hand.x(INDEX_MCP) > hand.x(THUMB_TIP)
}

fn index_ring_close(hand: &LandmarkSet) -> bool {
    hand.distance(INDEX_TIP, RING_TIP) < 52.0
}

fn index_only_pointing_sideways(hand: &LandmarkSet) -> bool {
    hand.is_extended(Finger::Index)
        && hand.is_curled(Finger::Ring)
        && hand.is_curled(Finger::Pinky)
        && wrist_left_of_fingertips(hand)
}

fn thumb_right_of_wrist(hand: &LandmarkSet) -> bool {
    hand.x(THUMB_TIP) > hand.x(WRIST)
}

fn thumb_left_of_wrist(hand: &LandmarkSet) -> bool {
    hand.x(THUMB_TIP) < hand.x(WRIST)
}

fn thumb_base_well_above_ring_tip(hand: &LandmarkSet) -> bool {
    hand.y(THUMB_MCP) + 15 < hand.y(RING_TIP)
}

fn thumb_far_from_middle(hand: &LandmarkSet) -> bool {
    hand.distance(THUMB_TIP, MIDDLE_DIP) > 55.0
}

fn index_up_thumb_away(hand: &LandmarkSet) -> bool {
    hand.distance(THUMB_TIP, MIDDLE_DIP) > 50.0 && bends_are(hand, [E, C, C, C])
}

fn thumb_cmc_left_of_middle_tip(hand: &LandmarkSet) -> bool {
    hand.x(THUMB_CMC) < hand.x(MIDDLE_TIP)
}

fn index_up_thumb_below_middle_pip(hand: &LandmarkSet) -> bool {
    bends_are(hand, [E, C, C, C]) && hand.y(THUMB_TIP) > hand.y(MIDDLE_PIP)
}

fn thumb_near_fingertip_level(hand: &LandmarkSet) -> bool {
    let thumb = hand.y(THUMB_TIP) + 17;
    hand.fingertip_ys().iter().all(|&y| thumb > y)
}

fn thumb_ip_left_of_wrist(hand: &LandmarkSet) -> bool {
    hand.x(THUMB_IP) < hand.x(WRIST)
}

fn index_curled(hand: &LandmarkSet) -> bool {
    hand.curled(INDEX_TIP, INDEX_PIP)
}

fn pinky_extended(hand: &LandmarkSet) -> bool {
    hand.extended(PINKY_TIP, PINKY_PIP)
}

fn index_knuckle_right_of_ring_tip(hand: &LandmarkSet) -> bool {
    hand.x(INDEX_MCP) > hand.x(RING_TIP)
}

fn pinky_curled_index_tip_above_middle_pip(hand: &LandmarkSet) -> bool {
    hand.curled(PINKY_TIP, PINKY_PIP) && hand.y(INDEX_TIP) < hand.y(MIDDLE_PIP)
}

fn index_ring_apart(hand: &LandmarkSet) -> bool {
    hand.distance(INDEX_TIP, RING_TIP) > 50.0
}

fn thumb_near_middle(hand: &LandmarkSet) -> bool {
    hand.distance(THUMB_TIP, MIDDLE_DIP) < 60.0
}

fn thumb_well_left_of_index_knuckle(hand: &LandmarkSet) -> bool {
    hand.x(INDEX_MCP) - hand.x(THUMB_TIP) - 15 > 0
}

fn thumb_not_well_left_of_index_knuckle(hand: &LandmarkSet) -> bool {
    hand.x(INDEX_MCP) - hand.x(THUMB_TIP) - 15 < 0
}

fn open_palm(hand: &LandmarkSet) -> bool {
    bends_are(hand, [E, E, E, E])
}

fn three_up_index_down(hand: &LandmarkSet) -> bool {
    bends_are(hand, [C, E, E, E])
}

fn middle_ring_pinky_up(hand: &LandmarkSet) -> bool {
    hand.extended(MIDDLE_TIP, MIDDLE_PIP)
        && hand.extended(RING_TIP, RING_PIP)
        && hand.extended(PINKY_TIP, PINKY_PIP)
}

fn pointing_thumb_tucked_low(hand: &LandmarkSet) -> bool {
    bends_are(hand, [E, C, C, C])
        && hand.x(THUMB_MCP) < hand.x(WRIST)
        && hand.y(THUMB_TIP) > hand.y(RING_PIP)
}

fn pointing_thumb_near_middle(hand: &LandmarkSet) -> bool {
    hand.distance(THUMB_TIP, MIDDLE_DIP) < 50.0 && bends_are(hand, [E, C, C, C])
}

fn pinky_only(hand: &LandmarkSet) -> bool {
    bends_are(hand, [C, C, C, E])
}

fn pinky_only_thumb_in(hand: &LandmarkSet) -> bool {
    hand.x(THUMB_TIP) < hand.x(INDEX_MCP) + 15 && pinky_only(hand)
}

fn two_up_thumb_low(hand: &LandmarkSet) -> bool {
    bends_are(hand, [E, E, C, C]) && hand.y(THUMB_TIP) > hand.y(RING_PIP)
}

fn fingertips_near_wrist_x_thumb_close(hand: &LandmarkSet) -> bool {
    const MARGIN: i32 = 13;
    let wrist = hand.x(WRIST);
    let xs = hand.fingertip_xs();
    let clearly_right = xs.iter().all(|&x| wrist + MARGIN < x);
    let all_left = xs.iter().all(|&x| wrist > x);
    !clearly_right && !all_left && hand.distance(THUMB_TIP, MIDDLE_DIP) < 50.0
}

fn index_middle_ring_up(hand: &LandmarkSet) -> bool {
    hand.extended(INDEX_TIP, INDEX_PIP)
        && hand.extended(MIDDLE_TIP, MIDDLE_PIP)
        && hand.extended(RING_TIP, RING_PIP)
}

// ============================================================================
// Correction table
// ============================================================================

pub static RULES: &[Rule] = &[
    Rule {
        name: "fist",
        pairs: &[
            (5, 2), (5, 3), (3, 5), (3, 6), (3, 0), (3, 2), (6, 4), (6, 1), (6, 2), (6, 6),
            (6, 7), (6, 0), (6, 5), (4, 1), (1, 0), (1, 1), (6, 3), (1, 6), (5, 6), (5, 1),
            (4, 5), (1, 4), (1, 5), (2, 0), (2, 6), (4, 6), (5, 7), (7, 6), (2, 5), (7, 1),
            (5, 4), (7, 0), (7, 5), (7, 2),
        ],
        test: fist,
        target: 0,
    },
    Rule {
        name: "o-as-s",
        pairs: &[(2, 2), (2, 1)],
        test: thumb_right_of_index_knuckle,
        target: 0,
    },
    Rule {
        name: "c-facing-left",
        pairs: &[(0, 0), (0, 6), (0, 2), (0, 5), (0, 1), (0, 7), (5, 2), (7, 6), (7, 1)],
        test: c_shape_facing_left,
        target: 2,
    },
    Rule {
        name: "c-closed",
        pairs: &[(6, 0), (6, 6), (6, 2)],
        test: index_ring_close,
        target: 2,
    },
    Rule {
        name: "gh-sideways",
        pairs: &[(1, 4), (1, 5), (1, 6), (1, 3), (1, 0)],
        test: index_only_pointing_sideways,
        target: 3,
    },
    Rule {
        name: "gh-from-l",
        pairs: &[(4, 6), (4, 1), (4, 5), (4, 3), (4, 7)],
        test: thumb_right_of_wrist,
        target: 3,
    },
    Rule {
        name: "gh-from-pqz",
        pairs: &[(5, 3), (5, 0), (5, 7), (5, 4), (5, 2), (5, 1), (5, 5)],
        test: thumb_base_well_above_ring_tip,
        target: 3,
    },
    Rule {
        name: "l-from-x",
        pairs: &[(6, 4), (6, 1), (6, 2)],
        test: thumb_far_from_middle,
        target: 4,
    },
    Rule {
        name: "l-from-d",
        pairs: &[(1, 4), (1, 6), (1, 1)],
        test: index_up_thumb_away,
        target: 4,
    },
    Rule {
        name: "l-from-gh",
        pairs: &[(3, 6), (3, 4)],
        test: thumb_left_of_wrist,
        target: 4,
    },
    Rule {
        name: "l-from-co",
        pairs: &[(2, 2), (2, 5), (2, 4)],
        test: thumb_cmc_left_of_middle_tip,
        target: 4,
    },
    Rule {
        name: "z-from-gh",
        pairs: &[(3, 6), (3, 5), (3, 4)],
        test: index_up_thumb_below_middle_pip,
        target: 5,
    },
    Rule {
        name: "pq-from-gh",
        pairs: &[(3, 2), (3, 1), (3, 6)],
        test: thumb_near_fingertip_level,
        target: 5,
    },
    Rule {
        name: "pqz-from-l",
        pairs: &[(4, 4), (4, 5), (4, 2), (7, 5), (7, 6), (7, 0)],
        test: thumb_right_of_wrist,
        target: 5,
    },
    Rule {
        name: "pqz-from-fist",
        pairs: &[(0, 2), (0, 6), (0, 1), (0, 5), (0, 0), (0, 7), (0, 4), (0, 3), (2, 7)],
        test: wrist_left_of_fingertips,
        target: 5,
    },
    Rule {
        name: "yj-from-pqz",
        pairs: &[(5, 7), (5, 2), (5, 6)],
        test: thumb_ip_left_of_wrist,
        target: 7,
    },
    Rule {
        name: "yj-from-l",
        pairs: &[(4, 6), (4, 2), (4, 4), (4, 1), (4, 5), (4, 7)],
        test: index_curled,
        target: 7,
    },
    Rule {
        name: "yj-from-x",
        pairs: &[(6, 7), (0, 7), (0, 1), (0, 0), (6, 4), (6, 6), (6, 5), (6, 1)],
        test: pinky_extended,
        target: 7,
    },
    Rule {
        name: "x-from-fist",
        pairs: &[(0, 4), (0, 2), (0, 3), (0, 1), (0, 6)],
        test: index_knuckle_right_of_ring_tip,
        target: 6,
    },
    Rule {
        name: "x-from-yj",
        pairs: &[(7, 2)],
        test: pinky_curled_index_tip_above_middle_pip,
        target: 6,
    },
    Rule {
        name: "x-from-co",
        pairs: &[(2, 1), (2, 2), (2, 6), (2, 7), (2, 0)],
        test: index_ring_apart,
        target: 6,
    },
    Rule {
        name: "x-from-l",
        pairs: &[(4, 6), (4, 2), (4, 1), (4, 4)],
        test: thumb_near_middle,
        target: 6,
    },
    Rule {
        name: "x-from-d",
        pairs: &[(1, 4), (1, 6), (1, 0), (1, 2)],
        test: thumb_well_left_of_index_knuckle,
        target: 6,
    },
    Rule {
        name: "b-from-pqz",
        pairs: &[
            (5, 0), (5, 1), (5, 4), (5, 5), (5, 6), (6, 1), (7, 6), (0, 2), (7, 1), (7, 4),
            (6, 6), (7, 2), (6, 3), (6, 4), (7, 5),
        ],
        test: open_palm,
        target: 1,
    },
    Rule {
        name: "f-from-pqz",
        pairs: &[
            (6, 1), (6, 0), (0, 3), (6, 4), (2, 2), (0, 6), (6, 2), (7, 6), (4, 6), (4, 1),
            (4, 2), (0, 2), (7, 1), (7, 4), (6, 6), (7, 2), (7, 5),
        ],
        test: three_up_index_down,
        target: 1,
    },
    Rule {
        name: "f-loose",
        pairs: &[(6, 1), (6, 0), (4, 2), (4, 1), (4, 6), (4, 4)],
        test: middle_ring_pinky_up,
        target: 1,
    },
    Rule {
        name: "d-from-pqz",
        pairs: &[(5, 0), (3, 4), (3, 0), (3, 1), (3, 5), (5, 5), (5, 4), (5, 1), (7, 6)],
        test: pointing_thumb_tucked_low,
        target: 1,
    },
    Rule {
        name: "d-from-l",
        pairs: &[(4, 1), (4, 2), (4, 4)],
        test: pointing_thumb_near_middle,
        target: 1,
    },
    Rule {
        name: "d-from-gh",
        pairs: &[(3, 4), (3, 0), (3, 1), (3, 5), (3, 6)],
        test: pointing_thumb_tucked_low,
        target: 1,
    },
    Rule {
        name: "d-thumb-in",
        pairs: &[(6, 6), (6, 4), (6, 1), (6, 2)],
        test: thumb_not_well_left_of_index_knuckle,
        target: 1,
    },
    Rule {
        name: "i-from-pqz",
        pairs: &[
            (5, 4), (5, 5), (5, 1), (0, 3), (0, 7), (5, 0), (0, 2), (6, 2), (7, 5), (7, 1),
            (7, 6), (7, 7),
        ],
        test: pinky_only,
        target: 1,
    },
    Rule {
        name: "yj-from-i",
        pairs: &[(1, 5), (1, 7), (1, 1), (1, 6), (1, 3), (1, 0)],
        test: pinky_only_thumb_in,
        target: 7,
    },
    Rule {
        name: "uvr",
        pairs: &[(5, 5), (5, 0), (5, 4), (5, 1), (4, 6), (4, 1), (7, 6), (3, 0), (3, 5)],
        test: two_up_thumb_low,
        target: 1,
    },
    Rule {
        name: "w-spread",
        pairs: &[(3, 5), (3, 0), (3, 6), (5, 1), (4, 1), (2, 0), (5, 0), (5, 5)],
        test: fingertips_near_wrist_x_thumb_close,
        target: 1,
    },
    Rule {
        name: "w-three-up",
        pairs: &[(5, 0), (5, 5), (0, 1)],
        test: index_middle_ring_up,
        target: 1,
    },
];

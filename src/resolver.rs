//! Group → symbol decision table
//!
//! Once the group is settled, letters inside it are told apart by finger
//! positions alone. Three gestures cut across the groups afterwards: a
//! space (index and pinky up), the commit gesture `next` (open palm, thumb
//! tucked) and `Backspace` (hand turned over, thumb on top).

use crate::geometry::Bend::{Curled as C, Extended as E};
use crate::geometry::{LandmarkSet, landmarks::*};
use crate::refiner::Group;
use std::fmt;

/// Per-frame recognition result
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Symbol {
    /// 'A'..='Z'
    Letter(char),
    Space,
    Next,
    Backspace,
    Unresolved,
}

impl Symbol {
    /// Name used in labelled recordings: the letter itself, or
    /// `space` / `next` / `backspace` / `?`
    pub fn label(&self) -> String {
        match self {
            Symbol::Letter(c) => c.to_string(),
            Symbol::Space => "space".to_string(),
            Symbol::Next => "next".to_string(),
            Symbol::Backspace => "backspace".to_string(),
            Symbol::Unresolved => "?".to_string(),
        }
    }

    fn is_letter(&self, options: &[char]) -> bool {
        matches!(self, Symbol::Letter(c) if options.contains(c))
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::Letter(c) => write!(f, "{}", c),
            Symbol::Space => write!(f, " "),
            Symbol::Next => write!(f, "next"),
            Symbol::Backspace => write!(f, "Backspace"),
            Symbol::Unresolved => write!(f, "?"),
        }
    }
}

/// Map a refined group to a symbol, then apply the space / next / backspace
/// gestures
pub fn resolve(group: Group, hand: &LandmarkSet) -> Symbol {
    let symbol = match group {
        0 => fist_letter(hand),
        1 => open_hand_letter(hand),
        2 => {
            if hand.distance(MIDDLE_TIP, THUMB_TIP) > 42.0 {
                Symbol::Letter('C')
            } else {
                Symbol::Letter('O')
            }
        }
        3 => {
            if hand.distance(INDEX_TIP, MIDDLE_TIP) > 72.0 {
                Symbol::Letter('G')
            } else {
                Symbol::Letter('H')
            }
        }
        4 => Symbol::Letter('L'),
        5 => pqz_letter(hand),
        6 => Symbol::Letter('X'),
        7 => {
            if hand.distance(INDEX_TIP, THUMB_TIP) > 42.0 {
                Symbol::Letter('Y')
            } else {
                Symbol::Letter('J')
            }
        }
        _ => Symbol::Unresolved,
    };

    let open_hand_unresolved = group == 1 && symbol == Symbol::Unresolved;
    apply_gestures(symbol, open_hand_unresolved, hand)
}

fn apply_gestures(mut symbol: Symbol, open_hand_unresolved: bool, hand: &LandmarkSet) -> Symbol {
    if (open_hand_unresolved || symbol.is_letter(&['E', 'S', 'X', 'Y', 'B']))
        && hand.bends() == [E, C, C, E]
    {
        symbol = Symbol::Space;
    }

    if symbol.is_letter(&['E', 'Y', 'B'])
        && hand.x(THUMB_TIP) < hand.x(INDEX_MCP)
        && hand.bends() == [E, E, E, E]
    {
        symbol = Symbol::Next;
    }

    if (symbol == Symbol::Next || symbol.is_letter(&['B', 'C', 'H', 'F', 'X']))
        && is_delete_gesture(hand)
    {
        symbol = Symbol::Backspace;
    }

    symbol
}

/// Wrist right of every fingertip, thumb tip above every fingertip and joint
fn is_delete_gesture(hand: &LandmarkSet) -> bool {
    let wrist = hand.x(WRIST);
    let thumb = hand.y(THUMB_TIP);
    hand.fingertip_xs().iter().all(|&x| wrist > x)
        && hand.fingertip_ys().iter().all(|&y| thumb < y)
        && hand.pip_ys().iter().all(|&y| thumb < y)
}

/// A, T, E, M, N, S: where the thumb sits against the curled fingers.
/// Later matches override earlier ones.
fn fist_letter(hand: &LandmarkSet) -> Symbol {
    let (tx, ty) = (hand.x(THUMB_TIP), hand.y(THUMB_TIP));
    let mut letter = 'S';

    if tx < hand.x(INDEX_PIP)
        && tx < hand.x(MIDDLE_PIP)
        && tx < hand.x(RING_PIP)
        && tx < hand.x(PINKY_PIP)
    {
        letter = 'A';
    }
    if tx > hand.x(INDEX_PIP)
        && tx < hand.x(MIDDLE_PIP)
        && tx < hand.x(RING_PIP)
        && tx < hand.x(PINKY_PIP)
        && ty < hand.y(RING_PIP)
        && ty < hand.y(PINKY_PIP)
    {
        letter = 'T';
    }
    if hand.fingertip_ys().iter().all(|&y| ty > y) {
        letter = 'E';
    }
    if tx > hand.x(INDEX_PIP)
        && tx > hand.x(MIDDLE_PIP)
        && tx > hand.x(RING_PIP)
        && ty < hand.y(PINKY_PIP)
    {
        letter = 'M';
    }
    if tx > hand.x(INDEX_PIP)
        && tx > hand.x(MIDDLE_PIP)
        && ty < hand.y(PINKY_PIP)
        && ty < hand.y(RING_PIP)
    {
        letter = 'N';
    }

    Symbol::Letter(letter)
}

/// P, Q, Z
fn pqz_letter(hand: &LandmarkSet) -> Symbol {
    let tx = hand.x(THUMB_TIP);
    if tx > hand.x(MIDDLE_TIP) && tx > hand.x(RING_TIP) && tx > hand.x(PINKY_TIP) {
        if hand.y(INDEX_TIP) < hand.y(INDEX_MCP) {
            Symbol::Letter('Z')
        } else {
            Symbol::Letter('Q')
        }
    } else {
        Symbol::Letter('P')
    }
}

/// B, D, F, I, W, K, U, V, R from which fingers are up. Later matches
/// override earlier ones.
fn open_hand_letter(hand: &LandmarkSet) -> Symbol {
    let bends = hand.bends();
    let thumb_y = hand.y(THUMB_TIP);
    let knuckle_y = hand.y(MIDDLE_MCP);
    let two_up = bends == [E, E, C, C];
    // how much wider the two raised fingertips are than their joints
    let spread = hand.distance(INDEX_TIP, MIDDLE_TIP) - hand.distance(INDEX_PIP, MIDDLE_PIP);

    let mut letter = None;
    if bends == [E, E, E, E] {
        letter = Some('B');
    }
    if bends == [E, C, C, C] {
        letter = Some('D');
    }
    if bends == [C, E, E, E] {
        letter = Some('F');
    }
    if bends == [C, C, C, E] {
        letter = Some('I');
    }
    if bends == [E, E, E, C] {
        letter = Some('W');
    }
    if two_up && thumb_y < knuckle_y {
        letter = Some('K');
    }
    if two_up && spread < 8.0 {
        letter = Some('U');
    }
    if two_up && spread >= 8.0 && thumb_y > knuckle_y {
        letter = Some('V');
    }
    if two_up && hand.x(INDEX_TIP) > hand.x(MIDDLE_TIP) {
        letter = Some('R');
    }

    letter.map_or(Symbol::Unresolved, Symbol::Letter)
}

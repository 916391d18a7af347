//! Hand landmark geometry
//!
//! A [`LandmarkSet`] holds the 21 tracked points of one hand in the pixel
//! space of the classifier canvas. Image y grows downward, so a finger whose
//! tip sits above its proximal joint has the smaller y.

use serde::Deserialize;
use std::fmt;

/// Number of landmarks tracked per hand
pub const LANDMARK_COUNT: usize = 21;

/// Landmark indices (hand landmark model convention)
pub mod landmarks {
    pub const WRIST: usize = 0;
    pub const THUMB_CMC: usize = 1;
    pub const THUMB_MCP: usize = 2;
    pub const THUMB_IP: usize = 3;
    pub const THUMB_TIP: usize = 4;
    pub const INDEX_MCP: usize = 5;
    pub const INDEX_PIP: usize = 6;
    pub const INDEX_DIP: usize = 7;
    pub const INDEX_TIP: usize = 8;
    pub const MIDDLE_MCP: usize = 9;
    pub const MIDDLE_PIP: usize = 10;
    pub const MIDDLE_DIP: usize = 11;
    pub const MIDDLE_TIP: usize = 12;
    pub const RING_MCP: usize = 13;
    pub const RING_PIP: usize = 14;
    pub const RING_DIP: usize = 15;
    pub const RING_TIP: usize = 16;
    pub const PINKY_MCP: usize = 17;
    pub const PINKY_PIP: usize = 18;
    pub const PINKY_DIP: usize = 19;
    pub const PINKY_TIP: usize = 20;
}

use landmarks::*;

/// Integer pixel coordinate, read from JSON as `[x, y]`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<[i32; 2]> for Point {
    fn from([x, y]: [i32; 2]) -> Self {
        Self { x, y }
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// Euclidean distance between two points
pub fn distance(p: Point, q: Point) -> f64 {
    let dx = f64::from(p.x) - f64::from(q.x);
    let dy = f64::from(p.y) - f64::from(q.y);
    (dx * dx + dy * dy).sqrt()
}

/// The four non-thumb fingers
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Finger {
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    pub const ALL: [Finger; 4] = [Finger::Index, Finger::Middle, Finger::Ring, Finger::Pinky];

    /// (tip, pip) landmark indices
    pub const fn joints(self) -> (usize, usize) {
        match self {
            Finger::Index => (INDEX_TIP, INDEX_PIP),
            Finger::Middle => (MIDDLE_TIP, MIDDLE_PIP),
            Finger::Ring => (RING_TIP, RING_PIP),
            Finger::Pinky => (PINKY_TIP, PINKY_PIP),
        }
    }
}

/// Vertical state of a finger's tip against its proximal joint
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bend {
    /// Tip above the joint
    Extended,
    /// Tip below the joint
    Curled,
    /// Tip exactly level with the joint
    Level,
}

/// Error type for malformed landmark input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LandmarkError {
    WrongCount { found: usize },
}

impl fmt::Display for LandmarkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LandmarkError::WrongCount { found } => write!(
                f,
                "expected {} hand landmarks, got {}",
                LANDMARK_COUNT, found
            ),
        }
    }
}

impl std::error::Error for LandmarkError {}

/// Exactly 21 landmarks of one hand
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LandmarkSet {
    points: [Point; LANDMARK_COUNT],
}

impl LandmarkSet {
    pub fn new(points: [Point; LANDMARK_COUNT]) -> Self {
        Self { points }
    }

    /// Build from any slice, rejecting the wrong number of points
    pub fn from_slice(points: &[Point]) -> Result<Self, LandmarkError> {
        let points: [Point; LANDMARK_COUNT] = points
            .try_into()
            .map_err(|_| LandmarkError::WrongCount {
                found: points.len(),
            })?;
        Ok(Self { points })
    }

    pub fn point(&self, idx: usize) -> Point {
        self.points[idx]
    }

    /// Mutable access, mostly for building synthetic poses
    pub fn set(&mut self, idx: usize, point: impl Into<Point>) {
        self.points[idx] = point.into();
    }

    pub fn x(&self, idx: usize) -> i32 {
        self.points[idx].x
    }

    pub fn y(&self, idx: usize) -> i32 {
        self.points[idx].y
    }

    /// Euclidean distance between two landmarks
    pub fn distance(&self, a: usize, b: usize) -> f64 {
        distance(self.points[a], self.points[b])
    }

    /// Tip strictly above its joint
    pub fn extended(&self, tip: usize, pip: usize) -> bool {
        self.points[tip].y < self.points[pip].y
    }

    /// Tip strictly below its joint
    pub fn curled(&self, tip: usize, pip: usize) -> bool {
        self.points[tip].y > self.points[pip].y
    }

    pub fn bend(&self, finger: Finger) -> Bend {
        let (tip, pip) = finger.joints();
        if self.extended(tip, pip) {
            Bend::Extended
        } else if self.curled(tip, pip) {
            Bend::Curled
        } else {
            Bend::Level
        }
    }

    /// Bends of index, middle, ring, pinky in that order
    pub fn bends(&self) -> [Bend; 4] {
        Finger::ALL.map(|f| self.bend(f))
    }

    pub fn is_extended(&self, finger: Finger) -> bool {
        self.bend(finger) == Bend::Extended
    }

    pub fn is_curled(&self, finger: Finger) -> bool {
        self.bend(finger) == Bend::Curled
    }

    /// x of the four non-thumb fingertips
    pub fn fingertip_xs(&self) -> [i32; 4] {
        [INDEX_TIP, MIDDLE_TIP, RING_TIP, PINKY_TIP].map(|i| self.points[i].x)
    }

    /// y of the four non-thumb fingertips
    pub fn fingertip_ys(&self) -> [i32; 4] {
        [INDEX_TIP, MIDDLE_TIP, RING_TIP, PINKY_TIP].map(|i| self.points[i].y)
    }

    /// y of the four proximal joints
    pub fn pip_ys(&self) -> [i32; 4] {
        [INDEX_PIP, MIDDLE_PIP, RING_PIP, PINKY_PIP].map(|i| self.points[i].y)
    }
}

impl TryFrom<Vec<Point>> for LandmarkSet {
    type Error = LandmarkError;

    fn try_from(points: Vec<Point>) -> Result<Self, Self::Error> {
        Self::from_slice(&points)
    }
}

impl TryFrom<&[[i32; 2]]> for LandmarkSet {
    type Error = LandmarkError;

    fn try_from(raw: &[[i32; 2]]) -> Result<Self, Self::Error> {
        let points: Vec<Point> = raw.iter().copied().map(Point::from).collect();
        Self::from_slice(&points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_hand() -> LandmarkSet {
        LandmarkSet::new([Point::new(200, 200); LANDMARK_COUNT])
    }

    #[test]
    fn test_distance() {
        assert_eq!(distance(Point::new(0, 0), Point::new(3, 4)), 5.0);
        assert_eq!(distance(Point::new(-2, 7), Point::new(-2, 7)), 0.0);
    }

    #[test]
    fn test_wrong_count_rejected() {
        for n in [0, 20, 22] {
            let points = vec![Point::default(); n];
            assert_eq!(
                LandmarkSet::from_slice(&points),
                Err(LandmarkError::WrongCount { found: n })
            );
        }
        assert!(LandmarkSet::from_slice(&[Point::default(); 21]).is_ok());
    }

    #[test]
    fn test_error_message() {
        let err = LandmarkSet::try_from(vec![Point::default(); 5]).unwrap_err();
        assert_eq!(err.to_string(), "expected 21 hand landmarks, got 5");
    }

    #[test]
    fn test_extended_is_strict() {
        let mut hand = flat_hand();
        assert!(!hand.extended(INDEX_TIP, INDEX_PIP));
        assert!(!hand.curled(INDEX_TIP, INDEX_PIP));
        assert_eq!(hand.bend(Finger::Index), Bend::Level);

        hand.set(INDEX_TIP, (200, 199));
        assert!(hand.extended(INDEX_TIP, INDEX_PIP));
        assert_eq!(hand.bend(Finger::Index), Bend::Extended);

        hand.set(INDEX_TIP, (200, 201));
        assert!(hand.curled(INDEX_TIP, INDEX_PIP));
        assert_eq!(hand.bend(Finger::Index), Bend::Curled);
    }

    #[test]
    fn test_bends_order() {
        let mut hand = flat_hand();
        hand.set(INDEX_TIP, (200, 100));
        hand.set(RING_TIP, (200, 300));
        hand.set(PINKY_TIP, (200, 100));
        assert_eq!(
            hand.bends(),
            [Bend::Extended, Bend::Level, Bend::Curled, Bend::Extended]
        );
    }

    #[test]
    fn test_from_raw_pairs() {
        let raw: Vec<[i32; 2]> = (0..21).map(|i| [i, i * 2]).collect();
        let hand = LandmarkSet::try_from(raw.as_slice()).unwrap();
        assert_eq!(hand.point(PINKY_TIP), Point::new(20, 40));
    }
}

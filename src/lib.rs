//! Finger-spelling recognizer
//!
//! Turns per-frame hand landmarks plus coarse classifier scores into
//! letters, debounces them into typed text and offers word suggestions.

pub mod composer;
pub mod config;
pub mod frames;
pub mod geometry;
pub mod refiner;
pub mod resolver;
pub mod session;
pub mod speech;
pub mod stabilizer;
pub mod stats;
pub mod suggest;

//! Recognition session - frames in, composed text out
//!
//! Holds everything that survives between frames: the stabilizer history,
//! the text buffer, the current suggestions. Speech and suggestion lookup
//! are injected so the session runs the same against real engines and
//! test doubles.

use crate::composer::{BackspaceStatus, SuggestionUpdate, TextComposer};
use crate::geometry::{LandmarkError, LandmarkSet, Point};
use crate::refiner::{self, Group, ProbabilityVector, RankingError};
use crate::resolver::{self, Symbol};
use crate::speech::Speech;
use crate::stabilizer::{Commit, Stabilizer};
use crate::stats::{FrameStats, Timer};
use crate::suggest::SuggestionProvider;
use std::fmt;

/// Where spoken feedback goes
pub trait Speaker {
    fn say(&self, text: &str);

    /// Flip speech on/off, returns the new state
    fn toggle(&self) -> bool;
}

impl Speaker for Speech {
    fn say(&self, text: &str) {
        Speech::say(self, text)
    }

    fn toggle(&self) -> bool {
        Speech::toggle(self)
    }
}

/// One detected hand as delivered by the tracker and classifier
#[derive(Clone, Debug, Default)]
pub struct HandObservation {
    pub landmarks: Vec<Point>,
    pub probabilities: Vec<f32>,
}

/// Error type for frames that cannot be recognized
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    Landmarks(LandmarkError),
    Ranking(RankingError),
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::Landmarks(e) => write!(f, "bad landmarks: {}", e),
            FrameError::Ranking(e) => write!(f, "bad classifier output: {}", e),
        }
    }
}

impl std::error::Error for FrameError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FrameError::Landmarks(e) => Some(e),
            FrameError::Ranking(e) => Some(e),
        }
    }
}

impl From<LandmarkError> for FrameError {
    fn from(e: LandmarkError) -> Self {
        FrameError::Landmarks(e)
    }
}

impl From<RankingError> for FrameError {
    fn from(e: RankingError) -> Self {
        FrameError::Ranking(e)
    }
}

/// What a frame did
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    /// No hand, or no classifier scores: nothing changed
    NoHand,
    Recognized {
        group: Group,
        symbol: Symbol,
        commit: Option<Commit>,
        /// Committed text after this frame
        text: String,
    },
}

impl FrameOutcome {
    pub fn symbol(&self) -> Option<Symbol> {
        match self {
            FrameOutcome::NoHand => None,
            FrameOutcome::Recognized { symbol, .. } => Some(*symbol),
        }
    }
}

/// Refine the classifier's top-2 groups against the hand, then resolve to a
/// symbol. Returns the refined group alongside.
pub fn recognize(hand: &LandmarkSet, probabilities: &ProbabilityVector) -> (Group, Symbol) {
    let ranking = probabilities.ranking();
    let group = refiner::refine(ranking.first, ranking.second, hand);
    let symbol = resolver::resolve(group, hand);
    tracing::trace!(
        first = ranking.first,
        second = ranking.second,
        group,
        symbol = %symbol,
        "frame recognized"
    );
    (group, symbol)
}

pub struct Session {
    composer: TextComposer,
    stabilizer: Stabilizer,
    speaker: Box<dyn Speaker>,
    suggester: Box<dyn SuggestionProvider>,
    suggestions: Vec<String>,
    stats: FrameStats,
}

impl Session {
    pub fn new(speaker: Box<dyn Speaker>, suggester: Box<dyn SuggestionProvider>) -> Self {
        Self {
            composer: TextComposer::new(),
            stabilizer: Stabilizer::new(),
            speaker,
            suggester,
            suggestions: Vec::new(),
            stats: FrameStats::default(),
        }
    }

    /// Run one camera frame through recognition and debouncing.
    ///
    /// Malformed input is rejected before any state is touched. Landmarks
    /// are checked first; a hand with no classifier scores counts as no data.
    #[hotpath::measure]
    pub fn process_frame(
        &mut self,
        observation: Option<&HandObservation>,
    ) -> Result<FrameOutcome, FrameError> {
        let Some(observation) = observation else {
            self.stats.no_hand += 1;
            return Ok(FrameOutcome::NoHand);
        };

        let timer = Timer::start();
        let hand = match LandmarkSet::from_slice(&observation.landmarks) {
            Ok(hand) => hand,
            Err(e) => {
                self.stats.rejected += 1;
                return Err(e.into());
            }
        };
        if observation.probabilities.is_empty() {
            self.stats.no_hand += 1;
            return Ok(FrameOutcome::NoHand);
        }
        let probabilities = match ProbabilityVector::from_slice(&observation.probabilities) {
            Ok(probabilities) => probabilities,
            Err(e) => {
                self.stats.rejected += 1;
                return Err(e.into());
            }
        };

        let (group, symbol) = recognize(&hand, &probabilities);
        let commit = self.stabilizer.observe(symbol);
        match commit {
            Some(Commit::Append(c)) => {
                self.composer.append_committed(c);
                tracing::info!(letter = %c, text = self.composer.text(), "letter committed");
                self.speaker.say(&c.to_string());
            }
            Some(Commit::Delete) => {
                if let BackspaceStatus::Removed(c) = self.composer.backspace() {
                    tracing::info!(removed = %c, text = self.composer.text(), "backspace committed");
                }
            }
            None => {}
        }
        self.refresh_suggestions();
        timer.finish(&mut self.stats);

        Ok(FrameOutcome::Recognized {
            group,
            symbol,
            commit,
            text: self.composer.text().to_string(),
        })
    }

    /// Close the active word with a space and speak it
    pub fn add_space(&mut self) {
        if let Some(word) = self.composer.add_space() {
            tracing::debug!(word, "word closed");
            self.speaker.say(&word);
        }
        self.refresh_suggestions();
    }

    pub fn backspace(&mut self) -> BackspaceStatus {
        let status = self.composer.backspace();
        self.refresh_suggestions();
        status
    }

    /// Empty the text and suggestions. Gesture history is kept.
    pub fn clear(&mut self) {
        self.composer.clear();
        self.suggestions.clear();
        tracing::debug!("session cleared");
    }

    /// Swap the active word for `candidate` and speak it
    pub fn replace_active_word(&mut self, candidate: &str) -> bool {
        let replaced = self.composer.replace_active_word(candidate);
        if replaced {
            tracing::info!(candidate, text = self.composer.text(), "word replaced");
            self.speaker.say(candidate.trim());
            self.refresh_suggestions();
        }
        replaced
    }

    /// Replace the active word with suggestion `index`; out of range is a
    /// no-op
    pub fn pick_suggestion(&mut self, index: usize) -> bool {
        match self.suggestions.get(index).cloned() {
            Some(word) => self.replace_active_word(&word),
            None => {
                tracing::debug!(index, available = self.suggestions.len(), "no such suggestion");
                false
            }
        }
    }

    /// Read the whole text aloud
    pub fn speak_text(&self) {
        let text = self.composer.text().trim();
        if !text.is_empty() {
            self.speaker.say(text);
        }
    }

    pub fn toggle_speech(&self) -> bool {
        let enabled = self.speaker.toggle();
        tracing::info!(enabled, "speech toggled");
        enabled
    }

    pub fn text(&self) -> &str {
        self.composer.text()
    }

    pub fn active_word(&self) -> &str {
        self.composer.active_word()
    }

    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    pub fn stabilizer(&self) -> &Stabilizer {
        &self.stabilizer
    }

    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }

    fn refresh_suggestions(&mut self) {
        match self.composer.suggestion_update() {
            SuggestionUpdate::Query(word) => {
                self.suggestions = self.suggester.suggest(&word);
                tracing::debug!(word, suggestions = ?self.suggestions, "suggestions updated");
            }
            SuggestionUpdate::Clear => self.suggestions.clear(),
            SuggestionUpdate::Keep => {}
        }
    }
}

//! Committed text buffer
//!
//! Owns the output string and the "active word" (everything after the last
//! space) that suggestion lookups and word replacement work on.

/// Outcome of a backspace request
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackspaceStatus {
    Removed(char),
    /// Nothing to remove
    Empty,
}

#[derive(Debug, Default, Clone)]
pub struct TextComposer {
    text: String,
    /// Last active word handed to the suggestion lookup
    last_queried: String,
}

impl TextComposer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn append_committed(&mut self, ch: char) {
        self.text.push(ch);
    }

    /// Append one space unless the text is empty or already ends in one.
    /// Returns the word the space just closed, if any.
    pub fn add_space(&mut self) -> Option<String> {
        if self.text.is_empty() || self.text.ends_with(' ') {
            return None;
        }
        let word = self.active_word().to_string();
        self.text.push(' ');
        (!word.is_empty()).then_some(word)
    }

    pub fn backspace(&mut self) -> BackspaceStatus {
        match self.text.pop() {
            Some(c) => BackspaceStatus::Removed(c),
            None => BackspaceStatus::Empty,
        }
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.last_queried.clear();
    }

    /// Everything after the last space
    pub fn active_word(&self) -> &str {
        match self.text.rfind(' ') {
            Some(idx) => &self.text[idx + 1..],
            None => &self.text,
        }
    }

    /// Swap the active word for `candidate`, upper-cased. A blank candidate
    /// or an empty active word leaves the text alone.
    pub fn replace_active_word(&mut self, candidate: &str) -> bool {
        let candidate = candidate.trim();
        if candidate.is_empty() || self.active_word().is_empty() {
            return false;
        }
        let start = self.text.rfind(' ').map_or(0, |idx| idx + 1);
        self.text.truncate(start);
        self.text.push_str(&candidate.to_uppercase());
        true
    }

    /// What the suggestion list should do after the latest change
    pub fn suggestion_update(&mut self) -> SuggestionUpdate {
        if self.text.trim().is_empty() {
            return SuggestionUpdate::Keep;
        }
        let word = self.active_word().trim().to_string();
        if word.is_empty() {
            SuggestionUpdate::Clear
        } else if word != self.last_queried {
            self.last_queried.clone_from(&word);
            SuggestionUpdate::Query(word)
        } else {
            SuggestionUpdate::Keep
        }
    }
}

/// Suggestion refresh decision
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SuggestionUpdate {
    /// Active word changed: look up this prefix
    Query(String),
    /// No active word: drop current suggestions
    Clear,
    Keep,
}

//! Frame-to-keystroke debouncing
//!
//! A pose is held for many frames but must produce one character. The
//! stabilizer keeps the last ten raw symbols and commits only on the frame
//! where the `next` gesture first appears. What gets committed is read from
//! the history slot at `(counter - 1) mod 10` before the current frame is
//! recorded, i.e. the symbol seen two frames before `next`.

use crate::resolver::Symbol;

/// Slots in the circular symbol history
pub const HISTORY_LEN: usize = 10;

/// Text edit produced by a commit
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Commit {
    Append(char),
    Delete,
}

#[derive(Debug, Clone)]
pub struct Stabilizer {
    history: [Symbol; HISTORY_LEN],
    /// Index of the most recently recorded frame, -1 before the first
    counter: i64,
    previous: Option<Symbol>,
}

impl Default for Stabilizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Stabilizer {
    pub fn new() -> Self {
        Self {
            history: [Symbol::Space; HISTORY_LEN],
            counter: -1,
            previous: None,
        }
    }

    /// Feed one frame's raw symbol; returns the edit to apply, if any
    pub fn observe(&mut self, raw: Symbol) -> Option<Commit> {
        let rising_edge = raw == Symbol::Next && self.previous != Some(Symbol::Next);
        let commit = if rising_edge {
            let held = self.lookback();
            tracing::debug!(held = %held, counter = self.counter, "commit gesture");
            match held {
                Symbol::Letter(c) => Some(Commit::Append(c)),
                Symbol::Backspace => Some(Commit::Delete),
                Symbol::Space | Symbol::Next | Symbol::Unresolved => None,
            }
        } else {
            None
        };

        self.previous = Some(raw);
        self.counter += 1;
        self.history[slot(self.counter)] = raw;
        commit
    }

    /// The symbol a commit made now would use
    pub fn lookback(&self) -> Symbol {
        self.history[slot(self.counter - 1)]
    }

    pub fn counter(&self) -> i64 {
        self.counter
    }

    pub fn previous(&self) -> Option<Symbol> {
        self.previous
    }

    pub fn history(&self) -> &[Symbol; HISTORY_LEN] {
        &self.history
    }
}

fn slot(counter: i64) -> usize {
    counter.rem_euclid(HISTORY_LEN as i64) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: Symbol = Symbol::Letter('A');
    const B: Symbol = Symbol::Letter('B');

    fn feed(stabilizer: &mut Stabilizer, symbols: &[Symbol]) -> Vec<Commit> {
        symbols
            .iter()
            .filter_map(|&s| stabilizer.observe(s))
            .collect()
    }

    #[test]
    fn test_slot_arithmetic() {
        assert_eq!(slot(-2), 8);
        assert_eq!(slot(-1), 9);
        assert_eq!(slot(0), 0);
        assert_eq!(slot(13), 3);
    }

    #[test]
    fn test_lookback_reads_counter_minus_one() {
        let mut stabilizer = Stabilizer::new();
        feed(&mut stabilizer, &[A, B]);
        assert_eq!(stabilizer.counter(), 1);
        assert_eq!(stabilizer.lookback(), A);

        feed(&mut stabilizer, &[B]);
        assert_eq!(stabilizer.lookback(), B);
    }

    #[test]
    fn test_held_letter_commits_nothing() {
        let mut stabilizer = Stabilizer::new();
        assert!(feed(&mut stabilizer, &[A; 25]).is_empty());
        assert_eq!(stabilizer.counter(), 24);
    }

    #[test]
    fn test_rising_edge_commits_once() {
        let mut stabilizer = Stabilizer::new();
        let commits = feed(&mut stabilizer, &[A, A, Symbol::Next]);
        assert_eq!(commits, vec![Commit::Append('A')]);

        assert_eq!(stabilizer.observe(Symbol::Next), None);
        assert_eq!(stabilizer.observe(Symbol::Next), None);
    }

    #[test]
    fn test_commits_symbol_two_frames_back() {
        let mut stabilizer = Stabilizer::new();
        let commits = feed(&mut stabilizer, &[B, A, Symbol::Next]);
        assert_eq!(commits, vec![Commit::Append('B')]);
    }

    #[test]
    fn test_next_again_after_release() {
        let mut stabilizer = Stabilizer::new();
        let commits = feed(
            &mut stabilizer,
            &[A, A, Symbol::Next, Symbol::Next, B, B, Symbol::Next],
        );
        assert_eq!(commits, vec![Commit::Append('A'), Commit::Append('B')]);
    }

    #[test]
    fn test_early_next_reads_blank_history() {
        let mut stabilizer = Stabilizer::new();
        assert_eq!(stabilizer.observe(Symbol::Next), None);

        let mut stabilizer = Stabilizer::new();
        assert!(feed(&mut stabilizer, &[A, Symbol::Next]).is_empty());
    }

    #[test]
    fn test_backspace_commit() {
        let mut stabilizer = Stabilizer::new();
        let commits = feed(
            &mut stabilizer,
            &[Symbol::Backspace, Symbol::Backspace, Symbol::Next],
        );
        assert_eq!(commits, vec![Commit::Delete]);
    }

    #[test]
    fn test_non_letters_are_never_committed() {
        for held in [Symbol::Space, Symbol::Unresolved] {
            let mut stabilizer = Stabilizer::new();
            assert!(feed(&mut stabilizer, &[held, held, Symbol::Next]).is_empty());
        }
    }

    #[test]
    fn test_history_wraps() {
        let mut stabilizer = Stabilizer::new();
        let mut frames = vec![B; 11];
        frames.push(A);
        frames.push(A);
        frames.push(Symbol::Next);
        assert_eq!(feed(&mut stabilizer, &frames), vec![Commit::Append('A')]);
        assert_eq!(stabilizer.history()[slot(stabilizer.counter())], Symbol::Next);
    }
}

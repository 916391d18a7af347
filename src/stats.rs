//! Recognition stats: per-frame timing and per-letter accuracy

use serde::Serialize;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

#[derive(Clone, Default, Debug)]
pub struct FrameStats {
    pub samples: Vec<Duration>,
    pub no_hand: usize,
    pub rejected: usize,
}

impl FrameStats {
    pub fn record(&mut self, duration: Duration) {
        self.samples.push(duration);
    }

    pub fn summary(&self) -> String {
        if self.samples.is_empty() {
            return format!(
                "No frames processed ({} without a hand, {} rejected)\n",
                self.no_hand, self.rejected
            );
        }
        let total: Duration = self.samples.iter().sum();
        let avg = total / self.samples.len() as u32;
        let min = self.samples.iter().min().copied().unwrap_or_default();
        let max = self.samples.iter().max().copied().unwrap_or_default();
        format!(
            "Frames (n={}): avg={}us min={}us max={}us total={:.1}ms, {} without a hand, {} rejected\n",
            self.samples.len(),
            avg.as_micros(),
            min.as_micros(),
            max.as_micros(),
            total.as_secs_f64() * 1000.0,
            self.no_hand,
            self.rejected
        )
    }
}

/// Timer helper that records into [`FrameStats`]
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn finish(self, stats: &mut FrameStats) {
        stats.record(self.start.elapsed());
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct LetterScore {
    pub total: usize,
    pub correct: usize,
}

impl LetterScore {
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.correct as f64 / self.total as f64
        }
    }
}

/// Expected-vs-recognized tally for labelled recordings
#[derive(Clone, Debug, Default, Serialize)]
pub struct AccuracyReport {
    pub letters: BTreeMap<String, LetterScore>,
    /// expected -> recognized -> count, mistakes only
    pub confusions: BTreeMap<String, BTreeMap<String, usize>>,
}

impl AccuracyReport {
    pub fn record(&mut self, expected: &str, recognized: &str) {
        let score = self.letters.entry(expected.to_string()).or_default();
        score.total += 1;
        if expected == recognized {
            score.correct += 1;
        } else {
            *self
                .confusions
                .entry(expected.to_string())
                .or_default()
                .entry(recognized.to_string())
                .or_default() += 1;
        }
    }

    pub fn overall(&self) -> LetterScore {
        self.letters
            .values()
            .fold(LetterScore::default(), |acc, s| LetterScore {
                total: acc.total + s.total,
                correct: acc.correct + s.correct,
            })
    }

    pub fn summary(&self) -> String {
        let mut out = String::new();
        for (letter, score) in &self.letters {
            out.push_str(&format!(
                "{:>9}: {:>4}/{:<4} {:>6.1}%",
                letter,
                score.correct,
                score.total,
                score.accuracy() * 100.0
            ));
            if let Some(confusions) = self.confusions.get(letter) {
                let mut worst: Vec<_> = confusions.iter().collect();
                worst.sort_by(|a, b| b.1.cmp(a.1).then(a.0.cmp(b.0)));
                let listed: Vec<String> = worst
                    .iter()
                    .take(3)
                    .map(|(s, n)| format!("{}x{}", s, n))
                    .collect();
                out.push_str(&format!("  (as {})", listed.join(", ")));
            }
            out.push('\n');
        }
        let overall = self.overall();
        if overall.total == 0 {
            out.push_str("No labelled frames.\n");
        } else {
            out.push_str(&format!(
                "Overall: {}/{} {:.1}%\n",
                overall.correct,
                overall.total,
                overall.accuracy() * 100.0
            ));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accuracy_tally() {
        let mut report = AccuracyReport::default();
        report.record("A", "A");
        report.record("A", "S");
        report.record("B", "B");

        assert_eq!(report.letters["A"], LetterScore { total: 2, correct: 1 });
        assert_eq!(report.confusions["A"]["S"], 1);
        assert!(!report.confusions.contains_key("B"));
        assert_eq!(report.overall(), LetterScore { total: 3, correct: 2 });
        assert!(report.summary().contains("Overall: 2/3 66.7%"));
    }

    #[test]
    fn test_empty_summaries() {
        assert!(AccuracyReport::default().summary().contains("No labelled frames"));
        assert!(FrameStats::default().summary().starts_with("No frames processed"));
    }

    #[test]
    fn test_frame_summary() {
        let mut stats = FrameStats::default();
        stats.record(Duration::from_micros(100));
        stats.record(Duration::from_micros(300));
        let summary = stats.summary();
        assert!(summary.contains("n=2"));
        assert!(summary.contains("avg=200us"));
    }
}

//! JSON-lines frame input
//!
//! Each line is either a tracked frame (landmarks, classifier scores,
//! optional expected label for evaluation) or a control command standing in
//! for the UI buttons. Extra fields such as the tracker's `bbox` are ignored.

use crate::geometry::Point;
use crate::session::HandObservation;
use anyhow::{Context, Result};
use serde::Deserialize;

/// UI actions that are not hand frames
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum ControlCommand {
    Space,
    Backspace,
    Clear,
    Speak,
    ToggleSpeech,
    Pick { index: usize },
    Replace { word: String },
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FrameRecord {
    #[serde(default)]
    pub landmarks: Option<Vec<Point>>,
    #[serde(default)]
    pub probabilities: Vec<f32>,
    /// Label for evaluation runs: a letter, `space`, `next` or `backspace`
    #[serde(default)]
    pub expected: Option<String>,
}

impl FrameRecord {
    /// `None` when no hand was tracked
    pub fn observation(&self) -> Option<HandObservation> {
        Some(HandObservation {
            landmarks: self.landmarks.clone()?,
            probabilities: self.probabilities.clone(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Frame(FrameRecord),
    Command(ControlCommand),
}

/// Parse one line; blank lines and `#` comments give `None`
pub fn parse_line(line: &str) -> Result<Option<Input>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let value: serde_json::Value = serde_json::from_str(line).context("invalid JSON")?;
    let input = if value.get("command").is_some() {
        Input::Command(serde_json::from_value(value).context("invalid command")?)
    } else {
        Input::Frame(serde_json::from_value(value).context("invalid frame")?)
    };
    Ok(Some(input))
}

/// Parse a whole recording, failing on the first bad line
pub fn parse_all(contents: &str) -> Result<Vec<Input>> {
    let mut inputs = Vec::new();
    for (i, line) in contents.lines().enumerate() {
        if let Some(input) = parse_line(line).with_context(|| format!("line {}", i + 1))? {
            inputs.push(input);
        }
    }
    Ok(inputs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commands() {
        assert_eq!(
            parse_line(r#"{"command": "space"}"#).unwrap(),
            Some(Input::Command(ControlCommand::Space))
        );
        assert_eq!(
            parse_line(r#"{"command": "toggle_speech"}"#).unwrap(),
            Some(Input::Command(ControlCommand::ToggleSpeech))
        );
        assert_eq!(
            parse_line(r#"{"command": "pick", "index": 2}"#).unwrap(),
            Some(Input::Command(ControlCommand::Pick { index: 2 }))
        );
        assert_eq!(
            parse_line(r#"{"command": "replace", "word": "hello"}"#).unwrap(),
            Some(Input::Command(ControlCommand::Replace {
                word: "hello".into()
            }))
        );
        assert!(parse_line(r#"{"command": "jump"}"#).is_err());
    }

    #[test]
    fn test_no_hand_lines() {
        for line in [r#"{"landmarks": null}"#, "{}"] {
            let Some(Input::Frame(frame)) = parse_line(line).unwrap() else {
                panic!("expected frame for {}", line);
            };
            assert!(frame.observation().is_none());
        }
    }

    #[test]
    fn test_hand_frame() {
        let points: Vec<String> = (0..21).map(|i| format!("[{},{}]", i, i * 2)).collect();
        let line = format!(
            r#"{{"landmarks": [{}], "bbox": [10, 20, 300, 400], "probabilities": [0.1,0.2,0.3,0.1,0.1,0.1,0.05,0.05], "expected": "A"}}"#,
            points.join(",")
        );
        let Some(Input::Frame(frame)) = parse_line(&line).unwrap() else {
            panic!("expected frame");
        };
        assert_eq!(frame.expected.as_deref(), Some("A"));

        let obs = frame.observation().unwrap();
        assert_eq!(obs.landmarks.len(), 21);
        assert_eq!(obs.landmarks[20], Point::new(20, 40));
        assert_eq!(obs.probabilities.len(), 8);
    }

    #[test]
    fn test_skips_blank_and_comments() {
        assert_eq!(parse_line("   ").unwrap(), None);
        assert_eq!(parse_line("# recorded 2024").unwrap(), None);
    }

    #[test]
    fn test_parse_all_reports_line() {
        let err = parse_all("{}\n{\"command\": \"clear\"}\nnot json\n").unwrap_err();
        assert_eq!(err.to_string(), "line 3");

        let inputs = parse_all("{}\n\n{\"command\": \"clear\"}\n").unwrap();
        assert_eq!(inputs.len(), 2);
    }
}

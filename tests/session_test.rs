//! End-to-end recognition through the public session API

use fingerspell::frames::{self, Input};
use fingerspell::geometry::{LandmarkError, Point};
use fingerspell::resolver::Symbol;
use fingerspell::session::{FrameError, FrameOutcome, HandObservation, Session, Speaker};
use fingerspell::stabilizer::Commit;
use fingerspell::suggest::{Dictionary, SuggestionProvider};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

#[derive(Clone, Default)]
struct Spoken(Rc<RefCell<Vec<String>>>);

impl Speaker for Spoken {
    fn say(&self, text: &str) {
        self.0.borrow_mut().push(text.to_string());
    }

    fn toggle(&self) -> bool {
        false
    }
}

struct CountingProvider {
    calls: Rc<Cell<usize>>,
}

impl SuggestionProvider for CountingProvider {
    fn suggest(&self, prefix: &str) -> Vec<String> {
        self.calls.set(self.calls.get() + 1);
        vec![prefix.to_lowercase()]
    }
}

fn scores(top: usize, second: usize) -> Vec<f32> {
    let mut probabilities = vec![0.01; 8];
    probabilities[top] = 0.7;
    probabilities[second] = 0.2;
    probabilities
}

/// Curved hand, middle tip well clear of the thumb
fn c_pose() -> HandObservation {
    let mut landmarks = vec![Point::new(200, 200); 21];
    landmarks[12] = Point::new(260, 200);
    HandObservation {
        landmarks,
        probabilities: scores(2, 3),
    }
}

/// Open palm, thumb tucked across: the commit gesture
fn next_pose() -> HandObservation {
    let mut landmarks = vec![Point::new(200, 300); 21];
    landmarks[0] = Point::new(200, 380);
    landmarks[4] = Point::new(150, 260);
    landmarks[5] = Point::new(220, 250);
    for (pip, tip, x) in [(6, 8, 230), (10, 12, 250), (14, 16, 270), (18, 20, 290)] {
        landmarks[pip] = Point::new(x, 200);
        landmarks[tip] = Point::new(x, 100);
    }
    HandObservation {
        landmarks,
        probabilities: scores(7, 3),
    }
}

/// The C shape turned over: wrist on the right, thumb on top
fn backspace_pose() -> HandObservation {
    let mut pose = c_pose();
    pose.landmarks[0] = Point::new(300, 200);
    pose.landmarks[4] = Point::new(200, 150);
    pose
}

fn session_with(spoken: &Spoken, words: &[&str]) -> Session {
    Session::new(
        Box::new(spoken.clone()),
        Box::new(Dictionary::new(words.iter().copied(), 4)),
    )
}

fn feed(session: &mut Session, frames: &[Option<HandObservation>]) -> Vec<Commit> {
    frames
        .iter()
        .filter_map(|frame| match session.process_frame(frame.as_ref()) {
            Ok(FrameOutcome::Recognized { commit, .. }) => commit,
            Ok(FrameOutcome::NoHand) => None,
            Err(e) => panic!("unexpected frame error: {}", e),
        })
        .collect()
}

#[test]
fn test_poses_resolve() {
    let spoken = Spoken::default();
    let mut session = session_with(&spoken, &[]);
    let symbol = |session: &mut Session, pose: HandObservation| {
        session.process_frame(Some(&pose)).unwrap().symbol()
    };
    assert_eq!(symbol(&mut session, c_pose()), Some(Symbol::Letter('C')));
    assert_eq!(symbol(&mut session, next_pose()), Some(Symbol::Next));
    assert_eq!(symbol(&mut session, backspace_pose()), Some(Symbol::Backspace));
}

#[test]
fn test_spelling_with_commits() {
    let spoken = Spoken::default();
    let mut session = session_with(&spoken, &["cat", "cc", "cool"]);

    let commits = feed(
        &mut session,
        &[
            Some(c_pose()),
            Some(c_pose()),
            Some(next_pose()),
            Some(next_pose()),
            None,
            Some(c_pose()),
            Some(c_pose()),
            Some(next_pose()),
        ],
    );

    assert_eq!(commits, vec![Commit::Append('C'), Commit::Append('C')]);
    assert_eq!(session.text(), "CC");

    // every recognized frame carries the text as it stands after that frame
    match session.process_frame(Some(&c_pose())) {
        Ok(FrameOutcome::Recognized { symbol, text, .. }) => {
            assert_eq!(symbol, Symbol::Letter('C'));
            assert_eq!(text, "CC");
        }
        other => panic!("unexpected outcome {:?}", other),
    }
    assert_eq!(*spoken.0.borrow(), vec!["C", "C"]);
    assert_eq!(session.suggestions(), ["cc"]);
}

#[test]
fn test_backspace_gesture_deletes() {
    let spoken = Spoken::default();
    let mut session = session_with(&spoken, &[]);

    let commits = feed(
        &mut session,
        &[
            Some(c_pose()),
            Some(c_pose()),
            Some(next_pose()),
            Some(backspace_pose()),
            Some(backspace_pose()),
            Some(next_pose()),
        ],
    );

    assert_eq!(commits, vec![Commit::Append('C'), Commit::Delete]);
    assert_eq!(session.text(), "");
}

#[test]
fn test_no_hand_frames_leave_history_alone() {
    let spoken = Spoken::default();
    let mut session = session_with(&spoken, &[]);
    feed(&mut session, &[Some(c_pose()), None, None]);
    assert_eq!(session.stabilizer().counter(), 0);
    assert_eq!(session.stabilizer().previous(), Some(Symbol::Letter('C')));
}

#[test]
fn test_malformed_frame_rejected_without_side_effects() {
    let spoken = Spoken::default();
    let mut session = session_with(&spoken, &[]);
    feed(&mut session, &[Some(c_pose()), Some(c_pose())]);

    let mut broken = next_pose();
    broken.landmarks.truncate(5);
    assert_eq!(
        session.process_frame(Some(&broken)),
        Err(FrameError::Landmarks(LandmarkError::WrongCount { found: 5 }))
    );
    assert_eq!(session.stabilizer().counter(), 1);

    // the commit still fires on the next good frame
    assert_eq!(feed(&mut session, &[Some(next_pose())]), vec![Commit::Append('C')]);
}

#[test]
fn test_suggestions_queried_once_per_word_change() {
    let calls = Rc::new(Cell::new(0));
    let mut session = Session::new(
        Box::new(Spoken::default()),
        Box::new(CountingProvider {
            calls: Rc::clone(&calls),
        }),
    );

    feed(&mut session, &[Some(c_pose()), Some(c_pose()), Some(next_pose())]);
    assert_eq!(calls.get(), 1);
    assert_eq!(session.suggestions(), ["c"]);

    // holding the pose does not re-query
    feed(&mut session, &[Some(next_pose()), Some(c_pose()), Some(c_pose())]);
    assert_eq!(calls.get(), 1);

    session.add_space();
    assert!(session.suggestions().is_empty());
    assert_eq!(calls.get(), 1);
}

#[test]
fn test_word_replacement_speaks_candidate() {
    let spoken = Spoken::default();
    let mut session = session_with(&spoken, &["cat", "cool"]);
    feed(&mut session, &[Some(c_pose()), Some(c_pose()), Some(next_pose())]);
    assert_eq!(session.suggestions(), ["cat", "cool"]);

    assert!(session.pick_suggestion(1));
    assert_eq!(session.text(), "COOL");
    assert_eq!(session.active_word(), "COOL");

    session.add_space();
    assert!(!session.replace_active_word("cat"));
    assert_eq!(session.text(), "COOL ");
    assert_eq!(*spoken.0.borrow(), vec!["C", "cool", "COOL"]);
}

#[test]
fn test_recorded_stream() {
    let spoken = Spoken::default();
    let mut session = session_with(&spoken, &[]);
    let pose = |obs: HandObservation| {
        let points: Vec<String> = obs
            .landmarks
            .iter()
            .map(|p| format!("[{},{}]", p.x, p.y))
            .collect();
        let probs: Vec<String> = obs.probabilities.iter().map(|p| p.to_string()).collect();
        format!(
            r#"{{"landmarks": [{}], "probabilities": [{}]}}"#,
            points.join(","),
            probs.join(",")
        )
    };
    let recording = [
        pose(c_pose()),
        pose(c_pose()),
        pose(next_pose()),
        r#"{"command": "space"}"#.to_string(),
        r#"{"landmarks": null}"#.to_string(),
        r#"{"command": "speak"}"#.to_string(),
    ]
    .join("\n");

    for input in frames::parse_all(&recording).unwrap() {
        match input {
            Input::Frame(frame) => {
                session.process_frame(frame.observation().as_ref()).unwrap();
            }
            Input::Command(frames::ControlCommand::Space) => session.add_space(),
            Input::Command(frames::ControlCommand::Speak) => session.speak_text(),
            Input::Command(other) => panic!("unexpected command {:?}", other),
        }
    }

    assert_eq!(session.text(), "C ");
    assert_eq!(*spoken.0.borrow(), vec!["C", "C", "C"]);
}

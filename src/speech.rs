//! Speech output
//!
//! Utterances are handed to a background worker so the frame loop never
//! waits on audio. Only the newest request matters: the worker drops
//! anything queued behind it, and engines cut off the utterance in flight.

use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

/// Something that can say a line of text
pub trait SpeechEngine: Send {
    /// Start saying `text`; should not block until playback ends
    fn speak(&mut self, text: &str) -> Result<(), Box<dyn std::error::Error>>;

    /// Cut off whatever is playing
    fn stop(&mut self) {}
}

// ============================================================================
// Command engine - shells out to say / espeak / spd-say
// ============================================================================

pub struct CommandEngine {
    program: String,
    args: Vec<String>,
    current: Option<Child>,
}

impl CommandEngine {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            current: None,
        }
    }

    /// Platform default speech command
    pub fn system_default(rate: u32) -> Self {
        #[cfg(target_os = "macos")]
        {
            Self::new("say", vec!["-r".into(), rate.to_string()])
        }
        #[cfg(not(target_os = "macos"))]
        {
            Self::new("espeak", vec!["-s".into(), rate.to_string()])
        }
    }
}

impl SpeechEngine for CommandEngine {
    fn speak(&mut self, text: &str) -> Result<(), Box<dyn std::error::Error>> {
        self.stop();
        let child = Command::new(&self.program)
            .args(&self.args)
            .arg(text)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        self.current = Some(child);
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(mut child) = self.current.take() {
            // already exited is fine
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

impl Drop for CommandEngine {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Engine that only logs
pub struct SilentEngine;

impl SpeechEngine for SilentEngine {
    fn speak(&mut self, text: &str) -> Result<(), Box<dyn std::error::Error>> {
        tracing::debug!(text, "speech (silent)");
        Ok(())
    }
}

// ============================================================================
// Worker handle
// ============================================================================

enum SpeechRequest {
    Say(String),
    Stop,
}

/// Handle to the background speech worker
///
/// Cheap to share: sending never blocks and failures are logged, not
/// returned, since speech is best-effort.
pub struct Speech {
    tx: Option<flume::Sender<SpeechRequest>>,
    enabled: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl Speech {
    /// Spawn the worker thread around `engine`
    pub fn spawn(mut engine: Box<dyn SpeechEngine>, enabled: bool) -> Self {
        let (tx, rx) = flume::unbounded::<SpeechRequest>();
        let worker = thread::spawn(move || {
            while let Ok(request) = rx.recv() {
                // newest request wins
                let request = rx.drain().last().unwrap_or(request);
                match request {
                    SpeechRequest::Say(text) => {
                        if let Err(e) = engine.speak(&text) {
                            tracing::warn!("speech failed: {}", e);
                        }
                    }
                    SpeechRequest::Stop => engine.stop(),
                }
            }
            engine.stop();
        });

        Self {
            tx: Some(tx),
            enabled: Arc::new(AtomicBool::new(enabled)),
            worker: Some(worker),
        }
    }

    pub fn say(&self, text: &str) {
        if !self.is_enabled() || text.trim().is_empty() {
            return;
        }
        if let Some(tx) = &self.tx {
            let _ = tx.send(SpeechRequest::Say(text.to_string()));
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Toggle speech on/off, returns new state. Turning it off silences
    /// the current utterance.
    pub fn toggle(&self) -> bool {
        let new_state = !self.enabled.load(Ordering::SeqCst);
        self.enabled.store(new_state, Ordering::SeqCst);
        if !new_state {
            if let Some(tx) = &self.tx {
                let _ = tx.send(SpeechRequest::Stop);
            }
        }
        new_state
    }
}

impl Drop for Speech {
    fn drop(&mut self) {
        // closing the channel ends the worker loop
        self.tx.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

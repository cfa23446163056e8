//! Chat session state machine
//!
//! Defines the states for one conversation surface:
//! Idle → Awaiting → Idle (typed turn), Idle → Recording → Awaiting (voice turn)
//!
//! The session is a pure value. `apply` consumes an event and returns the
//! next snapshot plus the side-effect commands the runtime must execute;
//! all IO (the HTTP request, speech capture) happens outside this module.
//! A single `Phase` enum makes the "never recording and awaiting at once"
//! invariant structural.

use crate::error::{ChatError, NetworkError, TranscriptionError};
use crate::message::{Message, MessageId};

/// Session phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Ready for input
    #[default]
    Idle,
    /// Capturing speech; partial transcripts replace the input buffer
    Recording,
    /// One question in flight, waiting for the answer service
    Awaiting,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Idle => write!(f, "Idle"),
            Phase::Recording => write!(f, "Recording"),
            Phase::Awaiting => write!(f, "Awaiting"),
        }
    }
}

/// Inputs to the session: user intents and IO completions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// User submitted the given text (send button / return key)
    Submit { text: String },
    /// User toggled the microphone
    ToggleRecording,
    /// User edited the draft input
    SetInput { text: String },
    /// Capture produced a new partial transcript (replaces the previous one)
    TranscriptUpdated { text: String },
    /// Speech capture failed to start or failed mid-stream
    TranscriptionFailed(TranscriptionError),
    /// The answer service replied
    ResponseReceived { answer: String },
    /// The answer service call failed
    ResponseFailed(NetworkError),
}

/// Side effects the runtime must perform after a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Issue exactly one POST to the answer service
    AskQuestion { question: String },
    /// Begin speech capture
    StartCapture,
    /// Finalize and release speech capture
    StopCapture,
}

/// Immutable snapshot of one conversation surface
///
/// The presentation layer reads the accessors and renders; it never
/// mutates fields directly. New snapshots come out of [`ChatSession::apply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatSession {
    history: Vec<Message>,
    input_buffer: String,
    phase: Phase,
    last_error: Option<ChatError>,
    next_id: MessageId,
}

impl ChatSession {
    /// Create a new idle session with empty history
    pub fn new() -> Self {
        Self {
            history: Vec::new(),
            input_buffer: String::new(),
            phase: Phase::Idle,
            last_error: None,
            next_id: 1,
        }
    }

    /// Ordered message history (insertion order = display order)
    pub fn history(&self) -> &[Message] {
        &self.history
    }

    /// Current draft text
    pub fn input_buffer(&self) -> &str {
        &self.input_buffer
    }

    /// Current phase
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Check if capturing speech
    pub fn is_recording(&self) -> bool {
        self.phase == Phase::Recording
    }

    /// Check if a question is in flight
    pub fn is_awaiting_response(&self) -> bool {
        self.phase == Phase::Awaiting
    }

    /// Error from the most recent failed turn, if any
    pub fn last_error(&self) -> Option<&ChatError> {
        self.last_error.as_ref()
    }

    /// Apply one event, returning the next snapshot and the commands the
    /// runtime must execute
    ///
    /// Events that are not valid in the current phase (stale IO completions,
    /// submission while a question is in flight) are logged and dropped; the
    /// returned snapshot equals `self` and no commands are emitted.
    pub fn apply(&self, event: Event) -> (ChatSession, Vec<Command>) {
        let mut next = self.clone();
        let mut commands = Vec::new();

        match (self.phase, event) {
            (Phase::Idle, Event::Submit { text }) => {
                next.submit_question(&text, &mut commands);
            }

            (Phase::Idle, Event::ToggleRecording) => {
                tracing::debug!("Chat session: Idle -> Recording");
                next.last_error = None;
                next.phase = Phase::Recording;
                commands.push(Command::StartCapture);
            }

            (Phase::Recording, Event::ToggleRecording) => {
                // Capture is released before any request starts
                commands.push(Command::StopCapture);
                let transcript = std::mem::take(&mut next.input_buffer);
                if transcript.trim().is_empty() {
                    tracing::debug!("Chat session: Recording -> Idle (empty transcript)");
                    next.phase = Phase::Idle;
                } else {
                    next.submit_question(&transcript, &mut commands);
                }
            }

            (Phase::Recording, Event::TranscriptUpdated { text }) => {
                tracing::trace!("Partial transcript: {:?}", text);
                next.input_buffer = text;
            }

            (Phase::Recording, Event::TranscriptionFailed(e)) => {
                tracing::error!("Transcription failed: {}", e);
                next.phase = Phase::Idle;
                next.last_error = Some(e.into());
                commands.push(Command::StopCapture);
            }

            (Phase::Awaiting, Event::ResponseReceived { answer }) => {
                tracing::debug!("Chat session: Awaiting -> Idle (answer received)");
                next.append_message(&answer, false);
                next.phase = Phase::Idle;
            }

            (Phase::Awaiting, Event::ResponseFailed(e)) => {
                tracing::error!("Answer request failed: {}", e);
                next.phase = Phase::Idle;
                next.last_error = Some(e.into());
            }

            (Phase::Awaiting, Event::Submit { .. }) => {
                // One outstanding request at a time
                tracing::warn!("Ignoring submission while a question is in flight");
            }

            (Phase::Awaiting, Event::ToggleRecording) => {
                tracing::warn!("Ignoring recording toggle while a question is in flight");
            }

            (Phase::Idle | Phase::Awaiting, Event::SetInput { text }) => {
                next.input_buffer = text;
            }

            (Phase::Recording, Event::SetInput { .. }) => {
                // The live transcript owns the buffer while recording
                tracing::debug!("Ignoring input edit while recording");
            }

            (phase, event) => {
                // Stale IO completions after the session left the phase
                tracing::warn!("Dropping {:?} in phase {}", event, phase);
            }
        }

        (next, commands)
    }

    /// Commit a user message and emit the request command, or do nothing if
    /// the trimmed text is empty
    fn submit_question(&mut self, text: &str, commands: &mut Vec<Command>) {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            tracing::debug!("Ignoring blank submission");
            return;
        }

        tracing::debug!("Chat session: {} -> Awaiting ({} chars)", self.phase, trimmed.len());
        self.append_message(trimmed, true);
        self.input_buffer.clear();
        self.last_error = None;
        self.phase = Phase::Awaiting;
        commands.push(Command::AskQuestion {
            question: trimmed.to_string(),
        });
    }

    fn append_message(&mut self, text: &str, is_user: bool) {
        let message = if is_user {
            Message::user(self.next_id, text)
        } else {
            Message::assistant(self.next_id, text)
        };
        self.next_id += 1;
        self.history.push(message);
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

//! Session runtime - event loop orchestration
//!
//! Owns the [`ChatSession`] on a single tokio task: user intents and IO
//! completions are funneled into one loop, every event goes through
//! [`ChatSession::apply`], and each new snapshot is published on a watch
//! channel for the presentation layer. IO completions arriving on other
//! threads never touch the session directly.

use crate::config::Config;
use crate::error::{NetworkError, Result};
use crate::qa::{QaService, RemoteQaService};
use crate::session::{ChatSession, Command, Event};
use crate::transcribe::{SpeechRecognizer, TranscriptEvent};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

/// Capacity of the intent and IO completion queues
const EVENT_QUEUE_DEPTH: usize = 32;

/// Driver that owns the session and executes its commands
///
/// Constructed and launched via [`ChatRuntime::spawn`]; lives on its own
/// task until the last [`ChatHandle`] is dropped.
pub struct ChatRuntime {
    session: ChatSession,
    snapshots: watch::Sender<ChatSession>,
    io_tx: mpsc::Sender<Event>,
    qa: Arc<dyn QaService>,
    recognizer: Box<dyn SpeechRecognizer>,
}

impl ChatRuntime {
    /// Spawn the driver task for one conversation surface
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(qa: Arc<dyn QaService>, recognizer: Box<dyn SpeechRecognizer>) -> ChatHandle {
        let (intent_tx, intent_rx) = mpsc::channel(EVENT_QUEUE_DEPTH);
        let (io_tx, io_rx) = mpsc::channel(EVENT_QUEUE_DEPTH);
        let (snapshot_tx, snapshot_rx) = watch::channel(ChatSession::new());

        let runtime = ChatRuntime {
            session: ChatSession::new(),
            snapshots: snapshot_tx,
            io_tx,
            qa,
            recognizer,
        };
        tokio::spawn(runtime.run(intent_rx, io_rx));

        ChatHandle {
            intents: intent_tx,
            snapshots: snapshot_rx,
        }
    }

    /// Spawn with the real HTTP client built from config
    pub fn with_config(config: &Config, recognizer: Box<dyn SpeechRecognizer>) -> Result<ChatHandle> {
        let qa = Arc::new(RemoteQaService::new(config)?);
        Ok(Self::spawn(qa, recognizer))
    }

    /// Main event loop
    async fn run(
        mut self,
        mut intents: mpsc::Receiver<Event>,
        mut io_events: mpsc::Receiver<Event>,
    ) {
        tracing::info!("Chat session runtime started");

        loop {
            let event = tokio::select! {
                intent = intents.recv() => match intent {
                    Some(event) => event,
                    // Presentation layer dropped every handle
                    None => break,
                },
                // io_events can never close while self.io_tx lives
                Some(event) = io_events.recv() => event,
            };
            self.dispatch(event).await;
        }

        // Capture must be released on teardown too; stop is idempotent
        self.recognizer.stop().await;
        tracing::info!("Chat session runtime stopped");
    }

    /// Run one event (plus any follow-ups command execution injects)
    /// through the session and publish the resulting snapshots
    async fn dispatch(&mut self, event: Event) {
        let mut pending = VecDeque::from([event]);
        while let Some(event) = pending.pop_front() {
            let (next, commands) = self.session.apply(event);
            self.session = next;
            // send only fails once every receiver is gone
            let _ = self.snapshots.send(self.session.clone());

            for command in commands {
                if let Some(follow_up) = self.execute(command).await {
                    pending.push_back(follow_up);
                }
            }
        }
    }

    /// Execute one command, returning an event to feed straight back into
    /// the session (a failed capture start surfaces through the normal
    /// transcription-failure path)
    async fn execute(&mut self, command: Command) -> Option<Event> {
        match command {
            Command::AskQuestion { question } => {
                let qa = Arc::clone(&self.qa);
                let io_tx = self.io_tx.clone();
                tokio::spawn(async move {
                    // The HTTP client is blocking; keep it off the runtime threads
                    let result = tokio::task::spawn_blocking(move || qa.ask(&question)).await;
                    let event = match result {
                        Ok(Ok(answer)) => Event::ResponseReceived { answer },
                        Ok(Err(e)) => Event::ResponseFailed(e),
                        Err(e) => {
                            tracing::error!("Answer task failed: {}", e);
                            Event::ResponseFailed(NetworkError::Transport(format!(
                                "answer task failed: {}",
                                e
                            )))
                        }
                    };
                    if io_tx.send(event).await.is_err() {
                        tracing::debug!("Runtime stopped before the answer arrived");
                    }
                });
                None
            }

            Command::StartCapture => match self.recognizer.start().await {
                Ok(mut updates) => {
                    tracing::debug!("Speech capture started");
                    let io_tx = self.io_tx.clone();
                    tokio::spawn(async move {
                        while let Some(update) = updates.recv().await {
                            let event = match update {
                                TranscriptEvent::Partial(text) => Event::TranscriptUpdated { text },
                                TranscriptEvent::Error(e) => Event::TranscriptionFailed(e),
                            };
                            if io_tx.send(event).await.is_err() {
                                break;
                            }
                        }
                        tracing::debug!("Transcript stream ended");
                    });
                    None
                }
                Err(e) => {
                    tracing::error!("Failed to start speech capture: {}", e);
                    Some(Event::TranscriptionFailed(e))
                }
            },

            Command::StopCapture => {
                self.recognizer.stop().await;
                None
            }
        }
    }
}

/// Presentation-facing handle to a running session
///
/// Cloneable; all clones feed the same session. Dropping the last clone
/// stops the runtime and releases speech capture.
#[derive(Clone)]
pub struct ChatHandle {
    intents: mpsc::Sender<Event>,
    snapshots: watch::Receiver<ChatSession>,
}

impl ChatHandle {
    /// Submit the given text as a question
    pub async fn submit(&self, text: impl Into<String>) {
        self.send_intent(Event::Submit { text: text.into() }).await;
    }

    /// Start or stop speech capture
    pub async fn toggle_recording(&self) {
        self.send_intent(Event::ToggleRecording).await;
    }

    /// Replace the draft input text
    pub async fn update_input(&self, text: impl Into<String>) {
        self.send_intent(Event::SetInput { text: text.into() }).await;
    }

    /// Current session snapshot
    pub fn snapshot(&self) -> ChatSession {
        self.snapshots.borrow().clone()
    }

    /// Receiver observing every snapshot the runtime publishes
    pub fn watch(&self) -> watch::Receiver<ChatSession> {
        self.snapshots.clone()
    }

    async fn send_intent(&self, event: Event) {
        if let Err(e) = self.intents.send(event).await {
            tracing::warn!("Chat session runtime is gone; dropping {:?}", e.0);
        }
    }
}

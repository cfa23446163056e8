//! End-to-end chat session scenarios through the public handle
//!
//! These tests drive a full `ChatRuntime` with deterministic test doubles
//! for the answer service and the speech recognizer, allowing CI testing
//! without a network or live audio.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use voxchat::{
    ChatError, ChatRuntime, ChatSession, Message, NetworkError, Phase, QaService,
    SpeechRecognizer, TranscriptEvent, TranscriptionError,
};

/// Install a test subscriber once; respects RUST_LOG for debugging
fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Answer service double that replays a script of results and records
/// every question it was asked
struct ScriptedQa {
    asked: Mutex<Vec<String>>,
    script: Mutex<VecDeque<Result<String, NetworkError>>>,
}

impl ScriptedQa {
    fn new(script: Vec<Result<String, NetworkError>>) -> Arc<Self> {
        Arc::new(Self {
            asked: Mutex::new(Vec::new()),
            script: Mutex::new(script.into()),
        })
    }

    fn asked(&self) -> Vec<String> {
        self.asked.lock().unwrap().clone()
    }
}

impl QaService for ScriptedQa {
    fn ask(&self, question: &str) -> Result<String, NetworkError> {
        self.asked.lock().unwrap().push(question.to_string());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("unscripted question: {}", question))
    }
}

/// Recognizer double that emits a fixed series of transcript events after
/// capture starts and counts how often capture was released
struct FakeRecognizer {
    script: Vec<TranscriptEvent>,
    stops: Arc<AtomicUsize>,
}

impl FakeRecognizer {
    fn new(script: Vec<TranscriptEvent>) -> Self {
        Self {
            script,
            stops: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn stop_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.stops)
    }
}

#[async_trait::async_trait]
impl SpeechRecognizer for FakeRecognizer {
    async fn start(&mut self) -> Result<mpsc::Receiver<TranscriptEvent>, TranscriptionError> {
        let (tx, rx) = mpsc::channel(8);
        let script = self.script.clone();
        tokio::spawn(async move {
            for event in script {
                if tx.send(event).await.is_err() {
                    break;
                }
            }
        });
        Ok(rx)
    }

    async fn stop(&mut self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
    }
}

/// Await the first snapshot satisfying the predicate
async fn wait_for(
    rx: &mut watch::Receiver<ChatSession>,
    what: &str,
    predicate: impl FnMut(&ChatSession) -> bool,
) -> ChatSession {
    tokio::time::timeout(Duration::from_secs(5), rx.wait_for(predicate))
        .await
        .unwrap_or_else(|_| panic!("timed out waiting for {}", what))
        .expect("session runtime stopped")
        .clone()
}

// ============================================================================
// Typed turns
// ============================================================================

#[tokio::test]
async fn typed_question_produces_answer_in_history() {
    init_logging();
    let qa = ScriptedQa::new(vec![Ok("10 PM".to_string())]);
    let handle = ChatRuntime::spawn(qa.clone(), Box::new(FakeRecognizer::new(vec![])));
    let mut rx = handle.watch();

    handle.submit("What is the curfew time?").await;
    let session = wait_for(&mut rx, "answer", |s| s.history().len() == 2).await;

    assert_eq!(session.phase(), Phase::Idle);
    assert_eq!(
        session.history(),
        &[
            Message::user(1, "What is the curfew time?"),
            Message::assistant(2, "10 PM"),
        ]
    );
    assert!(session.last_error().is_none());
    assert_eq!(qa.asked(), vec!["What is the curfew time?".to_string()]);
}

#[tokio::test]
async fn server_error_leaves_only_the_user_message() {
    init_logging();
    let qa = ScriptedQa::new(vec![Err(NetworkError::Status(500))]);
    let handle = ChatRuntime::spawn(qa.clone(), Box::new(FakeRecognizer::new(vec![])));
    let mut rx = handle.watch();

    handle.submit("test").await;
    let session = wait_for(&mut rx, "error", |s| s.last_error().is_some()).await;

    assert_eq!(session.phase(), Phase::Idle);
    assert_eq!(session.history(), &[Message::user(1, "test")]);
    assert_eq!(
        session.last_error(),
        Some(&ChatError::Network(NetworkError::Status(500)))
    );
}

#[tokio::test]
async fn error_clears_on_the_next_successful_turn() {
    init_logging();
    let qa = ScriptedQa::new(vec![
        Err(NetworkError::Transport("connection refused".to_string())),
        Ok("second answer".to_string()),
    ]);
    let handle = ChatRuntime::spawn(qa.clone(), Box::new(FakeRecognizer::new(vec![])));
    let mut rx = handle.watch();

    handle.submit("first").await;
    wait_for(&mut rx, "first error", |s| s.last_error().is_some()).await;

    handle.submit("second").await;
    let session = wait_for(&mut rx, "second answer", |s| s.history().len() == 3).await;

    assert!(session.last_error().is_none());
    assert_eq!(session.history()[2], Message::assistant(3, "second answer"));
}

// ============================================================================
// Voice turns
// ============================================================================

#[tokio::test]
async fn voice_turn_is_equivalent_to_submitting_the_transcript() {
    init_logging();
    let qa = ScriptedQa::new(vec![Ok("hi there".to_string())]);
    let recognizer = FakeRecognizer::new(vec![
        TranscriptEvent::Partial("he".to_string()),
        TranscriptEvent::Partial("hello".to_string()),
    ]);
    let stops = recognizer.stop_counter();
    let handle = ChatRuntime::spawn(qa.clone(), Box::new(recognizer));
    let mut rx = handle.watch();

    handle.toggle_recording().await;
    let session = wait_for(&mut rx, "final partial", |s| s.input_buffer() == "hello").await;
    assert!(session.is_recording());
    assert!(session.history().is_empty(), "partials never commit messages");

    handle.toggle_recording().await;
    let session = wait_for(&mut rx, "answer", |s| s.history().len() == 2).await;

    assert_eq!(
        session.history(),
        &[Message::user(1, "hello"), Message::assistant(2, "hi there")]
    );
    assert_eq!(session.input_buffer(), "");
    assert_eq!(qa.asked(), vec!["hello".to_string()]);
    assert_eq!(stops.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn silent_recording_submits_nothing() {
    init_logging();
    let qa = ScriptedQa::new(vec![]);
    let recognizer = FakeRecognizer::new(vec![]);
    let stops = recognizer.stop_counter();
    let handle = ChatRuntime::spawn(qa.clone(), Box::new(recognizer));
    let mut rx = handle.watch();

    handle.toggle_recording().await;
    wait_for(&mut rx, "recording", |s| s.is_recording()).await;
    handle.toggle_recording().await;
    let session = wait_for(&mut rx, "idle again", |s| !s.is_recording()).await;

    assert_eq!(session.phase(), Phase::Idle);
    assert!(session.history().is_empty());
    assert!(qa.asked().is_empty());
    assert_eq!(stops.load(Ordering::SeqCst), 1);
}

// ============================================================================
// Teardown
// ============================================================================

#[tokio::test]
async fn dropping_the_handle_releases_capture() {
    init_logging();
    let qa = ScriptedQa::new(vec![]);
    let recognizer = FakeRecognizer::new(vec![TranscriptEvent::Partial("unsent".to_string())]);
    let stops = recognizer.stop_counter();
    let handle = ChatRuntime::spawn(qa, Box::new(recognizer));
    let mut rx = handle.watch();

    handle.toggle_recording().await;
    wait_for(&mut rx, "recording", |s| s.is_recording()).await;

    drop(handle);
    tokio::time::timeout(Duration::from_secs(5), async {
        while stops.load(Ordering::SeqCst) < 1 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("capture was not released on teardown");
}

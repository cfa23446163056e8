//! Voxchat: chat session core for a voice-enabled Q&A front-end
//!
//! This library provides the interaction core for a chat surface:
//! - A pure session state machine (Idle / Recording / Awaiting) that turns
//!   user intents and IO completions into new snapshots plus side-effect
//!   commands
//! - A question-answering client speaking the `{"question"}` → `{"answer"}`
//!   protocol (one POST per turn, no retries)
//! - A speech capture seam for on-device recognizers, consumed as a stream
//!   of partial transcripts
//! - A tokio runtime that owns the session on a single task and marshals
//!   IO completions back onto it
//!
//! # Architecture
//!
//! ```text
//!   Presentation layer                 ChatRuntime (one task)
//!   ┌──────────────┐  submit/toggle   ┌─────────────────────────┐
//!   │  ChatHandle  │ ────────────────▶│   ChatSession::apply    │
//!   │              │◀──────────────── │   (pure transitions)    │
//!   └──────────────┘    snapshots     └────────────┬────────────┘
//!                       (watch)                    │ commands
//!                            ┌───────────────┬─────┴──────────┐
//!                            ▼               ▼                ▼
//!                      AskQuestion      StartCapture     StopCapture
//!                     ┌────────────┐   ┌─────────────────────────┐
//!                     │ QaService  │   │    SpeechRecognizer     │
//!                     │   (ureq)   │   │  (external capability)  │
//!                     └────────────┘   └─────────────────────────┘
//! ```
//!
//! The presentation layer renders [`ChatSession`] snapshots and forwards
//! intents through [`ChatHandle`]; it never mutates session state itself.

pub mod config;
pub mod error;
pub mod message;
pub mod qa;
pub mod runtime;
pub mod session;
pub mod transcribe;

pub use config::Config;
pub use error::{ChatError, NetworkError, Result, TranscriptionError};
pub use message::{Message, MessageId};
pub use qa::{QaService, RemoteQaService};
pub use runtime::{ChatHandle, ChatRuntime};
pub use session::{ChatSession, Command, Event, Phase};
pub use transcribe::{SpeechRecognizer, TranscriptEvent};

//! Speech capture interface
//!
//! Speech recognition itself is an external capability (an on-device
//! engine); this module defines the seam the session runtime drives and
//! the event stream recognizers feed back. No concrete engine ships in
//! this crate.

use crate::error::TranscriptionError;
use tokio::sync::mpsc;

/// Updates emitted while capture is live
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptEvent {
    /// Latest partial transcript; replaces the previous partial wholesale
    Partial(String),
    /// Capture failed mid-stream; terminates the stream
    Error(TranscriptionError),
}

/// Trait for speech capture implementations
#[async_trait::async_trait]
pub trait SpeechRecognizer: Send {
    /// Start capturing speech
    /// Returns a channel receiver for transcript updates
    async fn start(&mut self) -> Result<mpsc::Receiver<TranscriptEvent>, TranscriptionError>;

    /// Finalize and release the audio input
    ///
    /// Must be idempotent: safe to call repeatedly, and safe even if
    /// `start` failed or was never called.
    async fn stop(&mut self);
}

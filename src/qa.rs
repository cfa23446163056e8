//! Question-answering client
//!
//! Sends one POST per question to the remote answer service and maps the
//! response onto an answer string or a distinct `NetworkError` variant.
//! No retries, no caching: the session issues at most one request per turn
//! and each call produces exactly one outbound request.

use crate::config::Config;
use crate::error::{NetworkError, Result};
use serde::Serialize;

/// Trait for question-answering backends
///
/// `question` is non-empty by contract; the session guarantees it.
pub trait QaService: Send + Sync {
    /// Ask a single question, returning the answer text
    fn ask(&self, question: &str) -> std::result::Result<String, NetworkError>;
}

/// JSON request body for the answer service
#[derive(Serialize)]
struct QuestionRequest<'a> {
    question: &'a str,
}

/// Remote answer service speaking the {"question"} → {"answer"} protocol
#[derive(Debug)]
pub struct RemoteQaService {
    /// Endpoint URL (e.g., "http://localhost:8080/qa")
    endpoint: String,
    agent: ureq::Agent,
}

impl RemoteQaService {
    /// Create a new client from config
    ///
    /// Validates the endpoint URL format; no connection is made until
    /// [`QaService::ask`].
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;
        let endpoint = config.endpoint.clone();

        // Warn about non-HTTPS for non-localhost endpoints
        if endpoint.starts_with("http://")
            && !endpoint.contains("localhost")
            && !endpoint.contains("127.0.0.1")
            && !endpoint.contains("[::1]")
        {
            tracing::warn!(
                "Answer service endpoint uses HTTP without TLS. Questions will be transmitted unencrypted!"
            );
        }

        // Redirects disabled: exactly one outbound request per call.
        // No timeout either; a turn runs until the service responds.
        let agent = ureq::AgentBuilder::new().redirects(0).build();

        tracing::info!("Configured answer service client: endpoint={}", endpoint);

        Ok(Self { endpoint, agent })
    }
}

impl QaService for RemoteQaService {
    fn ask(&self, question: &str) -> std::result::Result<String, NetworkError> {
        tracing::debug!("Asking answer service ({} chars)", question.len());
        let start = std::time::Instant::now();

        let body = QuestionRequest { question };
        let response = self
            .agent
            .post(&self.endpoint)
            .set("Content-Type", "application/json")
            .send_json(&body)
            .map_err(|e| match e {
                ureq::Error::Status(code, _) => NetworkError::Status(code),
                ureq::Error::Transport(t) => NetworkError::Transport(t.to_string()),
            })?;

        // ureq only errors on 4xx/5xx; with redirects disabled a 3xx comes
        // back as a plain response, so enforce 2xx here
        let status = response.status();
        if !(200..300).contains(&status) {
            return Err(NetworkError::Status(status));
        }

        let raw = response
            .into_string()
            .map_err(|e| NetworkError::Transport(format!("failed to read response body: {}", e)))?;
        let answer = parse_answer_body(&raw)?;

        tracing::info!(
            "Answer received in {:.2}s: {:?}",
            start.elapsed().as_secs_f32(),
            if answer.chars().count() > 50 {
                format!("{}...", answer.chars().take(50).collect::<String>())
            } else {
                answer.clone()
            }
        );

        Ok(answer)
    }
}

/// Extract the answer string from a response body
fn parse_answer_body(body: &str) -> std::result::Result<String, NetworkError> {
    let json: serde_json::Value =
        serde_json::from_str(body).map_err(|e| NetworkError::Decode(e.to_string()))?;

    json.get("answer")
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or(NetworkError::MissingAnswer)
}

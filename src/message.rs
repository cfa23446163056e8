//! Chat message value type
//!
//! Messages are immutable once created: the session appends them to its
//! history in generation order and never mutates or removes them.

/// Identifier assigned to messages in generation order (starts at 1)
pub type MessageId = u64;

/// A single committed chat message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Unique id, ascending in generation order
    pub id: MessageId,
    /// Message text (non-empty for committed messages)
    pub text: String,
    /// True for messages the user typed or spoke, false for answers
    pub is_user: bool,
}

impl Message {
    /// Create a user-authored message
    pub fn user(id: MessageId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            is_user: true,
        }
    }

    /// Create an assistant answer message
    pub fn assistant(id: MessageId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            is_user: false,
        }
    }
}

use chrono::Duration;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Message;

/// The conversation owned by a single run of the agent.
///
/// Messages can only be appended; nothing is edited or removed once pushed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Unique identifier for the session
    pub id: String,
    messages: Vec<Message>,
    /// The current status of the session
    pub status: SessionStatus,
}

/// The status of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// Waiting on the model or dispatching tools
    Running,
    /// A completion signal was received
    Done,
}

impl Session {
    /// Creates a running session seeded with one user message.
    pub fn seeded(first: Message) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            messages: vec![first],
            status: SessionStatus::Running,
        }
    }

    /// Appends a message to the session.
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Returns the conversation so far.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Returns the number of messages in the session.
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// Marks the session as finished.
    pub fn finish(&mut self) {
        self.status = SessionStatus::Done;
    }

    pub fn is_done(&self) -> bool {
        self.status == SessionStatus::Done
    }

    /// Time between the first and the latest message.
    pub fn elapsed(&self) -> Duration {
        match (self.messages.first(), self.messages.last()) {
            (Some(first), Some(last)) => last.created_at - first.created_at,
            _ => Duration::zero(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_appends_in_order() {
        let mut session = Session::seeded(Message::new_user("q"));
        session.push(Message::new_assistant("a"));
        session.push(Message::new_user("b"));

        let contents: Vec<&str> = session.messages().iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["q", "a", "b"]);
        assert_eq!(session.message_count(), 3);
        assert!(!session.is_done());

        session.finish();
        assert_eq!(session.status, SessionStatus::Done);
    }

    #[test]
    fn test_elapsed_spans_first_to_last_message() {
        let mut session = Session::seeded(Message::new_user("q"));
        assert_eq!(session.elapsed(), Duration::zero());

        let mut reply = Message::new_assistant("a");
        reply.created_at = session.messages()[0].created_at + Duration::milliseconds(1500);
        session.push(reply);
        assert_eq!(session.elapsed().num_milliseconds(), 1500);
    }
}

//! Chat session - transcript and router round-trips
//!
//! A session is bound to one directory user. Each question is appended to
//! the transcript, routed through the backend, and the answer (or a readable
//! failure sentence) is appended after it. The transcript only lives as long
//! as the session.

use crate::client::BackendClient;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl fmt::Display for ChatRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatRole::User => f.write_str("user"),
            ChatRole::Assistant => f.write_str("assistant"),
        }
    }
}

/// Message for conversation history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    #[serde(skip)]
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn user(content: String) -> Self {
        Self {
            role: ChatRole::User,
            content,
            timestamp: Utc::now(),
        }
    }

    pub fn assistant(content: String) -> Self {
        Self {
            role: ChatRole::Assistant,
            content,
            timestamp: Utc::now(),
        }
    }
}

/// Append-only message history
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: ChatMessage) -> &ChatMessage {
        self.messages.push(message);
        &self.messages[self.messages.len() - 1]
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("No users found")]
    NoUsers,

    #[error("User '{0}' is not in the directory")]
    UnknownUser(String),
}

pub struct ChatSession<'a> {
    client: &'a BackendClient,
    username: String,
    transcript: Transcript,
}

impl<'a> ChatSession<'a> {
    /// Start a session for `requested`, or for the first directory user
    /// when none is given.
    pub async fn start(
        client: &'a BackendClient,
        requested: Option<&str>,
    ) -> Result<Self, SessionError> {
        let usernames = client.usernames().await;
        let username = select_user(&usernames, requested)?;
        tracing::info!("Chat session started for {}", username);

        Ok(Self {
            client,
            username,
            transcript: Transcript::new(),
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Route one question and return the assistant's reply
    pub async fn ask(&mut self, question: &str) -> &ChatMessage {
        self.transcript.push(ChatMessage::user(question.to_string()));
        let answer = self
            .client
            .pass_question_to_router(&self.username, question)
            .await;
        self.transcript.push(ChatMessage::assistant(answer))
    }
}

fn select_user(usernames: &[String], requested: Option<&str>) -> Result<String, SessionError> {
    let first = usernames.first().ok_or(SessionError::NoUsers)?;
    match requested {
        None => Ok(first.clone()),
        Some(name) if usernames.iter().any(|u| u == name) => Ok(name.to_string()),
        Some(name) => Err(SessionError::UnknownUser(name.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> Vec<String> {
        vec!["alice".to_string(), "bob".to_string()]
    }

    #[test]
    fn select_defaults_to_first_user() {
        assert_eq!(select_user(&directory(), None).unwrap(), "alice");
    }

    #[test]
    fn select_accepts_listed_user() {
        assert_eq!(select_user(&directory(), Some("bob")).unwrap(), "bob");
    }

    #[test]
    fn select_rejects_unknown_user() {
        let err = select_user(&directory(), Some("mallory")).unwrap_err();
        assert!(matches!(err, SessionError::UnknownUser(ref u) if u == "mallory"));
    }

    #[test]
    fn select_fails_on_empty_directory() {
        let err = select_user(&[], Some("alice")).unwrap_err();
        assert_eq!(err.to_string(), "No users found");
    }

    #[test]
    fn transcript_keeps_order() {
        let mut transcript = Transcript::new();
        assert!(transcript.is_empty());

        transcript.push(ChatMessage::user("hello".to_string()));
        let reply = transcript.push(ChatMessage::assistant("hi bob".to_string()));
        assert_eq!(reply.role, ChatRole::Assistant);

        let roles: Vec<ChatRole> = transcript.messages().iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![ChatRole::User, ChatRole::Assistant]);
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript.last().unwrap().content, "hi bob");
    }

    #[test]
    fn message_serializes_role_and_content() {
        let message = ChatMessage::user("hello".to_string());
        let wire = serde_json::to_value(&message).unwrap();
        assert_eq!(wire, serde_json::json!({"role": "user", "content": "hello"}));
    }
}

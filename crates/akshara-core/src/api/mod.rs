//! Backend contract
//!
//! One schema per operation. Responses are validated at the client boundary:
//! a body that does not match its schema is a [`ClientError::Malformed`],
//! never a silently substituted default.

pub mod http;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::language::Language;

pub use http::HttpBackend;

/// Opaque identifier of a server-side recording/transcription job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of a status poll
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskStatus {
    Pending,
    Completed {
        transcription: String,
        translation: Option<String>,
    },
    Failed {
        error: Option<String>,
    },
}

impl TaskStatus {
    /// `Completed` and `Failed` end polling.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TaskStatus::Pending)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed response from {endpoint}: {reason}")]
    Malformed { endpoint: &'static str, reason: String },

    #[error("Invalid backend URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// Operations offered by the translation backend.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Send a chat message; returns the assistant's reply.
    async fn send_text(&self, content: &str, target: Language) -> Result<String, ClientError>;

    /// Translate `text` directly into `target`.
    async fn translate(&self, text: &str, target: Language) -> Result<String, ClientError>;

    /// Ask the backend to capture audio and start transcribing it.
    async fn start_recording(&self, target: Language) -> Result<TaskId, ClientError>;

    async fn check_status(&self, task_id: &TaskId) -> Result<TaskStatus, ClientError>;
}

//! In-memory backend double for unit tests

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::api::{Backend, ClientError, TaskId, TaskStatus};
use crate::language::Language;

/// Answers from queued scripts. An exhausted status script answers `Pending`;
/// exhausted text/record scripts answer with an HTTP 500.
#[derive(Default)]
pub struct ScriptedBackend {
    replies: Mutex<VecDeque<Result<String, ClientError>>>,
    tasks: Mutex<VecDeque<Result<TaskId, ClientError>>>,
    statuses: Mutex<VecDeque<Result<TaskStatus, ClientError>>>,
    sent: Mutex<Vec<(String, Language)>>,
    recorded: Mutex<Vec<Language>>,
    status_calls: Mutex<usize>,
}

fn exhausted() -> ClientError {
    ClientError::Status {
        status: 500,
        body: "script exhausted".to_string(),
    }
}

impl ScriptedBackend {
    pub fn push_reply(&self, reply: Result<String, ClientError>) {
        self.replies.lock().unwrap().push_back(reply);
    }

    pub fn push_task(&self, task: Result<TaskId, ClientError>) {
        self.tasks.lock().unwrap().push_back(task);
    }

    pub fn push_status(&self, status: Result<TaskStatus, ClientError>) {
        self.statuses.lock().unwrap().push_back(status);
    }

    /// Every `(content, language)` pair passed to `send_text` or `translate`
    pub fn sent(&self) -> Vec<(String, Language)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn recorded(&self) -> Vec<Language> {
        self.recorded.lock().unwrap().clone()
    }

    pub fn status_calls(&self) -> usize {
        *self.status_calls.lock().unwrap()
    }
}

#[async_trait]
impl Backend for ScriptedBackend {
    async fn send_text(&self, content: &str, target: Language) -> Result<String, ClientError> {
        self.sent.lock().unwrap().push((content.to_string(), target));
        self.replies.lock().unwrap().pop_front().unwrap_or_else(|| Err(exhausted()))
    }

    async fn translate(&self, text: &str, target: Language) -> Result<String, ClientError> {
        self.send_text(text, target).await
    }

    async fn start_recording(&self, target: Language) -> Result<TaskId, ClientError> {
        self.recorded.lock().unwrap().push(target);
        self.tasks.lock().unwrap().pop_front().unwrap_or_else(|| Err(exhausted()))
    }

    async fn check_status(&self, _task_id: &TaskId) -> Result<TaskStatus, ClientError> {
        *self.status_calls.lock().unwrap() += 1;
        self.statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(TaskStatus::Pending))
    }
}

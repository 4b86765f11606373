//! Conversation controller
//!
//! `ChatSession` holds everything the assistant screen shows and applies
//! every state change: user input, backend replies, recording progress and
//! language selection. Network calls themselves happen elsewhere (the UI
//! spawns them); their results are fed back through the `complete_*` /
//! `recording_*` / `apply_poll` methods. The async helpers at the bottom
//! chain both halves for callers that can simply await.

use std::fmt;

use tracing::{error, info, warn};

use crate::api::{Backend, ClientError, TaskId, TaskStatus};
use crate::language::Language;
use crate::message::{Message, MessageId, MessageKind, MessageStore, Origin};
use crate::recording::{PollEvent, RecordingState, TransitionError};

pub const REQUEST_ERROR_TEXT: &str = "Error processing the request";
pub const AUDIO_ERROR_TEXT: &str = "Error processing audio";
pub const AUDIO_RECORDED_TEXT: &str = "Audio recorded";
pub const TRANSCRIBING_TEXT: &str = "Transcription in progress...";
pub const TRANSCRIPTION_FAILED_TEXT: &str = "Transcription failed.";
pub const NO_TRANSLATION_TEXT: &str = "No translation available.";

/// Prefix that routes input to the direct translation endpoint
pub const TRANSLATE_PREFIX: &str = "/translate ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendMode {
    /// `/message`: the backend replies as the assistant
    Chat,
    /// `/translate`: plain translation of the text
    Translate,
}

/// A text request ready to go to the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingText {
    pub content: String,
    pub target: Language,
    pub mode: SendMode,
}

impl OutgoingText {
    pub async fn send(&self, backend: &dyn Backend) -> Result<String, ClientError> {
        match self.mode {
            SendMode::Chat => backend.send_text(&self.content, self.target).await,
            SendMode::Translate => backend.translate(&self.content, self.target).await,
        }
    }
}

#[derive(Debug, Default)]
pub struct ChatSession {
    store: MessageStore,
    language: Language,
    recording: RecordingState,
    in_flight: usize,
}

impl ChatSession {
    pub fn new(language: Language) -> Self {
        Self {
            language,
            ..Self::default()
        }
    }

    pub fn messages(&self) -> &[Message] {
        self.store.all()
    }

    pub fn store(&self) -> &MessageStore {
        &self.store
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Affects requests made from now on; sent messages are left as they are.
    pub fn select_language(&mut self, language: Language) {
        if language != self.language {
            info!(from = self.language.code(), to = language.code(), "target language changed");
        }
        self.language = language;
    }

    /// True while any request issued by this session is outstanding
    pub fn is_loading(&self) -> bool {
        self.in_flight > 0
    }

    /// True between pressing the mic and the backend accepting the job
    pub fn is_recording(&self) -> bool {
        self.recording.is_recording()
    }

    pub fn recording_state(&self) -> &RecordingState {
        &self.recording
    }

    fn finish_request(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
    }

    /// Record the user's text and prepare the request for it.
    ///
    /// Blank input produces nothing: no message and no request.
    pub fn submit_text(&mut self, input: &str) -> Option<OutgoingText> {
        if input.trim().is_empty() {
            return None;
        }

        let (content, mode) = match input.strip_prefix(TRANSLATE_PREFIX) {
            Some(rest) if !rest.trim().is_empty() => (rest.to_string(), SendMode::Translate),
            _ => (input.to_string(), SendMode::Chat),
        };

        self.store.append(MessageKind::Text, Origin::User, input);
        self.in_flight += 1;

        Some(OutgoingText {
            content,
            target: self.language,
            mode,
        })
    }

    /// Apply the backend's answer to a text request. Any failure becomes
    /// the same fixed error bubble.
    pub fn complete_text<E: fmt::Display>(&mut self, result: Result<String, E>) {
        self.finish_request();
        match result {
            Ok(reply) => {
                self.store.append(MessageKind::Text, Origin::Assistant, reply);
            }
            Err(e) => {
                error!("text request failed: {}", e);
                self.store
                    .append(MessageKind::Text, Origin::Assistant, REQUEST_ERROR_TEXT);
            }
        }
    }

    /// Attach a picked image as a user message.
    pub fn attach_image(&mut self, uri: impl Into<String>) -> MessageId {
        self.store.append(MessageKind::Image, Origin::User, uri)
    }

    /// Enter the recording state. Returns the language to record for, or
    /// `None` while a previous round trip is still running.
    pub fn begin_recording(&mut self) -> Option<Language> {
        match self.recording.start() {
            Ok(()) => {
                self.in_flight += 1;
                Some(self.language)
            }
            Err(e) => {
                warn!("{}", e);
                None
            }
        }
    }

    /// The backend accepted the recording: add placeholders and wait for
    /// the transcription.
    pub fn recording_accepted(&mut self, task_id: TaskId) -> Result<MessageId, TransitionError> {
        if !self.recording.is_recording() {
            return Err(TransitionError {
                action: "accept a recording",
                state: self.recording.name(),
            });
        }
        self.finish_request();

        self.store
            .append(MessageKind::Audio, Origin::User, AUDIO_RECORDED_TEXT);
        let placeholder = self
            .store
            .append(MessageKind::Text, Origin::Assistant, TRANSCRIBING_TEXT);

        info!(%task_id, "recording accepted");
        self.recording.accept(task_id, placeholder)?;
        Ok(placeholder)
    }

    pub fn recording_failed(&mut self, err: &dyn fmt::Display) {
        error!("recording request failed: {}", err);
        if self.recording.is_recording() {
            self.finish_request();
        }
        if self.recording.fail().is_ok() {
            self.store
                .append(MessageKind::Text, Origin::Assistant, AUDIO_ERROR_TEXT);
        }
    }

    /// Apply one status poll. Returns `true` once the awaited job is over.
    ///
    /// Events for any task other than the one being awaited are dropped.
    pub fn apply_poll(&mut self, event: PollEvent) -> bool {
        let placeholder = match self.recording.awaiting() {
            Some((task_id, placeholder)) if *task_id == event.task_id => placeholder,
            _ => {
                warn!(task_id = %event.task_id, "ignoring status for a task that is not awaited");
                return false;
            }
        };

        match event.outcome {
            Ok(TaskStatus::Pending) => false,
            Ok(TaskStatus::Completed {
                transcription,
                translation,
            }) => {
                self.store.replace(placeholder, |content| *content = transcription);
                let translation = translation.unwrap_or_else(|| NO_TRANSLATION_TEXT.to_string());
                self.store
                    .append(MessageKind::Text, Origin::Assistant, translation);
                if let Err(e) = self.recording.complete() {
                    warn!("{}", e);
                }
                info!(task_id = %event.task_id, "transcription completed");
                true
            }
            Ok(TaskStatus::Failed { error }) => {
                warn!(task_id = %event.task_id, error = error.as_deref().unwrap_or("unknown"), "transcription failed");
                self.store.replace(placeholder, |content| {
                    *content = TRANSCRIPTION_FAILED_TEXT.to_string()
                });
                if let Err(e) = self.recording.fail() {
                    warn!("{}", e);
                }
                true
            }
            Err(e) => {
                error!(task_id = %event.task_id, "error checking transcription status: {}", e);
                self.store
                    .append(MessageKind::Text, Origin::Assistant, AUDIO_ERROR_TEXT);
                if let Err(e) = self.recording.fail() {
                    warn!("{}", e);
                }
                true
            }
        }
    }

    /// The poller exited without reporting a terminal status. Fails the
    /// awaited transcription; returns `false` when nothing was awaited.
    pub fn poller_stopped(&mut self) -> bool {
        let Some((task_id, _)) = self.recording.awaiting() else {
            return false;
        };
        error!(%task_id, "status poller stopped before the transcription finished");

        self.store
            .append(MessageKind::Text, Origin::Assistant, AUDIO_ERROR_TEXT);
        if let Err(e) = self.recording.fail() {
            warn!("{}", e);
        }
        true
    }

    /// Submit and await a text request. Returns `false` for blank input.
    pub async fn send_text(&mut self, backend: &dyn Backend, input: &str) -> bool {
        let Some(outgoing) = self.submit_text(input) else {
            return false;
        };
        let result = outgoing.send(backend).await;
        self.complete_text(result);
        true
    }

    /// Run `/record` and move to awaiting. Returns the task to poll.
    pub async fn start_recording(&mut self, backend: &dyn Backend) -> Option<TaskId> {
        let language = self.begin_recording()?;
        match backend.start_recording(language).await {
            Ok(task_id) => match self.recording_accepted(task_id.clone()) {
                Ok(_) => Some(task_id),
                Err(e) => {
                    warn!("{}", e);
                    None
                }
            },
            Err(e) => {
                self.recording_failed(&e);
                None
            }
        }
    }
}

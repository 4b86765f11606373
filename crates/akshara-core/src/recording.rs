//! Recording workflow: state machine and status poller
//!
//! A recording round trip is `Idle -> Recording -> AwaitingTranscription -> Done`,
//! with `Failed` reachable from the two in-flight states. While awaiting, a
//! [`StatusPoller`] asks the backend for the job status on a fixed interval
//! and forwards each answer to the owner over a channel. The owner applies
//! them, so state is only ever mutated from one place.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::api::{Backend, ClientError, TaskId, TaskStatus};
use crate::message::MessageId;

/// Default delay between status polls
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RecordingState {
    #[default]
    Idle,
    /// `/record` has been issued and has not answered yet
    Recording,
    /// The backend accepted the job; `placeholder` is the message that will
    /// receive the transcription.
    AwaitingTranscription {
        task_id: TaskId,
        placeholder: MessageId,
    },
    Done,
    Failed,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("cannot {action} while {state}")]
pub struct TransitionError {
    pub action: &'static str,
    pub state: &'static str,
}

impl RecordingState {
    pub fn name(&self) -> &'static str {
        match self {
            RecordingState::Idle => "idle",
            RecordingState::Recording => "recording",
            RecordingState::AwaitingTranscription { .. } => "awaiting transcription",
            RecordingState::Done => "done",
            RecordingState::Failed => "failed",
        }
    }

    /// True while a round trip is in flight.
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            RecordingState::Recording | RecordingState::AwaitingTranscription { .. }
        )
    }

    pub fn is_recording(&self) -> bool {
        matches!(self, RecordingState::Recording)
    }

    pub fn awaiting(&self) -> Option<(&TaskId, MessageId)> {
        match self {
            RecordingState::AwaitingTranscription { task_id, placeholder } => Some((task_id, *placeholder)),
            _ => None,
        }
    }

    fn refuse(&self, action: &'static str) -> TransitionError {
        TransitionError {
            action,
            state: self.name(),
        }
    }

    pub fn start(&mut self) -> Result<(), TransitionError> {
        if self.is_busy() {
            return Err(self.refuse("start recording"));
        }
        *self = RecordingState::Recording;
        Ok(())
    }

    pub fn accept(&mut self, task_id: TaskId, placeholder: MessageId) -> Result<(), TransitionError> {
        if !self.is_recording() {
            return Err(self.refuse("accept a recording"));
        }
        *self = RecordingState::AwaitingTranscription { task_id, placeholder };
        Ok(())
    }

    pub fn complete(&mut self) -> Result<(), TransitionError> {
        if self.awaiting().is_none() {
            return Err(self.refuse("complete a transcription"));
        }
        *self = RecordingState::Done;
        Ok(())
    }

    pub fn fail(&mut self) -> Result<(), TransitionError> {
        if !self.is_busy() {
            return Err(self.refuse("fail"));
        }
        *self = RecordingState::Failed;
        Ok(())
    }
}

/// One answer from the status endpoint
#[derive(Debug)]
pub struct PollEvent {
    pub task_id: TaskId,
    pub outcome: Result<TaskStatus, ClientError>,
}

impl PollEvent {
    pub fn is_final(&self) -> bool {
        match &self.outcome {
            Ok(status) => status.is_terminal(),
            Err(_) => true,
        }
    }
}

/// Owner handle for a running poller. Dropping it cancels the poll task.
#[derive(Debug)]
pub struct PollHandle {
    task_id: TaskId,
    handle: JoinHandle<()>,
}

impl PollHandle {
    pub fn task_id(&self) -> &TaskId {
        &self.task_id
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub fn cancel(&self) {
        if !self.handle.is_finished() {
            debug!(task_id = %self.task_id, "cancelling status poller");
            self.handle.abort();
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

pub struct StatusPoller;

impl StatusPoller {
    /// Poll `task_id` every `interval` until a terminal status or a client
    /// error, sending each result on `events`. The first poll happens one
    /// interval after spawning.
    pub fn spawn(
        backend: Arc<dyn Backend>,
        task_id: TaskId,
        interval: Duration,
        events: mpsc::UnboundedSender<PollEvent>,
    ) -> PollHandle {
        info!(%task_id, interval_ms = interval.as_millis() as u64, "starting status poller");

        let poll_id = task_id.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
            loop {
                ticker.tick().await;

                let outcome = backend.check_status(&poll_id).await;
                if let Err(e) = &outcome {
                    warn!(task_id = %poll_id, "status poll failed: {}", e);
                }

                let event = PollEvent {
                    task_id: poll_id.clone(),
                    outcome,
                };
                let finished = event.is_final();

                if events.send(event).is_err() {
                    debug!(task_id = %poll_id, "poll receiver gone, stopping");
                    break;
                }
                if finished {
                    debug!(task_id = %poll_id, "terminal status reached");
                    break;
                }
            }
        });

        PollHandle { task_id, handle }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedBackend;

    fn msg_id(store: &mut crate::message::MessageStore) -> MessageId {
        store.append(
            crate::message::MessageKind::Text,
            crate::message::Origin::Assistant,
            "placeholder",
        )
    }

    #[test]
    fn test_happy_path_transitions() {
        let mut store = crate::message::MessageStore::new();
        let mut state = RecordingState::default();

        state.start().unwrap();
        assert!(state.is_recording());

        let placeholder = msg_id(&mut store);
        state.accept(TaskId::new("t1"), placeholder).unwrap();
        assert_eq!(state.awaiting().map(|(t, _)| t.as_str()), Some("t1"));

        state.complete().unwrap();
        assert_eq!(state, RecordingState::Done);

        // A finished round trip can start again
        state.start().unwrap();
        assert!(state.is_recording());
    }

    #[test]
    fn test_cannot_start_twice() {
        let mut state = RecordingState::default();
        state.start().unwrap();

        let err = state.start().unwrap_err();
        assert_eq!(err.to_string(), "cannot start recording while recording");
    }

    #[test]
    fn test_complete_requires_awaiting() {
        let mut state = RecordingState::Recording;
        assert!(state.complete().is_err());
        assert_eq!(state, RecordingState::Recording);
    }

    #[test]
    fn test_fail_from_in_flight_states_only() {
        let mut state = RecordingState::Recording;
        state.fail().unwrap();
        assert_eq!(state, RecordingState::Failed);

        let mut idle = RecordingState::Idle;
        assert!(idle.fail().is_err());
    }

    #[tokio::test]
    async fn test_poller_stops_after_completed() {
        let backend = Arc::new(ScriptedBackend::default());
        backend.push_status(Ok(TaskStatus::Pending));
        backend.push_status(Ok(TaskStatus::Pending));
        backend.push_status(Ok(TaskStatus::Completed {
            transcription: "hello".into(),
            translation: Some("ನಮಸ್ಕಾರ".into()),
        }));
        backend.push_status(Ok(TaskStatus::Pending));

        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = StatusPoller::spawn(backend.clone(), TaskId::new("t1"), Duration::from_millis(5), tx);

        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }

        assert_eq!(events.len(), 3);
        assert!(events[2].is_final());
        assert_eq!(backend.status_calls(), 3);
        drop(handle);
    }

    #[tokio::test]
    async fn test_poller_stops_after_error() {
        let backend = Arc::new(ScriptedBackend::default());
        backend.push_status(Ok(TaskStatus::Pending));
        backend.push_status(Err(ClientError::Status {
            status: 502,
            body: "bad gateway".into(),
        }));

        let (tx, mut rx) = mpsc::unbounded_channel();
        let _handle = StatusPoller::spawn(backend.clone(), TaskId::new("t1"), Duration::from_millis(5), tx);

        let mut count = 0;
        while let Some(event) = rx.recv().await {
            count += 1;
            if count == 2 {
                assert!(event.outcome.is_err());
            }
        }

        assert_eq!(count, 2);
        assert_eq!(backend.status_calls(), 2);
    }

    #[tokio::test]
    async fn test_dropping_handle_cancels_polling() {
        let backend = Arc::new(ScriptedBackend::default());
        // Script runs dry, so the fake keeps answering Pending
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = StatusPoller::spawn(backend.clone(), TaskId::new("t1"), Duration::from_millis(5), tx);

        assert!(rx.recv().await.is_some());
        drop(handle);

        // Once aborted the sender is dropped and the channel drains to None
        while rx.recv().await.is_some() {}
        let calls = backend.status_calls();
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(backend.status_calls(), calls);
    }
}

pub mod api;
pub mod config;
pub mod content;
pub mod language;
pub mod media;
pub mod message;
pub mod recording;
pub mod session;

#[cfg(test)]
mod testing;

// Re-export main types for convenience
pub use api::{Backend, ClientError, HttpBackend, TaskId, TaskStatus};
pub use config::{Config, ConfigError};
pub use language::Language;
pub use media::{FsImagePicker, MediaError, MediaPicker};
pub use message::{Message, MessageId, MessageKind, MessageStore, Origin};
pub use recording::{PollEvent, PollHandle, RecordingState, StatusPoller};
pub use session::{ChatSession, OutgoingText, SendMode};

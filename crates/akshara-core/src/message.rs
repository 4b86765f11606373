//! Chat messages and the in-memory message store
//!
//! Messages live only for the length of a session. They are appended in
//! order and never removed; the only mutation allowed after creation is an
//! in-place content replacement (a transcription placeholder being swapped
//! for its result).

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a message, derived from a millisecond timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MessageId(i64);

impl MessageId {
    pub fn as_millis(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a message is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Text,
    Audio,
    Image,
}

/// Who a message is attributed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Origin {
    User,
    Assistant,
}

/// A single chat entry.
///
/// `content` is the text payload for [`MessageKind::Text`], or a URI for
/// audio and image messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub kind: MessageKind,
    pub content: String,
    pub origin: Origin,
}

impl Message {
    pub fn is_user(&self) -> bool {
        self.origin == Origin::User
    }
}

/// Ordered, append-only sequence of messages.
#[derive(Debug, Default)]
pub struct MessageStore {
    messages: Vec<Message>,
    last_id: Option<i64>,
}

impl MessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message stamped with the current time.
    pub fn append(&mut self, kind: MessageKind, origin: Origin, content: impl Into<String>) -> MessageId {
        let now = chrono::Utc::now().timestamp_millis();
        self.append_at(now, kind, origin, content)
    }

    /// Append using an explicit clock reading. Ids stay strictly increasing
    /// even if the clock stalls or steps backwards.
    pub fn append_at(
        &mut self,
        now_millis: i64,
        kind: MessageKind,
        origin: Origin,
        content: impl Into<String>,
    ) -> MessageId {
        let raw = match self.last_id {
            Some(last) if now_millis <= last => last + 1,
            _ => now_millis,
        };
        self.last_id = Some(raw);

        let id = MessageId(raw);
        self.messages.push(Message {
            id,
            kind,
            content: content.into(),
            origin,
        });
        id
    }

    /// Apply `update` to the content of the message with `id`.
    ///
    /// Returns `false` without touching anything when no message matches.
    pub fn replace<F>(&mut self, id: MessageId, update: F) -> bool
    where
        F: FnOnce(&mut String),
    {
        match self.messages.iter_mut().find(|m| m.id == id) {
            Some(message) => {
                update(&mut message.content);
                true
            }
            None => false,
        }
    }

    pub fn all(&self) -> &[Message] {
        &self.messages
    }

    pub fn get(&self, id: MessageId) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_append_keeps_call_order() {
        let mut store = MessageStore::new();
        store.append(MessageKind::Text, Origin::User, "one");
        store.append(MessageKind::Image, Origin::User, "file:///tmp/a.png");
        store.append(MessageKind::Text, Origin::Assistant, "three");

        let contents: Vec<&str> = store.all().iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["one", "file:///tmp/a.png", "three"]);
        assert_eq!(store.all()[1].kind, MessageKind::Image);
        assert_eq!(store.all()[2].origin, Origin::Assistant);
    }

    #[test]
    fn test_ids_unique_when_clock_stalls() {
        let mut store = MessageStore::new();
        let ids: Vec<MessageId> = (0..50)
            .map(|i| store.append_at(1_000, MessageKind::Text, Origin::User, format!("m{}", i)))
            .collect();

        let unique: HashSet<_> = ids.iter().collect();
        assert_eq!(unique.len(), ids.len());
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_ids_unique_when_clock_goes_backwards() {
        let mut store = MessageStore::new();
        let a = store.append_at(5_000, MessageKind::Text, Origin::User, "a");
        let b = store.append_at(4_000, MessageKind::Text, Origin::User, "b");
        let c = store.append_at(9_000, MessageKind::Text, Origin::User, "c");

        assert!(a < b && b < c);
        assert_eq!(c.as_millis(), 9_000);
    }

    #[test]
    fn test_ids_unique_with_real_clock() {
        let mut store = MessageStore::new();
        for _ in 0..200 {
            store.append(MessageKind::Text, Origin::Assistant, "x");
        }
        let unique: HashSet<_> = store.all().iter().map(|m| m.id).collect();
        assert_eq!(unique.len(), 200);
    }

    #[test]
    fn test_replace_touches_only_matching_message() {
        let mut store = MessageStore::new();
        let first = store.append_at(1, MessageKind::Text, Origin::User, "hello");
        let placeholder = store.append_at(2, MessageKind::Text, Origin::Assistant, "Transcription in progress...");
        let last = store.append_at(3, MessageKind::Text, Origin::Assistant, "bye");

        assert!(store.replace(placeholder, |c| *c = "namaskara".to_string()));

        assert_eq!(store.get(first).map(|m| m.content.as_str()), Some("hello"));
        assert_eq!(store.get(placeholder).map(|m| m.content.as_str()), Some("namaskara"));
        assert_eq!(store.get(last).map(|m| m.content.as_str()), Some("bye"));
        assert_eq!(store.all()[1].id, placeholder);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_replace_missing_id_is_noop() {
        let mut store = MessageStore::new();
        store.append_at(10, MessageKind::Text, Origin::User, "hello");

        let mut called = false;
        let hit = store.replace(MessageId(999), |_| called = true);

        assert!(!hit);
        assert!(!called);
        assert_eq!(store.all()[0].content, "hello");
    }

    #[test]
    fn test_message_kind_serializes_lowercase() {
        let json = serde_json::to_string(&MessageKind::Audio).unwrap();
        assert_eq!(json, "\"audio\"");
    }
}

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

const FALLBACK_TIME_FORMAT: &str = "%H:%M";

/// A registered chat user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub uid: String,
    pub display_name: String,
    #[serde(default)]
    pub photo_url: String,
}

impl UserProfile {
    pub fn new(uid: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            display_name: display_name.into(),
            photo_url: String::new(),
        }
    }
}

/// Denormalized info about the other participant of a conversation
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PeerInfo {
    pub uid: String,
    pub display_name: String,
    pub photo_url: String,
}

impl From<UserProfile> for PeerInfo {
    fn from(profile: UserProfile) -> Self {
        Self {
            uid: profile.uid,
            display_name: profile.display_name,
            photo_url: profile.photo_url,
        }
    }
}

/// A single chat message. The read flag only ever flips from false to true.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub sender: String,
    pub body: String,
    pub sent_at: DateTime<Utc>,
    pub read: bool,
}

impl Message {
    /// Creates a new unread message stamped with the current time
    pub fn new(sender: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            sender: sender.into(),
            body: body.into(),
            sent_at: Utc::now(),
            read: false,
        }
    }

    #[must_use]
    pub fn is_unread_for(&self, viewer: &str) -> bool {
        !self.read && self.sender != viewer
    }

    #[must_use]
    pub fn is_from(&self, viewer: &str) -> bool {
        self.sender == viewer
    }

    /// Formats the send time in local time with a strftime pattern.
    /// An unusable pattern falls back to `%H:%M`.
    #[must_use]
    pub fn local_time(&self, time_format: &str) -> String {
        let local = self.sent_at.with_timezone(&Local);
        let mut formatted = String::new();
        if write!(formatted, "{}", local.format(time_format)).is_err() {
            return local.format(FALLBACK_TIME_FORMAT).to_string();
        }
        formatted
    }
}

/// A two-party thread. Messages are kept in send order; the last one is the newest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub messages: Vec<Message>,
    pub users: Vec<String>,
    pub peer: PeerInfo,
}

impl Conversation {
    /// Number of messages the viewer has not read yet. Own messages never count.
    #[must_use]
    pub fn unread_count(&self, viewer: &str) -> usize {
        self.messages
            .iter()
            .filter(|message| message.is_unread_for(viewer))
            .count()
    }

    #[must_use]
    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }
}

/// One row of the conversation sidebar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatPreview {
    pub conversation_id: String,
    pub peer_name: String,
    pub last_body: String,
    pub last_time: Option<String>,
    pub unread: usize,
    pub own_last: bool,
    pub last_read: bool,
    pub selected: bool,
}

/// Builds sidebar rows, newest activity first. Empty conversations sort last.
pub fn previews(
    conversations: &[Conversation],
    viewer: &str,
    active: Option<&str>,
    time_format: &str,
) -> Vec<ChatPreview> {
    let mut ordered: Vec<&Conversation> = conversations.iter().collect();
    ordered.sort_by(|left, right| {
        let left_time = left.last_message().map(|message| message.sent_at);
        let right_time = right.last_message().map(|message| message.sent_at);
        right_time.cmp(&left_time)
    });

    ordered
        .into_iter()
        .map(|conversation| {
            let last = conversation.last_message();
            ChatPreview {
                conversation_id: conversation.id.clone(),
                peer_name: conversation.peer.display_name.clone(),
                last_body: last.map(|message| message.body.clone()).unwrap_or_default(),
                last_time: last.map(|message| message.local_time(time_format)),
                unread: conversation.unread_count(viewer),
                own_last: last.is_some_and(|message| message.is_from(viewer)),
                last_read: last.is_some_and(|message| message.read),
                selected: active == Some(conversation.id.as_str()),
            }
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use chrono::TimeZone;

    pub fn message(sender: &str, body: &str, minute: u32, read: bool) -> Message {
        Message {
            id: format!("{}-{}", sender, minute),
            sender: sender.to_string(),
            body: body.to_string(),
            sent_at: Utc
                .with_ymd_and_hms(2024, 5, 1, 12, minute, 0)
                .single()
                .unwrap_or_else(Utc::now),
            read,
        }
    }

    pub fn conversation(id: &str, peer: &str, messages: Vec<Message>) -> Conversation {
        Conversation {
            id: id.to_string(),
            messages,
            users: vec!["me".to_string(), peer.to_string()],
            peer: PeerInfo {
                uid: peer.to_string(),
                display_name: peer.to_uppercase(),
                photo_url: String::new(),
            },
        }
    }
}

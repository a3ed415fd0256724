use super::controller::MessageStore;
use super::model::{ChatPreview, Conversation, UserProfile, previews};
use std::sync::mpsc::Sender;

/// One-way requests sent to the storage worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCommand {
    Refresh,
    MarkRead { chat_id: String },
    SendMessage { chat_id: String, body: String },
    FindUser { display_name: String },
    CreateChat { peer_uid: String },
    Shutdown,
}

/// Replies from the storage worker
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    ChatsLoaded(Vec<Conversation>),
    ConversationUpdated(Conversation),
    UserFound(Option<UserProfile>),
    ChatCreated(String),
    Error(String),
}

/// What an applied event changed, from the screen's point of view
#[derive(Debug, Clone, PartialEq)]
pub enum StoreUpdate {
    ChatsReloaded { active_updated: bool },
    ActiveUpdated,
    Unchanged,
    UserFound(Option<UserProfile>),
    ChatCreated(String),
    Failed(String),
}

/// Client-side view of the message store. Holds the latest snapshot and
/// forwards requests to the worker without waiting on them.
pub struct ChatStore {
    viewer: String,
    conversations: Vec<Conversation>,
    active: Option<String>,
    commands: Sender<StoreCommand>,
}

impl ChatStore {
    pub fn new(viewer: impl Into<String>, commands: Sender<StoreCommand>) -> Self {
        Self {
            viewer: viewer.into(),
            conversations: Vec::new(),
            active: None,
            commands,
        }
    }

    fn dispatch(&self, command: StoreCommand) {
        if let Err(error) = self.commands.send(command) {
            tracing::warn!(command = ?error.0, "storage worker is gone, dropping request");
        }
    }

    #[must_use]
    pub fn active_id(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn conversation(&self, id: &str) -> Option<&Conversation> {
        self.conversations.iter().find(|conversation| conversation.id == id)
    }

    /// Switches the open conversation. Returns whether it changed.
    pub fn open(&mut self, conversation_id: &str) -> bool {
        if self.active.as_deref() == Some(conversation_id)
            || self.conversation(conversation_id).is_none()
        {
            return false;
        }
        self.active = Some(conversation_id.to_string());
        true
    }

    /// Leaves the open conversation, back to the welcome pane
    pub fn close(&mut self) {
        self.active = None;
    }

    pub fn refresh(&self) {
        self.dispatch(StoreCommand::Refresh);
    }

    /// Sends the composer text to the open conversation. Blank text is ignored.
    pub fn send_message(&self, body: &str) -> bool {
        let body = body.trim();
        let Some(chat_id) = self.active.clone() else {
            return false;
        };
        if body.is_empty() {
            return false;
        }
        self.dispatch(StoreCommand::SendMessage {
            chat_id,
            body: body.to_string(),
        });
        true
    }

    pub fn find_user(&self, display_name: &str) {
        let display_name = display_name.trim();
        if display_name.is_empty() {
            return;
        }
        self.dispatch(StoreCommand::FindUser {
            display_name: display_name.to_string(),
        });
    }

    pub fn create_chat(&self, peer_uid: &str) {
        self.dispatch(StoreCommand::CreateChat {
            peer_uid: peer_uid.to_string(),
        });
    }

    pub fn shutdown(&self) {
        self.dispatch(StoreCommand::Shutdown);
    }

    #[must_use]
    pub fn previews(&self, time_format: &str) -> Vec<ChatPreview> {
        previews(
            &self.conversations,
            &self.viewer,
            self.active.as_deref(),
            time_format,
        )
    }

    /// Folds a worker reply into the snapshot
    pub fn apply(&mut self, event: StoreEvent) -> StoreUpdate {
        match event {
            StoreEvent::ChatsLoaded(conversations) => {
                let before = self.active_conversation().cloned();
                self.conversations = conversations;
                if let Some(active) = &self.active
                    && !self.conversations.iter().any(|conversation| &conversation.id == active)
                {
                    self.active = None;
                }
                let after = self.active_conversation();
                let active_updated = after.is_some() && after != before.as_ref();
                StoreUpdate::ChatsReloaded { active_updated }
            }
            StoreEvent::ConversationUpdated(conversation) => {
                let is_active = self.active.as_deref() == Some(conversation.id.as_str());
                match self
                    .conversations
                    .iter_mut()
                    .find(|existing| existing.id == conversation.id)
                {
                    Some(existing) if *existing == conversation => return StoreUpdate::Unchanged,
                    Some(existing) => *existing = conversation,
                    None => self.conversations.push(conversation),
                }
                if is_active {
                    StoreUpdate::ActiveUpdated
                } else {
                    StoreUpdate::Unchanged
                }
            }
            StoreEvent::UserFound(profile) => StoreUpdate::UserFound(profile),
            StoreEvent::ChatCreated(chat_id) => StoreUpdate::ChatCreated(chat_id),
            StoreEvent::Error(message) => StoreUpdate::Failed(message),
        }
    }
}

impl MessageStore for ChatStore {
    fn mark_read(&self, conversation_id: &str) {
        self.dispatch(StoreCommand::MarkRead {
            chat_id: conversation_id.to_string(),
        });
    }

    fn active_conversation(&self) -> Option<&Conversation> {
        self.active
            .as_deref()
            .and_then(|active| self.conversation(active))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::model::fixtures::{conversation, message};
    use std::sync::mpsc::{Receiver, channel};

    fn store() -> (ChatStore, Receiver<StoreCommand>) {
        let (tx, rx) = channel();
        let mut store = ChatStore::new("me", tx);
        store.apply(StoreEvent::ChatsLoaded(vec![
            conversation("a", "ana", vec![message("ana", "hi", 1, false)]),
            conversation("b", "bo", Vec::new()),
        ]));
        (store, rx)
    }

    #[test]
    fn test_open_only_known_conversations() {
        let (mut store, _rx) = store();
        assert!(!store.open("missing"));
        assert!(store.open("a"));
        assert!(!store.open("a"));
        assert_eq!(store.active_conversation().map(|c| c.id.as_str()), Some("a"));
    }

    #[test]
    fn test_blank_messages_are_not_sent() {
        let (mut store, rx) = store();
        assert!(!store.send_message("hello"));
        store.open("a");
        assert!(!store.send_message("   "));
        assert!(store.send_message("  hello "));

        let sent: Vec<StoreCommand> = rx.try_iter().collect();
        assert_eq!(
            sent,
            vec![StoreCommand::SendMessage {
                chat_id: "a".to_string(),
                body: "hello".to_string(),
            }]
        );
    }

    #[test]
    fn test_mark_read_is_forwarded() {
        let (store, rx) = store();
        store.mark_read("a");
        assert_eq!(
            rx.try_recv().ok(),
            Some(StoreCommand::MarkRead {
                chat_id: "a".to_string()
            })
        );
    }

    #[test]
    fn test_mark_read_after_worker_exit_does_not_panic() {
        let (store, rx) = store();
        drop(rx);
        store.mark_read("a");
    }

    #[test]
    fn test_update_of_active_conversation_is_reported() {
        let (mut store, _rx) = store();
        store.open("a");

        let mut updated = conversation("a", "ana", vec![message("ana", "hi", 1, true)]);
        assert_eq!(
            store.apply(StoreEvent::ConversationUpdated(updated.clone())),
            StoreUpdate::ActiveUpdated
        );
        assert_eq!(
            store.apply(StoreEvent::ConversationUpdated(updated.clone())),
            StoreUpdate::Unchanged
        );

        updated.id = "b".to_string();
        assert_eq!(
            store.apply(StoreEvent::ConversationUpdated(updated)),
            StoreUpdate::Unchanged
        );
        assert_eq!(store.conversation("b").map(|c| c.messages.len()), Some(1));
    }

    #[test]
    fn test_reload_drops_vanished_active_conversation() {
        let (mut store, _rx) = store();
        store.open("a");
        let update = store.apply(StoreEvent::ChatsLoaded(vec![conversation("b", "bo", Vec::new())]));
        assert_eq!(update, StoreUpdate::ChatsReloaded { active_updated: false });
        assert_eq!(store.active_id(), None);
    }

    #[test]
    fn test_reload_reports_changed_active_conversation() {
        let (mut store, _rx) = store();
        store.open("a");
        let update = store.apply(StoreEvent::ChatsLoaded(vec![conversation(
            "a",
            "ana",
            vec![message("ana", "hi", 1, false), message("ana", "again", 2, false)],
        )]));
        assert_eq!(update, StoreUpdate::ChatsReloaded { active_updated: true });
    }
}

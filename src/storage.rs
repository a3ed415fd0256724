use crate::chat::model::{Conversation, Message, PeerInfo, UserProfile};
use chrono::{DateTime, SecondsFormat, Utc};
use color_eyre::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem, RocksDb};
use surrealdb::sql::Thing;

/// Internal user record for SurrealDB
#[derive(Debug, Clone, Serialize, Deserialize)]
struct UserRecord {
    uid: String,
    display_name: String,
    photo_url: String,
}

impl From<UserRecord> for UserProfile {
    fn from(record: UserRecord) -> Self {
        Self {
            uid: record.uid,
            display_name: record.display_name,
            photo_url: record.photo_url,
        }
    }
}

/// Internal chat record for SurrealDB
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<Thing>,
    users: Vec<String>,
    created_at: String,
}

/// Internal message record for SurrealDB
#[derive(Debug, Clone, Serialize, Deserialize)]
struct MessageRecord {
    chat: Thing,
    message_id: String,
    sender: String,
    body: String,
    sent_at: String,
    is_read: bool,
}

#[derive(Debug, Deserialize)]
struct MessageRow {
    message_id: String,
    sender: String,
    body: String,
    sent_at: String,
    is_read: bool,
}

impl MessageRow {
    fn into_message(self) -> Message {
        let sent_at = DateTime::parse_from_rfc3339(&self.sent_at)
            .map(|parsed| parsed.with_timezone(&Utc))
            .unwrap_or_default();
        Message {
            id: self.message_id,
            sender: self.sender,
            body: self.body,
            sent_at,
            read: self.is_read,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatRow {
    id: Thing,
    users: Vec<String>,
}

/// Persists users, chats and messages in SurrealDB
#[derive(Clone)]
pub struct StorageManager {
    db: Surreal<Db>,
}

impl StorageManager {
    /// Opens (or creates) the RocksDB-backed database at `path`
    pub async fn new(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Surreal::new::<RocksDb>(path).await?;
        Self::with_db(db).await
    }

    /// Volatile database, used by tests and `--ephemeral`
    pub async fn in_memory() -> Result<Self> {
        let db = Surreal::new::<Mem>(()).await?;
        Self::with_db(db).await
    }

    async fn with_db(db: Surreal<Db>) -> Result<Self> {
        db.use_ns("palaver").use_db("main").await?;
        let manager = Self { db };
        manager.init_db().await?;
        Ok(manager)
    }

    async fn init_db(&self) -> Result<()> {
        self.db.query("
            DEFINE TABLE IF NOT EXISTS user SCHEMAFULL;
            DEFINE FIELD uid ON user TYPE string;
            DEFINE FIELD display_name ON user TYPE string;
            DEFINE FIELD photo_url ON user TYPE string;
            DEFINE INDEX IF NOT EXISTS idx_user_uid ON user FIELDS uid UNIQUE;
        ").await?;

        self.db.query("
            DEFINE TABLE IF NOT EXISTS chat SCHEMAFULL;
            DEFINE FIELD users ON chat TYPE array<string>;
            DEFINE FIELD created_at ON chat TYPE string;
        ").await?;

        self.db.query("
            DEFINE TABLE IF NOT EXISTS message SCHEMAFULL;
            DEFINE FIELD chat ON message TYPE record<chat>;
            DEFINE FIELD message_id ON message TYPE string;
            DEFINE FIELD sender ON message TYPE string;
            DEFINE FIELD body ON message TYPE string;
            DEFINE FIELD sent_at ON message TYPE string;
            DEFINE FIELD is_read ON message TYPE bool;
            DEFINE INDEX IF NOT EXISTS idx_message_chat ON message FIELDS chat;
        ").await?;

        Ok(())
    }

    fn normalize_chat_id(id: &str) -> &str {
        id.strip_prefix("chat:").unwrap_or(id)
    }

    fn chat_ref(id: &str) -> Thing {
        Thing::from(("chat", Self::normalize_chat_id(id)))
    }

    /// Creates the user or refreshes its profile
    pub async fn upsert_user(&self, profile: &UserProfile) -> Result<()> {
        self.db
            .query("UPSERT type::thing('user', $uid) CONTENT {
                uid: $uid,
                display_name: $display_name,
                photo_url: $photo_url
            }")
            .bind(("uid", profile.uid.clone()))
            .bind(("display_name", profile.display_name.clone()))
            .bind(("photo_url", profile.photo_url.clone()))
            .await?
            .check()?;
        Ok(())
    }

    pub async fn load_user(&self, uid: &str) -> Result<Option<UserProfile>> {
        let mut response = self.db
            .query("SELECT uid, display_name, photo_url FROM user WHERE uid = $uid LIMIT 1")
            .bind(("uid", uid.to_string()))
            .await?;
        let rows: Vec<UserRecord> = response.take(0)?;
        Ok(rows.into_iter().next().map(UserProfile::from))
    }

    pub async fn load_users(&self) -> Result<Vec<UserProfile>> {
        let mut response = self.db
            .query("SELECT uid, display_name, photo_url FROM user ORDER BY display_name ASC")
            .await?;
        let rows: Vec<UserRecord> = response.take(0)?;
        Ok(rows.into_iter().map(UserProfile::from).collect())
    }

    /// Case-insensitive exact match on display name, never returning the viewer
    pub async fn find_user_by_name(
        &self,
        display_name: &str,
        viewer: &str,
    ) -> Result<Option<UserProfile>> {
        let name = display_name.trim().to_string();
        if name.is_empty() {
            return Ok(None);
        }
        let mut response = self.db
            .query("
                SELECT uid, display_name, photo_url
                FROM user
                WHERE string::lowercase(display_name) = string::lowercase($name)
                  AND uid != $viewer
                LIMIT 1
            ")
            .bind(("name", name))
            .bind(("viewer", viewer.to_string()))
            .await?;
        let rows: Vec<UserRecord> = response.take(0)?;
        Ok(rows.into_iter().next().map(UserProfile::from))
    }

    pub async fn find_chat_between(&self, first: &str, second: &str) -> Result<Option<String>> {
        let mut response = self.db
            .query("
                SELECT id, users
                FROM chat
                WHERE users CONTAINS $first AND users CONTAINS $second
                LIMIT 1
            ")
            .bind(("first", first.to_string()))
            .bind(("second", second.to_string()))
            .await?;
        let rows: Vec<ChatRow> = response.take(0)?;
        Ok(rows.into_iter().next().map(|row| row.id.id.to_raw()))
    }

    /// Returns the chat between both users, creating it on first contact
    pub async fn create_chat(&self, viewer: &str, peer: &str) -> Result<String> {
        if viewer == peer {
            return Err(color_eyre::eyre::eyre!("Cannot open a chat with yourself"));
        }
        if let Some(existing) = self.find_chat_between(viewer, peer).await? {
            return Ok(existing);
        }

        let created: Option<ChatRecord> = self.db
            .create("chat")
            .content(ChatRecord {
                id: None,
                users: vec![viewer.to_string(), peer.to_string()],
                created_at: Utc::now().to_rfc3339(),
            })
            .await?;

        created
            .and_then(|record| record.id)
            .map(|id| id.id.to_raw())
            .ok_or_else(|| color_eyre::eyre::eyre!("Failed to create chat"))
    }

    pub async fn append_message(&self, chat_id: &str, message: &Message) -> Result<()> {
        let _: Option<MessageRecord> = self.db
            .create("message")
            .content(MessageRecord {
                chat: Self::chat_ref(chat_id),
                message_id: message.id.clone(),
                sender: message.sender.clone(),
                body: message.body.clone(),
                sent_at: message.sent_at.to_rfc3339_opts(SecondsFormat::Nanos, true),
                is_read: message.read,
            })
            .await?;
        Ok(())
    }

    /// Flags the peer's unread messages as read. Returns how many flipped.
    pub async fn mark_read(&self, chat_id: &str, viewer: &str) -> Result<usize> {
        #[derive(Debug, Deserialize)]
        struct Updated {
            #[allow(dead_code)]
            message_id: String,
        }

        let mut response = self.db
            .query("
                UPDATE message
                SET is_read = true
                WHERE chat = $chat
                  AND sender != $viewer
                  AND is_read = false
                RETURN AFTER
            ")
            .bind(("chat", Self::chat_ref(chat_id)))
            .bind(("viewer", viewer.to_string()))
            .await?;
        let updated: Vec<Updated> = response.take(0)?;
        Ok(updated.len())
    }

    async fn load_messages(&self, chat: &Thing) -> Result<Vec<Message>> {
        let mut response = self.db
            .query("
                SELECT message_id, sender, body, sent_at, is_read
                FROM message
                WHERE chat = $chat
                ORDER BY sent_at ASC
            ")
            .bind(("chat", chat.clone()))
            .await?;
        let rows: Vec<MessageRow> = response.take(0)?;
        Ok(rows.into_iter().map(MessageRow::into_message).collect())
    }

    async fn build_conversation(&self, row: ChatRow, viewer: &str) -> Result<Conversation> {
        let messages = self.load_messages(&row.id).await?;
        let peer_uid = row
            .users
            .iter()
            .find(|uid| uid.as_str() != viewer)
            .cloned()
            .unwrap_or_default();
        let peer = match self.load_user(&peer_uid).await? {
            Some(profile) => PeerInfo::from(profile),
            None => PeerInfo {
                display_name: peer_uid.clone(),
                uid: peer_uid,
                photo_url: String::new(),
            },
        };

        Ok(Conversation {
            id: row.id.id.to_raw(),
            messages,
            users: row.users,
            peer,
        })
    }

    /// Loads every chat the viewer takes part in, with messages in send order
    pub async fn load_chats(&self, viewer: &str) -> Result<Vec<Conversation>> {
        let mut response = self.db
            .query("SELECT id, users, created_at FROM chat WHERE users CONTAINS $viewer ORDER BY created_at ASC")
            .bind(("viewer", viewer.to_string()))
            .await?;
        let rows: Vec<ChatRow> = response.take(0)?;

        let mut conversations = Vec::with_capacity(rows.len());
        for row in rows {
            conversations.push(self.build_conversation(row, viewer).await?);
        }
        Ok(conversations)
    }

    pub async fn load_chat(&self, chat_id: &str, viewer: &str) -> Result<Option<Conversation>> {
        let mut response = self.db
            .query("SELECT id, users FROM chat WHERE id = $chat LIMIT 1")
            .bind(("chat", Self::chat_ref(chat_id)))
            .await?;
        let rows: Vec<ChatRow> = response.take(0)?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(self.build_conversation(row, viewer).await?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded() -> (StorageManager, String) {
        let storage = StorageManager::in_memory().await.unwrap();
        storage.upsert_user(&UserProfile::new("me", "Me")).await.unwrap();
        storage.upsert_user(&UserProfile::new("ana", "Ana Lima")).await.unwrap();
        let chat_id = storage.create_chat("me", "ana").await.unwrap();
        (storage, chat_id)
    }

    #[tokio::test]
    async fn test_create_chat_is_idempotent() {
        let (storage, chat_id) = seeded().await;
        let again = storage.create_chat("ana", "me").await.unwrap();
        assert_eq!(chat_id, again);
        assert_eq!(storage.load_chats("me").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_cannot_chat_with_self() {
        let (storage, _) = seeded().await;
        assert!(storage.create_chat("me", "me").await.is_err());
    }

    #[tokio::test]
    async fn test_messages_load_in_send_order_with_peer_info() {
        let (storage, chat_id) = seeded().await;
        let first = Message::new("ana", "first");
        let mut second = Message::new("me", "second");
        second.sent_at = first.sent_at + chrono::Duration::seconds(5);
        storage.append_message(&chat_id, &second).await.unwrap();
        storage.append_message(&chat_id, &first).await.unwrap();

        let chat = storage.load_chat(&chat_id, "me").await.unwrap().unwrap();
        let bodies: Vec<&str> = chat.messages.iter().map(|m| m.body.as_str()).collect();
        assert_eq!(bodies, vec!["first", "second"]);
        assert_eq!(chat.peer.display_name, "Ana Lima");
        assert_eq!(chat.messages[0].id, first.id);
    }

    #[tokio::test]
    async fn test_mark_read_flips_only_peer_messages() {
        let (storage, chat_id) = seeded().await;
        storage.append_message(&chat_id, &Message::new("ana", "one")).await.unwrap();
        storage.append_message(&chat_id, &Message::new("ana", "two")).await.unwrap();
        storage.append_message(&chat_id, &Message::new("me", "mine")).await.unwrap();

        assert_eq!(storage.mark_read(&chat_id, "me").await.unwrap(), 2);
        assert_eq!(storage.mark_read(&chat_id, "me").await.unwrap(), 0);

        let chat = storage.load_chat(&chat_id, "me").await.unwrap().unwrap();
        assert_eq!(chat.unread_count("me"), 0);
        let own = chat.messages.iter().find(|m| m.sender == "me").unwrap();
        assert!(!own.read);
    }

    #[tokio::test]
    async fn test_find_user_is_case_insensitive_and_skips_viewer() {
        let (storage, _) = seeded().await;
        let found = storage.find_user_by_name("ana lima", "me").await.unwrap();
        assert_eq!(found.map(|user| user.uid), Some("ana".to_string()));
        assert!(storage.find_user_by_name("Me", "me").await.unwrap().is_none());
        assert!(storage.find_user_by_name("   ", "me").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unknown_peer_falls_back_to_uid() {
        let storage = StorageManager::in_memory().await.unwrap();
        let chat_id = storage.create_chat("me", "ghost").await.unwrap();
        let chat = storage.load_chat(&chat_id, "me").await.unwrap().unwrap();
        assert_eq!(chat.peer.display_name, "ghost");
        assert_eq!(chat.users, vec!["me".to_string(), "ghost".to_string()]);
    }
}

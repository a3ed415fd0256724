use crate::chat::{Message, UserProfile};
use crate::storage::StorageManager;
use chrono::{Duration, Utc};
use color_eyre::Result;

const PEERS: &[(&str, &str)] = &[
    ("ana", "Ana Lima"),
    ("bo", "Bo Karlsson"),
    ("cy", "Cy Okafor"),
];

const SMALL_TALK: &[&str] = &[
    "hey, are you around?",
    "yes, what's up",
    "did you see the build from last night",
    "the one that took forty minutes? yes",
    "I think the cache key changed again",
    "ugh. I'll look after lunch",
    "thanks!",
    "found it, the lockfile was regenerated",
    "makes sense. can you pin it?",
    "done, pushed a fix",
];

/// What `seed` wrote
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub users: usize,
    pub chats: usize,
    pub messages: usize,
}

/// Writes demo users, a few conversations of varied length, and unread peer messages
pub async fn seed(storage: &StorageManager, viewer: &UserProfile) -> Result<SeedReport> {
    let mut report = SeedReport::default();
    storage.upsert_user(viewer).await?;
    report.users += 1;

    for (index, &(uid, name)) in PEERS.iter().enumerate() {
        storage.upsert_user(&UserProfile::new(uid, name)).await?;
        report.users += 1;

        // The last peer stays chat-less so it can be found and started from search.
        if index == PEERS.len() - 1 {
            continue;
        }
        let chat_id = storage.create_chat(&viewer.uid, uid).await?;
        report.chats += 1;

        // Only the first peer gets a thread long enough to scroll.
        let rounds = if index == 0 { 4 } else { 1 };
        let history: Vec<&str> = SMALL_TALK
            .iter()
            .copied()
            .cycle()
            .take(SMALL_TALK.len() * rounds)
            .collect();
        let unread = 2 + index;
        let total = history.len() + unread;

        for (position, body) in history.iter().enumerate() {
            let sender = if position % 2 == 0 { uid } else { viewer.uid.as_str() };
            let message = backdated(sender, body, total - position, true);
            storage.append_message(&chat_id, &message).await?;
            report.messages += 1;
        }
        for extra in 0..unread {
            let message = backdated(uid, &format!("new message {}", extra + 1), unread - extra, false);
            storage.append_message(&chat_id, &message).await?;
            report.messages += 1;
        }
    }

    tracing::info!(?report, viewer = %viewer.uid, "demo data written");
    Ok(report)
}

fn backdated(sender: &str, body: &str, minutes_ago: usize, read: bool) -> Message {
    let mut message = Message::new(sender, body);
    let minutes = i64::try_from(minutes_ago).unwrap_or(i64::MAX);
    message.sent_at = Utc::now() - Duration::minutes(minutes);
    message.read = read;
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_seed_leaves_unread_peer_messages() {
        let storage = StorageManager::in_memory().await.unwrap();
        let viewer = UserProfile::new("me", "Me");

        let report = seed(&storage, &viewer).await.unwrap();
        assert_eq!(report.users, 4);
        assert_eq!(report.chats, 2);

        let chats = storage.load_chats("me").await.unwrap();
        assert_eq!(chats.len(), 2);
        let unread: Vec<usize> = chats.iter().map(|chat| chat.unread_count("me")).collect();
        assert!(unread.contains(&2));
        assert!(unread.contains(&3));
        assert!(chats.iter().all(|chat| {
            chat.messages
                .windows(2)
                .all(|pair| pair[0].sent_at <= pair[1].sent_at)
        }));

        // Seeding twice reuses the existing chats.
        seed(&storage, &viewer).await.unwrap();
        assert_eq!(storage.load_chats("me").await.unwrap().len(), 2);
    }
}

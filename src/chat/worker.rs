use super::model::{Message, UserProfile};
use super::store::{StoreCommand, StoreEvent};
use crate::storage::StorageManager;
use color_eyre::Result;
use std::path::PathBuf;
use std::sync::mpsc::{Receiver, Sender, channel};
use std::thread::JoinHandle;

/// Where the worker keeps its database
#[derive(Debug, Clone)]
pub enum StorageTarget {
    Disk(PathBuf),
    Memory,
}

impl StorageTarget {
    pub async fn open(&self) -> Result<StorageManager> {
        match self {
            StorageTarget::Disk(path) => StorageManager::new(path).await,
            StorageTarget::Memory => StorageManager::in_memory().await,
        }
    }
}

/// Channel ends and thread handle of a running storage worker
pub struct WorkerHandle {
    pub commands: Sender<StoreCommand>,
    pub events: Receiver<StoreEvent>,
    thread: JoinHandle<()>,
}

/// The worker thread once its event receiver has been handed to the UI
pub struct WorkerThread(JoinHandle<()>);

impl WorkerHandle {
    /// Gives up the event receiver, keeping only the thread to join later
    pub fn into_parts(self) -> (Receiver<StoreEvent>, WorkerThread) {
        (self.events, WorkerThread(self.thread))
    }

    #[cfg(test)]
    pub fn join(self) {
        WorkerThread(self.thread).join();
    }
}

impl WorkerThread {
    /// Waits for the worker thread after it has been told to shut down
    pub fn join(self) {
        if self.0.join().is_err() {
            tracing::warn!("storage worker panicked");
        }
    }
}

/// Starts the storage worker on its own thread with its own runtime
pub fn spawn(target: StorageTarget, viewer: UserProfile) -> Result<WorkerHandle> {
    let (command_tx, command_rx) = channel();
    let (event_tx, event_rx) = channel();

    let thread = std::thread::Builder::new()
        .name("palaver-store".to_string())
        .spawn(move || {
            let runtime = match tokio::runtime::Runtime::new() {
                Ok(runtime) => runtime,
                Err(error) => {
                    tracing::warn!(%error, "could not start storage runtime");
                    let _ = event_tx.send(StoreEvent::Error(error.to_string()));
                    return;
                }
            };
            runtime.block_on(run(target, viewer, command_rx, event_tx));
        })?;

    Ok(WorkerHandle {
        commands: command_tx,
        events: event_rx,
        thread,
    })
}

async fn run(
    target: StorageTarget,
    profile: UserProfile,
    commands: Receiver<StoreCommand>,
    events: Sender<StoreEvent>,
) {
    let storage = match target.open().await {
        Ok(storage) => storage,
        Err(error) => {
            tracing::warn!(%error, ?target, "could not open chat database");
            let _ = events.send(StoreEvent::Error(format!("Storage unavailable: {}", error)));
            return;
        }
    };
    // Registers the viewer so other users can find them by name.
    if let Err(error) = storage.upsert_user(&profile).await {
        tracing::warn!(%error, uid = %profile.uid, "could not register viewer");
    }
    let viewer = profile.uid;
    tracing::info!(?target, %viewer, "storage worker ready");

    // Database tasks run on the runtime's workers while this thread waits for commands.
    while let Ok(command) = commands.recv() {
        if command == StoreCommand::Shutdown {
            break;
        }
        let replies = match handle(&storage, &viewer, command).await {
            Ok(replies) => replies,
            Err(error) => {
                tracing::warn!(%error, "storage request failed");
                vec![StoreEvent::Error(error.to_string())]
            }
        };
        for reply in replies {
            if events.send(reply).is_err() {
                return;
            }
        }
    }
    tracing::info!("storage worker stopped");
}

async fn handle(
    storage: &StorageManager,
    viewer: &str,
    command: StoreCommand,
) -> Result<Vec<StoreEvent>> {
    match command {
        StoreCommand::Refresh => Ok(vec![StoreEvent::ChatsLoaded(storage.load_chats(viewer).await?)]),
        StoreCommand::MarkRead { chat_id } => {
            let flipped = storage.mark_read(&chat_id, viewer).await?;
            tracing::debug!(%chat_id, flipped, "marked read");
            if flipped == 0 {
                return Ok(Vec::new());
            }
            reload(storage, &chat_id, viewer).await
        }
        StoreCommand::SendMessage { chat_id, body } => {
            storage
                .append_message(&chat_id, &Message::new(viewer, body))
                .await?;
            reload(storage, &chat_id, viewer).await
        }
        StoreCommand::FindUser { display_name } => Ok(vec![StoreEvent::UserFound(
            storage.find_user_by_name(&display_name, viewer).await?,
        )]),
        StoreCommand::CreateChat { peer_uid } => {
            let chat_id = storage.create_chat(viewer, &peer_uid).await?;
            Ok(vec![
                StoreEvent::ChatsLoaded(storage.load_chats(viewer).await?),
                StoreEvent::ChatCreated(chat_id),
            ])
        }
        StoreCommand::Shutdown => Ok(Vec::new()),
    }
}

async fn reload(storage: &StorageManager, chat_id: &str, viewer: &str) -> Result<Vec<StoreEvent>> {
    Ok(storage
        .load_chat(chat_id, viewer)
        .await?
        .map(StoreEvent::ConversationUpdated)
        .into_iter()
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn next_event(handle: &WorkerHandle) -> StoreEvent {
        handle
            .events
            .recv_timeout(Duration::from_secs(10))
            .expect("worker reply")
    }

    #[test]
    fn test_worker_round_trip() {
        let handle = spawn(StorageTarget::Memory, UserProfile::new("me", "Me")).unwrap();

        handle.commands.send(StoreCommand::Refresh).unwrap();
        assert_eq!(next_event(&handle), StoreEvent::ChatsLoaded(Vec::new()));

        handle
            .commands
            .send(StoreCommand::CreateChat {
                peer_uid: "ana".to_string(),
            })
            .unwrap();
        let StoreEvent::ChatsLoaded(chats) = next_event(&handle) else {
            panic!("expected chat list");
        };
        assert_eq!(chats.len(), 1);
        let StoreEvent::ChatCreated(chat_id) = next_event(&handle) else {
            panic!("expected created chat");
        };

        handle
            .commands
            .send(StoreCommand::SendMessage {
                chat_id: chat_id.clone(),
                body: "hello".to_string(),
            })
            .unwrap();
        let StoreEvent::ConversationUpdated(chat) = next_event(&handle) else {
            panic!("expected updated conversation");
        };
        assert_eq!(chat.messages.len(), 1);
        assert_eq!(chat.messages[0].sender, "me");

        // Own messages never count as unread, so nothing flips and nothing is sent back.
        handle
            .commands
            .send(StoreCommand::MarkRead { chat_id })
            .unwrap();
        handle
            .commands
            .send(StoreCommand::FindUser {
                display_name: "nobody".to_string(),
            })
            .unwrap();
        assert_eq!(next_event(&handle), StoreEvent::UserFound(None));

        handle.commands.send(StoreCommand::Shutdown).unwrap();
        handle.join();
    }

    #[test]
    fn test_worker_reports_failures() {
        let handle = spawn(StorageTarget::Memory, UserProfile::new("me", "Me")).unwrap();
        handle
            .commands
            .send(StoreCommand::CreateChat {
                peer_uid: "me".to_string(),
            })
            .unwrap();
        assert!(matches!(next_event(&handle), StoreEvent::Error(_)));
        handle.commands.send(StoreCommand::Shutdown).unwrap();
        handle.join();
    }
}

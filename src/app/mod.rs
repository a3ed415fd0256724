mod chat;
mod help;
mod navigation;
mod scroll;
mod text_input;
mod types;

pub use navigation::Navigable;
pub use scroll::TerminalViewport;
pub use text_input::TextInput;
pub use types::*;

use crate::chat::{ChatStore, ScrollReadController, StoreEvent, UserProfile};
use crate::config::{Config, UiConfig};
use std::sync::mpsc::Receiver;
use std::time::Duration;

/// Main application state
pub struct App {
    pub focus: Focus,
    pub should_quit: bool,
    pub show_help: bool,
    pub viewer: UserProfile,
    pub ui: UiConfig,

    // Conversation state and its scroll/read tracking
    pub store: ChatStore,
    pub controller: ScrollReadController,
    pub viewport: TerminalViewport,
    store_events: Receiver<StoreEvent>,

    // Sidebar
    pub sidebar_index: usize,
    pub search: TextInput,
    pub found_user: Option<UserProfile>,

    pub composer: TextInput,
    pub status_toast: Option<StatusToast>,
}

impl App {
    /// Creates the screen state around an already running store
    pub fn new(config: &Config, store: ChatStore, store_events: Receiver<StoreEvent>) -> Self {
        let viewer = UserProfile {
            uid: config.user.uid.clone(),
            display_name: config.user.display_name.clone(),
            photo_url: config.user.photo_url.clone(),
        };

        Self {
            focus: Focus::Sidebar,
            should_quit: false,
            show_help: false,
            controller: ScrollReadController::new(viewer.uid.clone()),
            viewer,
            ui: config.ui.clone(),
            store,
            viewport: TerminalViewport::new(),
            store_events,
            sidebar_index: 0,
            search: TextInput::new(),
            found_user: None,
            composer: TextInput::new(),
            status_toast: None,
        }
    }

    /// First entry into the screen: load chats and start at the newest message
    pub fn mount(&mut self) {
        self.store.refresh();
        self.controller.on_mount(&mut self.viewport);
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
        self.store.shutdown();
    }

    /// Drains worker replies without blocking
    pub fn check_store_events(&mut self) {
        while let Ok(event) = self.store_events.try_recv() {
            self.apply_store_event(event);
        }
    }

    pub fn sidebar_rows(&self) -> Vec<SidebarRow> {
        let mut rows = Vec::new();
        if let Some(found) = &self.found_user {
            rows.push(SidebarRow::Found(found.clone()));
        }
        rows.extend(
            self.store
                .previews(&self.ui.time_format)
                .into_iter()
                .map(SidebarRow::Chat),
        );
        rows
    }

    pub fn focus_next_pane(&mut self) {
        self.focus = match self.focus {
            Focus::Sidebar => Focus::Composer,
            Focus::Composer | Focus::Search => Focus::Sidebar,
        };
    }

    pub fn focus_search(&mut self) {
        self.focus = Focus::Search;
    }

    pub fn show_status_toast(&mut self, message: impl Into<String>) {
        self.status_toast = Some(StatusToast::new(message));
    }

    pub fn clear_expired_status_toast(&mut self) {
        let should_clear = self
            .status_toast
            .as_ref()
            .is_some_and(|toast| toast.is_expired(Duration::from_secs(3)));
        if should_clear {
            self.status_toast = None;
        }
    }

    #[must_use]
    pub fn status_toast_message(&self) -> Option<&str> {
        self.status_toast.as_ref().map(|toast| toast.message.as_str())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::chat::StoreCommand;
    use std::sync::mpsc::{Sender, channel};

    /// App wired to bare channels instead of a worker thread
    pub struct Harness {
        pub app: App,
        pub commands: Receiver<StoreCommand>,
        pub events: Sender<StoreEvent>,
    }

    impl Harness {
        pub fn new() -> Self {
            let (command_tx, command_rx) = channel();
            let (event_tx, event_rx) = channel();
            let config = Config::default();
            let store = ChatStore::new(config.user.uid.clone(), command_tx);
            Self {
                app: App::new(&config, store, event_rx),
                commands: command_rx,
                events: event_tx,
            }
        }

        pub fn deliver(&mut self, event: StoreEvent) {
            self.events.send(event).unwrap();
            self.app.check_store_events();
        }

        pub fn sent(&self) -> Vec<StoreCommand> {
            self.commands.try_iter().collect()
        }
    }
}

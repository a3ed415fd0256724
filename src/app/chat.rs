use crate::app::{App, Focus, Navigable, SidebarRow};
use crate::chat::{MessageStore, StoreEvent, StoreUpdate};
use ratatui::layout::Rect;

impl App {
    /// Enter on the sidebar: open the chat, or start one with the found user
    pub fn activate_selected(&mut self) {
        let Some(row) = self.sidebar_rows().into_iter().nth(self.sidebar_index) else {
            return;
        };
        match row {
            SidebarRow::Found(profile) => self.store.create_chat(&profile.uid),
            SidebarRow::Chat(preview) => self.open_conversation(&preview.conversation_id),
        }
    }

    pub fn open_conversation(&mut self, conversation_id: &str) {
        if !self.store.open(conversation_id) {
            self.focus = Focus::Composer;
            return;
        }
        self.viewport.reset_position();
        self.measure_thread();
        if let Some(conversation) = self.store.active_conversation() {
            self.controller
                .on_conversation_opened(conversation, &self.store, &mut self.viewport);
        }
        self.select_conversation_row(conversation_id);
        self.focus = Focus::Composer;
    }

    pub fn close_conversation(&mut self) {
        self.store.close();
        self.viewport.reset_position();
        self.composer.clear();
    }

    pub fn send_composer_message(&mut self) {
        if self.store.active_id().is_none() {
            self.show_status_toast("NO CHAT OPEN");
            return;
        }
        if self.store.send_message(self.composer.content()) {
            self.composer.clear();
        }
    }

    pub fn submit_search(&mut self) {
        if self.search.is_empty() {
            self.found_user = None;
            self.focus = Focus::Sidebar;
            return;
        }
        self.store.find_user(self.search.content());
    }

    pub fn cancel_search(&mut self) {
        self.search.clear();
        self.found_user = None;
        self.focus = Focus::Sidebar;
        self.clamp_sidebar_index();
    }

    /// Lays out the thread for this frame and settles pending scroll requests.
    /// Any position change, clamping included, is reported as a scroll.
    pub fn sync_viewport(&mut self, thread_area: Rect) {
        let resized = self.viewport.resize(
            thread_area.width.saturating_sub(2),
            thread_area.height.saturating_sub(2),
        );
        let remeasured = self.measure_thread();
        let resolved = self.viewport.resolve_pending();
        if resized || remeasured || resolved {
            self.notify_scrolled();
        }
    }

    pub(crate) fn apply_store_event(&mut self, event: StoreEvent) {
        match self.store.apply(event) {
            StoreUpdate::ChatsReloaded { active_updated } => {
                self.clamp_sidebar_index();
                if active_updated {
                    self.follow_active_conversation();
                }
            }
            StoreUpdate::ActiveUpdated => self.follow_active_conversation(),
            StoreUpdate::Unchanged => {}
            StoreUpdate::UserFound(Some(profile)) => {
                self.found_user = Some(profile);
                self.sidebar_index = 0;
                self.focus = Focus::Sidebar;
            }
            StoreUpdate::UserFound(None) => {
                self.found_user = None;
                self.show_status_toast("USER NOT FOUND");
            }
            StoreUpdate::ChatCreated(chat_id) => {
                self.search.clear();
                self.found_user = None;
                self.open_conversation(&chat_id);
            }
            StoreUpdate::Failed(message) => {
                self.show_status_toast(format!("ERROR: {}", message));
            }
        }
    }

    fn follow_active_conversation(&mut self) {
        if self.measure_thread() {
            self.notify_scrolled();
        }
        if let Some(conversation) = self.store.active_conversation() {
            self.controller
                .on_conversation_updated(conversation, &self.store, &mut self.viewport);
        }
    }

    /// Returns whether the new height clamped the scroll position
    pub(crate) fn measure_thread(&mut self) -> bool {
        let lines = self.store.active_conversation().map_or(0, |conversation| {
            crate::ui::thread_line_count(
                conversation,
                &self.viewer.uid,
                self.viewport.width(),
                &self.ui.time_format,
            )
        });
        self.viewport.set_content_lines(lines)
    }

    fn select_conversation_row(&mut self, conversation_id: &str) {
        if let Some(index) = self.sidebar_rows().iter().position(|row| {
            matches!(row, SidebarRow::Chat(preview) if preview.conversation_id == conversation_id)
        }) {
            self.set_selected_index(index);
        }
    }

    fn clamp_sidebar_index(&mut self) {
        let count = self.get_item_count();
        if self.sidebar_index >= count {
            self.sidebar_index = count.saturating_sub(1);
        }
    }
}

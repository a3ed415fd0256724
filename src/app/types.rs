use crate::chat::{ChatPreview, UserProfile};

/// Which pane receives key presses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Sidebar,
    Composer,
    Search,
}

/// A row of the sidebar list
#[derive(Debug, Clone, PartialEq)]
pub enum SidebarRow {
    /// Search hit pinned above the conversations
    Found(UserProfile),
    Chat(ChatPreview),
}

#[derive(Debug, Clone)]
pub struct StatusToast {
    pub message: String,
    pub created_at: std::time::Instant,
}

impl StatusToast {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            created_at: std::time::Instant::now(),
        }
    }

    pub fn is_expired(&self, duration: std::time::Duration) -> bool {
        self.created_at.elapsed() >= duration
    }
}

use super::model::Conversation;

/// Scroll geometry of the message list, in rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScrollMetrics {
    pub scroll_height: u32,
    pub scroll_top: u32,
    pub client_height: u32,
}

impl ScrollMetrics {
    pub fn new(scroll_height: u32, scroll_top: u32, client_height: u32) -> Self {
        Self {
            scroll_height,
            scroll_top,
            client_height,
        }
    }

    /// Signed distance between the bottom of the viewport and the end of the content
    #[must_use]
    pub fn distance_from_bottom(&self) -> i64 {
        i64::from(self.scroll_height) - i64::from(self.scroll_top) - i64::from(self.client_height)
    }

    /// Whether the content is taller than the viewport
    #[must_use]
    pub fn overflows(&self) -> bool {
        self.scroll_height > self.client_height
    }
}

/// Message store as seen by the controller. Requests are one-way.
pub trait MessageStore {
    /// Marks every unread peer message of the conversation as read. Idempotent.
    fn mark_read(&self, conversation_id: &str);

    /// Current snapshot of the open conversation
    fn active_conversation(&self) -> Option<&Conversation>;
}

/// Rendering surface of the message list
pub trait ViewPort {
    fn scroll_to_bottom(&mut self);

    fn metrics(&self) -> ScrollMetrics;
}

/// Decides when to follow new messages and when to mark them read.
///
/// Mark-read is never requested from a scroll event while the user is above
/// the fold, and auto-scroll is only requested while the view sits at the bottom.
#[derive(Debug, Clone)]
pub struct ScrollReadController {
    viewer: String,
    at_bottom: bool,
    mounted: bool,
}

impl ScrollReadController {
    pub fn new(viewer: impl Into<String>) -> Self {
        Self {
            viewer: viewer.into(),
            at_bottom: true,
            mounted: false,
        }
    }

    #[must_use]
    pub fn at_bottom(&self) -> bool {
        self.at_bottom
    }

    /// Initial entry always starts at the newest message
    pub fn on_mount<V: ViewPort>(&mut self, viewport: &mut V) {
        if self.mounted {
            return;
        }
        self.mounted = true;
        viewport.scroll_to_bottom();
    }

    /// Runs once per conversation activation. Each conversation starts at the bottom.
    pub fn on_conversation_opened<S: MessageStore, V: ViewPort>(
        &mut self,
        conversation: &Conversation,
        store: &S,
        viewport: &mut V,
    ) {
        self.at_bottom = true;
        tracing::debug!(conversation = %conversation.id, "conversation opened");
        self.follow(conversation, store, viewport);
    }

    /// Runs when the open conversation's snapshot changes without a switch
    pub fn on_conversation_updated<S: MessageStore, V: ViewPort>(
        &mut self,
        conversation: &Conversation,
        store: &S,
        viewport: &mut V,
    ) {
        self.follow(conversation, store, viewport);
    }

    pub fn on_scroll<S: MessageStore>(&mut self, metrics: ScrollMetrics, store: &S) {
        if metrics.distance_from_bottom() <= 0 {
            self.at_bottom = true;
            if let Some(conversation) = store.active_conversation()
                && conversation.unread_count(&self.viewer) > 0
            {
                tracing::debug!(conversation = %conversation.id, "reached bottom, marking read");
                store.mark_read(&conversation.id);
            }
        } else {
            self.at_bottom = false;
        }
    }

    /// The jump-to-newest affordance shows only when there is somewhere to jump
    #[must_use]
    pub fn show_jump_to_bottom(&self, metrics: ScrollMetrics) -> bool {
        metrics.overflows() && !self.at_bottom
    }

    fn follow<S: MessageStore, V: ViewPort>(
        &mut self,
        conversation: &Conversation,
        store: &S,
        viewport: &mut V,
    ) {
        // Nothing to scroll past: everything on screen counts as seen.
        if !viewport.metrics().overflows() {
            store.mark_read(&conversation.id);
        }
        if self.at_bottom {
            viewport.scroll_to_bottom();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::model::fixtures::{conversation, message};
    use std::cell::RefCell;

    #[derive(Default)]
    struct FakeStore {
        active: Option<Conversation>,
        mark_read_calls: RefCell<Vec<String>>,
    }

    impl FakeStore {
        fn with_active(conversation: Conversation) -> Self {
            Self {
                active: Some(conversation),
                mark_read_calls: RefCell::new(Vec::new()),
            }
        }

        fn mark_read_count(&self) -> usize {
            self.mark_read_calls.borrow().len()
        }
    }

    impl MessageStore for FakeStore {
        fn mark_read(&self, conversation_id: &str) {
            self.mark_read_calls
                .borrow_mut()
                .push(conversation_id.to_string());
        }

        fn active_conversation(&self) -> Option<&Conversation> {
            self.active.as_ref()
        }
    }

    struct FakeViewPort {
        metrics: ScrollMetrics,
        scroll_requests: usize,
    }

    impl FakeViewPort {
        fn new(scroll_height: u32, scroll_top: u32, client_height: u32) -> Self {
            Self {
                metrics: ScrollMetrics::new(scroll_height, scroll_top, client_height),
                scroll_requests: 0,
            }
        }
    }

    impl ViewPort for FakeViewPort {
        fn scroll_to_bottom(&mut self) {
            self.scroll_requests += 1;
        }

        fn metrics(&self) -> ScrollMetrics {
            self.metrics
        }
    }

    fn chat_with_unread(id: &str, unread: usize) -> Conversation {
        let mut messages = vec![
            message("me", "hi", 1, true),
            message("ana", "hello", 2, true),
            message("me", "how are you", 3, true),
        ];
        for minute in 0..unread {
            messages.push(message("ana", "new", 10 + minute as u32, false));
        }
        conversation(id, "ana", messages)
    }

    #[test]
    fn test_starts_at_bottom() {
        assert!(ScrollReadController::new("me").at_bottom());
    }

    #[test]
    fn test_scroll_at_or_past_bottom_sets_at_bottom() {
        let store = FakeStore::default();
        for metrics in [
            ScrollMetrics::new(1000, 600, 400),
            ScrollMetrics::new(1000, 650, 400),
            ScrollMetrics::new(300, 0, 400),
            ScrollMetrics::new(0, 0, 0),
        ] {
            let mut controller = ScrollReadController::new("me");
            controller.on_scroll(ScrollMetrics::new(1000, 0, 400), &store);
            controller.on_scroll(metrics, &store);
            assert!(controller.at_bottom(), "{:?}", metrics);
        }
    }

    #[test]
    fn test_scroll_above_bottom_never_marks_read() {
        let store = FakeStore::with_active(chat_with_unread("c1", 3));
        for metrics in [
            ScrollMetrics::new(1000, 0, 400),
            ScrollMetrics::new(1000, 599, 400),
            ScrollMetrics::new(401, 0, 400),
        ] {
            let mut controller = ScrollReadController::new("me");
            controller.on_scroll(metrics, &store);
            assert!(!controller.at_bottom(), "{:?}", metrics);
        }
        assert_eq!(store.mark_read_count(), 0);
    }

    #[test]
    fn test_repeated_scroll_is_stable() {
        let store = FakeStore::with_active(chat_with_unread("c1", 0));
        let mut controller = ScrollReadController::new("me");
        let metrics = ScrollMetrics::new(1000, 600, 400);

        controller.on_scroll(metrics, &store);
        let first = controller.at_bottom();
        controller.on_scroll(metrics, &store);
        assert_eq!(controller.at_bottom(), first);
        assert_eq!(store.mark_read_count(), 0);
    }

    #[test]
    fn test_open_without_overflow_marks_read_and_scrolls() {
        let store = FakeStore::with_active(chat_with_unread("c1", 2));
        let mut viewport = FakeViewPort::new(300, 0, 400);
        let mut controller = ScrollReadController::new("me");

        let chat = chat_with_unread("c1", 2);
        assert_eq!(chat.messages.len(), 5);
        controller.on_conversation_opened(&chat, &store, &mut viewport);

        assert_eq!(*store.mark_read_calls.borrow(), vec!["c1".to_string()]);
        assert_eq!(viewport.scroll_requests, 1);
    }

    #[test]
    fn test_open_with_overflow_only_scrolls() {
        let store = FakeStore::with_active(chat_with_unread("c1", 2));
        let mut viewport = FakeViewPort::new(1000, 0, 400);
        let mut controller = ScrollReadController::new("me");

        controller.on_conversation_opened(&chat_with_unread("c1", 2), &store, &mut viewport);

        assert_eq!(store.mark_read_count(), 0);
        assert_eq!(viewport.scroll_requests, 1);
    }

    #[test]
    fn test_open_empty_conversation_counts_as_no_overflow() {
        let empty = conversation("c0", "ana", Vec::new());
        let store = FakeStore::with_active(empty.clone());
        let mut viewport = FakeViewPort::new(0, 0, 400);
        let mut controller = ScrollReadController::new("me");

        controller.on_conversation_opened(&empty, &store, &mut viewport);

        assert_eq!(store.mark_read_count(), 1);
    }

    #[test]
    fn test_scroll_up_then_back_to_bottom_marks_read_once() {
        let store = FakeStore::with_active(chat_with_unread("c1", 3));
        let mut controller = ScrollReadController::new("me");

        controller.on_scroll(ScrollMetrics::new(1000, 0, 400), &store);
        assert!(!controller.at_bottom());
        assert_eq!(store.mark_read_count(), 0);

        controller.on_scroll(ScrollMetrics::new(1000, 600, 400), &store);
        assert!(controller.at_bottom());
        assert_eq!(store.mark_read_count(), 1);
    }

    #[test]
    fn test_bottom_without_unread_does_not_mark_read() {
        let store = FakeStore::with_active(chat_with_unread("c1", 0));
        let mut controller = ScrollReadController::new("me");

        controller.on_scroll(ScrollMetrics::new(1000, 600, 400), &store);

        assert!(controller.at_bottom());
        assert_eq!(store.mark_read_count(), 0);
    }

    #[test]
    fn test_switching_conversation_resets_at_bottom() {
        let store = FakeStore::with_active(chat_with_unread("a", 0));
        let mut viewport = FakeViewPort::new(1000, 0, 400);
        let mut controller = ScrollReadController::new("me");

        controller.on_scroll(ScrollMetrics::new(1000, 0, 400), &store);
        assert!(!controller.at_bottom());

        controller.on_conversation_opened(&chat_with_unread("b", 1), &store, &mut viewport);
        assert!(controller.at_bottom());
        assert_eq!(viewport.scroll_requests, 1);
    }

    #[test]
    fn test_update_does_not_yank_reader_down() {
        let chat = chat_with_unread("c1", 1);
        let store = FakeStore::with_active(chat.clone());
        let mut viewport = FakeViewPort::new(1000, 0, 400);
        let mut controller = ScrollReadController::new("me");

        controller.on_scroll(viewport.metrics(), &store);
        controller.on_conversation_updated(&chat, &store, &mut viewport);

        assert!(!controller.at_bottom());
        assert_eq!(viewport.scroll_requests, 0);
        assert_eq!(store.mark_read_count(), 0);
    }

    #[test]
    fn test_update_follows_when_at_bottom() {
        let chat = chat_with_unread("c1", 1);
        let store = FakeStore::with_active(chat.clone());
        let mut viewport = FakeViewPort::new(1000, 600, 400);
        let mut controller = ScrollReadController::new("me");

        controller.on_conversation_updated(&chat, &store, &mut viewport);

        assert_eq!(viewport.scroll_requests, 1);
        assert_eq!(store.mark_read_count(), 0);
    }

    #[test]
    fn test_mount_scrolls_exactly_once() {
        let mut viewport = FakeViewPort::new(1000, 0, 400);
        let mut controller = ScrollReadController::new("me");

        controller.on_mount(&mut viewport);
        controller.on_mount(&mut viewport);

        assert_eq!(viewport.scroll_requests, 1);
    }

    #[test]
    fn test_jump_marker_needs_overflow_and_scrolled_up() {
        let store = FakeStore::default();
        let mut controller = ScrollReadController::new("me");
        let overflowing = ScrollMetrics::new(1000, 0, 400);

        assert!(!controller.show_jump_to_bottom(overflowing));
        controller.on_scroll(overflowing, &store);
        assert!(controller.show_jump_to_bottom(overflowing));
        assert!(!controller.show_jump_to_bottom(ScrollMetrics::new(300, 0, 400)));
    }
}

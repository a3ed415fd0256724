use crate::chat::{MessageStore, ScrollMetrics, ViewPort};

/// Message-list viewport measured in terminal rows
#[derive(Debug, Clone, Default)]
pub struct TerminalViewport {
    width: u16,
    height: u16,
    content_lines: u32,
    scroll_top: u32,
    pending_bottom: bool,
}

impl TerminalViewport {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn width(&self) -> u16 {
        self.width
    }

    #[must_use]
    pub fn scroll_top(&self) -> u32 {
        self.scroll_top
    }

    #[must_use]
    pub fn max_scroll_top(&self) -> u32 {
        self.content_lines.saturating_sub(u32::from(self.height))
    }

    /// Returns whether the position had to be clamped
    pub fn resize(&mut self, width: u16, height: u16) -> bool {
        self.width = width;
        self.height = height;
        self.clamp()
    }

    /// Returns whether the position had to be clamped
    pub fn set_content_lines(&mut self, lines: u32) -> bool {
        self.content_lines = lines;
        self.clamp()
    }

    fn clamp(&mut self) -> bool {
        let clamped = self.scroll_top.min(self.max_scroll_top());
        let moved = clamped != self.scroll_top;
        self.scroll_top = clamped;
        moved
    }

    /// Back to the top of an empty list, ready for a freshly opened conversation
    pub fn reset_position(&mut self) {
        self.scroll_top = 0;
        self.content_lines = 0;
        self.pending_bottom = false;
    }

    /// Moves by `delta` rows, clamped. Returns whether the view moved.
    pub fn scroll_by(&mut self, delta: i64) -> bool {
        let target = (i64::from(self.scroll_top) + delta).clamp(0, i64::from(self.max_scroll_top()));
        let target = u32::try_from(target).unwrap_or(0);
        let moved = target != self.scroll_top;
        self.scroll_top = target;
        moved
    }

    pub fn scroll_to_top(&mut self) -> bool {
        let moved = self.scroll_top != 0;
        self.scroll_top = 0;
        moved
    }

    /// Applies a requested scroll-to-bottom once the geometry is known.
    /// Returns whether the view moved.
    pub fn resolve_pending(&mut self) -> bool {
        if !self.pending_bottom {
            return false;
        }
        self.pending_bottom = false;
        let target = self.max_scroll_top();
        let moved = target != self.scroll_top;
        self.scroll_top = target;
        moved
    }
}

impl ViewPort for TerminalViewport {
    fn scroll_to_bottom(&mut self) {
        self.pending_bottom = true;
    }

    fn metrics(&self) -> ScrollMetrics {
        ScrollMetrics::new(self.content_lines, self.scroll_top, u32::from(self.height))
    }
}

impl crate::app::App {
    pub fn scroll_thread_up(&mut self, lines: u16) {
        if self.viewport.scroll_by(-i64::from(lines)) {
            self.notify_scrolled();
        }
    }

    pub fn scroll_thread_down(&mut self, lines: u16) {
        if self.viewport.scroll_by(i64::from(lines)) {
            self.notify_scrolled();
        }
    }

    pub fn scroll_thread_up_page(&mut self) {
        let page = self.viewport.metrics().client_height.max(1);
        self.scroll_thread_up(u16::try_from(page).unwrap_or(u16::MAX));
    }

    pub fn scroll_thread_down_page(&mut self) {
        let page = self.viewport.metrics().client_height.max(1);
        self.scroll_thread_down(u16::try_from(page).unwrap_or(u16::MAX));
    }

    pub fn jump_to_top(&mut self) {
        if self.viewport.scroll_to_top() {
            self.notify_scrolled();
        }
    }

    /// Explicit jump to the newest message (End key or the jump marker).
    /// Always reported, even when the view was already there.
    pub fn jump_to_bottom(&mut self) {
        self.viewport.scroll_to_bottom();
        self.viewport.resolve_pending();
        self.notify_scrolled();
    }

    /// Same role as a DOM scroll event: hand the new geometry to the controller
    pub(crate) fn notify_scrolled(&mut self) {
        let metrics = self.viewport.metrics();
        self.controller.on_scroll(metrics, &self.store);
    }

    #[must_use]
    pub fn show_jump_to_bottom(&self) -> bool {
        self.store.active_conversation().is_some()
            && self.controller.show_jump_to_bottom(self.viewport.metrics())
    }
}

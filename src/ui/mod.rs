mod chat;
mod components;
mod help;
mod sidebar;
mod text;

pub use chat::thread_line_count;

use crate::app::App;
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
};

/// Where each pane of the screen lands for a given terminal size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenAreas {
    pub brand: Rect,
    pub search: Rect,
    pub chat_list: Rect,
    pub header: Rect,
    pub thread: Rect,
    pub composer: Rect,
    pub footer: Rect,
}

pub fn screen_areas(area: Rect, sidebar_width: u16) -> ScreenAreas {
    let sidebar_width = sidebar_width.min(area.width / 2);
    let [sidebar, main] =
        Layout::horizontal([Constraint::Length(sidebar_width), Constraint::Min(0)]).areas(area);

    let [brand, search, chat_list] = Layout::vertical([
        Constraint::Length(3), // Brand
        Constraint::Length(3), // Search
        Constraint::Min(0),    // Chats
    ])
    .areas(sidebar);

    let [header, thread, composer, footer] = Layout::vertical([
        Constraint::Length(3), // Peer
        Constraint::Min(0),    // Messages
        Constraint::Length(3), // Composer
        Constraint::Length(3), // Footer
    ])
    .areas(main);

    ScreenAreas {
        brand,
        search,
        chat_list,
        header,
        thread,
        composer,
        footer,
    }
}

pub fn render(f: &mut Frame, app: &App) {
    let areas = screen_areas(f.area(), app.ui.sidebar_width);

    sidebar::render_brand(f, app, areas.brand);
    sidebar::render_search(f, app, areas.search);
    sidebar::render_chat_list(f, app, areas.chat_list);

    chat::render_chat_header(f, app, areas.header);
    chat::render_thread(f, app, areas.thread);
    chat::render_composer(f, app, areas.composer);
    chat::render_footer(f, app, areas.footer);

    if app.show_help {
        help::render_help_overlay(f);
    }
}

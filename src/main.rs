// Defensive programming lints - prevent panics and unsafe patterns
#![deny(clippy::indexing_slicing)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![cfg_attr(
    test,
    allow(clippy::indexing_slicing, clippy::unwrap_used, clippy::expect_used)
)]
#![warn(clippy::fallible_impl_from)]
#![warn(clippy::wildcard_enum_match_arm)]
#![warn(clippy::fn_params_excessive_bools)]
// Idiomatic Rust lints
#![warn(clippy::needless_return)]
#![warn(clippy::let_and_return)]
#![warn(clippy::must_use_candidate)]
#![warn(clippy::redundant_closure_for_method_calls)]
#![warn(clippy::map_unwrap_or)]
#![warn(clippy::explicit_iter_loop)]

mod app;
mod chat;
mod config;
mod logging;
mod seed;
mod storage;
mod ui;

use app::{App, Focus, Navigable};
use chat::worker::{self, StorageTarget};
use chat::{ChatStore, UserProfile};
use clap::{Parser, Subcommand};
use color_eyre::Result;
use config::Config;
use crossterm::{
    event::{
        self, DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
        Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::{Backend, CrosstermBackend},
    layout::{Position, Rect},
};
use std::{io, path::PathBuf, time::Duration};
use storage::StorageManager;

#[derive(Debug, Parser)]
#[command(name = "palaver", version, about = "One-to-one chat in the terminal")]
struct Cli {
    /// Config file to use instead of the platform default
    #[arg(long, value_name = "PATH", env = "PALAVER_CONFIG")]
    config: Option<PathBuf>,

    /// Act as this user id instead of the configured one
    #[arg(long = "as", value_name = "UID")]
    as_user: Option<String>,

    /// Keep everything in memory for this session
    #[arg(long)]
    ephemeral: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Write demo users and conversations with unread messages
    Seed,
    /// List known users as JSON
    Users,
    /// Print where the config file lives
    ConfigPath,
}

fn main() -> Result<()> {
    // Setup error handling
    color_eyre::install()?;

    let cli = Cli::parse();
    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => Config::config_path()?,
    };
    let mut config = Config::load_from(&config_path)?;
    if let Some(uid) = &cli.as_user {
        config.user.uid = uid.clone();
        if config.user.display_name == Config::default().user.display_name {
            config.user.display_name = uid.clone();
        }
    }
    logging::init(&config)?;

    match cli.command {
        Some(Command::ConfigPath) => {
            println!("{}", config_path.display());
            Ok(())
        }
        Some(Command::Seed) => run_storage_task(&config, |storage, viewer| async move {
            let report = seed::seed(&storage, &viewer).await?;
            println!(
                "Seeded {} users, {} chats, {} messages",
                report.users, report.chats, report.messages
            );
            Ok(())
        }),
        Some(Command::Users) => run_storage_task(&config, |storage, _viewer| async move {
            let users = storage.load_users().await?;
            println!("{}", serde_json::to_string_pretty(&users)?);
            Ok(())
        }),
        None => run_tui(&config, cli.ephemeral),
    }
}

fn viewer_profile(config: &Config) -> UserProfile {
    UserProfile {
        uid: config.user.uid.clone(),
        display_name: config.user.display_name.clone(),
        photo_url: config.user.photo_url.clone(),
    }
}

/// Runs a one-shot database job for the CLI subcommands
fn run_storage_task<F, Fut>(config: &Config, task: F) -> Result<()>
where
    F: FnOnce(StorageManager, UserProfile) -> Fut,
    Fut: std::future::Future<Output = Result<()>>,
{
    let path = config.database_path()?;
    let viewer = viewer_profile(config);
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async move {
        let storage = StorageManager::new(&path).await?;
        task(storage, viewer).await
    })
}

fn run_tui(config: &Config, ephemeral: bool) -> Result<()> {
    let target = if ephemeral {
        StorageTarget::Memory
    } else {
        StorageTarget::Disk(config.database_path()?)
    };
    let handle = worker::spawn(target, viewer_profile(config))?;
    let store = ChatStore::new(config.user.uid.clone(), handle.commands.clone());

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableBracketedPaste
    )?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let (store_events, worker_handle) = handle.into_parts();
    let mut app = App::new(config, store, store_events);
    app.mount();
    let res = run_app(&mut terminal, &mut app);
    app.quit();

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;
    worker_handle.join();

    if let Err(err) = res {
        tracing::warn!(error = %err, "terminal loop failed");
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        app.check_store_events();
        app.clear_expired_status_toast();

        let size = terminal.size()?;
        let areas = ui::screen_areas(Rect::new(0, 0, size.width, size.height), app.ui.sidebar_width);
        app.sync_viewport(areas.thread);

        terminal.draw(|f| ui::render(f, app))?;

        if app.should_quit {
            break;
        }

        // Poll for events with a timeout
        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) => {
                    // Only handle KeyPress events to avoid duplicate handling
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    handle_key(app, key);
                }
                Event::Mouse(mouse) => handle_mouse_event(app, mouse, &areas),
                Event::Paste(paste) => handle_paste(app, &paste),
                Event::FocusGained | Event::FocusLost | Event::Resize(_, _) => {}
            }
        }
    }

    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    let control = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('c') if control => {
            app.should_quit = true;
            return;
        }
        KeyCode::Char('f') if control => {
            app.close_help();
            app.focus_search();
            return;
        }
        KeyCode::F(1) => {
            app.toggle_help();
            return;
        }
        _ if app.show_help => {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('q')) {
                app.close_help();
            }
            return;
        }
        KeyCode::Tab | KeyCode::BackTab => {
            app.focus_next_pane();
            return;
        }
        KeyCode::PageUp => {
            app.scroll_thread_up_page();
            return;
        }
        KeyCode::PageDown => {
            app.scroll_thread_down_page();
            return;
        }
        KeyCode::Home if app.focus != Focus::Search => {
            app.jump_to_top();
            return;
        }
        KeyCode::End if app.focus != Focus::Search => {
            app.jump_to_bottom();
            return;
        }
        _ => {}
    }

    match app.focus {
        Focus::Sidebar => handle_sidebar_mode(app, key.code),
        Focus::Composer => handle_composer_mode(app, key.code, key.modifiers),
        Focus::Search => handle_search_mode(app, key.code),
    }
}

fn handle_sidebar_mode(app: &mut App, key_code: KeyCode) {
    match key_code {
        KeyCode::Up => app.previous_item(),
        KeyCode::Down => app.next_item(),
        KeyCode::Enter => app.activate_selected(),
        KeyCode::Char('?') => app.toggle_help(),
        KeyCode::Char('/') => app.focus_search(),
        KeyCode::Esc => app.close_conversation(),
        KeyCode::Char(character) => {
            if app.store.active_id().is_some() {
                app.focus = Focus::Composer;
                app.composer.add_char(character);
            }
        }
        KeyCode::Backspace
        | KeyCode::Left
        | KeyCode::Right
        | KeyCode::Home
        | KeyCode::End
        | KeyCode::PageUp
        | KeyCode::PageDown
        | KeyCode::Tab
        | KeyCode::BackTab
        | KeyCode::Delete
        | KeyCode::Insert
        | KeyCode::F(_)
        | KeyCode::Null
        | KeyCode::CapsLock
        | KeyCode::ScrollLock
        | KeyCode::NumLock
        | KeyCode::PrintScreen
        | KeyCode::Pause
        | KeyCode::Menu
        | KeyCode::KeypadBegin
        | KeyCode::Media(_)
        | KeyCode::Modifier(_) => {}
    }
}

fn handle_composer_mode(app: &mut App, key_code: KeyCode, modifiers: KeyModifiers) {
    let scrolls = app.composer.is_empty() || modifiers.contains(KeyModifiers::CONTROL);
    let step = app.ui.scroll_step;
    match key_code {
        KeyCode::Up if scrolls => app.scroll_thread_up(step),
        KeyCode::Down if scrolls => app.scroll_thread_down(step),
        KeyCode::Enter => app.send_composer_message(),
        KeyCode::Esc => app.focus = Focus::Sidebar,
        KeyCode::Char(character) => app.composer.add_char(character),
        KeyCode::Backspace => app.composer.remove_char(),
        KeyCode::Delete => app.composer.delete_char(),
        KeyCode::Left => app.composer.move_left(),
        KeyCode::Right => app.composer.move_right(),
        KeyCode::Up
        | KeyCode::Down
        | KeyCode::Home
        | KeyCode::End
        | KeyCode::PageUp
        | KeyCode::PageDown
        | KeyCode::Tab
        | KeyCode::BackTab
        | KeyCode::Insert
        | KeyCode::F(_)
        | KeyCode::Null
        | KeyCode::CapsLock
        | KeyCode::ScrollLock
        | KeyCode::NumLock
        | KeyCode::PrintScreen
        | KeyCode::Pause
        | KeyCode::Menu
        | KeyCode::KeypadBegin
        | KeyCode::Media(_)
        | KeyCode::Modifier(_) => {}
    }
}

fn handle_search_mode(app: &mut App, key_code: KeyCode) {
    match key_code {
        KeyCode::Enter => app.submit_search(),
        KeyCode::Esc => app.cancel_search(),
        KeyCode::Char(character) => app.search.add_char(character),
        KeyCode::Backspace => app.search.remove_char(),
        KeyCode::Delete => app.search.delete_char(),
        KeyCode::Left => app.search.move_left(),
        KeyCode::Right => app.search.move_right(),
        KeyCode::Home => app.search.move_to_start(),
        KeyCode::End => app.search.move_to_end(),
        KeyCode::Up
        | KeyCode::Down
        | KeyCode::PageUp
        | KeyCode::PageDown
        | KeyCode::Tab
        | KeyCode::BackTab
        | KeyCode::Insert
        | KeyCode::F(_)
        | KeyCode::Null
        | KeyCode::CapsLock
        | KeyCode::ScrollLock
        | KeyCode::NumLock
        | KeyCode::PrintScreen
        | KeyCode::Pause
        | KeyCode::Menu
        | KeyCode::KeypadBegin
        | KeyCode::Media(_)
        | KeyCode::Modifier(_) => {}
    }
}

fn handle_mouse_event(app: &mut App, mouse: event::MouseEvent, areas: &ui::ScreenAreas) {
    if app.show_help {
        return;
    }
    let position = Position::new(mouse.column, mouse.row);
    let over_sidebar = areas.chat_list.contains(position);
    let step = app.ui.scroll_step;

    match mouse.kind {
        event::MouseEventKind::ScrollUp if over_sidebar => app.previous_item(),
        event::MouseEventKind::ScrollDown if over_sidebar => app.next_item(),
        event::MouseEventKind::ScrollUp => app.scroll_thread_up(step),
        event::MouseEventKind::ScrollDown => app.scroll_thread_down(step),
        event::MouseEventKind::Down(event::MouseButton::Left) => {
            // The jump marker sits on the thread's top border.
            if mouse.row == areas.thread.y
                && areas.thread.contains(position)
                && app.show_jump_to_bottom()
            {
                app.jump_to_bottom();
            } else if areas.composer.contains(position) {
                app.focus = Focus::Composer;
            } else if over_sidebar {
                app.focus = Focus::Sidebar;
            }
        }
        event::MouseEventKind::ScrollLeft | event::MouseEventKind::ScrollRight => {
            // Ignore horizontal scrolling
        }
        event::MouseEventKind::Down(_)
        | event::MouseEventKind::Up(_)
        | event::MouseEventKind::Drag(_)
        | event::MouseEventKind::Moved => {}
    }
}

fn handle_paste(app: &mut App, paste: &str) {
    match app.focus {
        Focus::Search => app.search.insert_str(paste),
        Focus::Composer | Focus::Sidebar => {
            if app.store.active_id().is_some() {
                app.focus = Focus::Composer;
                app.composer.insert_str(paste);
            }
        }
    }
}

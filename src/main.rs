use pswp::async_preview::PreviewManager;
use pswp::backend::{ApprovalToken, DeletionBackend, TrashBackend};
use pswp::cli::{AppConfig, Args};
use pswp::config::UserConfig;
use pswp::driver::SessionDriver;
use pswp::logging::init_logging;
use pswp::open_file;
use pswp::source::{DirectorySource, DiscoveryOptions, ItemSource};
use pswp::tui::{
    handle_approval_input, handle_key_event, render, render_approval_overlay,
    render_help_overlay, render_summary, render_welcome_overlay, KeyAction, Screen, ViewState,
};

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::sync::Arc;
use std::{io, time::Duration};
use tracing::{info, warn};

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn main() -> io::Result<()> {
    let args = Args::parse_args();

    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    init_logging(args.log_level.as_deref());

    let prefs = UserConfig::load().unwrap_or_else(|e| {
        eprintln!("Warning: Failed to load user config: {}", e);
        warn!(error = %e, "falling back to default preferences");
        UserConfig::default()
    });

    let config = AppConfig::resolve(args, &prefs);
    info!(
        directory = %config.directory.display(),
        sort = ?config.sort_order,
        mode = ?config.delete_mode,
        "starting"
    );

    run_app_with_config(&config, prefs)
}

/// Runs the TUI application with configuration
pub fn run_app_with_config(config: &AppConfig, mut prefs: UserConfig) -> io::Result<()> {
    let source: Arc<dyn ItemSource> = Arc::new(DirectorySource::new(
        &config.directory,
        DiscoveryOptions {
            show_hidden: config.show_hidden,
        },
    ));
    let trash = Arc::new(TrashBackend::new(config.dry_run, config.require_approval));
    let backend: Arc<dyn DeletionBackend> = trash.clone();

    let mut driver = SessionDriver::new(source, backend, config.sort_order, config.delete_mode)
        .map_err(io::Error::other)?;
    driver.ensure_loaded(config.sort_order);

    let mut preview_manager = PreviewManager::new().map_err(io::Error::other)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_loop(
        &mut terminal,
        &mut driver,
        &trash,
        &mut preview_manager,
        config,
        &mut prefs,
    );

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // Let in-flight deletes finish before reporting
    if !driver.wait_idle(Duration::from_secs(10)) {
        warn!("exiting with backend work still outstanding");
    }

    let session = driver.state();
    let prefix = if config.dry_run { "[DRY RUN] " } else { "" };
    println!("{}Kept {} photos", prefix, session.kept_count);
    println!("{}Trashed {} photos", prefix, session.confirmed_delete_count);
    if !session.queued_deletes.is_empty() {
        println!(
            "{} queued photos were not committed and are untouched",
            session.queued_deletes.len()
        );
    }

    result
}

fn save_preferences(prefs: &UserConfig) {
    if let Err(e) = prefs.save() {
        warn!(error = %e, "failed to save preferences");
    }
}

/// Carries out the user's answer to a consent prompt and reports it to the session
fn resolve_approval(
    trash: &TrashBackend,
    driver: &mut SessionDriver,
    token: ApprovalToken,
    approved: bool,
) -> Option<String> {
    match trash.resolve(token, approved) {
        Ok(()) => {
            driver.approval_resolved(approved);
            None
        }
        Err(e) => {
            warn!(?token, error = %e, "approved delete failed");
            driver.approval_resolved(false);
            Some(e.to_string())
        }
    }
}

/// Main application loop
fn run_loop<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    driver: &mut SessionDriver,
    trash: &TrashBackend,
    preview_manager: &mut PreviewManager,
    config: &AppConfig,
    prefs: &mut UserConfig,
) -> io::Result<()> {
    let mut view_state = if config.force_welcome || prefs.should_show_welcome(VERSION) {
        ViewState::Welcome
    } else {
        ViewState::Reviewing
    };
    let mut notice: Option<String> = None;

    loop {
        driver.poll();

        let session = driver.state();
        if let Some(item) = session.current_item() {
            preview_manager.request_preview(item);
        }
        let preview = session
            .current_item()
            .map(|_| preview_manager.current_state());

        let screen = Screen {
            session,
            preview,
            interaction_mode: prefs.interaction_mode,
            dry_run: config.dry_run,
            notice: notice.as_deref(),
        };

        terminal.draw(|frame| {
            render(frame, &screen);

            match view_state {
                ViewState::Help => render_help_overlay(frame),
                ViewState::Summary => render_summary(frame, session),
                ViewState::Welcome => render_welcome_overlay(frame),
                ViewState::Reviewing => {}
            }

            if let Some(approval) = session.pending_approval() {
                render_approval_overlay(frame, approval, config.dry_run);
            }
        })?;

        if !event::poll(Duration::from_millis(100))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        // A consent prompt takes every key until answered
        if let Some(token) = driver.state().pending_approval().map(|a| a.token) {
            match handle_approval_input(key) {
                KeyAction::ApproveDelete => {
                    notice = resolve_approval(trash, driver, token, true);
                }
                KeyAction::DeclineDelete => {
                    notice = resolve_approval(trash, driver, token, false);
                }
                _ => {}
            }
            continue;
        }

        match view_state {
            ViewState::Help => {
                let action = handle_key_event(key);
                if matches!(action, KeyAction::Help | KeyAction::Quit | KeyAction::None) {
                    view_state = ViewState::Reviewing;
                }
                continue;
            }
            ViewState::Summary => {
                if matches!(key.code, KeyCode::Char('q') | KeyCode::Esc) {
                    break;
                }
                view_state = ViewState::Reviewing;
                continue;
            }
            ViewState::Welcome => {
                view_state = ViewState::Reviewing;
                prefs.mark_welcome_shown(VERSION);
                save_preferences(prefs);
                continue;
            }
            ViewState::Reviewing => {}
        }

        let action = handle_key_event(key);
        if action != KeyAction::None {
            notice = None;
            if driver.state().last_error.is_some() {
                driver.clear_error();
            }
        }

        match action {
            KeyAction::Quit => {
                let session = driver.state();
                let decided = session.processed_count > 0
                    || session.confirmed_delete_count > 0
                    || !session.queued_deletes.is_empty();
                if decided {
                    view_state = ViewState::Summary;
                } else {
                    break;
                }
            }
            KeyAction::Keep => driver.keep(),
            KeyAction::Delete => driver.delete(),
            KeyAction::Skip => driver.skip(),
            KeyAction::Previous => driver.previous(),
            KeyAction::Undo => match driver.undo() {
                Ok(action) => notice = Some(format!("Restored {}", action.item().name())),
                Err(e) => notice = Some(e.to_string()),
            },
            KeyAction::Commit => {
                if driver.state().unsubmitted_queue().next().is_none() {
                    notice = Some("Nothing queued to commit".to_string());
                } else {
                    driver.commit_queued_deletes();
                }
            }
            KeyAction::ToggleSort => {
                let order = driver.state().sort_order.toggled();
                driver.set_sort_order(order);
                preview_manager.reset();
                prefs.sort_order = order;
                save_preferences(prefs);
            }
            KeyAction::ToggleDeleteMode => {
                let mode = driver.state().delete_mode.toggled();
                driver.set_delete_mode(mode);
                prefs.delete_mode = mode;
                save_preferences(prefs);
                notice = Some(format!("{} deletes", mode.label()));
            }
            KeyAction::ToggleView => {
                prefs.interaction_mode = prefs.interaction_mode.toggled();
                save_preferences(prefs);
            }
            KeyAction::Restart => driver.restart(),
            KeyAction::Reload => {
                driver.reload();
                preview_manager.reset();
            }
            KeyAction::Open => {
                if let Some(item) = driver.state().current_item() {
                    if let Err(e) = open_file(&item.locator) {
                        notice = Some(format!("Failed to open photo: {}", e));
                    }
                }
            }
            KeyAction::Help => view_state = ViewState::Help,
            KeyAction::ApproveDelete | KeyAction::DeclineDelete | KeyAction::None => {}
        }
    }

    Ok(())
}

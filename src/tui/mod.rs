// TUI module for rendering the terminal interface
pub mod colors;
pub mod helpers;
pub mod input;

// Re-exports
pub use colors::*;
pub use helpers::{calculate_progress, format_file_size, position_label};
pub use input::{handle_approval_input, handle_key_event, KeyAction};

use crate::async_preview::PreviewState;
use crate::config::InteractionMode;
use crate::domain::{ApprovalScope, DeleteMode, PendingApproval, SessionState};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Gauge, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

/// UI view state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    /// Main review screen
    Reviewing,
    Help,
    /// Shown when the user quits after making decisions
    Summary,
    /// First launch, or after an upgrade
    Welcome,
}

/// Everything one frame of the review screen is drawn from
pub struct Screen<'a> {
    pub session: &'a SessionState,
    /// Preview of the current photo, if one has been requested
    pub preview: Option<&'a PreviewState>,
    pub interaction_mode: InteractionMode,
    pub dry_run: bool,
    /// Transient notice from the last key press
    pub notice: Option<&'a str>,
}

/// Renders the review screen
pub fn render(frame: &mut Frame, screen: &Screen) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Header with progress
            Constraint::Min(0),    // Content
            Constraint::Length(4), // Footer with status
        ])
        .split(frame.area());

    render_header(frame, chunks[0], screen.session);

    match screen.interaction_mode {
        InteractionMode::Swipe => render_content(frame, chunks[1], screen),
        InteractionMode::Browse => {
            let columns = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
                .split(chunks[1]);
            render_browse_list(frame, columns[0], screen.session);
            render_content(frame, columns[1], screen);
        }
    }

    render_footer(frame, chunks[2], screen);

    if screen.session.is_loading {
        render_loading_overlay(frame);
    }
}

/// Renders the summary screen at the end
pub fn render_summary(frame: &mut Frame, session: &SessionState) {
    let summary_area = centered_rect(60, 50, frame.area());
    frame.render_widget(Clear, summary_area);

    let block = Block::default()
        .title(" Session Complete ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(ACCENT_HIGHLIGHT))
        .style(Style::default().bg(BG_DARK));

    let inner = block.inner(summary_area);
    frame.render_widget(block, summary_area);

    let count_line = |symbol: &'static str, label: &'static str, count: usize, color| {
        Line::from(vec![
            Span::styled(symbol, Style::default().fg(color)),
            Span::raw(label),
            Span::styled(
                count.to_string(),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
        ])
    };

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Summary",
            Style::default()
                .fg(TEXT_PRIMARY)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        count_line("   ✓ ", "Kept:        ", session.kept_count, ACCENT_SECONDARY),
        count_line(
            "   ✗ ",
            "Trashed:     ",
            session.confirmed_delete_count,
            ACCENT_PRIMARY,
        ),
        count_line(
            "   ○ ",
            "Not decided: ",
            session.working_set.len(),
            TEXT_SECONDARY,
        ),
    ];

    if !session.queued_deletes.is_empty() {
        lines.push(count_line(
            "   ⧗ ",
            "Still queued:",
            session.queued_deletes.len(),
            ACCENT_WARNING,
        ));
        lines.push(Line::from(Span::styled(
            "Queued photos are not trashed until committed (c)",
            Style::default().fg(ACCENT_WARNING),
        )));
    }

    lines.extend([
        Line::from(""),
        Line::from(Span::styled(
            "Press q to exit, any other key to keep reviewing",
            Style::default().fg(TEXT_SECONDARY),
        )),
    ]);

    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .style(Style::default().fg(TEXT_PRIMARY));

    frame.render_widget(paragraph, inner);
}

fn key_line(keys: &'static str, color: ratatui::style::Color, description: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<10}", keys), Style::default().fg(color)),
        Span::raw(description),
    ])
}

fn shortcut_lines() -> Vec<Line<'static>> {
    vec![
        key_line("→ / k", ACCENT_SECONDARY, "Keep photo"),
        key_line("← / d", ACCENT_PRIMARY, "Delete photo"),
        key_line("↓ / Space", TEXT_SECONDARY, "Skip for now"),
        key_line("↑ / i", TEXT_SECONDARY, "Previous photo"),
        key_line("u", ACCENT_HIGHLIGHT, "Undo last decision"),
        key_line("c", ACCENT_WARNING, "Commit queued deletes"),
        key_line("m", TEXT_SECONDARY, "Toggle immediate / queued deletes"),
        key_line("s", TEXT_SECONDARY, "Toggle newest / oldest first"),
        key_line("b", TEXT_SECONDARY, "Toggle browse list"),
        key_line("r", TEXT_SECONDARY, "Review remaining photos again"),
        key_line("R / F5", TEXT_SECONDARY, "Rescan the folder"),
        key_line("o", TEXT_SECONDARY, "Open in system viewer"),
        key_line("?", TEXT_SECONDARY, "Toggle help"),
        key_line("q / Esc", TEXT_SECONDARY, "Quit"),
    ]
}

/// Renders the help overlay
pub fn render_help_overlay(frame: &mut Frame) {
    let help_area = centered_rect(60, 80, frame.area());
    frame.render_widget(Clear, help_area);

    let block = Block::default()
        .title(" Help ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(ACCENT_HIGHLIGHT))
        .style(Style::default().bg(BG_DARK));

    let inner = block.inner(help_area);
    frame.render_widget(block, help_area);

    let mut help_lines = vec![
        Line::from(Span::styled(
            "Keyboard Shortcuts",
            Style::default()
                .fg(ACCENT_HIGHLIGHT)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];
    help_lines.extend(shortcut_lines());
    help_lines.extend([
        Line::from(""),
        Line::from(Span::styled(
            "Press ? or Esc to close",
            Style::default().fg(TEXT_SECONDARY),
        )),
    ]);

    let paragraph = Paragraph::new(help_lines).style(Style::default().fg(TEXT_PRIMARY));
    frame.render_widget(paragraph, inner);
}

/// Renders the welcome dialog overlay
pub fn render_welcome_overlay(frame: &mut Frame) {
    let area = centered_rect(85, 85, frame.area());
    frame.render_widget(Clear, area);

    let heading = |text: &'static str| {
        Line::from(Span::styled(
            text,
            Style::default()
                .fg(ACCENT_HIGHLIGHT)
                .add_modifier(Modifier::BOLD),
        ))
    };
    let bullet = |text: &'static str| {
        Line::from(vec![
            Span::styled("  •  ", Style::default().fg(ACCENT_SECONDARY)),
            Span::raw(text),
        ])
    };

    let mut welcome_lines = vec![
        Line::from(""),
        heading("Welcome to pswp!"),
        Line::from(""),
        Line::from("Go through a folder of photos one at a time and decide what stays."),
        Line::from(""),
        heading("Essential Keyboard Shortcuts:"),
        Line::from(""),
    ];
    welcome_lines.extend(shortcut_lines());
    welcome_lines.extend([
        Line::from(""),
        heading("Safety Features:"),
        Line::from(""),
        bullet("Photos are moved to your system trash, never erased"),
        bullet("You are asked before anything is trashed (skip with --yes)"),
        bullet("Queued mode (m) collects deletes until you commit them with c"),
        bullet("Run with --dry-run to try it without touching any files"),
        Line::from(""),
        heading("Press any key to start reviewing..."),
    ]);

    let welcome_text = Paragraph::new(welcome_lines)
        .block(
            Block::default()
                .title(Span::styled(
                    " Welcome to pswp ",
                    Style::default()
                        .fg(ACCENT_HIGHLIGHT)
                        .add_modifier(Modifier::BOLD),
                ))
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(ACCENT_HIGHLIGHT))
                .style(Style::default().bg(BG_DARK)),
        )
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: false });

    frame.render_widget(welcome_text, area);
}

/// Renders the consent prompt for a delete waiting on approval
pub fn render_approval_overlay(frame: &mut Frame, approval: &PendingApproval, dry_run: bool) {
    let confirm_area = centered_rect(50, 40, frame.area());
    frame.render_widget(Clear, confirm_area);

    let block = Block::default()
        .title(" ⚠ Confirm Delete ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(ACCENT_PRIMARY))
        .style(Style::default().bg(BG_DARK));

    let inner = block.inner(confirm_area);
    frame.render_widget(block, confirm_area);

    let noun = if approval.count == 1 { "photo" } else { "photos" };
    let question = match approval.scope {
        ApprovalScope::Immediate => format!("Move {} {} to the trash?", approval.count, noun),
        ApprovalScope::Queued => {
            format!("Move {} queued {} to the trash?", approval.count, noun)
        }
    };

    let mut confirm_lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            question,
            Style::default()
                .fg(TEXT_PRIMARY)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Declining puts the photos back in review.",
            Style::default().fg(TEXT_SECONDARY),
        )),
    ];
    if dry_run {
        confirm_lines.push(Line::from(Span::styled(
            "[DRY RUN] Nothing will actually be trashed.",
            Style::default().fg(ACCENT_WARNING),
        )));
    }
    confirm_lines.extend([
        Line::from(""),
        Line::from(vec![
            Span::styled("[Y]", Style::default().fg(ACCENT_SECONDARY)),
            Span::raw("es  "),
            Span::styled("[Enter]", Style::default().fg(ACCENT_SECONDARY)),
            Span::raw("     "),
            Span::styled("[N]", Style::default().fg(ACCENT_PRIMARY)),
            Span::raw("o  "),
            Span::styled("[Esc]", Style::default().fg(ACCENT_PRIMARY)),
        ]),
    ]);

    let paragraph = Paragraph::new(confirm_lines)
        .alignment(Alignment::Center)
        .style(Style::default().fg(TEXT_PRIMARY));

    frame.render_widget(paragraph, inner);
}

/// Renders a loading overlay while the folder is scanned
pub fn render_loading_overlay(frame: &mut Frame) {
    let loading_area = centered_rect(40, 20, frame.area());
    frame.render_widget(Clear, loading_area);

    let block = Block::default()
        .title(" Loading ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(ACCENT_HIGHLIGHT))
        .style(Style::default().bg(BG_DARK));

    let inner = block.inner(loading_area);
    frame.render_widget(block, loading_area);

    let spinners = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    let spinner = spinners[(now / 100) as usize % spinners.len()];

    let lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled(format!("{} ", spinner), Style::default().fg(ACCENT_HIGHLIGHT)),
            Span::styled("Scanning photos", Style::default().fg(TEXT_PRIMARY)),
        ]),
    ];

    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), inner);
}

/// Helper to create a centered rect
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// Renders the header with the position counter and progress bar
fn render_header(frame: &mut Frame, area: Rect, session: &SessionState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Length(2)])
        .split(area);

    let photo_info = match session.current_item() {
        Some(item) => {
            let taken = item
                .sort_key
                .map(|t| t.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "undated".to_string());
            vec![
                Span::styled(
                    item.name(),
                    Style::default()
                        .fg(TEXT_PRIMARY)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw("  "),
                Span::styled(
                    format!("({} • {})", format_file_size(item.size), taken),
                    Style::default().fg(TEXT_SECONDARY),
                ),
            ]
        }
        None => vec![Span::styled(
            "No photo selected",
            Style::default().fg(TEXT_SECONDARY),
        )],
    };

    let title_line = Line::from(vec![Span::styled(
        format!(" {} ", position_label(session)),
        Style::default()
            .fg(ACCENT_HIGHLIGHT)
            .add_modifier(Modifier::BOLD),
    )]);

    let header = Paragraph::new(vec![title_line, Line::from(photo_info)])
        .block(
            Block::default()
                .borders(Borders::TOP | Borders::LEFT | Borders::RIGHT)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(BORDER_COLOR)),
        )
        .alignment(Alignment::Left);

    frame.render_widget(header, chunks[0]);

    let total = session.total_count;
    let processed = session.processed_count.min(total);
    let progress = calculate_progress(processed, total);

    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::BOTTOM | Borders::LEFT | Borders::RIGHT)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(BORDER_COLOR)),
        )
        .gauge_style(Style::default().fg(ACCENT_SECONDARY).bg(BG_DARK))
        .ratio(progress)
        .label(format!(
            "{}% ({}/{} decided)",
            (progress * 100.0) as u16,
            processed,
            total
        ));

    frame.render_widget(gauge, chunks[1]);
}

/// Renders the list of photos still to review (browse mode)
fn render_browse_list(frame: &mut Frame, area: Rect, session: &SessionState) {
    let items: Vec<ListItem> = session
        .working_set
        .iter()
        .map(|item| ListItem::new(Line::from(item.name())))
        .collect();

    let mut list_state = ListState::default();
    if !session.is_exhausted() {
        list_state.select(Some(session.cursor));
    }

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(BORDER_COLOR))
                .title(format!(" To review ({}) ", session.working_set.len())),
        )
        .style(Style::default().fg(TEXT_SECONDARY))
        .highlight_style(
            Style::default()
                .fg(ACCENT_HIGHLIGHT)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▶ ");

    frame.render_stateful_widget(list, area, &mut list_state);
}

/// Renders the current photo
fn render_content(frame: &mut Frame, area: Rect, screen: &Screen) {
    let session = screen.session;
    let Some(item) = session.current_item() else {
        frame.render_widget(render_empty_state_widget(session), area);
        return;
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(BORDER_COLOR))
        .title(format!(" {} ", item.name()));

    let lines: Vec<Line> = match screen.preview {
        Some(PreviewState::Ready(preview)) => preview.lines.clone(),
        Some(PreviewState::Error(e)) => vec![
            Line::from(""),
            Line::from(Span::styled(
                "  [!] Could not show this photo",
                Style::default()
                    .fg(ACCENT_PRIMARY)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(format!("  {}", e)),
            Line::from(""),
            Line::from(format!("  Path: {}", item.locator.display())),
            Line::from(format!("  Size: {}", format_file_size(item.size))),
            Line::from("  Press o to open it in the system viewer."),
        ],
        Some(PreviewState::Loading) | None => vec![
            Line::from(""),
            Line::from(Span::styled(
                "  Rendering preview…",
                Style::default().fg(TEXT_SECONDARY),
            )),
        ],
    };

    let paragraph = Paragraph::new(lines)
        .block(block)
        .style(Style::default().fg(TEXT_PRIMARY));
    frame.render_widget(paragraph, area);
}

/// Creates the widget shown when there is no current photo
fn render_empty_state_widget(session: &SessionState) -> Paragraph<'static> {
    let (title, hint) = if session.working_set.is_empty() && session.queued_deletes.is_empty() {
        (
            "No Photos Left",
            "Nothing to review here. Press R to rescan or q to quit.",
        )
    } else if session.working_set.is_empty() {
        (
            "All Photos Reviewed",
            "Queued deletes are waiting. Press c to commit them.",
        )
    } else {
        (
            "End of the Line",
            "Skipped photos remain. Press r to go through them again.",
        )
    };

    let lines = vec![
        Line::from(""),
        Line::from(""),
        Line::from(Span::styled(
            title,
            Style::default()
                .fg(ACCENT_HIGHLIGHT)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(hint, Style::default().fg(TEXT_SECONDARY))),
    ];

    Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(BORDER_COLOR))
                .title(" Photos "),
        )
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
}

/// The status row: an error, a notice, or the session settings
fn status_line(screen: &Screen) -> Line<'static> {
    let session = screen.session;

    if let Some(error) = &session.last_error {
        return Line::from(Span::styled(
            format!("⚠ {}", error),
            Style::default()
                .fg(ACCENT_PRIMARY)
                .add_modifier(Modifier::BOLD),
        ));
    }

    if let Some(notice) = screen.notice {
        return Line::from(Span::styled(
            notice.to_string(),
            Style::default().fg(ACCENT_HIGHLIGHT),
        ));
    }

    let mut spans = vec![
        Span::styled(session.sort_order.label(), Style::default().fg(TEXT_SECONDARY)),
        Span::raw(" · "),
        Span::styled(
            format!("{} deletes", session.delete_mode.label()),
            Style::default().fg(TEXT_SECONDARY),
        ),
    ];
    if session.delete_mode == DeleteMode::Queued || !session.queued_deletes.is_empty() {
        spans.push(Span::raw(" · "));
        spans.push(Span::styled(
            format!("{} queued", session.queued_deletes.len()),
            Style::default().fg(ACCENT_WARNING),
        ));
    }
    if screen.dry_run {
        spans.push(Span::raw(" · "));
        spans.push(Span::styled(
            "DRY RUN",
            Style::default()
                .fg(ACCENT_WARNING)
                .add_modifier(Modifier::BOLD),
        ));
    }
    Line::from(spans)
}

/// Renders the footer with controls and status
fn render_footer(frame: &mut Frame, area: Rect, screen: &Screen) {
    let separator = || Span::raw("  │  ");
    let controls = Line::from(vec![
        Span::styled(
            "← ",
            Style::default()
                .fg(ACCENT_PRIMARY)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled("Delete", Style::default().fg(TEXT_SECONDARY)),
        separator(),
        Span::styled(
            "→ ",
            Style::default()
                .fg(ACCENT_SECONDARY)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled("Keep", Style::default().fg(TEXT_SECONDARY)),
        separator(),
        Span::styled("↓ ", Style::default().fg(TEXT_SECONDARY)),
        Span::styled("Skip", Style::default().fg(TEXT_SECONDARY)),
        separator(),
        Span::styled("u ", Style::default().fg(ACCENT_HIGHLIGHT)),
        Span::styled("Undo", Style::default().fg(TEXT_SECONDARY)),
        separator(),
        Span::styled("? ", Style::default().fg(TEXT_SECONDARY)),
        Span::styled("Help", Style::default().fg(TEXT_SECONDARY)),
        separator(),
        Span::styled("q ", Style::default().fg(TEXT_SECONDARY)),
        Span::styled("Quit", Style::default().fg(TEXT_SECONDARY)),
    ]);

    let footer = Paragraph::new(vec![controls, status_line(screen)])
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(BORDER_COLOR)),
        )
        .alignment(Alignment::Center);

    frame.render_widget(footer, area);
}

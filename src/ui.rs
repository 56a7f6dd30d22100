//! Layout and drawing: well, next preview, score, pause and game-over overlays.

use crate::theme::Theme;
use columnstui::board::{COLUMNS, HIDDEN_ROWS, ROWS, VISIBLE_ROWS};
use columnstui::{Cell, EndReason, Event, Game, Phase, Piece, PieceState, Position};
use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

/// Each jewel is drawn as a three-character sticker.
const CELL_WIDTH: u16 = 3;
const SIDEBAR_WIDTH: u16 = 24;

/// Everything `draw` needs besides the game itself.
pub struct View<'a> {
    pub theme: &'a Theme,
    pub paused: bool,
    pub show_hidden: bool,
    pub last_event: Option<Event>,
}

/// Well size in terminal cells, border included.
fn well_size(show_hidden: bool) -> (u16, u16) {
    let rows = if show_hidden { ROWS } else { VISIBLE_ROWS };
    (COLUMNS as u16 * CELL_WIDTH + 2, rows as u16 + 2)
}

/// Well rect, placed so well and sidebar together are centred in `area`.
fn well_rect(area: Rect, show_hidden: bool) -> Rect {
    let (w, h) = well_size(show_hidden);
    let total_w = w + SIDEBAR_WIDTH;
    Rect {
        x: area.x + area.width.saturating_sub(total_w) / 2,
        y: area.y + area.height.saturating_sub(h) / 2,
        width: w.min(area.width),
        height: h.min(area.height),
    }
}

/// Style for one piece: falling and landed pieces show their brackets in colour, frozen pieces
/// are filled, matched pieces flash.
fn piece_style(piece: Piece, theme: &Theme) -> Style {
    let color = theme.jewel_color(piece.jewel());
    match piece.state() {
        PieceState::Falling => Style::default().fg(color),
        PieceState::Landed => Style::default().fg(color).add_modifier(Modifier::BOLD),
        PieceState::Frozen => Style::default().fg(Color::Black).bg(color),
        PieceState::Matched => Style::default()
            .fg(color)
            .bg(theme.main_fg)
            .add_modifier(Modifier::BOLD | Modifier::SLOW_BLINK),
    }
}

fn cell_span(cell: Cell, hidden: bool, theme: &Theme) -> Span<'static> {
    match cell.piece() {
        Some(piece) if hidden => {
            Span::styled(piece.to_string(), Style::default().fg(theme.inactive_fg))
        }
        Some(piece) => Span::styled(piece.to_string(), piece_style(piece, theme)),
        None if hidden => Span::styled(" · ", Style::default().fg(theme.div_line)),
        None => Span::styled("   ", Style::default().bg(theme.bg)),
    }
}

fn well_lines(game: &Game, view: &View<'_>) -> Vec<Line<'static>> {
    let first_row = if view.show_hidden { 0 } else { HIDDEN_ROWS };
    (first_row..ROWS)
        .map(|row| {
            let spans: Vec<Span<'static>> = (0..COLUMNS)
                .map(|col| {
                    let cell = game.board().get(Position::new(col, row)).unwrap_or_default();
                    cell_span(cell, row < HIDDEN_ROWS, view.theme)
                })
                .collect();
            Line::from(spans)
        })
        .collect()
}

fn phase_label(phase: Phase) -> &'static str {
    match phase {
        Phase::Falling => "Falling",
        Phase::Matching => "Matching",
        Phase::Clearing => "Clearing",
        Phase::Ended(EndReason::GameOver) => "Game over",
        Phase::Ended(EndReason::Quit) => "Quit",
    }
}

fn event_label(event: Event) -> String {
    match event {
        Event::Spawned { column } => format!("spawned in column {}", column + 1),
        Event::Landed => "landed".to_string(),
        Event::Frozen => "frozen".to_string(),
        Event::Matched { pieces } => format!("{pieces} matched"),
        Event::Cleared { points } => format!("+{points}"),
        Event::GameOver { score } => format!("game over at {score}"),
        Event::Quit { score } => format!("quit at {score}"),
    }
}

fn sidebar_lines(game: &Game, view: &View<'_>) -> Vec<Line<'static>> {
    let theme = view.theme;
    let label = Style::default().fg(theme.title).add_modifier(Modifier::BOLD);
    let text = Style::default().fg(theme.main_fg);
    let mut lines = vec![
        Line::from(Span::styled("SCORE", label)),
        Line::from(Span::styled(game.score().to_string(), text)),
        Line::from(""),
        Line::from(Span::styled("NEXT", label)),
    ];
    for piece in game.next_pieces() {
        lines.push(Line::from(Span::styled(
            piece.to_string(),
            Style::default().fg(theme.jewel_color(piece.jewel())),
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(phase_label(game.phase()), text)));
    if let Some(event) = view.last_event {
        lines.push(Line::from(Span::styled(
            event_label(event),
            Style::default().fg(theme.inactive_fg),
        )));
    }
    lines.push(Line::from(""));
    let help = Style::default().fg(theme.inactive_fg);
    for h in ["←/→ move", "↑/space rotate", "↓ drop", "p pause  q quit"] {
        lines.push(Line::from(Span::styled(h, help)));
    }
    lines
}

/// Small centred box over the well.
fn overlay_rect(area: Rect, width: u16, height: u16) -> Rect {
    Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        y: area.y + area.height.saturating_sub(height) / 2,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

fn draw_overlay(frame: &mut Frame, well: Rect, theme: &Theme, title: &str, body: Vec<Line<'static>>) {
    let rect = overlay_rect(well, well.width.saturating_sub(2).max(16), body.len() as u16 + 2);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title.to_string())
        .title_alignment(Alignment::Center)
        .border_style(Style::default().fg(theme.title));
    frame.render_widget(Clear, rect);
    frame.render_widget(
        Paragraph::new(body).block(block).alignment(Alignment::Center),
        rect,
    );
}

/// Draw the well, sidebar and any overlay for the current state.
pub fn draw(frame: &mut Frame, game: &Game, view: &View<'_>) {
    let area = frame.area();
    let theme = view.theme;
    let well = well_rect(area, view.show_hidden);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Columns ")
        .title_alignment(Alignment::Center)
        .border_style(Style::default().fg(theme.div_line));
    frame.render_widget(Paragraph::new(well_lines(game, view)).block(block), well);

    let sidebar = Rect {
        x: well.x + well.width + 1,
        y: well.y,
        width: SIDEBAR_WIDTH.saturating_sub(1).min(area.width.saturating_sub(well.width + 1)),
        height: well.height,
    }
    .intersection(area);
    frame.render_widget(Paragraph::new(sidebar_lines(game, view)), sidebar);

    let text = Style::default().fg(theme.main_fg);
    if game.is_game_over() {
        let body = vec![
            Line::from(Span::styled(format!("Score {}", game.score()), text)),
            Line::from(Span::styled("r restart  q quit", text)),
        ];
        draw_overlay(frame, well, theme, " GAME OVER ", body);
    } else if view.paused {
        let body = vec![Line::from(Span::styled("p to resume", text))];
        draw_overlay(frame, well, theme, " PAUSED ", body);
    }
}

//! Layout and drawing: title, difficulty menu, board, sidebar, round-over overlay,
//! score and leaderboard screens. Also maps terminal positions back to board cells.

use crate::app::ViewState;
use crate::theme::Theme;
use ratatui::Frame;
use ratatui::layout::{Alignment, Position, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Widget};
use samegametui::board::{Board, Cell, Pos};
use samegametui::{ClearOutcome, Difficulty, Phase, Session};
use std::collections::HashSet;
use std::time::Instant;
use tachyonfx::{
    CellFilter, Duration as TfxDuration, Effect, EffectRenderer, Interpolation, fx, ref_count,
};

/// Each tile is drawn as two terminal columns by one row ("██").
const TILE_W: u16 = 2;
const TILE_H: u16 = 1;

const SIDEBAR_WIDTH: u16 = 26;
const SIDEBAR_HEIGHT: u16 = 16;

/// Duration of the tile-clear fade (TachyonFX).
const CLEAR_FADE_MS: u32 = 300;

const MENU_WIDTH: u16 = 52;
/// Lines above the first difficulty row inside the menu border.
const MENU_HEADER_LINES: u16 = 3;

/// Tiles removed by the last click, faded out over the emptied cells.
pub struct ClearFade {
    cells: Vec<Pos>,
    color: u8,
    effect: Option<Effect>,
    last_process: Option<Instant>,
}

impl ClearFade {
    pub fn new(outcome: &ClearOutcome) -> Self {
        Self {
            cells: outcome.cells.clone(),
            color: outcome.color,
            effect: None,
            last_process: None,
        }
    }

    pub fn done(&self) -> bool {
        self.effect.as_ref().is_some_and(Effect::done)
    }
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        y: area.y + area.height.saturating_sub(height) / 2,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

/// Playfield (with border) and sidebar rects, centred together in `area`.
fn game_layout(area: Rect, board: &Board) -> (Rect, Rect) {
    let pw = board.cols() as u16 * TILE_W + 2;
    let ph = board.rows() as u16 * TILE_H + 2;
    let outer = centered(area, pw + SIDEBAR_WIDTH, ph.max(SIDEBAR_HEIGHT));
    let playfield = Rect {
        x: outer.x,
        y: outer.y,
        width: pw.min(outer.width),
        height: ph.min(outer.height),
    };
    let sidebar = Rect {
        x: (outer.x + pw).min(area.x + area.width),
        y: outer.y,
        width: SIDEBAR_WIDTH.min((area.x + area.width).saturating_sub(outer.x + pw)),
        height: SIDEBAR_HEIGHT.min(outer.height),
    };
    (playfield, sidebar)
}

/// Board inner rect (tiles only, no border); matches draw_game layout.
pub fn board_rect(area: Rect, board: &Board) -> Rect {
    let (playfield, _) = game_layout(area, board);
    Rect {
        x: playfield.x + 1,
        y: playfield.y + 1,
        width: (board.cols() as u16 * TILE_W).min(playfield.width.saturating_sub(2)),
        height: (board.rows() as u16 * TILE_H).min(playfield.height.saturating_sub(2)),
    }
}

/// Board cell `(x, y)` under terminal position `(column, row)`, if any.
pub fn board_cell_at(area: Rect, board: &Board, column: u16, row: u16) -> Option<(usize, usize)> {
    let r = board_rect(area, board);
    if !r.contains(Position::new(column, row)) {
        return None;
    }
    Some((
        ((column - r.x) / TILE_W) as usize,
        ((row - r.y) / TILE_H) as usize,
    ))
}

fn menu_rect(area: Rect) -> Rect {
    let height = MENU_HEADER_LINES + Difficulty::ALL.len() as u16 + 5;
    centered(area, MENU_WIDTH, height)
}

/// Difficulty menu row under terminal position `(column, row)`, if any.
pub fn menu_row_at(area: Rect, column: u16, row: u16) -> Option<usize> {
    let menu = menu_rect(area);
    let inner_x = menu.x + 1..menu.x + menu.width.saturating_sub(1);
    let first = menu.y + 1 + MENU_HEADER_LINES;
    if !inner_x.contains(&column) || row < first {
        return None;
    }
    let i = (row - first) as usize;
    (i < Difficulty::ALL.len()).then_some(i)
}

/// Draw the current phase.
pub fn draw(frame: &mut Frame, session: &Session, view: &mut ViewState, theme: &Theme, now: Instant) {
    let area = frame.area();
    frame.buffer_mut().set_style(area, Style::default().bg(theme.bg));
    match session.phase() {
        Phase::Intro => draw_intro(frame, theme, area),
        Phase::DifficultySelect => draw_menu(frame, theme, area, view.menu_index),
        Phase::ScoreDisplay => draw_score(frame, session, theme, area),
        Phase::Leaderboard => draw_leaderboard(frame, session, theme, area),
        phase => {
            let playing = phase == Phase::Playing;
            draw_game(frame, session, theme, area, playing.then_some(view.cursor));
            if playing && view.animation {
                if let Some(fade) = view.clear_fade.as_mut() {
                    apply_clear_fade(frame, session.board(), theme, area, fade, now);
                }
            }
            if phase.is_terminal() {
                draw_round_over(frame, session, theme, area);
            }
        }
    }
}

fn popup_block(theme: &Theme) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
}

fn hint(theme: &Theme, text: &'static str) -> Line<'static> {
    Line::from(Span::styled(text, Style::default().fg(theme.inactive_fg)))
}

fn draw_intro(frame: &mut Frame, theme: &Theme, area: Rect) {
    let popup = centered(area, 40, 9);
    let title = Line::from(vec![
        Span::styled(" Same", Style::default().fg(theme.tile_color(0)).bold()),
        Span::styled("Game ", Style::default().fg(theme.tile_color(2)).bold()),
    ]);
    let strip: Vec<Span> = (0..8u8)
        .map(|i| Span::styled("██", Style::default().fg(theme.tile_color(i))))
        .collect();
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled("Welcome to", Style::default().fg(theme.main_fg))),
        title,
        Line::from(""),
        Line::from(strip),
        Line::from(""),
        hint(theme, "Click or press Enter to start"),
    ];
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(popup_block(theme))
        .render(popup, frame.buffer_mut());
}

fn draw_menu(frame: &mut Frame, theme: &Theme, area: Rect, selected: usize) {
    let popup = menu_rect(area);
    let highlight_style = Style::default().fg(Color::Black).bg(theme.title).bold();
    let normal_style = Style::default().fg(theme.main_fg);
    let desc_style = Style::default().fg(theme.inactive_fg);

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Select Difficulty ",
            Style::default().fg(theme.title).bold(),
        )),
        Line::from(""),
    ];
    for (i, d) in Difficulty::ALL.iter().enumerate() {
        let p = d.preset();
        let style = if i == selected { highlight_style } else { normal_style };
        let limit = p
            .time_limit
            .map_or_else(|| "no limit".to_string(), |s| format!("{s}s"));
        lines.push(Line::from(vec![
            Span::styled(format!(" {} {:<10}", i + 1, p.name), style),
            Span::styled(
                format!(" {:<25}{:>9}", p.description, limit),
                desc_style,
            ),
        ]));
    }
    lines.extend([
        Line::from(""),
        Line::from(""),
        hint(theme, "↕ choose   Enter/click start   Q quit"),
    ]);
    Paragraph::new(lines)
        .block(popup_block(theme))
        .render(popup, frame.buffer_mut());
}

/// Board + sidebar. `cursor` is shown only while playing.
fn draw_game(frame: &mut Frame, session: &Session, theme: &Theme, area: Rect, cursor: Option<Pos>) {
    let board = session.board();
    let (playfield, sidebar) = game_layout(area, board);
    let block = popup_block(theme).title(Span::styled(
        format!(" {} ", session.difficulty_name()),
        Style::default().fg(theme.title),
    ));
    block.render(playfield, frame.buffer_mut());

    let rect = board_rect(area, board);
    let hovered: HashSet<Pos> = cursor
        .map(|c| board.region_at(c.x, c.y))
        .filter(|r| r.is_clearable())
        .map(|r| r.into_cells().into_iter().collect())
        .unwrap_or_default();

    let buf = frame.buffer_mut();
    for (y, row) in board.iter_rows().enumerate() {
        for (x, cell) in row.iter().enumerate() {
            let rx = rect.x + x as u16 * TILE_W;
            let ry = rect.y + y as u16 * TILE_H;
            if rx + TILE_W > rect.x + rect.width || ry >= rect.y + rect.height {
                continue;
            }
            let pos = Pos::new(x, y);
            let (symbol, style) = match *cell {
                Cell::Empty => ("  ", Style::default().bg(theme.bg)),
                Cell::Tile(c) if hovered.contains(&pos) => {
                    ("▓▓", Style::default().fg(theme.tile_color(c)).bg(theme.bg))
                }
                Cell::Tile(c) => ("██", Style::default().fg(theme.tile_color(c)).bg(theme.bg)),
            };
            let symbol = if cursor == Some(pos) { "[]" } else { symbol };
            let style = if cursor == Some(pos) && cell.is_empty() {
                style.fg(theme.main_fg)
            } else {
                style
            };
            buf.set_string(rx, ry, symbol, style);
        }
    }

    draw_sidebar(frame, session, theme, sidebar);
}

fn draw_sidebar(frame: &mut Frame, session: &Session, theme: &Theme, area: Rect) {
    let title_style = Style::default().fg(theme.title);
    let fg_style = Style::default().fg(theme.main_fg);
    let time = match session.remaining_secs() {
        Some(s) => format!("{s}s"),
        None => "--".to_string(),
    };
    let time_style = match session.remaining_secs() {
        Some(s) if s <= samegametui::session::CRITICAL_SECS => {
            Style::default().fg(theme.tile_color(0)).bold()
        }
        _ => fg_style,
    };
    let best = session.ledger().scores().first().copied().unwrap_or(0);
    let stat = |label: &'static str, value: String, style: Style| {
        Line::from(vec![Span::styled(label, title_style), Span::styled(value, style)])
    };
    let lines = vec![
        stat("Score: ", session.score().to_string(), fg_style),
        stat("Best:  ", best.to_string(), fg_style),
        stat("Time:  ", time, time_style),
        stat("Tiles: ", session.board().remaining().to_string(), fg_style),
        stat(
            "Bonus: ",
            format!("x{:.1}", session.preset().score_multiplier),
            fg_style,
        ),
        Line::from(""),
        hint(theme, "Click / Enter  clear"),
        hint(theme, "Arrows / hjkl  move"),
        hint(theme, "R  retry same board"),
        hint(theme, "G  give up"),
        hint(theme, "Q  quit"),
    ];
    Paragraph::new(lines)
        .block(popup_block(theme).title(Span::styled(" Stats ", title_style)))
        .render(area, frame.buffer_mut());
}

/// Fade the emptied cells from the cleared colour to the background.
fn apply_clear_fade(
    frame: &mut Frame,
    board: &Board,
    theme: &Theme,
    area: Rect,
    fade: &mut ClearFade,
    now: Instant,
) {
    let rect = board_rect(area, board);
    let delta = fade
        .last_process
        .map(|t| now.saturating_duration_since(t))
        .unwrap_or(std::time::Duration::ZERO);
    let delta_ms = delta.as_millis().min(u32::MAX as u128) as u32;
    fade.last_process = Some(now);

    // Only cells still empty after gravity show the ghost.
    let ghosts: HashSet<(u16, u16)> = fade
        .cells
        .iter()
        .filter(|p| board.get(p.x, p.y).is_some_and(Cell::is_empty))
        .flat_map(|p| {
            let x0 = rect.x + p.x as u16 * TILE_W;
            let y0 = rect.y + p.y as u16 * TILE_H;
            (x0..x0 + TILE_W).map(move |x| (x, y0))
        })
        .filter(|&(x, y)| rect.contains(Position::new(x, y)))
        .collect();

    let color = theme.tile_color(fade.color);
    let buf = frame.buffer_mut();
    for &(x, y) in &ghosts {
        buf[(x, y)]
            .set_symbol("█")
            .set_style(Style::default().fg(color).bg(theme.bg));
    }

    if fade.effect.is_none() {
        let filter = CellFilter::PositionFn(ref_count(move |pos: Position| {
            ghosts.contains(&(pos.x, pos.y))
        }));
        let effect = fx::fade_to(theme.bg, theme.bg, (CLEAR_FADE_MS, Interpolation::Linear))
            .with_filter(filter)
            .with_area(rect);
        fade.effect = Some(effect);
    }
    if let Some(effect) = fade.effect.as_mut() {
        frame.render_effect(effect, rect, TfxDuration::from_millis(delta_ms));
    }
}

fn draw_round_over(frame: &mut Frame, session: &Session, theme: &Theme, area: Rect) {
    let (headline, detail, color) = match session.phase() {
        Phase::TimeExpired => (" Time's Up! ", None, theme.tile_color(0)),
        Phase::NoMovesAvailable => (" No Moves Available! ", None, theme.tile_color(0)),
        Phase::GaveUp => (" You gave up this game. ", None, theme.tile_color(0)),
        _ => (
            " Congratulations! ",
            Some("You cleared the game!"),
            theme.tile_color(1),
        ),
    };
    let popup = centered(area, 32, 8);
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(headline, Style::default().fg(Color::Black).bg(color).bold())),
    ];
    if let Some(d) = detail {
        lines.push(Line::from(Span::styled(d, Style::default().fg(theme.main_fg))));
    }
    lines.extend([
        Line::from(Span::styled(
            format!("Score: {}", session.score()),
            Style::default().fg(theme.main_fg),
        )),
        Line::from(""),
        hint(theme, "Click to Continue"),
    ]);
    Clear.render(popup, frame.buffer_mut());
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(popup_block(theme))
        .render(popup, frame.buffer_mut());
}

fn draw_score(frame: &mut Frame, session: &Session, theme: &Theme, area: Rect) {
    let popup = centered(area, 32, 8);
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled("Your Score", Style::default().fg(theme.title))),
        Line::from(Span::styled(
            session.score().to_string(),
            Style::default().fg(theme.title).bold(),
        )),
        Line::from(Span::styled(
            session.difficulty_name(),
            Style::default().fg(theme.inactive_fg),
        )),
        Line::from(""),
        hint(theme, "Click to Continue"),
    ];
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(popup_block(theme))
        .render(popup, frame.buffer_mut());
}

fn draw_leaderboard(frame: &mut Frame, session: &Session, theme: &Theme, area: Rect) {
    let scores = session.ledger().scores();
    let popup = centered(area, 32, scores.len() as u16 + 7);
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Top 10 High Scores",
            Style::default().fg(theme.title).bold(),
        )),
        Line::from(""),
    ];
    for (i, score) in scores.iter().enumerate() {
        let style = if session.last_rank() == Some(i) {
            Style::default().fg(theme.title).bold()
        } else {
            Style::default().fg(theme.main_fg)
        };
        lines.push(Line::from(Span::styled(format!("{:>2}: {:>7}", i + 1, score), style)));
    }
    lines.extend([Line::from(""), hint(theme, "Click to Return")]);
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(popup_block(theme))
        .render(popup, frame.buffer_mut());
}

//! App: terminal init, main loop, tick, mouse and key handling.

use crate::GameConfig;
use crate::input::{Action, key_to_action};
use crate::theme::Theme;
use crate::ui::{self, ClearFade};
use anyhow::Result;
use crossterm::event::{
    self, Event, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};
use log::{debug, info, trace};
use ratatui::DefaultTerminal;
use ratatui::layout::Rect;
use samegametui::board::Pos;
use samegametui::{Cue, Difficulty, Phase, Session};
use std::time::{Duration, Instant};

/// Render pacing: poll input for at most one ~60 FPS frame.
const FRAME_DURATION: Duration = Duration::from_millis(16);

/// Front-end state the session knows nothing about.
pub struct ViewState {
    /// Keyboard cursor on the board; follows the mouse while playing.
    pub cursor: Pos,
    /// Highlighted row in the difficulty menu.
    pub menu_index: usize,
    pub clear_fade: Option<ClearFade>,
    pub animation: bool,
}

pub struct App {
    config: GameConfig,
    theme: Theme,
    session: Session,
    view: ViewState,
    last_tick: Instant,
    tick_interval: Duration,
    /// Terminal area of the last drawn frame; pointer events are mapped against it.
    last_area: Rect,
}

impl App {
    pub fn new(config: GameConfig, theme: Theme) -> Result<Self> {
        let mut session = Session::new(config.session, config.difficulty)?;
        if config.skip_menu {
            session.advance();
            session.select(config.difficulty);
        }
        let tick_interval =
            Duration::from_secs_f64(1.0 / f64::from(config.session.ticks_per_second.max(1)));
        let view = ViewState {
            cursor: Pos::new(0, session.board().rows().saturating_sub(1)),
            menu_index: config.difficulty.index(),
            clear_fade: None,
            animation: config.animation,
        };
        Ok(Self {
            config,
            theme,
            session,
            view,
            last_tick: Instant::now(),
            tick_interval,
            last_area: Rect::default(),
        })
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            event::{DisableMouseCapture, EnableMouseCapture},
            execute,
            terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

        let mut terminal = DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;
        info!(
            "started: difficulty {:?}, {} ticks/s, seed {:?}",
            self.config.difficulty, self.config.session.ticks_per_second, self.config.session.seed
        );

        let result = self.run_loop(&mut terminal);

        // Restore
        execute!(std::io::stdout(), DisableMouseCapture, LeaveAlternateScreen)?;
        disable_raw_mode()?;

        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        self.last_tick = Instant::now();
        loop {
            let now = Instant::now();
            terminal.draw(|f| {
                self.last_area = f.area();
                ui::draw(f, &self.session, &mut self.view, &self.theme, now);
            })?;

            if self.view.clear_fade.as_ref().is_some_and(ClearFade::done) {
                self.view.clear_fade = None;
            }

            let timeout = FRAME_DURATION.saturating_sub(now.elapsed());
            if event::poll(timeout)? {
                while event::poll(Duration::ZERO)? {
                    match event::read()? {
                        Event::Key(key) if key.kind == KeyEventKind::Press => {
                            if self.handle_key(key) {
                                info!("quit");
                                return Ok(());
                            }
                        }
                        Event::Mouse(mouse) => self.handle_mouse(mouse),
                        _ => {}
                    }
                }
            }

            if self.last_tick.elapsed() >= self.tick_interval {
                self.last_tick += self.tick_interval;
                // Fell far behind (suspended terminal, slow draw): resync instead of bursting.
                if self.last_tick.elapsed() > Duration::from_secs(1) {
                    self.last_tick = Instant::now();
                }
                self.session.tick();
            }

            self.handle_cues();
        }
    }

    /// Returns true when the program should exit.
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        let action = key_to_action(key);
        if action == Action::Quit {
            return true;
        }
        match self.session.phase() {
            Phase::DifficultySelect => match action {
                Action::Up => {
                    self.view.menu_index =
                        (self.view.menu_index + Difficulty::ALL.len() - 1) % Difficulty::ALL.len();
                }
                Action::Down => {
                    self.view.menu_index = (self.view.menu_index + 1) % Difficulty::ALL.len();
                }
                Action::Pick(i) => self.pick(i),
                Action::Confirm => self.pick(self.view.menu_index),
                _ => {}
            },
            Phase::Playing => {
                let board = self.session.board();
                let (cols, rows) = (board.cols(), board.rows());
                let c = &mut self.view.cursor;
                match action {
                    Action::Up => c.y = c.y.saturating_sub(1),
                    Action::Down => c.y = (c.y + 1).min(rows - 1),
                    Action::Left => c.x = c.x.saturating_sub(1),
                    Action::Right => c.x = (c.x + 1).min(cols - 1),
                    Action::Confirm => {
                        let Pos { x, y } = *c;
                        self.click(x, y);
                    }
                    Action::Retry => {
                        self.view.clear_fade = None;
                        self.session.retry();
                    }
                    Action::GiveUp => self.session.give_up(),
                    _ => {}
                }
            }
            _ => {
                if action == Action::Confirm {
                    self.session.advance();
                }
            }
        }
        false
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        let (column, row) = (mouse.column, mouse.row);
        let pressed = mouse.kind == MouseEventKind::Down(MouseButton::Left);
        let moved = matches!(mouse.kind, MouseEventKind::Moved);
        if !pressed && !moved {
            return;
        }
        match self.session.phase() {
            Phase::Playing => {
                let Some((x, y)) = ui::board_cell_at(self.last_area, self.session.board(), column, row)
                else {
                    return;
                };
                self.view.cursor = Pos::new(x, y);
                if pressed {
                    self.click(x, y);
                }
            }
            Phase::DifficultySelect => {
                if let Some(i) = ui::menu_row_at(self.last_area, column, row) {
                    self.view.menu_index = i;
                    if pressed {
                        self.pick(i);
                    }
                }
            }
            _ if pressed => self.session.advance(),
            _ => {}
        }
    }

    fn pick(&mut self, index: usize) {
        if let Some(d) = Difficulty::from_index(index) {
            self.view.menu_index = index;
            self.session.select(d);
        }
    }

    fn click(&mut self, x: usize, y: usize) {
        if let Some(outcome) = self.session.click(x, y) {
            if self.view.animation {
                self.view.clear_fade = Some(ClearFade::new(&outcome));
            }
        }
    }

    /// No audio backend: music cues are logged, phase cues reset view state.
    fn handle_cues(&mut self) {
        for cue in self.session.take_cues() {
            match cue {
                Cue::PhaseEntered(Phase::Playing) => {
                    self.view.clear_fade = None;
                    self.view.cursor = Pos::new(0, self.session.board().rows().saturating_sub(1));
                }
                Cue::PhaseEntered(phase) => {
                    if phase.is_terminal() {
                        info!(
                            "round over ({:?}): score {}, {} tiles left",
                            phase,
                            self.session.score(),
                            self.session.board().remaining()
                        );
                    } else {
                        trace!("entered {:?}", phase);
                    }
                    self.view.clear_fade = None;
                }
                Cue::Music(track) => debug!("music: {:?}", track),
                Cue::TilesCleared {
                    color,
                    cells,
                    points,
                } => trace!("clear sound for colour {color} ({cells} tiles, +{points})"),
            }
        }
    }
}

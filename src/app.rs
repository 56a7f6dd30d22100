//! App: terminal init, main loop, tick and key handling.

use crate::GameConfig;
use crate::input::{Action, key_to_action};
use crate::theme::Theme;
use crate::ui::{self, View};
use anyhow::Result;
use columnstui::{Command, Game, Phase, Snapshot};
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::DefaultTerminal;
use std::time::{Duration, Instant};

pub struct App {
    config: GameConfig,
    theme: Theme,
    game: Game,
    paused: bool,
    /// Most recent engine event, shown in the sidebar with --verbose.
    last_event: Option<columnstui::Event>,
    last_tick: Instant,
}

impl App {
    pub fn new(config: GameConfig, theme: Theme) -> Self {
        let game = Game::new(config.seed);
        Self {
            config,
            theme,
            game,
            paused: false,
            last_event: None,
            last_tick: Instant::now(),
        }
    }

    /// Time between engine steps in the current phase.
    fn tick_interval(&self) -> Duration {
        match self.game.phase() {
            Phase::Falling => Duration::from_millis(self.config.fall_interval_ms),
            _ => Duration::from_millis(self.config.settle_interval_ms),
        }
    }

    fn record(&mut self, event: Option<columnstui::Event>) {
        if event.is_some() && self.config.verbose {
            self.last_event = event;
        }
    }

    fn reset_game(&mut self) {
        self.game = Game::new(self.config.seed);
        self.paused = false;
        self.last_event = None;
        self.last_tick = Instant::now();
    }

    /// Apply a key action. Returns false when the app should exit.
    fn apply_action(&mut self, action: Action) -> bool {
        match action {
            Action::Quit => {
                let event = self.game.apply(Command::Quit);
                self.record(event);
                return false;
            }
            Action::Pause if !self.game.is_over() => self.paused = !self.paused,
            Action::Restart if self.game.is_over() => self.reset_game(),
            _ if self.paused || self.game.is_over() => {}
            action => {
                if let Some(command) = action.command() {
                    let event = self.game.apply(command);
                    if command == Command::SoftDrop {
                        self.last_tick = Instant::now();
                    }
                    self.record(event);
                }
            }
        }
        true
    }

    /// Step the engine once its interval has passed. With a zero settle interval the board
    /// phase runs to completion in one frame.
    fn advance(&mut self, now: Instant) {
        if self.paused || self.game.is_over() {
            self.last_tick = now;
            return;
        }
        if now.duration_since(self.last_tick) < self.tick_interval() {
            return;
        }
        self.last_tick = now;
        if self.game.phase() != Phase::Falling && self.config.settle_interval_ms == 0 {
            let last = self.game.settle().pop();
            self.record(last);
        } else {
            let event = self.game.tick();
            self.record(event);
        }
    }

    pub fn run(&mut self) -> Result<Snapshot> {
        use crossterm::{
            execute,
            terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let mut terminal = DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;

        let result = self.run_loop(&mut terminal);

        // Restore
        execute!(std::io::stdout(), LeaveAlternateScreen)?;
        disable_raw_mode()?;

        result.map(|()| self.game.snapshot())
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        let frame_duration = Duration::from_secs_f64(1.0 / self.config.frame_rate);
        loop {
            let now = Instant::now();
            self.advance(now);

            let view = View {
                theme: &self.theme,
                paused: self.paused,
                show_hidden: self.config.show_hidden,
                last_event: self.last_event,
            };
            terminal.draw(|f| ui::draw(f, &self.game, &view))?;

            let timeout = frame_duration.saturating_sub(now.elapsed());
            if event::poll(timeout)? {
                while event::poll(Duration::ZERO)? {
                    if let Event::Key(key) = event::read()? {
                        if key.kind != KeyEventKind::Press {
                            continue;
                        }
                        if !self.apply_action(key_to_action(key)) {
                            return Ok(());
                        }
                    }
                }
            }
        }
    }
}

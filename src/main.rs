pub mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    cursor::Show,
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use pomotui::{
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    controller::SessionController,
    logging,
    runtime::{
        AppEvent, AppEventSource, CrosstermEventSource, FixedTicker, Runner, ThreadTickScheduler,
        TickScheduler, Ticker, TICK_INTERVAL,
    },
    session::Phase,
    settings::{SettingField, Settings},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    time::Duration,
};

const FRAME_RATE_MS: u64 = 250;

/// pomodoro countdown timer for the terminal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A pomodoro timer for the terminal: alternating work and break intervals with adjustable durations and a count of completed work sessions."
)]
pub struct Cli {
    /// work duration in minutes (1-60)
    #[clap(short = 'w', long, value_parser = clap::value_parser!(u32).range(1..=60))]
    work: Option<u32>,

    /// short break duration in minutes (1-15)
    #[clap(short = 's', long, value_parser = clap::value_parser!(u32).range(1..=15))]
    short_break: Option<u32>,

    /// long break duration in minutes (15-30)
    #[clap(short = 'l', long, value_parser = clap::value_parser!(u32).range(15..=30))]
    long_break: Option<u32>,

    /// store the effective durations as the defaults for future runs
    #[clap(long)]
    save_config: bool,

    /// write logs here instead of the default state directory
    #[clap(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    /// Durations from the config file, overridden by any flags given
    fn resolve_settings(&self, cfg: &Config) -> Settings {
        let mut settings = cfg.to_settings();
        let overrides = [
            (SettingField::WorkTime, self.work),
            (SettingField::ShortBreakTime, self.short_break),
            (SettingField::LongBreakTime, self.long_break),
        ];
        for (field, value) in overrides {
            if let Some(value) = value {
                // clap already range-checked the flag
                if let Err(e) = settings.set(field, value) {
                    log::warn!("ignoring {field} override: {e}");
                }
            }
        }
        settings
    }
}

pub struct App<S: TickScheduler> {
    pub controller: SessionController<S>,
    pub selected: SettingField,
    pub status: Option<String>,
}

impl<S: TickScheduler> App<S> {
    pub fn new(settings: Settings, scheduler: S) -> Self {
        Self {
            controller: SessionController::new(settings, scheduler),
            selected: SettingField::WorkTime,
            status: None,
        }
    }

    /// Returns true when the key asks to quit
    pub fn on_key(&mut self, key: KeyEvent) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return true;
        }

        let running = self.controller.snapshot().is_running;
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => return true,
            KeyCode::Char(' ') | KeyCode::Enter => {
                self.controller.start_pause();
                self.status = None;
            }
            KeyCode::Char('r') => {
                self.controller.reset();
                self.status = None;
            }
            KeyCode::Char('1') => self.switch_mode(Phase::Work),
            KeyCode::Char('2') => self.switch_mode(Phase::ShortBreak),
            KeyCode::Char('3') => self.switch_mode(Phase::LongBreak),
            KeyCode::Tab | KeyCode::Down => self.selected = self.selected.next(),
            KeyCode::BackTab | KeyCode::Up => self.selected = self.selected.previous(),
            KeyCode::Left | KeyCode::Char('-') => self.adjust_selected(-1),
            KeyCode::Right | KeyCode::Char('+') | KeyCode::Char('=') => self.adjust_selected(1),
            _ => {}
        }

        if running != self.controller.snapshot().is_running {
            log::debug!(
                "timer {}",
                if running { "paused" } else { "started" }
            );
        }
        false
    }

    fn switch_mode(&mut self, phase: Phase) {
        if self.controller.snapshot().is_running {
            self.status = Some("Pause the timer to switch modes".to_string());
            return;
        }
        self.controller.set_mode(phase);
        self.status = None;
    }

    fn adjust_selected(&mut self, delta: i32) {
        if self.controller.snapshot().is_running {
            self.status = Some("Pause the timer to change durations".to_string());
            return;
        }
        let field = self.selected;
        let current = self.controller.snapshot().settings.get(field);
        let value = current.saturating_add_signed(delta);
        self.status = match self.controller.change_setting(field, value) {
            Ok(()) => None,
            Err(e) => Some(e.to_string()),
        };
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    if let Some(path) = cli.log_file.clone().or_else(AppDirs::log_path) {
        if let Err(e) = logging::init(&path) {
            eprintln!("logging disabled: {e}");
        }
    }

    let store = FileConfigStore::new();
    let settings = cli.resolve_settings(&store.load());
    if cli.save_config {
        store.save(&Config::from(settings))?;
        log::info!("saved defaults to {}", store.path().display());
    }

    enable_raw_mode()?;
    // Restores the terminal on every exit path, including setup errors and panics
    let _restore = TerminalGuard::new(restore_terminal);

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = CrosstermEventSource::new();
    let scheduler = ThreadTickScheduler::new(events.sender(), TICK_INTERVAL);
    let runner = Runner::new(events, FixedTicker::new(Duration::from_millis(FRAME_RATE_MS)));

    let mut app = App::new(settings, scheduler);
    log::info!(
        "starting with {}/{}/{} minute phases",
        settings.work_minutes(),
        settings.short_break_minutes(),
        settings.long_break_minutes()
    );
    let result = start_tui(&mut terminal, &mut app, &runner);
    app.controller.shutdown();

    result
}

/// Runs `restore` when dropped
struct TerminalGuard<F: FnMut()> {
    restore: F,
}

impl<F: FnMut()> TerminalGuard<F> {
    fn new(restore: F) -> Self {
        Self { restore }
    }
}

impl<F: FnMut()> Drop for TerminalGuard<F> {
    fn drop(&mut self) {
        (self.restore)();
    }
}

fn restore_terminal() {
    if let Err(e) = disable_raw_mode() {
        log::warn!("failed to disable raw mode: {e}");
    }
    if let Err(e) = execute!(io::stdout(), LeaveAlternateScreen, Show) {
        log::warn!("failed to leave alternate screen: {e}");
    }
}

fn start_tui<B: Backend, S: TickScheduler, E: AppEventSource, T: Ticker>(
    terminal: &mut Terminal<B>,
    app: &mut App<S>,
    runner: &Runner<E, T>,
) -> Result<(), Box<dyn Error>> {
    terminal.draw(|f| ui(app, f))?;

    loop {
        match runner.step() {
            AppEvent::Tick(generation) => app.controller.on_tick(generation),
            AppEvent::Key(key) => {
                if app.on_key(key) {
                    break;
                }
            }
            AppEvent::Resize | AppEvent::Frame => {}
            AppEvent::Closed => {
                log::warn!("input source closed, exiting");
                break;
            }
        }
        terminal.draw(|f| ui(app, f))?;
    }

    Ok(())
}

fn ui<S: TickScheduler>(app: &App<S>, f: &mut Frame) {
    f.render_widget(app, f.area());
}

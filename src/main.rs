mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use env_logger::{Env, Target};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    fs::{self, OpenOptions},
    io::{self, stdin, Write},
    time::{Duration, Instant},
};
use typesprint::{
    app_dirs::AppDirs,
    config::{Config, ConfigStore, JsonConfigStore, DURATION_OPTIONS, WORD_COUNT_OPTIONS},
    history::AttemptLog,
    input::{InputEvent, Keystroke},
    language::WordBank,
    layout::KeyboardLayout,
    mistakes::MistakeStore,
    runtime::{AppEvent, CrosstermEventSource, EventSource, FixedTicker, Runner, Ticker},
    store::FileStore,
    theme::Theme,
    FinishReport, Mode, SessionEngine,
};

/// How long a pressed key stays lit on the on-screen keyboard.
const HIGHLIGHT_MS: u64 = 150;

/// typing speed trainer with history and mistake-driven practice
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A terminal typing trainer. Sessions are scored in words per minute and accuracy, every attempt is kept in a local history, and practice mode picks words built from the characters you miss most."
)]
pub struct Cli {
    /// session mode (saved for next time)
    #[clap(short = 'm', long, value_enum)]
    mode: Option<Mode>,

    /// seconds per time-mode session: 15, 30, 60 or 120
    #[clap(short = 's', long, value_parser = parse_duration)]
    duration: Option<u32>,

    /// words per word/practice session: 10, 25, 50 or 100
    #[clap(short = 'w', long, value_parser = parse_word_count)]
    words: Option<usize>,

    /// keyboard layout for the on-screen keyboard
    #[clap(short = 'l', long, value_enum)]
    layout: Option<KeyboardLayout>,

    /// colour theme
    #[clap(short = 't', long, value_parser = parse_theme)]
    theme: Option<String>,
}

fn parse_duration(s: &str) -> Result<u32, String> {
    match s.parse::<u32>() {
        Ok(secs) if DURATION_OPTIONS.contains(&secs) => Ok(secs),
        _ => Err(format!("expected one of {DURATION_OPTIONS:?}")),
    }
}

fn parse_word_count(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(count) if WORD_COUNT_OPTIONS.contains(&count) => Ok(count),
        _ => Err(format!("expected one of {WORD_COUNT_OPTIONS:?}")),
    }
}

fn parse_theme(s: &str) -> Result<String, String> {
    match Theme::by_name(s) {
        Some(theme) => Ok(theme.name.to_string()),
        None => Err(format!(
            "unknown theme, expected one of: {}",
            Theme::names().collect::<Vec<_>>().join(", ")
        )),
    }
}

impl Cli {
    /// Applies command line overrides. Returns whether anything changed.
    fn apply_to(&self, cfg: &mut Config) -> bool {
        let before = cfg.clone();
        if let Some(mode) = self.mode {
            cfg.mode = mode;
        }
        if let Some(duration) = self.duration {
            cfg.duration = duration;
        }
        if let Some(words) = self.words {
            cfg.word_count = words;
        }
        if let Some(layout) = self.layout {
            cfg.layout = layout;
        }
        if let Some(ref theme) = self.theme {
            cfg.theme = theme.clone();
        }
        *cfg != before
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppState {
    Typing,
    Results,
}

/// Last key pressed, for the on-screen keyboard.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyFlash {
    pub key: char,
    pub correct: bool,
    pub at: Instant,
}

pub struct App {
    pub engine: SessionEngine,
    pub config: Config,
    pub state: AppState,
    pub last_report: Option<FinishReport>,
    pub flash: Option<KeyFlash>,
    pub notice: Option<String>,
    config_store: Box<dyn ConfigStore>,
    pending_bell: bool,
}

impl App {
    pub fn new(config: Config, engine: SessionEngine, config_store: Box<dyn ConfigStore>) -> Self {
        Self {
            engine,
            config,
            state: AppState::Typing,
            last_report: None,
            flash: None,
            notice: None,
            config_store,
            pending_bell: false,
        }
    }

    /// Wires the app to the on-disk config, history and mistake documents.
    pub fn from_disk(cli: &Cli) -> Self {
        let config_store = JsonConfigStore::file();
        let mut config = config_store.load();
        let overridden = cli.apply_to(&mut config);

        let engine = SessionEngine::new(
            config.session_config(),
            WordBank::english(),
            AttemptLog::open(Box::new(FileStore::with_path(AppDirs::history_path()))),
            MistakeStore::open(Box::new(FileStore::with_path(AppDirs::mistakes_path()))),
        );

        let mut app = Self::new(config, engine, Box::new(config_store));
        if overridden {
            // the overrides still apply to this run
            app.save_settings();
        }
        app
    }

    pub fn theme(&self) -> &'static Theme {
        self.config.theme()
    }

    /// Returns false when the user asked to quit.
    pub fn handle_input(&mut self, input: InputEvent) -> bool {
        match input {
            InputEvent::Quit => return false,
            InputEvent::Restart => self.restart(),
            InputEvent::NextMode => self.next_mode(),
            InputEvent::NextTheme => self.next_theme(),
            InputEvent::NextLayout => self.next_layout(),
            InputEvent::Key(key) => match self.state {
                AppState::Typing => self.type_key(key),
                AppState::Results => match key {
                    Keystroke::Char('q') => return false,
                    Keystroke::Char('r') => self.restart(),
                    Keystroke::Char('m') => self.next_mode(),
                    Keystroke::Char('t') => self.next_theme(),
                    Keystroke::Char('l') => self.next_layout(),
                    _ => {}
                },
            },
        }
        true
    }

    /// Refreshes live metrics and ends time-mode sessions at the deadline.
    pub fn on_tick(&mut self) {
        if !self.engine.is_running() {
            return;
        }
        if self.engine.is_deadline_reached() {
            self.finish();
        } else {
            self.engine.compute_metrics();
        }
    }

    fn type_key(&mut self, key: Keystroke) {
        if let Keystroke::Char(c) = key {
            let correct = self.engine.expected_char() == Some(c);
            if !correct && self.config.sound_on_error {
                self.pending_bell = true;
            }
            self.flash = Some(KeyFlash {
                key: c,
                correct,
                at: Instant::now(),
            });
        } else {
            self.flash = None;
        }

        if self.engine.process_key(key) {
            self.finish();
        }
    }

    fn finish(&mut self) {
        if let Some(report) = self.engine.stop() {
            if !report.all_saved() {
                self.notice = Some("results could not be saved; history is kept for this run".into());
            }
            self.last_report = Some(report);
        }
        self.flash = None;
        self.state = AppState::Results;
    }

    /// Starts a fresh attempt; an unfinished one is dropped without saving.
    pub fn restart(&mut self) {
        self.engine.reset();
        self.state = AppState::Typing;
        self.last_report = None;
        self.flash = None;
        self.notice = None;
    }

    pub fn next_mode(&mut self) {
        self.config.mode = self.config.mode.next();
        self.engine.reconfigure(self.config.session_config());
        self.state = AppState::Typing;
        self.last_report = None;
        self.flash = None;
        self.save_settings();
    }

    /// Switches palette in place; the current attempt carries on.
    pub fn next_theme(&mut self) {
        self.config.theme = Theme::next_after(&self.config.theme).name.to_string();
        self.save_settings();
    }

    /// Switches the on-screen keyboard in place; scoring does not depend on it.
    pub fn next_layout(&mut self) {
        self.config.layout = self.config.layout.next();
        self.save_settings();
    }

    fn save_settings(&mut self) {
        self.notice = match self.config_store.save(&self.config) {
            Ok(()) => None,
            Err(e) => {
                log::debug!("settings notice shown after failed save: {e}");
                Some("settings could not be saved".into())
            }
        };
    }

    /// Whether the on-screen keyboard should still light up `flash`.
    pub fn flash_visible(&self, now: Instant) -> Option<KeyFlash> {
        let flash = self.flash?;
        if self.config.reduced_motion
            || now.duration_since(flash.at) < Duration::from_millis(HIGHLIGHT_MS)
        {
            Some(flash)
        } else {
            None
        }
    }

    fn take_bell(&mut self) -> bool {
        std::mem::take(&mut self.pending_bell)
    }
}

fn init_logging() {
    let path = AppDirs::log_path();
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    // the terminal belongs to the UI, so logs only go to a file
    if let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) {
        let _ = env_logger::Builder::from_env(Env::default().default_filter_or("info"))
            .target(Target::Pipe(Box::new(file)))
            .try_init();
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    init_logging();
    log::info!("typesprint starting");

    let mut app = App::from_disk(&cli);

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let runner = Runner::new(CrosstermEventSource::new(), FixedTicker::default());
    let result = run_app(&mut terminal, &mut app, &runner);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app<B, E, T>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E, T>,
) -> Result<(), Box<dyn Error>>
where
    B: Backend,
    E: EventSource,
    T: Ticker,
{
    loop {
        terminal.draw(|f| ui::draw(app, f))?;

        match runner.step() {
            AppEvent::Tick => app.on_tick(),
            AppEvent::Resize => {}
            AppEvent::Input(input) => {
                if !app.handle_input(input) {
                    break;
                }
                if app.take_bell() {
                    let mut out = io::stdout();
                    out.write_all(b"\x07")?;
                    out.flush()?;
                }
            }
        }
    }

    log::info!("typesprint exiting");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};
    use std::sync::mpsc;
    use typesprint::runtime::{ManualClock, TestEventSource};
    use typesprint::store::MemoryStore;

    fn test_app(mode: Mode, text: &str) -> (App, ManualClock) {
        test_app_with(
            Config {
                mode,
                ..Config::default()
            },
            text,
        )
    }

    fn test_app_with(config: Config, text: &str) -> (App, ManualClock) {
        let clock = ManualClock::new();
        let engine = SessionEngine::with_clock(
            config.session_config(),
            WordBank::english(),
            AttemptLog::in_memory(),
            MistakeStore::in_memory(),
            Box::new(clock.clone()),
        )
        .with_text(text);
        let app = App::new(config, engine, Box::new(JsonConfigStore::in_memory()));
        (app, clock)
    }

    fn type_str(app: &mut App, s: &str) {
        for c in s.chars() {
            app.handle_input(InputEvent::Key(Keystroke::from(c)));
        }
    }

    fn render(app: &App) -> String {
        let backend = TestBackend::new(100, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| ui::draw(app, f)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["typesprint"]);

        assert_eq!(cli.mode, None);
        assert_eq!(cli.duration, None);
        assert_eq!(cli.words, None);
        assert_eq!(cli.layout, None);
        assert_eq!(cli.theme, None);
    }

    #[test]
    fn test_cli_parses_overrides() {
        let cli = Cli::parse_from([
            "typesprint",
            "-m",
            "practice",
            "-s",
            "60",
            "-w",
            "50",
            "-l",
            "dvorak",
            "-t",
            "nord",
        ]);

        assert_eq!(cli.mode, Some(Mode::Practice));
        assert_eq!(cli.duration, Some(60));
        assert_eq!(cli.words, Some(50));
        assert_eq!(cli.layout, Some(KeyboardLayout::Dvorak));
        assert_eq!(cli.theme.as_deref(), Some("nord"));
    }

    #[test]
    fn test_cli_rejects_illegal_values() {
        assert!(Cli::try_parse_from(["typesprint", "-s", "45"]).is_err());
        assert!(Cli::try_parse_from(["typesprint", "-w", "7"]).is_err());
        assert!(Cli::try_parse_from(["typesprint", "-t", "nope"]).is_err());
        assert!(Cli::try_parse_from(["typesprint", "-m", "marathon"]).is_err());
    }

    #[test]
    fn test_cli_apply_reports_changes() {
        let mut cfg = Config::default();
        let unchanged = Cli::parse_from(["typesprint"]);
        assert!(!unchanged.apply_to(&mut cfg));

        let cli = Cli::parse_from(["typesprint", "-m", "quote", "-t", "dracula"]);
        assert!(cli.apply_to(&mut cfg));
        assert_eq!(cfg.mode, Mode::Quote);
        assert_eq!(cfg.theme, "dracula");
        assert_eq!(cfg.duration, 30);
    }

    #[test]
    fn test_typing_to_completion_shows_results() {
        let (mut app, _clock) = test_app(Mode::Word, "hi");

        type_str(&mut app, "hi");

        assert_eq!(app.state, AppState::Results);
        let report = app.last_report.as_ref().unwrap();
        assert_eq!(report.record.mode, Mode::Word);
        assert_eq!(app.engine.history().load_all().len(), 1);
        assert!(app.notice.is_none());
    }

    #[test]
    fn test_time_mode_finishes_on_tick_after_deadline() {
        let (mut app, clock) = test_app(Mode::Time, "abc def");
        type_str(&mut app, "ab");

        clock.advance(Duration::from_secs(10));
        app.on_tick();
        assert_eq!(app.state, AppState::Typing);

        clock.advance(Duration::from_secs(20));
        app.on_tick();
        assert_eq!(app.state, AppState::Results);
        assert!(app.engine.is_finished());
    }

    #[test]
    fn test_tick_before_start_does_nothing() {
        let (mut app, clock) = test_app(Mode::Time, "abc");
        clock.advance(Duration::from_secs(100));

        app.on_tick();

        assert_eq!(app.state, AppState::Typing);
        assert!(!app.engine.is_finished());
    }

    #[test]
    fn test_restart_abandons_without_saving() {
        let (mut app, _clock) = test_app(Mode::Word, "hello");
        type_str(&mut app, "he");

        assert!(app.handle_input(InputEvent::Restart));

        assert_eq!(app.state, AppState::Typing);
        assert!(app.engine.input().is_empty());
        assert!(app.engine.history().load_all().is_empty());
    }

    #[test]
    fn test_results_keys() {
        let (mut app, _clock) = test_app(Mode::Word, "a");
        type_str(&mut app, "a");
        assert_eq!(app.state, AppState::Results);

        assert!(app.handle_input(InputEvent::Key(Keystroke::Char('r'))));
        assert_eq!(app.state, AppState::Typing);

        let (mut app, _clock) = test_app(Mode::Word, "a");
        type_str(&mut app, "a");
        assert!(!app.handle_input(InputEvent::Key(Keystroke::Char('q'))));
    }

    #[test]
    fn test_next_mode_cycles_and_saves() {
        let (mut app, _clock) = test_app(Mode::Time, "abc");

        app.handle_input(InputEvent::NextMode);

        assert_eq!(app.config.mode, Mode::Word);
        assert_eq!(app.engine.mode(), Mode::Word);
        assert_eq!(app.config_store.load().mode, Mode::Word);
    }

    #[test]
    fn test_theme_and_layout_cycle_and_save() {
        let (mut app, _clock) = test_app(Mode::Word, "abc");
        type_str(&mut app, "a");

        app.handle_input(InputEvent::NextTheme);
        app.handle_input(InputEvent::NextLayout);

        assert_ne!(app.config.theme, Config::default().theme);
        assert_eq!(app.theme().name, app.config.theme);
        assert_eq!(app.config.layout, KeyboardLayout::Dvorak);
        let saved = app.config_store.load();
        assert_eq!(saved.theme, app.config.theme);
        assert_eq!(saved.layout, KeyboardLayout::Dvorak);
        // the attempt in progress is untouched
        assert_eq!(app.engine.user_input(), "a");
        assert_eq!(app.state, AppState::Typing);
    }

    #[test]
    fn test_results_keys_change_theme_and_layout() {
        let (mut app, _clock) = test_app(Mode::Word, "a");
        type_str(&mut app, "a");
        assert_eq!(app.state, AppState::Results);

        assert!(app.handle_input(InputEvent::Key(Keystroke::Char('t'))));
        assert!(app.handle_input(InputEvent::Key(Keystroke::Char('l'))));
        assert!(app.handle_input(InputEvent::Key(Keystroke::Char('l'))));

        assert_eq!(app.config.theme, Theme::next_after(&Config::default().theme).name);
        assert_eq!(app.config.layout, KeyboardLayout::Qwerty);
        assert_eq!(app.state, AppState::Results);
    }

    #[test]
    fn test_failed_settings_save_sets_notice() {
        let config = Config::default();
        let engine = SessionEngine::new(
            config.session_config(),
            WordBank::english(),
            AttemptLog::in_memory(),
            MistakeStore::in_memory(),
        );
        let store = JsonConfigStore::new(Box::new(MemoryStore::failing()));
        let mut app = App::new(config, engine, Box::new(store));

        app.handle_input(InputEvent::NextTheme);
        assert!(app.notice.is_some());

        app.save_settings();
        assert!(app.notice.is_some());
    }

    #[test]
    fn test_quit() {
        let (mut app, _clock) = test_app(Mode::Time, "abc");
        assert!(!app.handle_input(InputEvent::Quit));
    }

    #[test]
    fn test_save_failure_sets_notice() {
        let config = Config {
            mode: Mode::Word,
            ..Config::default()
        };
        let engine = SessionEngine::new(
            config.session_config(),
            WordBank::english(),
            AttemptLog::open(Box::new(MemoryStore::failing())),
            MistakeStore::in_memory(),
        )
        .with_text("x");
        let mut app = App::new(config, engine, Box::new(JsonConfigStore::in_memory()));

        type_str(&mut app, "x");

        assert_eq!(app.state, AppState::Results);
        assert!(app.notice.is_some());
        assert_eq!(app.engine.history().load_all().len(), 1);
    }

    #[test]
    fn test_bell_only_on_error_when_enabled() {
        let (mut app, _clock) = test_app_with(
            Config {
                mode: Mode::Word,
                sound_on_error: true,
                ..Config::default()
            },
            "ab",
        );

        type_str(&mut app, "a");
        assert!(!app.take_bell());
        type_str(&mut app, "x");
        assert!(app.take_bell());
        assert!(!app.take_bell());

        let (mut quiet, _clock) = test_app(Mode::Word, "ab");
        type_str(&mut quiet, "x");
        assert!(!quiet.take_bell());
    }

    #[test]
    fn test_key_flash_fades_unless_reduced_motion() {
        let (mut app, _clock) = test_app(Mode::Word, "ab");
        type_str(&mut app, "a");
        let flash = app.flash.unwrap();
        assert!(flash.correct);
        assert!(app.flash_visible(flash.at).is_some());
        assert!(app
            .flash_visible(flash.at + Duration::from_millis(HIGHLIGHT_MS + 1))
            .is_none());

        app.config.reduced_motion = true;
        assert!(app
            .flash_visible(flash.at + Duration::from_secs(5))
            .is_some());
    }

    #[test]
    fn test_ui_typing_state_shows_target() {
        let (app, _clock) = test_app(Mode::Word, "hello world");
        let content = render(&app);
        assert!(content.contains("hello"));
        assert!(content.contains("world"));
    }

    #[test]
    fn test_ui_results_state_shows_scores() {
        let (mut app, _clock) = test_app(Mode::Word, "cat");
        type_str(&mut app, "cax\u{8}t");

        let content = render(&app);
        assert!(content.contains("wpm"));
        assert!(content.contains("acc"));
    }

    #[test]
    fn test_ui_renders_on_tiny_terminal() {
        let (app, _clock) = test_app(Mode::Time, "hello world");
        let backend = TestBackend::new(10, 4);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| ui::draw(&app, f)).unwrap();
    }

    #[test]
    fn test_run_app_exits_on_quit() {
        let (mut app, _clock) = test_app(Mode::Word, "hello");
        let (tx, rx) = mpsc::channel();
        tx.send(AppEvent::Input(InputEvent::Key(Keystroke::Char('h'))))
            .unwrap();
        tx.send(AppEvent::Resize).unwrap();
        tx.send(AppEvent::Input(InputEvent::Quit)).unwrap();
        let runner = Runner::new(
            TestEventSource::new(rx),
            FixedTicker::new(Duration::from_millis(1)),
        );
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();

        run_app(&mut terminal, &mut app, &runner).unwrap();

        assert_eq!(app.engine.user_input(), "h");
    }
}

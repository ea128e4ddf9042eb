use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::config::Config;
use crate::lexicon::Lexicon;
use crate::session::quiz::{Command, Mode, Outcome, QuizSession};
use crate::store::json_store::JsonStore;
use crate::ui::components::menu::{Menu, MenuAction};
use crate::ui::line_input::LineInput;
use crate::ui::theme::Theme;

/// How many review items the mistakes screen lists.
pub const MISTAKES_SHOWN: usize = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppScreen {
    Menu,
    Quiz,
    Mistakes,
}

pub struct App {
    pub screen: AppScreen,
    pub config: Config,
    pub session: QuizSession,
    pub store: Option<JsonStore>,
    pub theme: Theme,
    pub menu: Menu,
    pub input: LineInput,
    pub should_quit: bool,
    last_serial: u64,
}

impl App {
    pub fn new(config: Config, seed: Option<u64>) -> Result<Self> {
        let store = match JsonStore::new() {
            Ok(store) => Some(store),
            Err(e) => {
                tracing::warn!("progress will not be saved: {e}");
                None
            }
        };
        Self::with_store(config, store, seed)
    }

    pub fn with_store(mut config: Config, store: Option<JsonStore>, seed: Option<u64>) -> Result<Self> {
        let lexicon = Lexicon::load_or_builtin(config.lexicon_path.as_deref().map(Path::new))?;
        config.normalize_filters(&lexicon);

        let progress = store
            .as_ref()
            .map(JsonStore::load_progress)
            .unwrap_or_default();
        let rng = match seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        let session = QuizSession::new(lexicon, config.quiz_options(), progress, rng)?;

        let theme = Theme::load(&config.theme).unwrap_or_else(|| {
            tracing::warn!("theme '{}' not found, using default", config.theme);
            Theme::default()
        });
        let menu = Menu::new(config.sprint_seconds);

        Ok(Self {
            screen: AppScreen::Menu,
            config,
            session,
            store,
            theme,
            menu,
            input: LineInput::default(),
            should_quit: false,
            last_serial: 0,
        })
    }

    pub fn activate(&mut self, action: MenuAction) {
        match action {
            MenuAction::Practice => self.start(Mode::Practice),
            MenuAction::Timed => self.start(Mode::Timed),
            MenuAction::Mistakes => self.screen = AppScreen::Mistakes,
            MenuAction::Quit => self.quit(),
        }
    }

    pub fn start(&mut self, mode: Mode) {
        self.screen = AppScreen::Quiz;
        self.dispatch(Command::SwitchMode(mode));
    }

    pub fn submit(&mut self) {
        let answer = self.input.value().to_string();
        self.dispatch(Command::Submit(answer));
    }

    pub fn skip(&mut self) {
        self.dispatch(Command::Skip);
    }

    pub fn toggle_mode(&mut self) {
        let mode = self.session.mode().toggled();
        self.dispatch(Command::SwitchMode(mode));
    }

    pub fn tick(&mut self, elapsed: Duration) {
        self.dispatch(Command::Tick(elapsed));
    }

    pub fn go_to_menu(&mut self) {
        self.session.reset();
        self.input.clear();
        self.persist_if_dirty();
        self.screen = AppScreen::Menu;
    }

    pub fn quit(&mut self) {
        self.session.reset();
        self.persist_if_dirty();
        self.should_quit = true;
    }

    fn dispatch(&mut self, command: Command) -> Outcome {
        let outcome = self.session.handle(command);
        if let Outcome::Rejected(reason) = outcome {
            tracing::debug!(?reason, "command rejected");
        }
        if self.session.question_serial() != self.last_serial {
            self.last_serial = self.session.question_serial();
            self.input.clear();
        }
        self.persist_if_dirty();
        outcome
    }

    pub fn persist_if_dirty(&mut self) {
        if !self.session.take_dirty() {
            return;
        }
        if let Some(store) = &self.store
            && let Err(e) = store.save_progress(&self.session.snapshot())
        {
            tracing::warn!("failed to save progress: {e}");
        }
    }
}

use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};
use rust_i18n::t;
use tracing_subscriber::EnvFilter;

use conjugr::app::{App, AppScreen, MISTAKES_SHOWN};
use conjugr::config::Config;
use conjugr::engine::scoring::XP_PER_LEVEL;
use conjugr::event::{AppEvent, EventHandler};
use conjugr::session::quiz::Mode;
use conjugr::store::json_store::JsonStore;
use conjugr::store::schema::ExportData;
use conjugr::ui;
use conjugr::ui::components::progress_bar::ProgressBar;
use conjugr::ui::components::quiz_card::QuizCard;
use conjugr::ui::components::review_list::ReviewList;
use conjugr::ui::components::stats_sidebar::StatsSidebar;
use conjugr::ui::layout::{AppLayout, pack_hint_lines};
use conjugr::ui::line_input::InputResult;

rust_i18n::i18n!("locales", fallback = "en");

#[derive(Parser)]
#[command(name = "conjugr", version, about = "Terminal French verb conjugation trainer")]
struct Cli {
    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(short, long, help = "Interface language (en, fr)")]
    lang: Option<String>,

    #[arg(long, help = "Start straight into a timed sprint")]
    timed: bool,

    #[arg(long, help = "Seed for a reproducible question order")]
    seed: Option<u64>,

    #[arg(long, value_name = "PATH", conflicts_with_all = ["import", "reset"], help = "Write config and progress to a JSON file")]
    export: Option<PathBuf>,

    #[arg(long, value_name = "PATH", conflicts_with = "reset", help = "Restore config and progress from a JSON export")]
    import: Option<PathBuf>,

    #[arg(long, help = "Erase saved progress")]
    reset: bool,
}

fn init_logging() -> Result<()> {
    let dir = JsonStore::default_dir();
    fs::create_dir_all(&dir)?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("conjugr.log"))?;
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("conjugr=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // The terminal belongs to the UI; a log file that cannot be opened is not fatal.
    if let Err(e) = init_logging() {
        eprintln!("logging disabled: {e}");
    }

    let mut config = Config::load().unwrap_or_else(|e| {
        tracing::warn!("failed to load config, using defaults: {e}");
        Config::default()
    });
    if let Some(theme) = cli.theme {
        config.theme = theme;
    }
    if let Some(lang) = cli.lang {
        config.language = lang;
        config.validate();
    }
    rust_i18n::set_locale(&config.language);

    if let Some(path) = cli.export.as_deref() {
        return export(&config, path);
    }
    if let Some(path) = cli.import.as_deref() {
        return import(path);
    }
    if cli.reset {
        JsonStore::new()?.reset_progress()?;
        println!("{}", t!("cli.reset"));
        return Ok(());
    }

    let mut app = App::new(config, cli.seed)?;
    if cli.timed {
        app.start(Mode::Timed);
    }
    tracing::info!("starting conjugr");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new(Duration::from_millis(100));

    let result = run_app(&mut terminal, &mut app, &events);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    app.persist_if_dirty();
    if let Err(err) = result {
        tracing::error!("{err:?}");
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

fn export(config: &Config, path: &Path) -> Result<()> {
    let store = JsonStore::new()?;
    let data = store.export_all(config);
    let json = serde_json::to_string_pretty(&data)?;
    fs::write(path, json).with_context(|| format!("cannot write {}", path.display()))?;
    println!("{}", t!("cli.exported", path = path.display()));
    Ok(())
}

fn import(path: &Path) -> Result<()> {
    let content =
        fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))?;
    let data: ExportData = serde_json::from_str(&content)?;
    let store = JsonStore::new()?;
    store.import_all(&data)?;

    let mut config = data.config;
    config.validate();
    config.save()?;
    println!("{}", t!("cli.imported", path = path.display()));
    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| render(frame, app))?;

        match events.next()? {
            AppEvent::Key(key) => handle_key(app, key),
            AppEvent::Tick(elapsed) => {
                if app.screen == AppScreen::Quiz {
                    app.tick(elapsed);
                }
            }
            AppEvent::Resize => {}
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Only process Press events; Repeat would double-submit
    if key.kind != KeyEventKind::Press {
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.quit();
        return;
    }

    match app.screen {
        AppScreen::Menu => handle_menu_key(app, key),
        AppScreen::Quiz => handle_quiz_key(app, key),
        AppScreen::Mistakes => handle_mistakes_key(app, key),
    }
}

fn handle_menu_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.quit(),
        KeyCode::Up | KeyCode::Char('k') => app.menu.prev(),
        KeyCode::Down | KeyCode::Char('j') => app.menu.next(),
        KeyCode::Enter => app.activate(app.menu.selected_action()),
        KeyCode::Char(ch) => {
            if let Some(action) = app.menu.action_for_key(ch) {
                app.activate(action);
            }
        }
        _ => {}
    }
}

fn handle_quiz_key(app: &mut App, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('t') {
        app.toggle_mode();
        return;
    }
    match app.input.handle(key) {
        InputResult::Submit => app.submit(),
        InputResult::Skip => app.skip(),
        InputResult::Cancel => app.go_to_menu(),
        InputResult::Continue => {}
    }
}

fn handle_mistakes_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.screen = AppScreen::Menu,
        KeyCode::Enter => app.start(Mode::Practice),
        _ => {}
    }
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    match app.screen {
        AppScreen::Menu => render_menu(frame, app),
        AppScreen::Quiz => render_quiz(frame, app),
        AppScreen::Mistakes => render_mistakes(frame, app),
    }
}

fn render_header(frame: &mut ratatui::Frame, app: &App, title: &str, info: &str, area: ratatui::layout::Rect) {
    let colors = &app.theme.colors;
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            format!(" {title} "),
            Style::default()
                .fg(colors.header_fg())
                .bg(colors.header_bg())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            info.to_string(),
            Style::default().fg(colors.text_muted()).bg(colors.header_bg()),
        ),
    ]))
    .style(Style::default().bg(colors.header_bg()));
    frame.render_widget(header, area);
}

fn render_footer(frame: &mut ratatui::Frame, app: &App, hints: &[&str], area: ratatui::layout::Rect) {
    let lines: Vec<Line> = pack_hint_lines(hints, area.width as usize)
        .into_iter()
        .map(|line| {
            Line::from(Span::styled(
                line,
                Style::default().fg(app.theme.colors.text_muted()),
            ))
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_menu(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let stats = app.session.stats();

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    let info = format!(
        " {} | {} | {}",
        t!("header.level", level = stats.level),
        t!("header.xp", xp = stats.xp),
        t!("header.review_count", count = app.session.review_len()),
    );
    render_header(frame, app, "conjugr", &info, layout[0]);

    let menu_area = ui::layout::centered_rect(50, 70, layout[1]);
    frame.render_widget(app.menu.widget(&app.theme), menu_area);

    let hints = [t!("hint.select"), t!("hint.start"), t!("hint.quit")];
    let hints: Vec<&str> = hints.iter().map(|h| h.as_ref()).collect();
    render_footer(frame, app, &hints, layout[2]);
}

fn render_quiz(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let app_layout = AppLayout::new(area);
    let tier = app_layout.tier;
    let session = &app.session;
    let stats = session.stats();

    let mode_name = match session.mode() {
        Mode::Practice => t!("mode.practice"),
        Mode::Timed => t!("mode.timed"),
    };
    let countdown = session
        .countdown()
        .map(|secs| format!(" | {}", t!("header.countdown", secs = secs)))
        .unwrap_or_default();
    let info = if tier.show_sidebar() {
        format!(" {}{countdown}", t!("header.level", level = stats.level))
    } else {
        format!(
            " {} {} | {}/{} | {} {} | {}%{countdown}",
            t!("stats.score"),
            stats.score,
            stats.correct,
            stats.total,
            t!("stats.streak"),
            stats.streak,
            stats.accuracy(),
        )
    };
    render_header(frame, app, &mode_name, &info, app_layout.header);

    let show_bar = tier.show_level_bar(area.height);
    let mut constraints = vec![Constraint::Min(10)];
    if show_bar {
        constraints.push(Constraint::Length(3));
    }
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(app_layout.main);

    let card = QuizCard::new(
        session.question_view(),
        &app.input,
        session.feedback(),
        session.is_locked(),
        &app.theme,
    );
    frame.render_widget(card, main_layout[0]);

    if show_bar {
        let xp_into_level = stats.xp % XP_PER_LEVEL;
        let bar = ProgressBar::new(
            &t!("stats.level_progress", level = stats.level),
            stats.level_progress(),
            &app.theme,
        )
        .caption(format!("{xp_into_level}/{XP_PER_LEVEL} XP"));
        frame.render_widget(bar, main_layout[1]);
    }

    if let Some(sidebar_area) = app_layout.sidebar {
        let sections = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(14), Constraint::Min(3)])
            .split(sidebar_area);
        frame.render_widget(
            StatsSidebar::new(stats, session.countdown(), &app.theme),
            sections[0],
        );
        frame.render_widget(
            ReviewList::new(session.recent_mistakes(MISTAKES_SHOWN), &app.theme),
            sections[1],
        );
    }

    let hints = [
        t!("hint.submit"),
        t!("hint.skip"),
        t!("hint.toggle"),
        t!("hint.menu"),
    ];
    let hints: Vec<&str> = hints.iter().map(|h| h.as_ref()).collect();
    render_footer(frame, app, &hints, app_layout.footer);
}

fn render_mistakes(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    let centered = ui::layout::centered_rect(60, 70, layout[0]);
    frame.render_widget(
        ReviewList::new(app.session.recent_mistakes(MISTAKES_SHOWN), &app.theme),
        centered,
    );

    let hints = [t!("hint.back"), t!("hint.start")];
    let hints: Vec<&str> = hints.iter().map(|h| h.as_ref()).collect();
    render_footer(frame, app, &hints, layout[1]);
}

mod app;
mod audio;
mod config;
mod engine;
mod event;
mod morse;
mod session;
mod store;
mod trace_init;
mod ui;

use std::io;
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use crossterm::event::{
    DisableBracketedPaste, EnableBracketedPaste, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
    KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
    supports_keyboard_enhancement,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};
use tracing::{info, warn};

use app::{App, AppScreen, SETTINGS_FIELDS};
use config::Config;
use event::{AppEvent, EventHandler, TICK_RATE};
use morse::MorseSymbol;
use store::json_store::JsonStore;
use ui::components::menu::MenuAction;
use ui::components::practice_area::PracticeArea;
use ui::components::progress_bar::ProgressBar;
use ui::components::reference_cards::ReferenceCards;
use ui::components::stats_dashboard::StatsDashboard;
use ui::layout::{AppLayout, pack_hint_lines};

#[derive(Parser)]
#[command(name = "dotdash", version, about = "Terminal Morse code trainer")]
struct Cli {
    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(long, value_name = "MS", help = "Keyer press length separating dot from dash")]
    threshold: Option<u64>,

    #[arg(short, long, value_name = "MS", help = "Playback unit (dot) length")]
    unit: Option<u64>,

    #[arg(long, help = "Disable all sound")]
    no_audio: bool,

    #[arg(
        long,
        value_name = "PATH",
        conflicts_with = "import",
        help = "Write profile and history to a file"
    )]
    export: Option<PathBuf>,

    #[arg(long, value_name = "PATH", help = "Replace profile and history from an export file")]
    import: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Print the Morse rendering of TEXT
    Translate {
        #[arg(required = true)]
        text: Vec<String>,
        /// Also sound the result
        #[arg(long)]
        play: bool,
    },
    /// Print the characters for dot/dash CODE (letters by spaces, words by /)
    Decode { code: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = trace_init::init_tracing(&trace_init::default_log_dir());

    let mut config = Config::load().unwrap_or_else(|e| {
        warn!("config unreadable, using defaults: {e:#}");
        Config::default()
    });
    if let Some(threshold) = cli.threshold {
        config.keyer_threshold_ms = threshold;
    }
    if let Some(unit) = cli.unit {
        config.unit_ms = unit;
    }
    if cli.no_audio {
        config.audio_enabled = false;
    }
    if let Some(theme_name) = cli.theme {
        if ui::theme::Theme::load(&theme_name).is_some() {
            config.theme = theme_name;
        } else {
            eprintln!("Unknown theme '{theme_name}', keeping '{}'", config.theme);
        }
    }
    config.validate();

    match cli.command {
        Some(Command::Translate { text, play }) => {
            return run_translate(&config, &text.join(" "), play);
        }
        Some(Command::Decode { code }) => {
            println!("{}", morse::decode_text(&code));
            return Ok(());
        }
        None => {}
    }

    if let Some(path) = cli.export {
        let store = JsonStore::new()?;
        store.export_to_file(&config, &path)?;
        println!("Exported to {}", path.display());
        return Ok(());
    }
    if let Some(path) = cli.import {
        let store = JsonStore::new()?;
        let data = store.import_from_file(&path)?;
        println!(
            "Imported {} attempts from {}",
            data.history.attempts.len(),
            path.display()
        );
        return Ok(());
    }

    let mut app = App::new(config);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;

    // The keyer times presses, which needs release events
    let keyboard_enhanced = supports_keyboard_enhancement().unwrap_or(false)
        && execute!(
            io::stdout(),
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        )
        .is_ok();
    app.keyer_available = keyboard_enhanced;
    info!(keyer = keyboard_enhanced, "terminal ready");

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new(TICK_RATE);

    let result = run_app(&mut terminal, &mut app, &events);

    if keyboard_enhanced {
        let _ = execute!(io::stdout(), PopKeyboardEnhancementFlags);
    }
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableBracketedPaste,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

fn run_translate(config: &Config, text: &str, play: bool) -> Result<()> {
    let code = morse::translate(text);
    println!("{code}");
    if !play {
        return Ok(());
    }
    let mut audio = audio::open(true, config.tone_timing(), config.max_key_hold());
    if let Some(reason) = audio.unavailable_reason() {
        bail!("cannot play: {reason}");
    }
    let total = audio.play(&code, Instant::now())?;
    // Let the device drain the tail of the last tone
    thread::sleep(total + Duration::from_millis(50));
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
            AppEvent::Paste(text) => {
                if app.screen == AppScreen::Practice {
                    app.paste(text);
                }
            }
            AppEvent::Tick | AppEvent::Resize(_, _) => {}
        }
        app.on_tick(Instant::now());

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    let now = Instant::now();

    // The keyer is the only consumer of release events
    if key.code == KeyCode::Char(' ') && app.screen == AppScreen::Practice {
        match key.kind {
            KeyEventKind::Press => app.key_press(now),
            KeyEventKind::Release => app.key_release(now),
            KeyEventKind::Repeat => {}
        }
        return;
    }

    // Ignore Repeat to keep held keys from flooding the input
    if key.kind != KeyEventKind::Press {
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    match app.screen {
        AppScreen::Menu => handle_menu_key(app, key),
        AppScreen::Practice => handle_practice_key(app, key, now),
        AppScreen::Stats => handle_stats_key(app, key),
        AppScreen::Settings => handle_settings_key(app, key),
    }
}

fn run_menu_action(app: &mut App, action: MenuAction) {
    match action {
        MenuAction::Practice(mode) => {
            app.start_practice(mode);
        }
        MenuAction::Stats => app.go_to_stats(),
        MenuAction::Settings => app.go_to_settings(),
    }
}

fn handle_menu_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        KeyCode::Up | KeyCode::Char('k') => app.menu.prev(),
        KeyCode::Down | KeyCode::Char('j') => app.menu.next(),
        KeyCode::Enter => {
            if let Some(action) = app.menu.selected_action() {
                run_menu_action(app, action);
            }
        }
        KeyCode::Char(ch) => {
            if let Some(action) = app.menu.action_for_key(ch) {
                run_menu_action(app, action);
            }
        }
        _ => {}
    }
}

fn handle_practice_key(app: &mut App, key: KeyEvent, now: Instant) {
    match key.code {
        KeyCode::Esc => app.go_to_menu(),
        KeyCode::Char('.') => app.push_symbol(MorseSymbol::Dot),
        KeyCode::Char('-') => app.push_symbol(MorseSymbol::Dash),
        KeyCode::Backspace => app.backspace(),
        KeyCode::Delete => app.clear_input(),
        KeyCode::Enter => app.play_target(now),
        _ => {}
    }
}

fn handle_stats_key(app: &mut App, key: KeyEvent) {
    if matches!(key.code, KeyCode::Esc | KeyCode::Char('q')) {
        app.go_to_menu();
    }
}

fn handle_settings_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.save_config();
            app.go_to_menu();
        }
        KeyCode::Up | KeyCode::Char('k') => {
            app.settings_selected = app.settings_selected.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if app.settings_selected + 1 < SETTINGS_FIELDS.len() {
                app.settings_selected += 1;
            }
        }
        KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => app.settings_cycle_forward(),
        KeyCode::Left | KeyCode::Char('h') => app.settings_cycle_backward(),
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
        AppScreen::Practice => render_practice(frame, app),
        AppScreen::Stats => render_stats(frame, app),
        AppScreen::Settings => render_settings(frame, app),
    }
}

fn header_line<'a>(app: &'a App, title: &'a str, info: String) -> Paragraph<'a> {
    let colors = &app.theme.colors;
    let mut spans = vec![
        Span::styled(
            title,
            Style::default()
                .fg(colors.header_fg())
                .bg(colors.header_bg())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(info, Style::default().fg(colors.dim()).bg(colors.header_bg())),
    ];
    if let Some(ref status) = app.status {
        spans.push(Span::styled(
            format!(" | {status}"),
            Style::default().fg(colors.highlight()).bg(colors.header_bg()),
        ));
    }
    Paragraph::new(Line::from(spans)).style(Style::default().bg(colors.header_bg()))
}

fn footer_line<'a>(app: &App, hints: &[&str], width: u16) -> Paragraph<'a> {
    let text = pack_hint_lines(hints, width as usize)
        .into_iter()
        .next()
        .unwrap_or_default();
    Paragraph::new(Line::from(Span::styled(
        text,
        Style::default().fg(app.theme.colors.dim()),
    )))
}

fn render_menu(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    let audio_text = if app.audio.is_available() { "" } else { " | audio off" };
    let info = format!(
        " {}/{} characters{audio_text}",
        app.practice_set.unlocked_count(),
        app.practice_set.total_characters(),
    );
    frame.render_widget(header_line(app, " dotdash ", info), layout[0]);

    let menu_area = ui::layout::centered_panel(layout[1], 50, 80);
    frame.render_widget(&app.menu, menu_area);

    let footer = footer_line(
        app,
        &["[1-3] Practice", "[s] Stats", "[c] Settings", "[q] Quit"],
        layout[2].width,
    );
    frame.render_widget(footer, layout[2]);
}

fn render_practice(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let Some(ref session) = app.session else {
        return;
    };

    let app_layout = AppLayout::new(area);

    let mut info = String::new();
    if let Some(focused) = app.practice_set.focused {
        info.push_str(&format!(" Focus: '{focused}'"));
    }
    if app.audio.is_playing() {
        info.push_str(" | playing");
    }
    if !app.keyer_available {
        info.push_str(" | keyer off, type . and -");
    }
    let title = format!(" {} ", session.mode().label());
    frame.render_widget(header_line(app, &title, info), app_layout.header);

    let show_progress = app_layout.show_progress;
    let mut constraints = vec![Constraint::Min(10)];
    if show_progress {
        constraints.push(Constraint::Length(3));
    }
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(app_layout.main);

    frame.render_widget(PracticeArea::new(session, app.theme), main_layout[0]);

    if show_progress {
        let progress = ProgressBar::new("Unlocked", app.practice_set.progress(), app.theme).caption(
            format!(
                "{}/{}",
                app.practice_set.unlocked_count(),
                app.practice_set.total_characters()
            ),
        );
        frame.render_widget(progress, main_layout[1]);
    }

    if let Some(sidebar) = app_layout.sidebar {
        let active = session.target().map(|t| t.character());
        let cards = ReferenceCards::new(session.practice_set(), app.theme)
            .active(active, session.shows_code())
            .focused(app.practice_set.focused);
        frame.render_widget(cards, sidebar);
    }

    let play_hint = if app.audio.is_playing() {
        ""
    } else {
        "[Enter] Play"
    };
    let key_hint = if app.keyer_available { "[Space] Key" } else { "" };
    let footer = footer_line(
        app,
        &[
            key_hint,
            "[. -] Type",
            "[Backspace] Delete",
            "[Del] Clear",
            play_hint,
            "[Esc] Menu",
        ],
        app_layout.footer.width,
    );
    frame.render_widget(footer, app_layout.footer);
}

fn render_stats(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let stats = app.ledger.stats();
    let fluency = app.fluency_points();
    let dashboard = StatsDashboard {
        stats: &stats,
        thresholds: app.config.mastery_thresholds(),
        fluency: &fluency,
        fluency_window: app.config.fluency_window,
        quiz_gate: app.quiz_gate(),
        unlocked: app.practice_set.unlocked_count(),
        total: app.practice_set.total_characters(),
        stale: app.stats_stale,
        theme: app.theme,
    };
    frame.render_widget(dashboard, area);
}

fn render_settings(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let centered = ui::layout::centered_panel(area, 60, 80);

    let block = Block::bordered()
        .title(" Settings ")
        .border_style(Style::default().fg(colors.accent()))
        .style(Style::default().bg(colors.bg()));
    let inner = block.inner(centered);
    block.render(centered, frame.buffer_mut());

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(inner);

    Paragraph::new(Line::from(Span::styled(
        "  Arrows to navigate, Enter/Right to change",
        Style::default().fg(colors.dim()),
    )))
    .render(layout[0], frame.buffer_mut());

    let field_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            SETTINGS_FIELDS
                .iter()
                .map(|_| Constraint::Length(2))
                .collect::<Vec<_>>(),
        )
        .split(layout[1]);

    for (i, label) in SETTINGS_FIELDS.iter().enumerate() {
        let is_selected = i == app.settings_selected;
        let indicator = if is_selected { " > " } else { "   " };

        let label_style = Style::default()
            .fg(if is_selected { colors.accent() } else { colors.fg() })
            .add_modifier(if is_selected {
                Modifier::BOLD
            } else {
                Modifier::empty()
            });
        let value_style = Style::default().fg(if is_selected {
            colors.highlight()
        } else {
            colors.dim()
        });

        let line = Line::from(vec![
            Span::styled(format!("{indicator}{label:<18}"), label_style),
            Span::styled(format!("< {} >", app.settings_value(i)), value_style),
        ]);
        if i < field_layout.len() {
            Paragraph::new(line).render(field_layout[i], frame.buffer_mut());
        }
    }

    Paragraph::new(Line::from(Span::styled(
        "  [ESC] Save & back",
        Style::default().fg(colors.accent()),
    )))
    .render(layout[2], frame.buffer_mut());
}

// src/main.rs
mod app;
mod catalog;
mod config;
mod error;
mod fetcher;
mod input;
mod logging;
mod models;
mod network;
mod prompts;
mod store;
mod theme;
mod ui;
mod utils;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use crossterm::{
    cursor,
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use tokio::runtime::Runtime;
use tracing::{error, info, warn};

use crate::app::App;
use crate::catalog::Catalog;
use crate::config::{create_blueprint_if_missing, get_user_config_path, Settings};

/// Book recommendations by genre, mood and reading level.
#[derive(Parser, Debug)]
#[command(name = "moodshelf", version, about)]
struct Cli {
    /// Extra config file, merged over the user and local config
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Genre/mood catalog in TOML, replaces the built-in lists
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Write logs here instead of the configured location
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::new(cli.config.as_deref()).context("loading configuration")?;

    if let Some(log_file) = cli.log_file.clone().or_else(|| settings.log_file()) {
        logging::init_logging(&log_file, &settings.log_level)?;
    }

    if let Some(path) = get_user_config_path() {
        match create_blueprint_if_missing(&path) {
            Ok(true) => info!(path = %path.display(), "created user config"),
            Ok(false) => {}
            Err(e) => warn!(path = %path.display(), error = %e, "could not create user config"),
        }
    }

    let catalog = match cli.catalog.clone().or_else(|| settings.catalog_path()) {
        Some(path) => Catalog::load(&path)?,
        None => Catalog::builtin()?,
    };
    info!(genres = catalog.genre_count(), model = %settings.gemini_model, "starting");

    let rt = Runtime::new()?;
    let mut app = App::new(catalog, settings.endpoint(), settings.needs_api_key_prompt(), rt.handle().clone());

    install_panic_hook(|| {
        if let Err(e) = restore_terminal() {
            eprintln!("could not restore terminal: {e}");
        }
    });
    terminal::enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, &mut app);

    restore_terminal()?;
    terminal.show_cursor()?;

    if let Err(e) = &result {
        error!(error = %e, "exiting with error");
    }
    result
}

fn restore_terminal() -> std::io::Result<()> {
    terminal::disable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, LeaveAlternateScreen, cursor::Show)
}

/// Runs `restore` before the previous panic hook, so the panic message lands
/// on the normal screen.
fn install_panic_hook(restore: impl Fn() + Send + Sync + 'static) {
    let original = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        restore();
        original(info);
    }));
}

fn run<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> anyhow::Result<()> {
    loop {
        terminal.draw(|f| ui::render(f, app))?;

        // Poll so that a finished fetch shows up without a key press.
        if event::poll(Duration::from_millis(200))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if !input::handle_key(key, app)? {
                    break;
                }
            }
        }
    }
    Ok(())
}

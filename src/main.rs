use std::{env, fs::File, io::stdout, path::PathBuf, time::Instant};

use anyhow::{Context, Result, bail};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::{error, info};
use ratatui::{Terminal, backend::CrosstermBackend};
use simplelog::{LevelFilter, WriteLogger};

use folio::document::Document;
use folio::event_source::KeyboardEventSource;
use folio::main_app::{App, TerminalHost, run_app_with_event_source};
use folio::panic_handler;
use folio::settings;
use folio::theme::apply_saved_theme;

fn main() -> Result<()> {
    // Initialize panic handler first, before any other setup
    panic_handler::initialize_panic_handler();

    WriteLogger::init(
        LevelFilter::Debug,
        simplelog::ConfigBuilder::new()
            .set_max_level(LevelFilter::Debug)
            .build(),
        File::create("folio.log")?,
    )?;

    let Some(path) = env::args_os().nth(1).map(PathBuf::from) else {
        bail!("usage: folio <document.json>");
    };

    info!("Starting Folio with {}", path.display());

    // Load settings from ~/.folio_settings.yaml
    settings::load_settings();
    apply_saved_theme();

    let document = Document::load(&path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    let export_dir = path
        .parent()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));

    let (width, _) = crossterm::terminal::size().context("Failed to read terminal size")?;
    let mut app = App::new(
        document,
        settings::viewer_config(),
        TerminalHost::from_settings(width),
        export_dir,
        Instant::now(),
    )?;

    // Terminal initialization
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut event_source = KeyboardEventSource;
    let res = run_app_with_event_source(&mut terminal, &mut app, &mut event_source);

    // Restore terminal state
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        error!("Application error: {err:?}");
        println!("{err:?}");
    }

    info!("Shutting down Folio");
    Ok(())
}

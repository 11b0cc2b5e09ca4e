mod app;
mod ui;

use anyhow::Result;
use blockwise_config::{Config, DEFAULT_START_DOCUMENT};
use blockwise_engine::{EditorOptions, io};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use relative_path::RelativePathBuf;
use std::{
    env,
    fs::{File, OpenOptions},
    io::{Stdout, stdout},
    path::{Path, PathBuf},
    process,
};

use crate::app::{App, Flow};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let config_path = Config::config_path();
    init_logging(&config_path.with_file_name("blockwise.log"));

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: Failed to load config file: {e}");
            process::exit(1);
        }
    };

    let (documents_path, document, from_config) = match args.len() {
        2 | 3 => {
            let start = args.get(2).cloned().unwrap_or_else(|| {
                config
                    .as_ref()
                    .map_or(DEFAULT_START_DOCUMENT.to_string(), |c| c.start_document.clone())
            });
            (PathBuf::from(&args[1]), start, false)
        }
        1 => match &config {
            Some(config) => (
                config.documents_path.clone(),
                config.start_document.clone(),
                true,
            ),
            None => {
                eprintln!("Error: No documents path provided and no config file found");
                eprintln!("Usage: {} <documents-folder> [document]", args[0]);
                eprintln!("Or create a config file at {}", config_path.display());
                process::exit(1);
            }
        },
        _ => {
            eprintln!("Usage: {} [documents-folder] [document]", args[0]);
            process::exit(1);
        }
    };

    if let Err(e) = io::validate_documents_dir(&documents_path) {
        let source = if from_config {
            format!(" from config file '{}'", config_path.display())
        } else {
            String::new()
        };
        eprintln!(
            "Error: Documents path '{}'{} is invalid: {e}",
            documents_path.display(),
            source
        );
        process::exit(1);
    }

    let options: EditorOptions = config.map(|c| c.editor).unwrap_or_default();
    let mut app = App::open(documents_path, RelativePathBuf::from(document), options)?;

    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

/// stderr belongs to the terminal UI, so logs go to a file beside the config.
/// Failing to open it is reported now, before the UI takes the terminal.
fn init_logging(log_path: &Path) {
    let file = match open_log_file(log_path) {
        Ok(file) => file,
        Err(e) => {
            eprintln!(
                "Warning: logging disabled, cannot open '{}': {e}",
                log_path.display()
            );
            return;
        }
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
}

fn open_log_file(log_path: &Path) -> std::io::Result<File> {
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(log_path)
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    loop {
        app.mount_surfaces();
        terminal.draw(|f| ui::ui(f, app))?;
        if app.render_complete() {
            terminal.draw(|f| ui::ui(f, app))?;
        }

        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => match app.on_key(key) {
                Ok(Flow::Quit) => return Ok(()),
                Ok(Flow::Continue) => {}
                Err(e) => app.report(e),
            },
            Event::Mouse(mouse) => app.on_mouse(mouse),
            _ => {}
        }
    }
}

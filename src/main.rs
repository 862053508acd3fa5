use clap::Parser;
use crossbeam_channel::{unbounded, Receiver};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use exam_prep::ai::OpenRouterClient;
use exam_prep::ai_worker::{spawn_ai_worker, SuggestionResponse};
use exam_prep::cli::{run_command, Cli};
use exam_prep::db::{SharedStorage, SqliteStorage};
use exam_prep::file_io::read_import_file;
use exam_prep::{logger, ui, App, AppConfig, Catalog};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

const TICK: Duration = Duration::from_millis(100);

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;
    let _log_guard = logger::init(&config.logging, &config.storage.data_dir)?;
    tracing::info!("Starting exam-prep {}", env!("CARGO_PKG_VERSION"));

    let catalog = match &cli.catalog {
        Some(path) => Catalog::from_json(&read_import_file(path)?)?,
        None => Catalog::builtin().clone(),
    };
    let storage: SharedStorage = Rc::new(SqliteStorage::open(&config.storage.database_path())?);

    if let Some(command) = &cli.command {
        let message = run_command(command, &catalog, storage, &config)?;
        println!("{}", message);
        return Ok(());
    }

    let (response_tx, response_rx) = unbounded();
    let mut app = App::new(catalog, storage, config.clone());

    if std::env::var_os("OPENROUTER_API_KEY").is_some() {
        match OpenRouterClient::new(config.ai.model_config()) {
            Ok(client) => {
                let (request_tx, request_rx) = unbounded();
                spawn_ai_worker(Arc::new(client), response_tx, request_rx)?;
                app = app.with_suggestions(request_tx);
                tracing::info!("AI suggestions enabled with model {}", config.ai.model);
            }
            Err(e) => tracing::warn!("AI suggestions disabled: {}", e),
        }
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, &mut app, &response_rx);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = &result {
        tracing::error!("Terminal loop failed: {}", e);
    }
    tracing::info!("Exiting");
    Ok(result?)
}

fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    responses: &Receiver<SuggestionResponse>,
) -> io::Result<()> {
    while !app.should_quit {
        terminal.draw(|f| ui::draw(f, app))?;

        while let Ok(response) = responses.try_recv() {
            app.apply_suggestion_response(response);
        }

        if event::poll(TICK)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            app.handle_key(key);
        }
    }
    Ok(())
}

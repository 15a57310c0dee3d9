use std::fs::OpenOptions;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use localchat_core::{
    Completion, Config, ConversationStore, Dispatcher, ModelGateway, OllamaClient,
};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod app;
mod handler;
mod theme;
mod tui;
mod ui;

use app::App;
use tui::{EventHandler, Tui};

#[tokio::main]
async fn main() -> Result<()> {
    let (config, config_error) = match Config::load() {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };

    init_logging(&config);
    if let Some(e) = config_error {
        warn!(error = %e, "could not read config, using defaults");
    }
    info!(model = %config.model, base_url = %config.base_url, "starting");

    let client = OllamaClient::from_config(&config)?;
    spawn_model_check(client.clone());

    let (dispatcher, mut completions) = Dispatcher::new(ModelGateway::new(Arc::new(client)));
    let store = ConversationStore::new(config.conversations_dir());
    let mut app = App::new(&config, dispatcher, store, Config::config_path().ok());

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new();

    let result = run(&mut terminal, &mut app, &mut events, &mut completions).await;

    tui::restore()?;
    result
}

async fn run(
    terminal: &mut Tui,
    app: &mut App,
    events: &mut EventHandler,
    completions: &mut UnboundedReceiver<Completion>,
) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        // Replies are applied here, on the UI task, never from the worker.
        tokio::select! {
            Some(event) = events.next() => handler::handle_event(app, event),
            Some(completion) = completions.recv() => app.on_completion(completion),
            else => break,
        }
    }
    Ok(())
}

/// Warn early when the configured model has not been pulled.
fn spawn_model_check(client: OllamaClient) {
    tokio::spawn(async move {
        match client.has_model(client.model()).await {
            Ok(true) => {}
            Ok(false) => warn!(
                model = client.model(),
                "model not found locally; pull it with: ollama pull {}",
                client.model()
            ),
            Err(e) => warn!(error = %e, "could not reach Ollama"),
        }
    });
}

/// Log to a file; the terminal belongs to the UI.
fn init_logging(config: &Config) {
    let Some(dir) = dirs::cache_dir().map(|d| d.join("localchat")) else {
        return;
    };
    if std::fs::create_dir_all(&dir).is_err() {
        return;
    }
    let Ok(file) = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("localchat.log"))
    else {
        return;
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .init();
}

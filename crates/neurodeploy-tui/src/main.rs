use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use neurodeploy_core::{
    context_string, download_all, render, AppConfig, AssistantClient, ConfigCommand,
    DirectorySink, GpuProfile, LlmProvider, Settings,
};

mod app;
mod handler;
mod logging;
mod tui;
mod ui;

use app::App;
use tui::{EventHandler, Tui};

#[derive(Parser)]
#[command(name = "neurodeploy")]
#[command(version, about = "Generate a LangChain + Gemini deployment bundle for your GPU")]
struct Cli {
    /// Target GPU profile (low, mid, high)
    #[arg(long, global = true, value_parser = parse_gpu)]
    gpu: Option<GpuProfile>,

    /// Core LLM provider (gemini, ollama, openai)
    #[arg(long, global = true, value_parser = parse_provider)]
    provider: Option<LlmProvider>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the full script bundle to a directory
    Export {
        /// Output directory (defaults to the configured export directory)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Print the configuration summary sent to the assistant
    Context,
    /// Ask the deployment assistant a single question
    Ask {
        /// Your question
        question: String,
    },
}

fn parse_gpu(s: &str) -> Result<GpuProfile, String> {
    GpuProfile::from_str(s).ok_or_else(|| format!("unknown GPU profile '{}' (low, mid, high)", s))
}

fn parse_provider(s: &str) -> Result<LlmProvider, String> {
    LlmProvider::from_str(s)
        .ok_or_else(|| format!("unknown provider '{}' (gemini, ollama, openai)", s))
}

fn initial_config(cli: &Cli) -> AppConfig {
    let mut config = AppConfig::default();
    if let Some(gpu) = cli.gpu {
        config = config.apply(ConfigCommand::SetGpuProfile(gpu));
    }
    if let Some(provider) = cli.provider {
        config = config.apply(ConfigCommand::SetProvider(provider));
    }
    config
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.verbose) {
        eprintln!("Warning: {}", e);
    }

    let settings = Settings::load().unwrap_or_else(|e| {
        warn!("Falling back to default settings: {}", e);
        Settings::default()
    });

    let (api_key, key_source) = match settings.resolve_api_key() {
        Some((key, source)) => (Some(key), Some(source)),
        None => (None, None),
    };
    let client = AssistantClient::new(api_key);
    let config = initial_config(&cli);

    match cli.command {
        Some(Commands::Export { out }) => {
            let dir = out.unwrap_or_else(|| settings.export_dir());
            info!(
                gpu = config.gpu_profile.as_str(),
                provider = config.llm_provider.as_str(),
                dir = %dir.display(),
                "exporting bundle"
            );
            let mut sink = DirectorySink::new(&dir);
            let scripts = render(&config);
            let saved = download_all(&scripts, &mut sink);
            println!("Saved {}/{} files to {}", saved, scripts.len(), dir.display());
            if saved < scripts.len() {
                return Err(anyhow!("{} file(s) could not be written", scripts.len() - saved));
            }
        }
        Some(Commands::Context) => {
            println!("{}", context_string(&config));
        }
        Some(Commands::Ask { question }) => {
            let reply = client.ask(&question, &context_string(&config)).await;
            println!("{}", reply);
        }
        None => {
            info!(key_source = ?key_source, "starting TUI");
            let sink = DirectorySink::new(settings.export_dir());
            let mut app = App::new(config, client, key_source, sink);
            run_tui(&mut app).await?;
        }
    }

    Ok(())
}

async fn run_tui(app: &mut App) -> Result<()> {
    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new();

    let result = run_loop(&mut terminal, app, &mut events).await;

    tui::restore()?;
    result
}

async fn run_loop(terminal: &mut Tui, app: &mut App, events: &mut EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event)?,
            None => break,
        }
    }
    Ok(())
}

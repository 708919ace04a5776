use std::io::Read;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use supportchat_core::{
    format_message, AgentConfig, ChatController, Config, FormatOptions, NumberedListStyle,
    SupportClient, Theme,
};

mod app;
mod handler;
mod logging;
mod markup;
mod tui;
mod ui;

use app::App;
use tui::{EventHandler, Tui};

#[derive(Parser)]
#[command(name = "supportchat")]
#[command(about = "Chat with a customer support agent from the terminal", version)]
struct Cli {
    /// Base URL of the support backend (overrides SUPPORTCHAT_URL and the config file)
    #[arg(long, global = true)]
    url: Option<String>,

    /// Color theme (light or dark); defaults to the saved preference
    #[arg(long, value_parser = parse_theme)]
    theme: Option<Theme>,

    /// How numbered lists are wrapped in formatted output (bare or ordered)
    #[arg(long, global = true, value_parser = parse_list_style)]
    numbered_lists: Option<NumberedListStyle>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a single message and print the agent's formatted reply
    Send {
        /// The message to send
        message: String,
    },
    /// Format text from stdin into safe HTML
    Format,
}

fn parse_theme(s: &str) -> Result<Theme, String> {
    s.parse()
}

fn parse_list_style(s: &str) -> Result<NumberedListStyle, String> {
    s.parse()
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("Warning: could not read config ({}), using defaults", e);
        Config::new()
    });

    let base_url = cli.url.clone().unwrap_or_else(|| config.resolved_base_url());
    let mut format_options = config.format_options();
    if let Some(style) = cli.numbered_lists {
        format_options.numbered_lists = style;
    }

    match cli.command {
        Some(Commands::Send { message }) => {
            logging::init_stderr();
            send_once(&base_url, &message, &format_options).await
        }
        Some(Commands::Format) => {
            logging::init_stderr();
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("failed to read stdin")?;
            println!("{}", format_message(&text, &format_options));
            Ok(())
        }
        None => {
            let log_path = config.log_path()?;
            logging::init_file(&log_path)
                .with_context(|| format!("failed to open log file {}", log_path.display()))?;

            let theme = cli.theme.or(config.theme).unwrap_or_default();
            run_chat(&base_url, theme).await
        }
    }
}

async fn send_once(base_url: &str, message: &str, format_options: &FormatOptions) -> Result<()> {
    let client = SupportClient::new(base_url);
    let mut controller = ChatController::new();

    if controller.submit(&client, message).await.is_none() {
        anyhow::bail!("nothing to send: the message is empty");
    }
    if let Some(reply) = controller.last_reply() {
        println!("{}", format_message(&reply.content, format_options));
    }
    Ok(())
}

async fn load_agent(client: &SupportClient) -> AgentConfig {
    match client.fetch_config().await {
        Ok(agent) => agent,
        Err(e) => {
            tracing::warn!(error = %e, "could not load agent config, using defaults");
            AgentConfig::default()
        }
    }
}

async fn run_chat(base_url: &str, theme: Theme) -> Result<()> {
    let client = SupportClient::new(base_url);
    tracing::info!(url = client.base_url(), "starting chat session");
    let agent = load_agent(&client).await;

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut app = App::new(client, agent, theme);
    let mut events = EventHandler::new();

    let result = run_loop(&mut terminal, &mut app, &mut events).await;

    tui::restore()?;
    tracing::info!(messages = app.controller.log().len(), "chat session ended");
    result
}

async fn run_loop(terminal: &mut Tui, app: &mut App, events: &mut EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        if let Some(event) = events.next().await {
            handler::handle_event(app, event);
        }
        app.poll_response().await;
    }
    Ok(())
}

use std::{path::PathBuf, str::FromStr};

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use client_core::{
    build_http_client, CommandSink, ControlBoard, ControlEvent, ControlPanel, DeviceClient,
    DeviceEndpoints, EventOutcome,
};
use shared::protocol::Command;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod events;

use config::{load_settings, Settings};
use events::{parse_event_line, parse_switch};

#[derive(Parser, Debug)]
#[command(name = "panel", about = "Operator panel for the thermal/USB overlay compositor")]
struct Cli {
    /// Base URL of the device, e.g. http://flircam.local:8080
    #[arg(long)]
    device_url: Option<String>,
    /// Settings file (defaults to ./panel.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Per-request timeout; unset waits indefinitely
    #[arg(long)]
    timeout_ms: Option<u64>,
    #[command(subcommand)]
    command: PanelCommand,
}

#[derive(Subcommand, Debug)]
enum PanelCommand {
    /// Fetch the configuration and print every control as projected.
    Show,
    /// Commit a value on a slider or selector.
    Commit {
        control: String,
        #[arg(allow_hyphen_values = true)]
        value: String,
    },
    /// Check or uncheck a toggle.
    Toggle { control: String, state: String },
    /// Send a raw command line, e.g. `send set thermal scale 1.5`.
    Send {
        #[arg(required = true, num_args = 1.., trailing_var_arg = true, allow_hyphen_values = true)]
        line: Vec<String>,
    },
    /// Print a cache-busted stream URL.
    StreamUrl,
    /// Read control events from stdin until EOF.
    Interactive,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("PANEL_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut settings = load_settings(cli.config.as_deref())?;
    if let Some(url) = cli.device_url {
        settings.device_url = url;
    }
    if let Some(ms) = cli.timeout_ms {
        settings.request_timeout_ms = Some(ms);
    }
    info!(device_url = %settings.device_url, "panel: using device");

    match cli.command {
        PanelCommand::Show => show(&settings).await,
        PanelCommand::Commit { control, value } => {
            run_single_event(&settings, ControlEvent::Commit { control, value }).await
        }
        PanelCommand::Toggle { control, state } => {
            let checked = parse_switch(&state)?;
            run_single_event(&settings, ControlEvent::Toggle { control, checked }).await
        }
        PanelCommand::Send { line } => send_raw(&settings, &line.join(" ")).await,
        PanelCommand::StreamUrl => {
            let endpoints = DeviceEndpoints::new(&settings.device_url)
                .with_context(|| format!("invalid device url '{}'", settings.device_url))?;
            println!("{}", endpoints.stream_url(Utc::now().timestamp_millis()));
            Ok(())
        }
        PanelCommand::Interactive => interactive(&settings).await,
    }
}

fn connect(settings: &Settings) -> Result<ControlPanel<DeviceClient>> {
    ControlPanel::connect(&settings.device_url, settings.request_timeout())
        .context("failed to set up control panel")
}

async fn show(settings: &Settings) -> Result<()> {
    let mut panel = connect(settings)?;
    let mut board = ControlBoard::new();
    panel
        .start(&mut board)
        .await
        .context("device configuration unavailable")?;
    print_board(&board);
    Ok(())
}

async fn run_single_event(settings: &Settings, event: ControlEvent) -> Result<()> {
    let mut panel = connect(settings)?;
    let mut board = ControlBoard::new();
    if let Err(err) = panel.start(&mut board).await {
        warn!(error = %err, "panel: continuing without device configuration");
    }

    let control = event.control().to_string();
    board.record_user_event(&event);
    match panel.handle_event(&mut board, event) {
        EventOutcome::Dispatched { command, handle } => {
            handle.await.context("dispatch task failed")?;
            println!("{command}");
            Ok(())
        }
        EventOutcome::StreamReloaded(url) => {
            println!("{url}");
            Ok(())
        }
        EventOutcome::Previewed | EventOutcome::Ignored => {
            bail!("control `{control}` does not produce a device command for this action")
        }
    }
}

async fn send_raw(settings: &Settings, line: &str) -> Result<()> {
    let command = Command::from_str(line).with_context(|| format!("invalid command '{line}'"))?;
    let endpoints = DeviceEndpoints::new(&settings.device_url)
        .with_context(|| format!("invalid device url '{}'", settings.device_url))?;
    let http = build_http_client(settings.request_timeout())?;
    let device = DeviceClient::new(http, endpoints);
    device
        .dispatch(&command)
        .await
        .with_context(|| format!("device did not accept '{command}'"))?;
    println!("{command}");
    Ok(())
}

async fn interactive(settings: &Settings) -> Result<()> {
    let mut panel = connect(settings)?;
    let mut board = ControlBoard::new();
    if let Err(err) = panel.start(&mut board).await {
        warn!(error = %err, "panel: continuing without device configuration");
    }
    print_board(&board);

    let mut pending = Vec::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let event = match parse_event_line(line) {
            Ok(event) => event,
            Err(err) => {
                eprintln!("{err}");
                continue;
            }
        };
        board.record_user_event(&event);
        match panel.handle_event(&mut board, event) {
            EventOutcome::Dispatched { command, handle } => {
                println!("-> {command}");
                pending.push(handle);
            }
            EventOutcome::StreamReloaded(url) => println!("stream {url}"),
            EventOutcome::Previewed => {}
            EventOutcome::Ignored => println!("(no command)"),
        }
    }

    for handle in pending {
        handle.await.context("dispatch task failed")?;
    }
    Ok(())
}

fn print_board(board: &ControlBoard) {
    for (id, state) in board.controls() {
        match (&state.value, state.checked) {
            (Some(value), _) => println!("{id:<16} {value}"),
            (None, Some(checked)) => {
                println!("{id:<16} [{}]", if checked { "x" } else { " " })
            }
            (None, None) => println!("{id:<16} -"),
        }
    }
    for (id, text) in board.labels() {
        println!("{id:<16} ({text})");
    }
}

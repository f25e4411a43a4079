use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use coach_client::config::{
    ClientConfig, DEFAULT_BET_AMOUNT, DEFAULT_BUY_IN, DEFAULT_SERVER_URL, DEFAULT_TIMEOUT_SECS,
};
use tracing_subscriber::EnvFilter;

mod cards;
mod client;
mod tui;

#[derive(Parser)]
#[command(name = "coach")]
#[command(about = "Play a hand against the coaching server's bots", long_about = None)]
struct Cli {
    /// Game server URL
    #[arg(short, long, default_value = DEFAULT_SERVER_URL)]
    server: String,

    /// Attach to an existing game instead of starting a new one
    #[arg(short, long)]
    game: Option<String>,

    /// Amount sent with Bet/Raise when none is typed
    #[arg(short, long, default_value_t = DEFAULT_BET_AMOUNT)]
    bet: u32,

    /// Chips requested by a buy-in
    #[arg(long, default_value_t = DEFAULT_BUY_IN)]
    buy_in: u32,

    /// Per-request timeout in seconds (0 disables it)
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,

    /// Write logs to this file (filtered by RUST_LOG, default "info")
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Check that the server is up and exit
    #[arg(long)]
    health: bool,
}

impl Cli {
    fn client_config(&self) -> ClientConfig {
        ClientConfig {
            server_url: self.server.clone(),
            bet_amount: self.bet,
            buy_in: self.buy_in,
            request_timeout: (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs)),
        }
    }
}

/// Initialise tracing into `path`. The terminal belongs to the TUI, so logs
/// never go to stdout.
fn init_tracing(path: &Path) -> std::io::Result<()> {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Some(path) = &cli.log_file
        && let Err(e) = init_tracing(path)
    {
        eprintln!("Cannot open log file {}: {}", path.display(), e);
    }

    let config = cli.client_config();

    if cli.health {
        if let Err(e) = client::print_health(&config).await {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
        return;
    }

    match &cli.game {
        Some(game) => println!("Attaching to game '{}' on {}...", game, config.base_url()),
        None => println!("Starting a new game on {}...", config.base_url()),
    }

    if let Err(e) = client::start_client(config, cli.game).await {
        eprintln!("Error: {}", e);
    }
}

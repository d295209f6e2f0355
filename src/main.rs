// Loop departure board: web server or console LED board.

use clap::{Parser, Subcommand};
use env_logger::Env;
use log::info;
use std::sync::Arc;
use std::time::Duration;

use loop_board::clock::SystemClock;
use loop_board::config::Config;
use loop_board::upstream::HttpUpstream;
use loop_board::{console, server, Board};

#[derive(Debug, Parser)]
#[command(name = "loop-board", version, about = "CTA, Metra and weather departure board")]
struct Cli {
    /// Log at debug level
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the departures page, the LED page and the JSON API (default)
    Serve,
    /// Draw the LED board in the terminal
    Board {
        /// Print a single frame and exit
        #[arg(long)]
        once: bool,
        /// Seconds between frames
        #[arg(long, default_value_t = 30)]
        interval: u64,
    },
}

fn main() -> std::io::Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(Env::default().default_filter_or(if cli.debug { "debug" } else { "info" }))
        .format_timestamp_secs()
        .init();

    info!("{} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    let config = Config::from_env();
    let board = Board::new(config, Arc::new(HttpUpstream::default()), Arc::new(SystemClock));

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            info!("📡 Fetching initial board...");
            let initial = board.snapshot();
            actix_web::rt::System::new().block_on(server::run_server(Arc::new(board), initial))
        }
        Command::Board { once, interval } => console::run(&board, Duration::from_secs(interval), once),
    }
}

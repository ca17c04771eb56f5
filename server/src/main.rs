use clap::Parser;
use log::info;
use server::catalog::PuzzleCatalog;
use server::network::Server;
use server::score_store::ScoreStore;
use std::path::PathBuf;
use tokio::time::Duration;

/// Main-method of the application.
/// Parses command-line arguments, loads puzzle content and stored scores,
/// then runs the game server until Ctrl+C.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Command-line flags
    #[derive(Parser, Debug)]
    #[clap(author, version, about)]
    struct Args {
        /// Address to bind the UDP socket to
        #[clap(short = 'H', long, default_value = "127.0.0.1")]
        host: String,
        /// UDP port to listen on
        #[clap(short, long, default_value = "8080")]
        port: u16,
        /// Leaderboard sync rate (pushes per second)
        #[clap(short, long, default_value = "4")]
        sync_rate: u32,
        /// Maximum number of concurrent sessions
        #[clap(short, long, default_value = "32")]
        max_sessions: usize,
        /// Puzzle content file (JSON); omitted, the built-in set is used
        #[clap(short, long)]
        content: Option<PathBuf>,
        /// Score journal path
        #[clap(long, default_value = "scores.jsonl")]
        score_file: PathBuf,
        /// Keep scores in memory only, without a journal
        #[clap(long)]
        ephemeral: bool,
    }

    // Initialize logging
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    // Parse command line arguments
    let args = Args::parse();

    let catalog = match &args.content {
        Some(path) => PuzzleCatalog::load(path)?,
        None => PuzzleCatalog::builtin()?,
    };
    info!(
        "Loaded {} categories ({} puzzles) and {} words",
        catalog.category_count(),
        catalog.puzzle_count(),
        catalog.word_count()
    );

    let store = if args.ephemeral {
        ScoreStore::in_memory()
    } else {
        ScoreStore::open(&args.score_file).await?
    };

    let address = format!("{}:{}", args.host, args.port);
    let sync_interval = Duration::from_millis((1000 / args.sync_rate.max(1) as u64).max(1));

    let mut server = Server::new(&address, catalog, store, sync_interval, args.max_sessions).await?;

    println!("Game server running on {}", address);

    // Handle shutdown gracefully
    tokio::select! {
        result = server.run() => {
            if let Err(e) = result {
                eprintln!("Server error: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            println!("Ctrl+C received, shutting down");
        }
    }

    Ok(())
}

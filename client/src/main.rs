use clap::Parser;
use client::commands::{self, Command};
use client::network::Connection;
use client::view;
use log::info;
use shared::Packet;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server address to connect to
    #[arg(short = 's', long, default_value = "127.0.0.1:8080")]
    server: String,

    /// Display name on the leaderboard (omitted, you play as a guest)
    #[arg(short = 'n', long)]
    name: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    info!("Starting client...");
    info!("Connecting to: {}", args.server);

    let mut connection = Connection::connect(&args.server, args.name).await?;

    println!("Playing as '{}'", connection.identity());
    println!("{}", commands::help_text());

    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    loop {
        tokio::select! {
            packet = connection.recv() => {
                match packet {
                    Some(Packet::View { view: next }) => {
                        println!("\n{}", view::render(&next));
                    }
                    Some(Packet::Disconnected { reason }) => {
                        println!("Disconnected by server: {}", reason);
                        break;
                    }
                    Some(_) => {}
                    None => {
                        println!("Connection closed");
                        break;
                    }
                }
            },

            line = lines.next_line() => {
                match line? {
                    Some(line) => match commands::parse(&line) {
                        Some(Command::Action(action)) => {
                            connection.send_action(action).await?;
                        }
                        Some(Command::Help) => {
                            println!("{}", commands::help_text());
                        }
                        Some(Command::Quit) => {
                            connection.disconnect().await;
                            break;
                        }
                        None => {}
                    },
                    None => {
                        // stdin closed
                        connection.disconnect().await;
                        break;
                    }
                }
            },
        }
    }

    Ok(())
}

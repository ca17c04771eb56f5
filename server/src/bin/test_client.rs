use bincode::{deserialize, serialize};
use shared::{now_millis, Packet, PlayerAction, SessionView, PROTOCOL_VERSION};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::sleep;

async fn send_packet(
    socket: &UdpSocket,
    addr: SocketAddr,
    packet: &Packet,
) -> Result<(), Box<dyn std::error::Error>> {
    let data = serialize(packet)?;
    socket.send_to(&data, addr).await?;
    Ok(())
}

async fn send_action(
    socket: &UdpSocket,
    addr: SocketAddr,
    action: PlayerAction,
) -> Result<(), Box<dyn std::error::Error>> {
    send_packet(socket, addr, &Packet::Action { action }).await
}

async fn recv_packet(socket: &UdpSocket) -> Result<Packet, Box<dyn std::error::Error>> {
    let mut buf = [0u8; 2048];
    let (len, _) = socket.recv_from(&mut buf).await?;
    Ok(deserialize::<Packet>(&buf[0..len])?)
}

fn report_view(packet: Packet) {
    match packet {
        Packet::View { view } => match view {
            SessionView::Home {
                identity,
                score,
                categories,
                ..
            } => {
                println!(
                    "  Home: '{}' with score {}, categories {:?}",
                    identity, score, categories
                );
            }
            SessionView::Category {
                category,
                clues,
                clues_total,
                lives_left,
                score,
                notice,
            } => {
                println!(
                    "  Category '{}': {}/{} clues shown, {} lives, score {}, notice {:?}",
                    category,
                    clues.len(),
                    clues_total,
                    lives_left,
                    score,
                    notice
                );
                for clue in clues {
                    println!("    clue: {}", clue);
                }
            }
            SessionView::Word {
                masked,
                definitions,
                attempt,
                score,
                notice,
            } => {
                println!(
                    "  Word '{}': attempt {}, {} definitions visible, score {}, notice {:?}",
                    masked,
                    attempt,
                    definitions.len(),
                    score,
                    notice
                );
            }
            SessionView::Eliminated { final_score, answer } => {
                println!(
                    "  Eliminated with final score {}, answer was '{}'",
                    final_score, answer
                );
            }
            SessionView::Leaderboard { entries, score } => {
                println!("  Leaderboard (own score {}):", score);
                for (i, entry) in entries.iter().enumerate() {
                    println!("    {}. {} - {}", i + 1, entry.member, entry.score);
                }
            }
        },
        other => println!("  Unexpected packet: {:?}", other),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Create local socket
    let socket = UdpSocket::bind("0.0.0.0:0").await?;
    println!("Client socket bound to {}", socket.local_addr()?);

    // Server address
    let server_addr = "127.0.0.1:8080".parse::<SocketAddr>()?;

    // Connect handshake
    println!("Sending connect to {}", server_addr);
    send_packet(
        &socket,
        server_addr,
        &Packet::Connect {
            client_version: PROTOCOL_VERSION,
            display_name: Some("SmokeBot".to_string()),
        },
    )
    .await?;

    match recv_packet(&socket).await? {
        Packet::Connected {
            session_id,
            identity,
        } => {
            println!("Connected as '{}' (session {})", identity, session_id);
        }
        other => {
            println!("Expected Connected but got: {:?}", other);
            return Ok(());
        }
    }

    // The home view follows the handshake
    let categories = match recv_packet(&socket).await? {
        Packet::View {
            view: SessionView::Home { categories, .. },
        } => categories,
        other => {
            println!("Expected home view but got: {:?}", other);
            return Ok(());
        }
    };

    let category = match categories.first() {
        Some(name) => name.clone(),
        None => {
            println!("Server has no categories, stopping");
            return Ok(());
        }
    };

    // Walk a category round: one clue, a reveal, a wrong guess
    println!("Starting category '{}'", category);
    send_action(&socket, server_addr, PlayerAction::StartCategory { category }).await?;
    report_view(recv_packet(&socket).await?);
    sleep(Duration::from_millis(300)).await;

    println!("Revealing another clue");
    send_action(&socket, server_addr, PlayerAction::RevealClue).await?;
    report_view(recv_packet(&socket).await?);
    sleep(Duration::from_millis(300)).await;

    println!("Guessing wrong on purpose");
    send_action(
        &socket,
        server_addr,
        PlayerAction::Guess {
            text: "definitely not it".to_string(),
        },
    )
    .await?;
    report_view(recv_packet(&socket).await?);
    sleep(Duration::from_millis(300)).await;

    println!("Checking the leaderboard");
    send_action(&socket, server_addr, PlayerAction::OpenLeaderboard).await?;
    report_view(recv_packet(&socket).await?);
    sleep(Duration::from_millis(300)).await;

    println!("Back home, then a word round");
    send_action(&socket, server_addr, PlayerAction::GoHome).await?;
    report_view(recv_packet(&socket).await?);

    send_action(&socket, server_addr, PlayerAction::StartWord).await?;
    report_view(recv_packet(&socket).await?);
    sleep(Duration::from_millis(300)).await;

    println!("Guessing a word blind");
    send_action(
        &socket,
        server_addr,
        PlayerAction::Guess {
            text: "zephyr".to_string(),
        },
    )
    .await?;
    report_view(recv_packet(&socket).await?);

    // Keep the session alive for a moment, then leave cleanly
    send_packet(
        &socket,
        server_addr,
        &Packet::Heartbeat {
            timestamp: now_millis(),
        },
    )
    .await?;
    sleep(Duration::from_millis(300)).await;

    println!("Sending disconnect");
    send_packet(&socket, server_addr, &Packet::Disconnect).await?;

    println!("Test client finished");
    Ok(())
}

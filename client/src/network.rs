//! Client connection management over UDP

use bincode::{deserialize, serialize};
use log::{error, info, warn};
use shared::{now_millis, Packet, PlayerAction, PROTOCOL_VERSION};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tokio::time::{interval, timeout};

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Live connection to the game server.
///
/// Owns the UDP socket and two background tasks: a receiver that pushes
/// server packets onto a channel, and a heartbeat that keeps the session
/// from timing out while the player is thinking.
pub struct Connection {
    socket: Arc<UdpSocket>,
    server_addr: SocketAddr,
    packet_rx: mpsc::UnboundedReceiver<Packet>,
    session_id: u32,
    identity: String,
}

impl Connection {
    /// Performs the connect handshake, then spawns the background tasks.
    pub async fn connect(
        server_addr: &str,
        display_name: Option<String>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let socket = Arc::new(UdpSocket::bind("0.0.0.0:0").await?);
        let server_addr: SocketAddr = server_addr.parse()?;

        info!("Connecting to server at {}...", server_addr);

        let packet = Packet::Connect {
            client_version: PROTOCOL_VERSION,
            display_name,
        };
        let data = serialize(&packet)?;
        socket.send_to(&data, server_addr).await?;

        let mut buffer = [0u8; 2048];
        let (session_id, identity) = loop {
            let (len, addr) = timeout(CONNECT_TIMEOUT, socket.recv_from(&mut buffer)).await??;
            if addr != server_addr {
                continue;
            }

            match deserialize::<Packet>(&buffer[0..len]) {
                Ok(Packet::Connected {
                    session_id,
                    identity,
                }) => break (session_id, identity),
                Ok(Packet::Disconnected { reason }) => {
                    return Err(format!("Server refused connection: {}", reason).into());
                }
                Ok(_) => continue,
                Err(e) => {
                    warn!("Failed to deserialize handshake packet: {}", e);
                    continue;
                }
            }
        };

        info!("Connected as '{}' (session {})", identity, session_id);

        let (packet_tx, packet_rx) = mpsc::unbounded_channel();
        Self::spawn_receiver(Arc::clone(&socket), server_addr, packet_tx);
        Self::spawn_heartbeat(Arc::clone(&socket), server_addr);

        Ok(Connection {
            socket,
            server_addr,
            packet_rx,
            session_id,
            identity,
        })
    }

    fn spawn_receiver(
        socket: Arc<UdpSocket>,
        server_addr: SocketAddr,
        packet_tx: mpsc::UnboundedSender<Packet>,
    ) {
        tokio::spawn(async move {
            let mut buffer = [0u8; 2048];

            loop {
                match socket.recv_from(&mut buffer).await {
                    Ok((len, addr)) => {
                        // Only the server we connected to is ours to hear.
                        if addr != server_addr {
                            continue;
                        }

                        match deserialize::<Packet>(&buffer[0..len]) {
                            Ok(packet) => {
                                if packet_tx.send(packet).is_err() {
                                    break;
                                }
                            }
                            Err(e) => warn!("Failed to deserialize packet: {}", e),
                        }
                    }
                    Err(e) => {
                        error!("Error receiving packet: {}", e);
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    }
                }
            }
        });
    }

    fn spawn_heartbeat(socket: Arc<UdpSocket>, server_addr: SocketAddr) {
        tokio::spawn(async move {
            let mut heartbeat_interval = interval(HEARTBEAT_INTERVAL);
            // The first tick fires immediately
            heartbeat_interval.tick().await;

            loop {
                heartbeat_interval.tick().await;

                let packet = Packet::Heartbeat {
                    timestamp: now_millis(),
                };
                let data = match serialize(&packet) {
                    Ok(data) => data,
                    Err(e) => {
                        error!("Failed to serialize heartbeat: {}", e);
                        continue;
                    }
                };

                if let Err(e) = socket.send_to(&data, server_addr).await {
                    error!("Failed to send heartbeat: {}", e);
                }
            }
        });
    }

    pub async fn send_action(&self, action: PlayerAction) -> Result<(), Box<dyn std::error::Error>> {
        self.send_packet(&Packet::Action { action }).await
    }

    async fn send_packet(&self, packet: &Packet) -> Result<(), Box<dyn std::error::Error>> {
        let data = serialize(packet)?;
        self.socket.send_to(&data, self.server_addr).await?;
        Ok(())
    }

    /// Next packet from the server; `None` when the link is gone.
    pub async fn recv(&mut self) -> Option<Packet> {
        self.packet_rx.recv().await
    }

    pub async fn disconnect(&self) {
        if let Err(e) = self.send_packet(&Packet::Disconnect).await {
            error!("Failed to send disconnect: {}", e);
        }
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn session_id(&self) -> u32 {
        self.session_id
    }
}

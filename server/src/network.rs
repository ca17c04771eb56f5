//! Server network layer handling UDP communications and session coordination

use crate::broadcaster::Broadcaster;
use crate::catalog::PuzzleCatalog;
use crate::identity::resolve_identity;
use crate::leaderboard::LeaderboardCache;
use crate::score_store::ScoreStore;
use crate::session::GameSession;
use crate::session_manager::SessionManager;
use bincode::{deserialize, serialize};
use log::{debug, error, info, warn};
use rand::thread_rng;
use shared::{Packet, PlayerAction, ScoreUpdate, SessionView, LEADERBOARD_SIZE, PROTOCOL_VERSION};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::sync::{mpsc, RwLock};
use tokio::time::interval;

/// Sessions that stay silent this long are swept.
pub const SESSION_TIMEOUT: Duration = Duration::from_secs(30);
const TIMEOUT_SWEEP_INTERVAL: Duration = Duration::from_secs(5);

/// Messages sent from network tasks to main server loop
#[derive(Debug)]
pub enum ServerMessage {
    PacketReceived {
        packet: Packet,
        addr: SocketAddr,
    },
    SessionTimeout {
        session_id: u32,
    },
    #[allow(dead_code)]
    Shutdown,
}

/// Messages sent from the main loop to the network sender task
#[derive(Debug)]
pub enum OutboundMessage {
    SendPacket { packet: Packet, addr: SocketAddr },
}

/// Main server coordinating networking, game sessions and the shared
/// leaderboard.
pub struct Server {
    socket: Arc<UdpSocket>,
    sessions: Arc<RwLock<SessionManager>>,
    catalog: Arc<PuzzleCatalog>,
    store: ScoreStore,
    broadcaster: Broadcaster,
    sync_interval: Duration,
    tick: u64,

    // Communication channels
    server_tx: mpsc::UnboundedSender<ServerMessage>,
    server_rx: mpsc::UnboundedReceiver<ServerMessage>,
    outbound_tx: mpsc::UnboundedSender<OutboundMessage>,
    outbound_rx: mpsc::UnboundedReceiver<OutboundMessage>,
}

impl Server {
    pub async fn new(
        addr: &str,
        catalog: PuzzleCatalog,
        store: ScoreStore,
        sync_interval: Duration,
        max_sessions: usize,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let socket = Arc::new(UdpSocket::bind(addr).await?);
        info!("Server listening on {}", socket.local_addr()?);

        let (server_tx, server_rx) = mpsc::unbounded_channel();
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();

        Ok(Server {
            socket,
            sessions: Arc::new(RwLock::new(SessionManager::new(max_sessions))),
            catalog: Arc::new(catalog),
            store,
            broadcaster: Broadcaster::new(),
            sync_interval,
            tick: 0,
            server_tx,
            server_rx,
            outbound_tx,
            outbound_rx,
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Spawns task that listens for inbound datagrams
    async fn spawn_network_receiver(&self) {
        let socket = Arc::clone(&self.socket);
        let server_tx = self.server_tx.clone();

        tokio::spawn(async move {
            let mut buffer = [0u8; 2048];

            loop {
                match socket.recv_from(&mut buffer).await {
                    Ok((len, addr)) => match deserialize::<Packet>(&buffer[0..len]) {
                        Ok(packet) => {
                            if let Err(e) =
                                server_tx.send(ServerMessage::PacketReceived { packet, addr })
                            {
                                error!("Failed to send packet to main loop: {}", e);
                                break;
                            }
                        }
                        // Anyone can lob bytes at a UDP port; drop and move on.
                        Err(_) => {
                            warn!("Dropping undecodable datagram ({} bytes) from {}", len, addr)
                        }
                    },
                    Err(e) => {
                        error!("Error receiving packet: {}", e);
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    }
                }
            }
        });
    }

    /// Spawns task that drains the outbound packet queue
    async fn spawn_network_sender(&mut self) {
        let socket = Arc::clone(&self.socket);
        let mut outbound_rx = std::mem::replace(&mut self.outbound_rx, mpsc::unbounded_channel().1);

        tokio::spawn(async move {
            while let Some(message) = outbound_rx.recv().await {
                match message {
                    OutboundMessage::SendPacket { packet, addr } => {
                        if let Err(e) = Self::send_packet_impl(&socket, &packet, addr).await {
                            error!("Failed to send packet to {}: {}", addr, e);
                        }
                    }
                }
            }
        });
    }

    /// Spawns task that sweeps idle sessions
    async fn spawn_timeout_checker(&self) {
        let sessions = Arc::clone(&self.sessions);
        let server_tx = self.server_tx.clone();

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(TIMEOUT_SWEEP_INTERVAL);

            loop {
                interval.tick().await;

                let timed_out = {
                    let mut sessions_guard = sessions.write().await;
                    sessions_guard.check_timeouts(SESSION_TIMEOUT)
                };

                for session_id in timed_out {
                    if let Err(e) = server_tx.send(ServerMessage::SessionTimeout { session_id }) {
                        error!("Failed to report stale session {}: {}", session_id, e);
                        break;
                    }
                }
            }
        });
    }

    async fn send_packet_impl(
        socket: &UdpSocket,
        packet: &Packet,
        addr: SocketAddr,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let data = serialize(packet)?;
        socket.send_to(&data, addr).await?;
        Ok(())
    }

    async fn send_packet(&self, packet: &Packet, addr: SocketAddr) {
        if let Err(e) = self.outbound_tx.send(OutboundMessage::SendPacket {
            packet: packet.clone(),
            addr,
        }) {
            error!("Failed to queue packet for sending: {}", e);
        }
    }

    /// Processes incoming packets and advances session state
    async fn handle_packet(&mut self, packet: Packet, addr: SocketAddr) {
        match packet {
            Packet::Connect {
                client_version,
                display_name,
            } => {
                self.handle_connect(client_version, display_name, addr)
                    .await;
            }

            Packet::Action { action } => {
                self.handle_action(action, addr).await;
            }

            Packet::Heartbeat { .. } => {
                let mut sessions = self.sessions.write().await;
                if let Some(session_id) = sessions.find_session_by_addr(addr) {
                    if let Some(session) = sessions.get_mut(session_id) {
                        session.touch();
                    }
                }
            }

            Packet::Disconnect => {
                let session_id = {
                    let sessions = self.sessions.read().await;
                    sessions.find_session_by_addr(addr)
                };

                if let Some(session_id) = session_id {
                    let mut sessions = self.sessions.write().await;
                    sessions.remove_session(&session_id);
                }
            }

            _ => {
                warn!("Unexpected packet type from client at {}", addr);
            }
        }
    }

    async fn handle_connect(
        &mut self,
        client_version: u32,
        display_name: Option<String>,
        addr: SocketAddr,
    ) {
        info!(
            "Client connecting from {} (version: {})",
            addr, client_version
        );

        if client_version != PROTOCOL_VERSION {
            let response = Packet::Disconnected {
                reason: format!("Protocol version mismatch: server speaks {}", PROTOCOL_VERSION),
            };
            self.send_packet(&response, addr).await;
            return;
        }

        // Remove existing session if present; the reconnect wins.
        let existing_session_id = {
            let sessions = self.sessions.read().await;
            sessions.find_session_by_addr(addr)
        };

        if let Some(existing_id) = existing_session_id {
            info!("Replacing existing session {} from {}", existing_id, addr);
            let mut sessions = self.sessions.write().await;
            sessions.remove_session(&existing_id);
        }

        let identity = resolve_identity(display_name.as_deref(), &mut thread_rng());
        let game = GameSession::new(identity.clone());
        // Late subscribers see no backlog, so the cache starts from the
        // store's current standings.
        let leaderboard = LeaderboardCache::seeded(self.store.top_k(LEADERBOARD_SIZE));
        let score_feed = self.broadcaster.subscribe();

        let session_id = {
            let mut sessions = self.sessions.write().await;
            sessions.add_session(addr, game, leaderboard, score_feed)
        };

        if let Some(session_id) = session_id {
            let response = Packet::Connected {
                session_id,
                identity,
            };
            self.send_packet(&response, addr).await;

            // First view lands the client on the home screen.
            let view = {
                let sessions = self.sessions.read().await;
                sessions
                    .get(session_id)
                    .map(|session| session.game.view(&self.catalog, &session.leaderboard))
            };
            if let Some(view) = view {
                self.send_packet(&Packet::View { view }, addr).await;
            }
        } else {
            let response = Packet::Disconnected {
                reason: "Server full".to_string(),
            };
            self.send_packet(&response, addr).await;
        }
    }

    async fn handle_action(&mut self, action: PlayerAction, addr: SocketAddr) {
        let session_id = {
            let sessions = self.sessions.read().await;
            sessions.find_session_by_addr(addr)
        };

        let session_id = match session_id {
            Some(id) => id,
            None => {
                let response = Packet::Disconnected {
                    reason: "No active session".to_string(),
                };
                self.send_packet(&response, addr).await;
                return;
            }
        };

        let outcome = {
            let mut sessions = self.sessions.write().await;
            match sessions.get_mut(session_id) {
                Some(session) => {
                    session.touch();
                    Some(session.game.apply(action, &self.catalog, &session.leaderboard))
                }
                None => None,
            }
        };

        let outcome = match outcome {
            Some(outcome) => outcome,
            None => return,
        };

        // Persist and fan out before answering, so the action sequence for
        // one player is fully settled when the next packet is taken.
        if let Some(update) = outcome.scoring {
            self.commit_score(update).await;
        }

        self.send_packet(&Packet::View { view: outcome.view }, addr)
            .await;
    }

    /// Stores a score and fans it out to the other sessions.
    ///
    /// When the store rejects the write the update is not published either,
    /// so other sessions never see a score that was not persisted. The
    /// acting player still sees their own in-session score.
    async fn commit_score(&mut self, update: ScoreUpdate) {
        match self.store.upsert(&update.member, update.score).await {
            Ok(()) => self.broadcaster.publish(update),
            Err(e) => warn!("Score for '{}' not saved: {}", update.member, e),
        }
    }

    /// Drains score feeds and pushes fresh standings to players who are
    /// watching the leaderboard.
    async fn sync_leaderboards(&mut self) {
        let mut refreshed: Vec<(SocketAddr, SessionView)> = Vec::new();

        {
            let mut sessions = self.sessions.write().await;
            for session in sessions.sessions_mut() {
                let drain = session.drain_score_feed();

                if drain.lagged {
                    session
                        .leaderboard
                        .reseed(self.store.top_k(LEADERBOARD_SIZE));
                }

                if (drain.changed || drain.lagged) && session.game.on_leaderboard() {
                    refreshed.push((
                        session.addr,
                        session.game.view(&self.catalog, &session.leaderboard),
                    ));
                }
            }
        }

        for (addr, view) in refreshed {
            self.send_packet(&Packet::View { view }, addr).await;
        }
    }

    /// Main server loop coordinating all operations
    pub async fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        // Initialize concurrent tasks
        self.spawn_network_receiver().await;
        self.spawn_network_sender().await;
        self.spawn_timeout_checker().await;

        let mut sync_interval = interval(self.sync_interval);

        info!("Server started successfully");

        loop {
            tokio::select! {
                // Handle network events
                message = self.server_rx.recv() => {
                    match message {
                        Some(ServerMessage::PacketReceived { packet, addr }) => {
                            self.handle_packet(packet, addr).await;
                        },
                        Some(ServerMessage::SessionTimeout { session_id }) => {
                            info!("Session {} timed out", session_id);
                        },
                        Some(ServerMessage::Shutdown) | None => {
                            info!("Server shutting down");
                            break;
                        }
                    }
                },

                // Push leaderboard changes to watching sessions
                _ = sync_interval.tick() => {
                    self.sync_leaderboards().await;
                    self.tick += 1;

                    // Periodic monitoring
                    if self.tick % 120 == 0 {
                        let session_count = {
                            let sessions = self.sessions.read().await;
                            sessions.len()
                        };

                        if session_count > 0 {
                            debug!("Tick {}: {} sessions, {} members stored, {} feeds",
                                   self.tick, session_count, self.store.len(),
                                   self.broadcaster.subscriber_count());
                        }
                    }
                },
            }
        }

        Ok(())
    }
}

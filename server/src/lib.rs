//! # Game Server Library
//!
//! This library provides the authoritative server implementation for the
//! multiplayer guessing game. It owns every game session, scores guesses,
//! persists results, and keeps a shared leaderboard synchronized across all
//! connected players.
//!
//! ## Core Responsibilities
//!
//! ### Authoritative Sessions
//! Each connected player gets a server-side session state machine. All rule
//! decisions are made here: which puzzle is served, what a guess is worth,
//! when a life is lost and when a session ends. Clients only render the
//! views the server sends back.
//!
//! ### Score Persistence
//! Scores are written to an append-only journal before they are applied in
//! memory or announced to anyone else. On startup the journal is replayed,
//! so standings survive restarts.
//!
//! ### Leaderboard Fan-Out
//! Every confirmed score is published on an in-process feed. Sessions drain
//! the feed into their own leaderboard cache, and players watching the
//! standings receive refreshed views without polling.
//!
//! ## Architecture Design
//!
//! ### Single-Threaded Event Loop
//! The server processes all packets and game steps sequentially in one main
//! loop. This eliminates race conditions between guesses and keeps scoring
//! deterministic; helper tasks only move packets and sweep idle sessions.
//!
//! ### UDP-Based Communication
//! Clients talk to the server over plain UDP datagrams. Every action is
//! answered with a full view of the session, so a lost packet is corrected
//! by the next exchange rather than tracked individually.
//!
//! ### Write-Ahead Scoring
//! A score reaches the journal first, the in-memory table second, and the
//! broadcast feed last. A failed write stops the sequence, so other players
//! never see a score the store does not hold.
//!
//! ## Module Organization
//!
//! ### Catalog Module (`catalog`)
//! Loads and validates puzzle content:
//! - Category puzzles with ordered clues
//! - Vocabulary words with two definitions each
//! - Random selection that avoids serving the same puzzle twice in a row
//!
//! ### Session Module (`session`)
//! Contains the per-player game state machine:
//! - Home, category round, word round, elimination and leaderboard screens
//! - Guess checking, clue reveals and letter reveals
//! - Scoring rules rewarding early correct guesses
//!
//! ### Session Manager Module (`session_manager`)
//! Manages connected players and their associated state:
//! - Session tracking and ID assignment
//! - Address lookup for packet routing
//! - Idle timeout detection and cleanup
//!
//! ### Score Store Module (`score_store`)
//! Durable storage for member scores:
//! - JSON-lines journal with replay on startup
//! - Upsert semantics keyed by member identity
//! - Top-k queries for seeding leaderboards
//!
//! ### Broadcaster and Leaderboard Modules (`broadcaster`, `leaderboard`)
//! Distribute confirmed scores between sessions:
//! - Broadcast channel carrying score updates
//! - Per-session cache of the current top standings
//! - Lag detection with reseed from the store
//!
//! ### Network Module (`network`)
//! Owns the socket and the wire protocol:
//! - Datagram receive and send tasks around the main loop
//! - Connect handshake with version check and capacity limit
//! - Heartbeat tracking and session timeout sweeps
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::catalog::PuzzleCatalog;
//! use server::network::Server;
//! use server::score_store::ScoreStore;
//! use std::path::Path;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let catalog = PuzzleCatalog::builtin()?;
//!     let store = ScoreStore::open(Path::new("scores.jsonl")).await?;
//!
//!     // Bind the server with a 4Hz leaderboard sync and room for 32 players
//!     let mut server = Server::new(
//!         "127.0.0.1:8080",
//!         catalog,
//!         store,
//!         Duration::from_millis(250),
//!         32,
//!     ).await?;
//!
//!     // Run the main loop which:
//!     // - Accepts connections and assigns identities
//!     // - Applies player actions to their sessions
//!     // - Persists and fans out confirmed scores
//!     // - Pushes leaderboard refreshes to watching players
//!     // - Drops sessions that stop sending heartbeats
//!     server.run().await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! Internally the work is split across a handful of async tasks:
//! - **Network Receiver**: Decodes inbound datagrams for the main loop
//! - **Network Sender**: Drains the outbound packet queue
//! - **Timeout Checker**: Sweeps sessions that have gone silent
//! - **Main Loop**: Applies actions, commits scores, and syncs leaderboards

pub mod broadcaster;
pub mod catalog;
pub mod identity;
pub mod leaderboard;
pub mod network;
pub mod score_store;
pub mod session;
pub mod session_manager;

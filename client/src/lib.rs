//! # Game Client Library
//!
//! This library provides the terminal client for the multiplayer guessing
//! game. It connects to a game server over UDP, turns typed commands into
//! player actions, and renders the views the server sends back.
//!
//! ## Architecture Overview
//!
//! The client is deliberately thin. All game rules live on the server; the
//! client's whole job is to move text in both directions:
//!
//! ### Server-Rendered State
//! Every action is answered with a complete view of the session, so the
//! client never tracks game state of its own. A lost packet costs one
//! response, not consistency, and the next exchange repairs the screen.
//!
//! ### Background Link Maintenance
//! A receiver task forwards server packets onto a channel while a heartbeat
//! task keeps the session alive during long pauses. The main loop just
//! selects between the channel and stdin.
//!
//! ## Module Organization
//!
//! ### Commands Module (`commands`)
//! Parses terminal input into commands:
//! - Keyword commands with short aliases (`cat`, `board`, `again`)
//! - Bare text treated as a guess
//! - Help and quit handling
//!
//! ### Network Module (`network`)
//! Speaks the wire protocol with the server:
//! - Connect handshake over a dedicated UDP socket
//! - Packet encode and decode on the way through
//! - Heartbeats and server-address filtering
//!
//! ### View Module (`view`)
//! Renders server views as terminal text:
//! - Home, round, elimination and leaderboard screens
//! - Notices from the previous action
//! - Current guess value hints
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use client::commands::{self, Command};
//! use client::network::Connection;
//! use client::view;
//! use shared::Packet;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut connection = Connection::connect("127.0.0.1:8080", Some("Ada".to_string())).await?;
//!
//!     if let Some(Command::Action(action)) = commands::parse("category movies") {
//!         connection.send_action(action).await?;
//!     }
//!
//!     while let Some(packet) = connection.recv().await {
//!         if let Packet::View { view: next } = packet {
//!             println!("{}", view::render(&next));
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod commands;
pub mod network;
pub mod view;

//! Player session management for the game server
//!
//! This module tracks every connected player, including:
//! - Session lifecycle (connect, disconnect, timeout)
//! - The per-session game state, leaderboard cache and score feed
//! - Connection health monitoring and automatic cleanup
//! - Session capacity enforcement and address lookup
//!
//! The manager is the single registry the network layer consults when
//! routing packets and sweeping idle connections.

use crate::broadcaster::{FeedPoll, ScoreFeed};
use crate::leaderboard::LeaderboardCache;
use crate::session::GameSession;
use log::info;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

/// One connected player and everything serving them.
///
/// Bundles the authoritative game state with the session's local
/// leaderboard cache and its subscription to the score feed, so the
/// whole unit can be created and torn down together.
pub struct PlayerSession {
    /// Unique session identifier assigned by the server
    pub id: u32,
    /// Network address for sending responses
    pub addr: SocketAddr,
    /// Last time we received any packet from this player
    pub last_seen: Instant,
    /// The player's game state machine
    pub game: GameSession,
    /// This session's view of the shared standings
    pub leaderboard: LeaderboardCache,
    /// Subscription to score updates from other sessions
    pub score_feed: ScoreFeed,
}

/// Result of draining a session's score feed into its leaderboard cache.
#[derive(Debug, Clone, Copy)]
pub struct FeedDrain {
    /// The visible standings changed
    pub changed: bool,
    /// The feed dropped updates and the cache needs reseeding
    pub lagged: bool,
}

impl PlayerSession {
    pub fn new(
        id: u32,
        addr: SocketAddr,
        game: GameSession,
        leaderboard: LeaderboardCache,
        score_feed: ScoreFeed,
    ) -> Self {
        Self {
            id,
            addr,
            last_seen: Instant::now(),
            game,
            leaderboard,
            score_feed,
        }
    }

    /// Marks the session as recently active.
    pub fn touch(&mut self) {
        self.last_seen = Instant::now();
    }

    /// Returns true if no packets have arrived within the timeout.
    pub fn is_timed_out(&self, timeout: Duration) -> bool {
        self.last_seen.elapsed() > timeout
    }

    /// Pulls every pending score update into the leaderboard cache.
    ///
    /// Reports whether the visible standings changed and whether the feed
    /// lagged; a lagged cache must be reseeded from the score store before
    /// it is shown again.
    pub fn drain_score_feed(&mut self) -> FeedDrain {
        let mut drain = FeedDrain {
            changed: false,
            lagged: false,
        };
        loop {
            match self.score_feed.try_next() {
                FeedPoll::Update(update) => {
                    if self.leaderboard.apply(&update) {
                        drain.changed = true;
                    }
                }
                FeedPoll::Lagged => {
                    drain.lagged = true;
                    // Keep draining whatever the feed retained past the gap.
                }
                FeedPoll::Empty | FeedPoll::Closed => break,
            }
        }
        drain
    }
}

/// Registry of all connected player sessions.
///
/// Enforces the server capacity limit, assigns session IDs, and supports
/// the address lookups and timeout sweeps the network layer relies on.
pub struct SessionManager {
    /// Connected sessions indexed by their unique ID
    sessions: HashMap<u32, PlayerSession>,
    /// Next available session ID for new connections
    next_session_id: u32,
    /// Maximum number of concurrent sessions allowed
    max_sessions: usize,
}

impl SessionManager {
    /// Creates an empty registry with the given capacity limit.
    /// Session IDs start from 1 and increment for each new connection.
    pub fn new(max_sessions: usize) -> Self {
        Self {
            sessions: HashMap::new(),
            next_session_id: 1,
            max_sessions,
        }
    }

    /// Attempts to register a new player session.
    ///
    /// Returns Some(session_id) on success, None when the server is at
    /// capacity. Logs the new connection for server monitoring.
    pub fn add_session(
        &mut self,
        addr: SocketAddr,
        game: GameSession,
        leaderboard: LeaderboardCache,
        score_feed: ScoreFeed,
    ) -> Option<u32> {
        if self.sessions.len() >= self.max_sessions {
            return None;
        }

        let session_id = self.next_session_id;
        self.next_session_id += 1;

        info!(
            "Session {} connected from {} as '{}'",
            session_id,
            addr,
            game.identity()
        );
        let session = PlayerSession::new(session_id, addr, game, leaderboard, score_feed);
        self.sessions.insert(session_id, session);

        Some(session_id)
    }

    /// Removes a session from the registry.
    ///
    /// Returns true if the session was found and removed, false if it was
    /// already gone. Handles both explicit disconnects and timeout cleanup.
    pub fn remove_session(&mut self, session_id: &u32) -> bool {
        if let Some(session) = self.sessions.remove(session_id) {
            info!(
                "Session {} ('{}') disconnected",
                session.id,
                session.game.identity()
            );
            true
        } else {
            false
        }
    }

    /// Finds a session ID by its network address.
    ///
    /// Used to associate incoming packets with existing sessions. Returns
    /// None if no session is connected from the given address.
    pub fn find_session_by_addr(&self, addr: SocketAddr) -> Option<u32> {
        self.sessions
            .iter()
            .find(|(_, session)| session.addr == addr)
            .map(|(id, _)| *id)
    }

    pub fn get(&self, session_id: u32) -> Option<&PlayerSession> {
        self.sessions.get(&session_id)
    }

    pub fn get_mut(&mut self, session_id: u32) -> Option<&mut PlayerSession> {
        self.sessions.get_mut(&session_id)
    }

    /// Checks for and removes timed-out sessions.
    ///
    /// Returns the removed session IDs so other systems can clean up.
    pub fn check_timeouts(&mut self, timeout: Duration) -> Vec<u32> {
        let timed_out: Vec<u32> = self
            .sessions
            .iter()
            .filter(|(_, session)| session.is_timed_out(timeout))
            .map(|(id, _)| *id)
            .collect();

        for session_id in &timed_out {
            self.remove_session(session_id);
        }

        timed_out
    }

    /// Iterates over all sessions mutably, for the leaderboard sync pass.
    pub fn sessions_mut(&mut self) -> impl Iterator<Item = &mut PlayerSession> {
        self.sessions.values_mut()
    }

    /// Returns the number of currently connected sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Returns true if no sessions are currently connected.
    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

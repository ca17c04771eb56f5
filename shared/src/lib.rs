use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub const PROTOCOL_VERSION: u32 = 1;
pub const CATEGORY_LIFE_LIMIT: u32 = 4;
pub const WORD_ATTEMPT_LIMIT: u32 = 3;
pub const LEADERBOARD_SIZE: usize = 5;
pub const MAX_NAME_LEN: usize = 24;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub enum Packet {
    Connect {
        client_version: u32,
        display_name: Option<String>,
    },
    Action {
        action: PlayerAction,
    },
    Heartbeat {
        timestamp: u64,
    },
    Disconnect,

    Connected {
        session_id: u32,
        identity: String,
    },
    View {
        view: SessionView,
    },
    Disconnected {
        reason: String,
    },
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub enum PlayerAction {
    StartCategory { category: String },
    StartWord,
    Guess { text: String },
    RevealClue,
    OpenLeaderboard,
    GoHome,
    PlayAgain,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub enum SessionView {
    Home {
        identity: String,
        score: u32,
        categories: Vec<String>,
        notice: Option<Notice>,
    },
    Category {
        category: String,
        clues: Vec<String>,
        clues_total: u32,
        lives_left: u32,
        score: u32,
        notice: Option<Notice>,
    },
    Word {
        masked: String,
        definitions: Vec<String>,
        attempt: u32,
        score: u32,
        notice: Option<Notice>,
    },
    Eliminated {
        final_score: u32,
        answer: String,
    },
    Leaderboard {
        entries: Vec<LeaderboardEntry>,
        score: u32,
    },
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub enum Notice {
    Correct { answer: String, points: u32 },
    Incorrect { lives_left: u32 },
    TryAgain { attempts_left: u32 },
    WordMissed { word: String },
    EmptyGuess,
    NoMoreClues,
    NoContent,
    Unavailable,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ScoreUpdate {
    pub member: String,
    pub score: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct LeaderboardEntry {
    pub member: String,
    pub score: u32,
}

// Points for a correct category guess with `clues_shown` clues visible.
pub fn category_points(clues_shown: u32) -> u32 {
    5u32.saturating_sub(clues_shown).max(1)
}

// Points for a correct word guess on the given 1-based attempt.
pub fn word_points(attempt: u32) -> u32 {
    4u32.saturating_sub(attempt).max(1)
}

pub fn normalize_guess(text: &str) -> String {
    text.trim().to_lowercase()
}

pub fn guess_matches(guess: &str, answer: &str) -> bool {
    normalize_guess(guess) == normalize_guess(answer)
}

pub fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::from_secs(0))
        .as_millis() as u64
}

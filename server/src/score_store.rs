//! Durable member score storage backing the shared leaderboard.
//!
//! Scores live in memory for ranking queries and are journaled to an
//! append-only JSON-lines file so a restart does not wipe the standings.
//! Every upsert is written and flushed before the in-memory map changes;
//! if the journal write fails the store reports `StoreUnavailable` and the
//! in-memory state is left exactly as it was.

use log::{info, warn};
use serde::{Deserialize, Serialize};
use shared::LeaderboardEntry;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;

#[derive(Debug, Error)]
#[error("score store unavailable: {0}")]
pub struct StoreUnavailable(#[from] std::io::Error);

#[derive(Debug, Serialize, Deserialize)]
struct JournalRecord {
    member: String,
    score: u32,
}

#[derive(Debug, Clone)]
struct MemberRecord {
    score: u32,
    // Position in first-upsert order, used to break score ties.
    first_seen: u64,
}

/// Member scores with replace-on-upsert semantics and ranked reads.
pub struct ScoreStore {
    records: HashMap<String, MemberRecord>,
    journal: Option<File>,
    next_seq: u64,
}

impl ScoreStore {
    /// A store with no journal. Scores vanish when the server stops.
    pub fn in_memory() -> Self {
        Self {
            records: HashMap::new(),
            journal: None,
            next_seq: 0,
        }
    }

    #[cfg(test)]
    pub(crate) fn with_journal(journal: File) -> Self {
        let mut store = Self::in_memory();
        store.journal = Some(journal);
        store
    }

    /// Opens a journal-backed store, replaying any existing journal.
    ///
    /// A missing file starts an empty store. Corrupt lines (typically a torn
    /// tail from a crash mid-write) are skipped with a warning; everything
    /// before them is kept.
    pub async fn open(path: &Path) -> Result<Self, StoreUnavailable> {
        let text = match tokio::fs::read_to_string(path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(e.into()),
        };

        let mut store = Self::in_memory();
        for (line_no, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<JournalRecord>(line) {
                Ok(record) => store.apply_record(&record.member, record.score),
                Err(e) => warn!("Skipping corrupt journal line {}: {}", line_no + 1, e),
            }
        }

        let journal = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await?;
        store.journal = Some(journal);

        info!(
            "Score journal {} loaded with {} members",
            path.display(),
            store.records.len()
        );
        Ok(store)
    }

    /// Sets the member's score, replacing any previous value.
    ///
    /// The journal line is written and flushed first; on failure the error
    /// is returned and memory is untouched, so callers can skip publishing
    /// an update that was never made durable.
    pub async fn upsert(&mut self, member: &str, score: u32) -> Result<(), StoreUnavailable> {
        if let Some(journal) = self.journal.as_mut() {
            let record = JournalRecord {
                member: member.to_string(),
                score,
            };
            let mut line = serde_json::to_vec(&record).map_err(std::io::Error::from)?;
            line.push(b'\n');
            journal.write_all(&line).await?;
            journal.flush().await?;
        }
        self.apply_record(member, score);
        Ok(())
    }

    fn apply_record(&mut self, member: &str, score: u32) {
        match self.records.get_mut(member) {
            Some(record) => record.score = score,
            None => {
                let seq = self.next_seq;
                self.next_seq += 1;
                self.records.insert(
                    member.to_string(),
                    MemberRecord {
                        score,
                        first_seen: seq,
                    },
                );
            }
        }
    }

    /// Top `k` members by score, highest first; ties go to the member
    /// recorded earlier.
    pub fn top_k(&self, k: usize) -> Vec<LeaderboardEntry> {
        let mut ranked: Vec<(&String, &MemberRecord)> = self.records.iter().collect();
        ranked.sort_by(|a, b| {
            b.1.score
                .cmp(&a.1.score)
                .then(a.1.first_seen.cmp(&b.1.first_seen))
        });
        ranked
            .into_iter()
            .take(k)
            .map(|(member, record)| LeaderboardEntry {
                member: member.clone(),
                score: record.score,
            })
            .collect()
    }

    pub fn score_of(&self, member: &str) -> Option<u32> {
        self.records.get(member).map(|r| r.score)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

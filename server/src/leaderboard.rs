//! Per-session cache of the shared top standings.

use shared::{LeaderboardEntry, ScoreUpdate, LEADERBOARD_SIZE};

/// A session's local copy of the top standings, kept fresh by merging
/// score updates as they arrive.
///
/// The cache never holds two entries for the same member and never more
/// than the display size. Applying an update the cache has already seen
/// leaves it unchanged.
#[derive(Debug, Clone)]
pub struct LeaderboardCache {
    entries: Vec<LeaderboardEntry>,
}

impl LeaderboardCache {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn seeded(entries: Vec<LeaderboardEntry>) -> Self {
        let mut cache = Self::new();
        cache.reseed(entries);
        cache
    }

    /// Replaces the cached standings wholesale, typically after the feed
    /// lagged and this cache can no longer be trusted.
    pub fn reseed(&mut self, entries: Vec<LeaderboardEntry>) {
        self.entries = entries;
        self.rank();
    }

    /// Merges one score update. Returns true when the visible standings
    /// changed as a result.
    pub fn apply(&mut self, update: &ScoreUpdate) -> bool {
        let before = self.entries.clone();

        match self
            .entries
            .iter_mut()
            .find(|entry| entry.member == update.member)
        {
            Some(entry) => entry.score = update.score,
            None => self.entries.push(LeaderboardEntry {
                member: update.member.clone(),
                score: update.score,
            }),
        }
        self.rank();

        self.entries != before
    }

    fn rank(&mut self) {
        // Stable sort keeps earlier entries ahead on ties.
        self.entries.sort_by(|a, b| b.score.cmp(&a.score));
        self.entries.truncate(LEADERBOARD_SIZE);
    }

    pub fn entries(&self) -> &[LeaderboardEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

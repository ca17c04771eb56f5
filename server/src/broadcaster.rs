//! Fan-out of score updates between player sessions.
//!
//! Publishing is fire-and-forget: a session commits its score and every
//! subscribed session eventually merges the update into its own leaderboard
//! cache. Feeds only observe updates published after they subscribe, so a
//! freshly connected session seeds its cache from the score store instead.

use log::{debug, warn};
use shared::ScoreUpdate;
use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 256;

pub struct Broadcaster {
    tx: broadcast::Sender<ScoreUpdate>,
}

impl Broadcaster {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Publishes an update to all current subscribers.
    ///
    /// Having no subscribers is not an error; the update is simply dropped.
    pub fn publish(&self, update: ScoreUpdate) {
        if self.tx.send(update).is_err() {
            debug!("Score update published with no subscribers");
        }
    }

    pub fn subscribe(&self) -> ScoreFeed {
        ScoreFeed {
            rx: self.tx.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// One subscriber's stream of score updates.
pub struct ScoreFeed {
    rx: broadcast::Receiver<ScoreUpdate>,
}

#[derive(Debug)]
pub enum FeedPoll {
    Update(ScoreUpdate),
    Empty,
    /// The feed fell behind and dropped updates; the holder must rebuild
    /// its view from the score store.
    Lagged,
    Closed,
}

impl ScoreFeed {
    pub fn try_next(&mut self) -> FeedPoll {
        match self.rx.try_recv() {
            Ok(update) => FeedPoll::Update(update),
            Err(broadcast::error::TryRecvError::Empty) => FeedPoll::Empty,
            Err(broadcast::error::TryRecvError::Lagged(missed)) => {
                warn!("Score feed lagged, {} updates dropped", missed);
                FeedPoll::Lagged
            }
            Err(broadcast::error::TryRecvError::Closed) => FeedPoll::Closed,
        }
    }
}

//! Authoritative per-player game state and the transitions driving it.

use crate::catalog::{CatalogError, PuzzleCatalog};
use crate::leaderboard::LeaderboardCache;
use log::info;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use shared::{
    category_points, guess_matches, is_blank, word_points, Notice, PlayerAction, ScoreUpdate,
    SessionView, CATEGORY_LIFE_LIMIT, WORD_ATTEMPT_LIMIT,
};
use std::collections::HashMap;

#[derive(Debug, Clone)]
enum Mode {
    Home,
    Category(CategoryRound),
    Word(WordRound),
    Eliminated { answer: String },
    Leaderboard,
}

#[derive(Debug, Clone)]
struct CategoryRound {
    category: String,
    answer: String,
    clues: Vec<String>,
    // 0-based index of the newest visible clue, capped at clues.len() - 1.
    clue_index: usize,
    wrong_count: u32,
}

#[derive(Debug, Clone)]
struct WordRound {
    word: String,
    definitions: Vec<String>,
    // 1-based attempt the player is currently on.
    attempt: u32,
    revealed: Vec<bool>,
}

/// What one applied action produced: the next view for this player, and a
/// scoring event when points were banked or the player was eliminated.
#[derive(Debug)]
pub struct StepOutcome {
    pub view: SessionView,
    pub scoring: Option<ScoreUpdate>,
}

pub struct GameSession {
    identity: String,
    score: u32,
    mode: Mode,
    last_category_picks: HashMap<String, usize>,
    last_word_pick: Option<usize>,
    rng: StdRng,
}

impl GameSession {
    pub fn new(identity: String) -> Self {
        Self::with_rng(identity, StdRng::from_entropy())
    }

    pub fn with_rng(identity: String, rng: StdRng) -> Self {
        Self {
            identity,
            score: 0,
            mode: Mode::Home,
            last_category_picks: HashMap::new(),
            last_word_pick: None,
            rng,
        }
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn on_leaderboard(&self) -> bool {
        matches!(self.mode, Mode::Leaderboard)
    }

    /// Applies one player action and returns the resulting view plus any
    /// scoring event. Actions that make no sense in the current mode leave
    /// the state untouched and surface an `Unavailable` notice.
    pub fn apply(
        &mut self,
        action: PlayerAction,
        catalog: &PuzzleCatalog,
        board: &LeaderboardCache,
    ) -> StepOutcome {
        let (notice, scoring) = match action {
            PlayerAction::StartCategory { category } => self.start_category(&category, catalog),
            PlayerAction::StartWord => self.start_word(catalog),
            PlayerAction::Guess { text } => self.submit_guess(&text, catalog),
            PlayerAction::RevealClue => self.reveal_clue(),
            PlayerAction::OpenLeaderboard => self.open_leaderboard(),
            PlayerAction::GoHome => self.go_home(),
            PlayerAction::PlayAgain => self.play_again(),
        };

        StepOutcome {
            view: self.render(catalog, board, notice),
            scoring,
        }
    }

    /// The current view without applying anything, used when the standings
    /// change underneath a player watching the leaderboard.
    pub fn view(&self, catalog: &PuzzleCatalog, board: &LeaderboardCache) -> SessionView {
        self.render(catalog, board, None)
    }

    fn render(
        &self,
        catalog: &PuzzleCatalog,
        board: &LeaderboardCache,
        notice: Option<Notice>,
    ) -> SessionView {
        match &self.mode {
            Mode::Home => SessionView::Home {
                identity: self.identity.clone(),
                score: self.score,
                categories: catalog.category_names(),
                notice,
            },
            Mode::Category(round) => SessionView::Category {
                category: round.category.clone(),
                clues: round.clues[..=round.clue_index].to_vec(),
                clues_total: round.clues.len() as u32,
                lives_left: CATEGORY_LIFE_LIMIT - round.wrong_count,
                score: self.score,
                notice,
            },
            Mode::Word(round) => {
                let visible = (round.attempt as usize).min(round.definitions.len());
                SessionView::Word {
                    masked: masked_word(&round.word, &round.revealed),
                    definitions: round.definitions[..visible].to_vec(),
                    attempt: round.attempt,
                    score: self.score,
                    notice,
                }
            }
            Mode::Eliminated { answer } => SessionView::Eliminated {
                final_score: self.score,
                answer: answer.clone(),
            },
            Mode::Leaderboard => SessionView::Leaderboard {
                entries: board.entries().to_vec(),
                score: self.score,
            },
        }
    }

    fn start_category(
        &mut self,
        category: &str,
        catalog: &PuzzleCatalog,
    ) -> (Option<Notice>, Option<ScoreUpdate>) {
        if !matches!(self.mode, Mode::Home) {
            return (Some(Notice::Unavailable), None);
        }
        match self.serve_category(category, 0, catalog) {
            Ok(()) => (None, None),
            Err(_) => (Some(Notice::NoContent), None),
        }
    }

    fn start_word(&mut self, catalog: &PuzzleCatalog) -> (Option<Notice>, Option<ScoreUpdate>) {
        if !matches!(self.mode, Mode::Home) {
            return (Some(Notice::Unavailable), None);
        }
        match self.serve_word(catalog) {
            Ok(()) => (None, None),
            Err(_) => (Some(Notice::NoContent), None),
        }
    }

    fn submit_guess(
        &mut self,
        text: &str,
        catalog: &PuzzleCatalog,
    ) -> (Option<Notice>, Option<ScoreUpdate>) {
        if is_blank(text) {
            // A blank guess costs nothing, not even an attempt.
            return match self.mode {
                Mode::Category(_) | Mode::Word(_) => (Some(Notice::EmptyGuess), None),
                _ => (Some(Notice::Unavailable), None),
            };
        }
        if matches!(self.mode, Mode::Category(_)) {
            return self.guess_category(text, catalog);
        }
        if matches!(self.mode, Mode::Word(_)) {
            return self.guess_word(text, catalog);
        }
        (Some(Notice::Unavailable), None)
    }

    fn guess_category(
        &mut self,
        text: &str,
        catalog: &PuzzleCatalog,
    ) -> (Option<Notice>, Option<ScoreUpdate>) {
        let mut round = match &self.mode {
            Mode::Category(round) => round.clone(),
            _ => return (Some(Notice::Unavailable), None),
        };

        if guess_matches(text, &round.answer) {
            let points = category_points(round.clue_index as u32 + 1);
            self.score += points;
            info!(
                "{} solved '{}' for {} points (total {})",
                self.identity, round.answer, points, self.score
            );
            let scoring = self.score_update();
            // Serve the next puzzle from the same category; remaining lives
            // carry over within the round.
            if self
                .serve_category(&round.category, round.wrong_count, catalog)
                .is_err()
            {
                self.mode = Mode::Home;
            }
            (
                Some(Notice::Correct {
                    answer: round.answer,
                    points,
                }),
                scoring,
            )
        } else {
            round.wrong_count += 1;
            if round.wrong_count >= CATEGORY_LIFE_LIMIT {
                info!(
                    "{} eliminated on '{}' with {} points",
                    self.identity, round.answer, self.score
                );
                let scoring = self.score_update();
                self.mode = Mode::Eliminated {
                    answer: round.answer,
                };
                (None, scoring)
            } else {
                let lives_left = CATEGORY_LIFE_LIMIT - round.wrong_count;
                self.mode = Mode::Category(round);
                (Some(Notice::Incorrect { lives_left }), None)
            }
        }
    }

    fn guess_word(
        &mut self,
        text: &str,
        catalog: &PuzzleCatalog,
    ) -> (Option<Notice>, Option<ScoreUpdate>) {
        let mut round = match &self.mode {
            Mode::Word(round) => round.clone(),
            _ => return (Some(Notice::Unavailable), None),
        };

        if guess_matches(text, &round.word) {
            let points = word_points(round.attempt);
            self.score += points;
            info!(
                "{} solved word '{}' for {} points (total {})",
                self.identity, round.word, points, self.score
            );
            let scoring = self.score_update();
            if self.serve_word(catalog).is_err() {
                self.mode = Mode::Home;
            }
            (
                Some(Notice::Correct {
                    answer: round.word,
                    points,
                }),
                scoring,
            )
        } else if round.attempt >= WORD_ATTEMPT_LIMIT {
            // Out of attempts: cycle to a fresh word, nothing banked.
            if self.serve_word(catalog).is_err() {
                self.mode = Mode::Home;
            }
            (Some(Notice::WordMissed { word: round.word }), None)
        } else {
            reveal_one_letter(&mut round, &mut self.rng);
            round.attempt += 1;
            let attempts_left = WORD_ATTEMPT_LIMIT + 1 - round.attempt;
            self.mode = Mode::Word(round);
            (Some(Notice::TryAgain { attempts_left }), None)
        }
    }

    fn reveal_clue(&mut self) -> (Option<Notice>, Option<ScoreUpdate>) {
        match &mut self.mode {
            Mode::Category(round) => {
                if round.clue_index + 1 < round.clues.len() {
                    round.clue_index += 1;
                    (None, None)
                } else {
                    (Some(Notice::NoMoreClues), None)
                }
            }
            _ => (Some(Notice::Unavailable), None),
        }
    }

    fn open_leaderboard(&mut self) -> (Option<Notice>, Option<ScoreUpdate>) {
        // Allowed from anywhere; an active round is abandoned.
        self.mode = Mode::Leaderboard;
        (None, None)
    }

    fn go_home(&mut self) -> (Option<Notice>, Option<ScoreUpdate>) {
        self.mode = Mode::Home;
        (None, None)
    }

    fn play_again(&mut self) -> (Option<Notice>, Option<ScoreUpdate>) {
        if matches!(self.mode, Mode::Eliminated { .. }) {
            self.mode = Mode::Home;
            (None, None)
        } else {
            (Some(Notice::Unavailable), None)
        }
    }

    fn serve_category(
        &mut self,
        category: &str,
        wrong_count: u32,
        catalog: &PuzzleCatalog,
    ) -> Result<(), CatalogError> {
        let exclude = self.last_category_picks.get(category).copied();
        let (index, puzzle) = catalog.select_category(category, exclude, &mut self.rng)?;
        self.last_category_picks.insert(category.to_string(), index);
        self.mode = Mode::Category(CategoryRound {
            category: category.to_string(),
            answer: puzzle.answer.clone(),
            clues: puzzle.clues.clone(),
            clue_index: 0,
            wrong_count,
        });
        Ok(())
    }

    fn serve_word(&mut self, catalog: &PuzzleCatalog) -> Result<(), CatalogError> {
        let (index, puzzle) = catalog.select_word(self.last_word_pick, &mut self.rng)?;
        self.last_word_pick = Some(index);
        self.mode = Mode::Word(WordRound {
            word: puzzle.word.clone(),
            definitions: puzzle.definitions.clone(),
            attempt: 1,
            revealed: vec![false; puzzle.word.chars().count()],
        });
        Ok(())
    }

    fn score_update(&self) -> Option<ScoreUpdate> {
        Some(ScoreUpdate {
            member: self.identity.clone(),
            score: self.score,
        })
    }
}

fn masked_word(word: &str, revealed: &[bool]) -> String {
    word.chars()
        .enumerate()
        .map(|(i, c)| {
            if !c.is_alphanumeric() || revealed.get(i).copied().unwrap_or(false) {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn reveal_one_letter<R: Rng>(round: &mut WordRound, rng: &mut R) {
    let hidden: Vec<usize> = round
        .word
        .chars()
        .enumerate()
        .filter(|(i, c)| c.is_alphanumeric() && !round.revealed[*i])
        .map(|(i, _)| i)
        .collect();

    if let Some(&index) = hidden.choose(rng) {
        round.revealed[index] = true;
    }
}

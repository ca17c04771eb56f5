//! Puzzle content for both round types: category puzzles (an answer plus an
//! ordered clue list) and word puzzles (a word plus two definitions).
//!
//! The catalog is built once at startup, validated, and shared read-only for
//! the lifetime of the server. Selection is random but never repeats the
//! previously served puzzle when more than one is available.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("no puzzles available for this selection")]
    EmptyCatalog,
    #[error("failed to read puzzle content: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed puzzle content: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("invalid puzzle content: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryPuzzle {
    pub answer: String,
    pub clues: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WordPuzzle {
    pub word: String,
    pub definitions: Vec<String>,
}

/// Immutable puzzle sets keyed by category name, plus the word pool.
///
/// Categories are stored in a BTreeMap so listings come out in a stable
/// order regardless of content-file ordering.
#[derive(Debug, Clone, Deserialize)]
pub struct PuzzleCatalog {
    categories: BTreeMap<String, Vec<CategoryPuzzle>>,
    words: Vec<WordPuzzle>,
}

impl PuzzleCatalog {
    /// Parses and validates catalog content from a JSON string.
    pub fn from_json(text: &str) -> Result<Self, CatalogError> {
        let catalog: PuzzleCatalog = serde_json::from_str(text)?;
        catalog.validate()
    }

    /// Loads catalog content from a JSON file on disk.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// The compiled-in default dataset.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(include_str!("../content/puzzles.json"))
    }

    fn validate(self) -> Result<Self, CatalogError> {
        for (name, puzzles) in &self.categories {
            if name.trim().is_empty() {
                return Err(CatalogError::Invalid(
                    "category with a blank name".to_string(),
                ));
            }
            for puzzle in puzzles {
                if puzzle.answer.trim().is_empty() {
                    return Err(CatalogError::Invalid(format!(
                        "category '{}' has a puzzle with a blank answer",
                        name
                    )));
                }
                if puzzle.clues.is_empty() {
                    return Err(CatalogError::Invalid(format!(
                        "puzzle '{}' has no clues",
                        puzzle.answer
                    )));
                }
                if puzzle.clues.iter().any(|c| c.trim().is_empty()) {
                    return Err(CatalogError::Invalid(format!(
                        "puzzle '{}' has a blank clue",
                        puzzle.answer
                    )));
                }
            }
        }
        for word in &self.words {
            if word.word.trim().is_empty() {
                return Err(CatalogError::Invalid(
                    "word puzzle with a blank word".to_string(),
                ));
            }
            if word.definitions.len() != 2 {
                return Err(CatalogError::Invalid(format!(
                    "word '{}' needs exactly two definitions, found {}",
                    word.word,
                    word.definitions.len()
                )));
            }
            if word.definitions.iter().any(|d| d.trim().is_empty()) {
                return Err(CatalogError::Invalid(format!(
                    "word '{}' has a blank definition",
                    word.word
                )));
            }
        }
        Ok(self)
    }

    pub fn category_names(&self) -> Vec<String> {
        self.categories.keys().cloned().collect()
    }

    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    pub fn puzzle_count(&self) -> usize {
        self.categories.values().map(|p| p.len()).sum()
    }

    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    /// Picks a random puzzle from the named category, skipping the index in
    /// `exclude` when the category holds more than one puzzle. An unknown
    /// category behaves like an empty one.
    pub fn select_category<R: Rng>(
        &self,
        category: &str,
        exclude: Option<usize>,
        rng: &mut R,
    ) -> Result<(usize, &CategoryPuzzle), CatalogError> {
        let puzzles = self
            .categories
            .get(category)
            .map(|p| p.as_slice())
            .unwrap_or(&[]);
        let index = pick_index(puzzles.len(), exclude, rng)?;
        Ok((index, &puzzles[index]))
    }

    /// Picks a random word puzzle, skipping the index in `exclude` when the
    /// pool holds more than one word.
    pub fn select_word<R: Rng>(
        &self,
        exclude: Option<usize>,
        rng: &mut R,
    ) -> Result<(usize, &WordPuzzle), CatalogError> {
        let index = pick_index(self.words.len(), exclude, rng)?;
        Ok((index, &self.words[index]))
    }
}

fn pick_index<R: Rng>(
    len: usize,
    exclude: Option<usize>,
    rng: &mut R,
) -> Result<usize, CatalogError> {
    if len == 0 {
        return Err(CatalogError::EmptyCatalog);
    }
    // With a single puzzle a repeat is unavoidable.
    if len == 1 {
        return Ok(0);
    }
    let candidates: Vec<usize> = (0..len).filter(|i| Some(*i) != exclude).collect();
    candidates
        .choose(rng)
        .copied()
        .ok_or(CatalogError::EmptyCatalog)
}

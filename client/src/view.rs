//! Terminal presentation of server views

use shared::{category_points, word_points, Notice, SessionView, WORD_ATTEMPT_LIMIT};

/// Renders a server view as terminal text.
pub fn render(view: &SessionView) -> String {
    match view {
        SessionView::Home {
            identity,
            score,
            categories,
            notice,
        } => {
            let mut out = String::new();
            push_notice(&mut out, notice);
            out.push_str(&format!("=== Home === ({}, score {})\n", identity, score));
            if categories.is_empty() {
                out.push_str("No categories loaded.\n");
            } else {
                out.push_str(&format!("Categories: {}\n", categories.join(", ")));
            }
            out.push_str("Type `category <name>` or `word` to play, `board` for standings.");
            out
        }

        SessionView::Category {
            category,
            clues,
            clues_total,
            lives_left,
            score,
            notice,
        } => {
            let mut out = String::new();
            push_notice(&mut out, notice);
            out.push_str(&format!(
                "--- Category: {} | lives {} | score {} ---\n",
                category, lives_left, score
            ));
            for (i, clue) in clues.iter().enumerate() {
                out.push_str(&format!("Clue {}: {}\n", i + 1, clue));
            }

            let shown = clues.len() as u32;
            let worth = category_points(shown);
            if shown < *clues_total {
                out.push_str(&format!(
                    "{} of {} clues shown. A correct guess is worth {} point{} (type `clue` for another).",
                    shown,
                    clues_total,
                    worth,
                    plural(worth)
                ));
            } else {
                out.push_str(&format!(
                    "All {} clues shown. A correct guess is worth {} point{}.",
                    clues_total,
                    worth,
                    plural(worth)
                ));
            }
            out
        }

        SessionView::Word {
            masked,
            definitions,
            attempt,
            score,
            notice,
        } => {
            let mut out = String::new();
            push_notice(&mut out, notice);
            out.push_str(&format!(
                "--- Word round | attempt {} of {} | score {} ---\n",
                attempt, WORD_ATTEMPT_LIMIT, score
            ));
            out.push_str(&format!("Word: {}\n", masked));
            for (i, definition) in definitions.iter().enumerate() {
                out.push_str(&format!("Definition {}: {}\n", i + 1, definition));
            }

            let worth = word_points(*attempt);
            out.push_str(&format!(
                "A correct guess is worth {} point{}.",
                worth,
                plural(worth)
            ));
            out
        }

        SessionView::Eliminated {
            final_score,
            answer,
        } => format!(
            "Out of lives! The answer was '{}'.\nFinal score: {}\nType `again` to start over or `board` to see the standings.",
            answer, final_score
        ),

        SessionView::Leaderboard { entries, score } => {
            let mut out = String::from("=== Leaderboard ===\n");
            if entries.is_empty() {
                out.push_str("No scores recorded yet.\n");
            } else {
                for (i, entry) in entries.iter().enumerate() {
                    out.push_str(&format!("{}. {} - {}\n", i + 1, entry.member, entry.score));
                }
            }
            out.push_str(&format!("Your score: {}", score));
            out
        }
    }
}

fn push_notice(out: &mut String, notice: &Option<Notice>) {
    if let Some(notice) = notice {
        out.push_str(&render_notice(notice));
        out.push('\n');
    }
}

fn render_notice(notice: &Notice) -> String {
    match notice {
        Notice::Correct { answer, points } => format!(
            "Correct! '{}' earned you {} point{}.",
            answer,
            points,
            plural(*points)
        ),
        Notice::Incorrect { lives_left } => match lives_left {
            1 => "Not it. Last life!".to_string(),
            n => format!("Not it. {} lives left.", n),
        },
        Notice::TryAgain { attempts_left } => format!(
            "Not it. Another letter is revealed, {} attempt{} left.",
            attempts_left,
            plural(*attempts_left)
        ),
        Notice::WordMissed { word } => format!(
            "Out of attempts, the word was '{}'. Here is a fresh one.",
            word
        ),
        Notice::EmptyGuess => "Type something to guess.".to_string(),
        Notice::NoMoreClues => "No more clues for this one.".to_string(),
        Notice::NoContent => "Nothing to play there.".to_string(),
        Notice::Unavailable => "You cannot do that right now.".to_string(),
    }
}

fn plural(n: u32) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

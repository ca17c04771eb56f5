//! Terminal input parsing with shorthand command aliases

use shared::PlayerAction;

/// A parsed line of terminal input
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Action(PlayerAction),
    Help,
    Quit,
}

/// Parses a line of user input into a command.
///
/// Anything that is not a recognized keyword counts as a guess, so players
/// can simply type their answer. `guess <text>` forces a guess when the
/// answer happens to collide with a keyword.
pub fn parse(line: &str) -> Option<Command> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }

    let (keyword, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((head, tail)) => (head, tail.trim()),
        None => (trimmed, ""),
    };

    let command = match keyword.to_lowercase().as_str() {
        "category" | "cat" => {
            if rest.is_empty() {
                Command::Help
            } else {
                Command::Action(PlayerAction::StartCategory {
                    category: rest.to_string(),
                })
            }
        }
        "word" => Command::Action(PlayerAction::StartWord),
        "guess" => {
            if rest.is_empty() {
                Command::Help
            } else {
                Command::Action(PlayerAction::Guess {
                    text: rest.to_string(),
                })
            }
        }
        "clue" | "reveal" => Command::Action(PlayerAction::RevealClue),
        "board" | "leaderboard" | "scores" => Command::Action(PlayerAction::OpenLeaderboard),
        "home" | "back" => Command::Action(PlayerAction::GoHome),
        "again" | "play" => Command::Action(PlayerAction::PlayAgain),
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        _ => Command::Action(PlayerAction::Guess {
            text: trimmed.to_string(),
        }),
    };

    Some(command)
}

/// Command summary printed on startup and on `help`.
pub fn help_text() -> &'static str {
    "Commands:\n\
     \x20 category <name>   start a category round\n\
     \x20 word              start a word round\n\
     \x20 clue              reveal another clue\n\
     \x20 board             open the shared leaderboard\n\
     \x20 home              back to the home screen\n\
     \x20 again             play again after elimination\n\
     \x20 guess <text>      guess (or just type your answer)\n\
     \x20 quit              leave the game"
}

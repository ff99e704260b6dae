//! Line-oriented player commands read from stdin.

use thiserror::Error;
use world_of_bits_core::Direction;

/// Single command typed by the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Input {
    /// Step one cell.
    Move(Direction),
    /// Act on the cell at the given offset from the player.
    Interact { di: i32, dj: i32 },
    /// Start the session over.
    Reset,
    /// Redraw the viewport without acting.
    Show,
    /// Print the command summary.
    Help,
    /// Leave the game.
    Quit,
}

/// Reasons a line cannot be understood.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub(crate) enum InputError {
    #[error("unknown command `{0}`, type `help` for a list")]
    Unknown(String),
    #[error("`{command}` expects {expected} argument(s)")]
    Arity {
        command: &'static str,
        expected: usize,
    },
    #[error("`{0}` is not a cell offset")]
    Offset(String),
}

/// Text printed by the `help` command.
pub(crate) const HELP: &str = "\
commands:
  n | s | e | w      move one cell north, south, east or west
  i <di> <dj>        interact with the cell at offset (di, dj); `i` alone acts on your own cell
  show               redraw the map
  reset              start over
  help               this text
  quit               leave";

/// Parses one line. Blank lines redraw the map.
pub(crate) fn parse(line: &str) -> Result<Input, InputError> {
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return Ok(Input::Show);
    };
    let arguments: Vec<&str> = words.collect();

    let input = match command.to_ascii_lowercase().as_str() {
        "n" | "north" => Input::Move(Direction::North),
        "s" | "south" => Input::Move(Direction::South),
        "e" | "east" => Input::Move(Direction::East),
        "w" | "west" => Input::Move(Direction::West),
        "i" | "interact" => {
            return match arguments.as_slice() {
                [] => Ok(Input::Interact { di: 0, dj: 0 }),
                [di, dj] => Ok(Input::Interact {
                    di: offset(di)?,
                    dj: offset(dj)?,
                }),
                _ => Err(InputError::Arity {
                    command: "i",
                    expected: 2,
                }),
            };
        }
        "show" => Input::Show,
        "reset" => Input::Reset,
        "help" | "?" => Input::Help,
        "q" | "quit" | "exit" => Input::Quit,
        other => return Err(InputError::Unknown(other.to_owned())),
    };

    if arguments.is_empty() {
        Ok(input)
    } else {
        Err(InputError::Arity {
            command: keyword(input),
            expected: 0,
        })
    }
}

fn offset(word: &str) -> Result<i32, InputError> {
    word.parse()
        .map_err(|_| InputError::Offset(word.to_owned()))
}

fn keyword(input: Input) -> &'static str {
    match input {
        Input::Move(Direction::North) => "n",
        Input::Move(Direction::South) => "s",
        Input::Move(Direction::East) => "e",
        Input::Move(Direction::West) => "w",
        Input::Interact { .. } => "i",
        Input::Reset => "reset",
        Input::Show => "show",
        Input::Help => "help",
        Input::Quit => "quit",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn movement_words() {
        assert_eq!(parse("n"), Ok(Input::Move(Direction::North)));
        assert_eq!(parse("  West "), Ok(Input::Move(Direction::West)));
    }

    #[test]
    fn interaction_offsets() {
        assert_eq!(parse("i"), Ok(Input::Interact { di: 0, dj: 0 }));
        assert_eq!(parse("i -2 3"), Ok(Input::Interact { di: -2, dj: 3 }));
        assert_eq!(parse("i x 3"), Err(InputError::Offset("x".to_owned())));
        assert_eq!(
            parse("i 1"),
            Err(InputError::Arity {
                command: "i",
                expected: 2,
            })
        );
    }

    #[test]
    fn blank_line_redraws() {
        assert_eq!(parse(""), Ok(Input::Show));
    }

    #[test]
    fn stray_arguments_are_refused() {
        assert_eq!(
            parse("reset now"),
            Err(InputError::Arity {
                command: "reset",
                expected: 0,
            })
        );
        assert_eq!(parse("fly"), Err(InputError::Unknown("fly".to_owned())));
    }
}

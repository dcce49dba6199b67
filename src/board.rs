use std::fmt;
use std::io::{self, Write};

use crate::position::{Player, Position};
use crate::tree::StateSink;

/// ASCII drawing of the board.
///
/// Player 1's pits run right to left along the top with their store on the
/// left; player 0's pits run left to right along the bottom with their store
/// on the right.
impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let config = self.config();
        let l = config.locations_per_player();
        let pits = self.pits();
        let len = pits.len();

        write!(f, " ______ ______ ")?;
        for _ in 0..l {
            write!(f, "______ ")?;
        }

        write!(f, "\n|      |      |")?;
        for _ in 0..l {
            write!(f, "      |")?;
        }

        write!(f, "\n|      |")?;
        for i in 0..l {
            write!(f, "  {:>2}  |", pits[len - 2 - i])?;
        }
        write!(f, "      |")?;

        write!(f, "\n|  {:>2}  |", self.store(Player::One))?;
        for _ in 0..l {
            write!(f, "______|")?;
        }
        write!(f, "  {:>2}  |", self.store(Player::Zero))?;

        write!(f, "\n|      |      |")?;
        for _ in 0..l {
            write!(f, "      |")?;
        }

        write!(f, "\n|      |")?;
        for &n in &pits[config.pit_range(Player::Zero)] {
            write!(f, "  {n:>2}  |")?;
        }
        write!(f, "      |")?;

        write!(f, "\n|______|______|")?;
        for _ in 0..l {
            write!(f, "______|")?;
        }
        writeln!(f)
    }
}

/// Sink that draws every state it receives.
pub struct BoardPrinter<W: Write> {
    out: W,
}

impl<W: Write> BoardPrinter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> StateSink for BoardPrinter<W> {
    fn emit(&mut self, position: &Position, terminal: bool) -> io::Result<()> {
        if terminal {
            writeln!(self.out, "{} to move (game over)", position.active_player())?;
        } else {
            writeln!(self.out, "{} to move", position.active_player())?;
        }
        writeln!(self.out, "{position}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::GameConfig;

    #[test]
    fn test_draw_board() {
        let config = GameConfig::new(2, 3).unwrap();
        let pos = Position::with_board(config, vec![1, 2, 3, 4, 5, 12], Player::Zero).unwrap();
        let expected = concat!(
            " ______ ______ ______ ______ \n",
            "|      |      |      |      |\n",
            "|      |   5  |   4  |      |\n",
            "|  12  |______|______|   3  |\n",
            "|      |      |      |      |\n",
            "|      |   1  |   2  |      |\n",
            "|______|______|______|______|\n",
        );
        assert_eq!(pos.to_string(), expected);
    }

    #[test]
    fn test_printer_marks_terminal_states() {
        let pos = Position::new(GameConfig::new(1, 1).unwrap());
        let mut printer = BoardPrinter::new(Vec::new());
        printer.emit(&pos, true).unwrap();
        let text = String::from_utf8(printer.into_inner()).unwrap();
        assert!(text.starts_with("player 0 to move (game over)\n"));
        assert!(text.ends_with("|______|______|______|\n\n"));
    }
}

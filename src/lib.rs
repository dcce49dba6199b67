//! Mancala-Tree: exhaustive game trees for generalized Mancala.
//!
//! This crate enumerates every reachable state of a Kalah-style Mancala game
//! with a configurable number of pits and starting tokens, and serializes
//! them to a flat binary stream in depth-first pre-order.
//!
//! ## Modules
//!
//! - [`error`] - Configuration and stream errors
//! - [`constants`] - Stream format markers and driver parameters
//! - [`position`] - Board state, sowing, captures and game-over detection
//! - [`tree`] - Iterative pre-order enumeration with an explicit frame stack
//! - [`codec`] - Record encoding and the streaming tree reader
//! - [`tree_file`] - `<L>l<T>t.mantree` naming convention
//! - [`parallel`] - Partitioned generation across threads
//! - [`playout`] - Random single-game simulation
//! - [`board`] - ASCII board rendering
//!
//! ## Example
//!
//! ```
//! use mancala_tree::codec::{Framing, RecordWriter};
//! use mancala_tree::position::{GameConfig, Position};
//! use mancala_tree::tree::enumerate;
//!
//! let config = GameConfig::new(2, 1).unwrap();
//! let mut writer = RecordWriter::new(Vec::new(), Framing::Trailing);
//! let stats = enumerate(&Position::new(config), &mut writer, true).unwrap();
//! assert_eq!(stats.states, 8);
//! assert_eq!(stats.games, 3);
//! ```

pub mod board;
pub mod codec;
pub mod constants;
pub mod error;
#[cfg(feature = "parallel")]
pub mod parallel;
pub mod playout;
pub mod position;
pub mod tree;
pub mod tree_file;

pub use crate::codec::{Framing, Record, RecordWriter, StreamCheck, TreeReader, verify};
pub use crate::error::{ConfigError, TreeError};
pub use crate::position::{GameConfig, MoveError, Player, Position};
pub use crate::tree::{Preorder, StateSink, TreeStats, enumerate};

//! Constants for the board layout, the tree stream format and the driver.
//!
//! Board geometry is chosen at runtime through [`GameConfig`](crate::position::GameConfig);
//! everything here is fixed for every configuration.

// =============================================================================
// Board Geometry
// =============================================================================

/// Default number of playable pits per player (standard Kalah board).
pub const DEFAULT_LOCATIONS: usize = 6;

/// Default number of tokens placed in each pit at the start of a game.
pub const DEFAULT_TOKENS: usize = 4;

/// Largest token total a board may hold. Every pit is stored as one byte,
/// so the whole supply must fit in a single pit.
pub const MAX_BOARD_TOKENS: usize = u8::MAX as usize;

// =============================================================================
// Tree Stream Format
// =============================================================================

/// Marks a terminal record (game over).
///
/// Never a valid player byte, which is what lets a reader tell a trailing
/// marker apart from the start of the next record.
pub const TERMINAL_MARKER: u8 = 0xFF;

/// Flag byte of a non-terminal record in the flagged framing.
pub const NON_TERMINAL_FLAG: u8 = 0x00;

/// File extension of serialized game trees.
pub const TREE_FILE_EXTENSION: &str = "mantree";

// =============================================================================
// Driver Parameters
// =============================================================================

/// Capacity of the buffered writer wrapped around tree files (256 KiB).
pub const WRITE_BUFFER_SIZE: usize = 1 << 18;

/// Number of emitted states between two progress reports.
pub const REPORT_PERIOD: u64 = 1 << 22;

//! Mancala board state and move execution.
//!
//! This module provides the game rules for a generalized Kalah board:
//! - Board configuration (pits per player, starting tokens) validated once
//! - Sowing with the opponent's store skipped
//! - Extra turn when the last token lands in the mover's store
//! - Capture when the last token lands in an empty pit on the mover's side
//! - Game-over detection
//!
//! The board is a flat array: player 0's pits, player 0's store, player 1's
//! pits, player 1's store. Sowing walks forward through it circularly.

use std::fmt;
use std::ops::Range;

use crate::constants::MAX_BOARD_TOKENS;
use crate::error::ConfigError;

/// One of the two players. Player 0 moves first.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Player {
    Zero,
    One,
}

impl Player {
    /// Side index (0 or 1).
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Player::Zero => 0,
            Player::One => 1,
        }
    }

    #[inline]
    pub const fn opponent(self) -> Self {
        match self {
            Player::Zero => Player::One,
            Player::One => Player::Zero,
        }
    }

    /// Byte written to the tree stream for this player.
    #[inline]
    pub const fn to_byte(self) -> u8 {
        self.index() as u8
    }

    pub const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Player::Zero),
            1 => Some(Player::One),
            _ => None,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "player {}", self.index())
    }
}

/// Board dimensions shared by every state of one game tree.
///
/// Derived values (store indices, winning threshold) are computed from the
/// two parameters and never change after construction.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct GameConfig {
    locations: usize,
    tokens: usize,
    winning_threshold: u8,
}

impl GameConfig {
    /// Validate the board parameters.
    ///
    /// # Errors
    /// - [`ConfigError::NoLocations`] if `locations_per_player` is zero
    /// - [`ConfigError::NoTokens`] if `tokens_per_location` is zero
    /// - [`ConfigError::TooManyTokens`] if the total supply exceeds 255
    pub fn new(locations_per_player: usize, tokens_per_location: usize) -> Result<Self, ConfigError> {
        if locations_per_player == 0 {
            return Err(ConfigError::NoLocations);
        }
        if tokens_per_location == 0 {
            return Err(ConfigError::NoTokens);
        }
        let total = locations_per_player
            .checked_mul(tokens_per_location)
            .and_then(|n| n.checked_mul(2))
            .unwrap_or(usize::MAX);
        if total > MAX_BOARD_TOKENS {
            return Err(ConfigError::TooManyTokens {
                total,
                max: MAX_BOARD_TOKENS,
            });
        }
        Ok(Self {
            locations: locations_per_player,
            tokens: tokens_per_location,
            // At most half the supply, so it fits.
            winning_threshold: (locations_per_player * tokens_per_location) as u8,
        })
    }

    #[inline]
    pub const fn locations_per_player(&self) -> usize {
        self.locations
    }

    #[inline]
    pub const fn tokens_per_location(&self) -> usize {
        self.tokens
    }

    /// Number of board indices, stores included.
    #[inline]
    pub const fn board_len(&self) -> usize {
        2 * (self.locations + 1)
    }

    #[inline]
    pub const fn store_index(&self, player: Player) -> usize {
        player.index() * (self.locations + 1) + self.locations
    }

    /// Absolute board index of a player's pit.
    #[inline]
    pub const fn pit_index(&self, player: Player, offset: usize) -> usize {
        player.index() * (self.locations + 1) + offset
    }

    /// Board indices of a player's playable pits.
    #[inline]
    pub const fn pit_range(&self, player: Player) -> Range<usize> {
        let start = player.index() * (self.locations + 1);
        start..start + self.locations
    }

    /// A store holding more than this many tokens has won.
    #[inline]
    pub const fn winning_threshold(&self) -> u8 {
        self.winning_threshold
    }

    /// Tokens on the board in every state of the game.
    #[inline]
    pub const fn total_tokens(&self) -> usize {
        2 * self.locations * self.tokens
    }
}

impl fmt::Display for GameConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}l{}t", self.locations, self.tokens)
    }
}

/// Result of attempting to play a move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveError {
    /// The chosen pit holds no tokens
    EmptyPit(usize),
    /// Pit offset is past the player's last pit
    OutOfRange(usize),
}

impl fmt::Display for MoveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveError::EmptyPit(offset) => write!(f, "Illegal move: pit {offset} is empty"),
            MoveError::OutOfRange(offset) => write!(f, "Illegal move: no pit at offset {offset}"),
        }
    }
}

impl std::error::Error for MoveError {}

/// Where the mover sows from and which store is skipped.
///
/// Computed once per state and reused for every candidate move.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MoveContext {
    pub player: Player,
    pub store: usize,
    pub opponent_store: usize,
}

/// What happened during a move.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MoveOutcome {
    /// Board index that received the last token
    pub landing: usize,
    /// Last token landed in the mover's store; the mover plays again
    pub extra_turn: bool,
    /// Tokens moved into the mover's store by a capture (0 if none)
    pub captured: u8,
}

/// A Mancala position (board state).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Position {
    config: GameConfig,
    /// Token count per board index, stores included
    pits: Vec<u8>,
    /// Player to move
    active: Player,
}

impl Position {
    /// Fresh game: every pit filled, both stores empty, player 0 to move.
    pub fn new(config: GameConfig) -> Self {
        let mut pits = vec![config.tokens as u8; config.board_len()];
        pits[config.store_index(Player::Zero)] = 0;
        pits[config.store_index(Player::One)] = 0;
        Self {
            config,
            pits,
            active: Player::Zero,
        }
    }

    /// Build a position from raw board contents.
    ///
    /// Only the shape is checked (length and byte capacity); the token total
    /// may differ from a fresh game's, which lets callers set up arbitrary
    /// boards.
    pub fn with_board(config: GameConfig, pits: Vec<u8>, active: Player) -> Result<Self, ConfigError> {
        if pits.len() != config.board_len() {
            return Err(ConfigError::InvalidBoard(format!(
                "expected {} locations, got {}",
                config.board_len(),
                pits.len()
            )));
        }
        let total: usize = pits.iter().map(|&n| n as usize).sum();
        if total > MAX_BOARD_TOKENS {
            return Err(ConfigError::InvalidBoard(format!(
                "{total} tokens on the board, at most {MAX_BOARD_TOKENS} allowed"
            )));
        }
        Ok(Self {
            config,
            pits,
            active,
        })
    }

    #[inline]
    pub fn config(&self) -> GameConfig {
        self.config
    }

    #[inline]
    pub fn pits(&self) -> &[u8] {
        &self.pits
    }

    #[inline]
    pub fn active_player(&self) -> Player {
        self.active
    }

    #[inline]
    pub fn store(&self, player: Player) -> u8 {
        self.pits[self.config.store_index(player)]
    }

    /// Tokens left in a player's playable pits.
    pub fn side_total(&self, player: Player) -> usize {
        self.pits[self.config.pit_range(player)]
            .iter()
            .map(|&n| n as usize)
            .sum()
    }

    /// Tokens on the whole board, stores included.
    pub fn token_total(&self) -> usize {
        self.pits.iter().map(|&n| n as usize).sum()
    }

    /// Move context for the player to move.
    pub fn move_context(&self) -> MoveContext {
        MoveContext {
            player: self.active,
            store: self.config.store_index(self.active),
            opponent_store: self.config.store_index(self.active.opponent()),
        }
    }

    /// Check whether the player to move may sow from `offset`.
    pub fn is_legal(&self, offset: usize) -> bool {
        offset < self.config.locations && self.pits[self.config.pit_index(self.active, offset)] > 0
    }

    /// Pit offsets the player to move can sow from, in increasing order.
    pub fn legal_moves(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.config.locations).filter(move |&offset| self.is_legal(offset))
    }

    /// Play the move at `offset` and return the resulting position.
    ///
    /// `self` is left unchanged.
    ///
    /// # Errors
    /// - [`MoveError::EmptyPit`] if the pit holds no tokens
    /// - [`MoveError::OutOfRange`] if `offset` is not a pit of the mover
    pub fn play_move(&self, offset: usize) -> Result<Position, MoveError> {
        self.play_move_with(self.move_context(), offset)
    }

    /// Same as [`play_move`](Self::play_move) with a precomputed context.
    ///
    /// The board is only cloned once the move is known to be legal.
    pub fn play_move_with(&self, ctx: MoveContext, offset: usize) -> Result<Position, MoveError> {
        self.check_move(ctx, offset)?;
        let mut next = self.clone();
        next.sow(ctx, offset);
        Ok(next)
    }

    /// Play the move at `offset` in place.
    pub fn apply_move(&mut self, offset: usize) -> Result<MoveOutcome, MoveError> {
        let ctx = self.move_context();
        self.check_move(ctx, offset)?;
        Ok(self.sow(ctx, offset))
    }

    fn check_move(&self, ctx: MoveContext, offset: usize) -> Result<(), MoveError> {
        debug_assert_eq!(ctx.player, self.active, "move context belongs to another state");
        if offset >= self.config.locations {
            return Err(MoveError::OutOfRange(offset));
        }
        if self.pits[self.config.pit_index(ctx.player, offset)] == 0 {
            return Err(MoveError::EmptyPit(offset));
        }
        Ok(())
    }

    /// Pick up the pit at `offset` and distribute its tokens.
    ///
    /// The move must have passed `check_move`.
    fn sow(&mut self, ctx: MoveContext, offset: usize) -> MoveOutcome {
        let len = self.pits.len();
        let mut current = self.config.pit_index(ctx.player, offset);
        let mut in_hand = self.pits[current];
        self.pits[current] = 0;

        while in_hand > 0 {
            current = (current + 1) % len;
            if current != ctx.opponent_store {
                self.pits[current] += 1;
                in_hand -= 1;
            }
        }

        if current == ctx.store {
            return MoveOutcome {
                landing: current,
                extra_turn: true,
                captured: 0,
            };
        }

        // For player 1 the lower bound keeps a wrapped-around landing on
        // player 0's side from counting as an own pit.
        let mut captured = 0;
        if self.pits[current] == 1
            && current < ctx.store
            && current >= (ctx.opponent_store + 1) % len
        {
            let opposite = len - 2 - current;
            captured = 1 + self.pits[opposite];
            self.pits[ctx.store] += captured;
            self.pits[opposite] = 0;
            self.pits[current] = 0;
        }

        self.active = ctx.player.opponent();
        MoveOutcome {
            landing: current,
            extra_turn: false,
            captured,
        }
    }

    /// Check whether the game has ended.
    ///
    /// The game is over when either store holds more than half the supply or
    /// either side has no tokens left in its pits.
    pub fn is_game_over(&self) -> bool {
        let threshold = self.config.winning_threshold;
        self.store(Player::Zero) > threshold
            || self.store(Player::One) > threshold
            || self.side_total(Player::Zero) == 0
            || self.side_total(Player::One) == 0
    }
}

//! Game tree enumeration.
//!
//! This module walks every legal move sequence from a starting position and
//! hands each visited state to a [`StateSink`] in depth-first pre-order:
//! a state is emitted as soon as it is produced, before any of its
//! descendants.
//!
//! The walk never recurses. It keeps an explicit stack of frames, one per
//! ancestor that still has untried moves, and resumes the deepest one on
//! every step. Memory is therefore bounded by the length of the longest game,
//! not by the size of the tree.

use std::fmt;
use std::io;

use log::{debug, info, warn};

use crate::codec::Record;
use crate::constants::REPORT_PERIOD;
use crate::error::TreeError;
use crate::position::{MoveContext, Position};

/// Receiver of enumerated states.
///
/// States arrive in pre-order, each exactly once. `terminal` is true when the
/// game is over in that state.
pub trait StateSink {
    fn emit(&mut self, position: &Position, terminal: bool) -> io::Result<()>;
}

impl<S: StateSink + ?Sized> StateSink for &mut S {
    fn emit(&mut self, position: &Position, terminal: bool) -> io::Result<()> {
        (**self).emit(position, terminal)
    }
}

/// Collect every state in memory.
impl StateSink for Vec<Record> {
    fn emit(&mut self, position: &Position, terminal: bool) -> io::Result<()> {
        self.push(Record {
            position: position.clone(),
            terminal,
        });
        Ok(())
    }
}

/// Feed two sinks, first `.0` then `.1`.
impl<A: StateSink, B: StateSink> StateSink for (A, B) {
    fn emit(&mut self, position: &Position, terminal: bool) -> io::Result<()> {
        self.0.emit(position, terminal)?;
        self.1.emit(position, terminal)
    }
}

/// An absent sink drops every state.
impl<S: StateSink> StateSink for Option<S> {
    fn emit(&mut self, position: &Position, terminal: bool) -> io::Result<()> {
        match self {
            Some(sink) => sink.emit(position, terminal),
            None => Ok(()),
        }
    }
}

/// Counters reported by [`enumerate`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TreeStats {
    /// Terminal states emitted (finished games)
    pub games: u64,
    /// States emitted, the starting position included
    pub states: u64,
    /// Non-terminal states without a single legal move
    pub dead_ends: u64,
    /// Largest number of frames held at once
    pub max_depth: usize,
}

impl fmt::Display for TreeStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "total games: {}\ntotal states: {}", self.games, self.states)
    }
}

/// A suspended state: the position plus the next move to try from it.
struct Frame {
    position: Position,
    ctx: MoveContext,
    /// Next pit offset to try
    cursor: usize,
    /// Children produced so far
    children: usize,
    /// Plies from the starting position
    depth: usize,
}

impl Frame {
    fn new(position: Position, depth: usize) -> Self {
        let ctx = position.move_context();
        Self {
            position,
            ctx,
            cursor: 0,
            children: 0,
            depth,
        }
    }

    /// Advance the cursor to the next legal move and play it.
    fn next_child(&mut self, locations: usize) -> Option<Position> {
        while self.cursor < locations {
            let offset = self.cursor;
            self.cursor += 1;
            if let Ok(child) = self.position.play_move_with(self.ctx, offset) {
                self.children += 1;
                return Some(child);
            }
        }
        None
    }
}

/// A state handed out by [`Preorder::next_visit`].
#[derive(Debug)]
pub struct Visit<'a> {
    pub position: &'a Position,
    pub terminal: bool,
    /// Plies from the starting position
    pub depth: usize,
}

/// Owned counterpart of [`Visit`], yielded by the [`Preorder`] iterator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreeNode {
    pub position: Position,
    pub terminal: bool,
    pub depth: usize,
}

/// Lazy pre-order walk over the game tree below a position.
///
/// The starting position comes first, then each child followed by its whole
/// subtree, children ordered by pit offset.
pub struct Preorder {
    stack: Vec<Frame>,
    /// Starting position, until it has been visited
    root: Option<Position>,
    /// Last terminal state handed out (terminal states never get a frame)
    leaf: Option<Position>,
    locations: usize,
    dead_ends: u64,
    max_depth: usize,
}

impl Preorder {
    pub fn new(initial: Position) -> Self {
        let locations = initial.config().locations_per_player();
        Self {
            stack: Vec::new(),
            root: Some(initial),
            leaf: None,
            locations,
            dead_ends: 0,
            max_depth: 0,
        }
    }

    /// Non-terminal states found without any legal move so far.
    pub fn dead_ends(&self) -> u64 {
        self.dead_ends
    }

    /// Largest number of frames held at once so far.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    fn push(&mut self, frame: Frame) {
        self.stack.push(frame);
        self.max_depth = self.max_depth.max(self.stack.len());
    }

    /// Produce the next state without cloning it.
    pub fn next_visit(&mut self) -> Option<Visit<'_>> {
        if let Some(root) = self.root.take() {
            if root.is_game_over() {
                let leaf = self.leaf.insert(root);
                return Some(Visit {
                    position: leaf,
                    terminal: true,
                    depth: 0,
                });
            }
            self.push(Frame::new(root, 0));
            let top = self.stack.last()?;
            return Some(Visit {
                position: &top.position,
                terminal: false,
                depth: 0,
            });
        }

        loop {
            let mut frame = self.stack.pop()?;
            let Some(child) = frame.next_child(self.locations) else {
                if frame.children == 0 {
                    self.dead_ends += 1;
                    warn!(
                        "no legal move from non-terminal state {:?} ({} to move)",
                        frame.position.pits(),
                        frame.position.active_player()
                    );
                }
                continue;
            };

            let depth = frame.depth + 1;
            if frame.cursor < self.locations {
                self.push(frame);
            }

            if child.is_game_over() {
                let leaf = self.leaf.insert(child);
                return Some(Visit {
                    position: leaf,
                    terminal: true,
                    depth,
                });
            }

            self.push(Frame::new(child, depth));
            let top = self.stack.last()?;
            return Some(Visit {
                position: &top.position,
                terminal: false,
                depth,
            });
        }
    }
}

impl Iterator for Preorder {
    type Item = TreeNode;

    fn next(&mut self) -> Option<TreeNode> {
        self.next_visit().map(|visit| TreeNode {
            position: visit.position.clone(),
            terminal: visit.terminal,
            depth: visit.depth,
        })
    }
}

/// Emit every state reachable from `initial` to `sink`, in pre-order.
///
/// `initial` itself is emitted first. Counters in the returned [`TreeStats`]
/// stay at zero unless `collect_metrics` is set.
///
/// # Errors
/// Returns [`TreeError::Io`] as soon as the sink fails; the walk cannot be
/// resumed afterwards.
pub fn enumerate<S: StateSink + ?Sized>(
    initial: &Position,
    sink: &mut S,
    collect_metrics: bool,
) -> Result<TreeStats, TreeError> {
    debug!("enumerating {} game tree", initial.config());

    let mut walker = Preorder::new(initial.clone());
    let mut stats = TreeStats::default();

    while let Some(visit) = walker.next_visit() {
        sink.emit(visit.position, visit.terminal)?;

        if collect_metrics {
            stats.states += 1;
            if visit.terminal {
                stats.games += 1;
            }
            if stats.states % REPORT_PERIOD == 0 {
                info!(
                    "{} states, {} games, depth {}",
                    stats.states, stats.games, visit.depth
                );
            }
        }
    }

    if collect_metrics {
        stats.dead_ends = walker.dead_ends();
        stats.max_depth = walker.max_depth();
    }
    debug!(
        "finished {} game tree: {} states, {} games",
        initial.config(),
        stats.states,
        stats.games
    );
    Ok(stats)
}

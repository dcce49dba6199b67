//! Partitioned tree generation.
//!
//! The subtrees below the starting position's first moves are independent,
//! so each one is enumerated by its own rayon task into a private buffer.
//! The starting position is written first and the buffers follow in move
//! order. A pre-order listing is exactly the root followed by each child's
//! subtree in move order, so the output matches [`enumerate`] byte for byte.
//!
//! Every partition is held in memory until all of them are done, so peak
//! memory is the encoded size of the whole tree.

use std::io::Write;

use log::debug;
use rayon::prelude::*;

use crate::codec::{Framing, RecordWriter};
use crate::error::TreeError;
use crate::position::Position;
use crate::tree::{StateSink, TreeStats, enumerate};

/// Parallel counterpart of [`enumerate`] writing encoded records to `out`.
///
/// `max_depth` in the result counts the root frame on top of the deepest
/// partition.
pub fn enumerate_partitioned<W: Write>(
    initial: &Position,
    out: &mut W,
    framing: Framing,
    collect_metrics: bool,
) -> Result<TreeStats, TreeError> {
    let mut stats = TreeStats::default();
    let root_terminal = initial.is_game_over();
    RecordWriter::new(&mut *out, framing).emit(initial, root_terminal)?;
    if collect_metrics {
        stats.states = 1;
        stats.games = root_terminal as u64;
    }
    if root_terminal {
        return Ok(stats);
    }

    let children: Vec<(usize, Position)> = initial
        .legal_moves()
        .filter_map(|offset| initial.play_move(offset).ok().map(|child| (offset, child)))
        .collect();
    if children.is_empty() && collect_metrics {
        stats.dead_ends = 1;
    }
    debug!(
        "splitting {} game tree into {} partitions",
        initial.config(),
        children.len()
    );

    let partitions: Vec<Result<(Vec<u8>, TreeStats), TreeError>> = children
        .par_iter()
        .map(|(offset, child)| {
            let mut writer = RecordWriter::new(Vec::new(), framing);
            let part = enumerate(child, &mut writer, collect_metrics)?;
            debug!(
                "partition {offset}: {} records, {} bytes",
                writer.records_written(),
                writer.bytes_written()
            );
            Ok((writer.into_inner(), part))
        })
        .collect();

    for partition in partitions {
        let (bytes, part) = partition?;
        out.write_all(&bytes)?;
        if collect_metrics {
            stats.games += part.games;
            stats.states += part.states;
            stats.dead_ends += part.dead_ends;
            stats.max_depth = stats.max_depth.max(part.max_depth + 1);
        }
    }
    Ok(stats)
}

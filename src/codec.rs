//! Binary record format of serialized game trees.
//!
//! A tree file is a flat sequence of records, one per visited state, with no
//! header. Two framings are supported:
//!
//! - [`Framing::Trailing`]: player byte, one byte per board location, and a
//!   `0xFF` marker appended to terminal records only.
//! - [`Framing::Flagged`]: player byte, a flag byte (`0x00` or `0xFF`), then
//!   the board. Every record has the same length.
//!
//! Board dimensions are not stored in the stream; readers get them from the
//! file name (see [`tree_file`](crate::tree_file)).

use std::fmt;
use std::io::{self, BufRead, ErrorKind, Write};
use std::str::FromStr;

use log::warn;

use crate::constants::{NON_TERMINAL_FLAG, TERMINAL_MARKER};
use crate::error::TreeError;
use crate::position::{GameConfig, Player, Position};
use crate::tree::{StateSink, TreeStats};

/// Record layout.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Framing {
    /// Terminal records carry a trailing `0xFF`
    #[default]
    Trailing,
    /// Fixed-length records with a flag byte after the player byte
    Flagged,
}

impl Framing {
    /// Bytes in front of the board.
    #[inline]
    pub const fn header_len(self) -> usize {
        match self {
            Framing::Trailing => 1,
            Framing::Flagged => 2,
        }
    }

    /// Encoded length of one record.
    pub const fn record_len(self, config: &GameConfig, terminal: bool) -> usize {
        match self {
            Framing::Trailing => config.board_len() + 1 + terminal as usize,
            Framing::Flagged => config.board_len() + 2,
        }
    }
}

impl fmt::Display for Framing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Framing::Trailing => f.write_str("trailing"),
            Framing::Flagged => f.write_str("flagged"),
        }
    }
}

impl FromStr for Framing {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "trailing" => Ok(Framing::Trailing),
            "flagged" => Ok(Framing::Flagged),
            other => Err(format!("unknown framing '{other}' (expected 'trailing' or 'flagged')")),
        }
    }
}

/// Append the encoding of one state to `out`.
pub fn encode_into(position: &Position, terminal: bool, framing: Framing, out: &mut Vec<u8>) {
    out.push(position.active_player().to_byte());
    if framing == Framing::Flagged {
        out.push(if terminal { TERMINAL_MARKER } else { NON_TERMINAL_FLAG });
    }
    out.extend_from_slice(position.pits());
    if terminal && framing == Framing::Trailing {
        out.push(TERMINAL_MARKER);
    }
}

impl Position {
    /// Encode this state with the default (trailing marker) framing.
    pub fn to_bytes(&self, terminal: bool) -> Vec<u8> {
        let config = self.config();
        let mut out = Vec::with_capacity(Framing::Trailing.record_len(&config, terminal));
        encode_into(self, terminal, Framing::Trailing, &mut out);
        out
    }
}

/// A decoded state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    pub position: Position,
    pub terminal: bool,
}

/// Sink that encodes every emitted state to a byte stream.
pub struct RecordWriter<W: Write> {
    inner: W,
    framing: Framing,
    scratch: Vec<u8>,
    records: u64,
    bytes: u64,
}

impl<W: Write> RecordWriter<W> {
    pub fn new(inner: W, framing: Framing) -> Self {
        Self {
            inner,
            framing,
            scratch: Vec::new(),
            records: 0,
            bytes: 0,
        }
    }

    pub fn framing(&self) -> Framing {
        self.framing
    }

    pub fn records_written(&self) -> u64 {
        self.records
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> StateSink for RecordWriter<W> {
    fn emit(&mut self, position: &Position, terminal: bool) -> io::Result<()> {
        self.scratch.clear();
        encode_into(position, terminal, self.framing, &mut self.scratch);
        self.inner.write_all(&self.scratch)?;
        self.records += 1;
        self.bytes += self.scratch.len() as u64;
        Ok(())
    }
}

/// Streaming decoder for a tree file.
///
/// Yields one [`Record`] per state and stops at the first error.
pub struct TreeReader<R: BufRead> {
    inner: R,
    config: GameConfig,
    framing: Framing,
    offset: u64,
    finished: bool,
}

impl<R: BufRead> TreeReader<R> {
    pub fn new(inner: R, config: GameConfig, framing: Framing) -> Self {
        Self {
            inner,
            config,
            framing,
            offset: 0,
            finished: false,
        }
    }

    /// Bytes consumed so far.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    fn read_record(&mut self) -> Result<Option<Record>, TreeError> {
        let start = self.offset;
        let expected = self.framing.header_len() + self.config.board_len();
        let mut bytes = vec![0u8; expected];
        let actual = read_full(&mut self.inner, &mut bytes)?;
        if actual == 0 {
            return Ok(None);
        }
        if actual < expected {
            return Err(TreeError::Truncated {
                offset: start,
                expected,
                actual,
            });
        }
        self.offset += actual as u64;

        let player = Player::from_byte(bytes[0]).ok_or_else(|| TreeError::CorruptRecord {
            offset: start,
            reason: format!("invalid player byte {:#04x}", bytes[0]),
        })?;

        let terminal = match self.framing {
            Framing::Trailing => self.take_marker()?,
            Framing::Flagged => match bytes[1] {
                TERMINAL_MARKER => true,
                NON_TERMINAL_FLAG => false,
                other => {
                    return Err(TreeError::CorruptRecord {
                        offset: start,
                        reason: format!("invalid terminal flag {other:#04x}"),
                    });
                }
            },
        };

        bytes.drain(..self.framing.header_len());
        let position = Position::with_board(self.config, bytes, player).map_err(|e| {
            TreeError::CorruptRecord {
                offset: start,
                reason: e.to_string(),
            }
        })?;
        Ok(Some(Record { position, terminal }))
    }

    /// Consume a trailing terminal marker if one follows.
    ///
    /// Records start with a player byte (0 or 1), so `0xFF` at this point can
    /// only be a marker.
    fn take_marker(&mut self) -> io::Result<bool> {
        let next = loop {
            match self.inner.fill_buf() {
                Ok(buf) => break buf.first().copied(),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        };
        if next == Some(TERMINAL_MARKER) {
            self.inner.consume(1);
            self.offset += 1;
            return Ok(true);
        }
        Ok(false)
    }
}

impl<R: BufRead> Iterator for TreeReader<R> {
    type Item = Result<Record, TreeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.read_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

/// Decode a whole in-memory tree.
pub fn decode(bytes: &[u8], config: GameConfig, framing: Framing) -> Result<Vec<Record>, TreeError> {
    TreeReader::new(bytes, config, framing).collect()
}

/// Outcome of [`verify`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct StreamCheck {
    /// Records read and terminal records among them
    pub stats: TreeStats,
    /// Records whose terminal marker disagrees with the decoded state
    pub wrong_markers: u64,
}

/// Read every record of `reader`, check it, and pass it on to `sink`.
///
/// A record holding the wrong number of tokens is reported as
/// [`TreeError::CorruptRecord`]. Wrong terminal markers are only counted.
pub fn verify<R: BufRead, S: StateSink + ?Sized>(
    mut reader: TreeReader<R>,
    sink: &mut S,
) -> Result<StreamCheck, TreeError> {
    let expected_tokens = reader.config.total_tokens();
    let mut check = StreamCheck::default();
    loop {
        let start = reader.offset();
        let Some(record) = reader.next().transpose()? else {
            break;
        };
        check.stats.states += 1;
        check.stats.games += record.terminal as u64;

        let tokens = record.position.token_total();
        if tokens != expected_tokens {
            return Err(TreeError::CorruptRecord {
                offset: start,
                reason: format!("holds {tokens} tokens, expected {expected_tokens}"),
            });
        }
        if record.terminal != record.position.is_game_over() {
            warn!("record {} at byte {start} has a wrong terminal marker", check.stats.states);
            check.wrong_markers += 1;
        }
        sink.emit(&record.position, record.terminal)?;
    }
    Ok(check)
}

/// Fill `buf` as far as the reader allows. Returns the number of bytes read.
fn read_full<R: io::Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

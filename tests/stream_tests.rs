//! Tree stream tests: writer, reader and file naming working together.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};

use mancala_tree::codec::{Framing, Record, RecordWriter, TreeReader, decode};
use mancala_tree::constants::TERMINAL_MARKER;
use mancala_tree::error::TreeError;
use mancala_tree::position::{GameConfig, Position};
use mancala_tree::tree::enumerate;
use mancala_tree::tree_file::{create_tree_file, file_name, parse_path};

// =============================================================================
// Helper functions
// =============================================================================

fn config(locations: usize, tokens: usize) -> GameConfig {
    GameConfig::new(locations, tokens).unwrap()
}

fn collect_tree(config: GameConfig) -> Vec<Record> {
    let mut sink: Vec<Record> = Vec::new();
    enumerate(&Position::new(config), &mut sink, false).unwrap();
    sink
}

fn write_tree(config: GameConfig, framing: Framing) -> Vec<u8> {
    let mut writer = RecordWriter::new(Vec::new(), framing);
    enumerate(&Position::new(config), &mut writer, false).unwrap();
    writer.into_inner()
}

/// Writer that fails once `limit` bytes have been accepted.
struct FailingWriter {
    written: usize,
    limit: usize,
}

impl Write for FailingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.written + buf.len() > self.limit {
            return Err(io::Error::other("disk full"));
        }
        self.written += buf.len();
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// =============================================================================
// Round trips
// =============================================================================

#[test]
fn test_reader_recovers_written_tree() {
    for (l, t) in [(2, 1), (2, 2), (3, 1)] {
        let config = config(l, t);
        let expected = collect_tree(config);
        for framing in [Framing::Trailing, Framing::Flagged] {
            let bytes = write_tree(config, framing);
            let decoded = decode(&bytes, config, framing).unwrap();
            assert_eq!(decoded, expected, "{config} {framing}");
        }
    }
}

#[test]
fn test_record_lengths() {
    let config = config(2, 2);
    let records = collect_tree(config);
    let terminal = records.iter().filter(|r| r.terminal).count();
    let len = config.board_len();

    let trailing = write_tree(config, Framing::Trailing);
    assert_eq!(trailing.len(), records.len() * (len + 1) + terminal);

    let flagged = write_tree(config, Framing::Flagged);
    assert_eq!(flagged.len(), records.len() * (len + 2));
}

#[test]
fn test_terminal_markers_match_states() {
    let config = config(3, 1);
    let records = collect_tree(config);
    let bytes = write_tree(config, Framing::Trailing);
    let len = config.board_len();

    // Walk the raw bytes by hand
    let mut at = 0;
    for record in &records {
        assert_eq!(bytes[at], record.position.active_player().to_byte());
        assert_eq!(&bytes[at + 1..at + 1 + len], record.position.pits());
        at += len + 1;
        let marked = bytes.get(at) == Some(&TERMINAL_MARKER);
        assert_eq!(marked, record.terminal);
        assert_eq!(marked, record.position.is_game_over());
        if marked {
            at += 1;
        }
    }
    assert_eq!(at, bytes.len());
}

#[test]
fn test_wrong_framing_is_detected() {
    let config = config(2, 1);
    let bytes = write_tree(config, Framing::Trailing);
    // The second byte of a trailing record is a pit count, not a flag
    let result = decode(&bytes, config, Framing::Flagged);
    assert!(result.is_err());
}

#[test]
fn test_truncated_stream() {
    let config = config(2, 1);
    let mut bytes = write_tree(config, Framing::Trailing);
    bytes.truncate(bytes.len() - 3);

    let mut reader = TreeReader::new(&bytes[..], config, Framing::Trailing);
    let mut ok = 0;
    let err = loop {
        match reader.next() {
            Some(Ok(_)) => ok += 1,
            Some(Err(e)) => break e,
            None => panic!("truncation not reported"),
        }
    };
    assert_eq!(ok, 7);
    assert!(matches!(err, TreeError::Truncated { expected: 7, actual: 5, .. }));
    assert!(reader.next().is_none());
}

// =============================================================================
// Sink failures
// =============================================================================

#[test]
fn test_sink_error_stops_enumeration() {
    let mut writer = RecordWriter::new(FailingWriter { written: 0, limit: 20 }, Framing::Trailing);
    let result = enumerate(&Position::new(config(2, 1)), &mut writer, true);
    assert!(matches!(result, Err(TreeError::Io(_))));
    // Two 7-byte records fit, the third does not
    assert_eq!(writer.records_written(), 2);
    assert_eq!(writer.get_ref().written, 14);
}

// =============================================================================
// Files on disk
// =============================================================================

#[test]
fn test_file_round_trip() {
    let tmp = tempfile::tempdir().unwrap();
    let config = config(2, 2);

    let (path, file) = create_tree_file(tmp.path(), config).unwrap();
    assert_eq!(path.file_name().unwrap().to_str().unwrap(), file_name(config));
    {
        let mut out = BufWriter::new(file);
        let mut writer = RecordWriter::new(&mut out, Framing::Trailing);
        enumerate(&Position::new(config), &mut writer, false).unwrap();
        out.flush().unwrap();
    }

    let parsed = parse_path(&path).unwrap();
    assert_eq!(parsed, config);
    let reader = TreeReader::new(BufReader::new(File::open(&path).unwrap()), parsed, Framing::Trailing);
    let records: Vec<Record> = reader.collect::<Result<_, _>>().unwrap();
    assert_eq!(records, collect_tree(config));
}

#[test]
fn test_created_files_are_numbered() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path();
    let config = config(6, 4);

    let (first, _) = create_tree_file(dir, config).unwrap();
    assert_eq!(first, dir.join("6l4t.mantree"));
    fs::write(&first, [0u8, 4]).unwrap();

    let (second, _) = create_tree_file(dir, config).unwrap();
    assert_eq!(second, dir.join("6l4t(1).mantree"));
    let (third, _) = create_tree_file(dir, config).unwrap();
    assert_eq!(third, dir.join("6l4t(2).mantree"));

    // Earlier files keep their contents
    assert_eq!(fs::read(&first).unwrap(), vec![0, 4]);
    assert_eq!(parse_path(&third).unwrap(), config);
}

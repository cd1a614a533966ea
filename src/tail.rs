//! Bounded reverse-tail log reader.
//!
//! Recovers the last N newline-delimited records of an append-only file by
//! reading backward in fixed-size chunks, so only the tail of a large file
//! is ever touched.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

/// Backward read step, capped at the file size.
const CHUNK_SIZE: u64 = 1024 * 1024;

/// Read the last `limit` lines of the file at `path`.
///
/// Returns every line when the file holds fewer than `limit`. Lines are
/// lossy UTF-8 decoded with the trailing `\r` stripped; a trailing newline
/// is treated as a record terminator, not an empty record.
pub fn read_last_lines(path: &Path, limit: usize) -> io::Result<Vec<String>> {
    read_last_lines_chunked(path, limit, CHUNK_SIZE)
}

fn read_last_lines_chunked(path: &Path, limit: usize, chunk_size: u64) -> io::Result<Vec<String>> {
    let mut file = File::open(path)?;
    let size = file.seek(SeekFrom::End(0))?;
    let step = chunk_size.min(size).max(1);

    // Accumulate whole chunks front-to-back until the buffer is known to
    // span at least `limit` complete lines, or the file start is reached.
    // One newline more than `limit` is required so a line cut at a chunk
    // boundary can never leak out truncated.
    let mut buf: Vec<u8> = Vec::new();
    let mut pos = size;
    while pos > 0 && newline_count(&buf) <= limit {
        let start = pos.saturating_sub(step);
        let mut chunk = vec![0u8; (pos - start) as usize];
        file.seek(SeekFrom::Start(start))?;
        file.read_exact(&mut chunk)?;
        chunk.extend_from_slice(&buf);
        buf = chunk;
        pos = start;
    }

    let mut lines: Vec<String> = buf
        .split(|b| *b == b'\n')
        .map(|raw| String::from_utf8_lossy(raw).trim_end_matches('\r').to_string())
        .collect();
    if lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    if lines.len() > limit {
        lines.drain(..lines.len() - limit);
    }
    Ok(lines)
}

fn newline_count(buf: &[u8]) -> usize {
    buf.iter().filter(|b| **b == b'\n').count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn log_with_lines(lines: &[String]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        file.flush().unwrap();
        file
    }

    #[test]
    fn short_file_returns_every_line() {
        let file = log_with_lines(&["a".into(), "b".into(), "c".into()]);
        let lines = read_last_lines(file.path(), 10).unwrap();
        assert_eq!(lines, vec!["a", "b", "c"]);
    }

    #[test]
    fn long_file_returns_exactly_the_last_n() {
        let all: Vec<String> = (0..500).map(|i| format!("record-{}", i)).collect();
        let file = log_with_lines(&all);
        let lines = read_last_lines(file.path(), 100).unwrap();
        assert_eq!(lines.len(), 100);
        assert_eq!(lines, all[400..].to_vec());
    }

    #[test]
    fn multi_chunk_accumulation_matches_a_single_read() {
        let all: Vec<String> = (0..200).map(|i| format!("entry {:03}", i)).collect();
        let file = log_with_lines(&all);
        // A chunk smaller than one line forces many backward reads.
        let chunked = read_last_lines_chunked(file.path(), 50, 7).unwrap();
        let whole = read_last_lines(file.path(), 50).unwrap();
        assert_eq!(chunked, whole);
        assert_eq!(chunked, all[150..].to_vec());
    }

    #[test]
    fn file_without_trailing_newline_keeps_the_final_record() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "a\nb\nc").unwrap();
        file.flush().unwrap();
        let lines = read_last_lines(file.path(), 2).unwrap();
        assert_eq!(lines, vec!["b", "c"]);
    }

    #[test]
    fn empty_file_returns_nothing() {
        let file = NamedTempFile::new().unwrap();
        assert!(read_last_lines(file.path(), 5).unwrap().is_empty());
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(read_last_lines(Path::new("/nonexistent/kitchen/app.log"), 5).is_err());
    }
}

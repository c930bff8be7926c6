//! Buffered line reading over a storage backend.
//!
//! The cursor reads the log in fixed-size chunks and splits it on the
//! delimiter. Unlike a plain buffered reader it keeps the difference between
//! a clean end of log and a trailing fragment without a delimiter, which is
//! how a torn append from an interrupted process is detected.

use crate::error::CoreResult;
use crate::record::DELIMITER;
use bm_storage::StorageBackend;

/// Read chunk size.
const READ_CHUNK_SIZE: usize = 8 * 1024;

/// One step of a log scan.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum LogLine {
    /// A delimited line, delimiter stripped.
    Complete {
        /// Offset of the first byte of the line.
        offset: u64,
        /// Line content.
        bytes: Vec<u8>,
    },
    /// Bytes after the last delimiter that are not just whitespace.
    ///
    /// Returned again on every read until the cursor is moved.
    Torn {
        /// Offset of the first byte of the fragment.
        offset: u64,
        /// Fragment content.
        bytes: Vec<u8>,
    },
    /// Clean end of log.
    End,
}

/// Read position within the log.
#[derive(Debug, Default)]
pub(crate) struct LogCursor {
    /// Log offset of `pending[0]`.
    offset: u64,
    /// Bytes read ahead but not consumed yet.
    pending: Vec<u8>,
}

impl LogCursor {
    /// Moves the cursor to the start of the log.
    pub(crate) fn reset(&mut self) {
        self.seek(0);
    }

    /// Moves the cursor to `offset`, dropping read-ahead.
    pub(crate) fn seek(&mut self, offset: u64) {
        self.offset = offset;
        self.pending.clear();
    }

    /// Returns the offset of the next unconsumed byte.
    pub(crate) fn position(&self) -> u64 {
        self.offset
    }

    /// Reads the next line from `backend`.
    pub(crate) fn next_line(&mut self, backend: &dyn StorageBackend) -> CoreResult<LogLine> {
        let mut searched = 0;
        loop {
            if let Some(pos) = self.pending[searched..]
                .iter()
                .position(|&b| b == DELIMITER)
            {
                let end = searched + pos;
                let mut bytes: Vec<u8> = self.pending.drain(..=end).collect();
                bytes.pop();
                let offset = self.offset;
                self.offset += end as u64 + 1;
                return Ok(LogLine::Complete { offset, bytes });
            }
            searched = self.pending.len();

            let size = backend.size()?;
            let read_from = self.offset + self.pending.len() as u64;
            if read_from >= size {
                let bytes = std::mem::take(&mut self.pending);
                if bytes.trim_ascii().is_empty() {
                    self.offset = read_from;
                    return Ok(LogLine::End);
                }
                // The cursor stays on the fragment, so later reads see it too.
                return Ok(LogLine::Torn {
                    offset: self.offset,
                    bytes,
                });
            }

            let len = (size - read_from).min(READ_CHUNK_SIZE as u64) as usize;
            let chunk = backend.read_at(read_from, len)?;
            self.pending.extend_from_slice(&chunk);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bm_storage::InMemoryBackend;

    fn lines(data: &[u8]) -> Vec<LogLine> {
        let backend = InMemoryBackend::with_data(data.to_vec());
        let mut cursor = LogCursor::default();
        let mut out = Vec::new();
        loop {
            let line = cursor.next_line(&backend).unwrap();
            let done = matches!(line, LogLine::End | LogLine::Torn { .. });
            out.push(line);
            if done {
                return out;
            }
        }
    }

    fn complete(offset: u64, bytes: &[u8]) -> LogLine {
        LogLine::Complete {
            offset,
            bytes: bytes.to_vec(),
        }
    }

    #[test]
    fn empty_log_is_clean_end() {
        assert_eq!(lines(b""), vec![LogLine::End]);
    }

    #[test]
    fn splits_on_delimiter() {
        assert_eq!(
            lines(b"one\ntwo\n"),
            vec![complete(0, b"one"), complete(4, b"two"), LogLine::End]
        );
    }

    #[test]
    fn trailing_fragment_is_torn() {
        let torn = LogLine::Torn {
            offset: 4,
            bytes: b"{\"ID\":".to_vec(),
        };
        assert_eq!(lines(b"one\n{\"ID\":"), vec![complete(0, b"one"), torn]);
    }

    #[test]
    fn torn_fragment_repeats_until_seek() {
        let backend = InMemoryBackend::with_data(b"one\nfrag".to_vec());
        let mut cursor = LogCursor::default();
        let torn = LogLine::Torn {
            offset: 4,
            bytes: b"frag".to_vec(),
        };

        assert_eq!(cursor.next_line(&backend).unwrap(), complete(0, b"one"));
        assert_eq!(cursor.next_line(&backend).unwrap(), torn);
        assert_eq!(cursor.next_line(&backend).unwrap(), torn);
        assert_eq!(cursor.position(), 4);

        cursor.seek(8);
        assert_eq!(cursor.next_line(&backend).unwrap(), LogLine::End);
    }

    #[test]
    fn trailing_whitespace_is_clean_end() {
        assert_eq!(lines(b"one\n  \t"), vec![complete(0, b"one"), LogLine::End]);
    }

    #[test]
    fn lines_longer_than_a_chunk() {
        let long = vec![b'x'; READ_CHUNK_SIZE * 2 + 17];
        let mut data = long.clone();
        data.push(b'\n');
        data.extend_from_slice(b"short\n");

        assert_eq!(
            lines(&data),
            vec![
                complete(0, &long),
                complete(long.len() as u64 + 1, b"short"),
                LogLine::End,
            ]
        );
    }

    #[test]
    fn reset_rereads_from_start() {
        let backend = InMemoryBackend::with_data(b"a\nb\n".to_vec());
        let mut cursor = LogCursor::default();

        assert_eq!(cursor.next_line(&backend).unwrap(), complete(0, b"a"));
        cursor.reset();
        assert_eq!(cursor.next_line(&backend).unwrap(), complete(0, b"a"));
        assert_eq!(cursor.position(), 2);
    }

    proptest::proptest! {
        #[test]
        fn framing_recovers_every_line(
            content in proptest::collection::vec(
                proptest::collection::vec(b'a'..=b'z', 0..3000),
                0..12,
            ),
        ) {
            let mut data = Vec::new();
            let mut expected = Vec::new();
            for line in &content {
                expected.push(complete(data.len() as u64, line));
                data.extend_from_slice(line);
                data.push(DELIMITER);
            }
            expected.push(LogLine::End);

            proptest::prop_assert_eq!(lines(&data), expected);
        }
    }

    #[test]
    fn sees_appends_after_clean_end() {
        let mut backend = InMemoryBackend::with_data(b"a\n".to_vec());
        let mut cursor = LogCursor::default();

        assert_eq!(cursor.next_line(&backend).unwrap(), complete(0, b"a"));
        assert_eq!(cursor.next_line(&backend).unwrap(), LogLine::End);

        backend.append(b"b\n").unwrap();
        assert_eq!(cursor.next_line(&backend).unwrap(), complete(2, b"b"));
    }
}

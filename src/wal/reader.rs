use crate::wal::record::{
    rolling_crc, LogRecord, LogRecordType, CRC_SEED, FRAME_HEADER_LEN, MAX_RECORD_LEN,
};
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Corruption classes a segment scan can terminate with. All of them are
/// "possibly repairable": the bytes up to the last intact frame boundary
/// were already surfaced to the caller.
#[derive(Debug, Error)]
pub enum Corruption {
    #[error("unexpected end of file inside a record frame")]
    TruncatedFrame,

    #[error("record length {0} exceeds the {MAX_RECORD_LEN} byte cap")]
    OversizedRecord(usize),

    #[error("crc mismatch: stored {stored:#010x}, computed {computed:#010x}")]
    CrcMismatch { stored: u32, computed: u32 },

    #[error("undecodable log record")]
    BadRecord(#[source] bincode::Error),
}

#[derive(Debug, Error)]
pub enum WalError {
    /// Truncated or checksum-mismatched record. Advisory: the caller may
    /// keep the partial results and continue to the next file.
    #[error("file {path} ended with repairable corruption")]
    PossiblyRepairable {
        path: PathBuf,
        #[source]
        source: Corruption,
    },

    /// Any I/O failure other than clean end-of-stream.
    #[error("failed reading file {path}")]
    ReadFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Result of scanning one segment to its terminal condition. `payloads`
/// holds every `Entry` record read before termination, in log order, even
/// when `error` is set.
#[derive(Debug)]
pub struct SegmentScan {
    pub payloads: Vec<Vec<u8>>,
    /// physical records read, control records included; diagnostics only
    pub records_read: u32,
    /// running CRC at termination
    pub crc: u32,
    pub error: Option<WalError>,
}

enum FrameError {
    Corrupt(Corruption),
    Io(io::Error),
}

/// Sequential reader over one open segment. The file handle is released on
/// every exit path when the reader drops.
struct SegmentReader {
    file: BufReader<File>,
    crc: u32,
    records_read: u32,
}

/// Reads until `buf` is full or EOF; returns the number of bytes read.
/// Unlike `read_exact`, a zero return cleanly distinguishes a frame
/// boundary from a frame cut short.
fn read_full(reader: &mut impl Read, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

impl SegmentReader {
    fn open(path: &Path) -> io::Result<Self> {
        Ok(Self {
            file: BufReader::new(File::open(path)?),
            crc: CRC_SEED,
            records_read: 0,
        })
    }

    /// Reads exactly one physical record. `Ok(None)` is a clean EOF: zero
    /// bytes were available exactly at a frame boundary.
    fn read_record(&mut self) -> Result<Option<LogRecord>, FrameError> {
        let mut header = [0u8; FRAME_HEADER_LEN];
        match read_full(&mut self.file, &mut header) {
            Ok(0) => return Ok(None),
            Ok(n) if n < FRAME_HEADER_LEN => {
                return Err(FrameError::Corrupt(Corruption::TruncatedFrame))
            }
            Ok(_) => {}
            Err(e) => return Err(FrameError::Io(e)),
        }

        let len = u32::from_le_bytes([header[0], header[1], header[2], header[3]]) as usize;
        let stored = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);
        if len > MAX_RECORD_LEN {
            return Err(FrameError::Corrupt(Corruption::OversizedRecord(len)));
        }

        let padded = len + crate::wal::record::padding_for(len);
        let mut payload = vec![0u8; padded];
        match read_full(&mut self.file, &mut payload) {
            Ok(n) if n < padded => return Err(FrameError::Corrupt(Corruption::TruncatedFrame)),
            Ok(_) => {}
            Err(e) => return Err(FrameError::Io(e)),
        }
        payload.truncate(len);

        let computed = rolling_crc(self.crc, &payload);
        if computed != stored {
            return Err(FrameError::Corrupt(Corruption::CrcMismatch { stored, computed }));
        }

        let record: LogRecord = bincode::deserialize(&payload)
            .map_err(|e| FrameError::Corrupt(Corruption::BadRecord(e)))?;

        self.crc = computed;
        self.records_read += 1;
        Ok(Some(record))
    }
}

/// Scans one log segment to completion, accumulating `Entry` payloads and
/// classifying the terminal condition. Clean EOF is the only non-error
/// termination; corruption and I/O failures still return whatever was read.
pub fn read_segment(path: &Path) -> SegmentScan {
    let mut reader = match SegmentReader::open(path) {
        Ok(reader) => reader,
        Err(source) => {
            return SegmentScan {
                payloads: Vec::new(),
                records_read: 0,
                crc: CRC_SEED,
                error: Some(WalError::ReadFailure {
                    path: path.to_path_buf(),
                    source,
                }),
            }
        }
    };

    let mut payloads = Vec::new();
    loop {
        match reader.read_record() {
            Ok(Some(record)) => {
                debug!(
                    "read record #{} from {}",
                    reader.records_read,
                    path.display()
                );
                if let LogRecordType::Entry = record.record_type {
                    payloads.push(record.data);
                }
            }
            Ok(None) => {
                debug!(
                    "reached EOF after {} records in {}; CRC: {:08X}",
                    reader.records_read,
                    path.display(),
                    reader.crc
                );
                return SegmentScan {
                    payloads,
                    records_read: reader.records_read,
                    crc: reader.crc,
                    error: None,
                };
            }
            Err(FrameError::Corrupt(source)) => {
                return SegmentScan {
                    payloads,
                    records_read: reader.records_read,
                    crc: reader.crc,
                    error: Some(WalError::PossiblyRepairable {
                        path: path.to_path_buf(),
                        source,
                    }),
                }
            }
            Err(FrameError::Io(source)) => {
                return SegmentScan {
                    payloads,
                    records_read: reader.records_read,
                    crc: reader.crc,
                    error: Some(WalError::ReadFailure {
                        path: path.to_path_buf(),
                        source,
                    }),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wal::record::encode_frame;
    use std::io::Write;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("walscan-reader-{}-{}", std::process::id(), name))
    }

    fn write_segment(name: &str, records: &[LogRecord]) -> PathBuf {
        let path = temp_path(name);
        let mut file = File::create(&path).unwrap();
        let mut crc = CRC_SEED;
        for record in records {
            let (frame, next) = encode_frame(record, crc).unwrap();
            file.write_all(&frame).unwrap();
            crc = next;
        }
        path
    }

    #[test]
    fn clean_eof_yields_all_entries() {
        let path = write_segment(
            "clean",
            &[
                LogRecord::entry(b"first".to_vec()),
                LogRecord::control(0),
                LogRecord::entry(b"second".to_vec()),
            ],
        );
        let scan = read_segment(&path);
        assert!(scan.error.is_none());
        assert_eq!(scan.records_read, 3);
        assert_eq!(scan.payloads, vec![b"first".to_vec(), b"second".to_vec()]);
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn empty_segment_is_clean() {
        let path = write_segment("empty", &[]);
        let scan = read_segment(&path);
        assert!(scan.error.is_none());
        assert!(scan.payloads.is_empty());
        assert_eq!(scan.crc, CRC_SEED);
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn truncation_mid_record_is_possibly_repairable() {
        let path = write_segment(
            "truncated",
            &[
                LogRecord::entry(b"kept".to_vec()),
                LogRecord::entry(vec![0x11; 100]),
            ],
        );
        let len = std::fs::metadata(&path).unwrap().len();
        let file = std::fs::OpenOptions::new().write(true).open(&path).unwrap();
        file.set_len(len - 20).unwrap();

        let scan = read_segment(&path);
        assert_eq!(scan.payloads, vec![b"kept".to_vec()]);
        assert!(matches!(
            scan.error,
            Some(WalError::PossiblyRepairable {
                source: Corruption::TruncatedFrame,
                ..
            })
        ));
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn flipped_byte_is_crc_mismatch() {
        let path = write_segment(
            "crc",
            &[
                LogRecord::entry(b"kept".to_vec()),
                LogRecord::entry(b"damaged".to_vec()),
            ],
        );
        let mut bytes = std::fs::read(&path).unwrap();
        // inside the last record's payload, clear of the zero padding
        let target = bytes.len() - 8;
        bytes[target] ^= 0xff;
        std::fs::write(&path, &bytes).unwrap();

        let scan = read_segment(&path);
        assert_eq!(scan.payloads, vec![b"kept".to_vec()]);
        assert!(matches!(
            scan.error,
            Some(WalError::PossiblyRepairable {
                source: Corruption::CrcMismatch { .. },
                ..
            })
        ));
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn missing_file_is_read_failure() {
        let scan = read_segment(Path::new("/nonexistent/walscan-segment"));
        assert!(scan.payloads.is_empty());
        assert!(matches!(scan.error, Some(WalError::ReadFailure { .. })));
    }

    #[test]
    fn oversized_length_word_is_corruption() {
        let path = temp_path("oversized");
        let mut file = File::create(&path).unwrap();
        let mut header = Vec::new();
        header.extend_from_slice(&(u32::MAX).to_le_bytes());
        header.extend_from_slice(&0u32.to_le_bytes());
        file.write_all(&header).unwrap();
        drop(file);

        let scan = read_segment(&path);
        assert!(matches!(
            scan.error,
            Some(WalError::PossiblyRepairable {
                source: Corruption::OversizedRecord(_),
                ..
            })
        ));
        std::fs::remove_file(path).unwrap();
    }
}

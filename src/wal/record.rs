//! Physical WAL frame: `[len: u32 LE][crc: u32 LE][payload][zero padding]`,
//! padded so every frame starts on an 8-byte boundary. The payload is a
//! bincode `LogRecord`. CRCs roll: each record's CRC seeds the next, so a
//! record cannot be validated out of sequence.

use serde::{Deserialize, Serialize};

/// Seed of the rolling CRC at the start of every segment.
pub const CRC_SEED: u32 = 0x57_41_4C_31;

/// Frame header size: length word plus CRC word.
pub const FRAME_HEADER_LEN: usize = 8;

/// Sanity cap on a single record payload.
pub const MAX_RECORD_LEN: usize = 64 * 1024 * 1024;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum LogRecordType {
    /// carries a consensus message payload
    Entry,
    /// internal marker (truncation points etc.), never surfaced to callers
    Control,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogRecord {
    pub record_type: LogRecordType,
    /// earliest offset still live after a truncation marker
    pub truncate_to: u64,
    pub data: Vec<u8>,
}

impl LogRecord {
    pub fn entry(data: Vec<u8>) -> Self {
        Self {
            record_type: LogRecordType::Entry,
            truncate_to: 0,
            data,
        }
    }

    pub fn control(truncate_to: u64) -> Self {
        Self {
            record_type: LogRecordType::Control,
            truncate_to,
            data: Vec::new(),
        }
    }
}

/// CRC32 of `payload` seeded with the running segment CRC.
pub fn rolling_crc(prev: u32, payload: &[u8]) -> u32 {
    let mut hasher = crc32fast::Hasher::new_with_initial(prev);
    hasher.update(payload);
    hasher.finalize()
}

pub(crate) fn padding_for(len: usize) -> usize {
    (8 - len % 8) % 8
}

/// Encodes one record as a frame; returns the frame bytes and the CRC that
/// seeds the next record.
pub fn encode_frame(record: &LogRecord, prev_crc: u32) -> Result<(Vec<u8>, u32), bincode::Error> {
    let payload = bincode::serialize(record)?;
    let crc = rolling_crc(prev_crc, &payload);

    let mut frame = Vec::with_capacity(FRAME_HEADER_LEN + payload.len() + 7);
    frame.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    frame.extend_from_slice(&crc.to_le_bytes());
    frame.extend_from_slice(&payload);
    frame.extend(std::iter::repeat(0u8).take(padding_for(payload.len())));

    Ok((frame, crc))
}

//! WAL segment access: the physical record frame and the sequential
//! segment reader with its clean-EOF / corruption / I/O classification.

pub mod reader;
pub mod record;

pub use reader::{read_segment, Corruption, SegmentScan, WalError};
pub use record::{encode_frame, rolling_crc, LogRecord, LogRecordType, CRC_SEED};

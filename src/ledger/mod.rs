//! Ledger block reconstruction: proposal envelope decoding, config-block
//! classification and per-transaction extraction.

pub mod block;
pub mod envelope;
pub mod messages;
pub mod txs;

pub use block::{Block, ChaincodeId, Creator, Tx};
pub use envelope::{decode_proposal, BlockError, BlockHeader, DecodedProposal};
pub use txs::TxError;

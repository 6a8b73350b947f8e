use crate::ledger::envelope::{self, BlockError};
use crate::ledger::txs;
use crate::protocol::messages::Proposal;
use chrono::{DateTime, Utc};

/// Fully reconstructed ledger block. `hash` is derived from the canonical
/// header; `previous_block_hash` is copied out of it. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub txs: Vec<Tx>,
    pub is_config: bool,
    pub hash: Vec<u8>,
    pub previous_block_hash: Vec<u8>,
    pub block_number: u64,
}

/// One transaction inside a block. `chaincode_id` is `None` for config
/// blocks, which carry no chaincode invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Tx {
    pub tx_id: String,
    pub creator: Creator,
    /// hex rendering of the creator's signature over the transaction
    pub creator_signature: String,
    pub chaincode_id: Option<ChaincodeId>,
    pub channel_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Creator {
    pub msp_id: String,
    /// PEM-encoded certificate
    pub cert: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChaincodeId {
    pub name: String,
    pub version: i32,
}

impl Block {
    /// Runs the full reconstruction pipeline on one proposal: envelope
    /// decode, config-block classification, transaction extraction.
    pub fn from_proposal(prop: &Proposal) -> Result<Block, BlockError> {
        let decoded = envelope::decode_proposal(prop)?;
        let is_config = txs::is_config_block(&decoded.data)?;
        let txs = txs::extract_txs(&decoded.data, is_config)?;

        Ok(Block {
            txs,
            is_config,
            hash: decoded.header.hash(),
            previous_block_hash: decoded.header.previous_hash,
            block_number: decoded.header.number,
        })
    }
}

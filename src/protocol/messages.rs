use serde::{Deserialize, Serialize};

/// Consensus engine messages as they are persisted to the WAL,
/// bincode-encoded. One envelope per WAL entry, with exactly one active
/// variant; dispatch is exhaustive so a new kind is a compile-time change.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ConsensusMessage {
    Commit(Commit),
    NewView(NewViewMsg),
    ViewChange(ViewChangeMsg),
    ProposedRecord(ProposedRecord),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Commit {
    pub view: u64,
    pub seq: u64,
    pub digest: String,
    pub signature: MsgSignature,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MsgSignature {
    pub signer: u64,
    pub value: Vec<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewViewMsg {
    pub signed_view_data: Vec<SignedViewData>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SignedViewData {
    pub raw_view_data: Vec<u8>,
    pub signer: u64,
    pub signature: Vec<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ViewChangeMsg {
    pub next_view: u64,
    pub reason: String,
}

/// Pre-prepare/prepare pair persisted when a proposal enters the log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProposedRecord {
    pub pre_prepare: PrePrepare,
    pub prepare: Prepare,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PrePrepare {
    pub view: u64,
    pub seq: u64,
    pub proposal: Proposal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Prepare {
    pub view: u64,
    pub seq: u64,
    pub digest: String,
    pub assist: bool,
}

/// Consensus candidate value carrying a to-be-committed ledger block.
/// `header` is the DER block-header triple; `payload` is the byte-buffer
/// tuple of serialized block data and metadata; `metadata` is a serialized
/// `ViewMetadata`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Proposal {
    pub header: Vec<u8>,
    pub payload: Vec<u8>,
    pub metadata: Vec<u8>,
    pub verification_sequence: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ViewMetadata {
    pub view_id: u64,
    pub latest_sequence: u64,
}

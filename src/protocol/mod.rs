//! Consensus message envelope: persisted message types and the per-record
//! dispatcher that turns raw WAL payloads into structured records.

pub mod dispatch;
pub mod messages;

pub use dispatch::{decode_record, DecodedRecord, DispatchError, ProposedBlockRecord};
pub use messages::{
    Commit, ConsensusMessage, MsgSignature, NewViewMsg, Prepare, PrePrepare, Proposal,
    ProposedRecord, SignedViewData, ViewChangeMsg, ViewMetadata,
};

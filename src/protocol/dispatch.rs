use crate::ledger::{Block, BlockError};
use crate::protocol::messages::{
    Commit, ConsensusMessage, NewViewMsg, ProposedRecord, ViewChangeMsg, ViewMetadata,
};
use thiserror::Error;

/// One fully decoded WAL entry. Pass-through variants carry the envelope's
/// fields unchanged; proposed records additionally carry the decoded view
/// metadata and the reconstructed block.
#[derive(Debug, Clone)]
pub enum DecodedRecord {
    Commit(Commit),
    NewView(NewViewMsg),
    ViewChange(ViewChangeMsg),
    Proposed(ProposedBlockRecord),
}

#[derive(Debug, Clone)]
pub struct ProposedBlockRecord {
    pub record: ProposedRecord,
    pub view: ViewMetadata,
    pub block: Block,
}

#[derive(Debug, Error)]
pub enum DispatchError {
    /// Envelope framing errors mean the log itself may be desynchronized,
    /// so the caller aborts the current file rather than skipping a record.
    #[error("bad consensus message envelope")]
    BadEnvelope(#[source] bincode::Error),

    #[error("bad view metadata")]
    BadViewMetadata(#[source] bincode::Error),

    #[error(transparent)]
    Block(#[from] BlockError),
}

/// Decodes one raw WAL payload into a `DecodedRecord`, running block
/// reconstruction for proposed records. Failures from the block path are
/// surfaced unchanged with their cause chains intact.
pub fn decode_record(payload: &[u8]) -> Result<DecodedRecord, DispatchError> {
    let message: ConsensusMessage =
        bincode::deserialize(payload).map_err(DispatchError::BadEnvelope)?;

    Ok(match message {
        ConsensusMessage::Commit(commit) => DecodedRecord::Commit(commit),
        ConsensusMessage::NewView(new_view) => DecodedRecord::NewView(new_view),
        ConsensusMessage::ViewChange(view_change) => DecodedRecord::ViewChange(view_change),
        ConsensusMessage::ProposedRecord(record) => {
            let view: ViewMetadata = bincode::deserialize(&record.pre_prepare.proposal.metadata)
                .map_err(DispatchError::BadViewMetadata)?;
            let block = Block::from_proposal(&record.pre_prepare.proposal)?;
            DecodedRecord::Proposed(ProposedBlockRecord {
                record,
                view,
                block,
            })
        }
    })
}

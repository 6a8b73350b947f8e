use crate::ledger::{Block, Tx};
use crate::protocol::{DecodedRecord, ProposedBlockRecord};
use anyhow::Result;
use serde_json::json;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Presentation layer: turns decoded records into text or JSON lines on
/// stdout, optionally teeing every line to a report file. Consumes core
/// data structures only; no decoding happens here.
pub struct Renderer {
    json: bool,
    tee: Option<BufWriter<File>>,
}

impl Renderer {
    pub fn new(json: bool, out: Option<&Path>) -> Result<Self> {
        let tee = match out {
            Some(path) => Some(BufWriter::new(File::create(path)?)),
            None => None,
        };
        Ok(Self { json, tee })
    }

    fn emit(&mut self, line: &str) -> Result<()> {
        println!("{line}");
        if let Some(tee) = &mut self.tee {
            writeln!(tee, "{line}")?;
        }
        Ok(())
    }

    pub fn render(&mut self, index: usize, record: &DecodedRecord) -> Result<()> {
        if self.json {
            let line = serde_json::to_string(&record_json(index, record))?;
            return self.emit(&line);
        }
        match record {
            DecodedRecord::Commit(commit) => self.emit(&format!(
                "record #{index} (commit): digest: {} view: {} seq: {} \
                 signature: <signer: {} value: {}>",
                commit.digest,
                commit.view,
                commit.seq,
                commit.signature.signer,
                hex::encode(&commit.signature.value),
            )),
            DecodedRecord::NewView(new_view) => self.emit(&format!(
                "record #{index} (new view): {} signed view data entries from signers {:?}",
                new_view.signed_view_data.len(),
                new_view
                    .signed_view_data
                    .iter()
                    .map(|svd| svd.signer)
                    .collect::<Vec<_>>(),
            )),
            // TODO: confirm with the engine maintainers whether view-change
            // records should render the pending new-view payload instead of
            // their own fields; the engine's own tooling is ambiguous here.
            DecodedRecord::ViewChange(view_change) => self.emit(&format!(
                "record #{index} (view change): next view: {} reason: {}",
                view_change.next_view, view_change.reason,
            )),
            DecodedRecord::Proposed(proposed) => self.render_proposed(index, proposed),
        }
    }

    fn render_proposed(&mut self, index: usize, proposed: &ProposedBlockRecord) -> Result<()> {
        let pre_prepare = &proposed.record.pre_prepare;
        let prepare = &proposed.record.prepare;
        let block = &proposed.block;

        self.emit(&format!(
            "record #{index} (proposed record)\n\
             pre-prepare: <view: {} seq: {} payload of {} bytes> \
             metadata: <view ID: {} latest seq: {}> verification seq: {}\n\
             prepare: <view: {} seq: {} assist: {} digest: {}>\n\
             proposed block: <config: {} number: {} hash: {} previous hash: {}>",
            pre_prepare.view,
            pre_prepare.seq,
            pre_prepare.proposal.payload.len(),
            proposed.view.view_id,
            proposed.view.latest_sequence,
            pre_prepare.proposal.verification_sequence,
            prepare.view,
            prepare.seq,
            prepare.assist,
            prepare.digest,
            block.is_config,
            block.block_number,
            hex::encode(&block.hash),
            hex::encode(&block.previous_block_hash),
        ))?;

        self.emit(&format!("transactions from block {}:", block.block_number))?;
        for tx in &block.txs {
            self.render_tx(tx)?;
        }
        Ok(())
    }

    fn render_tx(&mut self, tx: &Tx) -> Result<()> {
        let chaincode = match &tx.chaincode_id {
            Some(id) => format!("{} v{}", id.name, id.version),
            None => "<none>".to_string(),
        };
        self.emit(&format!(
            "  tx ID: {} creator MSP: {} signature: {}\n  chaincode: {} channel: {} time: {}\n  cert:\n{}",
            tx.tx_id,
            tx.creator.msp_id,
            tx.creator_signature,
            chaincode,
            tx.channel_id,
            tx.timestamp,
            String::from_utf8_lossy(&tx.creator.cert),
        ))
    }

    pub fn flush(&mut self) -> Result<()> {
        if let Some(tee) = &mut self.tee {
            tee.flush()?;
        }
        Ok(())
    }
}

fn record_json(index: usize, record: &DecodedRecord) -> serde_json::Value {
    match record {
        DecodedRecord::Commit(commit) => json!({
            "record": index,
            "kind": "commit",
            "view": commit.view,
            "seq": commit.seq,
            "digest": commit.digest,
            "signer": commit.signature.signer,
            "signature": hex::encode(&commit.signature.value),
        }),
        DecodedRecord::NewView(new_view) => json!({
            "record": index,
            "kind": "new_view",
            "signers": new_view.signed_view_data.iter().map(|svd| svd.signer).collect::<Vec<_>>(),
        }),
        DecodedRecord::ViewChange(view_change) => json!({
            "record": index,
            "kind": "view_change",
            "next_view": view_change.next_view,
            "reason": view_change.reason,
        }),
        DecodedRecord::Proposed(proposed) => json!({
            "record": index,
            "kind": "proposed_record",
            "pre_prepare": {
                "view": proposed.record.pre_prepare.view,
                "seq": proposed.record.pre_prepare.seq,
            },
            "prepare": {
                "view": proposed.record.prepare.view,
                "seq": proposed.record.prepare.seq,
                "assist": proposed.record.prepare.assist,
                "digest": proposed.record.prepare.digest,
            },
            "view_metadata": {
                "view_id": proposed.view.view_id,
                "latest_sequence": proposed.view.latest_sequence,
            },
            "verification_sequence": proposed.record.pre_prepare.proposal.verification_sequence,
            "block": block_json(&proposed.block),
        }),
    }
}

fn block_json(block: &Block) -> serde_json::Value {
    json!({
        "number": block.block_number,
        "is_config": block.is_config,
        "hash": hex::encode(&block.hash),
        "previous_hash": hex::encode(&block.previous_block_hash),
        "txs": block.txs.iter().map(tx_json).collect::<Vec<_>>(),
    })
}

fn tx_json(tx: &Tx) -> serde_json::Value {
    json!({
        "tx_id": tx.tx_id,
        "channel_id": tx.channel_id,
        "timestamp": tx.timestamp.to_rfc3339(),
        "creator_msp_id": tx.creator.msp_id,
        "creator_cert_pem": String::from_utf8_lossy(&tx.creator.cert),
        "creator_signature": tx.creator_signature,
        "chaincode": tx.chaincode_id.as_ref().map(|id| json!({
            "name": id.name,
            "version": id.version,
        })),
    })
}

use crate::ledger::block::{ChaincodeId, Creator, Tx};
use crate::ledger::messages::{
    BlockData, ChaincodeInvocationSpec, ChannelHeader, Envelope, Payload, SerializedIdentity,
    SignatureHeader, HEADER_TYPE_CONFIG,
};
use chrono::{TimeZone, Utc};
use thiserror::Error;

/// Transaction extraction errors; every variant names the failing entry so a
/// corrupt transaction can be located inside its block.
#[derive(Debug, Error)]
pub enum TxError {
    #[error("tx #{index}: bad creator identity")]
    BadCreator {
        index: usize,
        #[source]
        source: bincode::Error,
    },

    #[error("tx #{index}: missing creator signature")]
    BadSignature { index: usize },

    #[error("tx #{index}: bad channel header: {detail}")]
    BadChannelHeader { index: usize, detail: String },

    #[error("tx #{index}: bad chaincode reference: {detail}")]
    BadChaincodeRef { index: usize, detail: String },
}

fn open_envelope(index: usize, entry: &[u8]) -> Result<(Envelope, Payload), TxError> {
    let envelope: Envelope =
        bincode::deserialize(entry).map_err(|source| TxError::BadCreator { index, source })?;
    let payload: Payload = bincode::deserialize(&envelope.payload)
        .map_err(|source| TxError::BadCreator { index, source })?;
    Ok((envelope, payload))
}

fn channel_header(index: usize, payload: &Payload) -> Result<ChannelHeader, TxError> {
    bincode::deserialize(&payload.header.channel_header).map_err(|e| TxError::BadChannelHeader {
        index,
        detail: e.to_string(),
    })
}

/// A block is a config block when its first envelope carries a channel
/// header of the config type. An empty body is an ordinary block.
pub fn is_config_block(data: &BlockData) -> Result<bool, TxError> {
    let Some(first) = data.data.first() else {
        return Ok(false);
    };
    let (_, payload) = open_envelope(0, first)?;
    let header = channel_header(0, &payload)?;
    Ok(header.header_type == HEADER_TYPE_CONFIG)
}

/// Extracts one `Tx` per block entry, preserving commit order. Fails
/// atomically: a single bad entry fails the whole extraction, so callers
/// never see a block with transactions silently missing.
pub fn extract_txs(data: &BlockData, is_config: bool) -> Result<Vec<Tx>, TxError> {
    let mut txs = Vec::with_capacity(data.data.len());

    for (index, entry) in data.data.iter().enumerate() {
        let (envelope, payload) = open_envelope(index, entry)?;

        let sig_header: SignatureHeader = bincode::deserialize(&payload.header.signature_header)
            .map_err(|source| TxError::BadCreator { index, source })?;
        let identity: SerializedIdentity = bincode::deserialize(&sig_header.creator)
            .map_err(|source| TxError::BadCreator { index, source })?;

        if envelope.signature.is_empty() {
            return Err(TxError::BadSignature { index });
        }
        let creator_signature = hex::encode(&envelope.signature);

        let header = channel_header(index, &payload)?;
        let timestamp = Utc
            .timestamp_millis_opt(header.timestamp_millis)
            .single()
            .ok_or_else(|| TxError::BadChannelHeader {
                index,
                detail: format!("timestamp {} out of range", header.timestamp_millis),
            })?;

        // config transactions carry a config update, not a chaincode call
        let chaincode_id = if is_config {
            None
        } else {
            let spec: ChaincodeInvocationSpec =
                bincode::deserialize(&payload.data).map_err(|e| TxError::BadChaincodeRef {
                    index,
                    detail: e.to_string(),
                })?;
            if spec.chaincode_name.is_empty() {
                return Err(TxError::BadChaincodeRef {
                    index,
                    detail: "empty chaincode name".into(),
                });
            }
            Some(ChaincodeId {
                name: spec.chaincode_name,
                version: header.version,
            })
        };

        txs.push(Tx {
            tx_id: header.tx_id,
            creator: Creator {
                msp_id: identity.msp_id,
                cert: identity.id_bytes,
            },
            creator_signature,
            chaincode_id,
            channel_id: header.channel_id,
            timestamp,
        });
    }

    Ok(txs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::messages::{TxHeader, HEADER_TYPE_ENDORSER_TRANSACTION};

    fn make_envelope(
        tx_id: &str,
        msp_id: &str,
        chaincode: &str,
        header_type: i32,
    ) -> Vec<u8> {
        let identity = SerializedIdentity {
            msp_id: msp_id.into(),
            id_bytes: b"-----BEGIN CERTIFICATE-----\ntest\n-----END CERTIFICATE-----\n".to_vec(),
        };
        let sig_header = SignatureHeader {
            creator: bincode::serialize(&identity).unwrap(),
            nonce: vec![7; 12],
        };
        let ch_header = ChannelHeader {
            header_type,
            version: 1,
            timestamp_millis: 1_600_000_000_000,
            channel_id: "testchannel".into(),
            tx_id: tx_id.into(),
        };
        let spec = ChaincodeInvocationSpec {
            chaincode_name: chaincode.into(),
            args: vec![b"init".to_vec()],
        };
        let payload = Payload {
            header: TxHeader {
                channel_header: bincode::serialize(&ch_header).unwrap(),
                signature_header: bincode::serialize(&sig_header).unwrap(),
            },
            data: bincode::serialize(&spec).unwrap(),
        };
        let envelope = Envelope {
            payload: bincode::serialize(&payload).unwrap(),
            signature: vec![0xaa; 16],
        };
        bincode::serialize(&envelope).unwrap()
    }

    fn block_of(entries: Vec<Vec<u8>>) -> BlockData {
        BlockData { data: entries }
    }

    #[test]
    fn extracts_in_commit_order() {
        let data = block_of(vec![
            make_envelope("tx-0", "Org1MSP", "token", HEADER_TYPE_ENDORSER_TRANSACTION),
            make_envelope("tx-1", "Org2MSP", "token", HEADER_TYPE_ENDORSER_TRANSACTION),
        ]);
        let txs = extract_txs(&data, false).unwrap();
        assert_eq!(txs.len(), 2);
        assert_eq!(txs[0].tx_id, "tx-0");
        assert_eq!(txs[1].tx_id, "tx-1");
        assert_eq!(txs[0].creator.msp_id, "Org1MSP");
        assert_eq!(txs[0].creator_signature, hex::encode(vec![0xaa; 16]));
        assert_eq!(txs[0].chaincode_id.as_ref().unwrap().name, "token");
        assert_eq!(txs[0].chaincode_id.as_ref().unwrap().version, 1);
    }

    #[test]
    fn config_block_suppresses_chaincode() {
        let data = block_of(vec![
            make_envelope("cfg-0", "OrdererMSP", "ignored", HEADER_TYPE_CONFIG),
        ]);
        assert!(is_config_block(&data).unwrap());
        let txs = extract_txs(&data, true).unwrap();
        assert!(txs.iter().all(|tx| tx.chaincode_id.is_none()));
    }

    #[test]
    fn empty_block_is_not_config() {
        assert!(!is_config_block(&block_of(vec![])).unwrap());
        assert!(extract_txs(&block_of(vec![]), false).unwrap().is_empty());
    }

    #[test]
    fn failure_is_atomic() {
        let data = block_of(vec![
            make_envelope("tx-0", "Org1MSP", "token", HEADER_TYPE_ENDORSER_TRANSACTION),
            vec![0xde, 0xad, 0xbe, 0xef],
            make_envelope("tx-2", "Org1MSP", "token", HEADER_TYPE_ENDORSER_TRANSACTION),
        ]);
        match extract_txs(&data, false) {
            Err(TxError::BadCreator { index: 1, .. }) => {}
            other => panic!("expected BadCreator at index 1, got {other:?}"),
        }
    }

    #[test]
    fn missing_signature_is_rejected() {
        let mut envelope: Envelope =
            bincode::deserialize(&make_envelope("tx-0", "m", "cc", HEADER_TYPE_ENDORSER_TRANSACTION))
                .unwrap();
        envelope.signature.clear();
        let data = block_of(vec![bincode::serialize(&envelope).unwrap()]);
        assert!(matches!(
            extract_txs(&data, false),
            Err(TxError::BadSignature { index: 0 })
        ));
    }

    #[test]
    fn out_of_range_timestamp_is_bad_channel_header() {
        let raw = make_envelope("tx-0", "m", "cc", HEADER_TYPE_ENDORSER_TRANSACTION);
        let mut envelope: Envelope = bincode::deserialize(&raw).unwrap();
        let mut payload: Payload = bincode::deserialize(&envelope.payload).unwrap();
        let mut header: ChannelHeader =
            bincode::deserialize(&payload.header.channel_header).unwrap();
        header.timestamp_millis = i64::MAX;
        payload.header.channel_header = bincode::serialize(&header).unwrap();
        envelope.payload = bincode::serialize(&payload).unwrap();
        let data = block_of(vec![bincode::serialize(&envelope).unwrap()]);
        assert!(matches!(
            extract_txs(&data, false),
            Err(TxError::BadChannelHeader { index: 0, .. })
        ));
    }

    #[test]
    fn empty_chaincode_name_is_rejected() {
        let data = block_of(vec![make_envelope(
            "tx-0",
            "m",
            "",
            HEADER_TYPE_ENDORSER_TRANSACTION,
        )]);
        assert!(matches!(
            extract_txs(&data, false),
            Err(TxError::BadChaincodeRef { index: 0, .. })
        ));
    }
}

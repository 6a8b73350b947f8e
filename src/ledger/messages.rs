//! Wire-level ledger messages, bincode-encoded. These mirror the ordering
//! service's own framing: a block body is a list of serialized envelopes,
//! each envelope nests a payload, which nests the channel and signature
//! headers as further serialized blobs.

use serde::{Deserialize, Serialize};

/// Channel header type marking a configuration block.
pub const HEADER_TYPE_CONFIG: i32 = 1;
/// Channel header type of an ordinary endorser transaction.
pub const HEADER_TYPE_ENDORSER_TRANSACTION: i32 = 3;

/// Block body: one serialized `Envelope` per transaction, in commit order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BlockData {
    pub data: Vec<Vec<u8>>,
}

/// Block metadata: opaque per-category entries (signatures, last config, ...).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BlockMetadata {
    pub metadata: Vec<Vec<u8>>,
}

/// Signed wrapper around one transaction payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Envelope {
    /// serialized `Payload`
    pub payload: Vec<u8>,
    /// creator's signature over the payload bytes
    pub signature: Vec<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Payload {
    pub header: TxHeader,
    /// serialized `ChaincodeInvocationSpec` for endorser transactions,
    /// config-update bytes for config blocks
    pub data: Vec<u8>,
}

/// Both header halves stay serialized so each decodes independently.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TxHeader {
    /// serialized `ChannelHeader`
    pub channel_header: Vec<u8>,
    /// serialized `SignatureHeader`
    pub signature_header: Vec<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChannelHeader {
    pub header_type: i32,
    pub version: i32,
    pub timestamp_millis: i64,
    pub channel_id: String,
    pub tx_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SignatureHeader {
    /// serialized `SerializedIdentity`
    pub creator: Vec<u8>,
    pub nonce: Vec<u8>,
}

/// Submitting identity: MSP identifier plus PEM certificate bytes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SerializedIdentity {
    pub msp_id: String,
    pub id_bytes: Vec<u8>,
}

/// Chaincode call carried by an endorser transaction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChaincodeInvocationSpec {
    pub chaincode_name: String,
    pub args: Vec<Vec<u8>>,
}

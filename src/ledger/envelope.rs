use crate::codec::asn1::{self, Asn1Error, Decoder};
use crate::codec::{ByteBufferTuple, MalformedTuple};
use crate::ledger::messages::{BlockData, BlockMetadata};
use crate::ledger::txs::TxError;
use crate::protocol::messages::Proposal;
use num_bigint::BigInt;
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Reconstructed block header. `number` has already been narrowed from the
/// arbitrary-precision ASN.1 integer; narrowing failures surface as
/// `BlockError::BlockNumberOverflow`, never as a silent truncation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockHeader {
    pub number: u64,
    pub previous_hash: Vec<u8>,
    pub data_hash: Vec<u8>,
}

impl BlockHeader {
    /// DER SEQUENCE { number INTEGER, previousHash OCTET STRING,
    /// dataHash OCTET STRING } — the canonical form the block hash covers.
    pub fn to_der(&self) -> Vec<u8> {
        let mut body = Vec::new();
        asn1::encode_integer(&mut body, &BigInt::from(self.number));
        asn1::encode_octet_string(&mut body, &self.previous_hash);
        asn1::encode_octet_string(&mut body, &self.data_hash);
        let mut out = Vec::new();
        asn1::encode_sequence(&mut out, &body);
        out
    }

    /// SHA-256 over the canonical DER header.
    pub fn hash(&self) -> Vec<u8> {
        Sha256::digest(self.to_der()).to_vec()
    }
}

/// Header triple with the block number still arbitrary-precision.
pub fn decode_header(bytes: &[u8]) -> Result<(BigInt, Vec<u8>, Vec<u8>), Asn1Error> {
    let mut dec = Decoder::new(bytes);
    let mut seq = dec.read_sequence()?;
    let number = seq.read_integer()?;
    let previous_hash = seq.read_octet_string()?.to_vec();
    let data_hash = seq.read_octet_string()?.to_vec();
    seq.finish()?;
    dec.finish()?;
    Ok((number, previous_hash, data_hash))
}

/// Everything a proposal resolves to before transaction extraction.
#[derive(Debug, Clone)]
pub struct DecodedProposal {
    pub header: BlockHeader,
    pub data: BlockData,
    pub metadata: BlockMetadata,
}

#[derive(Debug, Error)]
pub enum BlockError {
    #[error("proposal header cannot be empty")]
    EmptyHeader,

    #[error("proposal payload cannot be empty")]
    EmptyPayload,

    #[error("bad header")]
    BadHeader(#[source] Asn1Error),

    #[error("block number {0} does not fit in 64 bits")]
    BlockNumberOverflow(BigInt),

    #[error("bad payload and metadata tuple")]
    BadPayloadTuple(#[source] MalformedTuple),

    #[error("bad block data")]
    BadBlockData(#[source] bincode::Error),

    #[error("bad block metadata")]
    BadBlockMetadata(#[source] bincode::Error),

    #[error(transparent)]
    Tx(#[from] TxError),
}

/// Decodes a consensus proposal into a block header and the two ledger
/// messages its payload tuple carries. Every failure is a data-integrity
/// failure naming the sub-step that produced it; nothing is retried.
pub fn decode_proposal(prop: &Proposal) -> Result<DecodedProposal, BlockError> {
    if prop.header.is_empty() {
        return Err(BlockError::EmptyHeader);
    }
    if prop.payload.is_empty() {
        return Err(BlockError::EmptyPayload);
    }

    let (number, previous_hash, data_hash) =
        decode_header(&prop.header).map_err(BlockError::BadHeader)?;
    let number =
        u64::try_from(number.clone()).map_err(|_| BlockError::BlockNumberOverflow(number))?;

    let tuple = ByteBufferTuple::from_bytes(&prop.payload).map_err(BlockError::BadPayloadTuple)?;
    let data: BlockData = bincode::deserialize(&tuple.a).map_err(BlockError::BadBlockData)?;
    let metadata: BlockMetadata =
        bincode::deserialize(&tuple.b).map_err(BlockError::BadBlockMetadata)?;

    Ok(DecodedProposal {
        header: BlockHeader {
            number,
            previous_hash,
            data_hash,
        },
        data,
        metadata,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_header(number: &BigInt, prev: &[u8], data: &[u8]) -> Vec<u8> {
        let mut body = Vec::new();
        asn1::encode_integer(&mut body, number);
        asn1::encode_octet_string(&mut body, prev);
        asn1::encode_octet_string(&mut body, data);
        let mut out = Vec::new();
        asn1::encode_sequence(&mut out, &body);
        out
    }

    fn proposal(header: Vec<u8>, payload: Vec<u8>) -> Proposal {
        Proposal {
            header,
            payload,
            metadata: Vec::new(),
            verification_sequence: 0,
        }
    }

    fn valid_payload() -> Vec<u8> {
        let data = bincode::serialize(&BlockData::default()).unwrap();
        let metadata = bincode::serialize(&BlockMetadata::default()).unwrap();
        ByteBufferTuple::new(data, metadata).to_bytes()
    }

    #[test]
    fn header_roundtrip() {
        let header = BlockHeader {
            number: 42,
            previous_hash: vec![1; 32],
            data_hash: vec![2; 32],
        };
        let (number, prev, data) = decode_header(&header.to_der()).unwrap();
        assert_eq!(number, BigInt::from(42u64));
        assert_eq!(prev, header.previous_hash);
        assert_eq!(data, header.data_hash);
    }

    #[test]
    fn decodes_minimal_proposal() {
        let header = encode_header(&BigInt::from(7u64), b"prev", b"data");
        let decoded = decode_proposal(&proposal(header, valid_payload())).unwrap();
        assert_eq!(decoded.header.number, 7);
        assert_eq!(decoded.header.previous_hash, b"prev");
        assert!(decoded.data.data.is_empty());
    }

    #[test]
    fn empty_header_and_payload_are_preconditions() {
        assert!(matches!(
            decode_proposal(&proposal(Vec::new(), valid_payload())),
            Err(BlockError::EmptyHeader)
        ));
        let header = encode_header(&BigInt::from(1u64), b"", b"");
        assert!(matches!(
            decode_proposal(&proposal(header, Vec::new())),
            Err(BlockError::EmptyPayload)
        ));
    }

    #[test]
    fn oversized_block_number_overflows() {
        let number = BigInt::from(u64::MAX) + 1;
        let header = encode_header(&number, b"prev", b"data");
        match decode_proposal(&proposal(header, valid_payload())) {
            Err(BlockError::BlockNumberOverflow(n)) => assert_eq!(n, number),
            other => panic!("expected overflow, got {other:?}"),
        }
    }

    #[test]
    fn u64_max_still_fits() {
        let header = encode_header(&BigInt::from(u64::MAX), b"prev", b"data");
        let decoded = decode_proposal(&proposal(header, valid_payload())).unwrap();
        assert_eq!(decoded.header.number, u64::MAX);
    }

    #[test]
    fn garbage_header_is_bad_header() {
        assert!(matches!(
            decode_proposal(&proposal(vec![0xff, 0x01], valid_payload())),
            Err(BlockError::BadHeader(_))
        ));
    }

    #[test]
    fn garbage_payload_is_bad_tuple() {
        let header = encode_header(&BigInt::from(1u64), b"", b"");
        assert!(matches!(
            decode_proposal(&proposal(header, vec![0x30, 0x00, 0x99])),
            Err(BlockError::BadPayloadTuple(_))
        ));
    }

    #[test]
    fn undecodable_block_data_is_bad_block_data() {
        let header = encode_header(&BigInt::from(1u64), b"", b"");
        let metadata = bincode::serialize(&BlockMetadata::default()).unwrap();
        // `a` claims a list far longer than the remaining bytes
        let payload = ByteBufferTuple::new(vec![0xff; 4], metadata).to_bytes();
        assert!(matches!(
            decode_proposal(&proposal(header, payload)),
            Err(BlockError::BadBlockData(_))
        ));
    }
}

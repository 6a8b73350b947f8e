use crate::codec::asn1::{self, Asn1Error, Decoder};
use thiserror::Error;

/// Packs two independently serialized messages into a single ASN.1 value:
/// a SEQUENCE of two OCTET STRINGs. This is the only multiplexing mechanism
/// between a proposal payload and the block data/metadata pair it carries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ByteBufferTuple {
    pub a: Vec<u8>,
    pub b: Vec<u8>,
}

#[derive(Debug, Error)]
#[error("malformed byte-buffer tuple")]
pub struct MalformedTuple(#[source] pub Asn1Error);

impl ByteBufferTuple {
    pub fn new(a: Vec<u8>, b: Vec<u8>) -> Self {
        Self { a, b }
    }

    /// Deterministic: identical tuples always encode to identical bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut body = Vec::with_capacity(self.a.len() + self.b.len() + 8);
        asn1::encode_octet_string(&mut body, &self.a);
        asn1::encode_octet_string(&mut body, &self.b);
        let mut out = Vec::with_capacity(body.len() + 4);
        asn1::encode_sequence(&mut out, &body);
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, MalformedTuple> {
        Self::decode(bytes).map_err(MalformedTuple)
    }

    fn decode(bytes: &[u8]) -> Result<Self, Asn1Error> {
        let mut dec = Decoder::new(bytes);
        let mut seq = dec.read_sequence()?;
        let a = seq.read_octet_string()?.to_vec();
        let b = seq.read_octet_string()?.to_vec();
        seq.finish()?;
        dec.finish()?;
        Ok(Self { a, b })
    }
}

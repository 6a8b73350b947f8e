//! The DER subset the block path needs: SEQUENCE, INTEGER and OCTET STRING
//! with definite lengths. Encoding is deterministic; decoding rejects
//! indefinite lengths, non-minimal integers and trailing bytes.

use num_bigint::BigInt;
use thiserror::Error;

pub const TAG_INTEGER: u8 = 0x02;
pub const TAG_OCTET_STRING: u8 = 0x04;
pub const TAG_SEQUENCE: u8 = 0x30;

#[derive(Debug, Error)]
pub enum Asn1Error {
    #[error("unexpected end of input")]
    Truncated,

    #[error("expected tag {expected:#04x}, found {found:#04x}")]
    UnexpectedTag { expected: u8, found: u8 },

    #[error("invalid length encoding")]
    BadLength,

    #[error("integer is empty or not minimally encoded")]
    BadInteger,

    #[error("{0} trailing bytes after value")]
    TrailingBytes(usize),
}

fn write_len(out: &mut Vec<u8>, len: usize) {
    if len < 0x80 {
        out.push(len as u8);
        return;
    }
    let bytes = len.to_be_bytes();
    let first = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len() - 1);
    out.push(0x80 | (bytes.len() - first) as u8);
    out.extend_from_slice(&bytes[first..]);
}

fn write_tlv(out: &mut Vec<u8>, tag: u8, body: &[u8]) {
    out.push(tag);
    write_len(out, body.len());
    out.extend_from_slice(body);
}

pub fn encode_octet_string(out: &mut Vec<u8>, bytes: &[u8]) {
    write_tlv(out, TAG_OCTET_STRING, bytes);
}

/// Two's-complement big-endian, one byte minimum (zero encodes as 0x00).
pub fn encode_integer(out: &mut Vec<u8>, n: &BigInt) {
    write_tlv(out, TAG_INTEGER, &n.to_signed_bytes_be());
}

/// Wraps already-encoded fields into a SEQUENCE.
pub fn encode_sequence(out: &mut Vec<u8>, body: &[u8]) {
    write_tlv(out, TAG_SEQUENCE, body);
}

/// Forward-only cursor over one DER value.
pub struct Decoder<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Decoder<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Self { input, pos: 0 }
    }

    fn read_byte(&mut self) -> Result<u8, Asn1Error> {
        let b = *self.input.get(self.pos).ok_or(Asn1Error::Truncated)?;
        self.pos += 1;
        Ok(b)
    }

    fn read_len(&mut self) -> Result<usize, Asn1Error> {
        let first = self.read_byte()?;
        if first < 0x80 {
            return Ok(first as usize);
        }
        let count = (first & 0x7f) as usize;
        // 0x80 is the indefinite form, which DER forbids
        if count == 0 || count > std::mem::size_of::<usize>() {
            return Err(Asn1Error::BadLength);
        }
        let mut len: usize = 0;
        for _ in 0..count {
            len = (len << 8) | self.read_byte()? as usize;
        }
        // long form must not encode a length the short form could carry
        if len < 0x80 {
            return Err(Asn1Error::BadLength);
        }
        Ok(len)
    }

    fn read_tlv(&mut self, expected: u8) -> Result<&'a [u8], Asn1Error> {
        let tag = self.read_byte()?;
        if tag != expected {
            return Err(Asn1Error::UnexpectedTag { expected, found: tag });
        }
        let len = self.read_len()?;
        let end = self.pos.checked_add(len).ok_or(Asn1Error::Truncated)?;
        let body = self.input.get(self.pos..end).ok_or(Asn1Error::Truncated)?;
        self.pos = end;
        Ok(body)
    }

    /// Descends into a SEQUENCE, returning a cursor over its body.
    pub fn read_sequence(&mut self) -> Result<Decoder<'a>, Asn1Error> {
        Ok(Decoder::new(self.read_tlv(TAG_SEQUENCE)?))
    }

    pub fn read_octet_string(&mut self) -> Result<&'a [u8], Asn1Error> {
        self.read_tlv(TAG_OCTET_STRING)
    }

    pub fn read_integer(&mut self) -> Result<BigInt, Asn1Error> {
        let body = self.read_tlv(TAG_INTEGER)?;
        match body {
            [] => Err(Asn1Error::BadInteger),
            // leading 0x00 is only valid to clear the sign bit
            [0x00, next, ..] if *next < 0x80 => Err(Asn1Error::BadInteger),
            [0xff, next, ..] if *next >= 0x80 => Err(Asn1Error::BadInteger),
            _ => Ok(BigInt::from_signed_bytes_be(body)),
        }
    }

    /// Succeeds only when every byte of the input was consumed.
    pub fn finish(self) -> Result<(), Asn1Error> {
        let rest = self.input.len() - self.pos;
        if rest == 0 {
            Ok(())
        } else {
            Err(Asn1Error::TrailingBytes(rest))
        }
    }
}

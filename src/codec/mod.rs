//! Binary codecs shared by the block reconstruction path.
//! Exposes the minimal DER subset and the two-field byte-buffer tuple.

pub mod asn1;
pub mod tuple;

pub use asn1::Asn1Error;
pub use tuple::{ByteBufferTuple, MalformedTuple};

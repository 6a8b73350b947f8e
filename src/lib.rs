//! walscan inspects the persisted write-ahead log of a BFT consensus
//! engine and renders every logged message in human-readable form.
//!
//! - `wal` reads one segment at a time and classifies its terminal
//!   condition (clean EOF, repairable corruption, I/O failure)
//! - `protocol` decodes the persisted consensus message envelopes
//! - `ledger` reconstructs a full block from a proposed record
//! - `codec` holds the DER subset and byte-buffer tuple those paths share
//! - `cli` / `render` are the presentation surface around the core

pub mod cli;
pub mod codec;
pub mod ledger;
pub mod protocol;
pub mod render;
pub mod utils;
pub mod wal;

#[cfg(test)]
mod tests;

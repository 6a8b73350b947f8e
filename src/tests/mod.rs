//! Test module for the WAL inspector.
//!
//! - Fixtures for synthesizing proposals and segment files
//! - Integration tests (segment scan through block reconstruction)

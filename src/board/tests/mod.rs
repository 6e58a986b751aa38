//! Board module tests.
//!
//! Tests are organized into separate files by category:
//! - `movegen.rs` - Move generation, including castling and en passant
//! - `rules.rs` - Check, checkmate, and stalemate classification
//! - `proptest.rs` - Property-based tests

//! Inventory domain module (stock ledger).
//!
//! This crate contains the business rules for stock mutations, implemented
//! purely as deterministic domain logic (no IO, no HTTP, no storage). A
//! mutation is decided against a snapshot of the variant and produces the
//! target stock value together with the single movement row that must be
//! persisted with it.

pub mod movement;
pub mod variant;

pub use movement::{Movement, MovementKind};
pub use variant::{StockMutation, Variant};

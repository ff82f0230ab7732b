//! Stock ledger persistence: current variant state plus the append-only
//! movement log.
//!
//! The ledger owns two things and keeps them consistent: the `variantes`
//! relation (one row per variant, holding current stock) and the
//! `movimientos_inventario` relation (append-only movement log). The single
//! non-negotiable guarantee is that `apply_mutation` commits the stock update
//! and its movement row as one atomic unit, or neither.

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryLedgerStore;
pub use postgres::PostgresLedgerStore;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use zambrano_core::VariantId;
use zambrano_inventory::{Movement, StockMutation, Variant};

/// Ledger storage error.
///
/// Infrastructure failures only; domain decisions (quantity checks) live in
/// `zambrano-inventory`.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The referenced variant does not exist.
    #[error("variant not found")]
    NotFound,

    /// The optimistic stock check failed (a concurrent writer committed
    /// between the caller's read and this write). Safe to retry from a fresh
    /// read.
    #[error("stale stock value: {0}")]
    Conflict(String),

    /// The backing store failed; the transaction was rolled back and no
    /// partial state remains.
    #[error("storage failure: {0}")]
    Storage(String),
}

/// Persistence contract for variants and their movement log.
///
/// `apply_mutation` is the write path for all stock changes. Implementations
/// must:
/// - verify the stored stock still equals `expected_stock` (optimistic check,
///   equivalent to a row-level lock for the read-check-write-append sequence)
/// - set the variant's stock to `mutation.new_stock` and append
///   `mutation.movement` in the same transaction
/// - roll back completely on any failure (no variant-without-movement state)
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Seed variants (product creation). All rows commit or none do.
    async fn insert_variants(&self, variants: Vec<Variant>) -> Result<(), LedgerError>;

    /// Current state of one variant; `None` when the id is unknown.
    async fn fetch_variant(&self, variant_id: VariantId) -> Result<Option<Variant>, LedgerError>;

    /// All variants, active or not, in stable id order.
    async fn list_variants(&self) -> Result<Vec<Variant>, LedgerError>;

    /// Atomically move a variant's stock and append the paired movement row.
    async fn apply_mutation(
        &self,
        variant_id: VariantId,
        expected_stock: i64,
        mutation: StockMutation,
    ) -> Result<(), LedgerError>;

    /// Soft-deactivate variants; returns how many rows actually flipped.
    async fn deactivate_variants(&self, ids: &[VariantId]) -> Result<u64, LedgerError>;

    /// Movement log for one variant, oldest first.
    async fn movements(&self, variant_id: VariantId) -> Result<Vec<Movement>, LedgerError>;
}

#[async_trait]
impl<S> LedgerStore for Arc<S>
where
    S: LedgerStore + ?Sized,
{
    async fn insert_variants(&self, variants: Vec<Variant>) -> Result<(), LedgerError> {
        (**self).insert_variants(variants).await
    }

    async fn fetch_variant(&self, variant_id: VariantId) -> Result<Option<Variant>, LedgerError> {
        (**self).fetch_variant(variant_id).await
    }

    async fn list_variants(&self) -> Result<Vec<Variant>, LedgerError> {
        (**self).list_variants().await
    }

    async fn apply_mutation(
        &self,
        variant_id: VariantId,
        expected_stock: i64,
        mutation: StockMutation,
    ) -> Result<(), LedgerError> {
        (**self).apply_mutation(variant_id, expected_stock, mutation).await
    }

    async fn deactivate_variants(&self, ids: &[VariantId]) -> Result<u64, LedgerError> {
        (**self).deactivate_variants(ids).await
    }

    async fn movements(&self, variant_id: VariantId) -> Result<Vec<Movement>, LedgerError> {
        (**self).movements(variant_id).await
    }
}

//! Stock mutation orchestration (application-level).
//!
//! `StockService` drives a [`LedgerStore`] through the full mutation cycle:
//!
//! ```text
//! sell/receive
//!   ↓
//! 1. Fetch the variant (current stock snapshot)
//!   ↓
//! 2. Decide (pure domain logic, produces target stock + movement row)
//!   ↓
//! 3. Apply atomically, guarded by the snapshot's stock value
//!   ↺ on Conflict: a concurrent writer committed first — re-read, re-decide
//! ```
//!
//! The optimistic loop is what makes the precondition check sound under
//! concurrency: a stale `quantity <= stock` check can never commit, because
//! the store refuses a write whose expected stock no longer matches. Every
//! conflict implies some other mutation committed, so the system as a whole
//! always progresses; a bounded attempt budget turns pathological contention
//! into a storage error rather than an unbounded loop.

use chrono::Utc;
use thiserror::Error;

use zambrano_core::{DomainError, MovementId, VariantId};
use zambrano_inventory::{Movement, StockMutation, Variant};

use crate::ledger::{LedgerError, LedgerStore};

/// Attempt budget for the optimistic retry loop. Exceeding it means the
/// variant is under contention heavier than any realistic request load and
/// surfaces as a retriable storage failure.
const MAX_ATTEMPTS: u32 = 32;

/// Failure of a stock mutation, surfaced to the HTTP layer.
#[derive(Debug, Error)]
pub enum MutationError {
    /// Variant missing or deactivated. Client error; not retried.
    #[error("variant not found")]
    NotFound,

    /// Quantity/price precondition violated. Client error; not retried.
    #[error("invalid quantity: {0}")]
    InvalidQuantity(String),

    /// The store failed; the transaction rolled back, nothing was written.
    /// Safe for the caller to retry.
    #[error("storage failure: {0}")]
    Storage(LedgerError),
}

impl From<LedgerError> for MutationError {
    fn from(value: LedgerError) -> Self {
        match value {
            LedgerError::NotFound => MutationError::NotFound,
            other => MutationError::Storage(other),
        }
    }
}

impl From<DomainError> for MutationError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::NotFound => MutationError::NotFound,
            DomainError::Validation(msg)
            | DomainError::InvariantViolation(msg)
            | DomainError::InvalidId(msg) => MutationError::InvalidQuantity(msg),
            DomainError::Conflict(msg) => MutationError::Storage(LedgerError::Conflict(msg)),
        }
    }
}

/// Application service for the two stock mutations.
///
/// Holds no state of its own; everything lives in the store, so the service
/// is freely shareable across request tasks.
#[derive(Debug, Clone)]
pub struct StockService<S> {
    store: S,
}

impl<S> StockService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S: LedgerStore> StockService<S> {
    /// Sell `quantity` units of a variant at `unit_price` (minor units).
    ///
    /// On success the variant's stock dropped by exactly `quantity` and one
    /// `OUT` movement was appended in the same unit of work.
    pub async fn sell(
        &self,
        variant_id: VariantId,
        quantity: i64,
        unit_price: i64,
    ) -> Result<Movement, MutationError> {
        self.mutate(variant_id, |variant, movement_id, occurred_at| {
            variant.sell(quantity, unit_price, movement_id, occurred_at)
        })
        .await
    }

    /// Receive `quantity` units into a variant's stock.
    pub async fn receive(
        &self,
        variant_id: VariantId,
        quantity: i64,
    ) -> Result<Movement, MutationError> {
        self.mutate(variant_id, |variant, movement_id, occurred_at| {
            variant.receive(quantity, movement_id, occurred_at)
        })
        .await
    }

    async fn mutate<F>(&self, variant_id: VariantId, decide: F) -> Result<Movement, MutationError>
    where
        F: Fn(
            &Variant,
            MovementId,
            chrono::DateTime<Utc>,
        ) -> zambrano_core::DomainResult<StockMutation>,
    {
        for attempt in 1..=MAX_ATTEMPTS {
            let variant = self
                .store
                .fetch_variant(variant_id)
                .await?
                .ok_or(MutationError::NotFound)?;
            let expected_stock = variant.stock;

            let mutation = decide(&variant, MovementId::new(), Utc::now())?;
            let movement = mutation.movement.clone();

            match self
                .store
                .apply_mutation(variant_id, expected_stock, mutation)
                .await
            {
                Ok(()) => return Ok(movement),
                Err(LedgerError::Conflict(msg)) => {
                    tracing::debug!(
                        variant_id = %variant_id,
                        attempt,
                        "optimistic stock check lost the race: {msg}"
                    );
                    continue;
                }
                Err(other) => return Err(other.into()),
            }
        }

        Err(MutationError::Storage(LedgerError::Storage(format!(
            "gave up after {MAX_ATTEMPTS} optimistic attempts on variant {variant_id}"
        ))))
    }
}

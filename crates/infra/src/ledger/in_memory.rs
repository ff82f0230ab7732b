use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use zambrano_core::VariantId;
use zambrano_inventory::{Movement, StockMutation, Variant};

use super::{LedgerError, LedgerStore};

/// In-memory ledger store.
///
/// Intended for tests/dev. One mutex guards the whole ledger, so the
/// check-write-append sequence in `apply_mutation` is naturally atomic; the
/// lock is never held across an await point.
#[derive(Debug, Default)]
pub struct InMemoryLedgerStore {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    variants: HashMap<VariantId, Variant>,
    movements: Vec<Movement>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn insert_variants(&self, variants: Vec<Variant>) -> Result<(), LedgerError> {
        let mut inner = lock(&self.inner)?;

        for variant in &variants {
            if inner.variants.contains_key(&variant.variant_id) {
                return Err(LedgerError::Conflict(format!(
                    "variant {} already exists",
                    variant.variant_id
                )));
            }
        }

        for variant in variants {
            inner.variants.insert(variant.variant_id, variant);
        }
        Ok(())
    }

    async fn fetch_variant(&self, variant_id: VariantId) -> Result<Option<Variant>, LedgerError> {
        let inner = lock(&self.inner)?;
        Ok(inner.variants.get(&variant_id).cloned())
    }

    async fn list_variants(&self) -> Result<Vec<Variant>, LedgerError> {
        let inner = lock(&self.inner)?;
        let mut variants: Vec<_> = inner.variants.values().cloned().collect();
        variants.sort_by_key(|v| *v.variant_id.as_uuid().as_bytes());
        Ok(variants)
    }

    async fn apply_mutation(
        &self,
        variant_id: VariantId,
        expected_stock: i64,
        mutation: StockMutation,
    ) -> Result<(), LedgerError> {
        let mut inner = lock(&self.inner)?;

        let variant = inner
            .variants
            .get_mut(&variant_id)
            .ok_or(LedgerError::NotFound)?;

        if variant.stock != expected_stock {
            return Err(LedgerError::Conflict(format!(
                "expected stock {expected_stock}, found {}",
                variant.stock
            )));
        }

        variant.stock = mutation.new_stock;
        inner.movements.push(mutation.movement);
        Ok(())
    }

    async fn deactivate_variants(&self, ids: &[VariantId]) -> Result<u64, LedgerError> {
        let mut inner = lock(&self.inner)?;

        let mut flipped = 0u64;
        for id in ids {
            if let Some(variant) = inner.variants.get_mut(id) {
                if variant.active {
                    variant.active = false;
                    flipped += 1;
                }
            }
        }
        Ok(flipped)
    }

    async fn movements(&self, variant_id: VariantId) -> Result<Vec<Movement>, LedgerError> {
        let inner = lock(&self.inner)?;
        Ok(inner
            .movements
            .iter()
            .filter(|m| m.variant_id == variant_id)
            .cloned()
            .collect())
    }
}

fn lock(inner: &Mutex<Inner>) -> Result<std::sync::MutexGuard<'_, Inner>, LedgerError> {
    inner
        .lock()
        .map_err(|_| LedgerError::Storage("ledger lock poisoned".to_string()))
}

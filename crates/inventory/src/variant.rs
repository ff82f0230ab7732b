use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use zambrano_core::{ColorId, DomainError, DomainResult, MovementId, ProductId, SizeId, VariantId};

use crate::movement::{Movement, MovementKind};

/// A sellable unit: product + color + size, with its current price and stock.
///
/// Variants are never deleted. `DeleteProductos` flips `active` to false and
/// the row is retained for audit history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    pub variant_id: VariantId,
    pub product_id: ProductId,
    pub color_id: ColorId,
    pub size_id: SizeId,
    /// Price in minor currency units.
    pub price: i64,
    pub stock: i64,
    pub active: bool,
}

/// Decision output of a stock operation: the target stock value plus the one
/// movement row that must be persisted atomically with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockMutation {
    pub new_stock: i64,
    pub movement: Movement,
}

impl Variant {
    /// Decide a sale of `quantity` units at `unit_price`.
    ///
    /// Pure: validates preconditions against this snapshot and returns the
    /// mutation to apply, without touching `self`. Stock can never go
    /// negative; a zero quantity is rejected rather than treated as a no-op,
    /// so every accepted call pairs with exactly one ledger row.
    pub fn sell(
        &self,
        quantity: i64,
        unit_price: i64,
        movement_id: MovementId,
        occurred_at: DateTime<Utc>,
    ) -> DomainResult<StockMutation> {
        self.ensure_active()?;

        if quantity <= 0 {
            return Err(DomainError::validation("quantity must be positive"));
        }
        if unit_price < 0 {
            return Err(DomainError::validation("unit price cannot be negative"));
        }
        if quantity > self.stock {
            return Err(DomainError::validation(format!(
                "quantity {quantity} exceeds available stock {}",
                self.stock
            )));
        }

        let total_amount = quantity
            .checked_mul(unit_price)
            .ok_or_else(|| DomainError::validation("sale total overflows"))?;
        let new_stock = self.stock - quantity;

        Ok(StockMutation {
            new_stock,
            movement: Movement {
                movement_id,
                variant_id: self.variant_id,
                kind: MovementKind::Out,
                quantity,
                stock_before: self.stock,
                stock_after: new_stock,
                unit_price: Some(unit_price),
                total_amount: Some(total_amount),
                occurred_at,
            },
        })
    }

    /// Decide a stock receipt of `quantity` units.
    pub fn receive(
        &self,
        quantity: i64,
        movement_id: MovementId,
        occurred_at: DateTime<Utc>,
    ) -> DomainResult<StockMutation> {
        self.ensure_active()?;

        if quantity <= 0 {
            return Err(DomainError::validation("quantity must be positive"));
        }

        let new_stock = self
            .stock
            .checked_add(quantity)
            .ok_or_else(|| DomainError::validation("quantity overflows stock counter"))?;

        Ok(StockMutation {
            new_stock,
            movement: Movement {
                movement_id,
                variant_id: self.variant_id,
                kind: MovementKind::In,
                quantity,
                stock_before: self.stock,
                stock_after: new_stock,
                unit_price: None,
                total_amount: None,
                occurred_at,
            },
        })
    }

    // A deactivated variant behaves like a missing one for mutations.
    fn ensure_active(&self) -> DomainResult<()> {
        if !self.active {
            return Err(DomainError::not_found());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_variant(stock: i64) -> Variant {
        Variant {
            variant_id: VariantId::new(),
            product_id: ProductId::new(),
            color_id: ColorId::new(),
            size_id: SizeId::new(),
            price: 2500,
            stock,
            active: true,
        }
    }

    fn test_time() -> DateTime<Utc> {
        Utc::now()
    }

    #[test]
    fn sell_reduces_stock_and_records_out_movement() {
        let variant = test_variant(10);
        let movement_id = MovementId::new();
        let at = test_time();

        let mutation = variant.sell(3, 2500, movement_id, at).unwrap();

        assert_eq!(mutation.new_stock, 7);
        assert_eq!(mutation.movement.movement_id, movement_id);
        assert_eq!(mutation.movement.variant_id, variant.variant_id);
        assert_eq!(mutation.movement.kind, MovementKind::Out);
        assert_eq!(mutation.movement.quantity, 3);
        assert_eq!(mutation.movement.stock_before, 10);
        assert_eq!(mutation.movement.stock_after, 7);
        assert_eq!(mutation.movement.unit_price, Some(2500));
        assert_eq!(mutation.movement.total_amount, Some(7500));
        assert_eq!(mutation.movement.occurred_at, at);
    }

    #[test]
    fn sell_can_drain_stock_to_zero() {
        let variant = test_variant(4);
        let mutation = variant.sell(4, 100, MovementId::new(), test_time()).unwrap();
        assert_eq!(mutation.new_stock, 0);
        assert_eq!(mutation.movement.stock_after, 0);
    }

    #[test]
    fn sell_rejects_zero_quantity() {
        let variant = test_variant(10);
        let err = variant.sell(0, 2500, MovementId::new(), test_time()).unwrap_err();
        match err {
            DomainError::Validation(_) => {}
            other => panic!("expected Validation error, got {other:?}"),
        }
    }

    #[test]
    fn sell_rejects_negative_quantity() {
        let variant = test_variant(10);
        let err = variant.sell(-2, 2500, MovementId::new(), test_time()).unwrap_err();
        match err {
            DomainError::Validation(_) => {}
            other => panic!("expected Validation error, got {other:?}"),
        }
    }

    #[test]
    fn sell_rejects_quantity_above_stock() {
        let variant = test_variant(10);
        let err = variant.sell(11, 2500, MovementId::new(), test_time()).unwrap_err();
        match err {
            DomainError::Validation(msg) => assert!(msg.contains("exceeds available stock")),
            other => panic!("expected Validation error, got {other:?}"),
        }
    }

    #[test]
    fn sell_rejects_negative_unit_price() {
        let variant = test_variant(10);
        let err = variant.sell(1, -1, MovementId::new(), test_time()).unwrap_err();
        match err {
            DomainError::Validation(_) => {}
            other => panic!("expected Validation error, got {other:?}"),
        }
    }

    #[test]
    fn sell_allows_zero_unit_price() {
        // Giveaways are legal; the amount is recorded as zero.
        let variant = test_variant(5);
        let mutation = variant.sell(2, 0, MovementId::new(), test_time()).unwrap();
        assert_eq!(mutation.movement.total_amount, Some(0));
    }

    #[test]
    fn sell_rejects_inactive_variant() {
        let mut variant = test_variant(10);
        variant.active = false;
        let err = variant.sell(1, 2500, MovementId::new(), test_time()).unwrap_err();
        assert_eq!(err, DomainError::NotFound);
    }

    #[test]
    fn receive_increases_stock_and_records_in_movement() {
        let variant = test_variant(7);
        let movement_id = MovementId::new();
        let at = test_time();

        let mutation = variant.receive(5, movement_id, at).unwrap();

        assert_eq!(mutation.new_stock, 12);
        assert_eq!(mutation.movement.kind, MovementKind::In);
        assert_eq!(mutation.movement.quantity, 5);
        assert_eq!(mutation.movement.stock_before, 7);
        assert_eq!(mutation.movement.stock_after, 12);
        assert_eq!(mutation.movement.unit_price, None);
        assert_eq!(mutation.movement.total_amount, None);
    }

    #[test]
    fn receive_rejects_zero_quantity() {
        let variant = test_variant(7);
        let err = variant.receive(0, MovementId::new(), test_time()).unwrap_err();
        match err {
            DomainError::Validation(_) => {}
            other => panic!("expected Validation error, got {other:?}"),
        }
    }

    #[test]
    fn receive_rejects_inactive_variant() {
        let mut variant = test_variant(7);
        variant.active = false;
        let err = variant.receive(1, MovementId::new(), test_time()).unwrap_err();
        assert_eq!(err, DomainError::NotFound);
    }

    #[test]
    fn decisions_do_not_mutate_the_snapshot() {
        let variant = test_variant(10);
        let before = variant.clone();

        let _ = variant.sell(3, 2500, MovementId::new(), test_time());
        let _ = variant.receive(5, MovementId::new(), test_time());
        let _ = variant.sell(99, 2500, MovementId::new(), test_time());

        assert_eq!(variant, before);
    }

    #[test]
    fn end_to_end_arithmetic_example() {
        // stock=10, sell 3 @ 25.00, receive 5, then an oversell is rejected.
        let mut variant = test_variant(10);

        let sale = variant.sell(3, 2500, MovementId::new(), test_time()).unwrap();
        assert_eq!(sale.new_stock, 7);
        assert_eq!(sale.movement.total_amount, Some(7500));
        variant.stock = sale.new_stock;

        let receipt = variant.receive(5, MovementId::new(), test_time()).unwrap();
        assert_eq!(receipt.new_stock, 12);
        assert_eq!(receipt.movement.stock_before, 7);
        variant.stock = receipt.new_stock;

        let err = variant.sell(20, 2500, MovementId::new(), test_time()).unwrap_err();
        match err {
            DomainError::Validation(_) => {}
            other => panic!("expected Validation error, got {other:?}"),
        }
        assert_eq!(variant.stock, 12);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 1000,
                max_global_rejects: 100_000,
                ..ProptestConfig::default()
            })]

            /// Property: for 0 < quantity <= stock, a sale reduces stock by
            /// exactly `quantity` and the movement's before/after pair matches.
            #[test]
            fn sale_arithmetic_is_exact(
                stock in 1i64..100_000,
                quantity in 1i64..100_000,
                unit_price in 0i64..1_000_000,
            ) {
                prop_assume!(quantity <= stock);

                let variant = test_variant(stock);
                let mutation = variant
                    .sell(quantity, unit_price, MovementId::new(), Utc::now())
                    .unwrap();

                prop_assert_eq!(mutation.new_stock, stock - quantity);
                prop_assert_eq!(mutation.movement.stock_before, stock);
                prop_assert_eq!(mutation.movement.stock_after, stock - quantity);
                prop_assert_eq!(mutation.movement.quantity, quantity);
                prop_assert_eq!(mutation.movement.total_amount, Some(quantity * unit_price));
                prop_assert!(mutation.new_stock >= 0);
            }

            /// Property: any quantity above stock is rejected.
            #[test]
            fn oversell_is_always_rejected(
                stock in 0i64..100_000,
                excess in 1i64..100_000,
            ) {
                let variant = test_variant(stock);
                let err = variant
                    .sell(stock + excess, 100, MovementId::new(), Utc::now())
                    .unwrap_err();
                prop_assert!(matches!(err, DomainError::Validation(_)));
            }

            /// Property: non-positive quantities are rejected by both operations.
            #[test]
            fn non_positive_quantity_is_always_rejected(
                stock in 0i64..100_000,
                quantity in -100_000i64..=0,
            ) {
                let variant = test_variant(stock);
                prop_assert!(matches!(
                    variant.sell(quantity, 100, MovementId::new(), Utc::now()),
                    Err(DomainError::Validation(_))
                ));
                prop_assert!(matches!(
                    variant.receive(quantity, MovementId::new(), Utc::now()),
                    Err(DomainError::Validation(_))
                ));
            }

            /// Property: a receipt increases stock by exactly `quantity`.
            #[test]
            fn receipt_arithmetic_is_exact(
                stock in 0i64..100_000,
                quantity in 1i64..100_000,
            ) {
                let variant = test_variant(stock);
                let mutation = variant
                    .receive(quantity, MovementId::new(), Utc::now())
                    .unwrap();

                prop_assert_eq!(mutation.new_stock, stock + quantity);
                prop_assert_eq!(mutation.movement.stock_before, stock);
                prop_assert_eq!(mutation.movement.stock_after, stock + quantity);
                prop_assert_eq!(mutation.movement.unit_price, None);
            }

            /// Property: decisions are deterministic (same snapshot + inputs
            /// produce the same mutation).
            #[test]
            fn decisions_are_deterministic(
                stock in 1i64..100_000,
                quantity in 1i64..100_000,
            ) {
                prop_assume!(quantity <= stock);

                let variant = test_variant(stock);
                let movement_id = MovementId::new();
                let at = Utc::now();

                let first = variant.sell(quantity, 100, movement_id, at).unwrap();
                let second = variant.sell(quantity, 100, movement_id, at).unwrap();
                prop_assert_eq!(first, second);
            }
        }
    }
}

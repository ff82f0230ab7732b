//! Postgres-backed ledger store.
//!
//! Persists variants and the movement log in PostgreSQL. The atomic
//! read-check-write-append contract of [`LedgerStore::apply_mutation`] is
//! implemented with a guarded `UPDATE ... AND stock = $expected` plus the
//! movement `INSERT` inside one transaction: if a concurrent writer moved the
//! stock first, the update matches zero rows and the transaction rolls back
//! with `Conflict`.
//!
//! ## Error Mapping
//!
//! | SQLx error | PostgreSQL code | LedgerError | Scenario |
//! |------------|-----------------|-------------|----------|
//! | Database (unique violation) | `23505` | `Conflict` | Duplicate variant/movement id |
//! | Database (check violation) | `23514` | `Storage` | Schema-level guard tripped (e.g. negative stock) |
//! | Database (other) | any | `Storage` | Other database errors |
//! | PoolClosed / network / other | n/a | `Storage` | Connection-level failures |

use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Row};
use tracing::instrument;

use zambrano_core::{ColorId, MovementId, ProductId, SizeId, VariantId};
use zambrano_inventory::{Movement, MovementKind, StockMutation, Variant};

use super::{LedgerError, LedgerStore};

/// Postgres-backed ledger store.
///
/// Shares a sqlx connection pool; all mutating operations run inside a
/// transaction so a failure can never leave a stock update without its
/// movement row (or the reverse).
#[derive(Debug, Clone)]
pub struct PostgresLedgerStore {
    pool: Arc<PgPool>,
}

impl PostgresLedgerStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

#[async_trait::async_trait]
impl LedgerStore for PostgresLedgerStore {
    #[instrument(skip(self, variants), fields(count = variants.len()), err)]
    async fn insert_variants(&self, variants: Vec<Variant>) -> Result<(), LedgerError> {
        if variants.is_empty() {
            return Ok(());
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        for variant in &variants {
            sqlx::query(
                r#"
                INSERT INTO variantes
                    (id_variante, id_producto, id_color, id_talla, precio, stock, activo)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(variant.variant_id.as_uuid())
            .bind(variant.product_id.as_uuid())
            .bind(variant.color_id.as_uuid())
            .bind(variant.size_id.as_uuid())
            .bind(variant.price)
            .bind(variant.stock)
            .bind(variant.active)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("insert_variant", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))
    }

    #[instrument(skip(self), fields(variant_id = %variant_id), err)]
    async fn fetch_variant(&self, variant_id: VariantId) -> Result<Option<Variant>, LedgerError> {
        let row = sqlx::query(
            r#"
            SELECT id_variante, id_producto, id_color, id_talla, precio, stock, activo
            FROM variantes
            WHERE id_variante = $1
            "#,
        )
        .bind(variant_id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("fetch_variant", e))?;

        match row {
            Some(row) => {
                let variant = VariantRow::from_row(&row)
                    .map_err(|e| LedgerError::Storage(format!("bad variant row: {e}")))?;
                Ok(Some(variant.into()))
            }
            None => Ok(None),
        }
    }

    #[instrument(skip(self), err)]
    async fn list_variants(&self) -> Result<Vec<Variant>, LedgerError> {
        let rows = sqlx::query(
            r#"
            SELECT id_variante, id_producto, id_color, id_talla, precio, stock, activo
            FROM variantes
            ORDER BY id_variante
            "#,
        )
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_variants", e))?;

        let mut variants = Vec::with_capacity(rows.len());
        for row in rows {
            let variant = VariantRow::from_row(&row)
                .map_err(|e| LedgerError::Storage(format!("bad variant row: {e}")))?;
            variants.push(variant.into());
        }
        Ok(variants)
    }

    #[instrument(
        skip(self, mutation),
        fields(variant_id = %variant_id, expected_stock, new_stock = mutation.new_stock),
        err
    )]
    async fn apply_mutation(
        &self,
        variant_id: VariantId,
        expected_stock: i64,
        mutation: StockMutation,
    ) -> Result<(), LedgerError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let updated = sqlx::query(
            r#"
            UPDATE variantes
            SET stock = $1
            WHERE id_variante = $2 AND stock = $3
            "#,
        )
        .bind(mutation.new_stock)
        .bind(variant_id.as_uuid())
        .bind(expected_stock)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("update_stock", e))?;

        if updated.rows_affected() == 0 {
            // Distinguish a vanished variant from a concurrent writer.
            let exists = sqlx::query("SELECT 1 FROM variantes WHERE id_variante = $1")
                .bind(variant_id.as_uuid())
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error("check_variant", e))?
                .is_some();

            tx.rollback()
                .await
                .map_err(|e| map_sqlx_error("rollback", e))?;

            return Err(if exists {
                LedgerError::Conflict(format!(
                    "stock of {variant_id} moved away from {expected_stock}"
                ))
            } else {
                LedgerError::NotFound
            });
        }

        let movement = &mutation.movement;
        sqlx::query(
            r#"
            INSERT INTO movimientos_inventario
                (id_movimiento, id_variante, tipo, cantidad,
                 stock_anterior, stock_nuevo, precio_unitario, monto_total, registrado_en)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(movement.movement_id.as_uuid())
        .bind(movement.variant_id.as_uuid())
        .bind(movement.kind.as_str())
        .bind(movement.quantity)
        .bind(movement.stock_before)
        .bind(movement.stock_after)
        .bind(movement.unit_price)
        .bind(movement.total_amount)
        .bind(movement.occurred_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("insert_movement", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))
    }

    #[instrument(skip(self, ids), fields(count = ids.len()), err)]
    async fn deactivate_variants(&self, ids: &[VariantId]) -> Result<u64, LedgerError> {
        let uuids: Vec<uuid::Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();

        let updated = sqlx::query(
            r#"
            UPDATE variantes
            SET activo = FALSE
            WHERE id_variante = ANY($1) AND activo
            "#,
        )
        .bind(&uuids)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("deactivate_variants", e))?;

        Ok(updated.rows_affected())
    }

    #[instrument(skip(self), fields(variant_id = %variant_id), err)]
    async fn movements(&self, variant_id: VariantId) -> Result<Vec<Movement>, LedgerError> {
        let rows = sqlx::query(
            r#"
            SELECT id_movimiento, id_variante, tipo, cantidad,
                   stock_anterior, stock_nuevo, precio_unitario, monto_total, registrado_en
            FROM movimientos_inventario
            WHERE id_variante = $1
            ORDER BY registrado_en ASC, id_movimiento ASC
            "#,
        )
        .bind(variant_id.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("movements", e))?;

        let mut movements = Vec::with_capacity(rows.len());
        for row in rows {
            let movement = MovementRow::from_row(&row)
                .map_err(|e| LedgerError::Storage(format!("bad movement row: {e}")))?;
            movements.push(movement.try_into()?);
        }
        Ok(movements)
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> LedgerError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {operation}: {}", db_err.message());
            match db_err.code().as_deref() {
                Some("23505") => LedgerError::Conflict(msg),
                _ => LedgerError::Storage(msg),
            }
        }
        other => LedgerError::Storage(format!("sqlx error in {operation}: {other}")),
    }
}

#[derive(Debug)]
struct VariantRow {
    id_variante: uuid::Uuid,
    id_producto: uuid::Uuid,
    id_color: uuid::Uuid,
    id_talla: uuid::Uuid,
    precio: i64,
    stock: i64,
    activo: bool,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for VariantRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(VariantRow {
            id_variante: row.try_get("id_variante")?,
            id_producto: row.try_get("id_producto")?,
            id_color: row.try_get("id_color")?,
            id_talla: row.try_get("id_talla")?,
            precio: row.try_get("precio")?,
            stock: row.try_get("stock")?,
            activo: row.try_get("activo")?,
        })
    }
}

impl From<VariantRow> for Variant {
    fn from(row: VariantRow) -> Self {
        Variant {
            variant_id: VariantId::from_uuid(row.id_variante),
            product_id: ProductId::from_uuid(row.id_producto),
            color_id: ColorId::from_uuid(row.id_color),
            size_id: SizeId::from_uuid(row.id_talla),
            price: row.precio,
            stock: row.stock,
            active: row.activo,
        }
    }
}

#[derive(Debug)]
struct MovementRow {
    id_movimiento: uuid::Uuid,
    id_variante: uuid::Uuid,
    tipo: String,
    cantidad: i64,
    stock_anterior: i64,
    stock_nuevo: i64,
    precio_unitario: Option<i64>,
    monto_total: Option<i64>,
    registrado_en: DateTime<Utc>,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for MovementRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(MovementRow {
            id_movimiento: row.try_get("id_movimiento")?,
            id_variante: row.try_get("id_variante")?,
            tipo: row.try_get("tipo")?,
            cantidad: row.try_get("cantidad")?,
            stock_anterior: row.try_get("stock_anterior")?,
            stock_nuevo: row.try_get("stock_nuevo")?,
            precio_unitario: row.try_get("precio_unitario")?,
            monto_total: row.try_get("monto_total")?,
            registrado_en: row.try_get("registrado_en")?,
        })
    }
}

impl TryFrom<MovementRow> for Movement {
    type Error = LedgerError;

    fn try_from(row: MovementRow) -> Result<Self, Self::Error> {
        let kind = MovementKind::from_str(&row.tipo)
            .map_err(|e| LedgerError::Storage(format!("bad movement row: {e}")))?;
        Ok(Movement {
            movement_id: MovementId::from_uuid(row.id_movimiento),
            variant_id: VariantId::from_uuid(row.id_variante),
            kind,
            quantity: row.cantidad,
            stock_before: row.stock_anterior,
            stock_after: row.stock_nuevo,
            unit_price: row.precio_unitario,
            total_amount: row.monto_total,
            occurred_at: row.registrado_en,
        })
    }
}

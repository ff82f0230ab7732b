//! Postgres-backed catalog store.
//!
//! Lookup tables carry natural-key unique constraints (`marcas.nombre`,
//! `estilos (id_marca, nombre)`, `tallas.valor`); the `ensure_*` methods lean
//! on `ON CONFLICT ... RETURNING` so a concurrent first-use of the same name
//! resolves to a single row instead of erroring.

use std::sync::Arc;

use sqlx::{FromRow, PgPool, Row};
use tracing::instrument;

use zambrano_catalog::{Brand, Category, Color, Product, SizeLabel, Style};
use zambrano_core::{BrandId, CategoryId, ColorId, ProductId, SizeId, StyleId};

use super::{CatalogError, CatalogStore};

/// Postgres-backed catalog store.
#[derive(Debug, Clone)]
pub struct PostgresCatalogStore {
    pool: Arc<PgPool>,
}

impl PostgresCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

#[async_trait::async_trait]
impl CatalogStore for PostgresCatalogStore {
    #[instrument(skip(self, category), fields(name = %category.name), err)]
    async fn insert_category(&self, category: Category) -> Result<(), CatalogError> {
        sqlx::query("INSERT INTO categorias (id_categoria, nombre, activo) VALUES ($1, $2, $3)")
            .bind(category.category_id.as_uuid())
            .bind(&category.name)
            .bind(category.active)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("insert_category", e))?;
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn list_categories(&self) -> Result<Vec<Category>, CatalogError> {
        let rows = sqlx::query(
            "SELECT id_categoria, nombre, activo FROM categorias WHERE activo ORDER BY nombre",
        )
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_categories", e))?;

        rows.iter()
            .map(|row| {
                Ok(Category {
                    category_id: CategoryId::from_uuid(
                        row.try_get("id_categoria").map_err(bad_row)?,
                    ),
                    name: row.try_get("nombre").map_err(bad_row)?,
                    active: row.try_get("activo").map_err(bad_row)?,
                })
            })
            .collect()
    }

    #[instrument(skip(self), fields(category_id = %category_id), err)]
    async fn category_exists(&self, category_id: CategoryId) -> Result<bool, CatalogError> {
        let row = sqlx::query("SELECT 1 FROM categorias WHERE id_categoria = $1")
            .bind(category_id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("category_exists", e))?;
        Ok(row.is_some())
    }

    #[instrument(skip(self, color), fields(name = %color.name), err)]
    async fn insert_color(&self, color: Color) -> Result<(), CatalogError> {
        sqlx::query("INSERT INTO colores (id_color, nombre) VALUES ($1, $2)")
            .bind(color.color_id.as_uuid())
            .bind(&color.name)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("insert_color", e))?;
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn list_colors(&self) -> Result<Vec<Color>, CatalogError> {
        let rows = sqlx::query("SELECT id_color, nombre FROM colores ORDER BY nombre")
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_colors", e))?;

        rows.iter()
            .map(|row| {
                Ok(Color {
                    color_id: ColorId::from_uuid(row.try_get("id_color").map_err(bad_row)?),
                    name: row.try_get("nombre").map_err(bad_row)?,
                })
            })
            .collect()
    }

    #[instrument(skip(self), fields(color_id = %color_id), err)]
    async fn color_exists(&self, color_id: ColorId) -> Result<bool, CatalogError> {
        let row = sqlx::query("SELECT 1 FROM colores WHERE id_color = $1")
            .bind(color_id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("color_exists", e))?;
        Ok(row.is_some())
    }

    #[instrument(skip(self), err)]
    async fn list_sizes(&self) -> Result<Vec<SizeLabel>, CatalogError> {
        let rows = sqlx::query("SELECT id_talla, valor FROM tallas ORDER BY valor")
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_sizes", e))?;

        rows.iter()
            .map(|row| {
                Ok(SizeLabel {
                    size_id: SizeId::from_uuid(row.try_get("id_talla").map_err(bad_row)?),
                    value: row.try_get("valor").map_err(bad_row)?,
                })
            })
            .collect()
    }

    #[instrument(skip(self), fields(value = %value), err)]
    async fn ensure_size(&self, value: &str) -> Result<SizeId, CatalogError> {
        let row = sqlx::query(
            r#"
            INSERT INTO tallas (id_talla, valor)
            VALUES ($1, $2)
            ON CONFLICT (valor) DO UPDATE SET valor = EXCLUDED.valor
            RETURNING id_talla
            "#,
        )
        .bind(SizeId::new().as_uuid())
        .bind(value)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("ensure_size", e))?;

        Ok(SizeId::from_uuid(row.try_get("id_talla").map_err(bad_row)?))
    }

    #[instrument(skip(self), fields(name = %name), err)]
    async fn ensure_brand(&self, name: &str) -> Result<BrandId, CatalogError> {
        let row = sqlx::query(
            r#"
            INSERT INTO marcas (id_marca, nombre)
            VALUES ($1, $2)
            ON CONFLICT (nombre) DO UPDATE SET nombre = EXCLUDED.nombre
            RETURNING id_marca
            "#,
        )
        .bind(BrandId::new().as_uuid())
        .bind(name)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("ensure_brand", e))?;

        Ok(BrandId::from_uuid(row.try_get("id_marca").map_err(bad_row)?))
    }

    #[instrument(skip(self), fields(brand_id = %brand_id, name = %name), err)]
    async fn ensure_style(&self, brand_id: BrandId, name: &str) -> Result<StyleId, CatalogError> {
        let row = sqlx::query(
            r#"
            INSERT INTO estilos (id_estilo, id_marca, nombre)
            VALUES ($1, $2, $3)
            ON CONFLICT (id_marca, nombre) DO UPDATE SET nombre = EXCLUDED.nombre
            RETURNING id_estilo
            "#,
        )
        .bind(StyleId::new().as_uuid())
        .bind(brand_id.as_uuid())
        .bind(name)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("ensure_style", e))?;

        Ok(StyleId::from_uuid(row.try_get("id_estilo").map_err(bad_row)?))
    }

    #[instrument(skip(self, product), fields(name = %product.name), err)]
    async fn insert_product(&self, product: Product) -> Result<(), CatalogError> {
        sqlx::query(
            r#"
            INSERT INTO productos (id_producto, nombre, id_marca, id_estilo, id_categoria, activo)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(product.product_id.as_uuid())
        .bind(&product.name)
        .bind(product.brand_id.as_uuid())
        .bind(product.style_id.map(|id| *id.as_uuid()))
        .bind(product.category_id.as_uuid())
        .bind(product.active)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_product", e))?;
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn list_products(&self) -> Result<Vec<Product>, CatalogError> {
        let rows = sqlx::query(
            r#"
            SELECT id_producto, nombre, id_marca, id_estilo, id_categoria, activo
            FROM productos
            WHERE activo
            ORDER BY id_producto
            "#,
        )
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_products", e))?;

        let mut products = Vec::with_capacity(rows.len());
        for row in &rows {
            products.push(ProductRow::from_row(row).map_err(bad_row)?.into());
        }
        Ok(products)
    }

    #[instrument(skip(self), err)]
    async fn list_brands(&self) -> Result<Vec<Brand>, CatalogError> {
        let rows = sqlx::query("SELECT id_marca, nombre FROM marcas ORDER BY nombre")
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_brands", e))?;

        rows.iter()
            .map(|row| {
                Ok(Brand {
                    brand_id: BrandId::from_uuid(row.try_get("id_marca").map_err(bad_row)?),
                    name: row.try_get("nombre").map_err(bad_row)?,
                })
            })
            .collect()
    }

    #[instrument(skip(self), err)]
    async fn list_styles(&self) -> Result<Vec<Style>, CatalogError> {
        let rows = sqlx::query("SELECT id_estilo, id_marca, nombre FROM estilos ORDER BY nombre")
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_styles", e))?;

        rows.iter()
            .map(|row| {
                Ok(Style {
                    style_id: StyleId::from_uuid(row.try_get("id_estilo").map_err(bad_row)?),
                    brand_id: BrandId::from_uuid(row.try_get("id_marca").map_err(bad_row)?),
                    name: row.try_get("nombre").map_err(bad_row)?,
                })
            })
            .collect()
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> CatalogError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {operation}: {}", db_err.message());
            match db_err.code().as_deref() {
                Some("23505") => CatalogError::Conflict(msg),
                _ => CatalogError::Storage(msg),
            }
        }
        other => CatalogError::Storage(format!("sqlx error in {operation}: {other}")),
    }
}

fn bad_row(err: sqlx::Error) -> CatalogError {
    CatalogError::Storage(format!("bad catalog row: {err}"))
}

#[derive(Debug)]
struct ProductRow {
    id_producto: uuid::Uuid,
    nombre: String,
    id_marca: uuid::Uuid,
    id_estilo: Option<uuid::Uuid>,
    id_categoria: uuid::Uuid,
    activo: bool,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for ProductRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(ProductRow {
            id_producto: row.try_get("id_producto")?,
            nombre: row.try_get("nombre")?,
            id_marca: row.try_get("id_marca")?,
            id_estilo: row.try_get("id_estilo")?,
            id_categoria: row.try_get("id_categoria")?,
            activo: row.try_get("activo")?,
        })
    }
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            product_id: ProductId::from_uuid(row.id_producto),
            name: row.nombre,
            brand_id: BrandId::from_uuid(row.id_marca),
            style_id: row.id_estilo.map(StyleId::from_uuid),
            category_id: CategoryId::from_uuid(row.id_categoria),
            active: row.activo,
        }
    }
}

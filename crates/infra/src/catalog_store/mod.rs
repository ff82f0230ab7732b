//! Catalog persistence: products and their lookup tables.
//!
//! Brands, styles and sizes are resolved get-or-create style during product
//! creation; categories and colors are maintained through their own
//! endpoints. Catalog rows carry no stock — that lives in the ledger.

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryCatalogStore;
pub use postgres::PostgresCatalogStore;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use zambrano_catalog::{Brand, Category, Color, NewProduct, Product, SizeLabel, Style};
use zambrano_core::{BrandId, CategoryId, ColorId, SizeId, StyleId};

/// Catalog storage error.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A referenced catalog row does not exist.
    #[error("not found")]
    NotFound,

    /// A uniqueness guarantee was violated.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The backing store failed.
    #[error("storage failure: {0}")]
    Storage(String),
}

/// Persistence contract for the catalog.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn insert_category(&self, category: Category) -> Result<(), CatalogError>;
    /// Active categories, ordered by name.
    async fn list_categories(&self) -> Result<Vec<Category>, CatalogError>;
    async fn category_exists(&self, category_id: CategoryId) -> Result<bool, CatalogError>;

    async fn insert_color(&self, color: Color) -> Result<(), CatalogError>;
    /// All colors, ordered by name.
    async fn list_colors(&self) -> Result<Vec<Color>, CatalogError>;
    async fn color_exists(&self, color_id: ColorId) -> Result<bool, CatalogError>;

    /// All size labels, ordered by value.
    async fn list_sizes(&self) -> Result<Vec<SizeLabel>, CatalogError>;
    /// Resolve a size label by value, inserting it when absent.
    async fn ensure_size(&self, value: &str) -> Result<SizeId, CatalogError>;

    /// Resolve a brand by name, inserting it when absent.
    async fn ensure_brand(&self, name: &str) -> Result<BrandId, CatalogError>;
    /// Resolve a style by brand + name, inserting it when absent.
    async fn ensure_style(&self, brand_id: BrandId, name: &str) -> Result<StyleId, CatalogError>;

    async fn insert_product(&self, product: Product) -> Result<(), CatalogError>;
    /// Active products, in stable id order.
    async fn list_products(&self) -> Result<Vec<Product>, CatalogError>;

    async fn list_brands(&self) -> Result<Vec<Brand>, CatalogError>;
    async fn list_styles(&self) -> Result<Vec<Style>, CatalogError>;
}

#[async_trait]
impl<S> CatalogStore for Arc<S>
where
    S: CatalogStore + ?Sized,
{
    async fn insert_category(&self, category: Category) -> Result<(), CatalogError> {
        (**self).insert_category(category).await
    }

    async fn list_categories(&self) -> Result<Vec<Category>, CatalogError> {
        (**self).list_categories().await
    }

    async fn category_exists(&self, category_id: CategoryId) -> Result<bool, CatalogError> {
        (**self).category_exists(category_id).await
    }

    async fn insert_color(&self, color: Color) -> Result<(), CatalogError> {
        (**self).insert_color(color).await
    }

    async fn list_colors(&self) -> Result<Vec<Color>, CatalogError> {
        (**self).list_colors().await
    }

    async fn color_exists(&self, color_id: ColorId) -> Result<bool, CatalogError> {
        (**self).color_exists(color_id).await
    }

    async fn list_sizes(&self) -> Result<Vec<SizeLabel>, CatalogError> {
        (**self).list_sizes().await
    }

    async fn ensure_size(&self, value: &str) -> Result<SizeId, CatalogError> {
        (**self).ensure_size(value).await
    }

    async fn ensure_brand(&self, name: &str) -> Result<BrandId, CatalogError> {
        (**self).ensure_brand(name).await
    }

    async fn ensure_style(&self, brand_id: BrandId, name: &str) -> Result<StyleId, CatalogError> {
        (**self).ensure_style(brand_id, name).await
    }

    async fn insert_product(&self, product: Product) -> Result<(), CatalogError> {
        (**self).insert_product(product).await
    }

    async fn list_products(&self) -> Result<Vec<Product>, CatalogError> {
        (**self).list_products().await
    }

    async fn list_brands(&self) -> Result<Vec<Brand>, CatalogError> {
        (**self).list_brands().await
    }

    async fn list_styles(&self) -> Result<Vec<Style>, CatalogError> {
        (**self).list_styles().await
    }
}

/// Resolve the lookup references of a validated [`NewProduct`] and build the
/// product row. Brand, style and sizes are created on first use; the category
/// and color must already exist.
pub async fn resolve_product<S: CatalogStore>(
    store: &S,
    new_product: &NewProduct,
) -> Result<Product, CatalogError> {
    if !store.category_exists(new_product.category_id).await? {
        return Err(CatalogError::NotFound);
    }
    if !store.color_exists(new_product.color_id).await? {
        return Err(CatalogError::NotFound);
    }

    let brand_id = store.ensure_brand(&new_product.brand).await?;
    let style_id = match &new_product.style {
        Some(style) => Some(store.ensure_style(brand_id, style).await?),
        None => None,
    };

    Ok(Product {
        product_id: zambrano_core::ProductId::new(),
        name: new_product.name.clone(),
        brand_id,
        style_id,
        category_id: new_product.category_id,
        active: true,
    })
}

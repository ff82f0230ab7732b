use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use zambrano_catalog::NewProduct;
use zambrano_core::{DomainError, ProductId, VariantId};
use zambrano_infra::catalog_store::{
    resolve_product, CatalogError, CatalogStore, InMemoryCatalogStore, PostgresCatalogStore,
};
use zambrano_infra::ledger::{
    InMemoryLedgerStore, LedgerError, LedgerStore, PostgresLedgerStore,
};
use zambrano_infra::stock_service::StockService;
use zambrano_inventory::Variant;

/// One row of the public product listing: a variant joined with its catalog
/// labels, the shape `/GetProductos` has always served.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantListing {
    pub variant_id: VariantId,
    pub brand: String,
    pub style: Option<String>,
    pub color: String,
    pub size: String,
    pub price: i64,
    pub stock: i64,
}

/// Failure of a composite catalog command (product creation).
#[derive(Debug, Error)]
pub enum CatalogCommandError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Wired application services shared by all request handlers.
///
/// Holds the stores behind trait objects so the same router serves both the
/// in-memory wiring (dev/tests) and the Postgres wiring (production).
pub struct AppServices {
    stock: StockService<Arc<dyn LedgerStore>>,
    ledger: Arc<dyn LedgerStore>,
    catalog: Arc<dyn CatalogStore>,
}

/// Select stores from the environment: `USE_PERSISTENT_STORES=true` wires
/// Postgres (via `DATABASE_URL`), anything else the in-memory pair.
pub async fn build_services() -> AppServices {
    let use_persistent = std::env::var("USE_PERSISTENT_STORES")
        .unwrap_or_else(|_| "false".to_string())
        .parse::<bool>()
        .unwrap_or(false);

    if use_persistent {
        let database_url = std::env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set when USE_PERSISTENT_STORES=true");
        let pool = sqlx::PgPool::connect(&database_url)
            .await
            .expect("failed to connect to Postgres");

        AppServices::new(
            Arc::new(PostgresLedgerStore::new(pool.clone())),
            Arc::new(PostgresCatalogStore::new(pool)),
        )
    } else {
        AppServices::new(
            Arc::new(InMemoryLedgerStore::new()),
            Arc::new(InMemoryCatalogStore::new()),
        )
    }
}

impl AppServices {
    pub fn new(ledger: Arc<dyn LedgerStore>, catalog: Arc<dyn CatalogStore>) -> Self {
        Self {
            stock: StockService::new(ledger.clone()),
            ledger,
            catalog,
        }
    }

    pub fn stock(&self) -> &StockService<Arc<dyn LedgerStore>> {
        &self.stock
    }

    pub fn ledger(&self) -> &Arc<dyn LedgerStore> {
        &self.ledger
    }

    pub fn catalog(&self) -> &Arc<dyn CatalogStore> {
        &self.catalog
    }

    /// Create a product with its variants: validate the draft, resolve
    /// brand/style/sizes get-or-create style, insert the product row, then
    /// seed one ledger variant per draft.
    pub async fn create_product(
        &self,
        draft: NewProduct,
    ) -> Result<ProductId, CatalogCommandError> {
        let new_product = draft.normalized()?;
        let product = resolve_product(&self.catalog, &new_product).await?;
        let product_id = product.product_id;

        let mut variants = Vec::with_capacity(new_product.variants.len());
        for variant_draft in &new_product.variants {
            let size_id = self.catalog.ensure_size(&variant_draft.size_value).await?;
            variants.push(Variant {
                variant_id: VariantId::new(),
                product_id,
                color_id: new_product.color_id,
                size_id,
                price: variant_draft.price,
                stock: variant_draft.stock,
                active: true,
            });
        }

        self.catalog.insert_product(product).await?;
        self.ledger.insert_variants(variants).await?;

        Ok(product_id)
    }

    /// The public product listing: active variants of active products, joined
    /// with their brand/style/color/size labels. Variants whose references
    /// cannot be resolved are dropped, matching inner-join semantics.
    pub async fn product_listing(&self) -> Result<Vec<VariantListing>, CatalogCommandError> {
        let products: HashMap<_, _> = self
            .catalog
            .list_products()
            .await?
            .into_iter()
            .map(|p| (p.product_id, p))
            .collect();
        let brands: HashMap<_, _> = self
            .catalog
            .list_brands()
            .await?
            .into_iter()
            .map(|b| (b.brand_id, b.name))
            .collect();
        let styles: HashMap<_, _> = self
            .catalog
            .list_styles()
            .await?
            .into_iter()
            .map(|s| (s.style_id, s.name))
            .collect();
        let colors: HashMap<_, _> = self
            .catalog
            .list_colors()
            .await?
            .into_iter()
            .map(|c| (c.color_id, c.name))
            .collect();
        let sizes: HashMap<_, _> = self
            .catalog
            .list_sizes()
            .await?
            .into_iter()
            .map(|s| (s.size_id, s.value))
            .collect();

        let variants = self.ledger.list_variants().await?;

        let listing = variants
            .into_iter()
            .filter(|v| v.active)
            .filter_map(|v| {
                let product = products.get(&v.product_id)?;
                let brand = brands.get(&product.brand_id)?.clone();
                let style = match product.style_id {
                    Some(style_id) => Some(styles.get(&style_id)?.clone()),
                    None => None,
                };
                Some(VariantListing {
                    variant_id: v.variant_id,
                    brand,
                    style,
                    color: colors.get(&v.color_id)?.clone(),
                    size: sizes.get(&v.size_id)?.clone(),
                    price: v.price,
                    stock: v.stock,
                })
            })
            .collect();

        Ok(listing)
    }
}

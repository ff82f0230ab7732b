use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use zambrano_catalog::{Brand, Category, Color, Product, SizeLabel, Style};
use zambrano_core::{BrandId, CategoryId, ColorId, ProductId, SizeId, StyleId};

use super::{CatalogError, CatalogStore};

/// In-memory catalog store. Intended for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryCatalogStore {
    inner: RwLock<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    categories: HashMap<CategoryId, Category>,
    colors: HashMap<ColorId, Color>,
    sizes: HashMap<SizeId, SizeLabel>,
    sizes_by_value: HashMap<String, SizeId>,
    brands: HashMap<BrandId, Brand>,
    brands_by_name: HashMap<String, BrandId>,
    styles: HashMap<StyleId, Style>,
    styles_by_key: HashMap<(BrandId, String), StyleId>,
    products: HashMap<ProductId, Product>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn insert_category(&self, category: Category) -> Result<(), CatalogError> {
        let mut inner = write(&self.inner)?;
        if inner.categories.contains_key(&category.category_id) {
            return Err(CatalogError::Conflict(format!(
                "category {} already exists",
                category.category_id
            )));
        }
        inner.categories.insert(category.category_id, category);
        Ok(())
    }

    async fn list_categories(&self) -> Result<Vec<Category>, CatalogError> {
        let inner = read(&self.inner)?;
        let mut categories: Vec<_> = inner
            .categories
            .values()
            .filter(|c| c.active)
            .cloned()
            .collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn category_exists(&self, category_id: CategoryId) -> Result<bool, CatalogError> {
        let inner = read(&self.inner)?;
        Ok(inner.categories.contains_key(&category_id))
    }

    async fn insert_color(&self, color: Color) -> Result<(), CatalogError> {
        let mut inner = write(&self.inner)?;
        if inner.colors.contains_key(&color.color_id) {
            return Err(CatalogError::Conflict(format!(
                "color {} already exists",
                color.color_id
            )));
        }
        inner.colors.insert(color.color_id, color);
        Ok(())
    }

    async fn list_colors(&self) -> Result<Vec<Color>, CatalogError> {
        let inner = read(&self.inner)?;
        let mut colors: Vec<_> = inner.colors.values().cloned().collect();
        colors.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(colors)
    }

    async fn color_exists(&self, color_id: ColorId) -> Result<bool, CatalogError> {
        let inner = read(&self.inner)?;
        Ok(inner.colors.contains_key(&color_id))
    }

    async fn list_sizes(&self) -> Result<Vec<SizeLabel>, CatalogError> {
        let inner = read(&self.inner)?;
        let mut sizes: Vec<_> = inner.sizes.values().cloned().collect();
        sizes.sort_by(|a, b| a.value.cmp(&b.value));
        Ok(sizes)
    }

    async fn ensure_size(&self, value: &str) -> Result<SizeId, CatalogError> {
        let mut inner = write(&self.inner)?;
        if let Some(size_id) = inner.sizes_by_value.get(value) {
            return Ok(*size_id);
        }
        let size = SizeLabel {
            size_id: SizeId::new(),
            value: value.to_string(),
        };
        let size_id = size.size_id;
        inner.sizes_by_value.insert(value.to_string(), size_id);
        inner.sizes.insert(size_id, size);
        Ok(size_id)
    }

    async fn ensure_brand(&self, name: &str) -> Result<BrandId, CatalogError> {
        let mut inner = write(&self.inner)?;
        if let Some(brand_id) = inner.brands_by_name.get(name) {
            return Ok(*brand_id);
        }
        let brand = Brand {
            brand_id: BrandId::new(),
            name: name.to_string(),
        };
        let brand_id = brand.brand_id;
        inner.brands_by_name.insert(name.to_string(), brand_id);
        inner.brands.insert(brand_id, brand);
        Ok(brand_id)
    }

    async fn ensure_style(&self, brand_id: BrandId, name: &str) -> Result<StyleId, CatalogError> {
        let mut inner = write(&self.inner)?;
        let key = (brand_id, name.to_string());
        if let Some(style_id) = inner.styles_by_key.get(&key) {
            return Ok(*style_id);
        }
        let style = Style {
            style_id: StyleId::new(),
            brand_id,
            name: name.to_string(),
        };
        let style_id = style.style_id;
        inner.styles_by_key.insert(key, style_id);
        inner.styles.insert(style_id, style);
        Ok(style_id)
    }

    async fn insert_product(&self, product: Product) -> Result<(), CatalogError> {
        let mut inner = write(&self.inner)?;
        if inner.products.contains_key(&product.product_id) {
            return Err(CatalogError::Conflict(format!(
                "product {} already exists",
                product.product_id
            )));
        }
        inner.products.insert(product.product_id, product);
        Ok(())
    }

    async fn list_products(&self) -> Result<Vec<Product>, CatalogError> {
        let inner = read(&self.inner)?;
        let mut products: Vec<_> = inner
            .products
            .values()
            .filter(|p| p.active)
            .cloned()
            .collect();
        products.sort_by_key(|p| *p.product_id.as_uuid().as_bytes());
        Ok(products)
    }

    async fn list_brands(&self) -> Result<Vec<Brand>, CatalogError> {
        let inner = read(&self.inner)?;
        let mut brands: Vec<_> = inner.brands.values().cloned().collect();
        brands.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(brands)
    }

    async fn list_styles(&self) -> Result<Vec<Style>, CatalogError> {
        let inner = read(&self.inner)?;
        let mut styles: Vec<_> = inner.styles.values().cloned().collect();
        styles.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(styles)
    }
}

fn read(inner: &RwLock<Inner>) -> Result<std::sync::RwLockReadGuard<'_, Inner>, CatalogError> {
    inner
        .read()
        .map_err(|_| CatalogError::Storage("catalog lock poisoned".to_string()))
}

fn write(inner: &RwLock<Inner>) -> Result<std::sync::RwLockWriteGuard<'_, Inner>, CatalogError> {
    inner
        .write()
        .map_err(|_| CatalogError::Storage("catalog lock poisoned".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog_store::resolve_product;
    use zambrano_catalog::{NewProduct, VariantDraft};

    async fn seeded() -> (InMemoryCatalogStore, CategoryId, ColorId) {
        let store = InMemoryCatalogStore::new();
        let category = Category::new("Uniformes").unwrap();
        let color = Color::new("Azul").unwrap();
        let category_id = category.category_id;
        let color_id = color.color_id;

        store.insert_category(category).await.unwrap();
        store.insert_color(color).await.unwrap();

        (store, category_id, color_id)
    }

    #[tokio::test]
    async fn ensure_brand_is_get_or_create() {
        let (store, _, _) = seeded().await;

        let first = store.ensure_brand("Zambrano").await.unwrap();
        let second = store.ensure_brand("Zambrano").await.unwrap();
        let other = store.ensure_brand("Norte").await.unwrap();

        assert_eq!(first, second);
        assert_ne!(first, other);
        assert_eq!(store.list_brands().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn styles_are_scoped_to_their_brand() {
        let (store, _, _) = seeded().await;

        let brand_a = store.ensure_brand("Zambrano").await.unwrap();
        let brand_b = store.ensure_brand("Norte").await.unwrap();
        let style_a = store.ensure_style(brand_a, "Clasico").await.unwrap();
        let style_b = store.ensure_style(brand_b, "Clasico").await.unwrap();

        assert_ne!(style_a, style_b);
        assert_eq!(store.ensure_style(brand_a, "Clasico").await.unwrap(), style_a);
    }

    #[tokio::test]
    async fn resolve_product_creates_brand_style_and_checks_references() {
        let (store, category_id, color_id) = seeded().await;
        let new_product = NewProduct {
            name: "Camisa Oxford".to_string(),
            brand: "Zambrano".to_string(),
            style: Some("Clasico".to_string()),
            category_id,
            color_id,
            variants: vec![VariantDraft {
                size_value: "M".to_string(),
                price: 4500,
                stock: 10,
            }],
        };

        let product = resolve_product(&store, &new_product).await.unwrap();
        assert_eq!(product.name, "Camisa Oxford");
        assert!(product.style_id.is_some());
        assert!(product.active);
        assert_eq!(store.list_brands().await.unwrap().len(), 1);

        let mut unknown_category = new_product.clone();
        unknown_category.category_id = CategoryId::new();
        let err = resolve_product(&store, &unknown_category).await.unwrap_err();
        assert!(matches!(err, CatalogError::NotFound));
    }

    #[tokio::test]
    async fn category_listing_is_active_only_and_name_ordered() {
        let (store, _, _) = seeded().await;

        let mut inactive = Category::new("Antigua").unwrap();
        inactive.active = false;
        store.insert_category(inactive).await.unwrap();
        store
            .insert_category(Category::new("Calzado").unwrap())
            .await
            .unwrap();

        let names: Vec<_> = store
            .list_categories()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Calzado".to_string(), "Uniformes".to_string()]);
    }

    #[tokio::test]
    async fn ensure_size_reuses_existing_labels() {
        let (store, _, _) = seeded().await;

        let medium = store.ensure_size("M").await.unwrap();
        assert_eq!(store.ensure_size("M").await.unwrap(), medium);
        store.ensure_size("L").await.unwrap();

        let values: Vec<_> = store
            .list_sizes()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.value)
            .collect();
        assert_eq!(values, vec!["L".to_string(), "M".to_string()]);
    }
}

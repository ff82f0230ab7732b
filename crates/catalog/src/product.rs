use serde::{Deserialize, Serialize};

use zambrano_core::{BrandId, CategoryId, ColorId, DomainError, DomainResult, ProductId, StyleId};

/// A catalog product. Sellable state lives on its variants; the product row
/// carries naming and classification only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub product_id: ProductId,
    pub name: String,
    pub brand_id: BrandId,
    pub style_id: Option<StyleId>,
    pub category_id: CategoryId,
    pub active: bool,
}

/// One variant requested at product-creation time. The size is given by its
/// label and resolved get-or-create style; the color is shared product-wide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantDraft {
    pub size_value: String,
    /// Price in minor currency units.
    pub price: i64,
    /// Initial on-hand quantity (seeds the ledger).
    pub stock: i64,
}

/// A validated request to create a product together with its variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub brand: String,
    pub style: Option<String>,
    pub category_id: CategoryId,
    pub color_id: ColorId,
    pub variants: Vec<VariantDraft>,
}

impl NewProduct {
    /// Normalize and validate the draft.
    ///
    /// Names are trimmed; a style that trims to empty collapses to `None`.
    /// A product must name a brand and carry at least one variant, and every
    /// variant needs a size label, a non-negative price and a non-negative
    /// initial stock.
    pub fn normalized(mut self) -> DomainResult<Self> {
        self.name = self.name.trim().to_string();
        if self.name.is_empty() {
            return Err(DomainError::validation("product name is required"));
        }

        self.brand = self.brand.trim().to_string();
        if self.brand.is_empty() {
            return Err(DomainError::validation("brand is required"));
        }

        self.style = self
            .style
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        if self.variants.is_empty() {
            return Err(DomainError::validation("at least one variant is required"));
        }

        for draft in &mut self.variants {
            draft.size_value = draft.size_value.trim().to_string();
            if draft.size_value.is_empty() {
                return Err(DomainError::validation("variant size is required"));
            }
            if draft.price < 0 {
                return Err(DomainError::validation("variant price cannot be negative"));
            }
            if draft.stock < 0 {
                return Err(DomainError::validation(
                    "variant initial stock cannot be negative",
                ));
            }
        }

        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> NewProduct {
        NewProduct {
            name: "Camisa Oxford".to_string(),
            brand: "Zambrano".to_string(),
            style: Some("Clasico".to_string()),
            category_id: CategoryId::new(),
            color_id: ColorId::new(),
            variants: vec![VariantDraft {
                size_value: "M".to_string(),
                price: 4500,
                stock: 20,
            }],
        }
    }

    #[test]
    fn valid_draft_passes_and_is_trimmed() {
        let mut new_product = draft();
        new_product.name = "  Camisa Oxford ".to_string();
        new_product.variants[0].size_value = " M ".to_string();

        let normalized = new_product.normalized().unwrap();
        assert_eq!(normalized.name, "Camisa Oxford");
        assert_eq!(normalized.variants[0].size_value, "M");
    }

    #[test]
    fn blank_style_collapses_to_none() {
        let mut new_product = draft();
        new_product.style = Some("   ".to_string());
        let normalized = new_product.normalized().unwrap();
        assert_eq!(normalized.style, None);
    }

    #[test]
    fn missing_name_is_rejected() {
        let mut new_product = draft();
        new_product.name = "  ".to_string();
        assert!(matches!(
            new_product.normalized(),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn missing_brand_is_rejected() {
        let mut new_product = draft();
        new_product.brand = String::new();
        assert!(matches!(
            new_product.normalized(),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn empty_variant_list_is_rejected() {
        let mut new_product = draft();
        new_product.variants.clear();
        assert!(matches!(
            new_product.normalized(),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn negative_price_and_stock_are_rejected() {
        let mut new_product = draft();
        new_product.variants[0].price = -1;
        assert!(new_product.clone().normalized().is_err());

        new_product.variants[0].price = 4500;
        new_product.variants[0].stock = -5;
        assert!(new_product.normalized().is_err());
    }
}

//! Lookup tables the catalog hangs off: categories, colors, sizes, brands,
//! styles. Brands, styles and sizes are resolved get-or-create style during
//! product creation; categories and colors are maintained through their own
//! endpoints.

use serde::{Deserialize, Serialize};

use zambrano_core::{BrandId, CategoryId, ColorId, DomainError, DomainResult, SizeId, StyleId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub category_id: CategoryId,
    pub name: String,
    pub active: bool,
}

impl Category {
    pub fn new(name: impl Into<String>) -> DomainResult<Self> {
        Ok(Self {
            category_id: CategoryId::new(),
            name: required_name(name, "category name")?,
            active: true,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub color_id: ColorId,
    pub name: String,
}

impl Color {
    pub fn new(name: impl Into<String>) -> DomainResult<Self> {
        Ok(Self {
            color_id: ColorId::new(),
            name: required_name(name, "color name")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeLabel {
    pub size_id: SizeId,
    pub value: String,
}

impl SizeLabel {
    pub fn new(value: impl Into<String>) -> DomainResult<Self> {
        Ok(Self {
            size_id: SizeId::new(),
            value: required_name(value, "size value")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brand {
    pub brand_id: BrandId,
    pub name: String,
}

impl Brand {
    pub fn new(name: impl Into<String>) -> DomainResult<Self> {
        Ok(Self {
            brand_id: BrandId::new(),
            name: required_name(name, "brand name")?,
        })
    }
}

/// A style belongs to exactly one brand; the same style name under another
/// brand is a different style.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Style {
    pub style_id: StyleId,
    pub brand_id: BrandId,
    pub name: String,
}

impl Style {
    pub fn new(brand_id: BrandId, name: impl Into<String>) -> DomainResult<Self> {
        Ok(Self {
            style_id: StyleId::new(),
            brand_id,
            name: required_name(name, "style name")?,
        })
    }
}

fn required_name(value: impl Into<String>, what: &str) -> DomainResult<String> {
    let value = value.into().trim().to_string();
    if value.is_empty() {
        return Err(DomainError::validation(format!("{what} is required")));
    }
    Ok(value)
}

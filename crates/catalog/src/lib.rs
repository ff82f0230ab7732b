//! Catalog domain module.
//!
//! Business rules for products and their lookup tables (categories, colors,
//! sizes, brands, styles), implemented purely as deterministic domain logic
//! (no IO, no HTTP, no storage).

pub mod lookup;
pub mod product;

pub use lookup::{Brand, Category, Color, SizeLabel, Style};
pub use product::{NewProduct, Product, VariantDraft};

use serde::Deserialize;

use zambrano_inventory::Movement;

use crate::app::services::VariantListing;

// -------------------------
// Request DTOs
//
// Field names keep the public wire vocabulary the frontend has always spoken
// (`id_variante`, `cantidad`, ...). Fields are optional so a missing one maps
// to a 400 with a named field instead of a generic body rejection; prices are
// minor currency units.
// -------------------------

#[derive(Debug, Deserialize)]
pub struct ActualizarStockRequest {
    pub id_variante: Option<String>,
    pub cantidad: Option<i64>,
    pub precio_venta: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct EntradaStockRequest {
    pub id_variante: Option<String>,
    pub cantidad: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct AddProductoRequest {
    pub id_categoria: Option<String>,
    pub nombre: Option<String>,
    pub marca: Option<String>,
    pub estilo: Option<String>,
    pub id_color: Option<String>,
    pub variantes: Option<Vec<VarianteRequest>>,
}

#[derive(Debug, Deserialize)]
pub struct VarianteRequest {
    pub talla: String,
    pub precio: i64,
    pub stock: i64,
}

#[derive(Debug, Deserialize)]
pub struct NombreRequest {
    pub nombre: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteProductosRequest {
    pub ids: Option<Vec<String>>,
}

// -------------------------
// JSON mapping helpers
// -------------------------

pub fn listing_to_json(row: VariantListing) -> serde_json::Value {
    serde_json::json!({
        "id_variante": row.variant_id.to_string(),
        "marca": row.brand,
        "estilo": row.style,
        "color": row.color,
        "talla": row.size,
        "precio": row.price,
        "stock": row.stock,
    })
}

pub fn movement_to_json(movement: &Movement) -> serde_json::Value {
    serde_json::json!({
        "id_movimiento": movement.movement_id.to_string(),
        "id_variante": movement.variant_id.to_string(),
        "tipo": movement.kind.as_str(),
        "cantidad": movement.quantity,
        "stock_anterior": movement.stock_before,
        "stock_nuevo": movement.stock_after,
        "precio_unitario": movement.unit_price,
        "monto_total": movement.total_amount,
        "registrado_en": movement.occurred_at.to_rfc3339(),
    })
}

pub fn categoria_to_json(category: zambrano_catalog::Category) -> serde_json::Value {
    serde_json::json!({
        "id_categoria": category.category_id.to_string(),
        "nombre": category.name,
    })
}

pub fn color_to_json(color: zambrano_catalog::Color) -> serde_json::Value {
    serde_json::json!({
        "id_color": color.color_id.to_string(),
        "nombre": color.name,
    })
}

pub fn talla_to_json(size: zambrano_catalog::SizeLabel) -> serde_json::Value {
    serde_json::json!({
        "id_talla": size.size_id.to_string(),
        "valor": size.value,
    })
}

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use zambrano_catalog::{NewProduct, VariantDraft};
use zambrano_core::{CategoryId, ColorId, VariantId};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/GetProductos", get(get_productos))
        .route("/AddProducto", post(add_producto))
        .route("/DeleteProductos", post(delete_productos))
}

/// Active variants of active products, joined with their catalog labels.
pub async fn get_productos(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.product_listing().await {
        Ok(listing) => (
            StatusCode::OK,
            Json(
                listing
                    .into_iter()
                    .map(dto::listing_to_json)
                    .collect::<Vec<_>>(),
            ),
        )
            .into_response(),
        Err(e) => errors::catalog_command_error_to_response(e),
    }
}

/// Create a product with its variants. Brand, style and sizes are resolved
/// get-or-create style; the category and color must already exist.
pub async fn add_producto(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::AddProductoRequest>,
) -> axum::response::Response {
    let Some(raw_category) = body.id_categoria else {
        return errors::json_error(StatusCode::BAD_REQUEST, "id_categoria is required");
    };
    let Some(nombre) = body.nombre else {
        return errors::json_error(StatusCode::BAD_REQUEST, "nombre is required");
    };
    let Some(marca) = body.marca else {
        return errors::json_error(StatusCode::BAD_REQUEST, "marca is required");
    };
    let Some(raw_color) = body.id_color else {
        return errors::json_error(StatusCode::BAD_REQUEST, "id_color is required");
    };
    let Some(variantes) = body.variantes else {
        return errors::json_error(StatusCode::BAD_REQUEST, "variantes is required");
    };

    let category_id: CategoryId = match raw_category.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid id_categoria"),
    };
    let color_id: ColorId = match raw_color.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid id_color"),
    };

    let draft = NewProduct {
        name: nombre,
        brand: marca,
        style: body.estilo,
        category_id,
        color_id,
        variants: variantes
            .into_iter()
            .map(|v| VariantDraft {
                size_value: v.talla,
                price: v.precio,
                stock: v.stock,
            })
            .collect(),
    };

    match services.create_product(draft).await {
        Ok(product_id) => (
            StatusCode::CREATED,
            Json(serde_json::json!({
                "ok": true,
                "id_producto": product_id.to_string(),
            })),
        )
            .into_response(),
        Err(e) => errors::catalog_command_error_to_response(e),
    }
}

/// Soft-deactivate variants; their rows and movement history are retained.
pub async fn delete_productos(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::DeleteProductosRequest>,
) -> axum::response::Response {
    let ids = match body.ids {
        Some(ids) if !ids.is_empty() => ids,
        _ => return errors::json_error(StatusCode::BAD_REQUEST, "ids must be a non-empty list"),
    };

    let mut variant_ids = Vec::with_capacity(ids.len());
    for raw in ids {
        match raw.parse::<VariantId>() {
            Ok(id) => variant_ids.push(id),
            Err(_) => {
                return errors::json_error(
                    StatusCode::BAD_REQUEST,
                    format!("invalid id_variante '{raw}'"),
                )
            }
        }
    }

    match services.ledger().deactivate_variants(&variant_ids).await {
        Ok(count) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "ok": true,
                "eliminados": count,
            })),
        )
            .into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

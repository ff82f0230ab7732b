use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use zambrano_core::VariantId;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/ActualizarStock", post(actualizar_stock))
        .route("/EntradaStock", post(entrada_stock))
        .route("/MovimientosInventario/:id", get(movimientos_inventario))
}

/// Sale: decrement a variant's stock and record the `OUT` movement.
pub async fn actualizar_stock(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::ActualizarStockRequest>,
) -> axum::response::Response {
    let Some(raw_id) = body.id_variante else {
        return errors::json_error(StatusCode::BAD_REQUEST, "id_variante is required");
    };
    let Some(cantidad) = body.cantidad else {
        return errors::json_error(StatusCode::BAD_REQUEST, "cantidad is required");
    };
    let Some(precio_venta) = body.precio_venta else {
        return errors::json_error(StatusCode::BAD_REQUEST, "precio_venta is required");
    };

    let variant_id: VariantId = match raw_id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid id_variante"),
    };

    match services.stock().sell(variant_id, cantidad, precio_venta).await {
        Ok(movement) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "ok": true,
                "id_movimiento": movement.movement_id.to_string(),
                "stock": movement.stock_after,
            })),
        )
            .into_response(),
        Err(e) => errors::mutation_error_to_response(e),
    }
}

/// Receipt: increment a variant's stock and record the `IN` movement.
pub async fn entrada_stock(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::EntradaStockRequest>,
) -> axum::response::Response {
    let Some(raw_id) = body.id_variante else {
        return errors::json_error(StatusCode::BAD_REQUEST, "id_variante is required");
    };
    let Some(cantidad) = body.cantidad else {
        return errors::json_error(StatusCode::BAD_REQUEST, "cantidad is required");
    };

    let variant_id: VariantId = match raw_id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid id_variante"),
    };

    match services.stock().receive(variant_id, cantidad).await {
        Ok(movement) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "ok": true,
                "id_movimiento": movement.movement_id.to_string(),
                "stock": movement.stock_after,
            })),
        )
            .into_response(),
        Err(e) => errors::mutation_error_to_response(e),
    }
}

/// Audit trail for one variant, oldest movement first.
pub async fn movimientos_inventario(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let variant_id: VariantId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid id_variante"),
    };

    // Distinguish "unknown variant" from "no movements yet".
    match services.ledger().fetch_variant(variant_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return errors::json_error(StatusCode::NOT_FOUND, "variant not found"),
        Err(e) => return errors::ledger_error_to_response(e),
    }

    match services.ledger().movements(variant_id).await {
        Ok(movements) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "ok": true,
                "movimientos": movements.iter().map(dto::movement_to_json).collect::<Vec<_>>(),
            })),
        )
            .into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use zambrano_catalog::{Category, Color};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/GetCategorias", get(get_categorias))
        .route("/AddCategoria", post(add_categoria))
        .route("/GetColores", get(get_colores))
        .route("/AddColor", post(add_color))
        .route("/GetTallas", get(get_tallas))
}

pub async fn get_categorias(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.catalog().list_categories().await {
        Ok(categories) => (
            StatusCode::OK,
            Json(
                categories
                    .into_iter()
                    .map(dto::categoria_to_json)
                    .collect::<Vec<_>>(),
            ),
        )
            .into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn add_categoria(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::NombreRequest>,
) -> axum::response::Response {
    let Some(nombre) = body.nombre else {
        return errors::json_error(StatusCode::BAD_REQUEST, "nombre is required");
    };

    let category = match Category::new(nombre) {
        Ok(c) => c,
        Err(e) => return errors::domain_error_to_response(e),
    };
    let category_id = category.category_id;

    match services.catalog().insert_category(category).await {
        Ok(()) => (
            StatusCode::CREATED,
            Json(serde_json::json!({
                "ok": true,
                "id_categoria": category_id.to_string(),
            })),
        )
            .into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn get_colores(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.catalog().list_colors().await {
        Ok(colors) => (
            StatusCode::OK,
            Json(
                colors
                    .into_iter()
                    .map(dto::color_to_json)
                    .collect::<Vec<_>>(),
            ),
        )
            .into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn add_color(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::NombreRequest>,
) -> axum::response::Response {
    let Some(nombre) = body.nombre else {
        return errors::json_error(StatusCode::BAD_REQUEST, "nombre is required");
    };

    let color = match Color::new(nombre) {
        Ok(c) => c,
        Err(e) => return errors::domain_error_to_response(e),
    };
    let color_id = color.color_id;

    match services.catalog().insert_color(color).await {
        Ok(()) => (
            StatusCode::CREATED,
            Json(serde_json::json!({
                "ok": true,
                "id_color": color_id.to_string(),
            })),
        )
            .into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn get_tallas(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.catalog().list_sizes().await {
        Ok(sizes) => (
            StatusCode::OK,
            Json(
                sizes
                    .into_iter()
                    .map(dto::talla_to_json)
                    .collect::<Vec<_>>(),
            ),
        )
            .into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

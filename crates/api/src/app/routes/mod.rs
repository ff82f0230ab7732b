use axum::Router;

pub mod catalog;
pub mod products;
pub mod stock;
pub mod system;

/// Router for all business endpoints. The public route names are the ones the
/// existing frontend calls; they stay flat at the root.
pub fn router() -> Router {
    Router::new()
        .merge(stock::router())
        .merge(products::router())
        .merge(catalog::router())
}

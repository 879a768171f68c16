pub mod cart;
pub mod orders;

use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse};
use utoipa::OpenApi;

use crate::errors::{AppError, MessageResponse};

#[derive(OpenApi)]
#[openapi(
    paths(
        cart::update_cart,
        cart::remove_from_cart,
        orders::read_current_order,
        orders::create_order,
        orders::arrange_order,
        orders::get_order,
        health,
    ),
    components(schemas(
        cart::CartUpdateRequest,
        orders::ArrangeOrderRequest,
        orders::OrderEnvelope,
        orders::OrderResponse,
        orders::OrderItemResponse,
        orders::ProductResponse,
        orders::CategoryResponse,
        orders::CompanyResponse,
        MessageResponse,
    )),
    tags(
        (name = "cart", description = "Line items of the caller's open order"),
        (name = "orders", description = "Open and arranged orders"),
    )
)]
pub struct ApiDoc;

/// Registers every route of the service.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .route("/health", web::get().to(health))
        .service(
            web::scope("/api")
                .route("/cart", web::post().to(cart::update_cart))
                .route("/cart", web::delete().to(cart::remove_from_cart))
                .route("/order", web::get().to(orders::read_current_order))
                .route("/order", web::post().to(orders::create_order))
                .route("/order", web::put().to(orders::arrange_order))
                .route("/order/{id}", web::get().to(orders::get_order)),
        );
}

/// GET /health
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = MessageResponse)),
    tag = "orders"
)]
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(MessageResponse::new(StatusCode::OK, "ok"))
}

/// Parses an identifier that must be a positive integer. An absent or empty
/// value yields 0, which no stored row carries.
pub(crate) fn parse_id(
    raw: Option<&str>,
    parse_error: &str,
    not_positive: &str,
) -> Result<u64, AppError> {
    match raw {
        None | Some("") => Ok(0),
        Some(raw) => match raw.parse::<u64>() {
            Ok(0) => Err(AppError::BadRequest(not_positive.to_string())),
            Ok(id) => Ok(id),
            Err(_) => Err(AppError::BadRequest(parse_error.to_string())),
        },
    }
}

/// JSON extractor settings for every route: bodies that fail to decode are
/// answered with the binding error envelope.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .content_type_required(false)
        .error_handler(|err, _req| {
            log::debug!("rejected request body: {}", err);
            AppError::InvalidBody.into()
        })
}

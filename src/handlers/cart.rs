use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::application::CartService;
use crate::auth::{authorize, Authenticator, ROLE_USER};
use crate::domain::order::CartChange;
use crate::errors::{AppError, MessageResponse};

use super::orders::OrderEnvelope;
use super::parse_id;

/// Identifies one line of a cart.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CartTargetParams {
    #[serde(rename = "orderID")]
    #[param(value_type = Option<u64>)]
    pub order_id: Option<String>,
    #[serde(rename = "productID")]
    #[param(value_type = Option<u64>)]
    pub product_id: Option<String>,
}

impl CartTargetParams {
    fn ids(&self) -> Result<(u64, u64), AppError> {
        let product_id = parse_id(
            self.product_id.as_deref(),
            "error parsing productID query parameter",
            "product id value must be positive",
        )?;
        let order_id = parse_id(
            self.order_id.as_deref(),
            "error parsing orderID query parameter",
            "order id value must be positive",
        )?;
        Ok((order_id, product_id))
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CartUpdateRequest {
    /// Signed delta added to the line; a new line starts at this value.
    /// Missing means 0.
    #[serde(default)]
    pub quantity: i32,
}

/// POST /api/cart?orderID=&productID=
///
/// Adds `quantity` to a line of the caller's cart and returns the whole cart.
#[utoipa::path(
    post,
    path = "/api/cart",
    params(CartTargetParams),
    request_body = CartUpdateRequest,
    responses(
        (status = 200, description = "Cart after the change", body = OrderEnvelope),
        (status = 400, description = "Foreign cart, malformed id or non-positive result", body = MessageResponse),
        (status = 401, description = "Missing or invalid token", body = MessageResponse),
        (status = 500, description = "Internal server error", body = MessageResponse),
    ),
    tag = "cart"
)]
pub async fn update_cart(
    req: HttpRequest,
    auth: web::Data<dyn Authenticator>,
    service: web::Data<CartService>,
    query: web::Query<CartTargetParams>,
    body: web::Json<CartUpdateRequest>,
) -> Result<HttpResponse, AppError> {
    let user = authorize(auth.get_ref(), &req, &[ROLE_USER])?;
    let (order_id, product_id) = query.ids()?;
    let request = body.into_inner();

    let change = CartChange {
        order_id,
        product_id,
        quantity: request.quantity,
    };
    let order = web::block(move || service.update_cart(user.id, change))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(OrderEnvelope::ok(order))
}

/// DELETE /api/cart?orderID=&productID=
///
/// Removes a line from the caller's cart and returns the whole cart.
#[utoipa::path(
    delete,
    path = "/api/cart",
    params(CartTargetParams),
    responses(
        (status = 200, description = "Cart after the removal", body = OrderEnvelope),
        (status = 400, description = "Foreign cart or malformed id", body = MessageResponse),
        (status = 404, description = "No such line", body = MessageResponse),
    ),
    tag = "cart"
)]
pub async fn remove_from_cart(
    req: HttpRequest,
    auth: web::Data<dyn Authenticator>,
    service: web::Data<CartService>,
    query: web::Query<CartTargetParams>,
) -> Result<HttpResponse, AppError> {
    let user = authorize(auth.get_ref(), &req, &[ROLE_USER])?;
    let (order_id, product_id) = query.ids()?;

    let order = web::block(move || service.remove_from_cart(user.id, order_id, product_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(OrderEnvelope::ok(order))
}

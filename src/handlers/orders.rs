use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::application::OrderService;
use crate::auth::{authorize, Authenticator, ROLE_ADMIN, ROLE_USER};
use crate::domain::order::{Category, Company, Fetch, Order, OrderLine, Product};
use crate::errors::{AppError, MessageResponse};

use super::parse_id;

// ── Response DTOs ────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryResponse {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CompanyResponse {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductResponse {
    pub id: u64,
    pub name: String,
    pub description: String,
    pub price: u64,
    pub stock: u64,
    pub image: String,
    pub category: CategoryResponse,
    pub company: CompanyResponse,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderItemResponse {
    pub order_id: u64,
    pub product: ProductResponse,
    pub quantity: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub id: u64,
    pub total: u64,
    pub status: String,
    pub is_arranged: bool,
    pub user_id: u64,
    pub count: u64,
    /// `null` for lazy reads.
    pub order_items: Option<Vec<OrderItemResponse>>,
}

/// `{code, order}` envelope returned by every endpoint that yields an order.
#[derive(Debug, Serialize, ToSchema)]
pub struct OrderEnvelope {
    pub code: u16,
    pub order: OrderResponse,
}

impl OrderEnvelope {
    pub fn ok(order: Order) -> HttpResponse {
        HttpResponse::Ok().json(Self {
            code: StatusCode::OK.as_u16(),
            order: order.into(),
        })
    }
}

impl From<Category> for CategoryResponse {
    fn from(c: Category) -> Self {
        Self {
            id: c.id,
            name: c.name,
        }
    }
}

impl From<Company> for CompanyResponse {
    fn from(c: Company) -> Self {
        Self {
            id: c.id,
            name: c.name,
        }
    }
}

impl From<Product> for ProductResponse {
    fn from(p: Product) -> Self {
        Self {
            id: p.id,
            name: p.name,
            description: p.description,
            price: p.price,
            stock: p.stock,
            image: p.image,
            category: p.category.into(),
            company: p.company.into(),
        }
    }
}

impl From<OrderLine> for OrderItemResponse {
    fn from(line: OrderLine) -> Self {
        Self {
            order_id: line.order_id,
            product: line.product.into(),
            quantity: line.quantity,
        }
    }
}

impl From<Order> for OrderResponse {
    fn from(o: Order) -> Self {
        Self {
            id: o.id,
            total: o.total,
            status: o.status,
            is_arranged: o.is_arranged,
            user_id: o.user_id,
            count: o.count,
            order_items: o
                .items
                .map(|items| items.into_iter().map(OrderItemResponse::from).collect()),
        }
    }
}

// ── Request DTOs ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FetchParams {
    /// `eager` includes line items; anything else returns only the item count.
    pub fetch: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ArrangeOrderRequest {
    /// Workflow label the order moves to, e.g. "Awaiting payment".
    #[serde(default)]
    pub status: String,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /api/order
///
/// Returns the caller's open order.
#[utoipa::path(
    get,
    path = "/api/order",
    params(FetchParams),
    responses(
        (status = 200, description = "Open order", body = OrderEnvelope),
        (status = 401, description = "Missing or invalid token", body = MessageResponse),
        (status = 404, description = "No open order", body = MessageResponse),
    ),
    tag = "orders"
)]
pub async fn read_current_order(
    req: HttpRequest,
    auth: web::Data<dyn Authenticator>,
    service: web::Data<OrderService>,
    query: web::Query<FetchParams>,
) -> Result<HttpResponse, AppError> {
    let user = authorize(auth.get_ref(), &req, &[ROLE_USER])?;
    let fetch = Fetch::from_param(query.fetch.as_deref());

    let order = web::block(move || service.read_current(user.id, fetch))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(OrderEnvelope::ok(order))
}

/// POST /api/order
///
/// Opens a cart for the caller. An already open cart is returned as is.
#[utoipa::path(
    post,
    path = "/api/order",
    responses(
        (status = 200, description = "Open order", body = OrderEnvelope),
        (status = 401, description = "Missing or invalid token", body = MessageResponse),
        (status = 500, description = "Internal server error", body = MessageResponse),
    ),
    tag = "orders"
)]
pub async fn create_order(
    req: HttpRequest,
    auth: web::Data<dyn Authenticator>,
    service: web::Data<OrderService>,
) -> Result<HttpResponse, AppError> {
    let user = authorize(auth.get_ref(), &req, &[ROLE_USER])?;

    let order = web::block(move || service.create(user.id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(OrderEnvelope::ok(order))
}

/// PUT /api/order
///
/// Arranges the caller's open order under the given status and opens a new
/// empty cart for them.
#[utoipa::path(
    put,
    path = "/api/order",
    request_body = ArrangeOrderRequest,
    responses(
        (status = 200, description = "Arranged order", body = OrderEnvelope),
        (status = 400, description = "Empty order or missing status", body = MessageResponse),
        (status = 404, description = "No open order", body = MessageResponse),
    ),
    tag = "orders"
)]
pub async fn arrange_order(
    req: HttpRequest,
    auth: web::Data<dyn Authenticator>,
    service: web::Data<OrderService>,
    body: web::Json<ArrangeOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let user = authorize(auth.get_ref(), &req, &[ROLE_USER, ROLE_ADMIN])?;
    let request = body.into_inner();

    let order = web::block(move || service.arrange(user.id, &request.status))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(OrderEnvelope::ok(order))
}

/// GET /api/order/{id}
///
/// Returns any order with its items. Users only see their own orders.
#[utoipa::path(
    get,
    path = "/api/order/{id}",
    params(
        ("id" = u64, Path, description = "Order id"),
    ),
    responses(
        (status = 200, description = "Order found", body = OrderEnvelope),
        (status = 400, description = "Malformed id or foreign order", body = MessageResponse),
        (status = 404, description = "Order not found", body = MessageResponse),
    ),
    tag = "orders"
)]
pub async fn get_order(
    req: HttpRequest,
    auth: web::Data<dyn Authenticator>,
    service: web::Data<OrderService>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let user = authorize(auth.get_ref(), &req, &[ROLE_USER, ROLE_ADMIN])?;
    let order_id = parse_id(
        Some(path.as_str()),
        "error parsing id path parameter",
        "id value must be positive",
    )?;
    let viewer = (user.role == ROLE_USER).then_some(user.id);

    let order = web::block(move || service.read_by_id(order_id, viewer))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(OrderEnvelope::ok(order))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::cookie::Cookie;
    use actix_web::{test, web, App};
    use serde_json::{json, Value};

    use crate::application::{CartService, OrderService};
    use crate::auth::{Authenticator, JwtAuthenticator, UserData, ROLE_ADMIN, ROLE_USER, TOKEN_COOKIE};
    use crate::domain::order::CartChange;
    use crate::handlers::routes;
    use crate::testing::InMemoryCartStore;

    fn token(auth: &JwtAuthenticator, id: u64, role: &str) -> Cookie<'static> {
        let user = UserData {
            id,
            email: format!("user{id}@example.com"),
            role: role.to_string(),
        };
        Cookie::new(TOKEN_COOKIE, auth.issue(&user).expect("issue"))
    }

    #[actix_web::test]
    async fn order_lifecycle_over_http() {
        let store = Arc::new(InMemoryCartStore::with_products(&[5]));
        let jwt = Arc::new(JwtAuthenticator::new(b"test-secret", 1));
        let authenticator: Arc<dyn Authenticator> = jwt.clone();
        let cart = CartService::new(store.clone());
        let app = test::init_service(
            App::new()
                .app_data(web::Data::from(authenticator))
                .app_data(web::Data::new(OrderService::new(store.clone())))
                .configure(routes),
        )
        .await;
        let user = token(&jwt, 4, ROLE_USER);

        // No cart yet.
        let req = test::TestRequest::get()
            .uri("/api/order")
            .cookie(user.clone())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 404);

        // Open one.
        let req = test::TestRequest::post()
            .uri("/api/order")
            .cookie(user.clone())
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["code"], 200);
        assert_eq!(body["order"]["status"], "Created");
        assert_eq!(body["order"]["is_arranged"], false);
        assert_eq!(body["order"]["order_items"], Value::Null);
        let order_id = body["order"]["id"].as_u64().expect("id");

        // A status is required.
        let req = test::TestRequest::put()
            .uri("/api/order")
            .cookie(user.clone())
            .set_json(json!({}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["code"], 400);
        assert_eq!(body["message"], "wrong values format provided");

        // Arranging an empty cart is refused.
        let req = test::TestRequest::put()
            .uri("/api/order")
            .cookie(user.clone())
            .set_json(json!({"status": "Awaiting payment"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);

        cart.update_cart(
            4,
            CartChange {
                order_id,
                product_id: 5,
                quantity: 2,
            },
        )
        .expect("add");

        let req = test::TestRequest::get()
            .uri("/api/order?fetch=eager")
            .cookie(user.clone())
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["order"]["count"], 1);
        assert_eq!(body["order"]["order_items"][0]["quantity"], 2);
        assert_eq!(body["order"]["order_items"][0]["product"]["id"], 5);

        let req = test::TestRequest::put()
            .uri("/api/order")
            .cookie(user.clone())
            .set_json(json!({"status": "Awaiting payment"}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["order"]["id"], order_id);
        assert_eq!(body["order"]["is_arranged"], true);
        assert_eq!(body["order"]["status"], "Awaiting payment");

        // A fresh cart is waiting.
        let req = test::TestRequest::get()
            .uri("/api/order")
            .cookie(user.clone())
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_ne!(body["order"]["id"], order_id);
        assert_eq!(body["order"]["count"], 0);

        // The arranged order stays readable by id.
        let req = test::TestRequest::get()
            .uri(&format!("/api/order/{order_id}"))
            .cookie(user)
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["order"]["is_arranged"], true);
        assert_eq!(body["order"]["order_items"][0]["quantity"], 2);
    }

    #[actix_web::test]
    async fn read_by_id_enforces_ownership_for_users_only() {
        let store = Arc::new(InMemoryCartStore::default());
        let order_id = store.open_order(1);
        let jwt = Arc::new(JwtAuthenticator::new(b"test-secret", 1));
        let authenticator: Arc<dyn Authenticator> = jwt.clone();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::from(authenticator))
                .app_data(web::Data::new(OrderService::new(store)))
                .configure(routes),
        )
        .await;

        let req = test::TestRequest::get()
            .uri(&format!("/api/order/{order_id}"))
            .cookie(token(&jwt, 2, ROLE_USER))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["code"], 400);
        assert_eq!(body["message"], "user can't get other user's order");

        let req = test::TestRequest::get()
            .uri(&format!("/api/order/{order_id}"))
            .cookie(token(&jwt, 99, ROLE_ADMIN))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);

        let req = test::TestRequest::get()
            .uri("/api/order/abc")
            .cookie(token(&jwt, 99, ROLE_ADMIN))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["message"], "error parsing id path parameter");

        let req = test::TestRequest::get()
            .uri("/api/order/0")
            .cookie(token(&jwt, 99, ROLE_ADMIN))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["message"], "id value must be positive");
    }

    #[actix_web::test]
    async fn admin_cannot_open_cart() {
        let store = Arc::new(InMemoryCartStore::default());
        let jwt = Arc::new(JwtAuthenticator::new(b"test-secret", 1));
        let authenticator: Arc<dyn Authenticator> = jwt.clone();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::from(authenticator))
                .app_data(web::Data::new(OrderService::new(store)))
                .configure(routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/order")
            .cookie(token(&jwt, 99, ROLE_ADMIN))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), 403);
    }
}

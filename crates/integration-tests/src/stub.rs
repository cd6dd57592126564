//! In-process stand-in for the SalesDesk backend.
//!
//! Implements just enough of the REST API to drive the client end to end:
//! bearer tokens, role checks, pagination metadata and the server's error
//! body shapes. Products are stored with capitalized field names and
//! everything else with snake_case names, so both wire conventions are
//! exercised.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::extract::{Path, Query, Request, State};
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderMap, HeaderName, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::{Map, Value, json};

/// Password every seeded account uses.
pub const PASSWORD: &str = "pa55word";

const TIMESTAMP: &str = "2024-01-15T09:30:00Z";
const DEFAULT_PAGE_SIZE: usize = 20;

type Params = HashMap<String, String>;

/// Shared handle to the stub's data.
pub type Stub = Arc<Mutex<StubData>>;

pub(crate) fn lock(stub: &Stub) -> MutexGuard<'_, StubData> {
    stub.lock().unwrap_or_else(PoisonError::into_inner)
}

/// One request as the stub received it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggedRequest {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
}

/// Everything the stub knows.
#[derive(Debug, Default)]
pub struct StubData {
    pub users: Vec<Value>,
    pub passwords: HashMap<String, String>,
    pub tokens: HashMap<String, i64>,
    pub products: Vec<Value>,
    pub sales: Vec<Value>,
    pub log: Vec<LoggedRequest>,
    /// Number of successful token revocations.
    pub revocations: usize,
    /// When set, the profile endpoint answers with this status and body.
    pub profile_override: Option<(u16, Value)>,
    /// When set, the product list answers with this status and raw body.
    pub products_override: Option<(u16, String)>,
    next_token: u64,
}

impl StubData {
    /// Three accounts (admin, cashier, unactivated guest) and `product_count`
    /// products.
    #[must_use]
    pub fn seeded(product_count: usize) -> Self {
        let mut data = Self::default();
        data.add_user("admin@shop.example", "Grace", "Hopper", "admin", true);
        data.add_user("cashier@shop.example", "Ada", "Lovelace", "cashier", true);
        data.add_user("new@shop.example", "Alan", "Turing", "guest", false);
        for n in 1..=product_count {
            data.products.push(json!({
                "ID": n,
                "Name": format!("Product {n}"),
                "Description": null,
                "Price": 1.5 * f64::from(u32::try_from(n).unwrap_or(u32::MAX)),
                "Stock": 10,
                "CreatedAt": TIMESTAMP,
            }));
        }
        data
    }

    /// Add a user and return its id.
    pub fn add_user(&mut self, email: &str, first: &str, last: &str, role: &str, active: bool) -> i64 {
        let id = next_id(&self.users, "id");
        self.users.push(json!({
            "id": id,
            "first_name": first,
            "last_name": last,
            "email": email,
            "role": role,
            "is_active": active,
            "created_at": TIMESTAMP,
        }));
        self.passwords.insert(email.to_owned(), PASSWORD.to_owned());
        id
    }

    fn user_mut(&mut self, id: i64) -> Option<&mut Value> {
        self.users.iter_mut().find(|u| u["id"] == id)
    }

    fn product_index(&self, id: i64) -> Option<usize> {
        self.products.iter().position(|p| p["ID"] == id)
    }

    fn sale_index(&self, id: i64) -> Option<usize> {
        self.sales.iter().position(|s| s["id"] == id)
    }
}

fn next_id(records: &[Value], key: &str) -> i64 {
    records
        .iter()
        .filter_map(|r| r[key].as_i64())
        .max()
        .unwrap_or(0)
        + 1
}

// =============================================================================
// Responses
// =============================================================================

fn reply(status: StatusCode, body: Value) -> Response {
    (status, Json(body)).into_response()
}

fn error(status: StatusCode, message: impl Into<Value>) -> Response {
    reply(status, json!({ "error": message.into() }))
}

fn not_found() -> Response {
    error(StatusCode::NOT_FOUND, "the requested resource could not be found")
}

fn forbidden() -> Response {
    error(
        StatusCode::FORBIDDEN,
        "your user account doesn't have the necessary permissions to access this resource",
    )
}

fn field_error(field: &str, message: &str) -> Response {
    let mut fields = Map::new();
    fields.insert(field.to_owned(), Value::from(message));
    error(StatusCode::UNPROCESSABLE_ENTITY, Value::Object(fields))
}

// =============================================================================
// Auth
// =============================================================================

#[derive(Clone, Copy, PartialEq, Eq)]
enum Access {
    Any,
    CashierOrAbove,
    AdminOnly,
}

fn authenticate(data: &StubData, headers: &HeaderMap, access: Access) -> Result<Value, Response> {
    let user_id = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .and_then(|token| data.tokens.get(token))
        .ok_or_else(|| {
            error(
                StatusCode::UNAUTHORIZED,
                "invalid or missing authentication token",
            )
        })?;

    let user = data
        .users
        .iter()
        .find(|u| u["id"] == *user_id)
        .cloned()
        .ok_or_else(not_found)?;

    if user["is_active"] != true {
        return Err(error(
            StatusCode::FORBIDDEN,
            "your user account must be activated to access this resource",
        ));
    }

    let role = user["role"].as_str().unwrap_or_default();
    let allowed = match access {
        Access::Any => true,
        Access::CashierOrAbove => matches!(role, "admin" | "cashier"),
        Access::AdminOnly => role == "admin",
    };
    if allowed { Ok(user) } else { Err(forbidden()) }
}

// =============================================================================
// Pagination
// =============================================================================

fn paginate(items: Vec<Value>, params: &Params) -> (Vec<Value>, Value) {
    let page = params
        .get("page")
        .and_then(|p| p.parse::<usize>().ok())
        .filter(|p| *p >= 1)
        .unwrap_or(1);
    let page_size = params
        .get("page_size")
        .and_then(|p| p.parse::<usize>().ok())
        .map_or(DEFAULT_PAGE_SIZE, |s| s.clamp(1, 100));

    let total = items.len();
    if total == 0 {
        return (Vec::new(), json!({}));
    }

    let slice = items
        .into_iter()
        .skip((page - 1) * page_size)
        .take(page_size)
        .collect();
    let metadata = json!({
        "current_page": page,
        "page_size": page_size,
        "first_page": 1,
        "last_page": total.div_ceil(page_size),
        "total_records": total,
    });
    (slice, metadata)
}

fn contains_ci(haystack: &Value, needle: &str) -> bool {
    haystack
        .as_str()
        .is_some_and(|h| h.to_lowercase().contains(&needle.to_lowercase()))
}

// =============================================================================
// Router
// =============================================================================

/// Build the stub router over `stub`.
pub fn router(stub: Stub) -> Router {
    Router::new()
        .route("/v1/tokens/authentication", post(create_token).delete(delete_token))
        .route("/v1/users", post(register))
        .route("/v1/users/activate", put(activate))
        .route("/v1/users/profile", get(profile))
        .route("/v1/users/profile/{id}", put(update_profile))
        .route("/v1/products", get(list_products).post(create_product))
        .route(
            "/v1/products/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/v1/sales", get(list_sales).post(create_sale))
        .route(
            "/v1/sales/{id}",
            get(get_sale).put(update_sale).delete(delete_sale),
        )
        .route("/v1/user", get(list_users))
        .route("/v1/user/{id}", get(get_user).put(update_user))
        .route("/v1/chatbot", post(chatbot))
        .layer(middleware::from_fn_with_state(stub.clone(), record))
        .with_state(stub)
}

async fn record(State(stub): State<Stub>, request: Request, next: Next) -> Response {
    let entry = {
        let header = |name: HeaderName| {
            request
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned)
        };
        LoggedRequest {
            method: request.method().to_string(),
            path: request
                .uri()
                .path_and_query()
                .map(ToString::to_string)
                .unwrap_or_default(),
            authorization: header(AUTHORIZATION),
            content_type: header(CONTENT_TYPE),
        }
    };
    tracing::debug!(method = %entry.method, path = %entry.path, "Stub request");
    lock(&stub).log.push(entry);
    next.run(request).await
}

// =============================================================================
// Session handlers
// =============================================================================

async fn create_token(State(stub): State<Stub>, Json(body): Json<Value>) -> Response {
    let mut data = lock(&stub);
    let email = body["email"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();
    if email.is_empty() {
        return field_error("email", "must be provided");
    }

    let user_id = data
        .users
        .iter()
        .find(|u| u["email"] == email)
        .and_then(|u| u["id"].as_i64());
    let matches = data.passwords.get(email).is_some_and(|p| p == password);
    let Some(user_id) = user_id.filter(|_| matches) else {
        return error(StatusCode::UNAUTHORIZED, "invalid authentication credentials");
    };

    data.next_token += 1;
    let token = format!("tok-{user_id}-{}", data.next_token);
    data.tokens.insert(token.clone(), user_id);
    reply(
        StatusCode::CREATED,
        json!({"authentication_token": {"token": token, "expiry": "2030-01-01T00:00:00Z"}}),
    )
}

async fn delete_token(State(stub): State<Stub>, headers: HeaderMap) -> Response {
    let mut data = lock(&stub);
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_owned);
    match token.and_then(|t| data.tokens.remove(&t)) {
        Some(_) => {
            data.revocations += 1;
            reply(StatusCode::OK, json!({"message": "authentication token revoked"}))
        }
        None => error(StatusCode::UNAUTHORIZED, "invalid or missing authentication token"),
    }
}

async fn profile(State(stub): State<Stub>, headers: HeaderMap) -> Response {
    let data = lock(&stub);
    if let Some((status, body)) = &data.profile_override {
        let status = StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return reply(status, body.clone());
    }
    match authenticate(&data, &headers, Access::Any) {
        Ok(user) => reply(StatusCode::OK, json!({ "user": user })),
        Err(response) => response,
    }
}

async fn update_profile(
    State(stub): State<Stub>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    let mut data = lock(&stub);
    let user = match authenticate(&data, &headers, Access::Any) {
        Ok(user) => user,
        Err(response) => return response,
    };
    if user["id"] != id {
        return forbidden();
    }
    let Some(record) = data.user_mut(id) else {
        return not_found();
    };
    for key in ["first_name", "last_name", "email"] {
        if let Some(value) = body.get(key) {
            record[key] = value.clone();
        }
    }
    record["updated_at"] = json!("2024-06-01T12:00:00Z");
    reply(StatusCode::OK, json!({ "user": record.clone() }))
}

async fn register(State(stub): State<Stub>, Json(body): Json<Value>) -> Response {
    let mut data = lock(&stub);
    let email = body["email"].as_str().unwrap_or_default().to_owned();
    let password = body["password"].as_str().unwrap_or_default().to_owned();

    if data.users.iter().any(|u| u["email"] == email.as_str()) {
        return field_error("email", "a user with this email address already exists");
    }
    if password.len() < 8 {
        return field_error("password", "must be at least 8 bytes long");
    }

    let id = data.add_user(
        &email,
        body["first_name"].as_str().unwrap_or_default(),
        body["last_name"].as_str().unwrap_or_default(),
        "guest",
        false,
    );
    data.passwords.insert(email, password);
    let user = data.users.iter().find(|u| u["id"] == id).cloned().unwrap_or_default();
    reply(StatusCode::ACCEPTED, json!({ "user": user }))
}

async fn activate(State(stub): State<Stub>, Json(body): Json<Value>) -> Response {
    let mut data = lock(&stub);
    let id = body["token"]
        .as_str()
        .and_then(|t| t.strip_prefix("activate-"))
        .and_then(|id| id.parse::<i64>().ok());

    match id.and_then(|id| data.user_mut(id)).filter(|u| u["is_active"] == false) {
        Some(user) => {
            user["is_active"] = json!(true);
            reply(StatusCode::OK, json!({ "user": user.clone() }))
        }
        None => field_error("token", "invalid or expired activation token"),
    }
}

// =============================================================================
// Product handlers
// =============================================================================

async fn list_products(
    State(stub): State<Stub>,
    headers: HeaderMap,
    Query(params): Query<Params>,
) -> Response {
    let data = lock(&stub);
    if let Some((status, body)) = &data.products_override {
        let status = StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return (status, body.clone()).into_response();
    }
    if let Err(response) = authenticate(&data, &headers, Access::Any) {
        return response;
    }

    let items: Vec<Value> = data
        .products
        .iter()
        .filter(|p| params.get("name").is_none_or(|name| contains_ci(&p["Name"], name)))
        .cloned()
        .collect();
    let (products, metadata) = paginate(items, &params);
    reply(StatusCode::OK, json!({"products": products, "metadata": metadata}))
}

async fn get_product(State(stub): State<Stub>, headers: HeaderMap, Path(id): Path<i64>) -> Response {
    let data = lock(&stub);
    if let Err(response) = authenticate(&data, &headers, Access::Any) {
        return response;
    }
    data.product_index(id)
        .and_then(|i| data.products.get(i))
        .map_or_else(not_found, |p| reply(StatusCode::OK, json!({ "product": p })))
}

async fn create_product(State(stub): State<Stub>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    let mut data = lock(&stub);
    if let Err(response) = authenticate(&data, &headers, Access::CashierOrAbove) {
        return response;
    }
    if body["name"].as_str().is_none_or(|n| n.trim().is_empty()) {
        return field_error("name", "must be provided");
    }
    if body["price"].as_f64().is_none_or(|p| p <= 0.0) {
        return field_error("price", "must be greater than zero");
    }

    let product = json!({
        "ID": next_id(&data.products, "ID"),
        "Name": body["name"],
        "Description": body.get("description").cloned().unwrap_or(Value::Null),
        "Price": body["price"],
        "Stock": body.get("stock").cloned().unwrap_or(json!(0)),
        "CreatedAt": TIMESTAMP,
    });
    data.products.push(product.clone());
    reply(StatusCode::CREATED, json!({ "product": product }))
}

async fn update_product(
    State(stub): State<Stub>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    let mut data = lock(&stub);
    if let Err(response) = authenticate(&data, &headers, Access::AdminOnly) {
        return response;
    }
    let Some(index) = data.product_index(id) else {
        return not_found();
    };
    let Some(product) = data.products.get_mut(index) else {
        return not_found();
    };
    for (snake, capitalized) in [("name", "Name"), ("description", "Description"), ("price", "Price"), ("stock", "Stock")] {
        if let Some(value) = body.get(snake) {
            product[capitalized] = value.clone();
        }
    }
    product["UpdatedAt"] = json!("2024-06-01T12:00:00Z");
    reply(StatusCode::OK, json!({ "product": product.clone() }))
}

async fn delete_product(State(stub): State<Stub>, headers: HeaderMap, Path(id): Path<i64>) -> Response {
    let mut data = lock(&stub);
    if let Err(response) = authenticate(&data, &headers, Access::AdminOnly) {
        return response;
    }
    match data.product_index(id) {
        Some(index) => {
            data.products.remove(index);
            reply(StatusCode::OK, json!({"message": "product successfully deleted"}))
        }
        None => not_found(),
    }
}

// =============================================================================
// Sale handlers
// =============================================================================

async fn list_sales(State(stub): State<Stub>, headers: HeaderMap, Query(params): Query<Params>) -> Response {
    let data = lock(&stub);
    if let Err(response) = authenticate(&data, &headers, Access::CashierOrAbove) {
        return response;
    }
    let matches = |sale: &Value, key: &str| {
        params
            .get(key)
            .is_none_or(|wanted| sale[key].to_string() == *wanted)
    };
    let items: Vec<Value> = data
        .sales
        .iter()
        .filter(|s| matches(s, "user_id") && matches(s, "product_id"))
        .cloned()
        .collect();
    let (sales, metadata) = paginate(items, &params);
    reply(StatusCode::OK, json!({"sales": sales, "metadata": metadata}))
}

async fn create_sale(State(stub): State<Stub>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    let mut data = lock(&stub);
    let seller = match authenticate(&data, &headers, Access::CashierOrAbove) {
        Ok(user) => user,
        Err(response) => return response,
    };
    let quantity = body["quantity"].as_i64().unwrap_or_default();
    let Some(index) = body["product_id"].as_i64().and_then(|id| data.product_index(id)) else {
        return field_error("product_id", "product does not exist");
    };
    let Some(product) = data.products.get_mut(index) else {
        return field_error("product_id", "product does not exist");
    };
    let stock = product["Stock"].as_i64().unwrap_or_default();
    if quantity > stock {
        return field_error("quantity", "not enough stock");
    }
    product["Stock"] = json!(stock - quantity);
    let price = product["Price"].as_f64().unwrap_or_default();
    let product_id = product["ID"].clone();

    #[allow(clippy::cast_precision_loss)]
    let total = format!("{:.2}", price * quantity as f64);
    let sale = json!({
        "id": next_id(&data.sales, "id"),
        "user_id": body.get("user_id").cloned().unwrap_or_else(|| seller["id"].clone()),
        "product_id": product_id,
        "quantity": quantity,
        "total_price": total,
        "sale_date": body.get("sale_date").cloned().unwrap_or_else(|| json!(TIMESTAMP)),
        "created_at": TIMESTAMP,
    });
    data.sales.push(sale.clone());
    reply(StatusCode::CREATED, json!({ "sale": sale }))
}

async fn get_sale(State(stub): State<Stub>, headers: HeaderMap, Path(id): Path<i64>) -> Response {
    let data = lock(&stub);
    if let Err(response) = authenticate(&data, &headers, Access::CashierOrAbove) {
        return response;
    }
    data.sale_index(id)
        .and_then(|i| data.sales.get(i))
        .map_or_else(not_found, |s| reply(StatusCode::OK, json!({ "sale": s })))
}

async fn update_sale(
    State(stub): State<Stub>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    let mut data = lock(&stub);
    if let Err(response) = authenticate(&data, &headers, Access::AdminOnly) {
        return response;
    }
    let Some(index) = data.sale_index(id) else {
        return not_found();
    };
    let Some(sale) = data.sales.get_mut(index) else {
        return not_found();
    };
    for key in ["user_id", "product_id", "quantity", "sale_date"] {
        if let Some(value) = body.get(key) {
            sale[key] = value.clone();
        }
    }
    sale["updated_at"] = json!("2024-06-01T12:00:00Z");
    reply(StatusCode::OK, json!({ "sale": sale.clone() }))
}

async fn delete_sale(State(stub): State<Stub>, headers: HeaderMap, Path(id): Path<i64>) -> Response {
    let mut data = lock(&stub);
    if let Err(response) = authenticate(&data, &headers, Access::AdminOnly) {
        return response;
    }
    match data.sale_index(id) {
        Some(index) => {
            data.sales.remove(index);
            StatusCode::NO_CONTENT.into_response()
        }
        None => not_found(),
    }
}

// =============================================================================
// User administration handlers
// =============================================================================

async fn list_users(State(stub): State<Stub>, headers: HeaderMap, Query(params): Query<Params>) -> Response {
    let data = lock(&stub);
    if let Err(response) = authenticate(&data, &headers, Access::CashierOrAbove) {
        return response;
    }
    let items: Vec<Value> = data
        .users
        .iter()
        .filter(|u| params.get("role").is_none_or(|role| u["role"] == role.as_str()))
        .filter(|u| params.get("email").is_none_or(|email| contains_ci(&u["email"], email)))
        .cloned()
        .collect();
    let (users, metadata) = paginate(items, &params);
    reply(StatusCode::OK, json!({"users": users, "metadata": metadata}))
}

async fn get_user(State(stub): State<Stub>, headers: HeaderMap, Path(id): Path<i64>) -> Response {
    let data = lock(&stub);
    if let Err(response) = authenticate(&data, &headers, Access::CashierOrAbove) {
        return response;
    }
    data.users
        .iter()
        .find(|u| u["id"] == id)
        .map_or_else(not_found, |u| reply(StatusCode::OK, json!({ "user": u })))
}

async fn update_user(
    State(stub): State<Stub>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    let mut data = lock(&stub);
    if let Err(response) = authenticate(&data, &headers, Access::AdminOnly) {
        return response;
    }
    let Some(user) = data.user_mut(id) else {
        return not_found();
    };
    for key in ["first_name", "last_name", "email", "role", "is_active"] {
        if let Some(value) = body.get(key) {
            user[key] = value.clone();
        }
    }
    reply(StatusCode::OK, json!({ "user": user.clone() }))
}

// =============================================================================
// Chat
// =============================================================================

async fn chatbot(State(stub): State<Stub>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    let data = lock(&stub);
    if let Err(response) = authenticate(&data, &headers, Access::Any) {
        return response;
    }
    let message = body["message"].as_str().unwrap_or_default();
    let reply_body = if message.to_lowercase().contains("sales") {
        json!({
            "response": format!("There are {} sales on record.", data.sales.len()),
            "data": {"count": data.sales.len()},
            "timestamp": TIMESTAMP,
            "type": "report",
        })
    } else {
        json!({
            "response": format!("You said: {message}"),
            "timestamp": TIMESTAMP,
            "type": "text",
        })
    };
    reply(StatusCode::OK, json!({ "chatbot": reply_body }))
}

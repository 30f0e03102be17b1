//! The typed API client
//!
//! One client instance owns the HTTP connection pool, the persisted
//! session, and the response cache. Reads go through the cache and
//! retry once on transport failure; mutations never retry and
//! invalidate the endpoint groups they touch.

use std::path::Path;
use std::time::Duration;

use chrono::NaiveDate;
use reqwest::{RequestBuilder, Response, StatusCode};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::cache::{QueryCache, QueryTag};
use crate::error::{ClientError, ClientResult};
use crate::session::{Session, SessionStore};
use shared::models::{
    BagType, Category, CategoryNode, City, Country, Currency, LabReport, Mark, OrderAction,
    ProductionJournalEntry, ProductionOrder, ProductionOrderExpanded, ProductionOrderStatus,
    Purchase, Recipe, RecipeLine, Shipment, ShipmentReport, Supplier, UnitType, User,
};
use shared::types::DocumentReference;

const CACHE_CAPACITY: u64 = 1_000;
const CACHE_TTL: Duration = Duration::from_secs(300);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// ---------------------------------------------------------------------
// Request shapes (`*Ref`: relations as foreign keys)
// ---------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct OrderCreateRef {
    pub buyer_id: Uuid,
    pub consignee_id: Option<Uuid>,
    pub country_id: Option<Uuid>,
    pub city_id: Option<Uuid>,
    pub mark_id: Uuid,
    pub unit_type_id: Uuid,
    pub bag_type_id: Option<Uuid>,
    pub quantity: Decimal,
    pub documents: Vec<DocumentReference>,
}

/// Absent fields are left unchanged server-side
#[derive(Debug, Clone, Default, Serialize)]
pub struct OrderUpdateRef {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buyer_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consignee_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mark_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_type_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bag_type_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documents: Option<Vec<DocumentReference>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecipeRef {
    pub production_order_id: Uuid,
    pub raw_materials: Vec<RecipeLine>,
    pub by_product: Option<RecipeLine>,
    pub chemicals: Option<String>,
    pub additive: Option<String>,
    pub device: Option<String>,
    pub lot_number: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct JournalEntryRef {
    pub production_order_id: Uuid,
    pub recipe_id: Uuid,
    pub planned: Decimal,
    pub produced: Decimal,
    pub ready: Decimal,
    pub actual_production_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize)]
pub struct LabReportRef {
    pub production_order_id: Uuid,
    pub recipe_id: Uuid,
    pub viscosity: Vec<Decimal>,
    pub softening_temperature: Vec<Decimal>,
    pub dropping_point: Vec<Decimal>,
    pub melting_point: Vec<Decimal>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShipmentRef {
    pub production_order_id: Uuid,
    pub quantity: Decimal,
    pub price_per_unit: Decimal,
    pub vehicle_number: Option<String>,
    pub trailer_number: Option<String>,
    pub driver_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShipmentReportRef {
    pub shipment_id: Uuid,
    pub invoice_number: String,
    pub shipment_date: NaiveDate,
    pub current_location: Option<String>,
    pub expected_delivery_date: Option<NaiveDate>,
    pub delivery_expense: Option<Decimal>,
    pub currency_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ShipmentReportUpdateRef {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_delivery_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_delivery_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_expense: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryRef {
    pub parent_id: Option<Uuid>,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClientRef {
    pub name: String,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub country_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SupplierRef {
    pub name: String,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PurchaseRef {
    pub supplier_id: Uuid,
    pub material: String,
    pub quantity: Decimal,
    pub price_per_unit: Decimal,
    pub logistics_price_per_unit: Option<Decimal>,
    pub purchase_date: NaiveDate,
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct ActionRequest<'a> {
    action: OrderAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct SessionTokens {
    access_token: String,
    #[allow(dead_code)]
    token_type: String,
    #[allow(dead_code)]
    expires_in: i64,
    user: User,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: ErrorDetail,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

// ---------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------

/// Typed client over the production workflow REST API
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: RwLock<Session>,
    store: SessionStore,
    cache: QueryCache,
}

impl ApiClient {
    /// Build a client for `base_url`, restoring any persisted session
    /// from `session_path`.
    pub fn new(base_url: impl Into<String>, session_path: impl AsRef<Path>) -> ClientResult<Self> {
        let store = SessionStore::new(session_path);
        let session = store.load();
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self {
            http,
            base_url,
            session: RwLock::new(session),
            store,
            cache: QueryCache::new(CACHE_CAPACITY, CACHE_TTL),
        })
    }

    /// Snapshot of the current session
    pub async fn session(&self) -> Session {
        self.session.read().await.clone()
    }

    // -----------------------------------------------------------------
    // Auth
    // -----------------------------------------------------------------

    /// Log in, persist the session, and return the signed-in user
    pub async fn login(&self, email: &str, password: &str) -> ClientResult<User> {
        let response = self
            .http
            .post(self.url("/auth/login"))
            .json(&LoginRequest { email, password })
            .send()
            .await?;
        let tokens: SessionTokens = self.handle(response).await?;

        let session = Session::Authenticated {
            token: tokens.access_token,
            user: tokens.user.clone(),
        };
        self.store.save(&session)?;
        *self.session.write().await = session;
        self.cache.clear().await;

        tracing::info!(email, "signed in");
        Ok(tokens.user)
    }

    /// Drop the session locally; the bearer token is simply forgotten
    pub async fn logout(&self) -> ClientResult<()> {
        self.reset_session().await?;
        self.cache.clear().await;
        Ok(())
    }

    pub async fn me(&self) -> ClientResult<User> {
        self.get_typed("/auth/me", &[QueryTag::Profile]).await
    }

    // -----------------------------------------------------------------
    // Production orders
    // -----------------------------------------------------------------

    pub async fn list_orders(
        &self,
        status: Option<ProductionOrderStatus>,
    ) -> ClientResult<Vec<ProductionOrderExpanded>> {
        let path = match status {
            Some(status) => format!("/production-orders?status={}", status.as_str()),
            None => "/production-orders".to_string(),
        };
        self.get_typed(&path, &[QueryTag::Orders]).await
    }

    pub async fn get_order(&self, order_id: Uuid) -> ClientResult<ProductionOrderExpanded> {
        self.get_typed(&format!("/production-orders/{order_id}"), &[QueryTag::Orders])
            .await
    }

    pub async fn create_order(&self, input: &OrderCreateRef) -> ClientResult<ProductionOrder> {
        self.post("/production-orders", input, &[QueryTag::Orders])
            .await
    }

    pub async fn update_order(
        &self,
        order_id: Uuid,
        input: &OrderUpdateRef,
    ) -> ClientResult<ProductionOrder> {
        self.put(&format!("/production-orders/{order_id}"), input, &[QueryTag::Orders])
            .await
    }

    pub async fn delete_order(&self, order_id: Uuid) -> ClientResult<()> {
        self.delete(&format!("/production-orders/{order_id}"), &[QueryTag::Orders])
            .await
    }

    /// Request a status transition; the server is the authority on
    /// which transitions are legal.
    pub async fn apply_order_action(
        &self,
        order_id: Uuid,
        action: OrderAction,
        reason: Option<&str>,
    ) -> ClientResult<ProductionOrder> {
        self.post(
            &format!("/production-orders/{order_id}/actions"),
            &ActionRequest { action, reason },
            &[QueryTag::Orders],
        )
        .await
    }

    pub async fn permitted_actions(&self, order_id: Uuid) -> ClientResult<Vec<OrderAction>> {
        self.get_typed(
            &format!("/production-orders/{order_id}/permitted-actions"),
            &[QueryTag::Orders],
        )
        .await
    }

    pub async fn order_recipe(&self, order_id: Uuid) -> ClientResult<Option<Recipe>> {
        self.get_typed(
            &format!("/production-orders/{order_id}/recipe"),
            &[QueryTag::Orders, QueryTag::Recipes],
        )
        .await
    }

    pub async fn order_journal(
        &self,
        order_id: Uuid,
    ) -> ClientResult<Vec<ProductionJournalEntry>> {
        self.get_typed(
            &format!("/production-orders/{order_id}/journal"),
            &[QueryTag::Orders, QueryTag::Journal],
        )
        .await
    }

    pub async fn order_qa(&self, order_id: Uuid) -> ClientResult<Vec<LabReport>> {
        self.get_typed(
            &format!("/production-orders/{order_id}/qa"),
            &[QueryTag::Orders, QueryTag::Qa],
        )
        .await
    }

    pub async fn order_shipments(&self, order_id: Uuid) -> ClientResult<Vec<Shipment>> {
        self.get_typed(
            &format!("/production-orders/{order_id}/shipments"),
            &[QueryTag::Orders, QueryTag::Shipments],
        )
        .await
    }

    // -----------------------------------------------------------------
    // Production satellites
    // -----------------------------------------------------------------

    pub async fn create_recipe(&self, input: &RecipeRef) -> ClientResult<Recipe> {
        self.post("/recipes", input, &[QueryTag::Recipes, QueryTag::Orders])
            .await
    }

    pub async fn update_recipe(&self, recipe_id: Uuid, input: &RecipeRef) -> ClientResult<Recipe> {
        self.put(
            &format!("/recipes/{recipe_id}"),
            input,
            &[QueryTag::Recipes, QueryTag::Orders],
        )
        .await
    }

    pub async fn create_journal_entry(
        &self,
        input: &JournalEntryRef,
    ) -> ClientResult<ProductionJournalEntry> {
        self.post("/prod-journal", input, &[QueryTag::Journal, QueryTag::Orders])
            .await
    }

    pub async fn create_lab_report(&self, input: &LabReportRef) -> ClientResult<LabReport> {
        self.post("/prod-qa", input, &[QueryTag::Qa, QueryTag::Orders])
            .await
    }

    pub async fn create_shipment(&self, input: &ShipmentRef) -> ClientResult<Shipment> {
        self.post("/shipments", input, &[QueryTag::Shipments, QueryTag::Orders])
            .await
    }

    /// Mark a packed shipment as loaded onto its vehicle
    pub async fn load_shipment(&self, shipment_id: Uuid) -> ClientResult<Shipment> {
        self.put(
            &format!("/shipments/{shipment_id}/load"),
            &Value::Null,
            &[QueryTag::Shipments],
        )
        .await
    }

    /// File a shipment report; server-side this moves the order into
    /// shipping, so the order cache is invalidated too.
    pub async fn create_shipment_report(
        &self,
        input: &ShipmentReportRef,
    ) -> ClientResult<ShipmentReport> {
        self.post(
            "/shipment-reports",
            input,
            &[QueryTag::Shipments, QueryTag::Orders],
        )
        .await
    }

    pub async fn update_shipment_report(
        &self,
        report_id: Uuid,
        input: &ShipmentReportUpdateRef,
    ) -> ClientResult<ShipmentReport> {
        self.put(
            &format!("/shipment-reports/{report_id}"),
            input,
            &[QueryTag::Shipments],
        )
        .await
    }

    // -----------------------------------------------------------------
    // Categories
    // -----------------------------------------------------------------

    pub async fn categories(&self) -> ClientResult<Vec<Category>> {
        self.get_typed("/categories", &[QueryTag::Categories]).await
    }

    pub async fn category_tree(&self) -> ClientResult<Vec<CategoryNode>> {
        self.get_typed("/categories/tree", &[QueryTag::Categories])
            .await
    }

    pub async fn category_parent_options(&self, category_id: Uuid) -> ClientResult<Vec<Category>> {
        self.get_typed(
            &format!("/categories/{category_id}/parent-options"),
            &[QueryTag::Categories],
        )
        .await
    }

    pub async fn create_category(&self, input: &CategoryRef) -> ClientResult<Category> {
        self.post("/categories", input, &[QueryTag::Categories]).await
    }

    pub async fn update_category(
        &self,
        category_id: Uuid,
        input: &CategoryRef,
    ) -> ClientResult<Category> {
        self.put(&format!("/categories/{category_id}"), input, &[QueryTag::Categories])
            .await
    }

    pub async fn delete_category(&self, category_id: Uuid) -> ClientResult<()> {
        self.delete(&format!("/categories/{category_id}"), &[QueryTag::Categories])
            .await
    }

    // -----------------------------------------------------------------
    // Parties and purchases
    // -----------------------------------------------------------------

    pub async fn clients(&self) -> ClientResult<Vec<shared::models::Client>> {
        self.get_typed("/clients", &[QueryTag::Clients]).await
    }

    pub async fn create_client(&self, input: &ClientRef) -> ClientResult<shared::models::Client> {
        self.post("/clients", input, &[QueryTag::Clients]).await
    }

    pub async fn suppliers(&self) -> ClientResult<Vec<Supplier>> {
        self.get_typed("/suppliers", &[QueryTag::Suppliers]).await
    }

    pub async fn create_supplier(&self, input: &SupplierRef) -> ClientResult<Supplier> {
        self.post("/suppliers", input, &[QueryTag::Suppliers]).await
    }

    pub async fn purchases(&self, supplier_id: Option<Uuid>) -> ClientResult<Vec<Purchase>> {
        let path = match supplier_id {
            Some(id) => format!("/purchases?supplier_id={id}"),
            None => "/purchases".to_string(),
        };
        self.get_typed(&path, &[QueryTag::Purchases]).await
    }

    pub async fn create_purchase(&self, input: &PurchaseRef) -> ClientResult<Purchase> {
        self.post("/purchases", input, &[QueryTag::Purchases]).await
    }

    // -----------------------------------------------------------------
    // Reference data
    // -----------------------------------------------------------------

    pub async fn marks(&self) -> ClientResult<Vec<Mark>> {
        self.get_typed("/references/marks", &[QueryTag::References])
            .await
    }

    pub async fn unit_types(&self) -> ClientResult<Vec<UnitType>> {
        self.get_typed("/references/unit-types", &[QueryTag::References])
            .await
    }

    pub async fn bag_types(&self) -> ClientResult<Vec<BagType>> {
        self.get_typed("/references/bag-types", &[QueryTag::References])
            .await
    }

    pub async fn currencies(&self) -> ClientResult<Vec<Currency>> {
        self.get_typed("/references/currencies", &[QueryTag::References])
            .await
    }

    pub async fn countries(&self) -> ClientResult<Vec<Country>> {
        self.get_typed("/references/countries", &[QueryTag::References])
            .await
    }

    pub async fn cities(&self, country_id: Option<Uuid>) -> ClientResult<Vec<City>> {
        let path = match country_id {
            Some(id) => format!("/references/cities?country_id={id}"),
            None => "/references/cities".to_string(),
        };
        self.get_typed(&path, &[QueryTag::References]).await
    }

    // -----------------------------------------------------------------
    // Plumbing
    // -----------------------------------------------------------------

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.session.read().await.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn reset_session(&self) -> ClientResult<()> {
        *self.session.write().await = Session::Anonymous;
        self.store.reset()
    }

    /// Cached GET; the fetch retries once on transport failure
    async fn get_typed<T: DeserializeOwned>(
        &self,
        path: &str,
        tags: &[QueryTag],
    ) -> ClientResult<T> {
        let value = self
            .cache
            .get_with(path, tags, || self.fetch_get(path))
            .await?;
        serde_json::from_value((*value).clone()).map_err(|e| ClientError::Decode(e.to_string()))
    }

    async fn fetch_get(&self, path: &str) -> ClientResult<Value> {
        let response = match self.authed(self.http.get(self.url(path))).await.send().await {
            Ok(response) => response,
            Err(first) => {
                tracing::debug!(path, error = %first, "retrying GET after transport failure");
                self.authed(self.http.get(self.url(path))).await.send().await?
            }
        };
        self.handle(response).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        invalidates: &[QueryTag],
    ) -> ClientResult<T> {
        let response = self
            .authed(self.http.post(self.url(path)).json(body))
            .await
            .send()
            .await?;
        let parsed = self.handle(response).await?;
        self.cache.invalidate(invalidates).await;
        Ok(parsed)
    }

    async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        invalidates: &[QueryTag],
    ) -> ClientResult<T> {
        let response = self
            .authed(self.http.put(self.url(path)).json(body))
            .await
            .send()
            .await?;
        let parsed = self.handle(response).await?;
        self.cache.invalidate(invalidates).await;
        Ok(parsed)
    }

    async fn delete(&self, path: &str, invalidates: &[QueryTag]) -> ClientResult<()> {
        let response = self
            .authed(self.http.delete(self.url(path)))
            .await
            .send()
            .await?;
        self.check_status(response).await?;
        self.cache.invalidate(invalidates).await;
        Ok(())
    }

    async fn handle<T: DeserializeOwned>(&self, response: Response) -> ClientResult<T> {
        let response = self.check_status(response).await?;
        response
            .json()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))
    }

    /// Map a non-success status to the right error. Any 401 is a
    /// global logout: the persisted session is reset and the response
    /// cache dropped before returning, same as [`ApiClient::logout`].
    async fn check_status(&self, response: Response) -> ClientResult<Response> {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!("server rejected the bearer token, resetting session");
            self.reset_session().await?;
            self.cache.clear().await;
            return Err(ClientError::Auth);
        }
        if !status.is_success() {
            let body: ErrorBody = response.json().await.unwrap_or_default();
            return Err(ClientError::Api {
                status: status.as_u16(),
                code: body.error.code,
                message: body.error.message,
            });
        }
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use shared::models::UserRole;
    use std::net::SocketAddr;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            email: "director@example.com".to_string(),
            name: "Director".to_string(),
            role: UserRole::Commercial,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    /// Minimal HTTP stub: the first `ok_responses` requests get an empty
    /// JSON list, every later request gets a bare 401.
    async fn spawn_stub(ok_responses: usize) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let served = Arc::new(AtomicUsize::new(0));

        tokio::spawn(async move {
            loop {
                let (mut socket, _) = match listener.accept().await {
                    Ok(conn) => conn,
                    Err(_) => break,
                };
                let served = served.clone();
                tokio::spawn(async move {
                    let mut buf = [0u8; 4096];
                    let mut request = Vec::new();
                    loop {
                        match socket.read(&mut buf).await {
                            Ok(0) | Err(_) => return,
                            Ok(n) => {
                                request.extend_from_slice(&buf[..n]);
                                if request.windows(4).any(|w| w == b"\r\n\r\n") {
                                    break;
                                }
                            }
                        }
                    }
                    let n = served.fetch_add(1, Ordering::SeqCst);
                    let response = if n < ok_responses {
                        "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 2\r\nconnection: close\r\n\r\n[]"
                    } else {
                        "HTTP/1.1 401 Unauthorized\r\ncontent-length: 0\r\nconnection: close\r\n\r\n"
                    };
                    let _ = socket.write_all(response.as_bytes()).await;
                });
            }
        });

        addr
    }

    #[tokio::test]
    async fn a_401_resets_the_persisted_session() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        SessionStore::new(&path)
            .save(&Session::Authenticated {
                token: "stale-token".to_string(),
                user: user(),
            })
            .unwrap();

        let addr = spawn_stub(0).await;
        let client = ApiClient::new(format!("http://{addr}"), &path).unwrap();
        assert!(client.session().await.is_authenticated());

        let err = client.me().await.unwrap_err();
        assert!(err.is_auth(), "{err}");

        assert!(!client.session().await.is_authenticated());
        assert!(!SessionStore::new(&path).load().is_authenticated());
    }

    #[tokio::test]
    async fn a_401_drops_cached_responses() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let addr = spawn_stub(1).await;
        let client = ApiClient::new(format!("http://{addr}"), &path).unwrap();

        // Populate the cache while the token is still accepted.
        assert!(client.marks().await.unwrap().is_empty());

        let err = client.me().await.unwrap_err();
        assert!(err.is_auth(), "{err}");

        // Were the cache still warm this would serve the stale list; it
        // must refetch and surface the 401 instead.
        let err = client.marks().await.unwrap_err();
        assert!(err.is_auth(), "{err}");
    }
}

//! # Backend REST Client
//!
//! Thin typed wrapper over the inventory backend's JSON endpoints.
//!
//! ## Endpoints
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  /hospitals/                 GET list, POST create                      │
//! │  /hospitals/{id}/            GET, PUT, DELETE                           │
//! │  /hospitals/{id}/inventory/  GET                                        │
//! │  /hospitals/{id}/transactions/ GET                                      │
//! │  /hospitals/{id}/stats/      GET                                        │
//! │  /inventory/                 GET list (hospital, category, name), POST  │
//! │  /inventory/{id}/            GET, PUT, DELETE                           │
//! │  /transactions/              GET list (hospital, dates), POST           │
//! │  /transactions/{id}/         GET                                        │
//! │  /auth/login/ /auth/register/ POST    /auth/me/ GET                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every request carries `Authorization: Bearer <token>` once a token is
//! set. Status codes map to [`ClientError`]: 401 → `Unauthorized`,
//! 404 → `NotFound`, anything else non-2xx → `Status`. No retries.

use chrono::NaiveDate;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use vital_core::{
    AuthResponse, Facility, FacilityStats, InventoryItem, LoginCredentials, NewInventoryItem,
    RegisterFacility, Transaction, TransactionRequest,
};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

// =============================================================================
// Query Filters
// =============================================================================

/// Query parameters for `GET /inventory/`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InventoryFilter {
    /// Owning facility id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hospital: Option<String>,
    /// Exact category.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Case-insensitive name fragment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl InventoryFilter {
    pub fn for_facility(facility_id: impl Into<String>) -> Self {
        InventoryFilter {
            hospital: Some(facility_id.into()),
            ..InventoryFilter::default()
        }
    }
}

/// Query parameters for `GET /transactions/`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TransactionFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hospital: Option<String>,
    /// Both dates must be given for the range to apply.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

/// List endpoints answer either with a page (`{"results": [...]}`) or a bare
/// array, depending on backend pagination settings.
#[derive(Deserialize)]
#[serde(untagged)]
enum Listing<T> {
    Bare(Vec<T>),
    Page { results: Vec<T> },
}

impl<T> Listing<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            Listing::Bare(items) | Listing::Page { results: items } => items,
        }
    }
}

// =============================================================================
// Api Client
// =============================================================================

/// HTTP client for the inventory backend.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    token: Option<String>,
    log_requests: bool,
}

impl ApiClient {
    /// Creates a client without a token.
    pub fn new(config: &ClientConfig) -> Self {
        ApiClient {
            http: Client::new(),
            base_url: config.api_url.trim_end_matches('/').to_string(),
            token: None,
            log_requests: config.log_requests,
        }
    }

    /// Sets or clears the bearer token sent with every request.
    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token.filter(|t| !t.is_empty());
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.set_token(token);
        self
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // =========================================================================
    // Hospitals
    // =========================================================================

    pub async fn list_facilities(&self) -> ClientResult<Vec<Facility>> {
        self.list("/hospitals/", |r| r).await
    }

    pub async fn get_facility(&self, id: &str) -> ClientResult<Facility> {
        self.call(Method::GET, &format!("/hospitals/{id}/"), |r| r).await
    }

    pub async fn create_facility(&self, form: &RegisterFacility) -> ClientResult<Facility> {
        self.call(Method::POST, "/hospitals/", |r| r.json(form)).await
    }

    pub async fn update_facility(&self, facility: &Facility) -> ClientResult<Facility> {
        let path = format!("/hospitals/{}/", facility.id);
        self.call(Method::PUT, &path, |r| r.json(facility)).await
    }

    pub async fn delete_facility(&self, id: &str) -> ClientResult<()> {
        self.call_raw(Method::DELETE, &format!("/hospitals/{id}/"), |r| r)
            .await
            .map(drop)
    }

    pub async fn facility_inventory(&self, id: &str) -> ClientResult<Vec<InventoryItem>> {
        self.list(&format!("/hospitals/{id}/inventory/"), |r| r).await
    }

    pub async fn facility_transactions(&self, id: &str) -> ClientResult<Vec<Transaction>> {
        self.list(&format!("/hospitals/{id}/transactions/"), |r| r)
            .await
    }

    pub async fn facility_stats(&self, id: &str) -> ClientResult<FacilityStats> {
        self.call(Method::GET, &format!("/hospitals/{id}/stats/"), |r| r)
            .await
    }

    // =========================================================================
    // Inventory
    // =========================================================================

    pub async fn list_inventory(&self, filter: &InventoryFilter) -> ClientResult<Vec<InventoryItem>> {
        self.list("/inventory/", |r| r.query(filter)).await
    }

    pub async fn get_item(&self, id: &str) -> ClientResult<InventoryItem> {
        self.call(Method::GET, &format!("/inventory/{id}/"), |r| r).await
    }

    pub async fn create_item(&self, item: &NewInventoryItem) -> ClientResult<InventoryItem> {
        self.call(Method::POST, "/inventory/", |r| r.json(item)).await
    }

    pub async fn update_item(&self, id: &str, item: &NewInventoryItem) -> ClientResult<InventoryItem> {
        self.call(Method::PUT, &format!("/inventory/{id}/"), |r| r.json(item))
            .await
    }

    pub async fn delete_item(&self, id: &str) -> ClientResult<()> {
        self.call_raw(Method::DELETE, &format!("/inventory/{id}/"), |r| r)
            .await
            .map(drop)
    }

    // =========================================================================
    // Transactions
    // =========================================================================

    pub async fn list_transactions(&self, filter: &TransactionFilter) -> ClientResult<Vec<Transaction>> {
        self.list("/transactions/", |r| r.query(filter)).await
    }

    pub async fn get_transaction(&self, id: &str) -> ClientResult<Transaction> {
        self.call(Method::GET, &format!("/transactions/{id}/"), |r| r)
            .await
    }

    /// Records a sale; the backend decrements stock for each line.
    pub async fn create_transaction(&self, request: &TransactionRequest) -> ClientResult<Transaction> {
        self.call(Method::POST, "/transactions/", |r| r.json(request))
            .await
    }

    // =========================================================================
    // Auth
    // =========================================================================

    pub async fn login(&self, credentials: &LoginCredentials) -> ClientResult<AuthResponse> {
        self.call(Method::POST, "/auth/login/", |r| r.json(credentials))
            .await
    }

    pub async fn register(&self, form: &RegisterFacility) -> ClientResult<AuthResponse> {
        self.call(Method::POST, "/auth/register/", |r| r.json(form))
            .await
    }

    /// The facility the current token belongs to.
    pub async fn me(&self) -> ClientResult<Facility> {
        self.call(Method::GET, "/auth/me/", |r| r).await
    }

    // =========================================================================
    // Plumbing
    // =========================================================================

    async fn list<T, F>(&self, path: &str, prepare: F) -> ClientResult<Vec<T>>
    where
        T: DeserializeOwned,
        F: FnOnce(RequestBuilder) -> RequestBuilder,
    {
        let listing: Listing<T> = self.call(Method::GET, path, prepare).await?;
        Ok(listing.into_vec())
    }

    async fn call<T, F>(&self, method: Method, path: &str, prepare: F) -> ClientResult<T>
    where
        T: DeserializeOwned,
        F: FnOnce(RequestBuilder) -> RequestBuilder,
    {
        let body = self.call_raw(method, path, prepare).await?;
        serde_json::from_str(&body).map_err(|source| {
            error!(path, error = %source, "Unexpected response body");
            ClientError::Decode {
                path: path.to_string(),
                source,
            }
        })
    }

    async fn call_raw<F>(&self, method: Method, path: &str, prepare: F) -> ClientResult<String>
    where
        F: FnOnce(RequestBuilder) -> RequestBuilder,
    {
        if self.log_requests {
            info!(%method, path, "Backend request");
        } else {
            debug!(%method, path, "Backend request");
        }

        let mut builder = self.http.request(method, format!("{}{}", self.base_url, path));
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }

        let response = prepare(builder).send().await.map_err(|e| {
            error!(path, error = %e, "Backend unreachable");
            ClientError::Http(e)
        })?;

        let status = response.status();
        let body = response.text().await?;

        match status {
            s if s.is_success() => Ok(body),
            StatusCode::UNAUTHORIZED => Err(ClientError::Unauthorized),
            StatusCode::NOT_FOUND => Err(ClientError::NotFound(path.to_string())),
            s => {
                error!(path, status = s.as_u16(), "Backend error");
                Err(ClientError::Status {
                    status: s.as_u16(),
                    body,
                })
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;

    async fn read_request(socket: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];

        let header_end = loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break buf.len();
            }
            buf.extend_from_slice(&chunk[..n]);
            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos + 4;
            }
        };

        let head = String::from_utf8_lossy(&buf[..header_end]).to_lowercase();
        let content_length = head
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(0);

        while buf.len() < header_end + content_length {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
        }

        String::from_utf8_lossy(&buf).into_owned()
    }

    /// One-shot HTTP stub on a loopback port. Resolves to the raw request.
    pub(crate) async fn serve_once(status: &'static str, body: &'static str) -> (ClientConfig, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
            request
        });

        let config = ClientConfig {
            api_url: format!("http://{addr}/api"),
            ..ClientConfig::default()
        };
        (config, handle)
    }

    #[tokio::test]
    async fn test_paginated_list_with_bearer_token() {
        let (config, server) = serve_once(
            "200 OK",
            r#"{"count": 1, "results": [{"id": 3, "name": "Mercy Clinic", "latitude": 39.7, "longitude": -89.6}]}"#,
        )
        .await;
        let client = ApiClient::new(&config).with_token(Some("tok-1".to_string()));

        let facilities = client.list_facilities().await.unwrap();
        assert_eq!(facilities.len(), 1);
        assert_eq!(facilities[0].id, "3");

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /api/hospitals/ HTTP/1.1"));
        assert!(request.to_lowercase().contains("authorization: bearer tok-1"));
    }

    #[tokio::test]
    async fn test_bare_list_without_token() {
        let (config, server) = serve_once(
            "200 OK",
            r#"[{"id": 1, "name": "Gloves", "price": "2.50"}, {"id": 2, "name": "Gauze", "price": null}]"#,
        )
        .await;
        let client = ApiClient::new(&config);

        let items = client.facility_inventory("3").await.unwrap();
        assert_eq!(items.len(), 2);
        assert!(items[1].price.is_zero());

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /api/hospitals/3/inventory/ "));
        assert!(!request.to_lowercase().contains("authorization:"));
    }

    #[tokio::test]
    async fn test_inventory_filter_query() {
        let (config, server) = serve_once("200 OK", "[]").await;
        let client = ApiClient::new(&config);

        let filter = InventoryFilter {
            name: Some("glove".to_string()),
            ..InventoryFilter::for_facility("3")
        };
        assert!(client.list_inventory(&filter).await.unwrap().is_empty());

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /api/inventory/?hospital=3&name=glove "));
    }

    #[tokio::test]
    async fn test_status_mapping() {
        let (config, server) = serve_once("401 Unauthorized", r#"{"error": "Invalid or expired token"}"#).await;
        let err = ApiClient::new(&config).me().await.unwrap_err();
        assert!(err.is_unauthorized());
        server.await.unwrap();

        let (config, server) = serve_once("404 Not Found", r#"{"detail": "Not found."}"#).await;
        let err = ApiClient::new(&config).get_item("99").await.unwrap_err();
        assert!(matches!(err, ClientError::NotFound(path) if path == "/inventory/99/"));
        server.await.unwrap();

        let (config, server) = serve_once("400 Bad Request", r#"{"quantity": ["Not enough stock"]}"#).await;
        let err = ApiClient::new(&config).get_transaction("1").await.unwrap_err();
        match err {
            ClientError::Status { status, body } => {
                assert_eq!(status, 400);
                assert!(body.contains("Not enough stock"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_garbled_body_is_decode_error() {
        let (config, server) = serve_once("200 OK", "<html>oops</html>").await;
        let err = ApiClient::new(&config).facility_stats("3").await.unwrap_err();
        assert!(matches!(err, ClientError::Decode { .. }));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_http_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let config = ClientConfig {
            api_url: format!("http://{addr}/api"),
            ..ClientConfig::default()
        };
        let err = ApiClient::new(&config).list_facilities().await.unwrap_err();
        assert!(matches!(err, ClientError::Http(_)));
    }

    #[tokio::test]
    async fn test_create_transaction_posts_json() {
        let (config, server) = serve_once(
            "201 Created",
            r#"{"id": 41, "hospital": 3, "customer_name": "Ada", "payment_method": "cash", "total_amount": "24.25", "items": []}"#,
        )
        .await;
        let client = ApiClient::new(&config);

        let request = TransactionRequest {
            hospital: "3".to_string(),
            customer_name: "Ada".to_string(),
            customer_email: None,
            customer_phone: None,
            customer_address: None,
            payment_method: vital_core::PaymentMethod::Cash,
            transaction_id: None,
            total_amount: vital_core::Money::from_cents(2425),
            items: Vec::new(),
        };
        let created = client.create_transaction(&request).await.unwrap();
        assert_eq!(created.id, "41");
        assert_eq!(created.total_amount, vital_core::Money::from_cents(2425));

        let raw = server.await.unwrap();
        assert!(raw.starts_with("POST /api/transactions/ "));
        assert!(raw.contains(r#""total_amount":"24.25""#));
        assert!(raw.contains(r#""payment_method":"cash""#));
    }

    fn register_form() -> RegisterFacility {
        RegisterFacility {
            name: "Mercy Clinic".to_string(),
            address: "1 Main St".to_string(),
            city: "Springfield".to_string(),
            state: "IL".to_string(),
            zip_code: "62701".to_string(),
            phone_number: "555-0100".to_string(),
            email: "desk@mercy.test".to_string(),
            password: "secret".to_string(),
            contact_person: "Dr. Reyes".to_string(),
            license_number: "IL-0042".to_string(),
            latitude: Some(39.78),
            longitude: None,
        }
    }

    #[tokio::test]
    async fn test_facility_create_update_delete() {
        let (config, server) = serve_once("201 Created", r#"{"id": 5, "name": "Mercy Clinic"}"#).await;
        let created = ApiClient::new(&config).create_facility(&register_form()).await.unwrap();
        assert_eq!(created.id, "5");
        let raw = server.await.unwrap();
        assert!(raw.starts_with("POST /api/hospitals/ "));
        assert!(raw.contains(r#""license_number":"IL-0042""#));

        let (config, server) = serve_once("200 OK", r#"{"id": 5, "name": "Mercy Clinic East"}"#).await;
        let renamed = Facility {
            name: "Mercy Clinic East".to_string(),
            ..created
        };
        let updated = ApiClient::new(&config).update_facility(&renamed).await.unwrap();
        assert_eq!(updated.name, "Mercy Clinic East");
        let raw = server.await.unwrap();
        assert!(raw.starts_with("PUT /api/hospitals/5/ "));
        assert!(raw.contains("Mercy Clinic East"));

        let (config, server) = serve_once("204 No Content", "").await;
        ApiClient::new(&config).delete_facility("5").await.unwrap();
        assert!(server.await.unwrap().starts_with("DELETE /api/hospitals/5/ "));
    }

    #[tokio::test]
    async fn test_facility_transactions() {
        let (config, server) = serve_once(
            "200 OK",
            r#"[{"id": 41, "hospital": 3, "customer_name": "Ada", "payment_method": "online", "transaction_id": "TX-9", "total_amount": "24.25", "items": []}]"#,
        )
        .await;
        let sales = ApiClient::new(&config).facility_transactions("3").await.unwrap();
        assert_eq!(sales.len(), 1);
        assert_eq!(sales[0].transaction_id.as_deref(), Some("TX-9"));
        assert!(server.await.unwrap().starts_with("GET /api/hospitals/3/transactions/ "));
    }

    #[tokio::test]
    async fn test_transaction_filter_query() {
        let (config, server) = serve_once("200 OK", r#"{"results": []}"#).await;
        let filter = TransactionFilter {
            hospital: Some("3".to_string()),
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1),
            end_date: NaiveDate::from_ymd_opt(2025, 1, 31),
        };
        assert!(ApiClient::new(&config).list_transactions(&filter).await.unwrap().is_empty());

        let raw = server.await.unwrap();
        assert!(raw.starts_with(
            "GET /api/transactions/?hospital=3&start_date=2025-01-01&end_date=2025-01-31 "
        ));
    }

    #[tokio::test]
    async fn test_update_item_puts_json() {
        let (config, server) = serve_once(
            "200 OK",
            r#"{"id": 2, "name": "Gauze Roll", "quantity": 30, "price": "3.50", "hospital": 3}"#,
        )
        .await;
        let item = NewInventoryItem {
            name: "Gauze Roll".to_string(),
            quantity: 30,
            category: "Dressings".to_string(),
            description: String::new(),
            price: vital_core::Money::from_cents(350),
            hospital: "3".to_string(),
        };
        let updated = ApiClient::new(&config).update_item("2", &item).await.unwrap();
        assert_eq!(updated.quantity, 30);

        let raw = server.await.unwrap();
        assert!(raw.starts_with("PUT /api/inventory/2/ "));
        assert!(raw.contains(r#""price":"3.50""#));
    }
}


use crate::config::AppConfig;
use crate::create_app;
use crate::credential::{CredentialError, CredentialIssuer};
use crate::state::AppState;
use crate::store::memory::{InMemoryAccountStore, InMemoryTokenStore};
use crate::store::{
    AccountRecord, AccountStore, AccountUpdate, StoreError, Stores, TokenStore,
};
use async_trait::async_trait;
use axum::body::Body;
use axum::Router;
use http::{header, HeaderMap, Method, Request, StatusCode};
use http_body_util::BodyExt;
use log::LevelFilter;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tower::ServiceExt;
use wiremock::MockServer;

/// Test fixture for setting up a complete test environment with a mocked
/// Azure AD token endpoint.
///
/// The fixture wires the application to in-memory stores and an HS256
/// credential issuer, and points the Azure AD client at `azure_mock`.
///
/// # Examples
///
/// ```rust
/// #[tokio::test]
/// async fn test_callback() {
///     let fixture = TestFixture::new().await;
///
///     Mock::given(matchers::method("POST"))
///         .and(matchers::path("/common/oauth2/v2.0/token"))
///         .respond_with(ResponseTemplate::new(200).set_body_json(json!({
///             "access_token": "at",
///             "id_token": id_token(json!({ "oid": "123" }))
///         })))
///         .mount(&fixture.azure_mock)
///         .await;
///
///     let response = fixture
///         .get_with_cookie("/token?code=c&state=s", "state", "s")
///         .await;
///     response.assert_ok();
///     assert!(response.json["token"].is_string());
/// }
/// ```
pub struct TestFixture {
    /// The application router
    pub app: Router,
    /// Configuration settings
    pub config: AppConfig,
    /// Stores the application writes to
    pub stores: Stores,
    /// Mock server playing the Azure AD authority
    pub azure_mock: MockServer,
    accounts: Arc<InMemoryAccountStore>,
}

impl TestFixture {
    /// Creates a new test fixture with in-memory stores
    pub async fn new() -> Self {
        let accounts = Arc::new(InMemoryAccountStore::new());
        let stores = Stores {
            accounts: accounts.clone(),
            tokens: Arc::new(InMemoryTokenStore::new()),
        };
        Self::with_stores(stores, accounts).await
    }

    /// Creates a fixture whose access tokens go to the given store
    pub async fn with_token_store(tokens: Arc<dyn TokenStore>) -> Self {
        let accounts = Arc::new(InMemoryAccountStore::new());
        let stores = Stores {
            accounts: accounts.clone(),
            tokens,
        };
        Self::with_stores(stores, accounts).await
    }

    async fn with_stores(stores: Stores, accounts: Arc<InMemoryAccountStore>) -> Self {
        Self::setup_logger(LevelFilter::Debug);

        let azure_mock = MockServer::start().await;
        let config = AppConfig::for_test_with_mocks(&azure_mock);
        let state = AppState::for_testing(&config, stores.clone());
        let app = create_app(state).await;

        Self {
            app,
            config,
            stores,
            azure_mock,
            accounts,
        }
    }

    /// Initializes the test logger with the given level
    pub fn setup_logger(level: LevelFilter) {
        let _ = env_logger::builder()
            .filter_level(level)
            .is_test(true)
            .try_init();
    }

    /// Number of accounts in the in-memory account store
    pub async fn account_count(&self) -> usize {
        self.accounts.len().await
    }

    /// Sends a GET request to the specified URI.
    pub async fn get(&self, uri: impl AsRef<str>) -> TestResponse {
        let request = Request::builder()
            .method(Method::GET)
            .uri(uri.as_ref())
            .body(Body::empty())
            .expect("Failed to build request");

        self.send(request).await
    }

    /// Sends a GET request carrying a single cookie.
    pub async fn get_with_cookie(&self, uri: &str, name: &str, value: &str) -> TestResponse {
        let request = Request::builder()
            .method(Method::GET)
            .uri(uri)
            .header(header::COOKIE, format!("{}={}", name, value))
            .body(Body::empty())
            .expect("Failed to build request");

        self.send(request).await
    }

    /// Sends a request and returns a TestResponse.
    ///
    /// JSONP bodies are unwrapped: the callback name lands in
    /// `TestResponse::callback` and the argument in `TestResponse::json`.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read response body")
            .to_bytes();
        let text = String::from_utf8_lossy(&body).to_string();

        let (callback, json_text) = match parse_jsonp(&text) {
            Some((callback, json)) => (Some(callback), json),
            None => (None, text.clone()),
        };

        // Try to parse as JSON, defaulting to empty object if parsing fails or empty body
        let json = if !json_text.is_empty() {
            serde_json::from_str(&json_text).unwrap_or_else(|_| serde_json::json!({}))
        } else {
            serde_json::json!({})
        };

        TestResponse {
            status,
            headers,
            callback,
            json,
            text,
        }
    }
}

/// Splits `/**/ typeof cb === 'function' && cb({...});` into its callback
/// name and JSON argument
fn parse_jsonp(body: &str) -> Option<(String, String)> {
    let rest = body.strip_prefix("/**/ typeof ")?;
    let (callback, rest) = rest.split_once(" === 'function' && ")?;
    let json = rest
        .strip_prefix(callback)?
        .strip_prefix('(')?
        .strip_suffix(");")?;
    Some((callback.to_string(), json.to_string()))
}

/// Response from a test request that provides convenient access to status and JSON body.
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// JSONP callback name, if the body was a script callback
    pub callback: Option<String>,
    /// Response body as JSON (if present and valid JSON)
    pub json: Value,
    /// Raw response body
    pub text: String,
}

impl TestResponse {
    /// Asserts that the response has the expected status code.
    pub fn assert_status(&self, expected: StatusCode) -> &Self {
        assert_eq!(
            self.status, expected,
            "Expected status {} but got {} with body: {}",
            expected, self.status, self.text
        );
        self
    }

    /// Asserts that the response status is OK (200).
    pub fn assert_ok(&self) -> &Self {
        self.assert_status(StatusCode::OK)
    }

    /// Returns a header value as a string
    pub fn header(&self, name: &str) -> Option<String> {
        self.headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    }

    /// Returns the value the response sets for the named cookie
    pub fn set_cookie(&self, name: &str) -> Option<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .filter_map(|raw| raw.split(';').next())
            .filter_map(|pair| pair.split_once('='))
            .find(|(cookie_name, _)| cookie_name.trim() == name)
            .map(|(_, value)| value.trim().to_string())
    }

    /// Converts the response body to the specified type.
    pub fn json_as<T: DeserializeOwned>(&self) -> T {
        serde_json::from_value(self.json.clone()).expect("Failed to deserialize response JSON")
    }
}

/// Credential issuer counting how many credentials it minted
#[derive(Default)]
pub struct CountingIssuer {
    pub minted: AtomicUsize,
}

#[async_trait]
impl CredentialIssuer for CountingIssuer {
    async fn mint_credential(&self, account_id: &str) -> Result<String, CredentialError> {
        let n = self.minted.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("credential-{}-{}", account_id, n))
    }
}

/// Token store whose backend is always unreachable
pub struct FailingTokenStore;

#[async_trait]
impl TokenStore for FailingTokenStore {
    async fn set_access_token(&self, _account_id: &str, _token: &str) -> Result<(), StoreError> {
        Err(StoreError::Redis("connection refused".to_string()))
    }

    async fn get_access_token(&self, _account_id: &str) -> Result<Option<String>, StoreError> {
        Err(StoreError::Redis("connection refused".to_string()))
    }

    async fn health_check(&self) -> Result<(), String> {
        Err("connection refused".to_string())
    }
}

pub enum UpdateBehavior {
    Succeed,
    NotFound,
    Fail,
}

pub enum CreateBehavior {
    Succeed,
    AlreadyExists,
    Fail,
}

/// Account store answering with fixed outcomes, counting calls
pub struct ScriptedAccountStore {
    update: UpdateBehavior,
    create: CreateBehavior,
    pub update_calls: AtomicUsize,
    pub create_calls: AtomicUsize,
}

impl ScriptedAccountStore {
    pub fn new(update: UpdateBehavior, create: CreateBehavior) -> Self {
        Self {
            update,
            create,
            update_calls: AtomicUsize::new(0),
            create_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl AccountStore for ScriptedAccountStore {
    async fn update_account(
        &self,
        uid: &str,
        update: &AccountUpdate,
    ) -> Result<AccountRecord, StoreError> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        match self.update {
            UpdateBehavior::Succeed => {
                let mut record = AccountRecord {
                    uid: uid.to_string(),
                    display_name: None,
                    email: None,
                    email_verified: true,
                };
                update.apply(&mut record);
                Ok(record)
            }
            UpdateBehavior::NotFound => Err(StoreError::AccountNotFound(uid.to_string())),
            UpdateBehavior::Fail => Err(StoreError::Redis("connection reset".to_string())),
        }
    }

    async fn create_account(&self, record: &AccountRecord) -> Result<AccountRecord, StoreError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        match self.create {
            CreateBehavior::Succeed => Ok(record.clone()),
            CreateBehavior::AlreadyExists => {
                Err(StoreError::AccountAlreadyExists(record.uid.clone()))
            }
            CreateBehavior::Fail => Err(StoreError::Redis("connection reset".to_string())),
        }
    }

    async fn get_account(&self, _uid: &str) -> Result<Option<AccountRecord>, StoreError> {
        Ok(None)
    }

    async fn health_check(&self) -> Result<(), String> {
        Ok(())
    }
}

//! HTTP client for the marketplace backend.
//!
//! All outgoing requests carry the bearer token when a session is present.
//! A 401 anywhere logs the user out and redirects to the login view, except
//! when an auth view is already showing. Catalog reads never fail: network
//! trouble falls back to the embedded offline catalog, and unfiltered
//! listings are cached briefly.

mod fallback;
mod types;

pub use fallback::{FallbackCatalog, OfflineCatalog};
pub use types::{
    CategoriesResponse, OrderRequest, ProductQuery, ProductsResponse, RegisterOutcome,
    RegisterReceipt, RegisterRequest, TokenResponse, UserProfile,
};

use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use reqwest::StatusCode;
use thiserror::Error;
use tracing::instrument;

use kisan_setu_core::{Category, LocationRecord, Product, SessionRecord, UserId};

use crate::config::ClientConfig;
use crate::session::SessionManager;

const CACHE_TTL: Duration = Duration::from_secs(300);

/// Errors from backend calls.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request could not be sent or the response not received.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend rejected the credential. The session has already been
    /// cleared and the redirect issued by the time this is returned.
    #[error("authentication rejected")]
    Unauthorized,

    /// The backend answered with a non-success status.
    #[error("backend returned {status}: {message}")]
    Status {
        status: StatusCode,
        message: String,
    },

    /// The response body did not match the expected shape.
    #[error("response decode failed: {0}")]
    Decode(#[from] serde_json::Error),
}

/// The views the client can be showing, as far as routing cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Landing,
    Login,
    Register,
    Dashboard,
    Marketplace,
    Users,
}

impl View {
    /// Views where an expired credential must not bounce the user away,
    /// since they are already re-authenticating.
    #[must_use]
    pub const fn is_auth_view(self) -> bool {
        matches!(self, Self::Login | Self::Register)
    }
}

/// How the client moves the user between views.
pub trait Navigator: Send + Sync {
    /// The view currently showing.
    fn current_view(&self) -> View;

    /// Send the user to the login view.
    fn redirect_to_login(&self);
}

/// Navigator for hosts without a UI; remembers the view and logs redirects.
pub struct HeadlessNavigator {
    view: Mutex<View>,
}

impl HeadlessNavigator {
    #[must_use]
    pub const fn new(view: View) -> Self {
        Self {
            view: Mutex::new(view),
        }
    }
}

impl Default for HeadlessNavigator {
    fn default() -> Self {
        Self::new(View::Landing)
    }
}

impl Navigator for HeadlessNavigator {
    fn current_view(&self) -> View {
        *self.view.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn redirect_to_login(&self) {
        tracing::info!("redirecting to login");
        *self.view.lock().unwrap_or_else(PoisonError::into_inner) = View::Login;
    }
}

#[derive(Clone)]
enum CacheValue {
    Products(Vec<Product>),
    Categories(Vec<Category>),
}

struct Inner {
    http: reqwest::Client,
    base: String,
    cache: moka::future::Cache<String, CacheValue>,
    session: SessionManager,
    fallback: Arc<dyn FallbackCatalog>,
    navigator: Arc<dyn Navigator>,
}

/// Client for the marketplace backend. Cheap to clone.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<Inner>,
}

impl ApiClient {
    /// Create a client from configuration.
    #[must_use]
    pub fn new(
        config: &ClientConfig,
        session: SessionManager,
        fallback: Arc<dyn FallbackCatalog>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self::with_http(reqwest::Client::new(), config, session, fallback, navigator)
    }

    /// Create a client over an existing HTTP client.
    #[must_use]
    pub fn with_http(
        http: reqwest::Client,
        config: &ClientConfig,
        session: SessionManager,
        fallback: Arc<dyn FallbackCatalog>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                http,
                base: config.api_url.as_str().trim_end_matches('/').to_owned(),
                cache: moka::future::Cache::builder()
                    .max_capacity(64)
                    .time_to_live(CACHE_TTL)
                    .build(),
                session,
                fallback,
                navigator,
            }),
        }
    }

    /// The underlying HTTP client, for sharing with other subsystems.
    #[must_use]
    pub fn http(&self) -> reqwest::Client {
        self.inner.http.clone()
    }

    /// Log in with username and password.
    ///
    /// The token endpoint returns only the credential, so a profile call
    /// follows to assemble the full session, which is then persisted.
    #[instrument(skip(self, password))]
    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<SessionRecord, ApiError> {
        let response = self
            .send(
                self.inner
                    .http
                    .post(self.endpoint("/auth/login"))
                    .form(&[("username", username), ("password", password)]),
            )
            .await?;
        let token: TokenResponse = expect_success(response).await?.json().await?;

        let profile = self.profile_with_token(&token.access_token).await?;
        let session = SessionRecord {
            user_id: profile.id,
            username: profile.username,
            full_name: profile.full_name,
            user_type: profile.user_type,
            access_token: token.access_token,
            token_type: token.token_type,
        };
        self.inner.session.set(session.clone());
        Ok(session)
    }

    /// Register a new account.
    ///
    /// When the backend is unreachable the registration still "succeeds"
    /// locally: a mock session is created and persisted so the app can be
    /// used offline.
    #[instrument(skip(self, request), fields(username = %request.username))]
    pub async fn register(
        &self,
        request: &RegisterRequest,
    ) -> Result<RegisterOutcome, ApiError> {
        let result = self
            .send(
                self.inner
                    .http
                    .post(self.endpoint("/auth/register"))
                    .json(request),
            )
            .await;

        let response = match result {
            Ok(response) => response,
            Err(ApiError::Http(e)) if e.is_connect() || e.is_timeout() => {
                tracing::warn!(error = %e, "backend unreachable, creating offline session");
                let session = offline_session(request);
                self.inner.session.set(session.clone());
                return Ok(RegisterOutcome::Offline(session));
            }
            Err(e) => return Err(e),
        };

        let receipt: RegisterReceipt = expect_success(response).await?.json().await?;
        Ok(RegisterOutcome::Registered(receipt))
    }

    /// The logged-in user's profile.
    #[instrument(skip(self))]
    pub async fn profile(&self) -> Result<UserProfile, ApiError> {
        let response = self
            .send(self.inner.http.get(self.endpoint("/auth/profile")))
            .await?;
        Ok(expect_success(response).await?.json().await?)
    }

    /// All registered users.
    #[instrument(skip(self))]
    pub async fn users(&self) -> Result<Vec<UserProfile>, ApiError> {
        let response = self
            .send(self.inner.http.get(self.endpoint("/auth/users")))
            .await?;
        Ok(expect_success(response).await?.json().await?)
    }

    /// Products matching `query`.
    ///
    /// Never fails: on any backend trouble the embedded catalog answers
    /// instead. Only unfiltered listings are cached, so filters always see
    /// fresh data.
    #[instrument(skip(self))]
    pub async fn products(&self, query: &ProductQuery) -> Vec<Product> {
        if query.is_unfiltered()
            && let Some(CacheValue::Products(products)) =
                self.inner.cache.get("products").await
        {
            return products;
        }

        match self.fetch_products(query).await {
            Ok(products) => {
                if query.is_unfiltered() {
                    self.inner
                        .cache
                        .insert("products".to_owned(), CacheValue::Products(products.clone()))
                        .await;
                }
                products
            }
            Err(e) => {
                tracing::warn!(error = %e, "product listing failed, serving offline catalog");
                self.inner.fallback.products(query)
            }
        }
    }

    /// All categories. Never fails, same policy as [`Self::products`].
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Vec<Category> {
        if let Some(CacheValue::Categories(categories)) =
            self.inner.cache.get("categories").await
        {
            return categories;
        }

        match self.fetch_categories().await {
            Ok(categories) => {
                self.inner
                    .cache
                    .insert(
                        "categories".to_owned(),
                        CacheValue::Categories(categories.clone()),
                    )
                    .await;
                categories
            }
            Err(e) => {
                tracing::warn!(error = %e, "category listing failed, serving offline catalog");
                self.inner.fallback.categories()
            }
        }
    }

    /// Place an order.
    #[instrument(skip(self, order))]
    pub async fn create_order(
        &self,
        order: &OrderRequest,
    ) -> Result<serde_json::Value, ApiError> {
        let response = self
            .send(
                self.inner
                    .http
                    .post(self.endpoint("/api/marketplace/orders"))
                    .json(order),
            )
            .await?;
        Ok(expect_success(response).await?.json().await?)
    }

    /// The logged-in user's orders.
    #[instrument(skip(self))]
    pub async fn orders(&self) -> Result<serde_json::Value, ApiError> {
        let response = self
            .send(self.inner.http.get(self.endpoint("/api/marketplace/orders")))
            .await?;
        Ok(expect_success(response).await?.json().await?)
    }

    /// Users near a point, within `radius_km` (default 50).
    #[instrument(skip(self))]
    pub async fn nearby_users(
        &self,
        latitude: f64,
        longitude: f64,
        radius_km: Option<f64>,
    ) -> Result<serde_json::Value, ApiError> {
        let response = self
            .send(
                self.inner
                    .http
                    .get(self.endpoint("/api/location/nearby-users"))
                    .query(&[
                        ("latitude", latitude.to_string()),
                        ("longitude", longitude.to_string()),
                        ("radius_km", radius_km.unwrap_or(50.0).to_string()),
                    ]),
            )
            .await?;
        Ok(expect_success(response).await?.json().await?)
    }

    /// Report the user's current location to the backend.
    #[instrument(skip(self, record))]
    pub async fn push_location(&self, record: &LocationRecord) -> Result<(), ApiError> {
        let response = self
            .send(
                self.inner
                    .http
                    .post(self.endpoint("/api/location/update-location"))
                    .json(record),
            )
            .await?;
        expect_success(response).await?;
        Ok(())
    }

    async fn fetch_products(&self, query: &ProductQuery) -> Result<Vec<Product>, ApiError> {
        let mut request = self
            .inner
            .http
            .get(self.endpoint("/api/marketplace/products"));
        if let Some(category) = &query.category {
            request = request.query(&[("category", category)]);
        }
        if let Some(search) = &query.search {
            request = request.query(&[("search", search)]);
        }
        let response = self.send(request).await?;
        let body: ProductsResponse = expect_success(response).await?.json().await?;
        Ok(body.products)
    }

    async fn fetch_categories(&self) -> Result<Vec<Category>, ApiError> {
        let response = self
            .send(
                self.inner
                    .http
                    .get(self.endpoint("/api/marketplace/categories")),
            )
            .await?;
        let body: CategoriesResponse = expect_success(response).await?.json().await?;
        Ok(body.categories)
    }

    async fn profile_with_token(&self, token: &str) -> Result<UserProfile, ApiError> {
        let response = self
            .inner
            .http
            .get(self.endpoint("/auth/profile"))
            .bearer_auth(token)
            .send()
            .await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized);
        }
        Ok(expect_success(response).await?.json().await?)
    }

    /// Attach the bearer token when present, send, and intercept 401s.
    async fn send(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, ApiError> {
        let request = match self.inner.session.bearer_token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        let response = request.send().await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            self.handle_unauthorized();
            return Err(ApiError::Unauthorized);
        }
        Ok(response)
    }

    /// The session is gone or expired: clear it and bounce to login, unless
    /// the user is already on an auth view.
    fn handle_unauthorized(&self) {
        self.inner.session.clear();
        let view = self.inner.navigator.current_view();
        if view.is_auth_view() {
            tracing::debug!(?view, "credential rejected on auth view, staying put");
        } else {
            self.inner.navigator.redirect_to_login();
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base)
    }
}

fn offline_session(request: &RegisterRequest) -> SessionRecord {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    SessionRecord {
        user_id: UserId::new(format!("offline-{millis}")),
        username: request.username.clone(),
        full_name: request.full_name.clone(),
        user_type: request.user_type,
        access_token: format!("mock_token_{millis}"),
        token_type: "bearer".to_owned(),
    }
}

async fn expect_success(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message: String = response
        .text()
        .await
        .unwrap_or_default()
        .chars()
        .take(200)
        .collect();
    Err(ApiError::Status { status, message })
}

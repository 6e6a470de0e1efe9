//! Authenticated API client for the JobDen REST backend.
//!
//! Every call goes through the same interceptor pair:
//! - before dispatch the current access token is read from the session store
//!   and attached as a bearer credential;
//! - a 401 on a request that carried a token and has not been retried yet
//!   parks the request on the refresh queue, and it is replayed once with the
//!   new token. A failed refresh clears the session and broadcasts
//!   `AuthEvent::SessionExpired`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use reqwest::{multipart, Client, Method, StatusCode, Url};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use crate::auth::{Joined, RefreshCoordinator, RefreshError, RefreshState, Session, SessionStore, Ticket, LOGIN_PATH};
use crate::config::Config;
use crate::models::TokenPair;

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Buffered auth events per subscriber before the oldest are dropped.
const EVENT_CHANNEL_CAPACITY: usize = 16;

const REFRESH_PATH: &str = "auth/refresh";

/// Session changes the front-end has to react to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    TokensRefreshed,
    /// Refresh failed; the session was cleared and the user must log in.
    SessionExpired { redirect_to: &'static str },
}

/// A file sent as multipart form data. Kept as bytes so the request can be
/// rebuilt for a replay.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: None,
            bytes,
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// Read a file from disk, guessing its type from the extension.
    pub fn from_path(path: &std::path::Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        let upload = Self::new(file_name, bytes);
        let mime = match path.extension().and_then(|e| e.to_str()).map(str::to_lowercase).as_deref() {
            Some("pdf") => Some("application/pdf"),
            Some("doc") => Some("application/msword"),
            Some("docx") => {
                Some("application/vnd.openxmlformats-officedocument.wordprocessingml.document")
            }
            Some("png") => Some("image/png"),
            Some("jpg") | Some("jpeg") => Some("image/jpeg"),
            Some("txt") => Some("text/plain"),
            _ => None,
        };
        Ok(match mime {
            Some(mime) => upload.with_mime_type(mime),
            None => upload,
        })
    }
}

#[derive(Debug, Clone)]
enum Body {
    Empty,
    Json(Value),
    Form(Vec<(String, String)>),
    Multipart {
        fields: Vec<(String, String)>,
        file: Upload,
    },
}

/// One logical API call, replayable after a token refresh.
#[derive(Debug, Clone)]
pub(crate) struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(&'static str, String)>,
    body: Body,
    /// Attach the session's bearer token and take part in refresh.
    authenticated: bool,
    /// Set once the request has been replayed after a 401.
    retried: bool,
}

impl ApiRequest {
    pub(crate) fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: Body::Empty,
            authenticated: true,
            retried: false,
        }
    }

    pub(crate) fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub(crate) fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub(crate) fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub(crate) fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub(crate) fn query(mut self, query: Vec<(&'static str, String)>) -> Self {
        self.query.extend(query);
        self
    }

    pub(crate) fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body)
            .map_err(|e| ApiError::InvalidRequest(format!("Failed to encode body for {}: {}", self.path, e)))?;
        self.body = Body::Json(value);
        Ok(self)
    }

    pub(crate) fn form(mut self, fields: &[(&str, &str)]) -> Self {
        self.body = Body::Form(
            fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        );
        self
    }

    pub(crate) fn multipart(mut self, fields: &[(&str, &str)], file: Upload) -> Self {
        self.body = Body::Multipart {
            fields: fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            file,
        };
        self
    }

    /// Send without credentials and never refresh (login, register).
    pub(crate) fn anonymous(mut self) -> Self {
        self.authenticated = false;
        self
    }
}

/// API client for the JobDen backend.
/// Clone is cheap - the HTTP pool, store and refresh queue are shared.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Arc<str>,
    store: Arc<dyn SessionStore>,
    refresh: Arc<RefreshCoordinator>,
    events: broadcast::Sender<AuthEvent>,
    /// Set once the stored session has been verified or replaced.
    resolved: Arc<AtomicBool>,
}

impl ApiClient {
    /// Create a client for `base_url` backed by `store`.
    pub fn new(base_url: impl Into<String>, store: Arc<dyn SessionStore>) -> Result<Self, ApiError> {
        Self::with_timeout(base_url, store, Duration::from_secs(REQUEST_TIMEOUT_SECS))
    }

    pub fn from_config(config: &Config, store: Arc<dyn SessionStore>) -> Result<Self, ApiError> {
        Self::with_timeout(config.api_base_url(), store, config.request_timeout())
    }

    pub fn with_timeout(
        base_url: impl Into<String>,
        store: Arc<dyn SessionStore>,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let base_url: String = base_url.into();
        let parsed = Url::parse(&base_url)
            .map_err(|e| ApiError::InvalidRequest(format!("Invalid API base URL '{}': {}", base_url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::InvalidRequest(format!(
                "API base URL must be http or https: {}",
                base_url
            )));
        }

        let http = Client::builder().timeout(timeout).build()?;
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Ok(Self {
            http,
            base_url: Arc::from(base_url.trim_end_matches('/')),
            store,
            refresh: Arc::new(RefreshCoordinator::new()),
            events,
            resolved: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Receive `AuthEvent`s emitted after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }

    /// Snapshot of the current session. Reports loading until
    /// `restore_session`, a login or a logout has resolved it.
    pub fn session(&self) -> Session {
        let session = self.store.get_session();
        if self.resolved.load(Ordering::Acquire) {
            session
        } else {
            session.unresolved()
        }
    }

    pub(crate) fn mark_resolved(&self) {
        self.resolved.store(true, Ordering::Release);
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    pub fn refresh_state(&self) -> RefreshState {
        self.refresh.state()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    // ===== Interceptors =====

    /// Build and send one attempt of `request` with `token` as bearer.
    async fn dispatch(&self, request: &ApiRequest, token: Option<&str>) -> Result<reqwest::Response, ApiError> {
        let mut builder = self.http.request(request.method.clone(), self.url(&request.path));

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }

        builder = match &request.body {
            Body::Empty => builder,
            Body::Json(value) => builder.json(value),
            Body::Form(fields) => builder.form(fields),
            Body::Multipart { fields, file } => {
                let mut part = multipart::Part::bytes(file.bytes.clone()).file_name(file.file_name.clone());
                if let Some(ref mime) = file.mime_type {
                    part = part.mime_str(mime)?;
                }
                let mut form = multipart::Form::new();
                for (name, value) in fields {
                    form = form.text(name.clone(), value.clone());
                }
                builder.multipart(form.part("file", part))
            }
        };

        debug!(
            method = %request.method,
            path = %request.path,
            authenticated = token.is_some(),
            retried = request.retried,
            "Sending request"
        );

        Ok(builder.send().await?)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    /// Send `request`, recovering from one expired access token.
    ///
    /// Each attempt reads the bearer token from the store, so the replay
    /// carries whatever token the refresh left behind.
    pub(crate) async fn execute(&self, mut request: ApiRequest) -> Result<reqwest::Response, ApiError> {
        loop {
            let sent_with = if request.authenticated {
                self.store.get_session().access_token().map(str::to_owned)
            } else {
                None
            };

            let response = self.dispatch(&request, sent_with.as_deref()).await?;
            if response.status() != StatusCode::UNAUTHORIZED {
                return Self::check_response(response).await;
            }

            // Unauthenticated requests surface the 401 as-is
            let Some(stale) = sent_with else {
                return Self::check_response(response).await;
            };
            if request.retried {
                warn!(path = %request.path, "Request rejected again after token refresh");
                return Self::check_response(response).await;
            }

            request.retried = true;
            self.recover_token(&stale).await?;
        }
    }

    /// Wait until the store holds an access token newer than `stale`,
    /// refreshing if nobody has.
    async fn recover_token(&self, stale: &str) -> Result<(), ApiError> {
        let store = Arc::clone(&self.store);
        let joined = self.refresh.join_unless_rotated(|| {
            store
                .get_session()
                .access_token()
                .filter(|current| *current != stale)
                .map(str::to_owned)
        });

        let rx = match joined {
            Joined::Rotated(_) => {
                debug!("Access token already rotated, replaying");
                return Ok(());
            }
            Joined::Queued(Ticket::Leader, rx) => {
                // Detached so a caller dropping its future cannot strand the queue
                let client = self.clone();
                tokio::spawn(async move {
                    let outcome = client.refresh_tokens().await;
                    let woken = client.refresh.finish(outcome);
                    debug!(woken, "Refresh queue drained");
                });
                rx
            }
            Joined::Queued(Ticket::Follower, rx) => rx,
        };

        match rx.await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(ApiError::SessionExpired(e)),
            Err(_) => Err(ApiError::SessionExpired(RefreshError::Abandoned)),
        }
    }

    /// Run the refresh call and apply its outcome to the session.
    async fn refresh_tokens(&self) -> Result<String, RefreshError> {
        let outcome = match self.request_new_tokens().await {
            Ok(pair) => self
                .store
                .update_tokens(pair.access_token.clone(), pair.refresh_token)
                .map(|()| pair.access_token)
                .map_err(|e| RefreshError::Storage(format!("{:#}", e))),
            Err(e) => Err(e),
        };

        match outcome {
            Ok(token) => {
                info!("Access token refreshed");
                let _ = self.events.send(AuthEvent::TokensRefreshed);
                Ok(token)
            }
            // Nothing left to clear: an earlier failure already expired the session
            Err(RefreshError::MissingRefreshToken) if self.store.get_session().access_token().is_none() => {
                debug!("No refresh token stored, session already cleared");
                Err(RefreshError::MissingRefreshToken)
            }
            Err(e) => {
                warn!(error = %e, "Token refresh failed, clearing session");
                if let Err(clear_err) = self.store.clear_session() {
                    error!(error = %clear_err, "Failed to clear session after refresh failure");
                }
                // No subscribers is fine
                let _ = self.events.send(AuthEvent::SessionExpired {
                    redirect_to: LOGIN_PATH,
                });
                Err(e)
            }
        }
    }

    /// `POST auth/refresh` with the refresh token as bearer. Bypasses the
    /// interceptors.
    async fn request_new_tokens(&self) -> Result<TokenPair, RefreshError> {
        let refresh_token = self
            .store
            .get_session()
            .refresh_token()
            .map(str::to_owned)
            .ok_or(RefreshError::MissingRefreshToken)?;

        let response = self
            .http
            .post(self.url(REFRESH_PATH))
            .bearer_auth(&refresh_token)
            .json(&serde_json::json!({}))
            .send()
            .await
            .map_err(|e| RefreshError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RefreshError::Rejected {
                status: status.as_u16(),
                message: ApiError::extract_message(&body),
            });
        }

        response
            .json::<TokenPair>()
            .await
            .map_err(|e| RefreshError::InvalidResponse(e.to_string()))
    }

    // ===== Typed helpers =====

    pub(crate) async fn send_json<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ApiError> {
        let path = request.path.clone();
        let response = self.execute(request).await?;
        let text = response.text().await?;
        serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse response from {}: {}", path, e)))
    }

    pub(crate) async fn send_unit(&self, request: ApiRequest) -> Result<(), ApiError> {
        self.execute(request).await?;
        Ok(())
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send_json(ApiRequest::get(path)).await
    }

    pub(crate) async fn get_with<T: DeserializeOwned>(
        &self,
        path: &str,
        query: Vec<(&'static str, String)>,
    ) -> Result<T, ApiError> {
        self.send_json(ApiRequest::get(path).query(query)).await
    }

    pub(crate) async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.send_json(ApiRequest::post(path).json(body)?).await
    }

    pub(crate) async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.send_json(ApiRequest::put(path).json(body)?).await
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.send_unit(ApiRequest::delete(path)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemorySessionStore;

    fn client(base: &str) -> Result<ApiClient, ApiError> {
        ApiClient::new(base, Arc::new(MemorySessionStore::new()))
    }

    #[test]
    fn test_url_joining() {
        let api = client("http://localhost:8000/api/v1/").expect("client");
        assert_eq!(api.base_url(), "http://localhost:8000/api/v1");
        assert_eq!(api.url("/jobs"), "http://localhost:8000/api/v1/jobs");
        assert_eq!(api.url("notifications/"), "http://localhost:8000/api/v1/notifications/");
    }

    #[test]
    fn test_rejects_bad_base_url() {
        assert!(matches!(client("not a url"), Err(ApiError::InvalidRequest(_))));
        assert!(matches!(client("ftp://example.com"), Err(ApiError::InvalidRequest(_))));
    }

    #[test]
    fn test_request_builders() {
        let request = ApiRequest::post("auth/login")
            .form(&[("username", "a@b.co"), ("password", "pw")])
            .anonymous();
        assert!(!request.authenticated);
        assert!(!request.retried);
        assert!(matches!(request.body, Body::Form(ref f) if f.len() == 2));

        let request = ApiRequest::get("jobs").query(vec![("limit", "5".to_string())]);
        assert_eq!(request.query, vec![("limit", "5".to_string())]);
        assert!(request.authenticated);
    }

    #[test]
    fn test_upload_from_path_guesses_mime() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("Resume.PDF");
        std::fs::write(&path, b"%PDF-1.4").expect("write");

        let upload = Upload::from_path(&path).expect("upload");
        assert_eq!(upload.file_name, "Resume.PDF");
        assert_eq!(upload.mime_type.as_deref(), Some("application/pdf"));
        assert_eq!(upload.bytes, b"%PDF-1.4");
    }
}

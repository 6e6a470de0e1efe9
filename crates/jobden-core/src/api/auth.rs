//! Registration, login and logout.

use tracing::{debug, info, warn};

use crate::auth::Session;
use crate::models::{RegisterRequest, TokenPair, UserSummary};

use super::client::ApiRequest;
use super::{ApiClient, ApiError};

impl ApiClient {
    /// Create an account. Does not log in.
    pub async fn register(&self, email: &str, password: &str, is_employer: bool) -> Result<UserSummary, ApiError> {
        let body = RegisterRequest {
            email: email.to_string(),
            password: password.to_string(),
            is_employer,
        };
        let user: UserSummary = self
            .send_json(ApiRequest::post("auth/register").json(&body)?.anonymous())
            .await?;
        info!(user_id = user.id, is_employer, "Account registered");
        Ok(user)
    }

    /// Exchange credentials for a token pair and resolve the user behind it.
    ///
    /// Tokens are stored first with a provisional user so `users/me` is sent
    /// authenticated. If the user cannot be resolved the session is cleared.
    pub async fn login(&self, email: &str, password: &str) -> Result<UserSummary, ApiError> {
        let request = ApiRequest::post("auth/login")
            .form(&[("username", email), ("password", password)])
            .anonymous();

        let tokens: TokenPair = match self.send_json(request).await {
            Ok(tokens) => tokens,
            Err(ApiError::Unauthorized) => return Err(ApiError::InvalidCredentials),
            Err(e) => return Err(e),
        };

        self.store().set_session(Session::authenticated(
            UserSummary::provisional(),
            tokens.access_token,
            tokens.refresh_token,
        ))?;

        match self.current_user().await {
            Ok(user) => {
                // Re-read so a refresh that raced this call is not undone
                let session = self.store().get_session().with_user(user.clone());
                self.store().set_session(session)?;
                self.mark_resolved();
                info!(user_id = user.id, role = ?user.role(), "Login successful");
                Ok(user)
            }
            Err(e) => {
                warn!(error = %e, "Failed to fetch user after login");
                if let Err(clear_err) = self.store().clear_session() {
                    warn!(error = %clear_err, "Failed to clear session");
                }
                Err(e)
            }
        }
    }

    /// `GET users/me`
    pub async fn current_user(&self) -> Result<UserSummary, ApiError> {
        self.get("users/me").await
    }

    /// Verify the persisted session at startup and resolve it.
    ///
    /// An authenticated session is checked with `users/me` and its user
    /// replaced. Any failure other than an unreachable backend clears the
    /// session. Afterwards `session()` no longer reports loading.
    pub async fn restore_session(&self) -> Result<Session, ApiError> {
        let outcome = self.verify_stored_session().await;
        self.mark_resolved();
        outcome.map(|()| self.session())
    }

    async fn verify_stored_session(&self) -> Result<(), ApiError> {
        if !self.store().get_session().is_authenticated() {
            debug!("No stored session to restore");
            return Ok(());
        }

        match self.current_user().await {
            Ok(user) => {
                let current = self.store().get_session();
                // A refresh failure during the lookup may already have cleared it
                if current.is_authenticated() {
                    info!(user_id = user.id, "Stored session restored");
                    self.store().set_session(current.with_user(user))?;
                }
                Ok(())
            }
            Err(ApiError::NetworkError(e)) => {
                warn!(error = %e, "Backend unreachable, keeping stored session");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Stored session rejected, clearing");
                self.store().clear_session()?;
                Ok(())
            }
        }
    }

    /// Forget the session locally.
    pub fn logout(&self) -> Result<(), ApiError> {
        self.store().clear_session()?;
        self.mark_resolved();
        info!("Logged out");
        Ok(())
    }
}

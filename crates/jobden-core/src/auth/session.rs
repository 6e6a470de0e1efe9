use serde::{Deserialize, Serialize};

use crate::models::{Role, UserSummary};

/// The locally persisted identity and credentials of the current user.
///
/// Fields are private so the authenticated flag can only be raised together
/// with both tokens. `is_loading` is runtime-only and never persisted.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "camelCase")]
pub struct Session {
    user: Option<UserSummary>,
    access_token: Option<String>,
    refresh_token: Option<String>,
    is_authenticated: bool,
    #[serde(skip)]
    is_loading: bool,
}

impl Session {
    /// Session at application start, before the store has been read.
    pub fn loading() -> Self {
        Self {
            is_loading: true,
            ..Self::default()
        }
    }

    /// Cleared session: no user, no tokens, resolved.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn authenticated(user: UserSummary, access_token: String, refresh_token: String) -> Self {
        Self {
            user: Some(user),
            access_token: Some(access_token),
            refresh_token: Some(refresh_token),
            is_authenticated: true,
            is_loading: false,
        }
    }

    /// Same identity with a rotated token pair.
    pub fn with_tokens(mut self, access_token: String, refresh_token: String) -> Self {
        self.access_token = Some(access_token);
        self.refresh_token = Some(refresh_token);
        self
    }

    /// The same record, flagged as not yet verified against the backend.
    pub fn unresolved(mut self) -> Self {
        self.is_loading = true;
        self
    }

    pub fn with_user(mut self, user: UserSummary) -> Self {
        self.user = Some(user);
        self
    }

    /// Restore the invariant on a record read from storage. A record that
    /// claims authentication without both tokens is discarded.
    pub fn normalized(mut self) -> Self {
        self.is_loading = false;
        if self.is_authenticated && (self.access_token.is_none() || self.refresh_token.is_none()) {
            return Self::empty();
        }
        self
    }

    pub fn user(&self) -> Option<&UserSummary> {
        self.user.as_ref()
    }

    pub fn role(&self) -> Option<Role> {
        self.user.as_ref().map(UserSummary::role)
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.is_authenticated
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }
}

// Never print tokens.
impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("user", &self.user)
            .field("has_access_token", &self.access_token.is_some())
            .field("has_refresh_token", &self.refresh_token.is_some())
            .field("is_authenticated", &self.is_authenticated)
            .field("is_loading", &self.is_loading)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeker() -> UserSummary {
        UserSummary {
            id: 1,
            email: "seeker@mail.com".to_string(),
            is_employer: false,
            is_active: true,
        }
    }

    #[test]
    fn test_authenticated_has_both_tokens() {
        let session = Session::authenticated(seeker(), "a1".to_string(), "r1".to_string());
        assert!(session.is_authenticated());
        assert_eq!(session.access_token(), Some("a1"));
        assert_eq!(session.refresh_token(), Some("r1"));
        assert_eq!(session.role(), Some(Role::JobSeeker));
    }

    #[test]
    fn test_with_tokens_keeps_user() {
        let session = Session::authenticated(seeker(), "a1".to_string(), "r1".to_string())
            .with_tokens("a2".to_string(), "r2".to_string());
        assert_eq!(session.access_token(), Some("a2"));
        assert_eq!(session.refresh_token(), Some("r2"));
        assert_eq!(session.user().map(|u| u.id), Some(1));
    }

    #[test]
    fn test_persisted_form_skips_loading() {
        let session = Session::authenticated(seeker(), "a1".to_string(), "r1".to_string());
        let json = serde_json::to_value(&session).expect("Failed to serialize session");
        assert_eq!(json["accessToken"], "a1");
        assert_eq!(json["isAuthenticated"], true);
        assert!(json.get("isLoading").is_none());

        let restored: Session = serde_json::from_value(json).expect("Failed to parse session");
        assert_eq!(restored.normalized(), session);
    }

    #[test]
    fn test_normalized_discards_broken_record() {
        let json = r#"{"user": null, "accessToken": "a1", "refreshToken": null, "isAuthenticated": true}"#;
        let session: Session = serde_json::from_str(json).expect("Failed to parse session");
        let session = session.normalized();
        assert!(!session.is_authenticated());
        assert!(session.access_token().is_none());
    }

    #[test]
    fn test_debug_hides_tokens() {
        let session = Session::authenticated(seeker(), "secret-a".to_string(), "secret-r".to_string());
        let rendered = format!("{:?}", session);
        assert!(!rendered.contains("secret-a"));
        assert!(rendered.contains("has_access_token: true"));
    }

    #[test]
    fn test_loading_then_empty() {
        assert!(Session::loading().is_loading());
        let empty = Session::empty();
        assert!(!empty.is_loading());
        assert!(!empty.is_authenticated());
        assert!(empty.user().is_none());
    }

    #[test]
    fn test_unresolved_keeps_credentials() {
        let session = Session::authenticated(seeker(), "a1".to_string(), "r1".to_string()).unresolved();
        assert!(session.is_loading());
        assert!(session.is_authenticated());
        assert_eq!(session.access_token(), Some("a1"));
        assert!(!session.normalized().is_loading());
    }
}

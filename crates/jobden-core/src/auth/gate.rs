//! Route authorization gate.
//!
//! Decides, from the session alone, whether a protected page may render.
//! The caller performs the navigation.

use crate::models::{Role, UserSummary};

use super::Session;

/// Entry point for unauthenticated users.
pub const LOGIN_PATH: &str = "/login";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    /// Session not resolved yet: show a placeholder, do not redirect.
    Loading,
    Allow,
    RedirectTo(&'static str),
}

/// Gate a page that requires an authenticated user, optionally of one role.
pub fn authorize(session: &Session, required_role: Option<Role>) -> Access {
    if session.is_loading() {
        return Access::Loading;
    }
    if !session.is_authenticated() {
        return Access::RedirectTo(LOGIN_PATH);
    }

    let Some(required) = required_role else {
        return Access::Allow;
    };

    match session.role() {
        Some(role) if role == required => Access::Allow,
        Some(role) => Access::RedirectTo(role.home_path()),
        // Tokens without a resolved identity cannot satisfy a role check
        None => Access::RedirectTo(LOGIN_PATH),
    }
}

/// Where to send a user right after logging in.
pub fn landing_path(user: &UserSummary) -> &'static str {
    user.role().home_path()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_for(is_employer: bool) -> Session {
        let user = UserSummary {
            id: 1,
            email: "u@mail.com".to_string(),
            is_employer,
            is_active: true,
        };
        Session::authenticated(user, "a".to_string(), "r".to_string())
    }

    #[test]
    fn test_loading_never_redirects() {
        let session = Session::loading();
        assert_eq!(authorize(&session, None), Access::Loading);
        assert_eq!(authorize(&session, Some(Role::Employer)), Access::Loading);
    }

    #[test]
    fn test_unauthenticated_goes_to_login() {
        let session = Session::empty();
        assert_eq!(authorize(&session, None), Access::RedirectTo("/login"));
        assert_eq!(authorize(&session, Some(Role::JobSeeker)), Access::RedirectTo("/login"));
    }

    #[test]
    fn test_wrong_role_goes_to_own_home() {
        assert_eq!(
            authorize(&session_for(false), Some(Role::Employer)),
            Access::RedirectTo("/job-seeker/jobs")
        );
        assert_eq!(
            authorize(&session_for(true), Some(Role::JobSeeker)),
            Access::RedirectTo("/employer/dashboard")
        );
    }

    #[test]
    fn test_matching_role_allowed() {
        assert_eq!(authorize(&session_for(true), Some(Role::Employer)), Access::Allow);
        assert_eq!(authorize(&session_for(false), Some(Role::JobSeeker)), Access::Allow);
        assert_eq!(authorize(&session_for(true), None), Access::Allow);
    }

    #[test]
    fn test_role_required_without_user() {
        let json = r#"{"user": null, "accessToken": "a", "refreshToken": "r", "isAuthenticated": true}"#;
        let session: Session = serde_json::from_str(json).expect("Failed to parse session");
        let session = session.normalized();
        assert_eq!(authorize(&session, None), Access::Allow);
        assert_eq!(authorize(&session, Some(Role::Employer)), Access::RedirectTo("/login"));
    }

    #[test]
    fn test_landing_path() {
        let user = UserSummary {
            id: 2,
            email: "boss@co.io".to_string(),
            is_employer: true,
            is_active: true,
        };
        assert_eq!(landing_path(&user), "/employer/dashboard");
    }
}

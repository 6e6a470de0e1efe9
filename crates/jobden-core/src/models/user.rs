//! Identity and credential records.

use serde::{Deserialize, Serialize};

/// The two kinds of account the board distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Employer,
    JobSeeker,
}

impl Role {
    /// Landing page for users of this role.
    pub fn home_path(self) -> &'static str {
        match self {
            Role::Employer => "/employer/dashboard",
            Role::JobSeeker => "/job-seeker/jobs",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Role::Employer => "Employer",
            Role::JobSeeker => "Job seeker",
        }
    }
}

/// The user record returned by `users/me` and `auth/register`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct UserSummary {
    pub id: i64,
    pub email: String,
    pub is_employer: bool,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl UserSummary {
    /// Placeholder identity used between receiving tokens and resolving `users/me`.
    pub fn provisional() -> Self {
        Self {
            id: 0,
            email: String::new(),
            is_employer: false,
            is_active: true,
        }
    }

    pub fn role(&self) -> Role {
        if self.is_employer {
            Role::Employer
        } else {
            Role::JobSeeker
        }
    }
}

/// Body of `auth/register`.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub is_employer: bool,
}

/// Token pair returned by `auth/login` and `auth/refresh`.
#[derive(Clone, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

// Tokens are credentials; keep them out of debug output and logs.
impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPair")
            .field("token_type", &self.token_type)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_from_user() {
        let mut user = UserSummary {
            id: 7,
            email: "hr@acme.io".to_string(),
            is_employer: true,
            is_active: true,
        };
        assert_eq!(user.role(), Role::Employer);
        assert_eq!(user.role().home_path(), "/employer/dashboard");

        user.is_employer = false;
        assert_eq!(user.role(), Role::JobSeeker);
        assert_eq!(user.role().home_path(), "/job-seeker/jobs");
    }

    #[test]
    fn test_parse_user_without_active_flag() {
        let user: UserSummary =
            serde_json::from_str(r#"{"id": 3, "email": "a@b.co", "is_employer": false}"#)
                .expect("Failed to parse user JSON");
        assert!(user.is_active);
        assert_eq!(user.role(), Role::JobSeeker);
    }

    #[test]
    fn test_token_pair_debug_hides_tokens() {
        let pair: TokenPair = serde_json::from_str(
            r#"{"access_token": "secret-a", "refresh_token": "secret-r", "token_type": "bearer"}"#,
        )
        .expect("Failed to parse token JSON");
        let rendered = format!("{:?}", pair);
        assert!(!rendered.contains("secret-a"));
        assert!(!rendered.contains("secret-r"));
        assert!(rendered.contains("bearer"));
    }
}

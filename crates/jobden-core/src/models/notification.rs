//! In-app notifications.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub message: String,
    #[serde(rename = "type", default)]
    pub kind: NotificationKind,
    pub is_read: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NotificationCreate {
    pub title: String,
    pub message: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<NotificationKind>,
}

#[derive(Debug, Clone, Default)]
pub struct NotificationFilters {
    pub skip: Option<u32>,
    pub limit: Option<u32>,
    pub unread_only: bool,
}

impl NotificationFilters {
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        // Zero values are left to the backend defaults
        if let Some(skip) = self.skip.filter(|s| *s > 0) {
            query.push(("skip", skip.to_string()));
        }
        if let Some(limit) = self.limit.filter(|l| *l > 0) {
            query.push(("limit", limit.to_string()));
        }
        if self.unread_only {
            query.push(("unread_only", "true".to_string()));
        }
        query
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct UnreadCount {
    pub unread_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MarkAllReadResponse {
    pub message: String,
    pub count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_filters_query() {
        let filters = NotificationFilters {
            skip: Some(0),
            limit: Some(10),
            unread_only: true,
        };
        assert_eq!(
            filters.to_query(),
            vec![("limit", "10".to_string()), ("unread_only", "true".to_string())]
        );
    }

    #[test]
    fn test_parse_notification_kind() {
        let json = r#"{"id": 1, "user_id": 2, "title": "Application update", "message": "Accepted!",
            "type": "success", "is_read": false, "created_at": "2024-01-01T00:00:00", "updated_at": "2024-01-01T00:00:00"}"#;
        let n: Notification = serde_json::from_str(json).expect("Failed to parse notification");
        assert_eq!(n.kind, NotificationKind::Success);
    }
}

use crate::models::{MarkAllReadResponse, Notification, NotificationCreate, NotificationFilters, UnreadCount};

use super::client::ApiRequest;
use super::{ApiClient, ApiError};

impl ApiClient {
    pub async fn list_notifications(&self, filters: &NotificationFilters) -> Result<Vec<Notification>, ApiError> {
        self.get_with("notifications/", filters.to_query()).await
    }

    pub async fn unread_count(&self) -> Result<u64, ApiError> {
        let count: UnreadCount = self.get("notifications/unread-count").await?;
        Ok(count.unread_count)
    }

    pub async fn mark_notification_read(&self, id: i64) -> Result<Notification, ApiError> {
        self.send_json(ApiRequest::put(format!("notifications/{}/read", id)))
            .await
    }

    pub async fn mark_all_notifications_read(&self) -> Result<MarkAllReadResponse, ApiError> {
        self.send_json(ApiRequest::put("notifications/mark-all-read"))
            .await
    }

    pub async fn delete_notification(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("notifications/{}", id)).await
    }

    pub async fn create_notification(&self, notification: &NotificationCreate) -> Result<Notification, ApiError> {
        self.post("notifications/", notification).await
    }
}

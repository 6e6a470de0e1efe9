use serde::{Deserialize, Serialize};

use crate::models::Bookmark;

use super::{ApiClient, ApiError};

#[derive(Debug, Serialize)]
struct BookmarkRequest {
    job_id: i64,
}

#[derive(Debug, Deserialize)]
struct BookmarkStatus {
    is_bookmarked: bool,
}

impl ApiClient {
    pub async fn list_bookmarks(&self, skip: u32, limit: u32) -> Result<Vec<Bookmark>, ApiError> {
        self.get_with(
            "bookmarks",
            vec![("skip", skip.to_string()), ("limit", limit.to_string())],
        )
        .await
    }

    pub async fn add_bookmark(&self, job_id: i64) -> Result<Bookmark, ApiError> {
        self.post("bookmarks", &BookmarkRequest { job_id }).await
    }

    /// Remove the bookmark on `job_id` (keyed by job, not bookmark id).
    pub async fn remove_bookmark(&self, job_id: i64) -> Result<(), ApiError> {
        self.delete(&format!("bookmarks/{}", job_id)).await
    }

    /// A 404 counts as "not bookmarked".
    pub async fn is_bookmarked(&self, job_id: i64) -> Result<bool, ApiError> {
        match self
            .get::<BookmarkStatus>(&format!("bookmarks/check/{}", job_id))
            .await
        {
            Ok(status) => Ok(status.is_bookmarked),
            Err(ApiError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

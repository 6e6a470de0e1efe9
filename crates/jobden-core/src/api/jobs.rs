use serde::Deserialize;

use crate::models::{CreateJob, Job, JobFilters, UpdateJob};

use super::{ApiClient, ApiError};

#[derive(Debug, Deserialize)]
struct AppliedStatus {
    is_applied: bool,
}

impl ApiClient {
    /// Search active postings.
    pub async fn list_jobs(&self, filters: &JobFilters) -> Result<Vec<Job>, ApiError> {
        self.get_with("jobs", filters.to_query()).await
    }

    pub async fn get_job(&self, id: i64) -> Result<Job, ApiError> {
        self.get(&format!("jobs/{}", id)).await
    }

    pub async fn create_job(&self, job: &CreateJob) -> Result<Job, ApiError> {
        self.post("jobs", job).await
    }

    pub async fn update_job(&self, id: i64, changes: &UpdateJob) -> Result<Job, ApiError> {
        self.put(&format!("jobs/{}", id), changes).await
    }

    pub async fn delete_job(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&format!("jobs/{}", id)).await
    }

    /// Whether the current user already applied. A 404 counts as "no".
    pub async fn has_applied(&self, job_id: i64) -> Result<bool, ApiError> {
        match self
            .get::<AppliedStatus>(&format!("applications/check/{}", job_id))
            .await
        {
            Ok(status) => Ok(status.is_applied),
            Err(ApiError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

use crate::models::{
    ApplicationStatus, CreateEmployerProfile, DashboardStats, EmployerJobFilters, EmployerProfile,
    EmployerProfileWithStats, Job, JobApplicantsResponse, StatusUpdateResponse, UpdateEmployerProfile,
};

use super::client::ApiRequest;
use super::{ApiClient, ApiError};

impl ApiClient {
    // ===== Company profile =====

    pub async fn get_employer_profile(&self) -> Result<EmployerProfile, ApiError> {
        self.get("employer/profile").await
    }

    /// Public company profile of another employer.
    pub async fn get_employer_profile_by_user(&self, user_id: i64) -> Result<EmployerProfile, ApiError> {
        self.get(&format!("employer/profile/{}", user_id)).await
    }

    pub async fn get_employer_profile_with_stats(&self) -> Result<EmployerProfileWithStats, ApiError> {
        self.get("employer/profile/stats").await
    }

    pub async fn create_employer_profile(&self, profile: &CreateEmployerProfile) -> Result<EmployerProfile, ApiError> {
        self.post("employer/profile", profile).await
    }

    pub async fn update_employer_profile(&self, changes: &UpdateEmployerProfile) -> Result<EmployerProfile, ApiError> {
        self.put("employer/profile", changes).await
    }

    pub async fn dashboard_stats(&self) -> Result<DashboardStats, ApiError> {
        self.get("employer/dashboard/statistics").await
    }

    // ===== Postings and applicants =====

    pub async fn list_my_jobs(&self, filters: &EmployerJobFilters) -> Result<Vec<Job>, ApiError> {
        self.get_with("employer/jobs", filters.to_query()).await
    }

    pub async fn list_applicants(&self, job_id: i64, skip: u32, limit: u32) -> Result<JobApplicantsResponse, ApiError> {
        self.get_with(
            &format!("employer/jobs/{}/applicants", job_id),
            vec![("skip", skip.to_string()), ("limit", limit.to_string())],
        )
        .await
    }

    /// Move an application through review. Withdrawal is the applicant's call.
    pub async fn set_application_status(
        &self,
        application_id: i64,
        status: ApplicationStatus,
    ) -> Result<StatusUpdateResponse, ApiError> {
        if !status.is_employer_settable() {
            return Err(ApiError::InvalidRequest(format!(
                "Employers cannot set status '{}'",
                status
            )));
        }
        let request = ApiRequest::put(format!("employer/applications/{}/status", application_id))
            .query(vec![("status", status.as_str().to_string())]);
        self.send_json(request).await
    }
}

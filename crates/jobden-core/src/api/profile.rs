use crate::models::{JobSeekerProfile, ProfileWithStats, UpdateProfile, UploadedFile};

use super::client::ApiRequest;
use super::{ApiClient, ApiError, Upload};

impl ApiClient {
    pub async fn get_profile(&self) -> Result<JobSeekerProfile, ApiError> {
        self.get("job-seeker/profile").await
    }

    pub async fn get_profile_with_stats(&self) -> Result<ProfileWithStats, ApiError> {
        self.get("job-seeker/profile/stats").await
    }

    pub async fn create_profile(&self, profile: &UpdateProfile) -> Result<JobSeekerProfile, ApiError> {
        self.post("job-seeker/profile", profile).await
    }

    pub async fn update_profile(&self, changes: &UpdateProfile) -> Result<JobSeekerProfile, ApiError> {
        self.put("job-seeker/profile", changes).await
    }

    pub async fn upload_resume(&self, file: Upload) -> Result<UploadedFile, ApiError> {
        self.send_json(ApiRequest::post("job-seeker/profile/upload-resume").multipart(&[], file))
            .await
    }

    pub async fn upload_profile_picture(&self, file: Upload) -> Result<UploadedFile, ApiError> {
        self.send_json(ApiRequest::post("job-seeker/profile/upload-picture").multipart(&[], file))
            .await
    }
}

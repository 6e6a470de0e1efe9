//! Employer-side records: company profile, dashboard numbers, applicants.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployerProfile {
    pub id: i64,
    pub user_id: i64,
    pub company_name: String,
    pub company_website: Option<String>,
    pub company_description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployerProfileWithStats {
    #[serde(flatten)]
    pub profile: EmployerProfile,
    pub total_jobs: u64,
    pub active_jobs: u64,
    pub total_applications: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateEmployerProfile {
    pub company_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateEmployerProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_jobs: u64,
    pub active_jobs: u64,
    pub total_applications: u64,
    #[serde(default)]
    pub pending_applications: Option<u64>,
}

/// The applicant's public profile as shown to an employer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Applicant {
    pub user_id: i64,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub resume_url: Option<String>,
    #[serde(default)]
    pub skills: Option<String>,
    #[serde(default)]
    pub experience: Option<String>,
    #[serde(default)]
    pub education: Option<String>,
    #[serde(default)]
    pub profile_picture_url: Option<String>,
}

impl Applicant {
    /// Full name if the applicant filled in a profile, otherwise the email.
    pub fn display_name(&self) -> &str {
        match self.full_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.email,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobApplicant {
    pub application_id: i64,
    pub applied_at: String,
    pub cover_letter: Option<String>,
    pub status: String,
    pub applicant: Applicant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobApplicantsResponse {
    pub job_id: i64,
    pub total_applicants: u64,
    pub applicants: Vec<JobApplicant>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusUpdateResponse {
    pub message: String,
    pub application_id: i64,
    pub new_status: String,
}

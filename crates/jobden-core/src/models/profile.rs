//! Job seeker profile records.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSeekerProfile {
    pub id: i64,
    pub user_id: i64,
    pub full_name: String,
    pub bio: Option<String>,
    pub resume_url: Option<String>,
    pub education: Option<String>,
    pub experience: Option<String>,
    pub skills: Option<String>,
    pub profile_picture_url: Option<String>,
}

impl JobSeekerProfile {
    /// Skills split from the comma-separated field.
    pub fn skill_list(&self) -> Vec<&str> {
        self.skills
            .as_deref()
            .unwrap_or("")
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileStats {
    pub total_applications: u64,
    pub total_bookmarks: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileWithStats {
    #[serde(flatten)]
    pub profile: JobSeekerProfile,
    #[serde(flatten)]
    pub stats: ProfileStats,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub education: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skills: Option<String>,
}

/// Response of the resume and picture upload endpoints.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UploadedFile {
    pub message: String,
    #[serde(alias = "resume_url", alias = "profile_picture_url")]
    pub url: String,
}

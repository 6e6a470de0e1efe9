//! Job applications and their attached documents.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::QuestionAnswer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Reviewed,
    Accepted,
    Rejected,
    Withdrawn,
}

impl ApplicationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Reviewed => "reviewed",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Withdrawn => "withdrawn",
        }
    }

    /// Statuses an employer may set. Withdrawal belongs to the applicant.
    pub fn is_employer_settable(self) -> bool {
        !matches!(self, ApplicationStatus::Withdrawn)
    }

    /// Whether the applicant can still withdraw.
    pub fn can_withdraw(self) -> bool {
        matches!(self, ApplicationStatus::Pending | ApplicationStatus::Reviewed)
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(ApplicationStatus::Pending),
            "reviewed" => Ok(ApplicationStatus::Reviewed),
            "accepted" => Ok(ApplicationStatus::Accepted),
            "rejected" => Ok(ApplicationStatus::Rejected),
            "withdrawn" => Ok(ApplicationStatus::Withdrawn),
            other => Err(format!("unknown application status '{}'", other)),
        }
    }
}

/// Job summary embedded in an application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct ApplicationJob {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub location: Option<String>,
    pub salary: Option<f64>,
    pub job_type: Option<String>,
    #[serde(default)]
    pub company_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct ApplicationDocument {
    pub id: i64,
    pub application_id: i64,
    pub document_type: String,
    pub document_url: String,
    pub file_name: String,
    pub uploaded_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Application {
    pub id: i64,
    pub user_id: i64,
    pub job_id: i64,
    pub cover_letter: Option<String>,
    pub status: ApplicationStatus,
    pub applied_at: String,
    pub updated_at: String,
    #[serde(default)]
    pub job: Option<ApplicationJob>,
    #[serde(default)]
    pub documents: Vec<ApplicationDocument>,
    #[serde(default)]
    pub question_answers: Option<Vec<QuestionAnswer>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateApplication {
    pub job_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_letter: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub question_answers: Vec<QuestionAnswer>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateApplication {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_letter: Option<String>,
}

/// Kinds of document an applicant can attach.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentType {
    Resume,
    Portfolio,
    CoverLetter,
}

impl DocumentType {
    pub fn as_str(self) -> &'static str {
        match self {
            DocumentType::Resume => "resume",
            DocumentType::Portfolio => "portfolio",
            DocumentType::CoverLetter => "cover_letter",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status() {
        assert_eq!("Accepted".parse::<ApplicationStatus>(), Ok(ApplicationStatus::Accepted));
        assert_eq!(" pending ".parse::<ApplicationStatus>(), Ok(ApplicationStatus::Pending));
        assert!("hired".parse::<ApplicationStatus>().is_err());
    }

    #[test]
    fn test_status_rules() {
        assert!(ApplicationStatus::Pending.can_withdraw());
        assert!(!ApplicationStatus::Accepted.can_withdraw());
        assert!(ApplicationStatus::Rejected.is_employer_settable());
        assert!(!ApplicationStatus::Withdrawn.is_employer_settable());
    }

    #[test]
    fn test_parse_application() {
        let json = r#"{
            "id": 5, "user_id": 2, "job_id": 9, "cover_letter": null, "status": "reviewed",
            "applied_at": "2024-05-01T08:00:00", "updated_at": "2024-05-02T08:00:00",
            "job": {"id": 9, "title": "QA", "description": "", "location": "Remote", "salary": null, "job_type": "contract"},
            "documents": [{"id": 1, "application_id": 5, "document_type": "resume", "document_url": "https://files/r.pdf", "file_name": "r.pdf", "uploaded_at": "2024-05-01T08:01:00"}]
        }"#;
        let app: Application = serde_json::from_str(json).expect("Failed to parse application");
        assert_eq!(app.status, ApplicationStatus::Reviewed);
        assert_eq!(app.documents.len(), 1);
        assert_eq!(app.job.as_ref().map(|j| j.title.as_str()), Some("QA"));
        assert!(app.question_answers.is_none());
    }
}

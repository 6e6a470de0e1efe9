use serde::{Deserialize, Serialize};

use super::Job;

/// A job saved by a job seeker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: i64,
    pub user_id: i64,
    pub job_id: i64,
    pub created_at: String,
    pub job: Job,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bookmark() {
        let json = r#"{"id": 1, "user_id": 2, "job_id": 3, "created_at": "2024-01-01T00:00:00",
            "job": {"id": 3, "title": "SRE", "description": "<p>Keep it up</p>", "location": "Berlin",
                    "salary": null, "job_type": "full_time", "requirements": null, "is_active": true,
                    "created_at": "2023-12-01T00:00:00", "employer_id": 8}}"#;
        let bookmark: Bookmark = serde_json::from_str(json).expect("Failed to parse bookmark");
        assert_eq!(bookmark.job.title, "SRE");
        assert_eq!(bookmark.job_id, bookmark.job.id);
    }
}

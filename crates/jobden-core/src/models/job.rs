//! Job postings and the filters used to search them.

use serde::{Deserialize, Serialize};

use super::CustomQuestion;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Job {
    pub id: i64,
    pub title: String,
    /// HTML produced by the rich-text editor.
    pub description: String,
    pub location: Option<String>,
    pub salary: Option<f64>,
    pub job_type: Option<String>,
    pub requirements: Option<String>,
    pub is_active: bool,
    pub created_at: String,
    pub employer_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_questions: Option<Vec<CustomQuestion>>,
}

impl Job {
    pub fn questions(&self) -> &[CustomQuestion] {
        self.custom_questions.as_deref().unwrap_or(&[])
    }
}

/// Search filters for `GET jobs`. Unset fields are omitted from the query.
#[derive(Debug, Clone, Default)]
pub struct JobFilters {
    pub location: Option<String>,
    pub job_type: Option<String>,
    pub min_salary: Option<f64>,
    pub search: Option<String>,
    pub skip: Option<u32>,
    pub limit: Option<u32>,
}

impl JobFilters {
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(ref location) = self.location {
            if !location.is_empty() {
                query.push(("location", location.clone()));
            }
        }
        if let Some(ref job_type) = self.job_type {
            if !job_type.is_empty() {
                query.push(("job_type", job_type.clone()));
            }
        }
        // Zero means "no minimum"
        if let Some(min_salary) = self.min_salary {
            if min_salary > 0.0 {
                query.push(("min_salary", min_salary.to_string()));
            }
        }
        if let Some(ref search) = self.search {
            if !search.is_empty() {
                query.push(("search", search.clone()));
            }
        }
        if let Some(skip) = self.skip {
            query.push(("skip", skip.to_string()));
        }
        if let Some(limit) = self.limit {
            query.push(("limit", limit.to_string()));
        }
        query
    }
}

/// Filters for an employer's own postings.
#[derive(Debug, Clone, Default)]
pub struct EmployerJobFilters {
    pub active_only: Option<bool>,
    pub skip: Option<u32>,
    pub limit: Option<u32>,
}

impl EmployerJobFilters {
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(active_only) = self.active_only {
            query.push(("active_only", active_only.to_string()));
        }
        if let Some(skip) = self.skip {
            query.push(("skip", skip.to_string()));
        }
        if let Some(limit) = self.limit {
            query.push(("limit", limit.to_string()));
        }
        query
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateJob {
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requirements: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub custom_questions: Vec<CustomQuestion>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateJob {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requirements: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

//! Client-side form validation.
//!
//! Checks run before anything is sent. Each failure names the offending
//! field so the front-end can show it next to the input.

use std::fmt;

use reqwest::Url;
use thiserror::Error;

use crate::models::{CreateJob, CustomQuestion, QuestionAnswer, QuestionType};
use crate::utils::strip_html;

const MIN_PASSWORD_LENGTH: usize = 8;
const MIN_TITLE_LENGTH: usize = 5;
const MIN_DESCRIPTION_LENGTH: usize = 50;
const MIN_CHOICE_OPTIONS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Every failure found in one form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.push(ValidationError::new(field, message));
    }

    fn absorb(&mut self, result: Result<(), ValidationError>) {
        if let Err(e) = result {
            self.0.push(e);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.0
    }

    /// First message for `field`, if any.
    pub fn for_field(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    fn into_result(self) -> Result<(), ValidationErrors> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        f.write_str(&lines.join("\n"))
    }
}

impl std::error::Error for ValidationErrors {}

pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    let invalid = || ValidationError::new("email", "Invalid email address");
    let email = email.trim();

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') || email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (name, tld) = domain.rsplit_once('.').ok_or_else(invalid)?;
    if name.is_empty() || tld.len() < 2 || domain.starts_with('.') || domain.contains("..") {
        return Err(invalid());
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    let fail = |message: &str| Err(ValidationError::new("password", message));

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return fail("Password must be at least 8 characters");
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return fail("Password must contain at least one uppercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return fail("Password must contain at least one lowercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return fail("Password must contain at least one number");
    }
    if !password.chars().any(|c| !c.is_ascii_alphanumeric()) {
        return fail("Password must contain at least one special character");
    }
    Ok(())
}

/// Optional `+`, then 10 to 15 digits, the first one non-zero.
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    let digits = phone.strip_prefix('+').unwrap_or(phone);
    let valid = (10..=15).contains(&digits.len())
        && digits.chars().all(|c| c.is_ascii_digit())
        && !digits.starts_with('0');
    if valid {
        Ok(())
    } else {
        Err(ValidationError::new("phone", "Invalid phone number"))
    }
}

pub fn validate_url(url: &str) -> Result<(), ValidationError> {
    match Url::parse(url.trim()) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") && parsed.host().is_some() => Ok(()),
        _ => Err(ValidationError::new("url", "Invalid URL")),
    }
}

/// Sign-up form: email, password rules, and matching confirmation.
pub fn validate_registration(email: &str, password: &str, confirm_password: &str) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    errors.absorb(validate_email(email));
    errors.absorb(validate_password(password));
    if password != confirm_password {
        errors.push("confirm_password", "Passwords don't match");
    }
    errors.into_result()
}

/// Job posting form, including the custom questionnaire.
pub fn validate_job_posting(job: &CreateJob) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();

    if job.title.trim().chars().count() < MIN_TITLE_LENGTH {
        errors.push("title", "Title must be at least 5 characters");
    }
    // Descriptions come from the rich-text editor; count visible text only
    if strip_html(&job.description).chars().count() < MIN_DESCRIPTION_LENGTH {
        errors.push("description", "Description must be at least 50 characters");
    }
    if let Some(salary) = job.salary {
        if !salary.is_finite() || salary < 0.0 {
            errors.push("salary", "Salary must be a positive number");
        }
    }

    for (i, question) in job.custom_questions.iter().enumerate() {
        let field = format!("custom_questions[{}]", i);
        if question.question.trim().is_empty() {
            errors.push(field.as_str(), "Question text is required");
        }
        if question.kind == QuestionType::MultipleChoice {
            let options = question.options().iter().filter(|o| !o.trim().is_empty()).count();
            if options < MIN_CHOICE_OPTIONS {
                errors.push(field.as_str(), "Multiple choice questions need at least 2 options");
            }
        }
    }

    errors.into_result()
}

/// Answers to a posting's questionnaire, matched by question id.
pub fn validate_answers(questions: &[CustomQuestion], answers: &[QuestionAnswer]) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();

    for question in questions {
        let answer = answers
            .iter()
            .find(|a| a.question_id == question.id)
            .map(|a| a.answer.trim())
            .unwrap_or("");
        let field = format!("question:{}", question.id);

        if answer.is_empty() {
            if question.required {
                errors.push(field, "This question is required");
            }
            continue;
        }

        match question.kind {
            QuestionType::MultipleChoice => {
                if !question.options().iter().any(|o| o == answer) {
                    errors.push(field, "Choose one of the listed options");
                }
            }
            QuestionType::YesNo => {
                if !matches!(answer.to_lowercase().as_str(), "yes" | "no") {
                    errors.push(field, "Answer yes or no");
                }
            }
            QuestionType::ShortAnswer | QuestionType::LongAnswer => {}
        }
    }

    errors.into_result()
}

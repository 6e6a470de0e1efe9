//! Custom application questions attached to job postings.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    ShortAnswer,
    LongAnswer,
    MultipleChoice,
    YesNo,
}

impl QuestionType {
    pub fn label(self) -> &'static str {
        match self {
            QuestionType::ShortAnswer => "Short answer",
            QuestionType::LongAnswer => "Long answer",
            QuestionType::MultipleChoice => "Multiple choice",
            QuestionType::YesNo => "Yes / No",
        }
    }
}

/// A question an employer asks every applicant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct CustomQuestion {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: QuestionType,
    pub question: String,
    #[serde(default)]
    pub required: bool,
    /// Only meaningful for multiple choice.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

impl CustomQuestion {
    pub fn options(&self) -> &[String] {
        self.options.as_deref().unwrap_or(&[])
    }

    /// An empty answer pre-filled for this question.
    pub fn blank_answer(&self) -> QuestionAnswer {
        QuestionAnswer {
            question_id: self.id.clone(),
            question: self.question.clone(),
            answer: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct QuestionAnswer {
    pub question_id: String,
    pub question: String,
    pub answer: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_multiple_choice_question() {
        let json = r#"{"id": "q1", "type": "multiple_choice", "question": "Shift?", "required": true, "options": ["Day", "Night"]}"#;
        let q: CustomQuestion = serde_json::from_str(json).expect("Failed to parse question");
        assert_eq!(q.kind, QuestionType::MultipleChoice);
        assert_eq!(q.options(), ["Day".to_string(), "Night".to_string()]);

        let blank = q.blank_answer();
        assert_eq!(blank.question_id, "q1");
        assert!(blank.answer.is_empty());
    }

    #[test]
    fn test_question_without_options_serializes_without_field() {
        let q = CustomQuestion {
            id: "q2".to_string(),
            kind: QuestionType::YesNo,
            question: "Can you relocate?".to_string(),
            required: false,
            options: None,
        };
        let json = serde_json::to_value(&q).expect("Failed to serialize question");
        assert_eq!(json["type"], "yes_no");
        assert!(json.get("options").is_none());
    }
}

//! Evaluation datasets: questions paired with reference contexts and answers.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{EvalError, Result};

/// One evaluation case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalCase {
    /// The question posed to the system.
    pub question: String,
    /// Passages that a good retrieval should surface.
    pub reference_contexts: Vec<String>,
    /// The expected answer.
    pub reference_answer: String,
}

/// A named collection of evaluation cases.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalDataset {
    /// Dataset name, used in logs and report headers.
    pub name: String,
    /// The cases, evaluated in order.
    pub cases: Vec<EvalCase>,
}

impl EvalDataset {
    /// Create a dataset from cases.
    pub fn new(name: impl Into<String>, cases: Vec<EvalCase>) -> Self {
        Self { name: name.into(), cases }
    }

    /// Load a dataset from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        serde_json::from_str(&raw).map_err(|e| EvalError::Dataset(e.to_string()))
    }

    /// Built-in Korean academic-regulations demo set.
    ///
    /// Small enough to run in-process against an index seeded with the same
    /// reference passages.
    pub fn korean_demo() -> Self {
        let case = |question: &str, contexts: &[&str], answer: &str| EvalCase {
            question: question.to_string(),
            reference_contexts: contexts.iter().map(|c| c.to_string()).collect(),
            reference_answer: answer.to_string(),
        };
        Self::new(
            "korean-academic-regulations",
            vec![
                case(
                    "조기졸업 요건이 뭐야?",
                    &["조기졸업을 신청하려면 평량평균이 3.75 이상이어야 한다."],
                    "조기졸업을 신청하려면 평량평균이 3.75 이상이어야 합니다.",
                ),
                case(
                    "수강신청은 언제 해?",
                    &["수강신청은 매 학기 초 지정된 기간에 진행된다."],
                    "수강신청은 매 학기 초 지정된 기간에 진행됩니다.",
                ),
                case(
                    "도서관은 몇 시까지 열어?",
                    &["중앙도서관은 시험 기간에 24시간 개방된다."],
                    "중앙도서관은 시험 기간에 24시간 개방됩니다.",
                ),
                case(
                    "휴학은 최대 몇 학기까지 가능해?",
                    &["일반휴학은 통산 6학기를 초과할 수 없다."],
                    "일반휴학은 통산 6학기를 초과할 수 없습니다.",
                ),
                case(
                    "장학금 신청 기준이 어떻게 돼?",
                    &["성적우수 장학금은 직전 학기 평량평균 3.5 이상인 학생에게 지급된다."],
                    "성적우수 장학금은 직전 학기 평량평균이 3.5 이상이어야 합니다.",
                ),
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EvalError;

    #[test]
    fn datasets_round_trip_through_json_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("demo.json");
        let dataset = EvalDataset::korean_demo();
        std::fs::write(&path, serde_json::to_string_pretty(&dataset).unwrap()).unwrap();

        let loaded = EvalDataset::from_json_file(&path).unwrap();
        assert_eq!(loaded.name, dataset.name);
        assert_eq!(loaded.cases.len(), dataset.cases.len());
        assert_eq!(loaded.cases[0].question, "조기졸업 요건이 뭐야?");
    }

    #[test]
    fn malformed_dataset_files_are_reported_as_such() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{\"name\": 42}").unwrap();
        assert!(matches!(EvalDataset::from_json_file(&path), Err(EvalError::Dataset(_))));
    }

    #[test]
    fn missing_dataset_files_surface_io_errors() {
        let missing = std::path::Path::new("/nonexistent/dataset.json");
        assert!(matches!(EvalDataset::from_json_file(missing), Err(EvalError::Io(_))));
    }
}

//! Deterministic retrieval-quality metrics.
//!
//! All four metrics score in [0, 1]. The lexical ones work on unicode
//! alphanumeric tokens, so they apply to Hangul text as well as English;
//! answer relevancy compares embeddings instead, since a question and its
//! answer rarely share surface tokens.

use std::collections::BTreeSet;

/// A reference context counts as recovered when this fraction of its tokens
/// appears in the retrieved text.
const COVERAGE_THRESHOLD: f64 = 0.5;

/// The four metric scores for one evaluation case.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricScores {
    /// Fraction of reference contexts recovered by retrieval.
    pub context_recall: f64,
    /// Fraction of retrieved passages relevant to some reference context.
    pub context_precision: f64,
    /// Fraction of answer tokens grounded in the retrieved passages.
    pub faithfulness: f64,
    /// Embedding similarity between question and answer, clamped to [0, 1].
    pub answer_relevancy: f64,
}

/// Lowercased unicode-alphanumeric tokens of a text.
fn tokens(text: &str) -> BTreeSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}

/// Fraction of `reference` tokens present in `pool`.
fn coverage(reference: &BTreeSet<String>, pool: &BTreeSet<String>) -> f64 {
    if reference.is_empty() {
        return 0.0;
    }
    let hits = reference.intersection(pool).count();
    hits as f64 / reference.len() as f64
}

/// Fraction of reference contexts recovered by the retrieved passages.
///
/// No reference contexts means there is nothing to recover, scored 1.0;
/// no retrieved passages scores 0.0.
pub fn context_recall(retrieved: &[String], reference_contexts: &[String]) -> f64 {
    if reference_contexts.is_empty() {
        return 1.0;
    }
    if retrieved.is_empty() {
        return 0.0;
    }
    let pool = tokens(&retrieved.join(" "));
    let recovered = reference_contexts
        .iter()
        .filter(|reference| coverage(&tokens(reference), &pool) >= COVERAGE_THRESHOLD)
        .count();
    recovered as f64 / reference_contexts.len() as f64
}

/// Fraction of retrieved passages that substantially overlap some reference
/// context. Empty retrieval scores 0.0.
pub fn context_precision(retrieved: &[String], reference_contexts: &[String]) -> f64 {
    if retrieved.is_empty() {
        return 0.0;
    }
    let references: Vec<BTreeSet<String>> =
        reference_contexts.iter().map(|r| tokens(r)).collect();
    let relevant = retrieved
        .iter()
        .filter(|passage| {
            let passage_tokens = tokens(passage);
            references
                .iter()
                .any(|reference| coverage(reference, &passage_tokens) >= COVERAGE_THRESHOLD)
        })
        .count();
    relevant as f64 / retrieved.len() as f64
}

/// Fraction of answer tokens that appear in the retrieved passages.
///
/// An empty answer or empty retrieval scores 0.0 — an unsupported answer is
/// the failure mode this metric exists to catch.
pub fn faithfulness(answer: &str, retrieved: &[String]) -> f64 {
    if retrieved.is_empty() {
        return 0.0;
    }
    let answer_tokens = tokens(answer);
    if answer_tokens.is_empty() {
        return 0.0;
    }
    coverage(&answer_tokens, &tokens(&retrieved.join(" ")))
}

/// Cosine similarity of two embeddings, clamped to [0, 1].
pub fn answer_relevancy(question_embedding: &[f32], answer_embedding: &[f32]) -> f64 {
    let dot: f64 = question_embedding
        .iter()
        .zip(answer_embedding)
        .map(|(a, b)| f64::from(*a) * f64::from(*b))
        .sum();
    let norm_q: f64 = question_embedding.iter().map(|x| f64::from(*x).powi(2)).sum::<f64>().sqrt();
    let norm_a: f64 = answer_embedding.iter().map(|x| f64::from(*x).powi(2)).sum::<f64>().sqrt();
    if norm_q == 0.0 || norm_a == 0.0 {
        return 0.0;
    }
    (dot / (norm_q * norm_a)).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recall_is_full_when_the_gold_passage_is_retrieved_verbatim() {
        let gold = vec!["조기졸업을 신청하려면 평량평균이 3.75 이상이어야 한다.".to_string()];
        let retrieved = gold.clone();
        assert_eq!(context_recall(&retrieved, &gold), 1.0);
    }

    #[test]
    fn recall_is_zero_for_unrelated_retrieval() {
        let gold = vec!["조기졸업을 신청하려면 평량평균이 3.75 이상이어야 한다.".to_string()];
        let retrieved = vec!["the library opens at nine in the morning".to_string()];
        assert_eq!(context_recall(&retrieved, &gold), 0.0);
    }

    #[test]
    fn empty_edges_follow_the_contract() {
        let some = vec!["a b c".to_string()];
        assert_eq!(context_recall(&[], &some), 0.0);
        assert_eq!(context_recall(&some, &[]), 1.0);
        assert_eq!(context_precision(&[], &some), 0.0);
        assert_eq!(faithfulness("anything", &[]), 0.0);
        assert_eq!(faithfulness("", &some), 0.0);
    }

    #[test]
    fn precision_counts_only_relevant_passages() {
        let gold = vec!["수강신청은 매 학기 초 지정된 기간에 진행된다.".to_string()];
        let retrieved = vec![
            "수강신청은 매 학기 초 지정된 기간에 진행된다.".to_string(),
            "completely unrelated football commentary".to_string(),
        ];
        assert_eq!(context_precision(&retrieved, &gold), 0.5);
    }

    #[test]
    fn faithfulness_penalizes_ungrounded_tokens() {
        let retrieved = vec!["평량평균이 3.75 이상".to_string()];
        let grounded = faithfulness("평량평균이 3.75 이상", &retrieved);
        let mixed = faithfulness("평량평균이 3.75 이상 그리고 완전히 새로운 주장", &retrieved);
        assert_eq!(grounded, 1.0);
        assert!(mixed < grounded);
    }

    #[test]
    fn relevancy_clamps_and_handles_zero_vectors() {
        assert_eq!(answer_relevancy(&[1.0, 0.0], &[1.0, 0.0]), 1.0);
        assert_eq!(answer_relevancy(&[1.0, 0.0], &[-1.0, 0.0]), 0.0);
        assert_eq!(answer_relevancy(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }
}

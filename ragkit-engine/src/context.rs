//! Context assembly: dedup retrieved passages and join them into one block.

use ragkit_retrieval::RetrievedResult;

/// Drop duplicate passages, keeping the first occurrence.
///
/// Texts are compared after trimming surrounding whitespace, so the same
/// passage retrieved by two backends with different padding collapses to
/// one. Input order is preserved; callers pass results sorted by descending
/// score so the surviving copy is the best-scored one.
pub fn dedup_results(results: &[RetrievedResult]) -> Vec<RetrievedResult> {
    let mut seen: Vec<&str> = Vec::with_capacity(results.len());
    let mut deduped = Vec::with_capacity(results.len());
    for result in results {
        let key = result.content.trim();
        if key.is_empty() || seen.contains(&key) {
            continue;
        }
        seen.push(key);
        deduped.push(result.clone());
    }
    deduped
}

/// Join passage texts into a single newline-separated context block.
///
/// An empty slice yields an empty string, which the engine treats as
/// "nothing relevant was found".
pub fn assemble(results: &[RetrievedResult]) -> String {
    results.iter().map(|result| result.content.as_str()).collect::<Vec<_>>().join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use ragkit_retrieval::Metadata;

    fn result(content: &str, score: f32) -> RetrievedResult {
        RetrievedResult { content: content.to_string(), metadata: Metadata::new(), score }
    }

    #[test]
    fn dedup_keeps_first_occurrence() {
        let results = vec![
            result("조기졸업은 평량평균이 3.75 이상이어야 한다.", 0.9),
            result("수강신청은 매 학기 초에 진행된다.", 0.8),
            result("  조기졸업은 평량평균이 3.75 이상이어야 한다.  ", 0.7),
        ];
        let deduped = dedup_results(&results);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].score, 0.9);
    }

    #[test]
    fn dedup_drops_blank_passages() {
        let results = vec![result("   ", 0.9), result("a", 0.5)];
        assert_eq!(dedup_results(&results).len(), 1);
    }

    #[test]
    fn assemble_joins_with_newlines() {
        let results = vec![result("first", 0.9), result("second", 0.5)];
        assert_eq!(assemble(&results), "first\nsecond");
    }

    #[test]
    fn assemble_of_nothing_is_empty() {
        assert_eq!(assemble(&[]), "");
    }
}

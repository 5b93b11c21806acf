//! Prompt construction for grounded answering.

/// Template for a context-grounded question. `{context}` and `{query}` are
/// substituted verbatim.
const GROUNDED_TEMPLATE: &str = "Answer the question using only the reference \
passages below. If the passages do not contain the information needed, say \
that you could not find it in the provided documents. Answer in the same \
language as the question.\n\n\
Reference passages:\n{context}\n\nQuestion: {query}";

/// Build the user prompt combining retrieved context with the query.
pub fn grounded_prompt(context: &str, query: &str) -> String {
    GROUNDED_TEMPLATE.replace("{context}", context).replace("{query}", query)
}

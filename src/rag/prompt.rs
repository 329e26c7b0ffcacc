//! Grounding prompt construction.
//!
//! Retrieved texts are concatenated in the order given, never re-ranked,
//! and the generator is told to reply with [`REFUSAL_SENTENCE`] when the
//! context does not contain the answer.

/// Fixed reply for questions the context cannot answer.
pub const REFUSAL_SENTENCE: &str = "I could not find the answer in the provided context.";

pub fn build_context<S: AsRef<str>>(texts: &[S]) -> String {
    texts
        .iter()
        .map(|t| t.as_ref())
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn build_grounded_prompt<S: AsRef<str>>(query: &str, texts: &[S]) -> String {
    format!(
        "Answer the following question using only the provided context.\n\
         If the context does not contain the answer, reply with exactly this sentence and nothing else:\n\
         {refusal}\n\n\
         Context:\n{context}\n\n\
         Question: {query}\n\n\
         Answer:",
        refusal = REFUSAL_SENTENCE,
        context = build_context(texts),
        query = query.trim(),
    )
}

/// Whether a generated answer is the refusal sentence, ignoring
/// surrounding whitespace.
pub fn is_refusal(answer: &str) -> bool {
    answer.trim() == REFUSAL_SENTENCE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_preserves_retrieval_order() {
        let prompt = build_grounded_prompt("q", &["gamma", "alpha", "beta"]);
        let g = prompt.find("gamma").unwrap();
        let a = prompt.find("alpha").unwrap();
        let b = prompt.find("beta").unwrap();
        assert!(g < a && a < b);
        assert!(prompt.contains("Context:\ngamma\nalpha\nbeta\n"));
    }

    #[test]
    fn prompt_carries_refusal_instruction_and_question() {
        let prompt = build_grounded_prompt("  Who is Anupam?  ", &["Anupam is the narrator."]);
        assert!(prompt.contains(REFUSAL_SENTENCE));
        assert!(prompt.contains("Question: Who is Anupam?\n"));
        assert!(prompt.trim_end().ends_with("Answer:"));
    }

    #[test]
    fn empty_context_still_builds() {
        let texts: [&str; 0] = [];
        let prompt = build_grounded_prompt("q", &texts);
        assert!(prompt.contains("Context:\n\n"));
    }

    #[test]
    fn refusal_detection_trims_whitespace() {
        assert!(is_refusal(&format!("  {}\n", REFUSAL_SENTENCE)));
        assert!(!is_refusal("Shambhunath"));
    }
}

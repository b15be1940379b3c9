//! Prompt templates for grounded answer generation

/// Exact reply required when the context does not contain the answer
pub const NOT_FOUND_ANSWER: &str = "Sorry, I don't know — this is not in my knowledge base.";

/// Separator placed between retrieved chunks in the context
pub const CONTEXT_SEPARATOR: &str = "\n\n";

/// Prompt builder for knowledge-base queries
pub struct PromptBuilder;

impl PromptBuilder {
    /// Join ranked chunk texts into a context string, best match first
    pub fn build_context<S: AsRef<str>>(chunks: &[S]) -> String {
        chunks
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(CONTEXT_SEPARATOR)
    }

    /// Build the grounded QA prompt
    pub fn build_grounded_prompt(question: &str, context: &str) -> String {
        format!(
            r#"You are a helpful document QA assistant. Use ONLY the following context to answer.
If the answer is not in the context, respond exactly:
"{not_found}"
CONTEXT:
{context}
QUESTION:
{question}
"#,
            not_found = NOT_FOUND_ANSWER,
            context = context,
            question = question
        )
    }
}

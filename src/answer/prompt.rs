use crate::paper::Paper;

const PROMPT_HEAD: &str = "Based on the following research papers, provide a detailed and accurate answer to this question: ";

const PROMPT_INSTRUCTIONS: &str = "If the information is not directly available, synthesize a response based on related information.\n\
Include specific details, methods, and findings when relevant.";

/// One paper's contribution to the prompt context.
pub fn context_block(paper: &Paper) -> String {
    format!("Title: {}\nSummary: {}", paper.title, paper.summary)
}

/// Assembles the generation prompt from a question and its selected context blocks.
pub fn build_prompt(question: &str, contexts: &[String]) -> String {
    format!(
        "{PROMPT_HEAD}{question}\n{PROMPT_INSTRUCTIONS}\n\nContext:\n{}\n\nDetailed Answer:",
        contexts.join("\n\n")
    )
}

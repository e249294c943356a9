//! Builds the two-message prompt sent to the completion backend. The
//! math directives are advisory hints for the remote model; actual
//! enforcement for non-streamed answers lives in `text::math_format`.

use crate::domain::entities::{ChatMessage, DocumentChunk};

const ASSISTANT_WITH_CONTEXT: &str = "你是一个智能助手。请基于以下参考资料回答问题。如果问题与参考资料无关，你可以基于自己的知识回答。";

const ASSISTANT_PLAIN: &str = "你是一个智能助手，可以帮助用户解答问题。";

const MATH_DIRECTIVES: &str = "在回答涉及数学内容时，请遵循以下规则：
1. 使用简单直观的符号表示数学公式，避免复杂的LaTeX格式
2. 对于简单的数学符号，直接使用Unicode字符（如：×, ÷, ±, ≤, ≥, α, β, λ等）
3. 对于上下标，使用简单的形式（如：x₁, x², aᵢ等）
4. 分数使用斜杠表示（如：a/b）
5. 避免使用复杂的LaTeX环境和命令";

/// Produces exactly two messages: a system message carrying the fixed
/// formatting directives (plus a context block when retrieval found
/// anything) and a user message with the question verbatim.
pub fn compose(question: &str, context_chunks: Option<&[&DocumentChunk]>) -> Vec<ChatMessage> {
    let system = match context_chunks {
        Some(chunks) if !chunks.is_empty() => {
            let context = chunks
                .iter()
                .map(|c| c.text.as_str())
                .collect::<Vec<_>>()
                .join("\n");
            format!("{ASSISTANT_WITH_CONTEXT}\n\n{MATH_DIRECTIVES}\n\n参考资料：\n{context}")
        }
        _ => format!("{ASSISTANT_PLAIN}\n\n{MATH_DIRECTIVES}"),
    };

    vec![ChatMessage::system(system), ChatMessage::user(question)]
}

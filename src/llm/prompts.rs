use crate::document::DocumentType;

/// System prompt sent with every simplification request
pub const SIMPLIFICATION_SYSTEM_PROMPT: &str = "You are a legal expert specializing in simplifying complex legal documents for everyday users. Your goal is to make legal text accessible and understandable while highlighting important clauses.";

/// Marker appended when the input had to be hard-cut
pub const TRUNCATION_MARKER: &str = "...";

/// Build the user prompt for a document of the given type
pub fn simplification_prompt(text: &str, document_type: DocumentType) -> String {
    format!(
        r#"Please analyze and simplify the following {} document.

INSTRUCTIONS:
1. Break down complex legal language into simple, everyday terms
2. Highlight the most important points that users should know
3. Identify any potentially concerning clauses or red flags
4. Organize the content with clear headings
5. Use bullet points for easy reading
6. Explain what the user is agreeing to in practical terms

FORMAT YOUR RESPONSE AS:
## Key Points You Should Know
[Most important takeaways in bullet points]

## Simplified Summary
[Easy-to-understand version of the main content]

## Red Flags & Concerns
[Any clauses that might be problematic for users]

## What This Means for You
[Practical implications of agreeing to these terms]

Document to analyze:
{}"#,
        document_type.as_str().to_uppercase(),
        text
    )
}

/// Keep at most `max_chars` characters of `text`.
///
/// When a cut is needed, prefers ending on the last `.` that lies past 80%
/// of the budget. Otherwise hard-cuts at the budget and appends
/// [`TRUNCATION_MARKER`].
pub fn limit_text_size(text: &str, max_chars: usize) -> String {
    let Some((cut, _)) = text.char_indices().nth(max_chars) else {
        return text.to_string();
    };

    let truncated = &text[..cut];
    if let Some(pos) = truncated.rfind('.') {
        let period_index = truncated[..pos].chars().count();
        if period_index as f64 > max_chars as f64 * 0.8 {
            return truncated[..=pos].to_string();
        }
    }

    format!("{}{}", truncated, TRUNCATION_MARKER)
}

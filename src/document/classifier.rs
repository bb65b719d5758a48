use super::DocumentType;

const FILENAME_RULES: &[(&[&str], DocumentType)] = &[
    (&["terms", "tos"], DocumentType::Tos),
    (&["privacy"], DocumentType::PrivacyPolicy),
    (&["eula", "license"], DocumentType::Eula),
];

const CONTENT_RULES: &[(&[&str], DocumentType)] = &[
    (
        &["terms of service", "terms and conditions"],
        DocumentType::Tos,
    ),
    (
        &["privacy policy", "data collection"],
        DocumentType::PrivacyPolicy,
    ),
    (
        &["end user license", "software license"],
        DocumentType::Eula,
    ),
];

/// Guess the document type from its filename, then its content.
///
/// Rules are tried in order and the first hit wins. Every filename rule is
/// checked before any content rule. Falls back to `Tos`.
pub fn classify(filename: &str, content: &str) -> DocumentType {
    let filename = filename.to_lowercase();
    let content = content.to_lowercase();

    first_match(&filename, FILENAME_RULES)
        .or_else(|| first_match(&content, CONTENT_RULES))
        .unwrap_or(DocumentType::Tos)
}

fn first_match(haystack: &str, rules: &[(&[&str], DocumentType)]) -> Option<DocumentType> {
    rules
        .iter()
        .find(|(needles, _)| needles.iter().any(|n| haystack.contains(n)))
        .map(|(_, ty)| *ty)
}

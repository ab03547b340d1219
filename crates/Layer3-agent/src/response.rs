//! Reading the model's reply

use uncommit_core::{Proposal, SuggesterError};

/// Reply excerpt kept for error reports, in chars
const RAW_EXCERPT_CHARS: usize = 500;

/// Slice from the first `{` to the last `}`, if any
pub fn extract_json(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Parse a free-form reply into a proposal
pub fn parse_proposal(text: &str) -> Result<Proposal, SuggesterError> {
    let json = extract_json(text)
        .ok_or_else(|| SuggesterError::format("reply contains no JSON object", excerpt(text)))?;

    serde_json::from_str(json).map_err(|e| SuggesterError::format(e.to_string(), excerpt(text)))
}

fn excerpt(text: &str) -> String {
    text.chars().take(RAW_EXCERPT_CHARS).collect()
}

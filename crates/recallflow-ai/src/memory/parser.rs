//! `<proposition>` tag grammar shared by extraction and condensation replies.

use once_cell::sync::Lazy;
use regex::Regex;

const OPEN_TAG: &str = "<proposition>";
const CLOSE_TAG: &str = "</proposition>";

static PROPOSITION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<proposition>(.*?)</proposition>").expect("proposition pattern is valid")
});

/// Pull proposition texts out of a raw model reply.
///
/// Matches are non-overlapping and taken left to right; each is trimmed and
/// blank ones are dropped. Text outside tag pairs is ignored, and malformed
/// or missing tags simply yield fewer (or no) propositions.
pub fn parse_propositions(reply: &str) -> Vec<String> {
    PROPOSITION_RE
        .captures_iter(reply)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|text| !text.is_empty())
        .map(str::to_string)
        .collect()
}

/// Render propositions as newline-joined `<proposition>` tags.
pub fn format_propositions(propositions: &[String]) -> String {
    propositions
        .iter()
        .map(|p| format!("{OPEN_TAG}{p}{CLOSE_TAG}"))
        .collect::<Vec<_>>()
        .join("\n")
}

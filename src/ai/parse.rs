//! Tolerant parsing of the model's outfit reply.
//!
//! The model is asked for a bare JSON array of arrays but regularly wraps it
//! in a markdown fence or surrounds it with prose. Parsing is two stages:
//! extract a candidate substring, then strictly decode it.

use regex::Regex;
use std::sync::OnceLock;

use crate::error::AppError;
use crate::models::OutfitSuggestion;

const FENCE: &str = "```";

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("no outfit array found in response")]
    NoOutfitArray,

    #[error("invalid outfit JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

impl ParseError {
    /// Attach the raw reply for display
    pub fn into_app_error(self, raw: &str) -> AppError {
        AppError::SuggestionUnparseable {
            reason: self.to_string(),
            raw: raw.to_string(),
        }
    }
}

fn outfit_array_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)\[\s*\[.*?\]\s*\]").expect("valid outfit regex"))
}

/// Content of the first fenced block, minus a leading language tag.
/// Text without a fence is returned unchanged.
pub fn strip_code_fence(text: &str) -> &str {
    let Some(inner) = text.split(FENCE).nth(1) else {
        return text.trim();
    };

    let tag_len = inner
        .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '+')))
        .unwrap_or(inner.len());
    inner[tag_len..].trim()
}

/// First `[[ ... ]]` shaped substring, if any
pub fn extract_candidate(text: &str) -> Option<&str> {
    outfit_array_regex().find(text).map(|m| m.as_str())
}

/// Decode the model reply into outfits.
///
/// When no `[[ ... ]]` substring exists the whole (fence-stripped) text is
/// still tried, so a bare `[]` reply decodes to no outfits.
pub fn parse_outfits(raw: &str) -> Result<Vec<OutfitSuggestion>, ParseError> {
    let text = strip_code_fence(raw.trim());

    match extract_candidate(text) {
        Some(candidate) => Ok(serde_json::from_str(candidate)?),
        None => serde_json::from_str(text).map_err(|_| ParseError::NoOutfitArray),
    }
}

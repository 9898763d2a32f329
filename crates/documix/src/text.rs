//! Small text utilities shared across the pipeline.

/// Average characters per token used by the estimator. The estimate is
/// deliberately coarse; it only needs to be stable and monotone in text
/// length.
pub const CHARS_PER_TOKEN: usize = 4;

/// Estimate the token count of a piece of extracted text.
pub fn estimate_tokens(text: &str) -> usize {
    if text.trim().is_empty() {
        return 0;
    }
    text.len().div_ceil(CHARS_PER_TOKEN)
}

/// Collapse Windows line endings so rendered Markdown stays uniform.
pub fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

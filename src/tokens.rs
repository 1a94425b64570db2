//! # Token Estimator
//!
//! Character-class approximation of prompt size, used for metrics only.
//! Never gates request validation or truncation: an odd estimate must not
//! block processing.

/// Estimate the token count of `text`.
///
/// Arabic-script characters compress to roughly 3 characters per token,
/// everything else to roughly 4. The estimate is the sum of the two
/// ceilinged divisions.
pub fn estimate_tokens(text: &str) -> u64 {
    let mut arabic = 0u64;
    let mut other = 0u64;
    for ch in text.chars() {
        if is_arabic(ch) {
            arabic += 1;
        } else {
            other += 1;
        }
    }
    arabic.div_ceil(3) + other.div_ceil(4)
}

/// Arabic block (U+0600..U+06FF) and Arabic Supplement (U+0750..U+077F).
fn is_arabic(ch: char) -> bool {
    matches!(ch, '\u{0600}'..='\u{06FF}' | '\u{0750}'..='\u{077F}')
}

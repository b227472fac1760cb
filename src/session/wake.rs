//! Wake-phrase matching and command extraction.
//!
//! All matching is case-insensitive unanchored substring search against the
//! lowercased transcript. No word-boundary logic: "джарвис" embedded inside a
//! longer word still matches. That is the documented contract, not a bug.

/// True if `text` contains the wake phrase anywhere.
pub fn contains_wake(text: &str, wake: &str) -> bool {
    let wake = wake.to_lowercase();
    if wake.is_empty() {
        return false;
    }
    text.to_lowercase().contains(&wake)
}

/// The (lowercased, trimmed) text after the FIRST occurrence of the wake
/// phrase. None if the phrase is absent.
pub fn text_after_wake(text: &str, wake: &str) -> Option<String> {
    let lower = text.to_lowercase();
    let wake = wake.to_lowercase();
    if wake.is_empty() {
        return None;
    }
    let at = lower.find(&wake)?;
    Some(lower[at + wake.len()..].trim().to_string())
}

/// Remove every occurrence of the wake phrase and trim. Used on finalized
/// command text so "джарвис, покажи отчет" dispatches as "покажи отчет"
/// (modulo punctuation the recognizer kept).
pub fn strip_wake(text: &str, wake: &str) -> String {
    let lower = text.to_lowercase();
    let wake = wake.to_lowercase();
    if wake.is_empty() {
        return lower.trim().to_string();
    }
    lower.replace(&wake, "").trim().to_string()
}

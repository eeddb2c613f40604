use crate::error::LoadError;

/// Collapses whitespace runs to one space, drops every non-ASCII character and trims.
///
/// Unicode whitespace (e.g. `\u{a0}`) counts as a separator before the ASCII filter runs,
/// and the collapse happens after it, so the output never holds a double space and
/// `normalize(normalize(t)) == normalize(t)`.
pub fn normalize(raw_text: &str) -> String {
    let ascii = raw_text
        .chars()
        .filter_map(|ch| {
            if ch.is_whitespace() {
                Some(' ')
            } else if ch.is_ascii() {
                Some(ch)
            } else {
                None
            }
        })
        .collect::<String>();

    ascii.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Rejects extracted text that is empty or only whitespace.
pub fn require_content(raw_text: &str) -> Result<(), LoadError> {
    if raw_text.trim().is_empty() {
        return Err(LoadError::EmptyContent);
    }
    Ok(())
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

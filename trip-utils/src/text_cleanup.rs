//! Cleanup for free text coming back from (or going to) the AI collaborator.

/// Name to fall back to when place-info extraction fails: everything before
/// the first `"http"` in the user's input, trimmed. Pasting a bare URL (or
/// whitespace) yields `"New Entry"`.
pub fn fallback_place_name(input: &str) -> String {
    let name = input.split("http").next().unwrap_or("").trim();
    if name.is_empty() {
        "New Entry".to_string()
    } else {
        name.to_string()
    }
}

/// Empties a field that merely echoes placeholder text. The match is a
/// case-insensitive substring check, so "Estimated: ~500 yen" is dropped but
/// real content is kept.
pub fn scrub_placeholder(value: &str, placeholder: &str) -> String {
    if value.to_lowercase().contains(placeholder) {
        String::new()
    } else {
        value.to_string()
    }
}

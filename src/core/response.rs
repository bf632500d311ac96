//! Discord text limits for reminder replies and notifications
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

/// Discord embed field value limit
pub const FIELD_LIMIT: usize = 1024;
/// Discord message content limit
pub const MESSAGE_LIMIT: usize = 2000;
/// Fields per embed before Discord rejects it
pub const MAX_EMBED_FIELDS: usize = 25;

/// Truncate text to at most `limit` bytes on a char boundary, ending in "..." when cut
pub fn truncate_to(text: &str, limit: usize) -> String {
    if text.len() <= limit {
        return text.to_string();
    }

    let mut end = limit.saturating_sub(3);
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}

/// Truncate a reminder message so it fits in one embed field
pub fn truncate_for_field(text: &str) -> String {
    truncate_to(text, FIELD_LIMIT)
}

pub fn truncate_for_message(text: &str) -> String {
    truncate_to(text, MESSAGE_LIMIT)
}

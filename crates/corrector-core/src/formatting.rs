//! Formatting utilities for Telegram HTML parse mode.

/// Escape HTML special characters for Telegram HTML parse mode.
///
/// Model output and user-supplied tone text are interpolated into HTML
/// replies, so both must pass through here before sending.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

//! Width-bounded text wrapping against live glyph measurement.
//!
//! Wrapping is character-granular: the current line grows one character
//! at a time and commits the moment the measured width would exceed the
//! bound. Breaks never wait for word boundaries; CJK text has none.

use crate::fonts::FontHandle;

/// Wraps `text` into lines no wider than `max_width` pixels under `font`.
/// Line endings are normalized first; an empty paragraph is preserved as
/// one empty line so blank-line intent survives.
pub fn wrap_text(text: &str, font: &FontHandle, max_width: i32) -> Vec<String> {
    let normalized = text.replace("\r\n", "\n");
    let mut lines = Vec::new();

    for paragraph in normalized.split('\n') {
        if paragraph.is_empty() {
            lines.push(String::new());
            continue;
        }

        let mut current = String::new();
        for ch in paragraph.chars() {
            let mut tentative = current.clone();
            tentative.push(ch);
            if font.measure(&tentative).width() <= max_width {
                current = tentative;
            } else {
                lines.push(current);
                current = ch.to_string();
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }

    lines
}

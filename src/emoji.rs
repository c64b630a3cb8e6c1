//! Emoji classification and the pre-wrap padding pass.
//!
//! Classification follows the UTS #51 emoji-data ranges closely enough for
//! chat text: pictographs, presentation selectors, ZWJ, skin-tone
//! modifiers and regional indicators all count. Padding treats each
//! complete sequence (ZWJ chains, modified pictographs, flag pairs) as one
//! unit; two adjacent sequences are still separated from each other.

/// Codepoint ranges (inclusive) treated as emoji or emoji components.
#[rustfmt::skip]
const EMOJI_RANGES: &[(u32, u32)] = &[
    (0x200D, 0x200D),   // zero width joiner
    (0x20E3, 0x20E3),   // combining enclosing keycap
    (0x2600, 0x26FF),   // miscellaneous symbols
    (0x2700, 0x27BF),   // dingbats
    (0x2B05, 0x2B07),   // arrows with emoji presentation
    (0x2B1B, 0x2B1C),   // black/white large squares
    (0x2B50, 0x2B50),   // star
    (0x2B55, 0x2B55),   // heavy large circle
    (0xFE0F, 0xFE0F),   // variation selector-16
    (0x1F1E6, 0x1F1FF), // regional indicators
    (0x1F300, 0x1F5FF), // misc symbols and pictographs
    (0x1F600, 0x1F64F), // emoticons
    (0x1F680, 0x1F6FF), // transport and map symbols
    (0x1F900, 0x1F9FF), // supplemental symbols and pictographs
    (0x1FA70, 0x1FAFF), // symbols and pictographs extended-A
];

pub fn is_emoji(ch: char) -> bool {
    let code = u32::from(ch);
    EMOJI_RANGES
        .iter()
        .any(|&(start, end)| code >= start && code <= end)
}

const ZWJ: char = '\u{200D}';

fn is_regional_indicator(ch: char) -> bool {
    matches!(u32::from(ch), 0x1F1E6..=0x1F1FF)
}

/// Whether `ch` continues the emoji sequence ended by `prev` rather than
/// starting a new one. Joiners, the presentation selector, the keycap
/// combiner and skin-tone modifiers always attach; anything after a ZWJ
/// attaches; `flag_open` pairs a second regional indicator with the first.
fn extends_sequence(prev: char, ch: char, flag_open: bool) -> bool {
    prev == ZWJ
        || matches!(u32::from(ch), 0x200D | 0xFE0F | 0x20E3 | 0x1F3FB..=0x1F3FF)
        || (flag_open && is_regional_indicator(prev) && is_regional_indicator(ch))
}

/// Inserts a single space before and after every emoji sequence, so a
/// downstream text renderer does not clip emoji against adjacent glyphs.
/// Adjacent distinct sequences get a space between them too. Text without
/// emoji passes through unchanged.
pub fn pad_emojis(text: &str) -> String {
    if !text.chars().any(is_emoji) {
        return text.to_owned();
    }

    let mut out = String::with_capacity(text.len() + 8);
    let mut prev: Option<char> = None;
    let mut in_sequence = false;
    let mut flag_open = false;
    for ch in text.chars() {
        match (in_sequence, is_emoji(ch)) {
            (false, true) => {
                out.push(' ');
                out.push(ch);
                in_sequence = true;
                flag_open = is_regional_indicator(ch);
            }
            (true, true) => {
                let extends = extends_sequence(prev.unwrap_or(' '), ch, flag_open);
                if !extends {
                    out.push(' ');
                }
                out.push(ch);
                flag_open = if is_regional_indicator(ch) {
                    !extends
                } else {
                    false
                };
            }
            (true, false) => {
                out.push(' ');
                out.push(ch);
                in_sequence = false;
                flag_open = false;
            }
            (false, false) => out.push(ch),
        }
        prev = Some(ch);
    }
    if in_sequence {
        out.push(' ');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{is_emoji, pad_emojis};

    #[test]
    fn classifies_common_emoji() {
        assert!(is_emoji('😀'));
        assert!(is_emoji('🚀'));
        assert!(is_emoji('⭐'));
        assert!(is_emoji('\u{FE0F}'));
        assert!(is_emoji('\u{200D}'));
    }

    #[test]
    fn classifies_ordinary_text_as_not_emoji() {
        for ch in "hello, 你好 123".chars() {
            assert!(!is_emoji(ch), "{ch:?} misclassified as emoji");
        }
    }

    #[test]
    fn padding_wraps_runs_with_single_spaces() {
        assert_eq!(pad_emojis("hi😀there"), "hi 😀 there");
        assert_eq!(pad_emojis("😀"), " 😀 ");
    }

    #[test]
    fn adjacent_emoji_are_separated() {
        assert_eq!(pad_emojis("😀🚀"), " 😀 🚀 ");
        assert_eq!(pad_emojis("a😀🚀b"), "a 😀 🚀 b");
    }

    #[test]
    fn skin_tone_modifier_stays_attached() {
        let waving = "\u{1F44B}\u{1F3FD}";
        assert_eq!(pad_emojis(waving), format!(" {waving} "));
    }

    #[test]
    fn flag_pairs_stay_joined_but_flags_separate() {
        let us = "\u{1F1FA}\u{1F1F8}";
        let fr = "\u{1F1EB}\u{1F1F7}";
        assert_eq!(pad_emojis(us), format!(" {us} "));
        assert_eq!(pad_emojis(&format!("{us}{fr}")), format!(" {us} {fr} "));
    }

    #[test]
    fn zwj_sequences_stay_joined() {
        // Family sequence must not get spaces between its members.
        let family = "\u{1F468}\u{200D}\u{1F469}\u{200D}\u{1F467}";
        let padded = pad_emojis(&format!("a{family}b"));
        assert_eq!(padded, format!("a {family} b"));
    }

    #[test]
    fn plain_text_passes_through_unchanged() {
        assert_eq!(pad_emojis("no emoji here"), "no emoji here");
        assert_eq!(pad_emojis(""), "");
    }
}

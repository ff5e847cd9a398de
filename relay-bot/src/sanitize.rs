//! Markdown marker removal for model replies.
//!
//! Replies are delivered as plain text, so emphasis markers the model emits would show up
//! literally. Each marker occurrence becomes one space; nothing else changes.

/// Markers replaced, in this order. Two-character markers come first so `**` yields one space
/// rather than two.
pub const MARKDOWN_MARKERS: [&str; 6] = ["**", "__", "*", "_", "`", "~~"];

/// Replaces every occurrence of each [`MARKDOWN_MARKERS`] entry with a single space.
///
/// Idempotent: the output contains none of the markers.
pub fn clean_text(text: &str) -> String {
    MARKDOWN_MARKERS
        .iter()
        .fold(text.to_string(), |acc, marker| acc.replace(marker, " "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_each_marker_with_one_space() {
        assert_eq!(clean_text("Bold **word** and _italic_"), "Bold  word  and  italic ");
        assert_eq!(clean_text("__u__"), " u ");
        assert_eq!(clean_text("`code`"), " code ");
        assert_eq!(clean_text("~~gone~~"), " gone ");
    }

    #[test]
    fn double_markers_win_over_single() {
        assert_eq!(clean_text("***x***"), "  x  ");
        assert_eq!(clean_text("~~~"), " ~");
    }

    #[test]
    fn other_characters_are_untouched() {
        let plain = "Hello, world! 2 + 2 = 4 ~ café 😀\n- item";
        assert_eq!(clean_text(plain), plain);
        assert_eq!(clean_text(""), "");
    }

    #[test]
    fn is_idempotent() {
        for input in [
            "Bold **word** and _italic_",
            "~~~~~",
            "a_b*c`d~~e__f**g",
            "*_*_`~~~",
        ] {
            let once = clean_text(input);
            assert_eq!(clean_text(&once), once, "input: {:?}", input);
            assert!(MARKDOWN_MARKERS.iter().all(|m| !once.contains(m)));
        }
    }
}

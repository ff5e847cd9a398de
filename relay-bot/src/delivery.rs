//! Splitting long replies into Telegram-sized messages.

/// Telegram has a 4096 character limit per message; chunks stay below it.
pub const MAX_MESSAGE_LENGTH: usize = 4000;

/// Splits `text` into chunks of at most `max_chars` characters, on character boundaries.
/// Empty text yields no chunks.
pub fn split_message(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(max_chars)
        .map(|chunk| chunk.iter().collect())
        .collect()
}

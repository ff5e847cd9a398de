//! Shared pure functions for bot command detection (`/start`, `/help`).
//!
//! Telegram sends commands as the first word of the text, optionally addressed to one bot in a
//! group (`/start@my_bot`) and followed by arguments (`/start ref42`).

/// Commands the framework recognizes. Any other text (including unknown `/commands`) is a regular message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
}

/// Parses the leading command of `text`.
///
/// Returns `None` when the text is not a recognized command or when it is explicitly addressed
/// to a different bot than `bot_username` (compared case-insensitively). When `bot_username` is
/// not known yet, an addressed command is accepted.
pub fn parse_command(text: &str, bot_username: Option<&str>) -> Option<Command> {
    let first = text.trim_start().split_whitespace().next()?;
    let body = first.strip_prefix('/')?;
    let (name, target) = match body.split_once('@') {
        Some((name, target)) => (name, Some(target)),
        None => (body, None),
    };
    if let (Some(target), Some(me)) = (target, bot_username) {
        if !target.eq_ignore_ascii_case(me) {
            return None;
        }
    }
    match name.to_ascii_lowercase().as_str() {
        "start" => Some(Command::Start),
        "help" => Some(Command::Help),
        _ => None,
    }
}

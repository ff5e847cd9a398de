//! Unit tests for [`llm_client::mask_token`].
//!
//! Ensures API keys are masked for safe logging: first 7 chars + `***` + last 4 chars.
//! Keys of length ≤ 11 are fully masked as `***` to avoid leaking any segment.

use llm_client::mask_token;

/// **Test: Short or empty tokens are fully masked.**
#[test]
fn mask_token_short_returns_all_star() {
    assert_eq!(mask_token(""), "***");
    assert_eq!(mask_token("a"), "***");
    assert_eq!(mask_token("AIza1234"), "***");
    assert_eq!(mask_token("AIzaSy-1234"), "***");
}

/// **Test: Long tokens show first 7 and last 4 characters.**
#[test]
fn mask_token_long_shows_head_and_tail() {
    assert_eq!(mask_token("AIzaSyAbcdefghijklmnop"), "AIzaSyA***mnop");
    assert_eq!(mask_token("sk-proj-xyzw"), "sk-proj***xyzw");
}

/// **Test: Non-ASCII input is masked on character boundaries instead of panicking.**
#[test]
fn mask_token_multibyte_is_char_safe() {
    let masked = mask_token("ключ-ключ-ключ-ключ");
    assert!(masked.starts_with("ключ-кл"));
    assert!(masked.ends_with("ключ"));
}

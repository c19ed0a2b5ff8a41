//! Sender grammars: international phone numbers, email addresses and
//! twitter IDs.
use once_cell::sync::Lazy;
use regex::Regex;

const MIN_PHONE_DIGITS: usize = 7;
const MAX_PHONE_DIGITS: usize = 15;

// Optional '+', then digit groups (optionally one parenthesised area group)
// separated by at most one space, dot or hyphen.
static PHONE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\+?(?:\(\d+\)|\d+)(?:[ .\-]?(?:\(\d+\)|\d+))*$").expect("phone regex compiles")
});

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*@(?:[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?\.)+[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?$"#,
    )
    .expect("email regex compiles")
});

/// Phone number check: at least `min_chars` long overall and 7-15 digits.
pub fn is_phone_number(candidate: &str, min_chars: usize) -> bool {
    if candidate.chars().count() < min_chars {
        return false;
    }
    if !PHONE_RE.is_match(candidate) {
        return false;
    }
    let digits = candidate.chars().filter(|c| c.is_ascii_digit()).count();
    (MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&digits)
}

pub fn is_email_address(candidate: &str) -> bool {
    EMAIL_RE.is_match(candidate)
}

/// Twitter ID check: `@` prefix and at most `max_chars` characters in total.
pub fn is_twitter_handle(candidate: &str, max_chars: usize) -> bool {
    candidate.starts_with('@') && candidate.chars().count() <= max_chars
}

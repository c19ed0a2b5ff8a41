use once_cell::sync::Lazy;
use regex::Regex;

/// Marker written in place of every quarantined URL.
pub const URL_QUARANTINED: &str = "<URL Quarantined>";

// scheme "://" authority, then any non-space remainder.
static ABSOLUTE_URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*://[^\s/?#@]+(?:@[^\s/?#@]+)?(?:[/?#]\S*)?$")
        .expect("url regex compiles")
});

/// True when `token` is a well-formed absolute URL such as
/// `https://example.com/x`. Bare hosts (`www.example.com`) do not count.
pub fn is_absolute_url(token: &str) -> bool {
    ABSOLUTE_URL_RE.is_match(token)
}

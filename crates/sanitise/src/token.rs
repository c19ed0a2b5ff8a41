/// Splits one line of message text on single spaces.
///
/// Runs of spaces produce empty tokens, so joining the tokens back with a
/// single space reproduces the line exactly. Punctuation stays attached to
/// its word: `great!` is one token and will not match `GREAT`.
pub fn tokenize(line: &str) -> Vec<&str> {
    line.split(' ').collect()
}

/// Applies `f` to every line of `text` and rejoins the results with `\n`.
pub(crate) fn map_lines<F>(text: &str, mut f: F) -> String
where
    F: FnMut(&str) -> String,
{
    text.split('\n').map(|line| f(line)).collect::<Vec<_>>().join("\n")
}

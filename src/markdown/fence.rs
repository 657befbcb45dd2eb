//! Backtick counting for code spans and fenced blocks.

/// Longest run of `ch` in `content`.
fn longest_run(content: &str, ch: char) -> usize {
    content
        .split(|c| c != ch)
        .map(|run| run.chars().count())
        .max()
        .unwrap_or(0)
}

/// Minimum fence length (at least 3) that does not occur in `content`.
///
/// ```
/// use steamguide::markdown::fence_length;
///
/// assert_eq!(fence_length("let x = 1;", '`'), 3);
/// assert_eq!(fence_length("```rust\ncode\n```", '`'), 4);
/// ```
pub fn fence_length(content: &str, fence_char: char) -> usize {
    longest_run(content, fence_char).max(2) + 1
}

/// Minimum number of backticks that can delimit `content` as inline code.
pub fn inline_code_ticks(content: &str) -> usize {
    longest_run(content, '`') + 1
}

//! Glob-style pattern matching for `SCAN MATCH`
//!
//! Supported syntax:
//! - `*` matches any run of characters, including none
//! - `?` matches exactly one character
//! - `[abc]`, `[a-z]`, `[^a]` / `[!a]` character classes
//! - `\x` matches `x` literally
//!
//! An unterminated `[` is matched literally.

/// Whether `text` matches `pattern`
pub fn glob_match(pattern: &str, text: &str) -> bool {
    let pat: Vec<char> = pattern.chars().collect();
    let txt: Vec<char> = text.chars().collect();

    let (mut pi, mut ti) = (0usize, 0usize);
    // Pattern position after the last `*`, and the text position it resumes from
    let mut backtrack: Option<(usize, usize)> = None;

    while ti < txt.len() {
        if pi < pat.len() && pat[pi] == '*' {
            backtrack = Some((pi + 1, ti));
            pi += 1;
            continue;
        }
        if let Some(next) = step(&pat, pi, txt[ti]) {
            pi = next;
            ti += 1;
            continue;
        }
        match backtrack {
            Some((resume, from)) => {
                pi = resume;
                ti = from + 1;
                backtrack = Some((resume, from + 1));
            }
            None => return false,
        }
    }

    while pi < pat.len() && pat[pi] == '*' {
        pi += 1;
    }
    pi == pat.len()
}

/// Match one text character at `pi`, returning the next pattern position
fn step(pat: &[char], pi: usize, c: char) -> Option<usize> {
    let head = *pat.get(pi)?;
    match head {
        '?' => Some(pi + 1),
        '\\' if pi + 1 < pat.len() => (pat[pi + 1] == c).then_some(pi + 2),
        '[' => match class(pat, pi, c) {
            Some((matched, next)) => matched.then_some(next),
            None => (c == '[').then_some(pi + 1),
        },
        literal => (literal == c).then_some(pi + 1),
    }
}

/// Evaluate the class starting at `pat[start] == '['`
///
/// Returns whether `c` is admitted and the position after the closing `]`,
/// or `None` when the class is unterminated.
fn class(pat: &[char], start: usize, c: char) -> Option<(bool, usize)> {
    let mut i = start + 1;
    let negate = matches!(pat.get(i), Some('^') | Some('!'));
    if negate {
        i += 1;
    }

    let mut matched = false;
    let mut first = true;
    loop {
        let ch = *pat.get(i)?;
        if ch == ']' && !first {
            return Some((matched != negate, i + 1));
        }
        first = false;

        if ch == '\\' {
            let escaped = *pat.get(i + 1)?;
            matched |= escaped == c;
            i += 2;
        } else if pat.get(i + 1) == Some(&'-') && pat.get(i + 2).map_or(false, |&hi| hi != ']') {
            let hi = pat[i + 2];
            let (lo, hi) = if ch <= hi { (ch, hi) } else { (hi, ch) };
            matched |= lo <= c && c <= hi;
            i += 3;
        } else {
            matched |= ch == c;
            i += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal() {
        assert!(glob_match("user:1", "user:1"));
        assert!(!glob_match("user:1", "user:2"));
        assert!(!glob_match("user", "user:1"));
    }

    #[test]
    fn test_star() {
        assert!(glob_match("*", ""));
        assert!(glob_match("*", "anything"));
        assert!(glob_match("user:*", "user:"));
        assert!(glob_match("user:*", "user:42"));
        assert!(glob_match("*:2024", "report:2024"));
        assert!(!glob_match("*:2024", "report:2023"));
        assert!(glob_match("a*b*c", "aXXbYYc"));
        assert!(!glob_match("a*b*c", "aXXbYY"));
    }

    #[test]
    fn test_question_mark() {
        assert!(glob_match("h?llo", "hello"));
        assert!(glob_match("h?llo", "hallo"));
        assert!(!glob_match("h?llo", "hllo"));
    }

    #[test]
    fn test_classes() {
        assert!(glob_match("h[ae]llo", "hello"));
        assert!(glob_match("h[ae]llo", "hallo"));
        assert!(!glob_match("h[ae]llo", "hillo"));
        assert!(glob_match("h[^e]llo", "hallo"));
        assert!(!glob_match("h[^e]llo", "hello"));
        assert!(glob_match("h[!e]llo", "hbllo"));
        assert!(glob_match("h[a-c]llo", "hbllo"));
        assert!(!glob_match("h[a-c]llo", "hdllo"));
    }

    #[test]
    fn test_escape_and_unterminated_class() {
        assert!(glob_match("a\\*b", "a*b"));
        assert!(!glob_match("a\\*b", "aXb"));
        assert!(glob_match("a[b", "a[b"));
    }

    #[test]
    fn test_unicode() {
        assert!(glob_match("用户:*", "用户:张三"));
        assert!(glob_match("?", "é"));
    }
}

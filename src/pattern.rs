//! Shell-style pattern matching over slash-separated names.
//!
//! Syntax:
//! - `*` matches any sequence of characters except `/`
//! - `?` matches any single character except `/`
//! - `[abc]`, `[a-z]` match one character in the class
//! - `[^abc]` matches one character not in the class
//! - `\c` matches the character `c` literally
//!
//! The whole pattern is parsed before matching, so a malformed pattern is
//! reported even when the name would not have matched anyway.

use crate::{ErrorKind, FsError};

/// Upper bound on recursive match steps, so patterns like `*a*a*a*b`
/// cannot make matching quadratic-per-star.
const MAX_MATCH_CALLS: usize = 100_000;

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Literal(char),
    AnyChar,
    Star,
    Class { negated: bool, ranges: Vec<(char, char)> },
}

/// Reports whether `name` matches the shell pattern `pattern`.
///
/// # Errors
///
/// - [`ErrorKind::Invalid`] (operation `"match"`) if the pattern is malformed
///
/// # Examples
///
/// ```rust
/// use anyfs_ops::path_match;
///
/// assert!(path_match("*.txt", "notes.txt").unwrap());
/// assert!(!path_match("*.txt", "dir/notes.txt").unwrap());
/// assert!(path_match("dir/[a-c]?.rs", "dir/b1.rs").unwrap());
/// assert!(path_match("[", "x").is_err());
/// ```
pub fn path_match(pattern: &str, name: &str) -> Result<bool, FsError> {
    let tokens = parse(pattern)?;
    let name: Vec<char> = name.chars().collect();
    let mut calls = 0;
    Ok(match_from(&tokens, 0, &name, 0, &mut calls))
}

/// Returns `true` if `pattern` contains any unescaped metacharacter.
pub fn has_meta(pattern: &str) -> bool {
    pattern.contains(['*', '?', '[', '\\'])
}

fn bad_pattern(pattern: &str) -> FsError {
    FsError::new("match", pattern, ErrorKind::Invalid)
}

fn parse(pattern: &str) -> Result<Vec<Token>, FsError> {
    let mut tokens = Vec::new();
    let mut chars = pattern.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '*' => {
                if tokens.last() != Some(&Token::Star) {
                    tokens.push(Token::Star);
                }
            }
            '?' => tokens.push(Token::AnyChar),
            '\\' => {
                let escaped = chars.next().ok_or_else(|| bad_pattern(pattern))?;
                tokens.push(Token::Literal(escaped));
            }
            '[' => {
                let negated = chars.next_if_eq(&'^').is_some();
                let mut ranges = Vec::new();
                loop {
                    if !ranges.is_empty() && chars.next_if_eq(&']').is_some() {
                        break;
                    }
                    let lo = class_char(&mut chars, pattern)?;
                    let hi = if chars.next_if_eq(&'-').is_some() {
                        class_char(&mut chars, pattern)?
                    } else {
                        lo
                    };
                    ranges.push((lo, hi));
                }
                tokens.push(Token::Class { negated, ranges });
            }
            other => tokens.push(Token::Literal(other)),
        }
    }

    Ok(tokens)
}

fn class_char<I>(chars: &mut std::iter::Peekable<I>, pattern: &str) -> Result<char, FsError>
where
    I: Iterator<Item = char>,
{
    match chars.next() {
        None | Some('-') | Some(']') => Err(bad_pattern(pattern)),
        Some('\\') => chars.next().ok_or_else(|| bad_pattern(pattern)),
        Some(c) => {
            // A class must be closed before the pattern ends.
            if chars.peek().is_none() {
                return Err(bad_pattern(pattern));
            }
            Ok(c)
        }
    }
}

fn match_from(tokens: &[Token], ti: usize, name: &[char], ni: usize, calls: &mut usize) -> bool {
    *calls += 1;
    if *calls > MAX_MATCH_CALLS {
        return false;
    }

    let Some(token) = tokens.get(ti) else {
        return ni == name.len();
    };

    match token {
        Token::Star => {
            let mut end = ni;
            loop {
                if match_from(tokens, ti + 1, name, end, calls) {
                    return true;
                }
                match name.get(end) {
                    Some('/') | None => return false,
                    Some(_) => end += 1,
                }
            }
        }
        Token::AnyChar => match name.get(ni) {
            Some(c) if *c != '/' => match_from(tokens, ti + 1, name, ni + 1, calls),
            _ => false,
        },
        Token::Literal(want) => match name.get(ni) {
            Some(c) if c == want => match_from(tokens, ti + 1, name, ni + 1, calls),
            _ => false,
        },
        Token::Class { negated, ranges } => match name.get(ni) {
            Some(c) => {
                let hit = ranges.iter().any(|(lo, hi)| lo <= c && c <= hi);
                hit != *negated && match_from(tokens, ti + 1, name, ni + 1, calls)
            }
            None => false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matches(pattern: &str, name: &str) -> bool {
        path_match(pattern, name).unwrap()
    }

    #[test]
    fn literals_and_wildcards() {
        assert!(matches("abc", "abc"));
        assert!(!matches("abc", "abcd"));
        assert!(matches("*", "abc"));
        assert!(matches("*c", "abc"));
        assert!(matches("a*", "a"));
        assert!(matches("a*b*c", "axxbyyc"));
        assert!(!matches("a*b*c", "axxbyy"));
        assert!(matches("a?c", "abc"));
        assert!(!matches("a?c", "ac"));
    }

    #[test]
    fn wildcards_stop_at_separator() {
        assert!(!matches("*", "a/b"));
        assert!(!matches("a?b", "a/b"));
        assert!(matches("a/*", "a/b"));
        assert!(matches("*/*", "a/b"));
        assert!(!matches("a*/b", "a/c/b"));
    }

    #[test]
    fn character_classes() {
        assert!(matches("[abc]", "b"));
        assert!(!matches("[abc]", "d"));
        assert!(matches("[a-z]x", "qx"));
        assert!(matches("[^a-z]", "Q"));
        assert!(!matches("[^a-z]", "q"));
        assert!(matches("[\\]]", "]"));
        assert!(matches("[\\-]", "-"));
    }

    #[test]
    fn escapes() {
        assert!(matches("\\*", "*"));
        assert!(!matches("\\*", "x"));
        assert!(matches("a\\?", "a?"));
    }

    #[test]
    fn malformed_patterns() {
        for bad in ["[", "[]", "[a", "[a-", "\\", "[^", "[-a]", "a[]b"] {
            let err = path_match(bad, "a").unwrap_err();
            assert!(err.is(ErrorKind::Invalid), "{bad} should be rejected");
        }
    }

    #[test]
    fn malformed_tail_reported_even_without_match() {
        assert!(path_match("x[", "abc").is_err());
    }

    #[test]
    fn has_meta_detects_specials() {
        assert!(has_meta("*.rs"));
        assert!(has_meta("a[b]"));
        assert!(!has_meta("plain/name.txt"));
    }

    #[test]
    fn pathological_pattern_terminates() {
        let pattern = "*a".repeat(20) + "b";
        let name = "a".repeat(60);
        assert!(!matches(&pattern, &name));
    }
}

//! The `=*` and `=~` match operators.
//!
//! Both take a subject string on the left and a pattern on the right.
//! The pattern may carry a replacement after the first unescaped `=`
//! (`\=` puts a literal `=` in the pattern). Without a replacement a
//! successful match yields the subject itself; with one it yields the
//! replacement with `$n` capture references expanded. A failed match
//! yields `null`, which is false under the logical operators.
//!
//! Globs translate to anchored regexes: `*` is any run, `?` any single
//! character, `[...]` a character class (`[!...]` negates), and `\x`
//! a literal `x`. Regex patterns match anywhere in the subject.

use regex::Regex;

use crate::errors::{invalid_pattern, EvalResult};
use crate::value::Value;

/// Match `subject` against a glob pattern, whole-string.
pub fn glob_match(subject: &str, pattern: &str) -> EvalResult {
    let (body, replacement) = split_replacement(pattern);
    let translated = format!("^(?:{})$", glob_to_regex(&body));
    let re = Regex::new(&translated).map_err(|e| invalid_pattern(pattern, e.to_string()))?;
    apply(&re, subject, replacement)
}

/// Match `subject` against a regular expression, anywhere.
pub fn regex_match(subject: &str, pattern: &str) -> EvalResult {
    let (body, replacement) = split_replacement(pattern);
    let re = Regex::new(&body).map_err(|e| invalid_pattern(pattern, e.to_string()))?;
    apply(&re, subject, replacement)
}

fn apply(re: &Regex, subject: &str, replacement: Option<String>) -> EvalResult {
    let Some(captures) = re.captures(subject) else {
        return Ok(Value::Null);
    };
    match replacement {
        Some(template) => {
            let mut out = String::new();
            captures.expand(&template, &mut out);
            Ok(Value::Str(out))
        }
        None => Ok(Value::Str(subject.to_owned())),
    }
}

/// Split a pattern at the first unescaped `=`. `\=` stays a literal
/// `=`; every other escape passes through untouched.
fn split_replacement(pattern: &str) -> (String, Option<String>) {
    let mut body = String::with_capacity(pattern.len());
    let mut chars = pattern.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some((_, '=')) => body.push('='),
                Some((_, other)) => {
                    body.push('\\');
                    body.push(other);
                }
                None => body.push('\\'),
            },
            '=' => {
                let replacement = pattern[i + 1..].replace("\\=", "=");
                return (body, Some(replacement));
            }
            other => body.push(other),
        }
    }
    (body, None)
}

/// Translate one glob into regex source.
fn glob_to_regex(glob: &str) -> String {
    let mut out = String::with_capacity(glob.len() * 2);
    let mut chars = glob.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            '[' => {
                out.push('[');
                if chars.peek() == Some(&'!') {
                    chars.next();
                    out.push('^');
                }
                for inner in chars.by_ref() {
                    out.push(inner);
                    if inner == ']' {
                        break;
                    }
                }
            }
            '\\' => {
                if let Some(escaped) = chars.next() {
                    out.push_str(&regex::escape(&escaped.to_string()));
                }
            }
            other => out.push_str(&regex::escape(&other.to_string())),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn glob_match_returns_the_subject() {
        assert_eq!(
            glob_match("foo.java", "*.java"),
            Ok(Value::Str("foo.java".into()))
        );
        assert_eq!(glob_match("foo.class", "*.java"), Ok(Value::Null));
    }

    #[test]
    fn glob_is_anchored() {
        assert_eq!(glob_match("xfoo", "foo"), Ok(Value::Null));
        assert_eq!(glob_match("foo", "foo"), Ok(Value::Str("foo".into())));
        assert_eq!(glob_match("f.o", "f?o"), Ok(Value::Str("f.o".into())));
        assert_eq!(glob_match("fxo", "f[xy]o"), Ok(Value::Str("fxo".into())));
        assert_eq!(glob_match("fzo", "f[!xy]o"), Ok(Value::Str("fzo".into())));
        assert_eq!(glob_match("fxo", "f[!xy]o"), Ok(Value::Null));
    }

    #[test]
    fn glob_escapes_regex_metacharacters() {
        assert_eq!(glob_match("a+b", "a+b"), Ok(Value::Str("a+b".into())));
        assert_eq!(glob_match("aab", "a+b"), Ok(Value::Null));
        // An escaped star is literal.
        assert_eq!(glob_match("a*b", r"a\*b"), Ok(Value::Str("a*b".into())));
        assert_eq!(glob_match("axb", r"a\*b"), Ok(Value::Null));
    }

    #[test]
    fn regex_matches_anywhere() {
        assert_eq!(
            regex_match("abcd", "b.d"),
            Ok(Value::Str("abcd".into()))
        );
        assert_eq!(regex_match("abcd", "^b"), Ok(Value::Null));
    }

    #[test]
    fn replacement_expands_captures() {
        assert_eq!(
            regex_match("foo.java", r"(.*)\.java=$1.class"),
            Ok(Value::Str("foo.class".into()))
        );
        assert_eq!(regex_match("foo.txt", r"(.*)\.java=$1.class"), Ok(Value::Null));
        assert_eq!(
            glob_match("foo.java", "*.java=matched"),
            Ok(Value::Str("matched".into()))
        );
    }

    #[test]
    fn escaped_equals_stays_in_the_pattern() {
        assert_eq!(regex_match("a=b", r"a\=b"), Ok(Value::Str("a=b".into())));
        assert_eq!(
            regex_match("a=b", r"a\=b=yes"),
            Ok(Value::Str("yes".into()))
        );
    }

    #[test]
    fn bad_pattern_is_an_error() {
        assert!(regex_match("x", "(").is_err());
    }
}

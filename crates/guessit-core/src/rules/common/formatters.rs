use crate::rules::common::{SEPS, SEPS_NO_GROUPS, is_sep};
use crate::types::Value;

const CLEAN_CHARS: &[char] = &['_', '.'];
const TITLE_ARTICLES: &[&str] = &["the", "a", "an"];

/// Strips separators from both ends.
#[must_use]
pub fn strip(input: &str) -> &str {
    input.trim_matches(is_sep)
}

/// Replaces dots and underscores by spaces, then strips separators.
#[must_use]
pub fn cleanup(input: &str) -> String {
    let mut clean = input.replace(CLEAN_CHARS, " ");
    if !clean.contains('(') {
        clean = clean.replace(')', " ");
    }
    if !clean.contains('[') {
        clean = clean.replace(']', " ");
    }
    let stripped = strip(&clean);
    let mut out = String::with_capacity(stripped.len());
    let mut last_space = false;
    for c in stripped.chars() {
        if c == ' ' {
            if !last_space {
                out.push(c);
            }
            last_space = true;
        } else {
            out.push(c);
            last_space = false;
        }
    }
    out
}

/// Moves a trailing `, The` article to the front.
#[must_use]
pub fn reorder_title(title: &str) -> String {
    if let Some((head, tail)) = title.rsplit_once(',') {
        let article = tail.trim();
        if TITLE_ARTICLES.iter().any(|a| a.eq_ignore_ascii_case(article)) {
            return format!("{article} {}", head.trim());
        }
    }
    title.to_string()
}

/// `cleanup` then `reorder_title`, the formatter used for title holes.
#[must_use]
pub fn clean_title(input: &str) -> String {
    reorder_title(&cleanup(input))
}

/// Lowercased cleanup, used to compare raw texts.
#[must_use]
pub fn raw_cleanup(input: &str) -> String {
    cleanup(input).to_lowercase()
}

/// Cleans a release group candidate.
///
/// Strips separators, unwraps a fully bracketed name and drops a leading
/// forbidden word (`by`, `for`, ...).
#[must_use]
pub fn clean_groupname(input: &str, ignored_seps: &str, forbidden: &[String]) -> String {
    let mut name = input.trim_matches(|c| SEPS_NO_GROUPS.contains(c)).to_string();
    let inner = name.trim_matches(|c| ignored_seps.contains(c));
    if !inner.contains(|c| ignored_seps.contains(c)) {
        name = inner.to_string();
    }
    loop {
        let Some(word) = forbidden.iter().find(|w| {
            name.get(..w.len()).is_some_and(|head| head.eq_ignore_ascii_case(w))
                && name[w.len()..].starts_with(|c: char| SEPS.contains(c))
        }) else {
            break;
        };
        name = name[word.len()..]
            .trim_matches(|c| SEPS_NO_GROUPS.contains(c))
            .to_string();
    }
    name.trim().to_string()
}

/// Integer formatter.
#[must_use]
pub fn int(raw: &str) -> Option<Value> {
    strip(raw).parse::<i64>().ok().map(Value::Int)
}

/// Lowercase string formatter.
#[must_use]
pub fn lower(raw: &str) -> Option<Value> {
    Some(Value::Str(raw.to_lowercase()))
}

/// `true` when the stripped text parses as an integer.
#[must_use]
pub fn int_coercable(text: &str) -> bool {
    let stripped = strip(text);
    !stripped.is_empty() && stripped.parse::<i64>().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cleanup_replaces_dots_and_underscores() {
        assert_eq!(cleanup("Show.Name."), "Show Name");
        assert_eq!(cleanup("Anime.Title.-."), "Anime Title");
        assert_eq!(cleanup("_The__Title_"), "The Title");
        assert_eq!(cleanup("...---..."), "");
    }

    #[test]
    fn reorder_moves_article() {
        assert_eq!(reorder_title("Simpsons, The"), "The Simpsons");
        assert_eq!(reorder_title("Hello, World"), "Hello, World");
        assert_eq!(clean_title("Simpsons,.The."), "The Simpsons");
    }

    #[test]
    fn groupname_cleanup() {
        let forbidden = vec!["by".to_string(), "rip".to_string()];
        assert_eq!(clean_groupname("-GROUP.", "[]{}()", &forbidden), "GROUP");
        assert_eq!(clean_groupname("[GroupName]", "[]{}()", &forbidden), "GroupName");
        assert_eq!(clean_groupname("by.Someone", "[]{}()", &forbidden), "Someone");
        assert_eq!(clean_groupname("Byzantium", "[]{}()", &forbidden), "Byzantium");
    }

    #[test]
    fn integer_helpers() {
        assert_eq!(int("012"), Some(Value::Int(12)));
        assert_eq!(int("x1"), None);
        assert!(int_coercable(".42."));
        assert!(!int_coercable("4a"));
        assert!(!int_coercable(".."));
    }
}

//! Separators, formatters, validators and comparators shared by the
//! property modules.

pub mod comparators;
pub mod formatters;
pub mod validators;

/// Characters separating words in release names.
pub const SEPS: &str = " [](){}+*|=-_~#/\\.,;:";
/// [`SEPS`] without bracket characters.
pub const SEPS_NO_GROUPS: &str = " +*|=-_~#/\\.,;:";
/// Separators splitting a title into alternative titles.
pub const TITLE_SEPS: &str = "-+/\\|";

#[must_use]
pub fn is_sep(c: char) -> bool {
    SEPS.contains(c)
}

/// `true` when `text` holds nothing but separators.
#[must_use]
pub fn only_seps(text: &str) -> bool {
    text.chars().all(is_sep)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn separators() {
        assert!(is_sep('.'));
        assert!(is_sep('/'));
        assert!(!is_sep('a'));
        assert!(only_seps(" .-"));
        assert!(only_seps(""));
        assert!(!only_seps(".a."));
    }
}

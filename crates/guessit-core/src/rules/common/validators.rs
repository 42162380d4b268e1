use crate::rebulk::{Match, Matches};
use crate::rules::common::is_sep;

/// Character before the match is a separator or the string start.
#[must_use]
pub fn seps_before(matches: &Matches, m: &Match) -> bool {
    matches.input()[..m.start]
        .chars()
        .next_back()
        .is_none_or(is_sep)
}

/// Character after the match is a separator or the string end.
#[must_use]
pub fn seps_after(matches: &Matches, m: &Match) -> bool {
    matches.input()[m.end..].chars().next().is_none_or(is_sep)
}

/// Match is delimited by separators on both sides.
#[must_use]
pub fn seps_surround(matches: &Matches, m: &Match) -> bool {
    seps_before(matches, m) && seps_after(matches, m)
}

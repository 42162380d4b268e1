use std::collections::HashSet;

use crate::rebulk::{Match, Matches, Tags};

/// Matches counted when weighting a marker.
#[must_use]
pub fn marker_comparator_predicate(m: &Match) -> bool {
    !m.private
        && m.name != "proper_count"
        && m.name != "title"
        && !(m.name == "container" && m.tags.contains(Tags::EXTENSION))
        && !(m.name == "other" && m.value.as_str() == Some("Rip"))
}

/// Number of distinct property names inside a marker.
pub fn marker_weight(matches: &Matches, marker: &Match, pred: impl Fn(&Match) -> bool) -> usize {
    matches
        .range(marker.start, marker.end, pred)
        .iter()
        .map(|m| m.name)
        .collect::<HashSet<_>>()
        .len()
}

/// Sorts markers by decreasing weight; ties favour the later marker.
pub fn marker_sorted<'a>(
    markers: Vec<&'a Match>,
    matches: &Matches,
    pred: impl Fn(&Match) -> bool + Copy,
) -> Vec<&'a Match> {
    let mut weighted: Vec<(usize, usize, &Match)> = markers
        .into_iter()
        .enumerate()
        .map(|(index, marker)| (marker_weight(matches, marker, pred), index, marker))
        .collect();
    weighted.sort_by(|a, b| b.0.cmp(&a.0).then(b.1.cmp(&a.1)));
    weighted.into_iter().map(|(_, _, marker)| marker).collect()
}

/// Fileparts in preference order with the default predicate.
#[must_use]
pub fn sorted_fileparts(matches: &Matches) -> Vec<&Match> {
    marker_sorted(
        matches.markers_named("path"),
        matches,
        marker_comparator_predicate,
    )
}

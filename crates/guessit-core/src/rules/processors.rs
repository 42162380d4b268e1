//! Cross-property clean-up rules run around the property modules.

use std::collections::{HashMap, HashSet};

use crate::options::Options;
use crate::rebulk::{Action, Match, Matches, POST_PROCESS, PRE_PROCESS, Rebulk, Rule, Tags};
use crate::rules::common::SEPS_NO_GROUPS;
use crate::rules::common::comparators::{marker_sorted, sorted_fileparts};
use crate::types::Value;

/// Matches touching the inside of a bracket group grow to cover the
/// brackets.
pub struct EnlargeGroupMatches;

impl Rule for EnlargeGroupMatches {
    fn name(&self) -> &'static str {
        "EnlargeGroupMatches"
    }

    fn priority(&self) -> i32 {
        PRE_PROCESS
    }

    fn dependencies(&self) -> &'static [&'static str] {
        &["ConflictSolver"]
    }

    fn when(&self, matches: &Matches, _context: &Options) -> Vec<Action> {
        let mut enlarged: HashMap<usize, Match> = HashMap::new();
        for group in matches.markers_named("group") {
            for m in matches.starting(group.start + 1, |m| !m.is_empty()) {
                let entry = enlarged.entry(m.id()).or_insert_with(|| m.clone());
                entry.start = group.start;
            }
            for m in matches.ending(group.end - 1, |m| !m.is_empty()) {
                let entry = enlarged.entry(m.id()).or_insert_with(|| m.clone());
                entry.end = group.end;
            }
        }
        let mut actions: Vec<(usize, Match)> = enlarged.into_iter().collect();
        actions.sort_by_key(|(id, _)| *id);
        actions
            .into_iter()
            .map(|(id, m)| Action::Update(id, m))
            .collect()
    }
}

/// Removes values of already seen names that disagree with earlier
/// fileparts, visiting fileparts in preference order.
fn remove_ambiguous(
    matches: &Matches,
    fileparts: Vec<&Match>,
    pred: impl Fn(&Match) -> bool,
) -> Vec<Action> {
    let mut previous_names: HashSet<&'static str> = HashSet::new();
    let mut values: HashMap<&'static str, Vec<Value>> = HashMap::new();
    let mut to_remove = Vec::new();
    for filepart in fileparts {
        let mut names = HashSet::new();
        for m in matches.range(filepart.start, filepart.end, |m| pred(m)) {
            names.insert(m.name);
            let known = values.entry(m.name).or_default();
            if known.contains(&m.value) {
                continue;
            }
            if previous_names.contains(m.name) {
                to_remove.push(Action::Remove(m.id()));
            } else {
                known.push(m.value.clone());
            }
        }
        previous_names.extend(names);
    }
    to_remove
}

/// Keeps the values of the most informative filepart when several
/// fileparts disagree.
pub struct RemoveAmbiguous;

impl Rule for RemoveAmbiguous {
    fn name(&self) -> &'static str {
        "RemoveAmbiguous"
    }

    fn priority(&self) -> i32 {
        POST_PROCESS
    }

    fn dependencies(&self) -> &'static [&'static str] {
        &["RemoveLessSpecificSeason", "RemoveLessSpecificEpisode"]
    }

    fn when(&self, matches: &Matches, _context: &Options) -> Vec<Action> {
        remove_ambiguous(matches, sorted_fileparts(matches), |m| {
            !m.private && !m.tags.contains(Tags::EQUIVALENT_IGNORE)
        })
    }
}

/// Keeps the season (or episode) values of the filepart holding the most
/// `SxxExx` evidence.
pub struct RemoveLessSpecificSeasonEpisode {
    name: &'static str,
    property: &'static str,
}

impl RemoveLessSpecificSeasonEpisode {
    #[must_use]
    pub fn season() -> Self {
        Self {
            name: "RemoveLessSpecificSeason",
            property: "season",
        }
    }

    #[must_use]
    pub fn episode() -> Self {
        Self {
            name: "RemoveLessSpecificEpisode",
            property: "episode",
        }
    }
}

impl Rule for RemoveLessSpecificSeasonEpisode {
    fn name(&self) -> &'static str {
        self.name
    }

    fn priority(&self) -> i32 {
        POST_PROCESS
    }

    fn when(&self, matches: &Matches, _context: &Options) -> Vec<Action> {
        let property = self.property;
        let fileparts = marker_sorted(matches.markers_named("path"), matches, |m: &Match| {
            m.name == property && m.tags.contains(Tags::SXXEXX)
        });
        remove_ambiguous(matches, fileparts, |m| m.name == property)
    }
}

/// Offsets of `text` once separators are trimmed from both ends. A
/// separator followed (or preceded) by another one two chars away is kept,
/// so abbreviations like `S.H.I.E.L.D.` survive.
fn strip_raw(text: &str) -> (usize, usize) {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let is_sep = |c: char| SEPS_NO_GROUPS.contains(c);
    let (mut lo, mut hi) = (0, chars.len());
    while lo < hi {
        let third = (lo + 2 < hi).then(|| chars[lo + 2].1);
        if is_sep(chars[lo].1) && third.is_none_or(|c| !is_sep(c)) {
            lo += 1;
        } else {
            break;
        }
    }
    while hi > lo {
        let third = (hi >= lo + 3).then(|| chars[hi - 3].1);
        if is_sep(chars[hi - 1].1) && third.is_none_or(|c| !is_sep(c)) {
            hi -= 1;
        } else {
            break;
        }
    }
    let offset = |i: usize| chars.get(i).map_or(text.len(), |(b, _)| *b);
    (offset(lo), offset(hi))
}

/// Trims separators from the raw region of every match.
pub struct StripSeparators;

impl Rule for StripSeparators {
    fn name(&self) -> &'static str {
        "StripSeparators"
    }

    fn priority(&self) -> i32 {
        POST_PROCESS
    }

    fn dependencies(&self) -> &'static [&'static str] {
        &["RemoveAmbiguous"]
    }

    fn when(&self, matches: &Matches, _context: &Options) -> Vec<Action> {
        matches
            .all()
            .into_iter()
            .filter_map(|m| {
                let (lo, hi) = strip_raw(matches.raw(m));
                let (raw_start, raw_end) = (m.raw_start + lo, m.raw_start + hi);
                if (raw_start, raw_end) == (m.raw_start, m.raw_end) {
                    return None;
                }
                let mut stripped = m.clone();
                stripped.raw_start = raw_start;
                stripped.raw_end = raw_end;
                Some(Action::Update(m.id(), stripped))
            })
            .collect()
    }
}

pub fn processors() -> Rebulk {
    Rebulk::new("processors")
        .rule(EnlargeGroupMatches)
        .rule(RemoveLessSpecificSeasonEpisode::season())
        .rule(RemoveLessSpecificSeasonEpisode::episode())
        .rule(RemoveAmbiguous)
        .rule(StripSeparators)
}

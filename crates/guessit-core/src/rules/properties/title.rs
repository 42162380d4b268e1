//! # Titles
//!
//! Titles are not matched by patterns: they are whatever remains
//! unclaimed at the right place once every other property is known.
//! [`TitleBaseRule`] holds that hole-picking logic; `title`, `film_title`
//! and `episode_title` only differ by which fileparts and holes they
//! consider.

use regex::Regex;
use tracing::warn;

use crate::error::Result;
use crate::options::Options;
use crate::rebulk::{
    Action, ConflictOutcome, Found, HoleOptions, Match, MatchId, Matches, Pattern, Rebulk, Rule,
    Tags,
};
use crate::rebulk::matches::split_on;
use crate::rules::common::comparators::sorted_fileparts;
use crate::rules::common::formatters::{clean_title, raw_cleanup};
use crate::rules::common::validators::seps_surround;
use crate::rules::common::{TITLE_SEPS, is_sep, only_seps};
use crate::types::{MediaType, Value};

/// Formatter for title-like values.
pub(crate) fn title_value(raw: &str) -> Option<Value> {
    Some(Value::Str(clean_title(raw)))
}

/// Spans of `input` matching the expected candidates.
///
/// Candidates prefixed with `re:` are regexes; others are literal words
/// matching across any separator (`OSS 117` finds `OSS.117`).
pub fn find_expected(input: &str, candidates: &[String]) -> Vec<(usize, usize)> {
    let mut ret = Vec::new();
    for candidate in candidates {
        let source = match candidate.strip_prefix("re:") {
            Some(re) => format!("(?i){re}"),
            None => {
                let words: Vec<String> = candidate
                    .split(is_sep)
                    .filter(|w| !w.is_empty())
                    .map(regex::escape)
                    .collect();
                if words.is_empty() {
                    continue;
                }
                format!(r"(?i){}", words.join(r"[\W_]+"))
            }
        };
        match Regex::new(&source) {
            Ok(re) => ret.extend(re.find_iter(input).map(|m| (m.start(), m.end()))),
            Err(err) => warn!(candidate = candidate.as_str(), %err, "ignoring expected value"),
        }
    }
    ret
}

/// Expected values beat anything they overlap.
pub(crate) fn expected_wins(_: &Matches, _: &Match, _: &Match) -> ConflictOutcome {
    ConflictOutcome::RemoveOther
}

pub(crate) fn is_ignored(m: &Match) -> bool {
    matches!(m.name, "language" | "country" | "episode_details")
}

/// Span of a filepart without its trailing path separator.
fn filepart_body(matches: &Matches, filepart: &Match) -> (usize, usize) {
    let text = matches.text(filepart);
    let end = if text.ends_with(['/', '\\']) {
        filepart.end - 1
    } else {
        filepart.end
    };
    (filepart.start, end)
}

/// Removes group marker regions from the holes. A group spanning the
/// whole filepart does not crop.
fn crop_by_groups(matches: &Matches, holes: Vec<Match>) -> Vec<(usize, usize)> {
    let groups: Vec<&Match> = matches
        .markers_named("group")
        .into_iter()
        .filter(|group| {
            matches
                .filepart_of(group)
                .is_none_or(|filepart| filepart_body(matches, filepart) != group.span())
        })
        .collect();

    let mut ret = Vec::new();
    for hole in holes {
        let mut pieces = vec![(hole.start, hole.end)];
        for group in &groups {
            pieces = pieces
                .into_iter()
                .flat_map(|(start, end)| {
                    if group.end <= start || group.start >= end {
                        return vec![(start, end)];
                    }
                    let mut kept = Vec::new();
                    if group.start > start {
                        kept.push((start, group.start));
                    }
                    if group.end < end {
                        kept.push((group.end, end));
                    }
                    kept
                })
                .collect();
        }
        ret.extend(pieces);
    }
    ret
}

/// Hook deciding whether a filepart or a hole is a candidate.
pub type TitleFilter = fn(&Matches, &Match) -> bool;

/// Picks a title-like property from the holes of the most informative
/// filepart.
pub struct TitleBaseRule {
    pub match_name: &'static str,
    /// Name given to the pieces after the first title separator.
    pub alternative_name: Option<&'static str>,
    pub tags: Tags,
    pub filepart_filter: Option<TitleFilter>,
    pub hole_filter: Option<TitleFilter>,
    /// Never absorb `episode_details` into the value.
    pub keep_episode_details: bool,
}

impl TitleBaseRule {
    #[must_use]
    pub fn new(match_name: &'static str) -> Self {
        Self {
            match_name,
            alternative_name: None,
            tags: Tags::TITLE,
            filepart_filter: None,
            hole_filter: None,
            keep_episode_details: false,
        }
    }

    /// Whether an ignored match bordering the hole stays out of the value.
    fn should_keep(
        &self,
        matches: &Matches,
        m: &Match,
        to_keep: &[MatchId],
        filepart: &Match,
        hole: (usize, usize),
        starting: bool,
    ) -> bool {
        if !matches!(m.name, "language" | "country") {
            return false;
        }
        let raw = matches.raw(m);
        if raw_cleanup(matches.slice(hole.0, hole.1)) == raw_cleanup(raw) {
            return true;
        }
        if raw.len() >= 2 && raw.chars().all(|c| c.is_ascii_uppercase()) {
            return true;
        }
        let others = matches.range(filepart.start, filepart.end, |o| {
            o.name == m.name
                && o.id() != m.id()
                && !to_keep.contains(&o.id())
                && (o.end <= hole.0 || o.start >= hole.1)
        });
        others.is_empty() && (!starting || raw.chars().count() <= 3)
    }

    fn should_remove(&self, m: &Match, hole: (usize, usize), context: &Options) -> bool {
        if m.name != "episode_details" {
            return true;
        }
        if self.keep_episode_details {
            return false;
        }
        if context.is_type(MediaType::Episode) {
            return m.start >= hole.0 && m.end <= hole.1;
        }
        true
    }

    /// Title pieces of a hole: the first keeps `match_name`, later ones
    /// become alternative titles. `Spider-Man` stays whole.
    fn split(&self, matches: &Matches, hole: (usize, usize)) -> Vec<Match> {
        let Some(alternative) = self.alternative_name else {
            return vec![self.title_match(matches, hole, self.match_name)];
        };
        let pieces: Vec<(usize, usize)> =
            split_on(matches.slice(hole.0, hole.1), hole.0, TITLE_SEPS)
                .into_iter()
                .filter(|(start, end)| !clean_title(matches.slice(*start, *end)).is_empty())
                .collect();

        let mut merged: Vec<(usize, usize)> = Vec::new();
        for piece in pieces {
            if let Some(last) = merged.last_mut() {
                let separator = matches.slice(last.1, piece.0);
                let glued = separator == "-"
                    && !matches.slice(last.0, last.1).ends_with(is_sep)
                    && !matches.slice(piece.0, piece.1).starts_with(is_sep);
                if glued {
                    last.1 = piece.1;
                    continue;
                }
            }
            merged.push(piece);
        }

        merged
            .into_iter()
            .enumerate()
            .map(|(i, span)| {
                let name = if i == 0 { self.match_name } else { alternative };
                self.title_match(matches, span, name)
            })
            .collect()
    }

    fn title_match(&self, matches: &Matches, span: (usize, usize), name: &'static str) -> Match {
        let mut m = matches.hole(span.0, span.1, Some(clean_title));
        m.name = name;
        m.tags = self.tags;
        m
    }

    fn check_filepart(
        &self,
        matches: &Matches,
        filepart: &Match,
        context: &Options,
    ) -> Option<(Vec<Match>, Vec<MatchId>)> {
        let ignore = |m: &Match| is_ignored(m);
        let options = HoleOptions {
            formatter: Some(clean_title),
            ignore: Some(&ignore),
            seps: None,
        };
        let holes = matches.holes(filepart.start, filepart.end, &options);

        for (start, end) in crop_by_groups(matches, holes) {
            let candidate = matches.hole(start, end, Some(clean_title));
            if candidate.value.is_empty()
                || self.hole_filter.is_some_and(|f| !f(matches, &candidate))
            {
                continue;
            }

            let (mut start, mut end) = (start, end);
            let ignored = matches.range(start, end, is_ignored);
            let mut to_keep: Vec<MatchId> = Vec::new();
            for m in ignored.iter().rev() {
                let trailing = m.end <= end && only_seps(matches.slice(m.end, end));
                if trailing
                    && self.should_keep(matches, m, &to_keep, filepart, (start, end), false)
                {
                    to_keep.push(m.id());
                    end = m.start;
                }
            }
            for m in &ignored {
                if to_keep.contains(&m.id()) {
                    continue;
                }
                let starting = m.start >= start && only_seps(matches.slice(start, m.start));
                if starting
                    && self.should_keep(matches, m, &to_keep, filepart, (start, end), true)
                {
                    to_keep.push(m.id());
                    start = m.end;
                }
            }
            let to_remove: Vec<MatchId> = ignored
                .iter()
                .filter(|m| !to_keep.contains(&m.id()))
                .filter(|m| self.should_remove(m, (start, end), context))
                .map(|m| m.id())
                .collect();

            if start >= end || clean_title(matches.slice(start, end)).is_empty() {
                continue;
            }
            return Some((self.split(matches, (start, end)), to_remove));
        }
        None
    }

    /// Title matches to append and absorbed matches to remove.
    pub fn when(&self, matches: &Matches, context: &Options) -> Vec<Action> {
        if !matches
            .named_where(self.match_name, |m| m.tags.contains(Tags::EXPECTED))
            .is_empty()
        {
            return Vec::new();
        }

        let fileparts: Vec<&Match> = sorted_fileparts(matches)
            .into_iter()
            .filter(|f| self.filepart_filter.is_none_or(|filter| filter(matches, f)))
            .collect();
        let mut year_fileparts: Vec<&Match> = fileparts
            .iter()
            .copied()
            .filter(|f| !matches.range(f.start, f.end, |m| m.name == "year").is_empty())
            .collect();

        let mut titles = Vec::new();
        let mut to_remove: Vec<MatchId> = Vec::new();
        for filepart in &fileparts {
            year_fileparts.retain(|f| f.id() != filepart.id());
            if let Some((found, removed)) = self.check_filepart(matches, filepart, context) {
                titles.extend(found);
                to_remove.extend(removed);
                break;
            }
        }
        // every filepart holding a year also gets its title
        for filepart in year_fileparts {
            if let Some((found, removed)) = self.check_filepart(matches, filepart, context) {
                titles.extend(found);
                to_remove.extend(removed);
            }
        }

        to_remove.sort_unstable();
        to_remove.dedup();
        titles
            .into_iter()
            .map(Action::Append)
            .chain(to_remove.into_iter().map(Action::Remove))
            .collect()
    }
}

/// `title` and `alternative_title` from the best filepart.
pub struct TitleFromPosition {
    base: TitleBaseRule,
}

impl TitleFromPosition {
    #[must_use]
    pub fn new() -> Self {
        let mut base = TitleBaseRule::new("title");
        base.alternative_name = Some("alternative_title");
        Self { base }
    }
}

impl Default for TitleFromPosition {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for TitleFromPosition {
    fn name(&self) -> &'static str {
        "TitleFromPosition"
    }

    fn dependencies(&self) -> &'static [&'static str] {
        &[
            "FilmTitleRule",
            "SubtitlePrefixLanguageRule",
            "SubtitleSuffixLanguageRule",
            "SubtitleExtensionRule",
        ]
    }

    fn properties(&self) -> &'static [&'static str] {
        &["title", "alternative_title"]
    }

    fn when(&self, matches: &Matches, context: &Options) -> Vec<Action> {
        self.base.when(matches, context)
    }
}

/// When several fileparts gave a title, keep those next to a year, a
/// bracketed year first.
pub struct PreferTitleWithYear;

impl Rule for PreferTitleWithYear {
    fn name(&self) -> &'static str {
        "PreferTitleWithYear"
    }

    fn dependencies(&self) -> &'static [&'static str] {
        &["TitleFromPosition"]
    }

    fn when(&self, matches: &Matches, _context: &Options) -> Vec<Action> {
        let titles = matches.named("title");
        let mut with_year_in_group = Vec::new();
        let mut with_year = Vec::new();
        for title in &titles {
            let Some(filepart) = matches.filepart_of(title) else {
                continue;
            };
            let years = matches.range(filepart.start, filepart.end, |m| m.name == "year");
            let Some(year) = years.first() else {
                continue;
            };
            if matches.markers_at_match(year, |m| m.name == "group").is_empty() {
                with_year.push(*title);
            } else {
                with_year_in_group.push(*title);
            }
        }

        let preferred = if with_year_in_group.is_empty() {
            with_year
        } else {
            with_year_in_group
        };
        let kept: Vec<&Value> = if preferred.is_empty() {
            titles.iter().map(|t| &t.value).collect()
        } else {
            preferred.iter().map(|t| &t.value).collect()
        };

        let mut actions: Vec<Action> = titles
            .iter()
            .filter(|t| !kept.contains(&&t.value))
            .map(|t| Action::Remove(t.id()))
            .collect();
        actions.extend(preferred.iter().map(|t| {
            let tagged = (*t).clone().with_tags(Tags::EQUIVALENT_IGNORE);
            Action::Update(t.id(), tagged)
        }));
        actions
    }
}

pub fn title() -> Result<Rebulk> {
    Ok(Rebulk::new("title")
        .disabled(|o| o.is_disabled("title"))
        .pattern(
            Pattern::functional("title", |input, options| {
                find_expected(input, &options.expected_title)
                    .into_iter()
                    .map(|(start, end)| Found::new(start, end))
                    .collect()
            })
            .formatter(title_value)
            .tags(Tags::EXPECTED | Tags::TITLE)
            .validator(seps_surround)
            .conflict_solver(expected_wins)
            .disabled(|o| o.expected_title.is_empty()),
        )
        .rule(TitleFromPosition::new())
        .rule(PreferTitleWithYear))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expected_literals_cross_separators() {
        let spans = find_expected("OSS.117.Cairo", &["OSS 117".to_string()]);
        assert_eq!(spans, vec![(0, 7)]);
        let spans = find_expected("the.show.mkv", &["re:sh.w".to_string()]);
        assert_eq!(spans, vec![(4, 8)]);
        assert!(find_expected("abc", &["re:(".to_string()]).is_empty());
    }

    #[test]
    fn groups_crop_holes() {
        let mut matches = Matches::new("[Grp] Title (x).mkv");
        matches.push(Match::marker(0, 19, "path", Value::from("")));
        matches.push(Match::marker(0, 5, "group", Value::from("")));
        matches.push(Match::marker(12, 15, "group", Value::from("")));
        let hole = matches.hole(0, 15, None);
        assert_eq!(crop_by_groups(&matches, vec![hole]), vec![(5, 12)]);
    }

    #[test]
    fn hyphenated_words_stay_together() {
        let mut base = TitleBaseRule::new("title");
        base.alternative_name = Some("alternative_title");

        let matches = Matches::new("Spider-Man.Homecoming");
        let titles = base.split(&matches, (0, 21));
        assert_eq!(titles.len(), 1);
        assert_eq!(titles[0].value, Value::from("Spider-Man Homecoming"));

        let matches = Matches::new("Show.-.Other.Name");
        let titles = base.split(&matches, (0, 17));
        let names: Vec<&str> = titles.iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["title", "alternative_title"]);
        assert_eq!(titles[1].value, Value::from("Other Name"));
    }

    #[test]
    fn title_from_first_hole() {
        let mut matches = Matches::new("Movie.Title.2020.1080p");
        matches.push(Match::marker(0, 22, "path", Value::from("")));
        matches.push(Match::new(12, 16, "year", Value::Int(2020)));
        matches.push(Match::new(17, 22, "screen_size", Value::from("1080p")));
        let actions = TitleFromPosition::new().when(&matches, &Options::default());
        matches.apply(actions).unwrap();
        let titles = matches.named("title");
        assert_eq!(titles.len(), 1);
        assert_eq!(titles[0].value, Value::from("Movie Title"));
    }

    #[test]
    fn trailing_language_crops_the_title() {
        let mut matches = Matches::new("Movie.Title.FRENCH.720p");
        matches.push(Match::marker(0, 23, "path", Value::from("")));
        matches.push(Match::new(12, 18, "language", Value::from("fr")));
        matches.push(Match::new(19, 23, "screen_size", Value::from("720p")));
        let actions = TitleFromPosition::new().when(&matches, &Options::default());
        matches.apply(actions).unwrap();
        assert_eq!(matches.named("title")[0].value, Value::from("Movie Title"));
        assert_eq!(matches.named("language").len(), 1);
    }

    #[test]
    fn language_inside_the_title_is_absorbed() {
        let mut matches = Matches::new("The.Italian.Job.720p");
        matches.push(Match::marker(0, 20, "path", Value::from("")));
        matches.push(Match::new(4, 11, "language", Value::from("it")));
        matches.push(Match::new(16, 20, "screen_size", Value::from("720p")));
        let actions = TitleFromPosition::new().when(&matches, &Options::default());
        matches.apply(actions).unwrap();
        assert_eq!(matches.named("title")[0].value, Value::from("The Italian Job"));
        assert!(matches.named("language").is_empty());
    }

    #[test]
    fn language_is_kept_only_when_it_is_the_whole_hole() {
        let mut matches = Matches::new("Le.fr.de");
        let filepart = Match::marker(0, 8, "path", Value::from(""));
        matches.push(filepart.clone());
        matches.push(Match::new(3, 5, "language", Value::from("fr")));
        matches.push(Match::new(6, 8, "language", Value::from("de")));
        let rule = TitleBaseRule::new("title");
        let fr = matches.named("language")[0].clone();
        assert!(!rule.should_keep(&matches, &fr, &[], &filepart, (0, 2), false));
        assert!(rule.should_keep(&matches, &fr, &[], &filepart, (3, 5), false));
    }

    #[test]
    fn expected_title_blocks_positional_title() {
        let mut matches = Matches::new("Some.Title.720p");
        matches.push(Match::marker(0, 15, "path", Value::from("")));
        matches.push(
            Match::new(0, 10, "title", Value::from("Some Title")).with_tags(Tags::EXPECTED),
        );
        assert!(TitleFromPosition::new().when(&matches, &Options::default()).is_empty());
    }
}

//! # Episodes
//!
//! Season and episode numbers in their usual spellings (`S01E02`, `1x02`,
//! `Episode 5 of 12`, `E07`, bare `12`), plus the rules untangling them:
//! range expansion (`E01-03`), weak number cleanup and absolute numbering.
//!
//! Every family is a [`Chain`]: a head followed by separator or marker
//! tails. Markers and separators are kept as private children so the rules
//! can see how numbers were written.

use std::collections::{HashMap, HashSet};

use crate::config::{Config, EpisodesConfig};
use crate::error::Result;
use crate::options::Options;
use crate::rebulk::{
    Action, Chain, ConflictOutcome, Disabled, Match, MatchId, Matches, POST_PROCESS, Pattern,
    Rebulk, Rule, Tags,
};
use crate::rules::common::formatters::{int, int_coercable, lower, strip};
use crate::rules::common::only_seps;
use crate::rules::common::validators::seps_surround;
use crate::rules::properties::surrounded_table;
use crate::rules::properties::year::valid_year;
use crate::types::{MediaType, Value};

const SEPARATOR_RANGE_PRIORITY: i32 = -128;
const WEAK_CLEANUP_PRIORITY: i32 = -64;
const REMOVE_WEAK_PRIORITY: i32 = -16;

/// Smallest weak episode number dropped when it stands apart.
const DETACHED_EPISODE_LIMIT: i64 = 10;

const EPISODE_MARKERS: &str = "xe|ex|ep|e|x";

const GROUPS: &[&str] = &[
    "season",
    "episode",
    "version",
    "episode_count",
    "season_count",
    "seasonMarker",
    "episodeMarker",
    "seasonSeparator",
    "episodeSeparator",
    "seasonRepeat",
    "versionMarker",
    "countMarker",
];

/// Children claiming their text without reaching the output.
const PRIVATE_GROUPS: &[&str] = &[
    "seasonMarker",
    "episodeMarker",
    "seasonSeparator",
    "episodeSeparator",
    "seasonRepeat",
    "versionMarker",
    "countMarker",
];

const EPISODE_DETAILS: &[(&str, &str)] = &[
    ("Special", "Special"),
    ("Pilot", "Pilot"),
    ("Unaired", "Unaired"),
    ("Final", "Final"),
];

/// Names whose matches rules treat as scene technical tokens before a
/// weak episode number (`DD5.1 51`, `720p 24`).
const WEAK_BREAKERS: &[&str] = &[
    "audio_codec",
    "screen_size",
    "source",
    "audio_channels",
    "video_codec",
];

/// Longest words first so `and` wins over `a`.
fn alternation(words: &[String]) -> String {
    let mut words: Vec<&String> = words.iter().collect();
    words.sort_by_key(|w| std::cmp::Reverse(w.len()));
    words
        .iter()
        .map(|w| regex::escape(w))
        .collect::<Vec<_>>()
        .join("|")
}

fn is_season_episode(name: &str) -> bool {
    matches!(name, "season" | "episode")
}

fn is_weak_origin(origin: &str) -> bool {
    matches!(origin, "weak_episode" | "weak_duplicate")
}

fn has_marker(matches: &Matches, initiator: &Match, name: &str) -> bool {
    let marker = if name == "season" {
        "seasonMarker"
    } else {
        "episodeMarker"
    };
    matches.children(initiator).iter().any(|c| c.name == marker)
}

/// Weak when tagged so or written with an `x` (`1x02`).
fn is_weak(matches: &Matches, m: &Match, initiator: &Match) -> bool {
    m.tags.contains(Tags::WEAK_EPISODE) || matches.raw(initiator).to_lowercase().contains('x')
}

/// Resolves season and episode conflicts with the other properties.
pub fn season_episode_conflict_solver(
    matches: &Matches,
    m: &Match,
    other: &Match,
) -> ConflictOutcome {
    let initiator = matches.initiator(m);
    let other_initiator = matches.initiator(other);
    let same_initiator = initiator.id() == other_initiator.id();

    // `112` read both whole and split: the split wins
    if is_season_episode(other.name)
        && !same_initiator
        && initiator.span() == other_initiator.span()
    {
        match (initiator.origin, other_initiator.origin) {
            ("weak_episode", "weak_duplicate") => return ConflictOutcome::RemoveMatch,
            ("weak_duplicate", "weak_episode") => return ConflictOutcome::RemoveOther,
            _ => {}
        }
    }

    if m.name == other.name {
        return ConflictOutcome::Default;
    }
    if m.name == "episode" && other.name == "year" {
        return ConflictOutcome::RemoveMatch;
    }
    if !is_season_episode(m.name) {
        return ConflictOutcome::Default;
    }
    match other.name {
        "video_codec" | "audio_codec" | "container" | "date" => ConflictOutcome::RemoveMatch,
        "audio_channels"
            if !other.tags.contains(Tags::WEAK_AUDIO_CHANNELS)
                && !has_marker(matches, initiator, m.name) =>
        {
            ConflictOutcome::RemoveMatch
        }
        "screen_size" if !int_coercable(matches.raw(other)) => ConflictOutcome::RemoveMatch,
        "season" | "episode" if !same_initiator => {
            if is_weak_origin(initiator.origin) && is_weak_origin(other_initiator.origin) {
                ConflictOutcome::Default
            } else if is_weak(matches, m, initiator) {
                ConflictOutcome::RemoveMatch
            } else if is_weak(matches, other, other_initiator) {
                ConflictOutcome::RemoveOther
            } else {
                ConflictOutcome::Default
            }
        }
        _ => ConflictOutcome::Default,
    }
}

/// Regex sources for the tails shared by several families.
struct Tails {
    seps: String,
}

impl Tails {
    /// `-03`, `&E04`, `to 05`.
    fn episode_range(&self, markers: &str) -> String {
        format!(
            r"[ ._-]*(?P<episodeSeparator>{})[ ._-]*(?:(?P<episodeMarker>{markers})[ ._-]?)?(?P<episode>\d+)",
            self.seps
        )
    }

    /// `-1x04`: the season is repeated in front of the closing episode.
    fn episode_range_nxnn(&self) -> String {
        format!(
            r"[ ._-]*(?P<episodeSeparator>{})[ ._-]*(?:(?P<seasonRepeat>\d{{1,2}})(?P<episodeMarker>x))?(?P<episode>\d+)",
            self.seps
        )
    }

    /// `E03` glued to the previous piece.
    fn episode_glued(markers: &str) -> String {
        format!(r"(?P<episodeMarker>{markers})(?P<episode>\d+)")
    }

    fn season_range(&self, markers: &str) -> String {
        format!(
            r"[ ._-]*(?P<seasonSeparator>{})[ ._-]*(?:(?P<seasonMarker>{markers})[ ._-]?)?(?P<season>\d+)",
            self.seps
        )
    }

    fn season_glued(markers: &str) -> String {
        format!(r"(?P<seasonMarker>{markers})(?P<season>\d+)")
    }

    fn version() -> String {
        r"(?P<versionMarker>v)(?P<version>\d+)".to_string()
    }

    fn count(of_words: &str, name: &str) -> String {
        format!(r"[ ._-]*(?P<countMarker>{of_words})[ ._-]*(?P<{name}>\d+)")
    }
}

fn chain_pattern(
    origin: &'static str,
    chain: Chain,
    tags: Tags,
    disabled: Disabled,
) -> Pattern {
    Pattern::functional("episode", move |input, _| chain.find(input))
        .origin(origin)
        .tags(tags)
        .children(GROUPS)
        .private_children(PRIVATE_GROUPS)
        .formatter(int)
        .child_formatter("seasonMarker", lower)
        .child_formatter("episodeMarker", lower)
        .child_formatter("seasonSeparator", lower)
        .child_formatter("episodeSeparator", lower)
        .child_formatter("versionMarker", lower)
        .child_formatter("countMarker", lower)
        .validator(seps_surround)
        .conflict_solver(season_episode_conflict_solver)
        .disabled(disabled)
}

fn no_season_episode(o: &Options) -> bool {
    o.is_disabled("season") && o.is_disabled("episode")
}

fn no_weak_episode(o: &Options) -> bool {
    o.is_type(MediaType::Movie) || o.is_disabled("episode")
}

fn chains(config: &EpisodesConfig) -> Result<Vec<Pattern>> {
    let separators: Vec<String> = config
        .range_separators
        .iter()
        .chain(&config.discrete_separators)
        .cloned()
        .collect();
    let tails = Tails {
        seps: alternation(&separators),
    };
    let season_words = alternation(&config.season_words);
    let episode_words = alternation(&config.episode_words);
    let of_words = alternation(&config.of_words);

    let episode_tails = vec![
        tails.episode_range(EPISODE_MARKERS),
        Tails::episode_glued(EPISODE_MARKERS),
        Tails::version(),
    ];

    Ok(vec![
        chain_pattern(
            "SxxExx",
            Chain::new(
                &format!(
                    r"(?P<seasonMarker>S)(?P<season>\d{{1,3}})[ ._-]?(?P<episodeMarker>{EPISODE_MARKERS})[ ._-]?(?P<episode>\d{{1,4}})"
                ),
                &episode_tails,
                GROUPS,
            )?,
            Tags::SXXEXX,
            no_season_episode,
        ),
        chain_pattern(
            "Sxx",
            Chain::new(
                r"(?P<seasonMarker>S)(?P<season>\d{1,3})",
                &[tails.season_range("s"), Tails::season_glued("s")],
                GROUPS,
            )?,
            Tags::SXXEXX,
            |o| o.is_disabled("season"),
        ),
        chain_pattern(
            "NxNN",
            Chain::new(
                r"(?P<season>\d{1,2})(?P<episodeMarker>x)(?P<episode>\d{2,3})",
                &[
                    tails.episode_range_nxnn(),
                    Tails::episode_glued("x"),
                    Tails::version(),
                ],
                GROUPS,
            )?,
            Tags::SXXEXX,
            no_season_episode,
        ),
        chain_pattern(
            "episode_words",
            Chain::new(
                &format!(r"(?P<episodeMarker>{episode_words})[ ._-]*(?P<episode>\d+)"),
                &[
                    tails.episode_range(&format!("{episode_words}|e")),
                    Tails::count(&of_words, "episode_count"),
                    Tails::version(),
                ],
                GROUPS,
            )?,
            Tags::empty(),
            |o| o.is_disabled("episode"),
        ),
        chain_pattern(
            "season_words",
            Chain::new(
                &format!(r"(?P<seasonMarker>{season_words})[ ._-]*(?P<season>\d+)"),
                &[
                    tails.season_range(&season_words),
                    Tails::count(&of_words, "season_count"),
                ],
                GROUPS,
            )?,
            Tags::empty(),
            |o| o.is_disabled("season"),
        ),
        chain_pattern(
            "Exx",
            Chain::new(r"(?P<episodeMarker>e)(?P<episode>\d{1,4})", &episode_tails, GROUPS)?,
            Tags::empty(),
            |o| o.is_disabled("episode"),
        ),
        chain_pattern(
            "weak_episode",
            Chain::new(
                r"(?P<episode>\d{2})",
                &[
                    format!(
                        r"[ ._-]*(?P<episodeSeparator>{})[ ._-]*(?P<episode>\d{{2}})",
                        tails.seps
                    ),
                    Tails::version(),
                ],
                GROUPS,
            )?,
            Tags::WEAK_EPISODE,
            no_weak_episode,
        ),
        chain_pattern(
            "weak_episode",
            Chain::new(r"(?P<episode>\d{3,4})", &[Tails::version()], GROUPS)?,
            Tags::WEAK_EPISODE,
            no_weak_episode,
        ),
        chain_pattern(
            "weak_duplicate",
            Chain::new(r"(?P<season>\d{1,2})(?P<episode>\d{2})", &[Tails::version()], GROUPS)?,
            Tags::WEAK_EPISODE | Tags::WEAK_DUPLICATE,
            |o| o.episode_prefer_number || no_weak_episode(o),
        ),
        chain_pattern(
            "weak_digit",
            Chain::new(r"(?P<episode>\d)", &[Tails::version()], GROUPS)?,
            Tags::WEAK_EPISODE,
            |o| !o.is_type(MediaType::Episode) || o.is_disabled("episode"),
        ),
    ])
}

/// Builds the episodes module.
///
/// # Errors
///
/// Returns `GuessitError::RegexError` when a configured word breaks a
/// pattern.
pub fn episodes(config: &Config) -> Result<Rebulk> {
    let episodes = &config.episodes;
    let details = surrounded_table("episode_details", EPISODE_DETAILS)?
        .into_iter()
        .map(|p| p.disabled(|o| o.is_disabled("episode_details")));

    Ok(Rebulk::new("episodes")
        .disabled(|o| no_season_episode(o) && o.is_disabled("episode_details"))
        .patterns(chains(episodes)?)
        .patterns(details)
        .rule(SeparatorRange::episode(episodes))
        .rule(SeparatorRange::season(episodes))
        .rule(RemoveWeakIfMovie)
        .rule(RemoveWeakIfSxxExx)
        .rule(RemoveWeakDuplicate)
        .rule(RemoveDetachedEpisodeNumber)
        .rule(RemoveWeak)
        .rule(RenameToAbsoluteEpisode)
        .rule(EpisodeDetailValidator)
        .rule(SeasonYear))
}

/// Expands `E01-03` into episodes 1, 2 and 3.
///
/// A separator from the range set between two values of the property adds
/// a copy of the second match for every missing value. Separators from the
/// discrete set (`+`, `&`) leave both sides alone.
pub struct SeparatorRange {
    name: &'static str,
    property: &'static str,
    separator: &'static str,
    range_separators: Vec<String>,
    max_range: i64,
}

impl SeparatorRange {
    #[must_use]
    pub fn episode(config: &EpisodesConfig) -> Self {
        Self {
            name: "EpisodeSeparatorRange",
            property: "episode",
            separator: "episodeSeparator",
            range_separators: config.range_separators.clone(),
            max_range: config.episode_max_range,
        }
    }

    #[must_use]
    pub fn season(config: &EpisodesConfig) -> Self {
        Self {
            name: "SeasonSeparatorRange",
            property: "season",
            separator: "seasonSeparator",
            range_separators: config.range_separators.clone(),
            max_range: config.season_max_range,
        }
    }

    fn is_range(&self, separator: &str) -> bool {
        self.range_separators
            .iter()
            .any(|r| r.eq_ignore_ascii_case(separator))
    }

    /// Synthetic matches between `prev` and `next`. The copy of `next`
    /// replaces the original so values keep ascending.
    fn expand(&self, prev: &Match, next: &Match) -> Vec<Action> {
        let (Some(first), Some(last)) = (prev.value.as_int(), next.value.as_int()) else {
            return Vec::new();
        };
        let Some(gap) = last.checked_sub(first) else {
            return Vec::new();
        };
        if gap <= 1 || gap > self.max_range {
            return Vec::new();
        }
        let mut actions: Vec<Action> = (first + 1..last)
            .map(|value| {
                let mut m = next.clone();
                m.value = Value::Int(value);
                Action::Append(m)
            })
            .collect();
        actions.push(Action::Append(next.clone()));
        actions.push(Action::Remove(next.id()));
        actions
    }
}

impl Rule for SeparatorRange {
    fn name(&self) -> &'static str {
        self.name
    }

    fn priority(&self) -> i32 {
        SEPARATOR_RANGE_PRIORITY
    }

    fn when(&self, matches: &Matches, _context: &Options) -> Vec<Action> {
        let mut actions = Vec::new();
        for separator in matches.named(self.separator) {
            let prev = matches.previous(separator, |m| m.name == self.property);
            let next = matches.next(separator, |m| m.name == self.property);
            if let (Some(prev), Some(next)) = (prev.first(), next.first()) {
                if separator.value.as_str().is_some_and(|s| self.is_range(s)) {
                    actions.extend(self.expand(prev, next));
                }
            }
        }

        // `S01E01-S01E03` and `01-03` split over two chains
        let named = matches.named(self.property);
        for pair in named.windows(2) {
            let (prev, next) = (pair[0], pair[1]);
            let (prev_initiator, next_initiator) =
                (matches.initiator(prev), matches.initiator(next));
            if prev_initiator.id() == next_initiator.id()
                || prev_initiator.end > next_initiator.start
            {
                continue;
            }
            let between = matches.slice(prev_initiator.end, next_initiator.start);
            if self.is_range(between) || self.is_range(strip(between)) {
                actions.extend(self.expand(prev, next));
            }
        }
        actions
    }
}

fn episode_children(matches: &Matches, initiator: &Match) -> usize {
    matches
        .children(initiator)
        .iter()
        .filter(|c| c.name == "episode")
        .count()
}

/// With a year around, bare numbers are not episodes unless the type says
/// so.
pub struct RemoveWeakIfMovie;

impl Rule for RemoveWeakIfMovie {
    fn name(&self) -> &'static str {
        "RemoveWeakIfMovie"
    }

    fn priority(&self) -> i32 {
        WEAK_CLEANUP_PRIORITY
    }

    fn enabled(&self, context: &Options) -> bool {
        !context.is_type(MediaType::Episode)
    }

    fn when(&self, matches: &Matches, _context: &Options) -> Vec<Action> {
        let mut to_remove: Vec<MatchId> = Vec::new();
        let mut ranges: HashSet<MatchId> = HashSet::new();
        let mut has_year = false;

        for filepart in matches.markers_named("path") {
            let Some(year) = matches
                .range(filepart.start, filepart.end, |m| m.name == "year")
                .into_iter()
                .next()
            else {
                continue;
            };
            has_year = true;
            for episode in matches.range(filepart.start, filepart.end, |m| m.name == "episode") {
                let initiator = matches.initiator(episode);
                if episode_children(matches, initiator) > 1 {
                    ranges.insert(initiator.id());
                }
            }
            to_remove.extend(matches.conflicting(year).iter().map(|m| m.id()));
        }

        if has_year {
            to_remove.extend(
                matches
                    .tagged(Tags::WEAK_EPISODE)
                    .iter()
                    .filter(|m| !ranges.contains(&matches.initiator(m).id()))
                    .map(|m| m.id()),
            );
        }
        to_remove.into_iter().map(Action::Remove).collect()
    }
}

/// A filepart holding an `SxxExx` match keeps weak numbers only when they
/// open the filepart (`28. Show S02E05`).
pub struct RemoveWeakIfSxxExx;

impl Rule for RemoveWeakIfSxxExx {
    fn name(&self) -> &'static str {
        "RemoveWeakIfSxxExx"
    }

    fn priority(&self) -> i32 {
        WEAK_CLEANUP_PRIORITY
    }

    fn when(&self, matches: &Matches, _context: &Options) -> Vec<Action> {
        let mut actions = Vec::new();
        for filepart in matches.markers_named("path") {
            let strong = matches.range(filepart.start, filepart.end, |m| {
                !m.private && m.tags.contains(Tags::SXXEXX)
            });
            if strong.is_empty() {
                continue;
            }
            for weak in matches.range(filepart.start, filepart.end, |m| {
                m.tags.contains(Tags::WEAK_EPISODE)
            }) {
                if weak.start != filepart.start
                    || matches.initiator(weak).origin != "weak_episode"
                {
                    actions.push(Action::Remove(weak.id()));
                }
            }
        }
        actions
    }
}

/// `The 100.109`: only the last duplicate split of a filepart survives.
pub struct RemoveWeakDuplicate;

impl Rule for RemoveWeakDuplicate {
    fn name(&self) -> &'static str {
        "RemoveWeakDuplicate"
    }

    fn priority(&self) -> i32 {
        WEAK_CLEANUP_PRIORITY
    }

    fn when(&self, matches: &Matches, _context: &Options) -> Vec<Action> {
        let mut actions = Vec::new();
        for filepart in matches.markers_named("path") {
            let mut seen: HashMap<&str, HashSet<&str>> = HashMap::new();
            let duplicates = matches.range(filepart.start, filepart.end, |m| {
                m.tags.contains(Tags::WEAK_DUPLICATE)
            });
            for m in duplicates.into_iter().rev() {
                if !seen.entry(m.name).or_default().insert(m.origin) {
                    actions.push(Action::Remove(m.id()));
                }
            }
        }
        actions
    }
}

/// A small weak episode number not followed by its successor is noise
/// (`Show.5.24`).
pub struct RemoveDetachedEpisodeNumber;

impl Rule for RemoveDetachedEpisodeNumber {
    fn name(&self) -> &'static str {
        "RemoveDetachedEpisodeNumber"
    }

    fn priority(&self) -> i32 {
        WEAK_CLEANUP_PRIORITY
    }

    fn when(&self, matches: &Matches, _context: &Options) -> Vec<Action> {
        let mut values = HashSet::new();
        let mut numbers: Vec<(i64, MatchId)> = matches
            .named_where("episode", |m| !m.private && m.tags.contains(Tags::WEAK_EPISODE))
            .into_iter()
            .filter_map(|m| Some((m.value.as_int()?, m.id())))
            .filter(|(value, _)| values.insert(*value))
            .collect();
        numbers.sort_by_key(|(value, _)| *value);

        match numbers.as_slice() {
            [(first, id), (second, _), ..]
                if *first < DETACHED_EPISODE_LIMIT && second - first != 1 =>
            {
                vec![Action::Remove(*id)]
            }
            _ => Vec::new(),
        }
    }
}

/// Weak numbers right after technical tokens (`DD5.1 24`) are dropped.
pub struct RemoveWeak;

impl Rule for RemoveWeak {
    fn name(&self) -> &'static str {
        "RemoveWeak"
    }

    fn priority(&self) -> i32 {
        REMOVE_WEAK_PRIORITY
    }

    fn when(&self, matches: &Matches, _context: &Options) -> Vec<Action> {
        let mut actions = Vec::new();
        for filepart in matches.markers_named("path") {
            let weaks = matches.range(filepart.start, filepart.end, |m| {
                m.tags.contains(Tags::WEAK_EPISODE)
            });
            let Some(first) = weaks.first() else {
                continue;
            };
            let previous = matches.previous(first, |m| !m.private);
            let breaks = previous.first().is_some_and(|p| {
                WEAK_BREAKERS.contains(&p.name) && only_seps(matches.slice(p.end, first.start))
            });
            if breaks {
                actions.extend(weaks.iter().map(|m| Action::Remove(m.id())));
            }
        }
        actions
    }
}

/// Renames the higher of two episode groups to `absolute_episode`
/// (`S02E04-06 25-27`), or a weak number opening the filepart when other
/// episodes follow (`28. Show S02E05`).
pub struct RenameToAbsoluteEpisode;

impl Rule for RenameToAbsoluteEpisode {
    fn name(&self) -> &'static str {
        "RenameToAbsoluteEpisode"
    }

    fn properties(&self) -> &'static [&'static str] {
        &["absolute_episode"]
    }

    fn enabled(&self, context: &Options) -> bool {
        !context.is_disabled("absolute_episode")
    }

    fn when(&self, matches: &Matches, _context: &Options) -> Vec<Action> {
        let rename = |ms: Vec<&Match>| -> Vec<Action> {
            ms.into_iter()
                .map(|m| Action::Rename(m.id(), "absolute_episode"))
                .collect()
        };

        let mut initiators: Vec<&Match> = Vec::new();
        for episode in matches.named("episode") {
            let initiator = matches.initiator(episode);
            if episode_children(matches, initiator) > 1
                && !initiators.iter().any(|i| i.id() == initiator.id())
            {
                initiators.push(initiator);
            }
        }

        if initiators.len() != 2 {
            let mut ret = Vec::new();
            for filepart in matches.markers_named("path") {
                let followed = !matches
                    .filter(|m| {
                        m.name == "episode" && m.start > filepart.start && m.start < filepart.end
                    })
                    .is_empty();
                if followed {
                    ret.extend(matches.starting(filepart.start, |m| {
                        m.name == "episode" && matches.initiator(m).origin == "weak_episode"
                    }));
                }
            }
            return rename(ret);
        }

        initiators.sort_by_key(|i| i.end);
        let (first, second) = (initiators[0], initiators[1]);
        if first.end > second.start || !only_seps(matches.slice(first.end, second.start)) {
            return Vec::new();
        }
        let first_range =
            matches.named_where("episode", |m| matches.initiator(m).id() == first.id());
        let second_range =
            matches.named_where("episode", |m| matches.initiator(m).id() == second.id());
        if first_range.len() != second_range.len() {
            return Vec::new();
        }
        let first_value = first_range.first().and_then(|m| m.value.as_int());
        let second_value = second_range.first().and_then(|m| m.value.as_int());
        match (first_value, second_value) {
            (Some(a), Some(b)) if b > a => rename(second_range),
            (Some(a), Some(b)) if a > b => rename(first_range),
            _ => Vec::new(),
        }
    }
}

/// Keeps `Special`, `Pilot`... only as standalone words next to a season or
/// episode, or when the input is known to be an episode.
pub struct EpisodeDetailValidator;

impl Rule for EpisodeDetailValidator {
    fn name(&self) -> &'static str {
        "EpisodeDetailValidator"
    }

    fn priority(&self) -> i32 {
        POST_PROCESS
    }

    fn when(&self, matches: &Matches, context: &Options) -> Vec<Action> {
        let season_episode = |m: &Match| !m.private && is_season_episode(m.name);
        matches
            .named("episode_details")
            .into_iter()
            .filter(|detail| {
                let neighbour = !matches.previous(detail, season_episode).is_empty()
                    || !matches.next(detail, season_episode).is_empty();
                !(seps_surround(matches, detail)
                    && (neighbour || context.is_type(MediaType::Episode)))
            })
            .map(|m| Action::Remove(m.id()))
            .collect()
    }
}

/// A season that reads as a year also gives the year when none was found.
pub struct SeasonYear;

impl Rule for SeasonYear {
    fn name(&self) -> &'static str {
        "SeasonYear"
    }

    fn priority(&self) -> i32 {
        POST_PROCESS
    }

    fn properties(&self) -> &'static [&'static str] {
        &["year"]
    }

    fn enabled(&self, context: &Options) -> bool {
        !context.is_disabled("year")
    }

    fn when(&self, matches: &Matches, _context: &Options) -> Vec<Action> {
        if !matches.named("year").is_empty() {
            return Vec::new();
        }
        matches
            .named_where("season", |m| m.value.as_int().is_some_and(valid_year))
            .into_iter()
            .map(|season| {
                Action::Append(Match::new(
                    season.start,
                    season.end,
                    "year",
                    season.value.clone(),
                ))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rebulk::Engine;
    use crate::rules::markers::markers;
    use crate::rules::properties::year::year;

    fn engine() -> Engine {
        let config = Config::default_config().unwrap();
        Engine::new(vec![markers(&config), episodes(&config).unwrap(), year().unwrap()]).unwrap()
    }

    fn run(input: &str, options: &Options) -> Matches {
        engine().run(input, options).unwrap()
    }

    fn ints(matches: &Matches, name: &str) -> Vec<i64> {
        matches
            .named(name)
            .iter()
            .filter_map(|m| m.value.as_int())
            .collect()
    }

    #[test]
    fn sxxexx() {
        let matches = run("Show.Name.S01E02.720p.HDTV.x264-GROUP.mkv", &Options::default());
        assert_eq!(ints(&matches, "season"), vec![1]);
        assert_eq!(ints(&matches, "episode"), vec![2]);
        assert!(matches.named("episodeMarker").is_empty());
    }

    #[test]
    fn range_separator_expands() {
        let matches = run("Show.S01E03-05.mkv", &Options::default());
        assert_eq!(ints(&matches, "episode"), vec![3, 4, 5]);
    }

    #[test]
    fn discrete_separator_does_not_expand() {
        let matches = run("Show.S01E03+05.mkv", &Options::default());
        assert_eq!(ints(&matches, "episode"), vec![3, 5]);
    }

    #[test]
    fn huge_ranges_are_not_expanded() {
        let matches = run("Show.S01E01-250.mkv", &Options::default());
        assert_eq!(ints(&matches, "episode"), vec![1, 250]);
    }

    #[test]
    fn season_range() {
        let matches = run("Show.S01-S03.Complete.mkv", &Options::default());
        assert_eq!(ints(&matches, "season"), vec![1, 2, 3]);
    }

    #[test]
    fn nxnn_and_words() {
        let matches = run("Show.1x02.mkv", &Options::default());
        assert_eq!(ints(&matches, "season"), vec![1]);
        assert_eq!(ints(&matches, "episode"), vec![2]);

        let matches = run("Show.Episode.5.of.12.mkv", &Options::default());
        assert_eq!(ints(&matches, "episode"), vec![5]);
        assert_eq!(ints(&matches, "episode_count"), vec![12]);
    }

    #[test]
    fn nxnn_range_repeats_the_season() {
        let matches = run("Show.Name.1x02-1x04.mkv", &Options::default());
        assert_eq!(ints(&matches, "episode"), vec![2, 3, 4]);
        assert_eq!(ints(&matches, "season"), vec![1]);
        assert!(matches.named("seasonRepeat").is_empty());
    }

    #[test]
    fn markers_stay_private() {
        let matches = run("Show.Name.Season.2.Episode.5.mkv", &Options::default());
        assert_eq!(ints(&matches, "season"), vec![2]);
        assert_eq!(ints(&matches, "episode"), vec![5]);

        let matches = run("Show.S01E02v2.mkv", &Options::default());
        assert_eq!(ints(&matches, "version"), vec![2]);
        for name in ["seasonMarker", "episodeMarker", "versionMarker"] {
            assert!(matches.named(name).is_empty(), "{name} leaked");
        }
    }

    #[test]
    fn range_bounds_near_the_integer_limit() {
        let matches = run(
            "Show.Episode.9223372036854775807-9223372036854775807.mkv",
            &Options::default(),
        );
        let episodes = ints(&matches, "episode");
        assert!(!episodes.is_empty());
        assert!(episodes.iter().all(|&e| e == i64::MAX));
    }

    #[test]
    fn three_digits_split_unless_number_preferred() {
        let matches = run("Show.Name.112.mkv", &Options::default());
        assert_eq!(ints(&matches, "season"), vec![1]);
        assert_eq!(ints(&matches, "episode"), vec![12]);

        let options = Options::default().with_episode_prefer_number(true);
        let matches = run("Show.Name.112.mkv", &options);
        assert!(ints(&matches, "season").is_empty());
        assert_eq!(ints(&matches, "episode"), vec![112]);
    }

    #[test]
    fn year_beats_weak_numbers() {
        let matches = run("Movie.Title.2010.mkv", &Options::default());
        assert_eq!(ints(&matches, "year"), vec![2010]);
        assert!(matches.named("episode").is_empty());
        assert!(matches.named("season").is_empty());
    }

    #[test]
    fn weak_numbers_yield_to_sxxexx() {
        let matches = run("Show.S01E02.03.mkv", &Options::default());
        assert_eq!(ints(&matches, "episode"), vec![2]);
    }

    #[test]
    fn detached_small_number_is_dropped() {
        let matches = run("Show.Name.03.45.mkv", &Options::default());
        assert_eq!(ints(&matches, "episode"), vec![45]);
    }

    #[test]
    fn leading_number_becomes_absolute() {
        let matches = run("28. Anime Name S02E05.mkv", &Options::default());
        assert_eq!(ints(&matches, "absolute_episode"), vec![28]);
        assert_eq!(ints(&matches, "episode"), vec![5]);
    }

    #[test]
    fn episode_details_need_context() {
        let matches = run("Show.S01.Special.mkv", &Options::default());
        assert_eq!(matches.named("episode_details").len(), 1);
        let matches = run("Show.Pilot.mkv", &Options::default());
        assert!(matches.named("episode_details").is_empty());
        let options = Options::default().with_type(MediaType::Episode);
        let matches = run("Show.Pilot.mkv", &options);
        assert_eq!(matches.named("episode_details").len(), 1);
    }

    #[test]
    fn season_reads_as_year() {
        let matches = run("Show.Season.2010.mkv", &Options::default().with_exclude("year"));
        assert!(matches.named("year").is_empty());
        let config = Config::default_config().unwrap();
        let engine = Engine::new(vec![markers(&config), episodes(&config).unwrap()]).unwrap();
        let matches = engine.run("Show.Season.2010.mkv", &Options::default()).unwrap();
        assert_eq!(ints(&matches, "year"), vec![2010]);
    }

    #[test]
    fn solver_prefers_codecs() {
        let mut matches = Matches::new("x264");
        let episode = Match::new(1, 4, "episode", Value::Int(264));
        let codec = Match::new(0, 4, "video_codec", Value::from("h264"));
        matches.push(episode.clone());
        matches.push(codec.clone());
        assert_eq!(
            season_episode_conflict_solver(&matches, &episode, &codec),
            ConflictOutcome::RemoveMatch
        );
    }
}

//! # Release groups
//!
//! Scene names end with `-GROUP` right after technical properties; anime
//! names carry the group in a bracket group (`[Group] Title - 01`). Both
//! are read from what remains once titles are known. Expected groups given
//! in the options are matched up front and win every conflict.

use crate::config::Config;
use crate::error::Result;
use crate::options::Options;
use crate::rebulk::{
    Action, Found, HoleOptions, Match, MatchId, Matches, Pattern, Rebulk, Rule, Tags,
};
use crate::rules::common::comparators::sorted_fileparts;
use crate::rules::common::formatters::{cleanup, clean_groupname, int_coercable, strip};
use crate::rules::common::only_seps;
use crate::rules::common::validators::seps_surround;
use crate::rules::properties::title::{expected_wins, find_expected};
use crate::types::Value;

/// Properties that may directly precede a scene group.
const SCENE_PREVIOUS_NAMES: &[&str] = &[
    "video_codec",
    "color_depth",
    "source",
    "audio_codec",
    "audio_channels",
    "screen_size",
    "other",
    "container",
    "language",
    "subtitle_language",
    "subtitlePrefix",
    "subtitleSuffix",
];

fn is_previous_match(m: &Match) -> bool {
    (SCENE_PREVIOUS_NAMES.contains(&m.name) || m.tags.contains(Tags::RELEASE_GROUP_PREFIX))
        && !m.tags.contains(Tags::NO_RELEASE_GROUP_PREFIX)
}

/// Group name cleaning settings.
#[derive(Debug, Clone)]
struct GroupName {
    ignored_seps: String,
    forbidden: Vec<String>,
}

impl GroupName {
    fn new(config: &Config) -> Self {
        Self {
            ignored_seps: config.release_group.ignored_seps.clone(),
            forbidden: config.release_group.forbidden_names.clone(),
        }
    }

    fn clean(&self, raw: &str) -> String {
        clean_groupname(raw, &self.ignored_seps, &self.forbidden)
    }
}

/// `...x264-GROUP.mkv`: the last hole of a filepart, right after a
/// technical property.
pub struct SceneReleaseGroup {
    name: GroupName,
}

impl SceneReleaseGroup {
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            name: GroupName::new(config),
        }
    }

    fn filepart_group(&self, matches: &Matches, filepart: &Match) -> Option<(Match, Vec<MatchId>)> {
        let extra_titles: Vec<MatchId> = matches
            .range(filepart.start, filepart.end, |m| m.name == "title")
            .iter()
            .skip(1)
            .map(|m| m.id())
            .collect();
        let ignore = |m: &Match| extra_titles.contains(&m.id());
        let options = HoleOptions {
            formatter: None,
            ignore: Some(&ignore),
            seps: None,
        };
        let (hole, value) = matches
            .holes(filepart.start, filepart.end, &options)
            .into_iter()
            .rev()
            .find_map(|hole| {
                let value = self.name.clean(matches.text(&hole));
                (!cleanup(&value).is_empty()).then_some((hole, value))
            })?;

        let previous = matches
            .previous(&hole, |m| {
                m.start >= filepart.start
                    && (!m.private || SCENE_PREVIOUS_NAMES.contains(&m.name))
            })
            .into_iter()
            .next()?;
        if !is_previous_match(previous)
            || !only_seps(matches.slice(previous.end, hole.start))
            || int_coercable(&value)
        {
            return None;
        }

        let mut group = Match::new(hole.start, hole.end, "release_group", Value::Str(value))
            .with_tags(Tags::SCENE);
        let bracket = matches
            .markers_at_match(&hole, |m| m.name == "group")
            .into_iter()
            .next();
        if let Some(bracket) = bracket {
            if self.name.clean(matches.text(bracket)) == group.value.to_string() {
                group = group.with_span(bracket.start + 1, bracket.end - 1);
                group.tags = Tags::ANIME;
            }
        }
        let absorbed = matches
            .range(group.start, group.end, |m| extra_titles.contains(&m.id()))
            .iter()
            .map(|m| m.id())
            .collect();
        Some((group, absorbed))
    }
}

impl Rule for SceneReleaseGroup {
    fn name(&self) -> &'static str {
        "SceneReleaseGroup"
    }

    fn dependencies(&self) -> &'static [&'static str] {
        &["TitleFromPosition"]
    }

    fn properties(&self) -> &'static [&'static str] {
        &["release_group"]
    }

    fn when(&self, matches: &Matches, _context: &Options) -> Vec<Action> {
        let mut actions = Vec::new();
        for filepart in sorted_fileparts(matches) {
            let existing =
                matches.range(filepart.start, filepart.end, |m| m.name == "release_group");
            if !existing.is_empty() {
                continue;
            }
            if let Some((group, absorbed)) = self.filepart_group(matches, filepart) {
                actions.extend(absorbed.into_iter().map(Action::Remove));
                actions.push(Action::Append(group));
            }
        }
        actions
    }
}

/// `[Group] Title - 01`: the first bracket group holding nothing but weak
/// languages.
pub struct AnimeReleaseGroup {
    name: GroupName,
}

impl AnimeReleaseGroup {
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            name: GroupName::new(config),
        }
    }
}

impl Rule for AnimeReleaseGroup {
    fn name(&self) -> &'static str {
        "AnimeReleaseGroup"
    }

    fn dependencies(&self) -> &'static [&'static str] {
        &["SceneReleaseGroup"]
    }

    fn properties(&self) -> &'static [&'static str] {
        &["release_group"]
    }

    fn when(&self, matches: &Matches, _context: &Options) -> Vec<Action> {
        if !matches.named("release_group").is_empty() {
            return Vec::new();
        }
        let mut actions = Vec::new();
        for filepart in sorted_fileparts(matches) {
            let bracket = matches
                .markers_range(filepart.start, filepart.end, |marker| {
                    if marker.name != "group" {
                        return false;
                    }
                    let inner = strip(matches.text(marker));
                    !inner.is_empty()
                        && !int_coercable(inner)
                        && matches
                            .range(marker.start, marker.end, |m| {
                                !m.tags.contains(Tags::WEAK_LANGUAGE)
                            })
                            .is_empty()
                })
                .into_iter()
                .next();
            let Some(bracket) = bracket else {
                continue;
            };
            let value = self.name.clean(matches.text(bracket));
            if value.is_empty() {
                continue;
            }
            actions.extend(
                matches
                    .range(bracket.start, bracket.end, |m| m.tags.contains(Tags::WEAK_LANGUAGE))
                    .iter()
                    .map(|m| Action::Remove(m.id())),
            );
            actions.push(Action::Append(
                Match::new(bracket.start + 1, bracket.end - 1, "release_group", Value::Str(value))
                    .with_tags(Tags::ANIME),
            ));
        }
        actions
    }
}

fn expected_group_value(raw: &str) -> Option<Value> {
    Some(Value::from(strip(raw)))
}

pub fn release_group(config: &Config) -> Result<Rebulk> {
    Ok(Rebulk::new("release_group")
        .disabled(|o| o.is_disabled("release_group"))
        .pattern(
            Pattern::functional("release_group", |input, options| {
                find_expected(input, &options.expected_group)
                    .into_iter()
                    .map(|(start, end)| Found::new(start, end))
                    .collect()
            })
            .formatter(expected_group_value)
            .tags(Tags::EXPECTED)
            .validator(seps_surround)
            .conflict_solver(expected_wins)
            .disabled(|o| o.expected_group.is_empty()),
        )
        .rule(SceneReleaseGroup::new(config))
        .rule(AnimeReleaseGroup::new(config)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filepart(input: &str) -> Matches {
        let mut matches = Matches::new(input);
        matches.push(Match::marker(0, input.len(), "path", Value::from(input)));
        matches
    }

    fn config() -> Config {
        Config::default_config().unwrap()
    }

    #[test]
    fn scene_group_after_codec() {
        let mut matches = filepart("Show.Name.720p.x264-GROUP.mkv");
        matches.push(Match::new(0, 9, "title", Value::from("Show Name")));
        matches.push(Match::new(10, 14, "screen_size", Value::from("720p")));
        matches.push(Match::new(15, 19, "video_codec", Value::from("h264")));
        matches.push(Match::new(25, 29, "container", Value::from("mkv")));
        let actions = SceneReleaseGroup::new(&config()).when(&matches, &Options::default());
        matches.apply(actions).unwrap();
        let group = matches.named("release_group");
        assert_eq!(group.len(), 1);
        assert_eq!(group[0].value, Value::from("GROUP"));
        assert!(group[0].tags.contains(Tags::SCENE));
    }

    #[test]
    fn no_scene_group_after_title() {
        let mut matches = filepart("Some.Movie-Thing");
        matches.push(Match::new(0, 10, "title", Value::from("Some Movie")));
        assert!(SceneReleaseGroup::new(&config()).when(&matches, &Options::default()).is_empty());
    }

    #[test]
    fn numbers_are_not_groups() {
        let mut matches = filepart("Show.720p-2010");
        matches.push(Match::new(5, 9, "screen_size", Value::from("720p")));
        assert!(SceneReleaseGroup::new(&config()).when(&matches, &Options::default()).is_empty());
    }

    #[test]
    fn bracketed_scene_group_is_anime() {
        let mut matches = filepart("Movie.720p.[GRP]");
        matches.push(Match::marker(11, 16, "group", Value::from("[GRP]")));
        matches.push(Match::new(6, 10, "screen_size", Value::from("720p")));
        let actions = SceneReleaseGroup::new(&config()).when(&matches, &Options::default());
        matches.apply(actions).unwrap();
        let group = matches.named("release_group");
        assert_eq!(group[0].value, Value::from("GRP"));
        assert_eq!(group[0].span(), (12, 15));
        assert!(group[0].tags.contains(Tags::ANIME));
    }

    #[test]
    fn anime_group_from_brackets() {
        let mut matches = filepart("[SubGroup] Anime Title - 01 [720p].mkv");
        matches.push(Match::marker(0, 10, "group", Value::from("[SubGroup]")));
        matches.push(Match::marker(28, 34, "group", Value::from("[720p]")));
        matches.push(Match::new(11, 22, "title", Value::from("Anime Title")));
        matches.push(Match::new(25, 27, "episode", Value::Int(1)));
        matches.push(Match::new(29, 33, "screen_size", Value::from("720p")));
        let actions = AnimeReleaseGroup::new(&config()).when(&matches, &Options::default());
        matches.apply(actions).unwrap();
        let group = matches.named("release_group");
        assert_eq!(group.len(), 1);
        assert_eq!(group[0].value, Value::from("SubGroup"));
        assert!(group[0].tags.contains(Tags::ANIME));
    }

    #[test]
    fn previous_match_tags() {
        let complete = Match::new(0, 8, "other", Value::from("Complete"))
            .with_tags(Tags::RELEASE_GROUP_PREFIX);
        assert!(is_previous_match(&complete));
        let weak = Match::new(0, 2, "language", Value::from("en"))
            .with_tags(Tags::NO_RELEASE_GROUP_PREFIX);
        assert!(!is_previous_match(&weak));
        assert!(!is_previous_match(&Match::new(0, 4, "year", Value::Int(2010))));
    }
}

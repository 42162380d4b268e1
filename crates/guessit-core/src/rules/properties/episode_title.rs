use std::collections::HashSet;

use crate::error::Result;
use crate::options::Options;
use crate::rebulk::{Action, Match, Matches, POST_PROCESS, Rebulk, Rule, Tags};
use crate::rules::common::only_seps;
use crate::rules::properties::title::{TitleBaseRule, is_ignored};

/// Properties that may directly precede an episode title.
const PREVIOUS_NAMES: &[&str] = &[
    "episode",
    "episode_count",
    "season",
    "season_count",
    "date",
    "title",
    "year",
];

fn nearest_previous<'a>(matches: &'a Matches, m: &Match) -> Option<&'a Match> {
    matches
        .previous(m, |p| !p.private && !is_ignored(p))
        .into_iter()
        .next()
}

fn in_titled_filepart(matches: &Matches, filepart: &Match) -> bool {
    !matches
        .range(filepart.start, filepart.end, |m| m.name == "title")
        .is_empty()
}

fn after_episode(matches: &Matches, hole: &Match) -> bool {
    nearest_previous(matches, hole).is_some_and(|p| PREVIOUS_NAMES.contains(&p.name))
        || !matches.named("crc32").is_empty()
}

/// Titles with differing values: those following an episode number are
/// episode titles.
pub struct TitleToEpisodeTitle;

impl Rule for TitleToEpisodeTitle {
    fn name(&self) -> &'static str {
        "TitleToEpisodeTitle"
    }

    fn dependencies(&self) -> &'static [&'static str] {
        &["TitleFromPosition"]
    }

    fn when(&self, matches: &Matches, _context: &Options) -> Vec<Action> {
        let titles = matches.named("title");
        let distinct: HashSet<String> = titles.iter().map(|t| t.value.to_string()).collect();
        if distinct.len() < 2 {
            return Vec::new();
        }
        titles
            .iter()
            .filter(|t| !matches.previous(t, |p| p.name == "episode").is_empty())
            .map(|t| Action::Rename(t.id(), "episode_title"))
            .collect()
    }
}

/// `episode_title` from the hole following the episode number.
pub struct EpisodeTitleFromPosition {
    base: TitleBaseRule,
}

impl EpisodeTitleFromPosition {
    #[must_use]
    pub fn new() -> Self {
        let mut base = TitleBaseRule::new("episode_title");
        base.filepart_filter = Some(in_titled_filepart);
        base.hole_filter = Some(after_episode);
        base.keep_episode_details = true;
        Self { base }
    }
}

impl Default for EpisodeTitleFromPosition {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for EpisodeTitleFromPosition {
    fn name(&self) -> &'static str {
        "EpisodeTitleFromPosition"
    }

    fn dependencies(&self) -> &'static [&'static str] {
        &["TitleToEpisodeTitle", "SceneReleaseGroup", "AnimeReleaseGroup"]
    }

    fn properties(&self) -> &'static [&'static str] {
        &["episode_title"]
    }

    fn when(&self, matches: &Matches, context: &Options) -> Vec<Action> {
        if !matches.named("episode_title").is_empty() {
            return Vec::new();
        }
        self.base.when(matches, context)
    }
}

/// `Show.S01E02.Name - Other`: when the title follows the episode, the
/// alternative title is the episode title.
pub struct AlternativeTitleReplace;

impl Rule for AlternativeTitleReplace {
    fn name(&self) -> &'static str {
        "AlternativeTitleReplace"
    }

    fn dependencies(&self) -> &'static [&'static str] {
        &["EpisodeTitleFromPosition"]
    }

    fn when(&self, matches: &Matches, _context: &Options) -> Vec<Action> {
        if !matches.named("episode_title").is_empty() {
            return Vec::new();
        }
        let Some(alternative) = matches.named("alternative_title").into_iter().next() else {
            return Vec::new();
        };
        let main = matches
            .previous(alternative, |p| p.tags.contains(Tags::TITLE))
            .into_iter()
            .next()
            .filter(|main| only_seps(matches.slice(main.end, alternative.start)));
        let Some(main) = main else {
            return Vec::new();
        };
        if after_episode(matches, main) {
            vec![Action::Rename(alternative.id(), "episode_title")]
        } else {
            Vec::new()
        }
    }
}

/// Movies have no episode title: it becomes an alternative title.
pub struct RenameEpisodeTitleWhenMovieType;

impl Rule for RenameEpisodeTitleWhenMovieType {
    fn name(&self) -> &'static str {
        "RenameEpisodeTitleWhenMovieType"
    }

    fn priority(&self) -> i32 {
        POST_PROCESS
    }

    fn dependencies(&self) -> &'static [&'static str] {
        &["TypeProcessor"]
    }

    fn when(&self, matches: &Matches, _context: &Options) -> Vec<Action> {
        let is_episode = matches
            .named("type")
            .iter()
            .any(|m| m.value.as_str() == Some("episode"));
        if is_episode {
            return Vec::new();
        }
        matches
            .named("episode_title")
            .iter()
            .map(|m| Action::Rename(m.id(), "alternative_title"))
            .collect()
    }
}

pub fn episode_title() -> Result<Rebulk> {
    Ok(Rebulk::new("episode_title")
        .disabled(|o| o.is_disabled("episode_title"))
        .rule(TitleToEpisodeTitle)
        .rule(EpisodeTitleFromPosition::new())
        .rule(AlternativeTitleReplace)
        .rule(RenameEpisodeTitleWhenMovieType))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Value;

    fn sample() -> Matches {
        let input = "Show.Name.S01E02.Pilot.Part.720p.mkv";
        let mut matches = Matches::new(input);
        matches.push(Match::marker(0, input.len(), "path", Value::from(input)));
        matches.push(Match::new(0, 9, "title", Value::from("Show Name")).with_tags(Tags::TITLE));
        matches.push(Match::new(10, 11, "seasonMarker", Value::from("s")).with_private(true));
        matches.push(Match::new(11, 13, "season", Value::Int(1)));
        matches.push(Match::new(13, 14, "episodeMarker", Value::from("e")).with_private(true));
        matches.push(Match::new(14, 16, "episode", Value::Int(2)));
        matches.push(Match::new(28, 32, "screen_size", Value::from("720p")));
        matches.push(Match::new(32, 36, "container", Value::from("mkv")));
        matches
    }

    #[test]
    fn hole_after_episode() {
        let mut matches = sample();
        let actions = EpisodeTitleFromPosition::new().when(&matches, &Options::default());
        matches.apply(actions).unwrap();
        let title = matches.named("episode_title");
        assert_eq!(title.len(), 1);
        assert_eq!(title[0].value, Value::from("Pilot Part"));
    }

    #[test]
    fn movie_episode_title_is_alternative() {
        let mut matches = sample();
        let id = matches.push(Match::new(17, 27, "episode_title", Value::from("Pilot Part")));
        matches.push(Match::new(36, 36, "type", Value::from("movie")));
        let actions = RenameEpisodeTitleWhenMovieType.when(&matches, &Options::default());
        matches.apply(actions).unwrap();
        assert_eq!(matches.get(id).map(|m| m.name), Some("alternative_title"));
    }

    #[test]
    fn second_title_after_episode() {
        let input = "Show/S01E02/Other";
        let mut matches = Matches::new(input);
        matches.push(Match::new(0, 4, "title", Value::from("Show")));
        matches.push(Match::new(8, 10, "episode", Value::Int(2)));
        let second = matches.push(Match::new(12, 17, "title", Value::from("Other")));
        let actions = TitleToEpisodeTitle.when(&matches, &Options::default());
        matches.apply(actions).unwrap();
        assert_eq!(matches.get(second).map(|m| m.name), Some("episode_title"));
        assert_eq!(matches.named("title").len(), 1);
    }
}

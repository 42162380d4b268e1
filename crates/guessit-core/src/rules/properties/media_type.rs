use crate::error::Result;
use crate::options::Options;
use crate::rebulk::{Action, Match, Matches, POST_PROCESS, Rebulk, Rule, Tags};
use crate::types::{MediaType, Value};

/// Decides `type` once every other property is settled.
pub struct TypeProcessor;

impl TypeProcessor {
    fn infer(matches: &Matches, context: &Options) -> MediaType {
        if let Some(forced) = context.media_type {
            return forced;
        }
        let any = |name: &str| !matches.named(name).is_empty();
        if ["episode", "season", "absolute_episode", "episode_details"]
            .iter()
            .any(|&name| any(name))
        {
            return MediaType::Episode;
        }
        if any("film") {
            return MediaType::Movie;
        }
        if any("date") && !any("year") {
            return MediaType::Episode;
        }
        if any("bonus") && !any("year") {
            return MediaType::Episode;
        }
        let anime_group = !matches
            .named_where("release_group", |m| m.tags.contains(Tags::ANIME))
            .is_empty();
        if any("crc32") && anime_group {
            return MediaType::Episode;
        }
        MediaType::Movie
    }
}

impl Rule for TypeProcessor {
    fn name(&self) -> &'static str {
        "TypeProcessor"
    }

    fn priority(&self) -> i32 {
        POST_PROCESS
    }

    fn dependencies(&self) -> &'static [&'static str] {
        &["RemoveAmbiguous", "SeasonYear"]
    }

    fn properties(&self) -> &'static [&'static str] {
        &["type"]
    }

    fn enabled(&self, context: &Options) -> bool {
        !context.is_disabled("type")
    }

    fn when(&self, matches: &Matches, context: &Options) -> Vec<Action> {
        let media_type = Self::infer(matches, context);
        let end = matches.input().len();
        vec![Action::Append(Match::new(
            end,
            end,
            "type",
            Value::from(media_type.as_str()),
        ))]
    }
}

pub fn media_type() -> Result<Rebulk> {
    Ok(Rebulk::new("type").rule(TypeProcessor))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn infer(input: &str, found: &[(&'static str, Value)]) -> MediaType {
        let mut matches = Matches::new(input);
        for (name, value) in found {
            matches.push(Match::new(0, 1, *name, value.clone()));
        }
        TypeProcessor::infer(&matches, &Options::default())
    }

    #[test]
    fn episode_evidence() {
        assert_eq!(infer("x", &[("episode", Value::Int(1))]), MediaType::Episode);
        assert_eq!(infer("x", &[("season", Value::Int(1))]), MediaType::Episode);
        assert_eq!(infer("x", &[("episode_details", Value::from("Pilot"))]), MediaType::Episode);
    }

    #[test]
    fn dates_and_bonuses_need_no_year() {
        assert_eq!(infer("x", &[("date", Value::from("2010-01-01"))]), MediaType::Episode);
        assert_eq!(
            infer("x", &[("date", Value::from("2010-01-01")), ("year", Value::Int(2010))]),
            MediaType::Movie
        );
        assert_eq!(infer("x", &[("bonus", Value::Int(1))]), MediaType::Episode);
        assert_eq!(
            infer("x", &[("film", Value::Int(1)), ("bonus", Value::Int(1))]),
            MediaType::Movie
        );
    }

    #[test]
    fn crc_needs_anime_group() {
        assert_eq!(infer("x", &[("crc32", Value::from("ABCD1234"))]), MediaType::Movie);
        let mut matches = Matches::new("x");
        matches.push(Match::new(0, 1, "crc32", Value::from("ABCD1234")));
        matches.push(Match::new(0, 1, "release_group", Value::from("Grp")).with_tags(Tags::ANIME));
        assert_eq!(TypeProcessor::infer(&matches, &Options::default()), MediaType::Episode);
    }

    #[test]
    fn forced_type_and_empty_span() {
        let mut matches = Matches::new("Movie.2010");
        let options = Options::default().with_type(MediaType::Episode);
        let actions = TypeProcessor.when(&matches, &options);
        matches.apply(actions).unwrap();
        let found = matches.named("type");
        assert_eq!(found[0].value, Value::from("episode"));
        assert_eq!(found[0].span(), (10, 10));
    }
}

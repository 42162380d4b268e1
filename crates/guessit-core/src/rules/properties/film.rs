use crate::error::Result;
use crate::options::Options;
use crate::rebulk::{Action, Match, Matches, Pattern, Rebulk, Rule};
use crate::rules::common::formatters::{int, lower};
use crate::rules::common::validators::seps_surround;
use crate::rules::properties::title::TitleBaseRule;

fn film_pattern() -> Result<Pattern> {
    Ok(Pattern::regex("film", &[r"(?P<filmMarker>f)(?P<film>\d{1,2})"])?
        .children(&["filmMarker", "film"])
        .private_children(&["filmMarker"])
        .formatter(int)
        .child_formatter("filmMarker", lower)
        .validator(seps_surround))
}

fn has_film(matches: &Matches, filepart: &Match) -> bool {
    !matches
        .range(filepart.start, filepart.end, |m| m.name == "film")
        .is_empty()
}

fn followed_by_film(matches: &Matches, hole: &Match) -> bool {
    matches
        .next(hole, |m| !m.private)
        .first()
        .is_some_and(|m| m.name == "film")
}

/// `film_title`: the franchise name in front of `f<N>`.
pub struct FilmTitleRule {
    base: TitleBaseRule,
}

impl FilmTitleRule {
    #[must_use]
    pub fn new() -> Self {
        let mut base = TitleBaseRule::new("film_title");
        base.filepart_filter = Some(has_film);
        base.hole_filter = Some(followed_by_film);
        Self { base }
    }
}

impl Default for FilmTitleRule {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for FilmTitleRule {
    fn name(&self) -> &'static str {
        "FilmTitleRule"
    }

    fn properties(&self) -> &'static [&'static str] {
        &["film_title"]
    }

    fn enabled(&self, context: &Options) -> bool {
        !context.is_disabled("film_title")
    }

    fn when(&self, matches: &Matches, context: &Options) -> Vec<Action> {
        self.base.when(matches, context)
    }
}

pub fn film() -> Result<Rebulk> {
    Ok(Rebulk::new("film")
        .disabled(|o| o.is_disabled("film"))
        .pattern(film_pattern()?)
        .rule(FilmTitleRule::new()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Value;

    fn scan(input: &str) -> Matches {
        let mut matches = Matches::new(input);
        matches.push(Match::marker(0, input.len(), "path", Value::from(input)));
        film_pattern().unwrap().find(&mut matches, &Options::default());
        matches
    }

    #[test]
    fn film_number() {
        let matches = scan("James_Bond-f17-Goldfinger.avi");
        let film = matches.named("film");
        assert_eq!(film.len(), 1);
        assert_eq!(film[0].value, Value::Int(17));
        assert!(scan("Movie.f1080.mkv").named("film").is_empty());
    }

    #[test]
    fn film_title_before_number() {
        let mut matches = scan("James_Bond-f17-Goldfinger.avi");
        let actions = FilmTitleRule::new().when(&matches, &Options::default());
        matches.apply(actions).unwrap();
        let title = matches.named("film_title");
        assert_eq!(title.len(), 1);
        assert_eq!(title[0].value, Value::from("James Bond"));
    }

    #[test]
    fn no_film_no_title() {
        let matches = scan("Movie.Name.2010.avi");
        assert!(FilmTitleRule::new().when(&matches, &Options::default()).is_empty());
    }
}

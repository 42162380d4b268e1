use crate::error::Result;
use crate::rebulk::{ConflictOutcome, Match, Matches, Pattern, Rebulk};
use crate::rules::common::formatters::int;
use crate::rules::common::validators::seps_surround;

/// Years accepted anywhere in a release name.
pub const MIN_YEAR: i64 = 1920;
pub const MAX_YEAR: i64 = 2030;

#[must_use]
pub fn valid_year(year: i64) -> bool {
    (MIN_YEAR..MAX_YEAR).contains(&year)
}

fn year_validator(matches: &Matches, m: &Match) -> bool {
    seps_surround(matches, m) && m.value.as_int().is_some_and(valid_year)
}

/// A year beats a shorter season or episode read from the same digits.
pub fn year_conflict_solver(matches: &Matches, m: &Match, other: &Match) -> ConflictOutcome {
    if matches!(other.name, "season" | "episode")
        && matches.raw(other).len() < matches.raw(m).len()
    {
        ConflictOutcome::RemoveOther
    } else {
        ConflictOutcome::Default
    }
}

pub fn year() -> Result<Rebulk> {
    Ok(Rebulk::new("year")
        .disabled(|o| o.is_disabled("year"))
        .pattern(
            Pattern::regex("year", &[r"\d{4}"])?
                .formatter(int)
                .validator(year_validator)
                .conflict_solver(year_conflict_solver),
        ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Options;
    use crate::rebulk::Engine;
    use crate::types::Value;

    fn values(input: &str) -> Vec<Value> {
        let engine = Engine::new(vec![year().unwrap()]).unwrap();
        let matches = engine.run(input, &Options::default()).unwrap();
        matches.named("year").iter().map(|m| m.value.clone()).collect()
    }

    #[test]
    fn years_in_range() {
        assert_eq!(values("Movie.Title.2020.1080p"), vec![Value::Int(2020)]);
        assert_eq!(values("Movie (1999)"), vec![Value::Int(1999)]);
        assert!(values("Movie.1080.1919.2030").is_empty());
    }

    #[test]
    fn glued_digits_are_not_years() {
        assert!(values("Movie.x2010.mkv").is_empty());
        assert!(values("Movie.20101.mkv").is_empty());
    }

    #[test]
    fn year_wins_over_shorter_season() {
        let mut matches = Matches::new("2010");
        let year = Match::new(0, 4, "year", Value::Int(2010));
        let season = Match::new(0, 2, "season", Value::Int(20));
        matches.push(year.clone());
        matches.push(season.clone());
        assert_eq!(
            year_conflict_solver(&matches, &year, &season),
            ConflictOutcome::RemoveOther
        );
    }
}

//! Dates such as `2010.01.02`, `02-01-2010` or `20100102`.
//!
//! Ambiguous month/day orders are read month first unless `date_day_first`
//! is set, falling back to the other order when the first one is not a
//! valid date. Two-digit years are only read when a preference is given.

use chrono::{Datelike, NaiveDate};
use regex::Regex;

use crate::error::Result;
use crate::options::Options;
use crate::rebulk::{ConflictOutcome, Found, Match, Matches, Pattern, Rebulk};
use crate::rules::common::validators::seps_surround;
use crate::rules::properties::year::valid_year;

const DATE_CANDIDATE: &str = r"\d{8}|\d{1,4}[-._/ ]\d{1,2}[-._/ ]\d{1,4}";

/// A date hides the season, episode or checksum read inside it.
fn date_conflict_solver(_: &Matches, _: &Match, other: &Match) -> ConflictOutcome {
    if matches!(other.name, "season" | "episode" | "crc32") {
        ConflictOutcome::RemoveOther
    } else {
        ConflictOutcome::Default
    }
}

fn ymd(year: &str, month: &str, day: &str) -> Option<NaiveDate> {
    let year: i32 = year.parse().ok()?;
    NaiveDate::from_ymd_opt(year, month.parse().ok()?, day.parse().ok()?)
}

fn two_digit_year(year: &str) -> Option<String> {
    let year: i32 = year.parse().ok()?;
    Some(if year < 50 { 2000 + year } else { 1900 + year }.to_string())
}

/// Reads `text` as a date honouring the order preferences of `options`.
#[must_use]
pub fn parse_date(text: &str, options: &Options) -> Option<NaiveDate> {
    if text.len() == 8 && text.bytes().all(|b| b.is_ascii_digit()) {
        return ymd(&text[..4], &text[4..6], &text[6..]);
    }
    let sep = text.chars().find(|c| !c.is_ascii_digit())?;
    let parts: Vec<&str> = text.split(sep).collect();
    let [a, b, c] = parts.as_slice() else {
        return None;
    };

    if a.len() == 4 {
        return ymd(a, b, c).or_else(|| ymd(a, c, b));
    }
    if c.len() == 4 && a.len() <= 2 {
        return if options.date_day_first {
            ymd(c, b, a).or_else(|| ymd(c, a, b))
        } else {
            ymd(c, a, b).or_else(|| ymd(c, b, a))
        };
    }
    if a.len() == 2 && b.len() == 2 && c.len() == 2 {
        if options.date_year_first {
            return ymd(&two_digit_year(a)?, b, c);
        }
        if options.date_day_first {
            return ymd(&two_digit_year(c)?, b, a);
        }
    }
    None
}

fn find_dates(re: &Regex, input: &str, options: &Options) -> Vec<Found> {
    re.find_iter(input)
        .filter_map(|candidate| {
            let text = candidate.as_str();
            let sep = text.chars().find(|c| !c.is_ascii_digit());
            // `2010.01-02` mixes separators
            if sep.is_some_and(|s| text.chars().filter(|c| !c.is_ascii_digit()).any(|c| c != s)) {
                return None;
            }
            let date = parse_date(text, options)?;
            valid_year(i64::from(date.year()))
                .then(|| Found::new(candidate.start(), candidate.end()).value(date))
        })
        .collect()
}

pub fn date() -> Result<Rebulk> {
    let re = Regex::new(DATE_CANDIDATE)?;
    Ok(Rebulk::new("date")
        .disabled(|o| o.is_disabled("date"))
        .pattern(
            Pattern::functional("date", move |input, options| find_dates(&re, input, options))
                .validator(seps_surround)
                .conflict_solver(date_conflict_solver),
        ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rebulk::Engine;
    use crate::types::Value;

    fn day(y: i32, m: u32, d: u32) -> Value {
        Value::Date(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    fn values(input: &str, options: &Options) -> Vec<Value> {
        let engine = Engine::new(vec![date().unwrap()]).unwrap();
        let matches = engine.run(input, options).unwrap();
        matches.named("date").iter().map(|m| m.value.clone()).collect()
    }

    #[test]
    fn year_first_and_compact() {
        let options = Options::default();
        assert_eq!(values("Show.2010.01.02.HDTV", &options), vec![day(2010, 1, 2)]);
        assert_eq!(values("Show.20100102.HDTV", &options), vec![day(2010, 1, 2)]);
        assert!(values("Show.2010.01-02.HDTV", &options).is_empty());
    }

    #[test]
    fn month_first_unless_day_first() {
        let options = Options::default();
        assert_eq!(values("Show.02.01.2010", &options), vec![day(2010, 2, 1)]);
        assert_eq!(values("Show.13.01.2010", &options), vec![day(2010, 1, 13)]);
        let options = Options::default().with_date_day_first(true);
        assert_eq!(values("Show.02.01.2010", &options), vec![day(2010, 1, 2)]);
    }

    #[test]
    fn two_digit_years_need_a_preference() {
        assert!(values("Show.10.01.02", &Options::default()).is_empty());
        let options = Options::default().with_date_year_first(true);
        assert_eq!(values("Show.10.01.02", &options), vec![day(2010, 1, 2)]);
        let options = Options::default().with_date_day_first(true);
        assert_eq!(values("Show.02.01.99", &options), vec![day(1999, 1, 2)]);
    }

    #[test]
    fn out_of_range_years_are_dropped() {
        assert!(values("Show.1900.01.02", &Options::default()).is_empty());
    }
}
